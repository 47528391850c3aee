use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::http::StatusCode;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server};
use tracing::{error, info};

use crate::collector::collect;
use crate::config::model::WatchConfig;
use crate::error::{ExporterError, Result};
use crate::exporter::metrics::{encode_outcome, CONTENT_TYPE};
use crate::types::CollectionOutcome;

pub const METRICS_PATH: &str = "/metrics";

const LANDING_PAGE: &str = "<html>
<head><title>check_mount Exporter</title></head>
<body>
<h1>check_mount Exporter</h1>
<p><a href='/metrics'>Metrics</a></p>
</body>
</html>
";

/// Read-only state shared by every request.
pub struct ServerState {
    pub watch: WatchConfig,
    pub exporter_metrics: bool,
}

pub async fn serve(addr: SocketAddr, state: ServerState) -> Result<()> {
    let state = Arc::new(state);
    let make_svc = make_service_fn(move |_conn| {
        let state = state.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req: Request<Body>| handle(req, state.clone())))
        }
    });

    let server = Server::try_bind(&addr)
        .map_err(|e| ExporterError::message(format!("bind {}: {}", addr, e)))?
        .serve(make_svc);
    info!("listening on http://{}{}", addr, METRICS_PATH);

    let graceful = server.with_graceful_shutdown(shutdown_signal());
    graceful
        .await
        .map_err(|e| ExporterError::message(format!("server error: {}", e)))?;
    info!("server stopped");
    Ok(())
}

pub async fn handle(req: Request<Body>, state: Arc<ServerState>) -> std::result::Result<Response<Body>, Infallible> {
    if req.method() != Method::GET && req.method() != Method::HEAD {
        return Ok(plain(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"));
    }
    match req.uri().path() {
        METRICS_PATH => Ok(metrics_response(state).await),
        "/" => Ok(Response::builder()
            .header("Content-Type", "text/html; charset=utf-8")
            .body(Body::from(LANDING_PAGE))
            .unwrap_or_default()),
        _ => Ok(plain(StatusCode::NOT_FOUND, "Not Found")),
    }
}

async fn metrics_response(state: Arc<ServerState>) -> Response<Body> {
    let cycle_state = state.clone();
    // Table reads are blocking file I/O.
    let outcome = match tokio::task::spawn_blocking(move || collect(&cycle_state.watch)).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("collection task failed: {}", err);
            CollectionOutcome::failure()
        }
    };
    match encode_outcome(&outcome, state.exporter_metrics) {
        Ok(text) => Response::builder()
            .header("Content-Type", CONTENT_TYPE)
            .body(Body::from(text))
            .unwrap_or_default(),
        Err(err) => {
            error!("failed to encode metrics: {}", err);
            plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

fn plain(status: StatusCode, text: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(text));
    *response.status_mut() = status;
    response
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(err) => {
                error!("SIGTERM handler setup failed: {}", err);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("shutdown signal received");
}
