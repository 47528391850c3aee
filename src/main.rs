fn main() -> anyhow::Result<()> {
    check_mount_exporter::cli::run()
}
