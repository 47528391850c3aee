use tracing::{debug, error};

use crate::config::model::{WatchConfig, WatchSource};
use crate::error::TableError;
use crate::mount::fstab::watch_list_from_fstab;
use crate::mount::inspect::read_live_table;
use crate::types::{CollectionOutcome, StatusRecord, WriteMode};

/// Runs one collection cycle. Any table failure yields an outcome with
/// `succeeded == false` and no records.
pub fn collect(config: &WatchConfig) -> CollectionOutcome {
    match try_collect(config) {
        Ok(records) => CollectionOutcome::success(records),
        Err(err) => {
            error!("collection failed: {}", err);
            CollectionOutcome::failure()
        }
    }
}

pub fn try_collect(config: &WatchConfig) -> Result<Vec<StatusRecord>, TableError> {
    let watch_list = match &config.source {
        WatchSource::Explicit(list) => list.clone(),
        WatchSource::StaticTable => watch_list_from_fstab(&config.tables.static_table, &config.filters)?,
    };
    debug!("collecting mount points: {:?}", watch_list);

    let live = read_live_table(&config.tables.live_table, &config.root)?;

    // Duplicates in the watch list are reported once per occurrence.
    let records = watch_list
        .into_iter()
        .map(|mountpoint| {
            let (mounted, write_mode) = match live.get(&mountpoint) {
                Some(entry) => (true, entry.write_mode),
                None => (false, WriteMode::Unknown),
            };
            StatusRecord {
                mountpoint,
                mounted,
                write_mode,
            }
        })
        .collect();
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::ExclusionFilters;
    use crate::util::paths::RootPrefix;
    use std::fs;
    use std::path::Path;

    const MOUNTS: &str = "/dev/root / ext4 rw,noatime 0 0
/dev/mapper/vg-lv_home /home ext4 ro,noatime 0 0
/dev/mapper/vg-lv_var /var ext4 rw,noatime 0 0
/dev/mapper/vg-lv_tmp /tmp ext4 rw,noatime 0 0
";

    const FSTAB: &str = "proc            /proc           proc    defaults          0       0
LABEL=swap      swap    swap    defaults        0       0
PARTUUID=6c586e13-01  /boot           ext3    defaults          0       2
PARTUUID=6c586e13-02  /               ext4    defaults,noatime  0       1
/dev/vg/lv_var       /var            ext4    defaults,noatime 0 0
/dev/vg/lv_puppet    /etc/puppet     ext4    defaults,noatime 0 0
/dev/vg/lv_home      /home           ext4    defaults,noatime 0 0
/dev/vg/lv_tmp       /tmp            ext4    defaults,noatime 0 0
";

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, contents).expect("write");
    }

    fn config(root: &Path, source: WatchSource) -> WatchConfig {
        WatchConfig::new(source, ExclusionFilters::default(), RootPrefix::new(root))
    }

    fn explicit(list: &[&str]) -> WatchSource {
        WatchSource::Explicit(list.iter().map(|s| s.to_string()).collect())
    }

    fn record(mountpoint: &str, mounted: bool, write_mode: WriteMode) -> StatusRecord {
        StatusRecord {
            mountpoint: mountpoint.to_string(),
            mounted,
            write_mode,
        }
    }

    #[test]
    fn explicit_watch_list() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "proc/mounts", MOUNTS);
        let outcome = collect(&config(dir.path(), explicit(&["/var", "/home", "/dne"])));
        assert!(outcome.succeeded());
        assert_eq!(
            outcome.records(),
            &[
                record("/var", true, WriteMode::ReadWrite),
                record("/home", true, WriteMode::ReadOnly),
                record("/dne", false, WriteMode::Unknown),
            ]
        );
    }

    #[test]
    fn explicit_list_never_reads_static_table() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "proc/mounts", MOUNTS);
        write(dir.path(), "etc/fstab", "this is not an fstab\n");
        let outcome = collect(&config(dir.path(), explicit(&["/tmp"])));
        assert!(outcome.succeeded());
        assert_eq!(outcome.records(), &[record("/tmp", true, WriteMode::ReadWrite)]);
    }

    #[test]
    fn duplicates_are_not_merged() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "proc/mounts", MOUNTS);
        let outcome = collect(&config(dir.path(), explicit(&["/var", "/var"])));
        assert_eq!(outcome.records().len(), 2);
    }

    #[test]
    fn derives_watch_list_from_static_table() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "proc/mounts", MOUNTS);
        write(dir.path(), "etc/fstab", FSTAB);
        let outcome = collect(&config(dir.path(), WatchSource::StaticTable));
        assert!(outcome.succeeded());
        let records = outcome.records();
        assert_eq!(records.len(), 6);
        assert_eq!(records[0], record("/boot", false, WriteMode::Unknown));
        assert_eq!(records[1], record("/", true, WriteMode::ReadWrite));
        assert_eq!(records[4], record("/home", true, WriteMode::ReadOnly));
    }

    #[test]
    fn missing_live_table_fails_the_cycle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let outcome = collect(&config(dir.path(), explicit(&["/var", "/home"])));
        assert!(!outcome.succeeded());
        assert!(outcome.records().is_empty());
    }

    #[test]
    fn missing_static_table_fails_the_cycle() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "proc/mounts", MOUNTS);
        let err = try_collect(&config(dir.path(), WatchSource::StaticTable)).expect_err("no fstab");
        assert!(matches!(err, TableError::Unavailable { .. }));
        assert_eq!(collect(&config(dir.path(), WatchSource::StaticTable)), CollectionOutcome::failure());
    }

    #[test]
    fn malformed_live_table_fails_the_cycle() {
        let dir = tempfile::tempdir().expect("tempdir");
        write(dir.path(), "proc/mounts", "/dev/root / ext4 rw 0 0\nbroken line\n");
        let outcome = collect(&config(dir.path(), explicit(&["/"])));
        assert!(!outcome.succeeded());
        assert!(outcome.records().is_empty());
    }
}
