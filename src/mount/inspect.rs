use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::TableError;
use crate::types::WriteMode;
use crate::util::paths::{unescape_octal, RootPrefix};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveMountEntry {
    pub mountpoint: String,
    pub fs_type: String,
    pub options: BTreeSet<String>,
    pub write_mode: WriteMode,
}

/// Kernel mount table indexed by logical mount point.
#[derive(Debug, Default)]
pub struct LiveTable {
    entries: HashMap<String, LiveMountEntry>,
}

impl LiveTable {
    pub fn get(&self, mountpoint: &str) -> Option<&LiveMountEntry> {
        self.entries.get(mountpoint)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

pub fn read_live_table(path: &Path, root: &RootPrefix) -> Result<LiveTable, TableError> {
    debug!("parsing live mount table {}", path.display());
    // Mount points are raw bytes; only whitespace and backslash are escaped.
    let raw = fs::read(path).map_err(|e| TableError::unavailable(path, e.to_string()))?;
    let table = parse_live_table(path, &String::from_utf8_lossy(&raw), root)?;
    debug!("live mount table has {} mount points", table.len());
    Ok(table)
}

pub fn parse_live_table(
    path: &Path,
    contents: &str,
    root: &RootPrefix,
) -> Result<LiveTable, TableError> {
    let mut table = LiveTable::default();
    for (idx, line) in contents.lines().enumerate() {
        let lineno = idx + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() < 4 {
            return Err(TableError::parse(
                path,
                lineno,
                format!("expected at least 4 fields, found {}", fields.len()),
            ));
        }
        let options: BTreeSet<String> = fields[3].split(',').map(str::to_string).collect();
        let write_mode = classify(&options).map_err(|reason| TableError::parse(path, lineno, reason))?;
        let mountpoint = root.strip(&unescape_octal(fields[1]));
        let fs_type = fields[2].to_string();
        debug!(
            "found mount {} type {} options {} ({})",
            mountpoint,
            fs_type,
            options.iter().cloned().collect::<Vec<_>>().join(","),
            write_mode
        );
        // Stacked mounts: the later line is the one visible at that path.
        table.entries.insert(
            mountpoint.clone(),
            LiveMountEntry {
                mountpoint,
                fs_type,
                options,
                write_mode,
            },
        );
    }
    Ok(table)
}

fn classify(options: &BTreeSet<String>) -> Result<WriteMode, String> {
    match (options.contains("rw"), options.contains("ro")) {
        (true, true) => Err("options carry both rw and ro".to_string()),
        (true, false) => Ok(WriteMode::ReadWrite),
        (false, true) => Ok(WriteMode::ReadOnly),
        (false, false) => Ok(WriteMode::Unknown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const MOUNTS: &str = "/dev/root / ext4 rw,noatime 0 0
/dev/mapper/vg-lv_home /home ext4 ro,noatime 0 0
/dev/mapper/vg-lv_var /var ext4 rw,noatime 0 0
tmpfs /run tmpfs nosuid,nodev 0 0
";

    fn parse(contents: &str, root: &RootPrefix) -> Result<LiveTable, TableError> {
        parse_live_table(Path::new("/proc/mounts"), contents, root)
    }

    #[test]
    fn classifies_write_modes() {
        let table = parse(MOUNTS, &RootPrefix::default()).expect("parse");
        assert_eq!(table.len(), 4);
        assert_eq!(table.get("/").map(|e| e.write_mode), Some(WriteMode::ReadWrite));
        assert_eq!(table.get("/home").map(|e| e.write_mode), Some(WriteMode::ReadOnly));
        assert_eq!(table.get("/run").map(|e| e.write_mode), Some(WriteMode::Unknown));
        assert!(table.get("/dne").is_none());
    }

    #[test]
    fn option_tokens_must_match_exactly() {
        let table = parse("dev /mnt ext4 rwx,noro 0 0\n", &RootPrefix::default()).expect("parse");
        assert_eq!(table.get("/mnt").map(|e| e.write_mode), Some(WriteMode::Unknown));
        let table = parse("dev /mnt ext4 nosuid,ro 0 0\n", &RootPrefix::default()).expect("parse");
        assert_eq!(table.get("/mnt").map(|e| e.write_mode), Some(WriteMode::ReadOnly));
    }

    #[test]
    fn short_line_is_a_parse_error() {
        let err = parse("/dev/sda1 /boot ext4\n", &RootPrefix::default()).expect_err("short line");
        assert_eq!(
            err,
            TableError::Parse {
                path: PathBuf::from("/proc/mounts"),
                line: 1,
                reason: "expected at least 4 fields, found 3".to_string(),
            }
        );
    }

    #[test]
    fn conflicting_modes_are_a_parse_error() {
        let err = parse("/dev/sda1 /boot ext4 rw,ro 0 0\n", &RootPrefix::default())
            .expect_err("rw and ro");
        assert!(matches!(err, TableError::Parse { line: 1, .. }));
    }

    #[test]
    fn strips_root_prefix_and_unescapes() {
        let contents = "/dev/root /host ext4 rw 0 0
/dev/sdb1 /host/mnt/my\\040disk xfs ro 0 0
proc /proc proc rw 0 0
";
        let table = parse(contents, &RootPrefix::new("/host")).expect("parse");
        assert!(table.get("/").is_some());
        assert_eq!(table.get("/mnt/my disk").map(|e| e.fs_type.as_str()), Some("xfs"));
        assert!(table.get("/proc").is_some());
    }

    #[test]
    fn non_utf8_mount_does_not_fail_the_table() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mounts");
        let mut contents = b"/dev/root / ext4 rw 0 0\n/dev/sdb1 /media/caf".to_vec();
        contents.extend_from_slice(b"\xe9 vfat ro 0 0\n");
        fs::write(&path, contents).expect("write mounts");
        let table = read_live_table(&path, &RootPrefix::default()).expect("read");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("/").map(|e| e.write_mode), Some(WriteMode::ReadWrite));
        assert_eq!(
            table.get("/media/caf\u{fffd}").map(|e| e.write_mode),
            Some(WriteMode::ReadOnly)
        );
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = read_live_table(&dir.path().join("proc/mounts"), &RootPrefix::default())
            .expect_err("missing");
        assert!(matches!(err, TableError::Unavailable { .. }));
    }
}
