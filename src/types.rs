use std::fmt;
use std::str::FromStr;

/// Write mode label attached to a mount point status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    ReadWrite,
    ReadOnly,
    #[default]
    Unknown,
}

impl WriteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteMode::ReadWrite => "rw",
            WriteMode::ReadOnly => "ro",
            WriteMode::Unknown => "",
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    pub mountpoint: String,
    pub mounted: bool,
    pub write_mode: WriteMode,
}

impl StatusRecord {
    pub fn status_value(&self) -> i64 {
        if self.mounted {
            1
        } else {
            0
        }
    }
}

/// Result of one collection cycle. A failed cycle never carries records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollectionOutcome {
    records: Vec<StatusRecord>,
    succeeded: bool,
}

impl CollectionOutcome {
    pub fn success(records: Vec<StatusRecord>) -> Self {
        Self { records, succeeded: true }
    }

    pub fn failure() -> Self {
        Self { records: Vec::new(), succeeded: false }
    }

    pub fn records(&self) -> &[StatusRecord] {
        &self.records
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }
}

/// Explicit, ordered list of mount points given as `a,b,c`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MountpointList(Vec<String>);

impl MountpointList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl FromStr for MountpointList {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = Vec::new();
        for item in s.split(',') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            if !item.starts_with('/') {
                return Err(format!("mount point {} must be an absolute path", item));
            }
            out.push(item.to_string());
        }
        Ok(MountpointList(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mountpoint_list_keeps_order_and_duplicates() {
        let list: MountpointList = "/var, /home,,/var".parse().expect("parse");
        assert_eq!(list.into_vec(), vec!["/var", "/home", "/var"]);
    }

    #[test]
    fn mountpoint_list_rejects_relative_paths() {
        assert!("/var,home".parse::<MountpointList>().is_err());
        assert!("".parse::<MountpointList>().expect("parse").is_empty());
    }

    #[test]
    fn failed_outcome_has_no_records() {
        let outcome = CollectionOutcome::failure();
        assert!(!outcome.succeeded());
        assert!(outcome.records().is_empty());
        assert_eq!(WriteMode::default().as_str(), "");
    }
}
