use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::ExclusionFilters;
use crate::error::TableError;
use crate::util::paths::unescape_octal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FstabEntry {
    pub source: String,
    pub mountpoint: String,
    pub fs_type: String,
    pub options: Vec<String>,
    pub dump: u32,
    pub pass: u32,
}

/// Reads the static table and returns the mount points that survive the
/// exclusion filters, in file order.
pub fn watch_list_from_fstab(path: &Path, filters: &ExclusionFilters) -> Result<Vec<String>, TableError> {
    let entries = read_fstab(path)?;
    let mut mountpoints = Vec::new();
    for entry in entries {
        if filters.excludes(&entry.mountpoint, &entry.fs_type) {
            debug!("ignoring mount point {}", entry.mountpoint);
            continue;
        }
        mountpoints.push(entry.mountpoint);
    }
    Ok(mountpoints)
}

pub fn read_fstab(path: &Path) -> Result<Vec<FstabEntry>, TableError> {
    let meta = fs::metadata(path).map_err(|e| TableError::unavailable(path, e.to_string()))?;
    if !meta.is_file() {
        return Err(TableError::unavailable(path, "not a regular file"));
    }
    let raw = fs::read(path).map_err(|e| TableError::unavailable(path, e.to_string()))?;
    parse_fstab(path, &String::from_utf8_lossy(&raw))
}

pub fn parse_fstab(path: &Path, contents: &str) -> Result<Vec<FstabEntry>, TableError> {
    let mut entries = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let entry = parse_line(trimmed).map_err(|reason| TableError::parse(path, idx + 1, reason))?;
        entries.push(entry);
    }
    Ok(entries)
}

fn parse_line(line: &str) -> Result<FstabEntry, String> {
    // A field starting with '#' comments out the rest of the line; fields
    // past the pass number are ignored.
    let fields: Vec<&str> = line
        .split_whitespace()
        .take_while(|field| !field.starts_with('#'))
        .take(6)
        .collect();
    if fields.len() < 3 {
        return Err(format!("expected at least 3 fields, found {}", fields.len()));
    }
    let options = fields
        .get(3)
        .map(|opts| opts.split(',').map(str::to_string).collect())
        .unwrap_or_default();
    Ok(FstabEntry {
        source: unescape_octal(fields[0]),
        mountpoint: unescape_octal(fields[1]),
        fs_type: fields[2].to_string(),
        options,
        dump: parse_number("dump", fields.get(4))?,
        pass: parse_number("pass", fields.get(5))?,
    })
}

fn parse_number(name: &str, field: Option<&&str>) -> Result<u32, String> {
    match field {
        None => Ok(0),
        Some(value) => value
            .parse::<u32>()
            .map_err(|_| format!("{} field {} is not a number", name, value)),
    }
}
