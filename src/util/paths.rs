use std::path::{Path, PathBuf};

/// Alternate filesystem root under which the mount tables are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootPrefix(PathBuf);

impl Default for RootPrefix {
    fn default() -> Self {
        RootPrefix(PathBuf::from("/"))
    }
}

impl RootPrefix {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RootPrefix(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn is_real_root(&self) -> bool {
        self.0 == Path::new("/")
    }

    /// `<root>/<relative>`, e.g. `etc/fstab`.
    pub fn join(&self, relative: &str) -> PathBuf {
        self.0.join(relative.trim_start_matches('/'))
    }

    /// Maps a mount point seen under the root back to its logical path.
    /// The root itself maps to `/`; paths outside the root are left alone.
    pub fn strip(&self, mountpoint: &str) -> String {
        if self.is_real_root() {
            return mountpoint.to_string();
        }
        match Path::new(mountpoint).strip_prefix(&self.0) {
            Ok(rest) if rest.as_os_str().is_empty() => "/".to_string(),
            Ok(rest) => format!("/{}", rest.display()),
            Err(_) => mountpoint.to_string(),
        }
    }
}

/// Decodes the `\ooo` octal escapes used by fstab and /proc/mounts for
/// whitespace and backslashes inside a field.
pub fn unescape_octal(field: &str) -> String {
    if !field.contains('\\') {
        return field.to_string();
    }
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() && is_octal_triplet(&bytes[i + 1..i + 4]) {
            let value = (bytes[i + 1] - b'0') as u32 * 64
                + (bytes[i + 2] - b'0') as u32 * 8
                + (bytes[i + 3] - b'0') as u32;
            if let Ok(byte) = u8::try_from(value) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn is_octal_triplet(digits: &[u8]) -> bool {
    digits.len() == 3 && digits.iter().all(|d| (b'0'..=b'7').contains(d))
}
