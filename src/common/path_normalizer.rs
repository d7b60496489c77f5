//! Path normalization for repository-relative paths
//!
//! Nested repository locations are used as map keys, so two spellings of the
//! same physical layout (`./vendor/lib/`, `vendor\lib`, `vendor/x/../lib`) must
//! collapse to one canonical form: forward slashes, no `.` segments, no
//! trailing separator, never escaping the repository root.

/// Normalize a repository-relative path lexically.
///
/// Returns `None` if the path escapes the repository root via `..` or is
/// absolute. The repository root itself normalizes to the empty string.
pub fn normalize_relative_path(path: &str) -> Option<String> {
    let unified = path.replace('\\', "/");
    if unified.starts_with('/') || has_drive_prefix(&unified) {
        return None;
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    Some(segments.join("/"))
}

/// Join a parent repository-relative path and a child path, normalizing both.
pub fn join_relative(parent: &str, child: &str) -> Option<String> {
    if parent.is_empty() {
        normalize_relative_path(child)
    } else {
        normalize_relative_path(&format!("{parent}/{child}"))
    }
}

/// Whether `path` lies at or below `ancestor` (both already normalized).
pub fn is_within(path: &str, ancestor: &str) -> bool {
    ancestor.is_empty()
        || path == ancestor
        || path
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
