//! Request path resolution
//!
//! Turns a request target into a location under the root directory. Parent
//! segments are normalized lexically and may never climb above the root.

use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};

/// Where a request path points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileTarget {
    /// Candidate location under the root; it may or may not exist
    Within(PathBuf),
    /// Path escapes the root or cannot name a file
    Outside,
}

/// Drop the query string (and fragment, if a client sent one)
pub fn strip_query(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// Resolve a request path against `root`
///
/// `/` maps to the root document. Empty and `.` segments are skipped; `..`
/// removes the previous segment and yields [`FileTarget::Outside`] when there
/// is nothing left to remove.
pub fn resolve(root: &Path, index_file: &str, request_path: &str) -> FileTarget {
    let path = match strip_query(request_path) {
        "" | "/" => return FileTarget::Within(root.join(index_file)),
        p => p,
    };

    let Ok(decoded) = percent_decode_str(path).decode_utf8() else {
        return FileTarget::Outside;
    };

    let mut relative = PathBuf::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if !relative.pop() {
                    return FileTarget::Outside;
                }
            }
            s if is_plain_segment(s) => relative.push(s),
            _ => return FileTarget::Outside,
        }
    }

    FileTarget::Within(root.join(relative))
}

/// A segment that the platform reads as exactly one normal file name
fn is_plain_segment(segment: &str) -> bool {
    if segment.contains('\0') {
        return false;
    }
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
