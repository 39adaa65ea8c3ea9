use crate::VfsError;

/// Normalize a provider-relative path.
///
/// - Replaces backslashes with forward slashes
/// - Collapses redundant separators (`a///b` → `a/b`)
/// - Drops `.` segments
/// - Rejects `..` segments (path traversal not allowed)
/// - Strips leading and trailing slashes
///
/// An input with no segments left normalizes to `""`, the provider root.
pub fn normalize(path: &str) -> Result<String, VfsError> {
    let replaced = path.replace('\\', "/");
    let mut segments = Vec::new();

    for segment in replaced.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment == ".." {
            return Err(VfsError::InvalidPath(format!(
                "path traversal (..) not allowed: {path}"
            )));
        }
        segments.push(segment);
    }

    Ok(segments.join("/"))
}

/// Join a child name onto a normalized parent path.
///
/// Joining onto the root (`""`) yields the child name unchanged.
pub fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_owned()
    } else {
        format!("{parent}/{child}")
    }
}
