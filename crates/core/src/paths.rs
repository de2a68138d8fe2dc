//! Path helpers for build contexts and bind mounts

use std::path::{Path, PathBuf};

/// Resolve `path` against the current working directory without touching the
/// file system beyond reading the working directory.
pub fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    std::path::absolute(path)
}

/// Compute `target` relative to `base`.
///
/// Both paths are made absolute first so that a relative context and a
/// relative build file resolve against the same directory. Returns `None` when
/// no relative path exists (e.g. different drive prefixes on Windows).
pub fn relative_to(base: &Path, target: &Path) -> Option<PathBuf> {
    let base = absolute(base).ok()?;
    let target = absolute(target).ok()?;
    pathdiff::diff_paths(target, base)
}

/// Render a path with forward slashes regardless of host conventions
pub fn to_slash(path: &Path) -> String {
    let rendered = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '\\' {
        rendered.replace('\\', "/")
    } else {
        rendered.into_owned()
    }
}
