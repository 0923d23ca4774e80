//! Lexical path helpers.

use std::path::{Component, Path, PathBuf};

/// Normalise `path` segment by segment without touching the filesystem.
///
/// `.` segments are dropped and `..` pops the previous normal segment; a `..` that
/// would climb above the root is discarded.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                ) {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push(component.as_os_str());
                }
            }
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                normalized.push(component.as_os_str());
            }
        }
    }
    normalized
}

/// Returns `true` when `path` equals `base` or lies beneath it, comparing whole segments.
#[must_use]
pub fn is_within(path: &Path, base: &Path) -> bool {
    normalize(path).starts_with(normalize(base))
}
