//! Shared path helpers: home directory lookup and `~` expansion.

use std::env;
use std::path::{Path, PathBuf};

/// The user's home directory, or `/tmp` when `HOME` is unset.
pub fn home_dir() -> PathBuf {
    env::var_os("HOME").map_or_else(
        || {
            tracing::warn!("HOME not set, falling back to /tmp for apptracker paths");
            PathBuf::from("/tmp")
        },
        PathBuf::from,
    )
}

/// Expand a leading `~` or `~/` against the home directory.
///
/// Paths such as `~other/logs` are returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    expand_home_with(path, &home_dir())
}

fn expand_home_with(path: &Path, home: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    if rest.as_os_str().is_empty() {
        home.to_path_buf()
    } else {
        home.join(rest)
    }
}
