//! Executable resolution against the `PATH` search list.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use nix::unistd::{access, AccessFlags};

fn is_executable_file(path: &Path) -> bool {
    if access(path, AccessFlags::X_OK).is_err() {
        return false;
    }
    // X_OK alone would accept directories.
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// Turns a command name into a runnable path. The name as given wins if it
/// already names an executable file; otherwise each `PATH` prefix is tried
/// in order.
pub fn resolve(name: &str) -> Option<PathBuf> {
    let direct = PathBuf::from(name);
    if is_executable_file(&direct) {
        return Some(direct);
    }
    let path_list = env::var_os("PATH")?;
    for prefix in env::split_paths(&path_list) {
        let candidate = prefix.join(name);
        if is_executable_file(&candidate) {
            return Some(candidate);
        }
    }
    None
}
