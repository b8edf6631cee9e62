//! `PATH`-style executable lookup.

use std::path::{Path, PathBuf};

use crate::dispatch::{PathResolver, ResolveError};

/// Resolves command names against an ordered list of directories.
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Parse a colon-separated directory list. Empty entries are skipped.
    pub fn new(path_var: &str) -> Self {
        Self {
            dirs: path_var
                .split(':')
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from)
                .collect(),
        }
    }

    /// Use the process's `PATH`.
    pub fn from_env() -> Self {
        Self::new(&std::env::var("PATH").unwrap_or_default())
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl PathResolver for SearchPath {
    fn search(&self, name: &str) -> Result<PathBuf, ResolveError> {
        if name.contains('/') {
            let path = Path::new(name);
            return if is_executable(path) {
                Ok(path.to_path_buf())
            } else {
                Err(ResolveError::NotFound(name.to_string()))
            };
        }
        self.dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| is_executable(candidate))
            .ok_or_else(|| ResolveError::NotFound(name.to_string()))
    }
}

fn is_executable(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        true
    }
}
