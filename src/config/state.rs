// Application state module
// Immutable state shared by every connection of one server instance

use std::path::PathBuf;

use super::types::Config;
use crate::error::ServeError;

/// Application state
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    /// Canonical form of `config.server.root_directory`
    pub root: PathBuf,
}

impl AppState {
    /// Resolve the served root and capture the configuration.
    ///
    /// Fails when the root directory does not exist or is not a directory.
    pub fn new(config: &Config) -> Result<Self, ServeError> {
        let configured = &config.server.root_directory;
        let root = configured
            .canonicalize()
            .map_err(|source| ServeError::RootDirectory {
                path: configured.clone(),
                source,
            })?;

        if !root.is_dir() {
            return Err(ServeError::RootDirectory {
                path: configured.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "not a directory",
                ),
            });
        }

        Ok(Self {
            config: config.clone(),
            root,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_canonicalized() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::defaults().unwrap();
        cfg.server.root_directory = dir.path().join(".");
        let state = AppState::new(&cfg).unwrap();
        assert_eq!(state.root, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_missing_root_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::defaults().unwrap();
        cfg.server.root_directory = dir.path().join("missing");
        assert!(matches!(
            AppState::new(&cfg),
            Err(ServeError::RootDirectory { .. })
        ));
    }

    #[test]
    fn test_file_root_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut cfg = Config::defaults().unwrap();
        cfg.server.root_directory = file.path().to_path_buf();
        assert!(matches!(
            AppState::new(&cfg),
            Err(ServeError::RootDirectory { .. })
        ));
    }
}
