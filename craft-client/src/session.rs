//! Session token storage
//!
//! Holds the bearer token for the running client and, when a path is
//! configured, keeps it in a file so a relaunch stays signed in.

use std::path::{Path, PathBuf};

use crate::ClientResult;

#[derive(Debug, Clone, Default)]
pub struct SessionService {
    path: Option<PathBuf>,
    token: Option<String>,
}

impl SessionService {
    /// In-memory session
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Session backed by `path`; an existing token file is loaded
    pub fn open(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref().to_path_buf();
        let token = match std::fs::read_to_string(&path) {
            Ok(text) => Some(text.trim().to_string()).filter(|t| !t.is_empty()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path: Some(path),
            token,
        })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn save(&mut self, token: impl Into<String>) -> ClientResult<()> {
        let token = token.into();
        if let Some(path) = &self.path {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            std::fs::write(path, &token)?;
        }
        self.token = Some(token);
        Ok(())
    }

    /// Sign out
    pub fn clear(&mut self) -> ClientResult<()> {
        self.token = None;
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
