// src/infrastructure/session_storage.rs
//
// Persisted auth session
//
// CRITICAL RULES:
// - At most one session file per data directory
// - A corrupt file is treated as "no session" and removed
// - Clearing a missing file is not an error

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::AuthSession;
use crate::error::{AppError, AppResult};

const APP_DIR: &str = "streamhub";
const SESSION_FILE: &str = "session.json";

/// Keeps the signed-in session across restarts
#[derive(Debug, Clone)]
pub struct SessionStorage {
    path: PathBuf,
}

impl SessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/streamhub/session.json`
    pub fn default_location() -> AppResult<Self> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| AppError::Config("No data directory on this platform".to_string()))?;
        Ok(Self::new(data_dir.join(APP_DIR).join(SESSION_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> AppResult<Option<AuthSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)?;
        match serde_json::from_str::<AuthSession>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                log::warn!(
                    "discarding unreadable session file {}: {}",
                    self.path.display(),
                    e
                );
                self.clear()?;
                Ok(None)
            }
        }
    }

    pub fn save(&self, session: &AuthSession) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn clear(&self) -> AppResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}
