//! Session runtime records
//!
//! Backs the `status` and `stop` commands across processes: a running
//! session writes a small JSON status file under the config directory and
//! honors a stop-request marker. The running session polls the marker with
//! bounded latency and cancels its token when it appears.

use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const STATUS_FILE: &str = "session.json";
const STOP_FILE: &str = "stop.request";

/// Stop request addressed to every session
const STOP_ANY: &str = "*";

/// Snapshot of a running (or last) capture session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Unique session identifier
    pub session_id: String,
    /// Process id of the session owner
    pub pid: u32,
    /// Connection state label at the time of writing
    pub state: String,
    /// RFC 3339 start time
    pub started_at: String,
    /// Capture attempts issued so far
    pub frames_captured: u32,
    /// Template the session was started from, if any
    pub template: Option<String>,
}

impl SessionStatus {
    pub fn new(session_id: &str, state: &str, template: Option<&str>) -> Self {
        Self {
            session_id: session_id.to_string(),
            pid: std::process::id(),
            state: state.to_string(),
            started_at: chrono::Local::now().to_rfc3339(),
            frames_captured: 0,
            template: template.map(String::from),
        }
    }
}

/// File-based registry for session status and stop requests
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    dir: PathBuf,
}

impl SessionRegistry {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn status_path(&self) -> PathBuf {
        self.dir.join(STATUS_FILE)
    }

    fn stop_path(&self) -> PathBuf {
        self.dir.join(STOP_FILE)
    }

    /// Persist the current session snapshot
    pub fn write(&self, status: &SessionStatus) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(status)
            .map_err(|e| crate::core::error::SkycamError::ConfigInvalid(e.to_string()))?;
        fs::write(self.status_path(), content)?;
        Ok(())
    }

    /// Read the last written snapshot, if any.
    ///
    /// A malformed status file is treated as absent; it is advisory state,
    /// not user data.
    pub fn read(&self) -> Option<SessionStatus> {
        let content = fs::read_to_string(self.status_path()).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Remove the session snapshot (on clean shutdown)
    pub fn clear(&self) -> Result<()> {
        let path = self.status_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Ask a session to stop. Without an id the request addresses whichever
    /// session is running.
    pub fn request_stop(&self, session_id: Option<&str>) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.stop_path(), session_id.unwrap_or(STOP_ANY))?;
        Ok(())
    }

    /// Whether a pending stop request addresses the given session
    pub fn stop_requested(&self, session_id: &str) -> bool {
        match fs::read_to_string(self.stop_path()) {
            Ok(content) => {
                let target = content.trim();
                target == STOP_ANY || target == session_id
            }
            Err(_) => false,
        }
    }

    /// Remove any pending stop request
    pub fn clear_stop(&self) -> Result<()> {
        let path = self.stop_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_status_round_trip_and_clear() {
        let dir = TempDir::new().unwrap();
        let registry = SessionRegistry::new(dir.path());
        assert!(registry.read().is_none());

        let mut status = SessionStatus::new("session-42", "capturing", Some("default"));
        status.frames_captured = 7;
        registry.write(&status).unwrap();
        assert_eq!(registry.read(), Some(status));

        registry.clear().unwrap();
        assert!(registry.read().is_none());
    }

    #[test]
    fn test_stop_request_matches_id_or_wildcard() {
        let dir = TempDir::new().unwrap();
        let registry = SessionRegistry::new(dir.path());
        assert!(!registry.stop_requested("session-42"));

        registry.request_stop(Some("session-42")).unwrap();
        assert!(registry.stop_requested("session-42"));
        assert!(!registry.stop_requested("session-43"));

        registry.request_stop(None).unwrap();
        assert!(registry.stop_requested("session-43"));

        registry.clear_stop().unwrap();
        assert!(!registry.stop_requested("session-42"));
    }

    #[test]
    fn test_malformed_status_file_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let registry = SessionRegistry::new(dir.path());
        std::fs::write(dir.path().join("session.json"), "{ not json").unwrap();
        assert!(registry.read().is_none());
    }
}
