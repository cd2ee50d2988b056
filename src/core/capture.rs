//! Capture session loop
//!
//! Drives repeated single-shot captures over one connection. The session is
//! a lazy iterator: finite when `max_exposures` is nonzero, unbounded
//! otherwise. A failed capture is recorded and the loop continues — a
//! dropped frame in an unattended multi-hour session must not end the
//! session. The inter-exposure delay is the only suspension point and is
//! interruptible through a shared cancel token.

use crate::core::connection::Connection;
use crate::core::settings::Settings;
use crate::device::traits::CameraTransport;
use chrono::Local;
use log::{debug, error, info};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Result of one capture attempt, immutable once produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResult {
    /// Whether the exposure completed and produced a file
    pub success: bool,
    /// File name on the camera storage
    pub file_name: Option<String>,
    /// Folder path on the camera storage
    pub file_path: Option<String>,
    /// Failure detail when `success` is false
    pub error_message: Option<String>,
}

/// Cooperative cancellation signal shared between the session, the Ctrl+C
/// handler and the stop-request watcher.
///
/// Built on a condvar so a waiting session is woken promptly instead of
/// sleeping out the full inter-exposure delay.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation and wake any waiter
    pub fn cancel(&self) {
        let (lock, cvar) = &*self.inner;
        let mut cancelled = lock.lock().expect("cancel token lock poisoned");
        *cancelled = true;
        cvar.notify_all();
    }

    /// Whether cancellation has been signalled
    pub fn is_cancelled(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().expect("cancel token lock poisoned")
    }

    /// Wait up to `timeout`, returning early if cancelled.
    ///
    /// Returns true when cancellation was observed.
    pub fn wait(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut cancelled = lock.lock().expect("cancel token lock poisoned");
        let deadline = std::time::Instant::now() + timeout;
        while !*cancelled {
            let now = std::time::Instant::now();
            if now >= deadline {
                break;
            }
            let (guard, _) = cvar
                .wait_timeout(cancelled, deadline - now)
                .expect("cancel token lock poisoned");
            cancelled = guard;
        }
        *cancelled
    }
}

/// Lazy sequence of capture attempts over one connection.
///
/// Restartable only by constructing a new session.
pub struct CaptureSession<'a, T: CameraTransport> {
    connection: &'a mut Connection<T>,
    settings: Settings,
    cancel: CancelToken,
    filename_pattern: String,
    timestamp_format: String,
    captured: u32,
    finished: bool,
}

impl<'a, T: CameraTransport> CaptureSession<'a, T> {
    pub fn new(
        connection: &'a mut Connection<T>,
        settings: Settings,
        cancel: CancelToken,
        filename_pattern: &str,
        timestamp_format: &str,
    ) -> Self {
        Self {
            connection,
            settings,
            cancel,
            filename_pattern: filename_pattern.to_string(),
            timestamp_format: timestamp_format.to_string(),
            captured: 0,
            finished: false,
        }
    }

    /// Number of attempts issued so far
    pub fn captured(&self) -> u32 {
        self.captured
    }

    fn count_reached(&self) -> bool {
        self.settings.max_exposures > 0 && self.captured >= self.settings.max_exposures
    }
}

impl<T: CameraTransport> Iterator for CaptureSession<'_, T> {
    type Item = CaptureResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.count_reached() {
            return None;
        }
        // Checked before starting a capture; an in-flight capture is
        // allowed to run to completion.
        if self.cancel.is_cancelled() {
            info!("Capture session cancelled after {} exposures", self.captured);
            self.finished = true;
            return None;
        }

        let name = frame_name(&self.filename_pattern, &self.timestamp_format);
        let result = match self.connection.capture_frame(Some(&name)) {
            Ok(frame) => {
                debug!("Captured {} in {}", frame.file_name, frame.file_path);
                CaptureResult {
                    success: true,
                    file_name: Some(frame.file_name),
                    file_path: Some(frame.file_path),
                    error_message: None,
                }
            }
            Err(e) => {
                error!("Capture attempt {} failed: {}", self.captured + 1, e);
                CaptureResult {
                    success: false,
                    file_name: None,
                    file_path: None,
                    error_message: Some(e.to_string()),
                }
            }
        };
        self.captured += 1;

        if !self.count_reached() && self.settings.delay > 0.0 {
            let delay = Duration::from_secs_f64(self.settings.delay);
            if self.cancel.wait(delay) {
                self.finished = true;
            }
        }

        Some(result)
    }
}

/// Render a suggested frame name from the pattern, substituting
/// `{timestamp}` with the current local time in the given layout.
pub fn frame_name(pattern: &str, timestamp_format: &str) -> String {
    let timestamp = Local::now()
        .format(&to_chrono_format(timestamp_format))
        .to_string();
    pattern.replace("{timestamp}", &timestamp)
}

/// Translate the human-oriented layout persisted in templates
/// ("YYYY-MM-DD_HH:MM:SS") into chrono format specifiers. The first `MM` is
/// the month; any later one is minutes.
fn to_chrono_format(layout: &str) -> String {
    let mut format = layout
        .replace("YYYY", "%Y")
        .replace("DD", "%d")
        .replace("HH", "%H")
        .replace("SS", "%S");
    format = format.replacen("MM", "%m", 1);
    format.replace("MM", "%M")
}
