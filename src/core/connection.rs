//! Connection state machine
//!
//! Governs the lifecycle of one exclusively-owned camera: detection →
//! connection → capability query → configuration → capture → disconnect.
//! Teardown is guaranteed on every exit path: `close` is idempotent and the
//! `Drop` impl calls it, so an early return or error can never leak the
//! camera handle.

use crate::core::error::{Result, SkycamError};
use crate::core::settings::Settings;
use crate::device::capabilities::{self, parse_aperture_choice, parse_exposure_choice, DeviceCapabilities};
use crate::device::traits::{Axis, CameraHandle, CameraTransport, CapturedFrame};
use log::{debug, info, warn};

/// Lifecycle state of a camera connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Detecting,
    Connecting,
    Connected,
    Configuring,
    Capturing,
    Disconnecting,
    Failed,
}

impl ConnectionState {
    /// Human-readable state name for status output
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Detecting => "detecting",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Configuring => "configuring",
            ConnectionState::Capturing => "capturing",
            ConnectionState::Disconnecting => "disconnecting",
            ConnectionState::Failed => "failed",
        }
    }
}

/// An open connection to exactly one camera
pub struct Connection<T: CameraTransport> {
    handle: Option<T::Handle>,
    state: ConnectionState,
    port: String,
    capabilities: DeviceCapabilities,
}

impl<T: CameraTransport> std::fmt::Debug for Connection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("state", &self.state)
            .field("port", &self.port)
            .field("capabilities", &self.capabilities)
            .field("handle", &self.handle.as_ref().map(|_| "..."))
            .finish()
    }
}

impl<T: CameraTransport> Connection<T> {
    /// Detect (when no port is given), open and query one camera.
    ///
    /// Zero detected cameras is `DeviceNotFound`; a port that fails to open
    /// is `DeviceConnectionFailed`. On any failure the partially-opened
    /// handle is torn down before the error is returned.
    pub fn open(transport: &T, port: Option<&str>) -> Result<Self> {
        let mut connection = Self {
            handle: None,
            state: ConnectionState::Disconnected,
            port: String::new(),
            capabilities: DeviceCapabilities::default(),
        };
        match connection.connect(transport, port) {
            Ok(()) => Ok(connection),
            Err(e) => {
                if let Some(mut handle) = connection.handle.take() {
                    handle.close();
                }
                connection.state = ConnectionState::Failed;
                Err(e)
            }
        }
    }

    fn connect(&mut self, transport: &T, port: Option<&str>) -> Result<()> {
        self.state = ConnectionState::Detecting;
        self.port = match port {
            Some(port) => port.to_string(),
            None => {
                debug!("No port specified, probing for cameras");
                let detected = transport.detect()?;
                let first = detected.first().ok_or(SkycamError::DeviceNotFound)?;
                info!(
                    "Auto-detected camera: {} on port {}",
                    first.display_name, first.port
                );
                first.port.clone()
            }
        };

        self.state = ConnectionState::Connecting;
        let mut handle = transport.open(&self.port)?;
        info!("Connected to camera on port: {}", self.port);

        // Capability discovery is infallible; per-axis failures fall back
        // to defaults inside the query.
        self.capabilities = capabilities::query(&mut handle);
        self.handle = Some(handle);
        self.state = ConnectionState::Connected;
        Ok(())
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Port this connection owns
    pub fn port(&self) -> &str {
        &self.port
    }

    /// Capability sets queried at connection time
    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    /// Apply settings to the camera, one axis at a time.
    ///
    /// Each axis is attempted independently: a camera may legitimately
    /// reject one property while accepting the others, so a failed axis is
    /// demoted to a warning instead of failing the connection.
    pub fn configure(&mut self, settings: &Settings) -> Vec<String> {
        self.state = ConnectionState::Configuring;
        let mut warnings = Vec::new();

        if let Err(e) = self.apply_numeric_axis(Axis::Exposure, settings.exposure) {
            warnings.push(format!("Could not set exposure: {}", e));
        }
        if let Err(e) = self.apply_numeric_axis(Axis::Aperture, settings.aperture) {
            warnings.push(format!("Could not set aperture: {}", e));
        }
        if settings.iso != "auto" {
            if let Err(e) = self.apply_raw(Axis::Iso, &settings.iso) {
                warnings.push(format!("Could not set ISO: {}", e));
            }
        }
        if let Err(e) = self.apply_raw(Axis::Quality, &settings.quality) {
            warnings.push(format!("Could not set image quality: {}", e));
        }

        self.state = ConnectionState::Connected;
        warnings
    }

    /// Set one axis to the raw choice whose parsed value is closest to the
    /// target, re-reading the driver's raw choices so the exact string the
    /// camera expects is sent back.
    fn apply_numeric_axis(&mut self, axis: Axis, target: f64) -> Result<()> {
        let handle = self.handle_mut()?;
        let choices = handle.legal_values(axis)?;

        let mut parsed: Vec<(f64, &str)> = choices
            .iter()
            .filter_map(|raw| {
                let value = match axis {
                    Axis::Exposure => parse_exposure_choice(raw),
                    _ => parse_aperture_choice(raw),
                };
                value.map(|v| (v, raw.as_str()))
            })
            .collect();
        // Ascending scan keeps distance ties on the lower value,
        // matching reconciliation
        parsed.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut best: Option<&str> = None;
        let mut best_diff = f64::INFINITY;
        for (value, raw) in &parsed {
            let diff = (value - target).abs();
            if diff < best_diff {
                best_diff = diff;
                best = Some(raw);
            }
        }
        let Some(raw) = best.map(str::to_string) else {
            return Err(SkycamError::Transport(format!(
                "no parsable choices for {}",
                axis.property()
            )));
        };

        debug!("Setting {} to '{}'", axis.property(), raw);
        self.handle_mut()?.set_value(axis, &raw)
    }

    fn apply_raw(&mut self, axis: Axis, value: &str) -> Result<()> {
        debug!("Setting {} to '{}'", axis.property(), value);
        self.handle_mut()?.set_value(axis, value)
    }

    /// Trigger one exposure
    pub fn capture_frame(&mut self, suggested_name: Option<&str>) -> Result<CapturedFrame> {
        self.state = ConnectionState::Capturing;
        let result = self.handle_mut()?.capture(suggested_name);
        self.state = ConnectionState::Connected;
        result
    }

    fn handle_mut(&mut self) -> Result<&mut T::Handle> {
        self.handle
            .as_mut()
            .ok_or_else(|| SkycamError::Transport("camera not connected".to_string()))
    }

    /// Release the camera. Safe to call more than once; runs at most one
    /// driver-level close.
    pub fn close(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            self.state = ConnectionState::Disconnecting;
            handle.close();
            self.state = ConnectionState::Disconnected;
            info!("Camera disconnected");
        }
    }
}

impl<T: CameraTransport> Drop for Connection<T> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Run `f` against an open connection, guaranteeing disconnect on normal
/// return, early return and error.
pub fn with_camera<T, R, F>(transport: &T, port: Option<&str>, f: F) -> Result<R>
where
    T: CameraTransport,
    F: FnOnce(&mut Connection<T>) -> Result<R>,
{
    let mut connection = Connection::open(transport, port)?;
    let result = f(&mut connection);
    connection.close();
    if result.is_err() {
        warn!("Session ended with an error; camera released");
    }
    result
}
