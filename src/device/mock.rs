//! Mock camera transport for testing without a real camera
//!
//! Simulates a tethered camera with configurable legal value sets and
//! failure injection. The recorded state (applied settings, capture count,
//! close count) is shared behind an `Arc` so tests can inspect it after a
//! session finishes.

use crate::core::error::{Result, SkycamError};
use crate::device::traits::{Axis, CameraHandle, CameraTransport, CapturedFrame, PortInfo};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Configuration for mock camera behavior
#[derive(Debug, Clone)]
pub struct MockCameraConfig {
    /// Cameras reported by `detect`
    pub ports: Vec<PortInfo>,
    /// Simulate `open` failing for every port
    pub fail_open: bool,
    /// Legal raw choices per axis
    pub legal_values: HashMap<Axis, Vec<String>>,
    /// Axes whose `legal_values` query fails
    pub failing_queries: HashSet<Axis>,
    /// Axes whose `set_value` fails
    pub failing_sets: HashSet<Axis>,
    /// 1-based capture attempts that fail
    pub failing_captures: HashSet<u32>,
}

impl Default for MockCameraConfig {
    fn default() -> Self {
        let mut legal_values = HashMap::new();
        legal_values.insert(
            Axis::Exposure,
            vec!["0.5s", "1s", "2s", "4s", "8s", "15s", "30s"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        legal_values.insert(
            Axis::Aperture,
            vec!["f/1.4", "f/2", "f/2.8", "f/4", "f/5.6"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        legal_values.insert(
            Axis::Iso,
            vec!["auto", "100", "200", "400", "800", "1600"]
                .into_iter()
                .map(String::from)
                .collect(),
        );
        legal_values.insert(
            Axis::Quality,
            vec!["raw", "fine", "normal"].into_iter().map(String::from).collect(),
        );
        Self {
            ports: vec![PortInfo::new("usb:001,004", "Canon EOS R6")],
            fail_open: false,
            legal_values,
            failing_queries: HashSet::new(),
            failing_sets: HashSet::new(),
            failing_captures: HashSet::new(),
        }
    }
}

impl MockCameraConfig {
    /// No cameras on the transport
    pub fn no_cameras() -> Self {
        Self {
            ports: Vec::new(),
            ..Self::default()
        }
    }

    /// Replace the legal raw choices for one axis
    pub fn with_legal_values(mut self, axis: Axis, choices: &[&str]) -> Self {
        self.legal_values
            .insert(axis, choices.iter().map(|c| (*c).to_string()).collect());
        self
    }

    /// Make the capability query for one axis fail
    pub fn with_failing_query(mut self, axis: Axis) -> Self {
        self.failing_queries.insert(axis);
        self
    }

    /// Make `set_value` fail for one axis
    pub fn with_failing_set(mut self, axis: Axis) -> Self {
        self.failing_sets.insert(axis);
        self
    }

    /// Make the n-th capture attempt fail (1-based)
    pub fn with_failing_capture(mut self, attempt: u32) -> Self {
        self.failing_captures.insert(attempt);
        self
    }

    /// Make every `open` call fail
    pub fn with_failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }
}

/// State recorded by a mock camera, shared with the owning transport
#[derive(Debug, Default)]
pub struct MockCameraState {
    /// Values applied via `set_value`, in order
    pub applied: Vec<(Axis, String)>,
    /// Number of capture attempts issued
    pub capture_attempts: u32,
    /// Number of `close` calls observed
    pub close_calls: u32,
    /// Suggested frame names passed to `capture`
    pub suggested_names: Vec<Option<String>>,
}

/// Mock transport producing [`MockCamera`] handles
#[derive(Debug, Clone)]
pub struct MockTransport {
    config: MockCameraConfig,
    state: Arc<Mutex<MockCameraState>>,
}

impl MockTransport {
    pub fn new(config: MockCameraConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(MockCameraState::default())),
        }
    }

    /// Shared recorded state for post-session assertions
    pub fn state(&self) -> Arc<Mutex<MockCameraState>> {
        Arc::clone(&self.state)
    }
}

impl CameraTransport for MockTransport {
    type Handle = MockCamera;

    fn detect(&self) -> Result<Vec<PortInfo>> {
        Ok(self.config.ports.clone())
    }

    fn open(&self, port: &str) -> Result<Self::Handle> {
        if self.config.fail_open {
            return Err(SkycamError::DeviceConnectionFailed {
                port: port.to_string(),
                message: "simulated open failure".to_string(),
            });
        }
        Ok(MockCamera {
            config: self.config.clone(),
            state: Arc::clone(&self.state),
        })
    }
}

/// Mock camera handle backed by shared recorded state
#[derive(Debug)]
pub struct MockCamera {
    config: MockCameraConfig,
    state: Arc<Mutex<MockCameraState>>,
}

impl CameraHandle for MockCamera {
    fn legal_values(&mut self, axis: Axis) -> Result<Vec<String>> {
        if self.config.failing_queries.contains(&axis) {
            return Err(SkycamError::Transport(format!(
                "property '{}' not supported",
                axis.property()
            )));
        }
        Ok(self.config.legal_values.get(&axis).cloned().unwrap_or_default())
    }

    fn set_value(&mut self, axis: Axis, value: &str) -> Result<()> {
        if self.config.failing_sets.contains(&axis) {
            return Err(SkycamError::Transport(format!(
                "device rejected {}={}",
                axis.property(),
                value
            )));
        }
        let mut state = self.state.lock().expect("mock state lock poisoned");
        state.applied.push((axis, value.to_string()));
        Ok(())
    }

    fn capture(&mut self, suggested_name: Option<&str>) -> Result<CapturedFrame> {
        let mut state = self.state.lock().expect("mock state lock poisoned");
        state.capture_attempts += 1;
        state.suggested_names.push(suggested_name.map(String::from));
        let attempt = state.capture_attempts;
        if self.config.failing_captures.contains(&attempt) {
            return Err(SkycamError::CaptureFailed(format!(
                "simulated failure on attempt {}",
                attempt
            )));
        }
        Ok(CapturedFrame {
            file_name: format!("IMG_{:04}.CR2", attempt),
            file_path: "/store_00010001/DCIM/100CANON".to_string(),
        })
    }

    fn close(&mut self) {
        let mut state = self.state.lock().expect("mock state lock poisoned");
        state.close_calls += 1;
    }
}
