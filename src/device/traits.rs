//! Device abstraction traits for testability
//!
//! These traits abstract the tethering driver so that both the real
//! transport (the `gphoto2` binary) and mock cameras can be used
//! interchangeably. The connection state machine and capture session are
//! generic over them and never touch a concrete driver.
//!
//! The trait hierarchy is:
//! - `CameraTransport` - detects cameras and opens a handle on a port
//! - `CameraHandle` - one exclusive, connected camera

use crate::core::error::Result;
use std::fmt::{self, Display};

/// One configurable camera property.
///
/// Each axis maps to the driver property name the tethering protocol uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Shutter speed in seconds
    Exposure,
    /// Aperture f-number
    Aperture,
    /// ISO sensitivity label
    Iso,
    /// Image quality / file format
    Quality,
}

impl Axis {
    /// Driver property name for this axis
    pub fn property(&self) -> &'static str {
        match self {
            Axis::Exposure => "shutterspeed",
            Axis::Aperture => "f-number",
            Axis::Iso => "iso",
            Axis::Quality => "imagequality",
        }
    }

    /// Human-readable axis name for warnings and logs
    pub fn label(&self) -> &'static str {
        match self {
            Axis::Exposure => "exposure",
            Axis::Aperture => "aperture",
            Axis::Iso => "ISO",
            Axis::Quality => "image quality",
        }
    }
}

impl Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A detected camera: transport port plus display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Transport port identifier (e.g. "usb:001,004")
    pub port: String,
    /// Camera model name as reported by the driver
    pub display_name: String,
}

impl PortInfo {
    pub fn new(port: &str, display_name: &str) -> Self {
        Self {
            port: port.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

/// File identifier returned by a successful capture.
///
/// The file stays on the camera storage; this only names it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    /// File name (e.g. "IMG_0042.CR2")
    pub file_name: String,
    /// Folder path on the camera storage
    pub file_path: String,
}

/// Detects cameras and opens exclusive handles
pub trait CameraTransport {
    /// Handle type produced by `open`
    type Handle: CameraHandle;

    /// Probe the transport for available cameras
    fn detect(&self) -> Result<Vec<PortInfo>>;

    /// Open the camera on the given port
    fn open(&self, port: &str) -> Result<Self::Handle>;
}

/// One connected camera, owned exclusively by its connection
pub trait CameraHandle {
    /// Read the legal raw choices for one axis
    fn legal_values(&mut self, axis: Axis) -> Result<Vec<String>>;

    /// Apply one raw choice to one axis
    fn set_value(&mut self, axis: Axis, value: &str) -> Result<()>;

    /// Trigger a single exposure and return the resulting file identifier
    fn capture(&mut self, suggested_name: Option<&str>) -> Result<CapturedFrame>;

    /// Release the camera. Must be safe to call more than once.
    fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_property_names() {
        assert_eq!(Axis::Exposure.property(), "shutterspeed");
        assert_eq!(Axis::Aperture.property(), "f-number");
        assert_eq!(Axis::Iso.property(), "iso");
        assert_eq!(Axis::Quality.property(), "imagequality");
    }

    #[test]
    fn test_axis_display_uses_label() {
        assert_eq!(Axis::Aperture.to_string(), "aperture");
        assert_eq!(Axis::Iso.to_string(), "ISO");
    }
}
