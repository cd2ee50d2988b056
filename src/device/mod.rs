//! Camera transport layer
//!
//! A trait-based abstraction over the tethering driver so the connection
//! and capture pipeline can run against the real `gphoto2` binary or a
//! scriptable mock. The mock ships in the library so capability, connection
//! and session behavior are testable without hardware.
//!
//! # Submodules
//!
//! - `traits` - transport and handle abstractions
//! - `capabilities` - per-axis capability discovery with fallbacks
//! - `gphoto` - transport driving the `gphoto2` binary
//! - `mock` - scriptable mock transport for tests

pub mod capabilities;
pub mod gphoto;
pub mod mock;
pub mod traits;

// Re-export commonly used types for convenience
pub use capabilities::DeviceCapabilities;
pub use gphoto::GPhotoTransport;
pub use traits::{Axis, CameraHandle, CameraTransport, CapturedFrame, PortInfo};
