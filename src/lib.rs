//! Skycam Library
//!
//! Tethered DSLR control for unattended long-exposure astrophotography
//! sessions: detect a camera, reconcile the requested exposure/aperture/ISO
//! against what the camera actually supports, configure it, and run a
//! bounded or unbounded capture loop with a cancellable inter-exposure
//! delay.
//!
//! # Architecture
//!
//! - [`core`] - settings layering and reconciliation, the connection state
//!   machine, the capture loop, error types, and the persisted
//!   config/template/runtime records
//! - [`device`] - transport abstraction over the tethering driver, with a
//!   `gphoto2` binary backend and a scriptable mock
//! - [`cli`] - command-line interface (only used by the binary)
//!
//! # Example
//!
//! ```rust,no_run
//! use skycam::core::capture::{CancelToken, CaptureSession};
//! use skycam::core::connection::with_camera;
//! use skycam::core::reconcile::reconcile;
//! use skycam::core::settings::Settings;
//! use skycam::device::GPhotoTransport;
//!
//! fn main() -> anyhow::Result<()> {
//!     let transport = GPhotoTransport::locate()
//!         .ok_or_else(|| anyhow::anyhow!("gphoto2 not installed"))?;
//!
//!     let requested = Settings {
//!         exposure: 15.0,
//!         max_exposures: 10,
//!         ..Settings::default()
//!     };
//!
//!     with_camera(&transport, None, |connection| {
//!         let (settings, warnings) = reconcile(&requested, connection.capabilities());
//!         for warning in &warnings {
//!             eprintln!("{}", warning);
//!         }
//!         connection.configure(&settings);
//!
//!         let session = CaptureSession::new(
//!             connection,
//!             settings,
//!             CancelToken::new(),
//!             "SkyImage-{timestamp}",
//!             "YYYY-MM-DD_HH:MM:SS",
//!         );
//!         for result in session {
//!             println!("{:?}", result);
//!         }
//!         Ok(())
//!     })?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod core;
pub mod device;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
