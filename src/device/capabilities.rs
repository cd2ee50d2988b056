//! Capability discovery
//!
//! Queries a connected camera for the legal value sets of each axis.
//! Real cameras vary in which properties they expose, so a failed or
//! unsupported query on one axis must not abort discovery: each axis falls
//! back to a fixed default set independently and the query as a whole never
//! fails.

use crate::device::traits::{Axis, CameraHandle};
use log::{debug, warn};

/// Fallback exposure times in seconds, ascending
pub const DEFAULT_EXPOSURES: &[f64] = &[0.5, 1.0, 2.0, 4.0, 8.0, 15.0, 30.0];

/// Fallback aperture f-numbers, ascending
pub const DEFAULT_APERTURES: &[f64] = &[1.4, 2.0, 2.8, 4.0, 5.6, 8.0, 11.0, 16.0];

/// Fallback ISO labels in canonical order
pub const DEFAULT_ISO_VALUES: &[&str] =
    &["auto", "100", "200", "400", "800", "1600", "3200", "6400"];

/// Legal value sets reported by (or substituted for) a connected camera.
///
/// Immutable once queried; one instance per connection lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCapabilities {
    /// Legal exposure times in seconds, ascending
    pub exposure_times: Vec<f64>,
    /// Legal aperture f-numbers, ascending
    pub apertures: Vec<f64>,
    /// Legal ISO labels, driver order preserved
    pub iso_values: Vec<String>,
    /// Whether the camera exposes a live view feed
    pub has_live_view: bool,
    /// Whether a raw "bulb" shutter choice was reported
    pub supports_bulb_mode: bool,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            exposure_times: DEFAULT_EXPOSURES.to_vec(),
            apertures: DEFAULT_APERTURES.to_vec(),
            iso_values: DEFAULT_ISO_VALUES.iter().map(|s| (*s).to_string()).collect(),
            has_live_view: true,
            supports_bulb_mode: false,
        }
    }
}

/// Query a camera handle for its capabilities.
///
/// Never fails: any per-axis error is logged and replaced with that axis's
/// default set.
pub fn query<H: CameraHandle>(handle: &mut H) -> DeviceCapabilities {
    let mut supports_bulb_mode = false;

    let exposure_times = match handle.legal_values(Axis::Exposure) {
        Ok(choices) => {
            supports_bulb_mode = choices.iter().any(|c| c.eq_ignore_ascii_case("bulb"));
            let mut parsed: Vec<f64> =
                choices.iter().filter_map(|c| parse_exposure_choice(c)).collect();
            parsed.sort_by(f64::total_cmp);
            parsed
        }
        Err(e) => {
            warn!("Could not query exposure times, using defaults: {}", e);
            DEFAULT_EXPOSURES.to_vec()
        }
    };

    let apertures = match handle.legal_values(Axis::Aperture) {
        Ok(choices) => {
            let mut parsed: Vec<f64> =
                choices.iter().filter_map(|c| parse_aperture_choice(c)).collect();
            parsed.sort_by(f64::total_cmp);
            parsed
        }
        Err(e) => {
            warn!("Could not query apertures, using defaults: {}", e);
            DEFAULT_APERTURES.to_vec()
        }
    };

    let iso_values = match handle.legal_values(Axis::Iso) {
        Ok(choices) => choices,
        Err(e) => {
            warn!("Could not query ISO values, using defaults: {}", e);
            DEFAULT_ISO_VALUES.iter().map(|s| (*s).to_string()).collect()
        }
    };

    debug!(
        "Camera capabilities: {} exposure times, {} apertures, {} ISO values",
        exposure_times.len(),
        apertures.len(),
        iso_values.len()
    );

    DeviceCapabilities {
        exposure_times,
        apertures,
        iso_values,
        has_live_view: true,
        supports_bulb_mode,
    }
}

/// Parse a raw shutter speed choice like "8s" or "0.5s" into seconds.
///
/// Choices without a trailing `s` (e.g. "bulb") are skipped.
pub fn parse_exposure_choice(choice: &str) -> Option<f64> {
    let trimmed = choice.trim();
    let value = trimmed.strip_suffix('s')?;
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a raw aperture choice like "f/1.4" into an f-number
pub fn parse_aperture_choice(choice: &str) -> Option<f64> {
    let trimmed = choice.trim();
    let value = trimmed.strip_prefix("f/")?;
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::{MockCameraConfig, MockTransport};
    use crate::device::traits::CameraTransport;

    #[test]
    fn test_parse_exposure_choice() {
        assert_eq!(parse_exposure_choice("8s"), Some(8.0));
        assert_eq!(parse_exposure_choice("0.5s"), Some(0.5));
        assert_eq!(parse_exposure_choice(" 15s "), Some(15.0));
        assert_eq!(parse_exposure_choice("bulb"), None);
        assert_eq!(parse_exposure_choice("1/125"), None);
    }

    #[test]
    fn test_parse_aperture_choice() {
        assert_eq!(parse_aperture_choice("f/1.4"), Some(1.4));
        assert_eq!(parse_aperture_choice("f/11"), Some(11.0));
        assert_eq!(parse_aperture_choice("2.8"), None);
    }

    #[test]
    fn test_query_parses_and_sorts_choices() {
        let config = MockCameraConfig::default()
            .with_legal_values(Axis::Exposure, &["30s", "8s", "bulb", "1s"])
            .with_legal_values(Axis::Aperture, &["f/5.6", "f/1.4", "f/2.8"])
            .with_legal_values(Axis::Iso, &["auto", "100", "6400"]);
        let transport = MockTransport::new(config);
        let mut handle = transport.open("usb:001,004").unwrap();

        let caps = query(&mut handle);
        assert_eq!(caps.exposure_times, vec![1.0, 8.0, 30.0]);
        assert_eq!(caps.apertures, vec![1.4, 2.8, 5.6]);
        assert_eq!(caps.iso_values, vec!["auto", "100", "6400"]);
        assert!(caps.supports_bulb_mode);
    }

    #[test]
    fn test_query_failure_isolated_per_axis() {
        // Exposure query fails, the other axes answer: only the exposure
        // axis falls back to defaults.
        let config = MockCameraConfig::default()
            .with_failing_query(Axis::Exposure)
            .with_legal_values(Axis::Aperture, &["f/2.8", "f/4"])
            .with_legal_values(Axis::Iso, &["auto", "800"]);
        let transport = MockTransport::new(config);
        let mut handle = transport.open("usb:001,004").unwrap();

        let caps = query(&mut handle);
        assert_eq!(caps.exposure_times, DEFAULT_EXPOSURES.to_vec());
        assert_eq!(caps.apertures, vec![2.8, 4.0]);
        assert_eq!(caps.iso_values, vec!["auto", "800"]);
        assert!(!caps.supports_bulb_mode);
    }

    #[test]
    fn test_query_all_axes_failing_yields_full_defaults() {
        let config = MockCameraConfig::default()
            .with_failing_query(Axis::Exposure)
            .with_failing_query(Axis::Aperture)
            .with_failing_query(Axis::Iso);
        let transport = MockTransport::new(config);
        let mut handle = transport.open("usb:001,004").unwrap();

        let caps = query(&mut handle);
        assert_eq!(caps, DeviceCapabilities::default());
    }
}
