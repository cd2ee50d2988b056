//! Settings reconciliation against camera capabilities
//!
//! Maps requested exposure/aperture values onto the nearest legal value the
//! camera reports, collecting a human-readable warning per adjusted axis.
//! ISO is only flagged, never substituted: reported ISO sets are often
//! incomplete or mis-detected, and a wrong substitution is worse than an
//! unsupported label the camera may well accept.

use crate::core::settings::Settings;
use crate::device::capabilities::DeviceCapabilities;

/// Values closer than this are considered equal
const FLOAT_TOLERANCE: f64 = 1e-9;

/// Reconcile requested settings against the capability sets.
///
/// Returns the adjusted settings and at most one warning per axis. Delay,
/// quality and max_exposures pass through untouched. An empty capability
/// set leaves its axis unchanged.
pub fn reconcile(
    requested: &Settings,
    capabilities: &DeviceCapabilities,
) -> (Settings, Vec<String>) {
    let mut adjusted = requested.clone();
    let mut warnings = Vec::new();

    if let Some(closest) = closest_value(&capabilities.exposure_times, requested.exposure) {
        if (closest - requested.exposure).abs() > FLOAT_TOLERANCE {
            warnings.push(format!(
                "Exposure adjusted from {} to {}",
                requested.exposure, closest
            ));
            adjusted.exposure = closest;
        }
    }

    if let Some(closest) = closest_value(&capabilities.apertures, requested.aperture) {
        if (closest - requested.aperture).abs() > FLOAT_TOLERANCE {
            warnings.push(format!(
                "Aperture adjusted from f/{} to f/{}",
                requested.aperture, closest
            ));
            adjusted.aperture = closest;
        }
    }

    let iso_supported = requested.iso == "auto"
        || capabilities.iso_values.iter().any(|v| v == &requested.iso);
    if !iso_supported {
        warnings.push(format!(
            "ISO value '{}' may not be supported",
            requested.iso
        ));
    }

    (adjusted, warnings)
}

/// The legal value minimizing absolute distance to `target`.
///
/// `values` is scanned in order with a strict improvement test, so in an
/// ascending set a distance tie always resolves to the lower value. Returns
/// `None` for an empty set.
pub fn closest_value(values: &[f64], target: f64) -> Option<f64> {
    let mut best: Option<f64> = None;
    let mut best_diff = f64::INFINITY;
    for &value in values {
        let diff = (value - target).abs();
        if diff < best_diff {
            best_diff = diff;
            best = Some(value);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(exposures: &[f64], apertures: &[f64], iso: &[&str]) -> DeviceCapabilities {
        DeviceCapabilities {
            exposure_times: exposures.to_vec(),
            apertures: apertures.to_vec(),
            iso_values: iso.iter().map(|s| (*s).to_string()).collect(),
            has_live_view: true,
            supports_bulb_mode: false,
        }
    }

    #[test]
    fn test_member_values_kept_without_warning() {
        let capabilities = caps(&[1.0, 2.0, 4.0, 8.0], &[1.4, 2.0, 2.8], &["auto", "800"]);
        let requested = Settings {
            exposure: 4.0,
            aperture: 2.8,
            iso: "800".to_string(),
            ..Settings::default()
        };
        let (adjusted, warnings) = reconcile(&requested, &capabilities);
        assert_eq!(adjusted, requested);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_exposure_adjusted_to_nearest_with_warning() {
        // Scenario pinned by the session log format
        let capabilities = caps(&[1.0, 2.0, 4.0, 8.0, 15.0], &[1.4], &["auto"]);
        let requested = Settings {
            exposure: 7.0,
            ..Settings::default()
        };
        let (adjusted, warnings) = reconcile(&requested, &capabilities);
        assert_eq!(adjusted.exposure, 8.0);
        assert_eq!(warnings, vec!["Exposure adjusted from 7 to 8"]);
    }

    #[test]
    fn test_tie_breaks_to_lower_value() {
        // 3 is equidistant from 2 and 4
        assert_eq!(closest_value(&[2.0, 4.0], 3.0), Some(2.0));
        let capabilities = caps(&[2.0, 4.0], &[2.0, 4.0], &["auto"]);
        let requested = Settings {
            exposure: 3.0,
            aperture: 3.0,
            ..Settings::default()
        };
        let (adjusted, _) = reconcile(&requested, &capabilities);
        assert_eq!(adjusted.exposure, 2.0);
        assert_eq!(adjusted.aperture, 2.0);
    }

    #[test]
    fn test_reconciled_value_is_always_a_member() {
        let set = [0.5, 1.0, 2.0, 4.0, 8.0, 15.0, 30.0];
        for requested in [0.0, 0.7, 3.1, 11.0, 100.0] {
            let value = closest_value(&set, requested).unwrap();
            assert!(set.contains(&value), "{} not in set", value);
        }
    }

    #[test]
    fn test_iso_flagged_but_never_substituted() {
        let capabilities = caps(&[8.0], &[1.4], &["auto", "100", "200"]);
        let requested = Settings {
            iso: "12800".to_string(),
            ..Settings::default()
        };
        let (adjusted, warnings) = reconcile(&requested, &capabilities);
        assert_eq!(adjusted.iso, "12800");
        assert_eq!(warnings, vec!["ISO value '12800' may not be supported"]);

        // "auto" is always accepted silently
        let requested = Settings {
            iso: "auto".to_string(),
            ..Settings::default()
        };
        let (_, warnings) = reconcile(&requested, &capabilities);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_empty_capability_set_is_a_no_op() {
        let capabilities = caps(&[], &[], &[]);
        let requested = Settings {
            exposure: 7.0,
            aperture: 3.3,
            iso: "640".to_string(),
            ..Settings::default()
        };
        let (adjusted, warnings) = reconcile(&requested, &capabilities);
        assert_eq!(adjusted.exposure, 7.0);
        assert_eq!(adjusted.aperture, 3.3);
        // ISO still gets flagged against the (empty) set
        assert_eq!(warnings, vec!["ISO value '640' may not be supported"]);
    }

    #[test]
    fn test_passthrough_fields_untouched() {
        let capabilities = caps(&[8.0], &[1.4], &["auto"]);
        let requested = Settings {
            delay: 3.5,
            quality: "fine".to_string(),
            max_exposures: 42,
            ..Settings::default()
        };
        let (adjusted, _) = reconcile(&requested, &capabilities);
        assert_eq!(adjusted.delay, 3.5);
        assert_eq!(adjusted.quality, "fine");
        assert_eq!(adjusted.max_exposures, 42);
    }

    #[test]
    fn test_at_most_one_warning_per_axis() {
        let capabilities = caps(&[1.0, 2.0], &[4.0, 5.6], &["100"]);
        let requested = Settings {
            exposure: 9.0,
            aperture: 1.4,
            iso: "640".to_string(),
            ..Settings::default()
        };
        let (_, warnings) = reconcile(&requested, &capabilities);
        assert_eq!(warnings.len(), 3);
    }
}
