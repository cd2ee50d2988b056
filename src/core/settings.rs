//! Capture settings and layering
//!
//! A [`Settings`] value is always fully populated. It is produced by
//! layering three sources, lowest precedence first: built-in hard defaults,
//! a named template (only the fields it actually sets), and explicit
//! per-field overrides from the caller.

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::template::{Template, TemplateStore};
use serde::{Deserialize, Serialize};

/// Hard default exposure time in seconds
pub const DEFAULT_EXPOSURE: f64 = 8.0;
/// Hard default aperture f-number
pub const DEFAULT_APERTURE: f64 = 1.4;
/// Hard default ISO label
pub const DEFAULT_ISO: &str = "auto";
/// Hard default inter-exposure delay in seconds
pub const DEFAULT_DELAY: f64 = 12.0;
/// Hard default image quality
pub const DEFAULT_QUALITY: &str = "raw";
/// Hard default exposure count (0 = unlimited)
pub const DEFAULT_MAX_EXPOSURES: u32 = 0;

/// Fully populated capture settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Exposure time in seconds
    pub exposure: f64,
    /// Aperture f-number
    pub aperture: f64,
    /// ISO label, or "auto"
    pub iso: String,
    /// Delay between exposures in seconds
    pub delay: f64,
    /// Image quality (e.g. "raw")
    pub quality: String,
    /// Maximum number of exposures, 0 = unlimited
    pub max_exposures: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            exposure: DEFAULT_EXPOSURE,
            aperture: DEFAULT_APERTURE,
            iso: DEFAULT_ISO.to_string(),
            delay: DEFAULT_DELAY,
            quality: DEFAULT_QUALITY.to_string(),
            max_exposures: DEFAULT_MAX_EXPOSURES,
        }
    }
}

/// Per-field overrides supplied by the caller (typically CLI flags).
///
/// Only fields explicitly set override lower layers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsOverrides {
    pub exposure: Option<f64>,
    pub aperture: Option<f64>,
    pub iso: Option<String>,
    pub delay: Option<f64>,
    pub quality: Option<String>,
    pub max_exposures: Option<u32>,
}

impl SettingsOverrides {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Settings {
    /// Layer hard defaults, template fields and explicit overrides.
    ///
    /// Absent template fields never override the defaults, and absent
    /// override fields never override the template.
    pub fn layered(template: Option<&Template>, overrides: &SettingsOverrides) -> Self {
        let mut settings = Self::default();

        if let Some(template) = template {
            if let Some(exposure) = template.exposure {
                settings.exposure = exposure;
            }
            if let Some(aperture) = template.aperture {
                settings.aperture = aperture;
            }
            if let Some(ref iso) = template.iso {
                settings.iso = iso.clone();
            }
            if let Some(delay) = template.delay {
                settings.delay = delay;
            }
            if let Some(ref quality) = template.quality {
                settings.quality = quality.clone();
            }
            if let Some(max_exposures) = template.max_exposures {
                settings.max_exposures = max_exposures;
            }
        }

        if let Some(exposure) = overrides.exposure {
            settings.exposure = exposure;
        }
        if let Some(aperture) = overrides.aperture {
            settings.aperture = aperture;
        }
        if let Some(ref iso) = overrides.iso {
            settings.iso = iso.clone();
        }
        if let Some(delay) = overrides.delay {
            settings.delay = delay;
        }
        if let Some(ref quality) = overrides.quality {
            settings.quality = quality.clone();
        }
        if let Some(max_exposures) = overrides.max_exposures {
            settings.max_exposures = max_exposures;
        }

        settings
    }
}

/// Load the template the session should layer on top of the defaults.
///
/// The effective template name is the explicit one if given, otherwise the
/// configured default when non-empty. No effective name means no template
/// layer at all. A named record that does not exist is an error, except the
/// reserved "default" template which is created and persisted on first use.
pub fn effective_template(
    config: &Config,
    store: &TemplateStore,
    explicit_name: Option<&str>,
) -> Result<Option<Template>> {
    let effective_name = explicit_name.map(str::to_string).or_else(|| {
        let name = config.default_template.trim();
        (!name.is_empty()).then(|| name.to_string())
    });

    match effective_name {
        Some(name) => Ok(Some(store.get(&name)?)),
        None => Ok(None),
    }
}

/// Resolve the final settings for a session: hard defaults, then the
/// effective template, then explicit overrides.
pub fn resolve(
    config: &Config,
    store: &TemplateStore,
    explicit_name: Option<&str>,
    overrides: &SettingsOverrides,
) -> Result<Settings> {
    let template = effective_template(config, store, explicit_name)?;
    Ok(Settings::layered(template.as_ref(), overrides))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn template_with(exposure: Option<f64>, iso: Option<&str>) -> Template {
        Template {
            name: "night-sky".to_string(),
            exposure,
            iso: iso.map(String::from),
            ..Template::default()
        }
    }

    #[test]
    fn test_layered_without_inputs_is_hard_defaults() {
        let settings = Settings::layered(None, &SettingsOverrides::default());
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.exposure, 8.0);
        assert_eq!(settings.aperture, 1.4);
        assert_eq!(settings.iso, "auto");
        assert_eq!(settings.delay, 12.0);
        assert_eq!(settings.quality, "raw");
        assert_eq!(settings.max_exposures, 0);
    }

    #[test]
    fn test_template_fields_override_defaults_only_when_present() {
        let template = template_with(Some(30.0), None);
        let settings = Settings::layered(Some(&template), &SettingsOverrides::default());
        assert_eq!(settings.exposure, 30.0);
        // Absent template fields fall through to hard defaults
        assert_eq!(settings.iso, "auto");
        assert_eq!(settings.aperture, 1.4);
    }

    #[test]
    fn test_override_wins_over_template() {
        let template = template_with(Some(30.0), Some("1600"));
        let overrides = SettingsOverrides {
            exposure: Some(20.0),
            ..SettingsOverrides::default()
        };
        let settings = Settings::layered(Some(&template), &overrides);
        assert_eq!(settings.exposure, 20.0);
        // Everything else still comes from the template where present
        assert_eq!(settings.iso, "1600");
        assert_eq!(settings.aperture, 1.4);
    }

    #[test]
    fn test_resolve_uses_reserved_default_template() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::new(dir.path());
        let config = Config::default();

        let settings =
            resolve(&config, &store, None, &SettingsOverrides::default()).unwrap();
        // The canonical default template carries the hard defaults
        assert_eq!(settings, Settings::default());
        assert_eq!(store.list_names().unwrap(), vec!["default"]);
    }

    #[test]
    fn test_resolve_missing_named_template_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::new(dir.path());
        let config = Config::default();

        let err = resolve(&config, &store, Some("aurora"), &SettingsOverrides::default())
            .unwrap_err();
        assert!(matches!(
            err,
            crate::core::error::SkycamError::TemplateNotFound(name) if name == "aurora"
        ));
    }

    #[test]
    fn test_resolve_empty_default_name_skips_template_layer() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::new(dir.path());
        let config = Config {
            default_template: String::new(),
            ..Config::default()
        };

        let settings =
            resolve(&config, &store, None, &SettingsOverrides::default()).unwrap();
        assert_eq!(settings, Settings::default());
        // No template record was created as a side effect
        assert!(store.list_names().unwrap().is_empty());
    }
}
