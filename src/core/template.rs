//! Template records and the named template store
//!
//! A template is a named, partial overlay of capture settings plus file
//! naming preferences. Templates are persisted one TOML record per name in
//! the templates directory. Absent fields never override anything during
//! layering.

use crate::core::error::{Result, SkycamError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the reserved template that is created on first use
pub const DEFAULT_TEMPLATE_NAME: &str = "default";

/// A named, partially populated settings overlay
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    /// Unique template name (backfilled from the file stem when absent)
    pub name: String,
    /// Free-form description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    // Camera settings (each optionally absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aperture: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_exposures: Option<u32>,

    // File naming
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_format: Option<String>,

    // Session settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_monitoring: Option<bool>,
}

/// The canonical record created for the reserved "default" name
pub fn default_template() -> Template {
    Template {
        name: DEFAULT_TEMPLATE_NAME.to_string(),
        description: Some(
            "Default skycam template for general astrophotography".to_string(),
        ),
        aperture: Some(1.4),
        exposure: Some(8.0),
        iso: Some("auto".to_string()),
        delay: Some(12.0),
        quality: Some("raw".to_string()),
        max_exposures: Some(0),
        filename_pattern: Some("SkyImage-{timestamp}".to_string()),
        timestamp_format: Some("YYYY-MM-DD_HH:MM:SS".to_string()),
        temperature_monitoring: Some(false),
    }
}

/// Store of named template records, one TOML file per name
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    /// Create a store over the given templates directory
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Directory holding the template records
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.toml", name))
    }

    /// Load a template by name.
    ///
    /// A missing record is `TemplateNotFound`; a record that exists but does
    /// not parse is `TemplateInvalid` — user-authored templates are never
    /// silently discarded.
    pub fn load(&self, name: &str) -> Result<Template> {
        let path = self.path_for(name);
        if !path.exists() {
            return Err(SkycamError::TemplateNotFound(name.to_string()));
        }

        let content = fs::read_to_string(&path)?;
        let mut template: Template =
            toml::from_str(&content).map_err(|e| SkycamError::TemplateInvalid {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        if template.name.is_empty() {
            template.name = name.to_string();
        }
        Ok(template)
    }

    /// Save a template record under its own name
    pub fn save(&self, template: &Template) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let content = toml::to_string_pretty(template).map_err(|e| {
            SkycamError::TemplateInvalid {
                name: template.name.clone(),
                message: e.to_string(),
            }
        })?;
        fs::write(self.path_for(&template.name), content)?;
        Ok(())
    }

    /// List all stored template names, sorted
    pub fn list_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        if self.dir.exists() {
            for entry in fs::read_dir(&self.dir)? {
                let path = entry?.path();
                if path.extension().map_or(false, |ext| ext == "toml") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        names.push(stem.to_string());
                    }
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Create and persist the canonical default template if it is missing.
    ///
    /// Idempotent: an existing record, including one the user has edited, is
    /// never rewritten.
    pub fn ensure_default(&self) -> Result<()> {
        if !self.path_for(DEFAULT_TEMPLATE_NAME).exists() {
            self.save(&default_template())?;
        }
        Ok(())
    }

    /// Get a template by name, creating the reserved default on first use
    pub fn get(&self, name: &str) -> Result<Template> {
        match self.load(name) {
            Err(SkycamError::TemplateNotFound(_)) if name == DEFAULT_TEMPLATE_NAME => {
                self.ensure_default()?;
                self.load(DEFAULT_TEMPLATE_NAME)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_default_creates_canonical_record() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::new(dir.path());

        let template = store.get("default").unwrap();
        assert_eq!(template.name, "default");
        assert_eq!(
            template.description.as_deref(),
            Some("Default skycam template for general astrophotography")
        );
        assert_eq!(store.list_names().unwrap(), vec!["default"]);
    }

    #[test]
    fn test_ensure_default_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::new(dir.path());

        store.ensure_default().unwrap();

        // Simulate a user edit; a second ensure must not clobber it
        let mut edited = store.load("default").unwrap();
        edited.exposure = Some(30.0);
        store.save(&edited).unwrap();

        store.ensure_default().unwrap();
        assert_eq!(store.load("default").unwrap().exposure, Some(30.0));
    }

    #[test]
    fn test_load_missing_template_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::new(dir.path());

        let err = store.load("aurora").unwrap_err();
        assert!(matches!(err, SkycamError::TemplateNotFound(name) if name == "aurora"));
        // Only the reserved name is auto-created
        let err = store.get("aurora").unwrap_err();
        assert!(matches!(err, SkycamError::TemplateNotFound(_)));
    }

    #[test]
    fn test_malformed_template_is_surfaced_not_discarded() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::new(dir.path());
        std::fs::create_dir_all(dir.path()).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "exposure = [not toml").unwrap();

        let err = store.load("broken").unwrap_err();
        assert!(matches!(err, SkycamError::TemplateInvalid { name, .. } if name == "broken"));
        // The malformed file is left in place
        assert!(dir.path().join("broken.toml").exists());
    }

    #[test]
    fn test_save_and_load_round_trip_with_name_backfill() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::new(dir.path());

        let template = Template {
            name: "milky-way".to_string(),
            exposure: Some(15.0),
            iso: Some("1600".to_string()),
            ..Template::default()
        };
        store.save(&template).unwrap();
        assert_eq!(store.load("milky-way").unwrap(), template);

        // A record without an explicit name gets it from the file stem
        std::fs::write(dir.path().join("bare.toml"), "exposure = 4.0\n").unwrap();
        let bare = store.load("bare").unwrap();
        assert_eq!(bare.name, "bare");
        assert_eq!(bare.exposure, Some(4.0));
    }

    #[test]
    fn test_list_names_is_sorted() {
        let dir = TempDir::new().unwrap();
        let store = TemplateStore::new(dir.path());
        for name in ["zodiac", "aurora", "milky-way"] {
            store
                .save(&Template {
                    name: name.to_string(),
                    ..Template::default()
                })
                .unwrap();
        }
        assert_eq!(
            store.list_names().unwrap(),
            vec!["aurora", "milky-way", "zodiac"]
        );
    }
}
