//! Toast configuration.
//!
//! Loaded from TOML. Every field is optional; unknown keys are rejected so a
//! typo does not silently fall back to a default.
//!
//! ```toml
//! [defaults]
//! duration = "medium"   # short | medium | long
//! dismissible = true
//!
//! [placement]
//! margin = 16.0         # logical px from the bottom edge
//! keyboard_gap = 8.0    # extra space above a visible keyboard
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::request::ToastDuration;

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToastConfig {
    pub defaults: ToastDefaults,
    pub placement: PlacementConfig,
}

/// Values applied by [`ToastOptions::from_config`](crate::ToastOptions::from_config).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToastDefaults {
    pub duration: ToastDuration,
    pub dismissible: bool,
}

impl Default for ToastDefaults {
    fn default() -> Self {
        Self {
            duration: ToastDuration::Medium,
            dismissible: true,
        }
    }
}

/// Where the rendering surface should draw the banner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlacementConfig {
    /// Distance from the bottom edge when no keyboard is visible.
    pub margin: f32,
    /// Extra distance above the keyboard when it is visible.
    pub keyboard_gap: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            margin: 16.0,
            keyboard_gap: 8.0,
        }
    }
}

impl ToastConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::parse(None, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: Self =
            toml::from_str(&content).map_err(|e| Error::parse(Some(path.to_path_buf()), e))?;
        config.validate()?;
        tracing::debug!(target: "lumen_toast", path = %path.display(), "loaded toast config");
        Ok(config)
    }

    /// Load configuration from a file, or the defaults if the file does not
    /// exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        let PlacementConfig {
            margin,
            keyboard_gap,
        } = self.placement;
        if !margin.is_finite() || margin < 0.0 {
            return Err(Error::invalid_value(
                "placement.margin",
                format!("expected a finite, non-negative number, got {margin}"),
            ));
        }
        if !keyboard_gap.is_finite() || keyboard_gap < 0.0 {
            return Err(Error::invalid_value(
                "placement.keyboard_gap",
                format!("expected a finite, non-negative number, got {keyboard_gap}"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_document_yields_defaults() {
        let config = ToastConfig::from_toml_str("").unwrap();
        assert_eq!(config, ToastConfig::default());
        assert_eq!(config.defaults.duration, ToastDuration::Medium);
        assert!(config.defaults.dismissible);
        assert_eq!(config.placement.margin, 16.0);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = ToastConfig::from_toml_str(
            r#"
            [defaults]
            duration = "long"
            "#,
        )
        .unwrap();
        assert_eq!(config.defaults.duration, ToastDuration::Long);
        assert!(config.defaults.dismissible);
        assert_eq!(config.placement, PlacementConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ToastConfig::from_toml_str(
            r#"
            [defaults]
            duraton = "short"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Parse { path: None, .. }));
    }

    #[test]
    fn unknown_duration_is_rejected() {
        let err = ToastConfig::from_toml_str("[defaults]\nduration = \"forever\"\n").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn negative_margin_is_rejected() {
        let err = ToastConfig::from_toml_str("[placement]\nmargin = -1.0\n").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidValue {
                field: "placement.margin",
                ..
            }
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("toast.toml");
        fs::write(
            &path,
            "[defaults]\nduration = \"short\"\ndismissible = false\n\n[placement]\nkeyboard_gap = 12.0\n",
        )
        .unwrap();

        let config = ToastConfig::load(&path).unwrap();
        assert_eq!(config.defaults.duration, ToastDuration::Short);
        assert!(!config.defaults.dismissible);
        assert_eq!(config.placement.keyboard_gap, 12.0);
        assert_eq!(config.placement.margin, 16.0);
    }

    #[test]
    fn load_missing_file_reports_path() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("absent.toml");

        let err = ToastConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(ToastConfig::load_or_default(&path).unwrap() == ToastConfig::default());
    }

    #[test]
    fn parse_error_from_file_names_path() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[defaults\n").unwrap();

        let err = ToastConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn serializes_back_to_toml() {
        let config = ToastConfig::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(ToastConfig::from_toml_str(&text).unwrap(), config);
    }
}
