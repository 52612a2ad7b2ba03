//! Persisted user settings
//!
//! Stored as TOML via confy. Every field has a serde default so files
//! written by older versions keep loading.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rotation::RotationConfig;

const APP_NAME: &str = "mascot";
const CONFIG_NAME: &str = "settings";

/// Default auto-rotation period (30 minutes)
pub const DEFAULT_ROTATION_INTERVAL_MS: i64 = 30 * 60 * 1000;

/// Floor for user-configured rotation intervals
const MIN_ROTATION_INTERVAL_MS: i64 = 1000;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load settings")]
    Load(#[from] confy::ConfyError),

    #[error("failed to save settings")]
    Save(#[source] confy::ConfyError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceSettings {
    /// Show 24-hour time; otherwise hours are reduced to 12-hour form
    pub time_format_24h: bool,
    /// strftime pattern for the date line; empty disables the date
    pub date_format_pattern: String,
    /// Use the sparser burn-in-safe art in ambient mode
    pub burn_mode_enabled: bool,
    /// Pinned skin index, -1 for auto-rotation
    pub pinned_skin_index: i32,
    pub rotation_interval_ms: i64,
}

impl Default for FaceSettings {
    fn default() -> Self {
        Self {
            time_format_24h: true,
            date_format_pattern: "%a %e %b".to_string(),
            burn_mode_enabled: false,
            pinned_skin_index: -1,
            rotation_interval_ms: DEFAULT_ROTATION_INTERVAL_MS,
        }
    }
}

impl FaceSettings {
    pub fn load() -> Result<Self, SettingsError> {
        confy::load(APP_NAME, CONFIG_NAME).map_err(SettingsError::Load)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(SettingsError::Save)
    }

    /// Rotation view of the settings. Negative pin values mean auto-rotate;
    /// the interval is floored so a corrupt file cannot spin the rotator.
    pub fn rotation_config(&self) -> RotationConfig {
        RotationConfig {
            interval_ms: self.rotation_interval_ms.max(MIN_ROTATION_INTERVAL_MS),
            pinned_skin_index: usize::try_from(self.pinned_skin_index).ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_pin_means_auto_rotate() {
        let settings = FaceSettings {
            pinned_skin_index: -1,
            ..FaceSettings::default()
        };
        assert_eq!(settings.rotation_config().pinned_skin_index, None);

        let settings = FaceSettings {
            pinned_skin_index: 3,
            ..FaceSettings::default()
        };
        assert_eq!(settings.rotation_config().pinned_skin_index, Some(3));
    }

    #[test]
    fn test_interval_is_floored() {
        let settings = FaceSettings {
            rotation_interval_ms: 0,
            ..FaceSettings::default()
        };
        assert_eq!(settings.rotation_config().interval_ms, 1000);
    }

    #[test]
    fn test_toml_round_trip() {
        let settings = FaceSettings {
            time_format_24h: false,
            date_format_pattern: "%d/%m".to_string(),
            burn_mode_enabled: true,
            pinned_skin_index: 2,
            rotation_interval_ms: 5000,
        };
        let text = toml::to_string(&settings).unwrap();
        let parsed: FaceSettings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_partial_file_loads_with_defaults() {
        let parsed: FaceSettings = toml::from_str("burn_mode_enabled = true").unwrap();
        assert!(parsed.burn_mode_enabled);
        assert!(parsed.time_format_24h);
        assert_eq!(parsed.rotation_interval_ms, DEFAULT_ROTATION_INTERVAL_MS);
    }
}
