//! Tunables for the danmaku overlay.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Coarse viewport bucket used to scale concurrency and pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Narrow,
    Wide,
}

impl DeviceClass {
    pub fn from_width(width_px: f64, breakpoint_px: f64) -> Self {
        if width_px < breakpoint_px {
            Self::Narrow
        } else {
            Self::Wide
        }
    }
}

/// Concurrency and pacing for one [`DeviceClass`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Range the concurrent-unit target is re-drawn from on every batch.
    pub max_concurrent: RangeInclusive<usize>,
    /// Upper bound on units released by a single scheduling tick.
    pub per_tick_cap: usize,
    /// Delay between paced drain steps.
    pub release_delay_ms: RangeInclusive<u32>,
}

impl DeviceProfile {
    pub fn narrow() -> Self {
        Self {
            max_concurrent: 3..=5,
            per_tick_cap: 1,
            release_delay_ms: 1500..=3000,
        }
    }

    pub fn wide() -> Self {
        Self {
            max_concurrent: 6..=10,
            per_tick_cap: 2,
            release_delay_ms: 800..=2000,
        }
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.max_concurrent.is_empty() || *self.max_concurrent.start() == 0 {
            return Err(ConfigError::Invalid(format!(
                "{name}.max_concurrent must be a non-empty range starting at 1 or more"
            )));
        }
        if self.per_tick_cap == 0 {
            return Err(ConfigError::Invalid(format!("{name}.per_tick_cap must be >= 1")));
        }
        if self.release_delay_ms.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "{name}.release_delay_ms must be a non-empty range"
            )));
        }
        Ok(())
    }
}

/// Overlay configuration.
///
/// Every field has a default, so partial JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DanmakuConfig {
    /// Time for one unit to cross the viewport.
    pub traversal_ms: u32,
    /// Pause between the end of a cycle and the replay.
    pub restart_delay_ms: u32,
    /// Maximum ordering jitter applied to creation times.
    pub jitter_ms: i64,
    pub scale_base: f64,
    pub scale_per_like: f64,
    /// Vertical band (percent of viewport height) units are placed in.
    pub vertical_band_percent: RangeInclusive<f64>,
    /// Viewports narrower than this are [`DeviceClass::Narrow`].
    pub breakpoint_px: f64,
    pub narrow: DeviceProfile,
    pub wide: DeviceProfile,
}

impl Default for DanmakuConfig {
    fn default() -> Self {
        Self {
            traversal_ms: 16_000,
            restart_delay_ms: 3_000,
            jitter_ms: 1_000,
            scale_base: 0.8,
            scale_per_like: 0.02,
            vertical_band_percent: 15.0..=75.0,
            breakpoint_px: 768.0,
            narrow: DeviceProfile::narrow(),
            wide: DeviceProfile::wide(),
        }
    }
}

impl DanmakuConfig {
    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.traversal_ms == 0 {
            return Err(ConfigError::Invalid("traversal_ms must be > 0".to_string()));
        }
        if self.jitter_ms < 0 {
            return Err(ConfigError::Invalid("jitter_ms must be >= 0".to_string()));
        }
        let band = &self.vertical_band_percent;
        if band.is_empty() || *band.start() < 0.0 || *band.end() > 100.0 {
            return Err(ConfigError::Invalid(
                "vertical_band_percent must lie within 0..=100".to_string(),
            ));
        }
        self.narrow.validate("narrow")?;
        self.wide.validate("wide")
    }

    pub fn device_class(&self, width_px: f64) -> DeviceClass {
        DeviceClass::from_width(width_px, self.breakpoint_px)
    }

    pub fn profile(&self, class: DeviceClass) -> &DeviceProfile {
        match class {
            DeviceClass::Narrow => &self.narrow,
            DeviceClass::Wide => &self.wide,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_class_breakpoint() {
        let config = DanmakuConfig::default();
        assert_eq!(config.device_class(375.0), DeviceClass::Narrow);
        assert_eq!(config.device_class(767.9), DeviceClass::Narrow);
        assert_eq!(config.device_class(768.0), DeviceClass::Wide);
        assert_eq!(config.device_class(1920.0), DeviceClass::Wide);
    }

    #[test]
    fn test_default_is_valid() {
        assert!(DanmakuConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = DanmakuConfig::from_json(r#"{ "restart_delay_ms": 5000 }"#).unwrap();
        assert_eq!(config.restart_delay_ms, 5000);
        assert_eq!(config.traversal_ms, 16_000);
        assert_eq!(config.wide, DeviceProfile::wide());
    }

    #[test]
    fn test_rejects_zero_tick_cap() {
        let json = r#"{ "narrow": { "max_concurrent": { "start": 1, "end": 2 }, "per_tick_cap": 0, "release_delay_ms": { "start": 10, "end": 20 } } }"#;
        let result = DanmakuConfig::from_json(json);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            DanmakuConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
