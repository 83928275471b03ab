//! Build-time application configuration.
//!
//! Values come from environment variables captured at compile time
//! (`trunk build` forwards the shell environment), with defaults for local
//! development.

use chrono::{DateTime, TimeZone, Utc};
use danmaku_core::DanmakuConfig;

/// Number of most recent comments fetched per load.
pub const COMMENT_LOAD_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Object store base URL. `None` runs against an in-memory store.
    pub store_url: Option<String>,
    pub countdown_target: DateTime<Utc>,
    pub danmaku: DanmakuConfig,
}

impl AppConfig {
    pub fn load() -> Self {
        Self::from_values(
            option_env!("DANMAKU_STORE_URL"),
            option_env!("DANMAKU_COUNTDOWN_TARGET"),
            option_env!("DANMAKU_CONFIG_JSON"),
        )
    }

    fn from_values(
        store_url: Option<&str>,
        countdown_target: Option<&str>,
        danmaku_json: Option<&str>,
    ) -> Self {
        let store_url = store_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let countdown_target = countdown_target
            .and_then(|raw| match DateTime::parse_from_rfc3339(raw) {
                Ok(dt) => Some(dt.with_timezone(&Utc)),
                Err(e) => {
                    tracing::warn!(value = raw, error = %e, "Invalid countdown target, using default");
                    None
                }
            })
            .unwrap_or_else(default_countdown_target);

        let danmaku = danmaku_json
            .and_then(|json| match DanmakuConfig::from_json(json) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!(error = %e, "Invalid danmaku config, using defaults");
                    None
                }
            })
            .unwrap_or_default();

        Self {
            store_url,
            countdown_target,
            danmaku,
        }
    }
}

fn default_countdown_target() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 12, 31, 15, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_defaults() {
        let config = AppConfig::from_values(None, None, None);
        assert_eq!(config.store_url, None);
        assert_eq!(config.countdown_target, default_countdown_target());
        assert_eq!(config.danmaku, DanmakuConfig::default());
    }

    #[wasm_bindgen_test]
    fn test_store_url_normalized() {
        let config = AppConfig::from_values(Some(" https://store.example.com/api/ "), None, None);
        assert_eq!(
            config.store_url.as_deref(),
            Some("https://store.example.com/api")
        );
        assert_eq!(AppConfig::from_values(Some("  "), None, None).store_url, None);
    }

    #[wasm_bindgen_test]
    fn test_invalid_values_fall_back() {
        let config = AppConfig::from_values(None, Some("tomorrow"), Some("{ nope"));
        assert_eq!(config.countdown_target, default_countdown_target());
        assert_eq!(config.danmaku, DanmakuConfig::default());
    }

    #[wasm_bindgen_test]
    fn test_custom_target() {
        let config = AppConfig::from_values(None, Some("2027-01-01T00:00:00+09:00"), None);
        assert_eq!(
            config.countdown_target,
            Utc.with_ymd_and_hms(2026, 12, 31, 15, 0, 0).unwrap()
        );
    }
}
