//! Tunable game parameters.
//!
//! Defaults are compiled in. In the browser an optional JSON object stored
//! under the `pixel-config` localStorage key overrides individual fields,
//! e.g. `{"baseClickCap": 12, "logLevel": "debug"}`.

use serde::Deserialize;

use crate::error::ConfigError;

/// localStorage key holding an optional JSON override.
#[cfg(target_arch = "wasm32")]
const CONFIG_KEY: &str = "pixel-config";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Fixed-timestep rate used for flashes and animation.
    pub ticks_per_sec: u32,
    /// Delay between the last state change and the debounced save.
    pub save_debounce_ms: u32,
    /// Clicks accepted per sliding second before any Overclock upgrade.
    pub base_click_cap: u32,
    /// Mine cadence when no drill upgrade is owned.
    pub mine_interval_ms: u32,
    /// Cash credited per head before payout multipliers.
    pub mine_payout: u64,
    /// Maximum rounds a single poll may catch up before skipping ahead.
    pub mine_max_catch_up: u32,
    /// `EnvFilter` directive for the console logger.
    pub log_level: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            ticks_per_sec: 10,
            save_debounce_ms: 150,
            base_click_cap: 8,
            mine_interval_ms: 5_000,
            mine_payout: 5,
            mine_max_catch_up: 20,
            log_level: "info".into(),
        }
    }
}

impl GameConfig {
    /// Parse a JSON override on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall the clock, the throttle or the mines.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(&'static str, u64); 4] = [
            ("ticksPerSec", self.ticks_per_sec as u64),
            ("baseClickCap", self.base_click_cap as u64),
            ("mineIntervalMs", self.mine_interval_ms as u64),
            ("mineMaxCatchUp", self.mine_max_catch_up as u64),
        ];
        match checks.iter().find(|(_, v)| *v == 0) {
            Some((field, _)) => Err(ConfigError::Zero { field: *field }),
            None => Ok(()),
        }
    }
}

/// Load the config: compiled defaults, overridden from localStorage if present.
///
/// Runs before the logger is installed, so problems go straight to the console.
#[cfg(target_arch = "wasm32")]
pub fn load() -> GameConfig {
    let stored = web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .and_then(|s| s.get_item(CONFIG_KEY).ok().flatten());

    let Some(json) = stored else {
        return GameConfig::default();
    };

    match GameConfig::from_json(&json) {
        Ok(config) => config,
        Err(e) => {
            web_sys::console::warn_1(
                &format!("Pixel Clicker: ignoring {CONFIG_KEY} override: {e}").into(),
            );
            GameConfig::default()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load() -> GameConfig {
    GameConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = GameConfig::from_json(r#"{"baseClickCap": 12, "logLevel": "debug"}"#).unwrap();
        assert_eq!(config.base_click_cap, 12);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.mine_interval_ms, 5_000);
        assert_eq!(config.save_debounce_ms, 150);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = GameConfig::from_json(r#"{"mineIntervalMs": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Zero { field: "mineIntervalMs" }));
    }

    #[test]
    fn malformed_override_is_an_error() {
        assert!(matches!(
            GameConfig::from_json("not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let config = GameConfig::from_json(r#"{"futureKnob": true}"#).unwrap();
        assert_eq!(config, GameConfig::default());
    }
}
