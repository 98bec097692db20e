use crate::domain::errors::ConfigError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyRr {
    pub min: Decimal,
    pub target: Decimal,
    pub max: Decimal,
    pub default_stop_atr_mult: Decimal,
    pub default_tp_atr_mult: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRr {
    pub enabled: bool,
    pub rr_multiplier: Decimal,
    pub stop_tightener: Decimal,
    pub max_rr: Decimal,
}

/// R:R policy keyed by strategy id and by session name (`asian`, `london`,
/// `ny`, `late_ny`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RrConfig {
    pub strategies: HashMap<String, StrategyRr>,
    pub sessions: HashMap<String, SessionRr>,
}

impl RrConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (id, rr) in &self.strategies {
            if !(Decimal::ZERO < rr.min && rr.min < rr.target && rr.target < rr.max) {
                return Err(ConfigError::Invalid {
                    field: "rr_config.strategies",
                    reason: format!("{id}: require 0 < min < target < max"),
                });
            }
            if rr.default_stop_atr_mult <= Decimal::ZERO || rr.default_tp_atr_mult <= Decimal::ZERO {
                return Err(ConfigError::Invalid {
                    field: "rr_config.strategies",
                    reason: format!("{id}: atr multipliers must be positive"),
                });
            }
        }
        for (session, cfg) in &self.sessions {
            if cfg.rr_multiplier < Decimal::ZERO {
                return Err(ConfigError::Invalid {
                    field: "rr_config.sessions",
                    reason: format!("{session}: rr_multiplier must be >= 0"),
                });
            }
            if cfg.stop_tightener <= Decimal::ZERO {
                return Err(ConfigError::Invalid {
                    field: "rr_config.sessions",
                    reason: format!("{session}: stop_tightener must be > 0"),
                });
            }
            if cfg.max_rr <= Decimal::ZERO {
                return Err(ConfigError::Invalid {
                    field: "rr_config.sessions",
                    reason: format!("{session}: max_rr must be > 0"),
                });
            }
        }
        Ok(())
    }
}

pub fn load_rr_config(json: &str) -> Result<RrConfig, ConfigError> {
    let config: RrConfig = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_inverted_min_target_max() {
        let mut strategies = HashMap::new();
        strategies.insert(
            "vwap_reversion".to_string(),
            StrategyRr { min: dec!(2), target: dec!(1.5), max: dec!(3), default_stop_atr_mult: dec!(1), default_tp_atr_mult: dec!(2) },
        );
        let config = RrConfig { strategies, sessions: HashMap::new() };
        assert!(config.validate().is_err());
    }
}
