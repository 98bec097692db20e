use crate::domain::errors::ConfigError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfluenceWeights {
    pub structure: Decimal,
    pub location: Decimal,
    pub confirmation: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryFilters {
    pub confluence_threshold: Decimal,
    pub confluence_weights: ConfluenceWeights,
    pub min_candles: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSizing {
    pub fixed_lot: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskMitigation {
    pub auto_execute_threshold: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeInvalidationConfig {
    pub vwap_slope_threshold_atr: Decimal,
    pub bb_width_expansion_percent: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FalseRangeDetectionConfig {
    pub volume_threshold_pct: Decimal,
    pub vwap_momentum_threshold_pct: Decimal,
    pub body_expansion_threshold_pct: Decimal,
    pub cvd_divergence_threshold: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VwapMomentumConfig {
    pub threshold_pct: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    pub price_deviation: Decimal,
    pub volume_percent: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeStrategyWeights {
    pub low_adx: HashMap<String, Decimal>,
    pub normal: HashMap<String, Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicStrategyWeighting {
    pub regimes: RegimeStrategyWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveAtrConfig {
    pub bb_width_multiplier: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveAnchorsConfig {
    pub atr_change_threshold_pct: Decimal,
    pub session_extreme_threshold_pct: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeDetectionConfig {
    pub adx_low_threshold: Decimal,
    pub adx_trending_threshold: Decimal,
}

/// The engine's main configuration tree. Loaded from JSON, validated eagerly,
/// and content-hashed so downstream log lines can reference which config a
/// decision was made under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainConfig {
    pub entry_filters: EntryFilters,
    pub position_sizing: PositionSizing,
    pub risk_mitigation: RiskMitigation,
    pub range_invalidation: RangeInvalidationConfig,
    pub false_range_detection: FalseRangeDetectionConfig,
    pub vwap_momentum: VwapMomentumConfig,
    pub execution: ExecutionConfig,
    pub dynamic_strategy_weighting: DynamicStrategyWeighting,
    pub broker_timezone: String,
    pub effective_atr: EffectiveAtrConfig,
    pub adaptive_anchors: AdaptiveAnchorsConfig,
    pub regime_detection: RegimeDetectionConfig,
    #[serde(skip)]
    pub content_hash: String,
    #[serde(skip)]
    pub loaded_at: Option<DateTime<Utc>>,
}

impl MainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = self.entry_filters.confluence_threshold;
        if t < Decimal::ZERO || t > dec!(100) {
            return Err(ConfigError::Invalid {
                field: "entry_filters.confluence_threshold",
                reason: "must be in [0, 100]".into(),
            });
        }
        let w = &self.entry_filters.confluence_weights;
        let sum = w.structure + w.location + w.confirmation;
        if sum != dec!(100) {
            return Err(ConfigError::Invalid {
                field: "entry_filters.confluence_weights",
                reason: format!("must sum to 100, got {sum}"),
            });
        }
        if self.position_sizing.fixed_lot <= Decimal::ZERO {
            return Err(ConfigError::Invalid {
                field: "position_sizing.fixed_lot",
                reason: "must be > 0".into(),
            });
        }
        let vp = self.execution.volume_percent;
        if vp <= Decimal::ZERO || vp > Decimal::ONE {
            return Err(ConfigError::Invalid {
                field: "execution.volume_percent",
                reason: "must be in (0, 1]".into(),
            });
        }
        if self.execution.price_deviation <= Decimal::ZERO {
            return Err(ConfigError::Invalid {
                field: "execution.price_deviation",
                reason: "must be > 0".into(),
            });
        }
        let vm = self.vwap_momentum.threshold_pct;
        if vm < Decimal::ZERO || vm > Decimal::ONE {
            return Err(ConfigError::Invalid {
                field: "vwap_momentum.threshold_pct",
                reason: "must be in [0, 1]".into(),
            });
        }
        if self.range_invalidation.bb_width_expansion_percent < Decimal::ZERO {
            return Err(ConfigError::Invalid {
                field: "range_invalidation.bb_width_expansion_percent",
                reason: "must be >= 0".into(),
            });
        }
        let fr = &self.false_range_detection;
        for (field, value) in [
            ("false_range_detection.volume_threshold_pct", fr.volume_threshold_pct),
            ("false_range_detection.vwap_momentum_threshold_pct", fr.vwap_momentum_threshold_pct),
            ("false_range_detection.body_expansion_threshold_pct", fr.body_expansion_threshold_pct),
            ("false_range_detection.cvd_divergence_threshold", fr.cvd_divergence_threshold),
        ] {
            if !(Decimal::ZERO..=Decimal::ONE).contains(&value) {
                return Err(ConfigError::Invalid { field, reason: "must be in [0, 1]".into() });
            }
        }
        let auto = self.risk_mitigation.auto_execute_threshold;
        if auto < Decimal::ZERO || auto > dec!(100) {
            return Err(ConfigError::Invalid {
                field: "risk_mitigation.auto_execute_threshold",
                reason: "must be in [0, 100]".into(),
            });
        }
        for (name, weights) in [
            ("low_adx", &self.dynamic_strategy_weighting.regimes.low_adx),
            ("normal", &self.dynamic_strategy_weighting.regimes.normal),
        ] {
            let sum: Decimal = weights.values().copied().sum();
            if sum < dec!(0.99) || sum > dec!(1.01) {
                return Err(ConfigError::Invalid {
                    field: "dynamic_strategy_weighting.regimes",
                    reason: format!("{name} weights must sum to ~1.0, got {sum}"),
                });
            }
        }
        Ok(())
    }

    /// First 16 hex chars of `SHA-256(json-without-version-keys)`.
    fn content_hash(&self) -> Result<String, ConfigError> {
        let bytes = serde_json::to_vec(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let digest = Sha256::digest(&bytes);
        Ok(hex_prefix(&digest, 16))
    }
}

fn hex_prefix(bytes: &[u8], chars: usize) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect::<String>().chars().take(chars).collect()
}

/// Parses, validates, and content-hashes a main-config JSON document.
pub fn load_main_config(json: &str, now: DateTime<Utc>) -> Result<MainConfig, ConfigError> {
    let mut config: MainConfig = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    config.content_hash = config.content_hash()?;
    config.loaded_at = Some(now);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "entry_filters": {"confluence_threshold": 80, "confluence_weights": {"structure": 40, "location": 35, "confirmation": 25}, "min_candles": 50},
            "position_sizing": {"fixed_lot": 0.01},
            "risk_mitigation": {"auto_execute_threshold": 80},
            "range_invalidation": {"vwap_slope_threshold_atr": 0.2, "bb_width_expansion_percent": 0.5},
            "false_range_detection": {"volume_threshold_pct": 0.15, "vwap_momentum_threshold_pct": 0.1, "body_expansion_threshold_pct": 0.5, "cvd_divergence_threshold": 0.6},
            "vwap_momentum": {"threshold_pct": 0.1},
            "execution": {"price_deviation": 10, "volume_percent": 0.5},
            "dynamic_strategy_weighting": {"regimes": {"low_adx": {"vwap_reversion": 0.5, "bollinger_fade": 0.5}, "normal": {"vwap_reversion": 0.3, "bollinger_fade": 0.7}}},
            "broker_timezone": "UTC+2",
            "effective_atr": {"bb_width_multiplier": 0.5},
            "adaptive_anchors": {"atr_change_threshold_pct": 0.4, "session_extreme_threshold_pct": 0.0025},
            "regime_detection": {"adx_low_threshold": 15, "adx_trending_threshold": 25}
        }"#
    }

    #[test]
    fn loads_and_hashes_valid_config() {
        let now = DateTime::UNIX_EPOCH;
        let config = load_main_config(sample_json(), now).unwrap();
        assert_eq!(config.content_hash.len(), 16);
        assert_eq!(config.loaded_at, Some(now));
    }

    #[test]
    fn rejects_weights_not_summing_to_100() {
        let bad = sample_json().replace("\"confirmation\": 25", "\"confirmation\": 20");
        let now = DateTime::UNIX_EPOCH;
        assert!(load_main_config(&bad, now).is_err());
    }
}
