use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleOverride {
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakevenConfig {
    pub offset_atr_mult: Decimal,
}

impl Default for BreakevenConfig {
    fn default() -> Self {
        Self { offset_atr_mult: dec!(0.1) }
    }
}

/// Exit-ladder rule toggles. Unknown rule keys default to *enabled* — modeled
/// as a typed accessor rather than a scattered `.get(key, true)` call site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExitConfig {
    pub early_exit_rules: HashMap<String, RuleOverride>,
    #[serde(default)]
    pub breakeven_management: BreakevenConfig,
}

impl ExitConfig {
    pub fn rule_enabled(&self, tag: &str) -> bool {
        self.early_exit_rules.get(tag).and_then(|r| r.enabled).unwrap_or(true)
    }
}

pub fn load_exit_config(json: &str) -> Result<ExitConfig, crate::domain::errors::ConfigError> {
    serde_json::from_str(json).map_err(|e| crate::domain::errors::ConfigError::Parse(e.to_string()))
}
