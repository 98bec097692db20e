use crate::domain::trading::Timeframe;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeKind {
    Session,
    Daily,
    Dynamic,
}

/// Two closed price intervals carved out of the range's upper/lower 15%, where
/// gap-fill liquidity is expected to concentrate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalGapZones {
    pub upper_zone: (Decimal, Decimal),
    pub lower_zone: (Decimal, Decimal),
}

impl CriticalGapZones {
    pub fn new(high: Decimal, low: Decimal) -> Self {
        let w = high - low;
        let pad = dec!(0.15) * w;
        Self {
            upper_zone: (high - pad, high),
            lower_zone: (low, low + pad),
        }
    }

    pub fn contains(&self, price: Decimal) -> bool {
        (price >= self.upper_zone.0 && price <= self.upper_zone.1)
            || (price >= self.lower_zone.0 && price <= self.lower_zone.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TouchCount {
    pub total: usize,
    pub upper: usize,
    pub lower: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionState {
    Forming,
    Expanding,
    Contracting,
    Stable,
}

/// Tags reported by the range-invalidation check (§4.2, rule set of 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationFlag {
    TwoBarsOutsideRange,
    VwapMomentumHigh,
    BbWidthExpansion,
    M15BosConfirmed,
}

/// Tags reported by the imbalanced-consolidation ("false range") check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FalseRangeFlag {
    VolumeIncreasing,
    VwapMomentumHigh,
    CandleBodyExpansion,
    CvdDivergence,
}

/// An immutable trading range: the central structure the rest of the engine
/// validates against, scores against, and embeds into open trades.
///
/// Invariants: `low < mid < high`; `width_atr > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeStructure {
    pub kind: RangeKind,
    pub high: Decimal,
    pub low: Decimal,
    pub mid: Decimal,
    pub width_atr: Decimal,
    pub gaps: CriticalGapZones,
    pub touch_count: TouchCount,
    pub validated: bool,
    /// Keyed by the nested timeframe's display string (`"H1"`, `"M15"`, ...) —
    /// `Timeframe` isn't representable as a JSON object key directly.
    pub nested: HashMap<String, Box<RangeStructure>>,
    pub expansion_state: ExpansionState,
    pub invalidation_flags: Vec<InvalidationFlag>,
}

impl RangeStructure {
    pub fn width(&self) -> Decimal {
        self.high - self.low
    }

    pub fn contains(&self, price: Decimal) -> bool {
        price >= self.low && price <= self.high
    }

    pub fn nested_for(&self, tf: Timeframe) -> Option<&RangeStructure> {
        self.nested.get(&tf.to_string()).map(|b| b.as_ref())
    }

    pub fn with_nested(mut self, tf: Timeframe, child: RangeStructure) -> Self {
        self.nested.insert(tf.to_string(), Box::new(child));
        self
    }

    pub fn with_validated(mut self, validated: bool) -> Self {
        self.validated = validated;
        self
    }
}
