use super::regime::TfWeights;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Per-timeframe confidences (0-100) feeding the alignment score.
#[derive(Debug, Clone, Copy)]
pub struct TfConfidences {
    pub h4: Decimal,
    pub h1: Decimal,
    pub m30: Decimal,
    pub m15: Decimal,
    pub m5: Decimal,
}

/// Weighted sum of per-TF confidences (weights already sum to 1, so this
/// alone lands in `[0, 100]`), plus an advanced-insight adjustment capped at
/// `±20`, clamped back to `[0, 100]`.
pub fn alignment_score(confidences: TfConfidences, weights: TfWeights, advanced_insight_adjustment: Decimal) -> Decimal {
    let base = confidences.h4 * weights.h4
        + confidences.h1 * weights.h1
        + confidences.m30 * weights.m30
        + confidences.m15 * weights.m15
        + confidences.m5 * weights.m5;
    let adjustment = advanced_insight_adjustment.clamp(-dec!(20), dec!(20));
    (base + adjustment).clamp(Decimal::ZERO, dec!(100))
}
