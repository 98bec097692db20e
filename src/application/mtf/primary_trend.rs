use super::types::{Bias, PrimaryTrend, StabilizedTf, Stability, TrendLabel, TrendStrength};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn strength_from_confidence(confidence: Decimal) -> TrendStrength {
    if confidence >= dec!(75) {
        TrendStrength::Strong
    } else if confidence >= dec!(60) {
        TrendStrength::Moderate
    } else {
        TrendStrength::Weak
    }
}

/// The primary trend is read from stabilized H4 and H1 only — lower
/// timeframes may label themselves counter-trend against it but can never
/// override it.
pub fn primary_trend(h4: StabilizedTf, h1: StabilizedTf) -> PrimaryTrend {
    let both_stable = h4.stability == Stability::Stable && h1.stability == Stability::Stable;
    let confidence = (h4.confidence + h1.confidence) / Decimal::TWO;
    if both_stable && h4.bias == Bias::Bullish && h1.bias == Bias::Bullish {
        return PrimaryTrend { bias: Bias::Bullish, strength: strength_from_confidence(confidence) };
    }
    if both_stable && h4.bias == Bias::Bearish && h1.bias == Bias::Bearish {
        return PrimaryTrend { bias: Bias::Bearish, strength: strength_from_confidence(confidence) };
    }
    PrimaryTrend { bias: Bias::Neutral, strength: TrendStrength::Weak }
}

/// Labels a lower-timeframe bias as counter-trend or trend-continuation
/// relative to the primary trend, with the risk adjustment for counter-trend
/// entries keyed by the primary trend's own strength.
pub fn trend_label(primary: PrimaryTrend, lower_bias: Bias) -> TrendLabel {
    let opposes = matches!((primary.bias, lower_bias), (Bias::Bullish, Bias::Bearish) | (Bias::Bearish, Bias::Bullish));
    if opposes {
        TrendLabel::CounterTrend { adjustment: primary.strength.counter_trend_adjustment() }
    } else {
        TrendLabel::TrendContinuation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stable(bias: Bias, confidence: Decimal) -> StabilizedTf {
        StabilizedTf { stability: Stability::Stable, bias, confidence }
    }

    #[test]
    fn both_stable_bullish_yields_bullish_primary() {
        let trend = primary_trend(stable(Bias::Bullish, dec!(80)), stable(Bias::Bullish, dec!(80)));
        assert_eq!(trend.bias, Bias::Bullish);
        assert_eq!(trend.strength, TrendStrength::Strong);
    }

    #[test]
    fn h1_divergence_yields_neutral() {
        let trend = primary_trend(stable(Bias::Bullish, dec!(80)), stable(Bias::Bearish, dec!(80)));
        assert_eq!(trend.bias, Bias::Neutral);
    }

    #[test]
    fn opposing_lower_bias_is_counter_trend() {
        let primary = PrimaryTrend { bias: Bias::Bullish, strength: TrendStrength::Strong };
        match trend_label(primary, Bias::Bearish) {
            TrendLabel::CounterTrend { adjustment } => assert_eq!(adjustment.confidence_cap, dec!(60)),
            TrendLabel::TrendContinuation => panic!("expected counter-trend"),
        }
    }
}
