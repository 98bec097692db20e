use super::types::{Bias, TfAnalysis};
use crate::domain::indicators::rsi;
use crate::domain::structure::{detect_bos_choch, detect_swings, label_swings};
use crate::domain::trading::Candle;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Builds a single timeframe's analysis from its own candles: BOS/CHOCH from
/// the structure detectors settle the bias outright when present; otherwise
/// RSI distance from neutral stands in as a softer directional read.
pub fn analyze_timeframe(candles: &[Candle], atr: Decimal) -> TfAnalysis {
    if candles.is_empty() {
        return TfAnalysis { bias: Bias::Neutral, confidence: Decimal::ZERO, bos: false, choch: false };
    }

    let swings = detect_swings(candles);
    let labeled = label_swings(&swings);
    let current_close = candles.last().unwrap().close;
    let structure = detect_bos_choch(&labeled, current_close, candles.len() - 1, atr);

    let rsi_value = rsi(candles, crate::domain::indicators::rsi::DEFAULT_RSI_PERIOD.min(candles.len().saturating_sub(1).max(1)));
    let rsi_distance = (rsi_value - dec!(50)).abs();

    if structure.bullish_bos || structure.bullish_choch {
        let confidence = (dec!(70) + rsi_distance * dec!(0.3)).min(dec!(100));
        return TfAnalysis { bias: Bias::Bullish, confidence, bos: structure.bullish_bos, choch: structure.bullish_choch };
    }
    if structure.bearish_bos || structure.bearish_choch {
        let confidence = (dec!(70) + rsi_distance * dec!(0.3)).min(dec!(100));
        return TfAnalysis { bias: Bias::Bearish, confidence, bos: structure.bearish_bos, choch: structure.bearish_choch };
    }

    let bias = if rsi_value > dec!(55) {
        Bias::Bullish
    } else if rsi_value < dec!(45) {
        Bias::Bearish
    } else {
        Bias::Neutral
    };
    let confidence = (dec!(40) + rsi_distance).min(dec!(100));
    TfAnalysis { bias, confidence, bos: false, choch: false }
}
