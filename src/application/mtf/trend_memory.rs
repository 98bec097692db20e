use super::types::{Bias, Stability, StabilizedTf, TfAnalysis};
use crate::domain::trading::Timeframe;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;

/// Retains the last 3 per-timeframe analyses and stabilizes them: `STABLE`
/// iff all 3 agree on bias (confidence = their mean), `UNSTABLE` if they
/// disagree, `INSUFFICIENT_DATA` before 3 samples exist. Updates are
/// serialized by an internal lock so concurrent analyzer calls never
/// interleave a push with a read.
pub struct TrendMemory {
    buffers: Mutex<HashMap<Timeframe, Vec<TfAnalysis>>>,
}

impl TrendMemory {
    pub fn new() -> Self {
        Self { buffers: Mutex::new(HashMap::new()) }
    }

    /// Pushes `analysis` for `tf`, keeping only the most recent 3, and returns
    /// the stabilized verdict.
    pub fn push(&self, tf: Timeframe, analysis: TfAnalysis) -> StabilizedTf {
        let mut buffers = self.buffers.lock().expect("trend memory lock poisoned");
        let buffer = buffers.entry(tf).or_default();
        buffer.push(analysis);
        if buffer.len() > 3 {
            buffer.remove(0);
        }
        stabilize(buffer)
    }
}

impl Default for TrendMemory {
    fn default() -> Self {
        Self::new()
    }
}

fn stabilize(buffer: &[TfAnalysis]) -> StabilizedTf {
    if buffer.len() < 3 {
        return StabilizedTf { stability: Stability::InsufficientData, bias: Bias::Neutral, confidence: Decimal::ZERO };
    }
    let first = buffer[0].bias;
    if buffer.iter().all(|a| a.bias == first) {
        let mean = buffer.iter().map(|a| a.confidence).sum::<Decimal>() / Decimal::from(buffer.len() as i64);
        StabilizedTf { stability: Stability::Stable, bias: first, confidence: mean }
    } else {
        StabilizedTf { stability: Stability::Unstable, bias: Bias::Neutral, confidence: Decimal::ZERO }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn analysis(bias: Bias, confidence: Decimal) -> TfAnalysis {
        TfAnalysis { bias, confidence, bos: false, choch: false }
    }

    #[test]
    fn insufficient_until_three_samples() {
        let memory = TrendMemory::new();
        assert_eq!(memory.push(Timeframe::H1, analysis(Bias::Bullish, dec!(70))).stability, Stability::InsufficientData);
        assert_eq!(memory.push(Timeframe::H1, analysis(Bias::Bullish, dec!(70))).stability, Stability::InsufficientData);
        let stabilized = memory.push(Timeframe::H1, analysis(Bias::Bullish, dec!(70)));
        assert_eq!(stabilized.stability, Stability::Stable);
        assert_eq!(stabilized.bias, Bias::Bullish);
    }

    #[test]
    fn disagreement_is_unstable() {
        let memory = TrendMemory::new();
        memory.push(Timeframe::H1, analysis(Bias::Bullish, dec!(70)));
        memory.push(Timeframe::H1, analysis(Bias::Bearish, dec!(70)));
        let stabilized = memory.push(Timeframe::H1, analysis(Bias::Bullish, dec!(70)));
        assert_eq!(stabilized.stability, Stability::Unstable);
    }

    #[test]
    fn oldest_sample_rolls_off() {
        let memory = TrendMemory::new();
        memory.push(Timeframe::H1, analysis(Bias::Bearish, dec!(70)));
        memory.push(Timeframe::H1, analysis(Bias::Bullish, dec!(70)));
        memory.push(Timeframe::H1, analysis(Bias::Bullish, dec!(70)));
        let stabilized = memory.push(Timeframe::H1, analysis(Bias::Bullish, dec!(70)));
        assert_eq!(stabilized.stability, Stability::Stable);
    }
}
