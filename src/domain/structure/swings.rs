use crate::domain::trading::Candle;
use rust_decimal::Decimal;

pub const FRACTAL_RANGE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwingKind {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swing {
    pub idx: usize,
    pub price: Decimal,
    pub kind: SwingKind,
}

/// Labeled relative to its predecessors of the same polarity progression:
/// higher-high, higher-low, lower-low, lower-high.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwingLabel {
    Hh,
    Hl,
    Ll,
    Lh,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledSwing {
    pub idx: usize,
    pub price: Decimal,
    pub kind: SwingKind,
    pub label: SwingLabel,
}

/// Fractal swing detection: `i` is a swing high iff `high[i]` strictly exceeds
/// every `high` in `[i-k, i+k]` (excluding itself); mirror for swing low. `k=3`.
pub fn detect_swings(candles: &[Candle]) -> Vec<Swing> {
    let k = FRACTAL_RANGE;
    let mut swings = Vec::new();
    if candles.len() < 2 * k + 1 {
        return swings;
    }
    for i in k..candles.len() - k {
        let window = &candles[i - k..=i + k];
        let high = candles[i].high;
        if window.iter().enumerate().all(|(j, c)| j == k || c.high < high) {
            swings.push(Swing {
                idx: i,
                price: high,
                kind: SwingKind::High,
            });
        }
        let low = candles[i].low;
        if window.iter().enumerate().all(|(j, c)| j == k || c.low > low) {
            swings.push(Swing {
                idx: i,
                price: low,
                kind: SwingKind::Low,
            });
        }
    }
    swings.sort_by_key(|s| s.idx);
    swings
}

/// Labels each swing relative to the most recent prior swing of the same kind:
/// a high above the prior high is `Hh`, otherwise `Lh`; a low below the prior low
/// is `Ll`, otherwise `Hl`. The first swing of each kind has no predecessor and is
/// labeled optimistically (`Hh`/`Hl`) since there's nothing to compare against.
pub fn label_swings(swings: &[Swing]) -> Vec<LabeledSwing> {
    let mut last_high: Option<Decimal> = None;
    let mut last_low: Option<Decimal> = None;
    let mut out = Vec::with_capacity(swings.len());
    for s in swings {
        let label = match s.kind {
            SwingKind::High => {
                let label = match last_high {
                    Some(prev) if s.price <= prev => SwingLabel::Lh,
                    _ => SwingLabel::Hh,
                };
                last_high = Some(s.price);
                label
            }
            SwingKind::Low => {
                let label = match last_low {
                    Some(prev) if s.price >= prev => SwingLabel::Hl,
                    _ => SwingLabel::Ll,
                };
                last_low = Some(s.price);
                label
            }
        };
        out.push(LabeledSwing {
            idx: s.idx,
            price: s.price,
            kind: s.kind,
            label,
        });
    }
    out
}
