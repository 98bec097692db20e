use crate::domain::structure::swings::{Swing, SwingKind};
use rust_decimal::Decimal;

/// A cluster of swing points (of the same kind) whose prices lie within
/// tolerance of each other — a liquidity pool resting above/below equal
/// highs/lows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EqualLevelCluster {
    pub kind: SwingKind,
    pub price: Decimal,
    pub zone_low: Decimal,
    pub zone_high: Decimal,
    pub touch_count: usize,
    pub bars_ago: usize,
}

/// Clusters swing points of the same kind whose prices lie within
/// `tau = 0.1 * atr` of each other, and reports the strongest (largest) cluster.
/// Requires at least 2 touches. `current_idx` is the index of the most recent bar,
/// used to compute `bars_ago` for the most recent cluster member.
pub fn detect_equal_levels(
    swings: &[Swing],
    kind: SwingKind,
    atr: Decimal,
    current_idx: usize,
) -> Option<EqualLevelCluster> {
    if atr <= Decimal::ZERO {
        return None;
    }
    let tau = Decimal::new(1, 1) * atr; // 0.1 * atr
    let candidates: Vec<&Swing> = swings.iter().filter(|s| s.kind == kind).collect();
    if candidates.len() < 2 {
        return None;
    }

    let mut best: Option<(Decimal, Vec<&Swing>)> = None;
    for anchor in &candidates {
        let members: Vec<&Swing> = candidates
            .iter()
            .filter(|s| (s.price - anchor.price).abs() <= tau)
            .copied()
            .collect();
        if members.len() < 2 {
            continue;
        }
        let better = match &best {
            None => true,
            Some((_, best_members)) => members.len() > best_members.len(),
        };
        if better {
            best = Some((anchor.price, members));
        }
    }

    best.map(|(anchor_price, members)| {
        let most_recent = members.iter().map(|s| s.idx).max().unwrap_or(0);
        EqualLevelCluster {
            kind,
            price: anchor_price,
            zone_low: anchor_price - tau,
            zone_high: anchor_price + tau,
            touch_count: members.len(),
            bars_ago: current_idx.saturating_sub(most_recent),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn requires_at_least_two_touches() {
        let swings = vec![Swing { idx: 0, price: dec!(100), kind: SwingKind::High }];
        assert!(detect_equal_levels(&swings, SwingKind::High, dec!(2), 10).is_none());
    }

    #[test]
    fn clusters_nearby_swing_highs() {
        let swings = vec![
            Swing { idx: 2, price: dec!(100.0), kind: SwingKind::High },
            Swing { idx: 8, price: dec!(100.1), kind: SwingKind::High },
            Swing { idx: 15, price: dec!(95.0), kind: SwingKind::Low },
        ];
        let cluster = detect_equal_levels(&swings, SwingKind::High, dec!(2.0), 20).unwrap();
        assert_eq!(cluster.touch_count, 2);
        assert_eq!(cluster.bars_ago, 12);
    }
}
