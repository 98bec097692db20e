use crate::domain::trading::Candle;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

pub const DEFAULT_FOOTPRINT_WINDOW_BARS: usize = 100;
pub const DEFAULT_FOOTPRINT_PRECISION: u32 = 2;

/// A volume-at-price distribution over a rolling window of candles.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeFootprint {
    pub poc: Decimal,
    pub value_area_low: Decimal,
    pub value_area_high: Decimal,
    pub hvn_zones: Vec<Decimal>,
    pub lvn_zones: Vec<Decimal>,
    pub current_price_rank: Decimal,
    pub current_price_percent: Decimal,
}

/// Bins volume from the last `window_bars` candles into price levels spaced
/// `10^-precision` apart, distributing each bar's volume uniformly across the
/// levels its `[low, high]` spans, then summarizes point of control, value
/// area, high/low-volume nodes, and where `current_price` ranks.
pub fn rolling_volume_footprint(
    candles: &[Candle],
    window_bars: usize,
    precision: u32,
    current_price: Decimal,
) -> Option<VolumeFootprint> {
    if candles.is_empty() {
        return None;
    }
    let step = Decimal::new(1, precision);
    let n = candles.len().min(window_bars);
    let start = candles.len() - n;

    let mut levels: BTreeMap<Decimal, Decimal> = BTreeMap::new();
    for c in &candles[start..] {
        let low_level = (c.low / step).floor() * step;
        let high_level = (c.high / step).floor() * step;
        let steps = ((high_level - low_level) / step).to_i64().unwrap_or(0).max(0);
        let count = steps + 1;
        let vol_per_level = c.volume / Decimal::from(count);
        for k in 0..=steps {
            let level = low_level + step * Decimal::from(k);
            *levels.entry(level).or_insert(Decimal::ZERO) += vol_per_level;
        }
    }
    if levels.is_empty() {
        return None;
    }

    let total: Decimal = levels.values().sum();
    let mut by_volume: Vec<(Decimal, Decimal)> = levels.iter().map(|(p, v)| (*p, *v)).collect();
    by_volume.sort_by(|a, b| b.1.cmp(&a.1));

    let poc = by_volume[0].0;

    let mut cum = Decimal::ZERO;
    let mut value_area_prices: Vec<Decimal> = Vec::new();
    for (price, vol) in &by_volume {
        if cum >= total * dec!(0.7) && !value_area_prices.is_empty() {
            break;
        }
        value_area_prices.push(*price);
        cum += *vol;
    }
    let value_area_low = value_area_prices.iter().copied().fold(value_area_prices[0], Decimal::min);
    let value_area_high = value_area_prices.iter().copied().fold(value_area_prices[0], Decimal::max);

    let hvn_zones: Vec<Decimal> = by_volume.iter().take(5).map(|(p, _)| *p).collect();
    let mut by_volume_asc = by_volume.clone();
    by_volume_asc.sort_by(|a, b| a.1.cmp(&b.1));
    let lvn_zones: Vec<Decimal> = by_volume_asc
        .iter()
        .filter(|(_, v)| *v > Decimal::ZERO)
        .take(5)
        .map(|(p, _)| *p)
        .collect();

    let current_level = (current_price / step).floor() * step;
    let current_vol = levels.get(&current_level).copied().unwrap_or(Decimal::ZERO);
    let count_le = levels.values().filter(|v| **v <= current_vol).count();
    let current_price_rank = Decimal::from(count_le as i64) * dec!(100) / Decimal::from(levels.len() as i64);
    let current_price_percent = if total > Decimal::ZERO {
        current_vol / total * dec!(100)
    } else {
        Decimal::ZERO
    };

    Some(VolumeFootprint {
        poc,
        value_area_low,
        value_area_high,
        hvn_zones,
        lvn_zones,
        current_price_rank,
        current_price_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn candle(h: f64, l: f64, v: f64) -> Candle {
        Candle::new(
            DateTime::UNIX_EPOCH,
            Decimal::try_from((h + l) / 2.0).unwrap(),
            Decimal::try_from(h).unwrap(),
            Decimal::try_from(l).unwrap(),
            Decimal::try_from((h + l) / 2.0).unwrap(),
            Decimal::try_from(v).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn concentrates_poc_where_volume_overlaps() {
        let candles = vec![
            candle(101.0, 99.0, 100.0),
            candle(101.0, 99.0, 100.0),
            candle(105.0, 104.0, 50.0),
        ];
        let fp = rolling_volume_footprint(&candles, 100, 0, dec!(100)).unwrap();
        assert!(fp.poc >= dec!(99) && fp.poc <= dec!(101));
        assert!(fp.current_price_percent > Decimal::ZERO);
    }

    #[test]
    fn empty_window_returns_none() {
        assert!(rolling_volume_footprint(&[], 100, 2, dec!(100)).is_none());
    }
}
