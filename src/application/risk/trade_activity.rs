use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Debug, Clone, Copy)]
pub struct TradeActivityInputs {
    pub volume: Decimal,
    pub one_hour_mean_volume: Decimal,
    pub price: Decimal,
    pub vwap: Decimal,
    pub atr: Decimal,
    pub minutes_since_last_trade: i64,
    pub high_impact_news_within_60min: bool,
}

/// All four checks must hold: present volume, distance from VWAP, a cooldown
/// since the last trade, and no imminent high/ultra-impact news.
pub fn trade_activity_floor(inputs: &TradeActivityInputs) -> (bool, Vec<&'static str>) {
    let mut reasons = Vec::new();

    if inputs.one_hour_mean_volume <= Decimal::ZERO || inputs.volume < inputs.one_hour_mean_volume * dec!(0.5) {
        reasons.push("volume below 50% of the 1-hour mean");
    }
    if inputs.atr <= Decimal::ZERO || (inputs.price - inputs.vwap).abs() < inputs.atr * dec!(0.5) {
        reasons.push("price within 0.5 ATR of VWAP");
    }
    if inputs.minutes_since_last_trade < 15 {
        reasons.push("less than 15 minutes since the last trade");
    }
    if inputs.high_impact_news_within_60min {
        reasons.push("high/ultra-impact news within the next 60 minutes");
    }

    (reasons.is_empty(), reasons)
}
