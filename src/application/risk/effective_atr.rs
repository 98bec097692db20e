use rust_decimal::Decimal;

/// `max(ATR_5m, bb_width_multiplier * bb_width * price_mid)` — the larger of
/// the raw ATR and a BB-width-implied ATR, so a rapid volatility expansion
/// that hasn't yet fed through to the rolling ATR average still widens stops.
pub fn effective_atr(atr_5m: Decimal, bb_width: Decimal, price_mid: Decimal, bb_width_multiplier: Decimal) -> Decimal {
    atr_5m.max(bb_width_multiplier * bb_width * price_mid)
}
