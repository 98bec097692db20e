use super::sl_tp::sl_tp_for;
use super::traits::{MarketContext, Strategy};
use crate::domain::indicators::bollinger;
use crate::domain::signal::EntrySignal;
use crate::domain::trading::OrderSide;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub struct BollingerFade;

impl Strategy for BollingerFade {
    fn id(&self) -> &'static str {
        "bollinger_fade"
    }

    fn evaluate(&self, ctx: &MarketContext) -> Option<EntrySignal> {
        if ctx.current_price <= Decimal::ZERO {
            return None;
        }
        let bb = bollinger(ctx.candles, crate::domain::indicators::bollinger::DEFAULT_BB_PERIOD, crate::domain::indicators::bollinger::DEFAULT_BB_SIGMA);
        let tol = dec!(0.001) * ctx.current_price;

        let near_lower = (ctx.current_price - bb.lower).abs() <= tol;
        let near_upper = (ctx.current_price - bb.upper).abs() <= tol;

        let direction = if near_lower && ctx.rsi < dec!(30) {
            OrderSide::Buy
        } else if near_upper && ctx.rsi > dec!(70) {
            OrderSide::Sell
        } else {
            return None;
        };

        let (sl, tp) = sl_tp_for(self.id(), ctx.session, ctx.rr, ctx.current_price, direction, ctx.effective_atr)?;

        let mut confidence = dec!(55);
        if ctx.one_hour_mean_volume > Decimal::ZERO && ctx.current_volume < ctx.one_hour_mean_volume * dec!(0.9) {
            confidence += dec!(15);
        }
        let rsi_distance = (ctx.rsi - dec!(50)).abs();
        confidence = (confidence + rsi_distance * dec!(0.3)).clamp(Decimal::ZERO, dec!(100));

        EntrySignal::new(
            self.id(),
            direction,
            ctx.current_price,
            sl,
            tp,
            confidence,
            ctx.confluence_score,
            dec!(0.01),
            "bollinger band fade",
        )
    }
}
