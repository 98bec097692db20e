use super::sl_tp::sl_tp_for;
use super::traits::{MarketContext, Strategy};
use crate::domain::signal::EntrySignal;
use crate::domain::trading::OrderSide;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub struct VwapReversion;

impl Strategy for VwapReversion {
    fn id(&self) -> &'static str {
        "vwap_reversion"
    }

    fn evaluate(&self, ctx: &MarketContext) -> Option<EntrySignal> {
        if ctx.atr <= Decimal::ZERO || ctx.current_price <= Decimal::ZERO {
            return None;
        }
        let distance = (ctx.current_price - ctx.vwap).abs();
        let distance_pct = distance / ctx.current_price;
        let distance_atr = distance / ctx.atr;
        if !(distance_pct > dec!(0.005) || distance_atr >= dec!(0.75)) {
            return None;
        }

        let direction = if ctx.rsi < dec!(30) && ctx.current_price < ctx.vwap {
            OrderSide::Buy
        } else if ctx.rsi > dec!(70) && ctx.current_price > ctx.vwap {
            OrderSide::Sell
        } else {
            return None;
        };

        let (sl, tp) = sl_tp_for(self.id(), ctx.session, ctx.rr, ctx.current_price, direction, ctx.effective_atr)?;

        let rsi_distance = (ctx.rsi - dec!(50)).abs();
        let confidence = (dec!(50) + distance_atr * dec!(20) + rsi_distance * dec!(0.5)).clamp(Decimal::ZERO, dec!(100));

        EntrySignal::new(
            self.id(),
            direction,
            ctx.current_price,
            sl,
            tp,
            confidence,
            ctx.confluence_score,
            dec!(0.01),
            format!("vwap mean reversion: {distance_atr:.2} ATR from VWAP, rsi {:.1}", ctx.rsi),
        )
    }
}
