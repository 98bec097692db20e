use super::sl_tp::sl_tp_for;
use super::traits::{MarketContext, Strategy};
use crate::domain::signal::EntrySignal;
use crate::domain::trading::OrderSide;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub struct PdhPdlRejection;

impl Strategy for PdhPdlRejection {
    fn id(&self) -> &'static str {
        "pdh_pdl_rejection"
    }

    fn evaluate(&self, ctx: &MarketContext) -> Option<EntrySignal> {
        if ctx.candles.len() < 2 {
            return None;
        }
        let prev = &ctx.candles[ctx.candles.len() - 2];
        let curr = ctx.candles.last().unwrap();
        if !ctx.range.contains(curr.close) {
            return None;
        }
        let body = curr.body();

        if let Some(pdh) = ctx.pdh {
            let prev_violated = prev.high > pdh * (Decimal::ONE + dec!(0.001));
            let closed_below = curr.close < pdh;
            let upper_wick = curr.high - curr.open.max(curr.close);
            if prev_violated && closed_below && upper_wick > body * dec!(1.5) {
                let direction = OrderSide::Sell;
                let (sl, tp) = sl_tp_for(self.id(), ctx.session, ctx.rr, ctx.current_price, direction, ctx.effective_atr)?;
                return EntrySignal::new(
                    self.id(),
                    direction,
                    ctx.current_price,
                    sl,
                    tp,
                    dec!(65),
                    ctx.confluence_score,
                    dec!(0.01),
                    "PDH rejection: prior bar swept PDH, current bar closed back inside with a dominant upper wick",
                );
            }
        }
        if let Some(pdl) = ctx.pdl {
            let prev_violated = prev.low < pdl * (Decimal::ONE - dec!(0.001));
            let closed_above = curr.close > pdl;
            let lower_wick = curr.open.min(curr.close) - curr.low;
            if prev_violated && closed_above && lower_wick > body * dec!(1.5) {
                let direction = OrderSide::Buy;
                let (sl, tp) = sl_tp_for(self.id(), ctx.session, ctx.rr, ctx.current_price, direction, ctx.effective_atr)?;
                return EntrySignal::new(
                    self.id(),
                    direction,
                    ctx.current_price,
                    sl,
                    tp,
                    dec!(65),
                    ctx.confluence_score,
                    dec!(0.01),
                    "PDL rejection: prior bar swept PDL, current bar closed back inside with a dominant lower wick",
                );
            }
        }
        None
    }
}
