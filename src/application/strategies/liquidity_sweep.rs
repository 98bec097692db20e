use super::sl_tp::sl_tp_for;
use super::traits::{MarketContext, Strategy};
use crate::domain::signal::EntrySignal;
use crate::domain::trading::OrderSide;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub struct LiquiditySweep;

impl Strategy for LiquiditySweep {
    fn id(&self) -> &'static str {
        "liquidity_sweep"
    }

    fn evaluate(&self, ctx: &MarketContext) -> Option<EntrySignal> {
        if ctx.candles.len() < 2 {
            return None;
        }
        let prev = &ctx.candles[ctx.candles.len() - 2];
        let curr = ctx.candles.last().unwrap();
        let body = curr.body();

        if let Some(pdh) = ctx.pdh {
            let prev_violated = prev.high > pdh * (Decimal::ONE + dec!(0.002));
            let closed_inside = curr.close < pdh;
            let upper_wick = curr.high - curr.open.max(curr.close);
            let opposite_color = curr.close < curr.open && prev.close > prev.open;
            let wick_dominant = upper_wick > body * dec!(1.5);
            if prev_violated && closed_inside && (opposite_color || wick_dominant) {
                return self.signal(ctx, OrderSide::Sell, "PDH liquidity sweep reversal");
            }
        }
        if let Some(pdl) = ctx.pdl {
            let prev_violated = prev.low < pdl * (Decimal::ONE - dec!(0.002));
            let closed_inside = curr.close > pdl;
            let lower_wick = curr.open.min(curr.close) - curr.low;
            let opposite_color = curr.close > curr.open && prev.close < prev.open;
            let wick_dominant = lower_wick > body * dec!(1.5);
            if prev_violated && closed_inside && (opposite_color || wick_dominant) {
                return self.signal(ctx, OrderSide::Buy, "PDL liquidity sweep reversal");
            }
        }
        None
    }
}

impl LiquiditySweep {
    fn signal(&self, ctx: &MarketContext, direction: OrderSide, reason: &str) -> Option<EntrySignal> {
        let (sl, tp) = sl_tp_for(self.id(), ctx.session, ctx.rr, ctx.current_price, direction, ctx.effective_atr)?;
        let mut confidence = dec!(55);
        if let Some(tape_pressure) = ctx.tape_pressure {
            let same_side = match direction {
                OrderSide::Buy => tape_pressure > Decimal::ZERO,
                OrderSide::Sell => tape_pressure < Decimal::ZERO,
            };
            if same_side {
                confidence += tape_pressure.abs() * dec!(20);
            }
        }
        confidence = confidence.clamp(Decimal::ZERO, dec!(100));
        EntrySignal::new(self.id(), direction, ctx.current_price, sl, tp, confidence, ctx.confluence_score, dec!(0.01), reason)
    }
}
