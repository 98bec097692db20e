use super::sl_tp::sl_tp_for;
use super::traits::{MarketContext, Strategy};
use crate::domain::signal::EntrySignal;
use crate::domain::trading::OrderSide;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub struct RsiBounce;

impl Strategy for RsiBounce {
    fn id(&self) -> &'static str {
        "rsi_bounce"
    }

    fn evaluate(&self, ctx: &MarketContext) -> Option<EntrySignal> {
        let direction = if ctx.rsi < dec!(30) && ctx.stochastic.k < dec!(20) && ctx.stochastic.d < dec!(20) {
            OrderSide::Buy
        } else if ctx.rsi > dec!(70) && ctx.stochastic.k > dec!(80) && ctx.stochastic.d > dec!(80) {
            OrderSide::Sell
        } else {
            return None;
        };

        let (sl, tp) = sl_tp_for(self.id(), ctx.session, ctx.rr, ctx.current_price, direction, ctx.effective_atr)?;

        let rsi_extreme = (ctx.rsi - dec!(50)).abs();
        let stoch_extreme = (ctx.stochastic.k - dec!(50)).abs();
        let confidence = (dec!(40) + rsi_extreme * dec!(0.6) + stoch_extreme * dec!(0.2)).clamp(Decimal::ZERO, dec!(100));

        EntrySignal::new(
            self.id(),
            direction,
            ctx.current_price,
            sl,
            tp,
            confidence,
            ctx.confluence_score,
            dec!(0.01),
            format!("RSI/Stochastic bounce: rsi={:.1}, %K={:.1}, %D={:.1}", ctx.rsi, ctx.stochastic.k, ctx.stochastic.d),
        )
    }
}
