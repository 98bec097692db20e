mod bollinger_fade;
mod liquidity_sweep;
mod pdh_pdl_rejection;
mod rsi_bounce;
mod sl_tp;
mod traits;
mod vwap_reversion;

pub use bollinger_fade::BollingerFade;
pub use liquidity_sweep::LiquiditySweep;
pub use pdh_pdl_rejection::PdhPdlRejection;
pub use rsi_bounce::RsiBounce;
pub use sl_tp::{calculate_stop_loss, calculate_take_profit, sl_tp_for};
pub use traits::{MarketContext, Strategy};
pub use vwap_reversion::VwapReversion;

/// The five strategies evaluated against every `MarketContext` pass, in a
/// fixed order. Order has no scoring significance; `Scorer` (C7) ranks the
/// resulting signals independently.
pub fn all_strategies() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(VwapReversion),
        Box::new(BollingerFade),
        Box::new(PdhPdlRejection),
        Box::new(RsiBounce),
        Box::new(LiquiditySweep),
    ]
}
