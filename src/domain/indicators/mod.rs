pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod rsi;
pub mod stochastic;
pub mod vwap;

pub use adx::adx;
pub use atr::atr;
pub use bollinger::{bollinger, BollingerBands};
pub use ema::ema;
pub use rsi::rsi;
pub use stochastic::{stochastic, Stochastic};
pub use vwap::{vwap, vwap_momentum_atr_per_bar};
