pub mod exit_config;
pub mod main_config;
pub mod rr_config;

pub use exit_config::{load_exit_config, BreakevenConfig, ExitConfig, RuleOverride};
pub use main_config::{load_main_config, MainConfig};
pub use rr_config::{load_rr_config, RrConfig, SessionRr, StrategyRr};
