pub mod error_handler;
pub mod exit;
pub mod mtf;
pub mod orchestrator;
pub mod retry;
pub mod risk;
pub mod scorer;
pub mod strategies;
