pub mod adaptive_anchors;
pub mod confluence;
pub mod data_quality;
pub mod effective_atr;
pub mod nested_alignment;
pub mod pipeline;
pub mod session_filter;
pub mod trade_activity;

pub use adaptive_anchors::should_refresh_anchors;
pub use confluence::{score_confluence, ConfluenceBreakdown, ConfluenceInputs};
pub use data_quality::{check_optional_source, check_required_source, RequiredSourceOutcome, SourceAttempt};
pub use effective_atr::effective_atr;
pub use nested_alignment::nested_alignment;
pub use pipeline::{run_risk_checks, RiskChecks, RiskPipelineInputs};
pub use session_filter::session_blackout;
pub use trade_activity::{trade_activity_floor, TradeActivityInputs};
