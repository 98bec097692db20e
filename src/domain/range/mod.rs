pub mod construct;
pub mod invalidation;
pub mod types;
pub mod validity;

pub use construct::{build_daily_range, build_dynamic_range, build_session_range, count_touches, TouchClamp};
pub use invalidation::{check_false_range, check_invalidation, cumulative_volume_delta, cvd_divergence_strength};
pub use types::{CriticalGapZones, ExpansionState, FalseRangeFlag, InvalidationFlag, RangeKind, RangeStructure, TouchCount};
pub use validity::{attach_nested, expansion_state, is_valid};
