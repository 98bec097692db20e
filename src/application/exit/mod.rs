mod breakeven;
mod ladder;
mod manager;
mod monitor;
mod persistence;
mod reentry;

pub use breakeven::compute_breakeven;
pub use ladder::{check_exit, LadderContext};
pub use manager::{ExitManager, SharedExitManager};
pub use monitor::{ExitMonitor, ExitMonitorDeps};
pub use persistence::PersistenceStore;
pub use reentry::can_reenter;
