use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Fixed error-tag severity map (§7). Severity controls logging/alerting
/// only; it never aborts the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Critical,
    High,
    Medium,
    Info,
}

/// Classifies a known error tag. Unrecognized tags default to `Medium` —
/// loud enough to notice, not loud enough to auto-disable on a typo.
pub fn classify(tag: &str) -> ErrorSeverity {
    match tag {
        "mt5_connection_lost" | "state_corruption" | "state_load_failed" | "orphaned_trades" => ErrorSeverity::Critical,
        "exit_order_fails" | "state_save_failed" | "range_invalidation_during_trade" | "range_detection_fails" | "order_execution_fails" => {
            ErrorSeverity::High
        }
        "data_stale_warning" | "data_source_unavailable" | "monitoring_error" | "price_validation_fails" => ErrorSeverity::Medium,
        "breakeven_moved" => ErrorSeverity::Info,
        _ => ErrorSeverity::Medium,
    }
}

const AUTO_DISABLE_WINDOW: Duration = Duration::from_secs(3600);
const AUTO_DISABLE_THRESHOLD: usize = 3;

/// Tracks a rolling 1-hour window of CRITICAL events and flips an internal
/// flag once `AUTO_DISABLE_THRESHOLD` occur, halting order dispatch while
/// analysis and monitoring keep running.
pub struct ErrorHandler {
    critical_events: Mutex<VecDeque<Instant>>,
}

impl ErrorHandler {
    pub fn new() -> Self {
        Self { critical_events: Mutex::new(VecDeque::new()) }
    }

    /// Records `tag` at severity `classify(tag)`, returning that severity and
    /// whether order dispatch should now be disabled.
    pub fn record(&self, tag: &str, now: Instant) -> (ErrorSeverity, bool) {
        let severity = classify(tag);
        if severity != ErrorSeverity::Critical {
            return (severity, self.is_disabled(now));
        }

        let mut events = self.critical_events.lock().expect("error handler lock poisoned");
        events.push_back(now);
        while let Some(&front) = events.front() {
            if now.duration_since(front) > AUTO_DISABLE_WINDOW {
                events.pop_front();
            } else {
                break;
            }
        }
        (ErrorSeverity::Critical, events.len() >= AUTO_DISABLE_THRESHOLD)
    }

    pub fn is_disabled(&self, now: Instant) -> bool {
        let mut events = self.critical_events.lock().expect("error handler lock poisoned");
        while let Some(&front) = events.front() {
            if now.duration_since(front) > AUTO_DISABLE_WINDOW {
                events.pop_front();
            } else {
                break;
            }
        }
        events.len() >= AUTO_DISABLE_THRESHOLD
    }
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new()
    }
}
