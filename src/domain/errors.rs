use thiserror::Error;

/// Errors surfaced while assembling or validating a `RangeStructure`.
#[derive(Debug, Error)]
pub enum RangeError {
    #[error("insufficient candles for {kind} range: need >= {need}, have {have}")]
    InsufficientCandles {
        kind: &'static str,
        need: usize,
        have: usize,
    },

    #[error("no range could be formed: {reason}")]
    NotFormed { reason: &'static str },
}

/// Errors from the risk filter pipeline (distinct from a filter simply blocking a
/// trade, which is reported as a normal `RiskChecks` result, not an error).
#[derive(Debug, Error)]
pub enum RiskFilterError {
    #[error("required data source '{source}' unavailable: {reason}")]
    SourceUnavailable { source: &'static str, reason: String },
}

/// Errors from the Exit Manager's persistence and registration API.
#[derive(Debug, Error)]
pub enum ExitManagerError {
    #[error("state file corrupted: {reason}")]
    StateCorruption { reason: String },

    #[error("failed to load persisted state: {reason}")]
    StateLoadFailed { reason: String },

    #[error("failed to save state: {reason}")]
    StateSaveFailed { reason: String },

    #[error("trade {ticket} is not registered")]
    UnknownTicket { ticket: u64 },
}

/// Errors raised while loading or validating JSON configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration field '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to parse configuration JSON: {0}")]
    Parse(String),
}
