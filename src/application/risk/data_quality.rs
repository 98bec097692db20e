use crate::domain::trading::Timeframe;
use chrono::Duration;

/// One attempt to source required data, in fallback order: in-process streamer
/// cache, shared on-disk candle store, direct broker fetch.
#[derive(Debug, Clone, Copy)]
pub struct SourceAttempt {
    pub name: &'static str,
    pub freshness: Option<Duration>,
    pub candle_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredSourceOutcome {
    pub source_used: Option<&'static str>,
    pub blocked: bool,
    pub warnings: Vec<String>,
}

/// Walks `attempts` in fallback order; the trade is blocked only if every
/// attempt is either stale (beyond `tf.freshness_threshold()`) or short of
/// `min_candles`.
pub fn check_required_source(attempts: &[SourceAttempt], tf: Timeframe, min_candles: usize) -> RequiredSourceOutcome {
    let threshold = tf.freshness_threshold();
    let mut warnings = Vec::new();

    for attempt in attempts {
        match attempt.freshness {
            Some(age) if age <= threshold && attempt.candle_count >= min_candles => {
                return RequiredSourceOutcome {
                    source_used: Some(attempt.name),
                    blocked: false,
                    warnings,
                };
            }
            Some(age) if age > threshold => {
                warnings.push(format!(
                    "{} data is stale ({}s old, threshold {}s)",
                    attempt.name,
                    age.num_seconds(),
                    threshold.num_seconds()
                ));
            }
            Some(_) => {
                warnings.push(format!(
                    "{} has only {} candles, need >= {min_candles}",
                    attempt.name, attempt.candle_count
                ));
            }
            None => {
                warnings.push(format!("{} unavailable", attempt.name));
            }
        }
    }

    warnings.push(format!("no source for {tf} met the freshness/count requirement; trade blocked"));
    RequiredSourceOutcome {
        source_used: None,
        blocked: true,
        warnings,
    }
}

/// Optional sources (order flow, news) never block; they degrade to a named
/// skip flag the caller threads into confirmation/activity checks.
pub fn check_optional_source(available: bool, skip_flag: &'static str) -> Option<&'static str> {
    if available {
        None
    } else {
        Some(skip_flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_second_source_when_first_is_stale() {
        let attempts = [
            SourceAttempt { name: "streamer_cache", freshness: Some(Duration::minutes(30)), candle_count: 100 },
            SourceAttempt { name: "disk_store", freshness: Some(Duration::seconds(60)), candle_count: 100 },
        ];
        let outcome = check_required_source(&attempts, Timeframe::M5, 50);
        assert!(!outcome.blocked);
        assert_eq!(outcome.source_used, Some("disk_store"));
    }

    #[test]
    fn blocks_when_every_source_fails() {
        let attempts = [SourceAttempt { name: "streamer_cache", freshness: None, candle_count: 0 }];
        let outcome = check_required_source(&attempts, Timeframe::M5, 50);
        assert!(outcome.blocked);
    }

    #[test]
    fn optional_source_never_blocks_only_flags() {
        assert_eq!(check_optional_source(false, "skip_news_check"), Some("skip_news_check"));
        assert_eq!(check_optional_source(true, "skip_news_check"), None);
    }
}
