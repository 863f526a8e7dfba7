//! Runtime statistics bookkeeping.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

/// Reserved key: timestamp of scheduler start. Set once.
pub const STAT_RUN_START: &str = "run_start";

/// Reserved key: number of successful user-work invocations.
pub const STAT_ITERATIONS: &str = "iterations";

/// A single statistic value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Integer(i64),
    Float(f64),
    Time(DateTime<Utc>),
}

/// Key/value statistics with snapshot-under-lock reads.
///
/// Writers (the scheduler, or user work recording its own counters) take the
/// write lock for a single map operation. Readers clone the whole map under
/// the read lock, so a snapshot can never observe a torn multi-field update.
#[derive(Debug, Default)]
pub struct Stats {
    inner: RwLock<HashMap<String, StatValue>>,
}

impl Stats {
    /// Create an empty stats map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a stat, replacing any previous value.
    pub fn set(&self, key: impl Into<String>, value: StatValue) {
        self.inner.write().insert(key.into(), value);
    }

    /// Read a single stat.
    pub fn get(&self, key: &str) -> Option<StatValue> {
        self.inner.read().get(key).cloned()
    }

    /// Add `delta` to an integer stat, creating it at `delta` if missing or
    /// non-integer. Returns the new value.
    pub fn bump(&self, key: &str, delta: i64) -> i64 {
        let mut guard = self.inner.write();
        let value = match guard.get(key) {
            Some(StatValue::Integer(current)) => current + delta,
            _ => delta,
        };
        guard.insert(key.to_string(), StatValue::Integer(value));
        value
    }

    /// Number of recorded stats.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether no stats have been recorded.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Snapshot the map and derive `seconds_per_iteration`.
    ///
    /// The derived rate is `None` until the first iteration completes; a
    /// query before any work has run gets a defined sentinel rather than a
    /// division error.
    pub fn snapshot(&self) -> StatsSnapshot {
        let stats = self.inner.read().clone();

        let seconds_per_iteration = match (stats.get(STAT_RUN_START), stats.get(STAT_ITERATIONS)) {
            (Some(StatValue::Time(run_start)), Some(StatValue::Integer(iterations)))
                if *iterations > 0 =>
            {
                let elapsed = (Utc::now() - *run_start).num_milliseconds() as f64 / 1000.0;
                Some(elapsed / *iterations as f64)
            }
            _ => None,
        };

        StatsSnapshot {
            stats,
            seconds_per_iteration,
        }
    }
}

/// Point-in-time view of the stats map plus derived values.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    /// The raw stats at snapshot time.
    #[serde(flatten)]
    pub stats: HashMap<String, StatValue>,

    /// Mean seconds per iteration since `run_start`; `None` (serialized as
    /// `null`) until the first iteration completes.
    pub seconds_per_iteration: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let stats = Stats::new();
        stats.set("queue_depth", StatValue::Integer(3));
        assert_eq!(stats.get("queue_depth"), Some(StatValue::Integer(3)));
        assert_eq!(stats.get("missing"), None);
    }

    #[test]
    fn test_bump_creates_and_increments() {
        let stats = Stats::new();
        assert_eq!(stats.bump(STAT_ITERATIONS, 1), 1);
        assert_eq!(stats.bump(STAT_ITERATIONS, 1), 2);
        assert_eq!(stats.bump(STAT_ITERATIONS, 5), 7);
        assert_eq!(stats.get(STAT_ITERATIONS), Some(StatValue::Integer(7)));
    }

    #[test]
    fn test_bump_replaces_non_integer() {
        let stats = Stats::new();
        stats.set("counter", StatValue::Float(1.5));
        assert_eq!(stats.bump("counter", 2), 2);
    }

    #[test]
    fn test_snapshot_without_iterations_is_guarded() {
        let stats = Stats::new();
        stats.set(STAT_RUN_START, StatValue::Time(Utc::now()));

        let snapshot = stats.snapshot();
        assert!(snapshot.seconds_per_iteration.is_none());

        // iterations == 0 is also guarded
        stats.set(STAT_ITERATIONS, StatValue::Integer(0));
        assert!(stats.snapshot().seconds_per_iteration.is_none());
    }

    #[test]
    fn test_snapshot_derives_seconds_per_iteration() {
        let stats = Stats::new();
        let run_start = Utc::now() - chrono::Duration::seconds(10);
        stats.set(STAT_RUN_START, StatValue::Time(run_start));
        stats.set(STAT_ITERATIONS, StatValue::Integer(5));

        let snapshot = stats.snapshot();
        let rate = snapshot.seconds_per_iteration.unwrap();
        // 10 seconds over 5 iterations, within timer resolution.
        assert!((rate - 2.0).abs() < 0.1, "rate was {}", rate);
    }

    #[test]
    fn test_snapshot_serializes_null_sentinel() {
        let stats = Stats::new();
        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["seconds_per_iteration"], serde_json::Value::Null);
    }

    #[test]
    fn test_snapshot_flattens_stats() {
        let stats = Stats::new();
        stats.set("beats", StatValue::Integer(42));

        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["beats"], serde_json::json!(42));
    }
}
