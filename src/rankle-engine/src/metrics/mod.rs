//! Metrics collection for recursive evaluation.
//!
//! A pure side channel: counters are updated as tuples flow through the
//! fixpoint loop and never influence computed results. Disabling collection
//! changes nothing but the bookkeeping.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Counters for a single fixpoint evaluation.
#[derive(Debug, Clone, Default)]
pub struct EngineMetrics {
    /// Tuples pulled from any round's candidate stream, admitted or not.
    pub tuples_generated: u64,
    /// Tuples admitted into the result accumulator.
    pub result_candidates: u64,
    /// Completed recursion rounds.
    pub rounds: u64,
    /// Total evaluation time.
    pub exec_time: Duration,
}

impl EngineMetrics {
    /// Create zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tuples_generated: 0,
            result_candidates: 0,
            rounds: 0,
            exec_time: Duration::new(0, 0),
        }
    }

    /// Count a tuple pulled from a candidate stream.
    pub fn add_generated(&mut self) {
        self.tuples_generated += 1;
    }

    /// Count a tuple admitted into the result accumulator.
    pub fn add_candidate(&mut self) {
        self.result_candidates += 1;
    }

    /// Count a completed recursion round.
    pub fn add_round(&mut self) {
        self.rounds += 1;
    }

    /// Add evaluation time.
    pub fn add_time(&mut self, duration: Duration) {
        self.exec_time += duration;
    }

    /// Fraction of generated tuples that were admitted.
    pub fn admission_ratio(&self) -> f64 {
        if self.tuples_generated == 0 {
            1.0
        } else {
            self.result_candidates as f64 / self.tuples_generated as f64
        }
    }
}

impl std::fmt::Display for EngineMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "generated={}, candidates={}, rounds={}, time={:?}",
            self.tuples_generated, self.result_candidates, self.rounds, self.exec_time
        )
    }
}

/// Sink for collecting evaluation metrics, keyed by label.
#[derive(Debug, Clone, Default)]
pub struct MetricsSink {
    metrics: Arc<RwLock<HashMap<String, EngineMetrics>>>,
}

impl MetricsSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge counters into the entry for `label`.
    pub fn record(&self, label: &str, metrics: &EngineMetrics) {
        if let Ok(mut map) = self.metrics.write() {
            let entry = map.entry(label.to_string()).or_default();
            entry.tuples_generated += metrics.tuples_generated;
            entry.result_candidates += metrics.result_candidates;
            entry.rounds += metrics.rounds;
            entry.exec_time += metrics.exec_time;
        }
    }

    /// Snapshot of the counters for `label`.
    pub fn get(&self, label: &str) -> Option<EngineMetrics> {
        self.metrics.read().ok()?.get(label).cloned()
    }

    /// Human-readable report over all labels, sorted by label.
    pub fn report(&self) -> String {
        let Ok(map) = self.metrics.read() else {
            return String::new();
        };
        let mut labels: Vec<&String> = map.keys().collect();
        labels.sort();
        let mut out = String::new();
        for label in labels {
            let _ = writeln!(out, "{label}: {}", map[label]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut metrics = EngineMetrics::new();
        metrics.add_generated();
        metrics.add_generated();
        metrics.add_candidate();
        metrics.add_round();
        assert_eq!(metrics.tuples_generated, 2);
        assert_eq!(metrics.result_candidates, 1);
        assert_eq!(metrics.rounds, 1);
        assert!((metrics.admission_ratio() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sink_merges() {
        let sink = MetricsSink::new();
        let mut metrics = EngineMetrics::new();
        metrics.add_generated();
        sink.record("fixpoint", &metrics);
        sink.record("fixpoint", &metrics);
        assert_eq!(sink.get("fixpoint").unwrap().tuples_generated, 2);
        assert!(sink.get("other").is_none());
    }

    #[test]
    fn test_report_sorted() {
        let sink = MetricsSink::new();
        sink.record("b", &EngineMetrics::new());
        sink.record("a", &EngineMetrics::new());
        let report = sink.report();
        let first = report.lines().next().unwrap();
        assert!(first.starts_with("a:"));
    }
}
