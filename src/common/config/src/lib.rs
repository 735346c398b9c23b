//! Configuration management for Rankle.
//!
//! Provides declarative configuration for the evaluation engine. The values
//! here are plain serde types; `rankle-engine` turns them into its runtime
//! configuration when an executor is built. Nothing in this crate is global
//! state: a configuration is constructed (or deserialized) by the caller and
//! handed to the engine explicitly.

use serde::{Deserialize, Serialize};

/// Global Rankle configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankleConfig {
    /// Evaluation engine configuration.
    pub execution: ExecutionConfig,
}

/// Evaluation engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Enable metrics collection.
    pub collect_metrics: bool,
    /// Abort a recursive evaluation after this many rounds (None = unbounded).
    ///
    /// Recursive queries terminate only when ranks along derivation chains
    /// are non-increasing or convergent; this guard turns a violated
    /// assumption into a diagnostic abort instead of a hang.
    pub max_rounds: Option<u64>,
    /// Deadline for a single evaluation, in milliseconds (None = none).
    pub deadline_ms: Option<u64>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            collect_metrics: true,
            max_rounds: None,
            deadline_ms: None,
        }
    }
}

impl ExecutionConfig {
    /// Enable or disable metrics collection.
    #[must_use]
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.collect_metrics = enabled;
        self
    }

    /// Set the round guard.
    #[must_use]
    pub fn with_max_rounds(mut self, rounds: u64) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    /// Set the evaluation deadline in milliseconds.
    #[must_use]
    pub fn with_deadline_ms(mut self, ms: u64) -> Self {
        self.deadline_ms = Some(ms);
        self
    }
}
