//! Evaluation context threaded through every `next()` call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use common_config::ExecutionConfig;
use common_error::{RankleError, RankleResult};

use crate::metrics::MetricsSink;

/// Runtime configuration for evaluation.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Enable metrics collection.
    pub collect_metrics: bool,
    /// Abort a recursive evaluation after this many rounds (None = unbounded).
    ///
    /// The fixpoint loop terminates on its own only when ranks along
    /// derivation chains are non-increasing or convergent, a caller
    /// obligation the engine cannot check. This guard turns a violated
    /// assumption into a `Cancelled` error naming the round count.
    pub max_rounds: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            collect_metrics: true,
            max_rounds: None,
        }
    }
}

impl RuntimeConfig {
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
}

impl From<&ExecutionConfig> for RuntimeConfig {
    fn from(config: &ExecutionConfig) -> Self {
        Self {
            collect_metrics: config.collect_metrics,
            max_rounds: config.max_rounds,
        }
    }
}

/// Cooperative cancellation token with an optional deadline.
///
/// Cheaply clonable; all clones observe the same `cancel()`. The recursive
/// fixpoint loop is the only unbounded-runtime component of the engine, so
/// it and the operator pull loops poll this token between records.
#[derive(Debug, Clone, Default)]
pub struct CancellationHandle {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationHandle {
    /// Create a handle that only trips on `cancel()`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle that additionally trips after `timeout`.
    pub fn with_deadline(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested or the deadline passed.
    pub fn is_cancelled(&self) -> bool {
        if self.cancelled.load(Ordering::SeqCst) {
            return true;
        }
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Context shared by every operator in one evaluation.
///
/// Read-only to operators; carries the runtime configuration, the
/// cancellation token, and the optional metrics sink.
#[derive(Debug, Clone)]
pub struct EvalContext {
    /// Runtime configuration.
    pub config: RuntimeConfig,
    /// Cancellation token.
    cancel: CancellationHandle,
    /// Metrics sink (None when collection is disabled).
    pub metrics: Option<MetricsSink>,
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EvalContext {
    /// Create a context with default configuration.
    pub fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            cancel: CancellationHandle::new(),
            metrics: Some(MetricsSink::new()),
        }
    }

    /// Create with custom configuration.
    #[must_use]
    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        if !config.collect_metrics {
            self.metrics = None;
        }
        self.config = config;
        self
    }

    /// Create with a cancellation handle.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationHandle) -> Self {
        self.cancel = cancel;
        self
    }

    /// Create with a metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: MetricsSink) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Disable metrics collection.
    #[must_use]
    pub fn without_metrics(mut self) -> Self {
        self.metrics = None;
        self
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Error out if cancellation was requested.
    pub fn check_cancelled(&self) -> RankleResult<()> {
        if self.is_cancelled() {
            Err(RankleError::cancelled("evaluation cancelled"))
        } else {
            Ok(())
        }
    }
}
