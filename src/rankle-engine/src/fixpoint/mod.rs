//! Recursive ranked fixpoint evaluation.
//!
//! [`FixpointExecutor`] drives a seed expression `w` and a recursive step
//! function `f: &Table -> LazyExpr` to the least fixpoint over ranked
//! tuples. All variants share one loop:
//!
//! 1. Pull a record from `w`. If it improves on the best-known rank for
//!    its value tuple (or the tuple is new), it is admitted: the result
//!    accumulator is updated and the record joins the frontier `n`.
//!    Otherwise it is discarded.
//! 2. When `w` is exhausted: if `n` is empty, the fixpoint is reached and
//!    the accumulator is returned. Otherwise `w` becomes `f(n)`, `n` is
//!    cleared, and pulling continues.
//!
//! # Termination
//!
//! A tuple re-enters the frontier only when it strictly improves its
//! previously recorded rank. Termination therefore relies on ranks along
//! derivation chains being non-increasing (or otherwise convergent), a
//! caller obligation the engine does not check. The
//! [`RuntimeConfig::max_rounds`] guard turns a violated assumption into a
//! `Cancelled` error instead of a hang. The same assumption makes top-K
//! pruning sound: a candidate below the bounded accumulator's minimum rank
//! can only derive further candidates that are below it too.
//!
//! # Failure semantics
//!
//! Schema mismatches raised inside the loop mean the caller-supplied step
//! or transform broke its contract; they surface as `Internal` errors and
//! are never caught and retried.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, trace};

use common_error::{RankleError, RankleResult};

use rankle_core::{Record, Schema, Table, TopKTable};

use crate::executor::{CancellationHandle, EvalContext, RuntimeConfig};
use crate::metrics::{EngineMetrics, MetricsSink};
use crate::operators::LazyExpr;

/// Executor for recursive ranked fixpoint queries.
///
/// Holds the runtime configuration, a cancellation handle shared with the
/// caller, and the metrics sink the per-run counters are recorded into.
#[derive(Debug, Clone)]
pub struct FixpointExecutor {
    config: RuntimeConfig,
    cancel: CancellationHandle,
    sink: MetricsSink,
}

impl Default for FixpointExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl FixpointExecutor {
    /// Create an executor with default configuration.
    pub fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            cancel: CancellationHandle::new(),
            sink: MetricsSink::new(),
        }
    }

    /// Create with custom configuration.
    #[must_use]
    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Create with a caller-supplied cancellation handle.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationHandle) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle that cancels evaluations run by this executor.
    pub fn cancellation_handle(&self) -> CancellationHandle {
        self.cancel.clone()
    }

    /// The sink the per-run metrics are recorded into.
    pub fn metrics(&self) -> MetricsSink {
        self.sink.clone()
    }

    /// The executor configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    fn context(&self) -> EvalContext {
        let mut ctx = EvalContext::new()
            .with_config(self.config.clone())
            .with_cancellation(self.cancel.clone());
        if self.config.collect_metrics {
            ctx = ctx.with_metrics(self.sink.clone());
        }
        ctx
    }

    fn record_metrics(&self, label: &str, metrics: &EngineMetrics) {
        if self.config.collect_metrics {
            self.sink.record(label, metrics);
        }
    }

    /// Unrestricted fixpoint: computes the full least fixpoint.
    ///
    /// Any improving tuple unconditionally replaces its prior entry in the
    /// result and seeds the next round.
    pub fn run(
        &self,
        seed: LazyExpr,
        mut step: impl FnMut(&Table) -> RankleResult<LazyExpr>,
    ) -> RankleResult<Table> {
        let ctx = self.context();
        let start = Instant::now();
        let mut metrics = EngineMetrics::new();
        let mut result = Table::new(Arc::clone(seed.schema()));

        let mut admit = |record: &Record, metrics: &mut EngineMetrics| -> RankleResult<bool> {
            let existing = result.find_same_values(record).cloned();
            if let Some(old) = &existing {
                if old.rank() >= record.rank() {
                    return Ok(false);
                }
                result.delete(old).map_err(contract_violation)?;
            }
            result.insert(record.clone()).map_err(contract_violation)?;
            metrics.add_candidate();
            Ok(true)
        };
        drive(&ctx, &mut metrics, seed, &mut step, &mut admit)?;

        metrics.add_time(start.elapsed());
        self.record_metrics("unrestricted", &metrics);
        Ok(result)
    }

    /// Top-K-pruned fixpoint.
    ///
    /// The accumulator is a [`TopKTable`] with cap `k`. An improving tuple
    /// is admitted iff it replaces an existing entry, or the accumulator
    /// holds fewer than `k` records, or its rank reaches the accumulator's
    /// minimum. Tuples failing the gate are dropped and never seed further
    /// recursion: work that cannot affect the final top-K is pruned as
    /// early as possible (sound under the monotonicity assumption above).
    pub fn run_top_k(
        &self,
        seed: LazyExpr,
        mut step: impl FnMut(&Table) -> RankleResult<LazyExpr>,
        k: usize,
    ) -> RankleResult<TopKTable> {
        let ctx = self.context();
        let start = Instant::now();
        let mut metrics = EngineMetrics::new();
        let mut result = TopKTable::new(Arc::clone(seed.schema()), k)?;

        let mut admit = |record: &Record, metrics: &mut EngineMetrics| -> RankleResult<bool> {
            let existing = result.find_same_values(record).cloned();
            if let Some(old) = &existing {
                if old.rank() >= record.rank() {
                    return Ok(false);
                }
                result.delete(old).map_err(contract_violation)?;
            } else if result.len() >= k && record.rank() < result.min_rank() {
                // Pruning gate: cannot enter the final top-K.
                return Ok(false);
            }
            result.insert(record.clone()).map_err(contract_violation)?;
            metrics.add_candidate();
            Ok(true)
        };
        drive(&ctx, &mut metrics, seed, &mut step, &mut admit)?;

        metrics.add_time(start.elapsed());
        self.record_metrics("top_k", &metrics);
        Ok(result)
    }

    /// Transformed fixpoint: recursion and reported result are decoupled.
    ///
    /// An unbounded table tracks best-known ranks per value tuple and
    /// drives the recursion exactly as [`FixpointExecutor::run`] does,
    /// while `transform` maps each admitted frontier record to a secondary
    /// expression. Every tuple that expression produces competes, by the
    /// same improve-or-discard rule, for a place in the returned
    /// [`TopKTable`] over `result_schema`. The recursion can thus explore
    /// one schema (say, a search space of walks) while reporting a derived
    /// view (say, endpoints only).
    pub fn run_transformed(
        &self,
        seed: LazyExpr,
        step: impl FnMut(&Table) -> RankleResult<LazyExpr>,
        transform: impl FnMut(&Record) -> RankleResult<LazyExpr>,
        result_schema: Arc<Schema>,
        k: usize,
    ) -> RankleResult<TopKTable> {
        self.run_transformed_inner(seed, step, transform, result_schema, k, false, "transformed")
    }

    /// [`FixpointExecutor::run_transformed`] with transform-skipping.
    ///
    /// Skips invoking the transformation entirely when the reported
    /// accumulator is at capacity and the frontier record's own rank is
    /// below its minimum: an optimization, not a semantic change, under
    /// the monotonicity assumption (the transform cannot raise ranks).
    pub fn run_transformed_top_k(
        &self,
        seed: LazyExpr,
        step: impl FnMut(&Table) -> RankleResult<LazyExpr>,
        transform: impl FnMut(&Record) -> RankleResult<LazyExpr>,
        result_schema: Arc<Schema>,
        k: usize,
    ) -> RankleResult<TopKTable> {
        self.run_transformed_inner(
            seed,
            step,
            transform,
            result_schema,
            k,
            true,
            "transformed_top_k",
        )
    }

    fn run_transformed_inner(
        &self,
        seed: LazyExpr,
        mut step: impl FnMut(&Table) -> RankleResult<LazyExpr>,
        mut transform: impl FnMut(&Record) -> RankleResult<LazyExpr>,
        result_schema: Arc<Schema>,
        k: usize,
        skip_below_min: bool,
        label: &str,
    ) -> RankleResult<TopKTable> {
        let ctx = self.context();
        let start = Instant::now();
        let mut metrics = EngineMetrics::new();
        let mut recursion = Table::new(Arc::clone(seed.schema()));
        let mut result = TopKTable::new(Arc::clone(&result_schema), k)?;

        let transform_ctx = ctx.clone();
        let mut admit = |record: &Record, metrics: &mut EngineMetrics| -> RankleResult<bool> {
            let existing = recursion.find_same_values(record).cloned();
            if let Some(old) = &existing {
                if old.rank() >= record.rank() {
                    return Ok(false);
                }
                recursion.delete(old).map_err(contract_violation)?;
            }
            recursion
                .insert(record.clone())
                .map_err(contract_violation)?;

            if skip_below_min && result.len() >= k && record.rank() < result.min_rank() {
                // The transform cannot produce anything above this record's
                // own rank, so nothing it yields could enter the result.
                return Ok(true);
            }

            let mut derived = transform(record)?;
            if **derived.schema() != *result_schema {
                return Err(RankleError::internal(format!(
                    "transform produced schema {}, expected {result_schema}",
                    derived.schema()
                )));
            }
            while let Some(candidate) = derived.next(&transform_ctx)? {
                transform_ctx.check_cancelled()?;
                let best = result.find_same_values(&candidate).cloned();
                if let Some(old) = &best {
                    if old.rank() >= candidate.rank() {
                        continue;
                    }
                    result.delete(old).map_err(contract_violation)?;
                }
                result.insert(candidate).map_err(contract_violation)?;
                metrics.add_candidate();
            }
            Ok(true)
        };
        drive(&ctx, &mut metrics, seed, &mut step, &mut admit)?;

        metrics.add_time(start.elapsed());
        self.record_metrics(label, &metrics);
        Ok(result)
    }
}

/// Map an accumulator failure to the fatal contract-violation error.
///
/// Schemas are validated before the loop starts; a mismatch surfacing here
/// means the caller-supplied step or transform broke its contract.
fn contract_violation(err: RankleError) -> RankleError {
    RankleError::internal(format!("fixpoint accumulator contract violated: {err}"))
}

/// The common loop skeleton shared by all variants.
///
/// Pulls records from the current expression, counts them, delegates
/// admission to the variant, maintains the frontier, and swaps in the next
/// round's expression when the current one is exhausted. Returns when a
/// round produces no improvement (fixpoint reached).
fn drive(
    ctx: &EvalContext,
    metrics: &mut EngineMetrics,
    seed: LazyExpr,
    step: &mut dyn FnMut(&Table) -> RankleResult<LazyExpr>,
    admit: &mut dyn FnMut(&Record, &mut EngineMetrics) -> RankleResult<bool>,
) -> RankleResult<()> {
    let frontier_schema = Arc::clone(seed.schema());
    let mut frontier = Table::new(Arc::clone(&frontier_schema));
    let mut w = seed;
    let mut rounds: u64 = 0;

    loop {
        ctx.check_cancelled()?;
        match w.next(ctx)? {
            Some(record) => {
                metrics.add_generated();
                if admit(&record, metrics)? {
                    trace!(target: "fixpoint", "admitted {record}");
                    // The frontier holds one version per value tuple: a
                    // second improvement in the same round supersedes the
                    // first.
                    if let Some(stale) = frontier.find_same_values(&record).cloned() {
                        frontier.delete(&stale).map_err(contract_violation)?;
                    }
                    frontier.insert(record).map_err(contract_violation)?;
                }
            }
            None => {
                if frontier.is_empty() {
                    break;
                }
                rounds += 1;
                metrics.add_round();
                if let Some(max) = ctx.config.max_rounds {
                    if rounds > max {
                        return Err(RankleError::cancelled(format!(
                            "round guard tripped after {max} round(s); \
                             ranks along derivations may not be non-increasing"
                        )));
                    }
                }
                debug!(
                    target: "fixpoint",
                    "round {rounds}: {} frontier tuple(s)",
                    frontier.len()
                );
                w = step(&frontier)?;
                if **w.schema() != *frontier_schema {
                    return Err(RankleError::internal(format!(
                        "recursive step produced schema {}, expected {frontier_schema}",
                        w.schema()
                    )));
                }
                frontier.clear();
            }
        }
    }
    Ok(())
}
