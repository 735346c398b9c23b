//! Evaluation engine for Rankle.
//!
//! This crate provides the streaming operator layer and the recursive
//! fixpoint executor over the ranked data model of `rankle-core`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌────────────────────┐
//! │ Table / seed │ ──▶ │ streaming operators│ ──▶ │ FixpointExecutor   │
//! │ (rankle-core)│     │ (pull-based next())│     │ (Table / TopKTable)│
//! └──────────────┘     └───────────────────┘     └────────────────────┘
//! ```
//!
//! # Key components
//!
//! ## Streaming operators ([`operators`])
//!
//! All operators implement the [`RecordStream`] trait with a synchronous
//! pull-based API, one ranked record per `next()` call:
//!
//! - **Source**: [`TableScan`], [`EmptyScan`]
//! - **Unary**: [`FilterExec`], [`ProjectExec`]
//! - **Binary**: [`JoinExec`], [`UnionExec`], [`IntersectExec`]
//! - **Adapter**: [`ReplayExec`], which buffers a single-pass stream and
//!   makes it restartable
//!
//! ## Predicates ([`predicate`])
//!
//! Fuzzy conditions yielding degrees in `[0, 1]`, validated against their
//! schemas when an operator is constructed.
//!
//! ## Fixpoint evaluation ([`fixpoint`])
//!
//! [`FixpointExecutor`] drives a seed expression and a recursive step
//! function to the least fixpoint over ranked tuples, unrestricted or
//! pruned to the top-K best results.

pub mod executor;
pub mod fixpoint;
pub mod metrics;
pub mod operators;
pub mod predicate;

pub use executor::{CancellationHandle, EvalContext, RuntimeConfig};
pub use fixpoint::FixpointExecutor;
pub use metrics::{EngineMetrics, MetricsSink};
pub use operators::{
    explain, EmptyScan, FilterExec, IntersectExec, JoinExec, LazyExpr, ProjectExec, RecordStream,
    ReplayExec, TableScan, UnionExec,
};
pub use predicate::{
    AttrCompare, AttrEq, CmpOp, Compare, CompareAttrs, DegreeFn, DegreeJoinFn, JoinPredicate,
    Predicate,
};
