//! Streaming operator trait and utilities.

use std::sync::Arc;

use common_display::{render_tree, TreeNode};
use common_error::RankleResult;

use rankle_core::{Record, Schema};

use crate::executor::EvalContext;

/// A pull-based stream of ranked records.
///
/// Streams are conceptually single-pass: once `next()` returns `None`, the
/// stream stays exhausted. Wrap a stream in
/// [`ReplayExec`](crate::operators::ReplayExec) when it must be scanned
/// more than once.
///
/// # Contract
///
/// - `next()` returns `Ok(Some(record))` while data is available and
///   `Ok(None)` when exhausted.
/// - Emitted records share the stream's `schema()`.
/// - Operators must not mutate upstream data.
/// - Pull loops that can skip many records honor the context's
///   cancellation token.
pub trait RecordStream: TreeNode + std::fmt::Debug {
    /// Operator name for display.
    fn name(&self) -> &'static str;

    /// Output schema.
    fn schema(&self) -> &Arc<Schema>;

    /// Pull the next record.
    fn next(&mut self, ctx: &EvalContext) -> RankleResult<Option<Record>>;
}

/// A boxed stream: the engine's lazy-expression type.
pub type LazyExpr = Box<dyn RecordStream>;

/// Render an operator tree as an indented EXPLAIN string.
pub fn explain(root: &dyn RecordStream) -> String {
    render_tree(root)
}
