//! Lazy union and intersection operators.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;

use common_display::TreeNode;
use common_error::{RankleError, RankleResult};

use rankle_core::{Lattice, Record, Schema, Value};

use crate::executor::EvalContext;

use super::{LazyExpr, RecordStream};

/// Heap entry ordered by rank (then value hash, for a deterministic pop
/// order among rank ties).
#[derive(Debug)]
struct RankedEntry(Record);

impl PartialEq for RankedEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankedEntry {}

impl PartialOrd for RankedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankedEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .rank()
            .total_cmp(&other.0.rank())
            .then_with(|| self.0.value_hash().cmp(&other.0.value_hash()))
    }
}

#[derive(Debug)]
enum MergeState {
    Pending,
    Draining(BinaryHeap<RankedEntry>),
}

/// Pull a stream dry, keeping the best rank per value tuple.
///
/// A side that contains the same tuple several times contributes its
/// supremum: a tuple supported by two derivations on one side is no
/// better than its best derivation.
fn drain_best(
    stream: &mut LazyExpr,
    ctx: &EvalContext,
) -> RankleResult<HashMap<Arc<[Value]>, Record>> {
    let mut best: HashMap<Arc<[Value]>, Record> = HashMap::new();
    while let Some(record) = stream.next(ctx)? {
        ctx.check_cancelled()?;
        match best.entry(record.shared_values()) {
            std::collections::hash_map::Entry::Occupied(mut entry) => {
                if entry.get().rank() < record.rank() {
                    entry.insert(record);
                }
            }
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(record);
            }
        }
    }
    Ok(best)
}

fn require_equal_schemas(left: &Schema, right: &Schema) -> RankleResult<()> {
    if left == right {
        Ok(())
    } else {
        Err(RankleError::schema_mismatch(format!(
            "operand schemas differ: {left} vs {right}"
        )))
    }
}

/// Lazy union: merges two streams over the same schema.
///
/// A value tuple appearing on both sides is emitted once with rank
/// `supremum(left, right)`; a tuple distinct to one side passes through.
/// Like the sort-style blocking operators, the first `next()` drains both
/// inputs and fills a priority queue; results are then served in
/// descending rank order.
#[derive(Debug)]
pub struct UnionExec {
    left: LazyExpr,
    right: LazyExpr,
    lattice: Lattice,
    schema: Arc<Schema>,
    state: MergeState,
}

impl UnionExec {
    /// Create a union; the operand schemas must be equal.
    pub fn new(left: LazyExpr, right: LazyExpr, lattice: Lattice) -> RankleResult<Self> {
        require_equal_schemas(left.schema(), right.schema())?;
        let schema = Arc::clone(left.schema());
        Ok(Self {
            left,
            right,
            lattice,
            schema,
            state: MergeState::Pending,
        })
    }

    fn build(&mut self, ctx: &EvalContext) -> RankleResult<BinaryHeap<RankedEntry>> {
        let left = drain_best(&mut self.left, ctx)?;
        let mut right = drain_best(&mut self.right, ctx)?;

        let mut heap = BinaryHeap::with_capacity(left.len() + right.len());
        for (key, record) in left {
            let merged = match right.remove(&key) {
                Some(other) => {
                    let rank = self.lattice.supremum(record.rank(), other.rank());
                    record.with_rank(rank)
                }
                None => record,
            };
            heap.push(RankedEntry(merged));
        }
        for record in right.into_values() {
            heap.push(RankedEntry(record));
        }
        Ok(heap)
    }
}

impl TreeNode for UnionExec {
    fn node_name(&self) -> &str {
        "Union"
    }

    fn node_children(&self) -> Vec<&dyn TreeNode> {
        vec![&*self.left, &*self.right]
    }
}

impl RecordStream for UnionExec {
    fn name(&self) -> &'static str {
        "Union"
    }

    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn next(&mut self, ctx: &EvalContext) -> RankleResult<Option<Record>> {
        if matches!(self.state, MergeState::Pending) {
            let heap = self.build(ctx)?;
            self.state = MergeState::Draining(heap);
        }
        match &mut self.state {
            MergeState::Draining(heap) => Ok(heap.pop().map(|entry| entry.0)),
            MergeState::Pending => Err(RankleError::internal("union state not built")),
        }
    }
}

/// Lazy intersection: keeps value tuples present on both sides.
///
/// Matching tuples are emitted with rank `infimum(left, right)`;
/// tuples distinct to one side are dropped. Same blocking merge machinery
/// as [`UnionExec`].
#[derive(Debug)]
pub struct IntersectExec {
    left: LazyExpr,
    right: LazyExpr,
    lattice: Lattice,
    schema: Arc<Schema>,
    state: MergeState,
}

impl IntersectExec {
    /// Create an intersection; the operand schemas must be equal.
    pub fn new(left: LazyExpr, right: LazyExpr, lattice: Lattice) -> RankleResult<Self> {
        require_equal_schemas(left.schema(), right.schema())?;
        let schema = Arc::clone(left.schema());
        Ok(Self {
            left,
            right,
            lattice,
            schema,
            state: MergeState::Pending,
        })
    }

    fn build(&mut self, ctx: &EvalContext) -> RankleResult<BinaryHeap<RankedEntry>> {
        let left = drain_best(&mut self.left, ctx)?;
        let mut right = drain_best(&mut self.right, ctx)?;

        let mut heap = BinaryHeap::new();
        for (key, record) in left {
            if let Some(other) = right.remove(&key) {
                let rank = self.lattice.infimum(record.rank(), other.rank());
                heap.push(RankedEntry(record.with_rank(rank)));
            }
        }
        Ok(heap)
    }
}

impl TreeNode for IntersectExec {
    fn node_name(&self) -> &str {
        "Intersect"
    }

    fn node_children(&self) -> Vec<&dyn TreeNode> {
        vec![&*self.left, &*self.right]
    }
}

impl RecordStream for IntersectExec {
    fn name(&self) -> &'static str {
        "Intersect"
    }

    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn next(&mut self, ctx: &EvalContext) -> RankleResult<Option<Record>> {
        if matches!(self.state, MergeState::Pending) {
            let heap = self.build(ctx)?;
            self.state = MergeState::Draining(heap);
        }
        match &mut self.state {
            MergeState::Draining(heap) => Ok(heap.pop().map(|entry| entry.0)),
            MergeState::Pending => Err(RankleError::internal("intersect state not built")),
        }
    }
}
