//! Selection operator.

use std::sync::Arc;

use common_display::TreeNode;
use common_error::RankleResult;

use rankle_core::{Lattice, Record, Schema};

use crate::executor::EvalContext;
use crate::predicate::Predicate;

use super::{LazyExpr, RecordStream};

/// Selection: keeps records to the degree they satisfy a condition.
///
/// Each pulled record is evaluated against the predicate; the output rank
/// is `product(record.rank, degree)`. Records whose combined rank is zero
/// (or below) are pulled but not yielded; the pull loop continues until a
/// positive-rank record or end of stream.
#[derive(Debug)]
pub struct FilterExec {
    input: LazyExpr,
    predicate: Box<dyn Predicate>,
    lattice: Lattice,
    schema: Arc<Schema>,
}

impl FilterExec {
    /// Create a selection, validating the predicate against the input
    /// schema.
    pub fn new(
        input: LazyExpr,
        predicate: Box<dyn Predicate>,
        lattice: Lattice,
    ) -> RankleResult<Self> {
        predicate.validate(input.schema())?;
        let schema = Arc::clone(input.schema());
        Ok(Self {
            input,
            predicate,
            lattice,
            schema,
        })
    }
}

impl TreeNode for FilterExec {
    fn node_name(&self) -> &str {
        "Filter"
    }

    fn node_children(&self) -> Vec<&dyn TreeNode> {
        vec![&*self.input]
    }

    fn node_details(&self) -> Option<String> {
        Some(format!("{:?}", self.predicate))
    }
}

impl RecordStream for FilterExec {
    fn name(&self) -> &'static str {
        "Filter"
    }

    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn next(&mut self, ctx: &EvalContext) -> RankleResult<Option<Record>> {
        loop {
            ctx.check_cancelled()?;
            let Some(record) = self.input.next(ctx)? else {
                return Ok(None);
            };
            let degree = self.predicate.degree(&record)?;
            let rank = self.lattice.product(record.rank(), degree);
            if rank > 0.0 {
                return Ok(Some(record.with_rank(rank)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::TableScan;
    use crate::predicate::{CmpOp, Compare, DegreeFn};
    use rankle_core::testing::{edge_schema, edge_table};
    use rankle_core::{Attribute, DataType, LatticeFamily, Value};

    fn lattice() -> Lattice {
        Lattice::new(LatticeFamily::Goguen)
    }

    #[test]
    fn test_filter_skips_zero_rank() {
        let table = edge_table(&[(1, 2, 0.9), (2, 3, 0.8), (3, 4, 0.7)]);
        let predicate = Compare::new(Attribute::new("from", DataType::Int), CmpOp::Ge, Value::Int(2));
        let mut filter = FilterExec::new(
            Box::new(TableScan::new(&table)),
            Box::new(predicate),
            lattice(),
        )
        .unwrap();

        let ctx = EvalContext::new();
        let mut ranks = Vec::new();
        while let Some(record) = filter.next(&ctx).unwrap() {
            ranks.push(record.rank());
        }
        ranks.sort_by(f64::total_cmp);
        assert_eq!(ranks, vec![0.7, 0.8]);
    }

    #[test]
    fn test_filter_combines_rank_with_degree() {
        let table = edge_table(&[(1, 2, 0.8)]);
        let predicate = DegreeFn::new("half", |_| 0.5);
        let mut filter = FilterExec::new(
            Box::new(TableScan::new(&table)),
            Box::new(predicate),
            lattice(),
        )
        .unwrap();

        let ctx = EvalContext::new();
        let record = filter.next(&ctx).unwrap().unwrap();
        assert!((record.rank() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_filter_rejects_invalid_predicate_at_construction() {
        let table = edge_table(&[(1, 2, 0.9)]);
        let predicate = Compare::new(
            Attribute::new("weight", DataType::Float),
            CmpOp::Gt,
            Value::Float(0.5),
        );
        let err = FilterExec::new(
            Box::new(TableScan::new(&table)),
            Box::new(predicate),
            lattice(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            common_error::RankleError::AttributeNotFound(_)
        ));
    }

    #[test]
    fn test_filter_schema_passthrough() {
        let table = edge_table(&[(1, 2, 0.9)]);
        let filter = FilterExec::new(
            Box::new(TableScan::new(&table)),
            Box::new(DegreeFn::new("all", |_| 1.0)),
            lattice(),
        )
        .unwrap();
        assert_eq!(**filter.schema(), *edge_schema());
    }
}
