//! Nested-loop join operator.

use std::collections::HashSet;
use std::sync::Arc;

use common_display::TreeNode;
use common_error::RankleResult;

use rankle_core::{Attribute, Lattice, Record, Schema};

use crate::executor::EvalContext;
use crate::predicate::JoinPredicate;

use super::{LazyExpr, RecordStream, ReplayExec};

/// Nested-loop join with fuzzy on-clauses.
///
/// The left source is pulled one record at a time; for each left record
/// the right side is scanned in full through a [`ReplayExec`] (one live
/// pass over the source, then buffer replays). Every on-clause evaluates
/// to a degree and the degrees combine by infimum; pairs whose conjunctive
/// degree is zero are skipped, and the emitted rank is
/// `product(left.rank, product(right.rank, on_degree))`. Zero-rank pairs
/// are never yielded.
///
/// Attribute names occurring on both sides are disambiguated in the output
/// schema with `left.` / `right.` prefixes; non-colliding names pass
/// through untouched.
#[derive(Debug)]
pub struct JoinExec {
    left: LazyExpr,
    right: ReplayExec,
    on: Vec<Box<dyn JoinPredicate>>,
    lattice: Lattice,
    schema: Arc<Schema>,
    current_left: Option<Record>,
}

impl JoinExec {
    /// Create a join, validating every on-clause against both input
    /// schemas and resolving output-schema name collisions.
    pub fn new(
        left: LazyExpr,
        right: LazyExpr,
        on: Vec<Box<dyn JoinPredicate>>,
        lattice: Lattice,
    ) -> RankleResult<Self> {
        for clause in &on {
            clause.validate(left.schema(), right.schema())?;
        }
        let schema = Arc::new(Self::joined_schema(left.schema(), right.schema())?);
        Ok(Self {
            left,
            right: ReplayExec::new(right),
            on,
            lattice,
            schema,
            current_left: None,
        })
    }

    fn joined_schema(left: &Schema, right: &Schema) -> RankleResult<Schema> {
        let left_names: HashSet<&str> = left.iter().map(Attribute::name).collect();
        let colliding: HashSet<String> = right
            .iter()
            .map(Attribute::name)
            .filter(|name| left_names.contains(name))
            .map(str::to_string)
            .collect();

        let mut attributes = Vec::with_capacity(left.len() + right.len());
        for attr in left.iter() {
            if colliding.contains(attr.name()) {
                attributes.push(attr.renamed(format!("left.{}", attr.name())));
            } else {
                attributes.push(attr.clone());
            }
        }
        for attr in right.iter() {
            if colliding.contains(attr.name()) {
                attributes.push(attr.renamed(format!("right.{}", attr.name())));
            } else {
                attributes.push(attr.clone());
            }
        }
        Schema::new(attributes)
    }

    fn on_degree(&self, left: &Record, right: &Record) -> RankleResult<f64> {
        let mut degree = 1.0;
        for clause in &self.on {
            degree = self.lattice.infimum(degree, clause.degree(left, right)?);
            if degree <= 0.0 {
                return Ok(0.0);
            }
        }
        Ok(degree)
    }
}

impl TreeNode for JoinExec {
    fn node_name(&self) -> &str {
        "Join"
    }

    fn node_children(&self) -> Vec<&dyn TreeNode> {
        vec![&*self.left, &self.right]
    }

    fn node_details(&self) -> Option<String> {
        Some(format!("{} on-clause(s)", self.on.len()))
    }
}

impl RecordStream for JoinExec {
    fn name(&self) -> &'static str {
        "Join"
    }

    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn next(&mut self, ctx: &EvalContext) -> RankleResult<Option<Record>> {
        loop {
            ctx.check_cancelled()?;
            if self.current_left.is_none() {
                match self.left.next(ctx)? {
                    Some(record) => {
                        self.current_left = Some(record);
                        self.right.restart();
                    }
                    None => return Ok(None),
                }
            }
            let Some(left) = self.current_left.clone() else {
                continue;
            };
            match self.right.next(ctx)? {
                Some(right) => {
                    let degree = self.on_degree(&left, &right)?;
                    if degree <= 0.0 {
                        continue;
                    }
                    let rank = self
                        .lattice
                        .product(left.rank(), self.lattice.product(right.rank(), degree));
                    if rank <= 0.0 {
                        continue;
                    }
                    let mut values = left.values().to_vec();
                    values.extend_from_slice(right.values());
                    return Ok(Some(Record::new(Arc::clone(&self.schema), values, rank)?));
                }
                None => {
                    // Right side exhausted for this left record
                    self.current_left = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::TableScan;
    use crate::predicate::AttrEq;
    use rankle_core::testing::edge_table;
    use rankle_core::{DataType, LatticeFamily, Table};

    fn lattice() -> Lattice {
        Lattice::new(LatticeFamily::Goguen)
    }

    fn reach_join(walks: &Table, edges: &Table) -> JoinExec {
        JoinExec::new(
            Box::new(TableScan::new(walks)),
            Box::new(TableScan::new(edges)),
            vec![Box::new(AttrEq::new(
                Attribute::new("to", DataType::Int),
                Attribute::new("from", DataType::Int),
            ))],
            lattice(),
        )
        .unwrap()
    }

    #[test]
    fn test_join_rank_is_product_of_ranks_and_degree() {
        let walks = edge_table(&[(1, 2, 0.9)]);
        let edges = edge_table(&[(2, 3, 0.8), (3, 4, 0.7)]);
        let mut join = reach_join(&walks, &edges);

        let ctx = EvalContext::new();
        let record = join.next(&ctx).unwrap().unwrap();
        assert!((record.rank() - 0.72).abs() < 1e-12);
        assert!(join.next(&ctx).unwrap().is_none());
    }

    #[test]
    fn test_join_schema_prefixes_colliding_names() {
        let walks = edge_table(&[(1, 2, 0.9)]);
        let edges = edge_table(&[(2, 3, 0.8)]);
        let join = reach_join(&walks, &edges);

        let names: Vec<&str> = join.schema().iter().map(Attribute::name).collect();
        assert_eq!(
            names,
            vec!["left.from", "left.to", "right.from", "right.to"]
        );
    }

    #[test]
    fn test_join_scans_right_once_per_left_record() {
        let walks = edge_table(&[(1, 2, 0.9), (5, 2, 0.6)]);
        let edges = edge_table(&[(2, 3, 0.8), (2, 4, 0.5)]);
        let mut join = reach_join(&walks, &edges);

        let ctx = EvalContext::new();
        let mut count = 0;
        while join.next(&ctx).unwrap().is_some() {
            count += 1;
        }
        // Both walks match both edges from node 2
        assert_eq!(count, 4);
    }

    #[test]
    fn test_join_drops_zero_rank_pairs() {
        let walks = edge_table(&[(1, 2, 0.0)]);
        let edges = edge_table(&[(2, 3, 0.8)]);
        let mut join = reach_join(&walks, &edges);

        let ctx = EvalContext::new();
        assert!(join.next(&ctx).unwrap().is_none());
    }

    #[test]
    fn test_join_without_collisions_keeps_names() {
        let walks = edge_table(&[(1, 2, 0.9)]);
        let mut renamed = Vec::new();
        for attr in walks.schema().iter() {
            renamed.push((
                attr.renamed(format!("w_{}", attr.name())),
                attr.clone(),
            ));
        }
        let projected = crate::operators::ProjectExec::new(
            Box::new(TableScan::new(&walks)),
            renamed,
        )
        .unwrap();

        let edges = edge_table(&[(2, 3, 0.8)]);
        let join = JoinExec::new(
            Box::new(projected),
            Box::new(TableScan::new(&edges)),
            vec![Box::new(AttrEq::new(
                Attribute::new("w_to", DataType::Int),
                Attribute::new("from", DataType::Int),
            ))],
            lattice(),
        )
        .unwrap();

        let names: Vec<&str> = join.schema().iter().map(Attribute::name).collect();
        assert_eq!(names, vec!["w_from", "w_to", "from", "to"]);
    }
}
