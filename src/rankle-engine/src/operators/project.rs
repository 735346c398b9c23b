//! Projection operator.

use std::sync::Arc;

use common_display::TreeNode;
use common_error::{RankleError, RankleResult};

use rankle_core::{Attribute, Record, Schema};

use crate::executor::EvalContext;

use super::{LazyExpr, RecordStream};

/// Projection: renames and subselects attributes via a fixed
/// target → source mapping. Ranks pass through unchanged.
///
/// The whole mapping is validated at construction: a source attribute
/// absent from the input schema is `AttributeNotFound` (the target is not
/// derivable from a subschema of the input), and a target whose domain
/// differs from its source's is `TypeMismatch`.
#[derive(Debug)]
pub struct ProjectExec {
    input: LazyExpr,
    schema: Arc<Schema>,
    /// For each output position, the input position it reads.
    positions: Vec<usize>,
}

impl ProjectExec {
    /// Create a projection from `(target, source)` attribute pairs.
    pub fn new(input: LazyExpr, mapping: Vec<(Attribute, Attribute)>) -> RankleResult<Self> {
        let input_schema = input.schema();
        let mut targets = Vec::with_capacity(mapping.len());
        let mut positions = Vec::with_capacity(mapping.len());
        for (target, source) in &mapping {
            let pos = input_schema.index_of(source).ok_or_else(|| {
                RankleError::not_subschema(format!(
                    "projection source {source} not in input schema {input_schema}"
                ))
            })?;
            if target.data_type() != source.data_type() {
                return Err(RankleError::type_mismatch(format!(
                    "projection target {target} and source {source} have different domains"
                )));
            }
            targets.push(target.clone());
            positions.push(pos);
        }
        let schema = Arc::new(Schema::new(targets)?);
        Ok(Self {
            input,
            schema,
            positions,
        })
    }

    /// Keep the listed attributes under their own names.
    pub fn columns(input: LazyExpr, attributes: Vec<Attribute>) -> RankleResult<Self> {
        let mapping = attributes.into_iter().map(|a| (a.clone(), a)).collect();
        Self::new(input, mapping)
    }
}

impl TreeNode for ProjectExec {
    fn node_name(&self) -> &str {
        "Project"
    }

    fn node_children(&self) -> Vec<&dyn TreeNode> {
        vec![&*self.input]
    }

    fn node_details(&self) -> Option<String> {
        Some(self.schema.to_string())
    }
}

impl RecordStream for ProjectExec {
    fn name(&self) -> &'static str {
        "Project"
    }

    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn next(&mut self, ctx: &EvalContext) -> RankleResult<Option<Record>> {
        let Some(record) = self.input.next(ctx)? else {
            return Ok(None);
        };
        let values = self
            .positions
            .iter()
            .map(|&pos| {
                record.value_at(pos).cloned().ok_or_else(|| {
                    RankleError::internal(format!("validated position {pos} missing at evaluation"))
                })
            })
            .collect::<RankleResult<Vec<_>>>()?;
        Ok(Some(Record::new(
            Arc::clone(&self.schema),
            values,
            record.rank(),
        )?))
    }
}
