//! Source operators.

use std::collections::VecDeque;
use std::sync::Arc;

use common_display::TreeNode;
use common_error::{RankleError, RankleResult};

use rankle_core::{Record, Schema, Table};

use crate::executor::EvalContext;

use super::RecordStream;

/// Lazy view over an eager table.
///
/// Snapshots the table's records at construction; the source table may be
/// mutated or dropped afterwards without affecting the scan. Like every
/// stream, a scan never resets; wrap it in `ReplayExec` for multi-pass
/// use.
#[derive(Debug)]
pub struct TableScan {
    schema: Arc<Schema>,
    records: VecDeque<Record>,
}

impl TableScan {
    /// Scan all records of a table.
    pub fn new(table: &Table) -> Self {
        Self {
            schema: Arc::clone(table.schema()),
            records: table.records().into(),
        }
    }

    /// Scan an explicit record list, validating it against `schema`.
    pub fn from_records(schema: Arc<Schema>, records: Vec<Record>) -> RankleResult<Self> {
        for record in &records {
            if !(Arc::ptr_eq(record.schema(), &schema) || **record.schema() == *schema) {
                return Err(RankleError::schema_mismatch(format!(
                    "record schema {} differs from scan schema {schema}",
                    record.schema()
                )));
            }
        }
        Ok(Self {
            schema,
            records: records.into(),
        })
    }
}

impl TreeNode for TableScan {
    fn node_name(&self) -> &str {
        "TableScan"
    }

    fn node_children(&self) -> Vec<&dyn TreeNode> {
        vec![]
    }

    fn node_details(&self) -> Option<String> {
        Some(format!("{} pending", self.records.len()))
    }
}

impl RecordStream for TableScan {
    fn name(&self) -> &'static str {
        "TableScan"
    }

    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn next(&mut self, _ctx: &EvalContext) -> RankleResult<Option<Record>> {
        Ok(self.records.pop_front())
    }
}

/// A stream that yields nothing.
#[derive(Debug)]
pub struct EmptyScan {
    schema: Arc<Schema>,
}

impl EmptyScan {
    /// Empty stream over a schema.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self { schema }
    }
}

impl TreeNode for EmptyScan {
    fn node_name(&self) -> &str {
        "EmptyScan"
    }

    fn node_children(&self) -> Vec<&dyn TreeNode> {
        vec![]
    }
}

impl RecordStream for EmptyScan {
    fn name(&self) -> &'static str {
        "EmptyScan"
    }

    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn next(&mut self, _ctx: &EvalContext) -> RankleResult<Option<Record>> {
        Ok(None)
    }
}
