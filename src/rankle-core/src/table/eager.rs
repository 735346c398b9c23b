//! Unbounded eager table.

use std::collections::HashMap;
use std::sync::Arc;

use common_error::{RankleError, RankleResult};

use crate::record::Record;
use crate::schema::Schema;

use super::ValueKey;

/// A schema plus a set of records deduplicated by full equality.
///
/// Every contained record's schema equals the table's schema; inserting or
/// deleting a record with a different schema is a `SchemaMismatch`. Records
/// are additionally grouped by value tuple, which makes
/// [`Table::find_same_values`], the lookup behind all rank-improvement
/// logic, a hash probe instead of a scan.
///
/// Evaluation is single-threaded and pull-based; a table must not be
/// written by more than one in-flight evaluation at a time.
#[derive(Debug, Clone)]
pub struct Table {
    schema: Arc<Schema>,
    groups: HashMap<ValueKey, Vec<Record>>,
    len: usize,
}

impl Table {
    /// Create an empty table over a schema.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            groups: HashMap::new(),
            len: 0,
        }
    }

    /// Build a table from records already known to share `schema`.
    pub(crate) fn from_records_unchecked(
        schema: Arc<Schema>,
        records: impl IntoIterator<Item = Record>,
    ) -> Self {
        let mut table = Self::new(schema);
        for record in records {
            let group = table.groups.entry(ValueKey::of(&record)).or_default();
            if !group.contains(&record) {
                group.push(record);
                table.len += 1;
            }
        }
        table
    }

    /// The table's schema.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn check_schema(&self, record: &Record) -> RankleResult<()> {
        if Arc::ptr_eq(record.schema(), &self.schema) || **record.schema() == *self.schema {
            Ok(())
        } else {
            Err(RankleError::schema_mismatch(format!(
                "record schema {} differs from table schema {}",
                record.schema(),
                self.schema
            )))
        }
    }

    /// Insert a record. Returns `false` if an identical record (schema,
    /// values and rank) was already present.
    pub fn insert(&mut self, record: Record) -> RankleResult<bool> {
        self.check_schema(&record)?;
        let group = self.groups.entry(ValueKey::of(&record)).or_default();
        if group.contains(&record) {
            return Ok(false);
        }
        group.push(record);
        self.len += 1;
        Ok(true)
    }

    /// Delete a record by full equality. Returns whether it was present.
    pub fn delete(&mut self, record: &Record) -> RankleResult<bool> {
        self.check_schema(record)?;
        let key = ValueKey::of(record);
        let Some(group) = self.groups.get_mut(&key) else {
            return Ok(false);
        };
        let Some(pos) = group.iter().position(|r| r == record) else {
            return Ok(false);
        };
        group.swap_remove(pos);
        if group.is_empty() {
            self.groups.remove(&key);
        }
        self.len -= 1;
        Ok(true)
    }

    /// Whether an identical record is present.
    pub fn contains(&self, record: &Record) -> bool {
        self.groups
            .get(&ValueKey::of(record))
            .is_some_and(|group| group.contains(record))
    }

    /// Highest-ranked record with the same value tuple, ignoring rank.
    ///
    /// The fixpoint accumulators keep at most one record per value tuple;
    /// for caller-built tables with several ranks per tuple, the best one
    /// is the relevant competitor.
    pub fn find_same_values(&self, record: &Record) -> Option<&Record> {
        self.groups
            .get(&ValueKey::of(record))?
            .iter()
            .max_by(|a, b| a.rank().total_cmp(&b.rank()))
    }

    /// Iterate all records (unspecified order).
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.groups.values().flatten()
    }

    /// Snapshot of all records (unspecified order).
    pub fn records(&self) -> Vec<Record> {
        self.iter().cloned().collect()
    }

    /// Remove all records, keeping the schema.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.len = 0;
    }

    /// Dump the table as a JSON array of row objects, best ranks first.
    ///
    /// Each row maps attribute names to values plus a `"rank"` entry.
    pub fn to_json(&self) -> serde_json::Value {
        let mut records = self.records();
        records.sort_by(|a, b| b.rank().total_cmp(&a.rank()));
        let rows: Vec<serde_json::Value> = records
            .iter()
            .map(|record| {
                let mut row = serde_json::Map::new();
                for (attr, value) in self.schema.iter().zip(record.values()) {
                    row.insert(attr.name().to_string(), value.into());
                }
                row.insert("rank".to_string(), serde_json::json!(record.rank()));
                serde_json::Value::Object(row)
            })
            .collect();
        serde_json::Value::Array(rows)
    }
}
