//! Size-capped table ordered by rank.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use common_error::{RankleError, RankleResult};

use crate::record::Record;
use crate::schema::Schema;

use super::{RankKey, Table, ValueKey};

/// A table capped at `capacity` best records by rank.
///
/// Backed by a min-ordered rank index. When an insertion pushes the size
/// over the cap, the entire minimum-rank tie group is evicted, but only if
/// at least `capacity` records remain afterwards. Otherwise the tie group
/// is kept and the size temporarily exceeds the cap: the structure never
/// breaks a rank tie arbitrarily. This is a documented policy, not a bug.
#[derive(Debug, Clone)]
pub struct TopKTable {
    schema: Arc<Schema>,
    capacity: usize,
    by_rank: BTreeMap<RankKey, Vec<Record>>,
    groups: HashMap<ValueKey, Vec<Record>>,
    len: usize,
}

impl TopKTable {
    /// Create an empty bounded table.
    pub fn new(schema: Arc<Schema>, capacity: usize) -> RankleResult<Self> {
        if capacity == 0 {
            return Err(RankleError::invalid_parameter(
                "top-k capacity must be at least 1",
            ));
        }
        Ok(Self {
            schema,
            capacity,
            by_rank: BTreeMap::new(),
            groups: HashMap::new(),
            len: 0,
        })
    }

    /// The table's schema.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// The cap K.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of records currently retained (may exceed the cap on ties).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Smallest retained rank, or `0.0` when empty.
    ///
    /// This is the admission threshold used by top-K pruning: once the
    /// table is at capacity, a candidate below this rank cannot enter.
    pub fn min_rank(&self) -> f64 {
        self.by_rank.keys().next().map_or(0.0, |key| key.0)
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

    /// Insert a record, then evict the minimum-rank tie group if the cap is
    /// exceeded and eviction leaves at least `capacity` records.
    ///
    /// Returns whether the record is retained afterwards (a freshly
    /// inserted minimum-rank record may be evicted immediately).
    pub fn insert(&mut self, record: Record) -> RankleResult<bool> {
        self.check_schema(&record)?;
        let group = self.groups.entry(ValueKey::of(&record)).or_default();
        if group.contains(&record) {
            return Ok(true);
        }
        group.push(record.clone());
        self.by_rank
            .entry(RankKey(record.rank()))
            .or_default()
            .push(record.clone());
        self.len += 1;

        while self.len > self.capacity {
            let Some(entry) = self.by_rank.first_entry() else {
                break;
            };
            let tie_len = entry.get().len();
            if self.len - tie_len < self.capacity {
                // Evicting the tie group would drop below K: keep it.
                break;
            }
            let evicted = entry.remove();
            for gone in &evicted {
                self.detach_from_groups(gone);
            }
            self.len -= tie_len;
        }

        Ok(self.contains(&record))
    }

    fn detach_from_groups(&mut self, record: &Record) {
        let key = ValueKey::of(record);
        if let Some(group) = self.groups.get_mut(&key) {
            if let Some(pos) = group.iter().position(|r| r == record) {
                group.swap_remove(pos);
            }
            if group.is_empty() {
                self.groups.remove(&key);
            }
        }
    }

    /// Whether an identical record is retained.
    pub fn contains(&self, record: &Record) -> bool {
        self.groups
            .get(&ValueKey::of(record))
            .is_some_and(|group| group.contains(record))
    }

    /// Highest-ranked retained record with the same value tuple.
    pub fn find_same_values(&self, record: &Record) -> Option<&Record> {
        self.groups
            .get(&ValueKey::of(record))?
            .iter()
            .max_by(|a, b| a.rank().total_cmp(&b.rank()))
    }

    /// Delete a record by full equality. Returns whether it was present.
    ///
    /// Used by the fixpoint engine to replace a tuple with an
    /// improved-rank version of itself.
    pub fn delete(&mut self, record: &Record) -> RankleResult<bool> {
        self.check_schema(record)?;
        if !self.contains(record) {
            return Ok(false);
        }
        self.detach_from_groups(record);
        let rank_key = RankKey(record.rank());
        if let Some(tie) = self.by_rank.get_mut(&rank_key) {
            if let Some(pos) = tie.iter().position(|r| r == record) {
                tie.swap_remove(pos);
            }
            if tie.is_empty() {
                self.by_rank.remove(&rank_key);
            }
        }
        self.len -= 1;
        Ok(true)
    }

    /// Iterate retained records, lowest rank first.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.by_rank.values().flatten()
    }

    /// Snapshot of retained records, best ranks first.
    pub fn records(&self) -> Vec<Record> {
        self.by_rank.values().rev().flatten().cloned().collect()
    }

    /// Convert into an unbounded [`Table`] holding the retained records.
    pub fn into_table(self) -> Table {
        let records: Vec<Record> = self.by_rank.into_values().flatten().collect();
        Table::from_records_unchecked(self.schema, records)
    }
}
