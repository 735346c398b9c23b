//! Eager record containers.
//!
//! - [`Table`]: schema + records, deduplicated by full equality, indexed by
//!   value tuple so rank-improvement lookups are cheap.
//! - [`TopKTable`]: a size-capped table ordered by rank with tie-aware
//!   eviction.

mod eager;
mod topk;

pub use eager::Table;
pub use topk::TopKTable;

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::record::Record;
use crate::types::Value;

/// Hash-map key over a record's value tuple (rank excluded).
///
/// Shares the record's value storage and cached hash, so building a key is
/// two `Arc` bumps.
#[derive(Debug, Clone)]
pub(crate) struct ValueKey {
    values: Arc<[Value]>,
    hash: u64,
}

impl ValueKey {
    pub(crate) fn of(record: &Record) -> Self {
        Self {
            values: record.shared_values(),
            hash: record.value_hash(),
        }
    }
}

impl PartialEq for ValueKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.values == other.values
    }
}

impl Eq for ValueKey {}

impl Hash for ValueKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// Total-ordered rank, usable as a `BTreeMap` key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RankKey(pub(crate) f64);

impl Eq for RankKey {}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}
