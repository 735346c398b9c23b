//! Ranked tuples.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use common_error::{RankleError, RankleResult};

use crate::schema::{Attribute, Schema};
use crate::types::Value;

/// A ranked tuple: positional values over a schema plus a membership degree.
///
/// Records are immutable; `with_value` and `with_rank` return new records.
/// The rank is conceptually in `[0, 1]` but is not clamped: combinators
/// keep it there for well-formed inputs, and callers own the invariant.
///
/// Two equality notions exist: full equality (`==`, schema + values + rank)
/// and [`Record::same_values`], which ignores the rank. The latter is what
/// detects "same underlying fact, possibly better-ranked" throughout the
/// engine. The hash over the value tuple is computed once and cached.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<Schema>,
    values: Arc<[Value]>,
    rank: f64,
    value_hash: OnceLock<u64>,
}

impl Record {
    /// Create a record, validating arity and per-position domains.
    pub fn new(schema: Arc<Schema>, values: Vec<Value>, rank: f64) -> RankleResult<Self> {
        if values.len() != schema.len() {
            return Err(RankleError::schema_mismatch(format!(
                "record has {} values but schema {} has {} attributes",
                values.len(),
                schema,
                schema.len()
            )));
        }
        for (pos, value) in values.iter().enumerate() {
            let attr = schema
                .attribute_at(pos)
                .ok_or_else(|| RankleError::internal(format!("no attribute at position {pos}")))?;
            if value.data_type() != attr.data_type() {
                return Err(RankleError::type_mismatch(format!(
                    "attribute '{}' declares {} but value is {}",
                    attr.name(),
                    attr.data_type(),
                    value.data_type()
                )));
            }
        }
        Ok(Self {
            schema,
            values: values.into(),
            rank,
            value_hash: OnceLock::new(),
        })
    }

    /// The record's schema.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// The membership degree.
    pub const fn rank(&self) -> f64 {
        self.rank
    }

    /// Positional values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Shared handle on the value tuple (cheap clone for keying).
    pub fn shared_values(&self) -> Arc<[Value]> {
        Arc::clone(&self.values)
    }

    /// Value of an attribute, if the schema has it.
    pub fn value(&self, attribute: &Attribute) -> Option<&Value> {
        self.schema
            .index_of(attribute)
            .and_then(|pos| self.values.get(pos))
    }

    /// Value at a position.
    pub fn value_at(&self, pos: usize) -> Option<&Value> {
        self.values.get(pos)
    }

    /// New record with one attribute replaced.
    pub fn with_value(&self, attribute: &Attribute, value: Value) -> RankleResult<Self> {
        let pos = self.schema.index_of(attribute).ok_or_else(|| {
            RankleError::attribute_not_found(format!(
                "schema {} has no attribute {attribute}",
                self.schema
            ))
        })?;
        if value.data_type() != attribute.data_type() {
            return Err(RankleError::type_mismatch(format!(
                "attribute '{}' declares {} but value is {}",
                attribute.name(),
                attribute.data_type(),
                value.data_type()
            )));
        }
        let mut values = self.values.to_vec();
        values[pos] = value;
        Ok(Self {
            schema: Arc::clone(&self.schema),
            values: values.into(),
            rank: self.rank,
            value_hash: OnceLock::new(),
        })
    }

    /// New record with a different rank and the same value tuple.
    pub fn with_rank(&self, rank: f64) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            values: Arc::clone(&self.values),
            rank,
            value_hash: self.value_hash.clone(),
        }
    }

    /// Equality of schema and value tuple, ignoring the rank.
    pub fn same_values(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.schema, &other.schema) || self.schema == other.schema)
            && self.value_hash() == other.value_hash()
            && self.values == other.values
    }

    /// Hash of the value tuple (cached after first computation).
    pub fn value_hash(&self) -> u64 {
        *self.value_hash.get_or_init(|| {
            let mut hasher = DefaultHasher::new();
            self.values.hash(&mut hasher);
            hasher.finish()
        })
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.rank.to_bits() == other.rank.to_bits() && self.same_values(other)
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.value_hash());
        state.write_u64(self.rank.to_bits());
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ") @ {}", self.rank)
    }
}
