//! Selection predicates over single records.

use rankle_core::{Attribute, Record, Schema, Value};

use common_error::{RankleError, RankleResult};

use super::CmpOp;

/// A fuzzy condition on one record.
pub trait Predicate: std::fmt::Debug {
    /// Check the predicate's shape against a schema.
    ///
    /// Called once when the enclosing operator is built; `degree` may
    /// assume it passed.
    fn validate(&self, schema: &Schema) -> RankleResult<()>;

    /// Degree in `[0, 1]` to which the record satisfies the condition.
    fn degree(&self, record: &Record) -> RankleResult<f64>;
}

/// Crisp comparison of an attribute against a constant.
#[derive(Debug, Clone)]
pub struct Compare {
    attribute: Attribute,
    op: CmpOp,
    value: Value,
}

impl Compare {
    /// Compare `attribute` against `value` with `op`.
    pub fn new(attribute: Attribute, op: CmpOp, value: Value) -> Self {
        Self {
            attribute,
            op,
            value,
        }
    }
}

impl Predicate for Compare {
    fn validate(&self, schema: &Schema) -> RankleResult<()> {
        if !schema.contains(&self.attribute) {
            return Err(RankleError::attribute_not_found(format!(
                "schema {schema} has no attribute {}",
                self.attribute
            )));
        }
        if self.value.data_type() != self.attribute.data_type() {
            return Err(RankleError::type_mismatch(format!(
                "attribute '{}' declares {} but comparison constant is {}",
                self.attribute.name(),
                self.attribute.data_type(),
                self.value.data_type()
            )));
        }
        Ok(())
    }

    fn degree(&self, record: &Record) -> RankleResult<f64> {
        let value = record.value(&self.attribute).ok_or_else(|| {
            RankleError::internal(format!(
                "validated attribute {} missing at evaluation",
                self.attribute
            ))
        })?;
        let ordering = value.try_cmp(&self.value)?;
        Ok(if self.op.matches(ordering) { 1.0 } else { 0.0 })
    }
}

/// Crisp comparison between two attributes of the same record.
#[derive(Debug, Clone)]
pub struct CompareAttrs {
    left: Attribute,
    op: CmpOp,
    right: Attribute,
}

impl CompareAttrs {
    /// Compare `left` against `right` with `op`.
    pub fn new(left: Attribute, op: CmpOp, right: Attribute) -> Self {
        Self { left, op, right }
    }
}

impl Predicate for CompareAttrs {
    fn validate(&self, schema: &Schema) -> RankleResult<()> {
        for attribute in [&self.left, &self.right] {
            if !schema.contains(attribute) {
                return Err(RankleError::attribute_not_found(format!(
                    "schema {schema} has no attribute {attribute}"
                )));
            }
        }
        if self.left.data_type() != self.right.data_type() {
            return Err(RankleError::not_comparable(format!(
                "cannot compare {} with {}",
                self.left, self.right
            )));
        }
        Ok(())
    }

    fn degree(&self, record: &Record) -> RankleResult<f64> {
        let (left, right) = match (record.value(&self.left), record.value(&self.right)) {
            (Some(l), Some(r)) => (l, r),
            _ => {
                return Err(RankleError::internal(format!(
                    "validated attributes {} / {} missing at evaluation",
                    self.left, self.right
                )))
            }
        };
        let ordering = left.try_cmp(right)?;
        Ok(if self.op.matches(ordering) { 1.0 } else { 0.0 })
    }
}

/// Caller-supplied graded condition.
///
/// The closure owns its degree semantics and is expected to stay in
/// `[0, 1]`; the engine does not clamp.
pub struct DegreeFn {
    label: String,
    degree: Box<dyn Fn(&Record) -> f64>,
}

impl DegreeFn {
    /// Wrap a closure as a predicate, labeled for display.
    pub fn new(label: impl Into<String>, degree: impl Fn(&Record) -> f64 + 'static) -> Self {
        Self {
            label: label.into(),
            degree: Box::new(degree),
        }
    }
}

impl std::fmt::Debug for DegreeFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DegreeFn").field("label", &self.label).finish()
    }
}

impl Predicate for DegreeFn {
    fn validate(&self, _schema: &Schema) -> RankleResult<()> {
        Ok(())
    }

    fn degree(&self, record: &Record) -> RankleResult<f64> {
        Ok((self.degree)(record))
    }
}
