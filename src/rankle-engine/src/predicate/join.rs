//! Join on-clause predicates over record pairs.

use rankle_core::{Attribute, Record, Schema, Value};

use common_error::{RankleError, RankleResult};

use super::CmpOp;

/// A fuzzy condition relating a left and a right record.
///
/// A join's on-clauses each yield a degree; the join combines them by
/// infimum and drops pairs whose conjunctive degree is zero.
pub trait JoinPredicate: std::fmt::Debug {
    /// Check the clause's shape against both input schemas.
    fn validate(&self, left: &Schema, right: &Schema) -> RankleResult<()>;

    /// Degree in `[0, 1]` to which the pair satisfies the clause.
    fn degree(&self, left: &Record, right: &Record) -> RankleResult<f64>;
}

fn require(schema: &Schema, attribute: &Attribute, side: &str) -> RankleResult<()> {
    if schema.contains(attribute) {
        Ok(())
    } else {
        Err(RankleError::attribute_not_found(format!(
            "{side} schema {schema} has no attribute {attribute}"
        )))
    }
}

fn lookup<'a>(record: &'a Record, attribute: &Attribute) -> RankleResult<&'a Value> {
    record.value(attribute).ok_or_else(|| {
        RankleError::internal(format!(
            "validated attribute {attribute} missing at evaluation"
        ))
    })
}

/// Crisp equality between a left and a right attribute.
#[derive(Debug, Clone)]
pub struct AttrEq {
    left: Attribute,
    right: Attribute,
}

impl AttrEq {
    /// Equate `left` (from the left input) with `right` (from the right).
    pub fn new(left: Attribute, right: Attribute) -> Self {
        Self { left, right }
    }
}

impl JoinPredicate for AttrEq {
    fn validate(&self, left: &Schema, right: &Schema) -> RankleResult<()> {
        require(left, &self.left, "left")?;
        require(right, &self.right, "right")?;
        if self.left.data_type() != self.right.data_type() {
            return Err(RankleError::not_comparable(format!(
                "cannot equate {} with {}",
                self.left, self.right
            )));
        }
        Ok(())
    }

    fn degree(&self, left: &Record, right: &Record) -> RankleResult<f64> {
        let l = lookup(left, &self.left)?;
        let r = lookup(right, &self.right)?;
        Ok(if l == r { 1.0 } else { 0.0 })
    }
}

/// Crisp ordered comparison between a left and a right attribute.
#[derive(Debug, Clone)]
pub struct AttrCompare {
    left: Attribute,
    op: CmpOp,
    right: Attribute,
}

impl AttrCompare {
    /// Compare `left` against `right` with `op`.
    pub fn new(left: Attribute, op: CmpOp, right: Attribute) -> Self {
        Self { left, op, right }
    }
}

impl JoinPredicate for AttrCompare {
    fn validate(&self, left: &Schema, right: &Schema) -> RankleResult<()> {
        require(left, &self.left, "left")?;
        require(right, &self.right, "right")?;
        if self.left.data_type() != self.right.data_type() {
            return Err(RankleError::not_comparable(format!(
                "cannot compare {} with {}",
                self.left, self.right
            )));
        }
        Ok(())
    }

    fn degree(&self, left: &Record, right: &Record) -> RankleResult<f64> {
        let l = lookup(left, &self.left)?;
        let r = lookup(right, &self.right)?;
        let ordering = l.try_cmp(r)?;
        Ok(if self.op.matches(ordering) { 1.0 } else { 0.0 })
    }
}

/// Caller-supplied graded on-clause.
pub struct DegreeJoinFn {
    label: String,
    degree: Box<dyn Fn(&Record, &Record) -> f64>,
}

impl DegreeJoinFn {
    /// Wrap a closure as an on-clause, labeled for display.
    pub fn new(
        label: impl Into<String>,
        degree: impl Fn(&Record, &Record) -> f64 + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            degree: Box::new(degree),
        }
    }
}

impl std::fmt::Debug for DegreeJoinFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DegreeJoinFn")
            .field("label", &self.label)
            .finish()
    }
}

impl JoinPredicate for DegreeJoinFn {
    fn validate(&self, _left: &Schema, _right: &Schema) -> RankleResult<()> {
        Ok(())
    }

    fn degree(&self, left: &Record, right: &Record) -> RankleResult<f64> {
        Ok((self.degree)(left, right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankle_core::testing::{edge_record, edge_schema};
    use rankle_core::DataType;

    #[test]
    fn test_attr_eq_validate() {
        let schema = edge_schema();
        let ok = AttrEq::new(
            Attribute::new("to", DataType::Int),
            Attribute::new("from", DataType::Int),
        );
        ok.validate(&schema, &schema).unwrap();

        let missing = AttrEq::new(
            Attribute::new("cost", DataType::Int),
            Attribute::new("from", DataType::Int),
        );
        assert!(matches!(
            missing.validate(&schema, &schema).unwrap_err(),
            RankleError::AttributeNotFound(_)
        ));

    }

    #[test]
    fn test_attr_eq_degree() {
        let schema = edge_schema();
        let clause = AttrEq::new(
            Attribute::new("to", DataType::Int),
            Attribute::new("from", DataType::Int),
        );
        let walk = edge_record(&schema, 1, 2, 1.0);
        let edge = edge_record(&schema, 2, 3, 0.8);
        assert_eq!(clause.degree(&walk, &edge).unwrap(), 1.0);
        assert_eq!(clause.degree(&edge, &walk).unwrap(), 0.0);
    }

    #[test]
    fn test_attr_compare_degree() {
        let schema = edge_schema();
        let clause = AttrCompare::new(
            Attribute::new("from", DataType::Int),
            CmpOp::Lt,
            Attribute::new("from", DataType::Int),
        );
        let a = edge_record(&schema, 1, 2, 1.0);
        let b = edge_record(&schema, 5, 6, 1.0);
        assert_eq!(clause.degree(&a, &b).unwrap(), 1.0);
        assert_eq!(clause.degree(&b, &a).unwrap(), 0.0);
    }
}
