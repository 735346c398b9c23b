//! Named, typed attribute of a relation.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::DataType;

/// A named attribute with a declared domain.
///
/// Attributes are immutable; two attributes are equal iff both name and
/// domain match. Ordering is lexicographic by `(name, domain name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    name: String,
    data_type: DataType,
}

impl Attribute {
    /// Create a new attribute.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    /// The attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared domain.
    pub const fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Copy of this attribute under a different name (same domain).
    ///
    /// Used when resolving name collisions in join output schemas.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: self.data_type,
        }
    }
}

impl PartialOrd for Attribute {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Attribute {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.data_type.display_name().cmp(other.data_type.display_name()))
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.data_type)
    }
}
