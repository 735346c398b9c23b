//! Schema: an ordered, duplicate-free collection of attributes.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use common_error::{RankleError, RankleResult};

use super::Attribute;

/// Shape of a relation: attributes in a stable order plus a position index.
///
/// Immutable once built; schemas are created once per query and shared
/// read-only as `Arc<Schema>`. Equality is structural (same attributes in
/// the same positions).
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    attributes: Vec<Attribute>,
    #[serde(skip)]
    index: HashMap<Attribute, usize>,
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            attributes: Vec<Attribute>,
        }
        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.attributes).map_err(serde::de::Error::custom)
    }
}

impl Schema {
    /// Build a schema from an attribute list.
    ///
    /// Duplicate attributes (same name and domain) and duplicate names with
    /// differing domains are both rejected: positions are resolved by name
    /// at several seams, so names must be unique.
    pub fn new(attributes: Vec<Attribute>) -> RankleResult<Self> {
        let mut index = HashMap::with_capacity(attributes.len());
        let mut names = HashMap::with_capacity(attributes.len());
        for (pos, attr) in attributes.iter().enumerate() {
            if let Some(prev) = names.insert(attr.name().to_string(), pos) {
                return Err(RankleError::schema_mismatch(format!(
                    "duplicate attribute name '{}' at positions {prev} and {pos}",
                    attr.name()
                )));
            }
            index.insert(attr.clone(), pos);
        }
        Ok(Self { attributes, index })
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the schema has no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Position of an attribute, if present.
    pub fn index_of(&self, attribute: &Attribute) -> Option<usize> {
        self.index.get(attribute).copied()
    }

    /// Position of an attribute looked up by name alone.
    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name() == name)
    }

    /// Attribute at a position.
    pub fn attribute_at(&self, pos: usize) -> Option<&Attribute> {
        self.attributes.get(pos)
    }

    /// Attribute looked up by name.
    pub fn attribute_named(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    /// Whether the schema contains the attribute (name and domain).
    pub fn contains(&self, attribute: &Attribute) -> bool {
        self.index.contains_key(attribute)
    }

    /// Iterate attributes in position order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    /// The attributes in position order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Whether every attribute of `self` appears in `other`.
    pub fn is_subschema_of(&self, other: &Self) -> bool {
        self.attributes.iter().all(|a| other.contains(a))
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.attributes == other.attributes
    }
}

impl Eq for Schema {}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, attr) in self.attributes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{attr}")?;
        }
        write!(f, "}}")
    }
}
