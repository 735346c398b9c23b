//! Core data model for the Rankle ranked relational engine.
//!
//! This crate provides the fundamental types of the ranked relational model:
//! - `Value` and `DataType` for the type system
//! - `Attribute` and `Schema` for relation shapes
//! - `Record` for ranked tuples
//! - `Table` and `TopKTable` for eager record containers
//! - `lattice` for the fuzzy rank-combination algebra

pub mod lattice;
pub mod record;
pub mod schema;
pub mod table;
pub mod types;

pub mod testing;

#[cfg(test)]
mod proptest_utils;

// Re-export commonly used types
pub use lattice::{Lattice, LatticeFamily};
pub use record::Record;
pub use schema::{Attribute, Schema};
pub use table::{Table, TopKTable};
pub use types::{DataType, Value};
