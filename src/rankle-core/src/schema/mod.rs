//! Schema system for Rankle relations.
//!
//! This module provides:
//! - `Attribute` for named, typed positions
//! - `Schema` for ordered, duplicate-free attribute collections

mod attribute;
mod schema_impl;

pub use attribute::Attribute;
pub use schema_impl::Schema;
