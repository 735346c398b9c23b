//! Testing utilities and fixtures for the ranked data model.
//!
//! Shared by unit and integration tests across the workspace; not intended
//! for production use.

use std::sync::Arc;

use crate::record::Record;
use crate::schema::{Attribute, Schema};
use crate::table::Table;
use crate::types::{DataType, Value};

/// Schema `{from: Int, to: Int}` used by the graph-shaped fixtures.
pub fn edge_schema() -> Arc<Schema> {
    Arc::new(
        Schema::new(vec![
            Attribute::new("from", DataType::Int),
            Attribute::new("to", DataType::Int),
        ])
        .unwrap(),
    )
}

/// Schema `{to: Int}` for endpoint-only views.
pub fn endpoint_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![Attribute::new("to", DataType::Int)]).unwrap())
}

/// A ranked `(from, to)` record over `schema`.
pub fn edge_record(schema: &Arc<Schema>, from: i64, to: i64, rank: f64) -> Record {
    Record::new(
        Arc::clone(schema),
        vec![Value::Int(from), Value::Int(to)],
        rank,
    )
    .unwrap()
}

/// An edge table from `(from, to, rank)` triples.
pub fn edge_table(edges: &[(i64, i64, f64)]) -> Table {
    let schema = edge_schema();
    let mut table = Table::new(Arc::clone(&schema));
    for &(from, to, rank) in edges {
        table.insert(edge_record(&schema, from, to, rank)).unwrap();
    }
    table
}

/// A record over an arbitrary schema from already-typed values.
pub fn record(schema: &Arc<Schema>, values: Vec<Value>, rank: f64) -> Record {
    Record::new(Arc::clone(schema), values, rank).unwrap()
}

/// Sorted `(values-as-ints, rank)` pairs for order-insensitive assertions.
pub fn int_rows(table: &Table) -> Vec<(Vec<i64>, f64)> {
    let mut rows: Vec<(Vec<i64>, f64)> = table
        .iter()
        .map(|r| {
            let ints = r
                .values()
                .iter()
                .map(|v| v.as_int().expect("fixture value is Int"))
                .collect();
            (ints, r.rank())
        })
        .collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
    rows
}
