//! Sample ranked road network.
//!
//! Edges carry confidence ranks: a rank of 1.0 is a road known to be open,
//! lower ranks reflect uncertain or degraded connections. Recursive
//! reachability then yields, per destination, the confidence of the best
//! route.

use std::sync::Arc;

use common_error::RankleResult;

use rankle_core::{Attribute, DataType, Record, Schema, Table, Value};

/// Sample network: an edge table plus its shared schema.
pub struct RoadNetwork {
    /// Schema `{from: Int, to: Int}`.
    pub schema: Arc<Schema>,
    /// Ranked edges.
    pub edges: Table,
}

/// Build the sample network.
///
/// ```text
///        0.9        0.8
///   1 ───────▶ 2 ───────▶ 3
///   │          │          │
///   │0.4       │0.7       │0.95
///   ▼          ▼          ▼
///   4 ───────▶ 5 ───────▶ 6
///        0.99       0.6
/// ```
pub fn road_network() -> RankleResult<RoadNetwork> {
    let schema = Arc::new(Schema::new(vec![
        Attribute::new("from", DataType::Int),
        Attribute::new("to", DataType::Int),
    ])?);

    let mut edges = Table::new(Arc::clone(&schema));
    for (from, to, rank) in [
        (1, 2, 0.9),
        (2, 3, 0.8),
        (1, 4, 0.4),
        (2, 5, 0.7),
        (3, 6, 0.95),
        (4, 5, 0.99),
        (5, 6, 0.6),
    ] {
        edges.insert(Record::new(
            Arc::clone(&schema),
            vec![Value::Int(from), Value::Int(to)],
            rank,
        )?)?;
    }
    Ok(RoadNetwork { schema, edges })
}

/// Seed table: the trivial walk `(source, source)` at rank 1.0.
pub fn seed_at(network: &RoadNetwork, source: i64) -> RankleResult<Table> {
    let mut seed = Table::new(Arc::clone(&network.schema));
    seed.insert(Record::new(
        Arc::clone(&network.schema),
        vec![Value::Int(source), Value::Int(source)],
        1.0,
    )?)?;
    Ok(seed)
}
