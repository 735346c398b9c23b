//! End-to-end tests: ranked reachability through the fixpoint executor.

use std::sync::Arc;

use rankle_core::testing::{edge_table, endpoint_schema, int_rows};
use rankle_core::{Attribute, DataType, Lattice, LatticeFamily, Record, Table};

use common_error::RankleResult;

use rankle_engine::{
    AttrEq, EvalContext, FixpointExecutor, JoinExec, LazyExpr, ProjectExec, RecordStream,
    RuntimeConfig, TableScan,
};

fn goguen() -> Lattice {
    Lattice::new(LatticeFamily::Goguen)
}

/// Step function for ranked reachability: joins the frontier's `to` with
/// the edge table's `from` and projects back to the walk schema, so the
/// produced walk rank is `product(walk.rank, edge.rank)`.
fn reach_step(edges: Table, lattice: Lattice) -> impl FnMut(&Table) -> RankleResult<LazyExpr> {
    move |frontier: &Table| {
        let join = JoinExec::new(
            Box::new(TableScan::new(frontier)),
            Box::new(TableScan::new(&edges)),
            vec![Box::new(AttrEq::new(
                Attribute::new("to", DataType::Int),
                Attribute::new("from", DataType::Int),
            ))],
            lattice,
        )?;
        let project = ProjectExec::new(
            Box::new(join),
            vec![
                (
                    Attribute::new("from", DataType::Int),
                    Attribute::new("left.from", DataType::Int),
                ),
                (
                    Attribute::new("to", DataType::Int),
                    Attribute::new("right.to", DataType::Int),
                ),
            ],
        )?;
        Ok(Box::new(project) as LazyExpr)
    }
}

fn seed_scan(seed: &[(i64, i64, f64)]) -> LazyExpr {
    Box::new(TableScan::new(&edge_table(seed)))
}

/// Transform for the decoupled variants: one walk record in, its endpoint
/// record (same rank) out.
fn endpoint_transform(record: &Record) -> RankleResult<LazyExpr> {
    let mut walk = Table::new(Arc::clone(record.schema()));
    walk.insert(record.clone())?;
    let project = ProjectExec::new(
        Box::new(TableScan::new(&walk)),
        vec![(
            Attribute::new("to", DataType::Int),
            Attribute::new("to", DataType::Int),
        )],
    )?;
    Ok(Box::new(project) as LazyExpr)
}

fn assert_rows_approx(actual: &[(Vec<i64>, f64)], expected: &[(&[i64], f64)]) {
    assert_eq!(actual.len(), expected.len(), "row count: {actual:?}");
    for ((values, rank), (want_values, want_rank)) in actual.iter().zip(expected) {
        assert_eq!(values.as_slice(), *want_values);
        assert!(
            (rank - want_rank).abs() < 1e-12,
            "rank {rank} != {want_rank} for {values:?}"
        );
    }
}

#[test]
fn test_unrestricted_reachability() {
    let edges = edge_table(&[(1, 2, 0.9), (2, 3, 0.8)]);
    let executor = FixpointExecutor::new();
    let result = executor
        .run(seed_scan(&[(1, 1, 1.0)]), reach_step(edges, goguen()))
        .unwrap();

    assert_rows_approx(
        &int_rows(&result),
        &[(&[1, 1], 1.0), (&[1, 2], 0.9), (&[1, 3], 0.72)],
    );

    let metrics = executor.metrics().get("unrestricted").unwrap();
    assert_eq!(metrics.rounds, 3);
    assert_eq!(metrics.result_candidates, 3);
}

#[test]
fn test_top_k_pruning_drops_below_threshold() {
    let edges = edge_table(&[(1, 2, 0.9), (2, 3, 0.8)]);
    let executor = FixpointExecutor::new();
    let result = executor
        .run_top_k(seed_scan(&[(1, 1, 1.0)]), reach_step(edges, goguen()), 2)
        .unwrap();

    // (1,3,0.72) is produced below min_rank()=0.9 while the accumulator is
    // at capacity, so it is dropped before it can seed a further round.
    assert_eq!(result.len(), 2);
    assert_eq!(result.min_rank(), 0.9);
    assert_rows_approx(
        &int_rows(&result.into_table()),
        &[(&[1, 1], 1.0), (&[1, 2], 0.9)],
    );
}

#[test]
fn test_top_k_matches_unrestricted_prefix() {
    // With non-increasing ranks along derivations, the pruned result is
    // exactly the K best rows of the unrestricted result.
    let edges = edge_table(&[
        (1, 2, 0.9),
        (2, 3, 0.8),
        (3, 4, 0.95),
        (1, 5, 0.4),
        (5, 6, 0.99),
    ]);
    let seed = [(1, 1, 1.0)];

    let executor = FixpointExecutor::new();
    let full = executor
        .run(seed_scan(&seed), reach_step(edges.clone(), goguen()))
        .unwrap();
    let mut full_rows = int_rows(&full);
    full_rows.sort_by(|a, b| b.1.total_cmp(&a.1));

    for k in 1..=full_rows.len() {
        let pruned = executor
            .run_top_k(seed_scan(&seed), reach_step(edges.clone(), goguen()), k)
            .unwrap();
        let mut pruned_rows = int_rows(&pruned.into_table());
        pruned_rows.sort_by(|a, b| b.1.total_cmp(&a.1));
        assert_eq!(pruned_rows, full_rows[..k].to_vec(), "k = {k}");
    }
}

#[test]
fn test_transformed_endpoint_view() {
    // Recursion explores walks {from, to}; the reported view is endpoints
    // {to} only.
    let edges = edge_table(&[(1, 2, 0.9), (2, 3, 0.8)]);
    let executor = FixpointExecutor::new();
    let result = executor
        .run_transformed(
            seed_scan(&[(1, 1, 1.0)]),
            reach_step(edges, goguen()),
            endpoint_transform,
            endpoint_schema(),
            10,
        )
        .unwrap();

    assert_rows_approx(
        &int_rows(&result.into_table()),
        &[(&[1], 1.0), (&[2], 0.9), (&[3], 0.72)],
    );
}

#[test]
fn test_transformed_pruning_agrees_with_unpruned() {
    let edges = edge_table(&[(1, 2, 0.9), (2, 3, 0.8), (3, 4, 0.7), (1, 4, 0.2)]);
    let executor = FixpointExecutor::new();

    let plain = executor
        .run_transformed(
            seed_scan(&[(1, 1, 1.0)]),
            reach_step(edges.clone(), goguen()),
            endpoint_transform,
            endpoint_schema(),
            2,
        )
        .unwrap();
    let pruned = executor
        .run_transformed_top_k(
            seed_scan(&[(1, 1, 1.0)]),
            reach_step(edges, goguen()),
            endpoint_transform,
            endpoint_schema(),
            2,
        )
        .unwrap();

    assert_eq!(int_rows(&plain.into_table()), int_rows(&pruned.into_table()));
}

#[test]
fn test_fixpoint_closure() {
    // Re-applying the step to the final result yields nothing that beats
    // an already recorded rank.
    let edges = edge_table(&[(1, 2, 0.9), (2, 3, 0.8), (3, 1, 0.5)]);
    let executor = FixpointExecutor::new();
    let mut step = reach_step(edges, goguen());
    let result = executor.run(seed_scan(&[(1, 1, 1.0)]), &mut step).unwrap();

    let ctx = EvalContext::new();
    let mut reapplied = step(&result).unwrap();
    while let Some(record) = reapplied.next(&ctx).unwrap() {
        let best = result
            .find_same_values(&record)
            .expect("closure produced an unseen tuple");
        assert!(best.rank() >= record.rank());
    }
}

#[test]
fn test_cyclic_graph_terminates() {
    // Ranks strictly decrease around the cycle, so improvement stops.
    let edges = edge_table(&[(1, 2, 0.9), (2, 1, 0.9)]);
    let executor =
        FixpointExecutor::new().with_config(RuntimeConfig::default().with_max_rounds(64));
    let result = executor
        .run(seed_scan(&[(1, 1, 1.0)]), reach_step(edges, goguen()))
        .unwrap();

    assert_rows_approx(&int_rows(&result), &[(&[1, 1], 1.0), (&[1, 2], 0.9)]);
}

#[test]
fn test_godel_lattice_keeps_min_rank() {
    // Under Gödel, a walk's rank is the minimum edge rank along it.
    let edges = edge_table(&[(1, 2, 0.9), (2, 3, 0.8)]);
    let executor = FixpointExecutor::new();
    let lattice = Lattice::new(LatticeFamily::Godel);
    let result = executor
        .run(seed_scan(&[(1, 1, 1.0)]), reach_step(edges, lattice))
        .unwrap();

    assert_rows_approx(
        &int_rows(&result),
        &[(&[1, 1], 1.0), (&[1, 2], 0.9), (&[1, 3], 0.8)],
    );
}

#[test]
fn test_projection_composition_equals_single_projection() {
    let table = edge_table(&[(1, 2, 0.9), (2, 3, 0.8)]);
    let ctx = EvalContext::new();

    // Project twice: {from,to} -> {a:=from, b:=to} -> {b}
    let first = ProjectExec::new(
        Box::new(TableScan::new(&table)),
        vec![
            (
                Attribute::new("a", DataType::Int),
                Attribute::new("from", DataType::Int),
            ),
            (
                Attribute::new("b", DataType::Int),
                Attribute::new("to", DataType::Int),
            ),
        ],
    )
    .unwrap();
    let mut twice = ProjectExec::new(
        Box::new(first),
        vec![(
            Attribute::new("b", DataType::Int),
            Attribute::new("b", DataType::Int),
        )],
    )
    .unwrap();

    // Single composed projection: {from,to} -> {b:=to}
    let mut once = ProjectExec::new(
        Box::new(TableScan::new(&table)),
        vec![(
            Attribute::new("b", DataType::Int),
            Attribute::new("to", DataType::Int),
        )],
    )
    .unwrap();

    let mut collect = |stream: &mut dyn RecordStream| {
        let mut rows: Vec<(i64, f64)> = Vec::new();
        while let Some(record) = stream.next(&ctx).unwrap() {
            rows.push((record.value_at(0).unwrap().as_int().unwrap(), record.rank()));
        }
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    };
    assert_eq!(collect(&mut twice), collect(&mut once));
}

#[test]
fn test_explain_renders_pipeline() {
    let edges = edge_table(&[(1, 2, 0.9)]);
    let walks = edge_table(&[(1, 1, 1.0)]);
    let join = JoinExec::new(
        Box::new(TableScan::new(&walks)),
        Box::new(TableScan::new(&edges)),
        vec![Box::new(AttrEq::new(
            Attribute::new("to", DataType::Int),
            Attribute::new("from", DataType::Int),
        ))],
        goguen(),
    )
    .unwrap();

    let rendered = rankle_engine::explain(&join);
    assert!(rendered.starts_with("Join"));
    assert!(rendered.contains("TableScan"));
    assert!(rendered.contains("Replay"));
}
