//! Sample data and output helpers for Rankle demos.

pub mod data;

pub use data::{road_network, seed_at, RoadNetwork};

use rankle_core::Table;

/// Print a section header.
pub fn print_header(title: &str) {
    println!("\n=== {title} ===");
}

/// Print a result table, best ranks first.
pub fn print_results(table: &Table) {
    let names: Vec<&str> = table.schema().iter().map(|a| a.name()).collect();
    println!("{} | rank", names.join(" | "));

    let mut records = table.records();
    records.sort_by(|a, b| b.rank().total_cmp(&a.rank()));
    for record in &records {
        let row: Vec<String> = record.values().iter().map(ToString::to_string).collect();
        println!("{} | {:.4}", row.join(" | "), record.rank());
    }
    println!("({} row(s))", records.len());
}
