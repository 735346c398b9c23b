//! Reach Runner - ranked reachability over the sample road network.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package rankle-playground --bin reach-runner -- reach --source 1
//! cargo run --package rankle-playground --bin reach-runner -- top --source 1 -k 3
//! cargo run --package rankle-playground --bin reach-runner -- endpoints --source 1 -k 3
//! ```

use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::info;

use common_error::{RankleError, RankleResult};

use rankle_core::{Attribute, DataType, Lattice, LatticeFamily, Record, Table};
use rankle_engine::{
    AttrEq, CancellationHandle, FixpointExecutor, JoinExec, LazyExpr, ProjectExec, RuntimeConfig,
    TableScan,
};

use rankle_playground::{print_header, print_results, road_network, seed_at, RoadNetwork};

/// Reach Runner CLI.
#[derive(Parser, Debug)]
#[command(name = "reach-runner")]
#[command(about = "Run ranked reachability queries over sample data")]
#[command(version)]
struct Args {
    /// Lattice family for rank combination
    #[arg(long, default_value = "goguen")]
    family: String,

    /// Abort after this many recursion rounds
    #[arg(long)]
    max_rounds: Option<u64>,

    /// Abort evaluation after this many milliseconds
    #[arg(long)]
    deadline_ms: Option<u64>,

    /// Print evaluation metrics afterwards
    #[arg(long)]
    metrics: bool,

    /// Emit results as JSON instead of a table
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Full ranked reachability from a source node
    Reach {
        /// Source node
        #[arg(short, long, default_value_t = 1)]
        source: i64,
    },

    /// Top-K pruned reachability
    Top {
        /// Source node
        #[arg(short, long, default_value_t = 1)]
        source: i64,

        /// Number of best walks to keep
        #[arg(short, default_value_t = 3)]
        k: usize,
    },

    /// Top-K reachable endpoints (recursion over walks, endpoint view)
    Endpoints {
        /// Source node
        #[arg(short, long, default_value_t = 1)]
        source: i64,

        /// Number of best endpoints to keep
        #[arg(short, default_value_t = 3)]
        k: usize,
    },
}

/// Recursive step: extend each frontier walk by one edge.
fn reach_step(
    network: &RoadNetwork,
    lattice: Lattice,
) -> impl FnMut(&Table) -> RankleResult<LazyExpr> + '_ {
    move |frontier: &Table| {
        let join = JoinExec::new(
            Box::new(TableScan::new(frontier)),
            Box::new(TableScan::new(&network.edges)),
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

/// Map one admitted walk to its endpoint record.
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

fn main() -> RankleResult<()> {
    env_logger::init();
    let args = Args::parse();

    let family = LatticeFamily::parse(&args.family).ok_or_else(|| {
        RankleError::invalid_parameter(format!(
            "unknown lattice family '{}' (godel, goguen, lukasiewicz)",
            args.family
        ))
    })?;
    let lattice = Lattice::new(family);

    let mut config = RuntimeConfig::default();
    if let Some(rounds) = args.max_rounds {
        config = config.with_max_rounds(rounds);
    }
    let mut executor = FixpointExecutor::new().with_config(config);
    if let Some(ms) = args.deadline_ms {
        executor = executor.with_cancellation(CancellationHandle::with_deadline(
            std::time::Duration::from_millis(ms),
        ));
    }

    let network = road_network()?;
    info!(
        "loaded sample network: {} edge(s), lattice family {family}",
        network.edges.len()
    );

    let (title, result) = match args.command {
        Commands::Reach { source } => {
            let seed = seed_at(&network, source)?;
            let result = executor.run(
                Box::new(TableScan::new(&seed)),
                reach_step(&network, lattice),
            )?;
            (format!("walks from {source}"), result)
        }
        Commands::Top { source, k } => {
            let seed = seed_at(&network, source)?;
            let result = executor.run_top_k(
                Box::new(TableScan::new(&seed)),
                reach_step(&network, lattice),
                k,
            )?;
            (format!("best {k} walk(s) from {source}"), result.into_table())
        }
        Commands::Endpoints { source, k } => {
            let seed = seed_at(&network, source)?;
            let endpoint_schema = Arc::new(rankle_core::Schema::new(vec![Attribute::new(
                "to",
                DataType::Int,
            )])?);
            let result = executor.run_transformed_top_k(
                Box::new(TableScan::new(&seed)),
                reach_step(&network, lattice),
                endpoint_transform,
                endpoint_schema,
                k,
            )?;
            (format!("best {k} endpoint(s) from {source}"), result.into_table())
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.to_json())?);
    } else {
        print_header(&title);
        print_results(&result);
    }

    if args.metrics {
        print_header("metrics");
        print!("{}", executor.metrics().report());
    }
    Ok(())
}
