//! Rankle - ranked relational query engine
//!
//! Rankle is an in-memory relational query engine in which every tuple
//! carries a membership degree ("rank"). Relational operators propagate
//! ranks through configurable fuzzy-lattice combinators, and a recursive
//! fixpoint executor evaluates recursive queries over ranked tuples,
//! optionally pruned to the top-K best results.

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

// Re-export core crates
pub use common_config as config;
pub use common_error as error;
pub use rankle_core as core;
pub use rankle_engine as engine;

/// Rankle version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
