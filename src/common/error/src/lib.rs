//! Error types and result aliases for Rankle.
//!
//! Every fallible API in the workspace returns [`RankleResult`]. Shape-level
//! problems (schemas, attribute lookups, domain mismatches) are reported at
//! operator construction time; the `Internal` variant is reserved for
//! conditions that prior validation should have made impossible.

mod error;

pub use error::{RankleError, RankleResult};
