//! Evaluation context and runtime configuration.

mod context;

pub use context::{CancellationHandle, EvalContext, RuntimeConfig};
