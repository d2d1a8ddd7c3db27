//! Errors raised by stepped models.

use thiserror::Error;

/// A model failed to complete an evaluation step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Combinational logic kept changing after the iteration limit.
    #[error("settle region did not converge after {iterations} iterations")]
    SettleDidNotConverge { iterations: u32 },
}
