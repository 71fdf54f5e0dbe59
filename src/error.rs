//! Error kinds for the coloring engine.
//!
//! The policy from the design: `Config`/`Input` errors abort before solving,
//! `Capacity` aborts only the current k, `Backend` terminates the active
//! strategy, and `Invariant` is always fatal -- it is never caught and
//! silently recovered from by this crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("malformed or missing graph input: {0}")]
    Input(String),

    #[error("variable index overflow while encoding k={k}: {detail}")]
    Capacity { k: usize, detail: String },

    #[error("SAT backend error: {0}")]
    Backend(String),

    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

impl CoreError {
    /// Maps an error to the process exit code the external driver should
    /// use (see the interface's exit-code table); 1 for configuration, 2
    /// for input, 3 for anything coming out of the solver itself.
    pub fn exit_code(&self) -> i32 {
        match self {
            CoreError::Config(_) => 1,
            CoreError::Input(_) => 2,
            CoreError::Capacity { .. } | CoreError::Backend(_) | CoreError::Invariant(_) => 3,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
