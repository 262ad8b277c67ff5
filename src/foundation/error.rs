/// Result alias used throughout meshmorph.
pub type MorphResult<T> = Result<T, MorphError>;

/// Errors surfaced by the morphing engine.
///
/// Geometric edge cases (degenerate triangles, out-of-bounds samples) are handled locally and
/// never show up here. Everything in this enum is reported to the caller, and parameter or
/// grid problems are reported before the first frame is produced.
#[derive(thiserror::Error, Debug)]
pub enum MorphError {
    /// Invalid parameters (zero frame count, grid size out of range, empty images, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// Misuse of a control grid (moving a border point, mismatched grid sizes, ...).
    #[error("grid contract violation: {0}")]
    GridContract(String),

    /// Internal pipeline failure.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// A frame sink rejected a frame.
    #[error("sink error: {0}")]
    Sink(String),

    /// Generation was aborted between frames.
    #[error("cancelled after {emitted} frames")]
    Cancelled {
        /// Number of frames handed to the sink before the abort was observed.
        emitted: u64,
    },

    /// Any other error, usually from I/O or a third-party crate.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MorphError {
    /// Build a [`MorphError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MorphError::GridContract`] value.
    pub fn grid_contract(msg: impl Into<String>) -> Self {
        Self::GridContract(msg.into())
    }

    /// Build a [`MorphError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`MorphError::Sink`] value.
    pub fn sink(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
