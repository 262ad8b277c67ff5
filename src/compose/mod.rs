/// Cross-dissolve of two warped buffers.
pub mod blend;
/// Morph inputs and the per-frame pipeline.
pub mod plan;
/// Frame generation sessions.
pub mod session;
