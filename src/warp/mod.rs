//! Per-triangle pixel warping.

/// Triangle-to-triangle affine maps.
pub mod affine;
/// Source pixel sampling.
pub mod sample;
/// Mesh and triangle warps.
pub mod triangle;
