/// Grid-to-mesh decomposition.
pub mod builder;
/// Per-frame vertex interpolation.
pub mod interpolate;
/// Triangle geometry and coverage.
pub mod triangle;
