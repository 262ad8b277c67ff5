//! Meshmorph morphs one raster image into another by deforming a triangle mesh.
//!
//! Each image carries a control-point grid authored at a canonical size. The two grids are split
//! into corresponding triangles, vertex positions are interpolated linearly over time, every
//! triangle is warped with its own affine map and the two warped sequences are cross-dissolved.
//!
//! - Edit or load a [`GridSnapshot`] per image (see [`ControlGrid`])
//! - Create a [`MorphSession`] from two images, two grids and [`MorphParams`]
//! - Render single frames or stream the whole sequence into a [`FrameSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Frame compositing: cross-dissolve, morph plans and generation sessions.
pub mod compose;
pub mod encode;
/// Control-point grids.
pub mod grid;
/// Triangle meshes derived from control grids.
pub mod mesh;
pub mod warp;

pub use crate::foundation::core::{
    Affine, CANONICAL_HEIGHT, CANONICAL_WIDTH, DEFAULT_FPS, DEFAULT_GRID_SIZE, DEFAULT_SECONDS,
    FrameIndex, MAX_GRID_SIZE, MIN_GRID_SIZE, MorphPixel, Point, Raster, total_frames,
};
pub use crate::foundation::error::{MorphError, MorphResult};

pub use crate::compose::blend::{crossfade, crossfade_into, dissolve_weight};
pub use crate::compose::plan::{MorphFrame, MorphParams, MorphPlan};
pub use crate::compose::session::{
    CancelToken, FrameIter, MorphSession, MorphStats, MorphThreading, generate,
};
pub use crate::encode::image_seq::ImageSequenceSink;
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::grid::control::{ControlGrid, GridSnapshot};
pub use crate::mesh::builder::{Mesh, build_mesh, build_mesh_for_image};
pub use crate::mesh::interpolate::interpolate;
pub use crate::mesh::triangle::Triangle;
pub use crate::warp::affine::{TriangleAffine, triangle_to_triangle};
pub use crate::warp::sample::{SampleFilter, sample};
pub use crate::warp::triangle::{WarpStats, warp_mesh, warp_triangle};
