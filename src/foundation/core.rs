use crate::foundation::error::{MorphError, MorphResult};

pub use kurbo::{Affine, Point};

/// Width of the canonical space control grids are authored in.
pub const CANONICAL_WIDTH: u32 = 600;
/// Height of the canonical space control grids are authored in.
pub const CANONICAL_HEIGHT: u32 = 600;

/// Smallest accepted grid resolution (number of movable points per row).
pub const MIN_GRID_SIZE: u32 = 1;
/// Largest accepted grid resolution.
pub const MAX_GRID_SIZE: u32 = 64;
/// Grid resolution used when none is given.
pub const DEFAULT_GRID_SIZE: u32 = 10;

/// Default morph length in seconds.
pub const DEFAULT_SECONDS: u32 = 6;
/// Default frame rate.
pub const DEFAULT_FPS: u32 = 24;

/// 8-bit pixel formats the engine can morph (`Rgb<u8>`, `Rgba<u8>`, `Luma<u8>`, ...).
///
/// Frames come out in the same format as the source images.
pub trait MorphPixel: image::Pixel<Subpixel = u8> + Send + Sync + 'static {}

impl<P> MorphPixel for P where P: image::Pixel<Subpixel = u8> + Send + Sync + 'static {}

/// Raster buffer in a [`MorphPixel`] format.
pub type Raster<P> = image::ImageBuffer<P, Vec<u8>>;

/// Absolute 0-based frame index in a morph sequence.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Number of frames produced by a morph of `seconds` at `fps`.
///
/// Rejects zero up front so the pipeline never starts with nothing to do.
pub fn total_frames(seconds: u32, fps: u32) -> MorphResult<u64> {
    if seconds == 0 {
        return Err(MorphError::validation("seconds must be >= 1"));
    }
    if fps == 0 {
        return Err(MorphError::validation("frames per second must be >= 1"));
    }
    Ok(u64::from(seconds) * u64::from(fps))
}

/// Validate a grid resolution against [`MIN_GRID_SIZE`]..=[`MAX_GRID_SIZE`].
pub fn check_grid_size(grid_size: u32) -> MorphResult<()> {
    if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&grid_size) {
        return Err(MorphError::validation(format!(
            "grid size must be in {MIN_GRID_SIZE}..={MAX_GRID_SIZE}, got {grid_size}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
