use image::imageops::{self, FilterType};

use crate::compose::blend::{crossfade_into, dissolve_weight};
use crate::foundation::core::{
    DEFAULT_FPS, DEFAULT_GRID_SIZE, DEFAULT_SECONDS, FrameIndex, MorphPixel, Raster,
    check_grid_size, total_frames,
};
use crate::foundation::error::{MorphError, MorphResult};
use crate::grid::control::GridSnapshot;
use crate::mesh::builder::{Mesh, build_mesh_for_image};
use crate::mesh::interpolate::interpolate;
use crate::warp::sample::SampleFilter;
use crate::warp::triangle::{WarpStats, warp_mesh};

/// Scalar inputs of a morph.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MorphParams {
    /// Movable points per grid row; must match both grids.
    pub grid_size: u32,
    /// Morph duration in seconds (>= 1).
    pub seconds: u32,
    /// Frames per second (>= 1).
    pub fps: u32,
    /// Source sampling filter used by the triangle warps.
    pub filter: SampleFilter,
}

impl Default for MorphParams {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            seconds: DEFAULT_SECONDS,
            fps: DEFAULT_FPS,
            filter: SampleFilter::default(),
        }
    }
}

impl MorphParams {
    /// `seconds × fps`, rejecting zero.
    pub fn total_frames(&self) -> MorphResult<u64> {
        total_frames(self.seconds, self.fps)
    }

    /// Check every field before any mesh is built.
    pub fn validate(&self) -> MorphResult<()> {
        check_grid_size(self.grid_size)?;
        self.total_frames().map(|_| ())
    }
}

/// One finished output frame.
#[derive(Clone, Debug, PartialEq)]
pub struct MorphFrame<P: MorphPixel> {
    /// Position of the frame in the sequence.
    pub index: FrameIndex,
    /// Composited pixels, sized like image A.
    pub image: Raster<P>,
}

/// Everything one generate request needs, validated and with its meshes built.
///
/// Image A is warped from its own grid toward B's grid, both expressed in A's pixel space.
/// Image B is warped from its own grid toward A's grid in B's pixel space, with time reversed.
#[derive(Clone, Debug)]
pub struct MorphPlan<'a, P: MorphPixel> {
    image_a: &'a Raster<P>,
    image_b: &'a Raster<P>,
    total_frames: u64,
    filter: SampleFilter,
    a_start: Mesh,
    a_target: Mesh,
    b_start: Mesh,
    b_target: Mesh,
}

impl<'a, P: MorphPixel> MorphPlan<'a, P> {
    /// Validate inputs and build the four scaled meshes.
    ///
    /// Every parameter and grid problem is reported here, before any frame exists.
    #[tracing::instrument(skip_all, fields(grid_size = params.grid_size, seconds = params.seconds, fps = params.fps))]
    pub fn new(
        image_a: &'a Raster<P>,
        grid_a: &GridSnapshot,
        image_b: &'a Raster<P>,
        grid_b: &GridSnapshot,
        params: &MorphParams,
    ) -> MorphResult<Self> {
        params.validate()?;
        let total_frames = params.total_frames()?;
        grid_a.validate()?;
        grid_b.validate()?;

        for (name, grid) in [("first", grid_a), ("second", grid_b)] {
            if grid.grid_size() != params.grid_size {
                return Err(MorphError::grid_contract(format!(
                    "{name} grid has size {}, expected {}",
                    grid.grid_size(),
                    params.grid_size
                )));
            }
        }
        if grid_a.width() != grid_b.width() || grid_a.height() != grid_b.height() {
            return Err(MorphError::grid_contract(format!(
                "grids are authored at different canonical sizes: {}x{} vs {}x{}",
                grid_a.width(),
                grid_a.height(),
                grid_b.width(),
                grid_b.height()
            )));
        }
        for (name, img) in [("first", image_a), ("second", image_b)] {
            if img.width() == 0 || img.height() == 0 {
                return Err(MorphError::validation(format!("{name} image is empty")));
            }
        }

        let (aw, ah) = image_a.dimensions();
        let (bw, bh) = image_b.dimensions();
        let plan = Self {
            image_a,
            image_b,
            total_frames,
            filter: params.filter,
            a_start: build_mesh_for_image(grid_a, aw, ah)?,
            a_target: build_mesh_for_image(grid_b, aw, ah)?,
            b_start: build_mesh_for_image(grid_b, bw, bh)?,
            b_target: build_mesh_for_image(grid_a, bw, bh)?,
        };
        tracing::debug!(
            total_frames,
            triangles = plan.a_start.len(),
            "morph plan ready"
        );
        Ok(plan)
    }

    /// Number of frames in the sequence.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Output frame dimensions (those of image A).
    pub fn dimensions(&self) -> (u32, u32) {
        self.image_a.dimensions()
    }

    /// Image A warped `i / N` of the way toward B's geometry.
    pub fn warp_a(&self, frame: FrameIndex) -> MorphResult<(Raster<P>, WarpStats)> {
        self.check_frame(frame)?;
        let dst_mesh = interpolate(&self.a_start, &self.a_target, frame.0, self.total_frames)?;
        let mut buf = self.image_a.clone();
        let stats = warp_mesh(self.image_a, &mut buf, &self.a_start, &dst_mesh, self.filter)?;
        Ok((buf, stats))
    }

    /// Image B warped `(N - i - 1) / N` of the way toward A's geometry.
    pub fn warp_b(&self, frame: FrameIndex) -> MorphResult<(Raster<P>, WarpStats)> {
        self.check_frame(frame)?;
        let reversed = self.total_frames - frame.0 - 1;
        let dst_mesh = interpolate(&self.b_start, &self.b_target, reversed, self.total_frames)?;
        let mut buf = self.image_b.clone();
        let stats = warp_mesh(self.image_b, &mut buf, &self.b_start, &dst_mesh, self.filter)?;
        Ok((buf, stats))
    }

    /// Compute one complete frame: both warps (in parallel), then the cross-dissolve.
    pub fn render_frame(&self, frame: FrameIndex) -> MorphResult<MorphFrame<P>> {
        self.check_frame(frame)?;
        let (a, b) = rayon::join(|| self.warp_a(frame), || self.warp_b(frame));
        let (buf_a, stats_a) = a?;
        let (buf_b, stats_b) = b?;

        let (w, h) = buf_a.dimensions();
        let buf_b = if buf_b.dimensions() == (w, h) {
            buf_b
        } else {
            imageops::resize(&buf_b, w, h, FilterType::Triangle)
        };

        let p = dissolve_weight(frame.0, self.total_frames);
        let mut out = Raster::<P>::new(w, h);
        crossfade_into(&mut out, &buf_a, &buf_b, p)?;

        tracing::trace!(
            frame = frame.0,
            p,
            skipped_a = stats_a.triangles_skipped,
            skipped_b = stats_b.triangles_skipped,
            "frame composed"
        );
        Ok(MorphFrame { index: frame, image: out })
    }

    fn check_frame(&self, frame: FrameIndex) -> MorphResult<()> {
        if frame.0 >= self.total_frames {
            return Err(MorphError::validation(format!(
                "frame {} is outside 0..{}",
                frame.0, self.total_frames
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/plan.rs"]
mod tests;
