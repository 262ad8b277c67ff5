use image::{ImageBuffer, Pixel};

use crate::foundation::core::Point;
use crate::foundation::error::{MorphError, MorphResult};
use crate::mesh::builder::Mesh;
use crate::mesh::triangle::Triangle;
use crate::warp::affine::triangle_to_triangle;
use crate::warp::sample::{SampleFilter, sample};

/// Counters for one mesh warp.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WarpStats {
    /// Triangles that wrote through an affine map.
    pub triangles_warped: u64,
    /// Triangle pairs skipped as degenerate.
    pub triangles_skipped: u64,
    /// Destination pixels written.
    pub pixels_written: u64,
}

/// Warp the pixels under `src_tri` in `src` into the shape of `dst_tri` in `dst`.
///
/// Every destination pixel whose centre is covered by `dst_tri` (top-left fill rule) is
/// inverse-mapped into the source, sampled with clamp-to-edge and written. Pixels outside the
/// triangle keep their previous value. Degenerate triangles write nothing.
///
/// Returns the number of pixels written.
pub fn warp_triangle<P>(
    src: &ImageBuffer<P, Vec<u8>>,
    dst: &mut ImageBuffer<P, Vec<u8>>,
    src_tri: &Triangle,
    dst_tri: &Triangle,
    filter: SampleFilter,
) -> u64
where
    P: Pixel<Subpixel = u8>,
{
    let Some(map) = triangle_to_triangle(src_tri, dst_tri) else {
        tracing::trace!(?src_tri, ?dst_tri, "skipping degenerate triangle");
        return 0;
    };
    if src.width() == 0 || src.height() == 0 || dst.width() == 0 || dst.height() == 0 {
        return 0;
    }

    let (min, max) = dst_tri.bounds();
    let Some((x0, x1)) = pixel_span(min.x, max.x, dst.width()) else {
        return 0;
    };
    let Some((y0, y1)) = pixel_span(min.y, max.y, dst.height()) else {
        return 0;
    };

    let mut written = 0u64;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let centre = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if !dst_tri.covers(centre) {
                continue;
            }
            let px = sample(src, map.inverse * centre, filter);
            dst.put_pixel(x, y, px);
            written += 1;
        }
    }
    written
}

/// Warp every triangle of `src_mesh` onto the matching slot of `dst_mesh`.
///
/// `dst` should already hold a fallback (typically a copy of `src`): pixels not covered by any
/// destination triangle are left untouched.
pub fn warp_mesh<P>(
    src: &ImageBuffer<P, Vec<u8>>,
    dst: &mut ImageBuffer<P, Vec<u8>>,
    src_mesh: &Mesh,
    dst_mesh: &Mesh,
    filter: SampleFilter,
) -> MorphResult<WarpStats>
where
    P: Pixel<Subpixel = u8>,
{
    if src_mesh.cells() != dst_mesh.cells() {
        return Err(MorphError::grid_contract(format!(
            "cannot warp a {0}x{0} mesh onto a {1}x{1} mesh",
            src_mesh.cells(),
            dst_mesh.cells()
        )));
    }

    let mut stats = WarpStats::default();
    for (s, d) in src_mesh.triangles().iter().zip(dst_mesh.triangles()) {
        let n = warp_triangle(src, dst, s, d, filter);
        if n == 0 && (s.is_degenerate() || d.is_degenerate()) {
            stats.triangles_skipped += 1;
        } else {
            stats.triangles_warped += 1;
        }
        stats.pixels_written += n;
    }
    Ok(stats)
}

// Inclusive range of pixel indices whose centres fall inside `[lo, hi]`, clipped to `len`.
fn pixel_span(lo: f64, hi: f64, len: u32) -> Option<(u32, u32)> {
    if !(lo.is_finite() && hi.is_finite()) {
        return None;
    }
    let first = (lo - 0.5).ceil().max(0.0);
    let last = (hi - 0.5).floor().min(f64::from(len) - 1.0);
    if first > last {
        return None;
    }
    Some((first as u32, last as u32))
}

#[cfg(test)]
#[path = "../../tests/unit/warp/triangle.rs"]
mod tests;
