use crate::foundation::core::Point;
use crate::foundation::error::{MorphError, MorphResult};
use crate::mesh::builder::Mesh;
use crate::mesh::triangle::Triangle;

/// Mesh for frame `frame_index` of a `total_frames` long move from `start` toward `end`.
///
/// Each coordinate is `start + (end - start) · frame_index / total_frames`, so frame `0` is
/// `start` bit for bit and the last frame (`total_frames - 1`) stops one step short of `end`.
pub fn interpolate(
    start: &Mesh,
    end: &Mesh,
    frame_index: u64,
    total_frames: u64,
) -> MorphResult<Mesh> {
    if total_frames == 0 {
        return Err(MorphError::validation("total frame count must be >= 1"));
    }
    if frame_index >= total_frames {
        return Err(MorphError::validation(format!(
            "frame index {frame_index} is outside 0..{total_frames}"
        )));
    }
    if start.cells() != end.cells() {
        return Err(MorphError::grid_contract(format!(
            "cannot interpolate a {0}x{0} mesh toward a {1}x{1} mesh",
            start.cells(),
            end.cells()
        )));
    }

    if frame_index == 0 {
        return Ok(start.clone());
    }

    let num = frame_index as f64;
    let den = total_frames as f64;
    let triangles = start
        .triangles()
        .iter()
        .zip(end.triangles())
        .map(|(s, e)| {
            let mut out = [Point::ORIGIN; 3];
            for (v, (sp, ep)) in out.iter_mut().zip(s.vertices.iter().zip(&e.vertices)) {
                *v = Point::new(
                    sp.x + (ep.x - sp.x) * num / den,
                    sp.y + (ep.y - sp.y) * num / den,
                );
            }
            Triangle { vertices: out }
        })
        .collect();

    Mesh::from_parts(start.cells(), triangles)
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/interpolate.rs"]
mod tests;
