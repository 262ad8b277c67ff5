use crate::foundation::core::Affine;
use crate::mesh::triangle::Triangle;

/// Affine map taking one triangle exactly onto another, plus its inverse.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriangleAffine {
    /// Source triangle space to destination triangle space.
    pub forward: Affine,
    /// Destination back to source; used for inverse sampling.
    pub inverse: Affine,
}

/// Solve the affine transform mapping `src`'s vertices onto `dst`'s vertices in order.
///
/// Returns `None` when either triangle is degenerate or has non-finite coordinates; there is no
/// unique (or no invertible) map in that case.
pub fn triangle_to_triangle(src: &Triangle, dst: &Triangle) -> Option<TriangleAffine> {
    if src.is_degenerate() || dst.is_degenerate() {
        return None;
    }
    if !src.coords().iter().chain(dst.coords().iter()).all(|v| v.is_finite()) {
        return None;
    }

    let src_basis = basis(src);
    let dst_basis = basis(dst);
    Some(TriangleAffine {
        forward: dst_basis * src_basis.inverse(),
        inverse: src_basis * dst_basis.inverse(),
    })
}

// Maps the unit triangle (0,0) (1,0) (0,1) onto `t`.
fn basis(t: &Triangle) -> Affine {
    let [a, b, c] = t.vertices;
    Affine::new([b.x - a.x, b.y - a.y, c.x - a.x, c.y - a.y, a.x, a.y])
}

#[cfg(test)]
#[path = "../../tests/unit/warp/affine.rs"]
mod tests;
