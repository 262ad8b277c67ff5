use crate::foundation::core::Point;

/// Twice-area threshold below which a triangle is treated as degenerate.
pub const DEGENERATE_EPSILON: f64 = 1e-9;

/// Three vertices in pixel space.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Triangle {
    /// Vertices in slot order; orientation is not normalised.
    pub vertices: [Point; 3],
}

impl Triangle {
    /// Triangle from three vertices.
    pub fn new(a: Point, b: Point, c: Point) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Flattened `[x0, y0, x1, y1, x2, y2]`.
    pub fn coords(&self) -> [f64; 6] {
        let [a, b, c] = self.vertices;
        [a.x, a.y, b.x, b.y, c.x, c.y]
    }

    /// Twice the signed area; positive when the vertices wind clockwise on screen (y down).
    pub fn signed_area2(&self) -> f64 {
        let [a, b, c] = self.vertices;
        (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
    }

    /// Whether the area is too small (or not finite) to map through.
    pub fn is_degenerate(&self) -> bool {
        !(self.signed_area2().abs() >= DEGENERATE_EPSILON)
    }

    /// Axis-aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> (Point, Point) {
        let [a, b, c] = self.vertices;
        (
            Point::new(a.x.min(b.x).min(c.x), a.y.min(b.y).min(c.y)),
            Point::new(a.x.max(b.x).max(c.x), a.y.max(b.y).max(c.y)),
        )
    }

    /// Edge-function coverage test with a top-left fill rule.
    ///
    /// The triangle is reoriented to positive area first. A point exactly on an edge is only
    /// covered when that edge is a top or left edge, so a point on an edge shared by two
    /// triangles of a consistent mesh belongs to exactly one of them.
    pub fn covers(&self, p: Point) -> bool {
        let area = self.signed_area2();
        if !(area.abs() >= DEGENERATE_EPSILON) {
            return false;
        }
        let [a, mut b, mut c] = self.vertices;
        if area < 0.0 {
            std::mem::swap(&mut b, &mut c);
        }
        edge_covers(a, b, p) && edge_covers(b, c, p) && edge_covers(c, a, p)
    }
}

/// Edge function of `p` against the directed edge `from -> to`. Positive on the interior side
/// of a positively oriented triangle.
///
/// Always evaluated from the lexicographically smaller endpoint so that the two triangles
/// sharing an edge see exactly negated values.
fn edge_function(from: Point, to: Point, p: Point) -> f64 {
    let raw = |a: Point, b: Point| (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    if (from.x, from.y) <= (to.x, to.y) {
        raw(from, to)
    } else {
        -raw(to, from)
    }
}

fn edge_covers(from: Point, to: Point, p: Point) -> bool {
    let w = edge_function(from, to, p);
    // Overflowed coordinates can produce inf or NaN; neither says which side `p` is on.
    if !w.is_finite() {
        return false;
    }
    if w > 0.0 {
        return true;
    }
    if w < 0.0 {
        return false;
    }
    is_top_left(from, to)
}

// For a positively oriented triangle in y-down space, a top edge is horizontal and runs toward
// +x and a left edge runs toward -y. The opposite traversal of a shared edge never qualifies.
fn is_top_left(from: Point, to: Point) -> bool {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    (dy == 0.0 && dx > 0.0) || dy < 0.0
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/triangle.rs"]
mod tests;
