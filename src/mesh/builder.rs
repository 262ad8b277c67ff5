use crate::foundation::core::Point;
use crate::foundation::error::{MorphError, MorphResult};
use crate::grid::control::GridSnapshot;
use crate::mesh::triangle::Triangle;

/// Every triangle of one grid at one scale.
///
/// Slots are addressed as `[i][j][k]`: `(i, j)` is the grid cell (row, column of its top-left
/// control point) and `k` picks one of the two triangles split along the cell's
/// `(i, j)` to `(i + 1, j + 1)` diagonal. Two meshes built from grids of the same size correspond
/// slot by slot.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    cells: usize,
    triangles: Vec<Triangle>,
}

impl Mesh {
    pub(crate) fn from_parts(cells: usize, triangles: Vec<Triangle>) -> MorphResult<Self> {
        if triangles.len() != cells * cells * 2 {
            return Err(MorphError::evaluation(format!(
                "mesh with {cells}x{cells} cells needs {} triangles, got {}",
                cells * cells * 2,
                triangles.len()
            )));
        }
        Ok(Self { cells, triangles })
    }

    /// Cells per row/column (`grid_size + 1`).
    pub fn cells(&self) -> usize {
        self.cells
    }

    /// Number of triangles (`cells² · 2`).
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the mesh holds no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// All triangles in slot order.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Triangle at slot `[i][j][k]`.
    pub fn get(&self, i: usize, j: usize, k: usize) -> Option<&Triangle> {
        if i >= self.cells || j >= self.cells || k > 1 {
            return None;
        }
        self.triangles.get((i * self.cells + j) * 2 + k)
    }
}

/// Split a grid snapshot into triangles after scaling every point by `(scale_x, scale_y)`.
///
/// Scaling happens before the split so the diagonal choice never depends on the scale.
pub fn build_mesh(grid: &GridSnapshot, scale_x: f64, scale_y: f64) -> MorphResult<Mesh> {
    grid.validate()?;
    if !(scale_x.is_finite() && scale_x > 0.0 && scale_y.is_finite() && scale_y > 0.0) {
        return Err(MorphError::validation(format!(
            "mesh scale must be finite and positive, got ({scale_x}, {scale_y})"
        )));
    }

    let dim = grid.dim();
    let scaled: Vec<Point> = grid
        .points()
        .iter()
        .map(|p| Point::new(p.x * scale_x, p.y * scale_y))
        .collect();
    let at = |row: usize, col: usize| scaled[row * dim + col];

    let cells = dim - 1;
    let mut triangles = Vec::with_capacity(cells * cells * 2);
    for i in 0..cells {
        for j in 0..cells {
            triangles.push(Triangle::new(at(i, j), at(i + 1, j), at(i + 1, j + 1)));
            triangles.push(Triangle::new(at(i, j), at(i, j + 1), at(i + 1, j + 1)));
        }
    }

    Mesh::from_parts(cells, triangles)
}

/// Build `grid`'s mesh in the pixel space of an image of `width × height`.
pub fn build_mesh_for_image(grid: &GridSnapshot, width: u32, height: u32) -> MorphResult<Mesh> {
    if width == 0 || height == 0 {
        return Err(MorphError::validation("image width/height must be non-zero"));
    }
    build_mesh(
        grid,
        f64::from(width) / grid.width(),
        f64::from(height) / grid.height(),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/builder.rs"]
mod tests;
