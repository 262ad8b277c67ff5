use kurbo::{BezPath, Shape};

use crate::foundation::core::{Point, check_grid_size};
use crate::foundation::error::{MorphError, MorphResult};

/// Immutable copy of a control grid's points.
///
/// Points are stored row-major in a `(grid_size + 2) × (grid_size + 2)` lattice. Row/column `0`
/// and `grid_size + 1` form the pinned border. Snapshots are what the engine consumes; it never
/// holds on to a live [`ControlGrid`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GridSnapshot {
    grid_size: u32,
    width: f64,
    height: f64,
    points: Vec<Point>,
}

impl GridSnapshot {
    /// Evenly spaced lattice over a `width × height` canonical space.
    pub fn even(width: u32, height: u32, grid_size: u32) -> MorphResult<Self> {
        check_grid_size(grid_size)?;
        if width == 0 || height == 0 {
            return Err(MorphError::validation(
                "control grid width/height must be non-zero",
            ));
        }

        let dim = grid_size as usize + 2;
        let cells = f64::from(grid_size + 1);
        let (w, h) = (f64::from(width), f64::from(height));
        let mut points = Vec::with_capacity(dim * dim);
        for i in 0..dim {
            for j in 0..dim {
                points.push(Point::new(j as f64 * (w / cells), i as f64 * (h / cells)));
            }
        }

        Ok(Self {
            grid_size,
            width: w,
            height: h,
            points,
        })
    }

    /// Number of movable points per row.
    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Points per row/column including the border (`grid_size + 2`).
    pub fn dim(&self) -> usize {
        self.grid_size as usize + 2
    }

    /// Canonical width the grid was authored at.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Canonical height the grid was authored at.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// All points, row-major.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Point at `[row][col]`, or `None` when the index is outside the lattice.
    pub fn get(&self, row: usize, col: usize) -> Option<Point> {
        let dim = self.dim();
        if row >= dim || col >= dim {
            return None;
        }
        self.points.get(row * dim + col).copied()
    }

    /// Point at `[row][col]`. Callers must have checked the index against [`Self::dim`].
    pub(crate) fn at(&self, row: usize, col: usize) -> Point {
        self.points[row * self.dim() + col]
    }

    /// Whether `[row][col]` lies on the pinned border.
    pub fn is_border(&self, row: usize, col: usize) -> bool {
        let last = self.dim() - 1;
        row == 0 || col == 0 || row == last || col == last
    }

    /// Check the structural invariants. Deserialized snapshots must pass this before use.
    pub fn validate(&self) -> MorphResult<()> {
        check_grid_size(self.grid_size)?;
        if !(self.width.is_finite() && self.width > 0.0)
            || !(self.height.is_finite() && self.height > 0.0)
        {
            return Err(MorphError::validation(
                "control grid width/height must be finite and positive",
            ));
        }
        let dim = self.dim();
        if self.points.len() != dim * dim {
            return Err(MorphError::grid_contract(format!(
                "grid of size {} needs {} points, got {}",
                self.grid_size,
                dim * dim,
                self.points.len()
            )));
        }
        if self
            .points
            .iter()
            .any(|p| !(p.x.is_finite() && p.y.is_finite()))
        {
            return Err(MorphError::validation("control points must be finite"));
        }
        Ok(())
    }

    /// Preview geometry `count / frames` of the way from `self` toward `end`.
    ///
    /// Only interior points move; the border is shared by both grids. `count == frames` returns
    /// `end` exactly.
    pub fn tween(&self, end: &GridSnapshot, count: u64, frames: u64) -> MorphResult<GridSnapshot> {
        if self.grid_size != end.grid_size {
            return Err(MorphError::grid_contract(format!(
                "cannot tween grid of size {} toward grid of size {}",
                self.grid_size, end.grid_size
            )));
        }
        if frames == 0 {
            return Err(MorphError::validation("tween frame count must be >= 1"));
        }
        if count > frames {
            return Err(MorphError::validation(format!(
                "tween count {count} exceeds frame count {frames}"
            )));
        }
        if count == frames {
            return Ok(end.clone());
        }

        let t = count as f64 / frames as f64;
        let mut out = self.clone();
        let dim = self.dim();
        for row in 1..dim - 1 {
            for col in 1..dim - 1 {
                let idx = row * dim + col;
                out.points[idx] = self.points[idx].lerp(end.points[idx], t);
            }
        }
        Ok(out)
    }
}

/// Editable lattice of control points over one image's canonical space.
#[derive(Clone, Debug)]
pub struct ControlGrid {
    grid: GridSnapshot,
}

impl ControlGrid {
    /// Build an evenly spaced grid; point `[i][j]` sits at
    /// `(j · width / (grid_size + 1), i · height / (grid_size + 1))`.
    pub fn new(width: u32, height: u32, grid_size: u32) -> MorphResult<Self> {
        Ok(Self {
            grid: GridSnapshot::even(width, height, grid_size)?,
        })
    }

    /// Number of movable points per row.
    pub fn grid_size(&self) -> u32 {
        self.grid.grid_size
    }

    /// Rebuild at a new resolution. Prior edits are discarded.
    pub fn set_grid_size(&mut self, grid_size: u32) -> MorphResult<()> {
        self.grid = GridSnapshot::even(
            self.grid.width as u32,
            self.grid.height as u32,
            grid_size,
        )?;
        Ok(())
    }

    /// Move one interior point. No clamping happens here; see [`Self::within_bounds`].
    pub fn move_point(&mut self, row: usize, col: usize, to: Point) -> MorphResult<()> {
        self.check_interior(row, col)?;
        if !(to.x.is_finite() && to.y.is_finite()) {
            return Err(MorphError::validation("control points must be finite"));
        }
        let dim = self.grid.dim();
        self.grid.points[row * dim + col] = to;
        Ok(())
    }

    /// Point at `[row][col]`, or `None` outside the lattice.
    pub fn point(&self, row: usize, col: usize) -> Option<Point> {
        self.grid.get(row, col)
    }

    /// Copy the current points into an immutable snapshot.
    pub fn snapshot(&self) -> GridSnapshot {
        self.grid.clone()
    }

    /// Overwrite every point from a previously captured snapshot of the same shape.
    pub fn set_all(&mut self, snapshot: GridSnapshot) -> MorphResult<()> {
        snapshot.validate()?;
        if snapshot.grid_size != self.grid.grid_size {
            return Err(MorphError::grid_contract(format!(
                "snapshot grid size {} does not match grid size {}",
                snapshot.grid_size, self.grid.grid_size
            )));
        }
        if snapshot.width != self.grid.width || snapshot.height != self.grid.height {
            return Err(MorphError::grid_contract(
                "snapshot canonical size does not match grid canonical size",
            ));
        }
        self.grid = snapshot;
        Ok(())
    }

    /// The six points bounding the legal region of interior point `[row][col]`.
    ///
    /// Order: `(r-1,c-1) (r,c-1) (r+1,c) (r+1,c+1) (r,c+1) (r-1,c)`, which walks the hexagon
    /// formed by the two triangle fans meeting at the point.
    pub fn neighborhood(&self, row: usize, col: usize) -> MorphResult<[Point; 6]> {
        self.check_interior(row, col)?;
        let g = &self.grid;
        Ok([
            g.at(row - 1, col - 1),
            g.at(row, col - 1),
            g.at(row + 1, col),
            g.at(row + 1, col + 1),
            g.at(row, col + 1),
            g.at(row - 1, col),
        ])
    }

    /// Whether moving `[row][col]` to `p` keeps it strictly inside its hexagon.
    pub fn within_bounds(&self, row: usize, col: usize, p: Point) -> MorphResult<bool> {
        let hex = self.neighborhood(row, col)?;
        let mut path = BezPath::new();
        path.move_to(hex[0]);
        for &v in &hex[1..] {
            path.line_to(v);
        }
        path.close_path();
        Ok(path.contains(p))
    }

    fn check_interior(&self, row: usize, col: usize) -> MorphResult<()> {
        let dim = self.grid.dim();
        if row >= dim || col >= dim {
            return Err(MorphError::grid_contract(format!(
                "control point [{row}][{col}] is outside a {dim}x{dim} grid"
            )));
        }
        if self.grid.is_border(row, col) {
            return Err(MorphError::grid_contract(format!(
                "control point [{row}][{col}] is on the pinned border"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/grid/control.rs"]
mod tests;
