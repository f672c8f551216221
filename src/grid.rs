#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{GridError, Rect};

#[inline]
fn is_integral(d: f64) -> bool {
    d == d.floor()
}

/// Lookup behaviour of a [Grid] for coordinates outside its extent.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridExtent {
    /// Queries outside the extent fail with [GridError::OutOfRange].
    Bounded,
    /// The extent is surrounded by a one-cell halo; queries outside it clamp
    /// to the border row or column, so a coordinate anywhere in the plane
    /// maps to a cell index.
    Infinite,
}

impl GridExtent {
    /// Get the number of halo rows/columns added on each edge of the extent.
    #[inline]
    #[must_use]
    pub fn padding(&self) -> usize {
        match self {
            GridExtent::Bounded => 0,
            GridExtent::Infinite => 1,
        }
    }
}

/// A discretisation of a rectangular extent into rows and columns of
/// `dx` × `dy` cells.
///
/// Rows are numbered from the top: row 0 touches `ymax`, the last row touches
/// `ymin`. The stored extent never includes the halo of an
/// [infinite](GridExtent::Infinite) grid; `rows`/`cols` do.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    extent: Rect,
    dx: f64,
    dy: f64,
    num_rows: usize,
    num_cols: usize,
    variant: GridExtent,
}

impl Grid {
    /// Create a new grid over `extent` with the given cell resolution.
    ///
    /// # Panics
    ///
    /// If `dx` or `dy` is not a positive finite number.
    #[must_use]
    pub fn new(extent: Rect, dx: f64, dy: f64, variant: GridExtent) -> Self {
        assert!(dx > 0.0 && dx.is_finite(), "dx must be positive and finite");
        assert!(dy > 0.0 && dy.is_finite(), "dy must be positive and finite");
        let padding = variant.padding();
        Self {
            num_cols: 2 * padding + ((extent.xmax() - extent.xmin()) / dx).round() as usize,
            num_rows: 2 * padding + ((extent.ymax() - extent.ymin()) / dy).round() as usize,
            extent,
            dx,
            dy,
            variant,
        }
    }

    /// Create a new [bounded](GridExtent::Bounded) grid.
    #[inline]
    #[must_use]
    pub fn bounded(extent: Rect, dx: f64, dy: f64) -> Self {
        Self::new(extent, dx, dy, GridExtent::Bounded)
    }

    /// Create a new [infinite](GridExtent::Infinite) grid.
    #[inline]
    #[must_use]
    pub fn infinite(extent: Rect, dx: f64, dy: f64) -> Self {
        Self::new(extent, dx, dy, GridExtent::Infinite)
    }

    #[inline]
    #[must_use]
    pub fn extent(&self) -> Rect {
        self.extent
    }

    #[inline]
    #[must_use]
    pub fn dx(&self) -> f64 {
        self.dx
    }

    #[inline]
    #[must_use]
    pub fn dy(&self) -> f64 {
        self.dy
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> usize {
        self.num_rows
    }

    #[inline]
    #[must_use]
    pub fn cols(&self) -> usize {
        self.num_cols
    }

    #[inline]
    #[must_use]
    pub fn variant(&self) -> GridExtent {
        self.variant
    }

    #[inline]
    #[must_use]
    pub fn padding(&self) -> usize {
        self.variant.padding()
    }

    /// Get this grid with a one-cell halo around its extent.
    #[inline]
    #[must_use]
    pub fn as_infinite(&self) -> Self {
        Self::new(self.extent, self.dx, self.dy, GridExtent::Infinite)
    }

    /// Get this grid without a halo.
    #[inline]
    #[must_use]
    pub fn as_finite(&self) -> Self {
        Self::new(self.extent, self.dx, self.dy, GridExtent::Bounded)
    }

    /// Get the column index of the cell containing `x`.
    ///
    /// A coordinate exactly on `xmax` resolves to the last real column, not
    /// the one beyond it.
    pub fn get_column(&self, x: f64) -> Result<usize, GridError> {
        if x.is_nan() {
            return Err(GridError::OutOfRange);
        }
        match self.variant {
            GridExtent::Infinite => {
                if x < self.extent.xmin() {
                    return Ok(0);
                }
                if x > self.extent.xmax() {
                    return Ok(self.num_cols - 1);
                }
                if x == self.extent.xmax() {
                    return Ok(self.num_cols - 2);
                }
            }
            GridExtent::Bounded => {
                if x < self.extent.xmin() || x > self.extent.xmax() {
                    return Err(GridError::OutOfRange);
                }
                if x == self.extent.xmax() {
                    return Ok(self.num_cols - 1);
                }
            }
        }
        Ok(self.padding() + ((x - self.extent.xmin()) / self.dx).floor() as usize)
    }

    /// Get the row index of the cell containing `y`.
    ///
    /// A coordinate exactly on `ymin` resolves to the last real row.
    pub fn get_row(&self, y: f64) -> Result<usize, GridError> {
        if y.is_nan() {
            return Err(GridError::OutOfRange);
        }
        match self.variant {
            GridExtent::Infinite => {
                if y > self.extent.ymax() {
                    return Ok(0);
                }
                if y < self.extent.ymin() {
                    return Ok(self.num_rows - 1);
                }
                if y == self.extent.ymin() {
                    return Ok(self.num_rows - 2);
                }
            }
            GridExtent::Bounded => {
                if y < self.extent.ymin() || y > self.extent.ymax() {
                    return Err(GridError::OutOfRange);
                }
                if y == self.extent.ymin() {
                    return Ok(self.num_rows - 1);
                }
            }
        }
        Ok(self.padding() + ((self.extent.ymax() - y) / self.dy).floor() as usize)
    }

    /// Get the x coordinate of the centre of column `col`.
    #[inline]
    #[must_use]
    pub fn x_for_col(&self, col: usize) -> f64 {
        self.extent.xmin() + (col as f64 - self.padding() as f64 + 0.5) * self.dx
    }

    /// Get the y coordinate of the centre of row `row`.
    #[inline]
    #[must_use]
    pub fn y_for_row(&self, row: usize) -> f64 {
        self.extent.ymax() - (row as f64 - self.padding() as f64 + 0.5) * self.dy
    }

    /// Get the number of rows between the top of `other`'s extent and the top
    /// of this grid's extent.
    #[inline]
    #[must_use]
    pub fn row_offset(&self, other: &Grid) -> usize {
        ((other.extent.ymax() - self.extent.ymax()).abs() / self.dy).round() as usize
    }

    /// Get the number of columns between the left edge of `other`'s extent
    /// and the left edge of this grid's extent.
    #[inline]
    #[must_use]
    pub fn col_offset(&self, other: &Grid) -> usize {
        ((other.extent.xmin() - self.extent.xmin()).abs() / self.dx).round() as usize
    }

    /// Get the rectangle of the cell at (`row`, `col`).
    ///
    /// Halo cells of an infinite grid are unbounded on their outward sides.
    #[must_use]
    pub fn cell_rect(&self, row: usize, col: usize) -> Rect {
        debug_assert!(row < self.num_rows && col < self.num_cols);
        let p = self.padding();
        let e = &self.extent;

        let xmin = if p > 0 && col == 0 {
            f64::NEG_INFINITY
        } else if p > 0 && col == self.num_cols - 1 {
            e.xmax()
        } else {
            e.xmin() + (col - p) as f64 * self.dx
        };
        let xmax = if p > 0 && col == 0 {
            e.xmin()
        } else if p > 0 && col == self.num_cols - 1 {
            f64::INFINITY
        } else if col == self.num_cols - 1 - p {
            e.xmax()
        } else {
            e.xmin() + (col - p + 1) as f64 * self.dx
        };

        let ymax = if p > 0 && row == 0 {
            f64::INFINITY
        } else if p > 0 && row == self.num_rows - 1 {
            e.ymin()
        } else {
            e.ymax() - (row - p) as f64 * self.dy
        };
        let ymin = if p > 0 && row == 0 {
            e.ymax()
        } else if p > 0 && row == self.num_rows - 1 {
            f64::NEG_INFINITY
        } else if row == self.num_rows - 1 - p {
            e.ymin()
        } else {
            e.ymax() - (row - p + 1) as f64 * self.dy
        };

        Rect::new(xmin, ymin, xmax, ymax)
    }

    /// Snap `bounds` outward to cell edges, producing the smallest
    /// grid-aligned sub-grid that contains it.
    ///
    /// The snapped origin is derived from integer cell indices rather than
    /// repeated subtraction, so shrinking twice with the same bounds yields
    /// the same grid. If floating-point round-off still leaves an edge of
    /// `bounds` outside the snapped extent, that edge is widened by one cell;
    /// a violation that survives the adjustment is reported as
    /// [GridError::ShrinkFailed].
    pub fn shrink_to_fit(&self, bounds: &Rect) -> Result<Self, GridError> {
        let e = &self.extent;
        if bounds.xmin() < e.xmin()
            || bounds.ymin() < e.ymin()
            || bounds.xmax() > e.xmax()
            || bounds.ymax() > e.ymax()
        {
            return Err(GridError::BoundsTooLarge);
        }

        let padding = self.padding();
        let mut col0 = self.get_column(bounds.xmin())?;
        let mut row1 = self.get_row(bounds.ymax())?;

        let mut snapped_xmin = e.xmin() + (col0 - padding) as f64 * self.dx;
        let mut snapped_ymax = e.ymax() - (row1 - padding) as f64 * self.dy;

        if bounds.xmin() < snapped_xmin {
            snapped_xmin -= self.dx;
            col0 -= 1;
        }
        if bounds.ymax() > snapped_ymax {
            snapped_ymax += self.dy;
            row1 -= 1;
        }

        let col1 = self.get_column(bounds.xmax())?;
        let row0 = self.get_row(bounds.ymin())?;

        let num_rows = 1 + (row0 - row1);
        let num_cols = 1 + (col1 - col0);

        let reduced = Self::new(
            Rect::new(
                snapped_xmin,
                (snapped_ymax - num_rows as f64 * self.dy).min(bounds.ymin()),
                (snapped_xmin + num_cols as f64 * self.dx).max(bounds.xmax()),
                snapped_ymax,
            ),
            self.dx,
            self.dy,
            self.variant,
        );

        let r = &reduced.extent;
        if bounds.xmin() < r.xmin()
            || bounds.ymin() < r.ymin()
            || bounds.xmax() > r.xmax()
            || bounds.ymax() > r.ymax()
        {
            return Err(GridError::ShrinkFailed);
        }

        Ok(reduced)
    }

    /// Determine if this grid and `other` share a rational alignment: each
    /// resolution is an integer multiple of the finer one, and the offset
    /// between origins is an integer number of fine cells.
    #[must_use]
    pub fn compatible_with(&self, other: &Grid) -> bool {
        if !is_integral(self.dx.max(other.dx) / self.dx.min(other.dx)) {
            return false;
        }
        if !is_integral(self.dy.max(other.dy) / self.dy.min(other.dy)) {
            return false;
        }
        if !is_integral((other.extent.xmin() - self.extent.xmin()).abs() / self.dx.min(other.dx)) {
            return false;
        }
        if !is_integral((other.extent.ymin() - self.extent.ymin()).abs() / self.dy.min(other.dy)) {
            return false;
        }
        true
    }

    /// Compute the finest grid covering the extents of this grid and
    /// `other`. Fails with [GridError::Incompatible] when the grids are not
    /// [compatible](Self::compatible_with).
    pub fn common_grid(&self, other: &Grid) -> Result<Self, GridError> {
        if !self.compatible_with(other) {
            return Err(GridError::Incompatible);
        }

        let dx = self.dx.min(other.dx);
        let dy = self.dy.min(other.dy);

        let xmin = self.extent.xmin().min(other.extent.xmin());
        let ymax = self.extent.ymax().max(other.extent.ymax());

        let mut xmax = self.extent.xmax().max(other.extent.xmax());
        let mut ymin = self.extent.ymin().min(other.extent.ymin());

        let nx = ((xmax - xmin) / dx).round();
        let ny = ((ymax - ymin) / dy).round();

        xmax = xmax.max(xmin + nx * dx);
        ymin = ymin.min(ymax - ny * dy);

        Ok(Self::new(
            Rect::new(xmin, ymin, xmax, ymax),
            dx,
            dy,
            self.variant,
        ))
    }
}
