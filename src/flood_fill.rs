use crate::{Grid, Matrix};
use bevy_math::DVec2;

/// Marks the cells of a grid whose centres lie inside a ring.
///
/// Cells crossed by the ring itself get their fraction from the traversal
/// engine; cells the ring never touches are either wholly inside or wholly
/// outside of it. This pass settles them with an even-odd scanline over the
/// ring edges at each row of cell centres, writing 1.0 into every still-zero
/// cell whose centre falls inside.
pub struct FloodFill<'a> {
    ring: &'a [DVec2],
    grid: &'a Grid,
}

impl<'a> FloodFill<'a> {
    #[inline]
    #[must_use]
    pub fn new(ring: &'a [DVec2], grid: &'a Grid) -> Self {
        Self { ring, grid }
    }

    /// Fill the interior cells of `areas`, which must have the dimensions of
    /// the grid.
    pub fn flood(&self, areas: &mut Matrix<f64>) {
        debug_assert_eq!(areas.rows(), self.grid.rows());
        debug_assert_eq!(areas.cols(), self.grid.cols());

        for row in 0..self.grid.rows() {
            let crossings = self.row_crossings(self.grid.y_for_row(row));
            if crossings.is_empty() {
                continue;
            }

            let mut next = 0;
            let mut inside = false;
            for col in 0..self.grid.cols() {
                let x = self.grid.x_for_col(col);
                while next < crossings.len() && crossings[next] < x {
                    inside = !inside;
                    next += 1;
                }
                if inside && areas[(row, col)] == 0.0 {
                    areas[(row, col)] = 1.0;
                }
            }
        }
    }

    /// Collect the x coordinates where the ring crosses the horizontal line
    /// at `y`, in ascending order.
    fn row_crossings(&self, y: f64) -> Vec<f64> {
        let mut crossings = Vec::new();
        for edge in self.ring.windows(2) {
            let (a, b) = (edge[0], edge[1]);
            if (a.y > y) != (b.y > y) {
                crossings.push(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
            }
        }
        crossings.sort_by(f64::total_cmp);
        crossings
    }
}
