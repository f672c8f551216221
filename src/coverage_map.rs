use crate::area::signed_area;
use crate::{Cell, CoverageError, FloodFill, Grid, InvalidRing, Matrix, Rect, Side};
use bevy_math::DVec2;
use fxhash::FxHasher;
use indexmap::IndexMap;
use std::hash::BuildHasherDefault;

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Whether a ring bounds covered area or cuts a hole in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingKind {
    /// The ring's interior adds to the coverage.
    Shell,
    /// The ring's interior is subtracted from the coverage.
    Hole,
}

/// A map of per-cell polygon coverage fractions over a grid.
///
/// Rings are accumulated one at a time: shells add their coverage, holes
/// subtract theirs. Every cell of the grid that the ring overlaps ends up
/// with the exact fraction of its area covered, computed analytically from
/// the ring's traversals of the cell; cells wholly inside a ring count as
/// covered even though no ring segment touches them.
///
/// # Example
///
/// ```
/// use bevy_math::dvec2;
/// use coverage_map::{CoverageMap, Grid, Rect, RingKind};
///
/// let grid = Grid::bounded(Rect::new(0.0, 0.0, 3.0, 3.0), 1.0, 1.0);
/// let mut map = CoverageMap::new(grid);
/// let ring = [
///     dvec2(0.5, 0.5),
///     dvec2(2.5, 0.5),
///     dvec2(2.5, 2.5),
///     dvec2(0.5, 2.5),
///     dvec2(0.5, 0.5),
/// ];
/// map.add_ring(&ring, RingKind::Shell)?;
/// assert_eq!(map.covered_fraction(1, 1), 1.0);
/// assert_eq!(map.covered_fraction(0, 0), 0.25);
/// # Ok::<(), coverage_map::CoverageError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CoverageMap {
    grid: Grid,
    cover: Matrix<f64>,
}

impl CoverageMap {
    /// Create a new, empty coverage map over the given grid.
    ///
    /// The output matrix has the grid's full dimensions; for an infinite
    /// grid the halo rows and columns exist but are never written.
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        Self {
            cover: Matrix::new(grid.rows(), grid.cols()),
            grid,
        }
    }

    #[inline]
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Get the accumulated fraction matrix.
    #[inline]
    #[must_use]
    pub fn fractions(&self) -> &Matrix<f64> {
        &self.cover
    }

    /// Consume the map, returning the fraction matrix.
    #[inline]
    #[must_use]
    pub fn into_fractions(self) -> Matrix<f64> {
        self.cover
    }

    /// Get the covered fraction of the cell at (`row`, `col`), clamped to
    /// [0, 1] to absorb floating-point noise from accumulation.
    #[inline]
    #[must_use]
    pub fn covered_fraction(&self, row: usize, col: usize) -> f64 {
        self.cover[(row, col)].clamp(0.0, 1.0)
    }

    /// Accumulate a polygon given as its sequence of rings, the shell first,
    /// followed by any holes.
    pub fn add_polygon(&mut self, rings: &[&[DVec2]]) -> Result<(), CoverageError> {
        for (i, ring) in rings.iter().enumerate() {
            let kind = if i == 0 {
                RingKind::Shell
            } else {
                RingKind::Hole
            };
            self.add_ring(ring, kind)?;
        }
        Ok(())
    }

    /// Accumulate a single ring.
    ///
    /// The ring must be closed (first == last), have at least four vertices,
    /// and contain only finite coordinates. Winding order does not matter:
    /// the ring is normalised to counter-clockwise, and whether its interior
    /// adds or subtracts coverage is decided by `kind` alone. A ring that
    /// does not overlap the grid extent is a no-op.
    pub fn add_ring(&mut self, ring: &[DVec2], kind: RingKind) -> Result<(), CoverageError> {
        validate_ring(ring)?;
        if signed_area(ring) < 0.0 {
            let reversed: Vec<DVec2> = ring.iter().rev().copied().collect();
            self.add_oriented_ring(&reversed, kind)
        } else {
            self.add_oriented_ring(ring, kind)
        }
    }

    fn add_oriented_ring(&mut self, ring: &[DVec2], kind: RingKind) -> Result<(), CoverageError> {
        let Some(bounds) = Rect::from_points(ring.iter().copied()) else {
            return Ok(());
        };
        let Some(clipped) = bounds.intersection(&self.grid.extent()) else {
            return Ok(());
        };

        let sub = self.grid.as_finite().shrink_to_fit(&clipped)?;
        let walk = sub.as_infinite();

        let mut cells: FxIndexMap<(usize, usize), Cell> = FxIndexMap::default();
        let mut row = walk.get_row(ring[0].y)?;
        let mut col = walk.get_column(ring[0].x)?;

        for &coord in ring {
            loop {
                let cell = cells
                    .entry((row, col))
                    .or_insert_with(|| Cell::new(walk.cell_rect(row, col)));
                if cell.take(coord) {
                    break;
                }

                // The segment left the cell; pick up the walk in the
                // neighbour across the exit side, starting at the exit
                // point.
                let exited = cell.last_traversal().unwrap();
                let exit_coord = exited.last_coordinate().unwrap();
                match exited.exit_side() {
                    Side::Top => row -= 1,
                    Side::Bottom => row += 1,
                    Side::Left => col -= 1,
                    Side::Right => col += 1,
                    Side::None => unreachable!("an exited traversal always has an exit side"),
                }
                cells
                    .entry((row, col))
                    .or_insert_with(|| Cell::new(walk.cell_rect(row, col)))
                    .take(exit_coord);
            }
        }

        for cell in cells.values_mut() {
            cell.force_exit();
        }

        let mut areas = Matrix::new(sub.rows(), sub.cols());
        for (&(r, c), cell) in &cells {
            if r == 0 || c == 0 || r == walk.rows() - 1 || c == walk.cols() - 1 {
                continue;
            }
            areas[(r - 1, c - 1)] = cell.covered_fraction();
        }

        FloodFill::new(ring, &sub).flood(&mut areas);

        let sign = match kind {
            RingKind::Shell => 1.0,
            RingKind::Hole => -1.0,
        };
        let row0 = self.grid.padding() + self.grid.row_offset(&sub);
        let col0 = self.grid.padding() + self.grid.col_offset(&sub);
        for r in 0..sub.rows() {
            for c in 0..sub.cols() {
                let value = areas[(r, c)];
                if value != 0.0 {
                    self.cover.increment(row0 + r, col0 + c, sign * value);
                }
            }
        }

        Ok(())
    }
}

fn validate_ring(ring: &[DVec2]) -> Result<(), InvalidRing> {
    if ring.len() < 4 {
        return Err(InvalidRing::new("ring must have at least four vertices"));
    }
    if ring.first() != ring.last() {
        return Err(InvalidRing::new("ring is not closed"));
    }
    if ring.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(InvalidRing::new("ring coordinates must be finite"));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::area::area;
    use approx::assert_abs_diff_eq;
    use bevy_math::dvec2;

    fn ring(points: &[(f64, f64)]) -> Vec<DVec2> {
        points.iter().map(|&(x, y)| dvec2(x, y)).collect()
    }

    fn unit_map() -> CoverageMap {
        CoverageMap::new(Grid::bounded(Rect::new(0.0, 0.0, 3.0, 3.0), 1.0, 1.0))
    }

    fn assert_fractions(map: &CoverageMap, expected: &Matrix<f64>) {
        let actual = map.fractions();
        assert_eq!(actual.rows(), expected.rows());
        assert_eq!(actual.cols(), expected.cols());
        for row in 0..expected.rows() {
            for col in 0..expected.cols() {
                assert_abs_diff_eq!(
                    actual[(row, col)],
                    expected[(row, col)],
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_centered_square() {
        let mut map = unit_map();
        map.add_ring(
            &ring(&[(0.5, 0.5), (2.5, 0.5), (2.5, 2.5), (0.5, 2.5), (0.5, 0.5)]),
            RingKind::Shell,
        )
        .unwrap();

        let expected = Matrix::from_rows(vec![
            vec![0.25, 0.5, 0.25],
            vec![0.5, 1.0, 0.5],
            vec![0.25, 0.5, 0.25],
        ]);
        assert_fractions(&map, &expected);
    }

    #[test]
    fn test_ring_within_one_cell() {
        let mut map = unit_map();
        map.add_ring(
            &ring(&[(0.1, 0.1), (0.2, 0.1), (0.2, 0.2), (0.1, 0.2), (0.1, 0.1)]),
            RingKind::Shell,
        )
        .unwrap();

        let mut expected = Matrix::new(3, 3);
        expected[(2, 0)] = 0.01;
        assert_fractions(&map, &expected);
    }

    #[test]
    fn test_ring_coincident_with_extent() {
        let mut map = unit_map();
        map.add_ring(
            &ring(&[(0.0, 0.0), (3.0, 0.0), (3.0, 3.0), (0.0, 3.0), (0.0, 0.0)]),
            RingKind::Shell,
        )
        .unwrap();

        let expected = Matrix::from_rows(vec![vec![1.0; 3]; 3]);
        assert_fractions(&map, &expected);
    }

    #[test]
    fn test_ring_enclosing_infinite_grid() {
        let grid = Grid::infinite(Rect::new(0.0, 0.0, 2.0, 2.0), 1.0, 1.0);
        let mut map = CoverageMap::new(grid);
        map.add_ring(
            &ring(&[(-1.0, -1.0), (3.0, -1.0), (3.0, 3.0), (-1.0, 3.0), (-1.0, -1.0)]),
            RingKind::Shell,
        )
        .unwrap();

        // All real cells are fully covered; the halo is never written.
        let expected = Matrix::from_rows(vec![
            vec![0.0, 0.0, 0.0, 0.0],
            vec![0.0, 1.0, 1.0, 0.0],
            vec![0.0, 1.0, 1.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0],
        ]);
        assert_fractions(&map, &expected);
    }

    #[test]
    fn test_triangle() {
        let mut map = unit_map();
        map.add_ring(
            &ring(&[(0.0, 0.0), (3.0, 0.0), (0.0, 3.0), (0.0, 0.0)]),
            RingKind::Shell,
        )
        .unwrap();

        let expected = Matrix::from_rows(vec![
            vec![0.5, 0.0, 0.0],
            vec![1.0, 0.5, 0.0],
            vec![1.0, 1.0, 0.5],
        ]);
        assert_fractions(&map, &expected);
    }

    #[test]
    fn test_reversed_ring_is_equivalent() {
        let forward = ring(&[(0.5, 0.5), (2.5, 0.5), (2.5, 2.5), (0.5, 2.5), (0.5, 0.5)]);
        let reversed: Vec<DVec2> = forward.iter().rev().copied().collect();

        let mut a = unit_map();
        a.add_ring(&forward, RingKind::Shell).unwrap();
        let mut b = unit_map();
        b.add_ring(&reversed, RingKind::Shell).unwrap();

        assert_eq!(a.fractions(), b.fractions());
    }

    #[test]
    fn test_hole_subtracts() {
        let mut map = unit_map();
        let shell = ring(&[(0.0, 0.0), (3.0, 0.0), (3.0, 3.0), (0.0, 3.0), (0.0, 0.0)]);
        let hole = ring(&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0), (1.0, 1.0)]);
        map.add_polygon(&[&shell, &hole]).unwrap();

        let expected = Matrix::from_rows(vec![
            vec![1.0, 1.0, 1.0],
            vec![1.0, 0.0, 1.0],
            vec![1.0, 1.0, 1.0],
        ]);
        assert_fractions(&map, &expected);
    }

    #[test]
    fn test_multiple_parts_accumulate() {
        let mut map = unit_map();
        let part = ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]);
        map.add_ring(&part, RingKind::Shell).unwrap();
        map.add_ring(&part, RingKind::Shell).unwrap();

        // Raw accumulation doubles up; the query clamps.
        assert_eq!(map.fractions()[(2, 0)], 2.0);
        assert_eq!(map.covered_fraction(2, 0), 1.0);
    }

    #[test]
    fn test_ring_outside_extent_is_noop() {
        let mut map = unit_map();
        map.add_ring(
            &ring(&[(5.0, 5.0), (6.0, 5.0), (6.0, 6.0), (5.0, 6.0), (5.0, 5.0)]),
            RingKind::Shell,
        )
        .unwrap();
        assert_eq!(map.fractions(), &Matrix::new(3, 3));
    }

    #[test]
    fn test_concave_ring_conserves_area() {
        let grid = Grid::bounded(Rect::new(0.0, 0.0, 10.0, 10.0), 0.5, 0.5);
        let mut map = CoverageMap::new(grid);
        let ring = ring(&[
            (0.5, 0.5),
            (9.5, 0.5),
            (9.5, 9.5),
            (5.0, 3.0),
            (0.5, 9.5),
            (0.5, 0.5),
        ]);
        map.add_ring(&ring, RingKind::Shell).unwrap();

        let cell_area = 0.5 * 0.5;
        let covered: f64 = map.fractions().data().iter().sum::<f64>() * cell_area;
        assert_abs_diff_eq!(covered, area(&ring), epsilon = 1e-9 * 100.0);
    }

    #[test]
    fn test_ring_starting_inside_a_cell_wraps_cleanly() {
        // The first vertex sits strictly inside a cell that the ring leaves
        // and re-enters; the wrap-around merge must keep the balance exact.
        let grid = Grid::bounded(Rect::new(0.0, 0.0, 4.0, 4.0), 1.0, 1.0);
        let mut map = CoverageMap::new(grid);
        let ring = ring(&[
            (1.5, 1.5),
            (3.5, 1.5),
            (3.5, 3.5),
            (1.5, 3.5),
            (1.5, 1.5),
        ]);
        map.add_ring(&ring, RingKind::Shell).unwrap();

        let covered: f64 = map.fractions().data().iter().sum::<f64>();
        assert_abs_diff_eq!(covered, 4.0, epsilon = 1e-12);
        // The starting cell gets its quarter corner via the merged run.
        assert_abs_diff_eq!(map.fractions()[(2, 1)], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(map.fractions()[(1, 1)], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(map.fractions()[(1, 2)], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_malformed_rings() {
        let mut map = unit_map();

        let short = ring(&[(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]);
        assert!(matches!(
            map.add_ring(&short, RingKind::Shell),
            Err(CoverageError::Ring(_))
        ));

        let open = ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert!(matches!(
            map.add_ring(&open, RingKind::Shell),
            Err(CoverageError::Ring(_))
        ));

        let non_finite = ring(&[(0.0, 0.0), (f64::NAN, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert!(matches!(
            map.add_ring(&non_finite, RingKind::Shell),
            Err(CoverageError::Ring(_))
        ));

        assert_eq!(map.fractions(), &Matrix::new(3, 3));
    }

    #[test]
    fn test_segment_through_cell_corner() {
        // The diagonal passes exactly through interior grid corners.
        let grid = Grid::bounded(Rect::new(0.0, 0.0, 2.0, 2.0), 1.0, 1.0);
        let mut map = CoverageMap::new(grid);
        map.add_ring(
            &ring(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 0.0)]),
            RingKind::Shell,
        )
        .unwrap();

        let expected = Matrix::from_rows(vec![vec![0.0, 0.5], vec![0.5, 1.0]]);
        assert_fractions(&map, &expected);
    }
}
