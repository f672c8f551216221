#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Side;
use bevy_math::DVec2;

/// An immutable axis-aligned rectangle defined by a minimum and maximum
/// point, in `f64` coordinates.
///
/// Infinite bounds are permitted (the halo cells of an infinite grid are
/// unbounded on their outward sides); NaN is not.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    min: DVec2,
    max: DVec2,
}

impl Rect {
    /// Create a new rectangle from its four bounds.
    ///
    /// # Panics
    ///
    /// If any bound is NaN, or `xmin > xmax`, or `ymin > ymax`.
    #[inline]
    #[must_use]
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        assert!(
            !xmin.is_nan() && !ymin.is_nan() && !xmax.is_nan() && !ymax.is_nan(),
            "rectangle bounds must not be NaN"
        );
        assert!(xmin <= xmax && ymin <= ymax, "rectangle bounds are inverted");
        Self {
            min: DVec2::new(xmin, ymin),
            max: DVec2::new(xmax, ymax),
        }
    }

    /// Create a new rectangle spanning two corner points, in any order.
    #[inline]
    #[must_use]
    pub fn from_corners<P>(a: P, b: P) -> Self
    where
        P: Into<DVec2>,
    {
        let a = a.into();
        let b = b.into();
        let min = a.min(b);
        let max = a.max(b);
        Self::new(min.x, min.y, max.x, max.y)
    }

    /// Compute the bounding rectangle of a sequence of points, or `None` for
    /// an empty sequence.
    #[must_use]
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = DVec2>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self::new(min.x, min.y, max.x, max.y))
    }

    #[inline]
    #[must_use]
    pub fn min(&self) -> DVec2 {
        self.min
    }

    #[inline]
    #[must_use]
    pub fn max(&self) -> DVec2 {
        self.max
    }

    #[inline]
    #[must_use]
    pub fn xmin(&self) -> f64 {
        self.min.x
    }

    #[inline]
    #[must_use]
    pub fn ymin(&self) -> f64 {
        self.min.y
    }

    #[inline]
    #[must_use]
    pub fn xmax(&self) -> f64 {
        self.max.x
    }

    #[inline]
    #[must_use]
    pub fn ymax(&self) -> f64 {
        self.max.y
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    #[inline]
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        2.0 * (self.width() + self.height())
    }

    #[inline]
    #[must_use]
    pub fn lower_left(&self) -> DVec2 {
        self.min
    }

    #[inline]
    #[must_use]
    pub fn lower_right(&self) -> DVec2 {
        DVec2::new(self.max.x, self.min.y)
    }

    #[inline]
    #[must_use]
    pub fn upper_right(&self) -> DVec2 {
        self.max
    }

    #[inline]
    #[must_use]
    pub fn upper_left(&self) -> DVec2 {
        DVec2::new(self.min.x, self.max.y)
    }

    /// Determine if the given point lies within this rectangle, boundary
    /// included.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Determine if the given point lies within this rectangle, boundary
    /// excluded.
    #[inline]
    #[must_use]
    pub fn strictly_contains(&self, point: DVec2) -> bool {
        point.x > self.min.x && point.x < self.max.x && point.y > self.min.y && point.y < self.max.y
    }

    /// Intersect this rectangle with another. Returns `None` when they are
    /// disjoint; a shared edge or corner yields a degenerate rectangle.
    #[inline]
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if min.x > max.x || min.y > max.y {
            None
        } else {
            Some(Self { min, max })
        }
    }

    /// Find where the segment from `a` to `b` leaves this rectangle.
    ///
    /// `a` must lie inside or on the rectangle and `b` strictly outside of
    /// it. Candidate edges are tested in the order top, bottom, left, right,
    /// which fixes the side reported for an exit through a corner.
    #[must_use]
    pub fn crossing(&self, a: DVec2, b: DVec2) -> Crossing {
        let d = b - a;

        if d.y > 0.0 {
            let x = a.x + (self.max.y - a.y) * d.x / d.y;
            if x >= self.min.x && x <= self.max.x {
                return Crossing::new(Side::Top, DVec2::new(x, self.max.y));
            }
        }
        if d.y < 0.0 {
            let x = a.x + (self.min.y - a.y) * d.x / d.y;
            if x >= self.min.x && x <= self.max.x {
                return Crossing::new(Side::Bottom, DVec2::new(x, self.min.y));
            }
        }
        if d.x < 0.0 {
            let y = a.y + (self.min.x - a.x) * d.y / d.x;
            if y >= self.min.y && y <= self.max.y {
                return Crossing::new(Side::Left, DVec2::new(self.min.x, y));
            }
        }
        if d.x > 0.0 {
            let y = a.y + (self.max.x - a.x) * d.y / d.x;
            if y >= self.min.y && y <= self.max.y {
                return Crossing::new(Side::Right, DVec2::new(self.max.x, y));
            }
        }

        unreachable!("segment does not leave the rectangle");
    }

    /// Get the distance from the upper-left corner to the given boundary
    /// point, measured clockwise along the perimeter.
    ///
    /// # Panics
    ///
    /// If the point does not lie on the boundary.
    #[must_use]
    pub fn perimeter_distance(&self, point: DVec2) -> f64 {
        if point.y == self.max.y {
            return point.x - self.min.x;
        }
        if point.x == self.max.x {
            return self.width() + (self.max.y - point.y);
        }
        if point.y == self.min.y {
            return self.width() + self.height() + (self.max.x - point.x);
        }
        if point.x == self.min.x {
            return 2.0 * self.width() + self.height() + (point.y - self.min.y);
        }
        panic!("point is not on the rectangle boundary");
    }

    /// Get the counter-clockwise distance along the perimeter from the
    /// clockwise measure `from` to the clockwise measure `to`.
    #[inline]
    #[must_use]
    pub fn perimeter_distance_ccw(&self, from: f64, to: f64) -> f64 {
        if from >= to {
            from - to
        } else {
            self.perimeter() - (to - from)
        }
    }
}

/// The point at which a segment leaves a rectangle, and the side it crosses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    side: Side,
    coord: DVec2,
}

impl Crossing {
    #[inline]
    #[must_use]
    pub fn new(side: Side, coord: DVec2) -> Self {
        Self { side, coord }
    }

    #[inline]
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    #[must_use]
    pub fn coord(&self) -> DVec2 {
        self.coord
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bevy_math::dvec2;

    #[test]
    fn test_contains() {
        let r = Rect::new(0.0, 0.0, 2.0, 1.0);
        assert!(r.contains(dvec2(0.0, 0.0)));
        assert!(r.contains(dvec2(2.0, 1.0)));
        assert!(r.contains(dvec2(1.0, 0.5)));
        assert!(!r.contains(dvec2(2.1, 0.5)));
        assert!(!r.contains(dvec2(1.0, -0.1)));

        assert!(r.strictly_contains(dvec2(1.0, 0.5)));
        assert!(!r.strictly_contains(dvec2(0.0, 0.5)));
        assert!(!r.strictly_contains(dvec2(2.0, 1.0)));
    }

    #[test]
    fn test_intersection() {
        let r = Rect::new(0.0, 0.0, 4.0, 4.0);
        assert_eq!(
            r.intersection(&Rect::new(2.0, 2.0, 6.0, 6.0)),
            Some(Rect::new(2.0, 2.0, 4.0, 4.0))
        );
        assert_eq!(
            r.intersection(&Rect::new(4.0, 0.0, 6.0, 4.0)),
            Some(Rect::new(4.0, 0.0, 4.0, 4.0))
        );
        assert_eq!(r.intersection(&Rect::new(5.0, 0.0, 6.0, 4.0)), None);
    }

    #[test]
    fn test_from_points() {
        let points = [dvec2(1.0, 4.0), dvec2(-1.0, 2.0), dvec2(3.0, 3.0)];
        assert_eq!(
            Rect::from_points(points),
            Some(Rect::new(-1.0, 2.0, 3.0, 4.0))
        );
        assert_eq!(Rect::from_points(Vec::<DVec2>::new()), None);
    }

    #[test]
    fn test_crossing_sides() {
        let r = Rect::new(0.0, 0.0, 1.0, 1.0);

        let x = r.crossing(dvec2(0.5, 0.5), dvec2(0.5, 2.0));
        assert_eq!(x.side(), Side::Top);
        assert_eq!(x.coord(), dvec2(0.5, 1.0));

        let x = r.crossing(dvec2(0.5, 0.5), dvec2(0.5, -2.0));
        assert_eq!(x.side(), Side::Bottom);
        assert_eq!(x.coord(), dvec2(0.5, 0.0));

        let x = r.crossing(dvec2(0.5, 0.5), dvec2(-2.0, 0.5));
        assert_eq!(x.side(), Side::Left);
        assert_eq!(x.coord(), dvec2(0.0, 0.5));

        let x = r.crossing(dvec2(0.5, 0.5), dvec2(2.0, 0.5));
        assert_eq!(x.side(), Side::Right);
        assert_eq!(x.coord(), dvec2(1.0, 0.5));
    }

    #[test]
    fn test_crossing_interpolates() {
        let r = Rect::new(0.0, 0.0, 1.0, 1.0);
        let x = r.crossing(dvec2(0.25, 0.5), dvec2(0.75, 1.5));
        assert_eq!(x.side(), Side::Top);
        assert_eq!(x.coord(), dvec2(0.5, 1.0));
    }

    #[test]
    fn test_crossing_corner_prefers_top() {
        // An exit exactly through the upper-right corner satisfies both the
        // top and right edge tests; top wins.
        let r = Rect::new(0.0, 0.0, 1.0, 1.0);
        let x = r.crossing(dvec2(0.5, 0.5), dvec2(1.5, 1.5));
        assert_eq!(x.side(), Side::Top);
        assert_eq!(x.coord(), dvec2(1.0, 1.0));
    }

    #[test]
    fn test_crossing_from_boundary_point() {
        // Leaving from a point already on the left edge reports that edge.
        let r = Rect::new(0.0, 0.0, 1.0, 1.0);
        let x = r.crossing(dvec2(0.0, 0.5), dvec2(-1.0, 1.0));
        assert_eq!(x.side(), Side::Left);
        assert_eq!(x.coord(), dvec2(0.0, 0.5));
    }

    #[test]
    fn test_perimeter_distance() {
        let r = Rect::new(0.0, 0.0, 2.0, 1.0);
        assert_eq!(r.perimeter_distance(r.upper_left()), 0.0);
        assert_eq!(r.perimeter_distance(dvec2(0.5, 1.0)), 0.5);
        assert_eq!(r.perimeter_distance(r.upper_right()), 2.0);
        assert_eq!(r.perimeter_distance(dvec2(2.0, 0.25)), 2.75);
        assert_eq!(r.perimeter_distance(r.lower_right()), 3.0);
        assert_eq!(r.perimeter_distance(dvec2(0.5, 0.0)), 4.5);
        assert_eq!(r.perimeter_distance(r.lower_left()), 5.0);
        assert_eq!(r.perimeter_distance(dvec2(0.0, 0.75)), 5.75);
    }

    #[test]
    fn test_perimeter_distance_ccw() {
        let r = Rect::new(0.0, 0.0, 2.0, 1.0);
        assert_eq!(r.perimeter_distance_ccw(3.0, 1.0), 2.0);
        assert_eq!(r.perimeter_distance_ccw(1.0, 3.0), 4.0);
        assert_eq!(r.perimeter_distance_ccw(2.5, 2.5), 0.0);
    }

    #[test]
    #[should_panic]
    fn test_rejects_nan() {
        let _ = Rect::new(0.0, f64::NAN, 1.0, 1.0);
    }
}
