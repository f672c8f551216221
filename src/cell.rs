use crate::area::{area, left_hand_area};
use crate::{Rect, Side, Traversal};
use bevy_math::DVec2;
use std::fmt;

/// Position of a coordinate relative to a cell rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Inside,
    Boundary,
    Outside,
}

/// One grid cell accumulating the [Traversal]s of a ring passing through it.
///
/// Coordinates are fed in ring order through [take](Self::take); after the
/// ring closes, [force_exit](Self::force_exit) settles any run still open on
/// the boundary, and [covered_fraction](Self::covered_fraction) reports the
/// fraction of the cell covered by the ring.
///
/// At most one traversal is unfinished at any time, and it is always the
/// last.
#[derive(Debug, Clone)]
pub struct Cell {
    rect: Rect,
    traversals: Vec<Traversal>,
}

impl Cell {
    #[inline]
    #[must_use]
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            traversals: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    #[inline]
    #[must_use]
    pub fn area(&self) -> f64 {
        self.rect.area()
    }

    /// Get the side of this cell that `coord` lies on, or [Side::None] for a
    /// point off the boundary. A corner reports the first match in the order
    /// left, right, bottom, top.
    #[must_use]
    pub fn side(&self, coord: DVec2) -> Side {
        if coord.x == self.rect.xmin() {
            Side::Left
        } else if coord.x == self.rect.xmax() {
            Side::Right
        } else if coord.y == self.rect.ymin() {
            Side::Bottom
        } else if coord.y == self.rect.ymax() {
            Side::Top
        } else {
            Side::None
        }
    }

    /// Locate `coord` relative to this cell.
    #[must_use]
    pub fn location(&self, coord: DVec2) -> Location {
        if self.rect.strictly_contains(coord) {
            Location::Inside
        } else if self.rect.contains(coord) {
            Location::Boundary
        } else {
            Location::Outside
        }
    }

    #[inline]
    #[must_use]
    pub fn traversals(&self) -> &[Traversal] {
        &self.traversals
    }

    #[inline]
    #[must_use]
    pub fn last_traversal(&self) -> Option<&Traversal> {
        self.traversals.last()
    }

    fn traversal_in_progress(&mut self) -> &mut Traversal {
        if self.traversals.last().map_or(true, Traversal::exited) {
            self.traversals.push(Traversal::new());
        }
        self.traversals.last_mut().unwrap()
    }

    /// Feed the next ring coordinate to this cell.
    ///
    /// Returns `true` while the ring remains inside or on the cell. When
    /// `coord` lies outside, the current traversal is closed at the point
    /// where the segment from its last coordinate to `coord` crosses the
    /// cell boundary, and `false` is returned; the exit point and side can
    /// then be read from [last_traversal](Self::last_traversal).
    pub fn take(&mut self, coord: DVec2) -> bool {
        let side = self.side(coord);
        let location = self.location(coord);
        let rect = self.rect;

        let t = self.traversal_in_progress();

        if t.is_empty() {
            t.enter(coord, side);
            return true;
        }

        if location != Location::Outside {
            t.add(coord);
            return true;
        }

        let last = t.last_coordinate().unwrap();
        let crossing = rect.crossing(last, coord);
        t.exit(crossing.coord(), crossing.side());
        false
    }

    /// Settle the unfinished traversal, if any, after its ring has closed.
    ///
    /// A run whose last coordinate landed exactly on the boundary is
    /// promoted to exited through that side. A run that ended at the ring's
    /// interior starting point is merged with the leading traversal that
    /// began there, forming a single boundary-to-boundary run.
    pub fn force_exit(&mut self) {
        let Some(last) = self.traversals.last() else {
            return;
        };
        if last.exited() {
            return;
        }
        let Some(coord) = last.last_coordinate() else {
            return;
        };

        if self.location(coord) == Location::Boundary {
            let side = self.side(coord);
            self.traversals.last_mut().unwrap().force_exit(side);
        } else {
            self.close_wraparound();
        }
    }

    /// Join the unfinished trailing traversal onto the leading one when the
    /// ring both started and closed at a point interior to this cell.
    fn close_wraparound(&mut self) {
        if self.traversals.len() < 2 {
            return;
        }
        let head = &self.traversals[0];
        let tail = &self.traversals[self.traversals.len() - 1];
        if !head.traversed() || head.entry_side() != Side::None {
            return;
        }
        if head.first_coordinate() != tail.last_coordinate() {
            return;
        }

        let tail = self.traversals.pop().unwrap();
        let head = std::mem::take(&mut self.traversals[0]);

        let mut merged = Traversal::new();
        let mut coords = tail.coords().iter().copied();
        if let Some(first) = coords.next() {
            merged.enter(first, tail.entry_side());
        }
        for coord in coords {
            merged.add(coord);
        }
        for coord in head.coords().iter().copied() {
            merged.add(coord);
        }
        merged.force_exit(head.exit_side());

        self.traversals[0] = merged;
    }

    /// Compute the fraction of this cell's area covered by the ring.
    #[must_use]
    pub fn covered_fraction(&self) -> f64 {
        // A ring enclosed within this single cell never crosses a side.
        if self.traversals.len() == 1 && self.traversals[0].is_closed_ring() {
            return area(self.traversals[0].coords()) / self.area();
        }

        let coord_lists: Vec<&[DVec2]> = self
            .traversals
            .iter()
            .filter(|t| t.traversed() && t.multiple_unique_coordinates())
            .map(Traversal::coords)
            .collect();

        if coord_lists.is_empty() {
            return 0.0;
        }

        left_hand_area(&self.rect, &coord_lists) / self.area()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.rect;
        write!(
            f,
            "POLYGON (({} {}, {} {}, {} {}, {} {}, {} {}))",
            r.xmin(),
            r.ymin(),
            r.xmax(),
            r.ymin(),
            r.xmax(),
            r.ymax(),
            r.xmin(),
            r.ymax(),
            r.xmin(),
            r.ymin(),
        )
    }
}
