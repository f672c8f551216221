use crate::Side;
use bevy_math::DVec2;

/// An ordered run of ring coordinates through a single cell, bracketed by the
/// sides through which the ring entered and left the cell.
///
/// A traversal moves from *empty* through *entered* to *exited*. The entry
/// side is [Side::None] when the run began at a point interior to the cell,
/// which happens only for a ring that starts (and therefore closes) inside
/// it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Traversal {
    coords: Vec<DVec2>,
    entry: Side,
    exit: Side,
}

impl Traversal {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn entered(&self) -> bool {
        !self.coords.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn exited(&self) -> bool {
        self.exit != Side::None
    }

    /// Alias for [exited](Self::exited): the run is complete and its
    /// coordinates span entry to exit.
    #[inline]
    #[must_use]
    pub fn traversed(&self) -> bool {
        self.exited()
    }

    /// Begin the traversal at `coord`, entering through `side`.
    #[inline]
    pub fn enter(&mut self, coord: DVec2, side: Side) {
        debug_assert!(self.is_empty());
        self.entry = side;
        self.coords.push(coord);
    }

    /// Append `coord`, unless it repeats the previous coordinate.
    #[inline]
    pub fn add(&mut self, coord: DVec2) {
        if self.coords.last() != Some(&coord) {
            self.coords.push(coord);
        }
    }

    /// End the traversal at `coord`, leaving through `side`.
    #[inline]
    pub fn exit(&mut self, coord: DVec2, side: Side) {
        debug_assert!(self.entered());
        self.add(coord);
        self.exit = side;
    }

    /// End the traversal at its current last coordinate, leaving through
    /// `side`.
    #[inline]
    pub fn force_exit(&mut self, side: Side) {
        debug_assert!(self.entered());
        self.exit = side;
    }

    #[inline]
    #[must_use]
    pub fn entry_side(&self) -> Side {
        self.entry
    }

    #[inline]
    #[must_use]
    pub fn exit_side(&self) -> Side {
        self.exit
    }

    #[inline]
    #[must_use]
    pub fn coords(&self) -> &[DVec2] {
        &self.coords
    }

    #[inline]
    #[must_use]
    pub fn first_coordinate(&self) -> Option<DVec2> {
        self.coords.first().copied()
    }

    #[inline]
    #[must_use]
    pub fn last_coordinate(&self) -> Option<DVec2> {
        self.coords.last().copied()
    }

    /// Determine if this traversal is a whole ring enclosed in its cell: it
    /// never crossed a side and its coordinates close back on the first.
    #[inline]
    #[must_use]
    pub fn is_closed_ring(&self) -> bool {
        self.entry == Side::None
            && self.exit == Side::None
            && self.coords.len() >= 4
            && self.coords.first() == self.coords.last()
    }

    /// Determine if this traversal contains at least two distinct
    /// coordinates.
    #[inline]
    #[must_use]
    pub fn multiple_unique_coordinates(&self) -> bool {
        self.coords
            .first()
            .is_some_and(|first| self.coords.iter().any(|c| c != first))
    }
}
