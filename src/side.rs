#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the four sides of a cell rectangle, or [Side::None] for a point
/// that lies on no side.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    #[default]
    None,
    Left,
    Right,
    Bottom,
    Top,
}

impl Side {
    /// Get the side facing this one across the rectangle.
    #[inline]
    #[must_use]
    pub fn opposite(&self) -> Self {
        match self {
            Side::None => Side::None,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Top => Side::Bottom,
        }
    }
}
