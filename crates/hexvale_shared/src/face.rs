//! Block faces.

use serde::{Deserialize, Serialize};

/// One of the six faces of a block.
///
/// Declaration order matches the adjacency order used by the world:
/// left, right, front, back, top, bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Face {
    /// -X side.
    Left = 0,
    /// +X side.
    Right = 1,
    /// +Z side.
    Front = 2,
    /// -Z side.
    Back = 3,
    /// +Y side.
    Top = 4,
    /// -Y side.
    Bottom = 5,
}

impl Face {
    /// All faces in adjacency order.
    pub const ALL: [Self; 6] = [
        Self::Left,
        Self::Right,
        Self::Front,
        Self::Back,
        Self::Top,
        Self::Bottom,
    ];

    /// Returns the face pointing the other way.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Front => Self::Back,
            Self::Back => Self::Front,
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }

    /// Unit offset `(dx, dy, dz)` from a block to its neighbour across this face.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            Self::Left => (-1, 0, 0),
            Self::Right => (1, 0, 0),
            Self::Front => (0, 0, 1),
            Self::Back => (0, 0, -1),
            Self::Top => (0, 1, 0),
            Self::Bottom => (0, -1, 0),
        }
    }

    /// Converts from u8.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            2 => Some(Self::Front),
            3 => Some(Self::Back),
            4 => Some(Self::Top),
            5 => Some(Self::Bottom),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_involution() {
        for face in Face::ALL {
            assert_eq!(face.opposite().opposite(), face);
            assert_ne!(face.opposite(), face);
        }
    }

    #[test]
    fn test_opposite_offsets_cancel() {
        for face in Face::ALL {
            let (ax, ay, az) = face.offset();
            let (bx, by, bz) = face.opposite().offset();
            assert_eq!((ax + bx, ay + by, az + bz), (0, 0, 0));
        }
    }

    #[test]
    fn test_from_u8() {
        assert_eq!(Face::from_u8(4), Some(Face::Top));
        assert_eq!(Face::from_u8(6), None);
    }
}
