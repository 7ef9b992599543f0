//! # Continuous Coordinates
//!
//! Mobs, players and dynamic items need more precise positioning than a
//! block. `Coords` carries three floats plus a facing direction and pitch.
//!
//! ## Wire Format
//!
//! 20 bytes, five little-endian `f32` in the order
//! `x, y, z, direction, pitch`. Any collaborator that serializes positions
//! over the network or to disk must match this layout exactly.

use std::f32::consts::{FRAC_PI_4, TAU};

use crate::constants::{COORDS_SIZE, PITCH_LIMIT};
use crate::error::{CoordsError, SharedResult};
use crate::position::Position;

/// Compass facing derived from a direction angle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Direction within π/4 of zero.
    East,
    /// Direction in (5π/4, 7π/4].
    North,
    /// Direction in (3π/4, 5π/4].
    West,
    /// Direction in [π/4, 3π/4].
    South,
}

/// Continuous world position with direction and pitch (radians).
///
/// Direction is kept in `[0, 2π)` and pitch inside `±PITCH_LIMIT`; both
/// rules are applied on construction, on decode and by the setters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Coords {
    /// X position.
    pub x: f32,
    /// Y position.
    pub y: f32,
    /// Z position.
    pub z: f32,
    direction: f32,
    pitch: f32,
}

impl Coords {
    /// Creates coords facing direction zero with level pitch.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            direction: 0.0,
            pitch: 0.0,
        }
    }

    /// Creates coords with a facing. Direction is wrapped and pitch clamped.
    #[must_use]
    pub fn with_facing(x: f32, y: f32, z: f32, direction: f32, pitch: f32) -> Self {
        let mut coords = Self::new(x, y, z);
        coords.set_direction(direction);
        coords.set_pitch(pitch);
        coords
    }

    /// Decodes coords from `bytes` starting at `start`.
    ///
    /// The start index exists because other data is often sent first in the
    /// same buffer.
    ///
    /// # Errors
    ///
    /// Returns `CoordsError::Truncated` if fewer than 20 bytes remain.
    pub fn from_bytes(bytes: &[u8], start: usize) -> SharedResult<Self> {
        let available = bytes.len().saturating_sub(start);
        if available < COORDS_SIZE {
            return Err(CoordsError::Truncated {
                needed: COORDS_SIZE,
                available,
            });
        }
        let field = |i: usize| {
            let at = start + i * 4;
            f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
        };
        Ok(Self::with_facing(field(0), field(1), field(2), field(3), field(4)))
    }

    /// Encodes to the 20-byte wire format.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; COORDS_SIZE] {
        let mut bytes = [0u8; COORDS_SIZE];
        for (i, value) in [self.x, self.y, self.z, self.direction, self.pitch]
            .into_iter()
            .enumerate()
        {
            bytes[i * 4..i * 4 + 4].copy_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Direction in radians, `[0, 2π)`.
    #[inline]
    #[must_use]
    pub const fn direction(&self) -> f32 {
        self.direction
    }

    /// Sets the direction, wrapping it into `[0, 2π)`.
    pub fn set_direction(&mut self, direction: f32) {
        let wrapped = direction.rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        self.direction = if wrapped >= TAU { 0.0 } else { wrapped };
    }

    /// Pitch in radians.
    #[inline]
    #[must_use]
    pub const fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Sets the pitch, clamped just inside ±π/2.
    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// X of the containing block. Truncates toward zero.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn x_block(&self) -> i32 {
        self.x as i32
    }

    /// Y of the containing block. Truncates toward zero.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn y_block(&self) -> i32 {
        self.y as i32
    }

    /// Z of the containing block. Truncates toward zero.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn z_block(&self) -> i32 {
        self.z as i32
    }

    /// Containing block position (truncation, not floor).
    #[inline]
    #[must_use]
    pub fn to_position(&self) -> Position {
        Position::new(self.x_block(), self.y_block(), self.z_block())
    }

    /// True if both coords truncate to the same block.
    #[inline]
    #[must_use]
    pub fn is_on_block(&self, other: &Self) -> bool {
        self.to_position() == other.to_position()
    }

    /// Exact euclidean distance.
    #[must_use]
    pub fn distance_exact(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Compass facing for the current direction.
    #[must_use]
    pub fn direction_facing(&self) -> Facing {
        let d = self.direction;
        if d < FRAC_PI_4 || d > FRAC_PI_4 * 7.0 {
            Facing::East
        } else if d > FRAC_PI_4 * 5.0 {
            Facing::North
        } else if d > FRAC_PI_4 * 3.0 {
            Facing::West
        } else {
            Facing::South
        }
    }
}

impl std::fmt::Display for Coords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(x={}, y={}, z={})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_block_coords_truncate_toward_zero() {
        let coords = Coords::new(-0.5, 2.9, -3.7);
        assert_eq!(coords.x_block(), 0);
        assert_eq!(coords.y_block(), 2);
        assert_eq!(coords.z_block(), -3);
        assert_eq!(coords.to_position(), Position::new(0, 2, -3));
    }

    #[test]
    fn test_direction_wraps() {
        let coords = Coords::with_facing(0.0, 0.0, 0.0, -PI / 2.0, 0.0);
        assert!((coords.direction() - 3.0 * PI / 2.0).abs() < 1e-5);

        let coords = Coords::with_facing(0.0, 0.0, 0.0, TAU + 1.0, 0.0);
        assert!((coords.direction() - 1.0).abs() < 1e-5);

        let coords = Coords::with_facing(0.0, 0.0, 0.0, -1e-9, 0.0);
        assert!(coords.direction() >= 0.0 && coords.direction() < TAU);
    }

    #[test]
    fn test_pitch_clamps() {
        let up = Coords::with_facing(0.0, 0.0, 0.0, 0.0, 10.0);
        assert_eq!(up.pitch(), PITCH_LIMIT);
        let down = Coords::with_facing(0.0, 0.0, 0.0, 0.0, -10.0);
        assert_eq!(down.pitch(), -PITCH_LIMIT);
        assert!(PITCH_LIMIT < PI / 2.0);
    }

    #[test]
    fn test_encode_decode_matches_construction() {
        let original = Coords::with_facing(12.5, 64.25, -3.125, 7.5, -2.0);
        let bytes = original.to_bytes();
        assert_eq!(bytes.len(), 20);
        let decoded = Coords::from_bytes(&bytes, 0).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(decoded.direction(), original.direction());
        assert_eq!(decoded.pitch(), original.pitch());
    }

    #[test]
    fn test_decode_with_offset() {
        let coords = Coords::with_facing(1.0, 2.0, 3.0, 0.5, 0.25);
        let mut buffer = vec![0xAB; 7];
        buffer.extend_from_slice(&coords.to_bytes());
        assert_eq!(Coords::from_bytes(&buffer, 7).unwrap(), coords);
    }

    #[test]
    fn test_field_order_little_endian() {
        let coords = Coords::with_facing(1.0, 2.0, 3.0, 0.5, 0.25);
        let bytes = coords.to_bytes();
        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[4..8], &2.0f32.to_le_bytes());
        assert_eq!(&bytes[8..12], &3.0f32.to_le_bytes());
        assert_eq!(&bytes[12..16], &0.5f32.to_le_bytes());
        assert_eq!(&bytes[16..20], &0.25f32.to_le_bytes());
    }

    #[test]
    fn test_decode_truncated() {
        let err = Coords::from_bytes(&[0u8; 25], 10).unwrap_err();
        assert_eq!(
            err,
            CoordsError::Truncated {
                needed: 20,
                available: 15
            }
        );
        assert!(Coords::from_bytes(&[0u8; 4], 9).is_err());
    }

    #[test]
    fn test_direction_facing() {
        let at = |d: f32| Coords::with_facing(0.0, 0.0, 0.0, d, 0.0).direction_facing();
        assert_eq!(at(0.1), Facing::East);
        assert_eq!(at(PI / 2.0), Facing::South);
        assert_eq!(at(PI), Facing::West);
        assert_eq!(at(3.0 * PI / 2.0), Facing::North);
        assert_eq!(at(TAU - 0.1), Facing::East);
    }

    #[test]
    fn test_distance_exact() {
        let a = Coords::new(0.0, 0.0, 0.0);
        let b = Coords::new(3.0, 4.0, 0.0);
        assert!((a.distance_exact(&b) - 5.0).abs() < f32::EPSILON);
    }
}
