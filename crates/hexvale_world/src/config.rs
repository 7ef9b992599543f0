//! # World Configuration
//!
//! Loaded once at startup from TOML. Seed, world type and world size are
//! fixed for the lifetime of a `World`.
//!
//! ```toml
//! raw_seed = 123456
//! world_type = 1
//! size_in_chunks_x = 8
//! size_in_chunks_z = 8
//!
//! [generator]
//! octave_count = 4
//! persistence = 0.5
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use hexvale_shared::{CHUNK_HEIGHT, CHUNK_SIZE};

use crate::error::ConfigError;

/// Player headroom: a player whose feet are less than this far into a block
/// may stand with a solid block in their third (head) slot.
pub const PLAYER_HEADROOM: f32 = 0.2;

/// World environment type.
///
/// The integer value is persisted with world settings. Never renumber.
/// Starts at 1 so a defaulted zero is detectable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum WorldType {
    /// Temperate grassland.
    Grass = 1,
    /// Snow covered.
    Winter = 2,
    /// Sand covered.
    Desert = 3,
}

impl TryFrom<u8> for WorldType {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Grass),
            2 => Ok(Self::Winter),
            3 => Ok(Self::Desert),
            other => Err(ConfigError::InvalidWorldType(other)),
        }
    }
}

impl From<WorldType> for u8 {
    fn from(value: WorldType) -> Self {
        value as u8
    }
}

/// Terrain generator settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Blocks per noise lattice cell.
    pub unit_size: u32,
    /// Noise octaves summed per column.
    pub octave_count: u32,
    /// Amplitude decay per octave.
    pub persistence: f64,
    /// Columns below this height fill with water up to it.
    pub water_level: i32,
    /// Lowest generated surface.
    pub min_surface_height: i32,
    /// Highest generated surface.
    pub max_surface_height: i32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            unit_size: 100,
            octave_count: 3,
            persistence: 0.5,
            water_level: 30,
            min_surface_height: 20,
            max_surface_height: 70,
        }
    }
}

/// World settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Raw seed used to generate this world.
    pub raw_seed: i32,
    /// Environment type.
    pub world_type: WorldType,
    /// Chunks along X.
    pub size_in_chunks_x: u32,
    /// Chunks along Z.
    pub size_in_chunks_z: u32,
    /// See [`PLAYER_HEADROOM`].
    pub player_headroom: f32,
    /// Next object id to hand out (restored from a saved world).
    pub object_id_seq: u32,
    /// Terrain generator settings.
    pub generator: GeneratorConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            raw_seed: 123_456,
            world_type: WorldType::Grass,
            size_in_chunks_x: 8,
            size_in_chunks_z: 8,
            player_headroom: PLAYER_HEADROOM,
            object_id_seq: 1,
            generator: GeneratorConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Parses and validates a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing or validation fails.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks ranges that parsing alone cannot enforce.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size_in_chunks_x == 0 || self.size_in_chunks_z == 0 {
            return Err(ConfigError::InvalidWorldSize {
                x: self.size_in_chunks_x,
                z: self.size_in_chunks_z,
            });
        }
        if i32::try_from(self.size_in_chunks_x).is_err() || i32::try_from(self.size_in_chunks_z).is_err() {
            return Err(ConfigError::InvalidWorldSize {
                x: self.size_in_chunks_x,
                z: self.size_in_chunks_z,
            });
        }

        let generator = &self.generator;
        if generator.unit_size == 0 {
            return Err(ConfigError::InvalidGenerator("unit_size must be at least 1".into()));
        }
        if generator.octave_count == 0 {
            return Err(ConfigError::InvalidGenerator("octave_count must be at least 1".into()));
        }
        if generator.octave_count > self.max_octave_count() {
            return Err(ConfigError::InvalidGenerator(format!(
                "octave_count {} exceeds {} for this world size and unit_size",
                generator.octave_count,
                self.max_octave_count()
            )));
        }
        if !(generator.persistence > 0.0 && generator.persistence <= 1.0) {
            return Err(ConfigError::InvalidGenerator(format!(
                "persistence {} outside (0, 1]",
                generator.persistence
            )));
        }
        if generator.min_surface_height < 1
            || generator.max_surface_height >= CHUNK_HEIGHT
            || generator.min_surface_height > generator.max_surface_height
        {
            return Err(ConfigError::InvalidGenerator(format!(
                "surface range {}..={} outside 1..{CHUNK_HEIGHT}",
                generator.min_surface_height, generator.max_surface_height
            )));
        }
        if !(0..CHUNK_HEIGHT).contains(&generator.water_level) {
            return Err(ConfigError::InvalidGenerator(format!(
                "water level {} outside 0..{CHUNK_HEIGHT}",
                generator.water_level
            )));
        }
        if !(0.0..1.0).contains(&self.player_headroom) {
            return Err(ConfigError::InvalidGenerator(format!(
                "player headroom {} outside [0, 1)",
                self.player_headroom
            )));
        }
        Ok(())
    }

    /// Most octaves whose top frequency keeps every lattice coordinate of
    /// this world inside `i32`.
    #[must_use]
    pub fn max_octave_count(&self) -> u32 {
        let extent = u64::from(self.size_in_chunks_x.max(self.size_in_chunks_z)) * u64::from(CHUNK_SIZE.unsigned_abs());
        let limit = u64::from(i32::MAX.unsigned_abs()) * u64::from(self.generator.unit_size.max(1));
        let mut octaves = 0;
        let mut top = extent;
        while top <= limit && octaves < 64 {
            octaves += 1;
            top = top.saturating_mul(2);
        }
        octaves
    }
}
