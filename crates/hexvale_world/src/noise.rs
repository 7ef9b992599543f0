//! # Gradient Noise
//!
//! Deterministic multi-octave gradient noise for terrain height fields.
//!
//! ## Departures From Canonical Perlin
//!
//! - Lattice hashes come from a pure integer hash of
//!   `(x, y, z, octave, seed)` instead of a shuffled permutation table.
//! - Interpolation across the unit cube is LINEAR. There is no fade curve.
//! - Fractional offsets are rounded to 15 decimal places before use so
//!   points on a cube boundary do not flicker between cells.
//! - The gradient table keeps its irregular `0xD` and `0xF` entries.
//!
//! All four are load-bearing: existing worlds were generated with them.
//!
//! ## Determinism Guarantee
//!
//! Every function here is a pure function of its arguments and the seed.
//! Same inputs produce bit-identical output on every call.

/// World seed for deterministic generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(i32);

impl WorldSeed {
    /// Creates a new world seed from the raw configured seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: i32) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

/// Pure hash of five integers.
///
/// FNV-1a style mixing per input followed by a murmur3 finalizer.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn deterministic_hash(x: i32, y: i32, z: i32, octave: i32, seed: i32) -> u32 {
    let mut hash: u32 = 0x811C_9DC5;
    for value in [x, y, z, octave, seed] {
        hash ^= value as u32;
        hash = hash.wrapping_mul(0x0100_0193);
        hash ^= hash >> 15;
    }
    hash ^= hash >> 16;
    hash = hash.wrapping_mul(0x85EB_CA6B);
    hash ^= hash >> 13;
    hash = hash.wrapping_mul(0xC2B2_AE35);
    hash ^ (hash >> 16)
}

/// Gradient dot product selected by the low four bits of `hash`.
///
/// Entries `0xD` and `0xF` do not follow the pattern of their neighbours.
/// They are kept verbatim for compatibility with generated worlds.
#[inline]
#[must_use]
pub fn grad(hash: u32, x: f64, y: f64, z: f64) -> f64 {
    match hash & 0xF {
        0x0 => x + y,
        0x1 => -x + y,
        0x2 => x - y,
        0x3 => -x - y,
        0x4 => x + z,
        0x5 => -x + z,
        0x6 => x - z,
        0x7 => -x - z,
        0x8 => y + z,
        0x9 => -y + z,
        0xA => y - z,
        0xB => -y - z,
        0xC => y + x,
        0xD => -y + z,
        0xE => y - x,
        _ => -y - z,
    }
}

#[inline]
fn lerp(a: f64, b: f64, w: f64) -> f64 {
    a + w * (b - a)
}

/// Fractional part rounded to 15 decimal places.
#[inline]
fn fractional(v: f64) -> f64 {
    const SCALE: f64 = 1e15;
    ((v - v.floor()) * SCALE).round() / SCALE
}

/// Rectangular column region sampled by the map functions.
///
/// Bounds are in world blocks, `min` inclusive and `max` exclusive. Columns
/// are visited every `scale` blocks and values are scaled into `[0, max_y]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoiseRegion {
    /// Inclusive minimum X.
    pub min_x: i32,
    /// Exclusive maximum X.
    pub max_x: i32,
    /// Inclusive minimum Z.
    pub min_z: i32,
    /// Exclusive maximum Z.
    pub max_z: i32,
    /// Step between sampled columns.
    pub scale: i32,
    /// Height the unit noise value is scaled to.
    pub max_y: i32,
}

impl NoiseRegion {
    /// Creates a region with step 1.
    #[must_use]
    pub const fn new(min_x: i32, max_x: i32, min_z: i32, max_z: i32, max_y: i32) -> Self {
        Self {
            min_x,
            max_x,
            min_z,
            max_z,
            scale: 1,
            max_y,
        }
    }

    /// Sets the column step.
    #[must_use]
    pub const fn with_scale(mut self, scale: i32) -> Self {
        self.scale = scale;
        self
    }

    /// Sampled columns along X.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn width(&self) -> usize {
        steps(self.min_x, self.max_x, self.scale)
    }

    /// Sampled columns along Z.
    #[must_use]
    pub fn depth(&self) -> usize {
        steps(self.min_z, self.max_z, self.scale)
    }
}

#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
fn steps(min: i32, max: i32, scale: i32) -> usize {
    if max <= min || scale <= 0 {
        0
    } else {
        let (min, max, scale) = (i64::from(min), i64::from(max), i64::from(scale));
        ((max - min + scale - 1) / scale) as usize
    }
}

/// Per-column values over a `NoiseRegion`, addressed in world coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseMap<T> {
    region: NoiseRegion,
    values: Vec<T>,
}

impl<T: Copy> NoiseMap<T> {
    /// Region this map covers.
    #[must_use]
    pub const fn region(&self) -> &NoiseRegion {
        &self.region
    }

    /// Value at world column `(x, z)`.
    ///
    /// Columns between sample steps resolve to the sample at or before them.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn get(&self, x: i32, z: i32) -> Option<T> {
        let r = &self.region;
        if x < r.min_x || x >= r.max_x || z < r.min_z || z >= r.max_z || r.scale <= 0 {
            return None;
        }
        let scale = i64::from(r.scale);
        let ix = ((i64::from(x) - i64::from(r.min_x)) / scale) as usize;
        let iz = ((i64::from(z) - i64::from(r.min_z)) / scale) as usize;
        self.values.get(iz * r.width() + ix).copied()
    }

    /// All values, row-major by Z then X.
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }
}

/// Deterministic gradient noise generator.
///
/// # Example
///
/// ```rust,ignore
/// let noise = PerlinNoise::new(WorldSeed::new(123_456), 100);
/// let height = noise.octave_perlin(250, 310, 3, 0.5);
/// assert!((0.0..=1.0).contains(&height));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct PerlinNoise {
    seed: WorldSeed,
    unit_size: u32,
}

impl PerlinNoise {
    /// Creates a generator. `unit_size` is the lattice cell size in blocks.
    #[must_use]
    pub fn new(seed: WorldSeed, unit_size: u32) -> Self {
        Self {
            seed,
            unit_size: unit_size.max(1),
        }
    }

    /// Seed this generator hashes with.
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Lattice cell size in blocks.
    #[must_use]
    pub const fn unit_size(&self) -> u32 {
        self.unit_size
    }

    #[inline]
    fn p(&self, x: i32, y: i32, z: i32, octave: i32) -> u32 {
        deterministic_hash(x, y, z, octave, self.seed.value()) % 256
    }

    /// Single octave of gradient noise, normalized to `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::many_single_char_names)]
    pub fn perlin(&self, x: f64, y: f64, z: f64, octave: i32) -> f64 {
        // Cell corner truncates while the offset floors. Sampled terrain is
        // never negative, where the two agree.
        let xi = x as i32;
        let yi = y as i32;
        let zi = z as i32;
        let xf = fractional(x);
        let yf = fractional(y);
        let zf = fractional(z);

        // Corners past i32::MAX wrap. The hash is pure, so output stays
        // deterministic.
        let (xj, yj, zj) = (xi.wrapping_add(1), yi.wrapping_add(1), zi.wrapping_add(1));
        let aaa = self.p(xi, yi, zi, octave);
        let aba = self.p(xi, yj, zi, octave);
        let aab = self.p(xi, yi, zj, octave);
        let abb = self.p(xi, yj, zj, octave);
        let baa = self.p(xj, yi, zi, octave);
        let bba = self.p(xj, yj, zi, octave);
        let bab = self.p(xj, yi, zj, octave);
        let bbb = self.p(xj, yj, zj, octave);

        let (u, v, w) = (xf, yf, zf);

        let x1 = lerp(grad(aaa, xf, yf, zf), grad(baa, xf - 1.0, yf, zf), u);
        let x2 = lerp(grad(aba, xf, yf - 1.0, zf), grad(bba, xf - 1.0, yf - 1.0, zf), u);
        let y1 = lerp(x1, x2, v);

        let x1 = lerp(grad(aab, xf, yf, zf - 1.0), grad(bab, xf - 1.0, yf, zf - 1.0), u);
        let x2 = lerp(
            grad(abb, xf, yf - 1.0, zf - 1.0),
            grad(bbb, xf - 1.0, yf - 1.0, zf - 1.0),
            u,
        );
        let y2 = lerp(x1, x2, v);

        (lerp(y1, y2, w) + 1.0) / 2.0
    }

    /// Fractal noise for column `(x, z)` on the `y = 0` plane.
    ///
    /// Sums `octaves` layers at doubling frequency with amplitude decaying by
    /// `persistence`, normalized by the total amplitude to `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn octave_perlin(&self, x: i32, z: i32, octaves: u32, persistence: f64) -> f64 {
        let unit = f64::from(self.unit_size);
        let xf = f64::from(x) / unit;
        let yf = 0.0;
        let zf = f64::from(z) / unit;

        let mut total = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        let mut max_value = 0.0;

        for octave in 0..octaves {
            total += self.perlin(xf * frequency, yf * frequency, zf * frequency, octave as i32) * amplitude;
            max_value += amplitude;
            amplitude *= persistence;
            frequency *= 2.0;
        }

        if max_value == 0.0 {
            return 0.0;
        }
        total / max_value
    }

    /// Integer height per column, `octave_perlin * max_y` truncated.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn get_int_map(&self, region: NoiseRegion, octaves: u32, persistence: f64) -> NoiseMap<i32> {
        let max_y = f64::from(region.max_y);
        self.sample_region(region, |x, z| {
            (self.octave_perlin(x, z, octaves, persistence) * max_y) as i32
        })
    }

    /// Float height per column with persistence 0.5.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn get_float_map(&self, region: NoiseRegion, octaves: u32) -> NoiseMap<f32> {
        let max_y = f64::from(region.max_y);
        self.sample_region(region, |x, z| (self.octave_perlin(x, z, octaves, 0.5) * max_y) as f32)
    }

    fn sample_region<T>(&self, region: NoiseRegion, mut sample: impl FnMut(i32, i32) -> T) -> NoiseMap<T> {
        let mut values = Vec::with_capacity(region.width() * region.depth());
        if region.scale > 0 {
            let mut z = region.min_z;
            while z < region.max_z {
                let mut x = region.min_x;
                while x < region.max_x {
                    values.push(sample(x, z));
                    match x.checked_add(region.scale) {
                        Some(next) => x = next,
                        None => break,
                    }
                }
                match z.checked_add(region.scale) {
                    Some(next) => z = next,
                    None => break,
                }
            }
        }
        NoiseMap { region, values }
    }
}
