//! Height sources sampled by the grid builder

use noise::{NoiseFn, Perlin};

/// Anything that maps a world-space (x, z) position to a height.
///
/// Implementations must be pure: the grid builder samples rows from several
/// worker threads and relies on identical inputs producing identical heights.
pub trait HeightField: Sync {
    fn height_at(&self, x: f32, z: f32) -> f32;
}

/// Constant height everywhere
#[derive(Clone, Copy, Debug)]
pub struct FlatHeightField(pub f32);

impl HeightField for FlatHeightField {
    fn height_at(&self, _x: f32, _z: f32) -> f32 {
        self.0
    }
}

impl<F> HeightField for F
where
    F: Fn(f32, f32) -> f32 + Sync,
{
    fn height_at(&self, x: f32, z: f32) -> f32 {
        self(x, z)
    }
}

/// Seeded Perlin noise remapped to [0, 1]
#[derive(Clone, Debug)]
pub struct NoiseHeightField {
    perlin: Perlin,
    seed: u32,
}

impl NoiseHeightField {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Height at world coordinates: noise sampled at `(x, z) * noise_scale`,
    /// remapped from [-1, 1] to [0, 1], then multiplied by `height_multiplier`.
    pub fn sample(&self, x: f32, z: f32, noise_scale: f32, height_multiplier: f32) -> f32 {
        let nx = f64::from(x) * f64::from(noise_scale);
        let nz = f64::from(z) * f64::from(noise_scale);
        let n = self.perlin.get([nx, nz]);
        let unit = ((n + 1.0) * 0.5).clamp(0.0, 1.0) as f32;
        unit * height_multiplier
    }

    /// Bind scale and amplitude, producing a `HeightField` for the builder
    pub fn scaled(&self, noise_scale: f32, height_multiplier: f32) -> ScaledNoise<'_> {
        ScaledNoise {
            field: self,
            noise_scale,
            height_multiplier,
        }
    }
}

impl Default for NoiseHeightField {
    fn default() -> Self {
        Self::new(0)
    }
}

/// A `NoiseHeightField` with fixed noise scale and height multiplier
#[derive(Clone, Copy, Debug)]
pub struct ScaledNoise<'a> {
    field: &'a NoiseHeightField,
    pub noise_scale: f32,
    pub height_multiplier: f32,
}

impl HeightField for ScaledNoise<'_> {
    fn height_at(&self, x: f32, z: f32) -> f32 {
        self.field
            .sample(x, z, self.noise_scale, self.height_multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_is_repeatable() {
        let field = NoiseHeightField::new(7);
        let other = NoiseHeightField::new(7);
        for i in 0..50 {
            let x = i as f32 * 0.37;
            let z = i as f32 * 1.13;
            assert_eq!(
                field.sample(x, z, 0.3, 2.0).to_bits(),
                other.sample(x, z, 0.3, 2.0).to_bits()
            );
        }
    }

    #[test]
    fn unit_amplitude_stays_in_unit_range() {
        let field = NoiseHeightField::default();
        for i in 0..400 {
            let h = field.sample((i % 20) as f32 * 0.7, (i / 20) as f32 * 0.9, 0.3, 1.0);
            assert!((0.0..=1.0).contains(&h), "height {h} out of range");
        }
    }

    #[test]
    fn zero_multiplier_flattens() {
        let field = NoiseHeightField::new(3);
        assert_eq!(field.sample(4.2, 9.1, 0.3, 0.0), 0.0);
    }

    #[test]
    fn noise_is_continuous() {
        let field = NoiseHeightField::new(11);
        let a = field.sample(5.0, 5.0, 0.3, 1.0);
        let b = field.sample(5.001, 5.0, 0.3, 1.0);
        assert!((a - b).abs() < 0.01);
    }

    #[test]
    fn scaled_matches_sample() {
        let field = NoiseHeightField::new(2);
        let scaled = field.scaled(0.5, 3.0);
        assert_eq!(scaled.height_at(1.5, 2.5), field.sample(1.5, 2.5, 0.5, 3.0));
    }

    #[test]
    fn closures_are_height_fields() {
        let slope = |x: f32, _z: f32| x * 0.5;
        assert_eq!(slope.height_at(4.0, 0.0), 2.0);
        assert_eq!(FlatHeightField(1.5).height_at(9.0, 9.0), 1.5);
    }
}
