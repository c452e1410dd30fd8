//! Sum-of-sines wave displacement

use rayon::prelude::*;
use relief_core::{ensure_finite, Result, Vec3};
use serde::{Deserialize, Serialize};

/// Frequency added per successive wave term
pub const FREQUENCY_STEP: f32 = 0.2;

/// Wave shape. Term `j` has amplitude `wave_height / (j + 1)` and frequency
/// `wave_frequency + j * FREQUENCY_STEP`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveParams {
    pub wave_height: f32,
    pub wave_speed: f32,
    pub wave_frequency: f32,
    pub wave_count: u32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            wave_height: 0.5,
            wave_speed: 1.0,
            wave_frequency: 0.2,
            wave_count: 3,
        }
    }
}

impl WaveParams {
    /// Reject NaN and infinite wave settings
    pub fn validate(&self) -> Result<()> {
        ensure_finite("wave_height", self.wave_height)?;
        ensure_finite("wave_speed", self.wave_speed)?;
        ensure_finite("wave_frequency", self.wave_frequency)?;
        Ok(())
    }

    /// Vertical offset at local (x, z) after `time` seconds
    pub fn displacement(&self, x: f32, z: f32, time: f32) -> f32 {
        let phase = time * self.wave_speed;
        (0..self.wave_count)
            .map(|j| {
                let frequency = self.wave_frequency + j as f32 * FREQUENCY_STEP;
                let amplitude = self.wave_height / (j + 1) as f32;
                ((x + phase) * frequency).sin() * amplitude
                    + ((z + phase) * frequency).cos() * amplitude
            })
            .sum()
    }

    /// Write displaced copies of `original` into `out`.
    ///
    /// Each output is `original + displacement`, so repeated calls never
    /// accumulate and the same `time` always gives the same surface.
    pub fn displace(&self, original: &[Vec3], out: &mut [Vec3], time: f32) {
        assert_eq!(original.len(), out.len(), "displacement buffers differ in length");

        out.par_iter_mut()
            .zip(original.par_iter())
            .for_each(|(dst, src)| {
                *dst = src.with_y(src.y + self.displacement(src.x, src.z, time));
            });
    }
}
