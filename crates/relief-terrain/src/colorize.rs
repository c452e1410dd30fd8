//! Height-based vertex coloring

use rayon::prelude::*;
use relief_core::{Color, Gradient, Vec3};

/// Position of `height` within `[min, max]`, clamped to [0, 1].
///
/// A flat range (`max == min`) normalizes every height to 0.
pub fn normalized_height(height: f32, min: f32, max: f32) -> f32 {
    let span = max - min;
    if span <= 0.0 {
        return 0.0;
    }
    ((height - min) / span).clamp(0.0, 1.0)
}

/// Maps vertex heights onto a gradient
#[derive(Clone, Debug, Default)]
pub struct HeightColorizer {
    gradient: Gradient,
}

impl HeightColorizer {
    pub fn new(gradient: Gradient) -> Self {
        Self { gradient }
    }

    pub fn gradient(&self) -> &Gradient {
        &self.gradient
    }

    /// One color per vertex, in vertex order
    pub fn colorize(&self, vertices: &[Vec3], min_height: f32, max_height: f32) -> Vec<Color> {
        vertices
            .par_iter()
            .map(|v| {
                self.gradient
                    .evaluate(normalized_height(v.y, min_height, max_height))
            })
            .collect()
    }
}
