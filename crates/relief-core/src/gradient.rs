//! Color gradients with linear interpolation between ordered stops

use serde::{Deserialize, Serialize};

use crate::error::{ReliefError, Result};
use crate::types::Color;

/// A single gradient key: a color pinned at a position in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub position: f32,
    pub color: Color,
}

impl GradientStop {
    pub const fn new(position: f32, color: Color) -> Self {
        Self { position, color }
    }
}

/// Ordered list of color stops. Always holds at least one stop.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    stops: Vec<GradientStop>,
}

impl Gradient {
    /// Build a gradient from stops in any order.
    /// Positions are clamped to [0, 1] and sorted; an empty list is an error.
    pub fn new(stops: Vec<GradientStop>) -> Result<Self> {
        if stops.is_empty() {
            return Err(ReliefError::ResourceUnavailable(
                "gradient has no color stops".to_string(),
            ));
        }

        let mut stops: Vec<GradientStop> = stops
            .into_iter()
            .map(|s| GradientStop::new(s.position.clamp(0.0, 1.0), s.color))
            .collect();
        // Stable sort keeps equal-position stops in declaration order
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));

        Ok(Self { stops })
    }

    /// Single-color gradient
    pub fn solid(color: Color) -> Self {
        Self {
            stops: vec![GradientStop::new(0.0, color)],
        }
    }

    /// Water to snow, the palette used when no gradient is configured
    pub fn terrain() -> Self {
        Self {
            stops: vec![
                GradientStop::new(0.0, Color::from_hex(0x1F4E79)),
                GradientStop::new(0.25, Color::from_hex(0xD8C690)),
                GradientStop::new(0.45, Color::from_hex(0x4F8A3A)),
                GradientStop::new(0.75, Color::from_hex(0x7A6A58)),
                GradientStop::new(1.0, Color::from_hex(0xF4F4F4)),
            ],
        }
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Sample the gradient at `t` (clamped to [0, 1]).
    /// Values before the first stop or past the last take that stop's color.
    pub fn evaluate(&self, t: f32) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let first = &self.stops[0];
        if t <= first.position {
            return first.color;
        }

        for pair in self.stops.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if t <= b.position {
                let span = b.position - a.position;
                if span <= f32::EPSILON {
                    return b.color;
                }
                return a.color.lerp(&b.color, (t - a.position) / span);
            }
        }

        self.stops[self.stops.len() - 1].color
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self::terrain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn black_to_white() -> Gradient {
        Gradient::new(vec![
            GradientStop::new(0.0, Color::BLACK),
            GradientStop::new(1.0, Color::WHITE),
        ])
        .unwrap()
    }

    #[test]
    fn empty_gradient_is_unavailable() {
        let err = Gradient::new(Vec::new()).unwrap_err();
        assert!(matches!(err, ReliefError::ResourceUnavailable(_)));
    }

    #[test]
    fn evaluates_endpoints_and_midpoint() {
        let g = black_to_white();
        assert_eq!(g.evaluate(0.0), Color::BLACK);
        assert_eq!(g.evaluate(1.0), Color::WHITE);
        let mid = g.evaluate(0.5);
        assert!((mid.r - 0.5).abs() < 1e-6);
        assert!((mid.a - 1.0).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        let g = black_to_white();
        assert_eq!(g.evaluate(-3.0), Color::BLACK);
        assert_eq!(g.evaluate(7.0), Color::WHITE);
        assert_eq!(g.evaluate(f32::NAN), Color::BLACK);
    }

    #[test]
    fn stops_are_sorted_on_construction() {
        let g = Gradient::new(vec![
            GradientStop::new(1.0, Color::WHITE),
            GradientStop::new(0.0, Color::BLACK),
        ])
        .unwrap();
        assert_eq!(g.stops()[0].color, Color::BLACK);
        assert_eq!(g.evaluate(0.0), Color::BLACK);
    }

    #[test]
    fn single_stop_is_constant() {
        let red = Color::new(1.0, 0.0, 0.0, 1.0);
        let g = Gradient::new(vec![GradientStop::new(0.4, red)]).unwrap();
        assert_eq!(g.evaluate(0.0), red);
        assert_eq!(g.evaluate(0.9), red);
        assert_eq!(Gradient::solid(red).evaluate(0.5), red);
    }

    #[test]
    fn values_before_first_stop_hold_its_color() {
        let g = Gradient::new(vec![
            GradientStop::new(0.5, Color::BLACK),
            GradientStop::new(1.0, Color::WHITE),
        ])
        .unwrap();
        assert_eq!(g.evaluate(0.25), Color::BLACK);
        let c = g.evaluate(0.75);
        assert!((c.g - 0.5).abs() < 1e-6);
    }
}
