//! Relief Core - Foundational types for the Relief terrain generator
//!
//! This crate provides the core types that all other Relief crates depend on:
//! - `Vec3`, `Transform` - Spatial types
//! - `Color`, `Gradient` - Vertex coloring
//! - Error types and Result alias

mod error;
mod gradient;
mod types;

pub use error::{ensure_finite, ReliefError, Result};
pub use gradient::{Gradient, GradientStop};
pub use types::{lerp_f32, Color, Transform, Vec3};
