//! Relief Runtime - Parameter, config, and animation-loop plumbing
//!
//! Provides the pieces a host application drives:
//! - `FrameClock` - fixed-timestep accumulator for the wave tick
//! - `LandscapeConfig` - layered TOML configuration
//! - `Landscape` - terrain and water wired together behind a parameter source

mod clock;
pub mod config;
mod landscape;

pub use clock::{FrameClock, MAX_FRAME_TIME};
pub use config::{apply_overrides, ColorValue, LandscapeConfig, LandscapeConfigFile};
pub use landscape::{Landscape, ParameterUpdate};
