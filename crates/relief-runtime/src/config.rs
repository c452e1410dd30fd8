//! Layered configuration system
//!
//! Config is resolved with three layers of precedence (highest wins):
//! 1. Environment variables: `RELIEF_RESOLUTION`, `RELIEF_HEIGHT`, ...
//! 2. Config file: `relief.toml` (or an explicit path)
//! 3. Built-in defaults

use std::path::Path;

use log::debug;
use relief_core::{Color, Gradient, GradientStop, ReliefError, Result};
use relief_terrain::TerrainParams;
use relief_water::{WaterSettings, WaterStrategy, WaveParams};
use serde::{Deserialize, Serialize};

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "relief.toml";

/// A color written either as `"#RRGGBB"` or as an `[r, g, b(, a)]` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Hex(String),
    Rgba([f32; 4]),
    Rgb([f32; 3]),
}

impl ColorValue {
    pub fn to_color(&self) -> Result<Color> {
        match self {
            ColorValue::Hex(s) => Color::parse_hex(s)
                .ok_or_else(|| ReliefError::ParseError(format!("invalid hex color '{}'", s))),
            ColorValue::Rgba([r, g, b, a]) => Ok(Color::new(*r, *g, *b, *a)),
            ColorValue::Rgb([r, g, b]) => Ok(Color::new(*r, *g, *b, 1.0)),
        }
    }
}

/// Hex is only written when it reads back as the same color; anything else
/// is kept as a float array.
impl From<Color> for ColorValue {
    fn from(c: Color) -> Self {
        let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        let hex = (to_byte(c.r) << 16) | (to_byte(c.g) << 8) | to_byte(c.b);
        if Color::from_hex(hex) == c {
            ColorValue::Hex(format!("#{:06X}", hex))
        } else {
            ColorValue::Rgba(c.to_array())
        }
    }
}

/// `[water]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterSection {
    #[serde(default)]
    pub strategy: WaterStrategy,
    #[serde(default = "default_water_depth")]
    pub depth: f32,
    #[serde(default = "default_transparency")]
    pub transparency: f32,
    #[serde(default)]
    pub animated: bool,
    #[serde(default = "default_water_color")]
    pub color: ColorValue,
    #[serde(default)]
    pub waves: WaveParams,
}

fn default_water_depth() -> f32 {
    WaterSettings::default().depth
}
fn default_transparency() -> f32 {
    WaterSettings::default().transparency
}
fn default_water_color() -> ColorValue {
    WaterSettings::default().color.into()
}

impl Default for WaterSection {
    fn default() -> Self {
        Self {
            strategy: WaterStrategy::default(),
            depth: default_water_depth(),
            transparency: default_transparency(),
            animated: false,
            color: default_water_color(),
            waves: WaveParams::default(),
        }
    }
}

/// One `[[gradient]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientStopEntry {
    pub position: f32,
    pub color: ColorValue,
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LandscapeConfigFile {
    #[serde(default)]
    pub terrain: TerrainParams,
    #[serde(default)]
    pub water: WaterSection,
    /// Empty means the built-in terrain palette
    #[serde(default)]
    pub gradient: Vec<GradientStopEntry>,
}

impl LandscapeConfigFile {
    /// The defaults written out in full, used by `relief init`
    pub fn with_default_gradient() -> Self {
        Self {
            gradient: Gradient::default()
                .stops()
                .iter()
                .map(|s| GradientStopEntry {
                    position: s.position,
                    color: s.color.into(),
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Resolved configuration with overrides applied
#[derive(Debug, Clone)]
pub struct LandscapeConfig {
    pub terrain: TerrainParams,
    pub water: WaterSettings,
    pub gradient: Gradient,
}

impl Default for LandscapeConfig {
    fn default() -> Self {
        Self {
            terrain: TerrainParams::default(),
            water: WaterSettings::default(),
            gradient: Gradient::default(),
        }
    }
}

impl LandscapeConfig {
    /// Load config with layered precedence: defaults < file < env vars.
    ///
    /// With no explicit path, `relief.toml` in the working directory is used
    /// if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut file = match path {
            Some(p) => Self::load_file(p)?,
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.exists() {
                    Self::load_file(local)?
                } else {
                    LandscapeConfigFile::default()
                }
            }
        };

        apply_overrides(&mut file, |key| std::env::var(key).ok())?;
        Self::resolve(file)
    }

    /// Load config from a specific file path only (no env overrides)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::resolve(Self::load_file(path)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::resolve(toml::from_str(content)?)
    }

    /// Turn the raw file structure into validated settings
    pub fn resolve(file: LandscapeConfigFile) -> Result<Self> {
        file.terrain.validate()?;

        let gradient = if file.gradient.is_empty() {
            Gradient::default()
        } else {
            let stops = file
                .gradient
                .iter()
                .map(|e| Ok(GradientStop::new(e.position, e.color.to_color()?)))
                .collect::<Result<Vec<_>>>()?;
            Gradient::new(stops)?
        };

        file.water.waves.validate()?;
        let water = WaterSettings {
            strategy: file.water.strategy,
            depth: relief_core::ensure_finite("water_depth", file.water.depth)?,
            transparency: relief_core::ensure_finite("transparency", file.water.transparency)?
                .clamp(0.0, 1.0),
            animated: file.water.animated,
            color: file.water.color.to_color()?,
            waves: file.water.waves,
        };

        Ok(Self {
            terrain: file.terrain,
            water,
            gradient,
        })
    }

    /// Write the resolved config back out as TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_file().to_toml_string()?)?;
        Ok(())
    }

    pub fn to_file(&self) -> LandscapeConfigFile {
        LandscapeConfigFile {
            terrain: self.terrain.clone(),
            water: WaterSection {
                strategy: self.water.strategy,
                depth: self.water.depth,
                transparency: self.water.transparency,
                animated: self.water.animated,
                color: self.water.color.into(),
                waves: self.water.waves,
            },
            gradient: self
                .gradient
                .stops()
                .iter()
                .map(|s| GradientStopEntry {
                    position: s.position,
                    color: s.color.into(),
                })
                .collect(),
        }
    }

    fn load_file(path: &Path) -> Result<LandscapeConfigFile> {
        debug!("loading config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let file: LandscapeConfigFile = toml::from_str(&content)?;
        Ok(file)
    }
}

/// Apply `RELIEF_*` overrides using `lookup` to read variables
pub fn apply_overrides<F>(file: &mut LandscapeConfigFile, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("RELIEF_RESOLUTION") {
        file.terrain.resolution = parse_override("RELIEF_RESOLUTION", &v)?;
    }
    if let Some(v) = lookup("RELIEF_HEIGHT") {
        file.terrain.height_multiplier = parse_override("RELIEF_HEIGHT", &v)?;
    }
    if let Some(v) = lookup("RELIEF_NOISE_SCALE") {
        file.terrain.noise_scale = parse_override("RELIEF_NOISE_SCALE", &v)?;
    }
    if let Some(v) = lookup("RELIEF_SEED") {
        file.terrain.seed = parse_override("RELIEF_SEED", &v)?;
    }
    if let Some(v) = lookup("RELIEF_WATER_DEPTH") {
        file.water.depth = parse_override("RELIEF_WATER_DEPTH", &v)?;
    }
    Ok(())
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ReliefError::ParseError(format!("{}='{}': {}", key, value, e)))
}
