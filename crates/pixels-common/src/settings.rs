//! Rendering settings for a pixel set.
//!
//! A [`RenderingDef`] holds everything needed to turn raw planes into an RGB
//! image: the quantization definition, one [`ChannelBinding`] per channel,
//! the codomain enhancements and the rendering model. It round-trips through
//! JSON so a settings store can persist it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{ConfigError, RenderError};
use crate::pixels::PixelsMetadata;

/// Maximum value of the codomain and of a colour component.
pub const CODOMAIN_MAX: i32 = 255;

/// Minimum value of the codomain.
pub const CODOMAIN_MIN: i32 = 0;

/// Bit resolution for an 8-bit codomain.
pub const DEPTH_8BIT: u32 = 255;

/// An RGBA colour, each component in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Rgba {
    pub const RED: Rgba = Rgba::new(255, 0, 0, 255);
    pub const GREEN: Rgba = Rgba::new(0, 255, 0, 255);
    pub const BLUE: Rgba = Rgba::new(0, 0, 255, 255);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Parse "#RRGGBB" or "#RRGGBBAA".
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 && hex.len() != 8 {
            return None;
        }
        let component = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        let alpha = if hex.len() == 8 { component(6)? } else { 255 };
        Some(Self::new(component(0)?, component(2)?, component(4)?, alpha))
    }

    /// Alpha as a fraction in [0, 1].
    pub fn alpha_fraction(&self) -> f32 {
        self.alpha as f32 / 255.0
    }
}

/// Family of curves used to map intensities onto the codomain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    #[default]
    Linear,
    Polynomial,
    Logarithmic,
    Exponential,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Polynomial => "polynomial",
            Self::Logarithmic => "logarithmic",
            Self::Exponential => "exponential",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Family {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "polynomial" => Ok(Self::Polynomial),
            "logarithmic" => Ok(Self::Logarithmic),
            "exponential" => Ok(Self::Exponential),
            _ => Err(ConfigError::UnknownFamily(s.to_string())),
        }
    }
}

/// How active channels are combined into the output image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderingModel {
    #[default]
    Greyscale,
    Hsb,
    /// Rendered with the HSB composite strategy.
    Rgb,
}

impl RenderingModel {
    pub const GREYSCALE: &'static str = "greyscale";
    pub const HSB: &'static str = "hsb";
    pub const RGB: &'static str = "rgb";

    /// Lenient lookup: unknown tags fall back to greyscale.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or_else(|_| {
            tracing::warn!(model = %tag, "Unknown rendering model, using greyscale");
            Self::Greyscale
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greyscale => Self::GREYSCALE,
            Self::Hsb => Self::HSB,
            Self::Rgb => Self::RGB,
        }
    }
}

impl fmt::Display for RenderingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RenderingModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            Self::GREYSCALE => Ok(Self::Greyscale),
            Self::HSB => Ok(Self::Hsb),
            Self::RGB => Ok(Self::Rgb),
            _ => Err(ConfigError::UnknownModel(s.to_string())),
        }
    }
}

/// Codomain interval and bit resolution of the quantization step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantumDef {
    pub cd_start: i32,
    pub cd_end: i32,
    /// Number of distinct output levels minus one.
    pub bit_resolution: u32,
}

impl Default for QuantumDef {
    fn default() -> Self {
        Self {
            cd_start: CODOMAIN_MIN,
            cd_end: CODOMAIN_MAX,
            bit_resolution: DEPTH_8BIT,
        }
    }
}

impl QuantumDef {
    pub fn new(cd_start: i32, cd_end: i32, bit_resolution: u32) -> Result<Self, ConfigError> {
        let qd = Self {
            cd_start,
            cd_end,
            bit_resolution,
        };
        qd.validate()?;
        Ok(qd)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        verify_codomain(self.cd_start, self.cd_end)?;
        if self.bit_resolution == 0 || self.bit_resolution > DEPTH_8BIT {
            return Err(ConfigError::InvalidBitResolution(self.bit_resolution));
        }
        Ok(())
    }
}

/// Check `0 <= start <= end <= 255`.
pub fn verify_codomain(start: i32, end: i32) -> Result<(), ConfigError> {
    if start < CODOMAIN_MIN || end > CODOMAIN_MAX || start > end {
        return Err(ConfigError::InvalidCodomain { start, end });
    }
    Ok(())
}

/// Rendering settings of one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelBinding {
    pub color: Rgba,
    pub active: bool,
    /// Lower bound of the input window.
    pub input_start: f64,
    /// Upper bound of the input window.
    pub input_end: f64,
    #[serde(default)]
    pub family: Family,
    #[serde(default = "default_coefficient")]
    pub coefficient: f64,
    #[serde(default)]
    pub noise_reduction: bool,
}

fn default_coefficient() -> f64 {
    1.0
}

impl ChannelBinding {
    /// Binding with a linear map over `[input_start, input_end]`.
    pub fn new(color: Rgba, input_start: f64, input_end: f64) -> Self {
        Self {
            color,
            active: true,
            input_start,
            input_end,
            family: Family::Linear,
            coefficient: 1.0,
            noise_reduction: false,
        }
    }
}

/// Persisted description of a codomain enhancement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CodomainMapDef {
    /// Mirror values inside the codomain interval.
    ReverseIntensity,
    /// Piecewise-linear stretch through two control points.
    ContrastStretching {
        x_start: i32,
        y_start: i32,
        x_end: i32,
        y_end: i32,
    },
    /// Highlight one bit plane of the codomain.
    PlaneSlicing {
        /// Bit plane in 1..=8.
        plane_selected: u32,
        lower_limit: i32,
        upper_limit: i32,
        /// Map the selected plane to a constant instead of keeping its values.
        constant: bool,
    },
}

impl CodomainMapDef {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ReverseIntensity => "reverse_intensity",
            Self::ContrastStretching { .. } => "contrast_stretching",
            Self::PlaneSlicing { .. } => "plane_slicing",
        }
    }
}

/// Complete rendering settings for one pixel set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderingDef {
    pub pixels_id: i64,
    pub default_z: usize,
    pub default_t: usize,
    pub model: RenderingModel,
    pub quantization: QuantumDef,
    pub channels: Vec<ChannelBinding>,
    #[serde(default)]
    pub codomain_maps: Vec<CodomainMapDef>,
}

impl RenderingDef {
    /// Settings with one binding per channel, each windowed on the channel's
    /// global extent.
    pub fn new_for(metadata: &PixelsMetadata) -> Self {
        let channels = metadata
            .channels
            .iter()
            .enumerate()
            .map(|(index, channel)| {
                let mut binding = ChannelBinding::new(
                    Rgba::WHITE,
                    channel.stats.global_min,
                    channel.stats.global_max,
                );
                binding.active = index < 3;
                binding
            })
            .collect();

        Self {
            pixels_id: metadata.id,
            default_z: metadata.size_z / 2,
            default_t: 0,
            model: if metadata.size_c > 1 {
                RenderingModel::Hsb
            } else {
                RenderingModel::Greyscale
            },
            quantization: QuantumDef::default(),
            channels,
            codomain_maps: Vec::new(),
        }
    }

    /// Check the settings are usable with the given pixel set.
    pub fn validate(&self, metadata: &PixelsMetadata) -> Result<(), ConfigError> {
        self.quantization.validate()?;
        if self.channels.len() != metadata.size_c {
            return Err(ConfigError::Settings(format!(
                "{} channel bindings for {} channels",
                self.channels.len(),
                metadata.size_c
            )));
        }
        if self.default_z >= metadata.size_z || self.default_t >= metadata.size_t {
            return Err(ConfigError::PlaneOutOfBounds(format!(
                "default plane z={} t={}",
                self.default_z, self.default_t
            )));
        }
        Ok(())
    }

    /// Load settings from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, RenderError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write settings as JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
