//! Pixel-set metadata: dimensions, numeric type and per-channel statistics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Numeric type of the raw samples in a pixel set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelType {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float,
    Double,
}

impl PixelType {
    /// Size of one sample in bytes.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float => 4,
            Self::Double => 8,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            Self::Int8 | Self::Int16 | Self::Int32 | Self::Float | Self::Double
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// Bit width of an integer type, `None` for floating types.
    pub fn integer_bits(&self) -> Option<u32> {
        if self.is_float() {
            None
        } else {
            Some(self.bytes_per_pixel() as u32 * 8)
        }
    }

    /// Smallest and largest value the type can represent.
    pub fn value_range(&self) -> (f64, f64) {
        match self {
            Self::Int8 => (i8::MIN as f64, i8::MAX as f64),
            Self::Uint8 => (0.0, u8::MAX as f64),
            Self::Int16 => (i16::MIN as f64, i16::MAX as f64),
            Self::Uint16 => (0.0, u16::MAX as f64),
            Self::Int32 => (i32::MIN as f64, i32::MAX as f64),
            Self::Uint32 => (0.0, u32::MAX as f64),
            Self::Float => (f32::MIN as f64, f32::MAX as f64),
            Self::Double => (f64::MIN, f64::MAX),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Float => "float",
            Self::Double => "double",
        }
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PixelType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "int8" => Ok(Self::Int8),
            "uint8" => Ok(Self::Uint8),
            "int16" => Ok(Self::Int16),
            "uint16" => Ok(Self::Uint16),
            "int32" => Ok(Self::Int32),
            "uint32" => Ok(Self::Uint32),
            "float" | "float32" => Ok(Self::Float),
            "double" | "float64" => Ok(Self::Double),
            other => Err(ConfigError::InvalidMetadata(format!(
                "unknown pixel type '{other}'"
            ))),
        }
    }
}

/// Byte order of the raw samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    Little,
    #[default]
    Big,
}

/// Minimum and maximum intensity across a whole channel stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub global_min: f64,
    pub global_max: f64,
}

impl ChannelStats {
    pub fn new(global_min: f64, global_max: f64) -> Self {
        Self {
            global_min,
            global_max,
        }
    }
}

/// Per-channel acquisition metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetadata {
    pub stats: ChannelStats,
    /// Emission wavelength in nanometres, used to pick a default colour.
    #[serde(default)]
    pub emission_wavelength: Option<f64>,
    #[serde(default)]
    pub name: Option<String>,
}

impl ChannelMetadata {
    pub fn new(stats: ChannelStats) -> Self {
        Self {
            stats,
            emission_wavelength: None,
            name: None,
        }
    }

    pub fn with_emission_wavelength(mut self, nm: f64) -> Self {
        self.emission_wavelength = Some(nm);
        self
    }
}

/// Dimensions, sample type and channel statistics of a 5D pixel set.
///
/// Raw samples are stored in XYZCT order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelsMetadata {
    pub id: i64,
    pub size_x: usize,
    pub size_y: usize,
    pub size_z: usize,
    pub size_c: usize,
    pub size_t: usize,
    pub pixel_type: PixelType,
    #[serde(default)]
    pub endianness: Endianness,
    pub channels: Vec<ChannelMetadata>,
}

impl PixelsMetadata {
    /// Check dimensions are non-zero and every channel has valid statistics.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dims = [
            ("size_x", self.size_x),
            ("size_y", self.size_y),
            ("size_z", self.size_z),
            ("size_c", self.size_c),
            ("size_t", self.size_t),
        ];
        if let Some((name, _)) = dims.iter().find(|(_, size)| *size == 0) {
            return Err(ConfigError::InvalidMetadata(format!("{name} must be > 0")));
        }

        if self.channels.len() != self.size_c {
            return Err(ConfigError::InvalidMetadata(format!(
                "{} channel entries for size_c {}",
                self.channels.len(),
                self.size_c
            )));
        }

        for (index, channel) in self.channels.iter().enumerate() {
            let ChannelStats {
                global_min,
                global_max,
            } = channel.stats;
            if !(global_min <= global_max) {
                return Err(ConfigError::InvalidMetadata(format!(
                    "channel {index} has global extent [{global_min}, {global_max}]"
                )));
            }
        }

        Ok(())
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.pixel_type.bytes_per_pixel()
    }

    /// Number of bytes in one XY plane.
    pub fn plane_size(&self) -> usize {
        self.size_x * self.size_y * self.bytes_per_pixel()
    }

    /// Number of bytes in one Z-stack (all planes of a channel at one timepoint).
    pub fn stack_size(&self) -> usize {
        self.plane_size() * self.size_z
    }

    /// Number of bytes in the whole pixel set.
    pub fn total_size(&self) -> usize {
        self.stack_size() * self.size_c * self.size_t
    }

    pub fn channel_stats(&self, channel: usize) -> Option<ChannelStats> {
        self.channels.get(channel).map(|c| c.stats)
    }
}
