//! Error types for the pixel rendering pipeline.

use thiserror::Error;

use crate::pixels::PixelType;

/// Result type alias using RenderError.
pub type RenderResult<T> = Result<T, RenderError>;

/// Invalid configuration rejected at the boundary.
///
/// Operations returning a `ConfigError` leave the rendering state untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("pixel interval [{min}, {max}] not supported for {pixel_type}")]
    InvalidInterval {
        min: f64,
        max: f64,
        pixel_type: PixelType,
    },

    #[error("window [{start}, {end}] outside global extent [{global_min}, {global_max}]")]
    WindowOutOfRange {
        start: f64,
        end: f64,
        global_min: f64,
        global_max: f64,
    },

    #[error("codomain interval [{start}, {end}] must satisfy 0 <= start <= end <= 255")]
    InvalidCodomain { start: i32, end: i32 },

    #[error("invalid slice: {0}")]
    InvalidSlice(String),

    #[error("unsupported family type: '{0}'")]
    UnknownFamily(String),

    #[error("unknown rendering model: '{0}'")]
    UnknownModel(String),

    #[error("curve coefficient must be finite and positive, got {0}")]
    InvalidCoefficient(f64),

    #[error("channel index {index} out of range (pixel set has {size_c} channels)")]
    ChannelOutOfRange { index: usize, size_c: usize },

    #[error("plane out of bounds: {0}")]
    PlaneOutOfBounds(String),

    #[error("bit resolution must be in 1..=255, got {0}")]
    InvalidBitResolution(u32),

    #[error("codomain map '{0}' is already in the chain")]
    DuplicateCodomainMap(String),

    #[error("invalid pixels metadata: {0}")]
    InvalidMetadata(String),

    #[error("invalid rendering settings: {0}")]
    Settings(String),
}

/// Failure converting raw bytes into an intensity value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unsupported sample length: {0} bytes")]
    InvalidLength(usize),

    #[error("unsigned conversion overflowed: {value}")]
    Overflow { value: i64 },

    #[error("read of {length} bytes at offset {offset} exceeds buffer of {available} bytes")]
    OutOfBounds {
        offset: usize,
        length: usize,
        available: usize,
    },

    #[error("plane buffer holds {actual} bytes, expected {expected}")]
    Truncated { expected: usize, actual: usize },
}

/// A raw value fell outside the global extent of its channel.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuantizationError {
    #[error("the value {value} is not in the interval [{global_min}, {global_max}]")]
    OutOfRange {
        value: f64,
        global_min: f64,
        global_max: f64,
    },
}

/// Top-level error for rendering operations.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("quantization failed for channel {channel} at ({x1}, {x2}): {source}")]
    Quantization {
        channel: usize,
        x1: usize,
        x2: usize,
        #[source]
        source: QuantizationError,
    },

    #[error("pixel buffer I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("no active channel to render")]
    NoActiveChannel,

    #[error("not found: {0}")]
    NotFound(String),
}

impl RenderError {
    /// Attach the channel and plane coordinate to a quantization failure.
    pub fn quantization(channel: usize, x1: usize, x2: usize, source: QuantizationError) -> Self {
        Self::Quantization {
            channel,
            x1,
            x2,
            source,
        }
    }

    /// Create a NotFound error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Channel index of a quantization failure, if this is one.
    pub fn channel(&self) -> Option<usize> {
        match self {
            Self::Quantization { channel, .. } => Some(*channel),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(ConfigError::Settings(err.to_string()))
    }
}
