//! Common types shared by the pixel rendering engine and its collaborators.

pub mod error;
pub mod pixels;
pub mod plane;
pub mod settings;

pub use error::{ConfigError, DecodeError, QuantizationError, RenderError, RenderResult};
pub use pixels::{ChannelMetadata, ChannelStats, Endianness, PixelType, PixelsMetadata};
pub use plane::{PlaneDef, Slice};
pub use settings::{
    verify_codomain, ChannelBinding, CodomainMapDef, Family, QuantumDef, RenderingDef,
    RenderingModel, Rgba, CODOMAIN_MAX, CODOMAIN_MIN, DEPTH_8BIT,
};
