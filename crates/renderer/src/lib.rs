//! Rendering of multi-dimensional microscopy pixel data into RGB images.
//!
//! Pipeline, per active channel:
//! - Byte decoding of typed samples (`decoder`)
//! - Plane extraction for XY, XZ and ZY slices (`plane`)
//! - Quantization into the 8-bit codomain (`quantum`)
//! - Codomain enhancements (`codomain`)
//! - Greyscale or colour compositing (`strategy`)
//!
//! [`RenderingContext`] holds the settings of one pixel set and drives a
//! render.

pub mod buffer;
pub mod codomain;
pub mod config;
pub mod context;
pub mod decoder;
pub mod plane;
pub mod providers;
pub mod quantum;
pub mod strategy;

pub use buffer::{pack_argb, unpack_argb, BufferLayout, PackedIntBuffer, RgbBuffer};
pub use codomain::{CodomainChain, CodomainMap, CodomainMapContext};
pub use config::{CompositeBlend, RendererConfig};
pub use context::RenderingContext;
pub use decoder::{decode, decode_float, PixelDecoder};
pub use plane::{AxesSize, PlaneAccessor};
pub use providers::{
    ColorAssigner, GlobalExtentStats, InMemoryPixelStore, LocationStats, PixelBuffer,
    PixelsService, StatsProvider, WavelengthColorAssigner,
};
pub use quantum::{QuantumManager, QuantumStrategy, ValueMapper};
pub use strategy::{CompositeStrategy, GreyscaleStrategy, RenderingStrategy};
