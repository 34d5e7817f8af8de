//! Channel render strategies.
//!
//! A strategy turns the active channels of a plane into an RGB image. Every
//! channel goes through the same pipeline:
//!
//! 1. read the raw plane bytes from the pixel buffer
//! 2. decode each sample through a [`PlaneAccessor`]
//! 3. quantize with the channel's [`QuantumStrategy`](crate::quantum::QuantumStrategy)
//! 4. apply the [`CodomainChain`](crate::codomain::CodomainChain)
//!
//! The strategies only differ in how the resulting codomain values are
//! written into the output buffer.

mod composite;
mod greyscale;

pub use composite::CompositeStrategy;
pub use greyscale::GreyscaleStrategy;

use std::time::Instant;

use pixels_common::{PixelsMetadata, PlaneDef, RenderError, RenderResult, RenderingModel};
use rayon::prelude::*;

use crate::buffer::{BufferLayout, PackedIntBuffer, RgbBuffer};
use crate::config::RendererConfig;
use crate::context::RenderingContext;
use crate::plane::{AxesSize, PlaneAccessor};

/// Strategy selected by the rendering model.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderingStrategy {
    Greyscale(GreyscaleStrategy),
    Composite(CompositeStrategy),
}

impl RenderingStrategy {
    /// Strategy for a rendering model. RGB renders through the composite
    /// strategy.
    pub fn from_model(model: RenderingModel, config: &RendererConfig) -> Self {
        match model {
            RenderingModel::Greyscale => Self::Greyscale(GreyscaleStrategy::new(config)),
            RenderingModel::Hsb | RenderingModel::Rgb => {
                Self::Composite(CompositeStrategy::new(config.composite_blend))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Greyscale(_) => "greyscale",
            Self::Composite(_) => "composite",
        }
    }

    /// Render a plane into a byte-planar RGB buffer.
    pub fn render(&self, ctx: &RenderingContext, plane_def: &PlaneDef) -> RenderResult<RgbBuffer> {
        match self {
            Self::Greyscale(s) => s.render(ctx, plane_def),
            Self::Composite(s) => s.render(ctx, plane_def),
        }
    }

    /// Render a plane into a packed ARGB buffer.
    pub fn render_packed(
        &self,
        ctx: &RenderingContext,
        plane_def: &PlaneDef,
    ) -> RenderResult<PackedIntBuffer> {
        match self {
            Self::Greyscale(s) => s.render_packed(ctx, plane_def),
            Self::Composite(s) => s.render_packed(ctx, plane_def),
        }
    }

    /// Size in bytes of the byte-planar output for a plane.
    pub fn image_size(&self, plane_def: &PlaneDef, metadata: &PixelsMetadata) -> usize {
        AxesSize::init(plane_def, metadata).pixel_count() * BufferLayout::Planar.bytes_per_pixel()
    }

    /// Size in bytes of the packed ARGB output for a plane.
    pub fn packed_image_size(&self, plane_def: &PlaneDef, metadata: &PixelsMetadata) -> usize {
        AxesSize::init(plane_def, metadata).pixel_count()
            * BufferLayout::PackedInt.bytes_per_pixel()
    }

    /// Plane dimensions as `"{size_x1}x{size_x2}"`.
    pub fn plane_dims_string(&self, plane_def: &PlaneDef, metadata: &PixelsMetadata) -> String {
        let axes = AxesSize::init(plane_def, metadata);
        format!("{}x{}", axes.size_x1, axes.size_x2)
    }
}

/// Codomain values of one channel for every pixel of a plane, row-major in
/// the plane's `(x1, x2)` axes.
pub(crate) fn quantize_channel(
    ctx: &RenderingContext,
    plane_def: &PlaneDef,
    channel: usize,
) -> RenderResult<Vec<u8>> {
    let metadata = ctx.metadata();
    let strategy = ctx
        .quantum_manager()
        .strategy_for(channel)
        .ok_or_else(|| RenderError::not_found(format!("quantum strategy for channel {channel}")))?;
    let codomain = ctx.codomain_chain();

    let io_start = Instant::now();
    let bytes = ctx
        .pixel_buffer()
        .read_plane_bytes(metadata.id, channel, plane_def)?;
    tracing::debug!(
        channel = channel,
        bytes = bytes.len(),
        elapsed_us = io_start.elapsed().as_micros() as u64,
        "Read plane bytes"
    );

    let plane = PlaneAccessor::new(*plane_def, metadata, bytes)?;
    let axes = plane.axes();
    let mut values = vec![0u8; axes.pixel_count()];
    if values.is_empty() {
        return Ok(values);
    }

    let render_start = Instant::now();
    let quantize_row = |(x2, row): (usize, &mut [u8])| -> RenderResult<()> {
        for (x1, slot) in row.iter_mut().enumerate() {
            let value = plane.get_intensity(x1, x2)?;
            let q = strategy
                .quantize(value)
                .map_err(|e| RenderError::quantization(channel, x1, x2, e))?;
            *slot = codomain.transform(q) as u8;
        }
        Ok(())
    };

    let parallel = ctx.config().is_parallel(values.len());
    if parallel {
        values
            .par_chunks_mut(axes.size_x1)
            .enumerate()
            .try_for_each(&quantize_row)?;
    } else {
        values
            .chunks_mut(axes.size_x1)
            .enumerate()
            .try_for_each(&quantize_row)?;
    }

    tracing::debug!(
        channel = channel,
        size_x1 = axes.size_x1,
        size_x2 = axes.size_x2,
        parallel = parallel,
        elapsed_us = render_start.elapsed().as_micros() as u64,
        "Quantized channel"
    );

    Ok(values)
}

/// Log the allocation of an output buffer.
pub(crate) fn log_allocation(layout: BufferLayout, axes: AxesSize) {
    tracing::debug!(
        layout = ?layout,
        size_x1 = axes.size_x1,
        size_x2 = axes.size_x2,
        "Allocated output buffer"
    );
}
