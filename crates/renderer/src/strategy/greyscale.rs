//! Greyscale rendering of the first active channel.

use pixels_common::{PlaneDef, RenderError, RenderResult};

use super::{log_allocation, quantize_channel};
use crate::buffer::{pack_argb, BufferLayout, PackedIntBuffer, RgbBuffer};
use crate::config::RendererConfig;
use crate::context::RenderingContext;
use crate::plane::AxesSize;

/// Renders the first active channel as grey levels weighted by the
/// channel's alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GreyscaleStrategy {
    /// Store raw values in the packed path, with alpha only in the top byte.
    legacy_packed_alpha: bool,
}

impl GreyscaleStrategy {
    pub fn new(config: &RendererConfig) -> Self {
        Self {
            legacy_packed_alpha: config.legacy_packed_alpha,
        }
    }

    /// Index and alpha of the first active channel.
    fn active_channel(ctx: &RenderingContext) -> RenderResult<(usize, u8)> {
        ctx.channel_bindings()
            .iter()
            .enumerate()
            .find(|(_, binding)| binding.active)
            .map(|(index, binding)| (index, binding.color.alpha))
            .ok_or(RenderError::NoActiveChannel)
    }

    pub fn render(&self, ctx: &RenderingContext, plane_def: &PlaneDef) -> RenderResult<RgbBuffer> {
        let (channel, alpha) = Self::active_channel(ctx)?;
        let values = quantize_channel(ctx, plane_def, channel)?;

        let axes = AxesSize::init(plane_def, ctx.metadata());
        let mut buffer = RgbBuffer::new(axes.size_x1, axes.size_x2);
        log_allocation(BufferLayout::Planar, axes);

        let (red, green, blue) = buffer.bands_mut();
        for (i, &v) in values.iter().enumerate() {
            let v = premultiply(v, alpha);
            red[i] = v;
            green[i] = v;
            blue[i] = v;
        }
        Ok(buffer)
    }

    pub fn render_packed(
        &self,
        ctx: &RenderingContext,
        plane_def: &PlaneDef,
    ) -> RenderResult<PackedIntBuffer> {
        let (channel, alpha) = Self::active_channel(ctx)?;
        let values = quantize_channel(ctx, plane_def, channel)?;

        let axes = AxesSize::init(plane_def, ctx.metadata());
        let mut buffer = PackedIntBuffer::new(axes.size_x1, axes.size_x2);
        log_allocation(BufferLayout::PackedInt, axes);

        for (slot, &v) in buffer.data_mut().iter_mut().zip(&values) {
            let v = if self.legacy_packed_alpha {
                v
            } else {
                premultiply(v, alpha)
            };
            *slot = pack_argb(alpha, v, v, v);
        }
        Ok(buffer)
    }
}

/// `value * alpha / 255`, truncated.
#[inline]
fn premultiply(value: u8, alpha: u8) -> u8 {
    (value as u32 * alpha as u32 / 255) as u8
}
