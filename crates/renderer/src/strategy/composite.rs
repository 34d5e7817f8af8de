//! Multi-channel colour compositing.

use pixels_common::{PlaneDef, RenderError, RenderResult, Rgba};

use super::{log_allocation, quantize_channel};
use crate::buffer::{pack_argb, BufferLayout, PackedIntBuffer, RgbBuffer};
use crate::config::CompositeBlend;
use crate::context::RenderingContext;
use crate::plane::AxesSize;

/// `255 * 255`: scales `color * alpha * value` back to a colour component.
const FULL_WEIGHT: f32 = 65025.0;

/// Renders every active channel in its colour and blends them together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompositeStrategy {
    blend: CompositeBlend,
}

impl CompositeStrategy {
    pub fn new(blend: CompositeBlend) -> Self {
        Self { blend }
    }

    pub fn blend(&self) -> CompositeBlend {
        self.blend
    }

    /// Accumulated red, green and blue of every active channel.
    fn composite(
        &self,
        ctx: &RenderingContext,
        plane_def: &PlaneDef,
    ) -> RenderResult<[Vec<f32>; 3]> {
        let active: Vec<(usize, Rgba)> = ctx
            .channel_bindings()
            .iter()
            .enumerate()
            .filter(|(_, binding)| binding.active)
            .map(|(index, binding)| (index, binding.color))
            .collect();
        if active.is_empty() {
            return Err(RenderError::NoActiveChannel);
        }

        let pixels = AxesSize::init(plane_def, ctx.metadata()).pixel_count();
        let mut bands = [vec![0f32; pixels], vec![0f32; pixels], vec![0f32; pixels]];

        for (channel, color) in active {
            let values = quantize_channel(ctx, plane_def, channel)?;
            let components = [color.red, color.green, color.blue];
            let alpha = color.alpha as f32;

            for (band, component) in bands.iter_mut().zip(components) {
                let component = component as f32;
                for (acc, &v) in band.iter_mut().zip(&values) {
                    let weight = alpha * v as f32;
                    *acc = match self.blend {
                        CompositeBlend::Additive => {
                            (*acc + component * weight / FULL_WEIGHT).min(255.0)
                        }
                        CompositeBlend::Over => {
                            let coverage = weight / FULL_WEIGHT;
                            *acc + (component - *acc) * coverage
                        }
                    };
                }
            }
        }

        Ok(bands)
    }

    pub fn render(&self, ctx: &RenderingContext, plane_def: &PlaneDef) -> RenderResult<RgbBuffer> {
        let bands = self.composite(ctx, plane_def)?;

        let axes = AxesSize::init(plane_def, ctx.metadata());
        let mut buffer = RgbBuffer::new(axes.size_x1, axes.size_x2);
        log_allocation(BufferLayout::Planar, axes);

        let (red, green, blue) = buffer.bands_mut();
        for (out, band) in [red, green, blue].into_iter().zip(&bands) {
            for (slot, &acc) in out.iter_mut().zip(band) {
                *slot = to_component(acc);
            }
        }
        Ok(buffer)
    }

    pub fn render_packed(
        &self,
        ctx: &RenderingContext,
        plane_def: &PlaneDef,
    ) -> RenderResult<PackedIntBuffer> {
        let [red, green, blue] = self.composite(ctx, plane_def)?;

        let axes = AxesSize::init(plane_def, ctx.metadata());
        let mut buffer = PackedIntBuffer::new(axes.size_x1, axes.size_x2);
        log_allocation(BufferLayout::PackedInt, axes);

        for (i, slot) in buffer.data_mut().iter_mut().enumerate() {
            *slot = pack_argb(
                255,
                to_component(red[i]),
                to_component(green[i]),
                to_component(blue[i]),
            );
        }
        Ok(buffer)
    }
}

#[inline]
fn to_component(acc: f32) -> u8 {
    acc.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_component_saturates() {
        assert_eq!(to_component(-1.0), 0);
        assert_eq!(to_component(127.9), 127);
        assert_eq!(to_component(300.0), 255);
    }

    #[test]
    fn test_default_blend_is_additive() {
        assert_eq!(CompositeStrategy::default().blend(), CompositeBlend::Additive);
    }
}
