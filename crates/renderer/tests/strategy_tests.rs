//! Tests for greyscale and composite rendering.

use std::sync::Arc;

use pixels_common::{
    ChannelStats, PixelType, PixelsMetadata, PlaneDef, RenderError, RenderingDef,
    RenderingModel, Rgba,
};
use renderer::{
    pack_argb, CompositeBlend, InMemoryPixelStore, RenderingContext, RenderingStrategy,
    RendererConfig,
};
use test_utils::{
    assert_approx_eq, assert_bands_eq, dims, encode_pixels, metadata_fixture,
    metadata_with_stats, ramp_stack, random_stack, stack_values, uniform_stack,
};

fn context(md: &PixelsMetadata, data: Vec<u8>, config: RendererConfig) -> RenderingContext {
    let store = InMemoryPixelStore::new(md.clone(), data).unwrap();
    RenderingContext::new(md.clone(), RenderingDef::new_for(md), Arc::new(store), config).unwrap()
}

// ============================================================================
// Size helper tests
// ============================================================================

#[test]
fn test_image_sizes() {
    let md = metadata_fixture(4, 3, 1, 1, PixelType::Uint8);
    let config = RendererConfig::default();
    let plane = PlaneDef::xy(0, 0);

    let greyscale = RenderingStrategy::from_model(RenderingModel::Greyscale, &config);
    assert_eq!(greyscale.image_size(&plane, &md), 36);
    assert_eq!(greyscale.packed_image_size(&plane, &md), 48);

    let composite = RenderingStrategy::from_model(RenderingModel::Hsb, &config);
    assert_eq!(composite.image_size(&plane, &md), 36);
}

#[test]
fn test_plane_dims_string() {
    let md = metadata_fixture(3, 7, 5, 1, PixelType::Uint8);
    let strategy =
        RenderingStrategy::from_model(RenderingModel::Greyscale, &RendererConfig::default());
    assert_eq!(strategy.plane_dims_string(&PlaneDef::zy(0, 0), &md), "5x7");
    assert_eq!(strategy.plane_dims_string(&PlaneDef::xz(0, 0), &md), "3x5");
    assert_eq!(strategy.plane_dims_string(&PlaneDef::xy(0, 0), &md), "3x7");
}

#[test]
fn test_small_stack_slices_match_size_helpers() {
    let md = metadata_with_stats(
        dims::SMALL_STACK,
        PixelType::Uint16,
        ChannelStats::new(0.0, 4095.0),
    );
    let ctx = context(&md, random_stack(&md, 11), RendererConfig::default());

    for (plane, expected) in [
        (PlaneDef::xy(4, 1), "4x3"),
        (PlaneDef::xz(2, 1), "4x5"),
        (PlaneDef::zy(3, 1), "5x3"),
    ] {
        let buffer = ctx.render(&plane).unwrap();
        assert_eq!(ctx.plane_dims_string(&plane), expected);
        assert_eq!(
            ctx.image_size(&plane),
            buffer.size_x1() * buffer.size_x2() * 3
        );
        let packed = ctx.render_packed(&plane).unwrap();
        assert_eq!(ctx.packed_image_size(&plane), packed.data().len() * 4);
    }
}

#[test]
fn test_rgb_model_renders_as_composite() {
    let config = RendererConfig::default();
    assert!(matches!(
        RenderingStrategy::from_model(RenderingModel::Rgb, &config),
        RenderingStrategy::Composite(_)
    ));
}

// ============================================================================
// Greyscale tests
// ============================================================================

#[test]
fn test_greyscale_window_start_renders_cd_start() {
    let md = metadata_fixture(2, 2, 1, 1, PixelType::Uint8);
    let mut ctx = context(&md, uniform_stack(&md, 30.0), RendererConfig::default());
    ctx.set_channel_window(0, 30.0, 200.0).unwrap();
    ctx.set_codomain_interval(40, 255).unwrap();
    ctx.set_rgba(0, Rgba::new(255, 255, 255, 128)).unwrap();

    let buffer = ctx.render(&PlaneDef::xy(0, 0)).unwrap();
    // 40 * 128 / 255
    let expected = [20u8; 4];
    assert_bands_eq!(buffer.red(), &expected, 2);
    assert_bands_eq!(buffer.green(), &expected, 2);
    assert_bands_eq!(buffer.blue(), &expected, 2);
}

#[test]
fn test_greyscale_packed_alpha() {
    let md = metadata_fixture(2, 2, 1, 1, PixelType::Uint8);
    let data = uniform_stack(&md, 200.0);

    let mut ctx = context(&md, data.clone(), RendererConfig::default());
    ctx.set_rgba(0, Rgba::new(255, 0, 0, 128)).unwrap();
    let packed = ctx.render_packed(&PlaneDef::xy(0, 0)).unwrap();
    assert_eq!(packed.data(), &[pack_argb(128, 100, 100, 100); 4]);

    let config = RendererConfig {
        legacy_packed_alpha: true,
        ..RendererConfig::default()
    };
    let mut ctx = context(&md, data, config);
    ctx.set_rgba(0, Rgba::new(255, 0, 0, 128)).unwrap();
    let packed = ctx.render_packed(&PlaneDef::xy(0, 0)).unwrap();
    assert_eq!(packed.data(), &[pack_argb(128, 200, 200, 200); 4]);
}

#[test]
fn test_greyscale_uses_first_active_channel() {
    let md = metadata_fixture(2, 1, 1, 3, PixelType::Uint8);
    let values = stack_values(&md, |_, _, _, c, _| (c * 100) as f64);
    let data = encode_pixels(&values, md.pixel_type, md.endianness);
    let mut ctx = context(&md, data, RendererConfig::default());
    ctx.set_model(RenderingModel::Greyscale);
    ctx.set_active(0, false).unwrap();

    let buffer = ctx.render(&PlaneDef::xy(0, 0)).unwrap();
    assert_eq!(buffer.red(), &[100, 100]);
}

#[test]
fn test_xz_plane_render() {
    let md = metadata_fixture(4, 3, 5, 1, PixelType::Uint8);
    let ctx = context(&md, ramp_stack(&md), RendererConfig::default());

    let buffer = ctx.render(&PlaneDef::xz(1, 0)).unwrap();
    assert_eq!((buffer.size_x1(), buffer.size_x2()), (4, 5));
    for z in 0..5 {
        for x in 0..4 {
            let v = (x + 4 * (1 + 3 * z)) as u8;
            assert_eq!(buffer.pixel(x, z), Some((v, v, v)), "({x}, {z})");
        }
    }
}

#[test]
fn test_no_active_channel() {
    let md = metadata_fixture(2, 2, 1, 2, PixelType::Uint8);
    let mut ctx = context(&md, uniform_stack(&md, 0.0), RendererConfig::default());
    ctx.set_active(0, false).unwrap();
    ctx.set_active(1, false).unwrap();

    assert!(matches!(
        ctx.render(&PlaneDef::xy(0, 0)),
        Err(RenderError::NoActiveChannel)
    ));
    ctx.set_model(RenderingModel::Greyscale);
    assert!(matches!(
        ctx.render_packed(&PlaneDef::xy(0, 0)),
        Err(RenderError::NoActiveChannel)
    ));
}

// ============================================================================
// Composite tests
// ============================================================================

#[test]
fn test_composite_colors_channels() {
    let md = metadata_fixture(2, 2, 1, 2, PixelType::Uint8);
    let mut ctx = context(&md, ramp_stack(&md), RendererConfig::default());
    ctx.set_rgba(0, Rgba::RED).unwrap();
    ctx.set_rgba(1, Rgba::GREEN).unwrap();

    let buffer = ctx.render(&PlaneDef::xy(0, 0)).unwrap();
    assert_eq!(buffer.red(), &[0, 1, 2, 3]);
    assert_eq!(buffer.green(), &[0, 1, 2, 3]);
    assert_eq!(buffer.blue(), &[0, 0, 0, 0]);

    let packed = ctx.render_packed(&PlaneDef::xy(0, 0)).unwrap();
    assert_eq!(packed.pixel(1, 1), Some(pack_argb(255, 3, 3, 0)));
}

#[test]
fn test_composite_blend_modes() {
    let md = metadata_fixture(1, 1, 1, 2, PixelType::Uint8);
    let data = uniform_stack(&md, 255.0);

    let mut additive = context(&md, data.clone(), RendererConfig::default());
    additive.set_rgba(0, Rgba::RED).unwrap();
    additive.set_rgba(1, Rgba::new(255, 255, 0, 255)).unwrap();
    let buffer = additive.render(&PlaneDef::xy(0, 0)).unwrap();
    assert_eq!(buffer.pixel(0, 0), Some((255, 255, 0)));

    let config = RendererConfig {
        composite_blend: CompositeBlend::Over,
        ..RendererConfig::default()
    };
    let mut over = context(&md, data, config);
    over.set_rgba(0, Rgba::RED).unwrap();
    over.set_rgba(1, Rgba::new(0, 255, 0, 255)).unwrap();
    let buffer = over.render(&PlaneDef::xy(0, 0)).unwrap();
    assert_eq!(buffer.pixel(0, 0), Some((0, 255, 0)));
}

#[test]
fn test_composite_channel_alpha() {
    let md = metadata_fixture(1, 1, 1, 1, PixelType::Uint8);
    let mut ctx = context(&md, uniform_stack(&md, 255.0), RendererConfig::default());
    ctx.set_model(RenderingModel::Hsb);
    ctx.set_rgba(0, Rgba::new(0, 0, 255, 51)).unwrap();

    let buffer = ctx.render(&PlaneDef::xy(0, 0)).unwrap();
    assert_eq!(buffer.pixel(0, 0), Some((0, 0, 51)));
}

#[test]
fn test_over_blend_partial_coverage() {
    let md = metadata_fixture(1, 1, 1, 2, PixelType::Uint8);
    let config = RendererConfig {
        composite_blend: CompositeBlend::Over,
        ..RendererConfig::default()
    };
    let mut ctx = context(&md, uniform_stack(&md, 255.0), config);
    ctx.set_rgba(0, Rgba::RED).unwrap();
    ctx.set_rgba(1, Rgba::new(0, 0, 255, 102)).unwrap();

    // blue covers 102 / 255 = 40% of the red underneath
    let buffer = ctx.render(&PlaneDef::xy(0, 0)).unwrap();
    let (red, green, blue) = buffer.pixel(0, 0).unwrap();
    assert_approx_eq!(red, 255.0 * 0.6, 1.0);
    assert_eq!(green, 0);
    assert_approx_eq!(blue, 255.0 * 0.4, 1.0);
}

// ============================================================================
// Error and parallelism tests
// ============================================================================

#[test]
fn test_quantization_error_names_channel() {
    let md = metadata_with_stats(
        (2, 2, 1, 2, 1),
        PixelType::Uint8,
        ChannelStats::new(0.0, 100.0),
    );
    let values = stack_values(&md, |_, _, _, c, _| if c == 0 { 50.0 } else { 200.0 });
    let ctx = context(
        &md,
        encode_pixels(&values, md.pixel_type, md.endianness),
        RendererConfig::default(),
    );

    let err = ctx.render(&PlaneDef::xy(0, 0)).unwrap_err();
    assert_eq!(err.channel(), Some(1));
    assert!(matches!(
        err,
        RenderError::Quantization { x1: 0, x2: 0, .. }
    ));
}

#[test]
fn test_parallel_matches_sequential() {
    let md = metadata_fixture(64, 48, 1, 2, PixelType::Uint16);
    let data = random_stack(&md, 7);

    let sequential = RendererConfig {
        parallel_threshold: 0,
        ..RendererConfig::default()
    };
    let parallel = RendererConfig {
        parallel_threshold: 1,
        ..RendererConfig::default()
    };

    let plane = PlaneDef::xy(0, 0);
    let a = context(&md, data.clone(), sequential).render(&plane).unwrap();
    let b = context(&md, data, parallel).render(&plane).unwrap();
    assert_eq!(a, b);
}
