//! Benchmarks for the renderer crate - quantization and plane rendering.
//!
//! Run with: cargo bench --package renderer -- greyscale
//! Or: cargo bench --package renderer --bench render_benchmarks

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pixels_common::{
    ChannelBinding, ChannelStats, Family, PixelType, PlaneDef, QuantumDef, RenderingDef,
    RenderingModel, Rgba,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use renderer::{InMemoryPixelStore, QuantumStrategy, RenderingContext, RendererConfig};
use test_utils::{metadata_fixture, random_stack};

/// Context over a random stack of `size × size` planes.
fn create_context(
    size: usize,
    size_c: usize,
    pixel_type: PixelType,
    config: RendererConfig,
) -> RenderingContext {
    let md = metadata_fixture(size, size, 1, size_c, pixel_type);
    let data = random_stack(&md, 42);
    let store = InMemoryPixelStore::new(md.clone(), data).expect("valid stack");
    let def = RenderingDef::new_for(&md);
    RenderingContext::new(md, def, Arc::new(store), config).expect("valid context")
}

fn sequential() -> RendererConfig {
    RendererConfig {
        parallel_threshold: 0,
        ..RendererConfig::default()
    }
}

// =============================================================================
// Quantization Benchmarks
// =============================================================================

fn bench_quantize(c: &mut Criterion) {
    let mut group = c.benchmark_group("quantize");

    let mut rng = StdRng::seed_from_u64(7);
    let values: Vec<f64> = (0..65_536).map(|_| rng.gen_range(0..4096) as f64).collect();
    group.throughput(Throughput::Elements(values.len() as u64));

    for (name, lut_max_bits) in [("lookup_table", 16), ("direct", 0)] {
        for family in [Family::Linear, Family::Logarithmic] {
            let binding = ChannelBinding {
                family,
                coefficient: 2.0,
                ..ChannelBinding::new(Rgba::WHITE, 200.0, 3800.0)
            };
            let strategy = QuantumStrategy::build(
                QuantumDef::default(),
                PixelType::Uint16,
                ChannelStats::new(0.0, 4095.0),
                &binding,
                None,
                lut_max_bits,
            )
            .expect("valid strategy");

            group.bench_with_input(
                BenchmarkId::new(name, family),
                &values,
                |b, values| {
                    b.iter(|| {
                        let mut sum = 0i64;
                        for &v in values {
                            sum += strategy.quantize(black_box(v)).unwrap_or(0) as i64;
                        }
                        black_box(sum)
                    });
                },
            );
        }
    }

    group.finish();
}

// =============================================================================
// Greyscale Rendering Benchmarks
// =============================================================================

fn bench_greyscale(c: &mut Criterion) {
    let mut group = c.benchmark_group("greyscale");

    for size in [256, 512, 1024] {
        group.throughput(Throughput::Elements((size * size) as u64));

        let ctx = create_context(size, 1, PixelType::Uint16, RendererConfig::default());
        let plane = PlaneDef::xy(0, 0);
        group.bench_with_input(BenchmarkId::new("parallel", size), &plane, |b, plane| {
            b.iter(|| black_box(ctx.render(plane).expect("render")));
        });

        let ctx = create_context(size, 1, PixelType::Uint16, sequential());
        group.bench_with_input(BenchmarkId::new("sequential", size), &plane, |b, plane| {
            b.iter(|| black_box(ctx.render(plane).expect("render")));
        });

        group.bench_with_input(BenchmarkId::new("packed", size), &plane, |b, plane| {
            b.iter(|| black_box(ctx.render_packed(plane).expect("render")));
        });
    }

    group.finish();
}

fn bench_pixel_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("pixel_type");
    let size = 512;
    group.throughput(Throughput::Elements((size * size) as u64));

    for pixel_type in [
        PixelType::Uint8,
        PixelType::Int16,
        PixelType::Uint32,
        PixelType::Float,
        PixelType::Double,
    ] {
        let ctx = create_context(size, 1, pixel_type, RendererConfig::default());
        let plane = PlaneDef::xy(0, 0);
        group.bench_with_input(BenchmarkId::from_parameter(pixel_type), &plane, |b, plane| {
            b.iter(|| black_box(ctx.render(plane).expect("render")));
        });
    }

    group.finish();
}

// =============================================================================
// Composite Rendering Benchmarks
// =============================================================================

fn bench_composite(c: &mut Criterion) {
    let mut group = c.benchmark_group("composite");
    let size = 512;
    group.throughput(Throughput::Elements((size * size) as u64));

    for size_c in [1, 3] {
        let mut ctx = create_context(size, size_c, PixelType::Uint16, RendererConfig::default());
        ctx.set_model(RenderingModel::Hsb);
        let plane = PlaneDef::xy(0, 0);
        group.bench_with_input(BenchmarkId::new("channels", size_c), &plane, |b, plane| {
            b.iter(|| black_box(ctx.render(plane).expect("render")));
        });
    }

    group.finish();
}

// =============================================================================
// Orthogonal Slice Benchmarks
// =============================================================================

fn bench_orthogonal_slices(c: &mut Criterion) {
    let mut group = c.benchmark_group("slice");

    let md = metadata_fixture(256, 256, 64, 1, PixelType::Uint16);
    let data = random_stack(&md, 3);
    let store = InMemoryPixelStore::new(md.clone(), data).expect("valid stack");
    let ctx = RenderingContext::new(
        md.clone(),
        RenderingDef::new_for(&md),
        Arc::new(store),
        RendererConfig::default(),
    )
    .expect("valid context");

    for plane in [PlaneDef::xy(32, 0), PlaneDef::xz(128, 0), PlaneDef::zy(128, 0)] {
        group.bench_with_input(
            BenchmarkId::from_parameter(plane.slice),
            &plane,
            |b, plane| {
                b.iter(|| black_box(ctx.render(plane).expect("render")));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_quantize,
    bench_greyscale,
    bench_pixel_types,
    bench_composite,
    bench_orthogonal_slices,
);
criterion_main!(benches);
