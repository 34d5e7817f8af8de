//! Common test fixtures for pixel-render tests.
//!
//! This module provides pre-defined pixel sets that represent common
//! acquisition shapes.

use pixels_common::{ChannelMetadata, ChannelStats, Endianness, PixelType, PixelsMetadata};

/// Pixel set identifier used by every fixture.
pub const FIXTURE_PIXELS_ID: i64 = 1;

/// Common pixel-set dimensions as `(size_x, size_y, size_z, size_c, size_t)`.
pub mod dims {
    /// One 2×2 plane.
    pub const TINY: (usize, usize, usize, usize, usize) = (2, 2, 1, 1, 1);

    /// Small stack with three channels, for orthogonal slices.
    pub const SMALL_STACK: (usize, usize, usize, usize, usize) = (4, 3, 5, 3, 2);
}

/// Emission wavelengths in nanometres.
pub mod wavelengths {
    /// DAPI, rendered blue.
    pub const DAPI: f64 = 461.0;

    /// GFP, rendered green.
    pub const GFP: f64 = 509.0;

    /// mCherry, rendered red.
    pub const MCHERRY: f64 = 610.0;
}

/// Default global extent of a fixture channel.
///
/// Integer types span their whole range; floating types span `[0, 1]`.
pub fn default_stats(pixel_type: PixelType) -> ChannelStats {
    if pixel_type.is_float() {
        ChannelStats::new(0.0, 1.0)
    } else {
        let (min, max) = pixel_type.value_range();
        ChannelStats::new(min, max)
    }
}

/// Big-endian pixel set with every channel on the type's default extent.
pub fn metadata_fixture(
    size_x: usize,
    size_y: usize,
    size_z: usize,
    size_c: usize,
    pixel_type: PixelType,
) -> PixelsMetadata {
    metadata_with_stats(
        (size_x, size_y, size_z, size_c, 1),
        pixel_type,
        default_stats(pixel_type),
    )
}

/// Big-endian pixel set with the given dimensions and the same global
/// extent on every channel.
pub fn metadata_with_stats(
    dims: (usize, usize, usize, usize, usize),
    pixel_type: PixelType,
    stats: ChannelStats,
) -> PixelsMetadata {
    let (size_x, size_y, size_z, size_c, size_t) = dims;
    PixelsMetadata {
        id: FIXTURE_PIXELS_ID,
        size_x,
        size_y,
        size_z,
        size_c,
        size_t,
        pixel_type,
        endianness: Endianness::Big,
        channels: vec![ChannelMetadata::new(stats); size_c],
    }
}

/// Three channels tagged DAPI, GFP and mCherry.
pub fn fluorescence_fixture(size_x: usize, size_y: usize, pixel_type: PixelType) -> PixelsMetadata {
    let mut md = metadata_fixture(size_x, size_y, 1, 3, pixel_type);
    let tagged = [wavelengths::DAPI, wavelengths::GFP, wavelengths::MCHERRY];
    for (channel, nm) in md.channels.iter_mut().zip(tagged) {
        channel.emission_wavelength = Some(nm);
    }
    md
}
