//! Test data generators for synthetic pixel stacks.
//!
//! Stacks are laid out in XYZCT order, in the byte order of the metadata,
//! exactly as a pixel store hands them over.

use num_traits::ToBytes;
use pixels_common::{Endianness, PixelType, PixelsMetadata};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Encodes typed samples as raw bytes in the given byte order.
///
/// # Example
///
/// ```
/// use pixels_common::Endianness;
/// use test_utils::encode_samples;
///
/// assert_eq!(encode_samples(&[1u16, 2], Endianness::Big), vec![0, 1, 0, 2]);
/// assert_eq!(encode_samples(&[-1i16], Endianness::Little), vec![0xFF, 0xFF]);
/// ```
pub fn encode_samples<T: ToBytes>(values: &[T], endianness: Endianness) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * std::mem::size_of::<T>());
    for value in values {
        match endianness {
            Endianness::Big => bytes.extend_from_slice(value.to_be_bytes().as_ref()),
            Endianness::Little => bytes.extend_from_slice(value.to_le_bytes().as_ref()),
        }
    }
    bytes
}

/// Encodes values as samples of `pixel_type`.
///
/// Integer types truncate toward zero and saturate at the type's range.
pub fn encode_pixels(values: &[f64], pixel_type: PixelType, endianness: Endianness) -> Vec<u8> {
    macro_rules! encode_as {
        ($t:ty) => {{
            let typed: Vec<$t> = values.iter().map(|&v| v as $t).collect();
            encode_samples(&typed, endianness)
        }};
    }

    match pixel_type {
        PixelType::Int8 => encode_as!(i8),
        PixelType::Uint8 => encode_as!(u8),
        PixelType::Int16 => encode_as!(i16),
        PixelType::Uint16 => encode_as!(u16),
        PixelType::Int32 => encode_as!(i32),
        PixelType::Uint32 => encode_as!(u32),
        PixelType::Float => encode_as!(f32),
        PixelType::Double => encode_as!(f64),
    }
}

/// Sample values of a whole pixel set, in XYZCT order.
///
/// `value` receives `(x, y, z, c, t)`.
pub fn stack_values<F>(metadata: &PixelsMetadata, mut value: F) -> Vec<f64>
where
    F: FnMut(usize, usize, usize, usize, usize) -> f64,
{
    let md = metadata;
    let mut values =
        Vec::with_capacity(md.size_x * md.size_y * md.size_z * md.size_c * md.size_t);
    for t in 0..md.size_t {
        for c in 0..md.size_c {
            for z in 0..md.size_z {
                for y in 0..md.size_y {
                    for x in 0..md.size_x {
                        values.push(value(x, y, z, c, t));
                    }
                }
            }
        }
    }
    values
}

/// Raw pixel set whose samples equal their index within the Z-stack,
/// `x + size_x * (y + size_y * z)`, clamped to each channel's global extent.
///
/// Every sample is distinct (within the extent), which makes offset errors
/// show up as wrong values.
pub fn ramp_stack(metadata: &PixelsMetadata) -> Vec<u8> {
    let values = stack_values(metadata, |x, y, z, c, _| {
        let index = (x + metadata.size_x * (y + metadata.size_y * z)) as f64;
        let stats = metadata.channels[c].stats;
        (stats.global_min + index).min(stats.global_max)
    });
    encode_pixels(&values, metadata.pixel_type, metadata.endianness)
}

/// Raw pixel set with every sample set to `value`.
pub fn uniform_stack(metadata: &PixelsMetadata, value: f64) -> Vec<u8> {
    let values = stack_values(metadata, |_, _, _, _, _| value);
    encode_pixels(&values, metadata.pixel_type, metadata.endianness)
}

/// Raw pixel set with samples drawn uniformly from each channel's global
/// extent. The same seed always yields the same stack.
pub fn random_stack(metadata: &PixelsMetadata, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let is_float = metadata.pixel_type.is_float();
    let values = stack_values(metadata, |_, _, _, c, _| {
        let stats = metadata.channels[c].stats;
        if stats.global_min == stats.global_max {
            return stats.global_min;
        }
        let v = rng.gen_range(stats.global_min..=stats.global_max);
        if is_float {
            v
        } else {
            v.round()
        }
    });
    encode_pixels(&values, metadata.pixel_type, metadata.endianness)
}
