//! Conversion of raw sample bytes into intensity values.
//!
//! Integer samples are rebuilt digit by digit (each byte a base-256 digit)
//! with shifts, so the result does not depend on the host byte order.
//! Signed samples are widened by OR-ing a precomputed high-bit mask when the
//! most significant byte has its top bit set.

use pixels_common::{DecodeError, Endianness, PixelType};

/// Sign-extension masks for 1, 2 and 4 byte samples.
const SIGN_MASKS: [i64; 3] = [!0xFF, !0xFFFF, !0xFFFF_FFFF];

fn check_bounds(bytes: &[u8], offset: usize, length: usize) -> Result<(), DecodeError> {
    match offset.checked_add(length) {
        Some(end) if end <= bytes.len() => Ok(()),
        _ => Err(DecodeError::OutOfBounds {
            offset,
            length,
            available: bytes.len(),
        }),
    }
}

/// Decode an integer sample of `length` bytes (1, 2 or 4) at `offset`.
pub fn decode(
    bytes: &[u8],
    offset: usize,
    length: usize,
    endianness: Endianness,
    signed: bool,
) -> Result<f64, DecodeError> {
    let mask = match length {
        1 => SIGN_MASKS[0],
        2 => SIGN_MASKS[1],
        4 => SIGN_MASKS[2],
        other => return Err(DecodeError::InvalidLength(other)),
    };
    check_bounds(bytes, offset, length)?;
    let span = &bytes[offset..offset + length];

    let mut r: i64 = 0;
    for (k, &byte) in span.iter().enumerate() {
        let shift = match endianness {
            Endianness::Little => k * 8,
            Endianness::Big => (length - k - 1) * 8,
        };
        r |= (byte as i64) << shift;
    }

    let msb = match endianness {
        Endianness::Little => span[length - 1],
        Endianness::Big => span[0],
    };
    if signed {
        if msb & 0x80 != 0 {
            r |= mask;
        }
    } else if r < 0 {
        // Unreachable while samples are at most 4 bytes wide: 32 bits never
        // reach the sign bit of the i64 accumulator.
        return Err(DecodeError::Overflow { value: r });
    }

    Ok(r as f64)
}

/// Decode an IEEE-754 sample of `length` bytes (4 or 8) at `offset`.
pub fn decode_float(
    bytes: &[u8],
    offset: usize,
    length: usize,
    endianness: Endianness,
) -> Result<f64, DecodeError> {
    if length != 4 && length != 8 {
        return Err(DecodeError::InvalidLength(length));
    }
    check_bounds(bytes, offset, length)?;
    let span = &bytes[offset..offset + length];

    let value = if length == 4 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(span);
        match endianness {
            Endianness::Little => f32::from_le_bytes(raw) as f64,
            Endianness::Big => f32::from_be_bytes(raw) as f64,
        }
    } else {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(span);
        match endianness {
            Endianness::Little => f64::from_le_bytes(raw),
            Endianness::Big => f64::from_be_bytes(raw),
        }
    };
    Ok(value)
}

/// Decoder bound to one pixel type and byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelDecoder {
    pixel_type: PixelType,
    endianness: Endianness,
}

impl PixelDecoder {
    pub fn new(pixel_type: PixelType, endianness: Endianness) -> Self {
        Self {
            pixel_type,
            endianness,
        }
    }

    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.pixel_type.bytes_per_pixel()
    }

    /// Decode the sample starting at byte `offset`.
    #[inline]
    pub fn decode_at(&self, bytes: &[u8], offset: usize) -> Result<f64, DecodeError> {
        let length = self.bytes_per_pixel();
        if self.pixel_type.is_float() {
            decode_float(bytes, offset, length, self.endianness)
        } else {
            decode(
                bytes,
                offset,
                length,
                self.endianness,
                self.pixel_type.is_signed(),
            )
        }
    }
}
