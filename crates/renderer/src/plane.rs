//! Access to the samples of one 2D plane.
//!
//! A plane is addressed in its own axis system `(x1, x2)`:
//!
//! | slice | x1 | x2 | backing buffer            |
//! |-------|----|----|---------------------------|
//! | XY    | X  | Y  | the plane only            |
//! | XZ    | X  | Z  | whole Z-stack for (c, t)  |
//! | ZY    | Z  | Y  | whole Z-stack for (c, t)  |

use bytes::Bytes;
use pixels_common::{DecodeError, PixelsMetadata, PlaneDef, Slice};

use crate::decoder::PixelDecoder;

/// Width and height of a plane in its own axis system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxesSize {
    pub size_x1: usize,
    pub size_x2: usize,
}

impl AxesSize {
    /// Resolve the plane axes for a slice orientation.
    pub fn init(plane_def: &PlaneDef, metadata: &PixelsMetadata) -> Self {
        let (size_x1, size_x2) = match plane_def.slice {
            Slice::XY => (metadata.size_x, metadata.size_y),
            Slice::XZ => (metadata.size_x, metadata.size_z),
            Slice::ZY => (metadata.size_z, metadata.size_y),
        };
        Self { size_x1, size_x2 }
    }

    pub fn pixel_count(&self) -> usize {
        self.size_x1 * self.size_x2
    }
}

/// Number of bytes the pixel buffer must hand over for a plane.
pub fn backing_size(slice: Slice, metadata: &PixelsMetadata) -> usize {
    match slice {
        Slice::XY => metadata.plane_size(),
        Slice::XZ | Slice::ZY => metadata.stack_size(),
    }
}

/// Decodes intensities of one plane from its raw backing buffer.
#[derive(Debug, Clone)]
pub struct PlaneAccessor {
    plane_def: PlaneDef,
    axes: AxesSize,
    size_x: usize,
    size_y: usize,
    bytes_per_pixel: usize,
    decoder: PixelDecoder,
    data: Bytes,
}

impl PlaneAccessor {
    /// Wrap the raw bytes of a plane (XY) or of a Z-stack (XZ, ZY).
    pub fn new(
        plane_def: PlaneDef,
        metadata: &PixelsMetadata,
        data: Bytes,
    ) -> Result<Self, DecodeError> {
        let expected = backing_size(plane_def.slice, metadata);
        if data.len() < expected {
            return Err(DecodeError::Truncated {
                expected,
                actual: data.len(),
            });
        }

        tracing::debug!(
            slice = %plane_def.slice,
            size_x = metadata.size_x,
            size_y = metadata.size_y,
            bytes_per_pixel = metadata.bytes_per_pixel(),
            "Created plane accessor"
        );

        Ok(Self {
            plane_def,
            axes: AxesSize::init(&plane_def, metadata),
            size_x: metadata.size_x,
            size_y: metadata.size_y,
            bytes_per_pixel: metadata.bytes_per_pixel(),
            decoder: PixelDecoder::new(metadata.pixel_type, metadata.endianness),
            data,
        })
    }

    pub fn axes(&self) -> AxesSize {
        self.axes
    }

    pub fn is_xy_planar(&self) -> bool {
        self.plane_def.slice == Slice::XY
    }

    /// Byte offset of `(x1, x2)` in the backing buffer.
    #[inline]
    pub fn calculate_offset(&self, x1: usize, x2: usize) -> usize {
        let index = match self.plane_def.slice {
            Slice::XY => x2 * self.size_x + x1,
            // x1 = X, x2 = Z, Y fixed
            Slice::XZ => self.size_x * self.size_y * x2 + self.size_x * self.plane_def.y + x1,
            // x1 = Z, x2 = Y, X fixed
            Slice::ZY => self.size_x * self.size_y * x1 + self.size_x * x2 + self.plane_def.x,
        };
        index * self.bytes_per_pixel
    }

    /// Intensity at plane coordinate `(x1, x2)`.
    #[inline]
    pub fn get_intensity(&self, x1: usize, x2: usize) -> Result<f64, DecodeError> {
        self.decoder.decode_at(&self.data, self.calculate_offset(x1, x2))
    }

    /// Intensity at a raw byte offset, for linear scans of the buffer.
    #[inline]
    pub fn get_intensity_at_offset(&self, offset: usize) -> Result<f64, DecodeError> {
        self.decoder.decode_at(&self.data, offset)
    }
}
