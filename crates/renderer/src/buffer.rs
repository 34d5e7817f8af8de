//! Output buffers produced by a render call.
//!
//! Buffers are allocated fresh for every call and owned by the caller.

use image::{RgbImage, RgbaImage};

/// Layout of a render output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferLayout {
    /// Three separate byte bands: red, green, blue.
    Planar,
    /// One `u32` per pixel, ARGB.
    PackedInt,
}

impl BufferLayout {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Planar => 3,
            Self::PackedInt => 4,
        }
    }
}

/// Byte-planar RGB image of `size_x1 × size_x2` pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbBuffer {
    size_x1: usize,
    size_x2: usize,
    red: Vec<u8>,
    green: Vec<u8>,
    blue: Vec<u8>,
}

impl RgbBuffer {
    /// Black image.
    pub fn new(size_x1: usize, size_x2: usize) -> Self {
        let len = size_x1 * size_x2;
        Self {
            size_x1,
            size_x2,
            red: vec![0; len],
            green: vec![0; len],
            blue: vec![0; len],
        }
    }

    pub fn size_x1(&self) -> usize {
        self.size_x1
    }

    pub fn size_x2(&self) -> usize {
        self.size_x2
    }

    pub fn red(&self) -> &[u8] {
        &self.red
    }

    pub fn green(&self) -> &[u8] {
        &self.green
    }

    pub fn blue(&self) -> &[u8] {
        &self.blue
    }

    /// Mutable red, green and blue bands.
    pub fn bands_mut(&mut self) -> (&mut [u8], &mut [u8], &mut [u8]) {
        (&mut self.red, &mut self.green, &mut self.blue)
    }

    /// RGB triple at `(x1, x2)`.
    pub fn pixel(&self, x1: usize, x2: usize) -> Option<(u8, u8, u8)> {
        if x1 >= self.size_x1 || x2 >= self.size_x2 {
            return None;
        }
        let i = x2 * self.size_x1 + x1;
        Some((self.red[i], self.green[i], self.blue[i]))
    }

    /// Interleave into an `image` RGB buffer for encoding.
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.size_x1 as u32, self.size_x2 as u32, |x, y| {
            let i = y as usize * self.size_x1 + x as usize;
            image::Rgb([self.red[i], self.green[i], self.blue[i]])
        })
    }
}

/// Packed ARGB image of `size_x1 × size_x2` pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedIntBuffer {
    size_x1: usize,
    size_x2: usize,
    data: Vec<u32>,
}

impl PackedIntBuffer {
    /// Fully transparent image.
    pub fn new(size_x1: usize, size_x2: usize) -> Self {
        Self {
            size_x1,
            size_x2,
            data: vec![0; size_x1 * size_x2],
        }
    }

    pub fn size_x1(&self) -> usize {
        self.size_x1
    }

    pub fn size_x2(&self) -> usize {
        self.size_x2
    }

    pub fn data(&self) -> &[u32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u32> {
        self.data
    }

    pub fn pixel(&self, x1: usize, x2: usize) -> Option<u32> {
        if x1 >= self.size_x1 || x2 >= self.size_x2 {
            return None;
        }
        self.data.get(x2 * self.size_x1 + x1).copied()
    }

    /// Unpack into an `image` RGBA buffer for encoding.
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.size_x1 as u32, self.size_x2 as u32, |x, y| {
            let (a, r, g, b) = unpack_argb(self.data[y as usize * self.size_x1 + x as usize]);
            image::Rgba([r, g, b, a])
        })
    }
}

/// Pack alpha, red, green and blue into one ARGB word.
#[inline(always)]
pub fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// Split an ARGB word into `(a, r, g, b)`.
#[inline(always)]
pub fn unpack_argb(packed: u32) -> (u8, u8, u8, u8) {
    (
        (packed >> 24) as u8,
        (packed >> 16) as u8,
        (packed >> 8) as u8,
        packed as u8,
    )
}
