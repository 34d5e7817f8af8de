//! Collaborators of the rendering engine.
//!
//! The engine does not own pixel storage, settings persistence, statistics
//! or colour defaults. It consumes them through the traits below;
//! [`InMemoryPixelStore`] implements the storage side for tests and tools
//! that already hold a whole pixel set in memory.

use std::collections::HashMap;
use std::io;
use std::sync::RwLock;

use bytes::Bytes;
use pixels_common::{
    ChannelMetadata, ConfigError, PixelsMetadata, PlaneDef, RenderError, RenderResult,
    RenderingDef, Rgba, Slice,
};

/// Source of pixel metadata and persisted rendering settings.
pub trait PixelsService: Send + Sync {
    /// Metadata of a pixel set.
    fn get_pixels_metadata(&self, pixels_id: i64) -> RenderResult<PixelsMetadata>;

    /// Saved rendering settings, `None` when the pixel set has none yet.
    fn load_rendering_settings(&self, pixels_id: i64) -> RenderResult<Option<RenderingDef>>;

    /// Persist rendering settings, replacing any previous ones.
    fn save_rendering_settings(&self, def: &RenderingDef) -> RenderResult<()>;
}

/// Random-access reader of raw pixel bytes.
pub trait PixelBuffer: Send + Sync {
    /// Raw bytes backing a plane of one channel.
    ///
    /// XY planes return the plane itself; XZ and ZY planes return the whole
    /// Z-stack of the channel at the plane's timepoint.
    fn read_plane_bytes(&self, pixels_id: i64, channel: usize, plane: &PlaneDef)
        -> io::Result<Bytes>;
}

/// Default colour of a channel.
pub trait ColorAssigner {
    fn default_color(&self, channel_index: usize, channel: &ChannelMetadata) -> Rgba;
}

/// Statistics used to seed a channel's window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationStats {
    pub input_start: f64,
    pub input_end: f64,
    pub noise_reduction: bool,
}

/// Source of default window statistics.
pub trait StatsProvider {
    fn location_stats(&self, channel_index: usize, channel: &ChannelMetadata) -> LocationStats;
}

/// Colours channels by emission wavelength.
///
/// Below 500nm is blue, below 560nm green, anything longer red. Channels
/// without a wavelength get red, green and blue in order, then white.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavelengthColorAssigner;

impl ColorAssigner for WavelengthColorAssigner {
    fn default_color(&self, channel_index: usize, channel: &ChannelMetadata) -> Rgba {
        match channel.emission_wavelength {
            Some(nm) if nm < 500.0 => Rgba::BLUE,
            Some(nm) if nm < 560.0 => Rgba::GREEN,
            Some(_) => Rgba::RED,
            None => match channel_index {
                0 => Rgba::RED,
                1 => Rgba::GREEN,
                2 => Rgba::BLUE,
                _ => Rgba::WHITE,
            },
        }
    }
}

/// Windows every channel on its global extent, without noise reduction.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalExtentStats;

impl StatsProvider for GlobalExtentStats {
    fn location_stats(&self, _channel_index: usize, channel: &ChannelMetadata) -> LocationStats {
        LocationStats {
            input_start: channel.stats.global_min,
            input_end: channel.stats.global_max,
            noise_reduction: false,
        }
    }
}

/// One pixel set held in memory, with its settings.
///
/// Samples are stored in XYZCT order, in the metadata's byte order.
#[derive(Debug)]
pub struct InMemoryPixelStore {
    metadata: PixelsMetadata,
    data: Bytes,
    settings: RwLock<HashMap<i64, RenderingDef>>,
}

impl InMemoryPixelStore {
    /// Wrap a raw pixel set. The buffer must hold every plane.
    pub fn new(metadata: PixelsMetadata, data: impl Into<Bytes>) -> RenderResult<Self> {
        metadata.validate()?;
        let data = data.into();
        if data.len() != metadata.total_size() {
            return Err(ConfigError::InvalidMetadata(format!(
                "pixel buffer holds {} bytes, expected {}",
                data.len(),
                metadata.total_size()
            ))
            .into());
        }
        Ok(Self {
            metadata,
            data,
            settings: RwLock::new(HashMap::new()),
        })
    }

    pub fn metadata(&self) -> &PixelsMetadata {
        &self.metadata
    }

    fn check_id(&self, pixels_id: i64) -> RenderResult<()> {
        if pixels_id != self.metadata.id {
            return Err(RenderError::not_found(format!("pixels {pixels_id}")));
        }
        Ok(())
    }

    /// Byte range of one Z-stack, or of one plane within it.
    fn range(&self, channel: usize, plane: &PlaneDef) -> std::ops::Range<usize> {
        let md = &self.metadata;
        let stack = (plane.t * md.size_c + channel) * md.stack_size();
        match plane.slice {
            Slice::XY => {
                let start = stack + plane.z * md.plane_size();
                start..start + md.plane_size()
            }
            Slice::XZ | Slice::ZY => stack..stack + md.stack_size(),
        }
    }
}

impl PixelsService for InMemoryPixelStore {
    fn get_pixels_metadata(&self, pixels_id: i64) -> RenderResult<PixelsMetadata> {
        self.check_id(pixels_id)?;
        Ok(self.metadata.clone())
    }

    fn load_rendering_settings(&self, pixels_id: i64) -> RenderResult<Option<RenderingDef>> {
        self.check_id(pixels_id)?;
        let settings = self
            .settings
            .read()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        Ok(settings.get(&pixels_id).cloned())
    }

    fn save_rendering_settings(&self, def: &RenderingDef) -> RenderResult<()> {
        self.check_id(def.pixels_id)?;
        def.validate(&self.metadata)?;
        let mut settings = self
            .settings
            .write()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        settings.insert(def.pixels_id, def.clone());
        Ok(())
    }
}

impl PixelBuffer for InMemoryPixelStore {
    fn read_plane_bytes(
        &self,
        pixels_id: i64,
        channel: usize,
        plane: &PlaneDef,
    ) -> io::Result<Bytes> {
        if pixels_id != self.metadata.id {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("pixels {pixels_id}"),
            ));
        }
        if channel >= self.metadata.size_c {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("channel {channel} with size_c {}", self.metadata.size_c),
            ));
        }
        plane
            .validate(&self.metadata)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        Ok(self.data.slice(self.range(channel, plane)))
    }
}
