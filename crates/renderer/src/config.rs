//! Configuration for the rendering engine.

use serde::{Deserialize, Serialize};

use crate::quantum::DEFAULT_LUT_MAX_BITS;

/// Configuration for the rendering engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Planes with at least this many pixels are quantized row-parallel.
    /// 0 disables parallel rendering.
    pub parallel_threshold: usize,

    /// Widest integer pixel type (in bits) quantized through a lookup table.
    pub lut_max_bits: u32,

    /// How the composite strategy combines channels.
    pub composite_blend: CompositeBlend,

    /// Keep the greyscale packed-int path unpremultiplied by alpha.
    pub legacy_packed_alpha: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 256 * 256,
            lut_max_bits: DEFAULT_LUT_MAX_BITS,
            composite_blend: CompositeBlend::Additive,
            legacy_packed_alpha: false,
        }
    }
}

impl RendererConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RENDER_PARALLEL_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                config.parallel_threshold = threshold;
            }
        }

        if let Ok(val) = std::env::var("RENDER_LUT_MAX_BITS") {
            if let Ok(bits) = val.parse() {
                config.lut_max_bits = bits;
            }
        }

        if let Ok(val) = std::env::var("RENDER_COMPOSITE_BLEND") {
            config.composite_blend = CompositeBlend::from_str(&val);
        }

        if let Ok(val) = std::env::var("RENDER_LEGACY_PACKED_ALPHA") {
            config.legacy_packed_alpha = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.lut_max_bits > 16 {
            return Err("lut_max_bits must be 0-16".to_string());
        }
        Ok(())
    }

    /// Whether a plane of `pixels` pixels is rendered in parallel.
    pub fn is_parallel(&self, pixels: usize) -> bool {
        self.parallel_threshold > 0 && pixels >= self.parallel_threshold
    }
}

/// Channel blending of the composite strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositeBlend {
    /// Add each channel's alpha-weighted colour, saturating at 255.
    #[default]
    Additive,
    /// Blend each channel over the accumulated image.
    Over,
}

impl CompositeBlend {
    /// Parse from string (case-insensitive), defaulting to additive.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "over" => Self::Over,
            _ => Self::Additive,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Additive => "additive",
            Self::Over => "over",
        }
    }
}

impl std::fmt::Display for CompositeBlend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RendererConfig::default();
        assert_eq!(config.parallel_threshold, 65536);
        assert_eq!(config.lut_max_bits, 16);
        assert_eq!(config.composite_blend, CompositeBlend::Additive);
        assert!(!config.legacy_packed_alpha);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = RendererConfig::default();
        config.lut_max_bits = 17;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_is_parallel() {
        let mut config = RendererConfig::default();
        assert!(!config.is_parallel(4));
        assert!(config.is_parallel(512 * 512));
        config.parallel_threshold = 0;
        assert!(!config.is_parallel(512 * 512));
    }

    #[test]
    fn test_config_from_env() {
        std::env::set_var("RENDER_PARALLEL_THRESHOLD", "1024");
        std::env::set_var("RENDER_LUT_MAX_BITS", "8");
        std::env::set_var("RENDER_COMPOSITE_BLEND", "Over");
        std::env::set_var("RENDER_LEGACY_PACKED_ALPHA", "TRUE");

        let config = RendererConfig::from_env();
        assert_eq!(config.parallel_threshold, 1024);
        assert_eq!(config.lut_max_bits, 8);
        assert_eq!(config.composite_blend, CompositeBlend::Over);
        assert!(config.legacy_packed_alpha);

        // unparseable values keep the defaults
        std::env::set_var("RENDER_PARALLEL_THRESHOLD", "many");
        std::env::set_var("RENDER_LUT_MAX_BITS", "-1");
        std::env::remove_var("RENDER_COMPOSITE_BLEND");
        std::env::set_var("RENDER_LEGACY_PACKED_ALPHA", "0");

        let config = RendererConfig::from_env();
        assert_eq!(config, RendererConfig::default());

        for var in [
            "RENDER_PARALLEL_THRESHOLD",
            "RENDER_LUT_MAX_BITS",
            "RENDER_LEGACY_PACKED_ALPHA",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_composite_blend_from_str() {
        assert_eq!(CompositeBlend::from_str("OVER"), CompositeBlend::Over);
        assert_eq!(CompositeBlend::from_str("additive"), CompositeBlend::Additive);
        assert_eq!(CompositeBlend::from_str("invalid"), CompositeBlend::Additive);
    }
}
