//! Rendering context: the caller-owned state of one pixel set.
//!
//! A [`RenderingContext`] ties the persisted [`RenderingDef`] to the live
//! objects derived from it: one quantum strategy per channel, the codomain
//! chain and the render strategy picked by the model. Every mutation keeps
//! both sides in sync and leaves the context untouched when it fails.
//!
//! A context is not shared between threads while it is mutated; callers
//! rendering the same pixel set concurrently use one context each.

use std::sync::Arc;
use std::time::Instant;

use pixels_common::{
    ChannelBinding, CodomainMapDef, ConfigError, Family, PixelsMetadata, PlaneDef, QuantumDef,
    RenderResult, RenderingDef, RenderingModel, Rgba,
};

use crate::buffer::{PackedIntBuffer, RgbBuffer};
use crate::codomain::CodomainChain;
use crate::config::RendererConfig;
use crate::providers::{ColorAssigner, PixelBuffer, PixelsService, StatsProvider};
use crate::quantum::QuantumManager;
use crate::strategy::RenderingStrategy;

/// Rendering settings and derived state of one pixel set.
pub struct RenderingContext {
    metadata: PixelsMetadata,
    def: RenderingDef,
    quantum_manager: QuantumManager,
    codomain: CodomainChain,
    strategy: RenderingStrategy,
    buffer: Arc<dyn PixelBuffer>,
    config: RendererConfig,
}

impl std::fmt::Debug for RenderingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderingContext")
            .field("pixels_id", &self.metadata.id)
            .field("model", &self.def.model)
            .field("strategy", &self.strategy)
            .field("channels", &self.def.channels.len())
            .finish()
    }
}

impl RenderingContext {
    /// Build a context from existing settings.
    pub fn new(
        metadata: PixelsMetadata,
        def: RenderingDef,
        buffer: Arc<dyn PixelBuffer>,
        config: RendererConfig,
    ) -> RenderResult<Self> {
        config.validate().map_err(ConfigError::Settings)?;
        metadata.validate()?;
        def.validate(&metadata)?;

        let qd = def.quantization;
        let codomain = CodomainChain::with_maps(qd.cd_start, qd.cd_end, &def.codomain_maps)?;
        let mut quantum_manager = QuantumManager::new();
        quantum_manager.init_strategies(&qd, &metadata, &def.channels, config.lut_max_bits)?;
        let strategy = RenderingStrategy::from_model(def.model, &config);

        tracing::debug!(
            pixels_id = metadata.id,
            model = %def.model,
            strategy = strategy.name(),
            channels = def.channels.len(),
            "Created rendering context"
        );

        Ok(Self {
            metadata,
            def,
            quantum_manager,
            codomain,
            strategy,
            buffer,
            config,
        })
    }

    /// Build a context from saved settings, or from defaults when the pixel
    /// set has none. Defaults are saved through `service`.
    pub fn load(
        service: &dyn PixelsService,
        buffer: Arc<dyn PixelBuffer>,
        pixels_id: i64,
        colors: &dyn ColorAssigner,
        stats: &dyn StatsProvider,
        config: RendererConfig,
    ) -> RenderResult<Self> {
        let metadata = service.get_pixels_metadata(pixels_id)?;
        match service.load_rendering_settings(pixels_id)? {
            Some(def) => Self::new(metadata, def, buffer, config),
            None => {
                let def = RenderingDef::new_for(&metadata);
                let mut ctx = Self::new(metadata, def, buffer, config)?;
                ctx.reset_defaults_and_save(colors, stats, service)?;
                Ok(ctx)
            }
        }
    }

    /// Persist the current settings.
    pub fn save(&self, service: &dyn PixelsService) -> RenderResult<()> {
        service.save_rendering_settings(&self.def)?;
        tracing::info!(pixels_id = self.def.pixels_id, "Saved rendering settings");
        Ok(())
    }

    pub fn metadata(&self) -> &PixelsMetadata {
        &self.metadata
    }

    pub fn rendering_def(&self) -> &RenderingDef {
        &self.def
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn quantum_manager(&self) -> &QuantumManager {
        &self.quantum_manager
    }

    pub fn codomain_chain(&self) -> &CodomainChain {
        &self.codomain
    }

    pub fn pixel_buffer(&self) -> &dyn PixelBuffer {
        self.buffer.as_ref()
    }

    pub fn strategy(&self) -> &RenderingStrategy {
        &self.strategy
    }

    pub fn channel_bindings(&self) -> &[ChannelBinding] {
        &self.def.channels
    }

    pub fn quantum_def(&self) -> &QuantumDef {
        &self.def.quantization
    }

    // ========================================================================
    // Model and default plane
    // ========================================================================

    /// Switch the rendering model. Channel bindings are not touched.
    pub fn set_model(&mut self, model: RenderingModel) {
        self.def.model = model;
        self.strategy = RenderingStrategy::from_model(model, &self.config);
        tracing::debug!(model = %model, strategy = self.strategy.name(), "Set rendering model");
    }

    /// Switch the rendering model by tag, unknown tags selecting greyscale.
    pub fn set_model_tag(&mut self, tag: &str) {
        self.set_model(RenderingModel::from_tag(tag));
    }

    pub fn model(&self) -> RenderingModel {
        self.def.model
    }

    pub fn set_default_z(&mut self, z: usize) -> RenderResult<()> {
        if z >= self.metadata.size_z {
            return Err(ConfigError::PlaneOutOfBounds(format!(
                "default z={z} with size_z={}",
                self.metadata.size_z
            ))
            .into());
        }
        self.def.default_z = z;
        Ok(())
    }

    pub fn set_default_t(&mut self, t: usize) -> RenderResult<()> {
        if t >= self.metadata.size_t {
            return Err(ConfigError::PlaneOutOfBounds(format!(
                "default t={t} with size_t={}",
                self.metadata.size_t
            ))
            .into());
        }
        self.def.default_t = t;
        Ok(())
    }

    pub fn default_z(&self) -> usize {
        self.def.default_z
    }

    pub fn default_t(&self) -> usize {
        self.def.default_t
    }

    /// XY plane at the default Z and T.
    pub fn default_plane(&self) -> PlaneDef {
        PlaneDef::xy(self.def.default_z, self.def.default_t)
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Render a plane into a byte-planar RGB buffer.
    pub fn render(&self, plane_def: &PlaneDef) -> RenderResult<RgbBuffer> {
        plane_def.validate(&self.metadata)?;
        let start = Instant::now();
        let buffer = self.strategy.render(self, plane_def)?;
        tracing::debug!(
            pixels_id = self.metadata.id,
            slice = %plane_def.slice,
            strategy = self.strategy.name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Rendered plane"
        );
        Ok(buffer)
    }

    /// Render a plane into a packed ARGB buffer.
    pub fn render_packed(&self, plane_def: &PlaneDef) -> RenderResult<PackedIntBuffer> {
        plane_def.validate(&self.metadata)?;
        let start = Instant::now();
        let buffer = self.strategy.render_packed(self, plane_def)?;
        tracing::debug!(
            pixels_id = self.metadata.id,
            slice = %plane_def.slice,
            strategy = self.strategy.name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Rendered packed plane"
        );
        Ok(buffer)
    }

    pub fn image_size(&self, plane_def: &PlaneDef) -> usize {
        self.strategy.image_size(plane_def, &self.metadata)
    }

    pub fn packed_image_size(&self, plane_def: &PlaneDef) -> usize {
        self.strategy.packed_image_size(plane_def, &self.metadata)
    }

    pub fn plane_dims_string(&self, plane_def: &PlaneDef) -> String {
        self.strategy.plane_dims_string(plane_def, &self.metadata)
    }

    // ========================================================================
    // Quantization
    // ========================================================================

    /// Rebuild every channel's strategy, keeping the current windows.
    pub fn update_quantum_manager(&mut self) -> RenderResult<()> {
        self.quantum_manager.init_strategies(
            &self.def.quantization,
            &self.metadata,
            &self.def.channels,
            self.config.lut_max_bits,
        )?;
        Ok(())
    }

    /// Move the codomain to `[start, end]`, for quantization and for every
    /// codomain map.
    pub fn set_codomain_interval(&mut self, start: i32, end: i32) -> RenderResult<()> {
        let qd = QuantumDef::new(start, end, self.def.quantization.bit_resolution)?;
        self.quantum_manager.init_strategies(
            &qd,
            &self.metadata,
            &self.def.channels,
            self.config.lut_max_bits,
        )?;
        self.codomain.set_interval(start, end)?;
        self.def.quantization = qd;
        self.def.codomain_maps = self.codomain.to_defs();
        Ok(())
    }

    /// Set the number of output levels and rebuild the strategies.
    pub fn set_quantum_strategy(&mut self, bit_resolution: u32) -> RenderResult<()> {
        let qd = QuantumDef::new(
            self.def.quantization.cd_start,
            self.def.quantization.cd_end,
            bit_resolution,
        )?;
        self.quantum_manager.init_strategies(
            &qd,
            &self.metadata,
            &self.def.channels,
            self.config.lut_max_bits,
        )?;
        self.def.quantization = qd;
        Ok(())
    }

    fn check_channel(&self, channel: usize) -> Result<(), ConfigError> {
        if channel >= self.def.channels.len() {
            return Err(ConfigError::ChannelOutOfRange {
                index: channel,
                size_c: self.metadata.size_c,
            });
        }
        Ok(())
    }

    /// Set the input window of a channel.
    pub fn set_channel_window(&mut self, channel: usize, start: f64, end: f64) -> RenderResult<()> {
        self.check_channel(channel)?;
        let strategy = self
            .quantum_manager
            .strategy_for_mut(channel)
            .ok_or(ConfigError::ChannelOutOfRange {
                index: channel,
                size_c: self.metadata.size_c,
            })?;
        strategy.set_window(start, end)?;

        let binding = &mut self.def.channels[channel];
        binding.input_start = start;
        binding.input_end = end;
        Ok(())
    }

    /// Set the mapping curve of a channel.
    pub fn set_quantization_map(
        &mut self,
        channel: usize,
        family: Family,
        coefficient: f64,
        noise_reduction: bool,
    ) -> RenderResult<()> {
        self.check_channel(channel)?;
        let strategy = self
            .quantum_manager
            .strategy_for_mut(channel)
            .ok_or(ConfigError::ChannelOutOfRange {
                index: channel,
                size_c: self.metadata.size_c,
            })?;
        strategy.set_quantization_map(family, coefficient, noise_reduction)?;

        let binding = &mut self.def.channels[channel];
        binding.family = family;
        binding.coefficient = coefficient;
        binding.noise_reduction = noise_reduction;
        Ok(())
    }

    pub fn set_rgba(&mut self, channel: usize, color: Rgba) -> RenderResult<()> {
        self.check_channel(channel)?;
        self.def.channels[channel].color = color;
        Ok(())
    }

    pub fn set_active(&mut self, channel: usize, active: bool) -> RenderResult<()> {
        self.check_channel(channel)?;
        self.def.channels[channel].active = active;
        Ok(())
    }

    // ========================================================================
    // Codomain maps
    // ========================================================================

    pub fn add_codomain_map(&mut self, def: &CodomainMapDef) -> RenderResult<()> {
        self.codomain.add(def)?;
        self.def.codomain_maps = self.codomain.to_defs();
        Ok(())
    }

    pub fn update_codomain_map(&mut self, def: &CodomainMapDef) -> RenderResult<()> {
        self.codomain.update(def)?;
        self.def.codomain_maps = self.codomain.to_defs();
        Ok(())
    }

    /// Remove the codomain map of a kind. Returns whether one was removed.
    pub fn remove_codomain_map(&mut self, kind: &str) -> bool {
        let removed = self.codomain.remove_map(kind);
        self.def.codomain_maps = self.codomain.to_defs();
        removed
    }

    /// Remove every codomain map.
    pub fn remove_codomain_maps(&mut self) {
        self.codomain.remove();
        self.def.codomain_maps.clear();
    }

    // ========================================================================
    // Defaults
    // ========================================================================

    /// Replace the settings with defaults derived from the metadata.
    ///
    /// Colours come from `colors`, windows and noise reduction from `stats`.
    /// Strategies are rebuilt from scratch, so previous windows are dropped.
    /// The new settings are not persisted; see
    /// [`reset_defaults_and_save`](Self::reset_defaults_and_save).
    pub fn reset_defaults(
        &mut self,
        colors: &dyn ColorAssigner,
        stats: &dyn StatsProvider,
    ) -> RenderResult<()> {
        let mut def = RenderingDef::new_for(&self.metadata);
        for (index, (binding, channel)) in def
            .channels
            .iter_mut()
            .zip(&self.metadata.channels)
            .enumerate()
        {
            let location = stats.location_stats(index, channel);
            binding.color = colors.default_color(index, channel);
            binding.input_start = location.input_start;
            binding.input_end = location.input_end;
            binding.noise_reduction = location.noise_reduction;
        }

        let qd = def.quantization;
        let mut quantum_manager = QuantumManager::new();
        quantum_manager.init_strategies(
            &qd,
            &self.metadata,
            &def.channels,
            self.config.lut_max_bits,
        )?;
        let codomain = CodomainChain::new(qd.cd_start, qd.cd_end)?;

        self.strategy = RenderingStrategy::from_model(def.model, &self.config);
        self.quantum_manager = quantum_manager;
        self.codomain = codomain;
        self.def = def;

        tracing::info!(
            pixels_id = self.metadata.id,
            model = %self.def.model,
            default_z = self.def.default_z,
            "Reset rendering defaults"
        );
        Ok(())
    }

    /// [`reset_defaults`](Self::reset_defaults), then save the new settings.
    pub fn reset_defaults_and_save(
        &mut self,
        colors: &dyn ColorAssigner,
        stats: &dyn StatsProvider,
        service: &dyn PixelsService,
    ) -> RenderResult<()> {
        self.reset_defaults(colors, stats)?;
        self.save(service)
    }
}
