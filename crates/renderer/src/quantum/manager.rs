//! One quantization strategy per channel.

use pixels_common::{ChannelBinding, ConfigError, PixelsMetadata, QuantumDef};

use super::strategy::QuantumStrategy;

/// Holds the strategy of every channel, indexed by channel.
#[derive(Debug, Clone, Default)]
pub struct QuantumManager {
    strategies: Vec<QuantumStrategy>,
}

impl QuantumManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and configure a strategy for every channel.
    ///
    /// Channels that already had a strategy keep its window; new channels
    /// take the window of their binding. Nothing changes on error.
    pub fn init_strategies(
        &mut self,
        quantum_def: &QuantumDef,
        metadata: &PixelsMetadata,
        bindings: &[ChannelBinding],
        lut_max_bits: u32,
    ) -> Result<(), ConfigError> {
        let mut strategies = Vec::with_capacity(bindings.len());
        for (channel, binding) in bindings.iter().enumerate() {
            let stats = metadata
                .channel_stats(channel)
                .ok_or(ConfigError::ChannelOutOfRange {
                    index: channel,
                    size_c: metadata.size_c,
                })?;
            let previous_window = self
                .strategies
                .get(channel)
                .map(|s| (s.window_start(), s.window_end()));
            strategies.push(QuantumStrategy::build(
                *quantum_def,
                metadata.pixel_type,
                stats,
                binding,
                previous_window,
                lut_max_bits,
            )?);
        }
        self.strategies = strategies;
        Ok(())
    }

    pub fn strategy_for(&self, channel: usize) -> Option<&QuantumStrategy> {
        self.strategies.get(channel)
    }

    pub fn strategy_for_mut(&mut self, channel: usize) -> Option<&mut QuantumStrategy> {
        self.strategies.get_mut(channel)
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}
