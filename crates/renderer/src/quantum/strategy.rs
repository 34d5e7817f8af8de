//! Per-channel quantization of raw intensities into the codomain.

use pixels_common::{
    ChannelBinding, ChannelStats, ConfigError, Family, PixelType, QuantizationError, QuantumDef,
    DEPTH_8BIT,
};

use super::maps::ValueMapper;

/// Number of sub-intervals of the window used by noise reduction.
pub const DECILE: f64 = 10.0;

/// Default widest integer type quantized through a lookup table.
pub const DEFAULT_LUT_MAX_BITS: u32 = 16;

/// How `quantize` evaluates a value.
#[derive(Debug, Clone, PartialEq)]
enum Evaluator {
    /// Evaluate the curve for every value.
    Direct,
    /// Precomputed codomain value for every integer in `[min, min + len)`.
    Lut { min: i64, table: Vec<u8> },
}

/// Maps intensities of one channel from the input window onto
/// `[cd_start, cd_end]`.
///
/// Values in `[global_min, window_start]` map to `cd_start`, values in
/// `[window_end, global_max]` to `cd_end`; values outside the global extent
/// are rejected.
#[derive(Debug, Clone)]
pub struct QuantumStrategy {
    global_min: f64,
    global_max: f64,
    window_start: f64,
    window_end: f64,
    family: Family,
    coefficient: f64,
    noise_reduction: bool,
    value_mapper: ValueMapper,
    quantum_def: QuantumDef,
    pixel_type: PixelType,
    lut_max_bits: u32,
    evaluator: Evaluator,
}

impl QuantumStrategy {
    /// Linear strategy over `[0, 1]`.
    pub fn new(quantum_def: QuantumDef, pixel_type: PixelType) -> Self {
        Self {
            global_min: 0.0,
            global_max: 1.0,
            window_start: 0.0,
            window_end: 1.0,
            family: Family::Linear,
            coefficient: 1.0,
            noise_reduction: false,
            value_mapper: ValueMapper::Polynomial,
            quantum_def,
            pixel_type,
            lut_max_bits: DEFAULT_LUT_MAX_BITS,
            evaluator: Evaluator::Direct,
        }
    }

    /// Widest integer pixel type to quantize through a lookup table
    /// (0 disables tables).
    pub fn with_lut_max_bits(mut self, bits: u32) -> Self {
        self.lut_max_bits = bits;
        self.evaluator = Evaluator::Direct;
        self
    }

    /// Build the strategy of a channel.
    ///
    /// The window is `previous_window` when the channel already had a
    /// strategy, the binding's window otherwise.
    pub fn build(
        quantum_def: QuantumDef,
        pixel_type: PixelType,
        stats: ChannelStats,
        binding: &ChannelBinding,
        previous_window: Option<(f64, f64)>,
        lut_max_bits: u32,
    ) -> Result<Self, ConfigError> {
        let mut strategy = Self::new(quantum_def, pixel_type).with_lut_max_bits(lut_max_bits);
        strategy.set_extent(stats.global_min, stats.global_max)?;
        strategy.set_mapping(binding.family, binding.coefficient, binding.noise_reduction)?;
        let (start, end) = previous_window.unwrap_or((binding.input_start, binding.input_end));
        strategy.set_window(start, end)?;
        Ok(strategy)
    }

    /// The interval must be ordered and its width representable by the
    /// pixel type.
    fn verify_interval(&self, min: f64, max: f64) -> Result<(), ConfigError> {
        let supported = min <= max
            && match self.pixel_type.integer_bits() {
                Some(bits) => max - min < 2f64.powi(bits as i32),
                None => (max - min).is_finite(),
            };
        if supported {
            Ok(())
        } else {
            Err(ConfigError::InvalidInterval {
                min,
                max,
                pixel_type: self.pixel_type,
            })
        }
    }

    /// Set the global extent and reset the window to it.
    pub fn set_extent(&mut self, global_min: f64, global_max: f64) -> Result<(), ConfigError> {
        self.verify_interval(global_min, global_max)?;
        self.global_min = global_min;
        self.global_max = global_max;
        self.window_start = global_min;
        self.window_end = global_max;
        self.evaluator = Evaluator::Direct;
        Ok(())
    }

    /// Set the input window and rebuild cached state.
    pub fn set_window(&mut self, start: f64, end: f64) -> Result<(), ConfigError> {
        if start < self.global_min || end > self.global_max {
            return Err(ConfigError::WindowOutOfRange {
                start,
                end,
                global_min: self.global_min,
                global_max: self.global_max,
            });
        }
        self.verify_interval(start, end)?;
        self.window_start = start;
        self.window_end = end;
        self.on_window_change();
        Ok(())
    }

    /// Select the curve without rebuilding cached state.
    pub fn set_mapping(
        &mut self,
        family: Family,
        coefficient: f64,
        noise_reduction: bool,
    ) -> Result<(), ConfigError> {
        let value_mapper = ValueMapper::for_family(family);
        if !coefficient.is_finite()
            || coefficient <= 0.0
            || !value_mapper.normalized(0.5, coefficient).is_finite()
        {
            return Err(ConfigError::InvalidCoefficient(coefficient));
        }
        self.family = family;
        self.coefficient = coefficient;
        self.noise_reduction = noise_reduction;
        self.value_mapper = value_mapper;
        // stale until the next on_window_change
        self.evaluator = Evaluator::Direct;
        Ok(())
    }

    /// Select the curve and rebuild cached state.
    pub fn set_quantization_map(
        &mut self,
        family: Family,
        coefficient: f64,
        noise_reduction: bool,
    ) -> Result<(), ConfigError> {
        self.set_mapping(family, coefficient, noise_reduction)?;
        self.on_window_change();
        Ok(())
    }

    fn lut_eligible(&self) -> bool {
        match self.pixel_type.integer_bits() {
            Some(bits) => bits <= self.lut_max_bits,
            None => false,
        }
    }

    /// Rebuild the lookup table for integer types narrow enough to have one.
    fn on_window_change(&mut self) {
        if !self.lut_eligible() {
            self.evaluator = Evaluator::Direct;
            return;
        }
        let min = self.global_min.floor() as i64;
        let max = self.global_max.ceil() as i64;
        let table = (min..=max)
            .map(|x| self.map_value(x as f64) as u8)
            .collect::<Vec<u8>>();
        tracing::trace!(
            pixel_type = %self.pixel_type,
            entries = table.len(),
            window_start = self.window_start,
            window_end = self.window_end,
            "Rebuilt quantization table"
        );
        self.evaluator = Evaluator::Lut { min, table };
    }

    /// Curve evaluation shared by the direct and table paths.
    fn map_value(&self, value: f64) -> i32 {
        let cd_start = self.quantum_def.cd_start;
        let cd_end = self.quantum_def.cd_end;
        if value <= self.window_start {
            return cd_start;
        }
        if value >= self.window_end {
            return cd_end;
        }

        let t = (value - self.window_start) / (self.window_end - self.window_start);
        if self.noise_reduction {
            if t < 1.0 / DECILE {
                return cd_start;
            }
            if t > 1.0 - 1.0 / DECILE {
                return cd_end;
            }
        }

        let span = (cd_end - cd_start) as f64;
        let mut y = span * self.value_mapper.normalized(t, self.coefficient);
        let levels = self.quantum_def.bit_resolution;
        if levels < DEPTH_8BIT && span > 0.0 {
            let levels = levels as f64;
            y = (y / span * levels).round() / levels * span;
        }
        (cd_start as f64 + y)
            .round()
            .clamp(cd_start as f64, cd_end as f64) as i32
    }

    /// Map `value` into the codomain.
    #[inline]
    pub fn quantize(&self, value: f64) -> Result<i32, QuantizationError> {
        if !(value >= self.global_min && value <= self.global_max) {
            return Err(QuantizationError::OutOfRange {
                value,
                global_min: self.global_min,
                global_max: self.global_max,
            });
        }
        if let Evaluator::Lut { min, table } = &self.evaluator {
            if value.fract() == 0.0 {
                if let Some(v) = table.get((value as i64 - min) as usize) {
                    return Ok(*v as i32);
                }
            }
        }
        Ok(self.map_value(value))
    }

    /// Whether quantization currently goes through a lookup table.
    pub fn uses_lookup_table(&self) -> bool {
        matches!(self.evaluator, Evaluator::Lut { .. })
    }

    pub fn global_min(&self) -> f64 {
        self.global_min
    }

    pub fn global_max(&self) -> f64 {
        self.global_max
    }

    pub fn window_start(&self) -> f64 {
        self.window_start
    }

    pub fn window_end(&self) -> f64 {
        self.window_end
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    pub fn noise_reduction(&self) -> bool {
        self.noise_reduction
    }

    pub fn quantum_def(&self) -> &QuantumDef {
        &self.quantum_def
    }

    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uint8_strategy() -> QuantumStrategy {
        let mut s = QuantumStrategy::new(QuantumDef::default(), PixelType::Uint8);
        s.set_extent(0.0, 255.0).unwrap();
        s.set_window(0.0, 255.0).unwrap();
        s
    }

    #[test]
    fn test_set_extent_resets_window() {
        let mut s = uint8_strategy();
        s.set_window(10.0, 20.0).unwrap();
        s.set_extent(5.0, 200.0).unwrap();
        assert_eq!((s.window_start(), s.window_end()), (5.0, 200.0));
    }

    #[test]
    fn test_extent_must_fit_pixel_type() {
        let mut s = QuantumStrategy::new(QuantumDef::default(), PixelType::Int8);
        assert!(s.set_extent(-128.0, 127.0).is_ok());
        assert!(matches!(
            s.set_extent(-128.0, 128.0),
            Err(ConfigError::InvalidInterval { .. })
        ));
        assert!(s.set_extent(5.0, 4.0).is_err());

        let mut s = QuantumStrategy::new(QuantumDef::default(), PixelType::Double);
        assert!(s.set_extent(-1e12, 1e12).is_ok());
    }

    #[test]
    fn test_lut_built_for_narrow_integers_only() {
        assert!(uint8_strategy().uses_lookup_table());

        let mut s = QuantumStrategy::new(QuantumDef::default(), PixelType::Float);
        s.set_extent(0.0, 1.0).unwrap();
        s.set_window(0.0, 1.0).unwrap();
        assert!(!s.uses_lookup_table());

        let mut s =
            QuantumStrategy::new(QuantumDef::default(), PixelType::Uint8).with_lut_max_bits(0);
        s.set_extent(0.0, 255.0).unwrap();
        s.set_window(0.0, 255.0).unwrap();
        assert!(!s.uses_lookup_table());
    }

    #[test]
    fn test_set_mapping_defers_rebuild() {
        let mut s = uint8_strategy();
        s.set_mapping(Family::Exponential, 2.0, false).unwrap();
        assert!(!s.uses_lookup_table());
        s.set_quantization_map(Family::Exponential, 2.0, false).unwrap();
        assert!(s.uses_lookup_table());
    }

    #[test]
    fn test_invalid_coefficient() {
        let mut s = uint8_strategy();
        assert_eq!(
            s.set_mapping(Family::Polynomial, 0.0, false),
            Err(ConfigError::InvalidCoefficient(0.0))
        );
        assert!(s.set_mapping(Family::Polynomial, f64::NAN, false).is_err());
        assert_eq!(s.family(), Family::Linear);
    }

    #[test]
    fn test_bit_resolution_snaps_levels() {
        let qd = QuantumDef::new(0, 255, 1).unwrap();
        let mut s = QuantumStrategy::new(qd, PixelType::Uint8);
        s.set_extent(0.0, 255.0).unwrap();
        s.set_window(0.0, 255.0).unwrap();
        assert_eq!(s.quantize(100.0), Ok(0));
        assert_eq!(s.quantize(130.0), Ok(255));
    }
}
