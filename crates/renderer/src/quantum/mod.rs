//! Quantization: mapping raw intensities into the 8-bit codomain.

mod manager;
pub mod maps;
mod strategy;

pub use manager::QuantumManager;
pub use maps::ValueMapper;
pub use strategy::{QuantumStrategy, DECILE, DEFAULT_LUT_MAX_BITS};
