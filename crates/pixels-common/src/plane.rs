//! Plane selection within a 5D pixel set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::pixels::PixelsMetadata;

/// Orientation of a 2D slice through the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slice {
    /// Plane orthogonal to the Z axis.
    XY,
    /// Plane orthogonal to the Y axis.
    XZ,
    /// Plane orthogonal to the X axis.
    ZY,
}

impl Slice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::XY => "XY",
            Self::XZ => "XZ",
            Self::ZY => "ZY",
        }
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Slice {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "XY" => Ok(Self::XY),
            "XZ" => Ok(Self::XZ),
            "ZY" => Ok(Self::ZY),
            other => Err(ConfigError::InvalidSlice(other.to_string())),
        }
    }
}

/// Selects one 2D plane of the pixel set at a given timepoint.
///
/// Only the coordinate orthogonal to the slice is meaningful: `z` for XY,
/// `y` for XZ and `x` for ZY planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaneDef {
    pub slice: Slice,
    #[serde(default)]
    pub x: usize,
    #[serde(default)]
    pub y: usize,
    #[serde(default)]
    pub z: usize,
    pub t: usize,
}

impl PlaneDef {
    pub fn xy(z: usize, t: usize) -> Self {
        Self {
            slice: Slice::XY,
            x: 0,
            y: 0,
            z,
            t,
        }
    }

    pub fn xz(y: usize, t: usize) -> Self {
        Self {
            slice: Slice::XZ,
            x: 0,
            y,
            z: 0,
            t,
        }
    }

    pub fn zy(x: usize, t: usize) -> Self {
        Self {
            slice: Slice::ZY,
            x,
            y: 0,
            z: 0,
            t,
        }
    }

    /// Check the plane lies inside the pixel set.
    pub fn validate(&self, metadata: &PixelsMetadata) -> Result<(), ConfigError> {
        if self.t >= metadata.size_t {
            return Err(ConfigError::PlaneOutOfBounds(format!(
                "t={} with size_t={}",
                self.t, metadata.size_t
            )));
        }
        let (name, index, size) = match self.slice {
            Slice::XY => ("z", self.z, metadata.size_z),
            Slice::XZ => ("y", self.y, metadata.size_y),
            Slice::ZY => ("x", self.x, metadata.size_x),
        };
        if index >= size {
            return Err(ConfigError::PlaneOutOfBounds(format!(
                "{} plane with {name}={index} but size is {size}",
                self.slice
            )));
        }
        Ok(())
    }
}
