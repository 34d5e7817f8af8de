//! Curves mapping a normalized intensity onto the codomain.

use pixels_common::Family;

/// A monotone curve `f(x, k)` evaluated on `x ∈ [0, 1]` with `f(0, k) = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueMapper {
    /// `x^k`, shared by the linear and polynomial families.
    Polynomial,
    /// `ln(1 + k·x)`
    Logarithmic,
    /// `exp(k·x) - 1`
    Exponential,
}

impl ValueMapper {
    pub fn for_family(family: Family) -> Self {
        match family {
            Family::Linear | Family::Polynomial => Self::Polynomial,
            Family::Logarithmic => Self::Logarithmic,
            Family::Exponential => Self::Exponential,
        }
    }

    #[inline]
    pub fn transform(&self, x: f64, k: f64) -> f64 {
        match self {
            Self::Polynomial => x.powf(k),
            Self::Logarithmic => (k * x).ln_1p(),
            Self::Exponential => (k * x).exp_m1(),
        }
    }

    /// `f(x, k) / f(1, k)`, the curve rescaled onto `[0, 1]`.
    ///
    /// The exponential ratio is evaluated as
    /// `exp(k(x - 1)) · expm1(-kx) / expm1(-k)`, finite for every finite
    /// `k > 0`.
    #[inline]
    pub fn normalized(&self, x: f64, k: f64) -> f64 {
        match self {
            Self::Polynomial => x.powf(k),
            Self::Logarithmic => (k * x).ln_1p() / k.ln_1p(),
            Self::Exponential => (k * (x - 1.0)).exp() * (-k * x).exp_m1() / (-k).exp_m1(),
        }
    }
}
