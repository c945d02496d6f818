//! Fixed-point energy bounds and overflow-checked arithmetic.
//!
//! Reducers expand clique tables into polynomials whose coefficients grow
//! with the clique order, and solvers sum those coefficients again. Energies
//! entering the pipeline are therefore capped at [`MAX_FIXED_ENERGY`], and
//! every later step uses the helpers below so that an overflow surfaces as
//! `energy-overflow` rather than a panic or a wrapped value.

use crate::errors::PboError;
use crate::Energy;

/// Largest magnitude a single fixed-point energy may carry (`2^40`).
///
/// Values beyond it, including infinities, are clamped. With the default
/// scale of 10000 this keeps real energies up to about `1.1e8` distinct and
/// leaves headroom for order-10 Möbius expansion and the reduction.
pub const MAX_FIXED_ENERGY: Energy = 1 << 40;

/// Clamps `value` into `[-MAX_FIXED_ENERGY, MAX_FIXED_ENERGY]`.
pub fn clamp_energy(value: Energy) -> Energy {
    value.clamp(-MAX_FIXED_ENERGY, MAX_FIXED_ENERGY)
}

/// `a + b`, or `energy-overflow` tagged with `stage`.
pub fn add(a: Energy, b: Energy, stage: &str) -> Result<Energy, PboError> {
    a.checked_add(b).ok_or_else(|| PboError::energy_overflow(stage))
}

/// `a - b`, or `energy-overflow` tagged with `stage`.
pub fn sub(a: Energy, b: Energy, stage: &str) -> Result<Energy, PboError> {
    a.checked_sub(b).ok_or_else(|| PboError::energy_overflow(stage))
}

/// `a * b`, or `energy-overflow` tagged with `stage`.
pub fn mul(a: Energy, b: Energy, stage: &str) -> Result<Energy, PboError> {
    a.checked_mul(b).ok_or_else(|| PboError::energy_overflow(stage))
}
