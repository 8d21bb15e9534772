// crates/promql-compliance-core/src/core/tolerance.rs
// ============================================================================
// Module: Numeric Tolerance
// Description: Absolute-plus-relative float equivalence for sample values.
// Purpose: Decide when two engines' sample values are "the same".
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Two finite values `a` and `b` are equivalent when
//! `|a - b| <= absolute + relative * max(|a|, |b|)`. `NaN` is equivalent only
//! to `NaN`, and infinities are equivalent only to an infinity of the same
//! sign.

use serde::Deserialize;
use serde::Serialize;

/// Default absolute tolerance.
pub const DEFAULT_ABSOLUTE_TOLERANCE: f64 = 1e-6;
/// Default relative tolerance.
pub const DEFAULT_RELATIVE_TOLERANCE: f64 = 1e-6;

/// Absolute and relative tolerance applied to sample values.
///
/// # Invariants
/// - Both components are finite and non-negative once validated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tolerance {
    /// Absolute slack.
    pub absolute: f64,
    /// Relative slack, scaled by the larger magnitude.
    pub relative: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            absolute: DEFAULT_ABSOLUTE_TOLERANCE,
            relative: DEFAULT_RELATIVE_TOLERANCE,
        }
    }
}

impl Tolerance {
    /// Creates a tolerance from absolute and relative components.
    #[must_use]
    pub const fn new(absolute: f64, relative: f64) -> Self {
        Self {
            absolute,
            relative,
        }
    }

    /// Exact comparison (no slack) for finite values.
    #[must_use]
    pub const fn exact() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Returns true when both components are finite and non-negative.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.absolute.is_finite()
            && self.relative.is_finite()
            && self.absolute >= 0.0
            && self.relative >= 0.0
    }

    /// Returns true when `a` and `b` are equivalent under this tolerance.
    #[must_use]
    pub fn equivalent(&self, a: f64, b: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return a.is_nan() && b.is_nan();
        }
        if a.is_infinite() || b.is_infinite() {
            return a.is_infinite()
                && b.is_infinite()
                && a.is_sign_positive() == b.is_sign_positive();
        }
        let diff = (a - b).abs();
        diff <= self.relative.mul_add(a.abs().max(b.abs()), self.absolute)
    }
}
