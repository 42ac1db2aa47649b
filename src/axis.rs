//! # Range Normalizer
//!
//! Rounds a raw maximum up to a "nice" value-axis limit, two significant
//! digits below the leading one, so every frame of a batch shares one scale.
//!
//! ```rust
//! use population_gif::axis::compute_bound;
//!
//! let bound = compute_bound(1_234_567_890.0).unwrap();
//! assert_eq!(bound.value(), 1_240_000_000.0);
//! ```

use crate::error::PopError;
use serde::Serialize;

/// Upper limit of the value axis, shared by all frames of a batch
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct AxisBound(f64);

impl AxisBound {
    pub fn value(self) -> f64 {
        self.0
    }
}

/// Decimal exponent of the rounding step: `floor(log10(raw_max)) - 2`
pub fn magnitude_exponent(raw_max: f64) -> i32 {
    raw_max.log10().floor() as i32 - 2
}

/// Rounding step for `raw_max`, `10^(floor(log10(raw_max)) - 2)`
pub fn magnitude(raw_max: f64) -> f64 {
    10f64.powi(magnitude_exponent(raw_max))
}

/// Round `raw_max` up to the next multiple of its magnitude
pub fn compute_bound(raw_max: f64) -> Result<AxisBound, PopError> {
    if !raw_max.is_finite() || raw_max <= 0.0 {
        return Err(PopError::Validation(format!(
            "axis maximum must be finite and positive, got {}",
            raw_max
        )));
    }

    let exponent = magnitude_exponent(raw_max);
    // Integral powers of ten are exact up to 10^22, so scale by one instead
    // of multiplying by an inexact negative power.
    let power = 10f64.powi(exponent.abs());
    let to_bound = |units: f64| {
        if exponent >= 0 {
            units * power
        } else {
            units / power
        }
    };
    let ratio = if exponent >= 0 {
        raw_max / power
    } else {
        raw_max * power
    };

    // `ratio` may sit a few ULPs off an integer, which moves `ceil` by one step.
    let mut units = ratio.ceil();
    if to_bound(units - 1.0) >= raw_max {
        units -= 1.0;
    } else if to_bound(units) < raw_max {
        units += 1.0;
    }

    let bound = to_bound(units);
    if !bound.is_finite() || bound < raw_max {
        return Err(PopError::Validation(format!(
            "axis maximum {:e} has no representable bound",
            raw_max
        )));
    }

    Ok(AxisBound(bound))
}
