//! Zero filling of series.
//!
//! Padding appends zeros to the dependent axis and continues the independent axis with its
//! existing step, starting right after the last original coordinate.

use crate::error::{FringeError, Result};
use crate::series::Series;
use ndarray::{concatenate, Array1, Axis};

fn pad(series: &Series, extra: usize) -> Result<Series> {
    if extra == 0 {
        return Ok(series.clone());
    }
    let step = series.step();
    let last = series.last_x();
    let x_tail = Array1::from_shape_fn(extra, |j| last + (j + 1) as f64 * step);
    let y_tail = Array1::<f64>::zeros(extra);
    let x = concatenate![Axis(0), series.x().view(), x_tail.view()];
    let y = concatenate![Axis(0), series.y().view(), y_tail.view()];
    Series::new(x, y)
}

/// Zero fills `series` to `target_length`.
///
/// # Arguments
/// - `series`: Series of length `n`.
/// - `target_length`: Must equal `alpha * n` for an integer `alpha >= 1`.
///
/// # Returns
/// A new series of length `target_length` whose first `n` values are the original ones and
/// whose remaining `(alpha - 1) * n` values are zero. Fails with
/// `FringeError::InvalidFactor` if `target_length` is not such a multiple.
pub fn zero_fill(series: &Series, target_length: usize) -> Result<Series> {
    let n = series.len();
    if target_length < n || target_length % n != 0 {
        return Err(FringeError::InvalidFactor(format!(
            "target length {target_length} is not a multiple >= 1 of input length {n}"
        )));
    }
    pad(series, target_length - n)
}

/// Zero fills `series` to `factor` times its length.
pub fn zero_fill_by_factor(series: &Series, factor: usize) -> Result<Series> {
    let n = series.len();
    if factor < 1 {
        return Err(FringeError::InvalidFactor(format!(
            "zero-fill factor {factor} must be at least 1"
        )));
    }
    let target_length = factor.checked_mul(n).ok_or_else(|| {
        FringeError::InvalidFactor(format!(
            "zero-fill factor {factor} overflows the length of a {n} point series"
        ))
    })?;
    zero_fill(series, target_length)
}

/// Pads `series` with zeros up to an arbitrary `target_length >= n`.
///
/// Used to bring an interferogram to the length of another one before the integer zero-fill
/// factor is applied.
pub fn extend_to(series: &Series, target_length: usize) -> Result<Series> {
    let n = series.len();
    if target_length < n {
        return Err(FringeError::InvalidFactor(format!(
            "cannot extend a {n} point series to {target_length} points"
        )));
    }
    pad(series, target_length - n)
}
