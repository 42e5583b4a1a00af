//! Spectral alignment of datasets recorded with different resolutions.
//!
//! The shorter spectrum is transformed back to an interferogram with the general complex
//! inverse transform, zero filled to the longer point count and transformed forward again.
//! The symmetry of the intermediate interferogram is not guaranteed after zero filling,
//! therefore the complex transform pair is used instead of the Hermitian one.

use crate::error::{FringeError, Result};
use crate::series::Series;
use crate::transform::{complex_forward, complex_inverse};
use num_complex::Complex64;
use ndarray::Array1;

/// Resamples `spectrum` to `target_length` points on a proportionally finer grid that starts
/// at the same coordinate.
///
/// # Arguments
/// - `spectrum`: The spectrum to resample.
/// - `target_length`: The new point count, at least the current one.
///
/// # Returns
/// The real part of the resampled spectrum. Every `target_length / n`-th value coincides
/// with an original value when the ratio is an integer.
pub fn resample(spectrum: &Series, target_length: usize) -> Result<Series> {
    let n = spectrum.len();
    if target_length == 0 || n == 0 {
        return Err(FringeError::LengthMismatch {
            expected: target_length,
            actual: n,
        });
    }
    if target_length == n {
        return Ok(spectrum.clone());
    }
    if target_length < n {
        return Err(FringeError::LengthMismatch {
            expected: target_length,
            actual: n,
        });
    }

    let buffer: Vec<Complex64> = spectrum.y().iter().map(|v| Complex64::new(*v, 0.0)).collect();
    let mut interferogram = complex_inverse(&buffer)?;
    interferogram.resize(target_length, Complex64::new(0.0, 0.0));
    let resampled = complex_forward(&interferogram)?;

    log::debug!("resampled spectrum from {n} to {target_length} points");

    let step = spectrum.step() * n as f64 / target_length as f64;
    let start = spectrum.first_x();
    let x = Array1::from_shape_fn(target_length, |j| start + j as f64 * step);
    let y = resampled.iter().map(|c| c.re).collect::<Array1<f64>>();
    Series::new(x, y)
}

/// Aligns `target` to the point count of `reference`.
///
/// # Returns
/// A series with `max(len(reference), len(target))` points. A target that is already at
/// least as long as the reference is returned unchanged.
pub fn align(reference: &Series, target: &Series) -> Result<Series> {
    if reference.is_empty() || target.is_empty() {
        return Err(FringeError::LengthMismatch {
            expected: reference.len(),
            actual: target.len(),
        });
    }
    if target.len() >= reference.len() {
        return Ok(target.clone());
    }
    resample(target, reference.len())
}

/// Brings both series to their common (larger) point count.
pub fn align_pair(a: &Series, b: &Series) -> Result<(Series, Series)> {
    Ok((align(b, a)?, align(a, b)?))
}
