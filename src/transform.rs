//! Forward and inverse discrete Fourier transforms used by the pipeline.
//!
//! Two flavours are provided:
//!
//! * **Hermitian-assuming** transforms for real, phase-corrected signals. The single-sided
//!   interferogram of `N` points is treated as one half of an even sequence of length
//!   `M = 2 (N - 1)`. The spectrum of an even real sequence is real, so the first `N` bins
//!   carry all information and the (vanishing) imaginary parts are dropped. The transform
//!   maps `N` real points to `N` real points and is its own inverse up to a factor `M`.
//! * **General complex** transforms without any symmetry assumption, used where zero-filling
//!   may break the symmetry of intermediate results (spectral alignment).
//!
//! No transform pads its input. Padding is done by the zero filler.

use crate::error::{FringeError, Result};
use crate::series::Series;
use num_complex::Complex64;
use realfft::RealFftPlanner;
use rustfft::FftPlanner;

fn check_finite<'a>(values: impl ExactSizeIterator<Item = &'a f64>) -> Result<()> {
    if values.len() == 0 {
        return Err(FringeError::InvalidInput(
            "cannot transform an empty series".to_string(),
        ));
    }
    for (i, v) in values.enumerate() {
        if !v.is_finite() {
            return Err(FringeError::InvalidInput(format!(
                "non-finite value at index {i}"
            )));
        }
    }
    Ok(())
}

fn check_finite_complex(values: &[Complex64]) -> Result<()> {
    if values.is_empty() {
        return Err(FringeError::InvalidInput(
            "cannot transform an empty buffer".to_string(),
        ));
    }
    if let Some(i) = values.iter().position(|c| !c.re.is_finite() || !c.im.is_finite()) {
        return Err(FringeError::InvalidInput(format!(
            "non-finite value at index {i}"
        )));
    }
    Ok(())
}

/// Length of the even extension of an `n` point single-sided signal.
fn extended_len(n: usize) -> usize {
    (2 * n.saturating_sub(1)).max(1)
}

/// Unscaled Hermitian kernel: real part of the DFT of the even extension of `values`.
///
/// # Arguments
/// - `values`: Single-sided real signal of length `N`.
///
/// # Returns
/// `N` real spectral values.
pub fn hermitian_kernel(values: &[f64]) -> Result<Vec<f64>> {
    check_finite(values.iter())?;
    let n = values.len();
    if n == 1 {
        return Ok(values.to_vec());
    }
    let m = extended_len(n);

    let mut real_planner = RealFftPlanner::<f64>::new();
    let r2c = real_planner.plan_fft_forward(m);
    let mut input = r2c.make_input_vec();
    input[..n].copy_from_slice(values);
    for k in 1..n - 1 {
        input[m - k] = values[k];
    }
    let mut spectrum = r2c.make_output_vec();
    r2c.process(&mut input, &mut spectrum)
        .map_err(|e| FringeError::Transform(e.to_string()))?;

    Ok(spectrum.iter().map(|c| c.re).collect())
}

/// Hermitian forward transform, interferogram to spectrum.
///
/// # Arguments
/// - `interferogram`: Real, phase-corrected, single-sided interferogram.
/// - `sampling_interval`: Optical path difference between two points. Falls back to the
///   axis step of the interferogram when `None`.
///
/// # Returns
/// A real spectrum with the same number of points, on the axis `k / (M d)`.
pub fn hermitian_forward(interferogram: &Series, sampling_interval: Option<f64>) -> Result<Series> {
    let n = interferogram.len();
    let d = sampling_interval.unwrap_or_else(|| interferogram.step());
    if n > 1 && (!d.is_finite() || d <= 0.0) {
        return Err(FringeError::InvalidInput(format!(
            "degenerate sampling interval {d}"
        )));
    }
    let values = interferogram.y().to_vec();
    let spectrum = hermitian_kernel(&values)?;
    let m = extended_len(n);
    log::debug!("hermitian forward transform of {n} points (extended length {m})");
    let step = if n > 1 { 1.0 / (m as f64 * d) } else { 1.0 };
    Series::uniform(spectrum, 0.0, step)
}

/// Hermitian inverse transform, spectrum to interferogram.
///
/// Exactly undoes [`hermitian_forward`] within floating point tolerance.
pub fn hermitian_inverse(spectrum: &Series) -> Result<Series> {
    let n = spectrum.len();
    let d_sigma = spectrum.step();
    if n > 1 && d_sigma <= 0.0 {
        return Err(FringeError::InvalidInput(
            "spectral axis has zero width".to_string(),
        ));
    }
    let values = spectrum.y().to_vec();
    let m = extended_len(n);
    let scale = 1.0 / m as f64;
    let interferogram = hermitian_kernel(&values)?
        .into_iter()
        .map(|v| v * scale)
        .collect();
    let step = if n > 1 { 1.0 / (m as f64 * d_sigma) } else { 1.0 };
    Series::uniform(interferogram, 0.0, step)
}

/// Unnormalized forward complex FFT.
pub fn complex_forward(buffer: &[Complex64]) -> Result<Vec<Complex64>> {
    check_finite_complex(buffer)?;
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(buffer.len());
    let mut output = buffer.to_vec();
    fft.process(&mut output);
    Ok(output)
}

/// Complex inverse FFT, normalized by `1 / N`.
pub fn complex_inverse(buffer: &[Complex64]) -> Result<Vec<Complex64>> {
    check_finite_complex(buffer)?;
    let n = buffer.len();
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_inverse(n);
    let mut output = buffer.to_vec();
    fft.process(&mut output);
    let scale = 1.0 / n as f64;
    output.iter_mut().for_each(|c| *c *= scale);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_hermitian_round_trip() {
        for n in [2usize, 3, 17, 256, 1000] {
            let values: Vec<f64> = (0..n)
                .map(|i| (i as f64 * 0.37).sin() * (-(i as f64) / 50.0).exp() + 0.1)
                .collect();
            let ifg = Series::uniform(values.clone(), 0.0, 1.0).unwrap();
            let spectrum = hermitian_forward(&ifg, None).unwrap();
            assert_eq!(spectrum.len(), n);
            let back = hermitian_inverse(&spectrum).unwrap();
            assert_eq!(back.len(), n);
            for (a, b) in back.y().iter().zip(values.iter()) {
                assert_abs_diff_eq!(a, b, epsilon = 1e-10);
            }
            assert_abs_diff_eq!(back.step(), 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_hermitian_of_impulse_is_flat() {
        let mut values = vec![0.0; 64];
        values[0] = 1.0;
        let spectrum = hermitian_kernel(&values).unwrap();
        for v in spectrum {
            assert_abs_diff_eq!(v, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_spectral_axis_ends_at_nyquist() {
        let ifg = Series::uniform(vec![1.0; 129], 0.0, 1.0).unwrap();
        let d = 1.0 / 15798.0;
        let spectrum = hermitian_forward(&ifg, Some(d)).unwrap();
        assert_abs_diff_eq!(spectrum.first_x(), 0.0);
        assert_abs_diff_eq!(spectrum.last_x(), 1.0 / (2.0 * d), epsilon = 1e-6);
    }

    #[test]
    fn test_single_point_is_identity() {
        let ifg = Series::uniform(vec![3.5], 2.0, 1.0).unwrap();
        let spectrum = hermitian_forward(&ifg, None).unwrap();
        assert_eq!(spectrum.y()[0], 3.5);
        assert_eq!(hermitian_inverse(&spectrum).unwrap().y()[0], 3.5);
    }

    #[test]
    fn test_complex_round_trip() {
        let input: Vec<Complex64> = (0..100)
            .map(|i| Complex64::new((i as f64).cos(), (i as f64 * 0.5).sin()))
            .collect();
        let back = complex_inverse(&complex_forward(&input).unwrap()).unwrap();
        for (a, b) in back.iter().zip(input.iter()) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-12);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        assert!(matches!(
            hermitian_kernel(&[]),
            Err(FringeError::InvalidInput(_))
        ));
        assert!(matches!(
            hermitian_kernel(&[1.0, f64::INFINITY, 2.0]),
            Err(FringeError::InvalidInput(_))
        ));
        assert!(matches!(
            complex_forward(&[]),
            Err(FringeError::InvalidInput(_))
        ));
        let ifg = Series::uniform(vec![1.0, 2.0, 3.0], 0.0, 1.0).unwrap();
        assert!(hermitian_forward(&ifg, Some(0.0)).is_err());
    }
}
