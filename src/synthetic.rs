//! Synthetic interferograms for the test suites.

use crate::error::DatasetRole;
use crate::series::{DataBlock, Dataset, DomainKind, Series};
use crate::transform::hermitian_forward;
use std::f64::consts::PI;

/// Single-sided centerburst: a few emission bands under a narrow gaussian envelope.
///
/// The envelope has decayed to zero (in `f64`) well before index 400.
pub fn centerburst(n: usize) -> Vec<f64> {
    let bands = [(0.05, 1.0), (0.11, 0.6), (0.23, 0.3), (0.31, 0.45)];
    (0..n)
        .map(|i| {
            let t = i as f64;
            let envelope = (-(t / 40.0).powi(2)).exp();
            let carrier: f64 = bands
                .iter()
                .map(|(f, a)| a * (2.0 * PI * f * t).cos())
                .sum();
            2.5 * envelope * carrier
        })
        .collect()
}

/// Adds a Hann-windowed oscillation strictly between the indices `start` and `end`.
pub fn inject_fringe(values: &mut [f64], start: usize, end: usize, amplitude: f64) {
    let width = (end - start) as f64;
    for (i, v) in values.iter_mut().enumerate().take(end).skip(start + 1) {
        let phase = (i - start) as f64 / width;
        let window = 0.5 * (1.0 - (2.0 * PI * phase).cos());
        *v += amplitude * window * (2.0 * PI * 0.17 * i as f64).cos();
    }
}

pub fn interferogram_series(values: Vec<f64>) -> Series {
    Series::uniform(values, 0.0, 1.0).unwrap()
}

/// Dataset whose single beam is the Hermitian transform of its interferogram.
pub fn dataset(role: DatasetRole, values: Vec<f64>) -> Dataset {
    let ifg = interferogram_series(values);
    let sb = hermitian_forward(&ifg, None).unwrap();
    Dataset::new(
        role,
        DataBlock::new(format!("{role} IFG"), DomainKind::Interferogram, ifg),
        DataBlock::new(format!("{role} SB"), DomainKind::SingleBeamSpectrum, sb),
    )
    .unwrap()
}
