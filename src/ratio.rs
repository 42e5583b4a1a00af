//! Transmittance and absorbance of a sample against a background.

use crate::align::align_pair;
use crate::error::Result;
use crate::series::Series;
use ndarray::{Array1, Zip};
use serde::{Deserialize, Serialize};

/// Symmetric bound applied to every transmittance value.
pub const TRANSMITTANCE_LIMIT: f64 = 5.0;

/// Value substituted for non-positive transmittance before the logarithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum AbsorbanceFloor {
    /// The smallest positive normal `f64`.
    #[default]
    SmallestPositive,
    Epsilon(f64),
}

impl AbsorbanceFloor {
    pub fn value(&self) -> f64 {
        match self {
            AbsorbanceFloor::SmallestPositive => f64::MIN_POSITIVE,
            AbsorbanceFloor::Epsilon(eps) if eps.is_finite() && *eps > 0.0 => *eps,
            AbsorbanceFloor::Epsilon(_) => f64::MIN_POSITIVE,
        }
    }
}

fn bounded_ratio(sample: f64, background: f64, limit: f64) -> f64 {
    let q = sample / background;
    if q.is_nan() {
        1.0
    } else {
        q.clamp(-limit, limit)
    }
}

/// Transmittance `sample / background` clamped to `[-5, 5]`.
///
/// The shorter spectrum is aligned to the longer one first. The axis of the result is the one
/// of the longer input, the sample's if both are equally long.
pub fn transmittance(sample: &Series, background: &Series) -> Result<Series> {
    transmittance_with(sample, background, TRANSMITTANCE_LIMIT)
}

/// Like [`transmittance`] with a custom symmetric limit.
///
/// Division by zero is bounded like any other quotient, `0 / 0` is taken as full transmission.
pub fn transmittance_with(sample: &Series, background: &Series, limit: f64) -> Result<Series> {
    let limit = if limit.is_finite() && limit > 0.0 {
        limit
    } else {
        TRANSMITTANCE_LIMIT
    };
    let (sample_aligned, background_aligned) = align_pair(sample, background)?;
    let axis = if background.len() > sample.len() {
        &background_aligned
    } else {
        &sample_aligned
    };

    let mut undefined = 0usize;
    let mut t = Array1::<f64>::zeros(sample_aligned.len());
    Zip::from(&mut t)
        .and(sample_aligned.y())
        .and(background_aligned.y())
        .for_each(|t, s, b| {
            if *b == 0.0 {
                undefined += 1;
            }
            *t = bounded_ratio(*s, *b, limit);
        });
    if undefined > 0 {
        log::warn!("{undefined} transmittance values divide by a zero background and were bounded");
    }
    axis.with_values(t)
}

/// Absorbance `-log10(T)`. Values `<= 0` are replaced by `floor` first.
pub fn absorbance(transmittance: &Series, floor: AbsorbanceFloor) -> Result<Series> {
    let floor = floor.value();
    let a = transmittance
        .y()
        .mapv(|t| if t <= 0.0 { -floor.log10() } else { -t.log10() });
    transmittance.with_values(a)
}
