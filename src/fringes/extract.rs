use crate::error::{FringeError, Result};
use crate::fringes::bound::FringeBound;
use crate::series::{DataBlock, DomainKind, Series};
use crate::transform::hermitian_forward;
use crate::zero_fill::extend_to;
use ndarray::Array1;

/// Spectrum of the first `count` points of `interferogram`, zero filled back to its full length.
///
/// An empty prefix contributes nothing and yields the zero spectrum on the same axis.
fn truncated_spectrum(
    interferogram: &Series,
    count: usize,
    sampling_interval: Option<f64>,
) -> Result<Series> {
    let n = interferogram.len();
    let d = sampling_interval.or(Some(interferogram.step()));
    match interferogram.truncate(count) {
        Some(prefix) => hermitian_forward(&extend_to(&prefix, n)?, d),
        None => {
            let zeros = interferogram.with_values(Array1::zeros(n))?;
            hermitian_forward(&zeros, d)
        }
    }
}

/// Isolates the spectral contribution of one fringe.
///
/// The interferogram is truncated once after the fringe (all points `<= end`) and once before it
/// (all points `< start`). Both truncations are zero filled to the full interferogram length and
/// transformed; their difference is the spectrum of the fringe alone.
///
/// # Arguments
/// - `interferogram`: A block of kind `DomainKind::Interferogram`.
/// - `bound`: Fringe position on the interferogram axis.
///
/// # Returns
/// The fringe component on the spectral axis of the full interferogram, or
/// `FringeError::InvalidBound` if the bound leaves the axis range.
pub fn extract_fringe(interferogram: &DataBlock, bound: &FringeBound) -> Result<Series> {
    interferogram.expect_kind(DomainKind::Interferogram)?;
    let series = interferogram.series();
    if bound.start() < series.first_x() || bound.end() > series.last_x() {
        return Err(FringeError::InvalidBound {
            start: bound.start(),
            end: bound.end(),
            reason: format!(
                "outside the interferogram range [{}, {}]",
                series.first_x(),
                series.last_x()
            ),
        });
    }

    let n_incl = series.count_up_to(bound.end());
    let n_excl = series.count_below(bound.start());
    log::debug!(
        "extracting fringe {bound} from '{}': {n_excl} points before, {n_incl} points up to its end",
        interferogram.name()
    );

    // a one-point prefix has no step of its own
    let d = interferogram.sampling_interval();
    let spectrum_incl = truncated_spectrum(series, n_incl, d)?;
    let spectrum_excl = truncated_spectrum(series, n_excl, d)?;
    spectrum_incl.subtract(&spectrum_excl)
}
