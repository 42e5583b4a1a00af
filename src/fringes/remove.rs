use crate::align::align_pair;
use crate::error::Result;
use crate::fringes::bound::{FringeBound, FringeSelection};
use crate::fringes::extract::extract_fringe;
use crate::series::{DataBlock, DomainKind, Series};
use rayon::prelude::*;

/// Subtracts the spectral contribution of every included fringe from `spectrum`.
///
/// The components are computed in parallel against the unmodified `interferogram` and then
/// subtracted one after another in ascending bound order. Excluded fringes are skipped. If the
/// spectrum and the components differ in length, both are aligned to the longer one first.
///
/// # Arguments
/// - `spectrum`: Single-beam spectrum to clean.
/// - `interferogram`: Interferogram the spectrum was computed from.
/// - `selection`: The fringe selection.
///
/// # Returns
/// A new single-beam block; the inputs are left untouched.
pub fn remove_fringes(
    spectrum: &DataBlock,
    interferogram: &DataBlock,
    selection: &FringeSelection,
) -> Result<DataBlock> {
    spectrum.expect_kind(DomainKind::SingleBeamSpectrum)?;
    let bounds: Vec<FringeBound> = selection.included().copied().collect();
    log::debug!(
        "removing {} of {} fringes from '{}'",
        bounds.len(),
        selection.len(),
        spectrum.name()
    );

    let components = bounds
        .par_iter()
        .map(|bound| extract_fringe(interferogram, bound))
        .collect::<Result<Vec<Series>>>()?;

    let mut cleaned = spectrum.series().clone();
    for component in components.iter() {
        cleaned = if cleaned.len() == component.len() {
            cleaned.subtract(component)?
        } else {
            let (running, component) = align_pair(&cleaned, component)?;
            running.subtract(&component)?
        };
    }

    Ok(spectrum.derive(
        format!("{} (fringes removed)", spectrum.name()),
        DomainKind::SingleBeamSpectrum,
        cleaned,
    ))
}
