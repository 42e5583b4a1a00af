//! Assembly of the final, fringe-free output series.

use crate::error::{DatasetRole, FringeError, Result};
use crate::fringes::{remove_fringes, FringeBound, FringeSelection};
use crate::ratio::{absorbance, transmittance_with, AbsorbanceFloor, TRANSMITTANCE_LIMIT};
use crate::series::{DataBlock, Dataset, DomainKind, Series};
use crate::transform::hermitian_forward;
use crate::zero_fill::{extend_to, zero_fill_by_factor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything an export produces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessedResult {
    pub background_single_beam: Series,
    pub sample_single_beam: Series,
    pub transmittance: Series,
    pub absorbance: Series,
    pub removed_fringes: Vec<FringeBound>,
    pub zero_fill_factor: usize,
    pub created: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub zero_fill_factor: usize,
    pub transmittance_limit: f64,
    pub absorbance_floor: AbsorbanceFloor,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            zero_fill_factor: 1,
            transmittance_limit: TRANSMITTANCE_LIMIT,
            absorbance_floor: AbsorbanceFloor::default(),
        }
    }
}

/// Pads, zero fills, transforms and cleans one dataset.
fn clean_single_beam(
    dataset: &Dataset,
    length: usize,
    selection: &FringeSelection,
    zero_fill_factor: usize,
) -> Result<Series> {
    let ifg = dataset.interferogram();
    let extended = extend_to(ifg.series(), length)?;
    let filled = zero_fill_by_factor(&extended, zero_fill_factor)?;
    let spectrum = hermitian_forward(&filled, ifg.sampling_interval())?;

    let filled = ifg.derive(
        format!("{} ZFF{zero_fill_factor}", ifg.name()),
        DomainKind::Interferogram,
        filled,
    );
    let spectrum = filled.derive(
        format!("{} single beam ZFF{zero_fill_factor}", dataset.role()),
        DomainKind::SingleBeamSpectrum,
        spectrum,
    );
    let cleaned: DataBlock = remove_fringes(&spectrum, &filled, selection)?;
    Ok(cleaned.series().clone())
}

/// Exports with default ratio options and the given zero-fill factor.
pub fn export(
    sample: &Dataset,
    background: &Dataset,
    selection: &FringeSelection,
    zero_fill_factor: usize,
) -> Result<ProcessedResult> {
    export_with(
        sample,
        background,
        selection,
        &ExportOptions {
            zero_fill_factor,
            ..ExportOptions::default()
        },
    )
}

/// Produces the fringe-free single-beam spectra of both datasets and their ratios.
///
/// Both interferograms are brought to the length of the longer one and zero filled by
/// `options.zero_fill_factor` before the Hermitian transform. The selected fringes are removed
/// from each dataset against its own zero-filled interferogram. Any failure is reported with the
/// role of the dataset it occurred in.
pub fn export_with(
    sample: &Dataset,
    background: &Dataset,
    selection: &FringeSelection,
    options: &ExportOptions,
) -> Result<ProcessedResult> {
    let zff = options.zero_fill_factor;
    if zff < 1 {
        return Err(FringeError::InvalidFactor(format!(
            "zero-fill factor {zff} must be at least 1"
        )));
    }
    let length = sample
        .interferogram()
        .series()
        .len()
        .max(background.interferogram().series().len());
    log::info!(
        "exporting with zero-fill factor {zff}: {} points, {} fringes included",
        length * zff,
        selection.included().count()
    );

    let (background_single_beam, sample_single_beam) = rayon::join(
        || clean_single_beam(background, length, selection, zff),
        || clean_single_beam(sample, length, selection, zff),
    );
    let background_single_beam =
        background_single_beam.map_err(|e| e.in_dataset(DatasetRole::Background))?;
    let sample_single_beam = sample_single_beam.map_err(|e| e.in_dataset(DatasetRole::Sample))?;

    let transmittance = transmittance_with(
        &sample_single_beam,
        &background_single_beam,
        options.transmittance_limit,
    )?;
    let absorbance = absorbance(&transmittance, options.absorbance_floor)?;

    Ok(ProcessedResult {
        background_single_beam,
        sample_single_beam,
        transmittance,
        absorbance,
        removed_fringes: selection.included().copied().collect(),
        zero_fill_factor: zff,
        created: Utc::now(),
    })
}
