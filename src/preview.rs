//! Display previews: the spectrum of a single fringe and the cleaned single beams.
//!
//! Fringe components live on the axis of the Hermitian transform of the interferogram. The
//! single beams shown here are therefore recomputed from the interferogram, the spectrum that
//! came with the dataset may cover any other range.
//!
//! Every series handed out here is reduced by the point-reduction factor, keeping every k-th
//! point. The reduction only affects what is displayed, never an export.

use crate::error::{DatasetRole, FringeError, Result};
use crate::fringes::{extract_fringe, remove_fringes, FringeBound, FringeSelection};
use crate::ratio::{absorbance, transmittance, AbsorbanceFloor};
use crate::series::{DataBlock, Dataset, DomainKind, Series};
use crate::transform::hermitian_forward;
use serde::{Deserialize, Serialize};

/// Spectral contribution of one fringe in both datasets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FringePreview {
    pub bound: FringeBound,
    pub sample_component: Series,
    pub background_component: Series,
    /// Largest interferogram value inside the bound, labels the fringe in a plot.
    pub sample_peak: Option<f64>,
    pub background_peak: Option<f64>,
}

/// Both single beams with the included fringes removed, and their ratios.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessedPreview {
    pub sample_single_beam: Series,
    pub background_single_beam: Series,
    pub transmittance: Series,
    pub absorbance: Series,
}

fn check_reduction(point_reduction: usize) -> Result<()> {
    if point_reduction == 0 {
        return Err(FringeError::InvalidFactor(
            "point-reduction factor must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn component_for(dataset: &Dataset, bound: &FringeBound, point_reduction: usize) -> Result<Series> {
    extract_fringe(dataset.interferogram(), bound)?.decimate(point_reduction)
}

/// Single beam of `dataset` as the Hermitian transform of its interferogram.
pub fn transformed_single_beam(dataset: &Dataset) -> Result<DataBlock> {
    let ifg = dataset.interferogram();
    let spectrum = hermitian_forward(ifg.series(), ifg.sampling_interval())?;
    Ok(ifg.derive(
        format!("{} single beam", dataset.role()),
        DomainKind::SingleBeamSpectrum,
        spectrum,
    ))
}

/// Computes the fringe component of `bound` for both datasets.
///
/// Each component shares the axis of its dataset's [`transformed_single_beam`].
pub fn preview_fringe(
    sample: &Dataset,
    background: &Dataset,
    bound: &FringeBound,
    point_reduction: usize,
) -> Result<FringePreview> {
    check_reduction(point_reduction)?;
    let sample_component = component_for(sample, bound, point_reduction)
        .map_err(|e| e.in_dataset(DatasetRole::Sample))?;
    let background_component = component_for(background, bound, point_reduction)
        .map_err(|e| e.in_dataset(DatasetRole::Background))?;
    let peak = |d: &Dataset| {
        d.interferogram()
            .series()
            .max_in_range(bound.start(), bound.end())
    };
    Ok(FringePreview {
        bound: *bound,
        sample_component,
        background_component,
        sample_peak: peak(sample),
        background_peak: peak(background),
    })
}

/// Removes the included fringes from the transformed single beam of both datasets.
///
/// Unlike an export nothing is padded or zero filled, each dataset keeps its own point count.
pub fn preview_processed(
    sample: &Dataset,
    background: &Dataset,
    selection: &FringeSelection,
    point_reduction: usize,
) -> Result<ProcessedPreview> {
    check_reduction(point_reduction)?;
    let clean = |d: &Dataset| {
        transformed_single_beam(d)
            .and_then(|sb| remove_fringes(&sb, d.interferogram(), selection))
            .map(|b| b.series().clone())
            .map_err(|e| e.in_dataset(d.role()))
    };
    let sample_single_beam = clean(sample)?;
    let background_single_beam = clean(background)?;
    let transmittance = transmittance(&sample_single_beam, &background_single_beam)?;
    let absorbance = absorbance(&transmittance, AbsorbanceFloor::default())?;

    Ok(ProcessedPreview {
        sample_single_beam: sample_single_beam.decimate(point_reduction)?,
        background_single_beam: background_single_beam.decimate(point_reduction)?,
        transmittance: transmittance.decimate(point_reduction)?,
        absorbance: absorbance.decimate(point_reduction)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::export;
    use crate::synthetic::{centerburst, dataset, inject_fringe, interferogram_series};
    use approx::assert_abs_diff_eq;

    /// Dataset whose stored spectrum only covers the middle half of the transformed band.
    fn dataset_with_partial_spectrum(role: DatasetRole, values: Vec<f64>) -> Dataset {
        let full = dataset(role, values);
        let spectrum = full.single_beam().series();
        let n = spectrum.len();
        let partial = Series::from_vecs(
            spectrum.x().iter().skip(n / 4).take(n / 2).copied().collect(),
            spectrum.y().iter().skip(n / 4).take(n / 2).copied().collect(),
        )
        .unwrap();
        Dataset::new(
            role,
            full.interferogram().clone(),
            DataBlock::new("partial", DomainKind::SingleBeamSpectrum, partial),
        )
        .unwrap()
    }

    #[test]
    fn test_fringe_preview_lengths_and_peaks() {
        let mut values = centerburst(512);
        inject_fringe(&mut values, 200, 220, 0.3);
        let sample = dataset(DatasetRole::Sample, values);
        let background = dataset(DatasetRole::Background, centerburst(256));
        let bound = FringeBound::new(200.0, 220.0).unwrap();

        let preview = preview_fringe(&sample, &background, &bound, 4).unwrap();
        assert_eq!(preview.sample_component.len(), 128);
        assert_eq!(preview.background_component.len(), 64);
        assert!(preview.sample_peak.unwrap() > 0.1);
        assert!(preview.background_peak.unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_processed_preview_is_reduced() {
        let sample = dataset(DatasetRole::Sample, centerburst(300));
        let background = dataset(DatasetRole::Background, centerburst(300));
        let selection: FringeSelection = [FringeBound::new(100.0, 120.0).unwrap()]
            .into_iter()
            .collect();
        let preview = preview_processed(&sample, &background, &selection, 3).unwrap();
        assert_eq!(preview.sample_single_beam.len(), 100);
        assert_eq!(preview.transmittance.len(), 100);
        assert!(preview.transmittance.y().iter().all(|v| *v == 1.0));
    }

    #[test]
    fn test_stored_spectrum_range_does_not_matter() {
        let clean = centerburst(1024);
        let mut contaminated = clean.clone();
        inject_fringe(&mut contaminated, 200, 220, 0.2);
        let sample = dataset_with_partial_spectrum(DatasetRole::Sample, contaminated);
        let background = dataset_with_partial_spectrum(DatasetRole::Background, clean.clone());
        let selection: FringeSelection = [FringeBound::new(200.0, 220.0).unwrap()]
            .into_iter()
            .collect();

        let preview = preview_processed(&sample, &background, &selection, 1).unwrap();
        let reference = hermitian_forward(&interferogram_series(clean), None).unwrap();
        assert_eq!(preview.sample_single_beam.x(), reference.x());
        for (a, b) in preview
            .sample_single_beam
            .y()
            .iter()
            .zip(reference.y().iter())
        {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }

        let exported = export(&sample, &background, &selection, 1).unwrap();
        for (a, b) in preview
            .sample_single_beam
            .y()
            .iter()
            .zip(exported.sample_single_beam.y().iter())
        {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }

        let bound = FringeBound::new(200.0, 220.0).unwrap();
        let fringe = preview_fringe(&sample, &background, &bound, 1).unwrap();
        assert_eq!(fringe.sample_component.x(), reference.x());
    }

    #[test]
    fn test_zero_point_reduction_is_rejected() {
        let sample = dataset(DatasetRole::Sample, centerburst(32));
        let bound = FringeBound::new(1.0, 2.0).unwrap();
        assert!(matches!(
            preview_fringe(&sample, &sample, &bound, 0),
            Err(FringeError::InvalidFactor(_))
        ));
    }
}
