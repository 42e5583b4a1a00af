//! This module defines the data model of the pipeline: the `Series` holding an independent and a
//! dependent axis, the `DataBlock` tagging a series with its domain, and the `Dataset` pairing the
//! interferogram and single-beam spectrum of one acquisition.
//!
//! All types are immutable once constructed. Every derived result is a freshly allocated value.

use crate::error::{DatasetRole, FringeError, Result};
use ndarray::{s, Array1, Zip};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// An ordered pair of equal-length numeric sequences.
///
/// # Invariants
/// - `x` and `y` have identical length >= 1.
/// - All values are finite.
/// - `x` is monotonically non-decreasing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries")]
pub struct Series {
    x: Array1<f64>,
    y: Array1<f64>,
}

/// Deserialized axes, checked by `Series::new` before use.
#[derive(Deserialize)]
struct RawSeries {
    x: Array1<f64>,
    y: Array1<f64>,
}

impl TryFrom<RawSeries> for Series {
    type Error = FringeError;

    fn try_from(raw: RawSeries) -> Result<Self> {
        Series::new(raw.x, raw.y)
    }
}

impl Series {
    /// Creates a new series, checking all invariants.
    ///
    /// # Arguments
    /// - `x`: The independent axis (wavenumber or optical path position).
    /// - `y`: The dependent axis (intensity).
    ///
    /// # Returns
    /// The series, or `FringeError::InvalidInput` if an invariant is violated.
    pub fn new(x: Array1<f64>, y: Array1<f64>) -> Result<Series> {
        if x.is_empty() || y.is_empty() {
            return Err(FringeError::InvalidInput("series must not be empty".to_string()));
        }
        if x.len() != y.len() {
            return Err(FringeError::InvalidInput(format!(
                "axis length {} does not match value length {}",
                x.len(),
                y.len()
            )));
        }
        if let Some(i) = x.iter().position(|v| !v.is_finite()) {
            return Err(FringeError::InvalidInput(format!(
                "non-finite axis value at index {i}"
            )));
        }
        if let Some(i) = y.iter().position(|v| !v.is_finite()) {
            return Err(FringeError::InvalidInput(format!(
                "non-finite value at index {i}"
            )));
        }
        if let Some(i) = x
            .windows(2)
            .into_iter()
            .position(|w| w[1] < w[0])
        {
            return Err(FringeError::InvalidInput(format!(
                "axis is decreasing at index {}",
                i + 1
            )));
        }
        Ok(Series { x, y })
    }

    pub fn from_vecs(x: Vec<f64>, y: Vec<f64>) -> Result<Series> {
        Series::new(Array1::from_vec(x), Array1::from_vec(y))
    }

    /// Creates a series on a uniform axis `start + i * step`.
    pub fn uniform(values: Vec<f64>, start: f64, step: f64) -> Result<Series> {
        let n = values.len();
        let x = Array1::from_shape_fn(n, |i| start + i as f64 * step);
        Series::new(x, Array1::from_vec(values))
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    /// Always false, a series holds at least one point.
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn x(&self) -> &Array1<f64> {
        &self.x
    }

    pub fn y(&self) -> &Array1<f64> {
        &self.y
    }

    /// Average spacing of the independent axis. A single point has step 1.
    pub fn step(&self) -> f64 {
        let n = self.len();
        if n < 2 {
            return 1.0;
        }
        (self.x[n - 1] - self.x[0]) / (n - 1) as f64
    }

    pub fn first_x(&self) -> f64 {
        self.x[0]
    }

    pub fn last_x(&self) -> f64 {
        self.x[self.len() - 1]
    }

    /// Returns a new series on the same axis with different values.
    pub fn with_values(&self, y: Array1<f64>) -> Result<Series> {
        Series::new(self.x.clone(), y)
    }

    /// Number of leading points whose axis value is `<= value`.
    pub fn count_up_to(&self, value: f64) -> usize {
        self.x.iter().take_while(|&&x| x <= value).count()
    }

    /// Number of leading points whose axis value is `< value`.
    pub fn count_below(&self, value: f64) -> usize {
        self.x.iter().take_while(|&&x| x < value).count()
    }

    /// Keeps the first `count` points. Returns `None` if `count` is zero.
    pub fn truncate(&self, count: usize) -> Option<Series> {
        if count == 0 {
            return None;
        }
        let count = count.min(self.len());
        Some(Series {
            x: self.x.slice(s![..count]).to_owned(),
            y: self.y.slice(s![..count]).to_owned(),
        })
    }

    /// Point-wise `self - other` on the axis of `self`.
    pub fn subtract(&self, other: &Series) -> Result<Series> {
        if self.len() != other.len() {
            return Err(FringeError::LengthMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        let mut y = self.y.clone();
        Zip::from(&mut y).and(&other.y).for_each(|a, b| *a -= *b);
        self.with_values(y)
    }

    /// Keeps every `factor`-th point, starting with the first one.
    ///
    /// # Arguments
    /// - `factor`: The point-reduction factor. Must be at least 1.
    pub fn decimate(&self, factor: usize) -> Result<Series> {
        if factor == 0 {
            return Err(FringeError::InvalidFactor(
                "point-reduction factor must be at least 1".to_string(),
            ));
        }
        if factor == 1 {
            return Ok(self.clone());
        }
        Ok(Series {
            x: self.x.slice(s![..;factor as isize]).to_owned(),
            y: self.y.slice(s![..;factor as isize]).to_owned(),
        })
    }

    /// Largest dependent value with `start <= x <= end`.
    pub fn max_in_range(&self, start: f64, end: f64) -> Option<f64> {
        self.x
            .iter()
            .zip(self.y.iter())
            .filter(|(x, _)| **x >= start && **x <= end)
            .map(|(_, y)| *y)
            .fold(None, |acc: Option<f64>, y| Some(acc.map_or(y, |m| m.max(y))))
    }
}

/// The domain a data block lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainKind {
    /// Intensity versus optical path difference.
    Interferogram,
    /// Intensity versus wavenumber.
    SingleBeamSpectrum,
}

impl Display for DomainKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainKind::Interferogram => {
                write!(f, "interferogram")
            }
            DomainKind::SingleBeamSpectrum => {
                write!(f, "single beam spectrum")
            }
        }
    }
}

/// Acquisition parameters of the interferometer.
///
/// # Fields
/// - `laser_wavenumber`: Wavenumber of the reference laser (LWN) in cm^-1.
/// - `sample_spacing`: Number of laser fringes between two samples (SSP).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstrumentParameters {
    pub laser_wavenumber: f64,
    pub sample_spacing: f64,
}

impl InstrumentParameters {
    pub fn new(laser_wavenumber: f64, sample_spacing: f64) -> Result<InstrumentParameters> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(laser_wavenumber) || !valid(sample_spacing) {
            return Err(FringeError::InvalidInput(format!(
                "instrument parameters must be positive, got LWN={laser_wavenumber}, SSP={sample_spacing}"
            )));
        }
        Ok(InstrumentParameters {
            laser_wavenumber,
            sample_spacing,
        })
    }

    /// Optical path difference between two interferogram points in cm.
    pub fn sampling_interval(&self) -> f64 {
        self.sample_spacing / (2.0 * self.laser_wavenumber)
    }
}

/// A named series tagged with its domain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataBlock {
    name: String,
    kind: DomainKind,
    series: Series,
    parameters: Option<InstrumentParameters>,
}

impl DataBlock {
    pub fn new(name: impl Into<String>, kind: DomainKind, series: Series) -> DataBlock {
        DataBlock {
            name: name.into(),
            kind,
            series,
            parameters: None,
        }
    }

    pub fn with_parameters(mut self, parameters: InstrumentParameters) -> DataBlock {
        self.parameters = Some(parameters);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DomainKind {
        self.kind
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn parameters(&self) -> Option<&InstrumentParameters> {
        self.parameters.as_ref()
    }

    /// Sampling interval given by the instrument parameters, if any.
    pub fn sampling_interval(&self) -> Option<f64> {
        self.parameters.map(|p| p.sampling_interval())
    }

    /// Creates a new block of the given kind that keeps the parameters of `self`.
    pub fn derive(&self, name: impl Into<String>, kind: DomainKind, series: Series) -> DataBlock {
        DataBlock {
            name: name.into(),
            kind,
            series,
            parameters: self.parameters,
        }
    }

    pub(crate) fn expect_kind(&self, kind: DomainKind) -> Result<()> {
        if self.kind != kind {
            return Err(FringeError::InvalidInput(format!(
                "block '{}' is a {}, expected a {}",
                self.name, self.kind, kind
            )));
        }
        Ok(())
    }
}

/// The interferogram and single-beam spectrum of one acquisition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    role: DatasetRole,
    interferogram: DataBlock,
    single_beam: DataBlock,
}

impl Dataset {
    /// Pairs the two blocks of one acquisition.
    ///
    /// The blocks are trusted to come from the same acquisition. A point count mismatch is
    /// only reported in the log.
    pub fn new(role: DatasetRole, interferogram: DataBlock, single_beam: DataBlock) -> Result<Dataset> {
        interferogram.expect_kind(DomainKind::Interferogram)?;
        single_beam.expect_kind(DomainKind::SingleBeamSpectrum)?;
        if interferogram.series().len() != single_beam.series().len() {
            log::debug!(
                "{role} dataset: interferogram has {} points, single beam has {}",
                interferogram.series().len(),
                single_beam.series().len()
            );
        }
        Ok(Dataset {
            role,
            interferogram,
            single_beam,
        })
    }

    pub fn role(&self) -> DatasetRole {
        self.role
    }

    pub fn interferogram(&self) -> &DataBlock {
        &self.interferogram
    }

    pub fn single_beam(&self) -> &DataBlock {
        &self.single_beam
    }
}
