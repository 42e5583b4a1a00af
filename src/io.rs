//! Reading and writing of two-column data point tables (`.dpt`).

use crate::error::{DatasetRole, FringeError};
use crate::export::ProcessedResult;
use crate::fringes::{FringeBound, FringeSelection};
use crate::series::{DataBlock, Dataset, DomainKind, InstrumentParameters, Series};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{path}: row {row}: {reason}")]
    Parse {
        path: PathBuf,
        row: usize,
        reason: String,
    },

    #[error(transparent)]
    Core(#[from] FringeError),
}

/// Reads all rows of a headerless, comma separated two-column table.
fn read_pairs(path: &Path) -> Result<Vec<(f64, f64)>, TableError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b',')
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let row = result?;
        if row.len() < 2 {
            return Err(TableError::Parse {
                path: path.to_path_buf(),
                row: i + 1,
                reason: format!("expected two columns, found {}", row.len()),
            });
        }
        let parse = |field: &str| {
            field.parse::<f64>().map_err(|e| TableError::Parse {
                path: path.to_path_buf(),
                row: i + 1,
                reason: format!("'{field}': {e}"),
            })
        };
        rows.push((parse(&row[0])?, parse(&row[1])?));
    }
    Ok(rows)
}

/// Reads a table into a series, first column as the independent axis.
pub fn read_table(path: &Path) -> Result<Series, TableError> {
    let (x, y): (Vec<f64>, Vec<f64>) = read_pairs(path)?.into_iter().unzip();
    log::debug!("read {} rows from {:?}", x.len(), path);
    Ok(Series::from_vecs(x, y)?)
}

/// Writes a series with seven decimals per value.
pub fn write_table(path: &Path, series: &Series) -> Result<(), TableError> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_path(path)?;
    for (x, y) in series.x().iter().zip(series.y().iter()) {
        wtr.write_record(&[format!("{x:.7}"), format!("{y:.7}")])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Reads a list of fringe bounds, one `start,end` row each. All fringes are included.
pub fn read_fringes(path: &Path) -> Result<FringeSelection, TableError> {
    let mut selection = FringeSelection::new();
    for (i, (start, end)) in read_pairs(path)?.into_iter().enumerate() {
        let bound = FringeBound::new(start, end).map_err(|e| TableError::Parse {
            path: path.to_path_buf(),
            row: i + 1,
            reason: e.to_string(),
        })?;
        selection.include(bound);
    }
    Ok(selection)
}

pub fn write_fringes(path: &Path, bounds: &[FringeBound]) -> Result<(), TableError> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_path(path)?;
    for bound in bounds {
        wtr.write_record(&[bound.start().to_string(), bound.end().to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the five output tables of an export next to `base_path`.
///
/// The file names start with the stem of `base_path`, for example `run.dpt` gives
/// `run_ZFF2_TRANSMITTANCE.dpt`.
///
/// # Returns
/// The written paths in the order background, sample, transmittance, absorbance, fringes.
pub fn write_processed(result: &ProcessedResult, base_path: &Path) -> Result<Vec<PathBuf>, TableError> {
    let stem = base_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "export".to_string());
    let dir = base_path.parent().unwrap_or_else(|| Path::new(""));
    let zff = result.zero_fill_factor;
    let file = |suffix: &str| dir.join(format!("{stem}_{suffix}.dpt"));

    let tables = [
        (
            file(&format!("ZFF{zff}_SINGLE_BEAM_BACKGROUND")),
            &result.background_single_beam,
        ),
        (
            file(&format!("ZFF{zff}_SINGLE_BEAM_SAMPLE")),
            &result.sample_single_beam,
        ),
        (file(&format!("ZFF{zff}_TRANSMITTANCE")), &result.transmittance),
        (file(&format!("ZFF{zff}_ABSORBANCE")), &result.absorbance),
    ];

    let mut written = Vec::with_capacity(tables.len() + 1);
    for (path, series) in tables {
        write_table(&path, series)?;
        written.push(path);
    }
    let fringes = file("REMOVED_FRINGES");
    write_fringes(&fringes, &result.removed_fringes)?;
    written.push(fringes);

    log::info!("saved {} files to {:?}", written.len(), dir);
    Ok(written)
}

/// Supplies the two data blocks of one acquisition.
pub trait DatasetSource {
    fn load(&self) -> Result<Dataset, TableError>;
}

/// Dataset read from an interferogram table and a single-beam table.
#[derive(Clone, Debug)]
pub struct DptDatasetSource {
    pub role: DatasetRole,
    pub interferogram: PathBuf,
    pub single_beam: PathBuf,
    pub parameters: Option<InstrumentParameters>,
}

impl DatasetSource for DptDatasetSource {
    fn load(&self) -> Result<Dataset, TableError> {
        let name = |p: &Path| {
            p.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default()
        };
        let mut ifg = DataBlock::new(
            name(&self.interferogram),
            DomainKind::Interferogram,
            read_table(&self.interferogram)?,
        );
        let mut sb = DataBlock::new(
            name(&self.single_beam),
            DomainKind::SingleBeamSpectrum,
            read_table(&self.single_beam)?,
        );
        if let Some(parameters) = self.parameters {
            ifg = ifg.with_parameters(parameters);
            sb = sb.with_parameters(parameters);
        }
        log::info!(
            "loaded {} dataset: {} interferogram points, {} spectrum points",
            self.role,
            ifg.series().len(),
            sb.series().len()
        );
        Ok(Dataset::new(self.role, ifg, sb)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::export;
    use crate::synthetic::{centerburst, dataset};
    use std::fs;

    #[test]
    fn test_table_round_trip_with_seven_decimals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.dpt");
        let s = Series::from_vecs(vec![400.0, 400.5, 401.0], vec![1.0, 0.123456789, -2.0]).unwrap();
        write_table(&path, &s).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().next(), Some("400.0000000,1.0000000"));
        assert_eq!(text.lines().nth(1), Some("400.5000000,0.1234568"));

        let back = read_table(&path).unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back.y()[1], 0.1234568);
    }

    #[test]
    fn test_reader_tolerates_whitespace_and_names_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spaced.dpt");
        fs::write(&path, "1.0, 2.0\n 2.0 ,3.5\n").unwrap();
        assert_eq!(read_table(&path).unwrap().y()[1], 3.5);

        fs::write(&path, "1.0,2.0\n2.0,abc\n").unwrap();
        match read_table(&path) {
            Err(TableError::Parse { row, .. }) => assert_eq!(row, 2),
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_write_processed_names_five_files() {
        let dir = tempfile::tempdir().unwrap();
        let sample = dataset(DatasetRole::Sample, centerburst(128));
        let background = dataset(DatasetRole::Background, centerburst(128));
        let selection: FringeSelection = [FringeBound::new(60.0, 70.0).unwrap()]
            .into_iter()
            .collect();
        let result = export(&sample, &background, &selection, 2).unwrap();

        let written = write_processed(&result, &dir.path().join("run.dpt")).unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "run_ZFF2_SINGLE_BEAM_BACKGROUND.dpt",
                "run_ZFF2_SINGLE_BEAM_SAMPLE.dpt",
                "run_ZFF2_TRANSMITTANCE.dpt",
                "run_ZFF2_ABSORBANCE.dpt",
                "run_REMOVED_FRINGES.dpt",
            ]
        );
        assert!(written.iter().all(|p| p.exists()));
        assert_eq!(read_table(&written[2]).unwrap().len(), 256);
        let fringes = read_fringes(&written[4]).unwrap();
        assert_eq!(fringes, selection);
    }

    #[test]
    fn test_dpt_source_builds_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let d = dataset(DatasetRole::Sample, centerburst(64));
        let ifg_path = dir.path().join("ifg.dpt");
        let sb_path = dir.path().join("sb.dpt");
        write_table(&ifg_path, d.interferogram().series()).unwrap();
        write_table(&sb_path, d.single_beam().series()).unwrap();

        let source = DptDatasetSource {
            role: DatasetRole::Sample,
            interferogram: ifg_path,
            single_beam: sb_path,
            parameters: Some(InstrumentParameters::new(15798.0, 2.0).unwrap()),
        };
        let loaded = source.load().unwrap();
        assert_eq!(loaded.role(), DatasetRole::Sample);
        assert_eq!(loaded.interferogram().series().len(), 64);
        assert!(loaded.interferogram().sampling_interval().is_some());
    }
}
