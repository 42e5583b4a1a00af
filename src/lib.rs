//! Extraction and removal of interference fringes from FTIR single-beam spectra.
//!
//! The numerical pipeline consists of pure functions over immutable [`series::Series`]:
//! Hermitian and complex transforms, zero filling, spectral alignment, fringe extraction and
//! removal, and the transmittance and absorbance ratios. [`export::export`] chains them into
//! the final result. [`data_thread::main_thread`] runs the same pipeline behind a command
//! channel for interactive front-ends.

pub mod align;
pub mod cancellable_loops;
pub mod config;
pub mod data_thread;
pub mod error;
pub mod export;
pub mod fringes;
pub mod io;
pub mod preview;
pub mod ratio;
pub mod series;
pub mod transform;
pub mod zero_fill;

#[cfg(test)]
mod synthetic;

pub use error::{DatasetRole, FringeError};
pub use export::{export, export_with, ExportOptions, ProcessedResult};
pub use fringes::{FringeBound, FringeSelection, FringeState};
pub use series::{DataBlock, Dataset, DomainKind, InstrumentParameters, Series};
