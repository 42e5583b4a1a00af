//! Localized interference fringes: their bounds, their spectral contribution and its removal.

pub mod bound;
pub mod extract;
pub mod remove;

pub use bound::{FringeBound, FringeEntry, FringeSelection, FringeState};
pub use extract::extract_fringe;
pub use remove::remove_fringes;
