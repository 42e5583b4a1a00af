//! Fringe bounds and the user's fringe selection.

use crate::error::FringeError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Position of one fringe on the interferogram axis, `start < end`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct FringeBound {
    start: f64,
    end: f64,
}

impl FringeBound {
    pub fn new(start: f64, end: f64) -> Result<FringeBound, FringeError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(FringeError::InvalidBound {
                start,
                end,
                reason: "bounds must be finite".to_string(),
            });
        }
        if start >= end {
            return Err(FringeError::InvalidBound {
                start,
                end,
                reason: "start must be smaller than end".to_string(),
            });
        }
        Ok(FringeBound { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }
}

impl TryFrom<[f64; 2]> for FringeBound {
    type Error = FringeError;

    fn try_from(value: [f64; 2]) -> Result<Self, Self::Error> {
        FringeBound::new(value[0], value[1])
    }
}

impl From<FringeBound> for [f64; 2] {
    fn from(bound: FringeBound) -> Self {
        [bound.start, bound.end]
    }
}

impl PartialEq for FringeBound {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FringeBound {}

impl PartialOrd for FringeBound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FringeBound {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .total_cmp(&other.start)
            .then(self.end.total_cmp(&other.end))
    }
}

impl std::hash::Hash for FringeBound {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.start.to_bits().hash(state);
        self.end.to_bits().hash(state);
    }
}

impl Display for FringeBound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Whether a fringe takes part in the removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FringeState {
    Included,
    Excluded,
}

/// Serialized form of one selection entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FringeEntry {
    pub bound: FringeBound,
    pub state: FringeState,
}

/// The set of localized fringes, each either included in or excluded from removal.
///
/// A bound pair identifies a fringe; inserting it again only updates its state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<FringeEntry>", into = "Vec<FringeEntry>")]
pub struct FringeSelection {
    fringes: BTreeMap<FringeBound, FringeState>,
}

impl From<Vec<FringeEntry>> for FringeSelection {
    fn from(entries: Vec<FringeEntry>) -> Self {
        FringeSelection {
            fringes: entries.into_iter().map(|e| (e.bound, e.state)).collect(),
        }
    }
}

impl From<FringeSelection> for Vec<FringeEntry> {
    fn from(selection: FringeSelection) -> Self {
        selection
            .fringes
            .into_iter()
            .map(|(bound, state)| FringeEntry { bound, state })
            .collect()
    }
}

impl FringeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fringe as included, or re-includes a known one.
    pub fn include(&mut self, bound: FringeBound) {
        self.fringes.insert(bound, FringeState::Included);
    }

    /// Adds a fringe as excluded, or excludes a known one.
    pub fn exclude(&mut self, bound: FringeBound) {
        self.fringes.insert(bound, FringeState::Excluded);
    }

    pub fn set_state(&mut self, bound: FringeBound, state: FringeState) {
        self.fringes.insert(bound, state);
    }

    /// Forgets a fringe. Returns whether it was known.
    pub fn remove(&mut self, bound: &FringeBound) -> bool {
        self.fringes.remove(bound).is_some()
    }

    pub fn state(&self, bound: &FringeBound) -> Option<FringeState> {
        self.fringes.get(bound).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FringeBound, &FringeState)> {
        self.fringes.iter()
    }

    /// Included bounds in ascending order.
    pub fn included(&self) -> impl Iterator<Item = &FringeBound> {
        self.fringes
            .iter()
            .filter(|(_, state)| **state == FringeState::Included)
            .map(|(bound, _)| bound)
    }

    pub fn len(&self) -> usize {
        self.fringes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fringes.is_empty()
    }
}

impl FromIterator<FringeBound> for FringeSelection {
    fn from_iter<T: IntoIterator<Item = FringeBound>>(iter: T) -> Self {
        let mut selection = FringeSelection::new();
        for bound in iter {
            selection.include(bound);
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_validation() {
        assert!(FringeBound::new(1.0, 2.0).is_ok());
        assert!(matches!(
            FringeBound::new(2.0, 2.0),
            Err(FringeError::InvalidBound { .. })
        ));
        assert!(FringeBound::new(3.0, 2.0).is_err());
        assert!(FringeBound::new(f64::NAN, 2.0).is_err());
    }

    #[test]
    fn test_selection_identity_is_the_bound_pair() {
        let a = FringeBound::new(500.0, 520.0).unwrap();
        let b = FringeBound::new(100.0, 110.0).unwrap();
        let mut selection = FringeSelection::new();
        selection.include(a);
        selection.include(b);
        selection.exclude(FringeBound::new(500.0, 520.0).unwrap());
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.state(&a), Some(FringeState::Excluded));
        assert_eq!(selection.included().copied().collect::<Vec<_>>(), vec![b]);

        let reversed: FringeSelection = [b, a].into_iter().collect();
        let ordered: FringeSelection = [a, b].into_iter().collect();
        assert_eq!(reversed, ordered);
    }

    #[test]
    fn test_selection_serde_round_trip() {
        let mut selection = FringeSelection::new();
        selection.include(FringeBound::new(500.0, 520.0).unwrap());
        selection.exclude(FringeBound::new(700.0, 705.5).unwrap());
        let mut buffer = Vec::new();
        preferences::Preferences::save_to(&selection, &mut buffer).unwrap();
        let restored: FringeSelection =
            preferences::Preferences::load_from(&mut buffer.as_slice()).unwrap();
        assert_eq!(restored, selection);
    }
}
