//! Snapshots recorded while a sort runs, and probes recorded while a
//! search runs.

use crate::record::{HighlightSet, RecordId, RecordList};

/// One intermediate state of a sort run.
///
/// `state` is the full arrangement after the mutation that produced the
/// step; every id in `highlight` is present in `state`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step {
    pub state: RecordList,
    pub highlight: HighlightSet,
}

impl Step {
    /// Record a step emphasizing the given pair of ids.
    pub(crate) fn pair(state: RecordList, a: RecordId, b: RecordId) -> Self {
        Self {
            state,
            highlight: [a, b].into_iter().collect(),
        }
    }
}

/// What a search concluded at one visited index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Verdict {
    /// The element matched the target.
    Match,
    /// Linear search: not the target, keep scanning.
    Miss,
    /// Binary search: element sorts after the target, discard the upper half.
    GoLower,
    /// Binary search: element sorts before the target, discard the lower half.
    GoHigher,
}

/// One visit of a search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Probe {
    pub index: usize,
    pub id: RecordId,
    pub verdict: Verdict,
}
