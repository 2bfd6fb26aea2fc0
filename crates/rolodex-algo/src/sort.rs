//! Step-recording quicksort (Lomuto partition).
//!
//! # Partition
//!
//! The pivot is the last element of the range. Each element before it is
//! compared once against the pivot; elements that do not sort after it are
//! moved to the growing left block. A swap only happens (and a step is only
//! recorded) when the element is not already at the block boundary.
//!
//! The closing pivot exchange is always counted and always recorded, even
//! when the pivot is already in place. Every range of two or more elements
//! is partitioned at least once, so the step log is empty exactly when the
//! input has zero or one element.
//!
//! # Stability
//!
//! Comparator ties are broken by original input position, so the final
//! arrangement equals a stable sort of the input.
//!
//! # Recursion
//!
//! Ranges are processed from an explicit stack, left range before right
//! range, which yields the same step sequence as the recursive formulation
//! without its depth limit on already-sorted input.

use std::cmp::Ordering;

use crate::metrics::MetricsRecorder;
use crate::record::{Record, RecordList};
use crate::step::Step;

/// Result of one sort run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SortOutcome {
    pub steps: Vec<Step>,
    pub comparisons: usize,
    pub swaps: usize,
    pub elapsed_ms: f64,
}

impl SortOutcome {
    /// Arrangement after the last recorded step, if any step was recorded.
    pub fn final_state(&self) -> Option<&RecordList> {
        self.steps.last().map(|step| &step.state)
    }
}

/// Working state threaded through the partitions of one run.
struct SortRun<F> {
    /// Records paired with their original input position.
    items: Vec<(usize, Record)>,
    compare: F,
    steps: Vec<Step>,
    comparisons: usize,
    swaps: usize,
}

impl<F> SortRun<F>
where
    F: FnMut(&Record, &Record) -> Ordering,
{
    fn new(records: &RecordList, compare: F) -> Self {
        Self {
            items: records.iter().cloned().enumerate().collect(),
            compare,
            steps: Vec::new(),
            comparisons: 0,
            swaps: 0,
        }
    }

    fn sort(mut self) -> SortOutcome {
        let mut pending = Vec::new();
        if self.items.len() > 1 {
            pending.push((0, self.items.len() - 1));
        }

        while let Some((low, high)) = pending.pop() {
            if low >= high {
                continue;
            }
            let pivot = self.partition(low, high);
            if pivot < high {
                pending.push((pivot + 1, high));
            }
            if pivot > low {
                pending.push((low, pivot - 1));
            }
        }

        SortOutcome {
            steps: self.steps,
            comparisons: self.comparisons,
            swaps: self.swaps,
            elapsed_ms: 0.0,
        }
    }

    fn partition(&mut self, low: usize, high: usize) -> usize {
        let mut boundary = low;
        for j in low..high {
            if self.compare_at(j, high) != Ordering::Greater {
                if boundary != j {
                    self.swap_and_record(boundary, j);
                }
                boundary += 1;
            }
        }
        self.swap_and_record(boundary, high);
        boundary
    }

    fn compare_at(&mut self, a: usize, b: usize) -> Ordering {
        self.comparisons += 1;
        let (pos_a, rec_a) = &self.items[a];
        let (pos_b, rec_b) = &self.items[b];
        (self.compare)(rec_a, rec_b).then(pos_a.cmp(pos_b))
    }

    fn swap_and_record(&mut self, a: usize, b: usize) {
        self.items.swap(a, b);
        self.swaps += 1;
        let state = RecordList::from_unchecked(self.items.iter().map(|(_, r)| r.clone()).collect());
        self.steps.push(Step::pair(state, self.items[a].1.id, self.items[b].1.id));
    }
}

/// Sort `records` with `compare`, recording every intermediate state.
///
/// The step sequence and counts are fully determined by the input and the
/// comparator.
pub fn generate_steps<F>(records: &RecordList, compare: F) -> SortOutcome
where
    F: FnMut(&Record, &Record) -> Ordering,
{
    MetricsRecorder::immediate().record_sort(|| SortRun::new(records, compare).sort())
}

/// Jump straight to the final order without recording steps.
///
/// Uses the standard library's stable sort. Counts are approximate:
/// `comparisons` is the input length and `swaps` is zero.
pub fn instant_sort<F>(records: &RecordList, mut compare: F) -> (RecordList, SortOutcome)
where
    F: FnMut(&Record, &Record) -> Ordering,
{
    let mut sorted = None;
    let outcome = MetricsRecorder::immediate().record_sort(|| {
        let mut items = records.as_slice().to_vec();
        items.sort_by(|a, b| compare(a, b));
        sorted = Some(RecordList::from_unchecked(items));
        SortOutcome {
            steps: Vec::new(),
            comparisons: records.len(),
            swaps: 0,
            elapsed_ms: 0.0,
        }
    });
    (sorted.unwrap_or_default(), outcome)
}
