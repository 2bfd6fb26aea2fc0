//! Linear and binary search over the displayed list.
//!
//! Both searches compare normalized keys (trimmed, lowercased) and return
//! the full probe sequence alongside the outcome, so a driver can replay
//! each visit with its visual side effects in the order it happened.
//!
//! A target that matches nothing is a normal outcome: `found_index` is
//! `None` and every visit is still counted.

use std::cmp::Ordering;

use crate::metrics::MetricsRecorder;
use crate::record::{normalize_key, Record, RecordList};
use crate::step::{Probe, Verdict};

/// Result of one search run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchOutcome {
    pub found_index: Option<usize>,
    pub visited_count: usize,
    pub elapsed_ms: f64,
    /// Visits in the order they were made.
    pub probes: Vec<Probe>,
}

impl SearchOutcome {
    pub(crate) fn from_probes(probes: Vec<Probe>) -> Self {
        let found_index = probes
            .last()
            .filter(|p| p.verdict == Verdict::Match)
            .map(|p| p.index);
        Self {
            found_index,
            visited_count: probes.len(),
            elapsed_ms: 0.0,
            probes,
        }
    }

    pub fn is_found(&self) -> bool {
        self.found_index.is_some()
    }
}

/// Scan from index 0 upward until the first match.
///
/// For a target at index `i`, `visited_count == i + 1`; for an absent
/// target it equals the list length.
pub fn linear_search<K>(records: &RecordList, target: &str, key: K) -> SearchOutcome
where
    K: Fn(&Record) -> &str,
{
    MetricsRecorder::immediate().record_search(|| {
        let target = normalize_key(target);
        let mut probes = Vec::new();
        for (index, record) in records.iter().enumerate() {
            let matched = normalize_key(key(record)) == target;
            probes.push(Probe {
                index,
                id: record.id,
                verdict: if matched { Verdict::Match } else { Verdict::Miss },
            });
            if matched {
                break;
            }
        }
        SearchOutcome::from_probes(probes)
    })
}

/// Halving search over a list sorted ascending by the same key.
///
/// The sortedness precondition is not checked; on an unsorted list the
/// result may be wrong or the target missed. Each iteration counts as one
/// visit, so an absent target costs at most `ceil(log2(n + 1))` visits.
pub fn binary_search<K>(records: &RecordList, target: &str, key: K) -> SearchOutcome
where
    K: Fn(&Record) -> &str,
{
    MetricsRecorder::immediate().record_search(|| {
        let target = normalize_key(target);
        let mut probes = Vec::new();
        if records.is_empty() {
            return SearchOutcome::from_probes(probes);
        }

        let items = records.as_slice();
        let mut low = 0usize;
        let mut high = items.len() - 1;
        while low <= high {
            let mid = low + (high - low) / 2;
            let record = &items[mid];
            let verdict = match normalize_key(key(record)).as_str().cmp(target.as_str()) {
                Ordering::Equal => Verdict::Match,
                Ordering::Greater => Verdict::GoLower,
                Ordering::Less => Verdict::GoHigher,
            };
            probes.push(Probe {
                index: mid,
                id: record.id,
                verdict,
            });
            match verdict {
                Verdict::Match => break,
                Verdict::GoLower if mid == 0 => break,
                Verdict::GoLower => high = mid - 1,
                _ => low = mid + 1,
            }
        }
        SearchOutcome::from_probes(probes)
    })
}
