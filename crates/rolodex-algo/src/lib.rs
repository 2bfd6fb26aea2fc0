//! Rolodex Algorithm Core
//!
//! Instrumented search and sort over the displayed list of records.
//!
//! # Model
//!
//! A [`RecordList`] is the list as it is displayed: index order is visual
//! order and ids are unique. Algorithms never mutate it; they return plans
//! that a driver replays with its own visual side effects.
//!
//! - **Search**: [`linear_search`] and [`binary_search`] return the ordered
//!   [`Probe`]s they made plus the found index.
//! - **Sort**: [`generate_steps`] runs a Lomuto quicksort and records a
//!   [`Step`] (full snapshot + highlighted pair) after every swap.
//! - **Metrics**: [`MetricsRecorder`] times a run and subtracts the delay a
//!   driver injected per visit or per step.
//!
//! # Usage
//!
//! ```
//! use rolodex_algo::{by_name, generate_steps, linear_search, Record, RecordList};
//!
//! let list = RecordList::new(vec![
//!     Record::new(1, "Bea"),
//!     Record::new(2, "Ana"),
//!     Record::new(3, "Cid"),
//! ])?;
//!
//! let sorted = generate_steps(&list, by_name);
//! assert_eq!(sorted.swaps, 2);
//!
//! let found = linear_search(&list, "cid", Record::name);
//! assert_eq!(found.found_index, Some(2));
//! # Ok::<(), rolodex_algo::Error>(())
//! ```

mod error;
mod metrics;
mod record;
mod search;
mod sort;
mod step;

pub use error::{Error, Result};
pub use metrics::{Algorithm, MetricsRecorder, RunMetrics, Stopwatch};
pub use record::{by_name, by_name_desc, compare_keys, normalize_key, HighlightSet, Record, RecordId, RecordList};
pub use search::{binary_search, linear_search, SearchOutcome};
pub use sort::{generate_steps, instant_sort, SortOutcome};
pub use step::{Probe, Step, Verdict};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_list_supports_binary_search() {
        let list = RecordList::new(vec![
            Record::new(1, "Bea"),
            Record::new(2, "Ana"),
            Record::new(3, "Cid"),
        ])
        .unwrap();

        let outcome = generate_steps(&list, by_name);
        let sorted = outcome.final_state().unwrap();
        assert!(sorted.is_sorted_by_key(Record::name));

        for (index, record) in sorted.iter().enumerate() {
            let found = binary_search(sorted, &record.name, Record::name);
            assert_eq!(found.found_index, Some(index));
        }
    }
}
