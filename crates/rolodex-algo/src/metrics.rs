//! Run timing with animation delay factored out.
//!
//! Every visual side effect of a run (a probe highlight, a sort step's
//! transition and pause) injects delay that is not algorithm time. Two
//! ways of removing it are supported:
//!
//! - A constant per-step delay known in advance: the recorder subtracts
//!   `units * per_step_delay`, where `units` is the visit count for
//!   searches and the step count for sorts.
//! - Measured playback: the driver times each visual side effect and
//!   passes it to [`Stopwatch::exclude`].
//!
//! Both subtractions saturate at zero.

use std::time::{Duration, Instant};

use crate::search::SearchOutcome;
use crate::sort::SortOutcome;

/// Start timestamp of a measured run, less any excluded intervals.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
    excluded: Duration,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            excluded: Duration::ZERO,
        }
    }

    /// Leave `interval` out of the reported time.
    pub fn exclude(&mut self, interval: Duration) {
        self.excluded = self.excluded.saturating_add(interval);
    }

    /// Time since start, minus every excluded interval.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed().saturating_sub(self.excluded)
    }
}

/// Wraps search and sort runs and stamps their outcomes with elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsRecorder {
    per_step_delay: Duration,
}

impl MetricsRecorder {
    /// Recorder for runs whose every step injects `per_step_delay`.
    pub const fn new(per_step_delay: Duration) -> Self {
        Self { per_step_delay }
    }

    /// Recorder for runs without visual delay.
    pub const fn immediate() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn per_step_delay(&self) -> Duration {
        self.per_step_delay
    }

    /// Take the start timestamp.
    pub fn start(&self) -> Stopwatch {
        Stopwatch::start()
    }

    /// Raw duration minus the delay injected by `units` steps, in milliseconds.
    pub fn adjusted_ms(&self, raw: Duration, units: usize) -> f64 {
        let injected = self
            .per_step_delay
            .checked_mul(u32::try_from(units).unwrap_or(u32::MAX))
            .unwrap_or(Duration::MAX);
        raw.saturating_sub(injected).as_secs_f64() * 1000.0
    }

    /// Stamp a search outcome measured from `stopwatch` until now.
    pub fn finish_search(&self, stopwatch: Stopwatch, mut outcome: SearchOutcome) -> SearchOutcome {
        outcome.elapsed_ms = self.adjusted_ms(stopwatch.elapsed(), outcome.visited_count);
        outcome
    }

    /// Stamp a sort outcome measured from `stopwatch` until now.
    pub fn finish_sort(&self, stopwatch: Stopwatch, mut outcome: SortOutcome) -> SortOutcome {
        outcome.elapsed_ms = self.adjusted_ms(stopwatch.elapsed(), outcome.steps.len());
        outcome
    }

    /// Time a synchronous search.
    pub fn record_search<F>(&self, run: F) -> SearchOutcome
    where
        F: FnOnce() -> SearchOutcome,
    {
        let stopwatch = self.start();
        let outcome = run();
        self.finish_search(stopwatch, outcome)
    }

    /// Time a synchronous sort.
    pub fn record_sort<F>(&self, run: F) -> SortOutcome
    where
        F: FnOnce() -> SortOutcome,
    {
        let stopwatch = self.start();
        let outcome = run();
        self.finish_sort(stopwatch, outcome)
    }
}

/// Which algorithm produced a [`RunMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Algorithm {
    LinearSearch,
    BinarySearch,
    QuickSort,
    /// The jump-to-final-order path; counts are approximate.
    InstantSort,
}

impl Algorithm {
    /// Human-readable label for metric panels.
    pub fn label(&self) -> &'static str {
        match self {
            Algorithm::LinearSearch => "Linear search",
            Algorithm::BinarySearch => "Binary search",
            Algorithm::QuickSort => "Quicksort",
            Algorithm::InstantSort => "Instant sort",
        }
    }
}

/// Flat metrics record for display.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunMetrics {
    pub algorithm: Algorithm,
    pub time_ms: f64,
    pub comparisons: usize,
    pub swaps: usize,
    pub steps: usize,
    pub visits: usize,
    pub found_index: Option<usize>,
}

impl RunMetrics {
    pub fn from_search(algorithm: Algorithm, outcome: &SearchOutcome) -> Self {
        Self {
            algorithm,
            time_ms: outcome.elapsed_ms,
            comparisons: outcome.visited_count,
            swaps: 0,
            steps: outcome.visited_count,
            visits: outcome.visited_count,
            found_index: outcome.found_index,
        }
    }

    pub fn from_sort(algorithm: Algorithm, outcome: &SortOutcome) -> Self {
        Self {
            algorithm,
            time_ms: outcome.elapsed_ms,
            comparisons: outcome.comparisons,
            swaps: outcome.swaps,
            steps: outcome.steps.len(),
            visits: 0,
            found_index: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopwatch_leaves_out_excluded_time() {
        let mut stopwatch = Stopwatch::start();
        stopwatch.exclude(Duration::from_secs(3600));
        assert_eq!(stopwatch.elapsed(), Duration::ZERO);

        let mut stopwatch = Stopwatch::start();
        let playback = Stopwatch::start();
        std::thread::sleep(Duration::from_millis(20));
        stopwatch.exclude(playback.elapsed());
        assert!(stopwatch.elapsed() < Duration::from_millis(20));
    }

    #[test]
    fn subtracts_injected_delay() {
        let recorder = MetricsRecorder::new(Duration::from_millis(100));
        let adjusted = recorder.adjusted_ms(Duration::from_millis(350), 3);
        assert!((adjusted - 50.0).abs() < 1e-9);
    }

    #[test]
    fn subtraction_saturates_at_zero() {
        let recorder = MetricsRecorder::new(Duration::from_millis(100));
        assert_eq!(recorder.adjusted_ms(Duration::from_millis(250), 3), 0.0);
        assert_eq!(recorder.adjusted_ms(Duration::from_millis(1), usize::MAX), 0.0);
    }

    #[test]
    fn immediate_reports_raw_time() {
        let recorder = MetricsRecorder::immediate();
        let adjusted = recorder.adjusted_ms(Duration::from_micros(1500), 10);
        assert!((adjusted - 1.5).abs() < 1e-9);
    }

    #[test]
    fn finish_search_uses_visit_count() {
        let recorder = MetricsRecorder::new(Duration::from_secs(3600));
        let outcome = SearchOutcome {
            found_index: None,
            visited_count: 1,
            elapsed_ms: -1.0,
            probes: Vec::new(),
        };
        let stamped = recorder.finish_search(recorder.start(), outcome);
        assert_eq!(stamped.elapsed_ms, 0.0);
    }

    #[test]
    fn sort_metrics_mirror_outcome() {
        let outcome = SortOutcome {
            steps: Vec::new(),
            comparisons: 7,
            swaps: 3,
            elapsed_ms: 2.5,
        };
        let metrics = RunMetrics::from_sort(Algorithm::QuickSort, &outcome);
        assert_eq!(metrics.comparisons, 7);
        assert_eq!(metrics.swaps, 3);
        assert_eq!(metrics.steps, 0);
        assert_eq!(metrics.time_ms, 2.5);
        assert_eq!(metrics.algorithm.label(), "Quicksort");
    }
}
