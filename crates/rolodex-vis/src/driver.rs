//! Drives searches and sorts over one displayed list.
//!
//! The driver owns the display state for its list. Each run computes its
//! plan with the algorithm core, then replays it on the stage:
//!
//! - **Search**: every probe scrolls its index into view and holds a probe
//!   highlight for the configured duration. A match is then held with the
//!   found treatment; that hold is outside the measured time.
//! - **Sort**: every step is animated with the [`Animator`], followed by the
//!   inter-step pause.
//!
//! Runs are serialized: a run requested while another is active waits for
//! it to finish, and the display is only ever reordered from inside a run.
//! Search times have the constant per-visit hold subtracted. Sort times
//! leave out the measured playback of every step.

use std::cmp::Ordering;
use std::sync::Arc;

use rolodex_algo::{
    binary_search, by_name, by_name_desc, generate_steps, instant_sort, linear_search, Algorithm, HighlightSet,
    MetricsRecorder, Probe, Record, RecordId, RecordList, RunMetrics, SearchOutcome, SortOutcome, Stopwatch,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::animator::{AnimationReport, Animator, DisplayState, SharedDisplay};
use crate::config::VisConfig;
use crate::error::Result;
use crate::events::ListEvent;
use crate::surface::{Stage, Treatment};

const EVENT_CAPACITY: usize = 1024;

/// Search and sort playback for one displayed list.
pub struct ListDriver<S> {
    stage: Arc<S>,
    display: SharedDisplay,
    animator: Animator<S>,
    config: VisConfig,
    runs: Mutex<()>,
    events: broadcast::Sender<ListEvent>,
}

impl<S: Stage> ListDriver<S> {
    /// Take ownership of `records` as the displayed list and render it.
    pub fn new(records: RecordList, stage: Arc<S>, config: VisConfig) -> Self {
        stage.render(&records);
        let display = DisplayState::shared(records);
        let animator = Animator::new(stage.clone(), display.clone(), config.clone());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            stage,
            display,
            animator,
            config,
            runs: Mutex::new(()),
            events,
        }
    }

    /// Subscribe to display changes.
    pub fn subscribe(&self) -> broadcast::Receiver<ListEvent> {
        self.events.subscribe()
    }

    /// Whether a reorder is currently playing.
    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    /// Settle the reorder currently playing without waiting for its
    /// transitions. The run it belongs to carries on with its next step.
    pub fn cancel_in_flight(&self) {
        self.animator.cancel_in_flight();
    }

    pub fn config(&self) -> &VisConfig {
        &self.config
    }

    /// Current display order.
    pub async fn ordering(&self) -> RecordList {
        self.display.read().await.ordering.clone()
    }

    /// Currently highlighted ids.
    pub async fn highlight(&self) -> HighlightSet {
        self.display.read().await.highlight.clone()
    }

    fn publish(&self, event: ListEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Scan the display for `target` by name, one visit at a time.
    pub async fn linear_search(&self, target: &str) -> SearchOutcome {
        self.search(Algorithm::LinearSearch, target).await
    }

    /// Halving search for `target` by name.
    ///
    /// The display must already be sorted ascending by name; this is only
    /// logged, not enforced.
    pub async fn binary_search(&self, target: &str) -> SearchOutcome {
        self.search(Algorithm::BinarySearch, target).await
    }

    async fn search(&self, algorithm: Algorithm, target: &str) -> SearchOutcome {
        let _run = self.runs.lock().await;
        let ordering = self.ordering().await;
        self.publish(ListEvent::RunStarted {
            algorithm,
            len: ordering.len(),
        });

        if algorithm == Algorithm::BinarySearch && !ordering.is_sorted_by_key(Record::name) {
            warn!("Binary search over a list not sorted by name; result may be wrong");
        }

        let recorder = MetricsRecorder::new(self.config.probe_hold());
        let stopwatch = recorder.start();
        let plan = match algorithm {
            Algorithm::BinarySearch => binary_search(&ordering, target, Record::name),
            _ => linear_search(&ordering, target, Record::name),
        };
        for probe in &plan.probes {
            self.visit(probe).await;
        }
        let outcome = recorder.finish_search(stopwatch, plan);

        if let Some(index) = outcome.found_index {
            self.hold_found(&ordering, index).await;
        }

        let metrics = RunMetrics::from_search(algorithm, &outcome);
        info!(
            "{} for {:?}: found {:?} after {} visits in {:.3} ms",
            algorithm.label(),
            target,
            outcome.found_index,
            outcome.visited_count,
            outcome.elapsed_ms
        );
        self.publish(ListEvent::RunFinished { metrics });
        outcome
    }

    async fn visit(&self, probe: &Probe) {
        let ids: HighlightSet = [probe.id].into_iter().collect();
        self.stage.scroll_into_view(probe.index);
        self.stage.apply(&ids, Treatment::Probe);
        self.display.write().await.highlight = ids.clone();
        self.publish(ListEvent::Probed {
            index: probe.index,
            id: probe.id,
            verdict: probe.verdict,
        });

        tokio::time::sleep(self.config.probe_hold()).await;

        self.stage.clear(&ids, Treatment::Probe);
        self.display.write().await.highlight.clear();
    }

    /// Hold the found treatment on a match. Runs after the end timestamp.
    async fn hold_found(&self, ordering: &RecordList, index: usize) {
        let Some(record) = ordering.get(index) else {
            return;
        };
        let ids: HighlightSet = [record.id].into_iter().collect();
        self.stage.apply(&ids, Treatment::Found);
        self.display.write().await.highlight = ids.clone();
        tokio::time::sleep(self.config.found_hold()).await;
        self.stage.clear(&ids, Treatment::Found);
        self.display.write().await.highlight.clear();
    }

    /// Quicksort the display with `compare`, animating every step.
    pub async fn sort_by<F>(&self, compare: F) -> Result<SortOutcome>
    where
        F: FnMut(&Record, &Record) -> Ordering + Send,
    {
        let _run = self.runs.lock().await;
        let ordering = self.ordering().await;
        self.publish(ListEvent::RunStarted {
            algorithm: Algorithm::QuickSort,
            len: ordering.len(),
        });

        let recorder = MetricsRecorder::immediate();
        let mut stopwatch = recorder.start();
        let plan = generate_steps(&ordering, compare);
        debug!(
            "Sort plan: {} steps, {} comparisons, {} swaps",
            plan.steps.len(),
            plan.comparisons,
            plan.swaps
        );

        for (index, step) in plan.steps.iter().enumerate() {
            let playback = Stopwatch::start();
            let report = self.animator.animate_to(step.state.clone(), step.highlight.clone()).await?;
            if !report.timed_out.is_empty() {
                debug!("Step {}: {} transitions settled by guard", index, report.timed_out.len());
            }
            self.publish(ListEvent::Reordered {
                ids: step.state.ids(),
                highlight: step.highlight.clone(),
                step: Some(index),
            });
            tokio::time::sleep(self.config.step_pause()).await;
            stopwatch.exclude(playback.elapsed());
        }
        let outcome = recorder.finish_sort(stopwatch, plan);

        let metrics = RunMetrics::from_sort(Algorithm::QuickSort, &outcome);
        info!(
            "Quicksort over {} records: {} comparisons, {} swaps, {} steps in {:.3} ms",
            ordering.len(),
            outcome.comparisons,
            outcome.swaps,
            outcome.steps.len(),
            outcome.elapsed_ms
        );
        self.publish(ListEvent::RunFinished { metrics });
        Ok(outcome)
    }

    /// Quicksort by name, ascending or descending.
    pub async fn sort_by_name(&self, descending: bool) -> Result<SortOutcome> {
        if descending {
            self.sort_by(by_name_desc).await
        } else {
            self.sort_by(by_name).await
        }
    }

    /// Jump straight to the sorted order with a single reorder.
    ///
    /// Counts in the outcome are approximate.
    pub async fn instant_sort_by<F>(&self, compare: F) -> Result<SortOutcome>
    where
        F: FnMut(&Record, &Record) -> Ordering + Send,
    {
        let _run = self.runs.lock().await;
        let ordering = self.ordering().await;
        self.publish(ListEvent::RunStarted {
            algorithm: Algorithm::InstantSort,
            len: ordering.len(),
        });

        let (sorted, outcome) = instant_sort(&ordering, compare);
        self.animator.animate_to(sorted.clone(), HighlightSet::new()).await?;
        self.publish(ListEvent::Reordered {
            ids: sorted.ids(),
            highlight: HighlightSet::new(),
            step: None,
        });

        info!("Instant sort over {} records", ordering.len());
        self.publish(ListEvent::RunFinished {
            metrics: RunMetrics::from_sort(Algorithm::InstantSort, &outcome),
        });
        Ok(outcome)
    }

    /// Animate the display into an explicit id order.
    pub async fn reorder(&self, order: &[RecordId]) -> Result<AnimationReport> {
        let _run = self.runs.lock().await;
        let next = self.ordering().await.reordered(order)?;
        let report = self.animator.animate_to(next, HighlightSet::new()).await?;
        self.publish(ListEvent::Reordered {
            ids: order.to_vec(),
            highlight: HighlightSet::new(),
            step: None,
        });
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlaybackSpeed;
    use crate::events::ListSnapshot;
    use crate::headless::{HeadlessStage, StageCall, TransitionMode};
    use rolodex_algo::Verdict;
    use std::time::Duration;

    fn scenario() -> RecordList {
        RecordList::new(vec![
            Record::new(1, "Bea"),
            Record::new(2, "Ana"),
            Record::new(3, "Cid"),
        ])
        .unwrap()
    }

    fn driver(config: VisConfig, mode: TransitionMode) -> (Arc<HeadlessStage>, Arc<ListDriver<HeadlessStage>>) {
        let stage = Arc::new(HeadlessStage::new(&config, mode));
        let driver = ListDriver::new(scenario(), stage.clone(), config);
        (stage, Arc::new(driver))
    }

    fn drain(rx: &mut broadcast::Receiver<ListEvent>) -> Vec<ListEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn linear_search_scrolls_each_visit() {
        let (stage, driver) = driver(VisConfig::default(), TransitionMode::Immediate);
        let outcome = driver.linear_search("Cid").await;

        assert_eq!(outcome.found_index, Some(2));
        assert_eq!(outcome.visited_count, 3);

        let scrolls: Vec<_> = stage
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                StageCall::Scroll(i) => Some(i),
                _ => None,
            })
            .collect();
        assert_eq!(scrolls, vec![0, 1, 2]);
        assert!(stage.highlighted().is_empty());
        assert!(driver.highlight().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn search_time_excludes_probe_holds() {
        let (_stage, driver) = driver(VisConfig::default(), TransitionMode::Immediate);
        let outcome = driver.linear_search("nobody").await;

        assert_eq!(outcome.found_index, None);
        assert_eq!(outcome.visited_count, 3);
        // 3 x 1100 ms of highlight elapsed on the paused clock; none of it is reported.
        assert!(outcome.elapsed_ms < 1.0, "reported {} ms", outcome.elapsed_ms);
    }

    #[tokio::test]
    async fn sort_time_leaves_out_step_playback() {
        let config = VisConfig::default()
            .with_transition(Duration::from_millis(30))
            .with_guard_margin(Duration::from_millis(20))
            .with_step_pause(Duration::from_millis(20));
        let (_stage, driver) = driver(config, TransitionMode::After(Duration::from_millis(30)));

        let wall = std::time::Instant::now();
        let outcome = driver.sort_by_name(false).await.unwrap();
        let wall = wall.elapsed();

        // Each step waits at least one frame and one pause.
        assert_eq!(outcome.steps.len(), 2);
        assert!(wall >= Duration::from_millis(2 * (16 + 20)));
        assert!(outcome.elapsed_ms > 0.0);
        assert!(outcome.elapsed_ms < 25.0, "reported {} ms of {:?}", outcome.elapsed_ms, wall);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_settles_current_step_only() {
        let (_stage, driver) = driver(VisConfig::default(), TransitionMode::Never);
        let started = tokio::time::Instant::now();
        let sort = {
            let driver = driver.clone();
            tokio::spawn(async move { driver.sort_by_name(false).await })
        };

        // Step 0 leaves Cid in place; step 1 swaps Bea and Ana and sits on its guard.
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(driver.is_animating());
        driver.cancel_in_flight();

        let outcome = sort.await.unwrap().unwrap();
        assert_eq!(outcome.steps.len(), 2);
        assert_eq!(driver.ordering().await.ids(), vec![RecordId(2), RecordId(1), RecordId(3)]);
        // Waiting out the guard would have finished at 16 + 400 + 16 + 400 + 400 ms.
        assert!(started.elapsed() < Duration::from_millis(1232));
        assert!(!driver.is_animating());
    }

    #[tokio::test(start_paused = true)]
    async fn reorder_waits_for_running_sort() {
        let (_stage, driver) = driver(VisConfig::default(), TransitionMode::After(Duration::from_millis(200)));
        let mut rx = driver.subscribe();

        let sort = {
            let driver = driver.clone();
            tokio::spawn(async move { driver.sort_by_name(false).await })
        };
        tokio::time::sleep(Duration::from_millis(500)).await;
        let reversed = [RecordId(3), RecordId(2), RecordId(1)];
        let report = driver.reorder(&reversed).await.unwrap();

        let outcome = sort.await.unwrap().unwrap();
        assert_eq!(outcome.final_state().map(|s| s.ids()), Some(vec![RecordId(2), RecordId(1), RecordId(3)]));
        // Started from the sorted list, where every record is out of place.
        assert_eq!(report.transforms(), 3);
        assert_eq!(driver.ordering().await.ids(), reversed.to_vec());

        let events = drain(&mut rx);
        let finished = events
            .iter()
            .position(|e| matches!(e, ListEvent::RunFinished { .. }))
            .unwrap();
        let manual = events
            .iter()
            .position(|e| matches!(e, ListEvent::Reordered { step: None, .. }))
            .unwrap();
        assert!(finished < manual);
    }

    #[tokio::test(start_paused = true)]
    async fn binary_search_after_sort() {
        let (_stage, driver) = driver(VisConfig::default(), TransitionMode::Immediate);
        driver.sort_by_name(false).await.unwrap();

        let outcome = driver.binary_search("ana").await;
        assert_eq!(outcome.found_index, Some(0));
        assert_eq!(outcome.visited_count, 2);
        assert_eq!(outcome.probes[0].verdict, Verdict::GoLower);
    }

    #[tokio::test(start_paused = true)]
    async fn sort_animates_every_step() {
        let (stage, driver) = driver(VisConfig::default(), TransitionMode::Immediate);
        let mut rx = driver.subscribe();

        let outcome = driver.sort_by_name(false).await.unwrap();
        assert_eq!(outcome.swaps, 2);
        assert_eq!(outcome.steps.len(), 2);
        assert_eq!(driver.ordering().await.ids(), vec![RecordId(2), RecordId(1), RecordId(3)]);

        // Only the second step moves anything: Bea and Ana trade places.
        assert_eq!(stage.transitions_played(), 2);

        let events = drain(&mut rx);
        let reorders = events
            .iter()
            .filter(|e| matches!(e, ListEvent::Reordered { .. }))
            .count();
        assert_eq!(reorders, 2);
        match events.last() {
            Some(ListEvent::RunFinished { metrics }) => {
                assert_eq!(metrics.algorithm, Algorithm::QuickSort);
                assert_eq!(metrics.swaps, 2);
                assert_eq!(metrics.steps, 2);
            }
            other => panic!("expected RunFinished, got {other:?}"),
        }

        let snapshot = ListSnapshot::from_events(scenario().ids(), &events);
        assert_eq!(snapshot.ids, driver.ordering().await.ids());
    }

    #[tokio::test(start_paused = true)]
    async fn sort_survives_dropped_transition_signals() {
        let (_stage, driver) = driver(VisConfig::default(), TransitionMode::Never);
        let outcome = driver.sort_by_name(true).await.unwrap();
        let names: Vec<_> = driver.ordering().await.iter().map(|r| r.name.clone()).collect();
        assert_eq!(names, vec!["Cid", "Bea", "Ana"]);
        assert!(!outcome.steps.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_runs_are_serialized() {
        let (_stage, driver) = driver(VisConfig::default(), TransitionMode::After(Duration::from_millis(200)));
        let mut rx = driver.subscribe();

        let sort = {
            let driver = driver.clone();
            tokio::spawn(async move { driver.sort_by_name(false).await })
        };
        tokio::time::sleep(Duration::from_millis(1)).await;
        let search = {
            let driver = driver.clone();
            tokio::spawn(async move { driver.binary_search("Ana").await })
        };

        sort.await.unwrap().unwrap();
        let found = search.await.unwrap();
        // The search saw the sorted list, so it ran after the sort finished.
        assert_eq!(found.found_index, Some(0));

        let events = drain(&mut rx);
        let starts: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                ListEvent::RunStarted { algorithm, .. } => Some(*algorithm),
                _ => None,
            })
            .collect();
        assert_eq!(starts, vec![Algorithm::QuickSort, Algorithm::BinarySearch]);
        let first_finish = events
            .iter()
            .position(|e| matches!(e, ListEvent::RunFinished { .. }))
            .unwrap();
        let second_start = events
            .iter()
            .rposition(|e| matches!(e, ListEvent::RunStarted { .. }))
            .unwrap();
        assert!(first_finish < second_start);
    }

    #[tokio::test(start_paused = true)]
    async fn instant_sort_is_one_reorder() {
        let config = VisConfig::default().with_speed(PlaybackSpeed::Instant);
        let (stage, driver) = driver(config, TransitionMode::Immediate);
        let outcome = driver.instant_sort_by(by_name).await.unwrap();

        assert!(outcome.steps.is_empty());
        assert_eq!(outcome.comparisons, 3);
        assert_eq!(outcome.swaps, 0);
        assert_eq!(driver.ordering().await.ids(), vec![RecordId(2), RecordId(1), RecordId(3)]);
        assert_eq!(stage.transitions_played(), 2);
    }

    #[tokio::test]
    async fn reorder_validates_ids() {
        let (_stage, driver) = driver(VisConfig::default(), TransitionMode::Immediate);
        tokio_test::assert_err!(driver.reorder(&[RecordId(1), RecordId(2), RecordId(7)]).await);
        assert_eq!(driver.ordering().await, scenario());

        let report = tokio_test::assert_ok!(driver.reorder(&[RecordId(3), RecordId(1), RecordId(2)]).await);
        assert_eq!(report.transforms(), 3);
    }

    #[tokio::test]
    async fn empty_list_runs_are_trivial() {
        let config = VisConfig::default().with_speed(PlaybackSpeed::Instant);
        let stage = Arc::new(HeadlessStage::new(&config, TransitionMode::Immediate));
        let driver = ListDriver::new(RecordList::empty(), stage, config);

        let search = driver.linear_search("Ana").await;
        assert_eq!((search.found_index, search.visited_count), (None, 0));
        let sort = driver.sort_by_name(false).await.unwrap();
        assert!(sort.steps.is_empty());
        assert_eq!(sort.comparisons, 0);
    }
}
