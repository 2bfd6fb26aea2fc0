//! Change events published by a list driver.
//!
//! A view layer subscribes to these instead of polling the driver, and can
//! rebuild the current display from the initial order plus the events seen
//! so far with [`ListSnapshot::from_events`].

use rolodex_algo::{Algorithm, HighlightSet, RecordId, RunMetrics, Verdict};
use serde::{Deserialize, Serialize};

/// Something that changed on the displayed list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ListEvent {
    /// A search or sort run began.
    RunStarted {
        algorithm: Algorithm,
        len: usize,
    },

    /// A search visited an element.
    Probed {
        index: usize,
        id: RecordId,
        verdict: Verdict,
    },

    /// The display order changed and settled.
    Reordered {
        ids: Vec<RecordId>,
        highlight: HighlightSet,
        /// Index of the sort step that produced this order, if any.
        step: Option<usize>,
    },

    /// A run finished with these metrics.
    RunFinished {
        metrics: RunMetrics,
    },
}

/// The display as reconstructed from events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListSnapshot {
    pub ids: Vec<RecordId>,
    pub highlight: HighlightSet,
    pub last_probe: Option<usize>,
    pub running: Option<Algorithm>,
    pub runs_finished: usize,
    pub last_metrics: Option<RunMetrics>,
}

impl ListSnapshot {
    /// Replay `events` on top of the initial display order.
    pub fn from_events(initial: Vec<RecordId>, events: &[ListEvent]) -> Self {
        let mut snapshot = ListSnapshot {
            ids: initial,
            ..Default::default()
        };

        for event in events {
            match event {
                ListEvent::RunStarted { algorithm, .. } => {
                    snapshot.running = Some(*algorithm);
                    snapshot.last_probe = None;
                }
                ListEvent::Probed { index, .. } => {
                    snapshot.last_probe = Some(*index);
                }
                ListEvent::Reordered { ids, highlight, .. } => {
                    snapshot.ids = ids.clone();
                    snapshot.highlight = highlight.clone();
                }
                ListEvent::RunFinished { metrics } => {
                    snapshot.running = None;
                    snapshot.highlight.clear();
                    snapshot.runs_finished += 1;
                    snapshot.last_metrics = Some(metrics.clone());
                }
            }
        }

        snapshot
    }
}
