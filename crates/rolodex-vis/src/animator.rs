//! Position-diff (FLIP) animation of list reorders.
//!
//! # Phases
//!
//! 1. **First**: measure every displayed element.
//! 2. Apply the new order and highlight set.
//! 3. Wait exactly one frame so layout reflects the new order.
//! 4. **Last**: measure every element again.
//! 5. **Invert**: `first - last` per element; zero means nothing to do.
//! 6. **Play**: jump each moved element back to where it was, then
//!    transition its offset to zero.
//! 7. Wait for every transition to report completion, each bounded by the
//!    guard timeout (transition + margin). A signal that never comes only
//!    costs the guard; the element is then forcibly settled.
//! 8. Clear the highlight set.
//!
//! # Serialization
//!
//! At most one run is in flight per animator. Later calls queue on a FIFO
//! lock and measure their First positions only after the previous run has
//! fully settled. [`Animator::cancel_in_flight`] settles the active run
//! early instead of waiting for its transitions.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use rolodex_algo::{Error as RecordError, HighlightSet, RecordId, RecordList};
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, trace};

use crate::config::VisConfig;
use crate::error::Result;
use crate::surface::{HighlightApplier, Offset, Rect, RenderSurface, Treatment};

/// The arrangement currently on screen and its active highlight.
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    pub ordering: RecordList,
    pub highlight: HighlightSet,
}

/// Display state shared between an animator and the driver that owns it.
pub type SharedDisplay = Arc<RwLock<DisplayState>>;

impl DisplayState {
    pub fn new(ordering: RecordList) -> Self {
        Self {
            ordering,
            highlight: HighlightSet::new(),
        }
    }

    /// Wrap in a shared handle.
    pub fn shared(ordering: RecordList) -> SharedDisplay {
        Arc::new(RwLock::new(Self::new(ordering)))
    }
}

/// How one element's transition ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settle {
    Signalled,
    Dropped,
    TimedOut,
}

/// In-flight state of one reorder.
#[derive(Debug, Default)]
struct AnimationRun {
    first: HashMap<RecordId, Rect>,
    last: HashMap<RecordId, Rect>,
    animating: Vec<(RecordId, Offset)>,
}

/// What a finished reorder did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationReport {
    /// Rectangles measured before the new order was applied.
    pub first: HashMap<RecordId, Rect>,
    /// Rectangles measured one frame after it was applied.
    pub last: HashMap<RecordId, Rect>,
    /// Elements that were transformed, with their inverted offsets.
    pub moved: Vec<(RecordId, Offset)>,
    /// Elements whose completion signal never arrived within the guard.
    pub timed_out: Vec<RecordId>,
    /// Whether the run was settled early by [`Animator::cancel_in_flight`].
    pub cancelled: bool,
}

impl AnimationReport {
    /// Number of elements that needed a transform.
    pub fn transforms(&self) -> usize {
        self.moved.len()
    }
}

/// Animates one displayed list between arrangements.
pub struct Animator<S> {
    stage: Arc<S>,
    display: SharedDisplay,
    config: VisConfig,
    gate: Mutex<()>,
    cancel: watch::Sender<u64>,
}

impl<S: RenderSurface + HighlightApplier> Animator<S> {
    /// Create an animator over `display`, drawing on `stage`.
    pub fn new(stage: Arc<S>, display: SharedDisplay, config: VisConfig) -> Self {
        let (cancel, _) = watch::channel(0);
        Self {
            stage,
            display,
            config,
            gate: Mutex::new(()),
            cancel,
        }
    }

    pub fn config(&self) -> &VisConfig {
        &self.config
    }

    /// Whether a reorder is currently in flight.
    pub fn is_animating(&self) -> bool {
        self.gate.try_lock().is_err()
    }

    /// Settle the in-flight reorder without waiting for its transitions.
    ///
    /// Queued reorders are unaffected and start normally afterwards.
    pub fn cancel_in_flight(&self) {
        self.cancel.send_modify(|epoch| *epoch += 1);
    }

    /// Animate the display from its current order to `next`.
    ///
    /// Waits behind any reorder already in flight. `next` must hold exactly
    /// the displayed ids and `highlight` may only name ids in `next`.
    pub async fn animate_to(&self, next: RecordList, highlight: HighlightSet) -> Result<AnimationReport> {
        let _in_flight = self.gate.lock().await;
        let mut cancelled = self.cancel.subscribe();
        let epoch = *cancelled.borrow_and_update();

        let current = self.display.read().await.ordering.clone();
        if !next.is_permutation_of(&current) {
            return Err(RecordError::NotAPermutation {
                expected: current.len(),
                actual: next.len(),
            }
            .into());
        }
        next.check_highlight(&highlight)?;

        let mut run = AnimationRun::default();

        // First
        for id in current.ids() {
            if let Some(rect) = self.stage.locate(id) {
                run.first.insert(id, rect);
            }
        }

        {
            let mut display = self.display.write().await;
            display.ordering = next.clone();
            display.highlight = highlight.clone();
        }
        self.stage.render(&next);
        if !highlight.is_empty() {
            self.stage.apply(&highlight, Treatment::Swap);
        }

        self.stage.next_frame().await;

        // Last + Invert
        for id in next.ids() {
            let Some(last) = self.stage.locate(id) else {
                continue;
            };
            run.last.insert(id, last);
            if let Some(first) = run.first.get(&id) {
                let offset = first.offset_from(&last);
                if !offset.is_zero() {
                    run.animating.push((id, offset));
                }
            }
        }

        // Play
        for &(id, offset) in &run.animating {
            self.stage.jump(id, offset);
        }
        let transition = self.config.transition();
        let signals: Vec<_> = run
            .animating
            .iter()
            .map(|&(id, _)| (id, self.stage.play(id, transition)))
            .collect();

        let guard = self.config.guard_timeout();
        let waits = join_all(signals.into_iter().map(|(id, signal)| async move {
            let settle = match tokio::time::timeout(guard, signal).await {
                Ok(Ok(())) => Settle::Signalled,
                Ok(Err(_)) => Settle::Dropped,
                Err(_) => Settle::TimedOut,
            };
            (id, settle)
        }));

        let mut timed_out = Vec::new();
        let was_cancelled = tokio::select! {
            settled = waits => {
                for (id, settle) in settled {
                    match settle {
                        Settle::Signalled => {}
                        Settle::Dropped => {
                            trace!("Transition signal for {} dropped", id);
                            self.stage.settle(id);
                        }
                        Settle::TimedOut => {
                            debug!("Transition for {} timed out after {:?}, settling", id, guard);
                            self.stage.settle(id);
                            timed_out.push(id);
                        }
                    }
                }
                false
            }
            _ = cancelled.wait_for(|current| *current != epoch) => {
                debug!("Reorder cancelled with {} elements in flight", run.animating.len());
                for &(id, _) in &run.animating {
                    self.stage.settle(id);
                }
                true
            }
        };

        self.display.write().await.highlight.clear();
        if !highlight.is_empty() {
            self.stage.clear(&highlight, Treatment::Swap);
        }

        debug!(
            "Reorder settled: {} of {} elements moved, {} timed out",
            run.animating.len(),
            next.len(),
            timed_out.len()
        );

        Ok(AnimationReport {
            first: run.first,
            last: run.last,
            moved: run.animating,
            timed_out,
            cancelled: was_cancelled,
        })
    }
}
