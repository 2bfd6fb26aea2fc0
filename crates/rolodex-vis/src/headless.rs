//! In-memory stage: lays records out on a fixed card grid and records
//! every call made against it.
//!
//! Used by tests and by the demo binary. Transition completion can be
//! immediate, delayed, or never delivered, which is how the animator's
//! guard timeout is exercised.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rolodex_algo::{HighlightSet, RecordId, RecordList};
use tokio::sync::oneshot;

use crate::config::{GridConfig, VisConfig};
use crate::surface::{
    ElementLocator, HighlightApplier, Offset, Rect, RenderSurface, ScrollIntoView, Treatment, TransitionSignal,
};

/// When a played transition reports completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionMode {
    /// Completion is reported as soon as the transition starts.
    Immediate,
    /// The element stays offset for this long, then completes.
    After(Duration),
    /// The element stays offset and completion is never reported.
    Never,
}

/// One call made against the stage, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum StageCall {
    Render(Vec<RecordId>),
    Jump(RecordId, Offset),
    Play(RecordId, Duration),
    Settle(RecordId),
    Apply(Vec<RecordId>, Treatment),
    Clear(Vec<RecordId>, Treatment),
    Scroll(usize),
}

#[derive(Default)]
struct StageState {
    slots: HashMap<RecordId, usize>,
    offsets: HashMap<RecordId, Offset>,
    highlighted: BTreeMap<RecordId, Treatment>,
    /// Senders kept alive for transitions that never complete.
    withheld: Vec<oneshot::Sender<()>>,
    calls: Vec<StageCall>,
}

/// Headless grid implementation of every stage capability.
pub struct HeadlessStage {
    grid: GridConfig,
    frame: Duration,
    mode: TransitionMode,
    state: Arc<Mutex<StageState>>,
}

impl HeadlessStage {
    pub fn new(config: &VisConfig, mode: TransitionMode) -> Self {
        Self {
            grid: config.grid,
            frame: config.frame,
            mode,
            state: Arc::new(Mutex::new(StageState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StageState> {
        lock_state(&self.state)
    }

    /// Layout rectangle of a display slot.
    pub fn slot_rect(&self, index: usize) -> Rect {
        let columns = self.grid.columns.max(1);
        let (row, column) = (index / columns, index % columns);
        Rect::new(
            column as f64 * (self.grid.cell_width + self.grid.gap),
            row as f64 * (self.grid.cell_height + self.grid.gap),
            self.grid.cell_width,
            self.grid.cell_height,
        )
    }

    /// Current offset of an element.
    pub fn offset(&self, id: RecordId) -> Offset {
        self.lock().offsets.get(&id).copied().unwrap_or(Offset::ZERO)
    }

    /// Elements currently highlighted and how.
    pub fn highlighted(&self) -> BTreeMap<RecordId, Treatment> {
        self.lock().highlighted.clone()
    }

    /// Every call made so far.
    pub fn calls(&self) -> Vec<StageCall> {
        self.lock().calls.clone()
    }

    /// Transitions still holding back their completion signal.
    pub fn withheld_transitions(&self) -> usize {
        self.lock().withheld.len()
    }

    /// Number of transitions played so far.
    pub fn transitions_played(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| matches!(call, StageCall::Play(..)))
            .count()
    }
}

fn lock_state(state: &Mutex<StageState>) -> MutexGuard<'_, StageState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ElementLocator for HeadlessStage {
    fn locate(&self, id: RecordId) -> Option<Rect> {
        let state = self.lock();
        let slot = *state.slots.get(&id)?;
        let offset = state.offsets.get(&id).copied().unwrap_or(Offset::ZERO);
        Some(self.slot_rect(slot).translated(offset))
    }
}

impl RenderSurface for HeadlessStage {
    fn render(&self, ordering: &RecordList) {
        let mut state = self.lock();
        state.slots = ordering.iter().enumerate().map(|(slot, r)| (r.id, slot)).collect();
        state.offsets.retain(|id, _| ordering.contains(*id));
        state.calls.push(StageCall::Render(ordering.ids()));
    }

    fn next_frame(&self) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(self.frame)
    }

    fn jump(&self, id: RecordId, offset: Offset) {
        let mut state = self.lock();
        state.offsets.insert(id, offset);
        state.calls.push(StageCall::Jump(id, offset));
    }

    fn play(&self, id: RecordId, duration: Duration) -> TransitionSignal {
        let (done, signal) = oneshot::channel();
        let mut state = self.lock();
        state.calls.push(StageCall::Play(id, duration));
        match self.mode {
            TransitionMode::Immediate => {
                state.offsets.remove(&id);
                let _ = done.send(());
            }
            TransitionMode::After(delay) => {
                let shared = self.state.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    lock_state(&shared).offsets.remove(&id);
                    let _ = done.send(());
                });
            }
            TransitionMode::Never => {
                state.withheld.retain(|tx| !tx.is_closed());
                state.withheld.push(done);
            }
        }
        signal
    }

    fn settle(&self, id: RecordId) {
        let mut state = self.lock();
        state.offsets.remove(&id);
        state.calls.push(StageCall::Settle(id));
    }
}

impl HighlightApplier for HeadlessStage {
    fn apply(&self, ids: &HighlightSet, treatment: Treatment) {
        let mut state = self.lock();
        for &id in ids {
            state.highlighted.insert(id, treatment);
        }
        state.calls.push(StageCall::Apply(ids.iter().copied().collect(), treatment));
    }

    fn clear(&self, ids: &HighlightSet, treatment: Treatment) {
        let mut state = self.lock();
        for id in ids {
            if state.highlighted.get(id) == Some(&treatment) {
                state.highlighted.remove(id);
            }
        }
        state.calls.push(StageCall::Clear(ids.iter().copied().collect(), treatment));
    }
}

impl ScrollIntoView for HeadlessStage {
    fn scroll_into_view(&self, index: usize) {
        self.lock().calls.push(StageCall::Scroll(index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolodex_algo::Record;

    fn stage(mode: TransitionMode) -> HeadlessStage {
        HeadlessStage::new(&VisConfig::default(), mode)
    }

    #[test]
    fn grid_layout_wraps_rows() {
        let stage = stage(TransitionMode::Immediate);
        assert_eq!(stage.slot_rect(0), Rect::new(0.0, 0.0, 240.0, 96.0));
        assert_eq!(stage.slot_rect(3).left, 3.0 * 256.0);
        assert_eq!(stage.slot_rect(4), Rect::new(0.0, 112.0, 240.0, 96.0));
    }

    #[test]
    fn locate_follows_render_and_offset() {
        let stage = stage(TransitionMode::Immediate);
        let list = RecordList::new(vec![Record::new(1, "Ana"), Record::new(2, "Bea")]).unwrap();
        assert_eq!(stage.locate(RecordId(1)), None);

        stage.render(&list);
        assert_eq!(stage.locate(RecordId(2)), Some(stage.slot_rect(1)));

        stage.jump(RecordId(2), Offset { dx: -256.0, dy: 0.0 });
        assert_eq!(stage.locate(RecordId(2)).unwrap().left, 0.0);
    }

    #[test]
    fn clear_only_removes_matching_treatment() {
        let stage = stage(TransitionMode::Immediate);
        let ids: HighlightSet = [RecordId(1)].into_iter().collect();
        stage.apply(&ids, Treatment::Found);
        stage.clear(&ids, Treatment::Probe);
        assert_eq!(stage.highlighted().get(&RecordId(1)), Some(&Treatment::Found));
        stage.clear(&ids, Treatment::Found);
        assert!(stage.highlighted().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_transition_completes_later() {
        let stage = stage(TransitionMode::After(Duration::from_millis(100)));
        stage.jump(RecordId(1), Offset { dx: 5.0, dy: 0.0 });
        let signal = stage.play(RecordId(1), Duration::from_millis(100));
        assert_eq!(stage.offset(RecordId(1)).dx, 5.0);
        signal.await.unwrap();
        assert_eq!(stage.offset(RecordId(1)), Offset::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn withheld_transition_never_completes() {
        let stage = stage(TransitionMode::Never);
        let signal = stage.play(RecordId(1), Duration::from_millis(10));
        let waited = tokio::time::timeout(Duration::from_secs(5), signal).await;
        assert!(waited.is_err());
    }

    #[test]
    fn abandoned_signals_are_released() {
        let stage = stage(TransitionMode::Never);
        for _ in 0..100 {
            drop(stage.play(RecordId(1), Duration::from_millis(10)));
        }
        assert_eq!(stage.withheld_transitions(), 1);

        let kept = stage.play(RecordId(2), Duration::from_millis(10));
        let _also_kept = stage.play(RecordId(3), Duration::from_millis(10));
        assert_eq!(stage.withheld_transitions(), 2);
        drop(kept);
    }
}
