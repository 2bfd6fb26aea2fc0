//! Capabilities the engine needs from whatever renders the list.
//!
//! The engine never touches a real rendering tree. Measuring an element,
//! moving it, highlighting it and scrolling to it all go through these
//! traits, so the algorithms and the animator run headlessly in tests
//! against [`HeadlessStage`](crate::HeadlessStage).

use std::future::Future;
use std::time::Duration;

use rolodex_algo::{HighlightSet, RecordId, RecordList};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// On-screen bounding box of one element.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Offset that places an element laid out at `last` back over `self`.
    pub fn offset_from(&self, last: &Rect) -> Offset {
        Offset {
            dx: self.left - last.left,
            dy: self.top - last.top,
        }
    }

    /// This rectangle moved by `offset`.
    pub fn translated(&self, offset: Offset) -> Rect {
        Rect {
            left: self.left + offset.dx,
            top: self.top + offset.dy,
            ..*self
        }
    }
}

/// A translation applied to an element on top of its layout position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

/// Visual treatment a highlight applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Treatment {
    /// Element currently being visited by a search.
    Probe,
    /// Element a search matched.
    Found,
    /// Elements exchanged by the current sort step.
    Swap,
}

/// Resolves when an element's transition reports completion.
///
/// A dropped sender means the element went away and no completion will
/// ever arrive.
pub type TransitionSignal = oneshot::Receiver<()>;

/// Looks up where an element is currently drawn.
pub trait ElementLocator: Send + Sync {
    /// Current bounding box of the element for `id`, or `None` if it is not
    /// rendered.
    fn locate(&self, id: RecordId) -> Option<Rect>;
}

/// Applies and removes highlight treatments.
pub trait HighlightApplier: Send + Sync {
    fn apply(&self, ids: &HighlightSet, treatment: Treatment);
    fn clear(&self, ids: &HighlightSet, treatment: Treatment);
}

/// Brings the element at a display index into view.
pub trait ScrollIntoView: Send + Sync {
    fn scroll_into_view(&self, index: usize);
}

/// Renders the list and animates element transforms.
pub trait RenderSurface: ElementLocator {
    /// Publish a new display order. Layout reflects it after the next frame.
    fn render(&self, ordering: &RecordList);

    /// Resolves once the surface has produced a frame.
    fn next_frame(&self) -> impl Future<Output = ()> + Send;

    /// Offset an element instantly, with transitions disabled.
    fn jump(&self, id: RecordId, offset: Offset);

    /// Transition an element's offset back to zero over `duration`.
    fn play(&self, id: RecordId, duration: Duration) -> TransitionSignal;

    /// Drop any offset and transition immediately.
    fn settle(&self, id: RecordId);
}

/// Everything a list driver needs from its surface.
pub trait Stage: RenderSurface + HighlightApplier + ScrollIntoView {}

impl<T> Stage for T where T: RenderSurface + HighlightApplier + ScrollIntoView {}
