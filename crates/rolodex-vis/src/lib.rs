//! Rolodex List Visualization
//!
//! Animated search and sort playback over a displayed contact list.
//!
//! # Architecture
//!
//! - **Surface**: capability traits for whatever draws the list
//! - **Animator**: position-diff (FLIP) reorders with bounded waits
//! - **Driver**: replays search probes and sort steps on a surface
//! - **Events**: change stream a view layer can subscribe to
//! - **Headless**: in-memory grid surface for tests and the demo binary
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use rolodex_algo::{Record, RecordList};
//! use rolodex_vis::{HeadlessStage, ListDriver, TransitionMode, VisConfig};
//!
//! # async fn demo() -> rolodex_vis::Result<()> {
//! let records = RecordList::new(vec![Record::new(1, "Bea"), Record::new(2, "Ana")])?;
//! let config = VisConfig::default();
//! let stage = Arc::new(HeadlessStage::new(&config, TransitionMode::Immediate));
//! let driver = ListDriver::new(records, stage, config);
//!
//! driver.sort_by_name(false).await?;
//! let found = driver.binary_search("ana").await;
//! assert_eq!(found.found_index, Some(0));
//! # Ok(())
//! # }
//! ```

mod animator;
mod config;
mod driver;
mod error;
mod events;
mod headless;
mod surface;

pub use animator::{AnimationReport, Animator, DisplayState, SharedDisplay};
pub use config::{GridConfig, PlaybackSpeed, VisConfig};
pub use driver::ListDriver;
pub use error::{Error, Result};
pub use events::{ListEvent, ListSnapshot};
pub use headless::{HeadlessStage, StageCall, TransitionMode};
pub use surface::{
    ElementLocator, HighlightApplier, Offset, Rect, RenderSurface, ScrollIntoView, Stage, Treatment,
    TransitionSignal,
};
