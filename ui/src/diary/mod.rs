//! Page-flip diary: content, navigation state machine, input mapping and view.

pub mod content;
pub mod engine;
pub mod input;

mod view;
pub use view::DiaryView;

pub use content::{ClosingMessage, PageContent, PageEntry, PageSequence};
pub use engine::{DiaryEngine, Frame, Layout, NavOutcome, PageIndicator, SurprisePlan};
pub use input::{Intent, SwipeTracker};
