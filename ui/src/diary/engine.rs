//! Page-flip state machine for the diary viewer.
//!
//! Navigation is two-phase: `advance`/`retreat` take the lock and hand back a
//! [`PendingFlip`]; the caller sleeps for `duration_ms` and then calls
//! [`DiaryEngine::complete`] with the flip's ticket. Requests that arrive while
//! a flip is pending are dropped.

use std::collections::BTreeSet;
use std::fmt;

use dioxus::logger::tracing::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::core::config::DiaryConfig;

use super::content::{PageContent, PageSequence};

/// How positions map onto visible faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// One page at a time; the current page fills the viewer.
    Single,
    /// Two faces: the preceding page on the left, the current page on the right.
    #[default]
    Spread,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingFlip {
    pub ticket: u64,
    pub direction: Direction,
    pub duration_ms: u64,
}

/// Feedback-only nudge played when navigation hits either end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounce {
    pub ticket: u64,
    pub edge: Edge,
    pub duration_ms: u64,
}

impl Bounce {
    /// Animation class for this bounce. Consecutive bounces alternate between
    /// two class names so a repeated press at the same edge restarts the
    /// animation.
    pub fn css_class(&self) -> &'static str {
        let alternate = self.ticket % 2 == 0;
        match (self.edge, alternate) {
            (Edge::Start, false) => "diary__book--bounce-start",
            (Edge::Start, true) => "diary__book--bounce-start-alt",
            (Edge::End, false) => "diary__book--bounce-end",
            (Edge::End, true) => "diary__book--bounce-end-alt",
        }
    }
}

/// Follow-up owed after [`DiaryEngine::surprise`]: one advance after `delay_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurprisePlan {
    pub delay_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Started(PendingFlip),
    Bounce(Bounce),
    /// A flip is already in flight; the request was dropped.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    pub position: usize,
    pub content: PageContent,
}

/// Human-readable "position / total" marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageIndicator {
    pub position: usize,
    pub total: usize,
}

impl fmt::Display for PageIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.position, self.total)
    }
}

/// Everything the view needs to draw one state of the diary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Page preceding the current one (spread layout only).
    pub facing: Option<Face>,
    pub current: Option<Face>,
    pub indicator: PageIndicator,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.facing.is_none() && self.current.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct DiaryEngine {
    pages: PageSequence,
    layout: Layout,
    flip_ms: u64,
    bounce_ms: u64,
    surprise_delay_ms: u64,
    index: usize,
    pending: Option<PendingFlip>,
    feedback: Option<Bounce>,
    visible: bool,
    failed_images: BTreeSet<usize>,
    next_ticket: u64,
}

impl Default for DiaryEngine {
    fn default() -> Self {
        Self::from_config(&DiaryConfig::default())
    }
}

impl DiaryEngine {
    /// A zero `flip_ms` falls back to [`DiaryConfig::DEFAULT_FLIP_MS`].
    pub fn new(pages: PageSequence, layout: Layout, flip_ms: u64) -> Self {
        Self {
            pages,
            layout,
            flip_ms: if flip_ms == 0 {
                DiaryConfig::DEFAULT_FLIP_MS
            } else {
                flip_ms
            },
            bounce_ms: DiaryConfig::DEFAULT_BOUNCE_MS,
            surprise_delay_ms: DiaryConfig::DEFAULT_SURPRISE_DELAY_MS,
            index: 0,
            pending: None,
            feedback: None,
            visible: false,
            failed_images: BTreeSet::new(),
            next_ticket: 0,
        }
    }

    pub fn from_config(config: &DiaryConfig) -> Self {
        let mut engine = Self::new(config.page_sequence(), config.layout, config.flip_ms);
        engine.bounce_ms = config.bounce_ms;
        engine.surprise_delay_ms = config.surprise_delay_ms;
        engine
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn flip_ms(&self) -> u64 {
        self.flip_ms
    }

    pub fn bounce_ms(&self) -> u64 {
        self.bounce_ms
    }

    pub fn surprise_delay_ms(&self) -> u64 {
        self.surprise_delay_ms
    }

    pub fn is_locked(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<PendingFlip> {
        self.pending
    }

    pub fn feedback(&self) -> Option<Bounce> {
        self.feedback
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn pages(&self) -> &PageSequence {
        &self.pages
    }

    pub fn total_positions(&self) -> usize {
        self.pages.len()
    }

    pub fn at_start(&self) -> bool {
        self.index == 0
    }

    pub fn at_end(&self) -> bool {
        self.pages.is_empty() || self.index >= self.pages.last_position()
    }

    /// Frame for the current index.
    pub fn frame(&self) -> Frame {
        self.render(self.index)
    }

    /// Frame for an arbitrary index. Out-of-range input yields an empty frame.
    pub fn render(&self, index: usize) -> Frame {
        let total = self.pages.len();
        let indicator = PageIndicator {
            position: if total == 0 {
                0
            } else {
                index.min(total - 1) + 1
            },
            total,
        };

        if index >= total {
            return Frame {
                facing: None,
                current: None,
                indicator,
            };
        }

        let face = |position: usize| {
            self.pages
                .resolve(position, &self.failed_images)
                .map(|content| Face { position, content })
        };

        let facing = match self.layout {
            Layout::Spread if index > 0 => face(index - 1),
            _ => None,
        };

        Frame {
            facing,
            current: face(index),
            indicator,
        }
    }

    pub fn advance(&mut self) -> NavOutcome {
        if self.pending.is_some() {
            debug!(index = self.index, "diary: advance ignored, flip in flight");
            return NavOutcome::Ignored;
        }
        if self.at_end() {
            return self.bounce(Edge::End);
        }
        self.begin_flip(Direction::Forward)
    }

    pub fn retreat(&mut self) -> NavOutcome {
        if self.pending.is_some() {
            debug!(index = self.index, "diary: retreat ignored, flip in flight");
            return NavOutcome::Ignored;
        }
        if self.at_start() {
            return self.bounce(Edge::Start);
        }
        self.begin_flip(Direction::Backward)
    }

    /// Finish the pending flip identified by `ticket`. Returns `false` when no
    /// flip with that ticket is pending.
    pub fn complete(&mut self, ticket: u64) -> bool {
        let Some(flip) = self.pending else {
            return false;
        };
        if flip.ticket != ticket {
            debug!(ticket, pending = flip.ticket, "diary: stale flip completion");
            return false;
        }

        self.index = match flip.direction {
            Direction::Forward => (self.index + 1).min(self.pages.last_position()),
            Direction::Backward => self.index.saturating_sub(1),
        };
        self.pending = None;
        debug!(index = self.index, "diary: flip complete");
        true
    }

    /// Clear bounce feedback if `ticket` is still the latest bounce.
    pub fn clear_feedback(&mut self, ticket: u64) -> bool {
        match self.feedback {
            Some(bounce) if bounce.ticket == ticket => {
                self.feedback = None;
                true
            }
            _ => false,
        }
    }

    /// Reveal the viewer at its current index.
    pub fn open(&mut self) {
        self.visible = true;
        self.feedback = None;
        info!(index = self.index, "diary: opened");
    }

    /// Hide the viewer. The index is kept and a pending flip still completes.
    pub fn close(&mut self) {
        self.visible = false;
        info!(index = self.index, "diary: closed");
    }

    /// Open the viewer and return when the single follow-up advance is due.
    pub fn surprise(&mut self) -> SurprisePlan {
        self.open();
        SurprisePlan {
            delay_ms: self.surprise_delay_ms,
        }
    }

    pub fn mark_image_failed(&mut self, position: usize) {
        if position < self.pages.len() && self.failed_images.insert(position) {
            warn!(position, "diary: page image failed to load, using placeholder");
        }
    }

    pub fn set_flip_ms(&mut self, flip_ms: u64) {
        if flip_ms > 0 {
            self.flip_ms = flip_ms;
        }
    }

    fn begin_flip(&mut self, direction: Direction) -> NavOutcome {
        let flip = PendingFlip {
            ticket: self.take_ticket(),
            direction,
            duration_ms: self.flip_ms,
        };
        self.pending = Some(flip);
        self.feedback = None;
        debug!(index = self.index, ?direction, "diary: flip started");
        NavOutcome::Started(flip)
    }

    fn bounce(&mut self, edge: Edge) -> NavOutcome {
        let bounce = Bounce {
            ticket: self.take_ticket(),
            edge,
            duration_ms: self.bounce_ms,
        };
        self.feedback = Some(bounce);
        debug!(index = self.index, ?edge, "diary: bounce at edge");
        NavOutcome::Bounce(bounce)
    }

    fn take_ticket(&mut self) -> u64 {
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.next_ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diary::content::{ClosingMessage, PageEntry, PLACEHOLDER_SRC};

    fn engine(layout: Layout) -> DiaryEngine {
        let pages = PageSequence::new(
            vec![
                PageEntry::Image("a.jpeg".into()),
                PageEntry::Image("b.jpeg".into()),
                PageEntry::Closing,
            ],
            ClosingMessage::default(),
        );
        DiaryEngine::new(pages, layout, 1000)
    }

    fn started(outcome: NavOutcome) -> PendingFlip {
        match outcome {
            NavOutcome::Started(flip) => flip,
            other => panic!("expected a flip, got {other:?}"),
        }
    }

    #[test]
    fn advance_takes_lock_until_completion() {
        let mut eng = engine(Layout::Spread);
        let flip = started(eng.advance());
        assert!(eng.is_locked());
        assert_eq!(eng.index(), 0);
        assert_eq!(flip.direction, Direction::Forward);
        assert_eq!(flip.duration_ms, 1000);

        assert!(eng.complete(flip.ticket));
        assert!(!eng.is_locked());
        assert_eq!(eng.index(), 1);
    }

    #[test]
    fn requests_while_locked_are_dropped() {
        let mut eng = engine(Layout::Spread);
        let flip = started(eng.advance());
        assert_eq!(eng.advance(), NavOutcome::Ignored);
        assert_eq!(eng.retreat(), NavOutcome::Ignored);
        assert!(eng.complete(flip.ticket));
        assert_eq!(eng.index(), 1);
    }

    #[test]
    fn stale_ticket_does_not_complete() {
        let mut eng = engine(Layout::Spread);
        let flip = started(eng.advance());
        assert!(!eng.complete(flip.ticket + 1));
        assert!(eng.is_locked());
        assert!(eng.complete(flip.ticket));
        assert!(!eng.complete(flip.ticket));
        assert_eq!(eng.index(), 1);
    }

    #[test]
    fn retreat_at_start_bounces() {
        let mut eng = engine(Layout::Spread);
        match eng.retreat() {
            NavOutcome::Bounce(bounce) => {
                assert_eq!(bounce.edge, Edge::Start);
                assert_eq!(eng.feedback(), Some(bounce));
                assert!(eng.clear_feedback(bounce.ticket));
                assert!(eng.feedback().is_none());
            }
            other => panic!("expected bounce, got {other:?}"),
        }
        assert_eq!(eng.index(), 0);
        assert!(!eng.is_locked());
    }

    #[test]
    fn newer_bounce_survives_older_clear() {
        let mut eng = engine(Layout::Spread);
        let NavOutcome::Bounce(first) = eng.retreat() else {
            panic!("expected bounce");
        };
        let NavOutcome::Bounce(second) = eng.retreat() else {
            panic!("expected bounce");
        };
        assert!(!eng.clear_feedback(first.ticket));
        assert_eq!(eng.feedback(), Some(second));
    }

    #[test]
    fn spread_shows_preceding_page_on_the_left() {
        let mut eng = engine(Layout::Spread);
        let first = eng.frame();
        assert!(first.facing.is_none());
        assert_eq!(first.current.as_ref().map(|f| f.position), Some(0));
        assert_eq!(first.indicator.to_string(), "1 / 3");

        let flip = started(eng.advance());
        eng.complete(flip.ticket);
        let frame = eng.frame();
        assert_eq!(frame.facing.as_ref().map(|f| f.position), Some(0));
        assert_eq!(frame.current.as_ref().map(|f| f.position), Some(1));
        assert_eq!(frame.indicator.to_string(), "2 / 3");
    }

    #[test]
    fn single_layout_has_no_facing_page() {
        let eng = engine(Layout::Single);
        let frame = eng.render(2);
        assert!(frame.facing.is_none());
        assert!(matches!(
            frame.current.map(|f| f.content),
            Some(PageContent::Closing(_))
        ));
    }

    #[test]
    fn out_of_range_render_is_empty() {
        let eng = engine(Layout::Spread);
        let frame = eng.render(9);
        assert!(frame.is_empty());
        assert_eq!(frame.indicator.to_string(), "3 / 3");
    }

    #[test]
    fn failed_images_render_as_placeholder() {
        let mut eng = engine(Layout::Single);
        eng.mark_image_failed(0);
        eng.mark_image_failed(42);
        match eng.frame().current.map(|f| f.content) {
            Some(PageContent::Image { src, .. }) => assert_eq!(src, PLACEHOLDER_SRC),
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn close_keeps_index_and_open_clears_feedback() {
        let mut eng = engine(Layout::Spread);
        let flip = started(eng.advance());
        eng.complete(flip.ticket);
        eng.open();
        eng.close();
        assert!(!eng.is_visible());
        assert_eq!(eng.index(), 1);

        let _ = eng.advance();
        let flip = eng.pending().unwrap();
        eng.complete(flip.ticket);
        let _ = eng.advance();
        assert!(eng.feedback().is_some());
        eng.open();
        assert!(eng.is_visible());
        assert!(eng.feedback().is_none());
        assert_eq!(eng.index(), 2);
    }

    #[test]
    fn surprise_opens_and_reports_delay() {
        let config = DiaryConfig {
            surprise_delay_ms: 250,
            ..DiaryConfig::default()
        };
        let mut eng = DiaryEngine::from_config(&config);
        assert_eq!(eng.surprise(), SurprisePlan { delay_ms: 250 });
        assert!(eng.is_visible());
        assert_eq!(eng.index(), 0);
    }

    #[test]
    fn repeated_bounce_at_same_edge_changes_class() {
        let mut eng = engine(Layout::Spread);
        let NavOutcome::Bounce(first) = eng.retreat() else {
            panic!("expected bounce");
        };
        let NavOutcome::Bounce(second) = eng.retreat() else {
            panic!("expected bounce");
        };
        assert_eq!(first.edge, second.edge);
        assert_ne!(first.css_class(), second.css_class());
        assert!(first.css_class().starts_with("diary__book--bounce-start"));
        assert!(second.css_class().starts_with("diary__book--bounce-start"));

        let NavOutcome::Bounce(third) = eng.retreat() else {
            panic!("expected bounce");
        };
        assert_ne!(second.css_class(), third.css_class());
    }

    #[test]
    fn empty_sequence_never_moves() {
        let mut eng = DiaryEngine::new(PageSequence::default(), Layout::Spread, 500);
        assert!(matches!(eng.advance(), NavOutcome::Bounce(_)));
        assert!(matches!(eng.retreat(), NavOutcome::Bounce(_)));
        assert_eq!(eng.index(), 0);
        assert!(eng.frame().is_empty());
        assert_eq!(eng.frame().indicator.to_string(), "0 / 0");
    }

    #[test]
    fn zero_flip_duration_is_rejected() {
        let mut eng = engine(Layout::Spread);
        eng.set_flip_ms(0);
        assert_eq!(eng.flip_ms(), 1000);
        eng.set_flip_ms(750);
        assert_eq!(eng.flip_ms(), 750);

        let fresh = DiaryEngine::new(PageSequence::default(), Layout::Single, 0);
        assert_eq!(fresh.flip_ms(), DiaryConfig::DEFAULT_FLIP_MS);
        assert_eq!(fresh.layout(), Layout::Single);
        assert_eq!(fresh.bounce_ms(), DiaryConfig::DEFAULT_BOUNCE_MS);
        assert_eq!(fresh.surprise_delay_ms(), DiaryConfig::DEFAULT_SURPRISE_DELAY_MS);
    }
}
