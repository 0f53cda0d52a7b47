//! Normalizes buttons, keys, taps and swipes into diary intents.

/// Minimum horizontal travel for a touch gesture to count as a swipe.
pub const DEFAULT_SWIPE_THRESHOLD: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Advance,
    Retreat,
    Open,
    Close,
    Surprise,
}

/// Map a DOM `KeyboardEvent.key` value to an intent.
pub fn intent_for_key(key: &str) -> Option<Intent> {
    match key {
        "ArrowRight" | "Right" => Some(Intent::Advance),
        "ArrowLeft" | "Left" => Some(Intent::Retreat),
        "Escape" | "Esc" => Some(Intent::Close),
        _ => None,
    }
}

/// Half-width click targets laid over the viewer surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapZone {
    Left,
    Right,
}

impl TapZone {
    pub fn intent(self) -> Intent {
        match self {
            Self::Left => Intent::Retreat,
            Self::Right => Intent::Advance,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Left => "diary__tapzone diary__tapzone--left",
            Self::Right => "diary__tapzone diary__tapzone--right",
        }
    }
}

/// Tracks a single touch from start to end and classifies it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeTracker {
    threshold: f64,
    start: Option<(f64, f64)>,
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD)
    }
}

impl SwipeTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            start: None,
        }
    }

    pub fn begin(&mut self, x: f64, y: f64) {
        self.start = Some((x, y));
    }

    /// Classify the gesture ending at `(x, y)`. Leftward travel pages forward,
    /// rightward travel pages back. The recorded start is consumed either way.
    pub fn finish(&mut self, x: f64, y: f64) -> Option<Intent> {
        let (start_x, start_y) = self.start.take()?;
        classify_swipe(x - start_x, y - start_y, self.threshold)
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }
}

pub fn classify_swipe(dx: f64, dy: f64, threshold: f64) -> Option<Intent> {
    if dx.abs() <= threshold || dx.abs() <= dy.abs() {
        return None;
    }
    if dx < 0.0 {
        Some(Intent::Advance)
    } else {
        Some(Intent::Retreat)
    }
}
