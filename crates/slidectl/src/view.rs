//! Presentation view model: the state the renderer draws every frame.
//!
//! The controller is the only writer. Each slide carries its visibility
//! markers and the entrance-animation style of each of its items; the
//! navigation chrome (dots, prev/next buttons, progress bar) lives alongside.

use std::time::{Duration, Instant};

/// Opacity of a disabled navigation button.
pub const DISABLED_BUTTON_OPACITY: f32 = 0.5;

/// Vertical offset, in points, of an item before its entrance animation plays.
pub const ENTRANCE_OFFSET: f32 = 30.0;

/// Length of one item's entrance animation once released.
pub const ENTRANCE_DURATION: Duration = Duration::from_millis(600);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SlideMarks {
    pub active: bool,
    pub entering: bool,
    pub exiting: bool,
}

/// Inline animation state of one slide item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemStyle {
    /// No inline style: the item is shown as laid out.
    Idle,
    /// Hidden and pushed down, waiting to be released.
    Reset,
    /// Entrance animation running from `since`, after `delay`.
    Playing { since: Instant, delay: Duration },
}

impl ItemStyle {
    /// Opacity and vertical offset of the item at `now`.
    pub fn appearance(&self, now: Instant) -> (f32, f32) {
        match *self {
            ItemStyle::Idle => (1.0, 0.0),
            ItemStyle::Reset => (0.0, ENTRANCE_OFFSET),
            ItemStyle::Playing { since, delay } => {
                let start = since + delay;
                let elapsed = now.saturating_duration_since(start).as_secs_f32();
                let t = (elapsed / ENTRANCE_DURATION.as_secs_f32()).clamp(0.0, 1.0);
                let eased = ease_out(t);
                (eased, ENTRANCE_OFFSET * (1.0 - eased))
            }
        }
    }

    pub fn is_settled(&self, now: Instant) -> bool {
        match *self {
            ItemStyle::Idle => true,
            ItemStyle::Reset => false,
            ItemStyle::Playing { since, delay } => now >= since + delay + ENTRANCE_DURATION,
        }
    }
}

fn ease_out(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideView {
    pub marks: SlideMarks,
    pub items: Vec<ItemStyle>,
}

impl SlideView {
    pub fn new(item_count: usize) -> Self {
        Self {
            marks: SlideMarks::default(),
            items: vec![ItemStyle::Idle; item_count],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavButton {
    pub enabled: bool,
}

impl NavButton {
    pub fn opacity(&self) -> f32 {
        if self.enabled {
            1.0
        } else {
            DISABLED_BUTTON_OPACITY
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeckView {
    pub slides: Vec<SlideView>,
    /// One entry per navigation dot; `true` marks the highlighted dot.
    pub dots: Vec<bool>,
    pub prev: NavButton,
    pub next: NavButton,
    /// Fraction of the deck reached, in `(0, 1]`.
    pub progress: f32,
}

impl DeckView {
    pub fn new(item_counts: impl IntoIterator<Item = usize>) -> Self {
        let slides: Vec<SlideView> = item_counts.into_iter().map(SlideView::new).collect();
        let dots = vec![false; slides.len()];
        Self {
            slides,
            dots,
            prev: NavButton { enabled: false },
            next: NavButton { enabled: false },
            progress: 0.0,
        }
    }

    /// Index of the slide currently marked active.
    pub fn active_index(&self) -> Option<usize> {
        self.slides.iter().position(|s| s.marks.active)
    }

    #[cfg(test)]
    pub fn active_count(&self) -> usize {
        self.slides.iter().filter(|s| s.marks.active).count()
    }

    #[cfg(test)]
    pub fn progress_percent(&self) -> f32 {
        self.progress * 100.0
    }
}
