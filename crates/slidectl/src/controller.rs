//! Slide transition state machine.
//!
//! The controller owns the deck, the current index and the animation lock,
//! and is the only writer of the [`DeckView`]. Time is passed in explicitly:
//! every deadline (transition end, entrance re-trigger) is checked by
//! [`SlideController::tick`], which the app calls once per frame.

use std::time::{Duration, Instant};

use crate::analytics::AnalyticsSink;
use crate::deck::Slide;
use crate::input::Command;
use crate::view::{DeckView, ItemStyle, NavButton, SlideView};

pub const DEFAULT_ANIMATION_DELAY: Duration = Duration::from_millis(800);

/// Delay between hiding a slide's items and releasing their entrance animation.
pub const CONTENT_RELEASE_DELAY: Duration = Duration::from_millis(100);

/// Extra entrance delay per position for stagger items.
pub const STAGGER_STEP: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy)]
struct ActiveTransition {
    from: Option<usize>,
    to: usize,
    start: Instant,
    ends_at: Instant,
}

#[derive(Debug, Clone, Copy)]
struct PendingRelease {
    slide: usize,
    at: Instant,
}

/// Direction and eased progress of the running transition, for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionState {
    pub from: Option<usize>,
    pub to: usize,
    pub progress: f32,
}

pub struct SlideController {
    slides: Vec<Slide>,
    view: DeckView,
    current: usize,
    transition: Option<ActiveTransition>,
    release: Option<PendingRelease>,
    animation_delay: Duration,
    analytics: Box<dyn AnalyticsSink>,
}

impl SlideController {
    /// Create a controller showing `start` (clamped to the deck).
    pub fn new(
        slides: Vec<Slide>,
        start: usize,
        animation_delay: Duration,
        analytics: Box<dyn AnalyticsSink>,
        now: Instant,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(!slides.is_empty(), "Deck has no slides");

        let view = DeckView::new(slides.iter().map(|s| s.items.len()));
        let current = start.min(slides.len() - 1);
        let mut controller = Self {
            slides,
            view,
            current,
            transition: None,
            release: None,
            animation_delay,
            analytics,
        };
        controller.view.slides[current].marks.active = true;
        controller.sync_navigation();
        controller.animate_content(now);
        Ok(controller)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn view(&self) -> &DeckView {
        &self.view
    }

    /// Fraction of the deck reached: `(current + 1) / N`.
    #[cfg(test)]
    pub fn progress(&self) -> f32 {
        self.view.progress
    }

    pub fn transition_state(&self, now: Instant) -> Option<TransitionState> {
        self.transition.map(|t| {
            let total = t.ends_at.duration_since(t.start).as_secs_f32();
            let elapsed = now.saturating_duration_since(t.start).as_secs_f32();
            let progress = if total > 0.0 {
                (elapsed / total).clamp(0.0, 1.0)
            } else {
                1.0
            };
            TransitionState {
                from: t.from,
                to: t.to,
                progress,
            }
        })
    }

    /// Start a transition to `target`. Ignored while a transition is running
    /// or when `target` is outside the deck.
    pub fn request_transition(&mut self, target: usize, now: Instant) {
        if self.is_animating() {
            tracing::trace!(target, "transition dropped: animation in progress");
            return;
        }
        if target >= self.slides.len() {
            tracing::trace!(target, count = self.slides.len(), "transition dropped: out of range");
            return;
        }

        let from = self.view.active_index();
        if let Some(from) = from {
            let marks = &mut self.view.slides[from].marks;
            marks.active = false;
            marks.exiting = true;
        }

        self.current = target;
        let marks = &mut self.view.slides[target].marks;
        marks.active = true;
        marks.entering = true;

        self.sync_navigation();

        self.transition = Some(ActiveTransition {
            from,
            to: target,
            start: now,
            ends_at: now + self.animation_delay,
        });
        tracing::debug!(?from, to = target, "slide transition started");

        self.analytics.slide_view(target);
    }

    pub fn next(&mut self, now: Instant) {
        if self.current + 1 < self.slides.len() {
            self.request_transition(self.current + 1, now);
        }
    }

    pub fn prev(&mut self, now: Instant) {
        if self.current > 0 {
            self.request_transition(self.current - 1, now);
        }
    }

    pub fn first(&mut self, now: Instant) {
        self.request_transition(0, now);
    }

    pub fn last(&mut self, now: Instant) {
        self.request_transition(self.slides.len() - 1, now);
    }

    pub fn apply(&mut self, command: Command, now: Instant) {
        match command {
            Command::Next => self.next(now),
            Command::Prev => self.prev(now),
            Command::First => self.first(now),
            Command::Last => self.last(now),
            Command::GoTo(index) => self.request_transition(index, now),
        }
    }

    /// Advance timers: finish the running transition once its delay has
    /// passed, and release entrance animations that are due.
    pub fn tick(&mut self, now: Instant) {
        if let Some(t) = self.transition.take_if(|t| now >= t.ends_at) {
            self.finish_transition(t, now);
        }

        if let Some(release) = self.release.take_if(|r| now >= r.at) {
            let Some(slide) = self.view.slides.get_mut(release.slide) else {
                return;
            };
            let items = &self.slides[release.slide].items;
            for (index, (style, item)) in slide.items.iter_mut().zip(items).enumerate() {
                let delay = if item.is_stagger() {
                    STAGGER_STEP * index as u32
                } else {
                    Duration::ZERO
                };
                *style = ItemStyle::Playing {
                    since: release.at,
                    delay,
                };
            }
        }
    }

    /// Time until the next pending deadline, if any.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        let transition = self.transition.map(|t| t.ends_at);
        let release = self.release.map(|r| r.at);
        transition
            .into_iter()
            .chain(release)
            .min()
            .map(|at| at.saturating_duration_since(now))
    }

    /// Whether any item of the active slide is still animating in.
    pub fn content_settling(&self, now: Instant) -> bool {
        self.release.is_some()
            || self
                .view
                .slides
                .get(self.current)
                .is_some_and(|s| s.items.iter().any(|i| !i.is_settled(now)))
    }

    fn finish_transition(&mut self, t: ActiveTransition, now: Instant) {
        self.animate_content(now);
        if let Some(from) = t.from {
            if let Some(slide) = self.view.slides.get_mut(from) {
                slide.marks.exiting = false;
            }
        }
        if let Some(slide) = self.view.slides.get_mut(t.to) {
            slide.marks.entering = false;
        }
        tracing::debug!(to = t.to, "slide transition finished");
    }

    /// Hide the active slide's items and schedule their entrance animation.
    fn animate_content(&mut self, now: Instant) {
        let Some(active) = self.view.active_index() else {
            return;
        };
        for style in &mut self.view.slides[active].items {
            *style = ItemStyle::Reset;
        }
        self.release = Some(PendingRelease {
            slide: active,
            at: now + CONTENT_RELEASE_DELAY,
        });
    }

    fn sync_navigation(&mut self) {
        let count = self.slides.len();
        let current = self.current;
        self.view.dots = (0..count).map(|i| i == current).collect();
        self.view.prev = NavButton {
            enabled: current > 0,
        };
        self.view.next = NavButton {
            enabled: current + 1 < count,
        };
        self.view.progress = (current + 1) as f32 / count as f32;
    }

    /// Append a slide and rebuild the navigation dots.
    pub fn add_slide(&mut self, slide: Slide) {
        self.view.slides.push(SlideView::new(slide.items.len()));
        self.slides.push(slide);
        self.sync_navigation();
    }

    /// Remove the slide at `index`, then re-show the (clamped) current index.
    /// Ignored while animating, when out of range, or when it would empty the deck.
    pub fn remove_slide(&mut self, index: usize, now: Instant) {
        if self.is_animating() || index >= self.slides.len() || self.slides.len() == 1 {
            tracing::trace!(index, "slide removal ignored");
            return;
        }
        self.slides.remove(index);
        self.view.slides.remove(index);
        if self.release.is_some_and(|r| r.slide == index) {
            self.release = None;
        } else if let Some(release) = self.release.as_mut().filter(|r| r.slide > index) {
            release.slide -= 1;
        }
        self.current = self.current.min(self.slides.len() - 1);
        self.sync_navigation();
        self.request_transition(self.current, now);
    }

    /// Replace the whole deck, keeping the (clamped) current index.
    /// Ignored while animating or when `slides` is empty.
    pub fn replace_slides(&mut self, slides: Vec<Slide>, now: Instant) {
        if self.is_animating() || slides.is_empty() {
            tracing::trace!("deck replacement ignored");
            return;
        }
        self.view = DeckView::new(slides.iter().map(|s| s.items.len()));
        self.slides = slides;
        self.release = None;
        self.current = self.current.min(self.slides.len() - 1);
        self.sync_navigation();
        self.request_transition(self.current, now);
    }
}
