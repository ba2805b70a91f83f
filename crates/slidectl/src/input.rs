//! Input adapters. Each one turns raw window input into a [`Command`] and
//! drops input that arrives while a transition is running.

use std::time::{Duration, Instant};

use eframe::egui;

/// Minimum horizontal travel for a touch gesture to count as a swipe.
pub const MIN_SWIPE_DISTANCE: f32 = 50.0;

/// Minimum wheel travel, in points, to change slides.
pub const WHEEL_THRESHOLD: f32 = 50.0;

pub const WHEEL_DEBOUNCE: Duration = Duration::from_millis(50);

/// Points per line for line-based wheel deltas.
const POINTS_PER_LINE: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Prev,
    First,
    Last,
    GoTo(usize),
}

pub fn key_command(key: egui::Key) -> Option<Command> {
    match key {
        egui::Key::ArrowRight | egui::Key::PageDown | egui::Key::Space => Some(Command::Next),
        egui::Key::ArrowLeft | egui::Key::PageUp => Some(Command::Prev),
        egui::Key::Home => Some(Command::First),
        egui::Key::End => Some(Command::Last),
        _ => None,
    }
}

/// Keys that map to navigation commands, in the order they are checked.
pub const NAVIGATION_KEYS: [egui::Key; 7] = [
    egui::Key::ArrowRight,
    egui::Key::PageDown,
    egui::Key::Space,
    egui::Key::ArrowLeft,
    egui::Key::PageUp,
    egui::Key::Home,
    egui::Key::End,
];

/// Tracks a single touch from start to end.
#[derive(Debug, Default)]
pub struct SwipeTracker {
    start: Option<egui::Pos2>,
}

impl SwipeTracker {
    pub fn touch_start(&mut self, pos: egui::Pos2) {
        self.start = Some(pos);
    }

    pub fn touch_end(&mut self, pos: egui::Pos2, animating: bool) -> Option<Command> {
        let start = self.start.take()?;
        if animating {
            return None;
        }
        let dx = start.x - pos.x;
        let dy = start.y - pos.y;
        if dx.abs() > dy.abs() && dx.abs() > MIN_SWIPE_DISTANCE {
            Some(if dx > 0.0 { Command::Next } else { Command::Prev })
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }
}

/// Debounces wheel input: only the last event of a burst is considered.
#[derive(Debug, Default)]
pub struct WheelDebouncer {
    pending: Option<(f32, Instant)>,
}

impl WheelDebouncer {
    /// Record a wheel event. Positive `delta_y` scrolls down.
    pub fn wheel(&mut self, delta_y: f32, now: Instant, animating: bool) {
        if animating {
            return;
        }
        self.pending = Some((delta_y, now + WHEEL_DEBOUNCE));
    }

    /// Fire the pending event once its debounce has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<Command> {
        let (delta, _) = self.pending.take_if(|(_, due)| now >= *due)?;
        if delta.abs() > WHEEL_THRESHOLD {
            Some(if delta > 0.0 { Command::Next } else { Command::Prev })
        } else {
            None
        }
    }

    /// Time left until the pending event fires.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .map(|(_, due)| due.saturating_duration_since(now))
    }
}

/// Convert an egui wheel delta into scroll-down-positive points.
pub fn wheel_delta_points(unit: egui::MouseWheelUnit, delta: egui::Vec2, page_height: f32) -> f32 {
    let y = match unit {
        egui::MouseWheelUnit::Point => delta.y,
        egui::MouseWheelUnit::Line => delta.y * POINTS_PER_LINE,
        egui::MouseWheelUnit::Page => delta.y * page_height,
    };
    -y
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_key_mapping() {
        assert_eq!(key_command(egui::Key::ArrowRight), Some(Command::Next));
        assert_eq!(key_command(egui::Key::PageDown), Some(Command::Next));
        assert_eq!(key_command(egui::Key::Space), Some(Command::Next));
        assert_eq!(key_command(egui::Key::ArrowLeft), Some(Command::Prev));
        assert_eq!(key_command(egui::Key::PageUp), Some(Command::Prev));
        assert_eq!(key_command(egui::Key::Home), Some(Command::First));
        assert_eq!(key_command(egui::Key::End), Some(Command::Last));
        assert_eq!(key_command(egui::Key::A), None);
        for key in NAVIGATION_KEYS {
            assert!(key_command(key).is_some(), "{key:?} should navigate");
        }
    }

    #[test]
    fn test_swipe_left_goes_forward() {
        let mut swipe = SwipeTracker::default();
        swipe.touch_start(pos2(300.0, 200.0));
        assert_eq!(swipe.touch_end(pos2(200.0, 210.0), false), Some(Command::Next));
    }

    #[test]
    fn test_swipe_right_goes_back() {
        let mut swipe = SwipeTracker::default();
        swipe.touch_start(pos2(100.0, 200.0));
        assert_eq!(swipe.touch_end(pos2(180.0, 190.0), false), Some(Command::Prev));
    }

    #[test]
    fn test_short_swipe_ignored() {
        let mut swipe = SwipeTracker::default();
        swipe.touch_start(pos2(100.0, 100.0));
        assert_eq!(swipe.touch_end(pos2(60.0, 100.0), false), None);
    }

    #[test]
    fn test_vertical_swipe_ignored() {
        let mut swipe = SwipeTracker::default();
        swipe.touch_start(pos2(100.0, 100.0));
        assert_eq!(swipe.touch_end(pos2(20.0, 300.0), false), None);
    }

    #[test]
    fn test_swipe_ignored_while_animating() {
        let mut swipe = SwipeTracker::default();
        swipe.touch_start(pos2(300.0, 100.0));
        assert_eq!(swipe.touch_end(pos2(100.0, 100.0), true), None);
    }

    #[test]
    fn test_touch_end_without_start() {
        let mut swipe = SwipeTracker::default();
        assert_eq!(swipe.touch_end(pos2(0.0, 0.0), false), None);
    }

    #[test]
    fn test_wheel_fires_after_debounce() {
        let t0 = Instant::now();
        let mut wheel = WheelDebouncer::default();
        wheel.wheel(120.0, t0, false);
        assert_eq!(wheel.poll(t0 + Duration::from_millis(10)), None);
        assert_eq!(wheel.poll(t0 + WHEEL_DEBOUNCE), Some(Command::Next));
        assert_eq!(wheel.poll(t0 + Duration::from_millis(200)), None);
    }

    #[test]
    fn test_wheel_burst_keeps_last_event() {
        let t0 = Instant::now();
        let mut wheel = WheelDebouncer::default();
        wheel.wheel(120.0, t0, false);
        wheel.wheel(-120.0, t0 + Duration::from_millis(30), false);
        assert_eq!(wheel.poll(t0 + Duration::from_millis(60)), None);
        assert_eq!(wheel.poll(t0 + Duration::from_millis(80)), Some(Command::Prev));
    }

    #[test]
    fn test_small_wheel_delta_ignored() {
        let t0 = Instant::now();
        let mut wheel = WheelDebouncer::default();
        wheel.wheel(50.0, t0, false);
        assert_eq!(wheel.poll(t0 + WHEEL_DEBOUNCE), None);
        assert!(wheel.remaining(t0).is_none());
    }

    #[test]
    fn test_wheel_ignored_while_animating() {
        let t0 = Instant::now();
        let mut wheel = WheelDebouncer::default();
        wheel.wheel(200.0, t0, true);
        assert!(wheel.remaining(t0).is_none());
        assert_eq!(wheel.poll(t0 + WHEEL_DEBOUNCE), None);
    }

    #[test]
    fn test_wheel_units() {
        let down = egui::vec2(0.0, -1.0);
        assert_eq!(wheel_delta_points(egui::MouseWheelUnit::Line, down, 720.0), 100.0);
        assert_eq!(wheel_delta_points(egui::MouseWheelUnit::Page, down, 720.0), 720.0);
        assert_eq!(
            wheel_delta_points(egui::MouseWheelUnit::Point, egui::vec2(0.0, 30.0), 720.0),
            -30.0
        );
    }
}
