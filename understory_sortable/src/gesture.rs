// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture helpers: pointer tracking, long-press deadlines and move throttling.
//!
//! These are small polling state machines. None of them owns a timer; callers
//! pass the current time (milliseconds) and the helpers report what is due.
//!
//! ## Pointer tracking
//!
//! ```
//! use kurbo::{Point, Vec2};
//! use understory_sortable::gesture::PointerTrack;
//!
//! let mut track = PointerTrack::new(Point::new(10.0, 20.0));
//! track.update(Point::new(15.0, 25.0));
//! track.update(Point::new(20.0, 20.0));
//! assert_eq!(track.total_offset(), Vec2::new(10.0, 0.0));
//! ```
//!
//! ## Throttling
//!
//! [`MoveThrottle`] lets one sample through per frame interval and keeps only
//! the latest of the rest, so the most recent sample is never lost:
//!
//! ```
//! use understory_sortable::gesture::MoveThrottle;
//!
//! let mut throttle = MoveThrottle::new(16);
//! assert_eq!(throttle.push(1, 0), Some(1));
//! assert_eq!(throttle.push(2, 5), None);
//! assert_eq!(throttle.push(3, 9), None);
//! assert_eq!(throttle.flush(10), None);
//! assert_eq!(throttle.flush(16), Some(3));
//! ```

use kurbo::{Point, Vec2};

/// Tracks the pointer during a drag: where it started and where it was last seen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerTrack {
    start: Point,
    last: Point,
}

impl PointerTrack {
    /// Starts tracking at `pos`.
    #[must_use]
    pub fn new(pos: Point) -> Self {
        Self {
            start: pos,
            last: pos,
        }
    }

    /// Records `pos` as the latest position.
    pub fn update(&mut self, pos: Point) {
        self.last = pos;
    }

    /// The latest recorded position.
    #[must_use]
    pub fn last(&self) -> Point {
        self.last
    }

    /// Movement from the start to the latest recorded position.
    #[must_use]
    pub fn total_offset(&self) -> Vec2 {
        self.last - self.start
    }
}

/// A pending long press: where it began and when it fires.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongPress {
    origin: Point,
    deadline: u64,
}

impl LongPress {
    /// Starts a long press at `origin` that becomes due `duration` ms after `now`.
    #[must_use]
    pub fn new(origin: Point, now: u64, duration: u64) -> Self {
        Self {
            origin,
            deadline: now.saturating_add(duration),
        }
    }

    /// Where the press began.
    #[must_use]
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// When the press becomes due.
    #[must_use]
    pub fn deadline(&self) -> u64 {
        self.deadline
    }

    /// Returns `true` once `now` has reached the deadline.
    #[must_use]
    pub fn is_due(&self, now: u64) -> bool {
        now >= self.deadline
    }

    /// Returns `true` if `pos` has wandered more than `tolerance` from the origin.
    #[must_use]
    pub fn exceeds(&self, pos: Point, tolerance: f64) -> bool {
        (pos - self.origin).hypot2() > tolerance * tolerance
    }
}

/// Latest-wins throttle for high-frequency samples.
#[derive(Debug, Clone)]
pub struct MoveThrottle<T> {
    interval: u64,
    last: Option<u64>,
    pending: Option<T>,
}

impl<T> MoveThrottle<T> {
    /// Creates a throttle that releases at most one sample per `interval` ms.
    #[must_use]
    pub const fn new(interval: u64) -> Self {
        Self {
            interval,
            last: None,
            pending: None,
        }
    }

    fn is_open(&self, now: u64) -> bool {
        self.last
            .is_none_or(|last| now >= last.saturating_add(self.interval))
    }

    /// Offers a sample at time `now`.
    ///
    /// Returns the sample if it may be processed right away; otherwise keeps it
    /// (replacing any older pending sample) and returns `None`.
    pub fn push(&mut self, sample: T, now: u64) -> Option<T> {
        if self.is_open(now) {
            self.last = Some(now);
            self.pending = None;
            Some(sample)
        } else {
            self.pending = Some(sample);
            None
        }
    }

    /// Releases the pending sample if the interval has elapsed.
    pub fn flush(&mut self, now: u64) -> Option<T> {
        if self.pending.is_some() && self.is_open(now) {
            self.last = Some(now);
            self.pending.take()
        } else {
            None
        }
    }

    /// Releases the pending sample regardless of timing.
    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Returns `true` if a sample is waiting.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Forgets the pending sample and the timing window.
    pub fn reset(&mut self) {
        self.last = None;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_reports_total_offset() {
        let mut track = PointerTrack::new(Point::new(2.0, 2.0));
        assert_eq!(track.total_offset(), Vec2::ZERO);
        track.update(Point::new(5.0, 3.0));
        track.update(Point::new(8.0, 7.0));
        assert_eq!(track.last(), Point::new(8.0, 7.0));
        assert_eq!(track.total_offset(), Vec2::new(6.0, 5.0));
    }

    #[test]
    fn long_press_deadline_and_tolerance() {
        let press = LongPress::new(Point::new(10.0, 10.0), 100, 500);
        assert_eq!(press.deadline(), 600);
        assert!(!press.is_due(599));
        assert!(press.is_due(600));
        assert!(!press.exceeds(Point::new(13.0, 14.0), 5.0));
        assert!(press.exceeds(Point::new(13.0, 14.1), 5.0));
    }

    #[test]
    fn throttle_keeps_latest_sample() {
        let mut throttle = MoveThrottle::new(16);
        assert_eq!(throttle.push('a', 0), Some('a'));
        assert_eq!(throttle.push('b', 4), None);
        assert_eq!(throttle.push('c', 8), None);
        assert!(throttle.has_pending());
        assert_eq!(throttle.take(), Some('c'));
        assert!(!throttle.has_pending());
    }

    #[test]
    fn throttle_push_after_window_passes_through() {
        let mut throttle = MoveThrottle::new(16);
        assert_eq!(throttle.push(1, 0), Some(1));
        assert_eq!(throttle.push(2, 10), None);
        assert_eq!(throttle.push(3, 16), Some(3));
        assert_eq!(throttle.flush(100), None);
    }

    #[test]
    fn reset_reopens_window() {
        let mut throttle = MoveThrottle::new(16);
        assert_eq!(throttle.push(1, 0), Some(1));
        throttle.reset();
        assert_eq!(throttle.push(2, 1), Some(2));
    }
}
