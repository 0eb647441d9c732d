// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Edge auto-scroll while dragging.

use kurbo::{Point, Vec2};
use tracing::trace;

use crate::config::ScrollBehavior;
use crate::engine::DragEngine;
use crate::host::{Host, ScrollMetrics};

/// The scroll container being driven and its per-frame velocity.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct ScrollAssist<E> {
    pub(crate) target: Option<E>,
    pub(crate) velocity: Vec2,
}

impl<E> Default for ScrollAssist<E> {
    fn default() -> Self {
        Self {
            target: None,
            velocity: Vec2::ZERO,
        }
    }
}

impl<E> ScrollAssist<E> {
    pub(crate) fn stop(&mut self) {
        self.target = None;
        self.velocity = Vec2::ZERO;
    }
}

/// Velocity for a pointer at `pos` inside `metrics.viewport`.
///
/// Each axis scrolls at `speed` toward an edge when the pointer is within that
/// axis' zone fraction of it and the element can still scroll that way.
fn edge_velocity(metrics: &ScrollMetrics, pos: Point, behavior: &ScrollBehavior) -> Vec2 {
    let viewport = metrics.viewport;
    let zone_x = viewport.width() * behavior.x;
    let zone_y = viewport.height() * behavior.y;
    let mut velocity = Vec2::ZERO;
    if zone_x > 0.0 {
        if pos.x < viewport.x0 + zone_x {
            velocity.x = -behavior.speed;
        } else if pos.x > viewport.x1 - zone_x {
            velocity.x = behavior.speed;
        }
    }
    if zone_y > 0.0 {
        if pos.y < viewport.y0 + zone_y {
            velocity.y = -behavior.speed;
        } else if pos.y > viewport.y1 - zone_y {
            velocity.y = behavior.speed;
        }
    }
    if !metrics.can_scroll(Vec2::new(velocity.x, 0.0)) {
        velocity.x = 0.0;
    }
    if !metrics.can_scroll(Vec2::new(0.0, velocity.y)) {
        velocity.y = 0.0;
    }
    velocity
}

impl<H: Host> DragEngine<H> {
    /// Recomputes the auto-scroll target for a pointer at `pos`.
    pub(crate) fn update_scroll(&mut self, pos: Point) {
        let Some(parent) = self.drag_state().map(|s| s.current_parent) else {
            self.scroll.stop();
            return;
        };
        let Some(behavior) = self
            .registry
            .parent(parent)
            .map(|r| r.data.config.scroll_behavior)
        else {
            self.scroll.stop();
            return;
        };
        if !behavior.scroll_outside && !self.host.rect(parent).contains(pos) {
            self.scroll.stop();
            return;
        }

        let mut cursor = self.host.element_at(pos);
        while let Some(el) = cursor {
            if let Some(metrics) = self.host.scroll_metrics(el)
                && metrics.viewport.contains(pos)
            {
                let velocity = edge_velocity(&metrics, pos, &behavior);
                if velocity != Vec2::ZERO {
                    if self.scroll.target != Some(el) {
                        trace!(element = ?el, ?velocity, "auto-scroll engaged");
                    }
                    self.scroll.target = Some(el);
                    self.scroll.velocity = velocity;
                    return;
                }
            }
            cursor = self.host.parent_of(el);
        }
        self.scroll.stop();
    }

    /// Scrolls one frame. Returns `true` if anything moved.
    pub(crate) fn step_scroll(&mut self) -> bool {
        let Some(target) = self.scroll.target else {
            return false;
        };
        let velocity = self.scroll.velocity;
        let Some(metrics) = self.host.scroll_metrics(target) else {
            self.scroll.stop();
            return false;
        };
        if !metrics.can_scroll(velocity) {
            self.scroll.stop();
            return false;
        }
        self.host.scroll_by(target, velocity);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;

    fn metrics(offset: Vec2) -> ScrollMetrics {
        ScrollMetrics {
            viewport: Rect::new(0.0, 0.0, 100.0, 100.0),
            offset,
            max_offset: Vec2::new(0.0, 200.0),
        }
    }

    #[test]
    fn bottom_zone_scrolls_down() {
        let behavior = ScrollBehavior::default();
        let v = edge_velocity(&metrics(Vec2::ZERO), Point::new(50.0, 95.0), &behavior);
        assert_eq!(v, Vec2::new(0.0, 10.0));
    }

    #[test]
    fn top_zone_needs_room_to_scroll() {
        let behavior = ScrollBehavior::default();
        let at_top = edge_velocity(&metrics(Vec2::ZERO), Point::new(50.0, 5.0), &behavior);
        assert_eq!(at_top, Vec2::ZERO);
        let scrolled = edge_velocity(&metrics(Vec2::new(0.0, 40.0)), Point::new(50.0, 5.0), &behavior);
        assert_eq!(scrolled, Vec2::new(0.0, -10.0));
    }

    #[test]
    fn middle_is_still() {
        let behavior = ScrollBehavior::default();
        let v = edge_velocity(&metrics(Vec2::new(0.0, 40.0)), Point::new(50.0, 50.0), &behavior);
        assert_eq!(v, Vec2::ZERO);
    }
}
