// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Insert on drop.
//!
//! Instead of re-sorting live while the pointer moves, the insert plugin works
//! out the boundary between two nodes the pointer is closest to, asks the host
//! to show an insertion indicator there and records an
//! [`InsertTarget`](crate::state::InsertTarget). Values change only when the
//! drop lands, through the container's sort or transfer strategy.
//!
//! Node geometry is cached per node as [`InsertRanges`] on every remap.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;

use kurbo::{Point, Rect};
use tracing::trace;

use crate::engine::DragEngine;
use crate::handlers::{
    DropEvent, DropHandler, EndEvent, NodeOver, ParentOver, SortRequest, TransferRequest,
};
use crate::host::Host;
use crate::plugin::{HookContext, Plugin, PluginFactory, SetupContext};
use crate::state::InsertTarget;

/// Half the thickness of the insertion indicator.
const INDICATOR_HALF_WIDTH: f64 = 1.0;

/// Extent of a node along both axes, captured at remap time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InsertRanges {
    /// `(x0, x1)`.
    pub x: (f64, f64),
    /// `(y0, y1)`.
    pub y: (f64, f64),
}

impl InsertRanges {
    /// Captures the extents of `rect`.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            x: (rect.x0, rect.x1),
            y: (rect.y0, rect.y1),
        }
    }

    fn center(&self) -> Point {
        Point::new((self.x.0 + self.x.1) * 0.5, (self.y.0 + self.y.1) * 0.5)
    }
}

/// Insert plugin.
pub fn insert<H: Host>() -> PluginFactory<H> {
    Rc::new(|_parent: H::Element| -> Box<dyn Plugin<H>> { Box::new(Insert) })
}

#[derive(Debug)]
struct Insert;

impl<H: Host> Plugin<H> for Insert {
    fn setup(&mut self, ctx: &mut SetupContext<'_, H>) {
        ctx.handlers.handle_node_over = Rc::new(
            |engine: &mut DragEngine<H>, over: &NodeOver<H::Element>| {
                track_boundary(engine, over.parent, over.position);
            },
        );
        ctx.handlers.handle_parent_over = Rc::new(
            |engine: &mut DragEngine<H>, over: &ParentOver<H::Element>| {
                track_boundary(engine, over.parent, over.position);
            },
        );

        let fallback_drop = ctx.handlers.handle_drop.clone();
        ctx.handlers.handle_drop = Rc::new(
            move |engine: &mut DragEngine<H>, event: &DropEvent<H::Element>| {
                insert_on_drop(engine, event, &*fallback_drop);
            },
        );

        let fallback_end = ctx.handlers.handle_end.clone();
        ctx.handlers.handle_end = Rc::new(
            move |engine: &mut DragEngine<H>, event: &EndEvent<H::Element>| {
                clear_target(engine);
                fallback_end.handle_end(engine, event);
            },
        );
    }

    fn tear_down(&mut self, ctx: &mut HookContext<'_, H>) {
        ctx.host.set_insert_indicator(ctx.parent, None);
    }

    fn setup_node_remap(&mut self, ctx: &mut HookContext<'_, H>, node: H::Element) {
        let ranges = InsertRanges::from_rect(ctx.host.rect(node));
        ctx.set_insert_ranges(node, Some(ranges));
    }

    fn tear_down_node(&mut self, ctx: &mut HookContext<'_, H>, node: H::Element) {
        ctx.set_insert_ranges(node, None);
    }
}

/// Boundary index for `pos` and the indicator line drawn there.
///
/// Nodes lay out horizontally when the first two share a top edge.
fn boundary(ranges: &[InsertRanges], container: Rect, pos: Point) -> (usize, Rect) {
    let horizontal = ranges.len() >= 2 && ranges[0].y.0 == ranges[1].y.0;
    let index = ranges
        .iter()
        .filter(|r| {
            let center = r.center();
            if horizontal {
                center.x < pos.x
            } else {
                center.y < pos.y
            }
        })
        .count();

    let (Some(first), Some(last)) = (ranges.first(), ranges.last()) else {
        let y = container.y0;
        return (
            0,
            Rect::new(
                container.x0,
                y - INDICATOR_HALF_WIDTH,
                container.x1,
                y + INDICATOR_HALF_WIDTH,
            ),
        );
    };
    let line = if horizontal {
        let x = ranges.get(index).map_or(last.x.1, |r| r.x.0);
        Rect::new(
            x - INDICATOR_HALF_WIDTH,
            first.y.0,
            x + INDICATOR_HALF_WIDTH,
            first.y.1,
        )
    } else {
        let y = ranges.get(index).map_or(last.y.1, |r| r.y.0);
        Rect::new(
            first.x.0,
            y - INDICATOR_HALF_WIDTH,
            first.x.1,
            y + INDICATOR_HALF_WIDTH,
        )
    };
    (index, line)
}

fn track_boundary<H: Host>(engine: &mut DragEngine<H>, parent: H::Element, pos: Point) {
    let Some(state) = engine.drag_state() else {
        return;
    };
    let previous = state.insert_target;
    let accepted = if parent == state.current_parent {
        engine
            .lookup_parent(parent)
            .is_some_and(|r| r.config().sortable && !r.config().disabled)
    } else {
        engine.validate_transfer(parent, None)
    };
    if !accepted {
        trace!(?parent, "no insertion point here");
        clear_target(engine);
        return;
    }
    let Some(record) = engine.lookup_parent(parent) else {
        return;
    };
    let ranges: Vec<InsertRanges> = record
        .nodes()
        .iter()
        .filter_map(|el| engine.lookup_node(*el).and_then(|n| n.data.insert_ranges))
        .collect();
    let (index, line) = boundary(&ranges, engine.host().rect(parent), pos);

    if let Some(previous) = previous
        && previous.parent != parent
    {
        engine.host_mut().set_insert_indicator(previous.parent, None);
    }
    engine.host_mut().set_insert_indicator(parent, Some(line));
    engine.set_insert_target(Some(InsertTarget { parent, index }));
}

fn clear_target<H: Host>(engine: &mut DragEngine<H>) {
    if let Some(target) = engine.drag_state().and_then(|s| s.insert_target) {
        engine.host_mut().set_insert_indicator(target.parent, None);
        engine.set_insert_target(None);
    }
}

fn insert_on_drop<H: Host>(
    engine: &mut DragEngine<H>,
    event: &DropEvent<H::Element>,
    fallback: &dyn DropHandler<H>,
) {
    let Some(state) = engine.drag_state() else {
        return;
    };
    let current = state.current_parent;
    let Some(target) = state.insert_target else {
        fallback.handle_drop(engine, event);
        return;
    };
    if target.parent == current {
        let end = target.index.min(engine.values(current).len());
        let dragged_before = state.dragged.iter().filter(|d| d.index < end).count();
        let index = target.index - dragged_before;
        clear_target(engine);
        engine.perform_sort(&SortRequest {
            parent: current,
            target_node: None,
            index,
        });
    } else {
        let valid = engine.validate_transfer(target.parent, None);
        clear_target(engine);
        if valid {
            engine.perform_transfer(&TransferRequest {
                source: current,
                target: target.parent,
                target_node: None,
                index: target.index,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column() -> Vec<InsertRanges> {
        (0_u8..3)
            .map(|i| {
                let y = f64::from(i) * 10.0;
                InsertRanges::from_rect(Rect::new(0.0, y, 100.0, y + 10.0))
            })
            .collect()
    }

    #[test]
    fn boundary_counts_centers_before_pointer() {
        let container = Rect::new(0.0, 0.0, 100.0, 100.0);
        let (index, line) = boundary(&column(), container, Point::new(50.0, 12.0));
        assert_eq!(index, 1);
        assert_eq!(line, Rect::new(0.0, 9.0, 100.0, 11.0));

        let (index, line) = boundary(&column(), container, Point::new(50.0, 28.0));
        assert_eq!(index, 3);
        assert_eq!(line, Rect::new(0.0, 29.0, 100.0, 31.0));
    }

    #[test]
    fn boundary_detects_rows() {
        let row: Vec<_> = (0_u8..2)
            .map(|i| {
                let x = f64::from(i) * 20.0;
                InsertRanges::from_rect(Rect::new(x, 0.0, x + 20.0, 10.0))
            })
            .collect();
        let (index, line) = boundary(&row, Rect::new(0.0, 0.0, 100.0, 10.0), Point::new(25.0, 5.0));
        assert_eq!(index, 1);
        assert_eq!(line, Rect::new(19.0, 0.0, 21.0, 10.0));
    }

    #[test]
    fn empty_container_inserts_at_top() {
        let container = Rect::new(0.0, 40.0, 100.0, 100.0);
        let (index, line) = boundary(&[], container, Point::new(50.0, 70.0));
        assert_eq!(index, 0);
        assert_eq!(line, Rect::new(0.0, 39.0, 100.0, 41.0));
    }
}
