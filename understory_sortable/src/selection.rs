// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-container selection used by multi-drag.
//!
//! The engine keeps one [`Selection`] per container with `multi_drag` enabled.
//! Selections are keyed by value rather than by element so they survive
//! re-renders, and they carry an anchor for shift-click ranges.
//!
//! Clicks (a press released without dragging) map to selection changes:
//!
//! - plain click: [`Selection::select_only`]
//! - ctrl/meta click: [`Selection::toggle`]
//! - shift click: [`Selection::select_range`] from the anchor
//!
//! ```
//! use understory_sortable::selection::Selection;
//!
//! let order = ["a", "b", "c", "d"];
//! let mut sel = Selection::new();
//! sel.select_only("b");
//! sel.select_range(&order, "d");
//! assert_eq!(sel.items(), &["b", "c", "d"]);
//! assert_eq!(sel.anchor(), Some(&"b"));
//! ```

use alloc::vec::Vec;

/// Selected values of one container plus an anchor and a revision counter.
#[derive(Clone, Debug, Default)]
pub struct Selection<T> {
    items: Vec<T>,
    anchor: Option<usize>,
    revision: u64,
}

impl<T> Selection<T> {
    /// Creates an empty selection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            anchor: None,
            revision: 0,
        }
    }

    /// Returns `true` if nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of selected values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns the selected values in selection order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Returns the anchor used for range extension.
    #[must_use]
    pub fn anchor(&self) -> Option<&T> {
        self.anchor.map(|idx| &self.items[idx])
    }

    /// Returns a counter that bumps whenever the selection changes.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Deselects everything.
    pub fn clear(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.items.clear();
        self.anchor = None;
        self.bump_revision();
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

impl<T> Selection<T>
where
    T: Clone + PartialEq,
{
    /// Returns `true` if `value` is selected.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.items.iter().any(|v| v == value)
    }

    /// Selects only `value` and makes it the anchor.
    pub fn select_only(&mut self, value: T) {
        if self.items.len() == 1 && self.items[0] == value && self.anchor == Some(0) {
            return;
        }
        self.items.clear();
        self.items.push(value);
        self.anchor = Some(0);
        self.bump_revision();
    }

    /// Adds `value` if absent, removes it otherwise.
    ///
    /// An added value becomes the anchor; removing the anchor clears it.
    pub fn toggle(&mut self, value: T) {
        if let Some(idx) = self.items.iter().position(|v| *v == value) {
            self.items.remove(idx);
            self.anchor = match self.anchor {
                Some(a) if a == idx => None,
                Some(a) if a > idx => Some(a - 1),
                other => other,
            };
        } else {
            self.items.push(value);
            self.anchor = Some(self.items.len() - 1);
        }
        self.bump_revision();
    }

    /// Replaces the selection with the values between the anchor and `to`, inclusive.
    ///
    /// `order` is the container's current value order. Without an anchor (or if
    /// the anchor is no longer in `order`) this behaves like [`Self::select_only`].
    pub fn select_range(&mut self, order: &[T], to: T) {
        let anchor = self.anchor().cloned();
        let from = anchor
            .as_ref()
            .and_then(|a| order.iter().position(|v| v == a));
        let (Some(from), Some(end)) = (from, order.iter().position(|v| *v == to)) else {
            self.select_only(to);
            return;
        };
        let (start, stop) = if from <= end { (from, end) } else { (end, from) };
        let items: Vec<T> = order[start..=stop].to_vec();
        let anchor_idx = items.iter().position(|v| Some(v) == anchor.as_ref());
        if items == self.items && anchor_idx == self.anchor {
            return;
        }
        self.items = items;
        self.anchor = anchor_idx;
        self.bump_revision();
    }

    /// Drops selected values that are not in `present`.
    pub fn retain_present(&mut self, present: &[T]) {
        let anchor = self.anchor().cloned();
        let before = self.items.len();
        self.items.retain(|v| present.contains(v));
        if self.items.len() == before {
            return;
        }
        self.anchor = anchor.and_then(|a| self.items.iter().position(|v| *v == a));
        self.bump_revision();
    }

    /// Returns the selected values in the order they appear in `order`.
    #[must_use]
    pub fn in_order(&self, order: &[T]) -> Vec<T> {
        order
            .iter()
            .filter(|v| self.contains(v))
            .cloned()
            .collect()
    }
}
