// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in plugins.
//!
//! - [`swap`](swap::swap): exchange the dragged and hovered values instead of shifting.
//! - [`insert`](insert::insert): show an insertion indicator while dragging and
//!   commit only on drop.
//! - [`animations`](animations::animations): ask the host to animate nodes whose
//!   position changed after a remap.
//!
//! Each is a [`PluginFactory`](crate::plugin::PluginFactory) constructor meant
//! for [`ParentConfig::with_plugin`](crate::ParentConfig::with_plugin).

pub mod animations;
pub mod insert;
pub mod swap;
