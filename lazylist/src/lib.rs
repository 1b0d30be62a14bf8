//! A headless viewport windowing engine for large lists.
//!
//! Given an ordered sequence of items with individually computed sizes and a
//! scrollable parent, this crate decides which items intersect the visible
//! window and should be materialized; everything else stays a placeholder that
//! only contributes to the total scrollable length.
//!
//! It is UI-agnostic. An embedding layer is expected to provide:
//! - a [`ScrollSource`] for the nearest scrollable parent (offset, extent,
//!   origin, scroll/resize subscriptions)
//! - item sizes, fixed or computed per item
//! - a monotonic `now_ms` clock for debouncing and startup delay
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod fenwick;
mod lazy_list;
mod options;
mod source;
mod state;
mod types;

#[cfg(test)]
mod tests;

pub use lazy_list::LazyList;
pub use options::{LazyListOptions, OnChangeCallback};
pub use source::{
    ScrollNode, ScrollSource, SourceEvent, SourceListener, SubscriptionId, find_scroll_parent,
};
pub use state::ViewportState;
pub use types::{Axis, ItemSize, Viewport, WindowRange, WindowSlot};
