use alloc::sync::Arc;

use crate::lazy_list::LazyList;
use crate::{Axis, ItemSize, WindowRange};

/// A callback fired after a windowing state update.
///
/// The second argument is the materialized range of the pass that just
/// settled.
pub type OnChangeCallback = Arc<dyn Fn(&LazyList, WindowRange) + Send + Sync>;

/// Configuration for [`crate::LazyList`].
///
/// Cheap to clone: the size resolver and callbacks live in `Arc`s, so an
/// embedder can tweak a field and call `LazyList::set_options` without
/// reallocating closures.
#[derive(Clone)]
pub struct LazyListOptions {
    pub count: usize,
    pub item_size: ItemSize,
    pub axis: Axis,

    /// Where the list starts inside the scroll parent's content, along the
    /// configured axis. Item positions are translated by this before they are
    /// intersected with the sampled viewport.
    pub list_origin: i64,

    /// Quiet interval for coalescing scroll/resize bursts into one sample.
    ///
    /// Zero is valid; every poll after an event then samples immediately.
    pub debounce_ms: u64,

    /// Startup delay before the engine binds to its scroll source.
    pub delay_ms: u64,

    /// Fired after each settled update (sample, refresh, option change).
    pub on_change: Option<OnChangeCallback>,
}

impl LazyListOptions {
    pub fn new(count: usize, item_size: impl Into<ItemSize>) -> Self {
        Self {
            count,
            item_size: item_size.into(),
            axis: Axis::Vertical,
            list_origin: 0,
            debounce_ms: 10,
            delay_ms: 0,
            on_change: None,
        }
    }

    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_list_origin(mut self, list_origin: i64) -> Self {
        self.list_origin = list_origin;
        self
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&LazyList, WindowRange) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }
}

impl core::fmt::Debug for LazyListOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LazyListOptions")
            .field("count", &self.count)
            .field("item_size", &self.item_size)
            .field("axis", &self.axis)
            .field("list_origin", &self.list_origin)
            .field("debounce_ms", &self.debounce_ms)
            .field("delay_ms", &self.delay_ms)
            .finish_non_exhaustive()
    }
}
