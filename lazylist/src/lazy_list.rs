use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::fenwick::PrefixSums;
use crate::source::{ScrollSource, SourceEvent, SubscriptionId};
use crate::{ItemSize, LazyListOptions, Viewport, ViewportState, WindowRange, WindowSlot};

/// A headless viewport windowing engine.
///
/// This type is intentionally UI-agnostic:
/// - It does not hold any UI objects, only a [`ScrollSource`] capability.
/// - The embedding layer drives it: `mount` it on a source, then `poll` it
///   with a monotonic clock so debounced samples can settle.
/// - Rendering is exposed via iteration APIs (`for_each_slot`,
///   `for_each_materialized`) that walk the item sequence with a running
///   offset; placeholders keep their extent so total length is preserved.
pub struct LazyList {
    options: LazyListOptions,
    sizes: Vec<u32>,
    sums: PrefixSums,
    viewport: Viewport,

    source: Option<Arc<dyn ScrollSource>>,
    subscriptions: Vec<SubscriptionId>,
    scroll_dirty: Arc<AtomicBool>,
    resize_dirty: Arc<AtomicBool>,
    mounted_at_ms: Option<u64>,
    bound: bool,
    sample_due_ms: Option<u64>,

    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl LazyList {
    pub fn new(options: LazyListOptions) -> Self {
        lldebug!(
            count = options.count,
            debounce_ms = options.debounce_ms,
            delay_ms = options.delay_ms,
            "LazyList::new"
        );
        let mut list = Self {
            options,
            sizes: Vec::new(),
            sums: PrefixSums::default(),
            viewport: Viewport::default(),
            source: None,
            subscriptions: Vec::new(),
            scroll_dirty: Arc::new(AtomicBool::new(false)),
            resize_dirty: Arc::new(AtomicBool::new(false)),
            mounted_at_ms: None,
            bound: false,
            sample_due_ms: None,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        };
        list.resolve_sizes();
        list
    }

    pub fn options(&self) -> &LazyListOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: LazyListOptions) {
        let sizes_unchanged = self.options.count == options.count
            && item_size_eq(&self.options.item_size, &options.item_size);
        self.options = options;
        if !sizes_unchanged {
            self.resolve_sizes();
        }
        self.notify();
    }

    /// Clones the current options, applies `f`, then delegates to
    /// `set_options`, which decides what needs to be recomputed.
    pub fn update_options(&mut self, f: impl FnOnce(&mut LazyListOptions)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    pub fn count(&self) -> usize {
        self.options.count
    }

    pub fn set_count(&mut self, count: usize) {
        if self.options.count == count {
            return;
        }
        self.options.count = count;
        self.resolve_sizes();
        self.notify();
    }

    pub fn set_item_size(&mut self, item_size: impl Into<ItemSize>) {
        self.options.item_size = item_size.into();
        self.resolve_sizes();
        self.notify();
    }

    pub fn set_list_origin(&mut self, list_origin: i64) {
        if self.options.list_origin == list_origin {
            return;
        }
        self.options.list_origin = list_origin;
        self.notify();
    }

    pub fn set_on_change(
        &mut self,
        on_change: Option<impl Fn(&LazyList, WindowRange) + Send + Sync + 'static>,
    ) {
        self.options.on_change = on_change.map(|f| Arc::new(f) as _);
        self.notify();
    }

    /// The most recently sampled viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Drives the viewport directly, bypassing any scroll source.
    ///
    /// Useful for adapters that already own their event plumbing.
    pub fn set_viewport(&mut self, offset: i64, extent: u32) {
        let next = Viewport { offset, extent };
        if self.viewport == next {
            return;
        }
        self.viewport = next;
        self.notify();
    }

    pub fn viewport_state(&self) -> ViewportState {
        ViewportState {
            viewport: self.viewport,
            list_origin: self.options.list_origin,
        }
    }

    pub fn restore_viewport_state(&mut self, state: ViewportState) {
        self.batch_update(|list| {
            list.options.list_origin = state.list_origin;
            list.viewport = state.viewport;
            list.notify();
        });
    }

    // ---- source lifecycle ----

    /// Attaches the engine to a scroll source.
    ///
    /// With `delay_ms == 0` listeners are attached and the source sampled
    /// immediately; otherwise binding is deferred until the first `poll` at or
    /// after `now_ms + delay_ms`.
    pub fn mount(&mut self, source: Arc<dyn ScrollSource>, now_ms: u64) {
        self.batch_update(|list| {
            list.unbind();
            list.source = Some(source);
            list.mounted_at_ms = Some(now_ms);
            if list.options.delay_ms == 0 {
                list.bind();
            }
        });
    }

    /// Detaches from the current scroll source, dropping all subscriptions
    /// immediately.
    pub fn unmount(&mut self) {
        self.unbind();
        self.source = None;
        self.mounted_at_ms = None;
    }

    /// Switches to a new scroll source (the nearest scrollable parent
    /// changed), rebinding listeners without waiting for the startup delay
    /// again.
    pub fn rebind(&mut self, source: Arc<dyn ScrollSource>, now_ms: u64) {
        self.batch_update(|list| {
            list.unbind();
            list.source = Some(source);
            if list.mounted_at_ms.is_none() {
                list.mounted_at_ms = Some(now_ms);
            }
            list.bind();
        });
    }

    pub fn is_mounted(&self) -> bool {
        self.source.is_some()
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Advances the engine: performs a deferred bind once the startup delay
    /// has elapsed, and turns pending scroll/resize events into a sample once
    /// the debounce window goes quiet.
    ///
    /// Returns `true` when a sample was applied this call.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let mut sampled = false;

        if !self.bound && self.source.is_some() {
            if let Some(mounted) = self.mounted_at_ms {
                if now_ms >= mounted.saturating_add(self.options.delay_ms) {
                    self.batch_update(|list| list.bind());
                    sampled = true;
                }
            }
        }

        if !self.bound {
            return sampled;
        }

        let scrolled = self.scroll_dirty.swap(false, Ordering::AcqRel);
        let resized = self.resize_dirty.swap(false, Ordering::AcqRel);
        if scrolled || resized {
            lltrace!(scrolled, resized, now_ms, "poll: events pending");
            // Every burst restarts the quiet interval.
            self.sample_due_ms = Some(now_ms.saturating_add(self.options.debounce_ms));
        }

        if let Some(due) = self.sample_due_ms {
            if now_ms >= due {
                self.sample_due_ms = None;
                self.batch_update(|list| list.sample());
                sampled = true;
            }
        }

        sampled
    }

    /// Explicit recomputation trigger.
    ///
    /// Re-resolves every item size (exactly once per item), rebuilds the
    /// prefix sums, resamples the source when bound, and notifies. Embedders
    /// call this after programmatic changes (expand/collapse, data edits)
    /// that the scroll/resize listeners cannot observe.
    pub fn refresh(&mut self) {
        lldebug!(count = self.options.count, "refresh");
        self.batch_update(|list| {
            list.resolve_sizes();
            if list.bound {
                list.sample();
            } else {
                list.notify();
            }
        });
    }

    // ---- windowing queries ----

    /// Sum of all item sizes: the spacer extent that keeps the scrollbar
    /// honest.
    pub fn total_size(&self) -> u64 {
        self.sums.total()
    }

    pub fn item_size(&self, index: usize) -> Option<u32> {
        self.sizes.get(index).copied()
    }

    /// Start offset of `index` in list coordinates.
    pub fn item_start(&self, index: usize) -> Option<u64> {
        (index < self.options.count).then(|| self.sums.prefix_sum(index))
    }

    /// The materialized index range: every item whose `[start, start + size]`
    /// intersects the sampled viewport translated into list coordinates,
    /// boundary-inclusive on both ends.
    pub fn window_range(&self) -> WindowRange {
        let count = self.options.count;
        if count == 0 || self.viewport.extent == 0 {
            return WindowRange::default();
        }

        let (win_start, win_end) = self.list_window();
        if win_end < 0 {
            return WindowRange::default();
        }

        let start_index = if win_start <= 0 {
            0
        } else {
            // Items fully before the window: end <= win_start - 1.
            self.sums.lower_bound(win_start as u64 - 1)
        };

        let last = self.sums.lower_bound(win_end as u64);
        let end_index = core::cmp::min(last.saturating_add(1), count);

        if start_index >= end_index {
            return WindowRange::default();
        }
        WindowRange {
            start_index,
            end_index,
        }
    }

    /// Walks the whole item sequence in order, accumulating the running
    /// offset, and emits one [`WindowSlot`] per item. Slots outside the window
    /// carry `materialized = false` but still advance the offset.
    pub fn for_each_slot(&self, mut f: impl FnMut(WindowSlot)) {
        let (win_start, win_end) = self.list_window();
        let has_window = self.viewport.extent > 0;
        let mut start = 0u64;
        for (index, &size) in self.sizes.iter().enumerate() {
            let materialized = has_window && slot_intersects(start, size, win_start, win_end);
            f(WindowSlot {
                index,
                start,
                size,
                materialized,
            });
            start = start.saturating_add(size as u64);
        }
    }

    /// Emits only the materialized slots.
    pub fn for_each_materialized(&self, mut f: impl FnMut(WindowSlot)) {
        let range = self.window_range();
        if range.is_empty() {
            return;
        }
        let mut start = self.sums.prefix_sum(range.start_index);
        for index in range.start_index..range.end_index {
            let size = self.sizes[index];
            f(WindowSlot {
                index,
                start,
                size,
                materialized: true,
            });
            start = start.saturating_add(size as u64);
        }
    }

    /// Collects every slot into `out` (clears `out` first).
    pub fn collect_slots(&self, out: &mut Vec<WindowSlot>) {
        out.clear();
        self.for_each_slot(|slot| out.push(slot));
    }

    /// Collects the materialized slots into `out` (clears `out` first).
    pub fn collect_materialized(&self, out: &mut Vec<WindowSlot>) {
        out.clear();
        self.for_each_materialized(|slot| out.push(slot));
    }

    /// Batches multiple updates into a single `on_change` notification.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
    }

    // ---- internals ----

    fn resolve_sizes(&mut self) {
        let count = self.options.count;
        self.sizes.clear();
        self.sizes.reserve_exact(count);
        for i in 0..count {
            self.sizes.push(self.options.item_size.resolve(i));
        }
        self.sums = PrefixSums::from_sizes(&self.sizes);
    }

    /// The viewport translated into list coordinates, `[start, end]`.
    fn list_window(&self) -> (i64, i64) {
        let start = self.viewport.offset.saturating_sub(self.options.list_origin);
        let end = start.saturating_add(self.viewport.extent as i64);
        (start, end)
    }

    fn bind(&mut self) {
        let Some(source) = self.source.clone() else {
            return;
        };
        debug_assert!(self.subscriptions.is_empty(), "double bind");

        self.scroll_dirty.store(false, Ordering::Release);
        self.resize_dirty.store(false, Ordering::Release);

        let scroll_flag = Arc::clone(&self.scroll_dirty);
        let scroll_sub = source.subscribe(
            SourceEvent::Scroll,
            Arc::new(move || scroll_flag.store(true, Ordering::Release)),
        );
        let resize_flag = Arc::clone(&self.resize_dirty);
        let resize_sub = source.subscribe(
            SourceEvent::Resize,
            Arc::new(move || resize_flag.store(true, Ordering::Release)),
        );
        self.subscriptions.push(scroll_sub);
        self.subscriptions.push(resize_sub);
        self.bound = true;
        lldebug!("bound to scroll source");

        self.sample();
    }

    fn unbind(&mut self) {
        if let Some(source) = &self.source {
            for id in self.subscriptions.drain(..) {
                source.unsubscribe(id);
            }
        } else {
            self.subscriptions.clear();
        }
        self.bound = false;
        self.sample_due_ms = None;
        self.scroll_dirty.store(false, Ordering::Release);
        self.resize_dirty.store(false, Ordering::Release);
    }

    fn sample(&mut self) {
        let Some(source) = &self.source else {
            return;
        };
        let axis = self.options.axis;
        let next = Viewport {
            offset: source.scroll_offset(axis),
            extent: source.viewport_extent(axis),
        };
        lltrace!(offset = next.offset, extent = next.extent, "sample");
        if self.viewport != next {
            self.viewport = next;
        }
        self.notify();
    }

    fn notify_now(&self) {
        if let Some(cb) = &self.options.on_change {
            cb(self, self.window_range());
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }
}

impl Drop for LazyList {
    fn drop(&mut self) {
        self.unbind();
    }
}

impl core::fmt::Debug for LazyList {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LazyList")
            .field("options", &self.options)
            .field("viewport", &self.viewport)
            .field("bound", &self.bound)
            .field("total_size", &self.sums.total())
            .finish_non_exhaustive()
    }
}

/// Boundary-inclusive on both ends: an item touching the window edge is
/// still materialized.
fn slot_intersects(start: u64, size: u32, win_start: i64, win_end: i64) -> bool {
    let item_start = start as i128;
    let item_end = item_start + size as i128;
    item_end >= win_start as i128 && item_start <= win_end as i128
}

fn item_size_eq(a: &ItemSize, b: &ItemSize) -> bool {
    match (a, b) {
        (ItemSize::Fixed(a), ItemSize::Fixed(b)) => a == b,
        (ItemSize::Computed(a), ItemSize::Computed(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}
