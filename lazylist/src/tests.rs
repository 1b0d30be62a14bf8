use crate::*;

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::vec;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }

    fn gen_range_u32(&mut self, start: u32, end_exclusive: u32) -> u32 {
        self.gen_range_u64(start as u64, end_exclusive as u64) as u32
    }
}

fn axis_slot(axis: Axis) -> usize {
    match axis {
        Axis::Vertical => 0,
        Axis::Horizontal => 1,
    }
}

struct FakeInner {
    offset: [i64; 2],
    extent: [u32; 2],
    next_id: u64,
    listeners: Vec<(SubscriptionId, SourceEvent, SourceListener)>,
}

/// A deterministic scroll source double: offsets and extents are set by the
/// test, and setters fire the registered listeners synchronously the way an
/// event loop would.
struct FakeScrollSource {
    inner: Mutex<FakeInner>,
}

impl FakeScrollSource {
    fn new(offset: i64, extent: u32) -> Self {
        Self {
            inner: Mutex::new(FakeInner {
                offset: [offset, 0],
                extent: [extent, 0],
                next_id: 0,
                listeners: Vec::new(),
            }),
        }
    }

    fn set_offset(&self, axis: Axis, offset: i64) {
        let fired = {
            let mut inner = self.inner.lock().unwrap();
            inner.offset[axis_slot(axis)] = offset;
            collect_listeners(&inner, SourceEvent::Scroll)
        };
        for listener in fired {
            listener();
        }
    }

    fn set_extent(&self, axis: Axis, extent: u32) {
        let fired = {
            let mut inner = self.inner.lock().unwrap();
            inner.extent[axis_slot(axis)] = extent;
            collect_listeners(&inner, SourceEvent::Resize)
        };
        for listener in fired {
            listener();
        }
    }

    fn listener_count(&self) -> usize {
        self.inner.lock().unwrap().listeners.len()
    }
}

fn collect_listeners(inner: &FakeInner, event: SourceEvent) -> Vec<SourceListener> {
    inner
        .listeners
        .iter()
        .filter(|(_, e, _)| *e == event)
        .map(|(_, _, l)| Arc::clone(l))
        .collect()
}

impl ScrollSource for FakeScrollSource {
    fn scroll_offset(&self, axis: Axis) -> i64 {
        self.inner.lock().unwrap().offset[axis_slot(axis)]
    }

    fn viewport_extent(&self, axis: Axis) -> u32 {
        self.inner.lock().unwrap().extent[axis_slot(axis)]
    }

    fn subscribe(&self, event: SourceEvent, listener: SourceListener) -> SubscriptionId {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = SubscriptionId(inner.next_id);
        inner.listeners.push((id, event, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.inner.lock().unwrap();
        inner.listeners.retain(|(sub, _, _)| *sub != id);
    }
}

fn materialized_indexes(list: &LazyList) -> Vec<usize> {
    let mut out = Vec::new();
    list.for_each_slot(|slot| {
        if slot.materialized {
            out.push(slot.index);
        }
    });
    out
}

#[test]
fn fixed_size_total_and_range() {
    let mut list = LazyList::new(LazyListOptions::new(100, 1u32));
    list.set_viewport(0, 10);
    assert_eq!(list.total_size(), 100);

    // Item 10 starts exactly at the window end: boundary-inclusive.
    let range = list.window_range();
    assert_eq!(range.start_index, 0);
    assert_eq!(range.end_index, 11);
}

#[test]
fn boundary_inclusive_intersection() {
    // Items occupy [0,90], [90,140], [140,200], [200,250].
    let sizes = [90u32, 50, 60, 50];
    let mut list = LazyList::new(LazyListOptions::new(
        4,
        ItemSize::computed(move |i| sizes[i]),
    ));
    list.set_viewport(0, 100);

    // [90,140] touches the window, [140,200] and [200,250] start past it.
    assert_eq!(materialized_indexes(&list), vec![0, 1]);
    let range = list.window_range();
    assert_eq!(range.start_index, 0);
    assert_eq!(range.end_index, 2);

    // An item ending exactly at the window start stays materialized.
    list.set_viewport(90, 100);
    assert_eq!(materialized_indexes(&list), vec![0, 1, 2]);
}

#[test]
fn zero_items_zero_length() {
    let mut list = LazyList::new(LazyListOptions::new(0, 40u32));
    list.set_viewport(0, 500);
    assert_eq!(list.total_size(), 0);
    assert!(list.window_range().is_empty());
    let mut slots = Vec::new();
    list.collect_slots(&mut slots);
    assert!(slots.is_empty());
}

#[test]
fn placeholders_preserve_total_length() {
    let mut list = LazyList::new(LazyListOptions::new(50, 20u32));
    list.set_viewport(300, 60);

    let mut slots = Vec::new();
    list.collect_slots(&mut slots);
    assert_eq!(slots.len(), 50);
    assert_eq!(slots.last().unwrap().end(), list.total_size());

    // The running offset advances through placeholders too.
    for pair in slots.windows(2) {
        assert_eq!(pair[0].end(), pair[1].start);
    }
    assert!(slots.iter().any(|s| !s.materialized));
}

#[test]
fn list_origin_translates_window() {
    let mut list = LazyList::new(LazyListOptions::new(10, 10u32).with_list_origin(100));
    // Parent scrolled to 100: the window lands on the first 50 units of the list.
    list.set_viewport(100, 50);
    let range = list.window_range();
    assert_eq!(range.start_index, 0);
    assert_eq!(range.end_index, 6);

    // Window entirely before the list.
    list.set_viewport(0, 50);
    assert!(list.window_range().is_empty());
}

#[test]
fn mount_binds_and_samples_immediately() {
    let source = Arc::new(FakeScrollSource::new(40, 120));
    let mut list = LazyList::new(LazyListOptions::new(100, 10u32));
    list.mount(source.clone(), 0);

    assert!(list.is_bound());
    assert_eq!(source.listener_count(), 2);
    assert_eq!(list.viewport(), Viewport { offset: 40, extent: 120 });
}

#[test]
fn startup_delay_defers_binding() {
    let source = Arc::new(FakeScrollSource::new(0, 100));
    let mut list = LazyList::new(LazyListOptions::new(10, 10u32).with_delay_ms(300));
    list.mount(source.clone(), 0);

    assert!(!list.is_bound());
    assert_eq!(source.listener_count(), 0);
    assert!(!list.poll(299));
    assert!(list.poll(300));
    assert!(list.is_bound());
    assert_eq!(source.listener_count(), 2);
}

#[test]
fn debounce_coalesces_scroll_bursts() {
    let source = Arc::new(FakeScrollSource::new(0, 100));
    let mut list = LazyList::new(LazyListOptions::new(100, 10u32).with_debounce_ms(10));
    list.mount(source.clone(), 0);
    assert_eq!(list.viewport().offset, 0);

    source.set_offset(Axis::Vertical, 50);
    assert!(!list.poll(5)); // burst noticed, quiet interval armed
    assert_eq!(list.viewport().offset, 0);

    source.set_offset(Axis::Vertical, 200);
    assert!(!list.poll(12)); // new event restarts the interval
    assert!(!list.poll(20));
    assert!(list.poll(22));
    assert_eq!(list.viewport().offset, 200);
}

#[test]
fn zero_debounce_samples_on_next_poll() {
    let source = Arc::new(FakeScrollSource::new(0, 100));
    let mut list = LazyList::new(LazyListOptions::new(100, 10u32).with_debounce_ms(0));
    list.mount(source.clone(), 0);

    source.set_offset(Axis::Vertical, 70);
    assert!(list.poll(1));
    assert_eq!(list.viewport().offset, 70);
}

#[test]
fn resize_events_resample_extent() {
    let source = Arc::new(FakeScrollSource::new(0, 100));
    let mut list = LazyList::new(LazyListOptions::new(100, 10u32).with_debounce_ms(0));
    list.mount(source.clone(), 0);

    source.set_extent(Axis::Vertical, 250);
    assert!(list.poll(1));
    assert_eq!(list.viewport().extent, 250);
}

#[test]
fn unmount_unsubscribes_immediately() {
    let source = Arc::new(FakeScrollSource::new(0, 100));
    let mut list = LazyList::new(LazyListOptions::new(100, 10u32));
    list.mount(source.clone(), 0);
    assert_eq!(source.listener_count(), 2);

    list.unmount();
    assert_eq!(source.listener_count(), 0);
    assert!(!list.is_bound());

    // Late events are invisible: nothing pending, nothing sampled.
    source.set_offset(Axis::Vertical, 500);
    assert!(!list.poll(100));
    assert_eq!(list.viewport().offset, 0);
}

#[test]
fn drop_unsubscribes() {
    let source = Arc::new(FakeScrollSource::new(0, 100));
    {
        let mut list = LazyList::new(LazyListOptions::new(10, 10u32));
        list.mount(source.clone(), 0);
        assert_eq!(source.listener_count(), 2);
    }
    assert_eq!(source.listener_count(), 0);
}

#[test]
fn rebind_switches_scroll_parents() {
    let old = Arc::new(FakeScrollSource::new(10, 100));
    let new = Arc::new(FakeScrollSource::new(999, 40));
    let mut list = LazyList::new(LazyListOptions::new(200, 10u32));
    list.mount(old.clone(), 0);
    assert_eq!(list.viewport().offset, 10);

    list.rebind(new.clone(), 50);
    assert_eq!(old.listener_count(), 0);
    assert_eq!(new.listener_count(), 2);
    assert_eq!(list.viewport(), Viewport { offset: 999, extent: 40 });
}

#[test]
fn refresh_resolves_each_item_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let row = Arc::new(AtomicU32::new(10));
    let calls_in = Arc::clone(&calls);
    let row_in = Arc::clone(&row);
    let mut list = LazyList::new(LazyListOptions::new(
        8,
        ItemSize::computed(move |_| {
            calls_in.fetch_add(1, Ordering::Relaxed);
            row_in.load(Ordering::Relaxed)
        }),
    ));
    assert_eq!(calls.load(Ordering::Relaxed), 8);
    assert_eq!(list.total_size(), 80);

    // Programmatic change the listeners cannot observe, then the explicit
    // recomputation trigger.
    row.store(36, Ordering::Relaxed);
    list.refresh();
    assert_eq!(calls.load(Ordering::Relaxed), 16);
    assert_eq!(list.total_size(), 8 * 36);
}

#[test]
fn item_size_shape_switch_between_passes() {
    let mut list = LazyList::new(LazyListOptions::new(4, 25u32));
    assert_eq!(list.total_size(), 100);

    list.set_item_size(ItemSize::computed(|i| (i as u32 + 1) * 10));
    assert_eq!(list.total_size(), 10 + 20 + 30 + 40);

    list.set_item_size(5u32);
    assert_eq!(list.total_size(), 20);
}

#[test]
fn on_change_fires_once_per_batch() {
    let fired = Arc::new(AtomicUsize::new(0));
    let fired_in = Arc::clone(&fired);
    let mut list = LazyList::new(
        LazyListOptions::new(10, 10u32)
            .with_on_change(Some(move |_: &LazyList, _| {
                fired_in.fetch_add(1, Ordering::Relaxed);
            })),
    );

    fired.store(0, Ordering::Relaxed);
    list.batch_update(|l| {
        l.set_viewport(10, 50);
        l.set_count(20);
        l.set_list_origin(5);
    });
    assert_eq!(fired.load(Ordering::Relaxed), 1);
}

#[test]
fn horizontal_axis_samples_horizontal_offsets() {
    let source = Arc::new(FakeScrollSource::new(0, 0));
    source.set_offset(Axis::Horizontal, 120);
    source.set_extent(Axis::Horizontal, 80);

    let mut list =
        LazyList::new(LazyListOptions::new(100, 10u32).with_axis(Axis::Horizontal));
    list.mount(source.clone(), 0);
    assert_eq!(list.viewport(), Viewport { offset: 120, extent: 80 });
}

#[derive(Clone)]
struct FakeNode {
    scrollable: bool,
    parent: Option<Arc<FakeNode>>,
}

impl ScrollNode for Arc<FakeNode> {
    fn is_scrollable(&self, _axis: Axis) -> bool {
        self.scrollable
    }

    fn parent(&self) -> Option<Self> {
        self.parent.clone()
    }
}

#[test]
fn find_scroll_parent_walks_ancestry() {
    let root = Arc::new(FakeNode { scrollable: false, parent: None });
    let mid = Arc::new(FakeNode { scrollable: true, parent: Some(root.clone()) });
    let leaf = Arc::new(FakeNode { scrollable: false, parent: Some(mid.clone()) });

    let found = find_scroll_parent(leaf.clone(), Axis::Vertical);
    assert!(Arc::ptr_eq(&found, &mid));

    // Nothing scrollable: fall back to the chain root.
    let plain_leaf = Arc::new(FakeNode { scrollable: false, parent: Some(root.clone()) });
    let found = find_scroll_parent(plain_leaf, Axis::Vertical);
    assert!(Arc::ptr_eq(&found, &root));
}

#[test]
fn window_range_matches_slot_walk() {
    let mut rng = Lcg::new(0x5eed);
    for _ in 0..200 {
        let count = rng.gen_range_u64(0, 40) as usize;
        let sizes: Vec<u32> = (0..count).map(|_| rng.gen_range_u32(0, 60)).collect();
        let sizes_for_fn = sizes.clone();
        let mut list = LazyList::new(LazyListOptions::new(
            count,
            ItemSize::computed(move |i| sizes_for_fn[i]),
        ));
        let offset = rng.gen_range_u64(0, 2000) as i64 - 500;
        let extent = rng.gen_range_u32(1, 300);
        list.set_viewport(offset, extent);

        let range = list.window_range();
        let walked = materialized_indexes(&list);
        let from_range: Vec<usize> = (range.start_index..range.end_index).collect();
        assert_eq!(walked, from_range, "offset={offset} extent={extent} sizes={sizes:?}");
    }
}

#[test]
fn viewport_state_round_trip() {
    let mut list = LazyList::new(LazyListOptions::new(10, 10u32).with_list_origin(30));
    list.set_viewport(80, 60);
    let state = list.viewport_state();

    let mut restored = LazyList::new(LazyListOptions::new(10, 10u32));
    restored.restore_viewport_state(state);
    assert_eq!(restored.viewport(), Viewport { offset: 80, extent: 60 });
    assert_eq!(restored.options().list_origin, 30);
    assert_eq!(restored.window_range(), list.window_range());
}
