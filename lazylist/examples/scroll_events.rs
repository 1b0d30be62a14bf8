// Example: driving the engine from a scroll source with debounced sampling.
use std::sync::{Arc, Mutex};

use lazylist::{
    Axis, ItemSize, LazyList, LazyListOptions, ScrollSource, SourceEvent, SourceListener,
    SubscriptionId,
};

/// A toy scroll container: one offset, one extent, synchronous listeners.
struct Container {
    state: Mutex<(i64, u32, u64, Vec<(SubscriptionId, SourceEvent, SourceListener)>)>,
}

impl Container {
    fn new(extent: u32) -> Self {
        Self {
            state: Mutex::new((0, extent, 0, Vec::new())),
        }
    }

    fn scroll_to(&self, offset: i64) {
        let fired: Vec<SourceListener> = {
            let mut state = self.state.lock().unwrap();
            state.0 = offset;
            state
                .3
                .iter()
                .filter(|(_, e, _)| *e == SourceEvent::Scroll)
                .map(|(_, _, l)| Arc::clone(l))
                .collect()
        };
        for listener in fired {
            listener();
        }
    }
}

impl ScrollSource for Container {
    fn scroll_offset(&self, _axis: Axis) -> i64 {
        self.state.lock().unwrap().0
    }

    fn viewport_extent(&self, _axis: Axis) -> u32 {
        self.state.lock().unwrap().1
    }

    fn subscribe(&self, event: SourceEvent, listener: SourceListener) -> SubscriptionId {
        let mut state = self.state.lock().unwrap();
        state.2 += 1;
        let id = SubscriptionId(state.2);
        state.3.push((id, event, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.state.lock().unwrap().3.retain(|(sub, _, _)| *sub != id);
    }
}

fn main() {
    let container = Arc::new(Container::new(400));
    let mut list = LazyList::new(
        LazyListOptions::new(10_000, ItemSize::computed(|i| 20 + (i % 5) as u32 * 8))
            .with_debounce_ms(10)
            .with_on_change(Some(|list: &LazyList, range| {
                println!("window changed: {range:?} (total {})", list.total_size());
            })),
    );

    list.mount(container.clone(), 0);

    // A burst of scroll events collapses into a single sample.
    container.scroll_to(5_000);
    container.scroll_to(5_200);
    container.scroll_to(5_400);
    list.poll(5);
    list.poll(16);

    println!("viewport={:?}", list.viewport());
    list.unmount();
}
