// Example: minimal windowing over a million fixed-size rows.
use lazylist::{LazyList, LazyListOptions};

fn main() {
    let mut list = LazyList::new(LazyListOptions::new(1_000_000, 36u32));
    list.set_viewport(123_456, 720);

    println!("total_size={}", list.total_size());
    println!("window_range={:?}", list.window_range());

    let mut materialized = Vec::new();
    list.collect_materialized(&mut materialized);
    println!("first_materialized={:?}", materialized.first());
    println!("materialized_count={}", materialized.len());
}
