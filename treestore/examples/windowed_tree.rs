// Example: feeding per-subtree extents into the windowing engine so only the
// on-screen part of a large expanded tree is materialized.
use lazylist::LazyList;
use treestore::{TreeStore, TreeStoreOptions};

#[derive(Clone, Debug)]
struct Row {
    id: u32,
    children: Vec<Row>,
}

fn main() {
    // 200 top-level branches with 50 leaves each.
    let data: Vec<Row> = (0..200)
        .map(|i| Row {
            id: i,
            children: (0..50)
                .map(|j| Row {
                    id: 10_000 + i * 100 + j,
                    children: Vec::new(),
                })
                .collect(),
        })
        .collect();

    let mut store: TreeStore<Row, u32> = TreeStore::new(
        data,
        TreeStoreOptions::new()
            .with_key_of(|r: &Row| Some(r.id))
            .with_children_of(|r: &Row| r.children.clone()),
    );
    for id in 0..10 {
        store.expand_key(&id, false).unwrap();
    }

    // One windowing item per top-level subtree, sized by its rendered extent.
    let mut list = LazyList::new(store.window_options());
    list.set_viewport(2_000, 800);

    println!("rendered tree extent: {}", list.total_size());
    println!("materialized subtrees: {:?}", list.window_range());
    println!("scroll target for node 5: {:?}", store.node_position(&5));
}
