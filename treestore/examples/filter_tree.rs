// Example: filtering a tree while keeping matched ancestor paths visible.
use treestore::{TreeStore, TreeStoreOptions};

#[derive(Clone, Debug)]
struct City {
    id: u32,
    name: &'static str,
    children: Vec<City>,
}

fn city(id: u32, name: &'static str, children: Vec<City>) -> City {
    City { id, name, children }
}

fn main() {
    let data = vec![
        city(
            1,
            "Asia",
            vec![
                city(11, "China", vec![city(111, "Beijing", vec![]), city(112, "Shanghai", vec![])]),
                city(12, "Japan", vec![city(121, "Tokyo", vec![])]),
            ],
        ),
        city(2, "Europe", vec![city(21, "France", vec![])]),
    ];

    let mut store: TreeStore<City, u32> = TreeStore::new(
        data,
        TreeStoreOptions::new()
            .with_key_of(|c: &City| Some(c.id))
            .with_children_of(|c: &City| c.children.clone())
            .with_filter_method(|query, c: &City, _node| c.name.contains(query)),
    );

    store.filter("Tokyo", true, true).unwrap();

    let mut visible = Vec::new();
    for &top in store.top_level().to_vec().iter() {
        collect_visible(&store, top, &mut visible);
    }
    println!("visible rows after filtering for \"Tokyo\": {visible:?}");
    println!("scroll target for Tokyo: {:?}", store.node_position(&121));
}

fn collect_visible(store: &TreeStore<City, u32>, id: treestore::NodeId, out: &mut Vec<&'static str>) {
    let node = store.node(id).unwrap();
    if !node.is_visible() {
        return;
    }
    out.push(node.data().unwrap().name);
    if node.is_expanded() {
        for &child in node.children() {
            collect_visible(store, child, out);
        }
    }
}
