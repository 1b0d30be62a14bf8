// Example: lazy child loading driven through tickets.
use std::sync::{Arc, Mutex};

use treestore::{LoadTicket, TreeStore, TreeStoreOptions};

#[derive(Clone, Debug)]
struct Entry {
    path: &'static str,
}

fn main() {
    // A real embedder would kick off an async fetch here and complete the
    // ticket when the response lands; this example just parks the tickets.
    let pending: Arc<Mutex<Vec<LoadTicket>>> = Arc::new(Mutex::new(Vec::new()));
    let queue = Arc::clone(&pending);

    let mut store: TreeStore<Entry, &'static str> = TreeStore::new(
        Vec::new(),
        TreeStoreOptions::new()
            .with_key_of(|e: &Entry| Some(e.path))
            .with_lazy(true)
            .with_loader(move |ticket, payload| {
                println!("load requested for {:?}", payload.map(|e| e.path));
                queue.lock().unwrap().push(ticket);
            }),
    );

    // Resolve the root fetch.
    let root_ticket = pending.lock().unwrap().remove(0);
    store.complete_load(root_ticket, vec![Entry { path: "/usr" }, Entry { path: "/etc" }]);

    // Expanding issues exactly one load, no matter how often it is repeated.
    store.expand_key(&"/usr", false).unwrap();
    store.expand_key(&"/usr", false).unwrap();

    let ticket = pending.lock().unwrap().remove(0);
    store.complete_load(ticket, vec![Entry { path: "/usr/bin" }, Entry { path: "/usr/lib" }]);

    let usr = store.node_by_key(&"/usr").unwrap();
    println!("/usr children: {}", store.node(usr).unwrap().children().len());
}
