use alloc::vec::Vec;
use core::cmp::Reverse;

use slotmap::SlotMap;

use crate::error::{Strictness, TreeError, require};
use crate::key::{KeyMap, NodeId, TreeKey};
use crate::node::TreeNode;
use crate::options::{FilterMethod, TreeStoreOptions};

/// A pending lazy-load handle.
///
/// The loader receives one per invocation and the embedder resolves it later
/// through [`TreeStore::complete_load`]. Tickets are bound to the store epoch
/// at issue time: replacing the data wholesale invalidates every outstanding
/// ticket, so late-arriving results can never resurrect discarded state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    pub(crate) node: NodeId,
    pub(crate) epoch: u64,
}

impl LoadTicket {
    /// The node whose children are being fetched.
    pub fn node(&self) -> NodeId {
        self.node
    }
}

/// Result of completing a lazy load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoadOutcome {
    /// Children were attached and the tree re-aggregated.
    Applied,
    /// The ticket no longer matches live state (node removed, data replaced,
    /// already completed); the result was discarded.
    Stale,
}

enum Notification {
    CheckChange {
        id: NodeId,
        was_checked: bool,
        was_indeterminate: bool,
    },
    Expand(NodeId),
    Collapse(NodeId),
    CurrentChange(Option<NodeId>),
}

/// The single source of truth for a mutable tree.
///
/// Owns the node arena, the key→node index, and every algorithm operating
/// over the whole tree: filtering, bulk check-state reconciliation, lazy-load
/// orchestration, and row-position math for windowed rendering.
///
/// Mutations settle fully (check-state aggregation included) before any
/// notification callback fires.
pub struct TreeStore<T, K> {
    arena: SlotMap<NodeId, TreeNode<T, K>>,
    root: NodeId,
    nodes_map: KeyMap<K, NodeId>,
    options: TreeStoreOptions<T, K>,
    current: Option<NodeId>,
    epoch: u64,
    settle_depth: usize,
    queued: Vec<Notification>,
}

impl<T, K: TreeKey> TreeStore<T, K> {
    /// Builds a store from top-level payloads.
    ///
    /// Eager stores materialize the whole tree through the `children_of`
    /// adapter. Lazy stores ignore `data` and fetch the root's children
    /// through the loader instead; default-checked initialization is deferred
    /// until that first load resolves, since the keys cannot be looked up
    /// before the nodes exist.
    pub fn new(data: Vec<T>, options: TreeStoreOptions<T, K>) -> Self {
        let mut arena = SlotMap::with_key();
        let root = arena.insert(TreeNode::root());
        let mut store = Self {
            arena,
            root,
            nodes_map: KeyMap::default(),
            options,
            current: None,
            epoch: 0,
            settle_depth: 0,
            queued: Vec::new(),
        };
        store.with_settle(|s| {
            if s.options.lazy && s.options.loader.is_some() {
                s.issue_load(s.root);
            } else {
                s.arena[s.root].loaded = true;
                s.build_children(s.root, data);
                s.init_defaults();
            }
        });
        store
    }

    pub fn options(&self) -> &TreeStoreOptions<T, K> {
        &self.options
    }

    /// The synthetic root. It carries no payload and no row; its children are
    /// the top-level nodes.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn top_level(&self) -> &[NodeId] {
        &self.arena[self.root].children
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode<T, K>> {
        self.arena.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains_key(id)
    }

    pub fn node_by_key(&self, key: &K) -> Option<NodeId> {
        self.nodes_map.get(key).copied()
    }

    /// Number of nodes, excluding the synthetic root.
    pub fn len(&self) -> usize {
        self.arena.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ---- filtering ----

    /// Recomputes `visible` for every node.
    ///
    /// A node's own visibility is the filter method's verdict. A node the
    /// method rejected is re-enabled when `enable_by_children` is set and at
    /// least one descendant stayed visible, so a matching leaf keeps its
    /// ancestor path reachable. Visible non-leaves are auto-expanded when
    /// `auto_expand` is set.
    ///
    /// Filtering without a configured filter method is a usage error and
    /// fails loudly, since callers depend on filter calls changing visibility.
    pub fn filter(
        &mut self,
        query: &str,
        enable_by_children: bool,
        auto_expand: bool,
    ) -> Result<(), TreeError> {
        let Some(method) = self.options.filter_method.clone() else {
            return Err(TreeError::FilterNotConfigured);
        };
        tsdebug!(query, enable_by_children, auto_expand, "filter");
        self.with_settle(|s| {
            s.filter_rec(s.root, query, &method, enable_by_children, auto_expand);
        });
        Ok(())
    }

    fn filter_rec(
        &mut self,
        id: NodeId,
        query: &str,
        method: &FilterMethod<T, K>,
        enable_by_children: bool,
        auto_expand: bool,
    ) -> bool {
        let children = self.arena[id].children.clone();
        let mut any_visible_child = false;
        for child in children {
            if self.filter_rec(child, query, method, enable_by_children, auto_expand) {
                any_visible_child = true;
            }
        }

        if id == self.root {
            return any_visible_child;
        }

        let own = {
            let node = &self.arena[id];
            match node.data.as_ref() {
                Some(data) => method(query, data, node),
                None => false,
            }
        };
        let visible = own || (enable_by_children && any_visible_child);
        self.arena[id].visible = visible;

        if visible && auto_expand && !self.arena[id].is_leaf() {
            self.expand_inner(id);
        }
        visible
    }

    // ---- check state ----

    /// Sets a node's checked state by key.
    pub fn set_checked(&mut self, key: &K, checked: bool, deep: bool) -> Result<(), TreeError> {
        if self.options.key_of.is_none() {
            return Err(TreeError::KeyNotConfigured);
        }
        let id = self.node_by_key(key).ok_or(TreeError::UnknownKey)?;
        self.set_node_checked(id, checked, deep)
    }

    /// Sets a node's checked state.
    ///
    /// With `deep`, the value is forced onto all descendants first. The
    /// node's own derived state is then reconciled from its immediate
    /// children and the recomputation propagated through every ancestor,
    /// deep or not. In strict mode nothing derives from children and nothing
    /// propagates; the node alone is set.
    pub fn set_node_checked(
        &mut self,
        id: NodeId,
        checked: bool,
        deep: bool,
    ) -> Result<(), TreeError> {
        if !self.arena.contains_key(id) {
            return Err(TreeError::NodeNotFound);
        }
        self.with_settle(|s| s.set_checked_inner(id, checked, deep));
        Ok(())
    }

    fn set_checked_inner(&mut self, id: NodeId, checked: bool, deep: bool) {
        self.mark_check(id);
        {
            let node = &mut self.arena[id];
            node.checked = checked;
            node.indeterminate = false;
        }
        if self.options.check_strictly {
            return;
        }
        if deep {
            self.force_descendants(id, checked);
        }
        self.reconcile_from_children(id);
        self.propagate_up(id);
    }

    fn force_descendants(&mut self, id: NodeId, checked: bool) {
        let children = self.arena[id].children.clone();
        for child in children {
            self.mark_check(child);
            {
                let node = &mut self.arena[child];
                node.checked = checked;
                node.indeterminate = false;
            }
            self.force_descendants(child, checked);
        }
    }

    /// `(all, none)` over the immediate children; `None` when childless.
    fn child_check_state(&self, id: NodeId) -> Option<(bool, bool)> {
        let children = &self.arena[id].children;
        if children.is_empty() {
            return None;
        }
        let mut all = true;
        let mut none = true;
        for &child in children {
            let node = &self.arena[child];
            if !node.checked || node.indeterminate {
                all = false;
            }
            if node.checked || node.indeterminate {
                none = false;
            }
        }
        Some((all, none))
    }

    fn reconcile_from_children(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        let Some((all, none)) = self.child_check_state(id) else {
            // Childless nodes keep their direct checked value; only a stale
            // indeterminate flag is cleared (children may have been removed).
            if self.arena[id].indeterminate {
                self.mark_check(id);
                self.arena[id].indeterminate = false;
            }
            return;
        };
        let (checked, indeterminate) = if all {
            (true, false)
        } else if none {
            (false, false)
        } else {
            (false, true)
        };
        let node = &self.arena[id];
        if node.checked == checked && node.indeterminate == indeterminate {
            return;
        }
        self.mark_check(id);
        let node = &mut self.arena[id];
        node.checked = checked;
        node.indeterminate = indeterminate;
    }

    fn propagate_up(&mut self, id: NodeId) {
        let mut cur = self.arena[id].parent;
        while let Some(parent) = cur {
            if parent == self.root {
                break;
            }
            self.reconcile_from_children(parent);
            cur = self.arena[parent].parent;
        }
    }

    fn reaggregate_from(&mut self, id: NodeId) {
        if self.options.check_strictly || id == self.root {
            return;
        }
        self.reconcile_from_children(id);
        self.propagate_up(id);
    }

    /// Reconciles the whole tree so that exactly the target key set ends up
    /// checked.
    ///
    /// Nodes are processed deepest level first, so children are settled
    /// before their parents read them: leaves (and, in strict mode, every
    /// node) take target membership, non-strict branches derive purely from
    /// their already-settled children. The result is deterministic regardless
    /// of the target set's iteration order. With `leaf_only`, branches are
    /// forced unchecked and only leaf membership matters.
    pub fn set_checked_keys(&mut self, keys: &[K], leaf_only: bool) -> Result<(), TreeError> {
        if self.options.key_of.is_none() {
            return Err(TreeError::KeyNotConfigured);
        }
        self.options.default_checked_keys = keys.to_vec();
        let mut target: KeyMap<K, ()> = KeyMap::default();
        for key in keys {
            target.insert(key.clone(), ());
        }
        self.with_settle(|s| {
            s.reconcile_checked(
                &|_, node: &TreeNode<T, K>| {
                    node.key.as_ref().is_some_and(|k| target.contains_key(k))
                },
                leaf_only,
            );
        });
        Ok(())
    }

    /// Like [`Self::set_checked_keys`], with the target set given as node
    /// handles.
    pub fn set_checked_nodes(&mut self, nodes: &[NodeId], leaf_only: bool) -> Result<(), TreeError> {
        let mut target: KeyMap<NodeId, ()> = KeyMap::default();
        for &id in nodes {
            if !self.arena.contains_key(id) {
                return Err(TreeError::NodeNotFound);
            }
            target.insert(id, ());
        }
        self.with_settle(|s| {
            s.reconcile_checked(&|id, _| target.contains_key(&id), leaf_only);
        });
        Ok(())
    }

    fn reconcile_checked(
        &mut self,
        in_target: &dyn Fn(NodeId, &TreeNode<T, K>) -> bool,
        leaf_only: bool,
    ) {
        let mut ids: Vec<(usize, NodeId)> = self
            .arena
            .iter()
            .filter(|(id, _)| *id != self.root)
            .map(|(id, node)| (node.level, id))
            .collect();
        ids.sort_by_key(|&(level, _)| Reverse(level));

        for (_, id) in ids {
            let is_leaf = self.arena[id].is_leaf();
            let (checked, indeterminate) = if is_leaf {
                (in_target(id, &self.arena[id]), false)
            } else if leaf_only {
                (false, false)
            } else if self.options.check_strictly {
                (in_target(id, &self.arena[id]), false)
            } else {
                match self.child_check_state(id) {
                    Some((true, _)) => (true, false),
                    Some((_, true)) => (false, false),
                    Some(_) => (false, true),
                    // childless non-leaf (unloaded lazy): membership decides
                    None => (in_target(id, &self.arena[id]), false),
                }
            };

            let node = &self.arena[id];
            if node.checked != checked || node.indeterminate != indeterminate {
                self.mark_check(id);
                let node = &mut self.arena[id];
                node.checked = checked;
                node.indeterminate = indeterminate;
            }
        }
    }

    /// Keys of all checked nodes, in depth-first order.
    pub fn checked_keys(&self, leaf_only: bool) -> Vec<K> {
        let mut out = Vec::new();
        self.walk(self.root, &mut |_, node| {
            if node.checked && (!leaf_only || node.is_leaf()) {
                if let Some(key) = &node.key {
                    out.push(key.clone());
                }
            }
        });
        out
    }

    /// Handles of all checked nodes, in depth-first order.
    pub fn checked_nodes(&self, leaf_only: bool) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(self.root, &mut |id, node| {
            if node.checked && (!leaf_only || node.is_leaf()) {
                out.push(id);
            }
        });
        out
    }

    // ---- expand / collapse ----

    pub fn expand_key(&mut self, key: &K, auto_expand_parent: bool) -> Result<(), TreeError> {
        let id = self.node_by_key(key).ok_or(TreeError::UnknownKey)?;
        self.expand_node(id, auto_expand_parent)
    }

    /// Expands a node; with `auto_expand_parent`, collapsed ancestors are
    /// expanded too.
    ///
    /// Idempotent: expanding an expanded, loaded node changes nothing. A lazy
    /// node whose children are unknown issues a load through the configured
    /// loader, exactly once, no matter how many expands arrive while it is
    /// in flight.
    pub fn expand_node(&mut self, id: NodeId, auto_expand_parent: bool) -> Result<(), TreeError> {
        if id == self.root {
            return Ok(());
        }
        if !self.arena.contains_key(id) {
            return Err(TreeError::NodeNotFound);
        }
        self.with_settle(|s| {
            if auto_expand_parent {
                let mut cur = s.arena[id].parent;
                while let Some(parent) = cur {
                    if parent != s.root && !s.arena[parent].expanded {
                        s.arena[parent].expanded = true;
                        s.queued.push(Notification::Expand(parent));
                    }
                    cur = s.arena[parent].parent;
                }
            }
            s.expand_inner(id);
        });
        Ok(())
    }

    fn expand_inner(&mut self, id: NodeId) {
        if self.arena[id].loading {
            // A load is already in flight; its completion will populate the
            // children of this now-expanded node.
            return;
        }
        if !self.arena[id].expanded {
            self.arena[id].expanded = true;
            self.queued.push(Notification::Expand(id));
        }
        let node = &self.arena[id];
        let needs_load = self.options.lazy
            && !node.loaded
            && node.leaf_hint != Some(true)
            && self.options.loader.is_some();
        if needs_load {
            self.issue_load(id);
        }
    }

    pub fn collapse_key(&mut self, key: &K) -> Result<(), TreeError> {
        let id = self.node_by_key(key).ok_or(TreeError::UnknownKey)?;
        self.collapse_node(id)
    }

    /// Collapses a node. Loaded children stay cached for re-expansion.
    pub fn collapse_node(&mut self, id: NodeId) -> Result<(), TreeError> {
        if id == self.root {
            return Ok(());
        }
        if !self.arena.contains_key(id) {
            return Err(TreeError::NodeNotFound);
        }
        self.with_settle(|s| {
            if s.arena[id].expanded {
                s.arena[id].expanded = false;
                s.queued.push(Notification::Collapse(id));
            }
        });
        Ok(())
    }

    // ---- lazy loading ----

    fn issue_load(&mut self, id: NodeId) {
        let Some(loader) = self.options.loader.clone() else {
            return;
        };
        self.arena[id].loading = true;
        let ticket = LoadTicket {
            node: id,
            epoch: self.epoch,
        };
        tsdebug!(epoch = self.epoch, "issuing child load");
        loader(ticket, self.arena[id].data.as_ref());
    }

    /// Attaches the children a loader produced for `ticket`.
    ///
    /// Stale tickets (the node is gone, the data was replaced wholesale, or
    /// the ticket was already completed) are swallowed silently: late
    /// arrivals are a race inherent to cancellation, not a defect.
    pub fn complete_load(&mut self, ticket: LoadTicket, children: Vec<T>) -> LoadOutcome {
        if ticket.epoch != self.epoch {
            tsdebug!("discarding load result: epoch advanced");
            return LoadOutcome::Stale;
        }
        let id = ticket.node;
        match self.arena.get(id) {
            Some(node) if node.loading => {}
            _ => return LoadOutcome::Stale,
        }

        self.with_settle(|s| {
            s.arena[id].loading = false;
            s.arena[id].loaded = true;
            s.build_children(id, children);
            if id == s.root {
                s.init_defaults();
            } else {
                if !s.options.check_strictly && s.arena[id].checked {
                    // A checked parent folds its state onto children it only
                    // now materialized.
                    s.force_descendants(id, true);
                }
                s.apply_default_checked_in(id);
                s.reaggregate_from(id);
            }
        });
        LoadOutcome::Applied
    }

    // ---- structural edits ----

    /// Appends a child under `parent_key` (or at the top level).
    pub fn append(&mut self, data: T, parent_key: Option<&K>) -> Result<NodeId, TreeError> {
        let parent = match parent_key {
            Some(key) => self.node_by_key(key).ok_or(TreeError::UnknownKey)?,
            None => self.root,
        };
        Ok(self.with_settle(|s| {
            let id = s.build_node(parent, data, None);
            s.after_insert(id);
            id
        }))
    }

    pub fn insert_before(&mut self, data: T, reference_key: &K) -> Result<NodeId, TreeError> {
        self.insert_at(data, reference_key, 0)
    }

    pub fn insert_after(&mut self, data: T, reference_key: &K) -> Result<NodeId, TreeError> {
        self.insert_at(data, reference_key, 1)
    }

    fn insert_at(&mut self, data: T, reference_key: &K, shift: usize) -> Result<NodeId, TreeError> {
        let reference = self.node_by_key(reference_key).ok_or(TreeError::UnknownKey)?;
        let parent = self.arena[reference].parent.ok_or(TreeError::NodeNotFound)?;
        let index = self.arena[parent]
            .children
            .iter()
            .position(|&c| c == reference)
            .ok_or(TreeError::NodeNotFound)?;
        Ok(self.with_settle(|s| {
            let id = s.build_node(parent, data, Some(index + shift));
            s.after_insert(id);
            id
        }))
    }

    pub fn remove(&mut self, key: &K) -> Result<(), TreeError> {
        let id = self.node_by_key(key).ok_or(TreeError::UnknownKey)?;
        self.remove_node(id)
    }

    /// Removes a node and its whole subtree, deregistering every descendant
    /// from the key index.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), TreeError> {
        if id == self.root || !self.arena.contains_key(id) {
            return Err(TreeError::NodeNotFound);
        }
        self.with_settle(|s| {
            let parent = s.arena[id].parent;
            s.remove_subtree(id);
            if let Some(parent) = parent {
                s.reaggregate_from(parent);
            }
        });
        Ok(())
    }

    /// Replaces the tree's data wholesale.
    ///
    /// Outstanding load tickets go stale, the key index is rebuilt, and the
    /// default key sets are re-applied. Lazy stores refetch the root's
    /// children instead of reading `data`.
    pub fn set_data(&mut self, data: Vec<T>) {
        tsdebug!(epoch = self.epoch + 1, "replacing data");
        self.with_settle(|s| {
            s.epoch += 1;
            let top: Vec<NodeId> = s.arena[s.root].children.clone();
            for id in top {
                s.remove_subtree(id);
            }
            s.arena[s.root].loaded = false;
            s.arena[s.root].loading = false;
            if s.options.lazy && s.options.loader.is_some() {
                s.issue_load(s.root);
            } else {
                s.arena[s.root].loaded = true;
                s.build_children(s.root, data);
                s.init_defaults();
            }
        });
    }

    // ---- current node ----

    pub fn current_node(&self) -> Option<NodeId> {
        self.current
    }

    /// Selects the current node. The target must exist: under
    /// [`Strictness::Strict`] a dead handle is an error, under
    /// [`Strictness::Lenient`] it is logged and ignored.
    pub fn set_current_node(&mut self, id: NodeId, strictness: Strictness) -> Result<(), TreeError> {
        let valid = id != self.root && self.arena.contains_key(id);
        if !require(valid, TreeError::InvalidCurrentNode, strictness)? {
            return Ok(());
        }
        self.with_settle(|s| s.set_current_inner(Some(id)));
        Ok(())
    }

    pub fn set_current_key(&mut self, key: &K, strictness: Strictness) -> Result<(), TreeError> {
        if !require(
            self.options.key_of.is_some(),
            TreeError::KeyNotConfigured,
            strictness,
        )? {
            return Ok(());
        }
        let found = self.node_by_key(key);
        if !require(found.is_some(), TreeError::UnknownKey, strictness)? {
            return Ok(());
        }
        self.with_settle(|s| s.set_current_inner(found));
        Ok(())
    }

    pub fn clear_current_node(&mut self) {
        self.with_settle(|s| s.set_current_inner(None));
    }

    fn set_current_inner(&mut self, id: Option<NodeId>) {
        if self.current == id {
            return;
        }
        self.current = id;
        self.queued.push(Notification::CurrentChange(id));
    }

    // ---- geometry for windowed rendering ----

    /// Start offset of the node's row within the currently expanded, visible
    /// tree: one `row_size` per visible row encountered before it, descending
    /// only into expanded nodes.
    ///
    /// `None` when the key is unknown or the node is unreachable (a hidden or
    /// collapsed ancestor). The offset is directly usable as a scroll target
    /// for the windowing engine.
    pub fn node_position(&self, key: &K) -> Option<u64> {
        let target = self.node_by_key(key)?;
        let mut offset = 0u64;
        self.position_of(self.root, target, &mut offset)
            .then_some(offset)
    }

    fn position_of(&self, id: NodeId, target: NodeId, offset: &mut u64) -> bool {
        let row = self.options.row_size as u64;
        for &child in &self.arena[id].children {
            if child == target {
                return true;
            }
            let node = &self.arena[child];
            if !node.visible {
                continue;
            }
            *offset = offset.saturating_add(row);
            if node.expanded && self.position_of(child, target, offset) {
                return true;
            }
        }
        false
    }

    /// Total rendered extent of a node: its own row (when visible) plus,
    /// when expanded, the extents of its children. For the root this is the
    /// extent of the whole rendered tree.
    ///
    /// This is the per-item size function a windowing engine consumes.
    pub fn visible_extent(&self, id: NodeId) -> u64 {
        let Some(node) = self.arena.get(id) else {
            return 0;
        };
        if id == self.root {
            let mut size = 0u64;
            for &child in &node.children {
                size = size.saturating_add(self.visible_extent(child));
            }
            return size;
        }
        if !node.visible {
            return 0;
        }
        let mut size = self.options.row_size as u64;
        if node.expanded {
            for &child in &node.children {
                size = size.saturating_add(self.visible_extent(child));
            }
        }
        size
    }

    /// Builds windowing options for the top-level subtrees: one item per
    /// subtree, sized by its current rendered extent.
    ///
    /// The extents are resolved now; after expand/collapse or filtering,
    /// build fresh options (or `set_options` on the engine) so the next pass
    /// sees the new sizes.
    pub fn window_options(&self) -> lazylist::LazyListOptions {
        let extents: Vec<u32> = self
            .top_level()
            .iter()
            .map(|&id| u32::try_from(self.visible_extent(id)).unwrap_or(u32::MAX))
            .collect();
        lazylist::LazyListOptions::new(
            extents.len(),
            lazylist::ItemSize::computed(move |i| extents[i]),
        )
    }

    // ---- internals ----

    fn with_settle<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.settle_depth += 1;
        let out = f(self);
        self.settle_depth -= 1;
        if self.settle_depth == 0 {
            self.flush();
        }
        out
    }

    fn flush(&mut self) {
        if self.queued.is_empty() {
            return;
        }
        let queued = core::mem::take(&mut self.queued);
        let on_check = self.options.on_check_change.clone();
        let on_expand = self.options.on_expand.clone();
        let on_collapse = self.options.on_collapse.clone();
        let on_current = self.options.on_current_change.clone();

        for notification in queued {
            match notification {
                Notification::CheckChange {
                    id,
                    was_checked,
                    was_indeterminate,
                } => {
                    let Some(node) = self.arena.get(id) else {
                        continue;
                    };
                    if node.checked != was_checked || node.indeterminate != was_indeterminate {
                        if let Some(cb) = &on_check {
                            cb(node, node.checked, node.indeterminate);
                        }
                    }
                }
                Notification::Expand(id) => {
                    if let (Some(cb), Some(node)) = (&on_expand, self.arena.get(id)) {
                        cb(node);
                    }
                }
                Notification::Collapse(id) => {
                    if let (Some(cb), Some(node)) = (&on_collapse, self.arena.get(id)) {
                        cb(node);
                    }
                }
                Notification::CurrentChange(id) => {
                    if let Some(cb) = &on_current {
                        match id {
                            Some(id) => {
                                if let Some(node) = self.arena.get(id) {
                                    cb(Some(node));
                                }
                            }
                            None => cb(None),
                        }
                    }
                }
            }
        }
    }

    /// Queues a check-change record for `id` with its pre-mutation state; the
    /// flush compares against the settled state and only fires the callback
    /// when the pair actually changed.
    fn mark_check(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        let already = self.queued.iter().any(
            |n| matches!(n, Notification::CheckChange { id: queued, .. } if *queued == id),
        );
        if already {
            return;
        }
        let node = &self.arena[id];
        self.queued.push(Notification::CheckChange {
            id,
            was_checked: node.checked,
            was_indeterminate: node.indeterminate,
        });
    }

    fn build_children(&mut self, parent: NodeId, data: Vec<T>) {
        for item in data {
            self.build_node(parent, item, None);
        }
    }

    fn build_node(&mut self, parent: NodeId, data: T, position: Option<usize>) -> NodeId {
        let level = self.arena[parent].level + 1;
        let key = self.options.key_of.as_ref().and_then(|f| f(&data));
        let leaf_hint = self.options.is_leaf.as_ref().map(|f| f(&data));
        let child_payloads = if self.options.lazy {
            Vec::new()
        } else {
            self.options
                .children_of
                .as_ref()
                .map(|f| f(&data))
                .unwrap_or_default()
        };

        let mut node = TreeNode::new(data, key.clone(), level, parent);
        node.leaf_hint = leaf_hint;
        node.loaded = !self.options.lazy;
        let id = self.arena.insert(node);

        match position {
            Some(index) => self.arena[parent].children.insert(index, id),
            None => self.arena[parent].children.push(id),
        }
        if let Some(key) = key {
            self.nodes_map.insert(key, id);
        }

        self.build_children(id, child_payloads);
        id
    }

    fn after_insert(&mut self, id: NodeId) {
        self.apply_default_checked_in(id);
        if let Some(parent) = self.arena[id].parent {
            self.reaggregate_from(parent);
        }
    }

    fn remove_subtree(&mut self, id: NodeId) {
        if let Some(parent) = self.arena[id].parent {
            self.arena[parent].children.retain(|&child| child != id);
        }
        let mut stack = alloc::vec![id];
        let mut ids = Vec::new();
        while let Some(next) = stack.pop() {
            stack.extend(self.arena[next].children.iter().copied());
            ids.push(next);
        }
        for node_id in ids {
            if let Some(node) = self.arena.remove(node_id) {
                if let Some(key) = node.key {
                    if self.nodes_map.get(&key) == Some(&node_id) {
                        self.nodes_map.remove(&key);
                    }
                }
                if self.current == Some(node_id) {
                    self.current = None;
                    self.queued.push(Notification::CurrentChange(None));
                }
            }
        }
    }

    fn init_defaults(&mut self) {
        self.apply_default_checked_in(self.root);
        self.apply_default_expanded();
        if let Some(key) = self.options.current_node_key.clone() {
            let found = self.node_by_key(&key);
            if found.is_some() {
                self.set_current_inner(found);
            }
        }
    }

    fn apply_default_checked_in(&mut self, id: NodeId) {
        if self.options.default_checked_keys.is_empty() {
            return;
        }
        let keys = self.options.default_checked_keys.clone();
        let strict = self.options.check_strictly;
        let mut targets = Vec::new();
        if id != self.root {
            if let Some(key) = &self.arena[id].key {
                if keys.contains(key) {
                    targets.push(id);
                }
            }
        }
        self.walk(id, &mut |child, node| {
            if let Some(key) = &node.key {
                if keys.contains(key) {
                    targets.push(child);
                }
            }
        });
        for target in targets {
            self.set_checked_inner(target, true, !strict);
        }
    }

    fn apply_default_expanded(&mut self) {
        let keys = self.options.default_expanded_keys.clone();
        let auto = self.options.auto_expand_parent;
        for key in keys {
            if let Some(id) = self.node_by_key(&key) {
                if auto {
                    let mut cur = self.arena[id].parent;
                    while let Some(parent) = cur {
                        if parent != self.root && !self.arena[parent].expanded {
                            self.arena[parent].expanded = true;
                            self.queued.push(Notification::Expand(parent));
                        }
                        cur = self.arena[parent].parent;
                    }
                }
                self.expand_inner(id);
            }
        }
    }

    /// Depth-first pre-order walk over the descendants of `id`.
    fn walk(&self, id: NodeId, f: &mut impl FnMut(NodeId, &TreeNode<T, K>)) {
        for &child in &self.arena[id].children {
            f(child, &self.arena[child]);
            self.walk(child, f);
        }
    }
}

impl<T, K: TreeKey + core::fmt::Debug> core::fmt::Debug for TreeStore<T, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TreeStore")
            .field("len", &self.len())
            .field("indexed", &self.nodes_map.len())
            .field("current", &self.current)
            .field("epoch", &self.epoch)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
