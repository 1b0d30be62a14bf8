use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::node::TreeNode;
use crate::store::LoadTicket;

/// Extracts a node key from a raw payload.
///
/// Returning `None` leaves the node unkeyed: it is not indexed and can only
/// be addressed through its [`crate::NodeId`].
pub type KeyAdapter<T, K> = Arc<dyn Fn(&T) -> Option<K> + Send + Sync>;

/// Extracts the eagerly-available children of a payload.
pub type ChildrenAdapter<T> = Arc<dyn Fn(&T) -> Vec<T> + Send + Sync>;

/// Overrides the derived leaf flag for a payload.
pub type LeafAdapter<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// The node-visibility predicate: `(query, payload, node) -> keep`.
///
/// Pure, no side effects expected; the store calls it once per node per
/// filter pass.
pub type FilterMethod<T, K> = Arc<dyn Fn(&str, &T, &TreeNode<T, K>) -> bool + Send + Sync>;

/// The async child loader: called with a ticket and the node's payload
/// (`None` for the root). The embedder resolves the ticket later through
/// [`crate::TreeStore::complete_load`]; each ticket may be completed at most
/// once, and completing a stale ticket is a silent no-op.
pub type Loader<T> = Arc<dyn Fn(LoadTicket, Option<&T>) + Send + Sync>;

/// Fired after a node's settled check state changed: `(node, checked,
/// indeterminate)`.
pub type CheckChangeCallback<T, K> = Arc<dyn Fn(&TreeNode<T, K>, bool, bool) + Send + Sync>;

/// Fired after an expand/collapse mutation settled.
pub type NodeCallback<T, K> = Arc<dyn Fn(&TreeNode<T, K>) + Send + Sync>;

/// Fired after the current node changed; `None` means cleared.
pub type CurrentChangeCallback<T, K> = Arc<dyn Fn(Option<&TreeNode<T, K>>) + Send + Sync>;

/// Configuration for [`crate::TreeStore`].
///
/// Cheap to clone: adapters and callbacks live in `Arc`s.
pub struct TreeStoreOptions<T, K> {
    pub key_of: Option<KeyAdapter<T, K>>,
    pub children_of: Option<ChildrenAdapter<T>>,
    pub is_leaf: Option<LeafAdapter<T>>,

    /// Checked state of every node is independent; nothing derives from
    /// children.
    pub check_strictly: bool,

    /// Children are materialized on demand through `loader` instead of
    /// eagerly from `children_of`.
    pub lazy: bool,
    pub loader: Option<Loader<T>>,

    pub filter_method: Option<FilterMethod<T, K>>,

    pub default_checked_keys: Vec<K>,
    pub default_expanded_keys: Vec<K>,

    /// Expanding a node by key also expands its ancestors.
    pub auto_expand_parent: bool,

    pub current_node_key: Option<K>,

    /// Fixed per-row extent used by `node_position`/`visible_extent`.
    pub row_size: u32,

    pub on_check_change: Option<CheckChangeCallback<T, K>>,
    pub on_expand: Option<NodeCallback<T, K>>,
    pub on_collapse: Option<NodeCallback<T, K>>,
    pub on_current_change: Option<CurrentChangeCallback<T, K>>,
}

impl<T, K> TreeStoreOptions<T, K> {
    pub fn new() -> Self {
        Self {
            key_of: None,
            children_of: None,
            is_leaf: None,
            check_strictly: false,
            lazy: false,
            loader: None,
            filter_method: None,
            default_checked_keys: Vec::new(),
            default_expanded_keys: Vec::new(),
            auto_expand_parent: true,
            current_node_key: None,
            row_size: 36,
            on_check_change: None,
            on_expand: None,
            on_collapse: None,
            on_current_change: None,
        }
    }

    pub fn with_key_of(mut self, key_of: impl Fn(&T) -> Option<K> + Send + Sync + 'static) -> Self {
        self.key_of = Some(Arc::new(key_of));
        self
    }

    pub fn with_children_of(
        mut self,
        children_of: impl Fn(&T) -> Vec<T> + Send + Sync + 'static,
    ) -> Self {
        self.children_of = Some(Arc::new(children_of));
        self
    }

    pub fn with_is_leaf(mut self, is_leaf: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.is_leaf = Some(Arc::new(is_leaf));
        self
    }

    pub fn with_check_strictly(mut self, check_strictly: bool) -> Self {
        self.check_strictly = check_strictly;
        self
    }

    pub fn with_lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    pub fn with_loader(
        mut self,
        loader: impl Fn(LoadTicket, Option<&T>) + Send + Sync + 'static,
    ) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    pub fn with_filter_method(
        mut self,
        filter_method: impl Fn(&str, &T, &TreeNode<T, K>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.filter_method = Some(Arc::new(filter_method));
        self
    }

    pub fn with_default_checked_keys(mut self, keys: Vec<K>) -> Self {
        self.default_checked_keys = keys;
        self
    }

    pub fn with_default_expanded_keys(mut self, keys: Vec<K>) -> Self {
        self.default_expanded_keys = keys;
        self
    }

    pub fn with_auto_expand_parent(mut self, auto_expand_parent: bool) -> Self {
        self.auto_expand_parent = auto_expand_parent;
        self
    }

    pub fn with_current_node_key(mut self, key: K) -> Self {
        self.current_node_key = Some(key);
        self
    }

    pub fn with_row_size(mut self, row_size: u32) -> Self {
        self.row_size = row_size;
        self
    }

    pub fn with_on_check_change(
        mut self,
        f: impl Fn(&TreeNode<T, K>, bool, bool) + Send + Sync + 'static,
    ) -> Self {
        self.on_check_change = Some(Arc::new(f));
        self
    }

    pub fn with_on_expand(mut self, f: impl Fn(&TreeNode<T, K>) + Send + Sync + 'static) -> Self {
        self.on_expand = Some(Arc::new(f));
        self
    }

    pub fn with_on_collapse(mut self, f: impl Fn(&TreeNode<T, K>) + Send + Sync + 'static) -> Self {
        self.on_collapse = Some(Arc::new(f));
        self
    }

    pub fn with_on_current_change(
        mut self,
        f: impl Fn(Option<&TreeNode<T, K>>) + Send + Sync + 'static,
    ) -> Self {
        self.on_current_change = Some(Arc::new(f));
        self
    }
}

impl<T, K> Default for TreeStoreOptions<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K: Clone> Clone for TreeStoreOptions<T, K> {
    fn clone(&self) -> Self {
        Self {
            key_of: self.key_of.clone(),
            children_of: self.children_of.clone(),
            is_leaf: self.is_leaf.clone(),
            check_strictly: self.check_strictly,
            lazy: self.lazy,
            loader: self.loader.clone(),
            filter_method: self.filter_method.clone(),
            default_checked_keys: self.default_checked_keys.clone(),
            default_expanded_keys: self.default_expanded_keys.clone(),
            auto_expand_parent: self.auto_expand_parent,
            current_node_key: self.current_node_key.clone(),
            row_size: self.row_size,
            on_check_change: self.on_check_change.clone(),
            on_expand: self.on_expand.clone(),
            on_collapse: self.on_collapse.clone(),
            on_current_change: self.on_current_change.clone(),
        }
    }
}

impl<T, K: core::fmt::Debug> core::fmt::Debug for TreeStoreOptions<T, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TreeStoreOptions")
            .field("check_strictly", &self.check_strictly)
            .field("lazy", &self.lazy)
            .field("default_checked_keys", &self.default_checked_keys)
            .field("default_expanded_keys", &self.default_expanded_keys)
            .field("auto_expand_parent", &self.auto_expand_parent)
            .field("current_node_key", &self.current_node_key)
            .field("row_size", &self.row_size)
            .finish_non_exhaustive()
    }
}
