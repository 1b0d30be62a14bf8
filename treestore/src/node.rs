use alloc::vec::Vec;

use crate::key::NodeId;

/// A single tree node: identity, payload, and view state.
///
/// Nodes live in the store's arena. `parent` and `children` are id
/// references: ownership flows strictly root to children, and the parent link
/// is a non-owning back-reference for traversal and check-state aggregation.
pub struct TreeNode<T, K> {
    pub(crate) key: Option<K>,
    /// `None` only for the synthetic root.
    pub(crate) data: Option<T>,
    pub(crate) level: usize,
    pub(crate) checked: bool,
    pub(crate) indeterminate: bool,
    pub(crate) expanded: bool,
    pub(crate) visible: bool,
    pub(crate) loading: bool,
    pub(crate) loaded: bool,
    pub(crate) leaf_hint: Option<bool>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl<T, K> TreeNode<T, K> {
    pub(crate) fn root() -> Self {
        Self {
            key: None,
            data: None,
            level: 0,
            checked: false,
            indeterminate: false,
            expanded: true,
            visible: true,
            loading: false,
            loaded: false,
            leaf_hint: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn new(data: T, key: Option<K>, level: usize, parent: NodeId) -> Self {
        Self {
            key,
            data: Some(data),
            level,
            checked: false,
            indeterminate: false,
            expanded: false,
            visible: true,
            loading: false,
            loaded: false,
            leaf_hint: None,
            parent: Some(parent),
            children: Vec::new(),
        }
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    /// The raw data payload; `None` only for the synthetic root.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Depth from the root; the root is level 0.
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Tri-state middle value: some but not all descendants checked.
    pub fn is_indeterminate(&self) -> bool {
        self.indeterminate
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// The latest filter verdict; nodes start visible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether an async child load is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// A leaf hint wins; otherwise a node is a leaf once its children are
    /// known (loaded) and absent. An unloaded lazy node is not a leaf, since
    /// it may still produce children.
    pub fn is_leaf(&self) -> bool {
        match self.leaf_hint {
            Some(hint) => hint,
            None => self.loaded && self.children.is_empty(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

impl<T, K: core::fmt::Debug> core::fmt::Debug for TreeNode<T, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TreeNode")
            .field("key", &self.key)
            .field("level", &self.level)
            .field("checked", &self.checked)
            .field("indeterminate", &self.indeterminate)
            .field("expanded", &self.expanded)
            .field("visible", &self.visible)
            .field("loading", &self.loading)
            .field("loaded", &self.loaded)
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}
