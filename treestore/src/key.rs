#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

slotmap::new_key_type! {
    /// Arena handle for a tree node.
    ///
    /// Handles stay unique for the lifetime of the store: removing a node
    /// retires its id, so a handle held across a removal can never alias a
    /// different node.
    pub struct NodeId;
}

#[cfg(feature = "std")]
pub(crate) type KeyMap<K, V> = HashMap<K, V>;
#[cfg(not(feature = "std"))]
pub(crate) type KeyMap<K, V> = BTreeMap<K, V>;

/// Bound alias for user-supplied node keys.
#[cfg(feature = "std")]
pub trait TreeKey: Clone + core::hash::Hash + Eq {}
#[cfg(feature = "std")]
impl<K: Clone + core::hash::Hash + Eq> TreeKey for K {}

/// Bound alias for user-supplied node keys.
#[cfg(not(feature = "std"))]
pub trait TreeKey: Clone + Ord {}
#[cfg(not(feature = "std"))]
impl<K: Clone + Ord> TreeKey for K {}
