//! A hierarchical tree view-model.
//!
//! The [`TreeStore`] is the single source of truth for a mutable tree:
//! tri-state checkbox aggregation, filtered visibility, lazy child loading,
//! and the row-position math a windowed renderer needs. Nodes live in a flat
//! arena and reference each other by [`NodeId`], so parent back-references
//! never form ownership cycles.
//!
//! View layers subscribe through the notification callbacks on
//! [`TreeStoreOptions`]; the store invokes them synchronously once a mutation
//! has fully settled. Pair it with the `lazylist` crate to window large
//! expanded trees.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod error;
mod key;
mod node;
mod options;
mod store;


pub use error::{Strictness, TreeError};
pub use key::{NodeId, TreeKey};
pub use node::TreeNode;
pub use options::{
    CheckChangeCallback, ChildrenAdapter, CurrentChangeCallback, FilterMethod, KeyAdapter,
    LeafAdapter, Loader, NodeCallback, TreeStoreOptions,
};
pub use store::{LoadOutcome, LoadTicket, TreeStore};
