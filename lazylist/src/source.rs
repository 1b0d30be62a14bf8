use alloc::sync::Arc;

use crate::Axis;

/// Event kinds a [`ScrollSource`] publishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceEvent {
    Scroll,
    Resize,
}

/// A listener registered on a [`ScrollSource`].
///
/// Listeners are fired on the embedding layer's event loop; they must not
/// mutate engine state directly (the engine only reads flags they set and does
/// all mutation inside [`crate::LazyList::poll`]).
pub type SourceListener = Arc<dyn Fn() + Send + Sync>;

/// An opaque handle returned by [`ScrollSource::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// The scrollable parent of a windowed list, injected by the embedding layer.
///
/// This stands in for the ambient scroll/resize event targets of a real UI
/// (an overflow container, the window, the document). Subscription is purely
/// additive: any number of engines may subscribe to the same source without
/// interfering, and unsubscribing removes only the caller's listener.
pub trait ScrollSource: Send + Sync {
    /// Current scroll position along `axis`.
    fn scroll_offset(&self, axis: Axis) -> i64;

    /// Visible extent along `axis`.
    fn viewport_extent(&self, axis: Axis) -> u32;

    fn subscribe(&self, event: SourceEvent, listener: SourceListener) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// A node in the embedding layer's ancestry, used to locate the nearest
/// scrollable parent.
pub trait ScrollNode: Sized {
    /// Whether this node clips and scrolls its content along `axis`
    /// (a computed `overflow: auto | scroll` in DOM terms).
    fn is_scrollable(&self, axis: Axis) -> bool;

    fn parent(&self) -> Option<Self>;
}

/// Walks up from `start` and returns the nearest ancestor that scrolls along
/// `axis`.
///
/// When no ancestor is scrollable the root of the chain is returned, matching
/// the window/document fallback of a DOM walk.
pub fn find_scroll_parent<N: ScrollNode>(start: N, axis: Axis) -> N {
    let mut current = start;
    loop {
        if current.is_scrollable(axis) {
            return current;
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return current,
        }
    }
}
