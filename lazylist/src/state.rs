use crate::Viewport;

/// A lightweight, serializable snapshot of the sampled viewport.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`,
/// so adapters can persist scroll position across sessions without coupling
/// the engine to any storage format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewportState {
    pub viewport: Viewport,
    pub list_origin: i64,
}
