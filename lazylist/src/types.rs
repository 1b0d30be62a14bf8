use alloc::sync::Arc;

/// The axis a list is windowed along.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

/// The scroll parent's sampled window along the configured axis.
///
/// `offset` is the parent's scroll position; `extent` is its visible size.
/// Both are in the parent's own coordinate space; the engine translates item
/// positions into it using the list's origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub offset: i64,
    pub extent: u32,
}

/// The materialized index range of a windowing pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowRange {
    pub start_index: usize,
    pub end_index: usize, // exclusive
}

impl WindowRange {
    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index
    }
}

/// One item of a windowing pass.
///
/// Every item in the sequence yields a slot; a slot with `materialized = false`
/// renders nothing but still occupies `[start, start + size)` so the total
/// scrollable length is preserved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowSlot {
    pub index: usize,
    /// Start offset in list coordinates.
    pub start: u64,
    pub size: u32,
    pub materialized: bool,
}

impl WindowSlot {
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.size as u64)
    }
}

/// An item size specification: a fixed size for every item, or a size computed
/// per item index.
///
/// `Computed` functions must be pure and cheap: each recompute pass resolves
/// every item exactly once. Switching between variants from one pass to the
/// next is supported; nothing is cached across passes.
#[derive(Clone)]
pub enum ItemSize {
    Fixed(u32),
    Computed(Arc<dyn Fn(usize) -> u32 + Send + Sync>),
}

impl ItemSize {
    /// Wraps a per-item size function.
    pub fn computed(f: impl Fn(usize) -> u32 + Send + Sync + 'static) -> Self {
        Self::Computed(Arc::new(f))
    }

    pub(crate) fn resolve(&self, index: usize) -> u32 {
        match self {
            Self::Fixed(size) => *size,
            Self::Computed(f) => f(index),
        }
    }
}

impl From<u32> for ItemSize {
    fn from(size: u32) -> Self {
        Self::Fixed(size)
    }
}

impl core::fmt::Debug for ItemSize {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Fixed(size) => f.debug_tuple("Fixed").field(size).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}
