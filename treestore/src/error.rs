use thiserror::Error;

/// Errors surfaced by fallible tree-store operations.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// A key-based operation was invoked on a store with no key adapter.
    #[error("no key adapter configured")]
    KeyNotConfigured,

    /// `filter` was invoked with no filter method configured.
    #[error("no filter method configured")]
    FilterNotConfigured,

    /// The requested key is not present in the store's index.
    #[error("key not found in node index")]
    UnknownKey,

    /// The node handle does not refer to a live node of this store.
    #[error("node not found")]
    NodeNotFound,

    /// The current node cannot be set to a node that does not exist.
    #[error("current-node target does not exist")]
    InvalidCurrentNode,
}

/// How a failed precondition is reported.
///
/// `Strict` raises the error; `Lenient` logs a warning and lets the operation
/// degrade to a no-op. Either way the store's node index is left untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strictness {
    #[default]
    Strict,
    Lenient,
}

/// Checks a precondition under the caller-selected strictness.
///
/// Returns `Ok(true)` when the condition holds, `Ok(false)` when it failed
/// leniently (logged, caller should no-op), `Err` when it failed strictly.
pub(crate) fn require(
    condition: bool,
    error: TreeError,
    strictness: Strictness,
) -> Result<bool, TreeError> {
    if condition {
        return Ok(true);
    }
    match strictness {
        Strictness::Strict => Err(error),
        Strictness::Lenient => {
            tswarn!(%error, "precondition failed");
            Ok(false)
        }
    }
}
