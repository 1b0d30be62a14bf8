#[cfg(feature = "tracing")]
macro_rules! tsdebug {
    ($($tt:tt)*) => {
        tracing::debug!(target: "treestore", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! tsdebug {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! tswarn {
    ($($tt:tt)*) => {
        tracing::warn!(target: "treestore", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! tswarn {
    ($($tt:tt)*) => {};
}
