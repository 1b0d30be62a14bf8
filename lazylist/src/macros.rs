#[cfg(feature = "tracing")]
macro_rules! lltrace {
    ($($tt:tt)*) => {
        tracing::trace!(target: "lazylist", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! lltrace {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! lldebug {
    ($($tt:tt)*) => {
        tracing::debug!(target: "lazylist", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! lldebug {
    ($($tt:tt)*) => {};
}
