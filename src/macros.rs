/*!
The `macros` module provides macros for internal use.
!*/

/// Traces a state-list mutation at a consistent log level. Used by `conv`
/// and `state` so that pack/unpack context changes show up uniformly in
/// whatever logger the embedding application installs.
macro_rules! trace_state {
    ($($arg:tt)*) => {
        log::trace!($($arg)*)
    };
}
