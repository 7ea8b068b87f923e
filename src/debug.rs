//! Debugging helpers.
//!
//! Scanner, parser and emitter report their inner workings through `debug_print!`, which lands on
//! the `tracing` facade at `TRACE` level. Nothing is printed unless the application installs a
//! subscriber that enables the `yaml_stream` target.

/// Trace a message about the inner state of a state machine.
macro_rules! debug_print {
    ($($arg:tt)*) => {
        ::tracing::trace!($($arg)*)
    };
}
