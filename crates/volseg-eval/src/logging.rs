//! Logging setup for binaries and tests driving an evaluation.
//!
//! The library itself only talks to the `log` facade.

use env_logger::{Builder, Env};

/// Logger reading its filter from `RUST_LOG`, defaulting to `info`.
///
/// Call `.init()` (or `.try_init()`) on the returned builder once, early in `main`.
pub fn init_logger() -> Builder {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_target(false);
    builder
}
