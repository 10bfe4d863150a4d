// mascara/src/logger.rs
//! Logger setup for the CLI. Logs go to stderr so stdout stays machine-readable.

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Initializes `env_logger`. `RUST_LOG` is honored unless `level_override` is
/// given; the default level is `warn`.
pub fn init_logger(level_override: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = level_override {
        builder.filter_level(level);
    }
    builder.target(Target::Stderr).format_timestamp(None);
    // A second initialization (e.g. from tests) is harmless.
    let _ = builder.try_init();
}
