//! Logging setup for the metals feed.
//!
//! Diagnostics go to stderr; stdout is reserved for the per-symbol status lines.

use chrono::Local;
use env_logger::{Builder, Env, Target};
use log::info;
use std::io::Write;

/// Filter variable, e.g. `METALS_FEED_LOG=debug` or `METALS_FEED_LOG=metals_feed=trace`.
pub const LOG_ENV: &str = "METALS_FEED_LOG";

/// Colour control: `auto`, `always` or `never`.
pub const LOG_STYLE_ENV: &str = "METALS_FEED_LOG_STYLE";

/// Builder with the feed's line format. `level` applies unless `METALS_FEED_LOG` is set.
pub fn logger_builder(level: &str) -> Builder {
    let env = Env::default().filter_or(LOG_ENV, level).write_style_or(LOG_STYLE_ENV, "auto");

    let mut builder = Builder::from_env(env);
    builder
        .format(|buf, record| {
            let level = buf.default_styled_level(record.level());
            writeln!(
                buf,
                "{} {:<5} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                level,
                record.target(),
                record.args()
            )
        })
        .target(Target::Stderr);
    builder
}

/// Install the global logger. Later calls are no-ops.
pub fn init_logging(level: &str) {
    if logger_builder(level).try_init().is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}
