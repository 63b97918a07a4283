//! Process-wide log sink.

use std::sync::Once;

use tracing::Level;

static INIT: Once = Once::new();

/// Install a `tracing_subscriber` fmt sink at `level`.
///
/// Only the first call in a process has an effect. If the host already
/// installed a global subscriber, that one is kept.
pub fn init(level: Level) {
    INIT.call_once(|| {
        let installed = tracing_subscriber::fmt()
            .with_target(false)
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .try_init();
        if installed.is_err() {
            tracing::debug!("global subscriber already set; keeping it");
        }
    });
}
