//! Logging setup shared by the lesson binaries

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install a compact INFO-level subscriber for the process
pub fn init_logging() {
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .compact()
        .init();
}
