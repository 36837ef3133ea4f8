//! Logging infrastructure for structured console and file output.

mod buffered;
mod logger;
mod subscriber;
mod types;
mod utils;

pub use buffered::BufferedLog;
pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::{Log, LogEntry, LogLevel};

/// Install a thread-local subscriber that writes to a [`subscriber::FileLayer`]
/// at `path`, so tests can inspect what a run wrote to its log file.
///
/// Keep the returned guard alive for the duration of the test.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn file_subscriber(path: &std::path::Path) -> tracing::dispatcher::DefaultGuard {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};
    let file_layer = subscriber::FileLayer::at(path, "test").expect("failed to create file layer");
    let subscriber =
        tracing_subscriber::registry().with(file_layer.with_filter(LevelFilter::DEBUG));
    tracing::dispatcher::set_default(&tracing::Dispatch::new(subscriber))
}
