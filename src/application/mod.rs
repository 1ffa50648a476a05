pub mod download_coordinator;
pub mod feed_runner;
pub mod stop_listener;

pub use download_coordinator::DownloadCoordinator;
pub use feed_runner::{FeedRunner, RunSummary};
pub use stop_listener::spawn_stop_listener;
