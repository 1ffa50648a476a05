pub mod client;
pub mod models;

pub use client::{ApiError, FeedClient};
pub use models::{ClientConfig, FeedItem};
