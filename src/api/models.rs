use std::time::Duration;

/// One entry of the syndication feed, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub content: String,
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub user_agent: String,
    pub connect_timeout: Duration,
    /// Upper bound for the whole feed request, body included
    pub feed_timeout: Duration,
    /// Upper bound for a download request until the response headers arrive
    pub response_timeout: Duration,
    /// Upper bound for the gap between two body chunks of a download
    pub stall_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: Duration::from_secs(30),
            feed_timeout: Duration::from_secs(60),
            response_timeout: Duration::from_secs(60),
            stall_timeout: Duration::from_secs(120),
        }
    }
}
