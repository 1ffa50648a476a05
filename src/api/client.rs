use std::time::Duration;

use futures::Stream;
use futures::TryStreamExt;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use super::models::{ClientConfig, FeedItem};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid feed: {0}")]
    InvalidFeed(String),

    #[error("No response within {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct FeedClient {
    http: Client,
    config: ClientConfig,
}

impl FeedClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch the feed once and return its items in document order
    pub async fn fetch_feed(&self, feed_url: &str) -> Result<Vec<FeedItem>> {
        let body = self
            .http
            .get(feed_url)
            .timeout(self.config.feed_timeout)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        parse_feed(&body)
    }

    /// Start a download and return (total_size, body stream).
    ///
    /// Only the wait for the response headers is bounded here; callers bound
    /// the gaps between chunks with `ClientConfig::stall_timeout`.
    pub async fn download_file_stream(
        &self,
        download_url: &str,
    ) -> Result<(Option<u64>, impl Stream<Item = Result<bytes::Bytes>>)> {
        let request = self.http.get(download_url).send();
        let response = tokio::time::timeout(self.config.response_timeout, request)
            .await
            .map_err(|_| ApiError::Timeout(self.config.response_timeout))??;
        let response = response.error_for_status()?;

        let total_size = response.content_length();
        let stream = response.bytes_stream().map_err(ApiError::RequestError);

        Ok((total_size, stream))
    }
}

/// Parse a feed document as RSS 2.0, falling back to Atom.
pub fn parse_feed(content: &[u8]) -> Result<Vec<FeedItem>> {
    match parse_as_rss(content) {
        Ok(items) => Ok(items),
        Err(rss_err) => {
            debug!("Not an RSS document ({}), trying Atom", rss_err);
            parse_as_atom(content).map_err(|atom_err| {
                ApiError::InvalidFeed(format!(
                    "neither RSS ({}) nor Atom ({})",
                    rss_err, atom_err
                ))
            })
        }
    }
}

fn parse_as_rss(content: &[u8]) -> std::result::Result<Vec<FeedItem>, rss::Error> {
    let channel = rss::Channel::read_from(content)?;

    let items = channel
        .items()
        .iter()
        .map(|item| FeedItem {
            title: item.title().unwrap_or_default().to_string(),
            link: item
                .link()
                .or_else(|| item.enclosure().map(|enc| enc.url()))
                .unwrap_or_default()
                .to_string(),
            content: item
                .content()
                .or_else(|| item.description())
                .unwrap_or_default()
                .to_string(),
        })
        .collect();

    Ok(items)
}

fn parse_as_atom(content: &[u8]) -> std::result::Result<Vec<FeedItem>, atom_syndication::Error> {
    let feed = atom_syndication::Feed::read_from(content)?;

    let items = feed
        .entries()
        .iter()
        .map(|entry| {
            // media lives in the enclosure link, the first link is usually a web page
            let link = entry
                .links()
                .iter()
                .find(|link| link.rel() == "enclosure")
                .or_else(|| entry.links().first())
                .map(|link| link.href().to_string())
                .unwrap_or_default();

            let content = entry
                .content()
                .and_then(|c| c.value())
                .map(|v| v.to_string())
                .or_else(|| entry.summary().map(|s| s.as_str().to_string()))
                .unwrap_or_default();

            FeedItem {
                title: entry.title().as_str().to_string(),
                link,
                content,
            }
        })
        .collect();

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Videos</title>
    <link>http://example.com</link>
    <description>All episodes</description>
    <item>
      <title>Mastering NHibernate 2: Search</title>
      <link>http://delivery.tekpub.com/nh/mastering/5/hd/file.mp4?token=xyz</link>
      <description>Searching with NHibernate</description>
    </item>
    <item>
      <title>Mastering NHibernate 2: Intro</title>
      <enclosure url="http://example.com/intro.mp4" length="10" type="video/mp4"/>
      <content:encoded>Full notes</content:encoded>
    </item>
  </channel>
</rss>"#;

    const ATOM_FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Videos</title>
  <id>urn:uuid:feed</id>
  <updated>2013-01-01T00:00:00Z</updated>
  <entry>
    <title>Series: First</title>
    <id>urn:uuid:1</id>
    <updated>2013-01-01T00:00:00Z</updated>
    <link rel="alternate" href="http://example.com/page"/>
    <link rel="enclosure" href="http://example.com/first.mp4"/>
    <summary>First episode</summary>
  </entry>
  <entry>
    <title>Series: Second</title>
    <id>urn:uuid:2</id>
    <updated>2013-01-02T00:00:00Z</updated>
    <link href="http://example.com/second.mp4"/>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss_items_in_order() {
        let items = parse_feed(RSS_FEED.as_bytes()).unwrap();
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].title, "Mastering NHibernate 2: Search");
        assert_eq!(
            items[0].link,
            "http://delivery.tekpub.com/nh/mastering/5/hd/file.mp4?token=xyz"
        );
        assert_eq!(items[0].content, "Searching with NHibernate");

        // no <link>, so the enclosure is used
        assert_eq!(items[1].link, "http://example.com/intro.mp4");
        assert_eq!(items[1].content, "Full notes");
    }

    #[test]
    fn test_parse_atom_items() {
        let items = parse_feed(ATOM_FEED.as_bytes()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Series: First");
        assert_eq!(items[0].link, "http://example.com/first.mp4");
        assert_eq!(items[0].content, "First episode");
        assert_eq!(items[1].link, "http://example.com/second.mp4");
        assert_eq!(items[1].content, "");
    }

    #[test]
    fn test_parse_garbage_fails() {
        let err = parse_feed(b"<html><body>not a feed</body></html>").unwrap_err();
        assert!(matches!(err, ApiError::InvalidFeed(_)));
    }

    #[tokio::test]
    async fn test_fetch_feed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/feed.xml")
            .with_status(200)
            .with_header("content-type", "application/rss+xml")
            .with_body(RSS_FEED)
            .create_async()
            .await;

        let client = FeedClient::new(ClientConfig::default()).unwrap();
        let items = client
            .fetch_feed(&format!("{}/feed.xml", server.url()))
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_feed_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/feed.xml")
            .with_status(404)
            .create_async()
            .await;

        let client = FeedClient::new(ClientConfig::default()).unwrap();
        let err = client
            .fetch_feed(&format!("{}/feed.xml", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::RequestError(_)));
    }
}
