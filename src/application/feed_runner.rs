use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    api::{FeedClient, FeedItem},
    application::DownloadCoordinator,
    config::CatcherSettings,
    domain::{AppError, DownloadDescriptor, DownloadOutcome},
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub downloaded: usize,
    pub already_present: usize,
    pub unparseable: usize,
    pub failed: usize,
    /// The stop command ended the run before the feed was exhausted
    pub stopped: bool,
}

/// Drives one pass over the feed: fetch once, then download item by item.
pub struct FeedRunner<'a> {
    settings: &'a CatcherSettings,
    api_client: FeedClient,
    coordinator: DownloadCoordinator,
}

impl<'a> FeedRunner<'a> {
    pub fn new(settings: &'a CatcherSettings, api_client: FeedClient) -> Self {
        let coordinator = DownloadCoordinator::new(api_client.clone());
        Self {
            settings,
            api_client,
            coordinator,
        }
    }

    /// Fetch the feed and process all of its items.
    ///
    /// Only a failed feed fetch is an error; per-item problems end up in the summary.
    pub async fn run(&self, stop: &CancellationToken) -> Result<RunSummary, AppError> {
        info!("Fetching feed {:?}", self.settings.feed_url);
        let items = self.api_client.fetch_feed(&self.settings.feed_url).await?;

        info!(
            "Downloading {} items to folder {:?}.",
            items.len(),
            self.settings.download_path
        );
        Ok(self.process_items(&items, stop).await)
    }

    /// Process items strictly in the given order, one download at a time.
    ///
    /// `stop` is only looked at between items, an in-flight download always completes.
    pub async fn process_items(&self, items: &[FeedItem], stop: &CancellationToken) -> RunSummary {
        let mut summary = RunSummary::default();

        for item in items {
            match DownloadDescriptor::try_from(item) {
                Ok(descriptor) => {
                    debug!(
                        description = %descriptor.description,
                        "Parsed item {:?}",
                        descriptor.title
                    );

                    match self
                        .coordinator
                        .fetch(&descriptor, &self.settings.download_path)
                        .await
                    {
                        DownloadOutcome::Downloaded { path, bytes } => {
                            debug!("Saved {} ({} bytes)", path.display(), bytes);
                            summary.downloaded += 1;
                        }
                        DownloadOutcome::AlreadyPresent(path) => {
                            debug!("Kept existing {}", path.display());
                            summary.already_present += 1;
                        }
                        DownloadOutcome::Failed(e) => {
                            debug!("Skipped {:?}: {:?}", descriptor.title, e);
                            summary.failed += 1;
                        }
                    }
                }
                Err(e) => {
                    warn!("Unable to parse item {:?}. {}", item.title, e);
                    summary.unparseable += 1;
                }
            }

            if stop.is_cancelled() {
                info!("Download process stopped.");
                summary.stopped = true;
                break;
            }
        }

        summary
    }
}
