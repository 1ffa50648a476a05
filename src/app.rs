use std::process::ExitCode;

use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::api::{ClientConfig, FeedClient};
use crate::application::{spawn_stop_listener, FeedRunner, RunSummary};
use crate::config::CatcherSettings;

/// Run the whole download pass with a console stop listener alongside it.
pub async fn run(settings: &CatcherSettings) -> ExitCode {
    let api_client = match FeedClient::new(ClientConfig::default()) {
        Ok(client) => client,
        Err(e) => {
            error!("Unable to create the HTTP client. Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let stop = CancellationToken::new();
    let shutdown = CancellationToken::new();

    info!("Write \"stop\" and press <Enter> to stop downloading.");
    let listener = spawn_stop_listener(
        BufReader::new(tokio::io::stdin()),
        stop.clone(),
        shutdown.clone(),
    );

    let result = FeedRunner::new(settings, api_client).run(&stop).await;

    shutdown.cancel();
    if let Err(e) = listener.await {
        warn!("Stop listener ended abnormally. Error: {}", e);
    }

    match result {
        Ok(summary) => {
            log_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Unable to fetch feed {:?}. Error: {}", settings.feed_url, e);
            ExitCode::FAILURE
        }
    }
}

fn log_summary(summary: &RunSummary) {
    info!(
        "Done: {} downloaded, {} already present, {} unparseable, {} failed{}.",
        summary.downloaded,
        summary.already_present,
        summary.unparseable,
        summary.failed,
        if summary.stopped { ", stopped early" } else { "" }
    );
}
