use std::path::Path;

use bytes::Bytes;
use futures::{stream::BoxStream, StreamExt};
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{info, warn};

use crate::{
    api::FeedClient,
    domain::{AppError, DownloadDescriptor, DownloadOutcome},
};

const WRITE_BUFFER_SIZE: usize = 4096;

/// Appended to the file name while the body is still being written.
const PART_SUFFIX: &str = ".part";

/// Streams single descriptors to `{root}/{folder_name}/{file_name}`.
#[derive(Clone)]
pub struct DownloadCoordinator {
    api_client: FeedClient,
}

impl DownloadCoordinator {
    pub fn new(api_client: FeedClient) -> Self {
        Self { api_client }
    }

    /// Download one descriptor below `root`.
    ///
    /// Never fails: every problem is logged and reported as `DownloadOutcome::Failed`
    /// so the caller can move on to the next item. A file that already exists at the
    /// destination is left untouched.
    pub async fn fetch(&self, descriptor: &DownloadDescriptor, root: &Path) -> DownloadOutcome {
        match self.try_fetch(descriptor, root).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Unable to download item {:?}. Error: {}", descriptor.title, e);
                DownloadOutcome::Failed(e)
            }
        }
    }

    async fn try_fetch(
        &self,
        descriptor: &DownloadDescriptor,
        root: &Path,
    ) -> Result<DownloadOutcome, AppError> {
        let (total_size, stream) = self
            .api_client
            .download_file_stream(&descriptor.source_url)
            .await?;

        let folder = root.join(&descriptor.folder_name);
        fs::create_dir_all(&folder)
            .await
            .map_err(|e| AppError::io(&folder, e))?;

        let path = folder.join(&descriptor.file_name);
        if fs::try_exists(&path).await.unwrap_or(false) {
            info!(
                "Skipping item {:?}. The file has already been downloaded before.",
                descriptor.title
            );
            return Ok(DownloadOutcome::AlreadyPresent(path));
        }

        // the final name only appears once the body is complete; a leftover
        // part file from an interrupted run is simply overwritten
        let part_path = folder.join(format!("{}{}", descriptor.file_name, PART_SUFFIX));
        let file = fs::File::create(&part_path)
            .await
            .map_err(|e| AppError::io(&part_path, e))?;

        info!(
            "Downloading item {:?} to {} ({}).",
            descriptor.title,
            path.display(),
            total_size.map_or_else(|| "unknown size".to_string(), |n| format!("{n} bytes"))
        );

        let written = match self.stream_to_file(stream.boxed(), file, &part_path).await {
            Ok(bytes) => fs::rename(&part_path, &path)
                .await
                .map(|_| bytes)
                .map_err(|e| AppError::io(&path, e)),
            Err(e) => Err(e),
        };

        match written {
            Ok(bytes) => {
                info!("Finished {:?} ({} bytes).", descriptor.title, bytes);
                Ok(DownloadOutcome::Downloaded { path, bytes })
            }
            Err(e) => {
                if let Err(remove_err) = fs::remove_file(&part_path).await {
                    warn!(
                        "Unable to remove partial file {}. Error: {}",
                        part_path.display(),
                        remove_err
                    );
                }
                Err(e)
            }
        }
    }

    async fn stream_to_file(
        &self,
        mut stream: BoxStream<'static, crate::api::client::Result<Bytes>>,
        file: fs::File,
        path: &Path,
    ) -> Result<u64, AppError> {
        let stall_timeout = self.api_client.config().stall_timeout;
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
        let mut downloaded = 0u64;

        loop {
            let next = tokio::time::timeout(stall_timeout, stream.next())
                .await
                .map_err(|_| AppError::Stalled(stall_timeout))?;

            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk?;

            writer
                .write_all(&chunk)
                .await
                .map_err(|e| AppError::io(path, e))?;
            downloaded += chunk.len() as u64;
        }

        writer.flush().await.map_err(|e| AppError::io(path, e))?;
        writer
            .get_ref()
            .sync_all()
            .await
            .map_err(|e| AppError::io(path, e))?;

        Ok(downloaded)
    }
}
