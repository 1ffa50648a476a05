use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("The title format is invalid: {title:?}")]
    Parse { title: String },

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No data received for {0:?}")]
    Stalled(Duration),
}

impl AppError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
