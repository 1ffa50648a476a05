//! Startup settings: where to download to and which feed to read.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use url::Url;

/// Placeholder shown as the `--feedurl` default; it never points at a real feed.
pub const DEFAULT_FEED_URL: &str = "http://delivery.tekpub.com/account/itunes.xml?token=123";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Cannot determine the current user's home directory.")]
    HomeDirUnavailable,

    #[error("Cannot determine the absolute path from {}: {source}", path.display())]
    Unresolvable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The directory {} does not exist.", .0.display())]
    NotFound(PathBuf),

    #[error("The path {} is no directory.", .0.display())]
    NotADirectory(PathBuf),

    #[error("Please specify a feed url.")]
    MissingFeedUrl,

    #[error("The feed url {url:?} is invalid: {source}")]
    InvalidFeedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Validated, read-only settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatcherSettings {
    /// Absolute, existing directory
    pub download_path: PathBuf,
    pub feed_url: String,
}

impl CatcherSettings {
    pub fn resolve(download_path: &Path, feed_url: &str) -> Result<Self, SettingsError> {
        let absolute =
            std::path::absolute(download_path).map_err(|source| SettingsError::Unresolvable {
                path: download_path.to_path_buf(),
                source,
            })?;
        let download_path = clean_lexically(&absolute);

        match std::fs::metadata(&download_path) {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => return Err(SettingsError::NotADirectory(download_path)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SettingsError::NotFound(download_path))
            }
            Err(source) => {
                return Err(SettingsError::Unresolvable {
                    path: download_path,
                    source,
                })
            }
        }

        let feed_url = feed_url.trim();
        if feed_url.is_empty() || feed_url == DEFAULT_FEED_URL {
            return Err(SettingsError::MissingFeedUrl);
        }
        Url::parse(feed_url).map_err(|source| SettingsError::InvalidFeedUrl {
            url: feed_url.to_string(),
            source,
        })?;

        Ok(Self {
            download_path,
            feed_url: feed_url.to_string(),
        })
    }
}

/// `~/Videos/TekPub`
pub fn default_download_path() -> Result<PathBuf, SettingsError> {
    dirs::home_dir()
        .map(|home| home.join("Videos").join("TekPub"))
        .ok_or(SettingsError::HomeDirUnavailable)
}

/// Drop `.` components and resolve `..` without touching the filesystem.
fn clean_lexically(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}
