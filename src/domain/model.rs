use std::fmt;
use std::path::PathBuf;

use crate::api::FeedItem;
use crate::domain::AppError;
use crate::utils::{clean_path, collapse_whitespace, extract_sequence_number};

/// Separates the series (folder) from the episode in an item title,
/// e.g. "Mastering NHibernate 2: Search".
const TITLE_SEPARATOR: &str = ": ";

const FILE_EXTENSION: &str = ".mp4";

/// Where and under which name one feed item ends up on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadDescriptor {
    pub title: String,
    pub description: String,
    pub folder_name: String,
    pub file_name: String,
    pub source_url: String,
}

impl TryFrom<&FeedItem> for DownloadDescriptor {
    type Error = AppError;

    fn try_from(item: &FeedItem) -> Result<Self, Self::Error> {
        let title = &item.title;

        let (series, episode) =
            title
                .split_once(TITLE_SEPARATOR)
                .ok_or_else(|| AppError::Parse {
                    title: title.clone(),
                })?;

        let folder_name = clean_path(series);
        let base_file_name = format!("{}{}", clean_path(episode), FILE_EXTENSION);

        let file_name = match extract_sequence_number(&item.link) {
            Some(sequence) => format!("{} {:03} {}", folder_name, sequence, base_file_name),
            None => format!("{} {}", folder_name, base_file_name),
        };

        Ok(Self {
            title: title.clone(),
            description: item.content.clone(),
            folder_name,
            file_name: collapse_whitespace(&file_name),
            source_url: item.link.clone(),
        })
    }
}

impl fmt::Display for DownloadDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// What happened to a single descriptor handed to the downloader.
#[derive(Debug)]
pub enum DownloadOutcome {
    Downloaded { path: PathBuf, bytes: u64 },
    AlreadyPresent(PathBuf),
    Failed(AppError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, link: &str) -> FeedItem {
        FeedItem {
            title: title.to_string(),
            link: link.to_string(),
            content: "notes".to_string(),
        }
    }

    #[test]
    fn test_descriptor_with_sequence_number() {
        let link = "http://delivery.tekpub.com/nh/mastering/5/hd/file.mp4?token=xyz";
        let descriptor =
            DownloadDescriptor::try_from(&item("Mastering NHibernate 2: Search", link)).unwrap();

        assert_eq!(descriptor.title, "Mastering NHibernate 2: Search");
        assert_eq!(descriptor.description, "notes");
        assert_eq!(descriptor.folder_name, "Mastering NHibernate 2");
        assert_eq!(descriptor.file_name, "Mastering-NHibernate-2-005-Search.mp4");
        assert_eq!(descriptor.source_url, link);
    }

    #[test]
    fn test_descriptor_without_sequence_number() {
        let descriptor = DownloadDescriptor::try_from(&item(
            "Full Throttle: Git  Basics?",
            "http://example.com/git.mp4",
        ))
        .unwrap();

        assert_eq!(descriptor.folder_name, "Full Throttle");
        assert_eq!(descriptor.file_name, "Full-Throttle-Git-Basics.mp4");
    }

    #[test]
    fn test_descriptor_splits_on_first_separator() {
        let descriptor =
            DownloadDescriptor::try_from(&item("Series: Part: Two", "http://example.com/a"))
                .unwrap();

        assert_eq!(descriptor.folder_name, "Series");
        assert_eq!(descriptor.file_name, "Series-Part-Two.mp4");
    }

    #[test]
    fn test_descriptor_requires_separator() {
        let err = DownloadDescriptor::try_from(&item("NoColonHere", "http://example.com/a"))
            .unwrap_err();
        assert!(matches!(err, AppError::Parse { ref title } if title == "NoColonHere"));

        // a colon without the trailing space is not the separator
        assert!(DownloadDescriptor::try_from(&item("Time:10", "http://example.com/a")).is_err());
    }

    #[test]
    fn test_descriptor_names_are_safe() {
        let descriptor = DownloadDescriptor::try_from(&item(
            "../../Evil/Series: <script>rm -rf /</script>",
            "http://example.com/a",
        ))
        .unwrap();

        assert!(!descriptor.folder_name.contains('/'));
        assert!(!descriptor.file_name.contains('/'));
        assert!(!descriptor.file_name.contains(char::is_whitespace));
        assert!(descriptor.file_name.ends_with(".mp4"));
    }

    #[test]
    fn test_display_is_title() {
        let descriptor =
            DownloadDescriptor::try_from(&item("A: B", "http://example.com/a")).unwrap();
        assert_eq!(descriptor.to_string(), "A: B");
    }
}
