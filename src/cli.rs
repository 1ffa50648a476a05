use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::config::DEFAULT_FEED_URL;

/// Flags that are also accepted with a single leading dash, e.g. `-feedurl <url>`.
const SINGLE_DASH_FLAGS: [&str; 2] = ["downloadpath", "feedurl"];

#[derive(Parser, Debug)]
#[command(name = "feedcatcher", version)]
#[command(about = "Download the videos of an RSS feed into one folder per series")]
pub struct Cli {
    /// The target directory for your videos [default: ~/Videos/TekPub]
    #[arg(long = "downloadpath", value_name = "DIR")]
    pub download_path: Option<PathBuf>,

    /// Your feed URL
    #[arg(long = "feedurl", value_name = "URL", default_value = DEFAULT_FEED_URL)]
    pub feed_url: String,
}

/// Rewrite `-downloadpath` / `-feedurl` (optionally with `=value`) into their
/// double-dash form so clap can parse them.
pub fn normalize_single_dash_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            let Some(text) = arg.to_str() else {
                return arg;
            };
            let Some(flag) = text.strip_prefix('-').filter(|rest| !rest.starts_with('-')) else {
                return arg;
            };

            let name = flag.split_once('=').map_or(flag, |(name, _)| name);
            if SINGLE_DASH_FLAGS.contains(&name) {
                OsString::from(format!("-{text}"))
            } else {
                arg
            }
        })
        .collect()
}
