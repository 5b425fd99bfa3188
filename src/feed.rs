//! Support for creating the RSS 2.0 feed from a list of posts.

use std::fmt;
use std::fs::File;
use std::io::Write;

use chrono::NaiveDateTime;
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder};

use crate::config::Config;
use crate::markdown;
use crate::post::Post;
use crate::render;

/// The feed carries only the newest posts.
const FEED_SIZE: usize = 20;

/// Creates `feed.xml` in the output root from the newest [`FEED_SIZE`]
/// posts. Item descriptions are the full rendered HTML (no truncation) with
/// asset references rewritten to absolute URLs so they resolve inside feed
/// readers.
pub fn write_feed(config: &Config, posts: &[Post], now: NaiveDateTime) -> Result<()> {
    let base = config.profile.base_url.as_str().trim_end_matches('/');
    let static_prefix = format!("{}/static", base);

    let items: Vec<rss::Item> = posts
        .iter()
        .take(FEED_SIZE)
        .map(|post| {
            let link = format!("{}/post/{}.html", base, post.id);
            let description = render::render_body_with(post, false, &link, &static_prefix);
            ItemBuilder::default()
                .title(Some(item_title(post)))
                .link(Some(link.clone()))
                .guid(Some(GuidBuilder::default().permalink(true).value(link).build()))
                .description(Some(description))
                .pub_date(Some(rfc2822(post.resolved)))
                .build()
        })
        .collect();

    let channel = ChannelBuilder::default()
        .title(config.profile.name.clone())
        .link(base.to_owned())
        .description(config.profile.bio.clone())
        .last_build_date(Some(rfc2822(now)))
        .items(items)
        .build();

    let mut file = File::create(config.output_dir.join("feed.xml"))?;
    writeln!(file, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    channel.write_to(&mut file)?;
    Ok(())
}

/// Posts have no title field; the feed borrows the opening of the body.
fn item_title(post: &Post) -> String {
    let text = markdown::truncate_chars(&post.body, 50)
        .trim()
        .replace('\n', " ");
    match post.body.chars().count() > 50 {
        true => format!("{}...", text),
        false => text,
    }
}

/// Formats a naive local timestamp as RFC 2822 for `pubDate` /
/// `lastBuildDate`.
fn rfc2822(dt: NaiveDateTime) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S +0000").to_string()
}

/// Represents the result of a feed-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating the feed.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    Io(std::io::Error),

    /// Returned when there is an RSS serialization error.
    Rss(rss::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Rss(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Rss(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator in fallible feed operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<rss::Error> for Error {
    /// Converts [`rss::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: rss::Error) -> Error {
        Error::Rss(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rfc2822_format() {
        let dt = NaiveDateTime::parse_from_str("2026-02-01 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(rfc2822(dt), "Sun, 01 Feb 2026 09:00:00 +0000");
    }

    #[test]
    fn test_item_title_truncated() {
        let post = Post::from_source(
            std::path::Path::new("x.md"),
            std::path::Path::new(""),
            &format!("---\n---\n{}", "a".repeat(80)),
        );
        let title = item_title(&post);
        assert_eq!(title.chars().count(), 53);
        assert!(title.ends_with("..."));
    }
}
