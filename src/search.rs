//! The client-side search index: one JSON document over the whole corpus
//! with markup-stripped excerpts. Search itself happens in the browser;
//! this module only emits the data.

use std::fmt;
use std::fs::File;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::config::Config;
use crate::markdown;
use crate::post::Post;

const TITLE_LIMIT: usize = 60;
const EXCERPT_LIMIT: usize = 500;

#[derive(Serialize)]
struct SearchIndex {
    generated_at: String,
    total: usize,
    posts: Vec<SearchEntry>,
}

#[derive(Serialize)]
struct SearchEntry {
    id: String,
    url: String,
    title: String,
    content: String,
    time: String,
    tags: Vec<String>,
}

/// Writes `search-index.json` in the output root covering all posts.
pub fn write_search_index(config: &Config, posts: &[Post], now: NaiveDateTime) -> Result<()> {
    let base = config.profile.base_url.as_str().trim_end_matches('/');
    let entries: Vec<SearchEntry> = posts
        .iter()
        .map(|post| SearchEntry {
            id: post.id.clone(),
            url: format!("{}/post/{}.html", base, post.id),
            title: generated_title(post),
            content: excerpt(&post.body),
            time: post.resolved.format("%Y-%m-%d %H:%M:%S").to_string(),
            tags: post.tags.clone(),
        })
        .collect();

    let index = SearchIndex {
        generated_at: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        total: entries.len(),
        posts: entries,
    };

    let file = File::create(config.output_dir.join("search-index.json"))?;
    serde_json::to_writer_pretty(file, &index)?;
    Ok(())
}

/// Posts have no title; the index shows the opening of the body with
/// newlines collapsed, ellipsized when cut.
fn generated_title(post: &Post) -> String {
    let text = markdown::truncate_chars(&post.body, TITLE_LIMIT)
        .trim()
        .replace('\n', " ");
    match post.body.chars().count() > TITLE_LIMIT {
        true => format!("{}...", text),
        false => text,
    }
}

/// A plain-text excerpt: markup stripped, whitespace collapsed, capped.
fn excerpt(body: &str) -> String {
    let text = markdown::strip_markup(body);
    markdown::truncate_chars(&text, EXCERPT_LIMIT).to_owned()
}

/// Represents the result of a search-index write.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem writing the search index.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    Io(std::io::Error),

    /// Returned when JSON serialization fails.
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Json(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator in fallible index operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    /// Converts [`serde_json::Error`]s into [`Error`]. This allows us to
    /// use the `?` operator in fallible index operations.
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}
