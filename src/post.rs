//! Defines the [`Post`] and [`Frontmatter`] types and the logic for parsing
//! them from source files. A post source file optionally starts with a
//! `---`-delimited frontmatter block of `key: value` lines; everything after
//! the block is the raw markdown body. A file without a leading fence is not
//! an error: the whole file becomes the body and the metadata stays empty.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::time;

/// The body substring marking the start of quoted external content.
pub const REPOST_MARKER: &str = "> **From";

static RE_INLINE_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!-- original[_-]time: (.+?) -->\n?").unwrap());
static RE_INLINE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!-- original[_-]url: (.+?) -->\n?").unwrap());

/// Typed post metadata. The recognized frontmatter keys get named optional
/// fields; anything else lands in the `extra` bag so unknown keys survive a
/// parse round-trip without special handling.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frontmatter {
    pub time: Option<String>,
    pub date: Option<String>,
    pub tags: Option<String>,
    pub mood: Option<String>,
    pub model: Option<String>,
    pub cover: Option<String>,
    pub original_time: Option<String>,
    pub original_url: Option<String>,
    pub extra: BTreeMap<String, String>,
}

impl Frontmatter {
    fn insert(&mut self, key: &str, value: String) {
        match key {
            "time" => self.time = Some(value),
            "date" => self.date = Some(value),
            "tags" => self.tags = Some(value),
            "mood" => self.mood = Some(value),
            "model" => self.model = Some(value),
            "cover" => self.cover = Some(value),
            "original_time" | "original-time" => self.original_time = Some(value),
            "original_url" | "original-url" => self.original_url = Some(value),
            _ => {
                self.extra.insert(key.to_owned(), value);
            }
        }
    }
}

/// One published item: a single markdown+frontmatter source file. Identity
/// is the source path; `id` (the filename stem) names the detail page.
#[derive(Clone, Debug)]
pub struct Post {
    pub source_path: PathBuf,

    /// Path relative to the corpus root, exposed to templates as the
    /// post's `data-source` attribute.
    pub rel_path: String,

    /// Filename stem; the detail page is written to `post/{id}.html`.
    pub id: String,

    pub front: Frontmatter,

    /// Raw markdown after the frontmatter block, with any inline
    /// original-time/url comment markers already extracted and removed.
    pub body: String,

    /// The single authoritative datetime for the post, derived via the
    /// fallback chain in [`crate::time`]. Never null: a sentinel epoch
    /// guarantees totality.
    pub resolved: NaiveDateTime,

    /// Ordered, trimmed tokens from the `tags` frontmatter field. Compared
    /// case-insensitively everywhere, displayed case-preserved.
    pub tags: Vec<String>,
}

impl Post {
    /// Reads and parses a post from `path`. `corpus_root` is the posts
    /// directory, used only to compute the relative source path.
    pub fn from_file(path: &Path, corpus_root: &Path) -> Result<Post> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Annotated(format!("reading `{}`", path.display()), Box::new(Error::Io(e))))?;
        Ok(Post::from_source(path, corpus_root, &contents))
    }

    /// Parses a post from already-read file contents. Parsing itself cannot
    /// fail: missing frontmatter means empty metadata, and timestamp
    /// resolution is total.
    pub fn from_source(path: &Path, corpus_root: &Path, contents: &str) -> Post {
        let (mut front, mut body) = parse_frontmatter(contents);
        extract_inline_markers(&mut front, &mut body);

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let id = path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let rel_path = path
            .strip_prefix(corpus_root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        let resolved = time::resolve(&front, &file_name, time::file_mtime(path));
        let tags = parse_tags(front.tags.as_deref());

        Post {
            source_path: path.to_owned(),
            rel_path,
            id,
            front,
            body,
            resolved,
            tags,
        }
    }

    /// Whether the body quotes external content (contains a repost marker
    /// line).
    pub fn is_repost(&self) -> bool {
        self.body.lines().any(|l| l.starts_with(REPOST_MARKER))
    }
}

/// Splits file contents into metadata and body. The frontmatter block is a
/// leading `---` line followed by `key: value` lines (split on the first
/// colon, both sides trimmed) up to the closing `---`. A missing closing
/// fence consumes the rest of the file as metadata, matching the leniency
/// of the upstream corpus.
fn parse_frontmatter(contents: &str) -> (Frontmatter, String) {
    let mut front = Frontmatter::default();
    let mut lines = contents.lines();
    match lines.next() {
        Some(first) if first.trim() == "---" => {
            let mut body_lines: Vec<&str> = Vec::new();
            let mut in_front = true;
            for line in lines {
                if in_front {
                    if line.trim() == "---" {
                        in_front = false;
                    } else if let Some((key, value)) = line.split_once(':') {
                        front.insert(key.trim(), value.trim().to_owned());
                    }
                } else {
                    body_lines.push(line);
                }
            }
            (front, body_lines.join("\n"))
        }
        _ => (front, contents.to_owned()),
    }
}

/// Pulls `<!-- original_time: ... -->` / `<!-- original_url: ... -->`
/// markers out of the body. Frontmatter wins when both are present; the
/// markers are removed from the body either way so they never leak into the
/// rendered HTML.
fn extract_inline_markers(front: &mut Frontmatter, body: &mut String) {
    if let Some(caps) = RE_INLINE_TIME.captures(body) {
        if front.original_time.is_none() {
            front.original_time = Some(caps[1].trim().to_owned());
        }
        *body = RE_INLINE_TIME.replace_all(body, "").into_owned();
    }
    if let Some(caps) = RE_INLINE_URL.captures(body) {
        if front.original_url.is_none() {
            front.original_url = Some(caps[1].trim().to_owned());
        }
        *body = RE_INLINE_URL.replace_all(body, "").into_owned();
    }
}

fn parse_tags(tags: Option<&str>) -> Vec<String> {
    match tags {
        Some(tags) => tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect(),
        None => Vec::new(),
    }
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error reading a [`Post`] source file.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O errors (unreadable file, non-UTF-8 contents).
    Io(std::io::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(name: &str, contents: &str) -> Post {
        Post::from_source(Path::new(name), Path::new(""), contents)
    }

    #[test]
    fn test_parse_frontmatter() {
        let post = parse(
            "2026-02-01-090000.md",
            "---\ndate: 2026-02-01\ntime: 09:00:00\ntags: Repost, X\nmood: curious\ncustom: kept\n---\nHello",
        );
        assert_eq!(post.front.date.as_deref(), Some("2026-02-01"));
        assert_eq!(post.front.time.as_deref(), Some("09:00:00"));
        assert_eq!(post.front.mood.as_deref(), Some("curious"));
        assert_eq!(post.front.extra.get("custom").map(String::as_str), Some("kept"));
        assert_eq!(post.tags, vec!["Repost", "X"]);
        assert_eq!(post.body, "Hello");
    }

    #[test]
    fn test_missing_fence_is_all_body() {
        let post = parse("note.md", "no frontmatter here\njust body");
        assert_eq!(post.front, Frontmatter::default());
        assert_eq!(post.body, "no frontmatter here\njust body");
    }

    #[test]
    fn test_value_with_colons_splits_once() {
        let post = parse("t.md", "---\ntime: 2026-02-01 09:00:00\n---\nx");
        assert_eq!(post.front.time.as_deref(), Some("2026-02-01 09:00:00"));
    }

    #[test]
    fn test_inline_markers_extracted_and_stripped() {
        let post = parse(
            "r.md",
            "---\ntags: Repost\n---\nsaw this\n\n> **From X (@abc)**:\n> quoted\n<!-- original_time: 2026-01-31 12:00 -->\n<!-- original_url: https://example.com/1 -->\n",
        );
        assert_eq!(post.front.original_time.as_deref(), Some("2026-01-31 12:00"));
        assert_eq!(
            post.front.original_url.as_deref(),
            Some("https://example.com/1")
        );
        assert!(!post.body.contains("<!--"));
        assert!(post.is_repost());
    }

    #[test]
    fn test_frontmatter_wins_over_inline_marker() {
        let post = parse(
            "r.md",
            "---\noriginal_url: https://example.com/meta\n---\n<!-- original_url: https://example.com/inline -->\nbody",
        );
        assert_eq!(
            post.front.original_url.as_deref(),
            Some("https://example.com/meta")
        );
        assert!(!post.body.contains("<!--"));
    }

    #[test]
    fn test_hyphenated_marker_keys() {
        let post = parse("r.md", "---\noriginal-url: https://example.com/x\n---\nbody");
        assert_eq!(
            post.front.original_url.as_deref(),
            Some("https://example.com/x")
        );
    }

    #[test]
    fn test_empty_tags_filtered() {
        let post = parse("t.md", "---\ntags: a, , b,\n---\nx");
        assert_eq!(post.tags, vec!["a", "b"]);
    }
}
