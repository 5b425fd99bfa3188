//! The library code for the `chirp` static microblog renderer. A run is a
//! single batch pass over a flat corpus of markdown+frontmatter posts:
//!
//! 1. Scanning and parsing posts from source files ([`crate::post`])
//! 2. Compacting the corpus by deleting exact-duplicate posts
//!    ([`crate::dedup`])
//! 3. Aggregating date groups, the tag vocabulary, archive counts, and
//!    themes ([`crate::index`], [`crate::theme`])
//! 4. Rendering and writing the output pages ([`crate::write`]) along with
//!    the RSS feed ([`crate::feed`]) and the search index ([`crate::search`])
//!
//! Of these, the fourth step is the most involved. Every post body is split
//! into original commentary and an optional quoted repost section, converted
//! to HTML, and truncated on list pages ([`crate::render`]); the date pages
//! are stitched together with ellipsis-style pagination
//! ([`crate::paginate`]); and detail pages for old, unmodified posts are
//! skipped via a small freshness check ([`crate::cache`]).
//!
//! The pipeline is single-threaded and makes exactly one mutating pass over
//! the corpus (the duplicate deletion), which completes before any page is
//! rendered.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod cache;
pub mod config;
pub mod dedup;
pub mod feed;
pub mod index;
pub mod markdown;
pub mod paginate;
pub mod post;
pub mod render;
pub mod search;
pub mod theme;
pub mod time;
pub mod value;
pub mod write;
