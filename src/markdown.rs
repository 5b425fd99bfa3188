//! Markdown conversion and the small HTML text utilities layered on top of
//! it: asset-path rewriting for page depth and markup stripping for meta
//! descriptions and the search index.

use std::sync::LazyLock;

use pulldown_cmark::{html, Options, Parser};
use regex::Regex;

static RE_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*_`#>\[\]()!]").unwrap());
static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Converts CommonMark to HTML with the extensions the corpus relies on
/// (tables, fenced code is core, strikethrough, task lists).
pub fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::new();
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}

/// Rewrites references to the shared static root for the current page's
/// directory depth. Home pages reference `static/...` directly and need no
/// rewrite; date and detail pages live one level down and reference
/// `../static/...`. Applied to the rendered HTML so inline `<img>` tags are
/// covered, not just markdown-sourced ones.
pub fn rewrite_asset_paths(html: &str, static_prefix: &str) -> String {
    if static_prefix == "static" {
        return html.to_owned();
    }
    html.replace("src=\"static/", &format!("src=\"{}/", static_prefix))
        .replace("href=\"static/", &format!("href=\"{}/", static_prefix))
}

/// Strips markdown punctuation and collapses whitespace, leaving plain text
/// for excerpts. Lossy by design; good enough for search and descriptions.
pub fn strip_markup(markdown: &str) -> String {
    let text = RE_MARKUP.replace_all(markdown, "");
    RE_WHITESPACE.replace_all(&text, " ").trim().to_owned()
}

/// Truncates to at most `limit` characters on a char boundary.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_offset, _)) => &text[..byte_offset],
        None => text,
    }
}
