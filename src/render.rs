//! Turns one [`Post`] into its HTML fragment for a given page context.
//! Splits original commentary from quoted repost content, truncates long
//! commentary on list pages, converts markdown to HTML, and rewrites asset
//! paths for the page's directory depth.

use std::borrow::Cow;
use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::Profile;
use crate::markdown;
use crate::post::{Post, REPOST_MARKER};

/// List-context truncation threshold, measured in characters of the raw
/// markdown source (pre-render, so the cut point is deterministic).
pub const TRUNCATE_LIMIT: usize = 500;

// Redundant "view original" links left behind by older corpus writers;
// stripped from the quoted section before rendering.
static RE_LEGACY_LINKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"> \[(View on X|View Post|View on Weibo|View Original|携家带口恭贺新年)\]\(.*?\)\s*")
        .unwrap()
});

/// Which page a fragment is rendered for. Decides truncation and how the
/// fragment reaches the shared static root and the detail page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PageContext {
    Home,
    Date,
    Detail,
}

impl PageContext {
    /// Relative path from this page to the static asset root.
    pub fn static_prefix(&self) -> &'static str {
        match self {
            PageContext::Home => "static",
            PageContext::Date | PageContext::Detail => "../static",
        }
    }

    /// Relative URL from this page to a post's detail page.
    pub fn detail_url(&self, id: &str) -> String {
        match self {
            PageContext::Home => format!("post/{}.html", id),
            PageContext::Date => format!("../post/{}.html", id),
            PageContext::Detail => format!("{}.html", id),
        }
    }

    /// Relative URL from this page back to the home page.
    pub fn home_url(&self) -> &'static str {
        match self {
            PageContext::Home => "index.html",
            PageContext::Date | PageContext::Detail => "../index.html",
        }
    }

    /// Truncation applies only in list contexts, never on a post's own
    /// detail page.
    pub fn truncates(&self) -> bool {
        !matches!(self, PageContext::Detail)
    }
}

/// A body split at the repost marker.
pub struct SplitBody<'a> {
    /// Original commentary (everything before the marker), trimmed.
    pub commentary: &'a str,

    /// The quoted section, from the marker line onward; `None` when the
    /// body has no marker.
    pub repost: Option<&'a str>,
}

/// Splits at the first line starting with the repost marker. Without a
/// marker the whole body is commentary.
pub fn split_body(body: &str) -> SplitBody {
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if line.starts_with(REPOST_MARKER) {
            return SplitBody {
                commentary: body[..offset].trim(),
                repost: Some(body[offset..].trim()),
            };
        }
        offset += line.len();
    }
    SplitBody {
        commentary: body.trim(),
        repost: None,
    }
}

/// Applies the list-page truncation rule. Returns the (possibly truncated)
/// text and whether anything was cut.
fn maybe_truncate(text: &str, truncate: bool) -> (Cow<str>, bool) {
    if !truncate || text.chars().count() <= TRUNCATE_LIMIT {
        return (Cow::Borrowed(text), false);
    }
    let mut cut = markdown::truncate_chars(text, TRUNCATE_LIMIT)
        .trim_end()
        .to_owned();
    if !cut.ends_with("...") {
        cut.push_str(" ...");
    }
    (Cow::Owned(cut), true)
}

/// Renders the `tweet-text` block: commentary, the quoted repost section
/// with its info block, and the read-more link when truncated.
pub fn render_body(post: &Post, ctx: PageContext) -> String {
    render_body_with(
        post,
        ctx.truncates(),
        &ctx.detail_url(&post.id),
        ctx.static_prefix(),
    )
}

/// Body rendering with the truncation flag and both path prefixes spelled
/// out; the feed uses this to produce full-length HTML with absolute asset
/// URLs.
pub fn render_body_with(
    post: &Post,
    truncate: bool,
    detail_url: &str,
    static_prefix: &str,
) -> String {
    let split = split_body(&post.body);

    let read_more = |is_long: bool| -> String {
        if is_long {
            format!(
                r#"<div class="read-more"><a href="{}">Read more</a></div>"#,
                detail_url
            )
        } else {
            String::new()
        }
    };

    match split.repost {
        Some(repost) => {
            let (commentary, is_long) = maybe_truncate(split.commentary, truncate);
            let commentary_html = markdown::rewrite_asset_paths(
                &markdown::to_html(&commentary),
                static_prefix,
            );
            let cleaned = RE_LEGACY_LINKS.replace_all(repost, "");
            let repost_html =
                markdown::rewrite_asset_paths(&markdown::to_html(&cleaned), static_prefix);
            format!(
                concat!(
                    "<div class=\"tweet-text\">\n",
                    "{commentary}\n",
                    "<div class=\"repost-wrapper\">\n{repost}\n{info}</div>\n",
                    "{read_more}\n",
                    "</div>\n",
                ),
                commentary = commentary_html,
                repost = repost_html,
                info = info_block(post),
                read_more = read_more(is_long),
            )
        }
        None => {
            let (body, is_long) = maybe_truncate(split.commentary, truncate);
            let body_html =
                markdown::rewrite_asset_paths(&markdown::to_html(&body), static_prefix);
            format!(
                "<div class=\"tweet-text\">\n{}\n{}\n</div>\n",
                body_html,
                read_more(is_long),
            )
        }
    }
}

/// The small info block shown under quoted material when the original
/// publication time or URL is known.
fn info_block(post: &Post) -> String {
    let time = post.front.original_time.as_deref().unwrap_or("");
    let url = post.front.original_url.as_deref();
    if time.is_empty() && url.is_none() {
        return String::new();
    }
    let mut block = String::from("<div class=\"repost-info-container\">\n");
    if !time.is_empty() {
        let _ = writeln!(block, r#"<div class="original-time">{}</div>"#, time);
    }
    if let Some(url) = url {
        let _ = writeln!(
            block,
            r#"<div class="original-url"><a href="{}" target="_blank">View Post</a></div>"#,
            url
        );
    }
    block.push_str("</div>\n");
    block
}

/// Renders the full `tweet` fragment for a post: profile header, optional
/// model line and cover image, the body block, tag chips, and the
/// timestamp link to the detail page.
pub fn render_post(post: &Post, profile: &Profile, timestamp: i64, ctx: PageContext) -> String {
    let static_prefix = ctx.static_prefix();
    let detail_url = ctx.detail_url(&post.id);
    let home_url = ctx.home_url();

    let tags_attr = post
        .tags
        .iter()
        .map(|t| t.to_lowercase())
        .collect::<Vec<_>>()
        .join(",");
    let post_type = if post.is_repost() { "repost" } else { "original" };

    let mut out = String::new();
    let _ = write!(
        out,
        concat!(
            "<div class=\"tweet\" data-tags=\"{tags}\" data-type=\"{ty}\" data-source=\"{source}\">\n",
            "<div class=\"tweet-header\">\n",
            "<div class=\"tweet-avatar\">\n",
            "<a href=\"{home}\"><img src=\"{prefix}/avatar.png?v={ts}\" alt=\"Avatar\"></a>\n",
            "</div>\n",
            "<div class=\"tweet-content-wrapper\">\n",
            "<div class=\"tweet-author\">\n",
            "<a href=\"{home}\" class=\"author-link\">\n",
            "<span class=\"tweet-name\">{name}</span>\n",
            "<span class=\"tweet-handle\">@{handle}</span>\n",
            "</a>\n",
        ),
        tags = tags_attr,
        ty = post_type,
        source = post.rel_path,
        home = home_url,
        prefix = static_prefix,
        ts = timestamp,
        name = profile.name,
        handle = profile.handle,
    );

    if let Some(model) = &post.front.model {
        let _ = writeln!(out, r#"<div class="tweet-model">🤖 {}</div>"#, model);
    }
    out.push_str("</div>\n");

    if let Some(cover) = cover_url(post, static_prefix) {
        let _ = writeln!(
            out,
            r#"<div class="tweet-cover"><img src="{}" alt="Cover" class="cover-image" loading="lazy"></div>"#,
            cover
        );
    }

    let _ = write!(
        out,
        "<div class=\"tweet-body\">\n{}</div>\n",
        render_body(post, ctx)
    );

    if !post.tags.is_empty() {
        out.push_str("<div class=\"tweet-tags\">\n");
        for tag in &post.tags {
            let _ = writeln!(
                out,
                r##"<span class="tag" data-tag="{}">#{}</span>"##,
                tag.to_lowercase(),
                tag
            );
        }
        out.push_str("</div>\n");
    }

    let _ = writeln!(
        out,
        "<div class=\"tweet-time\"><a href=\"{}\">{}</a></div>",
        detail_url,
        post.resolved.format("%Y-%m-%d %H:%M:%S"),
    );

    if ctx == PageContext::Detail {
        out.push_str(&share_block(post, profile));
    }

    out.push_str("</div>\n</div>\n</div>\n");
    out
}

const X_ICON: &str = r#"<svg viewBox="0 0 24 24" width="16" height="16"><path fill="currentColor" d="M18.244 2.25h3.308l-7.227 8.26 8.502 11.24H16.17l-5.214-6.817L4.99 21.75H1.68l7.73-8.835L1.254 2.25H8.08l4.713 6.231zm-1.161 17.52h1.833L7.084 4.126H5.117z"/></svg>"#;
const TELEGRAM_ICON: &str = r#"<svg viewBox="0 0 24 24" width="16" height="16"><path fill="currentColor" d="M11.944 0A12 12 0 0 0 0 12a12 12 0 0 0 12 12 12 12 0 0 0 12-12A12 12 0 0 0 12 0a12 12 0 0 0-.056 0zm4.962 7.224c.1-.002.321.023.465.14a.506.506 0 0 1 .171.325c.016.093.036.306.02.472-.18 1.898-.962 6.502-1.36 8.627-.168.9-.499 1.201-.82 1.23-.696.065-1.225-.46-1.9-.902-1.056-.693-1.653-1.124-2.678-1.8-1.185-.78-.417-1.21.258-1.91.177-.184 3.247-2.977 3.307-3.23.007-.032.014-.15-.056-.212s-.174-.041-.249-.024c-.106.024-1.793 1.14-5.061 3.345-.48.33-.913.49-1.302.48-.428-.008-1.252-.241-1.865-.44-.752-.245-1.349-.374-1.297-.789.027-.216.325-.437.893-.663 3.498-1.524 5.83-2.529 6.998-3.014 3.332-1.386 4.025-1.627 4.476-1.635z"/></svg>"#;
const COPY_ICON: &str = r#"<svg viewBox="0 0 24 24" width="16" height="16"><path fill="currentColor" d="M16 1H4c-1.1 0-2 .9-2 2v14h2V3h12V1zm3 4H8c-1.1 0-2 .9-2 2v14c0 1.1.9 2 2 2h11c1.1 0 2-.9 2-2V7c0-1.1-.9-2-2-2zm0 16H8V7h11v14z"/></svg>"#;

// Clipboard helper and the toast it reports through, emitted alongside the
// share block.
const COPY_SCRIPT: &str = r#"<script>
function copyToClipboard(text) {
    navigator.clipboard.writeText(text).then(() => {
        showToast('Link copied to clipboard');
    }).catch(() => {
        showToast('Failed to copy link', 'error');
    });
}
function showToast(message, type = 'success') {
    const toast = document.createElement('div');
    toast.className = 'toast toast-' + type;
    toast.textContent = message;
    document.body.appendChild(toast);
    setTimeout(() => toast.classList.add('visible'), 10);
    setTimeout(() => {
        toast.classList.remove('visible');
        setTimeout(() => document.body.removeChild(toast), 300);
    }, 2000);
}
</script>
"#;

/// X/Telegram share intents, a copy-link button, and the original-source
/// link, shown under a post on its own detail page. Entirely client-side.
fn share_block(post: &Post, profile: &Profile) -> String {
    let base = profile.base_url.as_str().trim_end_matches('/');
    let share_url = format!("{}/post/{}.html", base, post.id);

    let mut share_text = markdown::truncate_chars(&post.body, 80)
        .replace('"', "\\\"")
        .replace('\n', " ");
    if post.body.chars().count() > 80 {
        share_text.push_str("...");
    }

    let original_link = match post.front.original_url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => {
            share_text.push_str(&format!(" | Original: {}", url));
            format!("<br><br>Original: <a href=\"{url}\">{url}</a>\n", url = url)
        }
        None => String::new(),
    };

    let mut block = String::from(
        "<div class=\"tweet-share\">\n<span class=\"share-label\">Share to:</span>\n",
    );
    let _ = writeln!(
        block,
        r#"<a href="https://twitter.com/intent/tweet?text={text}&url={url}" target="_blank" rel="noopener" class="share-btn twitter" title="Share on X/Twitter">{icon} X</a>"#,
        text = share_text,
        url = share_url,
        icon = X_ICON,
    );
    let _ = writeln!(
        block,
        r#"<a href="https://t.me/share/url?url={url}&text={text}" target="_blank" rel="noopener" class="share-btn telegram" title="Share on Telegram">{icon} Telegram</a>"#,
        url = share_url,
        text = share_text,
        icon = TELEGRAM_ICON,
    );
    let _ = writeln!(
        block,
        r#"<button class="share-btn copy" onclick="copyToClipboard('{}')" title="Copy link">{} Copy link</button>"#,
        share_url, COPY_ICON,
    );
    block.push_str("</div>\n");
    block.push_str(&original_link);
    block.push_str(COPY_SCRIPT);
    block
}

/// Resolves the frontmatter `cover` path against the page's static prefix.
/// Absolute URLs pass through untouched; a leading `static/` is normalized
/// away before prefixing.
fn cover_url(post: &Post, static_prefix: &str) -> Option<String> {
    let cover = post.front.cover.as_deref().filter(|c| !c.is_empty())?;
    if cover.starts_with("http://") || cover.starts_with("https://") {
        return Some(cover.to_owned());
    }
    let cover = cover.strip_prefix("static/").unwrap_or(cover);
    Some(format!("{}/{}", static_prefix, cover))
}
