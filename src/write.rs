//! Responsible for templating and writing the HTML pages: the home page,
//! one page per date group, and one detail page per post. Every page is
//! rendered through the same template with a shared set of named variables;
//! a templating failure aborts only the page it happened on.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use gtmpl::{Template, Value};

use crate::cache;
use crate::config::Config;
use crate::index::SiteIndex;
use crate::markdown;
use crate::paginate::PaginationState;
use crate::post::Post;
use crate::render::{self, PageContext};
use crate::theme::ThemeSummary;
use crate::value;

/// Per-stage page counts reported in the run summary.
#[derive(Default)]
pub struct WriteStats {
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Writes the HTML pages for one run. Holds everything pages share: the
/// parsed template, the site-wide aggregates, and the fixed per-run clock.
pub struct Writer<'a> {
    pub config: &'a Config,
    pub template: &'a Template,
    pub index: &'a SiteIndex<'a>,
    pub themes: &'a [ThemeSummary],

    /// The run's fixed "now"; also drives the freshness check.
    pub now: NaiveDateTime,

    /// Unix timestamp used for cache-busting asset query strings.
    pub timestamp: i64,
}

/// Per-page metadata fed into the `<head>` of the template.
struct PageMeta {
    title: String,
    description: String,
    og_title: String,
    og_type: &'static str,
    og_url: String,
}

impl Writer<'_> {
    /// Writes `index.html`: the most recent date group, paginated against
    /// the full date sequence.
    pub fn write_home(&self) -> Result<WriteStats> {
        let mut stats = WriteStats::default();
        let group = match self.index.groups.first() {
            Some(group) => group,
            None => return Ok(stats),
        };
        let content: Vec<String> = group
            .posts
            .iter()
            .map(|p| render::render_post(p, &self.config.profile, self.timestamp, PageContext::Home))
            .collect();
        let meta = PageMeta {
            title: String::from("Home"),
            description: self.config.profile.bio.clone(),
            og_title: self.config.profile.name.clone(),
            og_type: "website",
            og_url: self.page_url(""),
        };
        let value = self.page_value(
            meta,
            group.posts.len(),
            content.join("\n"),
            &PaginationState::home(&self.index.dates()),
        );
        self.write_page(&self.config.output_dir.join("index.html"), value, &mut stats);
        Ok(stats)
    }

    /// Writes one `date/YYYY-MM-DD.html` page per date group.
    pub fn write_date_pages(&self) -> Result<WriteStats> {
        let mut stats = WriteStats::default();
        let dates = self.index.dates();
        let dir = self.config.output_dir.join("date");
        std::fs::create_dir_all(&dir)?;

        for (i, group) in self.index.groups.iter().enumerate() {
            let content: Vec<String> = group
                .posts
                .iter()
                .map(|p| {
                    render::render_post(p, &self.config.profile, self.timestamp, PageContext::Date)
                })
                .collect();
            let date_key = group.date.to_string();
            let meta = PageMeta {
                title: format!("Posts from {}", date_key),
                description: self.config.profile.bio.clone(),
                og_title: format!("Posts from {} - {}", date_key, self.config.profile.name),
                og_type: "website",
                og_url: self.page_url(&format!("date/{}.html", date_key)),
            };
            let value = self.page_value(
                meta,
                group.posts.len(),
                content.join("\n"),
                &PaginationState::date_page(&dates, i),
            );
            self.write_page(&dir.join(format!("{}.html", date_key)), value, &mut stats);
        }
        Ok(stats)
    }

    /// Writes one `post/<id>.html` detail page per post, skipping pages the
    /// freshness check proves unchanged (old post, source not newer than
    /// the existing output).
    pub fn write_post_pages(&self, posts: &[Post]) -> Result<WriteStats> {
        let mut stats = WriteStats::default();
        let dates = self.index.dates();
        let dir = self.config.output_dir.join("post");
        std::fs::create_dir_all(&dir)?;

        for post in posts {
            let output_path = dir.join(format!("{}.html", post.id));
            if !cache::should_render_path(post.resolved, &post.source_path, &output_path, self.now)
            {
                stats.skipped += 1;
                continue;
            }

            let content =
                render::render_post(post, &self.config.profile, self.timestamp, PageContext::Detail);
            let summary = markdown::strip_markup(markdown::truncate_chars(&post.body, 160));
            let meta = PageMeta {
                title: format!("Post - {}", post.resolved.format("%Y-%m-%d %H:%M:%S")),
                description: summary,
                og_title: self.config.profile.name.clone(),
                og_type: "article",
                og_url: self.page_url(&format!("post/{}.html", post.id)),
            };
            let value =
                self.page_value(meta, 1, content, &PaginationState::detail(&dates));
            self.write_page(&output_path, value, &mut stats);
        }
        Ok(stats)
    }

    /// Joins a page path onto the site's base URL.
    fn page_url(&self, rel: &str) -> String {
        let base = self.config.profile.base_url.as_str().trim_end_matches('/');
        match rel.is_empty() {
            true => base.to_owned(),
            false => format!("{}/{}", base, rel),
        }
    }

    /// Assembles the named-variable object shared by every page.
    fn page_value(
        &self,
        meta: PageMeta,
        post_count: usize,
        posts_content: String,
        pagination: &PaginationState,
    ) -> Value {
        let profile = &self.config.profile;
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), Value::from(meta.title));
        m.insert("description".to_owned(), Value::from(meta.description));
        m.insert("og_title".to_owned(), Value::from(meta.og_title));
        m.insert("og_type".to_owned(), Value::from(meta.og_type));
        m.insert("og_url".to_owned(), Value::from(meta.og_url));
        m.insert(
            "og_image".to_owned(),
            Value::from(self.page_url("static/avatar.png")),
        );
        m.insert("profile_name".to_owned(), Value::from(profile.name.clone()));
        m.insert(
            "profile_handle".to_owned(),
            Value::from(profile.handle.clone()),
        );
        m.insert("profile_bio".to_owned(), Value::from(profile.bio.clone()));
        m.insert("base_url".to_owned(), Value::from(self.page_url("")));
        m.insert("post_count".to_owned(), Value::from(post_count as u64));
        m.insert("all_tags".to_owned(), value::tags_value(self.index));
        m.insert("archive".to_owned(), value::archive_value(self.index));
        m.insert(
            "archive_days_json".to_owned(),
            Value::from(self.index.days_json()),
        );
        m.insert(
            "themes".to_owned(),
            Value::Array(self.themes.iter().map(Value::from).collect()),
        );
        m.insert("posts_content".to_owned(), Value::from(posts_content));
        m.insert("pagination".to_owned(), Value::from(pagination));
        m.insert(
            "last_updated".to_owned(),
            Value::from(self.now.format("%Y-%m-%d %H:%M:%S").to_string()),
        );
        // The process scheduler that would know the real next publish time
        // is outside the renderer; templates still get the variable.
        m.insert("next_update".to_owned(), Value::from("Soon"));
        m.insert("timestamp".to_owned(), Value::from(self.timestamp));
        Value::Object(m)
    }

    /// Templates one page and writes it. A failure is logged and counted
    /// but never aborts the run; the other pages still get written.
    fn write_page(&self, path: &Path, value: Value, stats: &mut WriteStats) {
        match self.execute(path, value) {
            Ok(()) => stats.generated += 1,
            Err(e) => {
                eprintln!("  failed to render `{}`: {}", path.display(), e);
                stats.failed += 1;
            }
        }
    }

    fn execute(&self, path: &Path, value: Value) -> Result<()> {
        let context = gtmpl::Context::from(value).map_err(Error::Template)?;
        let mut file = File::create(path).map_err(|e| Error::Create {
            path: path.to_owned(),
            err: e,
        })?;
        self.template.execute(&mut file, &context)?;
        Ok(())
    }
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// An error creating an output file.
    Create { path: PathBuf, err: io::Error },

    /// An error writing the output files.
    Io(io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Create { path, err } => {
                write!(f, "creating `{}`: {}", path.display(), err)
            }
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::Create { path: _, err } => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`].
    /// This allows us to use the `?` operator for fallible template
    /// operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}
