//! Exports the [`build_site`] function which stitches together the
//! high-level steps of one run: scanning and parsing the corpus, compacting
//! duplicates, aggregating indices and themes, rendering the HTML pages,
//! and emitting the RSS feed and the search index. The static asset
//! directory is copied into the output root before any page is written.

use std::fmt;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use gtmpl::Template;

use crate::config::Config;
use crate::dedup;
use crate::feed::{self, Error as FeedError};
use crate::index::SiteIndex;
use crate::post::Post;
use crate::search::{self, Error as SearchError};
use crate::theme;
use crate::write::{Error as WriteError, Writer};

/// Builds the site from a [`Config`]. One parse failure skips only that
/// post and one template failure skips only that page; filesystem problems
/// with the output tree abort the run.
pub fn build_site(config: &Config) -> Result<()> {
    build_site_at(config, Local::now().naive_local())
}

/// [`build_site`] with an explicit clock reading. Everything time-dependent
/// in the output (the last-updated footer, cache-busting query strings,
/// feed build dates, freshness checks) derives from `now`, so two runs over
/// an unchanged corpus with the same `now` produce identical output.
pub fn build_site_at(config: &Config, now: NaiveDateTime) -> Result<()> {
    // Scan the corpus in descending filename order. This order is load
    // bearing: it pins which of two duplicate files survives compaction.
    let files = scan_posts(&config.posts_dir)?;
    println!("{} post file(s) found", files.len());

    let mut posts: Vec<Post> = Vec::with_capacity(files.len());
    let mut parse_failures = 0;
    for path in &files {
        match Post::from_file(path, &config.posts_dir) {
            Ok(post) => posts.push(post),
            Err(e) => {
                eprintln!("  skipping `{}`: {}", path.display(), e);
                parse_failures += 1;
            }
        }
    }

    if posts.is_empty() {
        println!("no posts found in `{}`", config.posts_dir.display());
        return Ok(());
    }

    // Compaction deletes duplicate source files and must complete before
    // any aggregation or rendering, so deleted posts never appear in
    // output.
    let compaction = dedup::compact(posts, dedup::Mode::Delete);
    let duplicates = compaction.duplicates.len();
    let mut posts = compaction.posts;
    posts.sort_by(|a, b| b.resolved.cmp(&a.resolved));

    let template = parse_template([config.templates_dir.join("index.html")].iter())?;

    // Prepare the output tree and copy static assets first so freshly
    // generated pages never reference assets that aren't there yet.
    fs::create_dir_all(&config.output_dir)?;
    let static_output = config.output_dir.join("static");
    rmdir(&static_output)?;
    copy_dir(&config.static_dir, &static_output)?;
    File::create(config.output_dir.join(".nojekyll"))?;

    let timestamp = now.and_utc().timestamp();

    let index = SiteIndex::build(&posts);
    let themes = theme::summarize(&posts);
    let writer = Writer {
        config,
        template: &template,
        index: &index,
        themes: &themes,
        now,
        timestamp,
    };

    let post_stats = writer.write_post_pages(&posts)?;
    let home_stats = writer.write_home()?;
    let date_stats = writer.write_date_pages()?;

    feed::write_feed(config, &posts, now)?;
    search::write_search_index(config, &posts, now)?;

    let generated = post_stats.generated + home_stats.generated + date_stats.generated;
    let failed = post_stats.failed + home_stats.failed + date_stats.failed;
    println!(
        "{} posts found, {} pages generated, {} skipped",
        posts.len(),
        generated,
        post_stats.skipped
    );
    if duplicates > 0 {
        println!("  {} duplicate file(s) deleted", duplicates);
    }
    if parse_failures > 0 {
        println!("  {} file(s) skipped with parse errors", parse_failures);
    }
    if failed > 0 {
        println!("  {} page(s) failed to render", failed);
    }
    Ok(())
}

/// Walks the corpus directory and returns every `.md` file, sorted in
/// descending path order.
fn scan_posts(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for result in walkdir::WalkDir::new(dir) {
        let entry = result?;
        if entry.file_type().is_file()
            && entry.path().extension().map(|e| e == "md").unwrap_or(false)
        {
            files.push(entry.path().to_owned());
        }
    }
    files.sort();
    files.reverse();
    Ok(files)
}

/// Recursively copies `src` into `dst`. A missing source directory is
/// announced and skipped; sites without static assets still build.
fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_dir() {
        println!("no static directory at `{}`, skipping copy", src.display());
        return Ok(());
    }
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &dst.join(entry.file_name()))?;
        } else {
            fs::copy(entry.path(), dst.join(entry.file_name()))?;
        }
    }
    Ok(())
}

// Loads the template file contents, concatenates them, and parses the
// result into a template.
fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        let template_file = template_file.as_ref();
        File::open(template_file)
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?
            .read_to_string(&mut contents)?;
        contents.push(' ');
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

fn rmdir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

/// The result of a site build.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors writing pages to disk as HTML files.
    Write(WriteError),

    /// Returned for errors writing the feed.
    Feed(FeedError),

    /// Returned for errors writing the search index.
    Search(SearchError),

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for errors walking the corpus directory.
    WalkDir(walkdir::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Write(err) => err.fmt(f),
            Error::Feed(err) => err.fmt(f),
            Error::Search(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "cleaning directory `{}`: {}", path.display(), err)
            }
            Error::OpenTemplateFile { path, err } => {
                write!(f, "opening template file `{}`: {}", path.display(), err)
            }
            Error::ParseTemplate(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Write(err) => Some(err),
            Error::Feed(err) => Some(err),
            Error::Search(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::WalkDir(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator while scanning the corpus.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<FeedError> for Error {
    /// Converts [`FeedError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: FeedError) -> Error {
        Error::Feed(err)
    }
}

impl From<SearchError> for Error {
    /// Converts [`SearchError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: SearchError) -> Error {
        Error::Search(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Profile;

    const TEMPLATE: &str = "<html><title>{{.title}}</title>\
        <meta property=\"og:title\" content=\"{{.og_title}}\">\
        <body data-updated=\"{{.last_updated}}\">{{.posts_content}}</body></html>";

    fn fixed_now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2026-03-01 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn write_file(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn fixture(root: &Path) -> Config {
        write_file(&root.join("templates/index.html"), TEMPLATE);
        write_file(&root.join("static/avatar.png"), "not really a png");
        write_file(
            &root.join("posts/2026-02-02-hello.md"),
            "---\ntime: 2026-02-02 10:00:00\ntags: Notes\n---\nhello world",
        );
        write_file(
            &root.join("posts/2026-02-01-b.md"),
            "---\ntime: 2026-02-01 09:00:00\n---\nsame content",
        );
        write_file(
            &root.join("posts/2026-02-01-a.md"),
            "---\ntime: 2026-02-01 08:00:00\n---\nsame content",
        );
        Config {
            posts_dir: root.join("posts"),
            templates_dir: root.join("templates"),
            static_dir: root.join("static"),
            output_dir: root.join("dist"),
            profile: Profile {
                name: "Example".to_owned(),
                handle: "example".to_owned(),
                bio: "bio".to_owned(),
                base_url: url::Url::parse("https://example.org").unwrap(),
            },
        }
    }

    #[test]
    fn test_build_site_output_tree() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = fixture(dir.path());
        build_site(&config)?;

        let out = &config.output_dir;
        assert!(out.join("index.html").exists());
        assert!(out.join("date/2026-02-02.html").exists());
        assert!(out.join("date/2026-02-01.html").exists());
        assert!(out.join("post/2026-02-02-hello.html").exists());
        assert!(out.join("post/2026-02-01-b.html").exists());
        assert!(out.join("feed.xml").exists());
        assert!(out.join("search-index.json").exists());
        assert!(out.join("static/avatar.png").exists());
        assert!(out.join(".nojekyll").exists());

        // The duplicate (scanned second in descending order) was deleted
        // from the corpus and never rendered.
        assert!(!config.posts_dir.join("2026-02-01-a.md").exists());
        assert!(config.posts_dir.join("2026-02-01-b.md").exists());
        assert!(!out.join("post/2026-02-01-a.html").exists());

        let home = fs::read_to_string(out.join("index.html"))?;
        assert!(home.contains("<title>Home</title>"));
        assert!(home.contains("hello world"));
        Ok(())
    }

    #[test]
    fn test_second_run_deletes_nothing_more() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = fixture(dir.path());
        build_site(&config)?;
        let survivors: Vec<_> = fs::read_dir(&config.posts_dir)?.collect();
        build_site(&config)?;
        assert_eq!(
            fs::read_dir(&config.posts_dir)?.count(),
            survivors.len()
        );
        Ok(())
    }

    #[test]
    fn test_unchanged_corpus_rebuild_is_byte_identical() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = fixture(dir.path());
        build_site_at(&config, fixed_now())?;

        let out = &config.output_dir;
        let pages = [
            out.join("index.html"),
            out.join("date/2026-02-01.html"),
            out.join("post/2026-02-02-hello.html"),
            out.join("feed.xml"),
            out.join("search-index.json"),
        ];
        let first: Vec<Vec<u8>> = pages.iter().map(|p| fs::read(p).unwrap()).collect();

        build_site_at(&config, fixed_now())?;
        for (path, contents) in pages.iter().zip(&first) {
            assert_eq!(
                &fs::read(path).unwrap(),
                contents,
                "`{}` changed between runs",
                path.display()
            );
        }
        Ok(())
    }

    #[test]
    fn test_og_title_varies_per_page_kind() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = fixture(dir.path());
        build_site_at(&config, fixed_now())?;

        let home = fs::read_to_string(config.output_dir.join("index.html"))?;
        assert!(home.contains(r#"content="Example""#));
        let date = fs::read_to_string(config.output_dir.join("date/2026-02-01.html"))?;
        assert!(date.contains(r#"content="Posts from 2026-02-01 - Example""#));
        let post = fs::read_to_string(config.output_dir.join("post/2026-02-02-hello.html"))?;
        assert!(post.contains(r#"content="Example""#));
        Ok(())
    }

    #[test]
    fn test_malformed_file_skipped_not_fatal() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = fixture(dir.path());
        // Invalid UTF-8 makes the read fail; the build must continue.
        fs::write(config.posts_dir.join("2026-02-03-bad.md"), [0xff, 0xfe, 0xfd]).unwrap();
        build_site(&config)?;
        assert!(config.output_dir.join("index.html").exists());
        assert!(!config.output_dir.join("post/2026-02-03-bad.html").exists());
        Ok(())
    }

    #[test]
    fn test_feed_lists_newest_first_with_rendered_html() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = fixture(dir.path());
        build_site(&config)?;
        let feed = fs::read_to_string(config.output_dir.join("feed.xml"))?;
        assert!(feed.starts_with("<?xml"));
        assert!(feed.contains("https://example.org/post/2026-02-02-hello.html"));
        let hello = feed.find("2026-02-02-hello").unwrap();
        let older = feed.find("2026-02-01-b").unwrap();
        assert!(hello < older);
        Ok(())
    }
}
