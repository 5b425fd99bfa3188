use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use url::Url;

/// The on-disk shape of `chirp.yaml`. Paths are relative to the directory
/// containing the file; [`Config`] holds the resolved versions.
#[derive(Deserialize)]
struct Project {
    #[serde(default = "Project::default_posts_dir")]
    posts_dir: PathBuf,

    #[serde(default = "Project::default_templates_dir")]
    templates_dir: PathBuf,

    #[serde(default = "Project::default_static_dir")]
    static_dir: PathBuf,

    #[serde(default = "Project::default_output_dir")]
    output_dir: PathBuf,

    profile: Profile,
}

impl Project {
    fn default_posts_dir() -> PathBuf {
        PathBuf::from("posts")
    }

    fn default_templates_dir() -> PathBuf {
        PathBuf::from("templates")
    }

    fn default_static_dir() -> PathBuf {
        PathBuf::from("static")
    }

    fn default_output_dir() -> PathBuf {
        PathBuf::from("dist")
    }
}

/// The published identity for the site. Rendered into every page header as
/// well as the feed channel and the search index.
#[derive(Clone, Deserialize)]
pub struct Profile {
    pub name: String,
    pub handle: String,
    pub bio: String,

    /// The absolute root of the published site, used wherever a page needs
    /// a full URL (Open Graph tags, feed links, search index entries).
    pub base_url: Url,
}

/// Immutable run configuration, built once at startup and passed by
/// reference through the whole pipeline.
pub struct Config {
    pub posts_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub static_dir: PathBuf,
    pub output_dir: PathBuf,
    pub profile: Profile,
}

impl Config {
    /// Searches `dir` and its ancestors for a `chirp.yaml` project file and
    /// loads it. `output_override` replaces the configured output directory
    /// when given (it is taken as-is, not resolved against the project
    /// root).
    pub fn from_directory(dir: &Path, output_override: Option<&Path>) -> Result<Config> {
        let path = dir.join("chirp.yaml");
        if path.exists() {
            Config::from_project_file(&path, output_override)
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_override),
                None => Err(anyhow!(
                    "could not find `chirp.yaml` in `{}` or any parent directory",
                    dir.display()
                )),
            }
        }
    }

    /// Loads configuration from a specific project file. Relative paths in
    /// the file are resolved against the file's directory.
    pub fn from_project_file(path: &Path, output_override: Option<&Path>) -> Result<Config> {
        let file = File::open(path)
            .with_context(|| format!("opening project file `{}`", path.display()))?;
        let project: Project = serde_yaml::from_reader(file)
            .with_context(|| format!("parsing project file `{}`", path.display()))?;
        let root = path
            .parent()
            .ok_or_else(|| anyhow!("project file `{}` has no parent directory", path.display()))?;
        Ok(Config {
            posts_dir: root.join(&project.posts_dir),
            templates_dir: root.join(&project.templates_dir),
            static_dir: root.join(&project.static_dir),
            output_dir: match output_override {
                Some(output) => output.to_owned(),
                None => root.join(&project.output_dir),
            },
            profile: project.profile,
        })
    }
}
