//! Loads the site [`Config`] from a `plume.yaml` project file. Every key is
//! optional; missing keys take the defaults below. The config is built once at
//! startup and passed by reference to every stage of the build.

use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "plume.yaml";

#[derive(Deserialize, Default)]
#[serde(default)]
struct Project {
    site: SiteSection,
    homepage: Homepage,
    navigation: Navigation,
    labels: Labels,
    paths: Paths,
}

#[derive(Deserialize)]
#[serde(default)]
struct SiteSection {
    title: String,
    subtitle: String,
    description: String,
    page_title: String,
    base_url: String,
    author: Option<String>,
    language: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        SiteSection {
            title: "Plume Blog".to_owned(),
            subtitle: "A collection of thoughts, written with style.".to_owned(),
            description: "Personal blog built with Plume, a lightweight static site generator"
                .to_owned(),
            page_title: "Plume Blog".to_owned(),
            base_url: "https://example.com".to_owned(),
            author: None,
            language: "en-us".to_owned(),
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct Paths {
    posts: PathBuf,
    template: PathBuf,
    output: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            posts: PathBuf::from("posts"),
            template: PathBuf::from("template.html"),
            output: PathBuf::from("docs"),
        }
    }
}

/// Site-wide identity, used on the home page and in the feeds.
#[derive(Clone, Debug)]
pub struct Site {
    pub title: String,
    pub subtitle: String,
    pub description: String,

    /// The suffix for the `<title>` of the home and archive pages.
    pub page_title: String,

    /// The public URL of the output directory. Always ends in `/`, so post
    /// URLs are `base_url.join(file_name)`.
    pub base_url: Url,

    /// The feed author. Defaults to the site title.
    pub author: String,
    pub language: String,
}

/// Home page options.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Homepage {
    pub heading: String,
    pub show_archive_link: bool,
    pub show_tags_link: bool,
}

impl Default for Homepage {
    fn default() -> Self {
        Homepage {
            heading: "Recent Posts".to_owned(),
            show_archive_link: true,
            show_tags_link: true,
        }
    }
}

/// Link texts.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Navigation {
    pub back_to_home: String,
    pub tags_page: String,
    pub archive_page: String,
}

impl Default for Navigation {
    fn default() -> Self {
        Navigation {
            back_to_home: "← Back to Home".to_owned(),
            tags_page: "Browse all tags".to_owned(),
            archive_page: "View archive".to_owned(),
        }
    }
}

/// Static label strings. `archived_count` and `tagged_with` are patterns,
/// see [`Labels::archived_count`] and [`Labels::tagged_with`].
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub published: String,
    pub last_modified: String,
    pub archived_posts: String,
    pub archived_count: String,
    pub tagged_with: String,
    pub tags_subtitle: String,
    pub all_tags: String,
    pub contents: String,
}

impl Default for Labels {
    fn default() -> Self {
        Labels {
            published: "Published".to_owned(),
            last_modified: "Last Modified".to_owned(),
            archived_posts: "Archived Posts".to_owned(),
            archived_count: "{count} archived post(s)".to_owned(),
            tagged_with: "{count} post(s) tagged with \"{tag}\"".to_owned(),
            tags_subtitle: "Browse all tags and discover posts by topic.".to_owned(),
            all_tags: "All Tags".to_owned(),
            contents: "Contents".to_owned(),
        }
    }
}

impl Labels {
    /// Fills `{count}` in the `archived_count` pattern.
    pub fn archived_count(&self, count: usize) -> String {
        self.archived_count.replace("{count}", &count.to_string())
    }

    /// Fills `{count}` and `{tag}` in the `tagged_with` pattern.
    pub fn tagged_with(&self, tag: &str, count: usize) -> String {
        self.tagged_with
            .replace("{count}", &count.to_string())
            .replace("{tag}", tag)
    }
}

/// The immutable configuration for one build.
#[derive(Clone, Debug)]
pub struct Config {
    pub site: Site,
    pub homepage: Homepage,
    pub navigation: Navigation,
    pub labels: Labels,

    /// The directory holding the `.md` source documents.
    pub posts_directory: PathBuf,

    /// The page template file.
    pub template_path: PathBuf,

    /// The directory the pages and feeds are written to.
    pub output_directory: PathBuf,
}

impl Config {
    /// Searches `dir` and its ancestors for a [`PROJECT_FILE`] and loads the
    /// first one found. Without one, the defaults are used with `dir` as the
    /// project root. `output_directory` overrides the configured output path.
    pub fn from_directory(dir: &Path, output_directory: Option<&Path>) -> Result<Config> {
        for ancestor in dir.ancestors() {
            let path = ancestor.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path, output_directory);
            }
        }

        log::warn!(
            "no `{}` found in `{}` or its parents, using defaults",
            PROJECT_FILE,
            dir.display()
        );
        Config::from_project(Project::default(), dir, output_directory)
    }

    /// Loads the config from a project file. Relative paths in the file are
    /// resolved against the file's directory.
    pub fn from_project_file(path: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = serde_yaml::from_reader(file).map_err(|err| Error::Yaml {
            path: path.to_owned(),
            err,
        })?;
        let root = path.parent().unwrap_or_else(|| Path::new("."));
        log::debug!("loaded config from `{}`", path.display());
        Config::from_project(project, root, output_directory)
    }

    /// The default config for a project rooted at `root`.
    pub fn with_root(root: &Path) -> Result<Config> {
        Config::from_project(Project::default(), root, None)
    }

    fn from_project(
        project: Project,
        root: &Path,
        output_directory: Option<&Path>,
    ) -> Result<Config> {
        let site = project.site;
        let base_url = parse_base_url(&site.base_url)?;
        Ok(Config {
            site: Site {
                author: site.author.unwrap_or_else(|| site.title.clone()),
                title: site.title,
                subtitle: site.subtitle,
                description: site.description,
                page_title: site.page_title,
                base_url,
                language: site.language,
            },
            homepage: project.homepage,
            navigation: project.navigation,
            labels: project.labels,
            posts_directory: root.join(project.paths.posts),
            template_path: root.join(project.paths.template),
            output_directory: match output_directory {
                Some(dir) => dir.to_owned(),
                None => root.join(project.paths.output),
            },
        })
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    let mut normalized = base_url.trim().to_owned();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Url::parse(&normalized).map_err(|err| Error::BaseUrl {
        url: base_url.to_owned(),
        err,
    })
}

/// Represents a problem loading the [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the project file can't be opened.
    #[error("opening project file `{}`: {err}", .path.display())]
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the project file isn't valid YAML or has the wrong shape.
    #[error("parsing project file `{}`: {err}", .path.display())]
    Yaml {
        path: PathBuf,
        err: serde_yaml::Error,
    },

    /// Returned when `site.base_url` isn't an absolute URL.
    #[error("invalid `site.base_url` `{url}`: {err}")]
    BaseUrl { url: String, err: url::ParseError },
}

pub type Result<T> = std::result::Result<T, Error>;
