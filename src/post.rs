//! Defines the [`Document`], [`Post`], [`Transformer`], and [`Error`] types.
//! A [`Document`] is a parsed source file. The [`Transformer`] renders one
//! document into its HTML page and returns the lightweight [`Post`] record
//! that the index pages and feeds are built from.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use walkdir::WalkDir;

use crate::anchor::annotate_headings;
use crate::config::Config;
use crate::markdown;
use crate::page::RenderedPage;
use crate::slug::tag_file_name;
use crate::template::{Slots, Template};
use crate::toc::{index_headings, render_toc};

/// The extension of source documents.
pub const MARKDOWN_EXTENSION: &str = ".md";

/// The extension of rendered pages.
pub const HTML_EXTENSION: &str = ".html";

/// Injected into the `<head>` of posts with `math: true`.
pub const MATHJAX_BOOTSTRAP: &str = r#"<script>
    MathJax = {
        tex: {
            inlineMath: [['$', '$'], ['\\(', '\\)']],
            displayMath: [['$$', '$$'], ['\\[', '\\]']],
            processEscapes: true,
            processEnvironments: true
        },
        options: {
            skipHtmlTags: ['script', 'noscript', 'style', 'textarea', 'pre']
        }
    };
    </script>
    <script src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js" async></script>"#;

/// A source file, split into its frontmatter fields and markdown body.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub title: String,
    pub date: DateTime<Utc>,
    pub modified: Option<DateTime<Utc>>,

    /// The tags in the order they were written, without duplicates.
    pub tags: Vec<String>,
    pub archived: bool,

    /// Whether the post uses math notation.
    pub math: bool,

    /// The raw markdown after the closing frontmatter fence.
    pub body: String,
}

#[derive(Deserialize)]
struct Frontmatter {
    title: Option<String>,
    date: Option<String>,
    modified: Option<String>,

    #[serde(default)]
    tags: Vec<String>,

    #[serde(default)]
    archived: bool,

    #[serde(default)]
    math: bool,
}

impl Document {
    /// Reads and parses the source file at `path`. Errors are annotated with
    /// the path.
    pub fn read(path: &Path) -> Result<Document> {
        fs::read_to_string(path)
            .map_err(Error::from)
            .and_then(|input| Document::parse(&input))
            .map_err(|e| Error::Annotated(format!("parsing post `{}`", path.display()), Box::new(e)))
    }

    /// Parses a source document. The input must be structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`) on its own line
    /// 2. YAML frontmatter with fields `title`, `date`, and optionally
    ///    `modified`, `tags`, `archived`, and `math`
    /// 3. Terminal frontmatter fence (`---`) on its own line
    /// 4. Markdown body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// title: Hello, world!
    /// date: 2021-04-16
    /// tags: [greet]
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    pub fn parse(input: &str) -> Result<Document> {
        let (yaml, body) = split_frontmatter(input)?;
        let frontmatter: Frontmatter = serde_yaml::from_str(yaml)?;

        let title = frontmatter.title.ok_or(Error::MissingField("title"))?;
        let date = frontmatter.date.ok_or(Error::MissingField("date"))?;
        let date = parse_date(&date).ok_or(Error::InvalidDate {
            field: "date",
            value: date,
        })?;
        let modified = match frontmatter.modified {
            None => None,
            Some(value) => Some(parse_date(&value).ok_or(Error::InvalidDate {
                field: "modified",
                value,
            })?),
        };

        let mut seen = HashSet::new();
        let mut tags = frontmatter.tags;
        tags.retain(|tag| seen.insert(tag.clone()));

        Ok(Document {
            title,
            date,
            modified,
            tags,
            archived: frontmatter.archived,
            math: frontmatter.math,
            body: body.to_owned(),
        })
    }

    /// Renders the markdown body to HTML.
    pub fn body_html(&self) -> String {
        markdown::to_html(&self.body, self.math)
    }
}

/// Splits the input into its YAML frontmatter and its body. Both fences must
/// be lines consisting of `---`.
fn split_frontmatter(input: &str) -> Result<(&str, &str)> {
    const FENCE: &str = "---";
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut lines = input.split_inclusive('\n');

    let yaml_start = match lines.next() {
        Some(line) if line.trim_end() == FENCE => line.len(),
        _ => return Err(Error::FrontmatterMissingStartFence),
    };

    let mut yaml_stop = yaml_start;
    for line in lines {
        if line.trim_end() == FENCE {
            let body_start = yaml_stop + line.len();
            return Ok((&input[yaml_start..yaml_stop], &input[body_start..]));
        }
        yaml_stop += line.len();
    }
    Err(Error::FrontmatterMissingEndFence)
}

/// Parses a `YYYY-MM-DD` date (midnight UTC), a `YYYY-MM-DD HH:MM:SS` or
/// `YYYY-MM-DDTHH:MM:SS` UTC date-time, or an RFC 3339 date-time.
fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(date_time) = NaiveDateTime::parse_from_str(value, format) {
            return Some(date_time.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|date_time| date_time.with_timezone(&Utc))
}

/// Formats a date as shown on pages: `YYYY-MM-DD` in UTC.
pub fn display_date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Renders one link per tag, pointing at the tag's index page.
pub fn tag_links(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!(r#"<a href="{}" class="tag">{}</a>"#, tag_file_name(tag), tag))
        .collect()
}

/// The record of a rendered post, kept for building the index pages and the
/// feeds.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    pub title: String,
    pub date: DateTime<Utc>,

    /// The name of the post's page in the output directory, e.g.
    /// `hello.html` for `hello.md`.
    pub file_name: String,

    /// The source file, re-read when generating feeds.
    pub source_path: PathBuf,
    pub tags: Vec<String>,
    pub archived: bool,
}

/// Renders source documents into post pages.
pub struct Transformer<'a> {
    config: &'a Config,
    template: &'a Template,
}

impl<'a> Transformer<'a> {
    pub fn new(config: &'a Config, template: &'a Template) -> Transformer<'a> {
        Transformer { config, template }
    }

    /// Renders the source file at `source_path` into its page, writes it to
    /// the output directory, and returns the [`Post`].
    pub fn transform(&self, source_path: &Path) -> Result<Post> {
        let document = Document::read(source_path)?;
        let file_name = output_file_name(source_path)?;
        let page = self.render(&document, &file_name);
        page.write(&self.config.output_directory)
            .map_err(|err| Error::Write {
                path: self.config.output_directory.join(&file_name),
                err,
            })?;

        Ok(Post {
            title: document.title,
            date: document.date,
            file_name,
            source_path: source_path.to_owned(),
            tags: document.tags,
            archived: document.archived,
        })
    }

    /// Fills the template for a single document.
    pub fn render(&self, document: &Document, file_name: &str) -> RenderedPage {
        let labels = &self.config.labels;

        let content = annotate_headings(&document.body_html());
        let toc = render_toc(&index_headings(&document.body), &labels.contents);

        let published = display_date(&document.date);
        let modified = match &document.modified {
            Some(modified) if display_date(modified) != published => {
                format!(" | {}: {}", labels.last_modified, display_date(modified))
            }
            _ => String::new(),
        };
        let date = format!(
            r#"<p class="post-date"><em>{}: {}{}</em></p>"#,
            labels.published, published, modified
        );

        let tags = match document.tags.is_empty() {
            true => String::new(),
            false => format!(r#"<div class="tags">{}</div>"#, tag_links(&document.tags)),
        };

        let nav = format!(
            r#"<div class="nav-home"><a href="index.html">{}</a></div>"#,
            self.config.navigation.back_to_home
        );

        RenderedPage {
            file_name: file_name.to_owned(),
            contents: self.template.render(&Slots {
                title: &document.title,
                math: if document.math { MATHJAX_BOOTSTRAP } else { "" },
                date: &date,
                tags: &tags,
                nav: &nav,
                toc: toc.as_deref().unwrap_or_default(),
                content: &content,
            }),
        }
    }
}

/// Derives the page name from a source path: `posts/hello.md` becomes
/// `hello.html`.
pub fn output_file_name(source_path: &Path) -> Result<String> {
    source_path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_suffix(MARKDOWN_EXTENSION))
        .map(|stem| format!("{}{}", stem, HTML_EXTENSION))
        .ok_or_else(|| Error::InvalidFileName(source_path.to_owned()))
}

/// Lists the source documents directly inside `source_directory`, sorted by
/// file name.
pub fn source_files(source_directory: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for result in WalkDir::new(source_directory)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = result?;
        let is_markdown = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(MARKDOWN_EXTENSION));
        if entry.file_type().is_file() && is_markdown {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

/// Represents the result of a [`Post`]-related operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error reading, parsing, or rendering a post.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    #[error("post must begin with `---`")]
    FrontmatterMissingStartFence,

    /// Returned when a post source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    #[error("missing closing `---`")]
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    #[error(transparent)]
    DeserializeYaml(#[from] serde_yaml::Error),

    /// Returned when a required frontmatter field is absent.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// Returned when a date field isn't in a supported format.
    #[error("invalid `{field}` value `{value}`, expected e.g. `2024-05-01`")]
    InvalidDate { field: &'static str, value: String },

    /// Returned when a source file name can't be mapped to a page name.
    #[error("invalid file name: {0:?}")]
    InvalidFileName(PathBuf),

    /// Returned when a post page can't be written.
    #[error("writing `{}`: {err}", .path.display())]
    Write { path: PathBuf, err: io::Error },

    /// Returned for other I/O errors.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Returned for WalkDir I/O errors.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// An error with an annotation.
    #[error("{0}: {1}")]
    Annotated(String, Box<Error>),
}
