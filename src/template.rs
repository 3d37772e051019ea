//! Defines the page [`Template`]. A template is plain HTML with `{{NAME}}`
//! placeholders. It is parsed once into literal segments and [`Slot`]s and
//! then filled in a single pass per page, so one slot's value can never be
//! mistaken for another slot's placeholder.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const DEFAULT_TEMPLATE: &str = include_str!("../theme/template.html");

/// A named placeholder in a [`Template`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// `{{TITLE}}`: the page title.
    Title,

    /// `{{MATHJAX}}`: the math renderer bootstrap, for posts that ask for it.
    Math,

    /// `{{DATE}}`: the publish (and modified) date line of a post.
    Date,

    /// `{{TAGS}}`: the tag links of a post.
    Tags,

    /// `{{NAV}}`: the link back to the home page.
    Nav,

    /// `{{TOC}}`: the table of contents.
    Toc,

    /// `{{CONTENT}}`: the page body.
    Content,
}

impl Slot {
    fn from_name(name: &str) -> Option<Slot> {
        Some(match name {
            "TITLE" => Slot::Title,
            "MATHJAX" => Slot::Math,
            "DATE" => Slot::Date,
            "TAGS" => Slot::Tags,
            "NAV" => Slot::Nav,
            "TOC" => Slot::Toc,
            "CONTENT" => Slot::Content,
            _ => return None,
        })
    }
}

/// The values substituted into a [`Template`]. Slots that don't apply to a
/// page are left empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct Slots<'a> {
    pub title: &'a str,
    pub math: &'a str,
    pub date: &'a str,
    pub tags: &'a str,
    pub nav: &'a str,
    pub toc: &'a str,
    pub content: &'a str,
}

impl<'a> Slots<'a> {
    fn get(&self, slot: Slot) -> &'a str {
        match slot {
            Slot::Title => self.title,
            Slot::Math => self.math,
            Slot::Date => self.date,
            Slot::Tags => self.tags,
            Slot::Nav => self.nav,
            Slot::Toc => self.toc,
            Slot::Content => self.content,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(Slot),
}

/// A parsed page template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parses `source` into a template. Every occurrence of a known
    /// placeholder becomes a slot. Unknown `{{...}}` text is kept literally.
    pub fn parse(source: &str) -> Template {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            let after = &rest[start + 2..];
            let slot = after
                .find("}}")
                .and_then(|end| Slot::from_name(&after[..end]).map(|slot| (slot, end)));
            match slot {
                Some((slot, end)) => {
                    literal.push_str(&rest[..start]);
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot(slot));
                    rest = &after[end + 2..];
                }
                None => {
                    literal.push_str(&rest[..start + 2]);
                    rest = after;
                }
            }
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Template { segments }
    }

    /// The built-in template, used when the configured one doesn't exist.
    pub fn builtin() -> Template {
        Template::parse(DEFAULT_TEMPLATE)
    }

    /// Loads and parses the template at `path`, falling back to
    /// [`Template::builtin`] if there is no file there.
    pub fn load(path: &Path) -> Result<Template> {
        match fs::read_to_string(path) {
            Ok(source) => Ok(Template::parse(&source)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::warn!(
                    "template `{}` not found, using the built-in template",
                    path.display()
                );
                Ok(Template::builtin())
            }
            Err(err) => Err(Error {
                path: path.to_owned(),
                err,
            }),
        }
    }

    /// Renders the template, substituting each slot with its value.
    pub fn render(&self, slots: &Slots) -> String {
        let len = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.len(),
                Segment::Slot(slot) => slots.get(*slot).len(),
            })
            .sum();

        let mut out = String::with_capacity(len);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(slot) => out.push_str(slots.get(*slot)),
            }
        }
        out
    }
}

/// Returned when a template file exists but can't be read.
#[derive(Debug, thiserror::Error)]
#[error("reading template `{}`: {err}", .path.display())]
pub struct Error {
    pub path: PathBuf,
    #[source]
    pub err: io::Error,
}

pub type Result<T> = std::result::Result<T, Error>;
