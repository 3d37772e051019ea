//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: rendering each post
//! ([`crate::post`]), rendering the listing pages ([`crate::collection`]),
//! removing stale pages ([`crate::reconcile`]), and generating the feeds
//! ([`crate::feed`]).

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::collection::Collection;
use crate::config::Config;
use crate::feed::{self, write_feeds};
use crate::post::{self, source_files, Post, Transformer};
use crate::reconcile::{self, expected_files, reconcile};
use crate::template::{self, Template};

/// The file written into an empty posts directory.
pub const SAMPLE_POST_FILE: &str = "welcome.md";

/// What a call to [`build_site`] did.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The site was built.
    Built(Summary),

    /// The posts directory held no documents, so a sample post was written
    /// at the given path and nothing was built.
    SamplePostCreated(PathBuf),
}

/// Counts reported after a successful build.
#[derive(Debug, PartialEq, Eq)]
pub struct Summary {
    pub posts: usize,
    pub active: usize,
    pub archived: usize,

    /// Stale pages removed from the output directory.
    pub deleted: Vec<String>,
    pub output_directory: PathBuf,
}

/// Builds the site described by `config`. `now` is stamped on the feeds as
/// their build time.
///
/// Missing posts and output directories are created. If there are no source
/// documents, a sample post is written and the build stops there.
pub fn build_site(config: &Config, now: DateTime<Utc>) -> Result<Outcome> {
    create_dir(&config.posts_directory)?;
    create_dir(&config.output_directory)?;

    let sources = source_files(&config.posts_directory)?;
    if sources.is_empty() {
        let path = config.posts_directory.join(SAMPLE_POST_FILE);
        fs::write(&path, sample_post(now)).map_err(|err| Error::Write {
            path: path.clone(),
            err,
        })?;
        log::info!("no markdown files found, created a sample post: {}", path.display());
        return Ok(Outcome::SamplePostCreated(path));
    }

    let template = Template::load(&config.template_path)?;

    let transformer = Transformer::new(config, &template);
    let posts = sources
        .iter()
        .map(|source| transformer.transform(source))
        .collect::<post::Result<Vec<Post>>>()?;

    let collection = Collection::new(&posts);
    for page in collection.pages(config, &template) {
        page.write(&config.output_directory)
            .map_err(|err| Error::Write {
                path: config.output_directory.join(&page.file_name),
                err,
            })?;
    }

    write_feeds(config, &collection.active, now)?;

    let deleted = reconcile(&config.output_directory, &expected_files(&collection))?;
    if !deleted.is_empty() {
        log::info!("cleaned up {} old file(s)", deleted.len());
    }

    Ok(Outcome::Built(Summary {
        posts: posts.len(),
        active: collection.active.len(),
        archived: collection.archived.len(),
        deleted,
        output_directory: config.output_directory.clone(),
    }))
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|err| Error::CreateDirectory {
        path: dir.to_owned(),
        err,
    })
}

fn sample_post(now: DateTime<Utc>) -> String {
    format!(
        r#"---
title: Welcome to My Blog
date: {}
tags: [meta]
math: true
---

## This is a simple blog

Every post is a markdown file in the posts directory, with a short block of
metadata at the top.

### What you get

- A table of contents built from your headings
- Tag pages and an archive
- RSS and Atom feeds
- **Math** when a post asks for it: $E = mc^2$

### Code blocks work too

```rust
fn main() {{
    println!("Hello, world!");
}}
```

### And quotes

> Edit or delete this post, then run the build again.
"#,
        now.format("%Y-%m-%d")
    )
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can come from creating
/// directories, rendering posts, loading the template, writing pages,
/// cleaning the output directory, and writing the feeds.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the posts or output directory can't be created.
    #[error("creating directory `{}`: {err}", .path.display())]
    CreateDirectory { path: PathBuf, err: std::io::Error },

    /// Returned for errors reading, parsing, or rendering a post.
    #[error(transparent)]
    Post(#[from] post::Error),

    /// Returned when the template file can't be read.
    #[error(transparent)]
    Template(#[from] template::Error),

    /// Returned when a page or the sample post can't be written.
    #[error("writing `{}`: {err}", .path.display())]
    Write { path: PathBuf, err: std::io::Error },

    /// Returned for errors cleaning stale pages from the output directory.
    #[error(transparent)]
    Reconcile(#[from] reconcile::Error),

    /// Returned for errors writing the feeds.
    #[error(transparent)]
    Feed(#[from] feed::Error),
}
