//! Support for creating the RSS 2.0 and Atom 1.0 feeds from a list of posts.
//! Each post's source is read again and re-rendered, since [`Post`] records
//! don't keep the body around.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use atom_syndication::{Content, Entry, Feed, Link, Person, Text};
use chrono::{DateTime, Utc};
use regex::Regex;
use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use url::Url;

use crate::config::Config;
use crate::post::{self, Document, Post};

pub const RSS_FEED: &str = "feed.xml";
pub const ATOM_FEED: &str = "atom.xml";

/// The length, in characters, of the plain-text RSS item descriptions.
pub const RSS_EXCERPT_LENGTH: usize = 300;

/// The length, in characters, of the plain-text Atom entry summaries.
pub const ATOM_SUMMARY_LENGTH: usize = 200;

const RSS_DOCS: &str = "https://www.rssboard.org/rss-specification";
const GENERATOR: &str = "Plume RSS Generator";

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// A post along with its freshly rendered body.
pub struct FeedEntry<'a> {
    pub post: &'a Post,
    pub html: String,
}

/// Re-reads and renders the source of each post, keeping the order.
pub fn load_entries<'a>(posts: &[&'a Post]) -> Result<Vec<FeedEntry<'a>>> {
    posts
        .iter()
        .map(|&post| {
            let document = Document::read(&post.source_path)?;
            Ok(FeedEntry {
                post,
                html: document.body_html(),
            })
        })
        .collect()
}

/// Writes `feed.xml` and `atom.xml` for `posts` into the output directory.
/// `now` is the build time stamped on both feeds.
pub fn write_feeds(config: &Config, posts: &[&Post], now: DateTime<Utc>) -> Result<()> {
    let entries = load_entries(posts)?;

    let path = config.output_directory.join(RSS_FEED);
    rss_channel(config, &entries, now)?.write_to(create(&path)?)?;
    log::info!("RSS feed generated: {}", RSS_FEED);

    let path = config.output_directory.join(ATOM_FEED);
    atom_feed(config, &entries, now)?.write_to(create(&path)?)?;
    log::info!("Atom feed generated: {}", ATOM_FEED);
    Ok(())
}

fn create(path: &Path) -> Result<File> {
    File::create(path).map_err(|err| Error::Create {
        path: path.to_owned(),
        err,
    })
}

/// Builds the RSS 2.0 channel. Item descriptions are plain-text excerpts of
/// [`RSS_EXCERPT_LENGTH`] characters.
pub fn rss_channel(config: &Config, entries: &[FeedEntry], now: DateTime<Utc>) -> Result<Channel> {
    let items = entries
        .iter()
        .map(|entry| {
            let url = post_url(config, entry.post)?.to_string();
            Ok(ItemBuilder::default()
                .title(entry.post.title.clone())
                .link(url.clone())
                .guid(GuidBuilder::default().permalink(true).value(url).build())
                .pub_date(rfc1123(&entry.post.date))
                .description(excerpt(&entry.html, RSS_EXCERPT_LENGTH))
                .build())
        })
        .collect::<Result<Vec<Item>>>()?;

    Ok(ChannelBuilder::default()
        .title(config.site.title.clone())
        .link(config.site.base_url.to_string())
        .description(config.site.description.clone())
        .language(config.site.language.clone())
        .last_build_date(rfc1123(&now))
        .docs(RSS_DOCS.to_owned())
        .generator(GENERATOR.to_owned())
        .items(items)
        .build())
}

/// Builds the Atom 1.0 feed. Entry summaries are plain-text excerpts of
/// [`ATOM_SUMMARY_LENGTH`] characters; entry content is the full rendered
/// HTML.
pub fn atom_feed(config: &Config, entries: &[FeedEntry], now: DateTime<Utc>) -> Result<Feed> {
    let base_url = &config.site.base_url;

    let mut author = Person::default();
    author.set_name(config.site.author.clone());

    let mut feed = Feed::default();
    feed.set_title(Text::plain(config.site.title.clone()));
    feed.set_id(base_url.to_string());
    feed.set_updated(now.fixed_offset());
    feed.set_links(vec![
        link(base_url.to_string(), "alternate"),
        link(base_url.join(ATOM_FEED)?.to_string(), "self"),
    ]);
    feed.set_authors(vec![author]);
    feed.set_subtitle(Some(Text::plain(config.site.description.clone())));

    let mut atom_entries = Vec::with_capacity(entries.len());
    for entry in entries {
        let url = post_url(config, entry.post)?.to_string();
        let date = entry.post.date.fixed_offset();

        let mut content = Content::default();
        content.set_content_type(Some("html".to_owned()));
        content.set_value(Some(entry.html.clone()));

        let mut atom_entry = Entry::default();
        atom_entry.set_title(Text::plain(entry.post.title.clone()));
        atom_entry.set_id(url.clone());
        atom_entry.set_links(vec![link(url, "alternate")]);
        atom_entry.set_published(Some(date));
        atom_entry.set_updated(date);
        atom_entry.set_summary(Some(Text::plain(excerpt(&entry.html, ATOM_SUMMARY_LENGTH))));
        atom_entry.set_content(Some(content));
        atom_entries.push(atom_entry);
    }
    feed.set_entries(atom_entries);

    Ok(feed)
}

fn link(href: String, rel: &str) -> Link {
    let mut link = Link::default();
    link.set_href(href);
    link.set_rel(rel);
    link
}

fn post_url(config: &Config, post: &Post) -> Result<Url> {
    Ok(config.site.base_url.join(&post.file_name)?)
}

/// Formats a timestamp the way RSS expects: `Sat, 09 Mar 2024 00:00:00 GMT`.
pub fn rfc1123(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Strips tags from `html` and keeps the first `length` characters. The cut
/// may land mid-word or mid-entity.
pub fn excerpt(html: &str, length: usize) -> String {
    TAG.replace_all(html, "").chars().take(length).collect()
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed. Variants include I/O, Atom, RSS, and
/// post-parsing issues.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a post's source can't be read again.
    #[error(transparent)]
    Post(#[from] post::Error),

    /// Returned when a post URL can't be built from the base URL.
    #[error("building post URL: {0}")]
    Url(#[from] url::ParseError),

    /// Returned when a feed file can't be created.
    #[error("creating `{}`: {err}", .path.display())]
    Create { path: PathBuf, err: std::io::Error },

    /// Returned when there is an Atom-related error.
    #[error("writing Atom feed: {0}")]
    Atom(#[from] atom_syndication::Error),

    /// Returned when there is an RSS-related error.
    #[error("writing RSS feed: {0}")]
    Rss(#[from] rss::Error),
}
