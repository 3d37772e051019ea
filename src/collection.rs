//! Groups rendered [`Post`]s into the site's listing pages: the home page,
//! the archive, one page per tag, and the all-tags page.
//!
//! Posts are sorted newest first before anything else happens. The sort is
//! stable, so posts with the same date keep the order they were read in. Every
//! listing is a filtered view of that one ordering.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::config::Config;
use crate::page::RenderedPage;
use crate::post::{display_date, tag_links, Post};
use crate::slug::tag_file_name;
use crate::template::{Slots, Template};

pub const HOME_PAGE: &str = "index.html";
pub const ARCHIVE_PAGE: &str = "archive.html";
pub const TAGS_PAGE: &str = "tags.html";

/// The posts of a site, partitioned and indexed for the listing pages.
pub struct Collection<'a> {
    /// Non-archived posts, newest first.
    pub active: Vec<&'a Post>,

    /// Archived posts, newest first.
    pub archived: Vec<&'a Post>,

    /// Every tag used by any post (active or archived), mapped to its posts
    /// newest first. Iterates in lexicographic tag order.
    pub tags: BTreeMap<&'a str, Vec<&'a Post>>,
}

impl<'a> Collection<'a> {
    /// Sorts and indexes `posts`.
    pub fn new(posts: &'a [Post]) -> Collection<'a> {
        let mut sorted: Vec<&Post> = posts.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));

        let mut tags: BTreeMap<&str, Vec<&Post>> = BTreeMap::new();
        for &post in &sorted {
            for tag in &post.tags {
                tags.entry(tag.as_str()).or_default().push(post);
            }
        }

        let (archived, active): (Vec<&Post>, Vec<&Post>) =
            sorted.into_iter().partition(|post| post.archived);
        Collection {
            active,
            archived,
            tags,
        }
    }

    /// Whether the archive page should exist.
    pub fn has_archive(&self) -> bool {
        !self.archived.is_empty()
    }

    /// Renders every listing page.
    pub fn pages(&self, config: &Config, template: &Template) -> Vec<RenderedPage> {
        let mut pages = Vec::with_capacity(self.tags.len() + 3);
        pages.push(self.home_page(config, template));
        pages.extend(self.archive_page(config, template));
        pages.extend(self.tag_pages(config, template));
        pages.push(self.tags_page(config, template));
        pages
    }

    /// The home page, listing active posts with their tags.
    pub fn home_page(&self, config: &Config, template: &Template) -> RenderedPage {
        let mut footer = String::new();
        if config.homepage.show_tags_link {
            footer.push_str(&format!(
                r#"📂 <a href="{}">{}</a> | "#,
                TAGS_PAGE, config.navigation.tags_page
            ));
        }
        if config.homepage.show_archive_link && self.has_archive() {
            footer.push_str(&format!(
                r#"📦 <a href="{}">{} ({})</a> | "#,
                ARCHIVE_PAGE,
                config.navigation.archive_page,
                self.archived.len()
            ));
        }
        footer.push_str(&config.site.description);

        let content = format!(
            "\n<h1>{}</h1>\n<p class=\"subtitle\">{}</p>\n\n<h2>{}</h2>\n\
             <ul class=\"post-list\">\n{}</ul>\n\n<hr>\n\n<p>{}</p>\n",
            config.site.title,
            config.site.subtitle,
            config.homepage.heading,
            post_list(&self.active, true),
            footer,
        );

        page(
            template,
            HOME_PAGE,
            &format!("Home - {}", config.site.page_title),
            &content,
        )
    }

    /// The archive page, or `None` if no post is archived.
    pub fn archive_page(&self, config: &Config, template: &Template) -> Option<RenderedPage> {
        if !self.has_archive() {
            return None;
        }

        let labels = &config.labels;
        let content = format!(
            "\n<h1>📦 {}</h1>\n<p class=\"subtitle\">{}</p>\n\n\
             <ul class=\"post-list\">\n{}</ul>\n\n<hr>\n\n{}\n",
            labels.archived_posts,
            labels.archived_count(self.archived.len()),
            post_list(&self.archived, true),
            back_to_home(config),
        );

        Some(page(
            template,
            ARCHIVE_PAGE,
            &format!("Archive - {}", config.site.page_title),
            &content,
        ))
    }

    /// One page per tag, each listing the tag's posts.
    pub fn tag_pages(&self, config: &Config, template: &Template) -> Vec<RenderedPage> {
        self.tags
            .iter()
            .map(|(tag, posts)| {
                let content = format!(
                    "\n<p class=\"subtitle\">{}</p>\n\n<ul class=\"post-list\">\n{}</ul>\n\n<hr>\n{}\n",
                    config.labels.tagged_with(tag, posts.len()),
                    post_list(posts, false),
                    back_to_home(config),
                );
                page(
                    template,
                    &tag_file_name(tag),
                    &format!("Tag: {}", tag),
                    &content,
                )
            })
            .collect()
    }

    /// The page listing every tag with its post count.
    pub fn tags_page(&self, config: &Config, template: &Template) -> RenderedPage {
        let mut list = String::new();
        for (tag, posts) in &self.tags {
            let _ = writeln!(
                list,
                r#"<li><a href="{}" class="tag-link">{}</a> <span class="tag-count">({})</span></li>"#,
                tag_file_name(tag),
                tag,
                posts.len()
            );
        }

        let content = format!(
            "\n<p class=\"subtitle\">{}</p>\n\n<ul class=\"tags-list\">\n{}</ul>\n\n<hr>\n{}\n",
            config.labels.tags_subtitle,
            list,
            back_to_home(config),
        );
        page(template, TAGS_PAGE, &config.labels.all_tags, &content)
    }
}

fn page(template: &Template, file_name: &str, title: &str, content: &str) -> RenderedPage {
    RenderedPage {
        file_name: file_name.to_owned(),
        contents: template.render(&Slots {
            title,
            content,
            ..Slots::default()
        }),
    }
}

fn post_list(posts: &[&Post], with_tags: bool) -> String {
    let mut list = String::new();
    for post in posts {
        let tags = match with_tags && !post.tags.is_empty() {
            true => format!(r#"<div class="tags-inline">{}</div>"#, tag_links(&post.tags)),
            false => String::new(),
        };
        let _ = writeln!(
            list,
            r#"<li><span class="post-list-date">{}</span> - <a href="{}">{}</a>{}</li>"#,
            display_date(&post.date),
            post.file_name,
            post.title,
            tags
        );
    }
    list
}

fn back_to_home(config: &Config) -> String {
    format!(
        r#"<p><a href="{}">{}</a></p>"#,
        HOME_PAGE, config.navigation.back_to_home
    )
}
