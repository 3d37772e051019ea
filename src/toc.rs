//! Builds a post's table of contents from the headings of its markdown body.

use crate::slug::heading_slug;
use regex::Regex;
use std::fmt::Write;
use std::sync::LazyLock;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());

/// A single heading found in a markdown body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadingEntry {
    /// The heading level, from 1 (`#`) to 6 (`######`).
    pub level: u8,

    /// The heading text as written in the source, trimmed.
    pub text: String,

    /// The anchor identifier, see [`heading_slug`]. Entities in the text are
    /// decoded first, matching the ids [`crate::anchor`] puts on the page.
    pub slug: String,
}

/// Scans `body` line by line and returns its headings in document order. A
/// heading line starts with one to six `#` characters followed by whitespace
/// and some non-empty text.
pub fn index_headings(body: &str) -> Vec<HeadingEntry> {
    body.lines()
        .filter_map(|line| {
            let caps = HEADING.captures(line)?;
            let text = caps[2].trim();
            if text.is_empty() {
                return None;
            }
            Some(HeadingEntry {
                level: caps[1].len() as u8,
                text: text.to_owned(),
                slug: heading_slug(&html_escape::decode_html_entities(text)),
            })
        })
        .collect()
}

/// Renders the headings as nested lists under a `Contents`-style `label`.
/// Returns `None` when there are no headings so callers can omit the block
/// entirely.
///
/// Nesting starts at depth 1 and moves one level at a time toward each
/// heading's level, so a jump from `#` to `###` opens two lists. Closing never
/// goes below the outermost list.
pub fn render_toc(headings: &[HeadingEntry], label: &str) -> Option<String> {
    if headings.is_empty() {
        return None;
    }

    let mut html = format!("<div class=\"toc\">\n<h2>{}</h2>\n<ul>\n", label);
    let mut depth: u8 = 1;
    for heading in headings {
        while depth < heading.level {
            html.push_str("<ul>\n");
            depth += 1;
        }
        while depth > heading.level && depth > 1 {
            html.push_str("</ul>\n");
            depth -= 1;
        }
        let _ = writeln!(
            html,
            "<li><a href=\"#{}\">{}</a></li>",
            heading.slug, heading.text
        );
    }
    while depth > 1 {
        html.push_str("</ul>\n");
        depth -= 1;
    }
    html.push_str("</ul>\n</div>\n");
    Some(html)
}
