//! Attaches `id` attributes to the headings of rendered post HTML so the table
//! of contents links ([`crate::toc`]) have somewhere to land.

use crate::slug::heading_slug;
use regex::Regex;
use std::sync::LazyLock;

static OPENING_HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<h([1-6])>").unwrap());
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Rewrites every `<hN>...</hN>` pair in `html` so the opening tag carries
/// `id="{slug}"`. The slug is [`heading_slug`] of the heading's plain text
/// (inner tags stripped, entities decoded). The inner markup is left as-is.
///
/// A heading only matches when its closing tag has the same level and sits
/// on the same line. Headings with identical text get identical ids.
pub fn annotate_headings(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + 64);
    let mut cursor = 0;

    while let Some(caps) = OPENING_HEADING.captures_at(html, cursor) {
        // Group 0 and 1 always participate in a match.
        let (open, level) = match (caps.get(0), caps.get(1)) {
            (Some(open), Some(level)) => (open, level.as_str()),
            _ => break,
        };
        let inner_start = open.end();
        let closing = format!("</h{}>", level);

        let inner = html[inner_start..]
            .find(&closing)
            .map(|len| &html[inner_start..inner_start + len])
            .filter(|inner| !inner.is_empty() && !inner.contains('\n'));

        match inner {
            Some(inner) => {
                out.push_str(&html[cursor..open.start()]);
                out.push_str(&format!(
                    "<h{} id=\"{}\">{}{}",
                    level,
                    heading_slug(&plain_text(inner)),
                    inner,
                    closing
                ));
                cursor = inner_start + inner.len() + closing.len();
            }
            None => {
                out.push_str(&html[cursor..inner_start]);
                cursor = inner_start;
            }
        }
    }

    out.push_str(&html[cursor..]);
    out
}

/// Strips tags from an HTML fragment and decodes its entities.
fn plain_text(fragment: &str) -> String {
    html_escape::decode_html_entities(&TAG.replace_all(fragment, "")).into_owned()
}
