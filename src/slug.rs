//! Defines the two slug functions used by the generator: [`heading_slug`] for
//! heading anchors and [`tag_slug`] for tag page file names. They follow
//! different rules and must not be merged, since either change would alter
//! existing anchors or tag page URLs.

/// Computes the anchor identifier for a heading. The text is lower-cased,
/// every run of characters outside `[a-z0-9]` and the CJK unified ideograph
/// range `U+4E00..=U+9FA5` is collapsed into a single `-`, and leading and
/// trailing hyphens are trimmed.
///
/// Both the table of contents ([`crate::toc`]) and the anchor annotator
/// ([`crate::anchor`]) call this function, so their links always agree.
pub fn heading_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.to_lowercase().chars() {
        if is_heading_slug_char(c) {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

fn is_heading_slug_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

/// Computes the slug for a tag: the tag is lower-cased and every run of
/// whitespace becomes a single `-`. Punctuation is kept as-is.
pub fn tag_slug(tag: &str) -> String {
    let mut slug = String::with_capacity(tag.len());
    let mut in_whitespace = false;
    for c in tag.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            in_whitespace = false;
            slug.push(c);
        }
    }
    slug
}

/// The output file name of a tag's index page, e.g. `tag-rust.html`.
pub fn tag_file_name(tag: &str) -> String {
    format!("tag-{}.html", tag_slug(tag))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_heading_slug_collapses_punctuation() {
        assert_eq!("hello-world", heading_slug("Hello, World!"));
        assert_eq!("why-is-it-awesome", heading_slug("  Why is it awesome?  "));
        assert_eq!("a-b", heading_slug("a --- b"));
    }

    #[test]
    fn test_heading_slug_keeps_cjk() {
        assert_eq!("简介-intro", heading_slug("简介 (Intro)"));
    }

    #[test]
    fn test_heading_slug_drops_other_scripts() {
        assert_eq!("", heading_slug("Ωμέγα"));
        assert_eq!("caf", heading_slug("Café"));
    }

    #[test]
    fn test_tag_slug_only_touches_whitespace() {
        assert_eq!("machine-learning", tag_slug("Machine   Learning"));
        assert_eq!("c++", tag_slug("C++"));
        assert_eq!("-rust", tag_slug(" Rust"));
    }

    #[test]
    fn test_slugs_differ_on_punctuation() {
        assert_eq!("c", heading_slug("C++"));
        assert_eq!("c++", tag_slug("C++"));
    }

    #[test]
    fn test_tag_file_name() {
        assert_eq!("tag-web-dev.html", tag_file_name("Web Dev"));
    }
}
