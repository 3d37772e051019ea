//! Converts markdown post bodies to HTML with [`pulldown_cmark`]. Parser events
//! pass through an [`EventConverter`] before rendering, which is where math
//! notation and links between posts are handled.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
use url::{ParseError, Url};

const MARKDOWN_EXTENSION: &str = ".md";
const HTML_EXTENSION: &str = ".html";

/// Converts `markdown` to HTML. When `math` is set, `$...$` and `$$...$$`
/// spans are parsed as math and emitted with MathJax's `\(...\)` and
/// `\[...\]` delimiters so the client-side renderer picks them up.
pub fn to_html(markdown: &str, math: bool) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    if math {
        options.insert(Options::ENABLE_MATH);
    }

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(
        &mut out,
        Parser::new_ext(markdown, options).map(EventConverter::convert),
    );
    out
}

struct EventConverter;

impl EventConverter {
    fn convert(ev: Event<'_>) -> Event<'_> {
        match ev {
            Event::InlineMath(tex) => Event::Text(format!("\\({}\\)", tex).into()),
            Event::DisplayMath(tex) => Event::Text(format!("\\[{}\\]", tex).into()),

            // Posts link to each other by source file name (`other.md`), which
            // has to point at the rendered page (`other.html`) instead.
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Link {
                link_type,
                dest_url: Self::convert_link(dest_url),
                title,
                id,
            }),
            _ => ev,
        }
    }

    fn convert_link(dest: CowStr<'_>) -> CowStr<'_> {
        let converted = match Url::parse(&dest) {
            Err(ParseError::RelativeUrlWithoutBase) => {
                let (path, fragment) = match dest.find('#') {
                    Some(i) => dest.split_at(i),
                    None => (&*dest, ""),
                };
                path.strip_suffix(MARKDOWN_EXTENSION)
                    .filter(|stem| !stem.is_empty())
                    .map(|stem| format!("{}{}{}", stem, HTML_EXTENSION, fragment))
            }
            _ => None,
        };
        match converted {
            Some(link) => link.into(),
            None => dest,
        }
    }
}
