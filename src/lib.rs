//! The library code for the `plume` static blog builder. A build runs as a
//! single pass over the posts directory:
//!
//! 1. Each markdown source is parsed into front matter and body, rendered to
//!    HTML, and written out as its own page ([`crate::post`])
//! 2. The resulting posts are sorted and grouped into the home page, the
//!    archive, one page per tag, and the tags index ([`crate::collection`])
//! 3. The RSS and Atom feeds are written from the active posts
//!    ([`crate::feed`])
//! 4. Pages left over from earlier builds are deleted ([`crate::reconcile`])
//!
//! Every page goes through the same HTML template ([`crate::template`]).
//! Rendering a post body involves a few smaller passes: markdown conversion
//! ([`crate::markdown`]), heading ids ([`crate::anchor`]), and the table of
//! contents ([`crate::toc`]), which all agree on heading slugs through
//! [`crate::slug`].

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod anchor;
pub mod build;
pub mod collection;
pub mod config;
pub mod feed;
pub mod markdown;
pub mod page;
pub mod post;
pub mod reconcile;
pub mod slug;
pub mod template;
pub mod toc;
