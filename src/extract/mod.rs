//! HTML link-metadata extraction.
//!
//! Parses one HTML document and extracts (short path, permalink) pairs from
//! its link metadata:
//!
//! - `rel="canonical"` declares the document's permalink; only the first one
//!   in document order counts.
//! - `rel="shortlink"` declares a short-link source; its `data-alt-href`
//!   attribute may carry further space-separated targets.
//!
//! Pure functions of the document text. No I/O, no shared state.

use percent_encoding::percent_decode_str;
use thiserror::Error;
use url::Url;

use crate::core::Mapping;

/// `rel` token marking an element's href as a short-link source.
pub const REL_SHORTLINK: &str = "shortlink";
/// `rel` token marking an element's href as the document's permalink.
pub const REL_CANONICAL: &str = "canonical";
/// Attribute carrying additional space-separated short-link targets.
pub const ATTR_ALT_HREF: &str = "data-alt-href";

/// Whole-document failure. Individual bad candidates are not errors; they
/// land on [`Extraction::skipped`].
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid html: {0:?}")]
    Html(tl::ParseError),
}

/// A short-link candidate that could not be parsed as a URL.
///
/// Recorded instead of aborting so the remaining candidates of the same
/// document are still evaluated.
#[derive(Debug)]
pub struct SkippedLink {
    pub href: String,
    pub error: url::ParseError,
}

/// Everything extracted from one document.
#[derive(Debug, Default)]
pub struct Extraction {
    pub mappings: Vec<Mapping>,
    pub skipped: Vec<SkippedLink>,
}

/// Extract all mappings declared by one HTML document.
///
/// A document yields mappings only if it declares at least one short-link
/// candidate and a non-empty permalink. Anything else yields an empty
/// extraction, which is not an error.
pub fn extract_mappings(html: &str) -> Result<Extraction, ExtractError> {
    if html.is_empty() {
        return Ok(Extraction::default());
    }

    let dom = tl::parse(html, tl::ParserOptions::default()).map_err(ExtractError::Html)?;
    let parser = dom.parser();

    let mut permalink = String::new();
    let mut shortlinks: Vec<String> = Vec::new();

    // Explicit-stack pre-order traversal: "first canonical wins" depends on
    // document order.
    let mut stack: Vec<tl::NodeHandle> = dom.children().iter().rev().copied().collect();
    while let Some(handle) = stack.pop() {
        let Some(node) = handle.get(parser) else {
            continue;
        };
        let tl::Node::Tag(tag) = node else { continue };

        let name = tag.name().as_utf8_str();
        if name.eq_ignore_ascii_case("a") || name.eq_ignore_ascii_case("link") {
            collect_link(tag, &mut permalink, &mut shortlinks);
        }

        for child in tag.children().top().as_slice().iter().rev() {
            stack.push(*child);
        }
    }

    let mut extraction = Extraction::default();
    if shortlinks.is_empty() || permalink.is_empty() {
        return Ok(extraction);
    }

    for link in shortlinks {
        match short_path(&link) {
            Ok(path) if path.len() > 1 => {
                extraction.mappings.push(Mapping::new(path, permalink.clone()));
            }
            // Bare root (or empty) path: dropped, siblings unaffected
            Ok(_) => {}
            Err(error) => extraction.skipped.push(SkippedLink { href: link, error }),
        }
    }

    Ok(extraction)
}

/// Inspect one `<a>`/`<link>` element for shortlink/canonical declarations.
fn collect_link(tag: &tl::HTMLTag, permalink: &mut String, shortlinks: &mut Vec<String>) {
    let mut href = String::new();
    let mut rel = String::new();
    let mut alt_href = String::new();

    for (key, value) in tag.attributes().iter() {
        let value = value.map(|v| v.into_owned()).unwrap_or_default();
        if key.eq_ignore_ascii_case("href") {
            href = value;
        } else if key.eq_ignore_ascii_case("rel") {
            rel = value;
        } else if key.eq_ignore_ascii_case(ATTR_ALT_HREF) {
            alt_href = value;
        }
    }

    if href.is_empty() || rel.is_empty() {
        return;
    }

    for token in rel.split(' ') {
        if token == REL_SHORTLINK {
            shortlinks.push(href.clone());
            // An absent data-alt-href still yields one empty candidate here;
            // the path-length rule drops it later.
            shortlinks.extend(alt_href.split(' ').map(str::to_owned));
        }
        if token == REL_CANONICAL && permalink.is_empty() {
            *permalink = href.clone();
        }
    }
}

/// Path component of a short-link candidate, percent-decoded.
///
/// Bare references like "/x" have no scheme, which `Url::parse` rejects;
/// their path is the reference itself up to `?` or `#`, unresolved.
fn short_path(link: &str) -> Result<String, url::ParseError> {
    let path = match Url::parse(link) {
        Ok(url) => url.path().to_string(),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            link.split(['?', '#']).next().unwrap_or(link).to_string()
        }
        Err(e) => return Err(e),
    };

    let decoded = percent_decode_str(&path)
        .decode_utf8()
        .map(|s| s.into_owned())
        .ok();
    Ok(decoded.unwrap_or(path))
}
