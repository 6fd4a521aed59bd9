//! Listing text extraction.
//!
//! Noise blocks are removed first. Then the page is scanned for containers
//! whose `class`, `id`, or `data-testid` names a known vehicle-details block.
//! If those containers hold more than [`MIN_VEHICLE_CONTENT_CHARS`] of
//! markup they become the extraction source; otherwise the whole cleaned
//! page is used.

use std::sync::LazyLock;

use regex::Regex;

use crate::html::{collapse_whitespace, decode_entities, extract_attr, strip_tags};

/// Vehicle-specific containers below this size (raw inner HTML) are too thin
/// to stand in for the page.
pub(crate) const MIN_VEHICLE_CONTENT_CHARS: usize = 300;

/// Elements removed wholesale before any other processing.
const NOISE_TAGS: &[&str] = &[
    "style", "script", "svg", "head", "nav", "footer", "iframe", "noscript",
];

/// Class/id fragments that mark listing content, generic names first, then
/// marketplace-specific ones. Matched case-insensitively as substrings.
const VEHICLE_CONTAINER_MARKERS: &[&str] = &[
    "vehicle-details",
    "vehicle-info",
    "vehicle-overview",
    "vehicle-features",
    "listing-details",
    "car-details",
    "specifications",
    // Craigslist
    "postingbody",
    "attrgroup",
    // CarGurus
    "cg-listing-key-details",
    "listing-overview",
    // AutoTrader
    "vdp-content",
    // Cars.com
    "basics-section",
    // Facebook Marketplace
    "marketplace_pdp",
    // eBay Motors
    "item-specifics",
];

/// Elements that can wrap listing content. Void elements never qualify.
const CONTAINER_TAGS: &[&str] = &[
    "div", "section", "article", "main", "aside", "ul", "ol", "dl", "table", "span", "p", "pre",
];

static NOISE_BLOCK_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    NOISE_TAGS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>"))
                .expect("valid noise block regex")
        })
        .collect()
});
static OPEN_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<([a-z][a-z0-9]*)\b[^>]*>").expect("valid open tag regex")
});
static ANY_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(/?)([a-z][a-z0-9]*)\b[^>]*?(/?)>").expect("valid tag regex")
});

/// Extracts listing-relevant plain text from rendered HTML.
///
/// Never fails: if the structured cleanup leaves nothing, every tag is
/// stripped from the raw input instead. The output contains no `<...>`
/// fragments and no runs of whitespace.
#[must_use]
pub fn extract_text(html: &str) -> String {
    clean_listing_text(html).unwrap_or_else(|| plain_text(html))
}

fn clean_listing_text(html: &str) -> Option<String> {
    let cleaned = remove_noise_blocks(html);

    let vehicle_content = collect_vehicle_content(&cleaned);
    let source = if vehicle_content.chars().count() > MIN_VEHICLE_CONTENT_CHARS {
        tracing::debug!(
            chars = vehicle_content.len(),
            "using vehicle-specific containers for text extraction"
        );
        vehicle_content
    } else {
        cleaned
    };

    let text = plain_text(&source);
    (!text.is_empty()).then_some(text)
}

/// Strips tags, decodes entities, strips any tags the decoding revealed, and
/// collapses whitespace.
fn plain_text(html: &str) -> String {
    let decoded = decode_entities(&strip_tags(html));
    collapse_whitespace(&strip_tags(&decoded))
}

fn remove_noise_blocks(html: &str) -> String {
    NOISE_BLOCK_RES
        .iter()
        .fold(html.to_owned(), |acc, re| re.replace_all(&acc, " ").into_owned())
}

/// Concatenates the inner HTML of every vehicle container, skipping
/// containers nested inside one already captured.
fn collect_vehicle_content(html: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let mut covered_until = 0usize;

    for caps in OPEN_TAG_RE.captures_iter(html) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() < covered_until {
            continue;
        }
        let name = caps.get(1).map_or("", |m| m.as_str());
        if !CONTAINER_TAGS.iter().any(|t| t.eq_ignore_ascii_case(name)) {
            continue;
        }
        if !is_vehicle_container(whole.as_str()) {
            continue;
        }

        let (inner, end) = inner_content(html, whole.end(), name);
        segments.push(inner);
        covered_until = end;
    }

    segments.join("\n")
}

fn is_vehicle_container(open_tag: &str) -> bool {
    let markers = ["class", "id", "data-testid"]
        .into_iter()
        .filter_map(|attr| extract_attr(open_tag, attr))
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase();
    !markers.is_empty()
        && VEHICLE_CONTAINER_MARKERS
            .iter()
            .any(|marker| markers.contains(marker))
}

/// Returns the inner HTML of the element whose opening tag ends at
/// `content_start`, plus the byte offset just past its closing tag. Same-name
/// nesting is tracked; an unclosed element runs to the end of the document.
fn inner_content<'a>(html: &'a str, content_start: usize, name: &str) -> (&'a str, usize) {
    let mut depth = 1usize;
    for caps in ANY_TAG_RE.captures_iter(&html[content_start..]) {
        let Some(whole) = caps.get(0) else { continue };
        let tag_name = caps.get(2).map_or("", |m| m.as_str());
        if !tag_name.eq_ignore_ascii_case(name) {
            continue;
        }
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let self_closing = caps.get(3).is_some_and(|m| !m.as_str().is_empty());

        if closing {
            depth -= 1;
            if depth == 0 {
                let end = content_start + whole.start();
                return (&html[content_start..end], content_start + whole.end());
            }
        } else if !self_closing {
            depth += 1;
        }
    }
    (&html[content_start..], html.len())
}
