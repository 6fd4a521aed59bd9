//! Regex-level HTML primitives shared by the text and image extractors.

use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static UNTERMINATED_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[A-Za-z/!][^>]*$").expect("valid unterminated tag regex"));
static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid meta regex"));
static LINK_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<link\b[^>]*>").expect("valid link regex"));
static BASE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<base\b[^>]*>").expect("valid base regex"));
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("valid attribute regex")
});

/// Returns the trimmed value of `attr` on a single tag, matching the attribute
/// name exactly (so `src` never matches `data-src`).
pub(crate) fn extract_attr(tag: &str, attr: &str) -> Option<String> {
    ATTR_RE.captures_iter(tag).find_map(|caps| {
        let name = caps.get(1)?.as_str();
        if !name.eq_ignore_ascii_case(attr) {
            return None;
        }
        caps.get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str().trim().to_string())
    })
}

/// Finds `<meta {key_attr}="{key_value}" content="...">` regardless of
/// attribute order.
pub(crate) fn find_meta_content(html: &str, key_attr: &str, key_value: &str) -> Option<String> {
    META_TAG_RE.find_iter(html).find_map(|m| {
        let tag = m.as_str();
        let key = extract_attr(tag, key_attr)?;
        if key.eq_ignore_ascii_case(key_value) {
            extract_attr(tag, "content").filter(|c| !c.is_empty())
        } else {
            None
        }
    })
}

/// Finds the `href` of the first `<link>` whose `rel` contains `rel`.
pub(crate) fn find_link_href(html: &str, rel: &str) -> Option<String> {
    LINK_TAG_RE.find_iter(html).find_map(|m| {
        let tag = m.as_str();
        let rel_value = extract_attr(tag, "rel")?.to_ascii_lowercase();
        if rel_value.split_whitespace().any(|r| r == rel) {
            extract_attr(tag, "href").filter(|h| !h.is_empty())
        } else {
            None
        }
    })
}

/// Returns the `href` of the document's `<base>` tag, if any.
pub(crate) fn find_base_href(html: &str) -> Option<String> {
    BASE_TAG_RE
        .find_iter(html)
        .find_map(|m| extract_attr(m.as_str(), "href"))
        .filter(|h| !h.is_empty())
}

/// Replaces every tag with a space, including a tag cut off at the end of
/// truncated markup.
pub(crate) fn strip_tags(html: &str) -> String {
    let stripped = TAG_RE.replace_all(html, " ");
    UNTERMINATED_TAG_RE.replace(&stripped, " ").into_owned()
}

/// Decodes the five entities listing pages routinely contain. `&amp;` goes
/// last so `&amp;lt;` yields the literal text `&lt;`.
pub(crate) fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
