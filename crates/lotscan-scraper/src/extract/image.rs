//! Primary listing photo discovery.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;

use crate::html::{extract_attr, find_base_href, find_link_href, find_meta_content};

static IMG_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\b[^>]*>").expect("valid img regex"));

/// Smallest width and height, in pixels, for the size-ranked fallback.
const MIN_FALLBACK_DIMENSION: u64 = 300;

/// Class/id fragments sites use for the hero photo.
const MAIN_IMAGE_MARKERS: &[&str] = &[
    "main-image",
    "primary-image",
    "hero-image",
    "main-photo",
    "primary-photo",
    "vehicle-image",
    "listing-image",
    "gallery-image",
    "slide first",
];

/// `src` fragments identifying a marketplace's photo CDN.
const PLATFORM_IMAGE_FRAGMENTS: &[&str] = &[
    "images.craigslist.org",
    "scontent",
    "fbcdn.net",
    "static.cargurus.com",
    "images.autotrader.com",
    "cstatic-images.com",
    "i.ebayimg.com",
];

/// Whole words in `alt` text that suggest a vehicle photo.
const VEHICLE_ALT_KEYWORDS: &[&str] = &[
    "car",
    "vehicle",
    "truck",
    "suv",
    "sedan",
    "coupe",
    "hatchback",
    "wagon",
    "van",
    "convertible",
    "pickup",
    "minivan",
];

#[derive(Debug, Clone)]
struct ImgTag {
    src: String,
    class_and_id: String,
    alt: String,
    width: Option<u64>,
    height: Option<u64>,
}

impl ImgTag {
    fn parse(tag: &str) -> Option<Self> {
        let src = ["src", "data-src", "data-lazy-src"]
            .into_iter()
            .filter_map(|attr| extract_attr(tag, attr))
            .find(|s| !s.is_empty() && !s.to_ascii_lowercase().starts_with("data:"))?;

        let class_and_id = [extract_attr(tag, "class"), extract_attr(tag, "id")]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();

        Some(Self {
            src,
            class_and_id,
            alt: extract_attr(tag, "alt").unwrap_or_default().to_ascii_lowercase(),
            width: extract_attr(tag, "width").as_deref().and_then(parse_dimension),
            height: extract_attr(tag, "height").as_deref().and_then(parse_dimension),
        })
    }

    fn area(&self) -> Option<u64> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w >= MIN_FALLBACK_DIMENSION && h >= MIN_FALLBACK_DIMENSION => {
                Some(w.saturating_mul(h))
            }
            _ => None,
        }
    }

    fn has_vehicle_alt(&self) -> bool {
        self.alt
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| VEHICLE_ALT_KEYWORDS.contains(&word))
    }
}

/// Returns the most likely primary photo of the listing, or `None` when the
/// page offers nothing usable.
///
/// Priority: `og:image`, then images whose class/id marks them as the main
/// photo, then images served from a known marketplace CDN, then images whose
/// alt text mentions a vehicle, and finally the largest image declaring
/// width and height of at least 300px.
///
/// Relative sources are resolved against `og:url`, `<link rel="canonical">`,
/// or `<base href>`; with none of those present they are returned as found.
#[must_use]
pub fn extract_image_url(html: &str) -> Option<String> {
    let base = discover_base_url(html);
    let resolve = |raw: &str| resolve_url(base.as_ref(), raw);

    if let Some(og) = find_meta_content(html, "property", "og:image")
        .or_else(|| find_meta_content(html, "name", "og:image"))
        .filter(|v| !v.to_ascii_lowercase().starts_with("data:"))
    {
        return Some(resolve(&og));
    }

    let images: Vec<ImgTag> = IMG_TAG_RE
        .find_iter(html)
        .filter_map(|m| ImgTag::parse(m.as_str()))
        .collect();
    if images.is_empty() {
        return None;
    }

    let pick = images
        .iter()
        .find(|img| {
            MAIN_IMAGE_MARKERS
                .iter()
                .any(|m| img.class_and_id.contains(m))
        })
        .or_else(|| {
            images.iter().find(|img| {
                let src = img.src.to_ascii_lowercase();
                PLATFORM_IMAGE_FRAGMENTS.iter().any(|f| src.contains(f))
            })
        })
        .or_else(|| images.iter().find(|img| img.has_vehicle_alt()))
        .or_else(|| {
            images
                .iter()
                .filter_map(|img| img.area().map(|area| (area, img)))
                // First image wins ties.
                .fold(None::<(u64, &ImgTag)>, |best, (area, img)| match best {
                    Some((best_area, _)) if best_area >= area => best,
                    _ => Some((area, img)),
                })
                .map(|(_, img)| img)
        })?;

    tracing::debug!(src = %pick.src, "selected listing image");
    Some(resolve(&pick.src))
}

fn discover_base_url(html: &str) -> Option<Url> {
    find_meta_content(html, "property", "og:url")
        .or_else(|| find_link_href(html, "canonical"))
        .or_else(|| find_base_href(html))
        .and_then(|raw| Url::parse(&raw.replace("&amp;", "&")).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

fn resolve_url(base: Option<&Url>, raw: &str) -> String {
    let candidate = raw.trim().replace("&amp;", "&");
    if let Ok(absolute) = Url::parse(&candidate) {
        return absolute.to_string();
    }
    base.and_then(|b| b.join(&candidate).ok())
        .map_or(candidate, |u| u.to_string())
}

fn parse_dimension(value: &str) -> Option<u64> {
    value
        .trim()
        .trim_end_matches("px")
        .trim()
        .parse::<u64>()
        .ok()
}
