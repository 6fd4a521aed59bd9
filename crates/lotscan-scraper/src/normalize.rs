//! Listing URL canonicalization: shortener resolution and tracking-parameter
//! cleanup.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::ScraperError;

/// Link shorteners resolved with a `HEAD` request before cleanup.
pub const DEFAULT_SHORTENER_HOSTS: &[&str] = &[
    "bit.ly",
    "tinyurl.com",
    "t.co",
    "goo.gl",
    "ow.ly",
    "is.gd",
    "buff.ly",
    "rebrand.ly",
    "cutt.ly",
    "shorturl.at",
    "tiny.cc",
    "fb.me",
    "lnkd.in",
];

/// Query parameters removed from every URL.
const GLOBAL_TRACKING_PARAMS: &[&str] = &["fbclid", "gclid"];

/// Extra query parameters CarGurus uses for partner attribution; listings
/// opened with them often land on a login wall.
const CARGURUS_TRACKING_PARAMS: &[&str] = &["partnerId", "sourceContext"];

/// Resolves shortened links and strips tracking state from listing URLs.
#[derive(Debug, Clone)]
pub struct UrlNormalizer {
    client: Client,
    shortener_hosts: Vec<String>,
    max_depth: u32,
}

impl UrlNormalizer {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, max_depth: u32) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            shortener_hosts: DEFAULT_SHORTENER_HOSTS
                .iter()
                .map(|h| (*h).to_owned())
                .collect(),
            max_depth,
        })
    }

    /// Replaces the shortener host list.
    #[must_use]
    pub fn with_shortener_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shortener_hosts = hosts
            .into_iter()
            .map(|h| h.into().to_ascii_lowercase())
            .collect();
        self
    }

    /// Returns the canonical form of `url`. Never fails: unparsable input and
    /// redirect errors leave the URL as it was.
    ///
    /// Shortener hops are followed at most `max_depth` times.
    pub async fn normalize(&self, url: &str) -> String {
        let trimmed = url.trim();
        if Url::parse(trimmed).is_err() {
            tracing::debug!(url, "URL did not parse; leaving unchanged");
            return url.to_owned();
        }

        let mut current = trimmed.to_owned();
        for depth in 0..self.max_depth {
            let Some(parsed) = Url::parse(&current).ok() else {
                break;
            };
            if !self.is_shortener(&parsed) {
                break;
            }
            match self.resolve_redirect(&current).await {
                Ok(resolved) if resolved != current => {
                    tracing::debug!(from = %current, to = %resolved, depth, "resolved shortened URL");
                    current = resolved;
                }
                Ok(_) => break,
                Err(e) => {
                    tracing::warn!(url = %current, error = %e, "shortened URL resolution failed");
                    break;
                }
            }
        }

        clean_listing_url(&current)
    }

    fn is_shortener(&self, url: &Url) -> bool {
        url.host_str().is_some_and(|host| {
            let host = host.to_ascii_lowercase();
            let host = host.strip_prefix("www.").unwrap_or(&host);
            self.shortener_hosts.iter().any(|s| s == host)
        })
    }

    async fn resolve_redirect(&self, url: &str) -> Result<String, ScraperError> {
        let response = self.client.head(url).send().await?;
        Ok(response.url().to_string())
    }
}

/// Applies per-platform cleanup and strips tracking parameters.
///
/// - Facebook: every query parameter is removed.
/// - CarGurus: the host is forced to `www.cargurus.com` and partner/source
///   parameters are removed.
/// - Everywhere: `utm_*`, `fbclid`, and `gclid` are removed.
///
/// The input string is returned untouched when nothing changes, or when it
/// does not parse as a URL.
#[must_use]
pub fn clean_listing_url(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_owned();
    };
    let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();
    let mut changed = false;

    if host == "facebook.com" || host.ends_with(".facebook.com") {
        if parsed.query().is_some() {
            parsed.set_query(None);
            changed = true;
        }
    } else {
        let is_cargurus = host == "cargurus.com" || host.ends_with(".cargurus.com");
        if host == "cargurus.com" && parsed.set_host(Some("www.cargurus.com")).is_ok() {
            changed = true;
        }
        changed |= strip_query_params(&mut parsed, |name| {
            is_tracking_param(name) || (is_cargurus && CARGURUS_TRACKING_PARAMS.contains(&name))
        });
    }

    if changed {
        parsed.to_string()
    } else {
        url.to_owned()
    }
}

fn is_tracking_param(name: &str) -> bool {
    name.to_ascii_lowercase().starts_with("utm_") || GLOBAL_TRACKING_PARAMS.contains(&name)
}

/// Removes every query pair whose name matches `should_drop`; returns whether
/// anything was removed.
fn strip_query_params(url: &mut Url, should_drop: impl Fn(&str) -> bool) -> bool {
    if url.query().is_none() {
        return false;
    }
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let kept: Vec<&(String, String)> = pairs.iter().filter(|(k, _)| !should_drop(k)).collect();
    if kept.len() == pairs.len() {
        return false;
    }

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cargurus_partner_params_are_removed() {
        assert_eq!(
            clean_listing_url("https://www.cargurus.com/listing/123?partnerId=abc"),
            "https://www.cargurus.com/listing/123"
        );
        assert_eq!(
            clean_listing_url(
                "https://www.cargurus.com/Cars/link/1?sourceContext=carGurusHomePage&utm_source=x&zip=94110"
            ),
            "https://www.cargurus.com/Cars/link/1?zip=94110"
        );
    }

    #[test]
    fn cargurus_host_gains_www() {
        assert_eq!(
            clean_listing_url("https://cargurus.com/listing/123"),
            "https://www.cargurus.com/listing/123"
        );
    }

    #[test]
    fn facebook_drops_entire_query() {
        assert_eq!(
            clean_listing_url(
                "https://www.facebook.com/marketplace/item/987654/?ref=search&referral_code=null"
            ),
            "https://www.facebook.com/marketplace/item/987654/"
        );
    }

    #[test]
    fn generic_tracking_params_are_removed_everywhere() {
        assert_eq!(
            clean_listing_url("https://sfbay.craigslist.org/cto/d/civic/1.html?utm_medium=email&gclid=1"),
            "https://sfbay.craigslist.org/cto/d/civic/1.html"
        );
        assert_eq!(
            clean_listing_url("https://www.cars.com/vehicledetail/1/?fbclid=x&intent=buy"),
            "https://www.cars.com/vehicledetail/1/?intent=buy"
        );
    }

    #[test]
    fn partner_params_survive_on_other_hosts() {
        let url = "https://www.autotrader.com/cars-for-sale/vehicle/1?partnerId=abc";
        assert_eq!(clean_listing_url(url), url);
    }

    #[test]
    fn clean_urls_are_returned_byte_identical() {
        for url in [
            "https://www.cargurus.com/listing/123",
            "https://sfbay.craigslist.org/cto/d/civic/1.html",
            "https://www.cars.com/vehicledetail/1/?intent=buy&q=a%20b",
            "https://www.facebook.com/marketplace/item/987654/",
            "HTTPS://WWW.EDMUNDS.COM/honda/civic/2019/",
        ] {
            assert_eq!(clean_listing_url(url), url);
        }
    }

    #[test]
    fn unparsable_input_is_returned_unchanged() {
        assert_eq!(clean_listing_url("not a url"), "not a url");
        assert_eq!(clean_listing_url(""), "");
    }

    #[tokio::test]
    async fn normalize_never_fails_on_garbage() {
        let normalizer = UrlNormalizer::new(5, 5).unwrap();
        assert_eq!(normalizer.normalize("::::").await, "::::");
    }

    #[tokio::test]
    async fn normalize_skips_network_for_regular_hosts() {
        let normalizer = UrlNormalizer::new(5, 5).unwrap();
        assert_eq!(
            normalizer
                .normalize("https://www.cargurus.com/listing/123?partnerId=abc")
                .await,
            "https://www.cargurus.com/listing/123"
        );
    }

    #[test]
    fn shortener_matching_ignores_case_and_www() {
        let normalizer = UrlNormalizer::new(5, 5).unwrap();
        assert!(normalizer.is_shortener(&Url::parse("https://BIT.LY/abc").unwrap()));
        assert!(normalizer.is_shortener(&Url::parse("https://www.tinyurl.com/abc").unwrap()));
        assert!(!normalizer.is_shortener(&Url::parse("https://bit.ly.example.com/abc").unwrap()));
    }
}
