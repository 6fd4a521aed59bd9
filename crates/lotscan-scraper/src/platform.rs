//! Marketplace identification from a listing URL.

use std::fmt;

use reqwest::Url;
use serde::Serialize;

/// Marketplace hosting a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum Platform {
    Craigslist,
    FacebookMarketplace,
    CarGurus,
    AutoTrader,
    CarsCom,
    CarMax,
    Carvana,
    TrueCar,
    Edmunds,
    EbayMotors,
    OfferUp,
    Autotempest,
    Unknown,
}

/// Ordered identifier table; the first substring found wins. `marketplace`
/// stays last so a vendor domain in the same URL takes precedence.
const IDENTIFIERS: &[(&str, Platform)] = &[
    ("craigslist.org", Platform::Craigslist),
    ("facebook.com", Platform::FacebookMarketplace),
    ("cargurus.com", Platform::CarGurus),
    ("autotrader.com", Platform::AutoTrader),
    ("cars.com", Platform::CarsCom),
    ("carmax.com", Platform::CarMax),
    ("carvana.com", Platform::Carvana),
    ("truecar.com", Platform::TrueCar),
    ("edmunds.com", Platform::Edmunds),
    ("ebay.com", Platform::EbayMotors),
    ("offerup.com", Platform::OfferUp),
    ("autotempest.com", Platform::Autotempest),
    ("marketplace", Platform::FacebookMarketplace),
];

impl Platform {
    /// Identifies the marketplace for `url`. Total: anything unrecognized,
    /// including unparsable input, is [`Platform::Unknown`].
    ///
    /// Matching is case-insensitive against host and path when the URL
    /// parses, and against the whole string otherwise.
    #[must_use]
    pub fn identify(url: &str) -> Self {
        let haystack = match Url::parse(url.trim()) {
            Ok(parsed) => format!("{}{}", parsed.host_str().unwrap_or_default(), parsed.path()),
            Err(_) => url.to_owned(),
        }
        .to_ascii_lowercase();

        IDENTIFIERS
            .iter()
            .find(|(needle, _)| haystack.contains(needle))
            .map_or(Self::Unknown, |(_, platform)| *platform)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Craigslist => "Craigslist",
            Self::FacebookMarketplace => "Facebook Marketplace",
            Self::CarGurus => "CarGurus",
            Self::AutoTrader => "AutoTrader",
            Self::CarsCom => "Cars.com",
            Self::CarMax => "CarMax",
            Self::Carvana => "Carvana",
            Self::TrueCar => "TrueCar",
            Self::Edmunds => "Edmunds",
            Self::EbayMotors => "eBay Motors",
            Self::OfferUp => "OfferUp",
            Self::Autotempest => "Autotempest",
            Self::Unknown => "Unknown Platform",
        }
    }
}

impl From<Platform> for &'static str {
    fn from(platform: Platform) -> Self {
        platform.as_str()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
