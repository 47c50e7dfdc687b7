//! Amazon storefronts a lookup can target.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Amazon storefront whose product pages are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Us,
    Uk,
    De,
    Fr,
    Es,
    It,
    Ca,
    Jp,
    In,
}

/// Static per-storefront data: code, domain, Accept-Language, parse aliases.
struct RegionInfo {
    code: &'static str,
    domain: &'static str,
    accept_language: &'static str,
    aliases: &'static [&'static str],
}

impl Region {
    fn info(&self) -> RegionInfo {
        match self {
            Region::Us => RegionInfo {
                code: "us",
                domain: "amazon.com",
                accept_language: "en-US,en;q=0.9",
                aliases: &["usa", "united states"],
            },
            Region::Uk => RegionInfo {
                code: "uk",
                domain: "amazon.co.uk",
                accept_language: "en-GB,en;q=0.9",
                aliases: &["gb", "united kingdom"],
            },
            Region::De => RegionInfo {
                code: "de",
                domain: "amazon.de",
                accept_language: "de-DE,de;q=0.9,en;q=0.8",
                aliases: &["germany"],
            },
            Region::Fr => RegionInfo {
                code: "fr",
                domain: "amazon.fr",
                accept_language: "fr-FR,fr;q=0.9,en;q=0.8",
                aliases: &["france"],
            },
            Region::Es => RegionInfo {
                code: "es",
                domain: "amazon.es",
                accept_language: "es-ES,es;q=0.9,en;q=0.8",
                aliases: &["spain"],
            },
            Region::It => RegionInfo {
                code: "it",
                domain: "amazon.it",
                accept_language: "it-IT,it;q=0.9,en;q=0.8",
                aliases: &["italy"],
            },
            Region::Ca => RegionInfo {
                code: "ca",
                domain: "amazon.ca",
                accept_language: "en-CA,en;q=0.9,fr;q=0.8",
                aliases: &["canada"],
            },
            Region::Jp => RegionInfo {
                code: "jp",
                domain: "amazon.co.jp",
                accept_language: "ja-JP,ja;q=0.9,en;q=0.8",
                aliases: &["japan"],
            },
            Region::In => RegionInfo {
                code: "in",
                domain: "amazon.in",
                accept_language: "en-IN,en;q=0.9,hi;q=0.8",
                aliases: &["india"],
            },
        }
    }

    /// Returns the Amazon domain for this region.
    pub fn domain(&self) -> &'static str {
        self.info().domain
    }

    /// Returns the product page template, e.g. `https://www.amazon.com/dp/`.
    ///
    /// The ASIN is appended verbatim to build the upstream address.
    pub fn product_url_template(&self) -> String {
        format!("https://www.{}/dp/", self.domain())
    }

    /// Returns the Accept-Language header value for this region.
    pub fn accept_language(&self) -> &'static str {
        self.info().accept_language
    }

    /// Returns all supported regions.
    pub fn all() -> &'static [Region] {
        &[
            Region::Us,
            Region::Uk,
            Region::De,
            Region::Fr,
            Region::Es,
            Region::It,
            Region::Ca,
            Region::Jp,
            Region::In,
        ]
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.info().code)
    }
}

impl FromStr for Region {
    type Err = RegionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Region::all()
            .iter()
            .copied()
            .find(|region| {
                let info = region.info();
                info.code == wanted || info.aliases.contains(&wanted.as_str())
            })
            .ok_or_else(|| RegionParseError(s.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct RegionParseError(String);

impl fmt::Display for RegionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<String> = Region::all().iter().map(Region::to_string).collect();
        write!(f, "Unknown region '{}'. Valid regions: {}", self.0, codes.join(", "))
    }
}

impl std::error::Error for RegionParseError {}
