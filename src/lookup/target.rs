//! Upstream product page template.

use crate::amazon::regions::Region;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base URL that an ASIN is appended to, e.g. `https://www.amazon.com/dp/`.
///
/// Fixed for the lifetime of an orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetUrl(String);

impl TargetUrl {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn for_region(region: Region) -> Self {
        Self(region.product_url_template())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upstream address for one identifier.
    pub fn upstream_for(&self, identifier: &str) -> String {
        format!("{}{}", self.0, identifier)
    }
}

impl Default for TargetUrl {
    fn default() -> Self {
        Self::for_region(Region::Us)
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_targets_amazon_com() {
        assert_eq!(TargetUrl::default().as_str(), "https://www.amazon.com/dp/");
    }

    #[test]
    fn test_upstream_for() {
        let target = TargetUrl::for_region(Region::De);
        assert_eq!(target.upstream_for("B002QYW8LW"), "https://www.amazon.de/dp/B002QYW8LW");
    }
}
