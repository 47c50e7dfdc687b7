//! Relay (CORS proxy) endpoints and the failover offer.
//!
//! A relay is a plain URL prefix: the upstream address is appended to it
//! verbatim. Relays are never parsed or sanitized.

use crate::lookup::error::LookupError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relay used until the user picks another one.
pub const DEFAULT_RELAY: &str = "https://cors-anywhere.herokuapp.com/";

/// Known-good fallback offered when the default relay reports a 5xx.
pub const ALTERNATE_RELAY: &str = "https://cors-anywhere-1.herokuapp.com/";

/// A relay URL prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelayEndpoint(String);

impl RelayEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Routes `upstream` through this relay by plain concatenation.
    pub fn wrap(&self, upstream: &str) -> String {
        format!("{}{}", self.0, upstream)
    }
}

impl Default for RelayEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_RELAY)
    }
}

impl fmt::Display for RelayEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The enumerated set of relays a user may switch between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySet {
    known: Vec<RelayEndpoint>,
    allow_custom: bool,
}

impl RelaySet {
    /// Creates a strict set that only accepts the given relays.
    pub fn new(known: Vec<RelayEndpoint>) -> Self {
        Self { known, allow_custom: false }
    }

    /// Also accept free-text relay URLs on selection.
    pub fn permissive(mut self, allow_custom: bool) -> Self {
        self.allow_custom = allow_custom;
        self
    }

    pub fn known(&self) -> &[RelayEndpoint] {
        &self.known
    }

    pub fn contains(&self, relay: &RelayEndpoint) -> bool {
        self.known.contains(relay)
    }

    /// Resolves a user selection to a relay.
    ///
    /// Known relays always match. Anything else is accepted only when the set
    /// is permissive.
    pub fn select(&self, candidate: &str) -> Result<RelayEndpoint, LookupError> {
        let candidate = RelayEndpoint::new(candidate);
        if self.contains(&candidate) || self.allow_custom {
            return Ok(candidate);
        }

        let known: Vec<&str> = self.known.iter().map(RelayEndpoint::as_str).collect();
        Err(LookupError::UnknownRelay { relay: candidate.0, known: known.join(", ") })
    }

    /// Builds the switch offer shown after a 5xx.
    pub fn offer(&self, current: &RelayEndpoint) -> RelayOffer {
        RelayOffer { current: current.clone(), options: self.known.clone() }
    }
}

impl Default for RelaySet {
    fn default() -> Self {
        Self::new(vec![RelayEndpoint::new(DEFAULT_RELAY), RelayEndpoint::new(ALTERNATE_RELAY)])
    }
}

/// Relays the user may switch to, with the one currently in use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayOffer {
    pub current: RelayEndpoint,
    pub options: Vec<RelayEndpoint>,
}

impl RelayOffer {
    /// Options other than the current relay.
    pub fn alternates(&self) -> impl Iterator<Item = &RelayEndpoint> {
        self.options.iter().filter(move |relay| **relay != self.current)
    }
}
