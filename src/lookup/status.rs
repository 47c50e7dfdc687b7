//! Mapping from an HTTP outcome to what the user is told.

use crate::lookup::relay::{RelayEndpoint, RelayOffer, RelaySet};
use serde::Serialize;

pub const FOUND_MESSAGE: &str = "Product found.";
pub const NOT_FOUND_MESSAGE: &str = "Product not found.";
pub const UNAVAILABLE_MESSAGE: &str = "Service is unavailable at this moment.";
pub const RELAY_PROMPT: &str = "Select alternative proxy server for querying Amazon:";

/// User-facing classification of the last lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusView {
    /// Nothing resolved yet (never submitted, or a lookup is in flight).
    NoStatus,
    Found,
    /// Any non-200 below 500, including the `0` transport-failure sentinel.
    NotFound,
    /// 5xx: the relay or upstream is down. Carries the relay switch offer.
    Unavailable { offer: RelayOffer },
}

impl StatusView {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            StatusView::NoStatus => None,
            StatusView::Found => Some(FOUND_MESSAGE),
            StatusView::NotFound => Some(NOT_FOUND_MESSAGE),
            StatusView::Unavailable { .. } => Some(UNAVAILABLE_MESSAGE),
        }
    }

    pub fn offer(&self) -> Option<&RelayOffer> {
        match self {
            StatusView::Unavailable { offer } => Some(offer),
            _ => None,
        }
    }
}

/// Classifies an HTTP status.
///
/// Network failure (`0`) deliberately lands in the same bucket as a 404.
pub fn interpret(http_status: Option<u16>, relays: &RelaySet, current: &RelayEndpoint) -> StatusView {
    match http_status {
        None => StatusView::NoStatus,
        Some(200) => StatusView::Found,
        Some(status) if status >= 500 => StatusView::Unavailable { offer: relays.offer(current) },
        Some(_) => StatusView::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::relay::ALTERNATE_RELAY;

    fn classify(status: Option<u16>) -> StatusView {
        interpret(status, &RelaySet::default(), &RelayEndpoint::default())
    }

    #[test]
    fn test_no_status() {
        assert_eq!(classify(None), StatusView::NoStatus);
        assert_eq!(classify(None).message(), None);
    }

    #[test]
    fn test_found() {
        assert_eq!(classify(Some(200)), StatusView::Found);
        assert_eq!(classify(Some(200)).message(), Some("Product found."));
    }

    #[test]
    fn test_failure_and_404_are_the_same() {
        assert_eq!(classify(Some(0)), classify(Some(404)));
        assert_eq!(classify(Some(0)), StatusView::NotFound);
    }

    #[test]
    fn test_other_non_200_below_500_not_found() {
        for status in [201, 204, 301, 302, 400, 403, 429, 499] {
            assert_eq!(classify(Some(status)), StatusView::NotFound, "status {status}");
        }
    }

    #[test]
    fn test_5xx_offers_relays() {
        for status in [500, 502, 503, 599, 600] {
            let view = classify(Some(status));
            let offer = view.offer().expect("5xx should offer relays");
            assert_eq!(offer.current, RelayEndpoint::default());
            assert!(offer.options.contains(&RelayEndpoint::new(ALTERNATE_RELAY)));
            assert_eq!(view.message(), Some(UNAVAILABLE_MESSAGE));
        }
    }

    #[test]
    fn test_serialized_kind() {
        let json = serde_json::to_value(classify(Some(404))).unwrap();
        assert_eq!(json["kind"], "not_found");
    }
}
