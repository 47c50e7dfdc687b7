//! HTTP transport for relay-wrapped Amazon requests using wreq for TLS fingerprint emulation.

use crate::amazon::regions::Region;
use crate::config::Config;
use crate::lookup::transport::{RelayResponse, Transport};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Relay client with browser impersonation.
///
/// Every failure is reported as [`RelayResponse::failed`]; callers never see
/// an error from a request.
pub struct RelayClient {
    client: Client,
    region: Region,
}

impl RelayClient {
    /// Creates a new relay client with the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)));

        // Outbound proxy in front of the relay, if any
        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { client, region: config.region })
    }

    async fn fetch(&self, url: &str) -> Result<RelayResponse> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", self.region.accept_language())
            // cors-anywhere style relays refuse requests without it
            .header("X-Requested-With", "XMLHttpRequest")
            .header("Cache-Control", "no-cache")
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status().as_u16();
        debug!("Response status: {}", status);

        let body = response.text().await.context("Failed to read response body")?;
        Ok(RelayResponse::new(status, body))
    }
}

#[async_trait]
impl Transport for RelayClient {
    async fn get(&self, url: &str) -> RelayResponse {
        match self.fetch(url).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Request to {} failed: {:#}", url, e);
                RelayResponse::failed()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;
    use wiremock::matchers::{header, method, path_regex};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn make_test_config() -> Config {
        Config { timeout_secs: 5, ..Config::default() }
    }

    /// Relay URL prefix pointing at the mock server.
    fn relay_prefix(server: &MockServer) -> String {
        format!("{}/", server.uri())
    }

    #[tokio::test]
    async fn test_product_page_through_relay() {
        let mock_server = MockServer::start().await;

        let html = r#"<html><body><span id="productTitle">Amazing Product Title</span></body></html>"#;

        Mock::given(method("GET"))
            .and(path_regex(r"/dp/B002QYW8LW$"))
            .and(header("X-Requested-With", "XMLHttpRequest"))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = RelayClient::new(&make_test_config()).unwrap();
        let url = format!("{}https://www.amazon.com/dp/B002QYW8LW", relay_prefix(&mock_server));

        let response = client.get(&url).await;
        assert_eq!(response.status, 200);
        assert!(response.body.contains("Amazing Product Title"));
    }

    #[tokio::test]
    async fn test_status_passed_through() {
        for status in [404, 500, 503] {
            let mock_server = MockServer::start().await;

            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
                .mount(&mock_server)
                .await;

            let client = RelayClient::new(&make_test_config()).unwrap();
            let response = client.get(&format!("{}x", relay_prefix(&mock_server))).await;
            assert_eq!(response.status, status);
            assert_eq!(response.body, "nope");
        }
    }

    #[tokio::test]
    async fn test_empty_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&mock_server)
            .await;

        let client = RelayClient::new(&make_test_config()).unwrap();
        let response = client.get(&relay_prefix(&mock_server)).await;
        assert_eq!(response.status, 200);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused_is_status_zero() {
        // Bind then drop a server so its port is closed
        let uri = {
            let server = MockServer::start().await;
            server.uri()
        };

        let client = RelayClient::new(&make_test_config()).unwrap();
        let response = client.get(&format!("{}/https://www.amazon.com/dp/B0", uri)).await;
        assert!(response.is_failure());
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_is_status_zero() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&mock_server)
            .await;

        let config = Config { timeout_secs: 1, ..Config::default() };
        let client = RelayClient::new(&config).unwrap();
        let response = client.get(&relay_prefix(&mock_server)).await;
        assert_eq!(response.status, 0);
    }

    #[tokio::test]
    async fn test_invalid_url_is_status_zero() {
        let client = RelayClient::new(&make_test_config()).unwrap();
        let response = client.get("not a url").await;
        assert_eq!(response, RelayResponse::failed());
    }

    #[tokio::test]
    async fn test_accept_language_from_region() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(|req: &Request| {
                let language = req.headers.get("accept-language").and_then(|v| v.to_str().ok());
                language == Some(Region::De.accept_language())
            })
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = Config { region: Region::De, ..make_test_config() };
        let client = assert_ok!(RelayClient::new(&config));
        let response = client.get(&relay_prefix(&mock_server)).await;
        assert_eq!(response.status, 200);
    }
}
