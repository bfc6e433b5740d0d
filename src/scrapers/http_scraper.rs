use async_trait::async_trait;
use reqwest::{header, Client, ClientBuilder};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use super::{FetchError, Scraper};
use crate::core::SpiderConfig;
use crate::http::{HttpRequest, HttpResponse, ResponseType};
use crate::StatsTracker;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum HttpScraperError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] header::InvalidHeaderName),
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] header::InvalidHeaderValue),
}

#[derive(Clone)]
pub struct HttpScraper {
    client: Client,
    stats: Arc<StatsTracker>,
}

impl HttpScraper {
    pub fn new() -> Result<Self, HttpScraperError> {
        let client = ClientBuilder::new()
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            stats: Arc::new(StatsTracker::new()),
        })
    }

    pub fn with_headers(mut self, headers: Vec<(&str, &str)>) -> Result<Self, HttpScraperError> {
        let mut header_map = header::HeaderMap::new();
        header_map.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(DEFAULT_USER_AGENT),
        );

        for (key, value) in headers {
            let name = header::HeaderName::from_bytes(key.as_bytes())?;
            let value = header::HeaderValue::from_str(value)?;
            header_map.insert(name, value);
        }

        self.client = ClientBuilder::new().default_headers(header_map).build()?;

        Ok(self)
    }

    fn extract_headers(response: &reqwest::Response) -> HashMap<String, String> {
        response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|val| (k.to_string(), val.to_string())))
            .collect()
    }

    fn network_error(request: &HttpRequest, config: &SpiderConfig, e: reqwest::Error) -> FetchError {
        let reason = if e.is_timeout() {
            format!("timed out after {:?}", config.request_timeout)
        } else {
            e.to_string()
        };
        FetchError::Network {
            url: request.url.to_string(),
            reason,
        }
    }
}

#[async_trait]
impl Scraper for HttpScraper {
    async fn fetch_single(
        &self,
        request: &HttpRequest,
        config: &SpiderConfig,
    ) -> Result<HttpResponse, FetchError> {
        let mut req = self
            .client
            .get(request.url.clone())
            .timeout(config.request_timeout);

        if let Some(user_agent) = &config.user_agent {
            req = req.header(header::USER_AGENT, user_agent);
        }

        for (key, value) in &config.headers {
            req = req.header(key, value);
        }

        let response = req
            .send()
            .await
            .map_err(|e| Self::network_error(request, config, e))?;

        let status = response.status().as_u16();
        let url = response.url().clone();
        let headers = Self::extract_headers(&response);

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::network_error(request, config, e))?
            .to_vec();

        let response_type = ResponseType::detect(&headers, &body);

        Ok(HttpResponse {
            url,
            status,
            headers,
            body,
            response_type,
        })
    }

    fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    fn set_stats(&mut self, stats: Arc<StatsTracker>) {
        self.stats = stats;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use url::Url;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> Result<(HttpScraper, MockServer), HttpScraperError> {
        let server = MockServer::start().await;
        let scraper = HttpScraper::new()?;
        Ok((scraper, server))
    }

    fn request_for(server: &MockServer, route: &str) -> HttpRequest {
        let url = Url::parse(&server.uri()).unwrap().join(route).unwrap();
        HttpRequest::new(url, 0)
    }

    #[tokio::test]
    async fn test_get_request() {
        let (scraper, mock_server) = setup().await.unwrap();

        Mock::given(method("GET"))
            .and(path("/allinone"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><body>shop</body></html>", "text/html"),
            )
            .mount(&mock_server)
            .await;

        let response = scraper
            .fetch(
                &request_for(&mock_server, "/allinone"),
                &SpiderConfig::default(),
            )
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"<html><body>shop</body></html>");
        assert_eq!(response.response_type, ResponseType::Html);
        assert_eq!(scraper.stats().get_stats().total_requests, 1);
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_error() {
        let (scraper, mock_server) = setup().await.unwrap();

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&mock_server)
            .await;

        let request = request_for(&mock_server, "/missing");
        let err = scraper
            .fetch(&request, &SpiderConfig::default())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            FetchError::Http {
                url: request.url.to_string(),
                status: 404
            }
        );
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        let (scraper, mock_server) = setup().await.unwrap();

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html></html>")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let config = SpiderConfig::default().with_timeout(Duration::from_millis(50));
        let err = scraper
            .fetch(&request_for(&mock_server, "/slow"), &config)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Network { .. }));
        assert_eq!(scraper.stats().get_stats().failed_requests, 1);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let scraper = HttpScraper::new().unwrap();
        let request = HttpRequest::new(Url::parse("http://127.0.0.1:1/").unwrap(), 0);
        let err = scraper
            .fetch(&request, &SpiderConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));
    }

    #[tokio::test]
    async fn test_config_headers_are_sent() {
        let (scraper, mock_server) = setup().await.unwrap();
        let custom_ua = "CustomBot/1.0";

        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("user-agent", custom_ua))
            .and(header("accept-language", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>ok</p>"))
            .mount(&mock_server)
            .await;

        let config = SpiderConfig::default()
            .with_user_agent(custom_ua)
            .with_headers(vec![("accept-language", "en")]);
        let response = scraper
            .fetch(&request_for(&mock_server, "/"), &config)
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"<p>ok</p>");
    }

    #[tokio::test]
    async fn test_custom_default_headers() {
        let (scraper, mock_server) = setup().await.unwrap();
        let scraper = scraper
            .with_headers(vec![("user-agent", "HeaderBot/2.0")])
            .unwrap();

        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("user-agent", "HeaderBot/2.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let response = scraper
            .fetch(&request_for(&mock_server, "/"), &SpiderConfig::default())
            .await
            .unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_invalid_headers() {
        let scraper = HttpScraper::new().unwrap();
        let result = scraper.with_headers(vec![("invalid\0header", "value")]);
        assert!(result.is_err());
    }
}
