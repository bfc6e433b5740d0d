use crate::core::SpiderConfig;
use crate::{HttpRequest, HttpResponse, StatsTracker};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("network error fetching {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("HTTP {status} fetching {url}")]
    Http { url: String, status: u16 },
}

#[async_trait]
pub trait Scraper: Send + Sync {
    /// Performs one request. Non-2xx responses are returned, not rejected.
    async fn fetch_single(
        &self,
        request: &HttpRequest,
        config: &SpiderConfig,
    ) -> Result<HttpResponse, FetchError>;

    fn stats(&self) -> &StatsTracker;
    fn set_stats(&mut self, stats: Arc<StatsTracker>);

    /// Fetches a page. There is no retry: a failed fetch is final for that URL.
    async fn fetch(
        &self,
        request: &HttpRequest,
        config: &SpiderConfig,
    ) -> Result<HttpResponse, FetchError> {
        let start_time = Utc::now();
        info!("Fetching URL: {}", request.url);

        let response = match self.fetch_single(request, config).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Request failed for URL: {} ({})", request.url, e);
                self.stats().record_failure();
                return Err(e);
            }
        };

        debug!(
            "Received response: status={}, body_length={}",
            response.status,
            response.body.len()
        );

        let duration = Utc::now().signed_duration_since(start_time);
        self.stats()
            .record_request(response.status, response.body.len(), duration);

        if !response.is_success() {
            warn!(
                "Request completed with error status for URL: {} (status={})",
                request.url, response.status
            );
            return Err(FetchError::Http {
                url: request.url.to_string(),
                status: response.status,
            });
        }

        Ok(response)
    }
}
