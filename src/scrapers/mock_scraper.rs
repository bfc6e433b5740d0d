use crate::core::SpiderConfig;
use crate::http::{HttpRequest, HttpResponse, ResponseType};
use crate::StatsTracker;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use super::{FetchError, Scraper};

#[derive(Debug, Clone)]
pub enum MockResponse {
    Page { status: u16, body: String },
    NetworkFailure(String),
}

impl MockResponse {
    pub fn html(body: &str) -> Self {
        MockResponse::Page {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        MockResponse::Page {
            status,
            body: body.to_string(),
        }
    }
}

/// Serves canned responses by URL. Unknown URLs get a 404.
#[derive(Clone)]
pub struct MockScraper {
    responses: Arc<HashMap<String, MockResponse>>,
    requested: Arc<Mutex<Vec<String>>>,
    stats: Arc<StatsTracker>,
}

impl MockScraper {
    pub fn new(responses: Vec<(&str, MockResponse)>) -> Self {
        Self {
            responses: Arc::new(
                responses
                    .into_iter()
                    .map(|(url, response)| (url.to_string(), response))
                    .collect(),
            ),
            requested: Arc::new(Mutex::new(Vec::new())),
            stats: Arc::new(StatsTracker::new()),
        }
    }

    /// URLs fetched so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl Scraper for MockScraper {
    async fn fetch_single(
        &self,
        request: &HttpRequest,
        _config: &SpiderConfig,
    ) -> Result<HttpResponse, FetchError> {
        let url = request.url.to_string();
        self.requested.lock().push(url.clone());

        let (status, body) = match self.responses.get(&url) {
            Some(MockResponse::Page { status, body }) => (*status, body.clone()),
            Some(MockResponse::NetworkFailure(reason)) => {
                return Err(FetchError::Network {
                    url,
                    reason: reason.clone(),
                })
            }
            None => (404, "Not Found".to_string()),
        };

        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "text/html".to_string());

        Ok(HttpResponse {
            url: request.url.clone(),
            status,
            headers,
            body: body.into_bytes(),
            response_type: ResponseType::Html,
        })
    }

    fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    fn set_stats(&mut self, stats: Arc<StatsTracker>) {
        self.stats = stats;
    }
}
