use crate::ScraperResult;
use serde_json::Value;
use url::Url;

/// A pending frontier entry.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: Url,
    pub depth: usize,
    pub meta: Option<Value>,
}

impl HttpRequest {
    pub fn new(url: Url, depth: usize) -> Self {
        Self {
            url,
            depth,
            meta: None,
        }
    }

    pub fn with_meta<T: serde::Serialize>(mut self, meta: T) -> ScraperResult<Self> {
        self.meta = Some(serde_json::to_value(meta)?);
        Ok(self)
    }
}
