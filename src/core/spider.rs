use std::time::Duration;

use url::Url;

use super::{Record, ScraperResult};
use crate::parser::Document;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct SpiderConfig {
    /// Requests at this depth or deeper are not followed.
    pub max_depth: usize,
    pub allow_url_revisit: bool,
    pub request_timeout: Duration,
    pub user_agent: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl Default for SpiderConfig {
    fn default() -> Self {
        Self {
            max_depth: 1000,
            allow_url_revisit: false,
            request_timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            headers: Vec::new(),
        }
    }
}

impl SpiderConfig {
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_allow_url_revisit(mut self, allow: bool) -> Self {
        self.allow_url_revisit = allow;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_string());
        self
    }

    pub fn with_headers(mut self, headers: Vec<(&str, &str)>) -> Self {
        self.headers.extend(
            headers
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        );
        self
    }
}

/// What a spider got out of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutput {
    pub records: Vec<Record>,
    /// The link to follow next, as written in the page (possibly relative).
    pub next_url: Option<String>,
}

/// An extraction rule: turns a parsed page into records and at most one
/// follow-up link. The crawler re-applies the same spider to every page it
/// follows.
pub trait Spider: Send + Sync {
    fn name(&self) -> &str;
    fn start_url(&self) -> &Url;
    fn config(&self) -> &SpiderConfig;
    fn set_config(&mut self, config: SpiderConfig);

    fn with_config(mut self, config: SpiderConfig) -> Self
    where
        Self: Sized,
    {
        self.set_config(config);
        self
    }

    fn parse(&self, document: &Document) -> ScraperResult<ParseOutput>;
}

/// Subcategory links lead to leaf listings, so they win over category links.
pub fn next_page(subcategory: Option<String>, category: Option<String>) -> Option<String> {
    subcategory.or(category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subcategory_wins() {
        assert_eq!(
            next_page(Some("/sub".to_string()), Some("/cat".to_string())).as_deref(),
            Some("/sub")
        );
    }

    #[test]
    fn test_category_is_fallback() {
        assert_eq!(
            next_page(None, Some("/cat".to_string())).as_deref(),
            Some("/cat")
        );
        assert_eq!(next_page(None, None), None);
    }

    #[test]
    fn test_config_builder() {
        let config = SpiderConfig::default()
            .with_depth(3)
            .with_allow_url_revisit(true)
            .with_timeout(Duration::from_millis(250))
            .with_user_agent("shopscraper-test")
            .with_headers(vec![("Accept-Language", "en")]);

        assert_eq!(config.max_depth, 3);
        assert!(config.allow_url_revisit);
        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert_eq!(config.user_agent.as_deref(), Some("shopscraper-test"));
        assert_eq!(
            config.headers,
            vec![("Accept-Language".to_string(), "en".to_string())]
        );
    }
}
