use log::debug;
use url::Url;

use super::START_URL;
use crate::core::spider::next_page;
use crate::core::{ParseOutput, Record, ScraperResult, Spider, SpiderConfig};
use crate::parser::{Document, Node, Query, Selectable};

struct ProductQueries {
    thumbnail: Query,
    title: Query,
    price: Query,
    description: Query,
    category_link: Query,
    subcategory_link: Query,
}

impl ProductQueries {
    fn new() -> ScraperResult<Self> {
        Ok(Self {
            thumbnail: Query::css("div.thumbnail")?,
            title: Query::css("a.title::text")?,
            price: Query::css("h4.price::text")?,
            description: Query::css("p.description::text")?,
            category_link: Query::css("a.category-link::attr(href)")?,
            subcategory_link: Query::css("a.subcategory-link::attr(href)")?,
        })
    }
}

/// Reads every product container on its own, so a missing field only
/// affects that product.
pub struct CssProductSpider {
    start_url: Url,
    config: SpiderConfig,
    queries: ProductQueries,
}

impl CssProductSpider {
    pub fn new() -> ScraperResult<Self> {
        Ok(Self {
            start_url: Url::parse(START_URL)?,
            config: SpiderConfig::default(),
            queries: ProductQueries::new()?,
        })
    }

    pub fn with_start_url(mut self, url: Url) -> Self {
        self.start_url = url;
        self
    }

    fn parse_product(&self, thumbnail: &Node<'_>) -> Record {
        Record {
            item: thumbnail.get(&self.queries.title),
            price: thumbnail.get(&self.queries.price),
            description: thumbnail.get_all(&self.queries.description),
        }
    }
}

impl Spider for CssProductSpider {
    fn name(&self) -> &str {
        "toscrape-css"
    }

    fn start_url(&self) -> &Url {
        &self.start_url
    }

    fn config(&self) -> &SpiderConfig {
        &self.config
    }

    fn set_config(&mut self, config: SpiderConfig) {
        self.config = config;
    }

    fn parse(&self, document: &Document) -> ScraperResult<ParseOutput> {
        let records: Vec<Record> = document
            .query_all(&self.queries.thumbnail)
            .iter()
            .map(|thumbnail| self.parse_product(thumbnail))
            .collect();
        debug!("Extracted {} products", records.len());

        let next_url = next_page(
            document.get_value(&self.queries.subcategory_link),
            document.get_value(&self.queries.category_link),
        );

        Ok(ParseOutput { records, next_url })
    }
}
