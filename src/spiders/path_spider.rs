use log::{debug, warn};
use url::Url;

use super::START_URL;
use crate::core::spider::next_page;
use crate::core::{ParseOutput, Record, ScraperError, ScraperResult, Spider, SpiderConfig};
use crate::parser::{Document, Query, QueryScope, Selectable};

const THUMBNAIL: &str = r#"//*[@class="thumbnail"]"#;
const TITLE: &str = r#"//a[@class="title"]/text()"#;
const PRICE: &str = r#"//h4[contains(concat(" ",normalize-space(@class)," ")," price ")]/text()"#;
const DESCRIPTION: &str = r#"//p[@class="description"]/text()"#;
const CATEGORY_LINK: &str =
    r#"//a[contains(concat(" ",normalize-space(@class)," ")," category-link ")]/@href"#;
const SUBCATEGORY_LINK: &str =
    r#"//a[contains(concat(" ",normalize-space(@class)," ")," subcategory-link ")]/@href"#;

struct FieldQueries {
    title: Query,
    price: Query,
    description: Query,
}

impl FieldQueries {
    fn new(scope: QueryScope) -> ScraperResult<Self> {
        Ok(Self {
            title: Query::path(TITLE)?.with_scope(scope),
            price: Query::path(PRICE)?.with_scope(scope),
            description: Query::path(DESCRIPTION)?.with_scope(scope),
        })
    }
}

/// Reads titles, prices and descriptions as three separate lists from the
/// first product container and pairs them up by index.
///
/// The field queries are absolute paths. Under [`QueryScope::Global`] (the
/// default) they see the whole page even though they start from the first
/// container, which is how the listing gets every product. Under
/// [`QueryScope::Scoped`] only the first container is read.
pub struct PathProductSpider {
    start_url: Url,
    config: SpiderConfig,
    scope: QueryScope,
    thumbnail: Query,
    fields: FieldQueries,
    category_link: Query,
    subcategory_link: Query,
}

impl PathProductSpider {
    pub fn new() -> ScraperResult<Self> {
        Ok(Self {
            start_url: Url::parse(START_URL)?,
            config: SpiderConfig::default(),
            scope: QueryScope::Global,
            thumbnail: Query::path(THUMBNAIL)?,
            fields: FieldQueries::new(QueryScope::Global)?,
            category_link: Query::path(CATEGORY_LINK)?,
            subcategory_link: Query::path(SUBCATEGORY_LINK)?,
        })
    }

    pub fn with_start_url(mut self, url: Url) -> Self {
        self.start_url = url;
        self
    }

    pub fn with_scope(mut self, scope: QueryScope) -> Self {
        self.scope = scope;
        self.fields = FieldQueries {
            title: self.fields.title.with_scope(scope),
            price: self.fields.price.with_scope(scope),
            description: self.fields.description.with_scope(scope),
        };
        self
    }

    pub fn scope(&self) -> QueryScope {
        self.scope
    }

    fn parse_products(&self, document: &Document) -> ScraperResult<Vec<Record>> {
        let Some(first) = document.query_first(&self.thumbnail) else {
            debug!("No product container on page");
            return Ok(Vec::new());
        };

        let items = first.get_all(&self.fields.title);
        let prices = first.get_all(&self.fields.price);
        let descriptions = first.get_all(&self.fields.description);

        if items.len() != prices.len() || items.len() != descriptions.len() {
            warn!(
                "Field lists do not line up: {} items, {} prices, {} descriptions",
                items.len(),
                prices.len(),
                descriptions.len()
            );
            return Err(ScraperError::ExtractionArity {
                items: items.len(),
                prices: prices.len(),
                descriptions: descriptions.len(),
            });
        }

        Ok(items
            .into_iter()
            .zip(prices)
            .zip(descriptions)
            .map(|((item, price), description)| Record {
                item: Some(item),
                price: Some(price),
                description: vec![description],
            })
            .collect())
    }
}

impl Spider for PathProductSpider {
    fn name(&self) -> &str {
        "toscrape-xpath"
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
        let records = self.parse_products(document)?;
        debug!("Extracted {} products", records.len());

        let next_url = next_page(
            document.get_value(&self.subcategory_link),
            document.get_value(&self.category_link),
        );

        Ok(ParseOutput { records, next_url })
    }
}
