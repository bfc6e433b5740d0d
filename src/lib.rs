pub mod core;
pub mod http;
pub mod parser;
pub mod scrapers;
pub mod spiders;
pub mod stats;
pub mod storage;

pub use core::{CrawlReport, Crawler};
pub use core::{ParseOutput, Record, ScraperError, ScraperResult, Spider, SpiderConfig};
pub use http::{HttpRequest, HttpResponse};
pub use parser::{Document, Node, Query, QueryScope, Selectable};
pub use scrapers::{HttpScraper, MockScraper, Scraper};
pub use spiders::{CssProductSpider, PathProductSpider};
pub use stats::StatsTracker;
pub use storage::{DiskStorage, JsonLinesSink, RecordSink};
