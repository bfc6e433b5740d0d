mod crawler;
mod errors;
mod record;
pub mod spider;


pub use crawler::{CrawlReport, Crawler};
pub use errors::{ScraperError, ScraperResult};
pub use record::Record;
pub use spider::{ParseOutput, Spider, SpiderConfig};
