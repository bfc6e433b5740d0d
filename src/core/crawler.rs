use crate::core::spider::{ParseOutput, Spider};
use crate::http::ResponseType;
use crate::parser::{Document, ParseError};
use crate::stats::StatsTracker;
use crate::storage::RecordSink;
use crate::{HttpRequest, HttpResponse, Record, Scraper};
use futures::future;
use futures::stream::{self, Stream, StreamExt};
use log::{debug, info, trace, warn};
use serde_json::json;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use super::{ScraperError, ScraperResult};

/// The frontier. Each page yields at most one follow-up link, so there is
/// never more than one pending request.
#[derive(Debug)]
enum CrawlState {
    Pending(HttpRequest),
    Done,
    Failed,
}

/// What one turn of the crawl produced. `Page` marks a page that was
/// fetched and extracted; its records follow it.
enum Progress {
    Page,
    Record(Record),
    Failed(ScraperError),
}

struct Walk {
    state: CrawlState,
    buffered: VecDeque<Record>,
    visited: HashSet<String>,
    pages: usize,
}

/// Everything a finished crawl produced.
#[derive(Debug)]
pub struct CrawlReport {
    pub records: Vec<Record>,
    pub pages: usize,
    /// The error that ended the crawl early, if any. Records gathered before
    /// it are kept.
    pub error: Option<ScraperError>,
}

impl CrawlReport {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

pub struct Crawler {
    scraper: Box<dyn Scraper>,
    stats: Arc<StatsTracker>,
}

impl Crawler {
    pub fn new(scraper: Box<dyn Scraper>) -> Self {
        info!("Initializing crawler");
        let stats = Arc::new(StatsTracker::new());
        let mut scraper = scraper;
        scraper.set_stats(Arc::clone(&stats));

        Self { scraper, stats }
    }

    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    /// Crawls from the spider's start URL, yielding records as pages are
    /// extracted. A failure is yielded once as the last item.
    ///
    /// Stats are only marked finished when the stream runs to its end; a
    /// stream dropped early leaves `end_time` unset.
    pub fn stream<'c, S: Spider>(
        &'c self,
        spider: &'c S,
    ) -> impl Stream<Item = ScraperResult<Record>> + 'c {
        self.progress(spider).filter_map(|progress| {
            future::ready(match progress {
                Progress::Page => None,
                Progress::Record(record) => Some(Ok(record)),
                Progress::Failed(e) => Some(Err(e)),
            })
        })
    }

    /// Runs the crawl to the end and collects the outcome.
    pub async fn run<S: Spider>(&self, spider: &S) -> CrawlReport {
        let mut report = CrawlReport {
            records: Vec::new(),
            pages: 0,
            error: None,
        };

        let progress = self.progress(spider);
        futures::pin_mut!(progress);
        while let Some(step) = progress.next().await {
            match step {
                Progress::Page => report.pages += 1,
                Progress::Record(record) => report.records.push(record),
                Progress::Failed(e) => report.error = Some(e),
            }
        }

        report
    }

    /// Runs the crawl and writes every record to `sink`, flushing once at the
    /// end. Records extracted before a failure are written before the error
    /// is returned. Returns the number of records written.
    pub async fn export<S: Spider>(
        &self,
        spider: &S,
        sink: &mut dyn RecordSink,
    ) -> ScraperResult<usize> {
        let records = self.stream(spider);
        futures::pin_mut!(records);

        let mut written = 0;
        let mut failure = None;
        while let Some(result) = records.next().await {
            match result {
                Ok(record) => {
                    if let Err(e) = sink.write_record(&record) {
                        self.stats.finish();
                        return Err(e.into());
                    }
                    written += 1;
                }
                Err(e) => failure = Some(e),
            }
        }
        sink.flush()?;

        match failure {
            Some(e) => Err(e),
            None => Ok(written),
        }
    }

    fn progress<'c, S: Spider>(&'c self, spider: &'c S) -> impl Stream<Item = Progress> + 'c {
        info!("Starting spider: {}", spider.name());
        debug!("Max depth: {}", spider.config().max_depth);

        let seed = HttpRequest::new(spider.start_url().clone(), 0);
        let walk = Walk {
            visited: HashSet::from([seed.url.to_string()]),
            state: CrawlState::Pending(seed),
            buffered: VecDeque::new(),
            pages: 0,
        };

        stream::unfold(walk, move |mut walk| async move {
            if let Some(record) = walk.buffered.pop_front() {
                return Some((Progress::Record(record), walk));
            }

            let request = match std::mem::replace(&mut walk.state, CrawlState::Done) {
                CrawlState::Pending(request) => request,
                CrawlState::Done => {
                    info!(
                        "Spider {} completed. Total pages processed: {}",
                        spider.name(),
                        walk.pages
                    );
                    self.stats.finish();
                    return None;
                }
                CrawlState::Failed => return None,
            };

            match self.step(spider, request, &mut walk.visited).await {
                Ok((records, next)) => {
                    walk.pages += 1;
                    walk.buffered.extend(records);
                    walk.state = next;
                    Some((Progress::Page, walk))
                }
                Err(e) => {
                    warn!("Stopping spider {}: {}", spider.name(), e);
                    self.stats.finish();
                    walk.state = CrawlState::Failed;
                    Some((Progress::Failed(e), walk))
                }
            }
        })
    }

    async fn step<S: Spider>(
        &self,
        spider: &S,
        request: HttpRequest,
        visited: &mut HashSet<String>,
    ) -> ScraperResult<(Vec<Record>, CrawlState)> {
        info!("Processing URL: {} at depth {}", request.url, request.depth);
        if let Some(meta) = &request.meta {
            trace!("Request metadata: {:?}", meta);
        }

        let response = self.scraper.fetch(&request, spider.config()).await?;
        if response.url != request.url {
            debug!("{} redirected to {}", request.url, response.url);
            visited.insert(response.url.to_string());
        }

        let output = Self::extract(spider, &response)?;
        self.stats.record_records(output.records.len());

        let next = match output.next_url {
            Some(href) => self.follow(spider, &request, &response, &href, visited)?,
            None => {
                debug!("No follow-up link on {}", response.url);
                CrawlState::Done
            }
        };

        Ok((output.records, next))
    }

    /// Parsing and extraction stay off the async path: the document is
    /// dropped before the next fetch starts.
    fn extract<S: Spider>(spider: &S, response: &HttpResponse) -> ScraperResult<ParseOutput> {
        trace!("Parsing {} bytes from {}", response.body.len(), response.url);
        if matches!(response.response_type, ResponseType::Json | ResponseType::Binary) {
            warn!("Not a markup response: {} ({:?})", response.url, response.response_type);
            return Err(ParseError::NotHtml.into());
        }
        let document = Document::parse(&response.body)?;
        spider.parse(&document)
    }

    fn follow<S: Spider>(
        &self,
        spider: &S,
        request: &HttpRequest,
        response: &HttpResponse,
        href: &str,
        visited: &mut HashSet<String>,
    ) -> ScraperResult<CrawlState> {
        let url = response.url.join(href)?;
        let depth = request.depth + 1;

        if depth >= spider.config().max_depth {
            debug!("Skipping URL {} - max depth reached", url);
            return Ok(CrawlState::Done);
        }

        let url_str = url.to_string();
        if !spider.config().allow_url_revisit && visited.contains(&url_str) {
            debug!("Skipping URL {} - already visited", url_str);
            return Ok(CrawlState::Done);
        }
        visited.insert(url_str);

        let next = HttpRequest::new(url, depth).with_meta(json!({
            "parent_url": response.url.to_string(),
            "href": href,
        }))?;
        Ok(CrawlState::Pending(next))
    }
}
