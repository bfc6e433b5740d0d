mod args;

use anyhow::Context;
use args::{Args, RuleArg};
use clap::Parser;
use log::info;
use shopscraper::{
    Crawler, CssProductSpider, DiskStorage, HttpScraper, JsonLinesSink, PathProductSpider,
    RecordSink, Spider, SpiderConfig,
};
use std::io;
use std::time::Duration;
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .filter_module("selectors", log::LevelFilter::Warn)
        .filter_module("html5ever", log::LevelFilter::Error)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let mut config = SpiderConfig::default().with_timeout(Duration::from_secs(args.timeout));
    if let Some(depth) = args.max_depth {
        config = config.with_depth(depth);
    }
    let start_url = args
        .url
        .as_deref()
        .map(Url::parse)
        .transpose()
        .context("invalid start URL")?;

    match args.rule {
        RuleArg::Css => {
            let mut spider = CssProductSpider::new()?.with_config(config);
            if let Some(url) = start_url {
                spider = spider.with_start_url(url);
            }
            crawl(&spider, &args).await
        }
        RuleArg::Path => {
            let mut spider = PathProductSpider::new()?
                .with_scope(args.scope.into())
                .with_config(config);
            if let Some(url) = start_url {
                spider = spider.with_start_url(url);
            }
            crawl(&spider, &args).await
        }
    }
}

async fn crawl<S: Spider>(spider: &S, args: &Args) -> anyhow::Result<()> {
    let mut sink: Box<dyn RecordSink> = match &args.output {
        Some(dir) => {
            let storage = DiskStorage::new(dir)?;
            let (path, sink) = storage.open_sink(spider.name())?;
            info!("Writing records to {}", path.display());
            Box::new(sink)
        }
        None => Box::new(JsonLinesSink::new(io::stdout().lock())),
    };

    let crawler = Crawler::new(Box::new(HttpScraper::new()?));
    let result = crawler.export(spider, sink.as_mut()).await;
    crawler.stats().log_summary();

    let written = result.with_context(|| format!("{} stopped early", spider.name()))?;
    info!("Exported {} records", written);
    Ok(())
}
