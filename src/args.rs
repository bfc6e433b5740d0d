use clap::{Parser, ValueEnum};
use shopscraper::QueryScope;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shopscraper")]
#[command(about = "Crawls a product listing and prints one JSON record per product")]
#[command(version)]
pub struct Args {
    /// Page to start from (defaults to the e-commerce test site)
    #[arg(short, long, env = "SHOPSCRAPER_URL")]
    pub url: Option<String>,

    /// Extraction rule
    #[arg(short, long, value_enum, default_value_t = RuleArg::Css)]
    pub rule: RuleArg,

    /// Whether absolute path queries see the whole page (path rule only)
    #[arg(short, long, value_enum, default_value_t = ScopeArg::Global)]
    pub scope: ScopeArg,

    /// Directory for JSON-lines output; records go to stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum number of hops from the start page
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum RuleArg {
    Css,
    Path,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    Global,
    Scoped,
}

impl From<ScopeArg> for QueryScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Global => QueryScope::Global,
            ScopeArg::Scoped => QueryScope::Scoped,
        }
    }
}
