use anyhow::Result;
use arxiv_query::config::{find_config_file, load_config, Config};
use arxiv_query::models::{SearchQuery, DEFAULT_MAX_RESULTS};
use arxiv_query::pipeline::{self, PipelineError, PipelineOptions};
use arxiv_query::sources::ArxivSource;
use arxiv_query::ui::{OutputFormat as ReportFormat, Reporter};
use clap::{CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// arxiv-query - Search arXiv, print paper metadata and download the PDFs
#[derive(Parser, Debug)]
#[command(name = "arxiv-query")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search arXiv, print paper metadata and download the PDFs", long_about = None)]
#[command(override_usage = "arxiv-query [OPTIONS] <QUERY> [MAX_RESULTS]")]
struct Cli {
    /// Free-text search query (matched against all fields)
    query: Option<String>,

    /// Maximum number of results (default: 5)
    #[arg(allow_negative_numbers = true)]
    max_results: Option<i64>,

    /// Offset of the first result
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// Directory to save PDFs into (default: pdfs)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print the report without downloading any PDF
    #[arg(long)]
    no_download: bool,

    /// Search endpoint URL
    #[arg(long)]
    api_url: Option<String>,

    /// Output format
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Plain)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv, -vvv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress everything but errors in the log
    #[arg(long, short)]
    quiet: bool,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Line-oriented text report
    Plain,
    /// Parsed feed as JSON
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Plain => ReportFormat::Plain,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = if quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("arxiv_query={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load the config file (explicit or discovered) and apply command-line overrides
fn resolve_config(cli: &Cli) -> Result<Config> {
    let path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => find_config_file(),
    };
    if let Some(path) = &path {
        tracing::info!("Using config file: {}", path.display());
    }
    let mut config = load_config(path.as_deref())?;

    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.downloads.directory = dir.clone();
    }
    if cli.no_download {
        config.downloads.enabled = false;
    }

    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some(query_text) = cli.query.clone() else {
        println!("{}", Cli::command().render_usage());
        std::process::exit(1);
    };

    init_tracing(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;
    let query = SearchQuery::new(query_text)
        .start(cli.start)
        .max_results(cli.max_results.unwrap_or(DEFAULT_MAX_RESULTS));

    let source = ArxivSource::from_config(&config.api)?;
    let options = PipelineOptions::from(&config);
    let mut reporter = Reporter::stdio(cli.output.into());

    match pipeline::run(&source, &query, &options, &mut reporter).await {
        Ok(summary) => {
            tracing::info!(
                entries = summary.entries,
                downloaded = summary.downloads_succeeded,
                failed = summary.downloads_failed,
                "run complete"
            );
            Ok(())
        }
        Err(PipelineError::Fetch(e)) => {
            eprintln!("Error fetching data: {}", e);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
