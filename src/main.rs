//! gitcrawler CLI - GitHub search crawler command line interface.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use gitcrawler::{Crawler, CrawlerConfig, SearchCategory};

/// gitcrawler - GitHub search crawler with proxy rotation
#[derive(Parser)]
#[command(name = "gitcrawler")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search GitHub and save the result URLs
    Search(SearchArgs),

    /// List supported search types
    Types,
}

#[derive(Parser)]
struct SearchArgs {
    /// Search keywords
    keywords: Vec<String>,

    /// Search type: repositories, issues or wikis
    #[arg(short = 't', long = "type")]
    category: Option<SearchCategory>,

    /// Proxy (host:port or user:pass@host:port); repeat or comma-separate
    #[arg(short, long, value_delimiter = ',')]
    proxy: Vec<String>,

    /// Skip repository owner/language extraction
    #[arg(long)]
    no_extra: bool,

    /// Directory for CSV output
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Do not write a CSV file
    #[arg(long)]
    no_save: bool,

    /// JSON configuration file; command line flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum concurrent repository page fetches
    #[arg(long)]
    max_concurrent: Option<usize>,

    /// Number of proxies raced per request
    #[arg(long)]
    max_proxy_race: Option<usize>,

    /// Maximum number of results to display
    #[arg(short, long, default_value = "10")]
    limit: usize,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Compact single-line output
    Compact,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Search(args) => run_search(args).await,
        Commands::Types => list_types(),
    }
}

fn list_types() -> Result<()> {
    println!("Supported search types:\n");
    for category in SearchCategory::ALL {
        let note = if category.supports_enrichment() {
            " (owner and language stats extracted)"
        } else {
            ""
        };
        println!("  {}{}", category, note);
    }
    println!();
    println!("Usage: gitcrawler search python jwt -t repositories -p 10.0.0.1:3128");
    Ok(())
}

fn build_config(args: &SearchArgs) -> Result<CrawlerConfig> {
    let mut config = match &args.config {
        Some(path) => CrawlerConfig::from_json_file(path)?,
        None => CrawlerConfig::default(),
    };

    if !args.keywords.is_empty() {
        config.keywords = args.keywords.clone();
    }
    if let Some(category) = args.category {
        config.category = category;
    }
    if !args.proxy.is_empty() {
        config.proxies = args.proxy.clone();
    }
    if args.no_extra {
        config.extract_extra = false;
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(n) = args.max_concurrent {
        config.max_concurrent = n;
    }
    if let Some(n) = args.max_proxy_race {
        config.max_proxy_race = n;
    }

    Ok(config)
}

async fn run_search(args: SearchArgs) -> Result<()> {
    let config = build_config(&args)?;
    let keywords = config.keywords.join(" ");
    let category = config.category;

    let mut crawler = Crawler::from_config(config)?;
    if args.no_save {
        crawler = crawler.without_sink();
    }

    let report = crawler.crawl().await?;
    let items = &report.items;

    match args.format {
        OutputFormat::Text => {
            println!(
                "\n{} results for \"{}\" ({}):\n",
                items.len(),
                keywords,
                category
            );

            for (i, item) in items.iter().take(args.limit).enumerate() {
                println!("{}. {}", i + 1, item.url);
                if let Some(extra) = &item.extra {
                    println!("   Owner: {}", extra.owner);
                    if !extra.language_stats.is_empty() {
                        let languages: Vec<String> = extra
                            .language_stats
                            .iter()
                            .map(|(lang, pct)| format!("{} {:.1}%", lang, pct))
                            .collect();
                        println!("   Languages: {}", languages.join(", "));
                    }
                }
            }

            if let Some(path) = &report.saved_to {
                println!("\nSaved to {}", path.display());
            }
        }
        OutputFormat::Json => {
            let output: Vec<_> = items.iter().take(args.limit).collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Compact => {
            for item in items.iter().take(args.limit) {
                println!("{}", item.url);
            }
        }
    }

    Ok(())
}
