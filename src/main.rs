use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use scidir_miner::config::{find_config_file, load_config, Config};
use scidir_miner::pipeline::{output_file_name, BatchRunner, LinkOutcome};
use scidir_miner::sources::{ElsevierSource, Source};
use scidir_miner::CitationRecord;
use scidir_miner::utils::{
    articles_table, citations_table, clean_text, is_terminal, save_article_table, CleanOptions,
    TsvCitationSink,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Mine ScienceDirect articles and Scopus citation counts into TSV tables
#[derive(Parser, Debug)]
#[command(name = "scidir-miner")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Mine ScienceDirect articles and Scopus citation counts into TSV tables", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search, fetch every open-access result, clean it and write a TSV table
    Mine {
        /// Search query string
        #[arg(long, short = 'Q')]
        query: String,

        /// Number of search results to request
        #[arg(long, short = 'n', default_value_t = 5000)]
        count: usize,

        /// Output file (default: <query>_<count>.tsv)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Keep stopwords
        #[arg(long)]
        keep_stopwords: bool,

        /// Do not stem tokens
        #[arg(long)]
        no_stem: bool,

        /// Print a summary table when done
        #[arg(long)]
        summary: bool,
    },

    /// Look up citation data for PubMed identifiers in batches of up to 25
    Citations {
        /// Whitespace-separated file of PubMed identifiers
        #[arg(long, short)]
        input: PathBuf,

        /// Append-only TSV log
        #[arg(long, short, default_value = "citations.tsv")]
        output: PathBuf,

        /// Identifiers per request (max 25)
        #[arg(long)]
        batch_size: Option<usize>,

        /// Print the resolved records when done
        #[arg(long)]
        summary: bool,
    },

    /// Print the citation count for a single PubMed identifier
    CitedBy {
        /// PubMed identifier
        pmid: String,
    },

    /// Fetch an article's plain text and print the cleaned tokens
    Text {
        /// Article link (e.g. https://api.elsevier.com/content/article/pii/...)
        link: String,

        /// Only lowercase and drop links, digits and punctuation
        #[arg(long)]
        basic: bool,
    },

    /// Print the effective configuration (API key redacted)
    Config,
}

fn progress_bar(len: u64, quiet: bool) -> ProgressBar {
    if quiet || !is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
    {
        bar.set_style(style);
    }
    bar
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("scidir_miner={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.clone().or_else(find_config_file);
    if let Some(path) = &config_path {
        tracing::debug!("Using config file: {}", path.display());
    }
    let mut config: Config =
        load_config(config_path.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Mine {
            query,
            count,
            output,
            keep_stopwords,
            no_stem,
            summary,
        } => {
            let source: Arc<dyn Source> = Arc::new(ElsevierSource::new(&config)?);
            let options = CleanOptions {
                lowercase: true,
                remove_stopwords: !keep_stopwords,
                stem: !no_stem,
            };
            let runner = BatchRunner::new(Arc::clone(&source)).with_options(options);

            let links = source
                .fetch_links(&query, count)
                .await
                .with_context(|| format!("Search for {:?} failed", query))?;

            let bar = progress_bar(links.len() as u64, cli.quiet);
            let table = runner
                .process_links(&links, |_, outcome| {
                    if outcome == LinkOutcome::Recorded {
                        bar.set_message("recorded");
                    }
                    bar.inc(1);
                })
                .await;
            bar.finish_and_clear();

            let path = output.unwrap_or_else(|| PathBuf::from(output_file_name(&query, count)));
            save_article_table(&table, &path)
                .with_context(|| format!("Failed to write {}", path.display()))?;

            if !cli.quiet {
                eprintln!(
                    "Wrote {} articles to {} ({} closed access, {} failed)",
                    table.len(),
                    path.display(),
                    table.skipped_closed,
                    table.failed
                );
            }
            if summary {
                println!("{}", articles_table(&table, 60));
            }
        }

        Commands::Citations {
            input,
            output,
            batch_size,
            summary,
        } => {
            if let Some(size) = batch_size {
                config.paging.batch_size = size;
                config.validate()?;
            }
            let source = ElsevierSource::new(&config)?;

            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let identifiers: Vec<String> =
                content.split_whitespace().map(str::to_string).collect();

            let log = TsvCitationSink::open_append(&output)
                .with_context(|| format!("Failed to open {}", output.display()))?;
            // the log gets each record as it resolves; the Vec keeps them for the summary
            let mut sink = (log, Vec::<CitationRecord>::new());
            let written = source.run_citation_batches(&identifiers, &mut sink).await?;

            if !cli.quiet {
                eprintln!(
                    "Resolved {} of {} identifiers into {}",
                    written,
                    identifiers.len(),
                    output.display()
                );
            }
            if summary {
                println!("{}", citations_table(&sink.1, 60));
            }
        }

        Commands::CitedBy { pmid } => {
            let source = ElsevierSource::new(&config)?;
            match source.cited_by(&pmid).await {
                Ok(count) => println!("{}", count),
                Err(e) => {
                    eprintln!("No citation count for PMID {}: {}", pmid, e);
                    println!("NaN");
                }
            }
        }

        Commands::Text { link, basic } => {
            let source = ElsevierSource::new(&config)?;
            let text = source
                .fetch_plain_text(&link)
                .await
                .with_context(|| format!("Failed to fetch {}", link))?;
            let options = if basic {
                CleanOptions::basic()
            } else {
                CleanOptions::default()
            };
            for token in clean_text(&text, &options) {
                println!("{}", token);
            }
        }

        Commands::Config => {
            print!("{}", config.to_redacted_toml()?);
        }
    }

    Ok(())
}
