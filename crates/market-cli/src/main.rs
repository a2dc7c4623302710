use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use finnhub_client::FinnhubConfig;
use market_aggregator::{parse_earnings_lookahead, Aggregator, DEFAULT_EARNINGS_LOOKAHEAD_DAYS};
use market_store::MarketStore;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod report;

use cli::{Cli, Commands, NewsArgs, OutputFormat, WatchlistAction};

fn preprocess() {
    dotenvy::dotenv().ok();

    // stdout is reserved for command output
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());

    if json_logging {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    preprocess();
    let cli = Cli::parse();
    tracing::debug!("Command line input recorded: {cli:?}");

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        // "> market check MSFT"
        Commands::Check(args) => {
            let overview = aggregator()?.check_stock(&args.symbol).await?;
            emit(args.format, &overview, report::render_overview)?;
        }

        // "> market indicators MSFT --format json"
        Commands::Indicators(args) => {
            let indicators = aggregator()?.indicators(&args.symbol).await?;
            emit(args.format, &indicators, report::render_indicators)?;
        }

        // "> market news MSFT --days 7 --save"
        Commands::News(args) => news(args).await?,

        // "> market watchlist [add|remove|list]"
        Commands::Watchlist { action } => {
            let store = store().await?;
            match action {
                WatchlistAction::Add { name } => {
                    let entry = store.add_to_watchlist(&name).await?;
                    println!("{} {}", "Added".green(), entry.company_name);
                }
                WatchlistAction::Remove { name } => {
                    if !store.remove_from_watchlist(&name).await? {
                        anyhow::bail!("{} is not on the watchlist", name.trim());
                    }
                    println!("{} {}", "Removed".green(), name.trim());
                }
                WatchlistAction::List => {
                    let entries = store.list_watchlist().await?;
                    print!("{}", report::render_watchlist(&entries));
                }
            }
        }
    }

    Ok(())
}

async fn news(args: NewsArgs) -> Result<()> {
    let symbol = market_core::normalize_symbol(&args.symbol)?;
    let articles = aggregator()?.company_news(&symbol, args.days).await?;

    emit(args.format, &articles, |a| report::render_news(&symbol, a))?;

    if args.save {
        let company = args.company.as_deref().unwrap_or(&symbol);
        let inserted = store().await?.insert_news(company, &articles).await?;
        eprintln!(
            "{} {} new of {} articles under \"{}\"",
            "Saved".green(),
            inserted,
            articles.len(),
            company.trim()
        );
    }

    Ok(())
}

fn emit<T: Serialize>(format: OutputFormat, value: &T, render: impl Fn(&T) -> String) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Table => print!("{}", render(value)),
    }
    Ok(())
}

fn aggregator() -> Result<Aggregator> {
    let config = FinnhubConfig::from_env()?;
    let lookahead = match std::env::var("EARNINGS_LOOKAHEAD_DAYS") {
        Ok(raw) if !raw.trim().is_empty() => parse_earnings_lookahead(&raw)?,
        _ => DEFAULT_EARNINGS_LOOKAHEAD_DAYS,
    };
    Ok(Aggregator::finnhub(config).with_earnings_lookahead(lookahead))
}

async fn store() -> Result<MarketStore> {
    let url = std::env::var("DATABASE_URL")
        .ok()
        .filter(|u| !u.trim().is_empty())
        .context("DATABASE_URL not set. Export it or put it in a .env file.")?;
    MarketStore::connect(&url).await
}
