use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "market", version, about = "Consolidated stock lookups from Finnhub", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Quote, profile, metrics, analyst trend, earnings and peers for one ticker.
    Check(SymbolArgs),

    /// Derived indicators (enterprise value, free cash flow, RSI, ...) for one ticker.
    Indicators(SymbolArgs),

    /// Recent company news, optionally stored in the database.
    News(NewsArgs),

    /// Manage the list of companies tracked for news.
    Watchlist {
        #[command(subcommand)]
        action: WatchlistAction,
    },
}

#[derive(Args, Debug)]
pub struct SymbolArgs {
    /// Ticker symbol, e.g. MSFT
    pub symbol: String,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct NewsArgs {
    /// Ticker symbol, e.g. MSFT
    pub symbol: String,

    /// How many days back to look
    #[arg(short, long, default_value_t = 7, value_parser = clap::value_parser!(i64).range(1..=365))]
    pub days: i64,

    /// Store the articles (requires DATABASE_URL)
    #[arg(long)]
    pub save: bool,

    /// Company name to store the articles under; defaults to the symbol
    #[arg(long)]
    pub company: Option<String>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum WatchlistAction {
    /// Add a company
    Add { name: String },
    /// Remove a company
    Remove { name: String },
    /// Show all tracked companies
    List,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_defaults_to_table() {
        let cli = Cli::try_parse_from(["market", "check", "msft"]).unwrap();
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.symbol, "msft");
                assert_eq!(args.format, OutputFormat::Table);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_indicators_json() {
        let cli = Cli::try_parse_from(["market", "indicators", "AAPL", "--format", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Indicators(SymbolArgs { format: OutputFormat::Json, .. })
        ));
    }

    #[test]
    fn test_parse_news_options() {
        let cli = Cli::try_parse_from([
            "market", "news", "AAPL", "--days", "30", "--save", "--company", "Apple Inc",
        ])
        .unwrap();
        match cli.command {
            Commands::News(args) => {
                assert_eq!(args.days, 30);
                assert!(args.save);
                assert_eq!(args.company.as_deref(), Some("Apple Inc"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_news_days_out_of_range() {
        assert!(Cli::try_parse_from(["market", "news", "AAPL", "--days", "0"]).is_err());
    }

    #[test]
    fn test_parse_watchlist_actions() {
        let cli = Cli::try_parse_from(["market", "watchlist", "add", "Apple Inc"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Watchlist { action: WatchlistAction::Add { ref name } } if name == "Apple Inc"
        ));

        let cli = Cli::try_parse_from(["market", "watchlist", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Watchlist { action: WatchlistAction::List }
        ));
    }

    #[test]
    fn test_missing_symbol_is_an_error() {
        assert!(Cli::try_parse_from(["market", "check"]).is_err());
    }
}
