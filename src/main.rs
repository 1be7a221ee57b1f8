use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use soldash::core::HistoryRange;
use soldash::core::log::init_logging;
use soldash::core::table::SortColumn;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ViewArgs {
    /// Only show tokens whose name or symbol contains this text
    #[arg(short, long)]
    filter: Option<String>,

    /// Column to sort by: name, symbol, price, volume, change24h, change7d, mc, liquidity
    #[arg(short, long)]
    sort: Option<SortColumn>,

    /// Sort ascending instead of descending
    #[arg(long)]
    asc: bool,

    /// Page of the token table to show
    #[arg(short, long, default_value_t = 1)]
    page: usize,

    /// Include USDT, USDC and SOL
    #[arg(long)]
    show_stablecoins: bool,

    /// Ignore the cache and fetch fresh data
    #[arg(short, long)]
    refresh: bool,
}

impl From<ViewArgs> for soldash::ViewOptions {
    fn from(args: ViewArgs) -> soldash::ViewOptions {
        soldash::ViewOptions {
            filter: args.filter,
            sort: args.sort,
            ascending: args.asc,
            page: args.page,
            show_stablecoins: args.show_stablecoins,
            force_refresh: args.refresh,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the token dashboard once
    Show(ViewArgs),
    /// Display a live dashboard that refreshes periodically
    Watch(ViewArgs),
    /// Display token details and price history
    Token {
        /// Token addresses or symbols
        #[arg(required = true)]
        addresses: Vec<String>,

        /// Price history range: 1d, 7d or 30d
        #[arg(short, long, default_value_t = HistoryRange::SevenDays)]
        range: HistoryRange,
    },
}

impl From<Commands> for soldash::AppCommand {
    fn from(cmd: Commands) -> soldash::AppCommand {
        match cmd {
            Commands::Show(args) => soldash::AppCommand::Show(args.into()),
            Commands::Watch(args) => soldash::AppCommand::Watch(args.into()),
            Commands::Token { addresses, range } => {
                soldash::AppCommand::Token { addresses, range }
            }
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => soldash::cli::setup::setup(),
        Some(cmd) => soldash::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
