use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use budgetwise::cli::{handle_analyze_command, handle_format_command, AnalyzeArgs, FormatArgs};
use budgetwise::config::{paths::BudgetPaths, settings::Settings};

/// Environment variable holding the log filter
const LOG_ENV: &str = "BUDGETWISE_LOG";

#[derive(Parser)]
#[command(
    name = "budgetwise",
    version,
    about = "Budget analysis with the 50/30/20 rule",
    long_about = "budgetwise totals income, expenses and savings from a ledger \
                  of budget entries and compares spending against the 50/30/20 \
                  rule: 50% needs, 30% wants, 20% savings."
)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a ledger file
    Analyze(AnalyzeArgs),

    /// Format an amount in a currency
    Format(FormatArgs),

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // BUDGETWISE_LOG > --verbose > warn
    let filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) if cli.verbose => EnvFilter::new("debug"),
        Err(_) => EnvFilter::new("warn"),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let paths = BudgetPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Analyze(args)) => handle_analyze_command(&settings, args)?,
        Some(Commands::Format(args)) => handle_format_command(&settings, args)?,
        Some(Commands::Config) => {
            println!("budgetwise Configuration");
            println!("========================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            if !paths.is_initialized() {
                println!("                (not written yet, using defaults)");
            }
            println!();
            println!("Settings:");
            println!("  Currency: {}", settings.currency_code);
            println!("  Needs:    {}", join(&settings.categories.needs));
            println!("  Wants:    {}", join(&settings.categories.wants));
            if let Some(legacy) = &settings.categories.legacy_savings_category {
                println!("  Legacy savings category: {}", legacy);
            }
            println!(
                "  Reconnect: {}ms initial, {}ms max",
                settings.sync.initial_retry_ms, settings.sync.max_retry_ms
            );
        }
        None => {
            println!("budgetwise - 50/30/20 budget analysis");
            println!();
            println!("Run 'budgetwise --help' for usage information.");
        }
    }

    Ok(())
}

fn join<'a>(names: impl IntoIterator<Item = &'a String>) -> String {
    names
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
