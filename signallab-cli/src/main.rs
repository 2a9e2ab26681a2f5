//! SignalLab CLI — analysis, catalog and config commands.
//!
//! Commands:
//! - `analyze` — load prices, fetch external readings, generate signals, backtest
//! - `symbols` — list the symbol catalog
//! - `config init` / `config show` — write or print the session TOML

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use signallab_core::data::{CircuitBreaker, CsvProvider, DataProvider, YahooProvider};
use signallab_core::signals::ThresholdConfig;
use signallab_runner::config::DEFAULT_CONFIG_FILE;
use signallab_runner::{
    run_analysis, save_artifacts, AnalysisContext, AnalysisResult, Catalog, ReadingOverrides,
    SessionCache, SessionConfig, SourceSet,
};

const DEFAULT_START: &str = "2023-01-01";

#[derive(Parser)]
#[command(
    name = "signallab",
    about = "SignalLab — indicator and sentiment signal analysis for Indian markets"
)]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one analysis and print the overview, backtest and latest signals.
    Analyze(AnalyzeArgs),
    /// List the symbol catalog.
    Symbols,
    /// Session config commands.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args)]
struct AnalyzeArgs {
    /// Display name (e.g. "NIFTY 50") or ticker (e.g. ^NSEI, RELIANCE.NS).
    symbol: String,

    /// Start date (YYYY-MM-DD). Defaults to 2023-01-01.
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    end: Option<String>,

    /// Config file. Defaults to ./signallab.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read prices from `<DIR>/<SYMBOL>.csv` instead of Yahoo Finance.
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Fall back to synthetic prices when no data can be loaded.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// No network: external readings are unavailable unless overridden.
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Fixed AI sentiment score (0-100).
    #[arg(long)]
    ai: Option<u8>,

    /// Fixed volatility index reading.
    #[arg(long)]
    vix: Option<f64>,

    /// Fixed put/call ratio.
    #[arg(long)]
    pcr: Option<f64>,

    #[arg(long)]
    ai_threshold: Option<f64>,

    #[arg(long)]
    vix_threshold: Option<f64>,

    #[arg(long)]
    pcr_threshold: Option<f64>,

    /// Number of most recent rows to print.
    #[arg(long, default_value_t = 15)]
    tail: usize,

    /// Write signals.csv, result.json and report.md under this directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a config file with default values.
    Init {
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Print the effective config.
    Show {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Analyze(args) => run_analyze(args),
        Commands::Symbols => run_symbols(),
        Commands::Config { action } => match action {
            ConfigAction::Init { config, force } => run_config_init(&config, force),
            ConfigAction::Show { config } => run_config_show(config.as_deref()),
        },
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

/// Explicit path must exist; the default path is optional.
fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    match path {
        Some(p) => Ok(SessionConfig::from_file(p)?),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.exists() {
                Ok(SessionConfig::from_file(default)?)
            } else {
                Ok(SessionConfig::default())
            }
        }
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let start = parse_date(args.start.as_deref().unwrap_or(DEFAULT_START))?;
    let end = match args.end.as_deref() {
        Some(s) => parse_date(s)?,
        None => chrono::Local::now().date_naive(),
    };
    if start > end {
        bail!("--start {start} is after --end {end}");
    }
    if let Some(ai) = args.ai {
        if ai > 100 {
            bail!("--ai must be between 0 and 100");
        }
    }

    let base = load_config(args.config.as_deref())?;
    let thresholds = ThresholdConfig {
        ai_threshold: args.ai_threshold.unwrap_or(base.thresholds.ai_threshold),
        vix_threshold: args.vix_threshold.unwrap_or(base.thresholds.vix_threshold),
        pcr_threshold: args.pcr_threshold.unwrap_or(base.thresholds.pcr_threshold),
    };
    let config = base.with_thresholds(thresholds);
    config.validate()?;
    let session = SessionCache::new(config);

    let instrument = Catalog::default_india().resolve(&args.symbol);
    let ctx = AnalysisContext::new(&instrument, start, end)
        .with_config(session.config())
        .with_synthetic(args.synthetic);

    let provider: Option<Box<dyn DataProvider>> = match (&args.csv_dir, args.offline) {
        (Some(dir), _) => {
            let csv: Box<dyn DataProvider> = Box::new(CsvProvider::new(dir.as_path()));
            Some(csv)
        }
        (None, true) => None,
        (None, false) => {
            let breaker = Arc::new(CircuitBreaker::default_provider());
            let yahoo: Box<dyn DataProvider> = Box::new(YahooProvider::new(breaker)?);
            Some(yahoo)
        }
    };

    let sources = if args.offline {
        SourceSet::offline()
    } else {
        SourceSet::live(session.config())
    }
    .with_overrides(ReadingOverrides {
        ai_sentiment: args.ai,
        volatility_estimate: args.vix,
        put_call_ratio: args.pcr,
    });

    let result = run_analysis(&ctx, provider.as_deref(), sources.sources())?;
    let session = session.with_result(result);
    let Some(result) = session.last_result() else {
        bail!("analysis produced no result");
    };

    print_overview(result);
    print_backtest(result);
    print_tail(result, args.tail);

    if let Some(dir) = args.output_dir {
        let run_dir = save_artifacts(result, &dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

fn reading(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "N/A".to_string(),
    }
}

fn print_overview(result: &AnalysisResult) {
    let r = &result.readings;
    println!();
    println!("{}", result.summary);
    println!();
    println!("=== Market Overview: {} ({}) ===", result.context.subject, result.context.symbol);
    println!(
        "Price:          {:.2} ({:+.2}, {:+.2}%)",
        result.quote.last_price,
        result.quote.delta,
        result.quote.delta_pct() * 100.0
    );
    println!("AI Sentiment:   {}", reading(r.ai_sentiment.map(f64::from), 0));
    println!("VIX:            {}", reading(r.volatility_estimate, 2));
    println!("Put/Call Ratio: {}", reading(r.put_call_ratio, 2));
    if result.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    for warn in &result.warnings {
        println!("WARNING: {warn}");
    }
}

fn print_backtest(result: &AnalysisResult) {
    let m = &result.metrics;
    println!();
    println!("=== Backtest ===");
    println!("Bars:           {}", m.bars);
    println!(
        "Signals:        {} buy / {} sell / {} hold",
        m.buy_signals, m.sell_signals, m.hold_signals
    );
    println!("Cumulative:     {:.2}%", m.total_return * 100.0);
    println!("Buy & Hold:     {:.2}%", m.buy_hold_return * 100.0);
    println!("Excess:         {:+.2}%", m.excess_return * 100.0);
    println!("Max Drawdown:   {:.2}%", m.max_drawdown * 100.0);
    println!("Sharpe:         {:.3}", m.sharpe);
    println!("Exposure:       {:.1}%", m.exposure * 100.0);
    if !result.trusted {
        println!("NOTE: too few bars for a meaningful backtest");
    }
}

fn print_tail(result: &AnalysisResult, tail: usize) {
    if tail == 0 {
        return;
    }
    let bars = result.signaled.series().bars();
    let signals = result.signaled.signals();
    let strategy = result.backtest.strategy_growth();
    let buy_hold = result.backtest.buy_hold_growth();
    let from = bars.len().saturating_sub(tail);

    println!();
    println!(
        "{:<12} {:>12} {:<6} {:>4} {:>10} {:>10}",
        "Date", "Close", "Signal", "Pos", "Strategy", "Buy&Hold"
    );
    println!("{}", "-".repeat(59));
    for i in from..bars.len() {
        println!(
            "{:<12} {:>12.2} {:<6} {:>4} {:>10.4} {:>10.4}",
            bars[i].date.to_string(),
            bars[i].close,
            signals[i].as_str(),
            result.backtest.position[i],
            strategy[i],
            buy_hold[i]
        );
    }
    println!();
}

fn run_symbols() -> Result<()> {
    let catalog = Catalog::default_india();
    for category in catalog.category_names() {
        println!("{category}:");
        for inst in catalog.categories.get(category).into_iter().flatten() {
            println!("  {:<28} {}", inst.name, inst.ticker);
        }
    }
    Ok(())
}

fn run_config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (pass --force to overwrite)", path.display());
    }
    SessionConfig::default().write_file(path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn run_config_show(path: Option<&Path>) -> Result<()> {
    let mut config = load_config(path)?;
    if !config.gemini.api_key.is_empty() {
        config.gemini.api_key = "********".to_string();
    }
    print!("{}", config.to_toml()?);
    Ok(())
}
