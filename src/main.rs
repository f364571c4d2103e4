//! Memecoin Scout
//!
//! Scores freshly listed DEX pairs on liquidity, momentum, volume, age and
//! social buzz, and paper-trades the resulting signals on a simulated ledger.

mod api;
mod models;
mod scanner;
mod scoring;
mod trading;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::api::{pairs_from_json, DexScreenerClient, DEXSCREENER_API_BASE};
use crate::models::{AnalysisResult, PairData};
use crate::scanner::{Scanner, ScannerConfig};
use crate::scoring::{ScoringEngine, SOCIAL_KEYWORDS};
use crate::trading::{LedgerConfig, PortfolioLedger, PositionSizer};

/// DEX pair scoring and paper-trading CLI.
#[derive(Parser)]
#[command(name = "memescout")]
#[command(about = "Score new DEX pairs and paper-trade the signals", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// DexScreener API base URL (defaults to the public API)
    #[arg(long, env = "MEMESCOUT_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score pairs from a JSON file (search response or array of pairs)
    Analyze {
        /// Path to the JSON file
        #[arg(short, long)]
        file: String,

        /// Show the full analysis of one symbol instead of the ranking
        #[arg(short, long)]
        symbol: Option<String>,
    },

    /// Fetch and score live pairs
    Scan {
        /// Score volume-ranked pairs instead of new listings
        #[arg(long)]
        trending: bool,

        /// Maximum number of new pairs to fetch
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Start paper trading (simulated, no real orders)
    Paper {
        /// Initial capital for simulation
        #[arg(short, long, env = "MEMESCOUT_CAPITAL", default_value = "1000")]
        capital: f64,

        /// Fraction of cash risked per trade
        #[arg(short, long, env = "MEMESCOUT_RISK_PER_TRADE", default_value = "0.02")]
        risk: f64,

        /// Polling interval in seconds
        #[arg(short, long, default_value = "60")]
        interval: u64,

        /// Trade volume-ranked pairs instead of new listings
        #[arg(long)]
        trending: bool,

        /// Run a single poll and exit
        #[arg(long)]
        once: bool,
    },

    /// Compute a risk-based position size
    Size {
        /// Available cash
        #[arg(short, long, env = "MEMESCOUT_CAPITAL", default_value = "1000")]
        capital: f64,

        /// Fraction of cash risked per trade
        #[arg(short, long, env = "MEMESCOUT_RISK_PER_TRADE", default_value = "0.02")]
        risk: f64,

        /// Entry price
        #[arg(short, long)]
        price: f64,

        /// Stop-loss price
        #[arg(short, long)]
        stop_loss: f64,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let engine = ScoringEngine::new();

    match cli.command {
        Commands::Analyze { file, symbol } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file))?;
            let pairs = pairs_from_json(&json)?;

            info!(file = %file, count = pairs.len(), "Scoring pairs from file");

            match symbol {
                Some(symbol) => {
                    let pair = pairs
                        .iter()
                        .find(|p| p.symbol().is_some_and(|s| s.eq_ignore_ascii_case(&symbol)))
                        .with_context(|| format!("No pair with symbol {} in {}", symbol, file))?;
                    print_analysis(pair, &engine.analyze(pair));
                }
                None => print_rankings(&engine, &pairs),
            }
        }

        Commands::Scan { trending, limit } => {
            let client = dex_client(cli.api_url)?;

            let fetched = if trending {
                client.get_trending_pairs().await
            } else {
                client.get_new_pairs(limit).await
            };

            let pairs = fetched.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to fetch pairs");
                Vec::new()
            });

            if pairs.is_empty() {
                println!("No pairs returned.");
                return Ok(());
            }

            print_rankings(&engine, &pairs);
        }

        Commands::Paper {
            capital,
            risk,
            interval,
            trending,
            once,
        } => {
            let ledger_config = LedgerConfig::new(
                Decimal::try_from(capital)?,
                Decimal::try_from(risk)?,
            );
            let scanner_config = ScannerConfig {
                poll_interval_secs: interval,
                trending,
                ..Default::default()
            };

            info!(
                capital = capital,
                risk = risk,
                interval = interval,
                "Starting paper trading"
            );

            let client = dex_client(cli.api_url)?;

            println!("\n=== Paper Trading Mode ===");
            println!("Capital: ${}", capital);
            println!("Risk per trade: {}%", risk * 100.0);
            println!("Polling interval: {}s", interval);
            println!(
                "Source: {} ({})",
                if trending { "trending pairs" } else { "new pairs" },
                client.base_url()
            );
            println!("\nThis is SIMULATED trading - no real money involved.");
            println!("Press Ctrl+C to stop.\n");

            let mut scanner = Scanner::new(scanner_config, ledger_config);
            scanner.run(&client, once).await?;

            print_positions(scanner.ledger());
            print_trades(scanner.ledger(), 10);
            println!("{}", scanner.ledger().summary());
        }

        Commands::Size {
            capital,
            risk,
            price,
            stop_loss,
        } => {
            let ledger = PortfolioLedger::new(LedgerConfig::new(
                Decimal::try_from(capital)?,
                Decimal::try_from(risk)?,
            ));
            let price = Decimal::try_from(price)?;
            let stop_loss = Decimal::try_from(stop_loss)?;

            let shares = ledger.size_position("-", price, stop_loss);
            if shares.is_zero() {
                println!("No trade: stop loss equals entry price or price is not positive.");
            } else {
                println!("Shares:        {:.6}", shares);
                let distance = price.saturating_sub(stop_loss).abs();
                println!("Position cost: ${:.2}", shares.saturating_mul(price));
                println!("Max loss:      ${:.2}", shares.saturating_mul(distance));
            }
        }

        Commands::Config => {
            let ledger = LedgerConfig::default();
            let sizer = PositionSizer::new(ledger.risk_per_trade);
            let scanner = ScannerConfig::default();
            let weights = engine.weights();

            println!("\n=== Scoring ===\n");
            println!("Weights:");
            println!("  Liquidity:            {}%", weights.liquidity * dec!(100));
            println!("  Momentum:             {}%", weights.momentum * dec!(100));
            println!("  Volume:               {}%", weights.volume * dec!(100));
            println!("  Age:                  {}%", weights.age * dec!(100));
            println!("  Social:               {}%", weights.social * dec!(100));
            println!("  Total:                {}%", weights.total() * dec!(100));
            println!("  Social Keywords:      {}", SOCIAL_KEYWORDS.join(", "));
            println!("\nDecision:");
            println!("  BUY at or above:      {}", ScoringEngine::BUY_THRESHOLD);
            println!("  SELL at or below:     {}", ScoringEngine::SELL_THRESHOLD);

            println!("\n=== Ledger ===\n");
            println!("  Initial Cash:         ${}", ledger.initial_cash);
            println!("  Risk Per Trade:       {}%", sizer.risk_per_trade() * dec!(100));
            println!("  Max Single Position:  {}%", sizer.max_position_fraction() * dec!(100));

            println!("\n=== Scanner ===\n");
            println!("  Stop Loss:            {}%", scanner.stop_loss_pct * dec!(100));
            println!("  Take Profit:          {}%", scanner.take_profit_pct * dec!(100));
            println!("  Max Pairs Per Poll:   {}", scanner.max_pairs);
            println!("  Poll Interval:        {}s", scanner.poll_interval_secs);
            println!(
                "  API Base URL:         {}",
                cli.api_url.as_deref().unwrap_or(DEXSCREENER_API_BASE)
            );
        }
    }

    Ok(())
}

/// Build the API client, using the public endpoint unless overridden.
fn dex_client(api_url: Option<String>) -> Result<DexScreenerClient> {
    match api_url {
        Some(url) => DexScreenerClient::with_base_url(url),
        None => DexScreenerClient::new(),
    }
}

/// Print one pair's analysis with every reason on its own line.
fn print_analysis(pair: &PairData, analysis: &AnalysisResult) {
    println!("\n=== {} ===\n", pair.display_name());
    println!("Score:       {:.3}", analysis.score);
    println!("Decision:    {}", analysis.decision);
    println!("Confidence:  {:.3}", analysis.confidence);
    if analysis.reasons.is_empty() {
        println!("Reasons:     none");
    } else {
        println!("Reasons:");
        for reason in &analysis.reasons {
            println!("  - {}", reason);
        }
    }
}

/// Print pairs ranked by score.
fn print_rankings(engine: &ScoringEngine, pairs: &[PairData]) {
    let ranked = engine.rank(pairs, Utc::now());

    println!(
        "\n{:<28} {:<10} {:>7} {:>8}  {}",
        "PAIR", "CHAIN", "SCORE", "SIGNAL", "REASONS"
    );
    println!("{}", "-".repeat(96));

    for (pair, analysis) in ranked {
        println!(
            "{:<28} {:<10} {:>7.3} {:>8}  {}",
            truncate(&pair.display_name(), 26),
            truncate(pair.chain_id.as_deref().unwrap_or("-"), 10),
            analysis.score,
            analysis.decision,
            analysis.reasons.join("; ")
        );
    }
}

/// Print open ledger positions.
fn print_positions(ledger: &PortfolioLedger) {
    let portfolio = ledger.portfolio();
    if portfolio.position_count() == 0 {
        return;
    }

    println!(
        "\n--- Open Positions ({}) | Cash: ${:.2} ---",
        portfolio.position_count(),
        ledger.cash()
    );
    for (symbol, pos) in portfolio.positions() {
        println!(
            "  {:<12} {:>16.4} @ ${:.8} (opened {})",
            truncate(symbol, 12),
            pos.shares,
            pos.cost_basis,
            pos.entry_time.format("%Y-%m-%d %H:%M")
        );
    }
}

/// Print the most recent paper trades, newest last.
fn print_trades(ledger: &PortfolioLedger, limit: usize) {
    let history = ledger.trade_history();
    if history.is_empty() {
        return;
    }

    println!("\n--- Recent Trades ({} of {}) ---", limit.min(history.len()), history.len());
    for trade in history.iter().skip(history.len().saturating_sub(limit)) {
        println!(
            "  {} {:<4} {:<12} {:>16.4} @ ${:.8} = ${:.2}",
            trade.timestamp.format("%H:%M:%S"),
            trade.action.as_str(),
            truncate(&trade.symbol, 12),
            trade.shares,
            trade.price,
            trade.value
        );
    }
}

/// Truncate a string with ellipsis if too long.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
