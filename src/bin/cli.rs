//! Hoops Edge CLI - command-line interface for NBA edge scans

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use hoops_edge::config::{PipelineConfig, DEFAULT_BOOKS, OUTPUT_DIR, SUPPORTED_BOOKS};
use hoops_edge::core::{
    devig_american, to_american_odds, to_decimal_odds, to_implied_probability, GameProjector,
    KellyStaker, MarketRanker, RiskClassifier,
};
use hoops_edge::data::{
    parse_replay_arg, Conference, LiveOddsSupplier, OddsSupplier, ReplayOddsSupplier,
};
use hoops_edge::models::{EdgeRecord, PricingMode, RiskTier};
use hoops_edge::predictor::{team_card, FallbackModel};
use hoops_edge::report::{market_label, ReportWriter, ScanReport};

#[derive(Parser)]
#[command(name = "hoops-edge")]
#[command(author, version, about = "NBA betting edge scanner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a slate: price every market, rank edges, write report sheets
    Scan {
        /// Slate date (YYYY-MM-DD, default: today UTC)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Conference filter (east, west, all)
        #[arg(long, default_value = "all")]
        conf: Conference,

        /// Comma separated list of books (DK, FD)
        #[arg(long)]
        books: Option<String>,

        /// Replay fixture, e.g. odds=path.json
        #[arg(long)]
        replay: Option<String>,

        /// Pipeline config JSON (risk thresholds, Kelly limits, line sensitivity)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory for the report sheets
        #[arg(long, default_value = OUTPUT_DIR)]
        output_dir: PathBuf,

        /// Number of ranked markets to print
        #[arg(long, default_value = "20")]
        top: usize,
    },

    /// Price one probability market from its posted odds
    Price {
        /// American odds of every outcome, in order (repeat the flag)
        #[arg(long = "odds", required = true, allow_hyphen_values = true)]
        odds: Vec<i32>,

        /// Model probability of the selected outcome
        #[arg(long)]
        model_prob: f64,

        /// Index of the selected outcome in --odds
        #[arg(long, default_value = "0")]
        side_index: usize,

        /// Pipeline config JSON
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Convert between American odds and probability
    Odds {
        /// American odds to convert
        #[arg(long, allow_hyphen_values = true, conflicts_with = "probability")]
        american: Option<i32>,

        /// Probability to convert
        #[arg(long)]
        probability: Option<f64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    println!("{}", format!("Hoops Edge CLI v{}", env!("CARGO_PKG_VERSION")).cyan().bold());
    println!();

    match cli.command {
        Commands::Scan {
            date,
            conf,
            books,
            replay,
            config,
            output_dir,
            top,
        } => {
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            run_scan(
                date,
                conf,
                books.as_deref(),
                replay.as_deref(),
                config.as_deref(),
                &output_dir,
                top,
            )?;
        }
        Commands::Price {
            odds,
            model_prob,
            side_index,
            config,
        } => {
            price_market(&odds, model_prob, side_index, config.as_deref())?;
        }
        Commands::Odds {
            american,
            probability,
        } => {
            convert_odds(american, probability)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load config from {:?}", path)),
        None => Ok(PipelineConfig::default()),
    }
}

/// Parse `--books`, falling back to the default book list
fn parse_books(value: Option<&str>) -> Result<Vec<String>> {
    let books: Vec<String> = value
        .unwrap_or_default()
        .split(',')
        .map(|b| b.trim().to_uppercase())
        .filter(|b| !b.is_empty())
        .collect();

    if books.is_empty() {
        return Ok(DEFAULT_BOOKS.iter().map(|b| b.to_string()).collect());
    }
    if let Some(book) = books.iter().find(|b| !SUPPORTED_BOOKS.contains(&b.as_str())) {
        bail!(
            "Unsupported book '{}' (supported: {})",
            book,
            SUPPORTED_BOOKS.join(", ")
        );
    }
    Ok(books)
}

fn run_scan(
    date: NaiveDate,
    conference: Conference,
    books: Option<&str>,
    replay: Option<&str>,
    config_path: Option<&Path>,
    output_dir: &Path,
    top: usize,
) -> Result<()> {
    let books = parse_books(books)?;
    let config = load_config(config_path)?;

    println!(
        "{}: {} / {} / {}",
        "Scanning".green(),
        date,
        conference,
        books.join(",")
    );

    let supplier: Box<dyn OddsSupplier> = match replay {
        Some(arg) => Box::new(ReplayOddsSupplier::new(parse_replay_arg(arg)?)),
        None => Box::new(LiveOddsSupplier),
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("Invalid spinner template")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Loading odds...");

    let games = supplier
        .fetch(date, &books)
        .with_context(|| format!("Failed to fetch {} odds for {}", supplier.name(), date))?;
    let games: Vec<_> = games
        .into_iter()
        .filter(|g| conference.includes_game(&g.home, &g.away))
        .collect();

    if games.is_empty() {
        pb.finish_and_clear();
        println!("{}", "No games found for the selected filters.".yellow());
        return Ok(());
    }

    pb.set_message("Pricing markets...");
    let model = FallbackModel::new();
    let estimates = model.estimates(&games);
    let markets: Vec<_> = games.iter().flat_map(|g| g.markets.iter().cloned()).collect();
    let batch = MarketRanker::new(config)
        .rank(&markets, &estimates)
        .context("Ranking failed")?;
    let summaries = GameProjector.project_all(&games, &estimates, &batch);
    pb.finish_and_clear();

    let matchups: HashMap<&str, String> = games
        .iter()
        .map(|g| (g.game_id.as_str(), g.matchup()))
        .collect();
    print_ranked(&batch.records, &matchups, top);

    if !batch.skipped.is_empty() {
        println!(
            "{}",
            format!(
                "{} markets skipped (run with RUST_LOG=warn for details)",
                batch.skipped.len()
            )
            .dimmed()
        );
    }

    let team_cards: HashMap<String, String> = games
        .iter()
        .flat_map(|g| [g.home.clone(), g.away.clone()])
        .map(|team| {
            let card = team_card(&team);
            (team, card)
        })
        .collect();
    let pulled_at = Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();

    let report = ScanReport {
        date,
        conference,
        books: &books,
        source: supplier.name(),
        pulled_at: &pulled_at,
        games: &games,
        summaries: &summaries,
        batch: &batch,
        team_cards: &team_cards,
    };
    let writer = ReportWriter::new(output_dir);
    let paths = writer
        .write(&report)
        .with_context(|| format!("Failed to write reports to {:?}", output_dir))?;

    let (low, med, high) = batch.risk_counts();
    println!();
    println!(
        "{} {} games, {} bets (Low: {} | Med: {} | High: {})",
        "Done:".green().bold(),
        games.len(),
        batch.records.len(),
        low,
        med,
        high
    );
    println!("{} {} sheets → {:?}", "Reports:".green(), paths.len(), writer.output_dir());

    Ok(())
}

fn risk_colored(risk: RiskTier) -> ColoredString {
    match risk {
        RiskTier::Low => risk.label().green(),
        RiskTier::Med => risk.label().yellow(),
        RiskTier::High => risk.label().red(),
    }
}

fn print_ranked(records: &[EdgeRecord], matchups: &HashMap<&str, String>, top: usize) {
    println!("{}", "Ranked markets:".yellow().bold());
    println!(
        "{:>4} {:<32} {:<10} {:<24} {:<4} {:>7} {:>8} {:>8} {:>7} {:>5}",
        "#", "Matchup", "Market", "Selection", "Book", "Price", "Diff", "Edge", "Kelly", "Risk"
    );
    println!("{}", "-".repeat(120));

    for (i, record) in records.iter().take(top).enumerate() {
        let matchup = matchups
            .get(record.market.game_id.as_str())
            .cloned()
            .unwrap_or_else(|| record.market.game_id.clone());
        let selection = match &record.market.player {
            Some(player) => format!("{} {}", player, record.side.label()),
            None => record.side.label().to_string(),
        };
        let diff = match record.market.market_type.pricing_mode() {
            PricingMode::Line => format!("{:.2}", record.diff),
            PricingMode::Probability => format!("{:.1}%", record.diff * 100.0),
        };
        let edge = format!("{:+.1}%", record.edge * 100.0);
        let edge = if record.edge > 0.0 { edge.green() } else { edge.normal() };

        println!(
            "{:>4} {:<32} {:<10} {:<24} {:<4} {:>7} {:>8} {:>8} {:>6.2}% {:>5}",
            i + 1,
            truncate_name(&matchup, 32),
            market_label(record),
            truncate_name(&selection, 24),
            record.book,
            record.american,
            diff,
            edge,
            record.kelly_pct,
            risk_colored(record.risk)
        );
    }

    if records.len() > top {
        println!("{}", format!("... {} more in the Picks sheets", records.len() - top).dimmed());
    }
}

fn price_market(
    odds: &[i32],
    model_prob: f64,
    side_index: usize,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    if side_index >= odds.len() {
        bail!("--side-index {} is out of range for {} prices", side_index, odds.len());
    }
    if !(model_prob > 0.0 && model_prob < 1.0) {
        bail!("--model-prob must lie strictly between 0 and 1, got {}", model_prob);
    }

    let (implied, devigged) = devig_american(odds).context("Failed to de-vig prices")?;

    println!("{}", "Market:".yellow().bold());
    println!("{:>6} {:>8} {:>10} {:>10} {:>8}", "Side", "Price", "Implied", "De-vig", "Fair");
    println!("{}", "-".repeat(48));
    for (i, (&price, (imp, fair))) in odds.iter().zip(implied.iter().zip(&devigged)).enumerate() {
        let fair_odds = to_american_odds(*fair)?;
        let line = format!(
            "{:>6} {:>8} {:>9.2}% {:>9.2}% {:>8}",
            i, price, imp * 100.0, fair * 100.0, fair_odds
        );
        if i == side_index {
            println!("{}", line.bold());
        } else {
            println!("{}", line);
        }
    }
    println!();

    let book_prob = devigged[side_index];
    let edge = model_prob - book_prob;
    let risk = RiskClassifier::new(config.risk).classify(PricingMode::Probability, edge.abs());
    let sizing = KellyStaker::new(config.kelly)
        .size(model_prob, odds[side_index])
        .context("Failed to size stake")?;

    println!("{:<14} {:.2}%", "Model:", model_prob * 100.0);
    println!("{:<14} {:.2}%", "Book (de-vig):", book_prob * 100.0);
    println!("{:<14} {:+.2}%", "Edge:", edge * 100.0);
    println!("{:<14} {:.3}", "EV per unit:", sizing.expected_value);
    println!("{:<14} {:.2}%", "Kelly:", sizing.stake_pct);
    println!("{:<14} {}", "Risk:", risk_colored(risk));

    Ok(())
}

fn convert_odds(american: Option<i32>, probability: Option<f64>) -> Result<()> {
    match (american, probability) {
        (Some(odds), _) => {
            let implied = to_implied_probability(odds)?;
            let decimal = to_decimal_odds(odds)?;
            println!("{:<12} {}", "American:", odds);
            println!("{:<12} {:.4}", "Implied:", implied);
            println!("{:<12} {:.3}", "Decimal:", decimal);
        }
        (None, Some(p)) => {
            let odds = to_american_odds(p)?;
            println!("{:<12} {:.4}", "Probability:", p);
            println!("{:<12} {}", "American:", odds);
            println!("{:<12} {:.3}", "Decimal:", to_decimal_odds(odds)?);
        }
        (None, None) => bail!("Pass --american or --probability"),
    }
    Ok(())
}

/// Truncate name to fit display width
fn truncate_name(name: &str, max_len: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_len {
        name.to_string()
    } else {
        chars[..max_len - 1].iter().collect::<String>() + "…"
    }
}
