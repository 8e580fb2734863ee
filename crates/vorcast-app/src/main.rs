// vorcast entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (log to file, not terminal)
// 3. Load config, copying defaults on first run
// 4. Load the player pool and drafted set, check pool quality
// 5. Run one valuation pass
// 6. Print the board (table or JSON)

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

use vorcast_core::config::{self, Config};
use vorcast_core::player::Position;
use vorcast_core::projections;
use vorcast_core::validate::validate_pool;
use vorcast_core::valuation::enhanced::{rankings_for_position, EnhancedVor};
use vorcast_core::valuation::scarcity::ScarcitySeverity;
use vorcast_core::valuation::{run_pass, ValuationPass};

/// Pools smaller than this are probably a truncated export.
const MIN_POOL_SIZE: usize = 150;

#[derive(Parser, Debug)]
#[command(name = "vorcast")]
#[command(about = "Scarcity-aware VOR rankings for a live fantasy football draft")]
#[command(version)]
struct Args {
    /// Project root holding defaults/ and config/
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    /// Player pool (JSON or CSV); overrides data_paths.players
    #[arg(short, long)]
    players: Option<PathBuf>,

    /// Drafted player key (repeatable)
    #[arg(short, long = "drafted", value_name = "ID")]
    drafted: Vec<String>,

    /// File of drafted player keys, one per line; overrides data_paths.drafted
    #[arg(long)]
    drafted_file: Option<PathBuf>,

    /// Only show this position (QB, RB, WR, TE, K, DST)
    #[arg(long)]
    position: Option<String>,

    /// Number of ranked players to print
    #[arg(short = 'n', long, default_value_t = 25)]
    top: usize,

    /// Print the full pass as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing(&args.base_dir)?;
    info!("vorcast starting up");

    config::ensure_config_files(&args.base_dir).context("failed to prepare config files")?;
    let config =
        config::load_config_from(&args.base_dir).context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, {} teams",
        config.league.name, config.league.num_teams
    );

    let position = match args.position.as_deref() {
        Some(label) => match Position::from_str_pos(label) {
            Some(pos) => Some(pos),
            None => bail!("unknown position '{label}'"),
        },
        None => None,
    };

    let players_path = args
        .players
        .clone()
        .unwrap_or_else(|| resolve(&args.base_dir, &config.data_paths.players));
    let players = projections::load_players(&players_path)
        .with_context(|| format!("failed to load players from {}", players_path.display()))?;

    let report = validate_pool(&players, MIN_POOL_SIZE);
    for warning in &report.warnings {
        warn!("Player pool: {}", warning);
    }
    if !report.is_valid {
        bail!("player pool rejected: {}", report.errors.join("; "));
    }

    let drafted = load_drafted_set(&args, &config)?;
    let unknown = drafted
        .iter()
        .filter(|id| !players.iter().any(|p| &p.id == *id))
        .count();
    if unknown > 0 {
        warn!("{} drafted keys do not match any player", unknown);
    }

    let pass = run_pass(&players, &drafted, &config);

    if args.json {
        print_json(&pass)?;
    } else {
        print_board(&pass, position, args.top);
    }

    info!("vorcast done");
    Ok(())
}

/// Relative data paths are taken from the project root.
fn resolve(base_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn load_drafted_set(args: &Args, config: &Config) -> anyhow::Result<HashSet<String>> {
    let file = args.drafted_file.clone().or_else(|| {
        config
            .data_paths
            .drafted
            .as_deref()
            .map(|p| resolve(&args.base_dir, p))
    });

    let mut drafted = match file {
        Some(path) => projections::load_drafted(&path)
            .with_context(|| format!("failed to load drafted list {}", path.display()))?,
        None => HashSet::new(),
    };
    drafted.extend(args.drafted.iter().map(|id| id.trim().to_string()));
    Ok(drafted)
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pass: &'a ValuationPass,
}

fn print_json(pass: &ValuationPass) -> anyhow::Result<()> {
    let report = JsonReport {
        generated_at: Utc::now(),
        pass,
    };
    let text = serde_json::to_string_pretty(&report).context("failed to serialize pass")?;
    println!("{text}");
    Ok(())
}

fn print_board(pass: &ValuationPass, position: Option<Position>, top: usize) {
    let mut rows: Vec<&EnhancedVor> = match position {
        Some(p) => rankings_for_position(&pass.rankings, p),
        None => pass.rankings.iter().collect(),
    };
    rows.truncate(top);

    println!(
        "{:>4} {:>4}  {:<24} {:<4} {:>7} {:>7} {:>7} {:>8} {:>8} {:>7}",
        "RANK", "POS", "NAME", "", "BASE", "RISK", "SCHED", "SCARCITY", "ENHANCED", "ADP+/-"
    );
    for r in &rows {
        println!(
            "{:>4} {:>4}  {:<24} {:<4} {:>7.1} {:>+7.1} {:>+7.1} {:>8.1} {:>8.1} {:>+7.1}",
            r.overall_rank,
            r.position_rank,
            truncate(&r.name, 24),
            r.position.display_str(),
            r.base_vor,
            r.risk_adjustment,
            r.schedule_adjustment,
            r.scarcity_premium,
            r.enhanced_vor,
            r.adp_diff,
        );
    }
    if rows.is_empty() {
        println!("(no undrafted players)");
    }

    println!();
    println!("Scarcity:");
    for premium in &pass.premiums {
        if position.is_some_and(|p| premium.position != p) {
            continue;
        }
        let supply = pass.supplies.iter().find(|s| s.position == premium.position);
        let (t1, t2, left) = supply
            .map(|s| (s.tier1_remaining, s.tier2_remaining, s.remaining_count))
            .unwrap_or_default();
        println!(
            "  {:<4} {:<9} +{:<6.1} tier1 {:>3}  tier2 {:>3}  left {:>4}",
            premium.position.display_str(),
            premium.severity.label(),
            premium.premium,
            t1,
            t2,
            left
        );
        if premium.severity >= ScarcitySeverity::High {
            if let Some(message) = &premium.message {
                println!("       {message}");
            }
        }
    }

    let alerts: Vec<_> = pass
        .alerts
        .iter()
        .filter(|a| position.map_or(true, |p| a.position == p))
        .collect();
    if !alerts.is_empty() {
        println!();
        println!("Drop-off alerts:");
        for alert in alerts {
            println!(
                "  [{}] {} {} tier: {:.1} -> {:.1} ({:.1} pts), {} picks left",
                alert.severity.label(),
                alert.position.display_str(),
                alert.upper_tier.label(),
                alert.current_tier_avg_vor,
                alert.next_tier_avg_vor,
                alert.drop_off_points,
                alert.picks_until_drop
            );
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}~")
    }
}

/// Initialize tracing to log to a file so stdout stays clean for the board.
fn init_tracing(base_dir: &Path) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = base_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("vorcast.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vorcast=info,vorcast_core=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
