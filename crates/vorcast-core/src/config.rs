// Configuration loading and parsing (league.toml, valuation.toml).

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::player::Position;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub valuation: ValuationConfig,
    pub data_paths: DataPaths,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    #[serde(default)]
    pub platform: String,
    pub num_teams: usize,
    #[serde(default)]
    pub scoring_type: String,
    /// Slot counts keyed by roster label ("QB", "RB", "FLEX", "BE", ...).
    pub roster: HashMap<String, usize>,
}

impl LeagueConfig {
    /// Starting slots per team that map onto `position`. Labels that are not
    /// concrete positions (FLEX, BE, IL) never count.
    pub fn slots_for(&self, position: Position) -> usize {
        roster_slots_for(&self.roster, position)
    }
}

/// Sum the roster slots whose label parses to `position`.
pub fn roster_slots_for(roster: &HashMap<String, usize>, position: Position) -> usize {
    roster
        .iter()
        .filter(|(key, _)| Position::from_str_pos(key) == Some(position))
        .map(|(_, &count)| count)
        .sum()
}

// ---------------------------------------------------------------------------
// valuation.toml structs
// ---------------------------------------------------------------------------

/// VOR cutoffs separating elite (tier 1), starter (tier 2) and replacement
/// (tier 3) players.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TierThresholds {
    pub tier1: f64,
    pub tier2: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        TierThresholds {
            tier1: 50.0,
            tier2: 25.0,
        }
    }
}

/// Premium multiplier per scarcity severity. `none` always contributes 0.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SeverityMultipliers {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for SeverityMultipliers {
    fn default() -> Self {
        SeverityMultipliers {
            low: 1.5,
            medium: 3.0,
            high: 5.0,
            critical: 8.0,
        }
    }
}

/// Everything the supply, scarcity and drop-off calculators consume.
#[derive(Debug, Clone, PartialEq)]
pub struct ScarcitySettings {
    pub tiers: TierThresholds,
    pub multipliers: SeverityMultipliers,
    /// Per-position premium weight. Unlisted positions weigh 1.0.
    pub position_weights: HashMap<Position, f64>,
    /// Average-VOR gap between adjacent tiers that raises a drop-off alert.
    pub drop_off_threshold: f64,
}

impl ScarcitySettings {
    pub fn weight_for(&self, position: Position) -> f64 {
        self.position_weights.get(&position).copied().unwrap_or(1.0)
    }
}

impl Default for ScarcitySettings {
    fn default() -> Self {
        ScarcitySettings {
            tiers: TierThresholds::default(),
            multipliers: SeverityMultipliers::default(),
            position_weights: default_position_weights(),
            drop_off_threshold: 25.0,
        }
    }
}

fn default_position_weights() -> HashMap<Position, f64> {
    HashMap::from([
        (Position::QB, 0.8),
        (Position::RB, 1.2),
        (Position::WR, 1.0),
        (Position::TE, 1.1),
        (Position::K, 0.3),
        (Position::DST, 0.3),
    ])
}

/// How strongly injury and consistency risk pull a player's VOR around.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    /// 0 = fully risk-averse, 1 = fully risk-seeking.
    pub tolerance: f64,
    pub injury_weight: f64,
    pub consistency_weight: f64,
    pub upside_weight: f64,
}

impl Default for RiskSettings {
    fn default() -> Self {
        RiskSettings {
            tolerance: 0.5,
            injury_weight: 0.3,
            consistency_weight: 0.2,
            upside_weight: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    pub enabled: bool,
    /// Multiplier applied to the raw schedule score.
    pub weight: f64,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        ScheduleSettings {
            enabled: true,
            weight: 1.0,
        }
    }
}

/// Raw deserialization target for the entire valuation.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ValuationFile {
    tiers: TierThresholds,
    severity_multipliers: SeverityMultipliers,
    /// Keyed by position label; parsed into `Position` during loading.
    #[serde(default)]
    position_weights: HashMap<String, f64>,
    drop_off: DropOffSection,
    #[serde(default)]
    risk: RiskSettings,
    #[serde(default)]
    schedule: ScheduleSettings,
    data_paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
struct DropOffSection {
    threshold: f64,
}

/// The public valuation config assembled from the valuation.toml sections.
#[derive(Debug, Clone, Default)]
pub struct ValuationConfig {
    pub scarcity: ScarcitySettings,
    pub risk: RiskSettings,
    pub schedule: ScheduleSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// Player pool, JSON or CSV by extension.
    pub players: String,
    /// Optional newline-separated list of drafted player keys.
    #[serde(default)]
    pub drafted: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/valuation.toml`, relative to the given `base_dir`.
///
/// Does not copy defaults; `load_config()` handles that.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;
    let league = league_file.league;

    // --- valuation.toml (required) ---
    let valuation_path = config_dir.join("valuation.toml");
    let valuation_text = read_file(&valuation_path)?;
    let valuation_file: ValuationFile =
        toml::from_str(&valuation_text).map_err(|e| ConfigError::ParseError {
            path: valuation_path.clone(),
            source: e,
        })?;

    let position_weights = parse_position_weights(&valuation_file.position_weights)?;

    let valuation = ValuationConfig {
        scarcity: ScarcitySettings {
            tiers: valuation_file.tiers,
            multipliers: valuation_file.severity_multipliers,
            position_weights,
            drop_off_threshold: valuation_file.drop_off.threshold,
        },
        risk: valuation_file.risk,
        schedule: valuation_file.schedule,
    };

    let config = Config {
        league,
        valuation,
        data_paths: valuation_file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// Seed `config/` from the shipped `defaults/` on first run.
///
/// Only plain files are copied, `.example` templates stay behind, and a file
/// already present in `config/` is never touched. Returns the paths written.
/// A project with `config/` but no `defaults/` is left as is.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let shipped = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !shipped.is_dir() {
        if config_dir.is_dir() {
            return Ok(Vec::new());
        }
        return Err(seed_error(format!(
            "no defaults/ or config/ directory under {}; run from the project root",
            base_dir.display()
        )));
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| seed_error(format!("cannot create {}: {e}", config_dir.display())))?;

    let mut seeded = Vec::new();
    let listing = std::fs::read_dir(&shipped)
        .map_err(|e| seed_error(format!("cannot list {}: {e}", shipped.display())))?;
    for entry in listing {
        let source = entry
            .map_err(|e| seed_error(format!("cannot list {}: {e}", shipped.display())))?
            .path();
        let Some(name) = source.file_name() else {
            continue;
        };
        let is_template = name.to_string_lossy().ends_with(".example");
        if !source.is_file() || is_template {
            continue;
        }
        let target = config_dir.join(name);
        if copy_if_missing(&source, &target)? {
            seeded.push(target);
        }
    }

    Ok(seeded)
}

/// Copy `source` to `target` unless `target` exists. `create_new` makes the
/// existence check and the create one step.
fn copy_if_missing(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    use std::io::Write;

    let mut dest = match std::fs::OpenOptions::new().write(true).create_new(true).open(target) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(seed_error(format!("cannot create {}: {e}", target.display()))),
    };
    let bytes = std::fs::read(source)
        .map_err(|e| seed_error(format!("cannot read {}: {e}", source.display())))?;
    dest.write_all(&bytes)
        .map_err(|e| seed_error(format!("cannot write {}: {e}", target.display())))?;
    Ok(true)
}

fn seed_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

/// Weights come only from the file; positions it leaves out weigh 1.0.
/// Unknown labels are an error rather than silently ignored.
fn parse_position_weights(raw: &HashMap<String, f64>) -> Result<HashMap<Position, f64>, ConfigError> {
    let mut weights = HashMap::with_capacity(raw.len());
    for (label, &weight) in raw {
        let pos = Position::from_str_pos(label).ok_or_else(|| {
            invalid(
                &format!("position_weights.{label}"),
                "not a draftable position".into(),
            )
        })?;
        weights.insert(pos, weight);
    }
    Ok(weights)
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.num_teams == 0 {
        return Err(invalid("league.num_teams", "must be greater than 0".into()));
    }

    let scarcity = &config.valuation.scarcity;
    let tiers = scarcity.tiers;
    if !tiers.tier1.is_finite() || !tiers.tier2.is_finite() {
        return Err(invalid("tiers", "thresholds must be finite".into()));
    }
    if tiers.tier1 < tiers.tier2 {
        return Err(invalid(
            "tiers.tier1",
            format!("must be >= tier2 ({}), got {}", tiers.tier2, tiers.tier1),
        ));
    }

    let m = scarcity.multipliers;
    let multiplier_fields: &[(&str, f64)] = &[
        ("severity_multipliers.low", m.low),
        ("severity_multipliers.medium", m.medium),
        ("severity_multipliers.high", m.high),
        ("severity_multipliers.critical", m.critical),
    ];
    for (name, val) in multiplier_fields {
        if !non_negative(*val) {
            return Err(invalid(name, format!("must be >= 0, got {val}")));
        }
    }

    for (pos, weight) in &scarcity.position_weights {
        if !non_negative(*weight) {
            return Err(invalid(
                &format!("position_weights.{pos}"),
                format!("must be >= 0, got {weight}"),
            ));
        }
    }

    if !non_negative(scarcity.drop_off_threshold) {
        return Err(invalid(
            "drop_off.threshold",
            format!("must be >= 0, got {}", scarcity.drop_off_threshold),
        ));
    }

    let risk = &config.valuation.risk;
    if !(0.0..=1.0).contains(&risk.tolerance) {
        return Err(invalid(
            "risk.tolerance",
            format!("must be between 0.0 and 1.0 inclusive, got {}", risk.tolerance),
        ));
    }
    let risk_fields: &[(&str, f64)] = &[
        ("risk.injury_weight", risk.injury_weight),
        ("risk.consistency_weight", risk.consistency_weight),
        ("risk.upside_weight", risk.upside_weight),
    ];
    for (name, val) in risk_fields {
        if !non_negative(*val) {
            return Err(invalid(name, format!("must be >= 0, got {val}")));
        }
    }

    if !config.valuation.schedule.weight.is_finite() {
        return Err(invalid("schedule.weight", "must be finite".into()));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
