// Player pool loading.
//
// Reads the projected player pool from either the JSON export produced by the
// projection pipeline ({"schema": ..., "data": [...]} or a bare array) or a
// flat CSV. Every record passes the boundary shape check; rejected records
// are logged and skipped.

use std::collections::HashSet;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::player::{Player, Position, RiskProfile};
use crate::validate::player_from_record;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV row (private)
// ---------------------------------------------------------------------------

/// Unknown columns are ignored.
#[derive(Debug, Deserialize)]
struct RawCsvPlayer {
    key: String,
    name: String,
    pos: String,
    #[serde(default)]
    team: String,
    vor: Option<f64>,
    forecast: Option<f64>,
    #[serde(alias = "adp")]
    std: Option<f64>,
    injury_score: Option<f64>,
    consistency_score: Option<f64>,
    floor: Option<f64>,
    ceiling: Option<f64>,
    weekly_variance: Option<f64>,
    schedule_score: Option<f64>,
}

/// Keep only finite numbers; NaN/inf in a feed is treated as absent.
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

impl RawCsvPlayer {
    fn into_player(self) -> Option<Player> {
        let position = Position::from_str_pos(&self.pos)?;
        let risk = match (finite(self.injury_score), finite(self.consistency_score)) {
            (Some(injury_score), Some(consistency_score)) => Some(RiskProfile {
                injury_score,
                consistency_score,
                floor: finite(self.floor).unwrap_or(0.0),
                ceiling: finite(self.ceiling).unwrap_or(0.0),
                weekly_variance: finite(self.weekly_variance).unwrap_or(0.0),
            }),
            _ => None,
        };
        Some(Player {
            id: self.key.trim().to_string(),
            name: self.name.trim().to_string(),
            position,
            team: self.team.trim().to_uppercase(),
            vor: finite(self.vor),
            forecast: finite(self.forecast),
            adp: finite(self.std),
            risk,
            schedule_score: finite(self.schedule_score),
        })
    }
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

fn load_players_json_from_reader<R: Read>(rdr: R) -> Result<Vec<Player>, serde_json::Error> {
    let root: Value = serde_json::from_reader(rdr)?;
    let records = match root {
        Value::Array(records) => records,
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(records)) => records,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    let mut players = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        match player_from_record(record) {
            Ok(player) => players.push(player),
            Err(e) => warn!("skipping player record {}: {}", idx, e),
        }
    }
    Ok(players)
}

fn load_players_csv_from_reader<R: Read>(rdr: R) -> Result<Vec<Player>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut players = Vec::new();
    for result in reader.deserialize::<RawCsvPlayer>() {
        match result {
            Ok(raw) => {
                let pos = raw.pos.clone();
                let key = raw.key.clone();
                match raw.into_player() {
                    Some(player) => players.push(player),
                    None => warn!("skipping player '{}': unknown position '{}'", key, pos),
                }
            }
            Err(e) => warn!("skipping malformed player row: {}", e),
        }
    }
    Ok(players)
}

fn load_drafted_from_reader<R: Read>(rdr: R) -> std::io::Result<HashSet<String>> {
    let mut drafted = HashSet::new();
    for line in BufReader::new(rdr).lines() {
        let line = line?;
        let id = line.trim();
        if id.is_empty() || id.starts_with('#') {
            continue;
        }
        drafted.insert(id.to_string());
    }
    Ok(drafted)
}

// ---------------------------------------------------------------------------
// Public loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, ProjectionError> {
    std::fs::File::open(path).map_err(|e| ProjectionError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load a player pool, choosing the format by file extension (`.csv` for
/// CSV, anything else as JSON).
pub fn load_players(path: &Path) -> Result<Vec<Player>, ProjectionError> {
    let file = open(path)?;
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let players = if is_csv {
        load_players_csv_from_reader(file).map_err(|e| ProjectionError::Csv {
            path: path.display().to_string(),
            source: e,
        })?
    } else {
        load_players_json_from_reader(file).map_err(|e| ProjectionError::Json {
            path: path.display().to_string(),
            source: e,
        })?
    };

    if players.is_empty() {
        return Err(ProjectionError::Validation(format!(
            "no usable player records in {}",
            path.display()
        )));
    }

    info!("Loaded {} players from {}", players.len(), path.display());
    Ok(players)
}

/// Load drafted player keys, one per line. Blank lines and `#` comments are
/// ignored.
pub fn load_drafted(path: &Path) -> Result<HashSet<String>, ProjectionError> {
    let file = open(path)?;
    load_drafted_from_reader(file).map_err(|e| ProjectionError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
