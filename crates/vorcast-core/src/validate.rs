// Boundary checks for player records and whole-pool data quality.
//
// Records coming back from storage or an external feed are shape-checked
// here before they may enter the valuation engine. The engine itself never
// fails on a well-shaped record.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::player::{Player, Position, RiskProfile};

// ---------------------------------------------------------------------------
// Record shape checks
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` should be a {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("unknown position `{0}`")]
    UnknownPosition(String),
}

fn required_str<'a>(obj: &'a Map<String, Value>, field: &'static str) -> Result<&'a str, RecordError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(RecordError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(RecordError::WrongType {
            field: field.to_string(),
            expected: "string",
        }),
    }
}

fn optional_number(obj: &Map<String, Value>, field: &str) -> Result<Option<f64>, RecordError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(_) => Err(RecordError::WrongType {
            field: field.to_string(),
            expected: "number",
        }),
    }
}

/// Risk profiles arrive either nested under `risk.riskProfile` or directly
/// under `risk`.
fn optional_risk(obj: &Map<String, Value>) -> Result<Option<RiskProfile>, RecordError> {
    let risk = match obj.get("risk") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(risk)) => risk,
        Some(_) => {
            return Err(RecordError::WrongType {
                field: "risk".into(),
                expected: "object",
            })
        }
    };
    let profile = match risk.get("riskProfile") {
        Some(Value::Object(profile)) => profile,
        Some(Value::Null) | None => risk,
        Some(_) => {
            return Err(RecordError::WrongType {
                field: "risk.riskProfile".into(),
                expected: "object",
            })
        }
    };

    let field = |name: &str| -> Result<Option<f64>, RecordError> {
        optional_number(profile, name).map_err(|_| RecordError::WrongType {
            field: format!("risk.{name}"),
            expected: "number",
        })
    };

    let injury_score = field("injuryScore")?;
    let consistency_score = field("consistencyScore")?;
    let floor = field("floor")?;
    let ceiling = field("ceiling")?;
    let weekly_variance = field("weeklyVariance")?;

    // Without both scores there is no profile to apply.
    let (Some(injury_score), Some(consistency_score)) = (injury_score, consistency_score) else {
        return Ok(None);
    };
    Ok(Some(RiskProfile {
        injury_score,
        consistency_score,
        floor: floor.unwrap_or(0.0),
        ceiling: ceiling.unwrap_or(0.0),
        weekly_variance: weekly_variance.unwrap_or(0.0),
    }))
}

/// Convert one stored player record into a [`Player`].
///
/// Requires `key`, `name` and `pos` as strings (`pos` must name a draftable
/// position, aliases accepted). `vor`, `forecast`, `std` and
/// `scheduleScore` must be numbers when present; absent or null is fine.
pub fn player_from_record(record: &Value) -> Result<Player, RecordError> {
    let obj = record.as_object().ok_or(RecordError::NotAnObject)?;

    let id = required_str(obj, "key")?;
    let name = required_str(obj, "name")?;
    let pos = required_str(obj, "pos")?;
    let position =
        Position::from_str_pos(pos).ok_or_else(|| RecordError::UnknownPosition(pos.to_string()))?;

    let team = match obj.get("team") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_uppercase(),
        Some(_) => {
            return Err(RecordError::WrongType {
                field: "team".into(),
                expected: "string",
            })
        }
    };

    Ok(Player {
        id: id.trim().to_string(),
        name: name.trim().to_string(),
        position,
        team,
        vor: optional_number(obj, "vor")?,
        forecast: optional_number(obj, "forecast")?,
        adp: optional_number(obj, "std")?,
        risk: optional_risk(obj)?,
        schedule_score: optional_number(obj, "scheduleScore")?,
    })
}

// ---------------------------------------------------------------------------
// Pool data quality
// ---------------------------------------------------------------------------

/// Team abbreviations accepted without a warning. Includes the legacy
/// Washington code.
const KNOWN_TEAMS: &[&str] = &[
    "ARI", "ATL", "BAL", "BUF", "CAR", "CHI", "CIN", "CLE", "DAL", "DEN", "DET", "GB", "HOU",
    "IND", "JAX", "KC", "LAC", "LAR", "LV", "MIA", "MIN", "NE", "NO", "NYG", "NYJ", "PHI", "PIT",
    "SEA", "SF", "TB", "TEN", "WAS", "WSH",
];

/// Result of a pool quality check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub by_position: BTreeMap<Position, usize>,
}

/// Check a loaded pool before it is used for a draft.
///
/// An empty pool is an error. Low counts, duplicate keys, unknown teams, and
/// players with no VOR are warnings.
pub fn validate_pool(players: &[Player], min_players: usize) -> PoolReport {
    let mut report = PoolReport::default();

    if players.is_empty() {
        report.errors.push("No players provided".into());
        return report;
    }

    if players.len() < min_players {
        report
            .warnings
            .push(format!("Low player count: {} < {}", players.len(), min_players));
    }

    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    let mut unknown_teams = BTreeSet::new();
    let mut missing_vor = 0usize;

    for p in players {
        *report.by_position.entry(p.position).or_insert(0) += 1;
        if !seen.insert(p.id.as_str()) {
            duplicates.push(p.id.clone());
        }
        if !p.team.is_empty() && !KNOWN_TEAMS.contains(&p.team.as_str()) {
            unknown_teams.insert(p.team.clone());
        }
        if p.vor.is_none() {
            missing_vor += 1;
        }
    }

    if !duplicates.is_empty() {
        report
            .warnings
            .push(format!("Duplicate player keys: {}", duplicates.join(", ")));
    }
    if !unknown_teams.is_empty() {
        let teams: Vec<String> = unknown_teams.into_iter().collect();
        report
            .warnings
            .push(format!("Unknown teams: {}", teams.join(", ")));
    }
    if missing_vor > 0 {
        report
            .warnings
            .push(format!("Players without VOR (valued at 0): {missing_vor}"));
    }

    report.is_valid = report.errors.is_empty();
    report
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
