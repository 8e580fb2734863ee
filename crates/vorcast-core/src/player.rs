// Player pool entities: positions, players, and risk profiles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// ADP rank assumed for players the market has not ranked.
pub const UNRANKED_ADP: f64 = 999.0;

/// Football positions that can be drafted into a starting slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    K,
    DST,
}

/// Positions modeled for supply, scarcity and drop-off analysis, in report
/// order. Flex and bench slots are deliberately absent.
pub const DRAFTABLE_POSITIONS: &[Position] = &[
    Position::QB,
    Position::RB,
    Position::WR,
    Position::TE,
    Position::K,
    Position::DST,
];

impl Position {
    /// Parse a position string into a Position enum.
    ///
    /// Accepts the usual aliases seen in projection feeds:
    /// - "FB" -> RB
    /// - "D/ST", "DEF" -> DST
    ///
    /// Roster labels that are not concrete positions ("FLEX", "BE", "IL")
    /// return `None`.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::QB),
            "RB" | "FB" => Some(Position::RB),
            "WR" => Some(Position::WR),
            "TE" => Some(Position::TE),
            "K" | "PK" => Some(Position::K),
            "DST" | "D/ST" | "DEF" => Some(Position::DST),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::K => "K",
            Position::DST => "DST",
        }
    }

    /// Whether schedule strength meaningfully moves this position's output.
    /// Kickers and team defenses get no schedule adjustment.
    pub fn is_schedule_sensitive(&self) -> bool {
        !matches!(self, Position::K | Position::DST)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// Injury and consistency profile attached to a player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    /// 0-100, higher = more injury risk.
    pub injury_score: f64,
    /// 0-1, higher = steadier weekly output.
    pub consistency_score: f64,
    /// Pessimistic season outcome in fantasy points.
    pub floor: f64,
    /// Optimistic season outcome in fantasy points.
    pub ceiling: f64,
    /// Standard deviation of weekly points. Informational; the ranker does
    /// not read it.
    #[serde(default)]
    pub weekly_variance: f64,
}

/// A player in the draft pool. Read-only to the valuation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Unique key (e.g. "chase_wr_cin").
    pub id: String,
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub team: String,
    /// Base value over replacement from the projection engine.
    #[serde(default)]
    pub vor: Option<f64>,
    /// Season fantasy-point forecast.
    #[serde(default)]
    pub forecast: Option<f64>,
    /// Standard-scoring ADP rank.
    #[serde(default)]
    pub adp: Option<f64>,
    #[serde(default)]
    pub risk: Option<RiskProfile>,
    /// Pre-computed schedule score in VOR points, if attached upstream.
    #[serde(default)]
    pub schedule_score: Option<f64>,
}

impl Player {
    /// Base VOR, treating an absent value as 0.
    pub fn vor_or_zero(&self) -> f64 {
        self.vor.unwrap_or(0.0)
    }

    /// Season forecast, treating an absent value as 0.
    pub fn forecast_or_zero(&self) -> f64 {
        self.forecast.unwrap_or(0.0)
    }

    /// ADP rank, falling back to [`UNRANKED_ADP`].
    pub fn adp_rank(&self) -> f64 {
        self.adp.unwrap_or(UNRANKED_ADP)
    }
}
