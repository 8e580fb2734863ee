// Positional scarcity severity and premium calculation.
//
// For each position, compares the starter-quality players still on the board
// against the league's expected demand for starters at that position. The
// resulting severity maps to an additive VOR premium.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::config::{roster_slots_for, ScarcitySettings, SeverityMultipliers};
use crate::player::{Player, Position, DRAFTABLE_POSITIONS};
use crate::valuation::supply::{compute_position_supply, PositionSupply};

// ---------------------------------------------------------------------------
// Scarcity severity levels
// ---------------------------------------------------------------------------

/// How scarce quality supply has become at a position. Ordered from least
/// to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScarcitySeverity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl ScarcitySeverity {
    /// Classify remaining quality supply against expected starter demand.
    ///
    /// Rules are checked in order and the first match wins:
    /// 1. Critical: no tier 1 and no tier 2 players left.
    /// 2. High: no tier 1 left and tier 2 covers at most half the demand.
    /// 3. Medium: tier 1 + tier 2 covers at most the demand.
    /// 4. Low: tier 1 + tier 2 covers at most 1.5x the demand.
    /// 5. None otherwise.
    pub fn classify(tier1_remaining: usize, tier2_remaining: usize, expected_starters: usize) -> Self {
        let quality = (tier1_remaining + tier2_remaining) as f64;
        let demand = expected_starters as f64;

        if tier1_remaining == 0 && tier2_remaining == 0 {
            ScarcitySeverity::Critical
        } else if tier1_remaining == 0 && tier2_remaining as f64 <= demand / 2.0 {
            ScarcitySeverity::High
        } else if quality <= demand {
            ScarcitySeverity::Medium
        } else if quality <= demand * 1.5 {
            ScarcitySeverity::Low
        } else {
            ScarcitySeverity::None
        }
    }

    /// Return a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ScarcitySeverity::None => "none",
            ScarcitySeverity::Low => "low",
            ScarcitySeverity::Medium => "medium",
            ScarcitySeverity::High => "high",
            ScarcitySeverity::Critical => "critical",
        }
    }

    /// Premium multiplier for this severity. `None` is always 0.
    pub fn multiplier(&self, multipliers: &SeverityMultipliers) -> f64 {
        match self {
            ScarcitySeverity::None => 0.0,
            ScarcitySeverity::Low => multipliers.low,
            ScarcitySeverity::Medium => multipliers.medium,
            ScarcitySeverity::High => multipliers.high,
            ScarcitySeverity::Critical => multipliers.critical,
        }
    }
}

impl fmt::Display for ScarcitySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Scarcity premium
// ---------------------------------------------------------------------------

/// Scarcity result for a single position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScarcityPremium {
    pub position: Position,
    pub severity: ScarcitySeverity,
    /// Additive VOR bonus, never negative.
    pub premium: f64,
    /// Descriptive note when severity is above `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Severity and premium for one position's supply.
///
/// `expected_starters` is roster slots at the position times the number of
/// teams.
pub fn compute_premium(
    supply: &PositionSupply,
    expected_starters: usize,
    settings: &ScarcitySettings,
) -> ScarcityPremium {
    let severity =
        ScarcitySeverity::classify(supply.tier1_remaining, supply.tier2_remaining, expected_starters);
    let premium = severity.multiplier(&settings.multipliers) * settings.weight_for(supply.position);

    let message = (severity != ScarcitySeverity::None).then(|| {
        format!(
            "{} scarcity is {}: {} quality players remaining (tier1+tier2) vs {} expected starters",
            supply.position,
            severity,
            supply.quality_remaining(),
            expected_starters
        )
    });

    ScarcityPremium {
        position: supply.position,
        severity,
        premium,
        message,
    }
}

/// Compute the scarcity premium for every draftable position.
///
/// Returns one entry per position in [`DRAFTABLE_POSITIONS`] order. Each
/// position uses its own roster-slot count; a position missing from the
/// roster has zero expected starters.
pub fn compute_scarcity(
    players: &[Player],
    drafted: &HashSet<String>,
    roster: &HashMap<String, usize>,
    num_teams: usize,
    settings: &ScarcitySettings,
) -> Vec<ScarcityPremium> {
    DRAFTABLE_POSITIONS
        .iter()
        .map(|&pos| {
            let supply = compute_position_supply(players, drafted, pos, &settings.tiers);
            let expected_starters = roster_slots_for(roster, pos) * num_teams;
            let entry = compute_premium(&supply, expected_starters, settings);
            debug!(
                "{} scarcity: severity={}, premium={:.2}, expected_starters={}",
                pos, entry.severity, entry.premium, expected_starters
            );
            entry
        })
        .collect()
}

/// Look up the scarcity entry for a given position.
pub fn scarcity_for_position(
    scarcity: &[ScarcityPremium],
    position: Position,
) -> Option<&ScarcityPremium> {
    scarcity.iter().find(|e| e.position == position)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
