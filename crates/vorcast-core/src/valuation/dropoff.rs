// Tier drop-off ("cliff") detection.
//
// Looks for a large gap in average VOR between adjacent tiers of the players
// still on the board. A cliff means waiting on a position risks missing the
// better tier entirely.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::config::ScarcitySettings;
use crate::player::{Player, Position, DRAFTABLE_POSITIONS};
use crate::valuation::supply::{remaining_at_position, Tier};

/// Cliffs this close (in picks) are critical rather than a warning.
const CRITICAL_PICK_WINDOW: usize = 3;

// ---------------------------------------------------------------------------
// Alert types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

impl AlertSeverity {
    fn from_picks(picks_until_drop: usize) -> Self {
        if picks_until_drop <= CRITICAL_PICK_WINDOW {
            AlertSeverity::Critical
        } else {
            AlertSeverity::Warning
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlertSeverity::Warning => "WARNING",
            AlertSeverity::Critical => "CRITICAL",
        }
    }
}

/// A detected cliff between two adjacent tiers at one position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropOffAlert {
    pub position: Position,
    /// Tier above the cliff.
    pub upper_tier: Tier,
    pub current_tier_avg_vor: f64,
    pub next_tier_avg_vor: f64,
    /// `current_tier_avg_vor - next_tier_avg_vor`, always positive.
    pub drop_off_points: f64,
    /// Players left before the upper tier is exhausted. Assumes one such
    /// player leaves the board per pick.
    pub picks_until_drop: usize,
    pub severity: AlertSeverity,
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Compare two adjacent tier groups. Returns `None` when either is empty or
/// the gap does not exceed `threshold`.
fn check_cliff(
    position: Position,
    upper_tier: Tier,
    upper: &[f64],
    lower: &[f64],
    picks_until_drop: usize,
    threshold: f64,
) -> Option<DropOffAlert> {
    if upper.is_empty() || lower.is_empty() {
        return None;
    }
    let current_tier_avg_vor = mean(upper);
    let next_tier_avg_vor = mean(lower);
    let drop_off_points = current_tier_avg_vor - next_tier_avg_vor;
    if drop_off_points <= threshold {
        return None;
    }
    Some(DropOffAlert {
        position,
        upper_tier,
        current_tier_avg_vor,
        next_tier_avg_vor,
        drop_off_points,
        picks_until_drop,
        severity: AlertSeverity::from_picks(picks_until_drop),
    })
}

/// Check one position for a cliff. The elite-to-starter cliff takes
/// precedence over the starter-to-replacement cliff.
pub fn detect_position_drop_off(
    players: &[Player],
    drafted: &HashSet<String>,
    position: Position,
    settings: &ScarcitySettings,
) -> Option<DropOffAlert> {
    let mut vors: Vec<f64> = remaining_at_position(players, drafted, position)
        .iter()
        .map(|p| p.vor_or_zero())
        .collect();
    if vors.len() < 2 {
        return None;
    }
    vors.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    let mut tier1 = Vec::new();
    let mut tier2 = Vec::new();
    let mut tier3 = Vec::new();
    for vor in vors {
        match Tier::classify(vor, &settings.tiers) {
            Tier::Elite => tier1.push(vor),
            Tier::Starter => tier2.push(vor),
            Tier::Replacement => tier3.push(vor),
        }
    }

    let threshold = settings.drop_off_threshold;
    check_cliff(position, Tier::Elite, &tier1, &tier2, tier1.len(), threshold).or_else(|| {
        check_cliff(
            position,
            Tier::Starter,
            &tier2,
            &tier3,
            tier1.len() + tier2.len(),
            threshold,
        )
    })
}

/// Scan every draftable position for tier cliffs.
///
/// Emits at most one alert per position, in [`DRAFTABLE_POSITIONS`] order.
pub fn detect_drop_offs(
    players: &[Player],
    drafted: &HashSet<String>,
    settings: &ScarcitySettings,
) -> Vec<DropOffAlert> {
    DRAFTABLE_POSITIONS
        .iter()
        .filter_map(|&pos| {
            let alert = detect_position_drop_off(players, drafted, pos, settings)?;
            debug!(
                "{} drop-off after {}: {:.1} pts, {} picks away ({})",
                pos,
                alert.upper_tier.label(),
                alert.drop_off_points,
                alert.picks_until_drop,
                alert.severity.label()
            );
            Some(alert)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
