// Remaining-supply measurement per position.
//
// Splits each position group into drafted and remaining players, then
// buckets the remaining players into three VOR tiers. Scarcity and
// drop-off detection both build on these tiers.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::config::TierThresholds;
use crate::player::{Player, Position};

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

/// VOR-based quality band within a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// VOR >= tier1 threshold.
    Elite,
    /// tier2 <= VOR < tier1.
    Starter,
    /// VOR < tier2.
    Replacement,
}

impl Tier {
    /// Classify a VOR value against the configured cutoffs.
    pub fn classify(vor: f64, thresholds: &TierThresholds) -> Self {
        if vor >= thresholds.tier1 {
            Tier::Elite
        } else if vor >= thresholds.tier2 {
            Tier::Starter
        } else {
            Tier::Replacement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Elite => "tier 1",
            Tier::Starter => "tier 2",
            Tier::Replacement => "tier 3",
        }
    }
}

// ---------------------------------------------------------------------------
// Supply snapshot
// ---------------------------------------------------------------------------

/// How many players a position started with and how many are left per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionSupply {
    pub position: Position,
    pub total_players: usize,
    pub drafted_count: usize,
    /// Always `total_players - drafted_count`.
    pub remaining_count: usize,
    pub tier1_remaining: usize,
    pub tier2_remaining: usize,
    pub tier3_remaining: usize,
}

impl PositionSupply {
    /// An all-zero supply for a position with no players.
    pub fn empty(position: Position) -> Self {
        PositionSupply {
            position,
            total_players: 0,
            drafted_count: 0,
            remaining_count: 0,
            tier1_remaining: 0,
            tier2_remaining: 0,
            tier3_remaining: 0,
        }
    }

    /// Remaining players at starter quality or better (tier 1 + tier 2).
    pub fn quality_remaining(&self) -> usize {
        self.tier1_remaining + self.tier2_remaining
    }
}

/// Players at `position` that have not been drafted, in input order.
pub fn remaining_at_position<'a>(
    players: &'a [Player],
    drafted: &HashSet<String>,
    position: Position,
) -> Vec<&'a Player> {
    players
        .iter()
        .filter(|p| p.position == position && !drafted.contains(&p.id))
        .collect()
}

/// Count total, drafted and per-tier remaining players at one position.
///
/// Absent VOR counts as 0. A position with no players yields
/// [`PositionSupply::empty`].
pub fn compute_position_supply(
    players: &[Player],
    drafted: &HashSet<String>,
    position: Position,
    thresholds: &TierThresholds,
) -> PositionSupply {
    let mut supply = PositionSupply::empty(position);

    for player in players.iter().filter(|p| p.position == position) {
        supply.total_players += 1;
        if drafted.contains(&player.id) {
            supply.drafted_count += 1;
            continue;
        }
        match Tier::classify(player.vor_or_zero(), thresholds) {
            Tier::Elite => supply.tier1_remaining += 1,
            Tier::Starter => supply.tier2_remaining += 1,
            Tier::Replacement => supply.tier3_remaining += 1,
        }
    }
    supply.remaining_count = supply.total_players - supply.drafted_count;

    debug!(
        "{} supply: {}/{} remaining (t1={}, t2={}, t3={})",
        position,
        supply.remaining_count,
        supply.total_players,
        supply.tier1_remaining,
        supply.tier2_remaining,
        supply.tier3_remaining
    );

    supply
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_player(id: &str, position: Position, vor: Option<f64>) -> Player {
        Player {
            id: id.into(),
            name: id.to_uppercase(),
            position,
            team: "TST".into(),
            vor,
            forecast: None,
            adp: None,
            risk: None,
            schedule_score: None,
        }
    }

    fn drafted(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn assert_counts_consistent(s: &PositionSupply) {
        assert_eq!(
            s.tier1_remaining + s.tier2_remaining + s.tier3_remaining,
            s.remaining_count
        );
        assert_eq!(s.remaining_count, s.total_players - s.drafted_count);
    }

    #[test]
    fn tier_classification_boundaries() {
        let t = TierThresholds::default();
        assert_eq!(Tier::classify(50.0, &t), Tier::Elite);
        assert_eq!(Tier::classify(49.99, &t), Tier::Starter);
        assert_eq!(Tier::classify(25.0, &t), Tier::Starter);
        assert_eq!(Tier::classify(24.99, &t), Tier::Replacement);
        assert_eq!(Tier::classify(-10.0, &t), Tier::Replacement);
    }

    #[test]
    fn five_running_backs_split_into_tiers() {
        let players: Vec<Player> = [60.0, 55.0, 40.0, 20.0, 10.0]
            .iter()
            .enumerate()
            .map(|(i, &v)| make_player(&format!("rb{i}"), Position::RB, Some(v)))
            .collect();

        let s = compute_position_supply(
            &players,
            &HashSet::new(),
            Position::RB,
            &TierThresholds::default(),
        );

        assert_eq!(s.total_players, 5);
        assert_eq!(s.drafted_count, 0);
        assert_eq!(s.remaining_count, 5);
        assert_eq!(s.tier1_remaining, 2);
        assert_eq!(s.tier2_remaining, 1);
        assert_eq!(s.tier3_remaining, 2);
        assert_eq!(s.quality_remaining(), 3);
        assert_counts_consistent(&s);
    }

    #[test]
    fn drafted_players_leave_the_tiers() {
        let players = vec![
            make_player("a", Position::WR, Some(70.0)),
            make_player("b", Position::WR, Some(30.0)),
            make_player("c", Position::WR, Some(5.0)),
            make_player("d", Position::QB, Some(90.0)),
        ];

        let s = compute_position_supply(
            &players,
            &drafted(&["a", "d"]),
            Position::WR,
            &TierThresholds::default(),
        );

        assert_eq!(s.total_players, 3);
        assert_eq!(s.drafted_count, 1);
        assert_eq!(s.tier1_remaining, 0);
        assert_eq!(s.tier2_remaining, 1);
        assert_eq!(s.tier3_remaining, 1);
        assert_counts_consistent(&s);
    }

    #[test]
    fn absent_vor_lands_in_tier3() {
        let players = vec![make_player("k1", Position::K, None)];
        let s = compute_position_supply(
            &players,
            &HashSet::new(),
            Position::K,
            &TierThresholds::default(),
        );
        assert_eq!(s.tier3_remaining, 1);
        assert_counts_consistent(&s);
    }

    #[test]
    fn empty_position_is_all_zeros() {
        let players = vec![make_player("q", Position::QB, Some(80.0))];
        let s = compute_position_supply(
            &players,
            &HashSet::new(),
            Position::TE,
            &TierThresholds::default(),
        );
        assert_eq!(s, PositionSupply::empty(Position::TE));
    }

    #[test]
    fn drafted_ids_for_unknown_players_are_ignored() {
        let players = vec![make_player("te1", Position::TE, Some(55.0))];
        let s = compute_position_supply(
            &players,
            &drafted(&["ghost"]),
            Position::TE,
            &TierThresholds::default(),
        );
        assert_eq!(s.drafted_count, 0);
        assert_eq!(s.tier1_remaining, 1);
    }

    #[test]
    fn remaining_at_position_preserves_input_order() {
        let players = vec![
            make_player("a", Position::TE, Some(10.0)),
            make_player("b", Position::TE, Some(40.0)),
            make_player("c", Position::TE, Some(20.0)),
        ];
        let left = remaining_at_position(&players, &drafted(&["b"]), Position::TE);
        let ids: Vec<&str> = left.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
