// Enhanced VOR aggregation and ranking.
//
// Every undrafted player's base VOR is combined with risk, schedule and
// positional-scarcity adjustments. The combined list is sorted and ranked
// overall and within each position, and compared against market ADP.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::config::{RiskSettings, ScarcitySettings, ScheduleSettings};
use crate::player::{Player, Position};
use crate::valuation::risk::{risk_adjustment, RiskModel, StandardRiskModel};
use crate::valuation::scarcity::compute_scarcity;
use crate::valuation::schedule::{AttachedScheduleScores, ScheduleModel};

// ---------------------------------------------------------------------------
// Enhanced VOR record
// ---------------------------------------------------------------------------

/// A ranked, fully adjusted valuation for one undrafted player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhancedVor {
    pub player_id: String,
    pub name: String,
    pub position: Position,
    pub base_vor: f64,
    pub forecast: f64,
    /// Signed; risk-adjusted VOR minus base VOR.
    pub risk_adjustment: f64,
    /// Signed.
    pub schedule_adjustment: f64,
    /// Never negative.
    pub scarcity_premium: f64,
    /// base + risk + schedule + scarcity.
    pub enhanced_vor: f64,
    /// 1-based, dense, by descending enhanced VOR.
    pub overall_rank: usize,
    /// 1-based within the position group, same ordering.
    pub position_rank: usize,
    /// ADP rank minus overall rank. Positive = value, negative = reach.
    pub adp_diff: f64,
}

/// Risk and schedule collaborators the ranker consults per player.
pub struct Adjusters<'a> {
    pub risk: &'a dyn RiskModel,
    pub schedule: &'a dyn ScheduleModel,
}

impl Default for Adjusters<'static> {
    fn default() -> Self {
        Adjusters {
            risk: &StandardRiskModel,
            schedule: &AttachedScheduleScores,
        }
    }
}

/// The settings bundle a ranking pass needs besides the roster.
#[derive(Debug, Clone, Copy)]
pub struct RankingSettings<'a> {
    pub risk: &'a RiskSettings,
    pub scarcity: &'a ScarcitySettings,
    pub schedule: &'a ScheduleSettings,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Rank all undrafted players by enhanced VOR using the default risk model
/// and the schedule scores attached to each player.
///
/// Returns an empty list when every player has been drafted.
pub fn compute_enhanced_vor(
    players: &[Player],
    drafted: &HashSet<String>,
    risk_settings: &RiskSettings,
    scarcity_settings: &ScarcitySettings,
    schedule_settings: &ScheduleSettings,
    roster: &HashMap<String, usize>,
    num_teams: usize,
) -> Vec<EnhancedVor> {
    let settings = RankingSettings {
        risk: risk_settings,
        scarcity: scarcity_settings,
        schedule: schedule_settings,
    };
    rank_players(players, drafted, settings, roster, num_teams, &Adjusters::default())
}

/// Rank all undrafted players by enhanced VOR with explicit collaborators.
///
/// 1. Filter to undrafted players.
/// 2. Compute one scarcity premium per position.
/// 3. Sum base VOR, risk adjustment, schedule adjustment and premium.
/// 4. Sort descending by enhanced VOR (stable, so ties keep input order).
/// 5. Assign overall rank, then position rank, then ADP diff.
pub fn rank_players(
    players: &[Player],
    drafted: &HashSet<String>,
    settings: RankingSettings<'_>,
    roster: &HashMap<String, usize>,
    num_teams: usize,
    adjusters: &Adjusters<'_>,
) -> Vec<EnhancedVor> {
    let undrafted: Vec<&Player> = players.iter().filter(|p| !drafted.contains(&p.id)).collect();
    if undrafted.is_empty() {
        return Vec::new();
    }

    let premiums: HashMap<Position, f64> =
        compute_scarcity(players, drafted, roster, num_teams, settings.scarcity)
            .into_iter()
            .map(|entry| (entry.position, entry.premium))
            .collect();

    let mut ranked: Vec<(EnhancedVor, f64)> = undrafted
        .iter()
        .map(|player| {
            let base_vor = player.vor_or_zero();
            let risk = risk_adjustment(adjusters.risk, base_vor, player.risk.as_ref(), settings.risk);
            let schedule = adjusters.schedule.schedule_adjustment(player, settings.schedule);
            let scarcity = premiums.get(&player.position).copied().unwrap_or(0.0);

            let entry = EnhancedVor {
                player_id: player.id.clone(),
                name: player.name.clone(),
                position: player.position,
                base_vor,
                forecast: player.forecast_or_zero(),
                risk_adjustment: risk,
                schedule_adjustment: schedule,
                scarcity_premium: scarcity,
                enhanced_vor: base_vor + risk + schedule + scarcity,
                overall_rank: 0,
                position_rank: 0,
                adp_diff: 0.0,
            };
            (entry, player.adp_rank())
        })
        .collect();

    ranked.sort_by(|(a, _), (b, _)| {
        b.enhanced_vor
            .partial_cmp(&a.enhanced_vor)
            .unwrap_or(Ordering::Equal)
    });

    let mut position_counters: HashMap<Position, usize> = HashMap::new();
    let results: Vec<EnhancedVor> = ranked
        .into_iter()
        .enumerate()
        .map(|(idx, (mut entry, adp))| {
            entry.overall_rank = idx + 1;
            let counter = position_counters.entry(entry.position).or_insert(0);
            *counter += 1;
            entry.position_rank = *counter;
            entry.adp_diff = adp - entry.overall_rank as f64;
            entry
        })
        .collect();

    debug!(
        "ranked {} undrafted players ({} drafted)",
        results.len(),
        players.len() - undrafted.len()
    );

    results
}

/// Ranked players at one position, best first.
pub fn rankings_for_position(rankings: &[EnhancedVor], position: Position) -> Vec<&EnhancedVor> {
    rankings.iter().filter(|e| e.position == position).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
