// Valuation engine: tier supply, scarcity premiums, drop-off alerts, and
// enhanced VOR rankings.

pub mod dropoff;
pub mod enhanced;
pub mod risk;
pub mod scarcity;
pub mod schedule;
pub mod supply;

use std::collections::HashSet;

use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::player::{Player, DRAFTABLE_POSITIONS};
use dropoff::{detect_drop_offs, DropOffAlert};
use enhanced::{rank_players, Adjusters, EnhancedVor, RankingSettings};
use scarcity::{compute_scarcity, ScarcityPremium};
use supply::{compute_position_supply, PositionSupply};

/// Everything one recomputation produces for the current board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationPass {
    pub supplies: Vec<PositionSupply>,
    pub premiums: Vec<ScarcityPremium>,
    pub alerts: Vec<DropOffAlert>,
    pub rankings: Vec<EnhancedVor>,
}

/// Run supply -> premiums -> alerts -> rankings over one snapshot of the
/// player pool and drafted set, with the default collaborators.
pub fn run_pass(players: &[Player], drafted: &HashSet<String>, config: &Config) -> ValuationPass {
    run_pass_with(players, drafted, config, &Adjusters::default())
}

/// Same as [`run_pass`] with explicit risk and schedule collaborators.
pub fn run_pass_with(
    players: &[Player],
    drafted: &HashSet<String>,
    config: &Config,
    adjusters: &Adjusters<'_>,
) -> ValuationPass {
    let valuation = &config.valuation;
    let league = &config.league;

    let supplies = DRAFTABLE_POSITIONS
        .iter()
        .map(|&pos| compute_position_supply(players, drafted, pos, &valuation.scarcity.tiers))
        .collect();

    let premiums = compute_scarcity(
        players,
        drafted,
        &league.roster,
        league.num_teams,
        &valuation.scarcity,
    );

    let alerts = detect_drop_offs(players, drafted, &valuation.scarcity);

    let settings = RankingSettings {
        risk: &valuation.risk,
        scarcity: &valuation.scarcity,
        schedule: &valuation.schedule,
    };
    let rankings = rank_players(
        players,
        drafted,
        settings,
        &league.roster,
        league.num_teams,
        adjusters,
    );

    info!(
        "Valuation pass: {} ranked, {} drafted, {} drop-off alerts",
        rankings.len(),
        drafted.len(),
        alerts.len()
    );

    ValuationPass {
        supplies,
        premiums,
        alerts,
        rankings,
    }
}
