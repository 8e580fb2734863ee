// Risk modeling: injury/consistency profiles and risk-adjusted VOR.
//
// The ranker only sees the `RiskModel` seam. The profile builder below turns
// game history into a `RiskProfile` for callers that have raw history
// rather than a pre-built profile.

use crate::config::RiskSettings;
use crate::player::{Position, RiskProfile};

// ---------------------------------------------------------------------------
// Risk-adjusted VOR
// ---------------------------------------------------------------------------

/// Turns a base VOR plus a risk profile into a risk-adjusted VOR.
pub trait RiskModel {
    fn risk_adjusted_vor(&self, base_vor: f64, profile: &RiskProfile, settings: &RiskSettings) -> f64;
}

/// Default model: injury and volatility shave value off in proportion to
/// risk aversion, floor-to-ceiling spread adds value in proportion to risk
/// appetite.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRiskModel;

impl RiskModel for StandardRiskModel {
    fn risk_adjusted_vor(&self, base_vor: f64, profile: &RiskProfile, settings: &RiskSettings) -> f64 {
        let injury = (profile.injury_score / 100.0).clamp(0.0, 1.0);
        let volatility = (1.0 - profile.consistency_score).clamp(0.0, 1.0);
        let penalty = (1.0 - settings.tolerance)
            * (settings.injury_weight * injury + settings.consistency_weight * volatility);

        let spread = if profile.ceiling > 0.0 {
            ((profile.ceiling - profile.floor) / profile.ceiling).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let upside = settings.tolerance * settings.upside_weight * spread;

        // Scale by magnitude so a negative VOR is pushed the same direction.
        base_vor + base_vor.abs() * (upside - penalty)
    }
}

/// Signed VOR change from risk. Players without a profile get 0.
pub fn risk_adjustment(
    model: &dyn RiskModel,
    base_vor: f64,
    profile: Option<&RiskProfile>,
    settings: &RiskSettings,
) -> f64 {
    match profile {
        Some(profile) => model.risk_adjusted_vor(base_vor, profile, settings) - base_vor,
        None => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Profile builder
// ---------------------------------------------------------------------------

/// Regular-season games per year.
const SEASON_GAMES: u32 = 17;

/// Age past which a position starts to decline.
fn age_threshold(position: Position) -> u32 {
    match position {
        Position::QB => 35,
        Position::RB => 27,
        Position::WR | Position::TE => 30,
        Position::K => 38,
        Position::DST => 99,
    }
}

/// Baseline injury exposure by position (0-1).
fn position_risk(position: Position) -> f64 {
    match position {
        Position::QB => 0.2,
        Position::RB => 0.7,
        Position::WR => 0.4,
        Position::TE => 0.5,
        Position::K | Position::DST => 0.1,
    }
}

/// Reported injury designation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjuryStatus {
    Healthy,
    Questionable,
    Out,
    Injured,
    InjuredReserve,
}

impl InjuryStatus {
    pub fn from_str_status(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "questionable" => InjuryStatus::Questionable,
            "out" => InjuryStatus::Out,
            "injured" => InjuryStatus::Injured,
            "ir" => InjuryStatus::InjuredReserve,
            _ => InjuryStatus::Healthy,
        }
    }

    fn risk(&self) -> f64 {
        match self {
            InjuryStatus::Healthy => 0.0,
            InjuryStatus::Questionable => 0.3,
            InjuryStatus::Out | InjuryStatus::Injured => 0.5,
            InjuryStatus::InjuredReserve => 0.8,
        }
    }
}

/// Injury risk score (0-100, higher = riskier).
///
/// Up to 50 points from games missed over the last three seasons, 20 from
/// position, 15 from age past the position's decline threshold, and 15 from
/// current status.
pub fn injury_score(
    games_played: [u32; 3],
    age: Option<u32>,
    position: Position,
    status: InjuryStatus,
) -> u32 {
    let total_games: u32 = games_played.iter().sum();
    let max_games = (SEASON_GAMES * 3) as f64;
    let missed_share = 1.0 - total_games as f64 / max_games;
    let games_component = missed_share * 50.0;

    let position_component = position_risk(position) * 20.0;

    let age_component = match age {
        Some(age) if age > age_threshold(position) => {
            (((age - age_threshold(position)) * 3) as f64).min(15.0)
        }
        _ => 0.0,
    };

    let status_component = status.risk() * 15.0;

    let total = games_component + position_component + age_component + status_component;
    (total as i64).clamp(0, 100) as u32
}

/// Consistency score (0-1, higher = steadier) from weekly point totals.
///
/// One minus the coefficient of variation over weeks actually played.
/// Returns 0.5 when there is too little history to judge.
pub fn consistency_score(weekly_points: &[f64], games_played: u32) -> f64 {
    if games_played == 0 {
        return 0.5;
    }
    let Some((mean, std_dev)) = active_week_stats(weekly_points) else {
        return 0.5;
    };
    if mean == 0.0 {
        return 0.5;
    }
    let cv = std_dev / mean;
    round_to((1.0 - cv).clamp(0.0, 1.0), 3)
}

/// Season floor and ceiling from a projection. Inconsistent players get a
/// wider band; injury risk trims the ceiling.
pub fn floor_ceiling(projected_points: f64, consistency: f64, injury: u32) -> (f64, f64) {
    if projected_points <= 0.0 {
        return (0.0, 0.0);
    }
    let variance_factor = 0.1 + (1.0 - consistency) * 0.25;
    let injury_factor = 1.0 - (injury as f64 / 100.0) * 0.2;

    let ceiling = projected_points * (1.0 + variance_factor) * injury_factor;
    let floor = projected_points * (1.0 - variance_factor);
    (round_to(floor, 1), round_to(ceiling, 1))
}

/// Spread of weekly scoring: population standard deviation over weeks with
/// points, to two decimals. Without two such weeks, 30% of the projection.
pub fn weekly_variance(weekly_points: &[f64], projected_points: f64) -> f64 {
    match active_week_stats(weekly_points) {
        Some((_, std_dev)) => round_to(std_dev, 2),
        None => projected_points * 0.3,
    }
}

/// Build a full profile from raw history.
pub fn build_risk_profile(
    games_played: [u32; 3],
    age: Option<u32>,
    position: Position,
    status: InjuryStatus,
    weekly_points: &[f64],
    projected_points: f64,
) -> RiskProfile {
    let injury = injury_score(games_played, age, position, status);
    let consistency = consistency_score(weekly_points, games_played.iter().sum());
    let (floor, ceiling) = floor_ceiling(projected_points, consistency, injury);

    RiskProfile {
        injury_score: injury as f64,
        consistency_score: consistency,
        floor,
        ceiling,
        weekly_variance: weekly_variance(weekly_points, projected_points),
    }
}

/// Mean and population standard deviation of weeks with points scored.
/// `None` when fewer than two such weeks exist.
fn active_week_stats(weekly_points: &[f64]) -> Option<(f64, f64)> {
    let active: Vec<f64> = weekly_points.iter().copied().filter(|&p| p > 0.0).collect();
    if active.len() < 2 {
        return None;
    }
    let n = active.len() as f64;
    let mean = active.iter().sum::<f64>() / n;
    let variance = active.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
