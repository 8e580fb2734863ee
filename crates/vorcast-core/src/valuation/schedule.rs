// Schedule strength: matchup ratings, strength of schedule, and the VOR
// adjustment the ranker pulls through `ScheduleModel`.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::ScheduleSettings;
use crate::player::Player;

// ---------------------------------------------------------------------------
// Schedule adjustment seam
// ---------------------------------------------------------------------------

/// Supplies a signed schedule adjustment (in VOR points) for a player.
pub trait ScheduleModel {
    fn schedule_adjustment(&self, player: &Player, settings: &ScheduleSettings) -> f64;
}

/// Uses the schedule score already attached to each player record.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttachedScheduleScores;

impl ScheduleModel for AttachedScheduleScores {
    fn schedule_adjustment(&self, player: &Player, settings: &ScheduleSettings) -> f64 {
        if !settings.enabled {
            return 0.0;
        }
        player.schedule_score.unwrap_or(0.0) * settings.weight
    }
}

/// Looks up each player's team schedule. Kickers and defenses get nothing.
#[derive(Debug, Clone, Default)]
pub struct TeamSchedules {
    by_team: HashMap<String, ScheduleScore>,
}

impl TeamSchedules {
    pub fn new(scores: impl IntoIterator<Item = ScheduleScore>) -> Self {
        TeamSchedules {
            by_team: scores.into_iter().map(|s| (s.team.clone(), s)).collect(),
        }
    }

    pub fn get(&self, team: &str) -> Option<&ScheduleScore> {
        self.by_team.get(team)
    }
}

impl ScheduleModel for TeamSchedules {
    fn schedule_adjustment(&self, player: &Player, settings: &ScheduleSettings) -> f64 {
        if !settings.enabled || !player.position.is_schedule_sensitive() {
            return 0.0;
        }
        self.get(&player.team)
            .map(|s| s.adjustment() * settings.weight)
            .unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Strength of schedule
// ---------------------------------------------------------------------------

/// First and last fantasy playoff weeks (1-based, inclusive).
const PLAYOFF_WEEKS: (usize, usize) = (14, 17);

/// Per-team schedule analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleScore {
    pub team: String,
    /// -1 (easiest) to 1 (hardest), full season.
    pub sos_overall: f64,
    /// -1 to 1 over the playoff weeks.
    pub sos_playoffs: f64,
    /// 1 (easy) to 5 (hard) per week.
    pub weekly_matchups: Vec<u8>,
    pub bye_week: u8,
    pub dome_games: u8,
}

impl ScheduleScore {
    pub fn new(team: &str, weekly_matchups: Vec<u8>, bye_week: u8, dome_games: u8) -> Self {
        ScheduleScore {
            team: team.to_string(),
            sos_overall: strength_of_schedule(&weekly_matchups, &default_week_weight),
            sos_playoffs: playoff_strength(&weekly_matchups),
            weekly_matchups,
            bye_week,
            dome_games,
        }
    }

    /// VOR adjustment in [-15, 15], weighted toward the playoffs. Harder
    /// schedules are negative.
    pub fn adjustment(&self) -> f64 {
        let combined = self.sos_overall * 0.4 + self.sos_playoffs * 0.6;
        round_to(-combined * 15.0, 1)
    }
}

/// Rate a matchup from 1 (easy) to 5 (hard) by opponent defensive rank
/// (1 = best defense). Dome games play one notch easier.
pub fn matchup_rating(def_rank: u8, is_dome: bool) -> u8 {
    let rating = match def_rank {
        0..=6 => 5,
        7..=12 => 4,
        13..=20 => 3,
        21..=26 => 2,
        _ => 1,
    };
    if is_dome && rating > 1 {
        rating - 1
    } else {
        rating
    }
}

/// Week weights: early weeks count less, playoff weeks more.
pub fn default_week_weight(week: usize) -> f64 {
    match week {
        1..=4 => 0.8,
        14..=17 => 1.5,
        _ => 1.0,
    }
}

/// Weighted strength of schedule over the season, -1 to 1.
pub fn strength_of_schedule(weekly_matchups: &[u8], week_weight: &dyn Fn(usize) -> f64) -> f64 {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    for (idx, &rating) in weekly_matchups.iter().enumerate() {
        let weight = week_weight(idx + 1);
        weighted_sum += normalize_rating(rating as f64) * weight;
        total_weight += weight;
    }
    if total_weight == 0.0 {
        return 0.0;
    }
    round_to((weighted_sum / total_weight).clamp(-1.0, 1.0), 3)
}

/// Unweighted strength of schedule over the playoff weeks. 0 when the
/// schedule does not reach them.
pub fn playoff_strength(weekly_matchups: &[u8]) -> f64 {
    let (first, last) = PLAYOFF_WEEKS;
    let Some(playoffs) = weekly_matchups.get(first - 1..last) else {
        return 0.0;
    };
    let avg = playoffs.iter().map(|&r| r as f64).sum::<f64>() / playoffs.len() as f64;
    round_to(normalize_rating(avg).clamp(-1.0, 1.0), 3)
}

/// Map a 1-5 rating onto -1..1 (3 is neutral).
fn normalize_rating(rating: f64) -> f64 {
    (rating - 3.0) / 2.0
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
