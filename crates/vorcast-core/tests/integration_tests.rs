// Integration tests for the valuation engine.
//
// These tests drive the public API end to end: load the fixture pool from
// disk, run full valuation passes against a small inline league, and replay
// a draft pick by pick.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use vorcast_core::config::*;
use vorcast_core::player::{Player, Position, DRAFTABLE_POSITIONS};
use vorcast_core::projections::{load_drafted, load_players, ProjectionError};
use vorcast_core::validate::validate_pool;
use vorcast_core::valuation::dropoff::AlertSeverity;
use vorcast_core::valuation::enhanced::{Adjusters, EnhancedVor};
use vorcast_core::valuation::risk::StandardRiskModel;
use vorcast_core::valuation::scarcity::{scarcity_for_position, ScarcitySeverity};
use vorcast_core::valuation::schedule::{ScheduleScore, TeamSchedules};
use vorcast_core::valuation::supply::Tier;
use vorcast_core::valuation::{run_pass, run_pass_with, ValuationPass};

// ===========================================================================
// Test helpers
// ===========================================================================

/// Fixture directory path (relative to the crate root, which is the cwd for
/// `cargo test`).
const FIXTURES: &str = "tests/fixtures";

/// Players in the fixture pool with a draftable position.
const FIXTURE_PLAYERS: usize = 22;

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

fn fixture(name: &str) -> PathBuf {
    Path::new(FIXTURES).join(name)
}

fn fixture_players() -> Vec<Player> {
    load_players(&fixture("players.json")).expect("fixture players.json should load")
}

/// Two-team league so the small fixture pool spans every severity.
fn inline_config() -> Config {
    let roster = HashMap::from([
        ("QB".to_string(), 1),
        ("RB".to_string(), 2),
        ("WR".to_string(), 2),
        ("TE".to_string(), 1),
        ("FLEX".to_string(), 1),
        ("K".to_string(), 1),
        ("DST".to_string(), 1),
        ("BE".to_string(), 6),
    ]);
    Config {
        league: LeagueConfig {
            name: "Test Integration League".into(),
            platform: "espn".into(),
            num_teams: 2,
            scoring_type: "standard".into(),
            roster,
        },
        valuation: ValuationConfig::default(),
        data_paths: DataPaths {
            players: format!("{FIXTURES}/players.json"),
            drafted: None,
        },
    }
}

fn severity_of(pass: &ValuationPass, position: Position) -> ScarcitySeverity {
    scarcity_for_position(&pass.premiums, position)
        .map(|p| p.severity)
        .expect("every draftable position has a premium entry")
}

fn find<'a>(pass: &'a ValuationPass, id: &str) -> &'a EnhancedVor {
    pass.rankings
        .iter()
        .find(|r| r.player_id == id)
        .unwrap_or_else(|| panic!("{id} should be ranked"))
}

/// Invariants every pass must satisfy regardless of input.
fn assert_pass_invariants(pass: &ValuationPass, drafted: &HashSet<String>) {
    for (idx, r) in pass.rankings.iter().enumerate() {
        assert_eq!(r.overall_rank, idx + 1, "overall ranks must be dense");
        assert!(!drafted.contains(&r.player_id), "{} is drafted", r.player_id);
        assert!(r.scarcity_premium >= 0.0);
        let sum = r.base_vor + r.risk_adjustment + r.schedule_adjustment + r.scarcity_premium;
        assert!(approx_eq(r.enhanced_vor, sum, 1e-9), "{} components", r.player_id);
    }
    for pair in pass.rankings.windows(2) {
        assert!(pair[0].enhanced_vor >= pair[1].enhanced_vor);
    }

    for &pos in DRAFTABLE_POSITIONS {
        let ranks: Vec<usize> = pass
            .rankings
            .iter()
            .filter(|r| r.position == pos)
            .map(|r| r.position_rank)
            .collect();
        let expected: Vec<usize> = (1..=ranks.len()).collect();
        assert_eq!(ranks, expected, "{pos} position ranks");

        let premium = scarcity_for_position(&pass.premiums, pos).map(|p| p.premium);
        for r in pass.rankings.iter().filter(|r| r.position == pos) {
            assert_eq!(Some(r.scarcity_premium), premium);
        }
    }

    for s in &pass.supplies {
        assert_eq!(
            s.tier1_remaining + s.tier2_remaining + s.tier3_remaining,
            s.remaining_count
        );
        assert_eq!(s.drafted_count + s.remaining_count, s.total_players);
    }

    for a in &pass.alerts {
        assert!(a.drop_off_points > 0.0);
        let critical = a.picks_until_drop <= 3;
        assert_eq!(a.severity == AlertSeverity::Critical, critical);
    }
}

// ===========================================================================
// Loading
// ===========================================================================

#[test]
fn json_fixture_skips_unknown_positions() {
    let players = fixture_players();
    assert_eq!(players.len(), FIXTURE_PLAYERS);
    assert!(players.iter().all(|p| p.id != "milano_lb_buf"));

    let dst = players.iter().find(|p| p.id == "ravens_dst_bal").unwrap();
    assert_eq!(dst.position, Position::DST);

    let butker = players.iter().find(|p| p.id == "butker_k_kc").unwrap();
    assert_eq!(butker.adp_rank(), 999.0);

    let kelce = players.iter().find(|p| p.id == "kelce_te_kc").unwrap();
    assert!(kelce.risk.is_some());
}

#[test]
fn csv_fixture_matches_json_fixture() {
    let json = fixture_players();
    let csv = load_players(&fixture("players.csv")).expect("fixture players.csv should load");
    assert_eq!(csv.len(), json.len());

    for (c, j) in csv.iter().zip(&json) {
        assert_eq!(c.id, j.id);
        assert_eq!(c.name, j.name);
        assert_eq!(c.position, j.position);
        assert_eq!(c.team, j.team);
        assert!(approx_eq(c.vor_or_zero(), j.vor_or_zero(), 1e-9), "{}", c.id);
        assert!(approx_eq(c.adp_rank(), j.adp_rank(), 1e-9), "{}", c.id);
        assert_eq!(c.risk.is_some(), j.risk.is_some(), "{}", c.id);
        assert_eq!(c.schedule_score, j.schedule_score, "{}", c.id);
    }
}

#[test]
fn drafted_fixture_ignores_comments() {
    let drafted = load_drafted(&fixture("drafted.txt")).unwrap();
    let expected: HashSet<String> = ["allen_qb_buf", "hurts_qb_phi"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(drafted, expected);
}

#[test]
fn missing_pool_file_is_io_error() {
    let err = load_players(&fixture("nope.json")).unwrap_err();
    assert!(matches!(err, ProjectionError::Io { .. }));
}

#[test]
fn fixture_pool_passes_quality_check() {
    let report = validate_pool(&fixture_players(), FIXTURE_PLAYERS);
    assert!(report.is_valid);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.by_position.get(&Position::RB), Some(&6));
}

// ===========================================================================
// Full pass
// ===========================================================================

#[test]
fn fresh_board_pass() {
    let players = fixture_players();
    let drafted = HashSet::new();
    let pass = run_pass(&players, &drafted, &inline_config());

    assert_pass_invariants(&pass, &drafted);
    assert_eq!(pass.rankings.len(), FIXTURE_PLAYERS);

    // Demand is slots x 2 teams.
    assert_eq!(severity_of(&pass, Position::QB), ScarcitySeverity::Low);
    assert_eq!(severity_of(&pass, Position::RB), ScarcitySeverity::Low);
    assert_eq!(severity_of(&pass, Position::WR), ScarcitySeverity::Low);
    assert_eq!(severity_of(&pass, Position::TE), ScarcitySeverity::Medium);
    assert_eq!(severity_of(&pass, Position::K), ScarcitySeverity::Critical);
    assert_eq!(severity_of(&pass, Position::DST), ScarcitySeverity::Critical);

    let te = scarcity_for_position(&pass.premiums, Position::TE).unwrap();
    assert!(approx_eq(te.premium, 3.3, 1e-9));
    assert!(te.message.as_deref().unwrap().contains("2 expected starters"));

    // Elite cliffs at QB, RB and WR; TE and the kickers are flat.
    let alerts: Vec<(Position, Tier, usize, AlertSeverity)> = pass
        .alerts
        .iter()
        .map(|a| (a.position, a.upper_tier, a.picks_until_drop, a.severity))
        .collect();
    assert_eq!(
        alerts,
        vec![
            (Position::QB, Tier::Elite, 2, AlertSeverity::Critical),
            (Position::RB, Tier::Elite, 4, AlertSeverity::Warning),
            (Position::WR, Tier::Elite, 3, AlertSeverity::Critical),
        ]
    );
    assert!(approx_eq(pass.alerts[0].drop_off_points, 48.5, 1e-9));

    let top: Vec<&str> = pass.rankings[..4].iter().map(|r| r.player_id.as_str()).collect();
    assert_eq!(top, vec!["allen_qb_buf", "robinson_rb_atl", "gibbs_rb_det", "chase_wr_cin"]);

    let allen = find(&pass, "allen_qb_buf");
    assert!(approx_eq(allen.enhanced_vor, 96.2, 1e-9));
    assert_eq!(allen.adp_diff, 13.0);

    let chase = find(&pass, "chase_wr_cin");
    assert_eq!(chase.schedule_adjustment, -2.0);
    assert_eq!(chase.adp_diff, -3.0);

    let kelce = find(&pass, "kelce_te_kc");
    assert!(approx_eq(kelce.risk_adjustment, -3.15, 1e-9));

    // Risk drops Hall below Achane despite the higher base VOR.
    let hall = find(&pass, "hall_rb_nyj");
    let achane = find(&pass, "achane_rb_mia");
    assert!(hall.base_vor > achane.base_vor);
    assert!(hall.overall_rank > achane.overall_rank);

    let butker = find(&pass, "butker_k_kc");
    assert_eq!(butker.adp_diff, 999.0 - butker.overall_rank as f64);
}

#[test]
fn drafting_elite_quarterbacks_raises_qb_scarcity() {
    let players = fixture_players();
    let drafted = load_drafted(&fixture("drafted.txt")).unwrap();
    let pass = run_pass(&players, &drafted, &inline_config());

    assert_pass_invariants(&pass, &drafted);
    assert_eq!(pass.rankings.len(), FIXTURE_PLAYERS - 2);

    let qb = scarcity_for_position(&pass.premiums, Position::QB).unwrap();
    assert_eq!(qb.severity, ScarcitySeverity::High);
    assert!(approx_eq(qb.premium, 4.0, 1e-9));

    // 40 -> 18 is not a cliff at the default threshold.
    assert!(pass.alerts.iter().all(|a| a.position != Position::QB));
    assert_eq!(pass.alerts.len(), 2);

    let stroud = find(&pass, "stroud_qb_hou");
    assert_eq!(stroud.position_rank, 1);
}

#[test]
fn unknown_drafted_ids_are_ignored() {
    let players = fixture_players();
    let config = inline_config();
    let fresh = run_pass(&players, &HashSet::new(), &config);
    let drafted: HashSet<String> = ["not_a_player".to_string()].into_iter().collect();
    assert_eq!(run_pass(&players, &drafted, &config), fresh);
}

#[test]
fn draft_replay_pick_by_pick() {
    let players = fixture_players();
    let config = inline_config();

    let mut order: Vec<&Player> = players.iter().collect();
    order.sort_by(|a, b| a.adp_rank().total_cmp(&b.adp_rank()));

    let mut drafted = HashSet::new();
    let mut prev_qb = severity_of(&run_pass(&players, &drafted, &config), Position::QB);
    for (pick, player) in order.iter().enumerate() {
        drafted.insert(player.id.clone());
        let pass = run_pass(&players, &drafted, &config);

        assert_pass_invariants(&pass, &drafted);
        assert_eq!(pass.rankings.len(), FIXTURE_PLAYERS - pick - 1);

        // Supply only shrinks, so scarcity never eases.
        let qb = severity_of(&pass, Position::QB);
        assert!(qb >= prev_qb, "pick {}: {:?} < {:?}", pick + 1, qb, prev_qb);
        prev_qb = qb;
    }

    let empty = run_pass(&players, &drafted, &config);
    assert!(empty.rankings.is_empty());
    assert!(empty.alerts.is_empty());
    assert!(empty
        .premiums
        .iter()
        .all(|p| p.severity == ScarcitySeverity::Critical));
}

#[test]
fn team_schedules_override_attached_scores() {
    let players = fixture_players();
    let drafted = HashSet::new();
    let schedules = TeamSchedules::new([ScheduleScore::new("DET", vec![1; 17], 5, 8)]);
    let adjusters = Adjusters {
        risk: &StandardRiskModel,
        schedule: &schedules,
    };
    let pass = run_pass_with(&players, &drafted, &inline_config(), &adjusters);
    assert_pass_invariants(&pass, &drafted);

    let gibbs = find(&pass, "gibbs_rb_det");
    assert!(approx_eq(gibbs.schedule_adjustment, 15.0, 1e-9));
    assert_eq!(gibbs.overall_rank, 1);

    // Bijan's attached score is not consulted by the team model.
    assert_eq!(find(&pass, "robinson_rb_atl").schedule_adjustment, 0.0);
}

#[test]
fn schedule_adjustments_can_be_disabled() {
    let players = fixture_players();
    let mut config = inline_config();
    config.valuation.schedule.enabled = false;
    let pass = run_pass(&players, &HashSet::new(), &config);
    assert!(pass.rankings.iter().all(|r| r.schedule_adjustment == 0.0));
}

// ===========================================================================
// Shipped defaults
// ===========================================================================

#[test]
fn shipped_defaults_value_the_fixture_pool() {
    let tmp = std::env::temp_dir().join("vorcast_integration_defaults");
    let _ = std::fs::remove_dir_all(&tmp);
    let defaults = tmp.join("defaults");
    std::fs::create_dir_all(&defaults).unwrap();
    let shipped = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../defaults");
    for name in ["league.toml", "valuation.toml"] {
        std::fs::copy(shipped.join(name), defaults.join(name)).unwrap();
    }

    let copied = ensure_config_files(&tmp).unwrap();
    assert_eq!(copied.len(), 2);
    let config = load_config_from(&tmp).unwrap();
    assert_eq!(config.league.num_teams, 12);

    let players = fixture_players();
    let drafted = HashSet::new();
    let pass = run_pass(&players, &drafted, &config);
    assert_pass_invariants(&pass, &drafted);

    // Twelve teams dwarf the fixture pool.
    assert_eq!(severity_of(&pass, Position::QB), ScarcitySeverity::Medium);
    assert_eq!(severity_of(&pass, Position::TE), ScarcitySeverity::High);

    let _ = std::fs::remove_dir_all(&tmp);
}
