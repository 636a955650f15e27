//! Cash mines: passive income paid out in rounds of coin flips.
//!
//! Each profile carries its own [`MineSchedule`]. Rounds are anchored to the
//! schedule rather than to when the frame loop happens to poll, so a slow or
//! throttled frame rate does not stretch the cadence.

use std::collections::BTreeSet;

use rand::Rng;
use tracing::debug;

use super::catalog::ItemEffect;
use super::state::{PixelState, Profile};
use crate::config::GameConfig;

/// Per-profile timer. Runtime only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MineSchedule {
    /// `now_ms` at which the next round is due; `None` while idle.
    pub next_tick_at: Option<f64>,
}

/// One paid-out round.
#[derive(Debug, Clone, PartialEq)]
pub struct MineReport {
    /// Index into `PixelState::profiles`.
    pub profile: usize,
    pub coins: u32,
    pub heads: u32,
    pub credited: u64,
}

/// Coins flipped per round: one per owned coin item.
pub fn coin_count(profile: &Profile, global: &BTreeSet<&'static str>) -> u32 {
    profile
        .owned_items(global)
        .filter(|item| item.effect == ItemEffect::MineCoin)
        .count() as u32
}

/// Milliseconds between rounds: the fastest owned drill, else the base rate.
pub fn interval_ms(profile: &Profile, global: &BTreeSet<&'static str>, config: &GameConfig) -> f64 {
    profile
        .owned_items(global)
        .filter_map(|item| match item.effect {
            ItemEffect::MineInterval(ms) => Some(ms),
            _ => None,
        })
        .min()
        .unwrap_or(config.mine_interval_ms) as f64
}

/// Cash credited per head.
pub fn payout_per_head(profile: &Profile, global: &BTreeSet<&'static str>, config: &GameConfig) -> u64 {
    profile
        .owned_items(global)
        .filter_map(|item| match item.effect {
            ItemEffect::MinePayout(mult) => Some(mult),
            _ => None,
        })
        .fold(config.mine_payout, |acc, mult| acc.saturating_mul(mult))
}

/// Advance one profile's schedule to `now_ms`, paying out every round due.
fn poll_profile<R: Rng>(
    index: usize,
    profile: &mut Profile,
    global: &BTreeSet<&'static str>,
    rng: &mut R,
    config: &GameConfig,
    now_ms: f64,
) -> Vec<MineReport> {
    let coins = coin_count(profile, global);
    if coins == 0 {
        profile.mine.next_tick_at = None;
        return Vec::new();
    }
    let interval = interval_ms(profile, global, config);
    let payout = payout_per_head(profile, global, config);

    let Some(mut next) = profile.mine.next_tick_at else {
        profile.mine.next_tick_at = Some(now_ms + interval);
        return Vec::new();
    };

    let mut reports = Vec::new();
    let mut rounds = 0;
    while now_ms >= next && rounds < config.mine_max_catch_up {
        let heads = (0..coins).filter(|_| rng.gen_bool(0.5)).count() as u32;
        let credited = payout.saturating_mul(heads as u64);
        profile.earn(credited);
        reports.push(MineReport {
            profile: index,
            coins,
            heads,
            credited,
        });
        next += interval;
        rounds += 1;
    }
    if now_ms >= next {
        debug!(profile = index, rounds, "mine fell behind; skipping missed rounds");
        next = now_ms + interval;
    }
    profile.mine.next_tick_at = Some(next);
    reports
}

/// Poll every profile's mine, not just the active one.
pub fn poll_mines(state: &mut PixelState, config: &GameConfig, now_ms: f64) -> Vec<MineReport> {
    let PixelState {
        profiles,
        global_unlocks,
        rng,
        ..
    } = state;
    let mut reports = Vec::new();
    for (index, profile) in profiles.iter_mut().enumerate() {
        reports.extend(poll_profile(index, profile, global_unlocks, rng, config, now_ms));
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;

    fn miner(items: &[&'static str]) -> PixelState {
        let mut state = PixelState::new(7);
        state.profile_mut().purchased.extend_from_slice(items);
        state
    }

    #[test]
    fn no_coins_means_idle() {
        let mut state = PixelState::new(1);
        state.profile_mut().mine.next_tick_at = Some(10.0);
        let reports = poll_mines(&mut state, &GameConfig::default(), 100_000.0);
        assert!(reports.is_empty());
        assert_eq!(state.profile().mine.next_tick_at, None);
    }

    #[test]
    fn first_poll_schedules_a_full_interval_out() {
        let mut state = miner(&["cash-mine"]);
        let reports = poll_mines(&mut state, &GameConfig::default(), 1_000.0);
        assert!(reports.is_empty());
        assert_eq!(state.profile().mine.next_tick_at, Some(6_000.0));
    }

    #[test]
    fn rounds_are_anchored_to_the_schedule() {
        let config = GameConfig::default();
        let mut state = miner(&["cash-mine"]);
        poll_mines(&mut state, &config, 0.0);
        // Poll late; the next round is still 10_000, not 5_700 + 5_000.
        let reports = poll_mines(&mut state, &config, 5_700.0);
        assert_eq!(reports.len(), 1);
        assert_eq!(state.profile().mine.next_tick_at, Some(10_000.0));
    }

    #[test]
    fn catch_up_pays_every_missed_round() {
        let config = GameConfig::default();
        let mut state = miner(&["cash-mine"]);
        poll_mines(&mut state, &config, 0.0);
        let reports = poll_mines(&mut state, &config, 15_000.0);
        assert_eq!(reports.len(), 3);
        assert_eq!(state.profile().mine.next_tick_at, Some(20_000.0));
    }

    #[test]
    fn catch_up_is_capped_then_skips_ahead() {
        let config = GameConfig {
            mine_max_catch_up: 4,
            ..GameConfig::default()
        };
        let mut state = miner(&["cash-mine"]);
        poll_mines(&mut state, &config, 0.0);
        let reports = poll_mines(&mut state, &config, 1_000_000.0);
        assert_eq!(reports.len(), 4);
        assert_eq!(state.profile().mine.next_tick_at, Some(1_005_000.0));
    }

    #[test]
    fn credited_cash_matches_heads_and_payout() {
        let config = GameConfig::default();
        let mut state = miner(&["cash-mine", "mine-shaft", "deep-mine", "gilded-coins"]);
        poll_mines(&mut state, &config, 0.0);
        let reports = poll_mines(&mut state, &config, 50_000.0);
        let mut total = 0;
        for r in &reports {
            assert_eq!(r.coins, 3);
            assert!(r.heads <= 3);
            assert_eq!(r.credited, r.heads as u64 * 10);
            total += r.credited;
        }
        assert_eq!(state.profile().cash, total);
        assert_eq!(state.profile().lifetime_cash, total);
    }

    #[test]
    fn fastest_drill_wins() {
        let config = GameConfig::default();
        let global = BTreeSet::new();
        let mut p = Profile::new(1);
        p.purchased = vec!["cash-mine"];
        assert_eq!(interval_ms(&p, &global, &config), 5_000.0);
        p.purchased.push("mine-drill");
        assert_eq!(interval_ms(&p, &global, &config), 3_000.0);
        p.purchased.push("mine-turbo");
        assert_eq!(interval_ms(&p, &global, &config), 1_500.0);
    }

    #[test]
    fn payout_multipliers_stack() {
        let config = GameConfig::default();
        let global = BTreeSet::new();
        let mut p = Profile::new(1);
        assert_eq!(payout_per_head(&p, &global, &config), 5);
        p.purchased = vec!["gilded-coins", "mother-lode"];
        assert_eq!(payout_per_head(&p, &global, &config), 30);
    }

    #[test]
    fn inactive_profiles_keep_mining() {
        let config = GameConfig::default();
        let mut state = miner(&["cash-mine"]);
        let mut other = Profile::new(2);
        other.purchased.push("cash-mine");
        state.profiles.push(other);
        state.active = 1;
        poll_mines(&mut state, &config, 0.0);
        let reports = poll_mines(&mut state, &config, 5_000.0);
        let profiles: Vec<usize> = reports.iter().map(|r| r.profile).collect();
        assert_eq!(profiles, vec![0, 1]);
    }

    #[test]
    fn same_seed_same_flips() {
        let config = GameConfig::default();
        let run = || {
            let mut state = miner(&["cash-mine", "mine-shaft"]);
            poll_mines(&mut state, &config, 0.0);
            poll_mines(&mut state, &config, 60_000.0)
        };
        assert_eq!(run(), run());
    }
}
