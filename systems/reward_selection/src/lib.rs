#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reward spawn cadence and archetype selection.
//!
//! Rewards appear after a delay drawn uniformly from the configured range.
//! The archetype is chosen through a cumulative distribution that penalises
//! repeats, leans slightly toward the lasting rewards while the player is
//! healthy, and guarantees a heal while save tokens remain and the player is
//! down to their last life.

use std::time::Duration;

use log::{debug, info, warn};
use star_warden_core::{
    Command, Cue, RandomSource, RewardArchetype, RewardId, RewardTuning, Timers, ViewportBounds,
    ViewportPoint,
};

/// Lives that correspond to the full health weight.
const FULL_HEALTH_LIVES: f32 = 3.0;
/// Blend anchor applied to the second archetype of the distribution.
const SECOND_ANCHOR: f32 = 0.33;
/// Blend anchor applied to the third archetype of the distribution.
const THIRD_ANCHOR: f32 = 0.66;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SelectionTimer {
    NextSpawn,
}

/// Periodically spawns rewards and decides their archetype.
#[derive(Debug)]
pub struct PowerupDirector {
    tuning: RewardTuning,
    streaks: [u32; RewardArchetype::COUNT],
    save_tokens: u32,
    running: bool,
    bounds: ViewportBounds,
    next_reward: u32,
    timers: Timers<SelectionTimer>,
}

impl PowerupDirector {
    /// Creates an idle director with a full save token pool.
    #[must_use]
    pub fn new(tuning: RewardTuning) -> Self {
        Self {
            save_tokens: tuning.save_tokens,
            tuning,
            streaks: [0; RewardArchetype::COUNT],
            running: false,
            bounds: ViewportBounds::default(),
            next_reward: 0,
            timers: Timers::new(),
        }
    }

    /// Stops spawning and restores streaks and save tokens.
    pub fn reset(&mut self) {
        self.streaks = [0; RewardArchetype::COUNT];
        self.save_tokens = self.tuning.save_tokens;
        self.running = false;
        self.timers.clear();
    }

    /// Starts a run and draws the delay before the first reward.
    pub fn start_game(&mut self, random: &mut dyn RandomSource) {
        self.reset();
        self.running = true;
        self.schedule_next(random);
    }

    /// Updates the rectangle used to map viewport positions into the world.
    pub fn set_bounds(&mut self, bounds: ViewportBounds) {
        self.bounds = bounds;
    }

    /// Consecutive picks of `archetype`; always zero for heals.
    #[must_use]
    pub fn streak(&self, archetype: RewardArchetype) -> u32 {
        self.streaks[archetype.index()]
    }

    /// Guaranteed heals left in this run.
    #[must_use]
    pub fn save_tokens(&self) -> u32 {
        self.save_tokens
    }

    /// Time left before the next reward spawns.
    #[must_use]
    pub fn until_next_spawn(&self) -> Option<Duration> {
        self.timers.remaining(SelectionTimer::NextSpawn)
    }

    /// Advances the spawn timer, spawning a reward on expiry.
    pub fn tick(
        &mut self,
        dt: Duration,
        lives: f32,
        random: &mut dyn RandomSource,
        out: &mut Vec<Command>,
    ) {
        if !self.running {
            return;
        }

        self.timers.advance(dt);
        while let Some(SelectionTimer::NextSpawn) = self.timers.pop_expired() {
            self.spawn(lives, random, out);
            self.schedule_next(random);
        }
    }

    /// Chooses the archetype of the next reward for a player with `lives`.
    ///
    /// The archetype currently on a streak is evaluated first so that the
    /// repeat penalty applies to the head of the distribution.
    pub fn select_reward(&mut self, lives: f32, random: &mut dyn RandomSource) -> RewardArchetype {
        let forced_heal = lives <= 1.0 && self.save_tokens > 0;
        let scale = if forced_heal { 0.0 } else { 1.0 };

        let order = self.evaluation_order();
        let max = self.tuning.max_streak as f32;
        let kinds = RewardArchetype::COUNT as f32;
        let health = lives / FULL_HEALTH_LIVES * self.tuning.health_weight;
        let base = |streak: u32| {
            let headroom = max - streak as f32;
            headroom / (kinds * max) + health * headroom / 2.0
        };
        let headroom = |archetype: RewardArchetype| (max - self.streak(archetype) as f32) / 2.0;

        let p1 = base(self.streak(order[0])) * scale;
        let p2 = ((p1 + (p1 - SECOND_ANCHOR).abs() / 2.0) * headroom(order[1])
            + base(self.streak(order[1])))
            * scale;
        let p3 = ((p2 + (p2 - THIRD_ANCHOR).abs()) * headroom(order[2])
            + base(self.streak(order[2])))
            * scale;

        let roll = random.uniform();
        let picked = if p1 > 0.0 && roll <= p1 {
            order[0]
        } else if p2 > p1 && roll <= p2 {
            order[1]
        } else if p3 > p2 && roll <= p3 {
            order[2]
        } else {
            RewardArchetype::Heal
        };

        if picked == RewardArchetype::Heal && forced_heal {
            self.save_tokens -= 1;
            info!("save token spent, {} left", self.save_tokens);
        }
        self.record_pick(picked);

        debug!(
            "selected {picked:?} (roll {roll:.3}, cdf {p1:.3}/{p2:.3}/{p3:.3}, lives {lives})"
        );
        picked
    }

    fn evaluation_order(&self) -> [RewardArchetype; 3] {
        if self.streak(RewardArchetype::RapidFire) >= 1 {
            [
                RewardArchetype::RapidFire,
                RewardArchetype::InstaKill,
                RewardArchetype::Invincible,
            ]
        } else if self.streak(RewardArchetype::Invincible) >= 1 {
            [
                RewardArchetype::Invincible,
                RewardArchetype::InstaKill,
                RewardArchetype::RapidFire,
            ]
        } else {
            RewardArchetype::STREAKING
        }
    }

    fn record_pick(&mut self, picked: RewardArchetype) {
        for archetype in RewardArchetype::ALL {
            let streak = &mut self.streaks[archetype.index()];
            if archetype == picked && picked.is_lasting() {
                *streak += 1;
            } else {
                *streak = 0;
            }
        }
    }

    fn spawn(&mut self, lives: f32, random: &mut dyn RandomSource, out: &mut Vec<Command>) {
        let archetype = self.select_reward(lives, random);
        let low = self.tuning.spawn_margin;
        let high = 1.0 - self.tuning.spawn_margin;
        let x = random.range(low, high);
        let y = random.range(low, high);

        let reward = RewardId::new(self.next_reward);
        self.next_reward = self.next_reward.wrapping_add(1);

        out.push(Command::SpawnReward {
            reward,
            archetype,
            position: self.bounds.to_world(ViewportPoint::new(x, y)),
        });
        out.push(Command::PlayCue {
            cue: Cue::PowerupSpawn,
            delay: Duration::ZERO,
        });
    }

    fn schedule_next(&mut self, random: &mut dyn RandomSource) {
        let min = self.tuning.min_spawn();
        let span = self.tuning.max_spawn().saturating_sub(min);
        let fraction = random.uniform();
        let extra = Duration::try_from_secs_f32(span.as_secs_f32() * fraction)
            .unwrap_or_else(|error| {
                warn!("reward delay of {span:?} x {fraction} is unusable ({error})");
                span
            });
        let delay = min.saturating_add(extra);
        debug!("next reward in {:.1}s", delay.as_secs_f32());
        self.timers.schedule(SelectionTimer::NextSpawn, delay);
    }
}
