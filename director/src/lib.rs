#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative encounter and progression director for Star Warden.
//!
//! The director owns every gameplay system, routes inbound [`Event`] values
//! to them in a fixed order and collects the [`Command`] values they emit.
//! Adapters never reach into the systems directly; they read state through
//! the [`query`] module.

use std::time::Duration;

use log::{debug, info};
use star_warden_core::{
    Command, DirectorConfig, EnemyId, Event, RandomSource, RewardId, SeededRandom, ViewportBounds,
};
use star_warden_system_reward_activation::{PlayerEffect, RewardActivation};
use star_warden_system_reward_selection::PowerupDirector;
use star_warden_system_survival::PlayerSurvival;
use star_warden_system_waves::WaveScheduler;

pub use star_warden_system_reward_activation::RewardStage;
pub use star_warden_system_survival::{DamageOutcome, SurvivalPhase};
pub use star_warden_system_waves::{SpawnQuota, WavePhase, WaveState};

/// Lifecycle of a run as seen by the director.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No run has started yet.
    Idle,
    /// A run is in progress.
    Running,
    /// The player died and the game-over screen is showing.
    GameOver,
}

/// Owns every system taking part in a run.
#[derive(Debug)]
pub struct Director {
    phase: Phase,
    random: Box<dyn RandomSource>,
    survival: PlayerSurvival,
    waves: WaveScheduler,
    reward_selection: PowerupDirector,
    reward_activation: RewardActivation,
    bounds: ViewportBounds,
    tick_index: u64,
    elapsed: Duration,
    effects: Vec<PlayerEffect>,
}

impl Director {
    /// Creates an idle director drawing randomness from `random`.
    #[must_use]
    pub fn new(config: DirectorConfig, random: Box<dyn RandomSource>) -> Self {
        let DirectorConfig {
            seed: _,
            encounter,
            waves,
            rewards,
            survival,
        } = config;
        Self {
            phase: Phase::Idle,
            random,
            survival: PlayerSurvival::new(survival),
            waves: WaveScheduler::new(waves, encounter),
            reward_selection: PowerupDirector::new(rewards.clone()),
            reward_activation: RewardActivation::new(rewards),
            bounds: ViewportBounds::default(),
            tick_index: 0,
            elapsed: Duration::ZERO,
            effects: Vec::new(),
        }
    }

    /// Creates an idle director seeded from the configuration.
    #[must_use]
    pub fn seeded(config: DirectorConfig) -> Self {
        let random = Box::new(SeededRandom::new(config.seed));
        Self::new(config, random)
    }

    /// Starts a new run, discarding any previous one.
    pub fn start_game(&mut self, out: &mut Vec<Command>) {
        self.reward_activation.reset(out, &mut self.effects);
        self.effects.clear();
        self.survival.reset();
        out.push(Command::UpdateLives {
            lives: self.survival.lives(),
        });
        self.waves.start_game(out);
        self.reward_selection.start_game(self.random.as_mut());
        self.tick_index = 0;
        self.elapsed = Duration::ZERO;
        self.phase = Phase::Running;
        info!("run started");
    }

    /// Advances every system by `dt`.
    pub fn tick(&mut self, dt: Duration, out: &mut Vec<Command>) {
        if self.phase != Phase::Running {
            return;
        }
        self.tick_index = self.tick_index.saturating_add(1);
        self.elapsed = self.elapsed.saturating_add(dt);

        if self.survival.tick(dt, out) {
            self.phase = Phase::GameOver;
            info!(
                "game over on wave {} after {:.1}s",
                self.waves.state().current_wave,
                self.elapsed.as_secs_f32()
            );
            return;
        }

        self.reward_activation.tick(dt, out, &mut self.effects);
        self.apply_effects(out);

        self.waves.tick(dt, self.random.as_mut(), out);

        let first_new = out.len();
        self.reward_selection
            .tick(dt, self.survival.lives(), self.random.as_mut(), out);
        for command in &out[first_new..] {
            if let Command::SpawnReward {
                reward, archetype, ..
            } = command
            {
                debug!("reward {} ({archetype:?}) spawned", reward.get());
                self.reward_activation.track_spawn(*reward, *archetype);
            }
        }
    }

    /// Reports the death of an enemy.
    pub fn on_enemy_killed(&mut self, enemy: EnemyId, out: &mut Vec<Command>) {
        if self.phase == Phase::Running {
            self.waves.on_enemy_killed(enemy, out);
        }
    }

    /// Reports that the player collected a reward.
    pub fn on_pickup(&mut self, reward: RewardId, out: &mut Vec<Command>) {
        if self.phase != Phase::Running {
            return;
        }
        self.reward_activation
            .on_pickup(reward, out, &mut self.effects);
        self.apply_effects(out);
    }

    /// Offers damage to the player.
    pub fn apply_damage(&mut self, amount: f32, out: &mut Vec<Command>) -> DamageOutcome {
        if self.phase != Phase::Running {
            return DamageOutcome::Ignored;
        }
        self.survival.apply_damage(amount, out)
    }

    /// Restores lives outside of the reward system.
    pub fn heal(&mut self, amount: f32, out: &mut Vec<Command>) {
        if self.phase == Phase::Running {
            self.survival.heal(amount, out);
        }
    }

    /// Updates the rectangle used to place spawns.
    pub fn set_viewport(&mut self, bounds: ViewportBounds) {
        self.bounds = bounds;
        self.waves.set_bounds(bounds);
        self.reward_selection.set_bounds(bounds);
    }

    fn apply_effects(&mut self, out: &mut Vec<Command>) {
        for effect in self.effects.drain(..) {
            match effect {
                PlayerEffect::Heal(amount) => self.survival.heal(amount, out),
                PlayerEffect::PowerupInvulnerable(active) => {
                    self.survival.set_powerup_invulnerable(active);
                }
            }
        }
    }
}

/// Applies the provided event to the director, collecting emitted commands.
pub fn apply(director: &mut Director, event: Event, out: &mut Vec<Command>) {
    match event {
        Event::GameStarted => director.start_game(out),
        Event::TimeAdvanced { dt } => director.tick(dt, out),
        Event::EnemyKilled { enemy } => director.on_enemy_killed(enemy, out),
        Event::RewardPickedUp { reward } => director.on_pickup(reward, out),
        Event::PlayerHit { damage } => {
            let _ = director.apply_damage(damage, out);
        }
        Event::PlayerHealed { amount } => director.heal(amount, out),
        Event::ViewportChanged { bounds } => director.set_viewport(bounds),
    }
}

/// Query functions that provide read-only access to the director state.
pub mod query {
    use std::time::Duration;

    use super::{
        Director, Phase, RewardStage, SpawnQuota, SurvivalPhase, WavePhase, WaveState,
    };
    use star_warden_core::{RewardArchetype, RewardId, ViewportBounds};

    /// Lifecycle phase of the current run.
    #[must_use]
    pub fn phase(director: &Director) -> Phase {
        director.phase
    }

    /// Wave counters of the current run.
    #[must_use]
    pub fn wave_state(director: &Director) -> WaveState {
        director.waves.state()
    }

    /// Stage of the wave cycle.
    #[must_use]
    pub fn wave_phase(director: &Director) -> WavePhase {
        director.waves.phase()
    }

    /// Special-enemy quotas of the current wave.
    #[must_use]
    pub fn spawn_quota(director: &Director) -> SpawnQuota {
        director.waves.quota()
    }

    /// Pursuit speed handed to newly spawned chasers.
    #[must_use]
    pub fn chaser_speed(director: &Director) -> f32 {
        director.waves.chaser_speed()
    }

    /// Player's current lives.
    #[must_use]
    pub fn lives(director: &Director) -> f32 {
        director.survival.lives()
    }

    /// Damage intake phase of the player.
    #[must_use]
    pub fn survival_phase(director: &Director) -> SurvivalPhase {
        director.survival.phase()
    }

    /// Reports whether incoming hits are currently ignored.
    #[must_use]
    pub fn is_invulnerable(director: &Director) -> bool {
        director.survival.is_invulnerable()
    }

    /// Reports whether an active reward is what keeps hits away.
    #[must_use]
    pub fn is_powerup_invulnerable(director: &Director) -> bool {
        director.survival.is_powerup_invulnerable()
    }

    /// Guaranteed heals left in this run.
    #[must_use]
    pub fn save_tokens(director: &Director) -> u32 {
        director.reward_selection.save_tokens()
    }

    /// Consecutive picks of `archetype`.
    #[must_use]
    pub fn streak(director: &Director, archetype: RewardArchetype) -> u32 {
        director.reward_selection.streak(archetype)
    }

    /// Reports whether an instance of `archetype` is active.
    #[must_use]
    pub fn is_reward_active(director: &Director, archetype: RewardArchetype) -> bool {
        director.reward_activation.is_active(archetype)
    }

    /// Lifecycle stage of `reward`, if it is still tracked.
    #[must_use]
    pub fn reward_stage(director: &Director, reward: RewardId) -> Option<RewardStage> {
        director.reward_activation.stage(reward)
    }

    /// Rectangle used to place spawns.
    #[must_use]
    pub fn viewport(director: &Director) -> ViewportBounds {
        director.bounds
    }

    /// Number of ticks processed in the current run.
    #[must_use]
    pub fn tick_index(director: &Director) -> u64 {
        director.tick_index
    }

    /// Simulated time elapsed in the current run.
    #[must_use]
    pub fn elapsed(director: &Director) -> Duration {
        director.elapsed
    }
}
