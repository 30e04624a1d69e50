#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player lives, post-hit grace window and death sequence.

use std::time::Duration;

use log::{debug, info, warn};
use star_warden_core::{Command, Cue, EntityHandle, SurvivalTuning, Timers};

/// Result of offering damage to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The hit was discarded without changing any state.
    Ignored,
    /// Lives were removed and the grace window started.
    Absorbed,
    /// Lives reached zero and the death sequence started.
    Lethal,
}

/// Damage intake state of the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurvivalPhase {
    /// Hits are accepted unless a reward grants invulnerability.
    Vulnerable,
    /// A hit was just absorbed; further hits are ignored until the window ends.
    Grace,
    /// Lives ran out; hits are ignored until the run is reset.
    Dead,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SurvivalTimer {
    GraceExpiry,
    GameOver,
}

/// Owns the player's lives and decides whether incoming hits land.
#[derive(Debug)]
pub struct PlayerSurvival {
    tuning: SurvivalTuning,
    lives: f32,
    phase: SurvivalPhase,
    powerup_invulnerable: bool,
    timers: Timers<SurvivalTimer>,
}

impl PlayerSurvival {
    /// Creates the survival state for a fresh run.
    #[must_use]
    pub fn new(tuning: SurvivalTuning) -> Self {
        Self {
            lives: tuning.starting_lives,
            tuning,
            phase: SurvivalPhase::Vulnerable,
            powerup_invulnerable: false,
            timers: Timers::new(),
        }
    }

    /// Restores starting lives and clears every pending timer.
    pub fn reset(&mut self) {
        self.lives = self.tuning.starting_lives;
        self.phase = SurvivalPhase::Vulnerable;
        self.powerup_invulnerable = false;
        self.timers.clear();
    }

    /// Current lives.
    #[must_use]
    pub fn lives(&self) -> f32 {
        self.lives
    }

    /// Current damage intake phase.
    #[must_use]
    pub fn phase(&self) -> SurvivalPhase {
        self.phase
    }

    /// Reports whether hits are currently ignored.
    #[must_use]
    pub fn is_invulnerable(&self) -> bool {
        self.phase != SurvivalPhase::Vulnerable || self.powerup_invulnerable
    }

    /// Reports whether a reward currently grants invulnerability.
    #[must_use]
    pub fn is_powerup_invulnerable(&self) -> bool {
        self.powerup_invulnerable
    }

    /// Time left in the post-hit grace window.
    #[must_use]
    pub fn grace_remaining(&self) -> Option<Duration> {
        self.timers.remaining(SurvivalTimer::GraceExpiry)
    }

    /// Offers `amount` of damage to the player.
    pub fn apply_damage(&mut self, amount: f32, out: &mut Vec<Command>) -> DamageOutcome {
        if !(amount.is_finite() && amount >= 0.0) {
            warn!("discarding invalid damage amount {amount}");
            return DamageOutcome::Ignored;
        }
        if self.is_invulnerable() {
            debug!("hit ignored during {:?}", self.phase);
            return DamageOutcome::Ignored;
        }

        self.lives = (self.lives - amount).max(0.0);
        out.push(Command::UpdateLives { lives: self.lives });
        out.push(Command::PlayCue {
            cue: Cue::PlayerHit,
            delay: Duration::ZERO,
        });

        if self.lives <= 0.0 {
            info!("player destroyed");
            self.phase = SurvivalPhase::Dead;
            out.push(Command::PlayCue {
                cue: Cue::PlayerDeath,
                delay: self.tuning.death_cue_delay(),
            });
            out.push(Command::DestroyEntity {
                entity: EntityHandle::Player,
                delay: self.tuning.destroy_delay(),
            });
            self.timers
                .schedule(SurvivalTimer::GameOver, self.tuning.game_over_delay());
            DamageOutcome::Lethal
        } else {
            debug!("hit absorbed, {} lives left", self.lives);
            self.phase = SurvivalPhase::Grace;
            self.timers
                .schedule(SurvivalTimer::GraceExpiry, self.tuning.grace());
            DamageOutcome::Absorbed
        }
    }

    /// Restores up to `amount` lives, clamped to the life cap.
    pub fn heal(&mut self, amount: f32, out: &mut Vec<Command>) {
        if self.phase == SurvivalPhase::Dead {
            warn!("heal of {amount} ignored after the player died");
            return;
        }
        if !(amount.is_finite() && amount >= 0.0) {
            warn!("discarding invalid heal amount {amount}");
            return;
        }
        self.lives = (self.lives + amount).min(self.tuning.max_lives);
        out.push(Command::UpdateLives { lives: self.lives });
    }

    /// Sets the reward-granted invulnerability, ORed with the grace window.
    pub fn set_powerup_invulnerable(&mut self, invulnerable: bool) {
        self.powerup_invulnerable = invulnerable;
    }

    /// Advances the grace and death timers.
    ///
    /// Returns `true` on the tick the game-over screen is requested.
    pub fn tick(&mut self, dt: Duration, out: &mut Vec<Command>) -> bool {
        self.timers.advance(dt);
        let mut game_over = false;
        while let Some(timer) = self.timers.pop_expired() {
            match timer {
                SurvivalTimer::GraceExpiry => {
                    if self.phase == SurvivalPhase::Grace {
                        self.phase = SurvivalPhase::Vulnerable;
                        debug!("grace window ended");
                    }
                }
                SurvivalTimer::GameOver => {
                    out.push(Command::ShowGameOver);
                    game_over = true;
                }
            }
        }
        game_over
    }
}
