//! Tuning parameters supplied to the director at construction.
//!
//! Durations are stored as seconds so they read naturally in TOML files and
//! are exposed to the systems through [`Duration`] accessors.

use std::time::Duration;

use log::warn;
use serde::Deserialize;
use thiserror::Error;

use crate::EnemyArchetype;

/// Errors reported when a configuration cannot drive a run.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A duration field was negative, not finite, or too large for a [`Duration`].
    #[error("`{field}` must be a non-negative number of seconds that fits a duration (got {value})")]
    InvalidDuration {
        /// Name of the offending field.
        field: &'static str,
        /// Value found in the configuration.
        value: f32,
    },
    /// A cadence that must tick forward was configured as zero.
    #[error("`{field}` must be greater than zero")]
    ZeroInterval {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The lower bound of a range exceeds its upper bound.
    #[error("`{min_field}` ({min}) exceeds `{max_field}` ({max})")]
    InvertedRange {
        /// Name of the lower-bound field.
        min_field: &'static str,
        /// Lower bound found in the configuration.
        min: f32,
        /// Name of the upper-bound field.
        max_field: &'static str,
        /// Upper bound found in the configuration.
        max: f32,
    },
    /// A fraction fell outside `[0, 1]`.
    #[error("`{field}` must lie within [0, 1] (got {value})")]
    FractionOutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Value found in the configuration.
        value: f32,
    },
    /// The reward streak cap was zero, which would divide by zero in the CDF.
    #[error("`max_streak` must be at least 1")]
    ZeroStreakCap,
    /// At most zero enemies were allowed on screen, so no wave could progress.
    #[error("`max_on_screen` must be at least 1")]
    NoScreenCapacity,
    /// Starting lives were outside `(0, max_lives]`.
    #[error("`starting_lives` ({starting}) must lie within (0, {max}]")]
    InvalidLives {
        /// Configured starting lives.
        starting: f32,
        /// Configured life cap.
        max: f32,
    },
}

/// Aggregated tuning for every director component.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct DirectorConfig {
    /// Seed for the run's random stream.
    pub seed: u64,
    /// Enemy selection thresholds and per-archetype profiles.
    pub encounter: EncounterTuning,
    /// Wave sizing, spawn cadence and difficulty ramp.
    pub waves: WaveTuning,
    /// Reward spawn cadence, selection weights and lifecycle.
    pub rewards: RewardTuning,
    /// Player lives, grace window and death sequence.
    pub survival: SurvivalTuning,
}

impl DirectorConfig {
    /// Checks that every parameter describes a playable run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.waves.validate()?;
        self.rewards.validate()?;
        self.survival.validate()?;
        for archetype in EnemyArchetype::ALL {
            check_secs(
                "warning_lead_secs",
                self.encounter.profile(archetype).warning_lead_secs,
            )?;
        }
        Ok(())
    }
}

/// Per-archetype spawn characteristics.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnemyProfile {
    /// Delay between the directional warning and the actual spawn.
    pub warning_lead_secs: f32,
}

impl EnemyProfile {
    /// Delay between the directional warning and the actual spawn.
    #[must_use]
    pub fn warning_lead(&self) -> Duration {
        secs(self.warning_lead_secs)
    }
}

impl Default for EnemyProfile {
    fn default() -> Self {
        Self {
            warning_lead_secs: 1.0,
        }
    }
}

/// Enemy selection tuning.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct EncounterTuning {
    /// First wave whose start grows the barrier quota; chasers also feed the chain bias from here on.
    pub laser_unlock_wave: u32,
    /// First wave whose start grows the ship quota.
    pub ship_unlock_wave: u32,
    /// Chain bias at the start of a run.
    pub initial_chain_bias: u32,
    /// Profile applied to chasers.
    pub chaser: EnemyProfile,
    /// Profile applied to ships.
    pub ship: EnemyProfile,
    /// Profile applied to barriers; barriers spawn on screen and need no warning.
    pub barrier: EnemyProfile,
}

impl EncounterTuning {
    /// Resolves the profile of the provided archetype.
    #[must_use]
    pub fn profile(&self, archetype: EnemyArchetype) -> EnemyProfile {
        match archetype {
            EnemyArchetype::Chaser => self.chaser,
            EnemyArchetype::Ship => self.ship,
            EnemyArchetype::Barrier => self.barrier,
        }
    }
}

impl Default for EncounterTuning {
    fn default() -> Self {
        Self {
            laser_unlock_wave: 4,
            ship_unlock_wave: 6,
            initial_chain_bias: 0,
            chaser: EnemyProfile::default(),
            ship: EnemyProfile::default(),
            barrier: EnemyProfile {
                warning_lead_secs: 0.0,
            },
        }
    }
}

/// Wave sizing, cadence and difficulty ramp.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct WaveTuning {
    /// Enemies added to the wave size every wave.
    pub enemies_per_wave: u32,
    /// Upper bound on enemies alive at once.
    pub max_on_screen: u32,
    /// Interval between spawn attempts while a wave is spawning.
    pub spawn_interval_secs: f32,
    /// Delay between the last kill of a wave and the wave-clear banner.
    pub clear_delay_secs: f32,
    /// Time the wave-clear banner stays up before the next wave starts.
    pub banner_hold_secs: f32,
    /// Viewport distance outside the screen edge where off-screen enemies spawn.
    pub spawn_offset: f32,
    /// Viewport distance inside the screen edge where the warning marker appears.
    pub warning_offset: f32,
    /// Lifetime of a directional warning marker.
    pub warning_lifetime_secs: f32,
    /// Chaser pursuit speed before the first wave ramp is applied.
    pub chaser_base_speed: f32,
    /// Chaser speed added at the start of each wave.
    pub chaser_speed_step: f32,
    /// Ceiling for the chaser speed ramp.
    pub chaser_max_speed: f32,
    /// Player thrust before the first wave ramp is applied.
    pub player_base_thrust: f32,
    /// Thrust added at the start of each wave.
    pub player_thrust_step: f32,
    /// Ceiling for the thrust ramp.
    pub player_max_thrust: f32,
}

impl WaveTuning {
    /// Interval between spawn attempts.
    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        secs(self.spawn_interval_secs)
    }

    /// Delay before the wave-clear banner appears.
    #[must_use]
    pub fn clear_delay(&self) -> Duration {
        secs(self.clear_delay_secs)
    }

    /// Time the wave-clear banner stays up.
    #[must_use]
    pub fn banner_hold(&self) -> Duration {
        secs(self.banner_hold_secs)
    }

    /// Lifetime of a directional warning marker.
    #[must_use]
    pub fn warning_lifetime(&self) -> Duration {
        secs(self.warning_lifetime_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_on_screen == 0 {
            return Err(ConfigError::NoScreenCapacity);
        }
        check_secs("spawn_interval_secs", self.spawn_interval_secs)?;
        if self.spawn_interval_secs == 0.0 {
            return Err(ConfigError::ZeroInterval {
                field: "spawn_interval_secs",
            });
        }
        check_secs("clear_delay_secs", self.clear_delay_secs)?;
        check_secs("banner_hold_secs", self.banner_hold_secs)?;
        check_secs("warning_lifetime_secs", self.warning_lifetime_secs)?;
        check_range(
            "chaser_base_speed",
            self.chaser_base_speed,
            "chaser_max_speed",
            self.chaser_max_speed,
        )?;
        check_range(
            "player_base_thrust",
            self.player_base_thrust,
            "player_max_thrust",
            self.player_max_thrust,
        )
    }
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            enemies_per_wave: 5,
            max_on_screen: 10,
            spawn_interval_secs: 1.5,
            clear_delay_secs: 1.5,
            banner_hold_secs: 5.0,
            spawn_offset: 0.3,
            warning_offset: 0.5,
            warning_lifetime_secs: 2.0,
            chaser_base_speed: 3.4,
            chaser_speed_step: 0.025,
            chaser_max_speed: 4.5,
            player_base_thrust: 5.0,
            player_thrust_step: 1.0,
            player_max_thrust: 100.0,
        }
    }
}

/// Reward spawn cadence, selection weights and lifecycle.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RewardTuning {
    /// Shortest delay between reward spawns.
    pub min_spawn_secs: f32,
    /// Longest delay between reward spawns.
    pub max_spawn_secs: f32,
    /// Consecutive picks of one archetype after which it can no longer be chosen.
    pub max_streak: u32,
    /// Guaranteed heals available per run once the player is on their last life.
    pub save_tokens: u32,
    /// Weight added per archetype in proportion to the player's remaining lives.
    pub health_weight: f32,
    /// Viewport margin kept clear when placing rewards.
    pub spawn_margin: f32,
    /// Time an uncollected reward stays in the world.
    pub availability_secs: f32,
    /// Time a collected reward keeps its effect.
    pub duration_secs: f32,
    /// Fraction of the duration left when the deactivation warning starts.
    pub deactivation_warning_fraction: f32,
    /// Fraction of the availability left when the despawn warning starts.
    pub despawn_warning_fraction: f32,
    /// Bullet damage while insta-kill is active.
    pub insta_kill_damage: f32,
    /// Bullet damage restored when insta-kill ends.
    pub base_bullet_damage: f32,
    /// Interval between extra volleys while rapid fire is active.
    pub rapid_fire_interval_secs: f32,
    /// Lives restored by the heal reward.
    pub heal_amount: f32,
}

impl RewardTuning {
    /// Shortest delay between reward spawns.
    #[must_use]
    pub fn min_spawn(&self) -> Duration {
        secs(self.min_spawn_secs)
    }

    /// Longest delay between reward spawns.
    #[must_use]
    pub fn max_spawn(&self) -> Duration {
        secs(self.max_spawn_secs)
    }

    /// Time an uncollected reward stays in the world.
    #[must_use]
    pub fn availability(&self) -> Duration {
        secs(self.availability_secs)
    }

    /// Time a collected reward keeps its effect.
    #[must_use]
    pub fn duration(&self) -> Duration {
        secs(self.duration_secs)
    }

    /// Delay after spawn at which the despawn warning starts.
    #[must_use]
    pub fn despawn_warning_after(&self) -> Duration {
        secs(self.availability_secs * (1.0 - self.despawn_warning_fraction))
    }

    /// Delay after pickup at which the deactivation warning starts.
    #[must_use]
    pub fn deactivation_warning_after(&self) -> Duration {
        secs(self.duration_secs * (1.0 - self.deactivation_warning_fraction))
    }

    /// Interval between extra volleys while rapid fire is active.
    #[must_use]
    pub fn rapid_fire_interval(&self) -> Duration {
        secs(self.rapid_fire_interval_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_streak == 0 {
            return Err(ConfigError::ZeroStreakCap);
        }
        check_secs("min_spawn_secs", self.min_spawn_secs)?;
        check_secs("max_spawn_secs", self.max_spawn_secs)?;
        check_range(
            "min_spawn_secs",
            self.min_spawn_secs,
            "max_spawn_secs",
            self.max_spawn_secs,
        )?;
        if self.max_spawn_secs == 0.0 {
            return Err(ConfigError::ZeroInterval {
                field: "max_spawn_secs",
            });
        }
        check_secs("availability_secs", self.availability_secs)?;
        check_secs("duration_secs", self.duration_secs)?;
        check_secs("rapid_fire_interval_secs", self.rapid_fire_interval_secs)?;
        if self.rapid_fire_interval_secs == 0.0 {
            return Err(ConfigError::ZeroInterval {
                field: "rapid_fire_interval_secs",
            });
        }
        check_fraction(
            "deactivation_warning_fraction",
            self.deactivation_warning_fraction,
        )?;
        check_fraction("despawn_warning_fraction", self.despawn_warning_fraction)?;
        check_fraction("spawn_margin", self.spawn_margin * 2.0)
    }
}

impl Default for RewardTuning {
    fn default() -> Self {
        Self {
            min_spawn_secs: 30.0,
            max_spawn_secs: 120.0,
            max_streak: 2,
            save_tokens: 3,
            health_weight: 0.08,
            spawn_margin: 0.05,
            availability_secs: 10.0,
            duration_secs: 20.0,
            deactivation_warning_fraction: 0.1,
            despawn_warning_fraction: 0.25,
            insta_kill_damage: 10_000.0,
            base_bullet_damage: 25.0,
            rapid_fire_interval_secs: 0.1,
            heal_amount: 1.0,
        }
    }
}

/// Player lives, grace window and death sequence timing.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SurvivalTuning {
    /// Upper clamp applied when healing.
    pub max_lives: f32,
    /// Lives at the start of a run.
    pub starting_lives: f32,
    /// Invulnerability window after an absorbed hit.
    pub grace_secs: f32,
    /// Delay between a lethal hit and the death cue.
    pub death_cue_delay_secs: f32,
    /// Delay between a lethal hit and the player's removal.
    pub destroy_delay_secs: f32,
    /// Delay between a lethal hit and the game-over screen.
    pub game_over_delay_secs: f32,
}

impl SurvivalTuning {
    /// Invulnerability window after an absorbed hit.
    #[must_use]
    pub fn grace(&self) -> Duration {
        secs(self.grace_secs)
    }

    /// Delay between a lethal hit and the death cue.
    #[must_use]
    pub fn death_cue_delay(&self) -> Duration {
        secs(self.death_cue_delay_secs)
    }

    /// Delay between a lethal hit and the player's removal.
    #[must_use]
    pub fn destroy_delay(&self) -> Duration {
        secs(self.destroy_delay_secs)
    }

    /// Delay between a lethal hit and the game-over screen.
    #[must_use]
    pub fn game_over_delay(&self) -> Duration {
        secs(self.game_over_delay_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.starting_lives > 0.0 && self.starting_lives <= self.max_lives) {
            return Err(ConfigError::InvalidLives {
                starting: self.starting_lives,
                max: self.max_lives,
            });
        }
        check_secs("grace_secs", self.grace_secs)?;
        check_secs("death_cue_delay_secs", self.death_cue_delay_secs)?;
        check_secs("destroy_delay_secs", self.destroy_delay_secs)?;
        check_secs("game_over_delay_secs", self.game_over_delay_secs)
    }
}

impl Default for SurvivalTuning {
    fn default() -> Self {
        Self {
            max_lives: 3.0,
            starting_lives: 3.0,
            grace_secs: 3.0,
            death_cue_delay_secs: 0.25,
            destroy_delay_secs: 0.5,
            game_over_delay_secs: 0.4,
        }
    }
}

fn secs(value: f32) -> Duration {
    match Duration::try_from_secs_f32(value) {
        Ok(duration) => duration,
        Err(error) => {
            warn!("unusable duration of {value}s ({error}), falling back to zero");
            Duration::ZERO
        }
    }
}

fn check_secs(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if Duration::try_from_secs_f32(value).is_ok() {
        Ok(())
    } else {
        Err(ConfigError::InvalidDuration { field, value })
    }
}

fn check_range(
    min_field: &'static str,
    min: f32,
    max_field: &'static str,
    max: f32,
) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange {
            min_field,
            min,
            max_field,
            max,
        })
    }
}

fn check_fraction(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::FractionOutOfRange { field, value })
    }
}
