#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy archetype selection driven by per-wave special-enemy quotas.
//!
//! Every wave carries a quota of ships and barriers on top of the default
//! chasers. The selector turns the remaining quotas into a cumulative
//! distribution and keeps a chain bias that grows while chasers are picked
//! back to back, so specials become more likely the longer they are held
//! back.

use log::{debug, warn};
use star_warden_core::{EncounterTuning, EnemyArchetype, RandomSource};

/// Special-enemy quotas tracked across a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpawnQuota {
    base_lasers: u32,
    base_ships: u32,
    lasers_remaining: u32,
    ships_remaining: u32,
    chain_bias: u32,
}

impl SpawnQuota {
    /// Barriers granted to every wave from now on.
    #[must_use]
    pub const fn base_lasers(&self) -> u32 {
        self.base_lasers
    }

    /// Ships granted to every wave from now on.
    #[must_use]
    pub const fn base_ships(&self) -> u32 {
        self.base_ships
    }

    /// Barriers still owed in the current wave.
    #[must_use]
    pub const fn lasers_remaining(&self) -> u32 {
        self.lasers_remaining
    }

    /// Ships still owed in the current wave.
    #[must_use]
    pub const fn ships_remaining(&self) -> u32 {
        self.ships_remaining
    }

    /// Bias feeding special-enemy probabilities.
    #[must_use]
    pub const fn chain_bias(&self) -> u32 {
        self.chain_bias
    }
}

/// Picks the archetype of the next enemy to spawn.
#[derive(Clone, Debug)]
pub struct EncounterSelector {
    laser_unlock_wave: u32,
    ship_unlock_wave: u32,
    initial_chain_bias: u32,
    quota: SpawnQuota,
}

impl EncounterSelector {
    /// Creates a selector with empty quotas.
    #[must_use]
    pub fn new(tuning: &EncounterTuning) -> Self {
        Self {
            laser_unlock_wave: tuning.laser_unlock_wave,
            ship_unlock_wave: tuning.ship_unlock_wave,
            initial_chain_bias: tuning.initial_chain_bias,
            quota: SpawnQuota {
                chain_bias: tuning.initial_chain_bias,
                ..SpawnQuota::default()
            },
        }
    }

    /// Current quota snapshot.
    #[must_use]
    pub fn quota(&self) -> SpawnQuota {
        self.quota
    }

    /// Discards all quota growth, returning to the state of a fresh run.
    pub fn reset(&mut self) {
        self.quota = SpawnQuota {
            chain_bias: self.initial_chain_bias,
            ..SpawnQuota::default()
        };
    }

    /// Grows the base quotas for `wave` and refills the per-wave quotas.
    ///
    /// The chain bias carries over between waves.
    pub fn begin_wave(&mut self, wave: u32) {
        if wave >= self.laser_unlock_wave {
            self.quota.base_lasers += 1;
        }
        if wave >= self.ship_unlock_wave {
            self.quota.base_ships += 1;
        }
        self.quota.lasers_remaining = self.quota.base_lasers;
        self.quota.ships_remaining = self.quota.base_ships;
        debug!(
            "wave {wave} quota: {} barriers, {} ships",
            self.quota.lasers_remaining, self.quota.ships_remaining
        );
    }

    /// Selects the next archetype given the enemies still to spawn this wave.
    ///
    /// `remaining` must be positive. A zero value is treated as if every
    /// special had zero probability, so a chaser is returned. Branches with
    /// zero probability are never taken, even on a draw of exactly zero.
    pub fn select_next(
        &mut self,
        remaining: u32,
        wave: u32,
        random: &mut dyn RandomSource,
    ) -> EnemyArchetype {
        debug_assert!(remaining > 0, "select_next requires enemies to spawn");

        let (p_ship, p_laser) = if remaining == 0 {
            warn!("enemy selection requested with nothing left to spawn");
            (0.0, 0.0)
        } else {
            let half_bias = (self.quota.chain_bias / 2) as f32;
            let remaining = remaining as f32;
            let p_ship = self.quota.ships_remaining as f32 * half_bias / remaining;
            let p_laser = p_ship + self.quota.lasers_remaining as f32 * half_bias / remaining;
            (p_ship, p_laser)
        };

        let roll = random.uniform();
        let picked = if self.quota.ships_remaining > 0 && p_ship > 0.0 && roll <= p_ship {
            self.quota.ships_remaining -= 1;
            self.quota.chain_bias = self.special_bias();
            EnemyArchetype::Ship
        } else if self.quota.lasers_remaining > 0 && p_laser > p_ship && roll <= p_laser {
            self.quota.lasers_remaining -= 1;
            self.quota.chain_bias = self.special_bias();
            EnemyArchetype::Barrier
        } else {
            if wave >= self.laser_unlock_wave {
                self.quota.chain_bias += 1;
            }
            EnemyArchetype::Chaser
        };

        debug!(
            "selected {picked:?} (roll {roll:.3}, ship <= {p_ship:.3}, barrier <= {p_laser:.3}, bias {})",
            self.quota.chain_bias
        );
        picked
    }

    fn special_bias(&self) -> u32 {
        self.quota.ships_remaining.max(self.quota.lasers_remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use star_warden_core::ScriptedRandom;

    fn selector_with(quota: SpawnQuota) -> EncounterSelector {
        let mut selector = EncounterSelector::new(&EncounterTuning::default());
        selector.quota = quota;
        selector
    }

    #[test]
    fn odd_chain_bias_truncates_before_scaling() {
        let mut selector = selector_with(SpawnQuota {
            base_lasers: 1,
            base_ships: 1,
            lasers_remaining: 1,
            ships_remaining: 1,
            chain_bias: 3,
        });
        // bias 3 halves to 1: ship <= 0.1, barrier <= 0.2 with ten remaining.
        let mut random = ScriptedRandom::new(vec![0.15]);
        assert_eq!(
            selector.select_next(10, 6, &mut random),
            EnemyArchetype::Barrier
        );
        assert_eq!(selector.quota().lasers_remaining(), 0);
        assert_eq!(selector.quota().chain_bias(), 1);
    }

    #[test]
    fn bias_of_one_keeps_specials_unreachable() {
        let mut selector = selector_with(SpawnQuota {
            base_lasers: 2,
            base_ships: 2,
            lasers_remaining: 2,
            ships_remaining: 2,
            chain_bias: 1,
        });
        let mut random = ScriptedRandom::new(vec![0.0]);
        assert_eq!(selector.select_next(5, 7, &mut random), EnemyArchetype::Chaser);
        assert_eq!(selector.quota().chain_bias(), 2);
    }

    #[test]
    fn chaser_before_unlock_leaves_bias_untouched() {
        let mut selector = EncounterSelector::new(&EncounterTuning::default());
        selector.begin_wave(1);
        let mut random = ScriptedRandom::new(vec![0.5]);
        assert_eq!(selector.select_next(5, 1, &mut random), EnemyArchetype::Chaser);
        assert_eq!(selector.quota().chain_bias(), 0);
    }
}
