#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reward instance lifecycle and effect activation.
//!
//! A spawned reward is available for pickup for a limited time and blinks
//! before it despawns. Once collected it becomes the active instance of its
//! archetype, replacing any earlier instance, and keeps its effect until it
//! expires. Effects that touch the player's survival state are reported as
//! [`PlayerEffect`] values; everything else is expressed as commands.

use std::time::Duration;

use log::{debug, warn};
use star_warden_core::{
    Command, Cue, EntityHandle, RewardArchetype, RewardId, RewardTuning, Timers,
};

mod registry;

pub use registry::ActivationRegistry;

/// Effects a reward applies to the player's survival state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerEffect {
    /// Restores lives.
    Heal(f32),
    /// Grants or revokes reward invulnerability.
    PowerupInvulnerable(bool),
}

/// Lifecycle stage of a tracked reward instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RewardStage {
    /// Spawned and waiting to be collected.
    Available,
    /// Collected and providing its effect.
    Active,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LifecycleTimer {
    DespawnWarning(RewardId),
    Despawn(RewardId),
    DeactivationWarning(RewardId),
    Expiry(RewardId),
    RapidVolley,
}

#[derive(Clone, Copy, Debug)]
struct RewardInstance {
    reward: RewardId,
    archetype: RewardArchetype,
    stage: RewardStage,
}

/// Owns every reward instance between spawn and removal.
#[derive(Debug)]
pub struct RewardActivation {
    tuning: RewardTuning,
    registry: ActivationRegistry,
    instances: Vec<RewardInstance>,
    text_owner: Option<RewardId>,
    timers: Timers<LifecycleTimer>,
}

impl RewardActivation {
    /// Creates a lifecycle manager with no tracked rewards.
    #[must_use]
    pub fn new(tuning: RewardTuning) -> Self {
        Self {
            tuning,
            registry: ActivationRegistry::new(),
            instances: Vec::new(),
            text_owner: None,
            timers: Timers::new(),
        }
    }

    /// Tears down every active effect and forgets all instances.
    pub fn reset(&mut self, out: &mut Vec<Command>, effects: &mut Vec<PlayerEffect>) {
        for archetype in RewardArchetype::ALL {
            let _ = self.deactivate(archetype, out, effects);
        }
        for instance in self.instances.drain(..) {
            out.push(Command::DestroyEntity {
                entity: EntityHandle::Reward(instance.reward),
                delay: Duration::ZERO,
            });
        }
        if self.text_owner.take().is_some() {
            out.push(Command::HideRewardText);
        }
        self.registry.clear();
        self.timers.clear();
    }

    /// Starts tracking a freshly spawned reward.
    pub fn track_spawn(&mut self, reward: RewardId, archetype: RewardArchetype) {
        if self.instance(reward).is_some() {
            warn!("reward {} is already tracked", reward.get());
            return;
        }
        self.instances.push(RewardInstance {
            reward,
            archetype,
            stage: RewardStage::Available,
        });
        self.timers.schedule(
            LifecycleTimer::DespawnWarning(reward),
            self.tuning.despawn_warning_after(),
        );
        self.timers
            .schedule(LifecycleTimer::Despawn(reward), self.tuning.availability());
    }

    /// Lifecycle stage of `reward`, if it is still tracked.
    #[must_use]
    pub fn stage(&self, reward: RewardId) -> Option<RewardStage> {
        self.instance(reward).map(|instance| instance.stage)
    }

    /// Reports whether an instance of `archetype` is active.
    #[must_use]
    pub fn is_active(&self, archetype: RewardArchetype) -> bool {
        self.registry.is_active(archetype)
    }

    /// Handle of the active instance of `archetype`, if any.
    #[must_use]
    pub fn active_handle(&self, archetype: RewardArchetype) -> Option<RewardId> {
        self.registry.active_handle(archetype)
    }

    /// Activates a collected reward.
    pub fn on_pickup(
        &mut self,
        reward: RewardId,
        out: &mut Vec<Command>,
        effects: &mut Vec<PlayerEffect>,
    ) {
        let Some(instance) = self.instance(reward) else {
            warn!("pickup reported for unknown reward {}", reward.get());
            return;
        };
        if instance.stage != RewardStage::Available {
            warn!("reward {} was already collected", reward.get());
            return;
        }
        let archetype = instance.archetype;

        let _ = self.timers.cancel(LifecycleTimer::DespawnWarning(reward));
        let _ = self.timers.cancel(LifecycleTimer::Despawn(reward));

        out.push(Command::ShowRewardText { archetype });
        out.push(Command::PlayCue {
            cue: Cue::PowerupPickup,
            delay: Duration::ZERO,
        });
        self.text_owner = Some(reward);

        if self.registry.is_active(archetype) {
            let _ = self.deactivate(archetype, out, effects);
        }
        let displaced = self.registry.activate(archetype, reward);
        debug_assert!(displaced.is_none(), "previous instance was torn down");
        self.set_stage(reward, RewardStage::Active);
        self.apply_effect(archetype, out, effects);

        self.timers.schedule(
            LifecycleTimer::DeactivationWarning(reward),
            self.tuning.deactivation_warning_after(),
        );
        self.timers
            .schedule(LifecycleTimer::Expiry(reward), self.tuning.duration());
        debug!("reward {} ({archetype:?}) activated", reward.get());
    }

    /// Ends the effect of the active instance of `archetype` and removes it.
    ///
    /// Returns `false` when no instance was active.
    pub fn deactivate(
        &mut self,
        archetype: RewardArchetype,
        out: &mut Vec<Command>,
        effects: &mut Vec<PlayerEffect>,
    ) -> bool {
        let Some(reward) = self.registry.deactivate(archetype) else {
            return false;
        };
        let _ = self
            .timers
            .cancel(LifecycleTimer::DeactivationWarning(reward));
        let _ = self.timers.cancel(LifecycleTimer::Expiry(reward));
        self.instances.retain(|instance| instance.reward != reward);

        self.revert_effect(archetype, out, effects);
        out.push(Command::DestroyEntity {
            entity: EntityHandle::Reward(reward),
            delay: Duration::ZERO,
        });
        debug!("reward {} ({archetype:?}) deactivated", reward.get());
        true
    }

    /// Advances every lifecycle timer by `dt`.
    pub fn tick(&mut self, dt: Duration, out: &mut Vec<Command>, effects: &mut Vec<PlayerEffect>) {
        self.timers.advance(dt);
        while let Some(timer) = self.timers.pop_expired() {
            match timer {
                LifecycleTimer::DespawnWarning(reward) => {
                    if self.stage(reward) == Some(RewardStage::Available) {
                        out.push(Command::RewardDespawning { reward });
                    }
                }
                LifecycleTimer::Despawn(reward) => {
                    if self.stage(reward) == Some(RewardStage::Available) {
                        self.instances.retain(|instance| instance.reward != reward);
                        out.push(Command::DestroyEntity {
                            entity: EntityHandle::Reward(reward),
                            delay: Duration::ZERO,
                        });
                        debug!("reward {} despawned uncollected", reward.get());
                    }
                }
                LifecycleTimer::DeactivationWarning(reward) => {
                    if let Some(instance) = self.instance(reward) {
                        if instance.archetype.is_lasting() {
                            out.push(Command::RewardDeactivating {
                                reward,
                                archetype: instance.archetype,
                            });
                        }
                    }
                }
                LifecycleTimer::Expiry(reward) => {
                    let Some(archetype) = self.instance(reward).map(|instance| instance.archetype)
                    else {
                        continue;
                    };
                    let _ = self.deactivate(archetype, out, effects);
                    if self.text_owner == Some(reward) {
                        self.text_owner = None;
                        out.push(Command::HideRewardText);
                    }
                }
                LifecycleTimer::RapidVolley => {
                    if self.registry.is_active(RewardArchetype::RapidFire) {
                        out.push(Command::FireRapidVolley);
                        self.timers.schedule(
                            LifecycleTimer::RapidVolley,
                            self.tuning.rapid_fire_interval(),
                        );
                    }
                }
            }
        }
    }

    fn apply_effect(
        &mut self,
        archetype: RewardArchetype,
        out: &mut Vec<Command>,
        effects: &mut Vec<PlayerEffect>,
    ) {
        match archetype {
            RewardArchetype::InstaKill => out.push(Command::SetBulletDamage {
                damage: self.tuning.insta_kill_damage,
            }),
            RewardArchetype::RapidFire => {
                out.push(Command::FireRapidVolley);
                self.timers.schedule(
                    LifecycleTimer::RapidVolley,
                    self.tuning.rapid_fire_interval(),
                );
            }
            RewardArchetype::Invincible => effects.push(PlayerEffect::PowerupInvulnerable(true)),
            RewardArchetype::Heal => effects.push(PlayerEffect::Heal(self.tuning.heal_amount)),
        }
    }

    fn revert_effect(
        &mut self,
        archetype: RewardArchetype,
        out: &mut Vec<Command>,
        effects: &mut Vec<PlayerEffect>,
    ) {
        match archetype {
            RewardArchetype::InstaKill => out.push(Command::SetBulletDamage {
                damage: self.tuning.base_bullet_damage,
            }),
            RewardArchetype::RapidFire => {
                let _ = self.timers.cancel(LifecycleTimer::RapidVolley);
            }
            RewardArchetype::Invincible => effects.push(PlayerEffect::PowerupInvulnerable(false)),
            RewardArchetype::Heal => {}
        }
    }

    fn instance(&self, reward: RewardId) -> Option<&RewardInstance> {
        self.instances
            .iter()
            .find(|instance| instance.reward == reward)
    }

    fn set_stage(&mut self, reward: RewardId, stage: RewardStage) {
        if let Some(instance) = self
            .instances
            .iter_mut()
            .find(|instance| instance.reward == reward)
        {
            instance.stage = stage;
        }
    }
}
