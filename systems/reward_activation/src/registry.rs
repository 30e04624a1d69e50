//! At-most-one-active-instance bookkeeping per reward archetype.

use log::warn;
use star_warden_core::{RewardArchetype, RewardId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Tracked {
    handle: RewardId,
    active: bool,
}

/// Tracks which reward instance currently provides each archetype's effect.
#[derive(Clone, Debug, Default)]
pub struct ActivationRegistry {
    entries: [Option<Tracked>; RewardArchetype::COUNT],
}

impl ActivationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `handle` as the active instance of `archetype`.
    ///
    /// Returns the previously active handle, which the caller must tear
    /// down. Re-activating the handle that is already active is a no-op.
    pub fn activate(&mut self, archetype: RewardArchetype, handle: RewardId) -> Option<RewardId> {
        let slot = &mut self.entries[archetype.index()];
        let displaced = match slot {
            Some(tracked) if tracked.active && tracked.handle == handle => {
                debug_assert!(false, "reward {} activated twice", handle.get());
                warn!("reward {} is already active", handle.get());
                return None;
            }
            Some(tracked) if tracked.active => Some(tracked.handle),
            _ => None,
        };
        *slot = Some(Tracked {
            handle,
            active: true,
        });
        displaced
    }

    /// Marks `archetype` inactive, returning the handle that was active.
    pub fn deactivate(&mut self, archetype: RewardArchetype) -> Option<RewardId> {
        match &mut self.entries[archetype.index()] {
            Some(tracked) if tracked.active => {
                tracked.active = false;
                Some(tracked.handle)
            }
            _ => None,
        }
    }

    /// Reports whether an instance of `archetype` is active.
    #[must_use]
    pub fn is_active(&self, archetype: RewardArchetype) -> bool {
        self.active_handle(archetype).is_some()
    }

    /// Handle of the active instance of `archetype`, if any.
    #[must_use]
    pub fn active_handle(&self, archetype: RewardArchetype) -> Option<RewardId> {
        self.entries[archetype.index()]
            .filter(|tracked| tracked.active)
            .map(|tracked| tracked.handle)
    }

    /// Forgets every instance.
    pub fn clear(&mut self) {
        self.entries = [None; RewardArchetype::COUNT];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activate_then_deactivate_leaves_others_untouched() {
        let mut registry = ActivationRegistry::new();
        assert_eq!(
            registry.activate(RewardArchetype::InstaKill, RewardId::new(1)),
            None
        );
        assert_eq!(
            registry.activate(RewardArchetype::Invincible, RewardId::new(2)),
            None
        );

        assert_eq!(
            registry.deactivate(RewardArchetype::InstaKill),
            Some(RewardId::new(1))
        );
        assert!(!registry.is_active(RewardArchetype::InstaKill));
        assert!(registry.is_active(RewardArchetype::Invincible));
        assert_eq!(
            registry.active_handle(RewardArchetype::Invincible),
            Some(RewardId::new(2))
        );
    }

    #[test]
    fn second_instance_displaces_first() {
        let mut registry = ActivationRegistry::new();
        let _ = registry.activate(RewardArchetype::RapidFire, RewardId::new(1));
        assert_eq!(
            registry.activate(RewardArchetype::RapidFire, RewardId::new(4)),
            Some(RewardId::new(1))
        );
        assert_eq!(
            registry.active_handle(RewardArchetype::RapidFire),
            Some(RewardId::new(4))
        );
    }

    #[test]
    fn deactivating_twice_is_harmless() {
        let mut registry = ActivationRegistry::new();
        let _ = registry.activate(RewardArchetype::Heal, RewardId::new(3));
        assert!(registry.deactivate(RewardArchetype::Heal).is_some());
        assert!(registry.deactivate(RewardArchetype::Heal).is_none());
        assert!(registry.deactivate(RewardArchetype::InstaKill).is_none());
    }

    #[test]
    fn reactivation_after_deactivation_reports_nothing_displaced() {
        let mut registry = ActivationRegistry::new();
        let _ = registry.activate(RewardArchetype::InstaKill, RewardId::new(1));
        let _ = registry.deactivate(RewardArchetype::InstaKill);
        assert_eq!(
            registry.activate(RewardArchetype::InstaKill, RewardId::new(2)),
            None
        );
    }
}
