use std::time::Duration;

use star_warden_core::{Command, Cue, EntityHandle, RewardArchetype, RewardId, RewardTuning};
use star_warden_system_reward_activation::{PlayerEffect, RewardActivation, RewardStage};

fn activation() -> RewardActivation {
    RewardActivation::new(RewardTuning::default())
}

fn destroyed(reward: RewardId) -> Command {
    Command::DestroyEntity {
        entity: EntityHandle::Reward(reward),
        delay: Duration::ZERO,
    }
}

fn volleys(commands: &[Command]) -> usize {
    commands
        .iter()
        .filter(|command| **command == Command::FireRapidVolley)
        .count()
}

#[test]
fn uncollected_reward_blinks_then_despawns() {
    let mut activation = activation();
    let reward = RewardId::new(0);
    let mut out = Vec::new();
    let mut effects = Vec::new();
    activation.track_spawn(reward, RewardArchetype::InstaKill);

    activation.tick(Duration::from_millis(7_400), &mut out, &mut effects);
    assert!(out.is_empty());
    activation.tick(Duration::from_millis(100), &mut out, &mut effects);
    assert_eq!(out, vec![Command::RewardDespawning { reward }]);

    out.clear();
    activation.tick(Duration::from_millis(2_500), &mut out, &mut effects);
    assert_eq!(out, vec![destroyed(reward)]);
    assert_eq!(activation.stage(reward), None);

    out.clear();
    activation.on_pickup(reward, &mut out, &mut effects);
    assert!(out.is_empty(), "despawned rewards cannot be collected");
}

#[test]
fn insta_kill_raises_damage_until_expiry() {
    let mut activation = activation();
    let reward = RewardId::new(3);
    let mut out = Vec::new();
    let mut effects = Vec::new();
    activation.track_spawn(reward, RewardArchetype::InstaKill);
    activation.on_pickup(reward, &mut out, &mut effects);

    assert_eq!(
        out,
        vec![
            Command::ShowRewardText {
                archetype: RewardArchetype::InstaKill,
            },
            Command::PlayCue {
                cue: Cue::PowerupPickup,
                delay: Duration::ZERO,
            },
            Command::SetBulletDamage { damage: 10_000.0 },
        ]
    );
    assert!(activation.is_active(RewardArchetype::InstaKill));
    assert_eq!(activation.stage(reward), Some(RewardStage::Active));

    out.clear();
    activation.tick(Duration::from_secs(19), &mut out, &mut effects);
    assert_eq!(
        out,
        vec![Command::RewardDeactivating {
            reward,
            archetype: RewardArchetype::InstaKill,
        }]
    );

    out.clear();
    activation.tick(Duration::from_secs(1), &mut out, &mut effects);
    assert_eq!(
        out,
        vec![
            Command::SetBulletDamage { damage: 25.0 },
            destroyed(reward),
            Command::HideRewardText,
        ]
    );
    assert!(!activation.is_active(RewardArchetype::InstaKill));
    assert!(effects.is_empty());
}

#[test]
fn collecting_a_reward_stops_its_despawn() {
    let mut activation = activation();
    let reward = RewardId::new(1);
    let mut out = Vec::new();
    let mut effects = Vec::new();
    activation.track_spawn(reward, RewardArchetype::Invincible);
    activation.tick(Duration::from_secs(5), &mut out, &mut effects);
    activation.on_pickup(reward, &mut out, &mut effects);

    out.clear();
    activation.tick(Duration::from_secs(6), &mut out, &mut effects);
    assert!(!out.contains(&Command::RewardDespawning { reward }));
    assert!(!out.contains(&destroyed(reward)));
    assert!(activation.is_active(RewardArchetype::Invincible));
}

#[test]
fn second_instance_replaces_first_and_resets_duration() {
    let mut activation = activation();
    let first = RewardId::new(1);
    let second = RewardId::new(2);
    let mut out = Vec::new();
    let mut effects = Vec::new();
    activation.track_spawn(first, RewardArchetype::Invincible);
    activation.track_spawn(second, RewardArchetype::Invincible);

    activation.on_pickup(first, &mut out, &mut effects);
    assert_eq!(effects, vec![PlayerEffect::PowerupInvulnerable(true)]);
    activation.tick(Duration::from_secs(5), &mut out, &mut effects);

    out.clear();
    effects.clear();
    activation.on_pickup(second, &mut out, &mut effects);
    let teardown = out
        .iter()
        .position(|command| *command == destroyed(first))
        .expect("first instance destroyed");
    assert!(teardown > 0);
    assert_eq!(
        effects,
        vec![
            PlayerEffect::PowerupInvulnerable(false),
            PlayerEffect::PowerupInvulnerable(true),
        ]
    );
    assert_eq!(
        activation.active_handle(RewardArchetype::Invincible),
        Some(second)
    );
    assert_eq!(activation.stage(first), None);

    // The first instance would have expired at 20s; the second lasts until 25s.
    out.clear();
    effects.clear();
    activation.tick(Duration::from_millis(15_500), &mut out, &mut effects);
    assert!(activation.is_active(RewardArchetype::Invincible));
    assert!(effects.is_empty());

    activation.tick(Duration::from_secs(5), &mut out, &mut effects);
    assert!(!activation.is_active(RewardArchetype::Invincible));
    assert_eq!(effects, vec![PlayerEffect::PowerupInvulnerable(false)]);
}

#[test]
fn rapid_fire_volleys_until_expiry() {
    let mut activation = activation();
    let reward = RewardId::new(7);
    let mut out = Vec::new();
    let mut effects = Vec::new();
    activation.track_spawn(reward, RewardArchetype::RapidFire);
    activation.on_pickup(reward, &mut out, &mut effects);
    assert_eq!(volleys(&out), 1);

    out.clear();
    activation.tick(Duration::from_millis(1_050), &mut out, &mut effects);
    assert_eq!(volleys(&out), 10);

    activation.tick(Duration::from_secs(20), &mut out, &mut effects);
    assert!(!activation.is_active(RewardArchetype::RapidFire));

    out.clear();
    activation.tick(Duration::from_secs(1), &mut out, &mut effects);
    assert_eq!(volleys(&out), 0);
}

#[test]
fn heal_is_instant_and_never_warns() {
    let mut activation = activation();
    let reward = RewardId::new(9);
    let mut out = Vec::new();
    let mut effects = Vec::new();
    activation.track_spawn(reward, RewardArchetype::Heal);
    activation.on_pickup(reward, &mut out, &mut effects);
    assert_eq!(effects, vec![PlayerEffect::Heal(1.0)]);

    out.clear();
    activation.tick(Duration::from_secs(21), &mut out, &mut effects);
    assert!(!out
        .iter()
        .any(|command| matches!(command, Command::RewardDeactivating { .. })));
    assert!(out.contains(&destroyed(reward)));
    assert_eq!(effects.len(), 1);
}

#[test]
fn unknown_and_repeated_pickups_are_ignored() {
    let mut activation = activation();
    let reward = RewardId::new(4);
    let mut out = Vec::new();
    let mut effects = Vec::new();

    activation.on_pickup(reward, &mut out, &mut effects);
    assert!(out.is_empty());

    activation.track_spawn(reward, RewardArchetype::Heal);
    activation.on_pickup(reward, &mut out, &mut effects);
    let emitted = out.len();
    activation.on_pickup(reward, &mut out, &mut effects);
    assert_eq!(out.len(), emitted);
    assert_eq!(effects, vec![PlayerEffect::Heal(1.0)]);
}

#[test]
fn manual_deactivation_only_touches_its_archetype() {
    let mut activation = activation();
    let mut out = Vec::new();
    let mut effects = Vec::new();
    activation.track_spawn(RewardId::new(1), RewardArchetype::InstaKill);
    activation.track_spawn(RewardId::new(2), RewardArchetype::RapidFire);
    activation.on_pickup(RewardId::new(1), &mut out, &mut effects);
    activation.on_pickup(RewardId::new(2), &mut out, &mut effects);

    assert!(activation.deactivate(RewardArchetype::InstaKill, &mut out, &mut effects));
    assert!(!activation.is_active(RewardArchetype::InstaKill));
    assert!(activation.is_active(RewardArchetype::RapidFire));
    assert!(!activation.deactivate(RewardArchetype::InstaKill, &mut out, &mut effects));
}

#[test]
fn reset_tears_down_every_instance() {
    let mut activation = activation();
    let mut out = Vec::new();
    let mut effects = Vec::new();
    activation.track_spawn(RewardId::new(1), RewardArchetype::InstaKill);
    activation.track_spawn(RewardId::new(2), RewardArchetype::Invincible);
    activation.on_pickup(RewardId::new(1), &mut out, &mut effects);

    out.clear();
    effects.clear();
    activation.reset(&mut out, &mut effects);
    assert!(out.contains(&Command::SetBulletDamage { damage: 25.0 }));
    assert!(out.contains(&destroyed(RewardId::new(1))));
    assert!(out.contains(&destroyed(RewardId::new(2))));
    assert!(out.contains(&Command::HideRewardText));
    assert!(effects.is_empty());
    assert_eq!(activation.stage(RewardId::new(2)), None);

    out.clear();
    activation.tick(Duration::from_secs(30), &mut out, &mut effects);
    assert!(out.is_empty());
}
