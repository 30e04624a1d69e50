use std::time::Duration;

use star_warden_core::{Command, Cue, EntityHandle, SurvivalTuning};
use star_warden_system_survival::{DamageOutcome, PlayerSurvival, SurvivalPhase};

fn survival() -> PlayerSurvival {
    PlayerSurvival::new(SurvivalTuning::default())
}

#[test]
fn second_hit_inside_grace_window_is_ignored() {
    let mut survival = survival();
    let mut out = Vec::new();

    assert_eq!(survival.apply_damage(1.0, &mut out), DamageOutcome::Absorbed);
    assert_eq!(survival.lives(), 2.0);
    assert_eq!(survival.phase(), SurvivalPhase::Grace);

    out.clear();
    assert_eq!(survival.apply_damage(1.0, &mut out), DamageOutcome::Ignored);
    assert_eq!(survival.lives(), 2.0);
    assert!(out.is_empty(), "ignored hits must not emit commands");
}

#[test]
fn grace_window_expires_after_configured_duration() {
    let mut survival = survival();
    let mut out = Vec::new();
    let _ = survival.apply_damage(1.0, &mut out);

    assert!(!survival.tick(Duration::from_millis(2_900), &mut out));
    assert_eq!(survival.phase(), SurvivalPhase::Grace);
    assert_eq!(
        survival.grace_remaining(),
        Some(Duration::from_millis(100))
    );

    assert!(!survival.tick(Duration::from_millis(100), &mut out));
    assert_eq!(survival.phase(), SurvivalPhase::Vulnerable);
    assert_eq!(survival.apply_damage(1.0, &mut out), DamageOutcome::Absorbed);
    assert_eq!(survival.lives(), 1.0);
}

#[test]
fn absorbed_hit_reports_lives_and_cue() {
    let mut survival = survival();
    let mut out = Vec::new();
    let _ = survival.apply_damage(1.0, &mut out);

    assert_eq!(
        out,
        vec![
            Command::UpdateLives { lives: 2.0 },
            Command::PlayCue {
                cue: Cue::PlayerHit,
                delay: Duration::ZERO,
            },
        ]
    );
}

#[test]
fn lethal_hit_starts_death_sequence_and_ignores_later_hits() {
    let mut survival = PlayerSurvival::new(SurvivalTuning {
        starting_lives: 1.0,
        ..SurvivalTuning::default()
    });
    let mut out = Vec::new();

    assert_eq!(survival.apply_damage(1.0, &mut out), DamageOutcome::Lethal);
    assert_eq!(survival.phase(), SurvivalPhase::Dead);
    assert!(out.contains(&Command::PlayCue {
        cue: Cue::PlayerDeath,
        delay: Duration::from_millis(250),
    }));
    assert!(out.contains(&Command::DestroyEntity {
        entity: EntityHandle::Player,
        delay: Duration::from_millis(500),
    }));

    out.clear();
    assert!(!survival.tick(Duration::from_millis(300), &mut out));
    assert!(survival.tick(Duration::from_millis(150), &mut out));
    assert_eq!(out, vec![Command::ShowGameOver]);

    out.clear();
    assert!(!survival.tick(Duration::from_secs(10), &mut out));
    assert_eq!(survival.apply_damage(1.0, &mut out), DamageOutcome::Ignored);
    assert_eq!(survival.phase(), SurvivalPhase::Dead);
    assert!(out.is_empty());
}

#[test]
fn fractional_last_life_dies_to_a_full_hit() {
    let mut survival = PlayerSurvival::new(SurvivalTuning {
        starting_lives: 0.5,
        ..SurvivalTuning::default()
    });
    let mut out = Vec::new();

    assert_eq!(survival.apply_damage(1.0, &mut out), DamageOutcome::Lethal);
    assert_eq!(survival.lives(), 0.0);
    assert_eq!(survival.phase(), SurvivalPhase::Dead);
    assert_eq!(out[0], Command::UpdateLives { lives: 0.0 });

    out.clear();
    assert_eq!(survival.apply_damage(1.0, &mut out), DamageOutcome::Ignored);
    assert_eq!(survival.apply_damage(0.25, &mut out), DamageOutcome::Ignored);
    assert!(out.is_empty());
    assert_eq!(survival.lives(), 0.0);
}

#[test]
fn powerup_invulnerability_blocks_damage_independently() {
    let mut survival = survival();
    let mut out = Vec::new();

    survival.set_powerup_invulnerable(true);
    assert!(survival.is_invulnerable());
    assert!(survival.is_powerup_invulnerable());
    assert_eq!(survival.apply_damage(1.0, &mut out), DamageOutcome::Ignored);
    assert_eq!(survival.lives(), 3.0);

    survival.set_powerup_invulnerable(false);
    assert!(!survival.is_powerup_invulnerable());
    assert_eq!(survival.apply_damage(1.0, &mut out), DamageOutcome::Absorbed);
}

#[test]
fn powerup_flag_does_not_end_grace_early() {
    let mut survival = survival();
    let mut out = Vec::new();
    let _ = survival.apply_damage(1.0, &mut out);

    survival.set_powerup_invulnerable(true);
    survival.set_powerup_invulnerable(false);
    assert!(survival.is_invulnerable());
    assert_eq!(survival.apply_damage(1.0, &mut out), DamageOutcome::Ignored);
}

#[test]
fn heal_is_clamped_to_life_cap() {
    let mut survival = survival();
    let mut out = Vec::new();
    let _ = survival.apply_damage(1.0, &mut out);

    out.clear();
    survival.heal(5.0, &mut out);
    assert_eq!(survival.lives(), 3.0);
    assert_eq!(out, vec![Command::UpdateLives { lives: 3.0 }]);
}

#[test]
fn reset_restores_a_fresh_player() {
    let mut survival = survival();
    let mut out = Vec::new();
    let _ = survival.apply_damage(3.0, &mut out);
    survival.set_powerup_invulnerable(true);

    survival.reset();
    assert_eq!(survival.lives(), 3.0);
    assert_eq!(survival.phase(), SurvivalPhase::Vulnerable);
    assert!(!survival.is_invulnerable());

    out.clear();
    assert!(!survival.tick(Duration::from_secs(1), &mut out));
    assert!(out.is_empty(), "pending death timers must not survive a reset");
}
