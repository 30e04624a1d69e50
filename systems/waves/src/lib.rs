#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave progression: sizing, spawn cadence, placement and wave-end sequence.
//!
//! The scheduler walks through `Idle → Spawning → Draining → Banner` and back
//! to `Spawning` for the next wave. Spawn attempts run on a fixed cadence for
//! the whole run; an attempt only produces an enemy while the wave still owes
//! spawns and the screen has room. Off-screen archetypes are announced by a
//! directional warning and materialise after their warning lead.

use std::{collections::BTreeSet, time::Duration};

use log::{debug, info, warn};
use star_warden_core::{
    Command, Cue, Edge, EncounterTuning, EnemyArchetype, EnemyId, EntityHandle, RandomSource,
    SpawnPlacement, Timers, ViewportBounds, ViewportPoint, WaveTuning, WorldPoint,
};
use star_warden_system_encounter::EncounterSelector;
pub use star_warden_system_encounter::SpawnQuota;

/// Stage of the wave cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WavePhase {
    /// No run in progress.
    Idle,
    /// The current wave is spawning or being fought.
    Spawning,
    /// Every enemy of the wave is down; waiting before the banner.
    Draining,
    /// The wave-clear banner is showing.
    Banner,
}

/// Snapshot of the wave counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WaveState {
    /// Wave being played; zero before the first wave.
    pub current_wave: u32,
    /// Total enemies in the current wave.
    pub enemies_in_wave: u32,
    /// Enemies the wave still has to spawn.
    pub remaining_to_spawn: u32,
    /// Enemies spawned or announced and not yet killed.
    pub alive_on_screen: u32,
    /// Enemies left to defeat before the wave clears.
    pub counter_display: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WaveTimer {
    SpawnAttempt,
    PendingSpawn(EnemyId),
    ClearDelay,
    BannerHold,
}

#[derive(Clone, Copy, Debug)]
struct PendingSpawn {
    enemy: EnemyId,
    archetype: EnemyArchetype,
    position: WorldPoint,
    orientation: f32,
    follow_speed: f32,
}

impl PendingSpawn {
    fn command(&self) -> Command {
        Command::SpawnEnemy {
            enemy: self.enemy,
            archetype: self.archetype,
            position: self.position,
            orientation: self.orientation,
            follow_speed: self.follow_speed,
        }
    }
}

/// Drives wave-to-wave progression and enemy spawning.
#[derive(Debug)]
pub struct WaveScheduler {
    tuning: WaveTuning,
    encounter: EncounterTuning,
    selector: EncounterSelector,
    phase: WavePhase,
    state: WaveState,
    chaser_speed: f32,
    player_thrust: f32,
    bounds: ViewportBounds,
    alive: BTreeSet<EnemyId>,
    pending: Vec<PendingSpawn>,
    next_enemy: u32,
    timers: Timers<WaveTimer>,
}

impl WaveScheduler {
    /// Creates an idle scheduler.
    #[must_use]
    pub fn new(tuning: WaveTuning, encounter: EncounterTuning) -> Self {
        Self {
            selector: EncounterSelector::new(&encounter),
            chaser_speed: tuning.chaser_base_speed,
            player_thrust: tuning.player_base_thrust,
            tuning,
            encounter,
            phase: WavePhase::Idle,
            state: WaveState::default(),
            bounds: ViewportBounds::default(),
            alive: BTreeSet::new(),
            pending: Vec::new(),
            next_enemy: 0,
            timers: Timers::new(),
        }
    }

    /// Returns to the idle state, discarding all run progress.
    ///
    /// Enemy identifiers keep counting so stale reports from a previous run
    /// never match a new enemy.
    pub fn reset(&mut self) {
        self.selector.reset();
        self.phase = WavePhase::Idle;
        self.state = WaveState::default();
        self.chaser_speed = self.tuning.chaser_base_speed;
        self.player_thrust = self.tuning.player_base_thrust;
        self.alive.clear();
        self.pending.clear();
        self.timers.clear();
    }

    /// Starts a new run at wave one.
    pub fn start_game(&mut self, out: &mut Vec<Command>) {
        self.reset();
        self.advance_wave(out);
        self.phase = WavePhase::Spawning;
        self.timers
            .schedule(WaveTimer::SpawnAttempt, self.tuning.spawn_interval());
    }

    /// Updates the rectangle used to map viewport positions into the world.
    pub fn set_bounds(&mut self, bounds: ViewportBounds) {
        self.bounds = bounds;
    }

    /// Current stage of the wave cycle.
    #[must_use]
    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Current wave counters.
    #[must_use]
    pub fn state(&self) -> WaveState {
        self.state
    }

    /// Special-enemy quotas of the current wave.
    #[must_use]
    pub fn quota(&self) -> SpawnQuota {
        self.selector.quota()
    }

    /// Pursuit speed handed to newly spawned chasers.
    #[must_use]
    pub fn chaser_speed(&self) -> f32 {
        self.chaser_speed
    }

    /// Thrust most recently sent to the player.
    #[must_use]
    pub fn player_thrust(&self) -> f32 {
        self.player_thrust
    }

    /// Reports whether `enemy` was spawned or announced and is not yet dead.
    #[must_use]
    pub fn is_alive(&self, enemy: EnemyId) -> bool {
        self.alive.contains(&enemy)
    }

    /// Records the death of an enemy spawned by this scheduler.
    pub fn on_enemy_killed(&mut self, enemy: EnemyId, out: &mut Vec<Command>) {
        if !self.alive.remove(&enemy) {
            warn!("kill reported for unknown enemy {}", enemy.get());
            return;
        }

        if self.timers.cancel(WaveTimer::PendingSpawn(enemy)) {
            self.pending.retain(|pending| pending.enemy != enemy);
            debug!("enemy {} removed before it spawned", enemy.get());
        }

        self.state.alive_on_screen = self.state.alive_on_screen.saturating_sub(1);
        self.state.counter_display = self.state.counter_display.saturating_sub(1);
        out.push(Command::UpdateEnemyCounter {
            remaining: self.state.counter_display,
        });

        if self.state.counter_display == 0 && self.phase == WavePhase::Spawning {
            info!("wave {} cleared", self.state.current_wave);
            self.phase = WavePhase::Draining;
            self.timers
                .schedule(WaveTimer::ClearDelay, self.tuning.clear_delay());
        }
    }

    /// Advances every wave timer by `dt`.
    pub fn tick(&mut self, dt: Duration, random: &mut dyn RandomSource, out: &mut Vec<Command>) {
        if self.phase == WavePhase::Idle {
            return;
        }

        self.timers.advance(dt);
        while let Some(timer) = self.timers.pop_expired() {
            match timer {
                WaveTimer::SpawnAttempt => {
                    self.timers
                        .schedule(WaveTimer::SpawnAttempt, self.tuning.spawn_interval());
                    self.attempt_spawn(random, out);
                }
                WaveTimer::PendingSpawn(enemy) => self.release_pending(enemy, out),
                WaveTimer::ClearDelay => {
                    out.push(Command::ShowWaveBanner);
                    self.phase = WavePhase::Banner;
                    self.timers
                        .schedule(WaveTimer::BannerHold, self.tuning.banner_hold());
                }
                WaveTimer::BannerHold => {
                    out.push(Command::HideWaveBanner);
                    self.advance_wave(out);
                    self.phase = WavePhase::Spawning;
                }
            }
        }
    }

    fn advance_wave(&mut self, out: &mut Vec<Command>) {
        self.chaser_speed =
            (self.chaser_speed + self.tuning.chaser_speed_step).min(self.tuning.chaser_max_speed);
        self.player_thrust = (self.player_thrust + self.tuning.player_thrust_step)
            .min(self.tuning.player_max_thrust);

        self.state.current_wave += 1;
        self.state.enemies_in_wave += self.tuning.enemies_per_wave;
        self.state.remaining_to_spawn = self.state.enemies_in_wave;
        self.state.counter_display = self.state.enemies_in_wave;
        self.selector.begin_wave(self.state.current_wave);

        info!(
            "wave {} begins with {} enemies",
            self.state.current_wave, self.state.enemies_in_wave
        );
        out.push(Command::UpdateWaveDisplay {
            wave: self.state.current_wave,
        });
        out.push(Command::UpdateEnemyCounter {
            remaining: self.state.counter_display,
        });
        out.push(Command::SetPlayerThrust {
            thrust: self.player_thrust,
        });
    }

    fn attempt_spawn(&mut self, random: &mut dyn RandomSource, out: &mut Vec<Command>) {
        if self.state.remaining_to_spawn == 0
            || self.state.alive_on_screen >= self.tuning.max_on_screen
        {
            return;
        }

        let archetype = self.selector.select_next(
            self.state.remaining_to_spawn,
            self.state.current_wave,
            random,
        );
        let enemy = EnemyId::new(self.next_enemy);
        self.next_enemy = self.next_enemy.wrapping_add(1);
        self.state.remaining_to_spawn -= 1;
        self.state.alive_on_screen += 1;
        let _ = self.alive.insert(enemy);

        let follow_speed = match archetype {
            EnemyArchetype::Chaser => self.chaser_speed,
            EnemyArchetype::Ship | EnemyArchetype::Barrier => 0.0,
        };

        match archetype.placement() {
            SpawnPlacement::OffscreenEdge => {
                let placement = edge_placement(
                    Edge::ALL[random.index(Edge::ALL.len())],
                    random.uniform(),
                    self.tuning.spawn_offset,
                    self.tuning.warning_offset,
                );
                let pending = PendingSpawn {
                    enemy,
                    archetype,
                    position: self.bounds.to_world(placement.spawn),
                    orientation: placement.edge.inward_heading(),
                    follow_speed,
                };

                out.push(Command::ShowSpawnWarning {
                    enemy,
                    archetype,
                    edge: placement.edge,
                    position: self.bounds.to_world(placement.warning),
                });
                out.push(Command::DestroyEntity {
                    entity: EntityHandle::Warning(enemy),
                    delay: self.tuning.warning_lifetime(),
                });

                let lead = self.encounter.profile(archetype).warning_lead();
                if lead.is_zero() {
                    out.push(pending.command());
                } else {
                    self.pending.push(pending);
                    self.timers.schedule(WaveTimer::PendingSpawn(enemy), lead);
                }
            }
            SpawnPlacement::FullWidthLine => {
                let spawn = ViewportPoint::new(0.5, random.uniform());
                let pending = PendingSpawn {
                    enemy,
                    archetype,
                    position: self.bounds.to_world(spawn),
                    orientation: 0.0,
                    follow_speed,
                };
                out.push(pending.command());
                out.push(Command::PlayCue {
                    cue: Cue::LaserWindup,
                    delay: Duration::ZERO,
                });
            }
        }

        debug!(
            "enemy {} ({archetype:?}) queued, {} left to spawn",
            enemy.get(),
            self.state.remaining_to_spawn
        );
    }

    fn release_pending(&mut self, enemy: EnemyId, out: &mut Vec<Command>) {
        let Some(index) = self
            .pending
            .iter()
            .position(|pending| pending.enemy == enemy)
        else {
            warn!("pending spawn for enemy {} vanished", enemy.get());
            return;
        };
        let pending = self.pending.remove(index);
        out.push(pending.command());
    }
}

/// Viewport locations chosen for an off-screen spawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgePlacement {
    /// Edge the enemy enters from.
    pub edge: Edge,
    /// Spawn location, outside the visible area.
    pub spawn: ViewportPoint,
    /// Warning marker location, inside the visible area.
    pub warning: ViewportPoint,
}

/// Places an off-screen spawn on `edge` at fraction `along` of the edge.
///
/// The spawn sits `spawn_offset` outside the edge and the warning marker
/// `warning_offset` inward from the spawn.
#[must_use]
pub fn edge_placement(
    edge: Edge,
    along: f32,
    spawn_offset: f32,
    warning_offset: f32,
) -> EdgePlacement {
    let (spawn, warning) = match edge {
        Edge::Left => {
            let x = -spawn_offset;
            (
                ViewportPoint::new(x, along),
                ViewportPoint::new(x + warning_offset, along),
            )
        }
        Edge::Right => {
            let x = 1.0 + spawn_offset;
            (
                ViewportPoint::new(x, along),
                ViewportPoint::new(x - warning_offset, along),
            )
        }
        Edge::Top => {
            let y = 1.0 + spawn_offset;
            (
                ViewportPoint::new(along, y),
                ViewportPoint::new(along, y - warning_offset),
            )
        }
        Edge::Bottom => {
            let y = -spawn_offset;
            (
                ViewportPoint::new(along, y),
                ViewportPoint::new(along, y + warning_offset),
            )
        }
    };
    EdgePlacement {
        edge,
        spawn,
        warning,
    }
}
