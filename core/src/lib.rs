#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Star Warden encounter director.
//!
//! This crate defines the message surface that connects the game's external
//! collaborators (rendering, audio, physics, UI) with the director and its
//! pure systems. Collaborators report what happened through [`Event`] values,
//! the director routes them to the owning systems, and the systems respond
//! exclusively with [`Command`] batches describing the effects the
//! collaborators should carry out.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod config;
pub mod random;
pub mod timers;

pub use config::{
    ConfigError, DirectorConfig, EncounterTuning, EnemyProfile, RewardTuning, SurvivalTuning,
    WaveTuning,
};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use timers::Timers;

/// Events reported to the director by its external collaborators.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The player selected "start game"; any previous run is discarded.
    GameStarted,
    /// Advances every director timer by the provided delta time.
    TimeAdvanced {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Reports that an enemy spawned by the director was destroyed.
    EnemyKilled {
        /// Identifier carried by the originating spawn command.
        enemy: EnemyId,
    },
    /// Reports that the player collected a reward spawned by the director.
    RewardPickedUp {
        /// Identifier carried by the originating spawn command.
        reward: RewardId,
    },
    /// Reports that the player collided with a damaging actor.
    PlayerHit {
        /// Amount of lives the hit would remove.
        damage: f32,
    },
    /// Restores lives outside of the reward system.
    PlayerHealed {
        /// Amount of lives to restore before clamping.
        amount: f32,
    },
    /// Updates the world-space rectangle covered by the camera.
    ViewportChanged {
        /// Bounds used to map viewport coordinates into the world.
        bounds: ViewportBounds,
    },
}

/// Commands emitted by the director for external collaborators to carry out.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Requests that an enemy be instantiated.
    SpawnEnemy {
        /// Identifier the collaborator must echo back in [`Event::EnemyKilled`].
        enemy: EnemyId,
        /// Kind of enemy to instantiate.
        archetype: EnemyArchetype,
        /// World-space spawn location.
        position: WorldPoint,
        /// Initial heading in radians, pointing into the play area.
        orientation: f32,
        /// Pursuit speed applied to chasers; zero for other archetypes.
        follow_speed: f32,
    },
    /// Requests that a directional warning be shown ahead of an off-screen spawn.
    ShowSpawnWarning {
        /// Enemy announced by the warning.
        enemy: EnemyId,
        /// Kind of enemy announced by the warning.
        archetype: EnemyArchetype,
        /// Screen edge the enemy will enter from.
        edge: Edge,
        /// World-space location of the warning marker.
        position: WorldPoint,
    },
    /// Requests that a reward pickup be instantiated.
    SpawnReward {
        /// Identifier the collaborator must echo back in [`Event::RewardPickedUp`].
        reward: RewardId,
        /// Kind of reward to instantiate.
        archetype: RewardArchetype,
        /// World-space spawn location.
        position: WorldPoint,
    },
    /// Requests that an entity be removed, optionally after a delay.
    DestroyEntity {
        /// Entity to remove.
        entity: EntityHandle,
        /// Delay to wait before removing the entity.
        delay: Duration,
    },
    /// Requests that an audio cue be played, optionally after a delay.
    PlayCue {
        /// Cue to play.
        cue: Cue,
        /// Delay to wait before playing the cue.
        delay: Duration,
    },
    /// Updates the wave number shown to the player.
    UpdateWaveDisplay {
        /// Wave that just started.
        wave: u32,
    },
    /// Updates the remaining-enemies counter shown to the player.
    UpdateEnemyCounter {
        /// Enemies left to defeat before the wave clears.
        remaining: u32,
    },
    /// Shows the "wave clear" banner.
    ShowWaveBanner,
    /// Hides the "wave clear" banner.
    HideWaveBanner,
    /// Updates the thrust applied by the player's ship.
    SetPlayerThrust {
        /// Thrust force to apply from now on.
        thrust: f32,
    },
    /// Updates the lives shown to the player.
    UpdateLives {
        /// Current lives after the change.
        lives: f32,
    },
    /// Shows the name of the active reward.
    ShowRewardText {
        /// Reward that was just collected.
        archetype: RewardArchetype,
    },
    /// Hides the active reward text.
    HideRewardText,
    /// Signals that an uncollected reward is about to despawn.
    RewardDespawning {
        /// Reward that will disappear soon.
        reward: RewardId,
    },
    /// Signals that an active reward is about to wear off.
    RewardDeactivating {
        /// Reward instance whose effect is ending.
        reward: RewardId,
        /// Kind of the reward whose effect is ending.
        archetype: RewardArchetype,
    },
    /// Updates the damage dealt by each player projectile.
    SetBulletDamage {
        /// Damage applied per projectile.
        damage: f32,
    },
    /// Fires one extra volley from the ship's side cannons.
    FireRapidVolley,
    /// Shows the game-over screen.
    ShowGameOver,
}

/// Identifier assigned to an enemy spawned by the director.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier assigned to a reward spawned by the director.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RewardId(u32);

impl RewardId {
    /// Creates a new reward identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Any entity the director may ask collaborators to destroy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityHandle {
    /// The player's ship.
    Player,
    /// An enemy spawned by the director.
    Enemy(EnemyId),
    /// The directional warning announcing an enemy.
    Warning(EnemyId),
    /// A reward pickup spawned by the director.
    Reward(RewardId),
}

/// Audio cues the director may request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    /// A barrier laser started charging.
    LaserWindup,
    /// A reward appeared.
    PowerupSpawn,
    /// The player collected a reward.
    PowerupPickup,
    /// The player lost lives.
    PlayerHit,
    /// The player's ship exploded.
    PlayerDeath,
}

/// Closed set of enemy archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyArchetype {
    /// Default enemy that pursues the player.
    Chaser,
    /// Ranged enemy that keeps its distance and fires at the player.
    Ship,
    /// Screen-wide laser that denies a horizontal band of the play area.
    Barrier,
}

impl EnemyArchetype {
    /// Every archetype in declaration order.
    pub const ALL: [Self; 3] = [Self::Chaser, Self::Ship, Self::Barrier];

    /// Rule used to place the archetype when it spawns.
    #[must_use]
    pub const fn placement(self) -> SpawnPlacement {
        match self {
            Self::Chaser | Self::Ship => SpawnPlacement::OffscreenEdge,
            Self::Barrier => SpawnPlacement::FullWidthLine,
        }
    }
}

/// Placement rules for spawning enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnPlacement {
    /// Spawn just outside one of the four screen edges, announced by a warning.
    OffscreenEdge,
    /// Spawn across the full width of the screen at a random height.
    FullWidthLine,
}

/// Closed set of reward archetypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RewardArchetype {
    /// Player projectiles destroy enemies in one hit.
    InstaKill,
    /// Side cannons fire continuously.
    RapidFire,
    /// The player ignores damage and destroys enemies on contact.
    Invincible,
    /// Restores lives.
    Heal,
}

impl RewardArchetype {
    /// Every archetype in declaration order.
    pub const ALL: [Self; 4] = [Self::InstaKill, Self::RapidFire, Self::Invincible, Self::Heal];

    /// Archetypes subject to streak suppression.
    pub const STREAKING: [Self; 3] = [Self::InstaKill, Self::RapidFire, Self::Invincible];

    /// Number of reward archetypes.
    pub const COUNT: usize = Self::ALL.len();

    /// Reports whether the reward keeps an effect active after pickup.
    #[must_use]
    pub const fn is_lasting(self) -> bool {
        !matches!(self, Self::Heal)
    }

    /// Player-facing name of the reward.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InstaKill => "Insta-Kill",
            Self::RapidFire => "Supercharged",
            Self::Invincible => "Invincible",
            Self::Heal => "Health",
        }
    }

    /// Index of the archetype inside [`RewardArchetype::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::InstaKill => 0,
            Self::RapidFire => 1,
            Self::Invincible => 2,
            Self::Heal => 3,
        }
    }
}

/// Screen edges enemies may enter from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Edge {
    /// Enters travelling toward increasing x.
    Left,
    /// Enters travelling toward decreasing x.
    Right,
    /// Enters travelling toward decreasing y.
    Top,
    /// Enters travelling toward increasing y.
    Bottom,
}

impl Edge {
    /// Every edge in declaration order.
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Top, Self::Bottom];

    /// Heading in radians that points from the edge into the play area.
    #[must_use]
    pub fn inward_heading(self) -> f32 {
        match self {
            Self::Left => 0.0,
            Self::Right => std::f32::consts::PI,
            Self::Top => -std::f32::consts::FRAC_PI_2,
            Self::Bottom => std::f32::consts::FRAC_PI_2,
        }
    }
}

/// Location expressed in normalized viewport coordinates, `(0, 0)` bottom-left.
///
/// Values outside `[0, 1]` describe points beyond the visible screen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportPoint {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl ViewportPoint {
    /// Creates a new viewport point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Location expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl WorldPoint {
    /// Creates a new world point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// World-space rectangle visible through the camera.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportBounds {
    min: WorldPoint,
    max: WorldPoint,
}

impl ViewportBounds {
    /// Creates bounds from the bottom-left and top-right world corners.
    #[must_use]
    pub const fn new(min: WorldPoint, max: WorldPoint) -> Self {
        Self { min, max }
    }

    /// Bottom-left corner of the visible area.
    #[must_use]
    pub const fn min(&self) -> WorldPoint {
        self.min
    }

    /// Top-right corner of the visible area.
    #[must_use]
    pub const fn max(&self) -> WorldPoint {
        self.max
    }

    /// Maps a viewport point into world space.
    #[must_use]
    pub fn to_world(&self, point: ViewportPoint) -> WorldPoint {
        WorldPoint::new(
            self.min.x + (self.max.x - self.min.x) * point.x,
            self.min.y + (self.max.y - self.min.y) * point.y,
        )
    }
}

impl Default for ViewportBounds {
    fn default() -> Self {
        Self::new(WorldPoint::new(0.0, 0.0), WorldPoint::new(1.0, 1.0))
    }
}
