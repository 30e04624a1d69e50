//! Headless scripted session that drives the director the way a game client would.

use std::{fmt, time::Duration};

use log::{debug, info};
use star_warden_core::{Command, EnemyArchetype, EnemyId, Event, RewardArchetype, ViewportBounds};
use star_warden_director::{self as director, query, Director, Phase};

/// Scripted player behaviour for a session.
#[derive(Clone, Debug)]
pub(crate) struct Script {
    /// Length of one simulated frame.
    pub(crate) frame: Duration,
    /// Time an enemy survives after it spawns.
    pub(crate) kill_delay: Duration,
    /// Interval between scripted hits on the player, if any.
    pub(crate) hit_every: Option<Duration>,
    /// Session ends once this wave begins.
    pub(crate) wave_target: u32,
    /// Hard cap on simulated time.
    pub(crate) time_limit: Duration,
    /// Rectangle reported to the director before the run starts.
    pub(crate) viewport: ViewportBounds,
}

/// Outcome of a scripted session.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Summary {
    pub(crate) final_wave: u32,
    pub(crate) elapsed: Duration,
    pub(crate) game_over: bool,
    pub(crate) enemies: [usize; EnemyArchetype::ALL.len()],
    pub(crate) kills: usize,
    pub(crate) rewards: [usize; RewardArchetype::COUNT],
    pub(crate) pickups: usize,
    pub(crate) hits: usize,
    pub(crate) lives: f32,
    pub(crate) save_tokens: u32,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = if self.game_over {
            "game over"
        } else {
            "survived"
        };
        writeln!(
            f,
            "{outcome} on wave {} after {:.1}s with {} lives",
            self.final_wave,
            self.elapsed.as_secs_f32(),
            self.lives
        )?;
        write!(f, "enemies spawned:")?;
        for archetype in EnemyArchetype::ALL {
            write!(f, " {archetype:?}={}", self.enemies[archetype as usize])?;
        }
        writeln!(f, " (killed {})", self.kills)?;
        write!(f, "rewards spawned:")?;
        for archetype in RewardArchetype::ALL {
            write!(f, " {}={}", archetype.label(), self.rewards[archetype.index()])?;
        }
        writeln!(f, " (collected {})", self.pickups)?;
        write!(
            f,
            "hits taken: {} (save tokens left {})",
            self.hits, self.save_tokens
        )
    }
}

/// Runs a full session against `director` following `script`.
pub(crate) fn run(director: &mut Director, script: &Script) -> Summary {
    let mut summary = Summary::default();
    let mut pending: Vec<Event> = Vec::new();
    let mut kills: Vec<(Duration, EnemyId)> = Vec::new();
    let mut clock = Duration::ZERO;
    let mut next_hit = script.hit_every;

    let mut out = Vec::new();
    director::apply(
        director,
        Event::ViewportChanged {
            bounds: script.viewport,
        },
        &mut out,
    );
    director::apply(director, Event::GameStarted, &mut out);
    record(&out, clock, script, &mut summary, &mut pending, &mut kills);

    while clock < script.time_limit {
        out.clear();
        for event in pending.drain(..) {
            director::apply(director, event, &mut out);
        }

        let (due, waiting): (Vec<_>, Vec<_>) = kills.into_iter().partition(|(at, _)| *at <= clock);
        kills = waiting;
        for (_, enemy) in due {
            summary.kills += 1;
            director::apply(director, Event::EnemyKilled { enemy }, &mut out);
        }

        if let (Some(at), Some(every)) = (next_hit, script.hit_every) {
            if clock >= at {
                summary.hits += 1;
                director::apply(director, Event::PlayerHit { damage: 1.0 }, &mut out);
                next_hit = Some(at + every);
            }
        }

        director::apply(
            director,
            Event::TimeAdvanced { dt: script.frame },
            &mut out,
        );
        clock += script.frame;
        record(&out, clock, script, &mut summary, &mut pending, &mut kills);

        if query::phase(director) == Phase::GameOver {
            summary.game_over = true;
            break;
        }
        if query::wave_state(director).current_wave >= script.wave_target {
            info!("wave target {} reached", script.wave_target);
            break;
        }
    }

    summary.final_wave = query::wave_state(director).current_wave;
    summary.elapsed = clock;
    summary.lives = query::lives(director);
    summary.save_tokens = query::save_tokens(director);
    summary
}

fn record(
    commands: &[Command],
    clock: Duration,
    script: &Script,
    summary: &mut Summary,
    pending: &mut Vec<Event>,
    kills: &mut Vec<(Duration, EnemyId)>,
) {
    for command in commands {
        match command {
            Command::SpawnEnemy {
                enemy, archetype, ..
            } => {
                summary.enemies[*archetype as usize] += 1;
                kills.push((clock + script.kill_delay, *enemy));
            }
            Command::SpawnReward {
                reward, archetype, ..
            } => {
                summary.rewards[archetype.index()] += 1;
                summary.pickups += 1;
                pending.push(Event::RewardPickedUp { reward: *reward });
            }
            other => debug!("{other:?}"),
        }
    }
}
