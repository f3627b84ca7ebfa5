use std::time::Duration;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Session;
use crate::config::GameConfig;

/// Share of draws spawning a file
const FILE_CHANCE: f32 = 0.2;
/// Upper bound of the trojan band, starting where the file band ends
const TROJAN_CHANCE: f32 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// Worth points
    Virus,
    /// Costs points and integrity
    File,
    /// Costs a lot of points and integrity, only from the second level on
    Trojan,
}

impl TargetKind {
    /// Pick a kind from a uniform draw `r` in `[0, 1)`
    pub fn from_roll(r: f32, level: u32, trojan_min_level: u32) -> Self {
        if r < FILE_CHANCE {
            Self::File
        } else if r < TROJAN_CHANCE && level >= trojan_min_level {
            Self::Trojan
        } else {
            Self::Virus
        }
    }
}

#[derive(Debug, Clone)]
pub enum HitState {
    /// Waiting to be clicked, removed when the timer runs out
    Alive(Timer),
    /// Clicked, removed when the animation timer runs out
    Exploding(Timer),
}

/// Why a target left the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Expired,
    Exploded,
}

/// A clickable target.
/// Position is in percent of the play area.
#[derive(Debug, Clone, Component)]
pub struct Target {
    pub id: TargetId,
    pub position: Vec2,
    pub kind: TargetKind,
    pub state: HitState,
}

impl Target {
    pub fn new(id: TargetId, position: Vec2, kind: TargetKind, lifetime: Duration) -> Self {
        Self {
            id,
            position,
            kind,
            state: HitState::Alive(Timer::new(lifetime, TimerMode::Once)),
        }
    }

    pub fn random(rng: &mut impl Rng, id: TargetId, level: u32, config: &GameConfig) -> Self {
        let kind = TargetKind::from_roll(rng.gen(), level, config.trojan_min_level);
        let position = Vec2::new(rng.gen_range(10.0..=90.0), rng.gen_range(20.0..=80.0));
        Self::new(id, position, kind, config.lifetime(level))
    }

    pub fn is_alive(&self) -> bool {
        matches!(self.state, HitState::Alive(_))
    }

    /// Start exploding. Returns false when the target already was exploding.
    pub fn explode(&mut self, delay: Duration) -> bool {
        match self.state {
            HitState::Alive(_) => {
                self.state = HitState::Exploding(Timer::new(delay, TimerMode::Once));
                true
            }
            HitState::Exploding(_) => false,
        }
    }

    pub fn tick(&mut self, delta: Duration) -> Option<Removal> {
        match &mut self.state {
            HitState::Alive(timer) => timer.tick(delta).finished().then_some(Removal::Expired),
            HitState::Exploding(timer) => timer.tick(delta).finished().then_some(Removal::Exploded),
        }
    }
}

/// A target ran out of time without being clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Event)]
pub struct TargetExpired {
    pub id: TargetId,
    pub kind: TargetKind,
}

#[derive(Debug, Resource)]
pub struct SpawnTimer(pub Timer);

/// Hands out target ids, unique for the lifetime of the app
#[derive(Debug, Default, Resource)]
pub struct TargetIds(u64);

impl TargetIds {
    pub fn next_id(&mut self) -> TargetId {
        let id = TargetId(self.0);
        self.0 += 1;
        id
    }
}

#[derive(Debug, Resource)]
pub struct GameRng(pub StdRng);

impl FromWorld for GameRng {
    fn from_world(world: &mut World) -> Self {
        let seed = world.get_resource::<GameConfig>().and_then(|c| c.seed);
        match seed {
            Some(seed) => Self(StdRng::seed_from_u64(seed)),
            None => Self(StdRng::from_entropy()),
        }
    }
}

pub(super) fn spawn_targets(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<GameConfig>,
    session: Res<Session>,
    mut timer: ResMut<SpawnTimer>,
    mut rng: ResMut<GameRng>,
    mut ids: ResMut<TargetIds>,
) {
    if !session.is_running() {
        return;
    }
    let interval = config.spawn_interval(session.level);
    if timer.0.duration() != interval {
        debug!("Spawn interval now {interval:?}");
        timer.0.set_duration(interval);
    }
    timer.0.tick(time.delta());
    for _ in 0..timer.0.times_finished_this_tick() {
        let target = Target::random(&mut rng.0, ids.next_id(), session.level, &config);
        debug!("Spawned {:?} {:?} at {}", target.kind, target.id, target.position);
        commands.spawn(target);
    }
}

pub(super) fn update_targets(
    mut commands: Commands,
    time: Res<Time>,
    mut targets: Query<(Entity, &mut Target)>,
    mut expired: EventWriter<TargetExpired>,
) {
    for (entity, mut target) in &mut targets {
        match target.tick(time.delta()) {
            Some(Removal::Expired) => {
                expired.send(TargetExpired {
                    id: target.id,
                    kind: target.kind,
                });
                commands.entity(entity).despawn_recursive();
            }
            Some(Removal::Exploded) => commands.entity(entity).despawn_recursive(),
            None => (),
        }
    }
}
