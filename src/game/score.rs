use bevy::prelude::*;

use super::{end_game, EndReason, GameOver, GameState, LevelUp, Session, Target, TargetId, TargetKind};
use crate::config::GameConfig;

/// The player clicked or tapped a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Event)]
pub struct TargetClicked(pub TargetId);

/// A click landed on a live target and was scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Event)]
pub struct TargetHit {
    pub id: TargetId,
    pub kind: TargetKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResult {
    Applied,
    LevelUp(u32),
    /// Integrity dropped to zero
    Breached(GameOver),
    /// The session already ended, nothing changed
    Ignored,
}

impl Session {
    /// Apply the effect of hitting a target of `kind`.
    /// Score never drops below zero, integrity stays within `0..=100`.
    pub fn apply_hit(&mut self, kind: TargetKind, config: &GameConfig) -> HitResult {
        if !self.is_running() {
            return HitResult::Ignored;
        }
        let effect = config.effect(kind);
        self.score = self.score.saturating_add_signed(effect.points);
        self.integrity = self.integrity.saturating_sub(effect.damage);
        if self.integrity == 0 {
            return match self.finish(EndReason::IntegrityLost) {
                Some(over) => HitResult::Breached(over),
                None => HitResult::Ignored,
            };
        }
        if self.check_level_up(config) {
            HitResult::LevelUp(self.level)
        } else {
            HitResult::Applied
        }
    }

    /// Advance one level when the score reached the quota of the current one
    pub fn check_level_up(&mut self, config: &GameConfig) -> bool {
        if self.score < config.quota(self.level) {
            return false;
        }
        self.advance_level(config);
        true
    }
}

#[allow(clippy::too_many_arguments)]
pub(super) fn handle_clicks(
    mut clicks: EventReader<TargetClicked>,
    mut targets: Query<&mut Target>,
    mut session: ResMut<Session>,
    config: Res<GameConfig>,
    mut hits: EventWriter<TargetHit>,
    mut level_ups: EventWriter<LevelUp>,
    mut game_over: EventWriter<GameOver>,
    mut next: ResMut<NextState<GameState>>,
) {
    for TargetClicked(id) in clicks.read() {
        if !session.is_running() {
            continue;
        }
        let Some(mut target) = targets.iter_mut().find(|t| t.id == *id) else {
            debug!("Click on unknown target {id:?}");
            continue;
        };
        if !target.explode(config.explode_delay()) {
            continue;
        }
        hits.send(TargetHit {
            id: *id,
            kind: target.kind,
        });
        match session.apply_hit(target.kind, &config) {
            HitResult::LevelUp(level) => {
                info!("Level up to {level}");
                level_ups.send(LevelUp { level });
            }
            HitResult::Breached(over) => end_game(over, &mut game_over, &mut next),
            HitResult::Applied | HitResult::Ignored => (),
        }
    }
}
