use bevy::prelude::*;

use super::{end_game, EndReason, GameOver, GameState, LevelUp, Session};
use crate::config::GameConfig;

/// Ticks once per second while playing
#[derive(Debug, Resource)]
pub struct Clock(pub Timer);

/// What happened when the clock of a level ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    LevelAdvanced(u32),
    GameOver(GameOver),
}

impl Session {
    /// Count down one second, reports the expiry when the clock hits zero
    pub fn tick_second(&mut self, config: &GameConfig) -> Option<Expiry> {
        if !self.is_running() || self.time_left == 0 {
            return None;
        }
        self.time_left -= 1;
        if self.time_left > 0 {
            return None;
        }
        self.on_time_expired(config)
    }

    /// The only timeout rule: reaching the quota of the level moves on to the
    /// next level, anything less ends the game.
    pub fn on_time_expired(&mut self, config: &GameConfig) -> Option<Expiry> {
        if !self.is_running() {
            return None;
        }
        if self.score >= config.quota(self.level) {
            self.advance_level(config);
            Some(Expiry::LevelAdvanced(self.level))
        } else {
            self.finish(EndReason::TimeExpired).map(Expiry::GameOver)
        }
    }
}

pub(super) fn tick_clock(
    time: Res<Time>,
    config: Res<GameConfig>,
    mut clock: ResMut<Clock>,
    mut session: ResMut<Session>,
    mut level_ups: EventWriter<LevelUp>,
    mut game_over: EventWriter<GameOver>,
    mut next: ResMut<NextState<GameState>>,
) {
    clock.0.tick(time.delta());
    for _ in 0..clock.0.times_finished_this_tick() {
        match session.tick_second(&config) {
            Some(Expiry::LevelAdvanced(level)) => {
                info!("Quota met on time, advancing to level {level}");
                level_ups.send(LevelUp { level });
            }
            Some(Expiry::GameOver(over)) => {
                end_game(over, &mut game_over, &mut next);
                break;
            }
            None => (),
        }
    }
}
