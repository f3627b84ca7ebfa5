use std::time::Duration;

use bevy::prelude::*;

use super::Session;
use crate::config::{GameConfig, HeartConfig};

/// The player clicked the heart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Event)]
pub struct HeartClicked;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartTick {
    Shown,
    /// The window closed before enough clicks came in
    Missed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartClick {
    Ignored,
    Counted(u32),
    /// Integrity after healing
    Healed(u32),
}

/// Bonus heart showing up once every period.
/// Enough clicks while it is visible heal the player.
#[derive(Debug, Resource)]
pub struct HeartBonus {
    visible: bool,
    clicks: u32,
    cycle: Timer,
    window: Timer,
}

impl HeartBonus {
    pub fn new(config: &HeartConfig) -> Self {
        Self {
            visible: false,
            clicks: 0,
            cycle: Timer::new(Duration::from_secs(config.period_secs), TimerMode::Repeating),
            window: Timer::new(Duration::from_secs(config.window_secs), TimerMode::Once),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.clicks = 0;
    }

    pub fn tick(&mut self, delta: Duration) -> Option<HeartTick> {
        self.cycle.tick(delta);
        if self.visible {
            if self.window.tick(delta).finished() {
                self.hide();
                return Some(HeartTick::Missed);
            }
            return None;
        }
        if self.cycle.just_finished() {
            self.visible = true;
            self.clicks = 0;
            self.window.reset();
            return Some(HeartTick::Shown);
        }
        None
    }

    pub fn click(&mut self, session: &mut Session, config: &HeartConfig) -> HeartClick {
        if !self.visible || !session.is_running() {
            return HeartClick::Ignored;
        }
        self.clicks += 1;
        if self.clicks < config.clicks {
            return HeartClick::Counted(self.clicks);
        }
        session.heal(config.heal);
        self.hide();
        HeartClick::Healed(session.integrity)
    }
}

pub(super) fn handle_heart_clicks(
    mut clicks: EventReader<HeartClicked>,
    config: Res<GameConfig>,
    mut heart: ResMut<HeartBonus>,
    mut session: ResMut<Session>,
) {
    for _ in clicks.read() {
        if let HeartClick::Healed(integrity) = heart.click(&mut session, &config.heart) {
            info!("Heart collected, integrity back to {integrity}");
        }
    }
}

pub(super) fn tick_heart(time: Res<Time>, session: Res<Session>, mut heart: ResMut<HeartBonus>) {
    if !session.is_running() {
        return;
    }
    match heart.tick(time.delta()) {
        Some(HeartTick::Shown) => debug!("Heart shown"),
        Some(HeartTick::Missed) => debug!("Heart missed"),
        None => (),
    }
}
