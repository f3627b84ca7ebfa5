use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::game::TargetKind;

/// Points needed per level, the quota for level `n` is `n * POINTS_PER_LEVEL`
pub const POINTS_PER_LEVEL: u32 = 150;
/// Seconds on the clock at the start of every level
pub const LEVEL_DURATION: u32 = 60;
pub const MAX_INTEGRITY: u32 = 100;
/// Time an exploding target stays around before it is removed
pub const EXPLODE_MS: u64 = 300;
/// Targets never spawn as trojan below this level
pub const TROJAN_MIN_LEVEL: u32 = 2;

/// A linear curve going down by `step_ms` per step, never below `floor_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Curve {
    pub base_ms: u64,
    pub step_ms: u64,
    pub floor_ms: u64,
}

impl Curve {
    pub const fn new(base_ms: u64, step_ms: u64, floor_ms: u64) -> Self {
        Self {
            base_ms,
            step_ms,
            floor_ms,
        }
    }

    /// Never shorter than 1 ms, a zero interval would fire without end
    pub fn at(&self, steps: u32) -> Duration {
        let ms = self
            .base_ms
            .saturating_sub(self.step_ms.saturating_mul(steps as u64))
            .max(self.floor_ms)
            .max(1);
        Duration::from_millis(ms)
    }
}

/// Score and integrity change applied when a target of some kind is clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEffect {
    pub points: i32,
    pub damage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartConfig {
    pub period_secs: u64,
    pub window_secs: u64,
    pub clicks: u32,
    pub heal: u32,
}

impl Default for HeartConfig {
    fn default() -> Self {
        Self {
            period_secs: 60,
            window_secs: 4,
            clicks: 3,
            heal: 10,
        }
    }
}

/// Balance table of the game.
///
/// All numbers are tunable, [`GameConfig::default`] holds the shipped values.
/// Missing fields in a json override fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub virus: TargetEffect,
    pub file: TargetEffect,
    pub trojan: TargetEffect,
    pub points_per_level: u32,
    pub level_duration_secs: u32,
    /// Interval between spawns, evaluated at `level - 1`
    pub spawn: Curve,
    /// Lifetime of an untouched target, evaluated at `level`
    pub lifetime: Curve,
    pub explode_ms: u64,
    pub trojan_min_level: u32,
    pub heart: HeartConfig,
    /// Fixed rng seed, `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            virus: TargetEffect {
                points: 10,
                damage: 0,
            },
            file: TargetEffect {
                points: -10,
                damage: 15,
            },
            trojan: TargetEffect {
                points: -50,
                damage: 35,
            },
            points_per_level: POINTS_PER_LEVEL,
            level_duration_secs: LEVEL_DURATION,
            spawn: Curve::new(1000, 120, 250),
            lifetime: Curve::new(3000, 250, 1000),
            explode_ms: EXPLODE_MS,
            trojan_min_level: TROJAN_MIN_LEVEL,
            heart: HeartConfig::default(),
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject tunables that would stall or flood the game loop
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero = [
            ("spawn.floor_ms", self.spawn.floor_ms == 0),
            ("lifetime.floor_ms", self.lifetime.floor_ms == 0),
            ("points_per_level", self.points_per_level == 0),
            ("level_duration_secs", self.level_duration_secs == 0),
            ("heart.period_secs", self.heart.period_secs == 0),
            ("heart.window_secs", self.heart.window_secs == 0),
            ("heart.clicks", self.heart.clicks == 0),
        ];
        match zero.into_iter().find(|(_, is_zero)| *is_zero) {
            Some((field, _)) => Err(ConfigError::Zero(field)),
            None => Ok(()),
        }
    }

    pub fn effect(&self, kind: TargetKind) -> TargetEffect {
        match kind {
            TargetKind::Virus => self.virus,
            TargetKind::File => self.file,
            TargetKind::Trojan => self.trojan,
        }
    }

    pub fn spawn_interval(&self, level: u32) -> Duration {
        self.spawn.at(level.saturating_sub(1))
    }

    pub fn lifetime(&self, level: u32) -> Duration {
        self.lifetime.at(level)
    }

    pub fn quota(&self, level: u32) -> u32 {
        level.saturating_mul(self.points_per_level)
    }

    pub fn explode_delay(&self) -> Duration {
        Duration::from_millis(self.explode_ms)
    }
}
