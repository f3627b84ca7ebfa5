//! Byte Hunter: a reflex game where viruses pop up on screen and have to be
//! clicked before they vanish, while files and trojans must be left alone.
//!
//! The crate holds the game logic as Bevy plugins. Rendering, audio and the
//! real storage services are supplied by the host app: it sends
//! [`game::GameCommand`], [`game::TargetClicked`], [`game::HeartClicked`] and
//! [`leaderboard::SubmitName`] events, and reads the [`game::Session`],
//! [`game::Target`] and [`leaderboard::Leaderboard`] state.
use bevy::prelude::*;

pub mod config;
pub mod error;
pub mod game;
pub mod leaderboard;
pub mod storage;

pub use config::GameConfig;
pub use game::{GameCommand, GamePlugin, GameState, Session};
pub use leaderboard::{Leaderboard, LeaderboardPlugin};

/// Game logic and leaderboard together.
///
/// Insert a [`GameConfig`], [`storage::Scores`] or [`storage::RemoteBoard`]
/// before adding the plugin to replace the defaults.
pub struct ByteHunterPlugin;

impl Plugin for ByteHunterPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((GamePlugin, LeaderboardPlugin));
    }
}

/// Clears the field of every entity tagged with `T` when a session ends
fn despawn_all<T: Component>(to_despawn: Query<Entity, With<T>>, mut commands: Commands) {
    for entity in &to_despawn {
        commands.entity(entity).despawn_recursive();
    }
}
