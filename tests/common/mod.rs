// Helpers shared by the integration tests. They drive a headless app with a
// fixed time step so timers advance deterministically.
#![allow(dead_code)]

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use byte_hunter::game::{
    GameCommand, GameOver, GameSet, GameState, Target, TargetClicked, TargetId, TargetKind,
};
use byte_hunter::{ByteHunterPlugin, GameConfig};

/// Time advanced by every `app.update()`
pub const STEP: Duration = Duration::from_millis(100);

/// Every game over seen by the app
#[derive(Debug, Default, Resource)]
pub struct SeenGameOvers(pub Vec<GameOver>);

fn record_game_overs(mut events: EventReader<GameOver>, mut seen: ResMut<SeenGameOvers>) {
    seen.0.extend(events.read().copied());
}

pub fn config() -> GameConfig {
    GameConfig {
        seed: Some(1234),
        ..default()
    }
}

/// Headless app sitting in the menu
pub fn app_with(config: GameConfig, setup: impl FnOnce(&mut App)) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(STEP))
        .insert_resource(config)
        .init_resource::<SeenGameOvers>();
    setup(&mut app);
    app.add_plugins(ByteHunterPlugin)
        .add_systems(Update, record_game_overs.after(GameSet::Gameplay));
    app.update();
    app
}

pub fn app() -> App {
    app_with(config(), |_| ())
}

pub fn state(app: &App) -> GameState {
    *app.world.resource::<State<GameState>>().get()
}

pub fn command(app: &mut App, command: GameCommand) {
    app.world
        .resource_mut::<Events<GameCommand>>()
        .send(command);
    // one frame to read the command, one to apply the transition
    app.update();
    app.update();
}

/// App that just entered the playing state
pub fn playing_app_with(config: GameConfig) -> App {
    let mut app = app_with(config, |_| ());
    command(&mut app, GameCommand::Start);
    assert_eq!(state(&app), GameState::Playing);
    app
}

pub fn playing_app() -> App {
    playing_app_with(config())
}

pub fn run(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

/// Put a target of a known kind on the field. Ids start high to stay clear
/// of the ones handed out by the spawner.
pub fn place_target(app: &mut App, id: u64, kind: TargetKind, lifetime: Duration) -> TargetId {
    let id = TargetId(1_000_000 + id);
    app.world
        .spawn(Target::new(id, Vec2::new(50.0, 50.0), kind, lifetime));
    id
}

pub fn click(app: &mut App, id: TargetId) {
    app.world
        .resource_mut::<Events<TargetClicked>>()
        .send(TargetClicked(id));
}

pub fn targets(app: &mut App) -> Vec<Target> {
    app.world
        .query::<&Target>()
        .iter(&app.world)
        .cloned()
        .collect()
}

pub fn find_target(app: &mut App, id: TargetId) -> Option<Target> {
    targets(app).into_iter().find(|t| t.id == id)
}

pub fn game_overs(app: &App) -> Vec<GameOver> {
    app.world.resource::<SeenGameOvers>().0.clone()
}
