use bevy::prelude::*;

use crate::config::{GameConfig, MAX_INTEGRITY};
use crate::despawn_all;

mod clock;
mod heart;
mod score;
mod spawner;

pub use clock::{Clock, Expiry};
pub use heart::{HeartBonus, HeartClick, HeartClicked, HeartTick};
pub use score::{HitResult, TargetClicked, TargetHit};
pub use spawner::{
    GameRng, HitState, Removal, SpawnTimer, Target, TargetExpired, TargetId, TargetIds, TargetKind,
};

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum GameState {
    #[default]
    Menu,
    Tutorial,
    Playing,
    GameOver,
}

/// Navigation requested by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Event)]
pub enum GameCommand {
    Start,
    Retry,
    OpenTutorial,
    /// Back to the main menu
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SystemSet)]
pub enum GameSet {
    Commands,
    Gameplay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    IntegrityLost,
    TimeExpired,
}

/// Sent exactly once per session, carries the score at the moment the game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Event)]
pub struct GameOver {
    pub final_score: u32,
    pub level: u32,
    pub reason: EndReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Event)]
pub struct LevelUp {
    pub level: u32,
}

/// State of a single run.
///
/// Every system reads and writes this resource when it runs, so all changes
/// are applied on top of the latest values.
#[derive(Debug, Clone, PartialEq, Eq, Resource)]
pub struct Session {
    pub score: u32,
    /// Between 0 and [`MAX_INTEGRITY`]
    pub integrity: u32,
    /// Seconds left in the current level
    pub time_left: u32,
    pub level: u32,
    ended: Option<GameOver>,
}

impl FromWorld for Session {
    fn from_world(world: &mut World) -> Self {
        let config = world.get_resource::<GameConfig>().cloned().unwrap_or_default();
        Self::new(&config)
    }
}

impl Session {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            score: 0,
            integrity: MAX_INTEGRITY,
            time_left: config.level_duration_secs,
            level: 1,
            ended: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.ended.is_none()
    }

    pub fn outcome(&self) -> Option<GameOver> {
        self.ended
    }

    /// Ends the session. Only the first call returns the outcome.
    pub fn finish(&mut self, reason: EndReason) -> Option<GameOver> {
        if self.ended.is_some() {
            return None;
        }
        let over = GameOver {
            final_score: self.score,
            level: self.level,
            reason,
        };
        self.ended = Some(over);
        Some(over)
    }

    pub fn advance_level(&mut self, config: &GameConfig) {
        self.level += 1;
        self.time_left = config.level_duration_secs;
    }

    pub fn heal(&mut self, amount: u32) {
        if self.is_running() {
            self.integrity = self.integrity.saturating_add(amount).min(MAX_INTEGRITY);
        }
    }
}

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameConfig>();
        if let Err(e) = app.world.resource::<GameConfig>().validate() {
            error!("Invalid game config, using defaults: {e}");
            app.insert_resource(GameConfig::default());
        }
        app.add_state::<GameState>()
            .init_resource::<Session>()
            .init_resource::<GameRng>()
            .init_resource::<TargetIds>()
            .add_event::<GameCommand>()
            .add_event::<GameOver>()
            .add_event::<LevelUp>()
            .add_event::<TargetClicked>()
            .add_event::<TargetHit>()
            .add_event::<TargetExpired>()
            .add_event::<HeartClicked>()
            .configure_sets(Update, GameSet::Gameplay.after(GameSet::Commands))
            .add_systems(Update, handle_commands.in_set(GameSet::Commands))
            .add_systems(OnEnter(GameState::Playing), setup_session)
            .add_systems(
                Update,
                (
                    score::handle_clicks,
                    heart::handle_heart_clicks,
                    spawner::update_targets,
                    clock::tick_clock,
                    spawner::spawn_targets,
                    heart::tick_heart,
                )
                    .chain()
                    .in_set(GameSet::Gameplay)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                OnExit(GameState::Playing),
                (despawn_all::<Target>, cleanup),
            );
    }
}

fn setup_session(mut commands: Commands, config: Res<GameConfig>) {
    info!("Setup Session");
    commands.insert_resource(Session::new(&config));
    commands.insert_resource(Clock(Timer::from_seconds(1.0, TimerMode::Repeating)));
    commands.insert_resource(SpawnTimer(Timer::new(
        config.spawn_interval(1),
        TimerMode::Repeating,
    )));
    commands.insert_resource(HeartBonus::new(&config.heart));
}

/// Drop pending clicks so none of them reach the next session
fn cleanup(
    mut clicks: ResMut<Events<TargetClicked>>,
    mut heart_clicks: ResMut<Events<HeartClicked>>,
    mut heart: ResMut<HeartBonus>,
) {
    clicks.clear();
    heart_clicks.clear();
    heart.hide();
}

fn handle_commands(
    mut commands: EventReader<GameCommand>,
    state: Res<State<GameState>>,
    mut next: ResMut<NextState<GameState>>,
) {
    for command in commands.read() {
        let to = match (state.get(), command) {
            (GameState::Menu | GameState::Tutorial, GameCommand::Start) => GameState::Playing,
            (GameState::GameOver, GameCommand::Retry) => GameState::Playing,
            (GameState::Menu, GameCommand::OpenTutorial) => GameState::Tutorial,
            (GameState::Tutorial | GameState::GameOver, GameCommand::Back) => GameState::Menu,
            (state, command) => {
                debug!("Ignoring {command:?} in {state:?}");
                continue;
            }
        };
        info!("{command:?}: {:?} -> {to:?}", state.get());
        next.set(to);
    }
}

/// Report the end of the session and leave the playing state
fn end_game(over: GameOver, events: &mut EventWriter<GameOver>, next: &mut NextState<GameState>) {
    info!(
        "Game over ({:?}), score {} at level {}",
        over.reason, over.final_score, over.level
    );
    events.send(over);
    next.set(GameState::GameOver);
}
