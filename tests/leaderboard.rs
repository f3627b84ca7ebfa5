mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bevy::prelude::*;
use byte_hunter::error::LeaderboardError;
use byte_hunter::game::{GameCommand, GameState, Session};
use byte_hunter::leaderboard::{LeaderboardEntry, SubmitName, EMPTY_NAME_HINT};
use byte_hunter::storage::{
    InMemoryLeaderboard, KvScoreStore, LeaderboardBackend, MemoryStore, RemoteBoard, ScoreStore,
    Scores,
};
use byte_hunter::{GameConfig, Leaderboard};
use common::*;

fn entry(name: &str, score: u32) -> LeaderboardEntry {
    LeaderboardEntry {
        name: name.into(),
        score,
    }
}

fn full_board() -> Vec<LeaderboardEntry> {
    vec![
        entry("ada", 400),
        entry("linus", 310),
        entry("grace", 200),
        entry("ken", 150),
        entry("dmr", 80),
    ]
}

/// In memory board counting the calls made to it
#[derive(Default, Clone)]
struct CountingBoard {
    board: InMemoryLeaderboard,
    inserts: Arc<AtomicUsize>,
}

impl LeaderboardBackend for CountingBoard {
    fn insert(&mut self, entry: LeaderboardEntry) -> Result<(), LeaderboardError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.board.insert(entry)
    }

    fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        self.board.top(limit)
    }
}

/// Board that is never reachable
struct OfflineBoard;

impl LeaderboardBackend for OfflineBoard {
    fn insert(&mut self, _: LeaderboardEntry) -> Result<(), LeaderboardError> {
        Err(LeaderboardError::Network("offline".into()))
    }

    fn top(&self, _: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        Err(LeaderboardError::PermissionDenied)
    }
}

/// Play until the clock runs out with `score` on the board
fn finish_with(app: &mut App, score: u32) {
    command(app, GameCommand::Start);
    app.world.resource_mut::<Session>().score = score;
    run(app, 15);
    assert_eq!(state(app), GameState::GameOver);
}

fn short_config() -> GameConfig {
    GameConfig {
        level_duration_secs: 1,
        ..config()
    }
}

fn submit(app: &mut App, name: &str) {
    app.world
        .resource_mut::<Events<SubmitName>>()
        .send(SubmitName(name.into()));
    app.update();
}

fn board_app(remote: impl LeaderboardBackend) -> App {
    app_with(short_config(), |app| {
        app.insert_resource(RemoteBoard::new(remote));
    })
}

#[test]
fn startup_loads_the_remote_board() {
    let app = board_app(InMemoryLeaderboard::with_entries(full_board()));
    let board = app.world.resource::<Leaderboard>();
    assert_eq!(board.entries, full_board());
    assert!(board.error.is_none());
}

#[test]
fn beating_the_last_place_opens_the_prompt() {
    let mut app = board_app(InMemoryLeaderboard::with_entries(full_board()));
    finish_with(&mut app, 81);
    let board = app.world.resource::<Leaderboard>();
    assert_eq!(board.prompt.as_ref().map(|p| p.score), Some(81));
}

#[test]
fn tying_the_last_place_does_not() {
    let mut app = board_app(InMemoryLeaderboard::with_entries(full_board()));
    finish_with(&mut app, 80);
    let board = app.world.resource::<Leaderboard>();
    assert!(board.prompt.is_none());
    assert_eq!(board.personal_best, 80);
}

#[test]
fn blank_name_never_reaches_the_store() {
    let remote = CountingBoard {
        board: InMemoryLeaderboard::with_entries(full_board()),
        ..default()
    };
    let inserts = remote.inserts.clone();
    let mut app = board_app(remote);
    finish_with(&mut app, 120);

    submit(&mut app, "   ");
    assert_eq!(inserts.load(Ordering::SeqCst), 0);
    let board = app.world.resource::<Leaderboard>();
    let prompt = board.prompt.as_ref().unwrap();
    assert_eq!(prompt.hint, Some(EMPTY_NAME_HINT));

    submit(&mut app, "  acid burn  ");
    assert_eq!(inserts.load(Ordering::SeqCst), 1);
    let board = app.world.resource::<Leaderboard>();
    assert!(board.prompt.is_none());
    assert_eq!(board.entries.len(), 5);
    assert_eq!(board.entries[4], entry("acid burn", 120));
}

#[test]
fn offline_board_is_not_fatal() {
    let mut app = app_with(short_config(), |app| {
        let mut local = KvScoreStore::new(MemoryStore::default());
        local
            .cache_leaderboard(&[entry("cached", 500)])
            .unwrap();
        app.insert_resource(Scores::new(local))
            .insert_resource(RemoteBoard::new(OfflineBoard));
    });
    {
        let board = app.world.resource::<Leaderboard>();
        assert_eq!(board.entries, vec![entry("cached", 500)]);
        assert!(board.error.is_some());
    }

    finish_with(&mut app, 40);
    // cached board has room
    assert!(app.world.resource::<Leaderboard>().prompt.is_some());
    submit(&mut app, "neo");
    let board = app.world.resource::<Leaderboard>();
    assert!(board.prompt.is_some());
    assert!(board.error.as_deref().unwrap().contains("offline"));
    assert_eq!(state(&app), GameState::GameOver);

    command(&mut app, GameCommand::Retry);
    assert_eq!(state(&app), GameState::Playing);
}

#[test]
fn personal_best_is_persisted() {
    let mut app = board_app(InMemoryLeaderboard::default());
    finish_with(&mut app, 70);
    command(&mut app, GameCommand::Retry);
    app.world.resource_mut::<Session>().score = 30;
    run(&mut app, 15);
    assert_eq!(state(&app), GameState::GameOver);
    assert_eq!(app.world.resource::<Scores>().0.personal_best(), 70);
    assert_eq!(app.world.resource::<Leaderboard>().personal_best, 70);
}
