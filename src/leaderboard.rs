use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::game::{GameOver, GameSet, GameState};
use crate::storage::{LeaderboardBackend, RemoteBoard, ScoreStore, Scores};

/// Number of entries shown on the leaderboard
pub const BOARD_SIZE: usize = 5;
pub const MAX_NAME_LEN: usize = 10;
/// Shown in the name prompt after an empty submission
pub const EMPTY_NAME_HINT: &str = "Enter a name";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
}

/// Whether `score` earns a place on `board`
pub fn admits(board: &[LeaderboardEntry], score: u32) -> bool {
    if score == 0 {
        return false;
    }
    if board.len() < BOARD_SIZE {
        return true;
    }
    let mut scores: Vec<u32> = board.iter().map(|e| e.score).collect();
    scores.sort_unstable_by(|a, b| b.cmp(a));
    score > scores[BOARD_SIZE - 1]
}

/// Trimmed name cut to [`MAX_NAME_LEN`] characters, `None` when nothing is left
pub fn normalize_name(raw: &str) -> Option<String> {
    let name: String = raw.trim().chars().take(MAX_NAME_LEN).collect();
    let name = name.trim_end();
    (!name.is_empty()).then(|| name.to_owned())
}

/// Best [`BOARD_SIZE`] entries, highest score first
pub fn top_entries(mut entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries.truncate(BOARD_SIZE);
    entries
}

/// Open name prompt for a score that made it onto the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePrompt {
    pub score: u32,
    pub hint: Option<&'static str>,
}

/// The player submitted a name in the prompt
#[derive(Debug, Clone, PartialEq, Eq, Event)]
pub struct SubmitName(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    NoPrompt,
    /// Empty name, the prompt stays open
    Rejected,
    /// The store failed, the prompt stays open for another try
    Failed,
    Accepted(LeaderboardEntry),
}

/// What the presentation shows about scores
#[derive(Debug, Default, Resource)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
    pub personal_best: u32,
    pub prompt: Option<NamePrompt>,
    /// Last store failure, for display
    pub error: Option<String>,
}

impl Leaderboard {
    /// Load what is stored locally, then try to fetch the remote board
    pub fn load(&mut self, local: &mut dyn ScoreStore, remote: &dyn LeaderboardBackend) {
        self.personal_best = local.personal_best();
        self.entries = top_entries(local.cached_leaderboard());
        if !self.refresh(local, remote) {
            debug!("Showing the cached leaderboard");
        }
    }

    /// Fetch the remote top list and cache it locally. Returns `false` when
    /// the remote could not be reached, the failure is kept in `error`.
    pub fn refresh(
        &mut self,
        local: &mut dyn ScoreStore,
        remote: &dyn LeaderboardBackend,
    ) -> bool {
        match remote.top(BOARD_SIZE) {
            Ok(entries) => {
                self.entries = top_entries(entries);
                self.error = None;
                if let Err(e) = local.cache_leaderboard(&self.entries) {
                    warn!("Could not cache leaderboard: {e}");
                }
                true
            }
            Err(e) => {
                warn!("Could not fetch leaderboard: {e}");
                self.error = Some(e.to_string());
                false
            }
        }
    }

    /// Record a personal best and open the name prompt when the score earns a
    /// place on the board. Returns whether the prompt was opened.
    pub fn check_high_score(
        &mut self,
        score: u32,
        local: &mut dyn ScoreStore,
        remote: &dyn LeaderboardBackend,
    ) -> bool {
        if score > local.personal_best() {
            info!("New personal best: {score}");
            if let Err(e) = local.set_personal_best(score) {
                warn!("Could not store personal best: {e}");
            }
        }
        self.personal_best = self.personal_best.max(score);
        // judge against the freshest board available, the cached one on failure
        if !self.refresh(local, remote) {
            debug!("Judging {score} against the cached leaderboard");
        }
        if !admits(&self.entries, score) {
            return false;
        }
        self.prompt = Some(NamePrompt { score, hint: None });
        true
    }

    pub fn submit(
        &mut self,
        raw_name: &str,
        local: &mut dyn ScoreStore,
        remote: &mut dyn LeaderboardBackend,
    ) -> Submission {
        let Some(prompt) = self.prompt.as_mut() else {
            return Submission::NoPrompt;
        };
        let Some(name) = normalize_name(raw_name) else {
            prompt.hint = Some(EMPTY_NAME_HINT);
            return Submission::Rejected;
        };
        let entry = LeaderboardEntry {
            name,
            score: prompt.score,
        };
        if let Err(e) = remote.insert(entry.clone()) {
            error!("Could not submit score: {e}");
            self.error = Some(e.to_string());
            return Submission::Failed;
        }
        info!("Submitted {} with {}", entry.name, entry.score);
        self.prompt = None;
        if !self.refresh(local, remote) {
            debug!("Submitted entry shows up on the next successful fetch");
        }
        Submission::Accepted(entry)
    }
}

pub struct LeaderboardPlugin;

impl Plugin for LeaderboardPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Leaderboard>()
            .init_resource::<Scores>()
            .init_resource::<RemoteBoard>()
            .add_event::<SubmitName>()
            .add_systems(Startup, load_leaderboard)
            .add_systems(
                Update,
                (check_high_score, submit_names)
                    .chain()
                    .after(GameSet::Gameplay),
            )
            .add_systems(OnExit(GameState::GameOver), close_prompt);
    }
}

fn load_leaderboard(
    mut board: ResMut<Leaderboard>,
    mut scores: ResMut<Scores>,
    remote: Res<RemoteBoard>,
) {
    board.load(scores.0.as_mut(), remote.0.as_ref());
    info!("Leaderboard loaded, {} entries", board.entries.len());
}

fn check_high_score(
    mut events: EventReader<GameOver>,
    mut board: ResMut<Leaderboard>,
    mut scores: ResMut<Scores>,
    remote: Res<RemoteBoard>,
) {
    for over in events.read() {
        if board.check_high_score(over.final_score, scores.0.as_mut(), remote.0.as_ref()) {
            info!("Score {} made the leaderboard", over.final_score);
        }
    }
}

fn submit_names(
    mut events: EventReader<SubmitName>,
    mut board: ResMut<Leaderboard>,
    mut scores: ResMut<Scores>,
    mut remote: ResMut<RemoteBoard>,
) {
    for SubmitName(name) in events.read() {
        match board.submit(name, scores.0.as_mut(), remote.0.as_mut()) {
            Submission::NoPrompt => debug!("Name submitted without prompt"),
            Submission::Rejected => debug!("Rejected empty name"),
            Submission::Failed | Submission::Accepted(_) => (),
        }
    }
}

fn close_prompt(mut board: ResMut<Leaderboard>) {
    board.prompt = None;
}
