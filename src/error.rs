use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Local storage is not available")]
    Unavailable,
    #[error("Could not write key {0}")]
    WriteFailed(String),
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum LeaderboardError {
    #[error("Leaderboard unreachable: {0}")]
    Network(String),
    #[error("Leaderboard refused the request")]
    PermissionDenied,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Parse(#[from] serde_json::Error),
    #[error("{0} must not be zero")]
    Zero(&'static str),
}
