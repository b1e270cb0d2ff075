use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid action {0}: expected 0 (stand), 1 (hit) or 2 (toggle ace)")]
    InvalidAction(i64),
    #[error("{0} is not available in the {1} variant")]
    ActionUnavailable(&'static str, &'static str),
    #[error("no round has been dealt; call reset first")]
    NoRound,
    #[error("the round is already over; call reset to deal a new one")]
    RoundFinished,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid deck count {0}: use -1 for an infinite shoe or 1 to 255 decks")]
    InvalidDeckCount(i32),
    #[error("invalid penetration {0}%: must be between 1 and 100")]
    InvalidPenetration(u8),
    #[error("invalid natural payout {0}: must be positive")]
    InvalidPayout(f64),
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PlayError {
    #[error("terminal i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Game(#[from] GameError),
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Game(#[from] GameError),
}
