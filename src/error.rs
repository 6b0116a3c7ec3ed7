use crate::piece::Player;

/// Errors raised by the rules engine.
///
/// Illegal moves are not errors: they are reported to the player through the
/// reducer's messages. These variants describe a corrupted board or a failed
/// snapshot, and abort the operation that hit them.
#[derive(Debug, thiserror::Error)]
pub enum ChessError {
    #[error("failed to find {0} king")]
    MissingKing(Player),

    #[error("unknown piece handle: {0}")]
    UnknownPiece(u8),

    #[error("corrupt board: {0}")]
    CorruptBoard(String),

    #[error("game snapshot failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChessError>;
