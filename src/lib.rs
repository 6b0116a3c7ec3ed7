pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod moves;
pub mod piece;
pub mod play;
pub mod rules;

#[cfg(target_arch = "wasm32")]
mod wasm_api;

pub use board::{is_off_board, Board, Position};
pub use config::{Analysis, RulesConfig};
pub use error::{ChessError, Result};
pub use game::{Game, GameState};
pub use moves::{Move, MovePart};
pub use piece::{Piece, PieceId, PieceKind, Player};
pub use play::{reduce, reduce_at, Action, GamePlayState};

/// Standard starting position, White to move.
pub fn initialise_game() -> Game {
    Game::new()
}
