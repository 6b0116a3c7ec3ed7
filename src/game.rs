use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::{Board, Position};
use crate::error::Result;
use crate::moves::Move;
use crate::piece::{PieceId, Player};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Playing,
    WhiteInCheckmate,
    BlackInCheckmate,
    Draw,
    WhiteSurrender,
    BlackSurrender,
}

impl GameState {
    /// Every state but `Playing` ends the game.
    pub fn is_terminal(self) -> bool {
        self != GameState::Playing
    }

    pub fn checkmate(loser: Player) -> Self {
        match loser {
            Player::White => GameState::WhiteInCheckmate,
            Player::Black => GameState::BlackInCheckmate,
        }
    }

    pub fn surrender(player: Player) -> Self {
        match player {
            Player::White => GameState::WhiteSurrender,
            Player::Black => GameState::BlackSurrender,
        }
    }
}

/// A game in progress: the board, whose turn it is, and the move history
/// that undo walks back through.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub moves: Vec<Move>,
    pub winner: Option<Player>,
    pub current_state: GameState,
    pub players_turn: Player,
    pub board: Board,
    /// Player left in check by the last accepted move.
    pub in_check: Option<Player>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Standard starting position, White to move.
    pub fn new() -> Self {
        Game::with_board(Board::new(), Player::White)
    }

    /// A fresh game from an arbitrary position.
    pub fn with_board(board: Board, players_turn: Player) -> Self {
        Game {
            start: None,
            end: None,
            moves: Vec::new(),
            winner: None,
            current_state: GameState::Playing,
            players_turn,
            board,
            in_check: None,
        }
    }

    /// Move a piece (castling included) and record it in the history.
    /// Neither legality nor turn order is checked here.
    pub fn apply_move(&mut self, piece: PieceId, to: Position) -> &Move {
        let mv = self.board.apply(piece, to);
        debug!(
            piece = %piece,
            rank = to.rank,
            file = to.file,
            parts = mv.parts.len(),
            "applied move"
        );
        self.moves.push(mv);
        &self.moves[self.moves.len() - 1]
    }

    /// Take back the most recent move. The turn returns to whoever made it
    /// and the game is back in play.
    pub fn undo_last_move(&mut self) -> Option<Move> {
        let mv = self.moves.pop()?;
        self.board.revert(&mv);
        self.players_turn = mv.player;
        self.current_state = GameState::Playing;
        self.winner = None;
        self.end = None;
        debug!(player = %mv.player, remaining = self.moves.len(), "undid move");
        Some(mv)
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.moves.last()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Game> {
        Ok(serde_json::from_str(json)?)
    }
}
