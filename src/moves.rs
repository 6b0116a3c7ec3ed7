use serde::{Deserialize, Serialize};

use crate::board::Position;
use crate::piece::{PieceId, Player};

/// One piece's displacement within a turn. A captured piece's part ends at
/// [`Position::OFF_BOARD`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePart {
    pub piece: PieceId,
    pub start: Position,
    pub end: Position,
}

/// Everything that happened in one turn: a single part for a quiet move,
/// mover plus captured piece for a capture, king plus rook for castling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub player: Player,
    pub parts: Vec<MovePart>,
}

impl Move {
    /// The piece the player moved.
    pub fn mover(&self) -> Option<&MovePart> {
        self.parts.first()
    }

    /// The piece taken off the board by this move, if any.
    pub fn captured(&self) -> Option<PieceId> {
        self.parts
            .iter()
            .find(|part| part.end.is_off_board())
            .map(|part| part.piece)
    }

    pub fn is_castle(&self) -> bool {
        self.parts.len() == 2 && self.captured().is_none()
    }
}
