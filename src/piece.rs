use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Position;
use crate::error::{ChessError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    White,
    Black,
}

impl Player {
    pub fn opposite(self) -> Player {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    /// Rank direction a pawn of this player advances in.
    pub fn forward(self) -> i8 {
        match self {
            Player::White => 1,
            Player::Black => -1,
        }
    }

    pub fn back_rank(self) -> i8 {
        match self {
            Player::White => 0,
            Player::Black => 7,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::White => write!(f, "White"),
            Player::Black => write!(f, "Black"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

/// Back rank line-up from file a to file h.
const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

const BACK_RANK_NAMES: [&str; 8] = [
    "Queens Rook",
    "Queens Knight",
    "Queens Bishop",
    "Queen",
    "King",
    "Kings Bishop",
    "Kings Knight",
    "Kings Rook",
];

/// Stable handle for one of the 32 pieces of a game.
///
/// Layout: 0..8 White back rank (files a..h), 8..16 Black back rank,
/// 16..24 White pawns, 24..32 Black pawns. A piece keeps its handle for the
/// whole game, captured or not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PieceId(u8);

impl PieceId {
    pub const COUNT: usize = 32;

    pub const WHITE_QUEENS_ROOK: PieceId = PieceId(0);
    pub const WHITE_QUEEN: PieceId = PieceId(3);
    pub const WHITE_KING: PieceId = PieceId(4);
    pub const WHITE_KINGS_ROOK: PieceId = PieceId(7);
    pub const BLACK_QUEENS_ROOK: PieceId = PieceId(8);
    pub const BLACK_QUEEN: PieceId = PieceId(11);
    pub const BLACK_KING: PieceId = PieceId(12);
    pub const BLACK_KINGS_ROOK: PieceId = PieceId(15);

    pub fn new(index: u8) -> Result<PieceId> {
        if (index as usize) < Self::COUNT {
            Ok(PieceId(index))
        } else {
            Err(ChessError::UnknownPiece(index))
        }
    }

    pub fn all() -> impl Iterator<Item = PieceId> {
        (0..Self::COUNT as u8).map(PieceId)
    }

    pub fn king(player: Player) -> PieceId {
        match player {
            Player::White => Self::WHITE_KING,
            Player::Black => Self::BLACK_KING,
        }
    }

    pub fn kings_rook(player: Player) -> PieceId {
        match player {
            Player::White => Self::WHITE_KINGS_ROOK,
            Player::Black => Self::BLACK_KINGS_ROOK,
        }
    }

    pub fn queens_rook(player: Player) -> PieceId {
        match player {
            Player::White => Self::WHITE_QUEENS_ROOK,
            Player::Black => Self::BLACK_QUEENS_ROOK,
        }
    }

    pub fn queen(player: Player) -> PieceId {
        match player {
            Player::White => Self::WHITE_QUEEN,
            Player::Black => Self::BLACK_QUEEN,
        }
    }

    /// The pawn that starts on `file` (0 = file a).
    pub fn pawn(player: Player, file: u8) -> PieceId {
        let base = match player {
            Player::White => 16,
            Player::Black => 24,
        };
        PieceId(base + (file & 7))
    }

    /// The back-rank piece that starts on `file` (0 = file a).
    pub fn back_rank(player: Player, file: u8) -> PieceId {
        let base = match player {
            Player::White => 0,
            Player::Black => 8,
        };
        PieceId(base + (file & 7))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn player(self) -> Player {
        match self.0 {
            0..=7 | 16..=23 => Player::White,
            _ => Player::Black,
        }
    }

    pub fn kind(self) -> PieceKind {
        if self.0 >= 16 {
            PieceKind::Pawn
        } else {
            BACK_RANK[(self.0 % 8) as usize]
        }
    }

    /// Square the piece occupies in the standard starting position.
    pub fn home(self) -> Position {
        let player = self.player();
        let file = (self.0 % 8) as i8;
        if self.0 >= 16 {
            Position::new(player.back_rank() + player.forward(), file)
        } else {
            Position::new(player.back_rank(), file)
        }
    }
}

impl TryFrom<u8> for PieceId {
    type Error = ChessError;

    fn try_from(index: u8) -> Result<Self> {
        PieceId::new(index)
    }
}

impl From<PieceId> for u8 {
    fn from(id: PieceId) -> u8 {
        id.0
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= 16 {
            write!(f, "{} Pawn {}", self.player(), self.0 % 8 + 1)
        } else {
            write!(f, "{} {}", self.player(), BACK_RANK_NAMES[(self.0 % 8) as usize])
        }
    }
}

/// One piece record in the board arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub kind: PieceKind,
    pub player: Player,
    pub position: Position,
    pub off_board: bool,
    pub move_count: u32,
}

impl Piece {
    /// A fresh piece on its home square.
    pub fn new(id: PieceId) -> Self {
        Piece {
            id,
            kind: id.kind(),
            player: id.player(),
            position: id.home(),
            off_board: false,
            move_count: 0,
        }
    }

    pub fn is_on_board(&self) -> bool {
        !self.off_board
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_name_the_standard_pieces() {
        assert_eq!(PieceId::WHITE_KING.to_string(), "White King");
        assert_eq!(PieceId::BLACK_KINGS_ROOK.to_string(), "Black Kings Rook");
        assert_eq!(PieceId::pawn(Player::Black, 2).to_string(), "Black Pawn 3");
        assert_eq!(PieceId::back_rank(Player::White, 1).to_string(), "White Queens Knight");
    }

    #[test]
    fn handles_know_their_home_squares() {
        assert_eq!(PieceId::WHITE_KING.home(), Position::new(0, 4));
        assert_eq!(PieceId::BLACK_QUEEN.home(), Position::new(7, 3));
        assert_eq!(PieceId::pawn(Player::White, 4).home(), Position::new(1, 4));
        assert_eq!(PieceId::pawn(Player::Black, 0).home(), Position::new(6, 0));
    }

    #[test]
    fn exactly_one_king_per_player() {
        for player in [Player::White, Player::Black] {
            let kings: Vec<PieceId> = PieceId::all()
                .filter(|id| id.player() == player && id.kind() == PieceKind::King)
                .collect();
            assert_eq!(kings, vec![PieceId::king(player)]);
        }
    }

    #[test]
    fn out_of_range_handle_is_rejected() {
        assert!(PieceId::new(31).is_ok());
        assert!(matches!(PieceId::new(32), Err(ChessError::UnknownPiece(32))));
        let parsed: std::result::Result<PieceId, _> = serde_json::from_str("40");
        assert!(parsed.is_err(), "deserializing an unknown handle must fail");
    }
}
