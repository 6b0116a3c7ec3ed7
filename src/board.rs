use serde::{Deserialize, Serialize};

use crate::error::{ChessError, Result};
use crate::moves::{Move, MovePart};
use crate::piece::{Piece, PieceId, PieceKind, Player};

/// A board coordinate. Rank 0 is White's back rank, file 0 is file a.
///
/// Captured pieces sit at [`Position::OFF_BOARD`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub rank: i8,
    pub file: i8,
}

impl Position {
    pub const OFF_BOARD: Position = Position { rank: -1, file: -1 };

    pub const fn new(rank: i8, file: i8) -> Self {
        Position { rank, file }
    }

    pub fn is_off_board(self) -> bool {
        !(0..8).contains(&self.rank) || !(0..8).contains(&self.file)
    }

    pub fn offset(self, dr: i8, df: i8) -> Position {
        Position::new(self.rank + dr, self.file + df)
    }
}

/// True iff the rank or file falls outside 0..=7.
pub fn is_off_board(pos: Position) -> bool {
    pos.is_off_board()
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

const STRAIGHT_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

const DIAGONAL_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    pub const BOTH: [CastleSide; 2] = [CastleSide::QueenSide, CastleSide::KingSide];

    pub fn rook(self, player: Player) -> PieceId {
        match self {
            CastleSide::KingSide => PieceId::kings_rook(player),
            CastleSide::QueenSide => PieceId::queens_rook(player),
        }
    }

    /// File the king lands on.
    pub fn king_file(self) -> i8 {
        match self {
            CastleSide::KingSide => 6,
            CastleSide::QueenSide => 2,
        }
    }

    /// File the rook lands on.
    pub fn rook_file(self) -> i8 {
        match self {
            CastleSide::KingSide => 5,
            CastleSide::QueenSide => 3,
        }
    }

    /// Files strictly between the king and the rook.
    fn between(self) -> &'static [i8] {
        match self {
            CastleSide::KingSide => &[5, 6],
            CastleSide::QueenSide => &[1, 2, 3],
        }
    }

    fn for_target(player: Player, to: Position) -> Option<CastleSide> {
        if to.rank != player.back_rank() {
            return None;
        }
        CastleSide::BOTH.into_iter().find(|side| side.king_file() == to.file)
    }
}

/// The 32 piece records of a game, indexed by [`PieceId`].
///
/// Captured pieces stay in the arena flagged off-board so that undo can put
/// them back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoardRecords")]
pub struct Board {
    pieces: [Piece; PieceId::COUNT],
}

/// Unchecked wire form of a [`Board`].
#[derive(Deserialize)]
struct BoardRecords {
    pieces: [Piece; PieceId::COUNT],
}

impl TryFrom<BoardRecords> for Board {
    type Error = ChessError;

    /// Every record must sit at its own handle's index with that handle's
    /// kind and colour, and no two on-board records may share a square.
    fn try_from(records: BoardRecords) -> Result<Self> {
        let mut occupied = [[false; 8]; 8];
        for (index, piece) in records.pieces.iter().enumerate() {
            if piece.id.index() != index
                || piece.kind != piece.id.kind()
                || piece.player != piece.id.player()
            {
                return Err(ChessError::CorruptBoard(format!(
                    "record {index} holds {}",
                    piece.id
                )));
            }
            if piece.off_board {
                continue;
            }
            let pos = piece.position;
            if pos.is_off_board() {
                return Err(ChessError::CorruptBoard(format!(
                    "{} is on board at {pos:?}",
                    piece.id
                )));
            }
            let square = &mut occupied[pos.rank as usize][pos.file as usize];
            if *square {
                return Err(ChessError::CorruptBoard(format!(
                    "{} shares {pos:?} with another piece",
                    piece.id
                )));
            }
            *square = true;
        }
        Ok(Board {
            pieces: records.pieces,
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Standard starting position.
    pub fn new() -> Self {
        let mut pieces = [Piece::new(PieceId::WHITE_KING); PieceId::COUNT];
        for id in PieceId::all() {
            pieces[id.index()] = Piece::new(id);
        }
        Board { pieces }
    }

    /// Every piece captured. Useful for setting up test positions with
    /// [`Board::place`].
    pub fn empty() -> Self {
        let mut board = Board::new();
        for piece in board.pieces.iter_mut() {
            piece.off_board = true;
            piece.position = Position::OFF_BOARD;
        }
        board
    }

    /// Put a piece on `pos`, bringing it back on board if needed. Whatever
    /// stood there before is taken off.
    pub fn place(&mut self, id: PieceId, pos: Position) -> &mut Piece {
        if let Some(other) = self.piece_at(pos.rank, pos.file).map(|p| p.id) {
            self.remove(other);
        }
        let piece = &mut self.pieces[id.index()];
        piece.position = pos;
        piece.off_board = pos.is_off_board();
        piece
    }

    pub fn remove(&mut self, id: PieceId) {
        let piece = &mut self.pieces[id.index()];
        piece.off_board = true;
        piece.position = Position::OFF_BOARD;
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id.index()]
    }

    pub fn piece_mut(&mut self, id: PieceId) -> &mut Piece {
        &mut self.pieces[id.index()]
    }

    /// Exact identity lookup.
    pub fn piece_by_id(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    /// The on-board piece at the coordinate, if any. Off-board coordinates
    /// never hold a piece.
    pub fn piece_at(&self, rank: i8, file: i8) -> Option<&Piece> {
        let pos = Position::new(rank, file);
        if pos.is_off_board() {
            return None;
        }
        self.pieces.iter().find(|p| p.is_on_board() && p.position == pos)
    }

    /// On-board pieces of `player`.
    pub fn active_pieces(&self, player: Player) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces
            .iter()
            .filter(move |p| p.player == player && p.is_on_board())
    }

    fn is_empty(&self, pos: Position) -> bool {
        self.piece_at(pos.rank, pos.file).is_none()
    }

    fn holds_opponent(&self, pos: Position, player: Player) -> bool {
        self.piece_at(pos.rank, pos.file)
            .map(|p| p.player != player)
            .unwrap_or(false)
    }

    /// Pseudo-legal destinations of one piece. Not filtered for leaving the
    /// mover's own king in check, and independent of whose turn it is.
    pub fn possible_moves(&self, id: PieceId) -> Vec<Position> {
        let piece = *self.piece(id);
        let mut moves = Vec::new();
        if piece.off_board {
            return moves;
        }
        match piece.kind {
            PieceKind::Pawn => self.generate_pawn_moves(&piece, &mut moves),
            PieceKind::Knight => self.generate_knight_moves(&piece, &mut moves),
            PieceKind::Bishop => self.generate_sliding_moves(&piece, &DIAGONAL_DIRS, &mut moves),
            PieceKind::Rook => self.generate_sliding_moves(&piece, &STRAIGHT_DIRS, &mut moves),
            PieceKind::Queen => {
                self.generate_sliding_moves(&piece, &DIAGONAL_DIRS, &mut moves);
                self.generate_sliding_moves(&piece, &STRAIGHT_DIRS, &mut moves);
            }
            PieceKind::King => self.generate_king_moves(&piece, &mut moves),
        }
        moves
    }

    fn generate_pawn_moves(&self, pawn: &Piece, moves: &mut Vec<Position>) {
        let dir = pawn.player.forward();

        // No straight-ahead captures: any occupant blocks the push.
        let single = pawn.position.offset(dir, 0);
        if !single.is_off_board() && self.is_empty(single) {
            moves.push(single);

            if pawn.move_count == 0 {
                let double = single.offset(dir, 0);
                if !double.is_off_board() && self.is_empty(double) {
                    moves.push(double);
                }
            }
        }

        for df in [1, -1] {
            let target = pawn.position.offset(dir, df);
            if self.holds_opponent(target, pawn.player) {
                moves.push(target);
            }
        }
    }

    fn generate_knight_moves(&self, knight: &Piece, moves: &mut Vec<Position>) {
        for (dr, df) in KNIGHT_OFFSETS {
            let target = knight.position.offset(dr, df);
            if target.is_off_board() {
                continue;
            }
            if self.is_empty(target) || self.holds_opponent(target, knight.player) {
                moves.push(target);
            }
        }
    }

    fn generate_sliding_moves(
        &self,
        piece: &Piece,
        directions: &[(i8, i8)],
        moves: &mut Vec<Position>,
    ) {
        for &(dr, df) in directions {
            let mut target = piece.position.offset(dr, df);
            while !target.is_off_board() {
                if let Some(occupant) = self.piece_at(target.rank, target.file) {
                    if occupant.player != piece.player {
                        moves.push(target);
                    }
                    break;
                }
                moves.push(target);
                target = target.offset(dr, df);
            }
        }
    }

    fn generate_king_moves(&self, king: &Piece, moves: &mut Vec<Position>) {
        for dr in -1..=1i8 {
            for df in -1..=1i8 {
                if dr == 0 && df == 0 {
                    continue;
                }
                let target = king.position.offset(dr, df);
                if target.is_off_board() {
                    continue;
                }
                if self.is_empty(target) || self.holds_opponent(target, king.player) {
                    moves.push(target);
                }
            }
        }

        self.generate_castling_moves(king, moves);
    }

    /// Castling needs an unmoved king and rook on their home squares with
    /// nothing between them. Whether the king passes through or lands on an
    /// attacked square is not checked.
    fn can_castle(&self, king: &Piece, side: CastleSide) -> bool {
        let rank = king.player.back_rank();
        if king.kind != PieceKind::King
            || king.move_count > 0
            || king.position != Position::new(rank, 4)
        {
            return false;
        }
        let rook = self.piece(side.rook(king.player));
        if rook.off_board || rook.move_count > 0 || rook.position != rook.id.home() {
            return false;
        }
        side.between().iter().all(|&file| self.is_empty(Position::new(rank, file)))
    }

    fn generate_castling_moves(&self, king: &Piece, moves: &mut Vec<Position>) {
        for side in CastleSide::BOTH {
            if self.can_castle(king, side) {
                moves.push(Position::new(king.player.back_rank(), side.king_file()));
            }
        }
    }

    /// Move a piece and return the record needed to revert it. Castling is
    /// recognised by the king's destination; any other occupant of the
    /// destination is captured. Legality is the caller's concern.
    pub fn apply(&mut self, id: PieceId, to: Position) -> Move {
        if let Some(mv) = self.apply_castle(id, to) {
            return mv;
        }

        let piece = *self.piece(id);
        let mut parts = vec![MovePart {
            piece: id,
            start: piece.position,
            end: to,
        }];

        let taken = self
            .piece_at(to.rank, to.file)
            .map(|p| p.id)
            .filter(|&taken| taken != id);
        if let Some(taken) = taken {
            parts.push(MovePart {
                piece: taken,
                start: to,
                end: Position::OFF_BOARD,
            });
            self.remove(taken);
        }

        let mover = self.piece_mut(id);
        mover.position = to;
        mover.move_count += 1;

        Move {
            player: piece.player,
            parts,
        }
    }

    fn apply_castle(&mut self, id: PieceId, to: Position) -> Option<Move> {
        let king = *self.piece(id);
        let side = CastleSide::for_target(king.player, to)?;
        if !self.can_castle(&king, side) {
            return None;
        }
        let rook = *self.piece(side.rook(king.player));

        let rook_to = Position::new(to.rank, side.rook_file());
        let mv = Move {
            player: king.player,
            parts: vec![
                MovePart {
                    piece: king.id,
                    start: king.position,
                    end: to,
                },
                MovePart {
                    piece: rook.id,
                    start: rook.position,
                    end: rook_to,
                },
            ],
        };

        for (moved, target) in [(king.id, to), (rook.id, rook_to)] {
            let piece = self.piece_mut(moved);
            piece.position = target;
            piece.move_count += 1;
        }
        Some(mv)
    }

    /// Undo a move previously returned by [`Board::apply`].
    pub fn revert(&mut self, mv: &Move) {
        for part in mv.parts.iter().rev() {
            let piece = self.piece_mut(part.piece);
            piece.position = part.start;
            piece.off_board = false;
            // Captured pieces were not moved, so their count stays put.
            if !part.end.is_off_board() {
                piece.move_count = piece.move_count.saturating_sub(1);
            }
        }
    }
}
