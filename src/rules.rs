// =============================================================================
// Check, checkmate and stalemate analysis
//
// Everything here is built on `Board::possible_moves`. Trial moves are played
// on a clone of the board so a search can never leak into the caller's
// position, whichever way it returns.
// =============================================================================

use crate::board::{Board, Position};
use crate::config::Analysis;
use crate::error::{ChessError, Result};
use crate::piece::{PieceId, Player};

/// What the side to move is facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// No legal move and not in check.
    Stalemate,
    Checkmate,
    /// In check; the piece is the first attacker found.
    Check(PieceId),
    Safe,
}

/// The first opposing piece that could capture `player`'s king, if any.
///
/// Fails with [`ChessError::MissingKing`] when the king is not on the board,
/// which no sequence of legal moves can produce.
pub fn is_in_check(board: &Board, player: Player) -> Result<Option<PieceId>> {
    let king = board.piece(PieceId::king(player));
    if king.off_board {
        return Err(ChessError::MissingKing(player));
    }
    let target = king.position;

    Ok(board
        .active_pieces(player.opposite())
        .find(|piece| board.possible_moves(piece.id).contains(&target))
        .map(|piece| piece.id))
}

/// Whether `side` has some move after which its own king is not attacked.
fn has_safe_move(board: &Board, side: Player) -> Result<bool> {
    for piece in board.active_pieces(side) {
        for to in board.possible_moves(piece.id) {
            if leaves_king_safe(board, piece.id, to, side)? {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

fn leaves_king_safe(board: &Board, id: PieceId, to: Position, side: Player) -> Result<bool> {
    let mut trial = board.clone();
    trial.apply(id, to);
    Ok(is_in_check(&trial, side)?.is_none())
}

/// Whether `player` is checkmated.
///
/// With [`Analysis::Observed`] the escape search runs over the opponent's
/// pieces and asks whether the opponent can move without exposing its own
/// king.
pub fn is_in_checkmate(board: &Board, player: Player, analysis: Analysis) -> Result<bool> {
    if is_in_check(board, player)?.is_none() {
        return Ok(false);
    }
    let side = match analysis {
        Analysis::Standard => player,
        Analysis::Observed => player.opposite(),
    };
    Ok(!has_safe_move(board, side)?)
}

/// Whether `player` can move at all.
///
/// [`Analysis::Standard`] requires a move that keeps `player`'s king safe.
/// [`Analysis::Observed`] only asks whether any of the opponent's pieces has
/// a pseudo-legal move.
pub fn has_any_legal_move(board: &Board, player: Player, analysis: Analysis) -> Result<bool> {
    match analysis {
        Analysis::Standard => has_safe_move(board, player),
        Analysis::Observed => Ok(board
            .active_pieces(player.opposite())
            .any(|piece| !board.possible_moves(piece.id).is_empty())),
    }
}

/// Pseudo-legal moves of one piece that do not leave its own king in check.
pub fn legal_moves(board: &Board, id: PieceId) -> Result<Vec<Position>> {
    let side = board.piece(id).player;
    let mut moves = Vec::new();
    for to in board.possible_moves(id) {
        if leaves_king_safe(board, id, to, side)? {
            moves.push(to);
        }
    }
    Ok(moves)
}

/// Classify the position for `player`, who is about to move.
pub fn assess(board: &Board, player: Player, analysis: Analysis) -> Result<Outcome> {
    match analysis {
        Analysis::Standard => {
            let attacker = is_in_check(board, player)?;
            if !has_any_legal_move(board, player, analysis)? {
                return Ok(match attacker {
                    Some(_) => Outcome::Checkmate,
                    None => Outcome::Stalemate,
                });
            }
            Ok(attacker.map_or(Outcome::Safe, Outcome::Check))
        }
        Analysis::Observed => {
            if !has_any_legal_move(board, player, analysis)? {
                return Ok(Outcome::Stalemate);
            }
            if is_in_checkmate(board, player, analysis)? {
                return Ok(Outcome::Checkmate);
            }
            Ok(is_in_check(board, player)?.map_or(Outcome::Safe, Outcome::Check))
        }
    }
}
