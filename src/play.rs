// =============================================================================
// Game-play reducer
//
// The presentation layer owns a `GamePlayState` and feeds it `Action`s.
// `reduce` never mutates the state it is given: it returns the next state, so
// an error part-way through a move leaves the caller's game as it was.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::board::Position;
use crate::config::RulesConfig;
use crate::error::Result;
use crate::game::{Game, GameState};
use crate::piece::{PieceId, Player};
use crate::rules::{self, Outcome};

/// Everything the presentation layer renders besides the board itself.
#[derive(Clone, Debug, Default)]
pub struct GamePlayState {
    pub game: Option<Game>,
    pub selected_piece: Option<PieceId>,
    pub selected_square: Option<Position>,
    pub possible_moves: Option<Vec<Position>>,
    /// Status lines produced by the last move attempt.
    pub messages: Vec<String>,
    /// JSON snapshot written by the last `Save`, for the caller to persist.
    pub saved: Option<String>,
    pub rules: RulesConfig,
}

impl GamePlayState {
    /// A fresh game under the given rules.
    pub fn new(rules: RulesConfig) -> Self {
        GamePlayState {
            game: Some(Game::new()),
            rules,
            ..GamePlayState::default()
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Action {
    SetGame(Game),
    SelectPiece(PieceId),
    SelectSquare(Position),
    SetPossibleMoves(Vec<Position>),
    MovePiece { piece: PieceId, to: Position },
    Undo,
    Surrender(Player),
    Save,
}

pub fn reduce(state: &GamePlayState, action: Action) -> Result<GamePlayState> {
    reduce_at(state, action, Utc::now())
}

/// [`reduce`] with an explicit clock for the game's start and end stamps.
pub fn reduce_at(
    state: &GamePlayState,
    action: Action,
    now: DateTime<Utc>,
) -> Result<GamePlayState> {
    let mut next = state.clone();
    match action {
        Action::SetGame(game) => {
            next.game = Some(game);
            clear_selection(&mut next);
        }
        Action::SelectPiece(piece) => {
            next.selected_piece = Some(piece);
            next.possible_moves = None;
        }
        Action::SelectSquare(square) => {
            next.selected_square = Some(square);
        }
        Action::SetPossibleMoves(moves) => {
            next.possible_moves = Some(moves);
        }
        Action::MovePiece { piece, to } => {
            clear_selection(&mut next);
            next.messages.clear();
            if let Some(game) = next.game.as_mut() {
                move_piece(game, &next.rules, piece, to, now, &mut next.messages)?;
            }
        }
        Action::Undo => {
            let Some(game) = next.game.as_mut() else {
                return Ok(next);
            };
            if game.undo_last_move().is_none() {
                return Ok(next);
            }
            let turn = game.players_turn;
            game.in_check = rules::is_in_check(&game.board, turn)?.map(|_| turn);
            clear_selection(&mut next);
        }
        Action::Surrender(player) => {
            if let Some(game) = next.game.as_mut() {
                if !game.current_state.is_terminal() {
                    game.current_state = GameState::surrender(player);
                    game.winner = Some(player.opposite());
                    game.end = Some(now);
                    info!(%player, "player surrendered");
                    next.messages = vec![format!("Player {player} surrendered")];
                }
            }
        }
        Action::Save => {
            if let Some(game) = next.game.as_ref() {
                next.saved = Some(game.to_json()?);
                debug!(moves = game.moves.len(), "saved game snapshot");
            }
        }
    }
    Ok(next)
}

fn clear_selection(state: &mut GamePlayState) {
    state.selected_piece = None;
    state.selected_square = None;
    state.possible_moves = None;
}

/// Why a move is refused before it is tried, if it is.
fn refusal(game: &Game, piece: PieceId, to: Position) -> Option<String> {
    let record = game.board.piece(piece);
    if record.off_board {
        return Some(format!("Invalid move. {piece} has been captured"));
    }
    if record.player != game.players_turn {
        return Some(format!("Invalid move. It is {}'s turn", game.players_turn));
    }
    if !game.board.possible_moves(piece).contains(&to) {
        return Some(format!("Invalid move. {piece} cannot move there"));
    }
    None
}

/// Apply a move, take it back if it leaves the mover in check, otherwise
/// settle draw, checkmate, or check for the opponent and pass the turn.
fn move_piece(
    game: &mut Game,
    config: &RulesConfig,
    piece: PieceId,
    to: Position,
    now: DateTime<Utc>,
    messages: &mut Vec<String>,
) -> Result<()> {
    if game.current_state.is_terminal() {
        messages.push("Game is over".to_string());
        return Ok(());
    }
    if config.validate_moves {
        if let Some(reason) = refusal(game, piece, to) {
            warn!(%piece, rank = to.rank, file = to.file, "refused move: {reason}");
            messages.push(reason);
            return Ok(());
        }
    }

    let mover = game.board.piece(piece).player;
    game.apply_move(piece, to);

    if let Some(attacker) = rules::is_in_check(&game.board, mover)? {
        let message = if game.in_check == Some(mover) {
            format!("Invalid move. {mover} must move out of check")
        } else {
            format!(
                "Invalid move. This move would put you in Check. \
                 Piece {attacker} can take {mover} king"
            )
        };
        warn!(%piece, %attacker, "move leaves own king in check");
        messages.push(message);
        game.undo_last_move();
        return Ok(());
    }

    if game.start.is_none() {
        game.start = Some(now);
    }

    let opponent = mover.opposite();
    match rules::assess(&game.board, opponent, config.analysis)? {
        Outcome::Stalemate => {
            messages.push(format!("Game is a draw {opponent} has no possible moves"));
            game.current_state = GameState::Draw;
            game.in_check = None;
            game.end = Some(now);
            info!(%opponent, "draw");
        }
        Outcome::Checkmate => {
            messages.push(format!("Checkmate. Player {opponent} is in checkmate"));
            game.current_state = GameState::checkmate(opponent);
            game.winner = Some(mover);
            game.in_check = Some(opponent);
            game.end = Some(now);
            info!(winner = %mover, "checkmate");
        }
        Outcome::Check(_) => {
            messages.push(format!("Check. Player {opponent} is in check"));
            game.in_check = Some(opponent);
            game.players_turn = opponent;
        }
        Outcome::Safe => {
            game.in_check = None;
            game.players_turn = opponent;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::config::Analysis;

    fn pos(rank: i8, file: i8) -> Position {
        Position::new(rank, file)
    }

    fn play(state: &GamePlayState, piece: PieceId, to: Position) -> GamePlayState {
        reduce(state, Action::MovePiece { piece, to }).expect("move should not fail")
    }

    fn game(state: &GamePlayState) -> &Game {
        state.game.as_ref().expect("game loaded")
    }

    #[test]
    fn opening_pawn_push_passes_the_turn() {
        let state = GamePlayState::new(RulesConfig::default());
        let pawn = PieceId::pawn(Player::White, 4);
        let next = play(&state, pawn, pos(3, 4));
        let g = game(&next);
        assert_eq!(g.board.piece(pawn).position, pos(3, 4));
        assert_eq!(g.board.piece(pawn).move_count, 1);
        assert_eq!(g.players_turn, Player::Black);
        assert_eq!(g.in_check, None);
        assert!(g.start.is_some());
        assert!(next.messages.is_empty());
        assert!(game(&state).moves.is_empty(), "input state is left alone");
    }

    #[test]
    fn out_of_turn_move_is_refused() {
        let state = GamePlayState::new(RulesConfig::default());
        let next = play(&state, PieceId::pawn(Player::Black, 4), pos(4, 4));
        assert_eq!(game(&next), game(&state));
        assert_eq!(next.messages, vec!["Invalid move. It is White's turn".to_string()]);
    }

    #[test]
    fn unreachable_destination_is_refused() {
        let state = GamePlayState::new(RulesConfig::default());
        let next = play(&state, PieceId::pawn(Player::White, 4), pos(4, 4));
        assert!(game(&next).moves.is_empty());
        assert_eq!(next.messages.len(), 1);
        assert!(next.messages[0].contains("cannot move there"), "{:?}", next.messages);
    }

    #[test]
    fn unvalidated_moves_are_trusted() {
        let rules = RulesConfig {
            validate_moves: false,
            ..RulesConfig::default()
        };
        let state = GamePlayState::new(rules);
        let knight = PieceId::back_rank(Player::White, 1);
        let next = play(&state, knight, pos(4, 4));
        assert_eq!(game(&next).board.piece(knight).position, pos(4, 4));
        assert_eq!(game(&next).players_turn, Player::Black);
    }

    #[test]
    fn exposing_own_king_is_rejected() {
        let mut board = Board::empty();
        board.place(PieceId::WHITE_KING, pos(0, 4));
        board.place(PieceId::WHITE_KINGS_ROOK, pos(1, 4)).move_count = 1;
        board.place(PieceId::BLACK_QUEEN, pos(7, 4));
        board.place(PieceId::BLACK_KING, pos(7, 0));
        let state = reduce(
            &GamePlayState::new(RulesConfig::default()),
            Action::SetGame(Game::with_board(board, Player::White)),
        )
        .unwrap();

        let next = play(&state, PieceId::WHITE_KINGS_ROOK, pos(1, 3));
        assert_eq!(game(&next), game(&state));
        assert_eq!(
            next.messages,
            vec![
                "Invalid move. This move would put you in Check. \
                 Piece Black Queen can take White king"
                    .to_string()
            ]
        );
    }

    #[test]
    fn staying_in_check_gets_its_own_message() {
        let mut board = Board::empty();
        board.place(PieceId::WHITE_KING, pos(0, 4));
        board.place(PieceId::pawn(Player::White, 0), pos(1, 0));
        board.place(PieceId::BLACK_QUEEN, pos(4, 4));
        board.place(PieceId::BLACK_KING, pos(7, 0));
        let mut g = Game::with_board(board, Player::White);
        g.in_check = Some(Player::White);
        let state = reduce(&GamePlayState::default(), Action::SetGame(g)).unwrap();

        let next = play(&state, PieceId::pawn(Player::White, 0), pos(2, 0));
        assert_eq!(next.messages, vec!["Invalid move. White must move out of check".to_string()]);
        assert_eq!(game(&next).players_turn, Player::White);
        assert!(game(&next).moves.is_empty());
    }

    #[test]
    fn giving_check_is_announced() {
        let mut board = Board::empty();
        board.place(PieceId::WHITE_KING, pos(0, 0));
        board.place(PieceId::WHITE_QUEEN, pos(3, 3));
        board.place(PieceId::BLACK_KING, pos(7, 7));
        board.place(PieceId::pawn(Player::Black, 0), pos(6, 0));
        let state = reduce(
            &GamePlayState::default(),
            Action::SetGame(Game::with_board(board, Player::White)),
        )
        .unwrap();

        let next = play(&state, PieceId::WHITE_QUEEN, pos(3, 7));
        let g = game(&next);
        assert_eq!(next.messages, vec!["Check. Player Black is in check".to_string()]);
        assert_eq!(g.in_check, Some(Player::Black));
        assert_eq!(g.players_turn, Player::Black);
        assert_eq!(g.current_state, GameState::Playing);
    }

    #[test]
    fn moves_after_the_end_are_refused() {
        let mut g = Game::new();
        g.current_state = GameState::BlackInCheckmate;
        let state = reduce(&GamePlayState::default(), Action::SetGame(g)).unwrap();
        let next = play(&state, PieceId::pawn(Player::White, 4), pos(3, 4));
        assert_eq!(next.messages, vec!["Game is over".to_string()]);
        assert!(game(&next).moves.is_empty());
        assert_eq!(game(&next).current_state, GameState::BlackInCheckmate);
    }

    #[test]
    fn undo_restores_board_and_turn() {
        let state = GamePlayState::new(RulesConfig::default());
        let after = play(&state, PieceId::pawn(Player::White, 4), pos(3, 4));
        let undone = reduce(&after, Action::Undo).unwrap();
        assert_eq!(game(&undone).board, game(&state).board);
        assert_eq!(game(&undone).players_turn, Player::White);
        assert!(game(&undone).moves.is_empty());
    }

    #[test]
    fn undo_with_no_history_changes_nothing() {
        let state = GamePlayState::new(RulesConfig::default());
        let next = reduce(&state, Action::Undo).unwrap();
        assert_eq!(game(&next), game(&state));
        let empty = reduce(&GamePlayState::default(), Action::Undo).unwrap();
        assert!(empty.game.is_none());
    }

    #[test]
    fn selection_actions_update_ui_state() {
        let state = GamePlayState::new(RulesConfig::default());
        let knight = PieceId::back_rank(Player::White, 6);
        let moves = game(&state).board.possible_moves(knight);
        let state = reduce(&state, Action::SetPossibleMoves(vec![pos(0, 0)])).unwrap();
        let state = reduce(&state, Action::SelectPiece(knight)).unwrap();
        assert_eq!(state.selected_piece, Some(knight));
        assert!(state.possible_moves.is_none(), "selecting clears stale highlights");
        let state = reduce(&state, Action::SetPossibleMoves(moves.clone())).unwrap();
        let state = reduce(&state, Action::SelectSquare(pos(2, 5))).unwrap();
        assert_eq!(state.possible_moves, Some(moves));
        assert_eq!(state.selected_square, Some(pos(2, 5)));

        let state = play(&state, knight, pos(2, 5));
        assert!(state.selected_piece.is_none());
        assert!(state.possible_moves.is_none());
    }

    #[test]
    fn surrender_ends_the_game_once() {
        let state = GamePlayState::new(RulesConfig::default());
        let next = reduce(&state, Action::Surrender(Player::Black)).unwrap();
        let g = game(&next);
        assert_eq!(g.current_state, GameState::BlackSurrender);
        assert_eq!(g.winner, Some(Player::White));
        assert!(g.end.is_some());

        let again = reduce(&next, Action::Surrender(Player::White)).unwrap();
        assert_eq!(game(&again).current_state, GameState::BlackSurrender);
    }

    #[test]
    fn save_then_load_resumes_the_game() {
        let state = GamePlayState::new(RulesConfig {
            analysis: Analysis::Observed,
            validate_moves: true,
        });
        let state = play(&state, PieceId::pawn(Player::White, 3), pos(3, 3));
        let saved = reduce(&state, Action::Save).unwrap();
        let json = saved.saved.clone().expect("snapshot written");

        let loaded = Game::from_json(&json).unwrap();
        let resumed = reduce(&GamePlayState::default(), Action::SetGame(loaded)).unwrap();
        assert_eq!(game(&resumed), game(&state));
        assert_eq!(game(&resumed).players_turn, Player::Black);
    }

    #[test]
    fn clock_is_taken_from_the_caller() {
        let now = DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let state = GamePlayState::new(RulesConfig::default());
        let action = Action::MovePiece {
            piece: PieceId::pawn(Player::White, 4),
            to: pos(3, 4),
        };
        let next = reduce_at(&state, action, now).unwrap();
        assert_eq!(game(&next).start, Some(now));

        let later = now + chrono::Duration::minutes(5);
        let action = Action::MovePiece {
            piece: PieceId::pawn(Player::Black, 4),
            to: pos(4, 4),
        };
        let next = reduce_at(&next, action, later).unwrap();
        assert_eq!(game(&next).start, Some(now), "only the first move stamps the start");
    }
}
