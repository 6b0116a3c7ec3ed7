use crate::board::Position;
use crate::config::{Analysis, RulesConfig};
use crate::game::{Game, GameState};
use crate::piece::{Piece, PieceId, PieceKind, Player};
use crate::play::{reduce, Action, GamePlayState};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct PieceJson {
    id: u8,
    name: String,
    kind: PieceKind,
    player: Player,
    position: Option<[i8; 2]>,
    move_count: u32,
}

#[derive(Serialize)]
struct SessionState {
    pieces: Vec<PieceJson>,
    players_turn: Player,
    current_state: GameState,
    in_check: Option<Player>,
    winner: Option<Player>,
    selected_piece: Option<u8>,
    possible_moves: Option<Vec<[i8; 2]>>,
    last_move: Option<[[i8; 2]; 2]>,
    moves_played: usize,
    messages: Vec<String>,
}

#[derive(Serialize)]
struct ActionResult {
    #[serde(flatten)]
    state: Option<SessionState>,
    error: Option<String>,
}

fn square(pos: Position) -> [i8; 2] {
    [pos.rank, pos.file]
}

fn piece_json(piece: &Piece) -> PieceJson {
    PieceJson {
        id: piece.id.into(),
        name: piece.id.to_string(),
        kind: piece.kind,
        player: piece.player,
        position: piece.is_on_board().then(|| square(piece.position)),
        move_count: piece.move_count,
    }
}

fn build_session_state(state: &GamePlayState, game: &Game) -> SessionState {
    SessionState {
        pieces: game.board.pieces().iter().map(piece_json).collect(),
        players_turn: game.players_turn,
        current_state: game.current_state,
        in_check: game.in_check,
        winner: game.winner,
        selected_piece: state.selected_piece.map(u8::from),
        possible_moves: state
            .possible_moves
            .as_ref()
            .map(|moves| moves.iter().copied().map(square).collect()),
        last_move: game
            .last_move()
            .and_then(|mv| mv.mover())
            .map(|part| [square(part.start), square(part.end)]),
        moves_played: game.moves.len(),
        messages: state.messages.clone(),
    }
}

fn error_value(message: String) -> JsValue {
    let err = ActionResult {
        state: None,
        error: Some(message),
    };
    serde_wasm_bindgen::to_value(&err).unwrap_or(JsValue::NULL)
}

/// Browser-side handle on one game.
#[wasm_bindgen]
pub struct ChessSession {
    state: GamePlayState,
}

#[wasm_bindgen]
impl ChessSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ChessSession {
        ChessSession {
            state: GamePlayState::new(RulesConfig::default()),
        }
    }

    pub fn set_analysis(&mut self, name: &str) {
        if let Some(analysis) = Analysis::parse(name) {
            self.state.rules.analysis = analysis;
        }
    }

    pub fn get_state(&self) -> JsValue {
        match self.state.game.as_ref() {
            Some(game) => {
                let result = ActionResult {
                    state: Some(build_session_state(&self.state, game)),
                    error: None,
                };
                serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
            }
            None => error_value("No game loaded".to_string()),
        }
    }

    fn dispatch(&mut self, action: Action) -> JsValue {
        match reduce(&self.state, action) {
            Ok(next) => {
                self.state = next;
                self.get_state()
            }
            Err(e) => error_value(e.to_string()),
        }
    }

    pub fn piece_at(&self, rank: i8, file: i8) -> JsValue {
        let piece = self
            .state
            .game
            .as_ref()
            .and_then(|game| game.board.piece_at(rank, file))
            .map(piece_json);
        serde_wasm_bindgen::to_value(&piece).unwrap_or(JsValue::NULL)
    }

    /// Select a piece and highlight where it may go.
    pub fn select_piece(&mut self, piece: u8) -> JsValue {
        let id = match PieceId::new(piece) {
            Ok(id) => id,
            Err(e) => return error_value(e.to_string()),
        };
        let moves = match self.state.game.as_ref() {
            Some(game) => game.board.possible_moves(id),
            None => return error_value("No game loaded".to_string()),
        };
        match reduce(&self.state, Action::SelectPiece(id)) {
            Ok(next) => self.state = next,
            Err(e) => return error_value(e.to_string()),
        }
        self.dispatch(Action::SetPossibleMoves(moves))
    }

    pub fn move_piece(&mut self, piece: u8, rank: i8, file: i8) -> JsValue {
        match PieceId::new(piece) {
            Ok(piece) => self.dispatch(Action::MovePiece {
                piece,
                to: Position::new(rank, file),
            }),
            Err(e) => error_value(e.to_string()),
        }
    }

    pub fn undo(&mut self) -> JsValue {
        self.dispatch(Action::Undo)
    }

    pub fn surrender(&mut self) -> JsValue {
        match self.state.game.as_ref() {
            Some(game) => {
                let player = game.players_turn;
                self.dispatch(Action::Surrender(player))
            }
            None => error_value("No game loaded".to_string()),
        }
    }

    /// JSON snapshot of the game for the page to store.
    pub fn save(&mut self) -> Option<String> {
        let next = reduce(&self.state, Action::Save).ok()?;
        self.state = next;
        self.state.saved.clone()
    }

    pub fn load(&mut self, json: &str) -> JsValue {
        match Game::from_json(json) {
            Ok(game) => self.dispatch(Action::SetGame(game)),
            Err(e) => error_value(e.to_string()),
        }
    }
}
