use chess_rules::rules::legal_moves;
use chess_rules::{reduce, Action, ChessError, GamePlayState, Position, PieceId, RulesConfig};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

const MAX_PLIES: u32 = 300;

/// Play random legal moves until the game ends or the ply limit is hit.
/// An optional first argument seeds the generator for a reproducible game.
fn main() -> Result<(), ChessError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chess_rules=info,selfplay=info".into()),
        )
        .init();

    let mut rng = match std::env::args().nth(1).and_then(|s| s.parse().ok()) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let rules = RulesConfig::from_env();
    info!(analysis = ?rules.analysis, "starting self-play");
    let mut state = GamePlayState::new(rules);
    let mut plies = 0;

    while plies < MAX_PLIES {
        let Some(game) = state.game.as_ref() else {
            break;
        };
        if game.current_state.is_terminal() {
            break;
        }

        let mut candidates: Vec<(PieceId, Position)> = Vec::new();
        for piece in game.board.active_pieces(game.players_turn) {
            for to in legal_moves(&game.board, piece.id)? {
                candidates.push((piece.id, to));
            }
        }
        let Some(&(piece, to)) = candidates.choose(&mut rng) else {
            break;
        };

        state = reduce(&state, Action::MovePiece { piece, to })?;
        plies += 1;
        for message in &state.messages {
            info!(ply = plies, "{message}");
        }
    }

    if let Some(game) = state.game.as_ref() {
        info!(
            plies,
            state = ?game.current_state,
            winner = ?game.winner,
            "game finished"
        );
    }
    Ok(())
}
