use serde::{Deserialize, Serialize};

/// Which side's pieces the checkmate and no-legal-move tests look at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Analysis {
    /// The checked (or stalemated) player's own pieces, each candidate move
    /// tried on a scratch board and kept only if it leaves that player's
    /// king safe.
    Standard,
    /// The opponent's pieces, with unfiltered pseudo-legal moves. A checkmate
    /// is then only reported if the attacking side cannot make a move that
    /// keeps its own king out of check.
    Observed,
}

impl Analysis {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Analysis::Standard),
            "observed" => Some(Analysis::Observed),
            _ => None,
        }
    }
}

/// Rules configuration consumed by the reducer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Terminal-state detection semantics.
    pub analysis: Analysis,
    /// Refuse moves of captured pieces, out-of-turn pieces, and destinations
    /// outside `possible_moves`. Off means the caller is trusted to only
    /// submit highlighted moves.
    pub validate_moves: bool,
}

impl RulesConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// `CHESS_ANALYSIS` is `standard` or `observed`; `CHESS_VALIDATE_MOVES`
    /// is `true` or `false`. Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = RulesConfig::default();
        RulesConfig {
            analysis: std::env::var("CHESS_ANALYSIS")
                .ok()
                .and_then(|v| Analysis::parse(&v))
                .unwrap_or(defaults.analysis),
            validate_moves: std::env::var("CHESS_VALIDATE_MOVES")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.validate_moves),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            analysis: Analysis::Standard,
            validate_moves: true,
        }
    }
}
