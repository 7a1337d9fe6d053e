//! Scripted matches: a TOML list of moves played through a session.

use serde::Deserialize;
use std::path::Path;
use strictly_lasers::{GameConfig, Move, MoveResult, Session, SessionError};
use tracing::{info, instrument, warn};

/// A match script.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchScript {
    /// Room id for the session.
    #[serde(default = "default_room")]
    room: String,
    /// Player seated on side A.
    player_a: String,
    /// Player seated on side B.
    player_b: String,
    /// Moves in submission order.
    #[serde(default)]
    moves: Vec<ScriptedMove>,
}

fn default_room() -> String {
    "replay".to_string()
}

/// One scripted submission.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptedMove {
    /// Submitting player.
    pub player: String,
    /// The move.
    #[serde(flatten)]
    pub action: Move,
}

impl MatchScript {
    /// Loads a script from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let script: Self = toml::from_str(&content)?;
        info!(moves = script.moves.len(), "Loaded match script");
        Ok(script)
    }

    /// Plays the script, calling `report` after every submission.
    ///
    /// Rejected moves are reported and skipped. Play stops at game over.
    #[instrument(skip(self, config, report))]
    pub fn play(
        &self,
        config: &GameConfig,
        mut report: impl FnMut(&ScriptedMove, &Result<MoveResult, SessionError>, &Session),
    ) -> Result<Session, SessionError> {
        let mut session = Session::from_config(
            self.room.clone(),
            (self.player_a.clone(), self.player_a.clone()),
            (self.player_b.clone(), self.player_b.clone()),
            config,
        )?;
        for step in &self.moves {
            let result = session
                .submit_move(&step.player, step.action)
                .map_err(SessionError::from);
            if let Err(e) = &result {
                warn!(player = %step.player, error = %e, "Scripted move rejected");
            }
            report(step, &result, &session);
            if session.game().engine().is_over() {
                break;
            }
        }
        Ok(session)
    }
}
