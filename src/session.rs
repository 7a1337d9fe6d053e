//! Match sessions: two seated players, one game, one room id.

use crate::config::GameConfig;
use crate::games::laser::{
    Board, Cell, LaserGame, Move, MoveError, Piece, SetupError, Side, TraceResult, TurnPhase,
};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a room.
pub type RoomId = String;

/// Unique identifier for a player.
pub type PlayerId = String;

/// A player seated in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_new::new)]
pub struct Player {
    /// Player's unique ID.
    id: PlayerId,
    /// Player's display name.
    name: String,
    /// Which side this player plays.
    side: Side,
}

/// Error raised by session and room management.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SessionError {
    /// A room with this id already exists.
    #[display("Room {} already exists", _0)]
    RoomExists(RoomId),

    /// No room with this id exists.
    #[display("Room {} not found", _0)]
    RoomNotFound(RoomId),

    /// Both seats were given the same player id.
    #[display("Player {} cannot take both seats", _0)]
    DuplicatePlayer(PlayerId),

    /// The player is already queued or seated in an open room.
    #[display("Player {} is already waiting for or playing a match", _0)]
    AlreadySeated(PlayerId),

    /// The starting board is unusable.
    #[display("{}", _0)]
    Setup(SetupError),

    /// The move was rejected.
    #[display("{}", _0)]
    Move(MoveError),
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Setup(err) => Some(err),
            SessionError::Move(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SetupError> for SessionError {
    fn from(err: SetupError) -> Self {
        SessionError::Setup(err)
    }
}

impl From<MoveError> for SessionError {
    fn from(err: MoveError) -> Self {
        SessionError::Move(err)
    }
}

/// Everything a renderer needs after a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct MoveResult {
    /// Engine phase after the move.
    phase: TurnPhase,
    /// Side to move next, if the game continues.
    active: Option<Side>,
    /// Completed moves so far.
    move_count: u32,
    /// Beam path and outcome, for fire actions.
    trace: Option<TraceResult>,
    /// Piece the beam removed, if any.
    captured: Option<(Cell, Piece)>,
    /// Whether the game has ended.
    game_over: bool,
    /// Winning player, if any.
    winner: Option<PlayerId>,
}

/// Read-only view of a session for renderers and UIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct SessionSnapshot {
    /// Room id.
    room_id: RoomId,
    /// Both seated players, side A first.
    players: [Player; 2],
    /// Engine phase.
    phase: TurnPhase,
    /// Side to move, if the game continues.
    active: Option<Side>,
    /// Completed moves so far.
    move_count: u32,
    /// Board contents.
    board: Board,
    /// Whether the game has ended.
    game_over: bool,
    /// Winning player, if any.
    winner: Option<PlayerId>,
    /// Trace of the most recent fire action.
    last_trace: Option<TraceResult>,
}

impl SessionSnapshot {
    /// Serializes the snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// One running match between two seated players.
#[derive(Debug, Clone)]
pub struct Session {
    room_id: RoomId,
    players: [Player; 2],
    game: LaserGame,
    last_trace: Option<TraceResult>,
}

impl Session {
    /// Seats two players on a prepared game.
    ///
    /// `player_a` plays side A and moves first.
    #[instrument(skip(game))]
    pub fn new(
        room_id: RoomId,
        player_a: (PlayerId, String),
        player_b: (PlayerId, String),
        game: LaserGame,
    ) -> Result<Self, SessionError> {
        if player_a.0 == player_b.0 {
            warn!(player_id = %player_a.0, "Same player in both seats");
            return Err(SessionError::DuplicatePlayer(player_a.0));
        }
        info!(room_id = %room_id, a = %player_a.0, b = %player_b.0, "Creating new session");
        Ok(Self {
            room_id,
            players: [
                Player::new(player_a.0, player_a.1, Side::A),
                Player::new(player_b.0, player_b.1, Side::B),
            ],
            game,
            last_trace: None,
        })
    }

    /// Seats two players on a board built from `config`.
    #[instrument(skip(config))]
    pub fn from_config(
        room_id: RoomId,
        player_a: (PlayerId, String),
        player_b: (PlayerId, String),
        config: &GameConfig,
    ) -> Result<Self, SessionError> {
        let board = config.board_setup().build()?;
        let game = LaserGame::new(board, config.rules())?;
        Self::new(room_id, player_a, player_b, game)
    }

    /// Room id.
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// The underlying game.
    pub fn game(&self) -> &LaserGame {
        &self.game
    }

    /// Gets the player with the given ID.
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    /// The player seated on `side`.
    pub fn player_on(&self, side: Side) -> &Player {
        match side {
            Side::A => &self.players[0],
            Side::B => &self.players[1],
        }
    }

    fn winner_id(&self) -> Option<PlayerId> {
        self.game
            .engine()
            .winner()
            .map(|side| self.player_on(side).id.clone())
    }

    fn seat(&self, player_id: &str) -> Result<Side, MoveError> {
        self.player(player_id).map(|p| p.side).ok_or_else(|| {
            warn!(player_id, "Unknown player attempted move");
            MoveError::UnknownPlayer(player_id.to_string())
        })
    }

    /// Submits a move on behalf of a seated player.
    #[instrument(skip(self), fields(room_id = %self.room_id))]
    pub fn submit_move(&mut self, player_id: &str, action: Move) -> Result<MoveResult, MoveError> {
        let side = self.seat(player_id)?;
        let outcome = self.game.apply(side, action)?;
        if let Some(trace) = outcome.trace() {
            self.last_trace = Some(trace.clone());
        }
        let engine = self.game.engine();
        let result = MoveResult {
            phase: *outcome.phase(),
            active: engine.active(),
            move_count: engine.move_count(),
            trace: outcome.trace().clone(),
            captured: *outcome.captured(),
            game_over: engine.is_over(),
            winner: self.winner_id(),
        };
        info!(player_id, %action, phase = %result.phase, "Move completed successfully");
        Ok(result)
    }

    /// Concedes the match on behalf of a seated player.
    #[instrument(skip(self), fields(room_id = %self.room_id))]
    pub fn forfeit(&mut self, player_id: &str) -> Result<SessionSnapshot, MoveError> {
        let side = self.seat(player_id)?;
        self.game.forfeit(side)?;
        Ok(self.current_state())
    }

    /// Read-only snapshot for renderers.
    pub fn current_state(&self) -> SessionSnapshot {
        let engine = self.game.engine();
        SessionSnapshot {
            room_id: self.room_id.clone(),
            players: self.players.clone(),
            phase: engine.phase(),
            active: engine.active(),
            move_count: engine.move_count(),
            board: self.game.board().clone(),
            game_over: engine.is_over(),
            winner: self.winner_id(),
            last_trace: self.last_trace.clone(),
        }
    }
}

/// Result of joining the matchmaking queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pairing {
    /// No opponent yet; the player waits in the queue.
    Waiting,
    /// Paired into a new room.
    Matched {
        /// Room of the new session.
        room_id: RoomId,
        /// Side the joining player plays.
        side: Side,
    },
}

#[derive(Debug, Default)]
struct Rooms {
    sessions: HashMap<RoomId, Arc<Mutex<Session>>>,
    seats: HashMap<PlayerId, (RoomId, Side)>,
    waiting: VecDeque<(PlayerId, String)>,
    next_room: u64,
}

impl Rooms {
    /// Rejects a player who is queued or seated in a live room.
    fn check_free(&self, player_id: &str) -> Result<(), SessionError> {
        let queued = self.waiting.iter().any(|(id, _)| id == player_id);
        if queued || self.seats.contains_key(player_id) {
            warn!(player_id, queued, "Player already taken");
            return Err(SessionError::AlreadySeated(player_id.to_string()));
        }
        Ok(())
    }

    fn insert(&mut self, session: Session) -> RoomId {
        let room_id = session.room_id().to_string();
        for player in &session.players {
            self.seats
                .insert(player.id().clone(), (room_id.clone(), *player.side()));
        }
        self.sessions
            .insert(room_id.clone(), Arc::new(Mutex::new(session)));
        room_id
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Manages all sessions.
///
/// Each session sits behind its own mutex, so moves in one room are
/// serialized while other rooms proceed independently. The registry lock is
/// never held while a session is locked.
#[derive(Debug, Clone)]
pub struct SessionManager {
    rooms: Arc<Mutex<Rooms>>,
    config: GameConfig,
}

impl SessionManager {
    /// Creates a session manager that builds new games from `config`.
    #[instrument(skip(config))]
    pub fn new(config: GameConfig) -> Self {
        info!("Creating session manager");
        Self {
            rooms: Arc::new(Mutex::new(Rooms::default())),
            config,
        }
    }

    /// Creates a session for two known players.
    #[instrument(skip(self))]
    pub fn create_session(
        &self,
        room_id: RoomId,
        player_a: (PlayerId, String),
        player_b: (PlayerId, String),
    ) -> Result<RoomId, SessionError> {
        let mut rooms = lock(&self.rooms);
        if rooms.sessions.contains_key(&room_id) {
            warn!(room_id = %room_id, "Session already exists");
            return Err(SessionError::RoomExists(room_id));
        }
        rooms.check_free(&player_a.0)?;
        rooms.check_free(&player_b.0)?;
        let session = Session::from_config(room_id, player_a, player_b, &self.config)?;
        let room_id = rooms.insert(session);
        info!(room_id = %room_id, "Created new session");
        Ok(room_id)
    }

    /// Queues a player; the second player in the queue is paired with the first.
    ///
    /// The earlier arrival plays side A. Players already queued or seated in
    /// a room that has not been closed are rejected.
    #[instrument(skip(self))]
    pub fn join(&self, player_id: PlayerId, name: String) -> Result<Pairing, SessionError> {
        let mut rooms = lock(&self.rooms);
        rooms.check_free(&player_id)?;
        let Some(first) = rooms.waiting.pop_front() else {
            debug!(player_id = %player_id, "Player waiting for opponent");
            rooms.waiting.push_back((player_id, name));
            return Ok(Pairing::Waiting);
        };

        let room_id = format!("room-{}", rooms.next_room + 1);
        let session =
            match Session::from_config(room_id, first.clone(), (player_id, name), &self.config) {
                Ok(session) => session,
                Err(e) => {
                    rooms.waiting.push_front(first);
                    return Err(e);
                }
            };
        rooms.next_room += 1;
        let room_id = rooms.insert(session);
        info!(room_id = %room_id, "Paired players into room");
        Ok(Pairing::Matched {
            room_id,
            side: Side::B,
        })
    }

    /// Finds the room a player was paired into, and their side.
    #[instrument(skip(self))]
    pub fn seat_of(&self, player_id: &str) -> Option<(RoomId, Side)> {
        lock(&self.rooms).seats.get(player_id).cloned()
    }

    fn session(&self, room_id: &str) -> Result<Arc<Mutex<Session>>, SessionError> {
        let rooms = lock(&self.rooms);
        rooms.sessions.get(room_id).cloned().ok_or_else(|| {
            debug!(room_id, "Session not found");
            SessionError::RoomNotFound(room_id.to_string())
        })
    }

    /// Submits a move to a room. Concurrent submissions to one room run
    /// one at a time.
    #[instrument(skip(self))]
    pub fn submit_move(
        &self,
        room_id: &str,
        player_id: &str,
        action: Move,
    ) -> Result<MoveResult, SessionError> {
        let session = self.session(room_id)?;
        let mut session = lock(&session);
        Ok(session.submit_move(player_id, action)?)
    }

    /// Concedes the match in a room.
    #[instrument(skip(self))]
    pub fn forfeit(&self, room_id: &str, player_id: &str) -> Result<SessionSnapshot, SessionError> {
        let session = self.session(room_id)?;
        let mut session = lock(&session);
        Ok(session.forfeit(player_id)?)
    }

    /// Snapshot of a room.
    #[instrument(skip(self))]
    pub fn current_state(&self, room_id: &str) -> Result<SessionSnapshot, SessionError> {
        let session = self.session(room_id)?;
        let snapshot = lock(&session).current_state();
        Ok(snapshot)
    }

    /// Removes a room and frees its players' seats, returning its final snapshot.
    #[instrument(skip(self))]
    pub fn close_session(&self, room_id: &str) -> Result<SessionSnapshot, SessionError> {
        let session = {
            let mut rooms = lock(&self.rooms);
            let session = rooms
                .sessions
                .remove(room_id)
                .ok_or_else(|| SessionError::RoomNotFound(room_id.to_string()))?;
            rooms.seats.retain(|_, (seated_in, _)| seated_in != room_id);
            session
        };
        let snapshot = lock(&session).current_state();
        info!(room_id, game_over = snapshot.game_over, "Closed session");
        Ok(snapshot)
    }

    /// Lists all active room ids, sorted.
    #[instrument(skip(self))]
    pub fn list_sessions(&self) -> Vec<RoomId> {
        let rooms = lock(&self.rooms);
        let mut ids: Vec<_> = rooms.sessions.keys().cloned().collect();
        ids.sort();
        debug!(count = ids.len(), "Listed sessions");
        ids
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
