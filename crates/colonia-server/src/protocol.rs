//! WebSocket protocol messages for Colonia multiplayer.

use colonia_core::{BotLevel, GameAction, GameState};
use serde::{Deserialize, Serialize};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Create a new game with the host plus optional bot opponents
    CreateGame {
        player_name: String,
        #[serde(default)]
        bots: Vec<BotLevel>,
    },

    /// Join a game that has not started yet
    JoinGame { game_id: String, player_name: String },

    /// Start the game (moves it into the setup phase proper)
    StartGame { game_id: String },

    /// Re-attach to a running game after a reconnect and get the current
    /// snapshot
    ResumeGame { game_id: String },

    /// Submit a game action
    GameAction { game_id: String, action: GameAction },

    /// Leave a game
    LeaveGame { game_id: String },

    /// Request the list of games
    ListGames,

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Game created; the creator's player id inside it
    GameCreated { game_id: String, player_id: String },

    /// Joined a game; the joiner's player id inside it
    Joined { game_id: String, player_id: String },

    /// Game started; first full snapshot
    GameStarted { state: GameState },

    /// Authoritative snapshot after an applied action
    GameState { state: GameState },

    /// List of known games
    GameList { games: Vec<GameSummary> },

    /// The game reached its terminal phase
    GameOver {
        winner_id: String,
        winner_name: String,
        victory_points: u32,
    },

    /// An action or request failed; sent to the originator only
    Error { message: String },

    /// Pong response
    Pong,
}

/// Lifecycle stage of a listed game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Waiting,
    InGame,
    Finished,
}

/// Summary of one game for the lobby list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: String,
    pub player_count: usize,
    pub max_players: usize,
    pub status: GameStatus,
}
