//! Per-process game registry.
//!
//! An explicit, constructor-injected context (no global singleton) binding
//! each game id to one engine instance. The registry owns the
//! action-serialization boundary: the concurrent map's per-entry guard
//! ensures one `process_action` at a time per game, and every applied
//! action is written through to the injected [`GameStore`] before the
//! snapshot is handed out. Memory is purely a cache over the store, so a
//! process restart just reloads on the next access.

use crate::protocol::{GameStatus, GameSummary};
use crate::store::GameStore;
use colonia_core::{
    bot, ActionKind, BotLevel, Game, GameAction, GameError, GamePhase, GameState, Player,
    PLAYER_COLORS,
};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Players per game, inclusive bounds
const MIN_PLAYERS: usize = 2;
const MAX_PLAYERS: usize = 8;

/// Pacing delay before each bot action, a UX choice not a correctness one
const BOT_TURN_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("game not found")]
    GameNotFound,

    #[error("the game is full ({MAX_PLAYERS} players maximum)")]
    GameFull,

    #[error("a game needs between {MIN_PLAYERS} and {MAX_PLAYERS} players")]
    InvalidPlayerCount,

    #[error("the game has already started")]
    AlreadyStarted,

    #[error(transparent)]
    Engine(#[from] GameError),
}

/// A created game waiting for players before the engine exists
struct Lobby {
    players: Vec<Player>,
}

/// The per-process registry of lobbies and running games
pub struct GameRegistry {
    lobbies: DashMap<String, Lobby>,
    games: DashMap<String, Game>,
    store: Arc<dyn GameStore>,
    bot_delay: Duration,
}

impl GameRegistry {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        Self::with_bot_delay(store, BOT_TURN_DELAY)
    }

    /// Override the bot pacing delay (tests use zero)
    pub fn with_bot_delay(store: Arc<dyn GameStore>, bot_delay: Duration) -> Self {
        Self {
            lobbies: DashMap::new(),
            games: DashMap::new(),
            store,
            bot_delay,
        }
    }

    /// Create a game with a human host and optional bots.
    /// Returns (game id, host player id).
    pub fn create_game(
        &self,
        host_name: &str,
        bots: &[BotLevel],
    ) -> Result<(String, String), RegistryError> {
        if 1 + bots.len() > MAX_PLAYERS {
            return Err(RegistryError::GameFull);
        }

        let game_id = Uuid::new_v4().to_string();
        let host_id = Uuid::new_v4().to_string();

        let mut players = vec![Player::new(
            host_id.clone(),
            host_name.to_string(),
            PLAYER_COLORS[0].to_string(),
        )];
        for (i, level) in bots.iter().enumerate() {
            players.push(bot::create_bot(Uuid::new_v4().to_string(), *level, i + 1));
        }

        self.lobbies.insert(game_id.clone(), Lobby { players });
        debug!(game = %game_id, bots = bots.len(), "game created");
        Ok((game_id, host_id))
    }

    /// Add a human player to a not-yet-started game
    pub fn join_game(&self, game_id: &str, player_name: &str) -> Result<String, RegistryError> {
        let mut lobby = self.lobbies.get_mut(game_id).ok_or_else(|| {
            if self.games.contains_key(game_id) {
                RegistryError::AlreadyStarted
            } else {
                RegistryError::GameNotFound
            }
        })?;

        if lobby.players.len() >= MAX_PLAYERS {
            return Err(RegistryError::GameFull);
        }

        let player_id = Uuid::new_v4().to_string();
        let seat = lobby.players.len();
        lobby.players.push(Player::new(
            player_id.clone(),
            player_name.to_string(),
            PLAYER_COLORS[seat % PLAYER_COLORS.len()].to_string(),
        ));
        Ok(player_id)
    }

    /// Turn a lobby into a running engine; board shape follows the final
    /// player count
    pub fn start_game(&self, game_id: &str) -> Result<GameState, RegistryError> {
        let (_, lobby) = self.lobbies.remove(game_id).ok_or_else(|| {
            if self.games.contains_key(game_id) {
                RegistryError::AlreadyStarted
            } else {
                RegistryError::GameNotFound
            }
        })?;

        if lobby.players.len() < MIN_PLAYERS {
            self.lobbies.insert(game_id.to_string(), lobby);
            return Err(RegistryError::InvalidPlayerCount);
        }

        let game = Game::new(game_id.to_string(), lobby.players);
        let snapshot = game.snapshot();
        self.store.save_game(&snapshot);
        self.games.insert(game_id.to_string(), game);
        debug!(game = %game_id, players = snapshot.players.len(), "game started");
        Ok(snapshot)
    }

    /// Apply one action: serialized per game by the map entry guard,
    /// persisted before the snapshot leaves the registry
    pub fn process_action(
        &self,
        game_id: &str,
        action: &GameAction,
    ) -> Result<GameState, RegistryError> {
        self.ensure_cached(game_id)?;

        let snapshot = {
            let mut game = self
                .games
                .get_mut(game_id)
                .ok_or(RegistryError::GameNotFound)?;
            let events = game.process_action(action)?;
            debug!(game = %game_id, player = %action.player_id, events = events.len(), "action applied");
            game.snapshot()
        };

        self.store.save_game(&snapshot);
        Ok(snapshot)
    }

    /// Current snapshot, from cache or store
    pub fn game_state(&self, game_id: &str) -> Option<GameState> {
        if let Some(game) = self.games.get(game_id) {
            return Some(game.snapshot());
        }
        self.store.load_game(game_id)
    }

    /// The next bot action, when the current player is bot-controlled
    pub fn next_bot_action(&self, game_id: &str) -> Option<GameAction> {
        self.ensure_cached(game_id).ok()?;
        let game = self.games.get(game_id)?;
        if game.is_finished() {
            return None;
        }

        let current = game.state().current_player();
        if !current.is_bot {
            return None;
        }
        let level = current.bot_level?;

        let mut rng = rand::thread_rng();
        bot::decide(game.state(), &current.id, level, &mut rng)
    }

    /// Drop a game from the cache; the store copy stays authoritative
    pub fn evict(&self, game_id: &str) {
        self.games.remove(game_id);
    }

    /// Remove a game from cache and store
    pub fn delete_game(&self, game_id: &str) {
        self.lobbies.remove(game_id);
        self.games.remove(game_id);
        self.store.delete_game(game_id);
    }

    /// Summaries of all lobbies and running games
    pub fn list_games(&self) -> Vec<GameSummary> {
        let mut games: Vec<GameSummary> = self
            .lobbies
            .iter()
            .map(|entry| GameSummary {
                id: entry.key().clone(),
                player_count: entry.players.len(),
                max_players: MAX_PLAYERS,
                status: GameStatus::Waiting,
            })
            .collect();
        games.extend(self.games.iter().map(|entry| GameSummary {
            id: entry.key().clone(),
            player_count: entry.state().players.len(),
            max_players: MAX_PLAYERS,
            status: if entry.is_finished() {
                GameStatus::Finished
            } else {
                GameStatus::InGame
            },
        }));
        games
    }

    /// Drive consecutive bot turns for one game: an explicit paced loop, not
    /// recursion. Each iteration re-checks that the game still exists and
    /// that the current player is still a bot, so eviction or deletion
    /// cancels the chain; a rejected bot action forfeits that turn instead
    /// of wedging the game. `broadcast` receives every resulting snapshot.
    pub async fn drive_bots<F>(self: Arc<Self>, game_id: String, broadcast: F)
    where
        F: Fn(&GameState) + Send + Sync,
    {
        loop {
            tokio::time::sleep(self.bot_delay).await;

            let Some(action) = self.next_bot_action(&game_id) else {
                break;
            };

            match self.process_action(&game_id, &action) {
                Ok(snapshot) => {
                    let finished = snapshot.phase == GamePhase::Finished;
                    broadcast(&snapshot);
                    if finished {
                        break;
                    }
                }
                Err(err) => {
                    warn!(game = %game_id, error = %err, "bot action rejected, ending its turn");
                    let end_turn = GameAction {
                        player_id: action.player_id.clone(),
                        kind: ActionKind::EndTurn,
                    };
                    match self.process_action(&game_id, &end_turn) {
                        Ok(snapshot) => broadcast(&snapshot),
                        Err(_) => break,
                    }
                }
            }
        }
    }

    /// Load a game into the cache from the store if it is not resident
    fn ensure_cached(&self, game_id: &str) -> Result<(), RegistryError> {
        if self.games.contains_key(game_id) {
            return Ok(());
        }
        let state = self
            .store
            .load_game(game_id)
            .ok_or(RegistryError::GameNotFound)?;
        self.games
            .entry(game_id.to_string())
            .or_insert_with(|| Game::from_state(state));
        Ok(())
    }
}
