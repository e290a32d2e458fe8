//! Persistence collaborator for game state.
//!
//! The registry treats the store as the source of truth and its own map as
//! a cache: every applied action is written through, and a cache miss is
//! answered by loading from here. Operations are atomic from the engine's
//! perspective.

use colonia_core::GameState;
use std::collections::HashMap;
use std::sync::Mutex;

/// Durable storage keyed by game id
pub trait GameStore: Send + Sync {
    /// Load a full game-state snapshot, or None if unknown
    fn load_game(&self, game_id: &str) -> Option<GameState>;

    /// Persist a full game-state snapshot
    fn save_game(&self, state: &GameState);

    /// Forget a game entirely
    fn delete_game(&self, game_id: &str);
}

/// In-memory reference implementation
#[derive(Default)]
pub struct MemoryStore {
    games: Mutex<HashMap<String, GameState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for MemoryStore {
    fn load_game(&self, game_id: &str) -> Option<GameState> {
        self.games.lock().unwrap().get(game_id).cloned()
    }

    fn save_game(&self, state: &GameState) {
        self.games
            .lock()
            .unwrap()
            .insert(state.id.clone(), state.clone());
    }

    fn delete_game(&self, game_id: &str) {
        self.games.lock().unwrap().remove(game_id);
    }
}
