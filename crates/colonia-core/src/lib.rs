//! Colonia - a settlers/trading board game engine
//!
//! This crate provides the authoritative game logic for Colonia:
//! - Axial hex coordinate system shared by tiles and intersections
//! - Board generation for three player-count-scaled shapes
//! - Player state, resource accounting and the development card deck
//! - Placement validation (distance and connectivity rules)
//! - The rules engine: one `GameAction` in, events out, all-or-nothing
//! - Three bot difficulty tiers driven through the same action path
//!
//! # Architecture
//!
//! The engine is synchronous and free of I/O. It expects one action at a
//! time per game (the server provides that serialization) and hands out
//! owned state snapshots, never live references.
//!
//! # Modules
//!
//! - [`hex`]: coordinates, distance and the canonical adjacency offsets
//! - [`board`]: tiles, intersections, roads, ports and generation
//! - [`player`]: resources, costs, cards and the deck
//! - [`validate`]: placement legality
//! - [`actions`]: wire-shaped actions and resulting events
//! - [`game`]: the state machine
//! - [`bot`]: the three bot strategies

pub mod actions;
pub mod board;
pub mod bot;
pub mod game;
pub mod hex;
pub mod player;
pub mod validate;

// Re-export commonly used types
pub use actions::{ActionKind, CardPlay, GameAction, GameEvent};
pub use board::{
    Board, Building, BuildingKind, Intersection, PlayerId, Port, Resource, Road, Terrain, Tile,
    TileId,
};
pub use bot::BotLevel;
pub use game::{
    longest_road_length, DiceRoll, Game, GameError, GamePhase, GameState, VICTORY_POINTS_TO_WIN,
};
pub use hex::HexCoord;
pub use player::{
    costs, DevelopmentCard, DevelopmentCardDeck, Player, ResourceHand, PLAYER_COLORS,
};
pub use validate::PlacementViolation;
