//! Core game state machine.
//!
//! `Game` owns the authoritative `GameState` plus the per-game development
//! card deck and applies one `GameAction` at a time. Every handler
//! validates fully before mutating: a failed action returns an error and
//! leaves the state untouched. Callers get owned snapshots, never the live
//! aggregate.

use crate::actions::{ActionKind, CardPlay, GameAction, GameEvent};
use crate::board::{Board, PlayerId, Port, Resource, Road, TileId};
use crate::hex::HexCoord;
use crate::player::{costs, DevelopmentCard, DevelopmentCardDeck, Player, ResourceHand};
use crate::validate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Victory points needed to win
pub const VICTORY_POINTS_TO_WIN: u32 = 10;

/// Minimum road chain length for the Longest Road bonus
const MIN_LONGEST_ROAD: u32 = 5;

/// Minimum played knights for the Largest Army bonus
const MIN_LARGEST_ARMY: usize = 3;

/// Bank stock per resource at game start
const BANK_PER_RESOURCE: u32 = 19;

/// Per-player piece limits
pub const MAX_SETTLEMENTS: u32 = 5;
pub const MAX_CITIES: u32 = 4;
pub const MAX_ROADS: u32 = 15;

/// Game phase, monotonic: setup -> playing -> finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Setup,
    Playing,
    Finished,
}

/// Errors surfaced by the rules engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("not your turn")]
    NotYourTurn,

    #[error("the game is already finished")]
    GameFinished,

    #[error("invalid placement: {0}")]
    InvalidPlacement(#[from] validate::PlacementViolation),

    #[error("insufficient resources")]
    InsufficientResources,

    #[error("the bank cannot supply this")]
    BankDepleted,

    #[error("player not found")]
    PlayerNotFound,

    #[error("target player not found")]
    TargetNotFound,

    #[error("no tile with this id")]
    UnknownTile,

    #[error("no development cards left in the deck")]
    DeckExhausted,

    #[error("you do not hold that card")]
    CardNotHeld,

    #[error("this card cannot be played like that")]
    CardNotPlayable,

    #[error("the dice have already been rolled this turn")]
    DiceAlreadyRolled,

    #[error("the dice cannot be rolled during setup")]
    DiceNotAllowed,

    #[error("no pieces of this kind remaining")]
    NoPiecesRemaining,

    #[error("invalid trade")]
    InvalidTrade,
}

/// The dice roll recorded for the current turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceRoll {
    pub value: u8,
    pub player_id: PlayerId,
}

/// The complete game state, the persisted aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub id: String,
    /// Turn order is fixed at creation
    pub players: Vec<Player>,
    pub current_player_index: usize,
    pub board: Board,
    pub dice_roll: Option<DiceRoll>,
    pub phase: GamePhase,
    pub turn_number: u32,
    /// Resource supply; every movement that canonically involves the bank
    /// debits or credits it
    pub bank: ResourceHand,
    /// 1 while players place their first settlement, 2 afterwards
    pub setup_round: u8,
    /// Total settlements placed during setup, across all players
    pub setup_settlements_placed: u32,
    /// Set by a roll of 7, cleared by moving the robber
    #[serde(default)]
    pub robber_pending: bool,
    /// Free road placements granted by a Road Building card
    #[serde(default)]
    pub pending_free_roads: u8,
}

impl GameState {
    /// The player whose turn it is
    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player_index]
    }

    /// Look up a player by id
    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    fn player_index(&self, id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }
}

/// The rules engine: authoritative state plus the card deck
#[derive(Debug)]
pub struct Game {
    state: GameState,
    deck: DevelopmentCardDeck,
}

impl Game {
    /// Create a new game. Board shape follows the player count.
    ///
    /// Player-count bounds (2-8) are the caller's responsibility and are
    /// asserted here, not surfaced as an action error.
    pub fn new(id: String, players: Vec<Player>) -> Self {
        let mut rng = rand::thread_rng();
        Self::with_rng(id, players, &mut rng)
    }

    /// Create with a provided RNG for deterministic boards and decks
    pub fn with_rng<R: Rng>(id: String, players: Vec<Player>, rng: &mut R) -> Self {
        assert!(
            (2..=8).contains(&players.len()),
            "games take 2 to 8 players"
        );

        let board = Board::generate_with_rng(players.len(), rng);
        let state = GameState {
            id,
            players,
            current_player_index: 0,
            board,
            dice_roll: None,
            phase: GamePhase::Setup,
            turn_number: 0,
            bank: ResourceHand::with_amounts(
                BANK_PER_RESOURCE,
                BANK_PER_RESOURCE,
                BANK_PER_RESOURCE,
                BANK_PER_RESOURCE,
                BANK_PER_RESOURCE,
            ),
            setup_round: 1,
            setup_settlements_placed: 0,
            robber_pending: false,
            pending_free_roads: 0,
        };

        Self {
            state,
            deck: DevelopmentCardDeck::with_rng(rng),
        }
    }

    /// Rehydrate an engine from a persisted state. The draw pile is rebuilt
    /// as the standard composition minus every card already held or played.
    pub fn from_state(state: GameState) -> Self {
        let deck = DevelopmentCardDeck::for_players(&state.players);
        Self { state, deck }
    }

    /// Read-only view of the live state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Owned deep copy for transport and persistence
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    /// The per-game development card deck
    pub fn deck(&self) -> &DevelopmentCardDeck {
        &self.deck
    }

    /// Whether the game has reached its terminal phase
    pub fn is_finished(&self) -> bool {
        self.state.phase == GamePhase::Finished
    }

    /// The winner, resolved by maximum victory points at finish time
    pub fn winner(&self) -> Option<&Player> {
        if !self.is_finished() {
            return None;
        }
        self.state.players.iter().max_by_key(|p| p.victory_points)
    }

    /// Apply one action. On error the state is unchanged.
    pub fn process_action(&mut self, action: &GameAction) -> Result<Vec<GameEvent>, GameError> {
        if self.state.phase == GamePhase::Finished {
            return Err(GameError::GameFinished);
        }

        let actor = self
            .state
            .player_index(&action.player_id)
            .ok_or(GameError::PlayerNotFound)?;
        if actor != self.state.current_player_index {
            return Err(GameError::NotYourTurn);
        }

        match &action.kind {
            ActionKind::RollDice => self.handle_roll_dice(actor),
            ActionKind::PlaceSettlement { coordinate } => {
                self.handle_place_settlement(actor, coordinate)
            }
            ActionKind::PlaceCity { coordinate } => self.handle_place_city(actor, coordinate),
            ActionKind::PlaceRoad { from, to } => self.handle_place_road(actor, from, to),
            ActionKind::BuyDevelopmentCard => self.handle_buy_development_card(actor),
            ActionKind::PlayDevelopmentCard(play) => {
                self.handle_play_development_card(actor, play)
            }
            ActionKind::MoveRobber {
                tile_id,
                target_player_id,
            } => self.handle_move_robber(actor, *tile_id, target_player_id.as_deref()),
            ActionKind::Trade {
                give,
                receive,
                target_player_id,
            } => self.handle_trade(actor, give, receive, target_player_id.as_deref()),
            ActionKind::EndTurn => self.handle_end_turn(actor),
        }
    }

    // ==================== Handlers ====================

    fn handle_roll_dice(&mut self, actor: usize) -> Result<Vec<GameEvent>, GameError> {
        if self.state.phase != GamePhase::Playing {
            return Err(GameError::DiceNotAllowed);
        }
        if self.state.dice_roll.is_some() {
            return Err(GameError::DiceAlreadyRolled);
        }

        let mut rng = rand::thread_rng();
        let total: u8 = rng.gen_range(1..=6u8) + rng.gen_range(1..=6u8);

        let player_id = self.state.players[actor].id.clone();
        self.state.dice_roll = Some(DiceRoll {
            value: total,
            player_id: player_id.clone(),
        });

        let mut events = vec![GameEvent::DiceRolled {
            player: player_id,
            total,
        }];

        if total == 7 {
            // No distribution; the robber must be moved by a follow-up action
            self.state.robber_pending = true;
        } else {
            let distributions = self.distribute_resources(total);
            if !distributions.is_empty() {
                events.push(GameEvent::ResourcesDistributed { distributions });
            }
        }

        Ok(events)
    }

    fn handle_place_settlement(
        &mut self,
        actor: usize,
        coordinate: &HexCoord,
    ) -> Result<Vec<GameEvent>, GameError> {
        let is_setup = self.state.phase == GamePhase::Setup;
        let player_id = self.state.players[actor].id.clone();

        validate::settlement(coordinate, &player_id, &self.state.board, is_setup)?;

        let cost = costs::settlement();
        {
            let player = &self.state.players[actor];
            if player.buildings.settlements >= MAX_SETTLEMENTS {
                return Err(GameError::NoPiecesRemaining);
            }
            if !is_setup && !player.resources.can_afford(&cost) {
                return Err(GameError::InsufficientResources);
            }
        }

        self.state.board.place_settlement(coordinate, player_id.clone());
        let player = &mut self.state.players[actor];
        player.buildings.settlements += 1;
        player.victory_points += 1;

        let mut events = vec![GameEvent::SettlementBuilt {
            player: player_id,
            coordinate: *coordinate,
        }];

        if is_setup {
            self.state.setup_settlements_placed += 1;
            if self.state.setup_settlements_placed >= self.state.players.len() as u32 {
                self.state.setup_round = 2;
            }
            // Each player collects starting resources for their second
            // settlement, one unit per adjacent productive tile
            if self.state.players[actor].buildings.settlements == 2 {
                let distributions = self.grant_initial_resources(actor, coordinate);
                if !distributions.is_empty() {
                    events.push(GameEvent::ResourcesDistributed { distributions });
                }
            }
            // Roads may precede the second settlement, so completion can
            // land on either placement kind
            if self.setup_complete() {
                self.state.phase = GamePhase::Playing;
                self.state.turn_number = 1;
                events.push(GameEvent::SetupCompleted);
            }
        } else {
            self.pay_cost(actor, &cost);
        }

        Ok(events)
    }

    fn handle_place_city(
        &mut self,
        actor: usize,
        coordinate: &HexCoord,
    ) -> Result<Vec<GameEvent>, GameError> {
        let player_id = self.state.players[actor].id.clone();

        validate::city_upgrade(coordinate, &player_id, &self.state.board)?;

        let cost = costs::city();
        {
            let player = &self.state.players[actor];
            if player.buildings.cities >= MAX_CITIES {
                return Err(GameError::NoPiecesRemaining);
            }
            if !player.resources.can_afford(&cost) {
                return Err(GameError::InsufficientResources);
            }
        }

        self.state.board.upgrade_to_city(coordinate);
        let player = &mut self.state.players[actor];
        player.buildings.settlements -= 1;
        player.buildings.cities += 1;
        player.victory_points += 1;
        self.pay_cost(actor, &cost);

        Ok(vec![GameEvent::CityBuilt {
            player: player_id,
            coordinate: *coordinate,
        }])
    }

    fn handle_place_road(
        &mut self,
        actor: usize,
        from: &HexCoord,
        to: &HexCoord,
    ) -> Result<Vec<GameEvent>, GameError> {
        let is_setup = self.state.phase == GamePhase::Setup;
        let free = is_setup || self.state.pending_free_roads > 0;
        let player_id = self.state.players[actor].id.clone();

        validate::road(from, to, &player_id, &self.state.board, is_setup)?;

        let cost = costs::road();
        {
            let player = &self.state.players[actor];
            if player.buildings.roads >= MAX_ROADS {
                return Err(GameError::NoPiecesRemaining);
            }
            if !free && !player.resources.can_afford(&cost) {
                return Err(GameError::InsufficientResources);
            }
        }

        self.state.board.add_road(*from, *to, player_id.clone());
        self.state.players[actor].buildings.roads += 1;

        if !free {
            self.pay_cost(actor, &cost);
        } else if !is_setup {
            self.state.pending_free_roads -= 1;
        }

        let mut events = vec![GameEvent::RoadBuilt {
            player: player_id,
            from: *from,
            to: *to,
        }];
        events.extend(self.update_longest_road());

        if is_setup && self.setup_complete() {
            self.state.phase = GamePhase::Playing;
            self.state.turn_number = 1;
            events.push(GameEvent::SetupCompleted);
        }

        Ok(events)
    }

    fn handle_buy_development_card(&mut self, actor: usize) -> Result<Vec<GameEvent>, GameError> {
        let cost = costs::development_card();

        if self.deck.remaining() == 0 {
            return Err(GameError::DeckExhausted);
        }
        if !self.state.players[actor].resources.can_afford(&cost) {
            return Err(GameError::InsufficientResources);
        }

        self.pay_cost(actor, &cost);
        let card = self.deck.draw().ok_or(GameError::DeckExhausted)?;

        let player = &mut self.state.players[actor];
        player.development_cards.push(card);
        if card == DevelopmentCard::VictoryPoint {
            // Victory-point cards are revealed on purchase
            player.victory_points += 1;
        }

        Ok(vec![GameEvent::DevelopmentCardPurchased {
            player: player.id.clone(),
        }])
    }

    fn handle_play_development_card(
        &mut self,
        actor: usize,
        play: &CardPlay,
    ) -> Result<Vec<GameEvent>, GameError> {
        let card = play.card();
        if !self.state.players[actor].holds_card(card) {
            return Err(GameError::CardNotHeld);
        }

        // Validate the effect before consuming the card
        match play {
            CardPlay::Knight {
                tile_id,
                target_player_id,
            } => {
                if self.state.board.tile(*tile_id).is_none() {
                    return Err(GameError::UnknownTile);
                }
                if let Some(target) = target_player_id {
                    if self.state.player_index(target).is_none() {
                        return Err(GameError::TargetNotFound);
                    }
                }
            }
            CardPlay::YearOfPlenty { resources } => {
                if resources.total() != 2 {
                    return Err(GameError::CardNotPlayable);
                }
                for resource in Resource::ALL {
                    if self.state.bank.get(resource) < resources.get(resource) {
                        return Err(GameError::BankDepleted);
                    }
                }
            }
            CardPlay::RoadBuilding | CardPlay::Monopoly { .. } => {}
        }

        let player_id = self.state.players[actor].id.clone();
        self.state.players[actor].play_card(card);

        let mut events = vec![GameEvent::DevelopmentCardPlayed {
            player: player_id.clone(),
            card,
        }];

        match play {
            CardPlay::Knight {
                tile_id,
                target_player_id,
            } => {
                self.state.board.place_robber(*tile_id);
                self.state.robber_pending = false;
                events.push(GameEvent::RobberMoved {
                    player: player_id,
                    tile: *tile_id,
                });
                if let Some(target) = target_player_id {
                    let victim = self
                        .state
                        .player_index(target)
                        .ok_or(GameError::TargetNotFound)?;
                    events.extend(self.rob_player(actor, victim));
                }
                events.extend(self.update_largest_army());
            }
            CardPlay::RoadBuilding => {
                self.state.pending_free_roads = 2;
            }
            CardPlay::YearOfPlenty { resources } => {
                for resource in Resource::ALL {
                    let amount = resources.get(resource);
                    if amount == 0 {
                        continue;
                    }
                    let stock = self.state.bank.get(resource);
                    self.state.bank.set(resource, stock - amount);
                    self.state.players[actor].resources.add(resource, amount);
                }
            }
            CardPlay::Monopoly { resource_type } => {
                let mut taken = 0;
                for (i, other) in self.state.players.iter_mut().enumerate() {
                    if i == actor {
                        continue;
                    }
                    taken += other.resources.get(*resource_type);
                    other.resources.set(*resource_type, 0);
                }
                self.state.players[actor].resources.add(*resource_type, taken);
            }
        }

        Ok(events)
    }

    fn handle_move_robber(
        &mut self,
        actor: usize,
        tile_id: TileId,
        target_player_id: Option<&str>,
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.state.board.tile(tile_id).is_none() {
            return Err(GameError::UnknownTile);
        }
        let victim = match target_player_id {
            Some(target) => Some(
                self.state
                    .player_index(target)
                    .ok_or(GameError::TargetNotFound)?,
            ),
            None => None,
        };

        self.state.board.place_robber(tile_id);
        self.state.robber_pending = false;

        let mut events = vec![GameEvent::RobberMoved {
            player: self.state.players[actor].id.clone(),
            tile: tile_id,
        }];
        if let Some(victim) = victim {
            events.extend(self.rob_player(actor, victim));
        }

        Ok(events)
    }

    fn handle_trade(
        &mut self,
        actor: usize,
        give: &ResourceHand,
        receive: &ResourceHand,
        target_player_id: Option<&str>,
    ) -> Result<Vec<GameEvent>, GameError> {
        let player_id = self.state.players[actor].id.clone();

        if !self.state.players[actor].resources.can_afford(give) {
            return Err(GameError::InsufficientResources);
        }

        match target_player_id {
            Some(target) => {
                let target_index = self
                    .state
                    .player_index(target)
                    .ok_or(GameError::TargetNotFound)?;
                if target_index == actor {
                    return Err(GameError::InvalidTrade);
                }
                if !self.state.players[target_index].resources.can_afford(receive) {
                    return Err(GameError::InsufficientResources);
                }

                // Player-to-player trades are free-form; both sides swap
                // atomically
                self.state.players[actor].resources.subtract(give);
                self.state.players[actor].resources.add_hand(receive);
                self.state.players[target_index].resources.subtract(receive);
                self.state.players[target_index].resources.add_hand(give);

                Ok(vec![GameEvent::TradeCompleted {
                    player: player_id,
                    target: Some(target.to_string()),
                }])
            }
            None => {
                // Bank trade: every given resource must be an exact multiple
                // of the player's best rate for it, and the lots must add up
                // to the receive total
                if give.is_empty() || receive.is_empty() {
                    return Err(GameError::InvalidTrade);
                }

                let ports = self.state.board.player_ports(&player_id);
                let mut lots = 0;
                for resource in Resource::ALL {
                    let amount = give.get(resource);
                    if amount == 0 {
                        continue;
                    }
                    let rate = bank_rate(resource, &ports);
                    if amount % rate != 0 {
                        return Err(GameError::InvalidTrade);
                    }
                    lots += amount / rate;
                }
                if lots != receive.total() {
                    return Err(GameError::InvalidTrade);
                }
                for resource in Resource::ALL {
                    if self.state.bank.get(resource) < receive.get(resource) {
                        return Err(GameError::BankDepleted);
                    }
                }

                self.state.players[actor].resources.subtract(give);
                self.state.bank.add_hand(give);
                self.state.bank.subtract(receive);
                self.state.players[actor].resources.add_hand(receive);

                Ok(vec![GameEvent::TradeCompleted {
                    player: player_id,
                    target: None,
                }])
            }
        }
    }

    fn handle_end_turn(&mut self, actor: usize) -> Result<Vec<GameEvent>, GameError> {
        let player_id = self.state.players[actor].id.clone();

        self.state.dice_roll = None;
        self.state.robber_pending = false;
        self.state.pending_free_roads = 0;
        self.state.current_player_index = (actor + 1) % self.state.players.len();
        self.state.turn_number += 1;

        let next_player = self.state.current_player().id.clone();
        let mut events = vec![GameEvent::TurnEnded {
            player: player_id,
            next_player,
        }];

        if self
            .state
            .players
            .iter()
            .any(|p| p.victory_points >= VICTORY_POINTS_TO_WIN)
        {
            self.state.phase = GamePhase::Finished;
            let winner = self
                .winner()
                .map(|w| (w.id.clone(), w.victory_points));
            if let Some((player, victory_points)) = winner {
                events.push(GameEvent::GameWon {
                    player,
                    victory_points,
                });
            }
        }

        Ok(events)
    }

    // ==================== Resource Flow ====================

    /// Pay a pre-checked cost back into the bank
    fn pay_cost(&mut self, actor: usize, cost: &ResourceHand) {
        self.state.players[actor].resources.subtract(cost);
        self.state.bank.add_hand(cost);
    }

    /// Distribute production for a dice value, capped by the bank
    fn distribute_resources(&mut self, value: u8) -> Vec<(PlayerId, Resource, u32)> {
        let mut wanted: Vec<(PlayerId, Resource, u32)> = Vec::new();
        for tile in &self.state.board.tiles {
            if tile.number_token != Some(value) || tile.has_robber {
                continue;
            }
            let Some(resource) = tile.resource else {
                continue;
            };
            for intersection in self.state.board.adjacent_intersections(&tile.coordinate) {
                if let Some(building) = &intersection.building {
                    wanted.push((
                        building.owner.clone(),
                        resource,
                        building.kind.resource_multiplier(),
                    ));
                }
            }
        }

        let mut applied = Vec::new();
        for (owner, resource, want) in wanted {
            let available = self.state.bank.get(resource);
            let amount = want.min(available);
            if amount == 0 {
                continue;
            }
            let Some(index) = self.state.player_index(&owner) else {
                continue;
            };
            self.state.bank.set(resource, available - amount);
            self.state.players[index].resources.add(resource, amount);
            applied.push((owner, resource, amount));
        }
        applied
    }

    /// Starting resources for a player's second setup settlement: one unit
    /// per adjacent productive tile, from the bank
    fn grant_initial_resources(
        &mut self,
        actor: usize,
        coordinate: &HexCoord,
    ) -> Vec<(PlayerId, Resource, u32)> {
        let resources: Vec<Resource> = self
            .state
            .board
            .adjacent_tiles(coordinate)
            .iter()
            .filter_map(|t| t.resource)
            .collect();

        let player_id = self.state.players[actor].id.clone();
        let mut grants = Vec::new();
        for resource in resources {
            let available = self.state.bank.get(resource);
            if available == 0 {
                continue;
            }
            self.state.bank.set(resource, available - 1);
            self.state.players[actor].resources.add(resource, 1);
            grants.push((player_id.clone(), resource, 1));
        }
        grants
    }

    /// Discard-then-steal sequence against a robbed player
    fn rob_player(&mut self, thief: usize, victim: usize) -> Vec<GameEvent> {
        let mut rng = rand::thread_rng();
        let thief_id = self.state.players[thief].id.clone();
        let victim_id = self.state.players[victim].id.clone();
        let mut events = Vec::new();

        let total = self.state.players[victim].resources.total();
        if total > 7 {
            let count = total / 2;
            let discarded = self.state.players[victim]
                .resources
                .discard_random(count, &mut rng);
            self.state.bank.add_hand(&discarded);
            events.push(GameEvent::CardsDiscarded {
                player: victim_id.clone(),
                count,
            });
        }

        let stolen = self.state.players[victim].resources.steal_random(&mut rng);
        if let Some(resource) = stolen {
            self.state.players[thief].resources.add(resource, 1);
        }
        events.push(GameEvent::ResourceStolen {
            thief: thief_id,
            victim: victim_id,
            resource: stolen,
        });

        events
    }

    // ==================== Bonuses & Setup ====================

    fn setup_complete(&self) -> bool {
        self.state
            .players
            .iter()
            .all(|p| p.buildings.settlements >= 2 && p.buildings.roads >= 2)
    }

    /// Recompute the Longest Road bonus. The holder only changes when a
    /// single player has the strict maximum qualifying chain; ties leave
    /// the bonus where it is.
    fn update_longest_road(&mut self) -> Vec<GameEvent> {
        let mut best_length = 0;
        let mut leaders: Vec<usize> = Vec::new();
        for (i, player) in self.state.players.iter().enumerate() {
            let length = longest_road_length(&self.state.board, &player.id);
            if length < MIN_LONGEST_ROAD {
                continue;
            }
            if length > best_length {
                best_length = length;
                leaders = vec![i];
            } else if length == best_length {
                leaders.push(i);
            }
        }

        let current = self.state.players.iter().position(|p| p.longest_road);
        let new_holder = match leaders.len() {
            1 => Some(leaders[0]),
            _ => current,
        };
        if new_holder == current {
            return Vec::new();
        }

        if let Some(previous) = current {
            self.state.players[previous].longest_road = false;
            self.state.players[previous].victory_points -= 2;
        }
        if let Some(next) = new_holder {
            self.state.players[next].longest_road = true;
            self.state.players[next].victory_points += 2;
        }

        vec![GameEvent::LongestRoadChanged {
            previous: current.map(|i| self.state.players[i].id.clone()),
            current: new_holder.map(|i| self.state.players[i].id.clone()),
            length: best_length,
        }]
    }

    /// Recompute the Largest Army bonus after a knight play. Same holder
    /// rules as the road bonus, keyed on played knights (3 to qualify).
    fn update_largest_army(&mut self) -> Vec<GameEvent> {
        let mut best_knights = 0;
        let mut leaders: Vec<usize> = Vec::new();
        for (i, player) in self.state.players.iter().enumerate() {
            let knights = player.played_knights();
            if knights < MIN_LARGEST_ARMY {
                continue;
            }
            if knights > best_knights {
                best_knights = knights;
                leaders = vec![i];
            } else if knights == best_knights {
                leaders.push(i);
            }
        }

        let current = self.state.players.iter().position(|p| p.largest_army);
        let new_holder = match leaders.len() {
            1 => Some(leaders[0]),
            _ => current,
        };
        if new_holder == current {
            return Vec::new();
        }

        if let Some(previous) = current {
            self.state.players[previous].largest_army = false;
            self.state.players[previous].victory_points -= 2;
        }
        if let Some(next) = new_holder {
            self.state.players[next].largest_army = true;
            self.state.players[next].victory_points += 2;
        }

        vec![GameEvent::LargestArmyChanged {
            previous: current.map(|i| self.state.players[i].id.clone()),
            current: new_holder.map(|i| self.state.players[i].id.clone()),
            knights: best_knights as u32,
        }]
    }
}

/// Bank exchange rate for a resource given the player's port access
fn bank_rate(resource: Resource, ports: &[Port]) -> u32 {
    if ports.contains(&Port::Specific(resource)) {
        2
    } else if ports.contains(&Port::Generic) {
        3
    } else {
        4
    }
}

/// Length in edges of the player's longest contiguous road chain.
///
/// DFS over the player's road segments; an opponent's building on an
/// endpoint interrupts the chain.
pub fn longest_road_length(board: &Board, player: &str) -> u32 {
    let roads: Vec<&Road> = board.roads.iter().filter(|r| r.owner == player).collect();
    let mut best = 0;
    for start in 0..roads.len() {
        let mut visited = vec![false; roads.len()];
        best = best.max(chain_length(board, &roads, start, &mut visited, player));
    }
    best
}

fn chain_length(
    board: &Board,
    roads: &[&Road],
    current: usize,
    visited: &mut Vec<bool>,
    player: &str,
) -> u32 {
    visited[current] = true;

    let mut best_continuation = 0;
    for endpoint in [roads[current].from, roads[current].to] {
        if let Some(intersection) = board.intersection_at(&endpoint) {
            if intersection
                .building
                .as_ref()
                .is_some_and(|b| b.owner != player)
            {
                continue;
            }
        }
        for (next, road) in roads.iter().enumerate() {
            if !visited[next] && (road.from == endpoint || road.to == endpoint) {
                best_continuation =
                    best_continuation.max(chain_length(board, roads, next, visited, player));
            }
        }
    }

    visited[current] = false;
    1 + best_continuation
}
