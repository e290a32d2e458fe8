//! Player state and resource management.
//!
//! This module contains:
//! - `ResourceHand` for managing per-resource counts
//! - Building costs
//! - Development card types and the per-game shuffled deck
//! - The `Player` aggregate

use crate::board::{PlayerId, Resource};
use crate::bot::BotLevel;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Display colors handed out by seat order, enough for 8 players
pub const PLAYER_COLORS: [&str; 8] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#FFA07A", "#98D8C8", "#F7DC6F", "#BB8FCE", "#85C1E2",
];

/// A hand of resources (also used for the bank and for trade sides)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceHand {
    pub wood: u32,
    pub brick: u32,
    pub sheep: u32,
    pub wheat: u32,
    pub ore: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(wood: u32, brick: u32, sheep: u32, wheat: u32, ore: u32) -> Self {
        Self {
            wood,
            brick,
            sheep,
            wheat,
            ore,
        }
    }

    /// Create a hand holding a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(resource, amount);
        hand
    }

    /// Total number of resource units
    pub fn total(&self) -> u32 {
        self.wood + self.brick + self.sheep + self.wheat + self.ore
    }

    /// Check if the hand is empty
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get the count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Brick => self.brick,
            Resource::Sheep => self.sheep,
            Resource::Wheat => self.wheat,
            Resource::Ore => self.ore,
        }
    }

    /// Set the count of a specific resource
    pub fn set(&mut self, resource: Resource, count: u32) {
        match resource {
            Resource::Wood => self.wood = count,
            Resource::Brick => self.brick = count,
            Resource::Sheep => self.sheep = count,
            Resource::Wheat => self.wheat = count,
            Resource::Ore => self.ore = count,
        }
    }

    /// Add units of a resource
    pub fn add(&mut self, resource: Resource, amount: u32) {
        self.set(resource, self.get(resource) + amount);
    }

    /// Add another hand to this one
    pub fn add_hand(&mut self, other: &ResourceHand) {
        self.wood += other.wood;
        self.brick += other.brick;
        self.sheep += other.sheep;
        self.wheat += other.wheat;
        self.ore += other.ore;
    }

    /// Check whether every resource in `cost` is covered
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        self.wood >= cost.wood
            && self.brick >= cost.brick
            && self.sheep >= cost.sheep
            && self.wheat >= cost.wheat
            && self.ore >= cost.ore
    }

    /// Subtract a cost. Callers must pre-check with [`can_afford`].
    ///
    /// [`can_afford`]: ResourceHand::can_afford
    pub fn subtract(&mut self, cost: &ResourceHand) {
        assert!(self.can_afford(cost), "cannot afford this cost");
        self.wood -= cost.wood;
        self.brick -= cost.brick;
        self.sheep -= cost.sheep;
        self.wheat -= cost.wheat;
        self.ore -= cost.ore;
    }

    /// Remove one uniformly-random unit (robber stealing)
    pub fn steal_random<R: Rng>(&mut self, rng: &mut R) -> Option<Resource> {
        let units = self.as_units();
        let resource = *units.choose(rng)?;
        self.subtract(&ResourceHand::single(resource, 1));
        Some(resource)
    }

    /// Remove `count` uniformly-random units and return what was removed
    pub fn discard_random<R: Rng>(&mut self, count: u32, rng: &mut R) -> ResourceHand {
        let mut units = self.as_units();
        units.shuffle(rng);

        let mut discarded = ResourceHand::new();
        for resource in units.into_iter().take(count as usize) {
            discarded.add(resource, 1);
        }
        self.subtract(&discarded);
        discarded
    }

    /// Expand to one entry per held unit
    fn as_units(&self) -> Vec<Resource> {
        let mut units = Vec::with_capacity(self.total() as usize);
        for resource in Resource::ALL {
            for _ in 0..self.get(resource) {
                units.push(resource);
            }
        }
        units
    }
}

/// Building costs
pub mod costs {
    use super::ResourceHand;

    /// Road: 1 wood, 1 brick
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 0, 0)
    }

    /// Settlement: 1 wood, 1 brick, 1 sheep, 1 wheat
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 1, 1, 0)
    }

    /// City upgrade: 2 wheat, 3 ore
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 0, 2, 3)
    }

    /// Development card: 1 sheep, 1 wheat, 1 ore
    pub fn development_card() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 1, 1, 1)
    }
}

/// Development card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevelopmentCard {
    /// Move the robber and steal, counts toward Largest Army
    Knight,
    /// Worth 1 VP, revealed on purchase
    VictoryPoint,
    /// Place 2 roads for free
    RoadBuilding,
    /// Take any 2 resources from the bank
    YearOfPlenty,
    /// Take all of one resource from every other player
    Monopoly,
}

/// A finite shuffled stack of development cards.
///
/// Standard composition: 14 knights, 5 victory points, 2 road building,
/// 2 year of plenty, 2 monopoly. The deck only ever shrinks.
#[derive(Debug, Clone)]
pub struct DevelopmentCardDeck {
    cards: Vec<DevelopmentCard>,
}

impl DevelopmentCardDeck {
    /// Create a freshly shuffled 25-card deck
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();
        Self::with_rng(&mut rng)
    }

    /// Create with a provided RNG for deterministic decks in tests
    pub fn with_rng<R: Rng>(rng: &mut R) -> Self {
        let mut cards = Self::standard_cards();
        cards.shuffle(rng);
        Self { cards }
    }

    /// Rebuild the draw pile for a reloaded game: the standard composition
    /// minus every card already held or played, reshuffled.
    pub fn for_players(players: &[Player]) -> Self {
        let mut cards = Self::standard_cards();
        for player in players {
            for card in player
                .development_cards
                .iter()
                .chain(&player.played_development_cards)
            {
                if let Some(pos) = cards.iter().position(|c| c == card) {
                    cards.remove(pos);
                }
            }
        }
        let mut rng = rand::thread_rng();
        cards.shuffle(&mut rng);
        Self { cards }
    }

    fn standard_cards() -> Vec<DevelopmentCard> {
        let mut cards = Vec::with_capacity(25);
        cards.extend(std::iter::repeat(DevelopmentCard::Knight).take(14));
        cards.extend(std::iter::repeat(DevelopmentCard::VictoryPoint).take(5));
        cards.extend(std::iter::repeat(DevelopmentCard::RoadBuilding).take(2));
        cards.extend(std::iter::repeat(DevelopmentCard::YearOfPlenty).take(2));
        cards.extend(std::iter::repeat(DevelopmentCard::Monopoly).take(2));
        cards
    }

    /// Pop the top card, or None when exhausted
    pub fn draw(&mut self) -> Option<DevelopmentCard> {
        self.cards.pop()
    }

    /// Number of cards left in the deck
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}

impl Default for DevelopmentCardDeck {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-player building tallies (placed pieces, not remaining stock)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingCounts {
    pub settlements: u32,
    pub cities: u32,
    pub roads: u32,
}

/// A single player's state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    pub resources: ResourceHand,
    /// Development cards in hand (unplayed)
    pub development_cards: Vec<DevelopmentCard>,
    /// Development cards already played
    pub played_development_cards: Vec<DevelopmentCard>,
    pub buildings: BuildingCounts,
    /// Cached total, maintained incrementally by the engine.
    /// [`Player::derived_victory_points`] recomputes it for cross-checks.
    pub victory_points: u32,
    pub longest_road: bool,
    pub largest_army: bool,
    pub is_active: bool,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub bot_level: Option<BotLevel>,
}

impl Player {
    /// Create a new human player
    pub fn new(id: PlayerId, name: String, color: String) -> Self {
        Self {
            id,
            name,
            color,
            resources: ResourceHand::new(),
            development_cards: Vec::new(),
            played_development_cards: Vec::new(),
            buildings: BuildingCounts::default(),
            victory_points: 0,
            longest_road: false,
            largest_army: false,
            is_active: true,
            is_bot: false,
            bot_level: None,
        }
    }

    /// Number of knights this player has played
    pub fn played_knights(&self) -> usize {
        self.played_development_cards
            .iter()
            .filter(|c| matches!(c, DevelopmentCard::Knight))
            .count()
    }

    /// Whether a card of this type is in hand
    pub fn holds_card(&self, card: DevelopmentCard) -> bool {
        self.development_cards.contains(&card)
    }

    /// Move a card from hand to the played list. False if not held.
    pub fn play_card(&mut self, card: DevelopmentCard) -> bool {
        if let Some(pos) = self.development_cards.iter().position(|c| *c == card) {
            self.development_cards.remove(pos);
            self.played_development_cards.push(card);
            true
        } else {
            false
        }
    }

    /// Recompute victory points from first principles: buildings, revealed
    /// victory-point cards, and the two bonuses. Used to assert the cached
    /// counter never drifts.
    pub fn derived_victory_points(&self) -> u32 {
        let mut vp = self.buildings.settlements + self.buildings.cities * 2;
        vp += self
            .development_cards
            .iter()
            .filter(|c| matches!(c, DevelopmentCard::VictoryPoint))
            .count() as u32;
        if self.longest_road {
            vp += 2;
        }
        if self.largest_army {
            vp += 2;
        }
        vp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_resource_hand_total() {
        let hand = ResourceHand::with_amounts(1, 2, 3, 4, 5);
        assert_eq!(hand.total(), 15);
    }

    #[test]
    fn test_resource_hand_can_afford() {
        let hand = ResourceHand::with_amounts(2, 2, 2, 2, 2);
        assert!(hand.can_afford(&ResourceHand::with_amounts(1, 1, 1, 1, 1)));
        assert!(!hand.can_afford(&ResourceHand::with_amounts(3, 0, 0, 0, 0)));
        // Missing entries are trivially satisfied
        assert!(hand.can_afford(&ResourceHand::new()));
    }

    #[test]
    fn test_resource_hand_subtract() {
        let mut hand = ResourceHand::with_amounts(3, 3, 3, 3, 3);
        hand.subtract(&ResourceHand::with_amounts(1, 1, 1, 1, 1));
        assert_eq!(hand, ResourceHand::with_amounts(2, 2, 2, 2, 2));
    }

    #[test]
    fn test_building_costs() {
        assert_eq!(costs::road().total(), 2);
        assert_eq!(costs::settlement().total(), 4);
        assert_eq!(costs::city().total(), 5);
        assert_eq!(costs::development_card().total(), 3);
    }

    #[test]
    fn test_steal_random_from_single_resource() {
        let mut hand = ResourceHand::single(Resource::Wheat, 1);
        let mut rng = rand::thread_rng();

        let stolen = hand.steal_random(&mut rng);
        assert_eq!(stolen, Some(Resource::Wheat));
        assert!(hand.is_empty());

        assert_eq!(hand.steal_random(&mut rng), None);
    }

    #[test]
    fn test_discard_random_removes_exact_count() {
        let mut hand = ResourceHand::with_amounts(3, 2, 2, 1, 1);
        let mut rng = StdRng::seed_from_u64(11);

        let discarded = hand.discard_random(4, &mut rng);
        assert_eq!(discarded.total(), 4);
        assert_eq!(hand.total(), 5);
    }

    #[test]
    fn test_deck_composition_and_exhaustion() {
        let mut deck = DevelopmentCardDeck::with_rng(&mut StdRng::seed_from_u64(3));
        assert_eq!(deck.remaining(), 25);

        let mut knights = 0;
        let mut victory = 0;
        let mut roads = 0;
        let mut plenty = 0;
        let mut monopoly = 0;
        let mut previous_remaining = deck.remaining();
        while let Some(card) = deck.draw() {
            assert!(deck.remaining() < previous_remaining);
            previous_remaining = deck.remaining();
            match card {
                DevelopmentCard::Knight => knights += 1,
                DevelopmentCard::VictoryPoint => victory += 1,
                DevelopmentCard::RoadBuilding => roads += 1,
                DevelopmentCard::YearOfPlenty => plenty += 1,
                DevelopmentCard::Monopoly => monopoly += 1,
            }
        }

        assert_eq!((knights, victory, roads, plenty, monopoly), (14, 5, 2, 2, 2));
        assert_eq!(deck.remaining(), 0);
        assert_eq!(deck.draw(), None);
    }

    #[test]
    fn test_deck_rebuild_excludes_held_cards() {
        let mut player = Player::new("p1".into(), "Alice".into(), PLAYER_COLORS[0].into());
        player.development_cards.push(DevelopmentCard::Knight);
        player.development_cards.push(DevelopmentCard::Monopoly);
        player.played_development_cards.push(DevelopmentCard::Knight);

        let deck = DevelopmentCardDeck::for_players(&[player]);
        assert_eq!(deck.remaining(), 22);
    }

    #[test]
    fn test_play_card_moves_to_played_list() {
        let mut player = Player::new("p1".into(), "Alice".into(), PLAYER_COLORS[0].into());
        player.development_cards.push(DevelopmentCard::Knight);

        assert!(player.play_card(DevelopmentCard::Knight));
        assert!(!player.holds_card(DevelopmentCard::Knight));
        assert_eq!(player.played_knights(), 1);

        assert!(!player.play_card(DevelopmentCard::Knight));
    }

    #[test]
    fn test_derived_victory_points() {
        let mut player = Player::new("p1".into(), "Alice".into(), PLAYER_COLORS[0].into());
        assert_eq!(player.derived_victory_points(), 0);

        player.buildings.settlements = 2;
        player.buildings.cities = 1;
        assert_eq!(player.derived_victory_points(), 4);

        player.development_cards.push(DevelopmentCard::VictoryPoint);
        player.longest_road = true;
        assert_eq!(player.derived_victory_points(), 7);

        player.largest_army = true;
        assert_eq!(player.derived_victory_points(), 9);
    }
}
