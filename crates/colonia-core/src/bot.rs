//! Bot players, three difficulty tiers.
//!
//! A bot produces at most one action per invocation and is driven
//! repeatedly by the server's scheduling loop, through the same
//! `process_action` entry point as human players. Feasibility is checked
//! with the same validator humans are checked with; there is no
//! bot-specific path in the engine.
//!
//! - amateur: settlement, road, end turn; random robber placement
//! - intermediate: adds cities and dev-card purchases; targeted robber
//! - difficult: adds knight/monopoly plays and a steal target

use crate::actions::{ActionKind, CardPlay, GameAction};
use crate::board::{PlayerId, Resource, TileId};
use crate::game::{GamePhase, GameState, MAX_CITIES, MAX_ROADS, MAX_SETTLEMENTS};
use crate::player::{costs, DevelopmentCard, Player, PLAYER_COLORS};
use crate::validate;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Bot difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotLevel {
    Amateur,
    Intermediate,
    Difficult,
}

/// Display-name pool per difficulty, cycled by seat
fn name_pool(level: BotLevel) -> [&'static str; 3] {
    match level {
        BotLevel::Amateur => ["Amateur Bot 1", "Amateur Bot 2", "Amateur Bot 3"],
        BotLevel::Intermediate => [
            "Intermediate Bot 1",
            "Intermediate Bot 2",
            "Intermediate Bot 3",
        ],
        BotLevel::Difficult => ["Difficult Bot 1", "Difficult Bot 2", "Difficult Bot 3"],
    }
}

/// Create a bot player for the given seat
pub fn create_bot(id: PlayerId, level: BotLevel, seat: usize) -> Player {
    let names = name_pool(level);
    let mut player = Player::new(
        id,
        names[seat % names.len()].to_string(),
        PLAYER_COLORS[seat % PLAYER_COLORS.len()].to_string(),
    );
    player.is_bot = true;
    player.bot_level = Some(level);
    player
}

/// Select one legal action for the bot, or None when it is not its turn
/// or the game is over
pub fn decide<R: Rng>(
    state: &GameState,
    bot_id: &str,
    level: BotLevel,
    rng: &mut R,
) -> Option<GameAction> {
    let player = state.player(bot_id)?;
    if state.current_player().id != bot_id {
        return None;
    }

    match state.phase {
        GamePhase::Finished => None,
        GamePhase::Setup => Some(setup_action(state, player)),
        GamePhase::Playing => Some(playing_action(state, player, level, rng)),
    }
}

/// Setup flow: one settlement then one road per round, then end the turn
fn setup_action(state: &GameState, player: &Player) -> GameAction {
    let wanted = if state.setup_round >= 2 { 2 } else { 1 };
    if player.buildings.settlements < wanted
        && player.buildings.settlements == player.buildings.roads
    {
        if let Some(kind) = try_settlement(state, player, true) {
            return act(player, kind);
        }
    }
    if player.buildings.roads < player.buildings.settlements {
        if let Some(kind) = try_road(state, player, true) {
            return act(player, kind);
        }
    }
    act(player, ActionKind::EndTurn)
}

fn playing_action<R: Rng>(
    state: &GameState,
    player: &Player,
    level: BotLevel,
    rng: &mut R,
) -> GameAction {
    if state.dice_roll.is_none() {
        return act(player, ActionKind::RollDice);
    }

    if state.robber_pending {
        if let Some(kind) = robber_action(state, player, level, rng) {
            return act(player, kind);
        }
    }

    let kind = match level {
        BotLevel::Amateur => try_settlement(state, player, false)
            .or_else(|| try_road(state, player, false)),
        BotLevel::Intermediate => try_settlement(state, player, false)
            .or_else(|| try_city(state, player))
            .or_else(|| try_road(state, player, false))
            .or_else(|| try_buy_card(player)),
        BotLevel::Difficult => try_card_play(state, player)
            .or_else(|| try_city(state, player))
            .or_else(|| try_settlement(state, player, false))
            .or_else(|| try_road(state, player, false))
            .or_else(|| try_buy_card(player)),
    };

    act(player, kind.unwrap_or(ActionKind::EndTurn))
}

fn act(player: &Player, kind: ActionKind) -> GameAction {
    GameAction {
        player_id: player.id.clone(),
        kind,
    }
}

/// After a 7: amateur scatters the robber, the other tiers aim it at the
/// tile with the most opponent production, difficult also picks a victim
fn robber_action<R: Rng>(
    state: &GameState,
    player: &Player,
    level: BotLevel,
    rng: &mut R,
) -> Option<ActionKind> {
    match level {
        BotLevel::Amateur => {
            let options: Vec<TileId> = state
                .board
                .tiles
                .iter()
                .filter(|t| !t.has_robber)
                .map(|t| t.id)
                .collect();
            let tile_id = *options.choose(rng)?;
            Some(ActionKind::MoveRobber {
                tile_id,
                target_player_id: None,
            })
        }
        BotLevel::Intermediate => Some(ActionKind::MoveRobber {
            tile_id: best_robber_tile(state, player)?,
            target_player_id: None,
        }),
        BotLevel::Difficult => Some(ActionKind::MoveRobber {
            tile_id: best_robber_tile(state, player)?,
            target_player_id: richest_opponent(state, player).map(|p| p.id.clone()),
        }),
    }
}

/// First intersection in board order the validator accepts
fn try_settlement(state: &GameState, player: &Player, is_setup: bool) -> Option<ActionKind> {
    if !is_setup && !player.resources.can_afford(&costs::settlement()) {
        return None;
    }
    if player.buildings.settlements >= MAX_SETTLEMENTS {
        return None;
    }

    for intersection in &state.board.intersections {
        if intersection.building.is_some() {
            continue;
        }
        if validate::settlement(&intersection.coordinate, &player.id, &state.board, is_setup)
            .is_ok()
        {
            return Some(ActionKind::PlaceSettlement {
                coordinate: intersection.coordinate,
            });
        }
    }
    None
}

/// First owned settlement in board order
fn try_city(state: &GameState, player: &Player) -> Option<ActionKind> {
    if !player.resources.can_afford(&costs::city()) {
        return None;
    }
    if player.buildings.cities >= MAX_CITIES {
        return None;
    }

    for intersection in &state.board.intersections {
        if validate::city_upgrade(&intersection.coordinate, &player.id, &state.board).is_ok() {
            return Some(ActionKind::PlaceCity {
                coordinate: intersection.coordinate,
            });
        }
    }
    None
}

/// First valid intersection pair in board order
fn try_road(state: &GameState, player: &Player, is_setup: bool) -> Option<ActionKind> {
    if !is_setup && !player.resources.can_afford(&costs::road()) {
        return None;
    }
    if player.buildings.roads >= MAX_ROADS {
        return None;
    }

    let intersections = &state.board.intersections;
    for i in 0..intersections.len() {
        for j in (i + 1)..intersections.len() {
            let from = intersections[i].coordinate;
            let to = intersections[j].coordinate;
            if from.distance_to(&to) != 1 {
                continue;
            }
            if validate::road(&from, &to, &player.id, &state.board, is_setup).is_ok() {
                return Some(ActionKind::PlaceRoad { from, to });
            }
        }
    }
    None
}

fn try_buy_card(player: &Player) -> Option<ActionKind> {
    if player.resources.can_afford(&costs::development_card()) {
        Some(ActionKind::BuyDevelopmentCard)
    } else {
        None
    }
}

/// Difficult-level card play: knight while building toward the army bonus,
/// monopoly when the hand runs dry
fn try_card_play(state: &GameState, player: &Player) -> Option<ActionKind> {
    if player.development_cards.is_empty() {
        return None;
    }

    if player.played_knights() < 3 && player.holds_card(DevelopmentCard::Knight) {
        let tile_id = best_robber_tile(state, player)?;
        return Some(ActionKind::PlayDevelopmentCard(CardPlay::Knight {
            tile_id,
            target_player_id: richest_opponent(state, player).map(|p| p.id.clone()),
        }));
    }

    if player.resources.total() < 3 && player.holds_card(DevelopmentCard::Monopoly) {
        return Some(ActionKind::PlayDevelopmentCard(CardPlay::Monopoly {
            resource_type: scarcest_resource(player),
        }));
    }

    None
}

/// The robber-free tile with the highest adjacent opponent production
/// (settlement 1, city 2). Falls back to the first available tile.
fn best_robber_tile(state: &GameState, player: &Player) -> Option<TileId> {
    let mut best: Option<(TileId, u32)> = None;
    for tile in &state.board.tiles {
        if tile.has_robber {
            continue;
        }
        let mut exposure = 0;
        for intersection in state.board.adjacent_intersections(&tile.coordinate) {
            if let Some(building) = &intersection.building {
                if building.owner != player.id {
                    exposure += building.kind.resource_multiplier();
                }
            }
        }
        match best {
            Some((_, top)) if exposure <= top => {}
            _ => best = Some((tile.id, exposure)),
        }
    }
    best.map(|(id, _)| id)
}

/// The opponent holding the most resources, earliest seat on ties
fn richest_opponent<'a>(state: &'a GameState, player: &Player) -> Option<&'a Player> {
    let mut best: Option<&Player> = None;
    for candidate in state.players.iter().filter(|p| p.id != player.id) {
        match best {
            Some(current) if candidate.resources.total() <= current.resources.total() => {}
            _ => best = Some(candidate),
        }
    }
    best
}

/// The resource the bot holds least of, ties broken in enumeration order
fn scarcest_resource(player: &Player) -> Resource {
    Resource::ALL
        .iter()
        .copied()
        .min_by_key(|r| player.resources.get(*r))
        .expect("resource list is non-empty")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Game;
    use crate::player::ResourceHand;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn bots(count: usize) -> Vec<Player> {
        (0..count)
            .map(|i| create_bot(format!("bot{}", i + 1), BotLevel::Amateur, i))
            .collect()
    }

    fn new_game(count: usize) -> Game {
        let mut rng = StdRng::seed_from_u64(9);
        Game::with_rng("bot-game".to_string(), bots(count), &mut rng)
    }

    #[test]
    fn test_create_bot_fills_identity() {
        let bot = create_bot("b1".to_string(), BotLevel::Difficult, 2);
        assert!(bot.is_bot);
        assert_eq!(bot.bot_level, Some(BotLevel::Difficult));
        assert_eq!(bot.name, "Difficult Bot 3");
        assert_eq!(bot.color, PLAYER_COLORS[2]);
    }

    #[test]
    fn test_not_my_turn_yields_no_action() {
        let game = new_game(2);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(decide(game.state(), "bot2", BotLevel::Amateur, &mut rng).is_none());
    }

    #[test]
    fn test_setup_places_settlement_then_road() {
        let mut game = new_game(2);
        let mut rng = StdRng::seed_from_u64(0);

        let first = decide(game.state(), "bot1", BotLevel::Amateur, &mut rng).unwrap();
        assert!(matches!(first.kind, ActionKind::PlaceSettlement { .. }));
        game.process_action(&first).unwrap();

        let second = decide(game.state(), "bot1", BotLevel::Amateur, &mut rng).unwrap();
        assert!(matches!(second.kind, ActionKind::PlaceRoad { .. }));
        game.process_action(&second).unwrap();

        let third = decide(game.state(), "bot1", BotLevel::Amateur, &mut rng).unwrap();
        assert_eq!(third.kind, ActionKind::EndTurn);
    }

    #[test]
    fn test_rolls_when_dice_not_thrown() {
        let game = new_game(2);
        let mut state = game.snapshot();
        state.phase = GamePhase::Playing;
        let game = Game::from_state(state);

        let mut rng = StdRng::seed_from_u64(0);
        let action = decide(game.state(), "bot1", BotLevel::Intermediate, &mut rng).unwrap();
        assert_eq!(action.kind, ActionKind::RollDice);
    }

    #[test]
    fn test_moves_robber_after_seven() {
        let game = new_game(2);
        let mut state = game.snapshot();
        state.phase = GamePhase::Playing;
        state.dice_roll = Some(crate::game::DiceRoll {
            value: 7,
            player_id: "bot1".to_string(),
        });
        state.robber_pending = true;
        let game = Game::from_state(state);

        let mut rng = StdRng::seed_from_u64(0);
        let action = decide(game.state(), "bot1", BotLevel::Amateur, &mut rng).unwrap();
        match action.kind {
            ActionKind::MoveRobber { tile_id, target_player_id } => {
                assert_ne!(Some(tile_id), game.state().board.robber_tile().map(|t| t.id));
                assert_eq!(target_player_id, None);
            }
            other => panic!("expected robber move, got {:?}", other),
        }
    }

    #[test]
    fn test_difficult_targets_exposed_opponent() {
        let game = new_game(3);
        let mut state = game.snapshot();
        state.phase = GamePhase::Playing;
        state.dice_roll = Some(crate::game::DiceRoll {
            value: 7,
            player_id: "bot1".to_string(),
        });
        state.robber_pending = true;

        // Give bot2 a city next to a productive tile and the fattest hand
        let tile = state
            .board
            .tiles
            .iter()
            .find(|t| !t.has_robber)
            .unwrap()
            .coordinate;
        let corner = state.board.adjacent_intersections(&tile)[0].coordinate;
        state.board.place_settlement(&corner, "bot2".to_string());
        state.board.upgrade_to_city(&corner);
        state.players[1].resources = ResourceHand::with_amounts(3, 3, 0, 0, 0);
        let expected_tile = state.board.tile_at(&tile).unwrap().id;
        let game = Game::from_state(state);

        let mut rng = StdRng::seed_from_u64(0);
        let action = decide(game.state(), "bot1", BotLevel::Difficult, &mut rng).unwrap();
        match action.kind {
            ActionKind::MoveRobber { tile_id, target_player_id } => {
                assert_eq!(tile_id, expected_tile);
                assert_eq!(target_player_id, Some("bot2".to_string()));
            }
            other => panic!("expected robber move, got {:?}", other),
        }
    }

    #[test]
    fn test_difficult_plays_knight_before_building() {
        let game = new_game(2);
        let mut state = game.snapshot();
        state.phase = GamePhase::Playing;
        state.dice_roll = Some(crate::game::DiceRoll {
            value: 5,
            player_id: "bot1".to_string(),
        });
        state.players[0].development_cards.push(DevelopmentCard::Knight);
        let game = Game::from_state(state);

        let mut rng = StdRng::seed_from_u64(0);
        let action = decide(game.state(), "bot1", BotLevel::Difficult, &mut rng).unwrap();
        assert!(matches!(
            action.kind,
            ActionKind::PlayDevelopmentCard(CardPlay::Knight { .. })
        ));
    }

    #[test]
    fn test_monopoly_picks_scarcest_resource() {
        let mut player = create_bot("b1".to_string(), BotLevel::Difficult, 0);
        player.resources = ResourceHand::with_amounts(2, 1, 1, 0, 0);
        // wheat and ore tie at 0; enumeration order picks wheat
        assert_eq!(scarcest_resource(&player), Resource::Wheat);

        player.resources = ResourceHand::new();
        assert_eq!(scarcest_resource(&player), Resource::Wood);
    }

    #[test]
    fn test_amateur_never_buys_or_upgrades() {
        let game = new_game(2);
        let mut state = game.snapshot();
        state.phase = GamePhase::Playing;
        state.dice_roll = Some(crate::game::DiceRoll {
            value: 5,
            player_id: "bot1".to_string(),
        });
        // Plenty of everything, but nowhere legal to build: every
        // intersection is taken and bot1 has no road network
        state.players[0].resources = ResourceHand::with_amounts(9, 9, 9, 9, 9);
        for intersection in &mut state.board.intersections {
            intersection.building = Some(crate::board::Building {
                kind: crate::board::BuildingKind::Settlement,
                owner: "bot2".to_string(),
            });
        }
        let game = Game::from_state(state);

        let mut rng = StdRng::seed_from_u64(0);
        let action = decide(game.state(), "bot1", BotLevel::Amateur, &mut rng).unwrap();
        assert_eq!(action.kind, ActionKind::EndTurn);
    }
}
