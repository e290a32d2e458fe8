//! Game actions and the events they produce.
//!
//! Actions arrive over the wire as `{type, playerId, payload}` with
//! snake_case type names; the payload layout varies per action. The enums
//! here mirror that encoding exactly, so the transport layer deserializes
//! straight into the engine's input type and unknown action types fail at
//! the boundary.

use crate::board::{PlayerId, Resource, TileId};
use crate::hex::HexCoord;
use crate::player::{DevelopmentCard, ResourceHand};
use serde::{Deserialize, Serialize};

/// One player action, the sole input to the rules engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameAction {
    #[serde(rename = "playerId")]
    pub player_id: PlayerId,
    #[serde(flatten)]
    pub kind: ActionKind,
}

/// The nine action kinds and their payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ActionKind {
    /// Roll two dice (once per turn, playing phase only)
    RollDice,

    /// Place a settlement (free during setup)
    PlaceSettlement { coordinate: HexCoord },

    /// Upgrade an owned settlement to a city
    PlaceCity { coordinate: HexCoord },

    /// Place a road between two adjacent intersections
    PlaceRoad { from: HexCoord, to: HexCoord },

    /// Buy one development card from the deck
    BuyDevelopmentCard,

    /// Play a development card from hand
    PlayDevelopmentCard(CardPlay),

    /// Move the robber, optionally robbing a player adjacent to the tile
    MoveRobber {
        #[serde(rename = "tileId")]
        tile_id: TileId,
        #[serde(rename = "targetPlayerId", default, skip_serializing_if = "Option::is_none")]
        target_player_id: Option<PlayerId>,
    },

    /// Trade with another player, or with the bank when no target is named
    Trade {
        give: ResourceHand,
        receive: ResourceHand,
        #[serde(rename = "targetPlayerId", default, skip_serializing_if = "Option::is_none")]
        target_player_id: Option<PlayerId>,
    },

    /// End the turn and advance to the next player
    EndTurn,
}

/// Card-specific payload of a `play_development_card` action.
///
/// Typed per card so an illegal card/payload combination cannot be
/// represented. Victory-point cards are revealed on purchase and have no
/// play action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cardType", content = "data", rename_all = "snake_case")]
pub enum CardPlay {
    Knight {
        #[serde(rename = "tileId")]
        tile_id: TileId,
        #[serde(rename = "targetPlayerId", default, skip_serializing_if = "Option::is_none")]
        target_player_id: Option<PlayerId>,
    },
    RoadBuilding,
    YearOfPlenty { resources: ResourceHand },
    Monopoly {
        #[serde(rename = "resourceType")]
        resource_type: Resource,
    },
}

impl CardPlay {
    /// The card this play consumes from the hand
    pub fn card(&self) -> DevelopmentCard {
        match self {
            CardPlay::Knight { .. } => DevelopmentCard::Knight,
            CardPlay::RoadBuilding => DevelopmentCard::RoadBuilding,
            CardPlay::YearOfPlenty { .. } => DevelopmentCard::YearOfPlenty,
            CardPlay::Monopoly { .. } => DevelopmentCard::Monopoly,
        }
    }
}

/// Events emitted by successful actions, for transport broadcast and logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    DiceRolled {
        player: PlayerId,
        total: u8,
    },

    ResourcesDistributed {
        distributions: Vec<(PlayerId, Resource, u32)>,
    },

    SettlementBuilt {
        player: PlayerId,
        coordinate: HexCoord,
    },

    CityBuilt {
        player: PlayerId,
        coordinate: HexCoord,
    },

    RoadBuilt {
        player: PlayerId,
        from: HexCoord,
        to: HexCoord,
    },

    DevelopmentCardPurchased {
        player: PlayerId,
    },

    DevelopmentCardPlayed {
        player: PlayerId,
        card: DevelopmentCard,
    },

    RobberMoved {
        player: PlayerId,
        tile: TileId,
    },

    ResourceStolen {
        thief: PlayerId,
        victim: PlayerId,
        /// Hidden from other players by the transport layer
        resource: Option<Resource>,
    },

    CardsDiscarded {
        player: PlayerId,
        count: u32,
    },

    TradeCompleted {
        player: PlayerId,
        target: Option<PlayerId>,
    },

    LongestRoadChanged {
        previous: Option<PlayerId>,
        current: Option<PlayerId>,
        length: u32,
    },

    LargestArmyChanged {
        previous: Option<PlayerId>,
        current: Option<PlayerId>,
        knights: u32,
    },

    SetupCompleted,

    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
    },

    GameWon {
        player: PlayerId,
        victory_points: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_dice_wire_shape() {
        let json = r#"{"type": "roll_dice", "playerId": "p1"}"#;
        let action: GameAction = serde_json::from_str(json).unwrap();
        assert_eq!(action.player_id, "p1");
        assert_eq!(action.kind, ActionKind::RollDice);
    }

    #[test]
    fn test_place_settlement_wire_shape() {
        let json = r#"{
            "type": "place_settlement",
            "playerId": "p2",
            "payload": {"coordinate": {"q": 1, "r": -1}}
        }"#;
        let action: GameAction = serde_json::from_str(json).unwrap();
        assert_eq!(
            action.kind,
            ActionKind::PlaceSettlement {
                coordinate: HexCoord::new(1, -1)
            }
        );
    }

    #[test]
    fn test_move_robber_wire_shape() {
        let json = r#"{
            "type": "move_robber",
            "playerId": "p1",
            "payload": {"tileId": 7, "targetPlayerId": "p3"}
        }"#;
        let action: GameAction = serde_json::from_str(json).unwrap();
        assert_eq!(
            action.kind,
            ActionKind::MoveRobber {
                tile_id: 7,
                target_player_id: Some("p3".to_string())
            }
        );

        // Target is optional
        let json = r#"{"type": "move_robber", "playerId": "p1", "payload": {"tileId": 2}}"#;
        let action: GameAction = serde_json::from_str(json).unwrap();
        assert_eq!(
            action.kind,
            ActionKind::MoveRobber {
                tile_id: 2,
                target_player_id: None
            }
        );
    }

    #[test]
    fn test_trade_accepts_partial_resource_maps() {
        let json = r#"{
            "type": "trade",
            "playerId": "p1",
            "payload": {"give": {"wood": 4}, "receive": {"ore": 1}}
        }"#;
        let action: GameAction = serde_json::from_str(json).unwrap();
        match action.kind {
            ActionKind::Trade { give, receive, target_player_id } => {
                assert_eq!(give, ResourceHand::with_amounts(4, 0, 0, 0, 0));
                assert_eq!(receive, ResourceHand::with_amounts(0, 0, 0, 0, 1));
                assert_eq!(target_player_id, None);
            }
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[test]
    fn test_play_card_wire_shape() {
        let json = r#"{
            "type": "play_development_card",
            "playerId": "p1",
            "payload": {"cardType": "knight", "data": {"tileId": 3, "targetPlayerId": "p2"}}
        }"#;
        let action: GameAction = serde_json::from_str(json).unwrap();
        assert_eq!(
            action.kind,
            ActionKind::PlayDevelopmentCard(CardPlay::Knight {
                tile_id: 3,
                target_player_id: Some("p2".to_string())
            })
        );

        let json = r#"{
            "type": "play_development_card",
            "playerId": "p1",
            "payload": {"cardType": "monopoly", "data": {"resourceType": "wheat"}}
        }"#;
        let action: GameAction = serde_json::from_str(json).unwrap();
        assert_eq!(
            action.kind,
            ActionKind::PlayDevelopmentCard(CardPlay::Monopoly {
                resource_type: Resource::Wheat
            })
        );
    }

    #[test]
    fn test_unknown_action_type_is_rejected() {
        let json = r#"{"type": "fly_to_the_moon", "playerId": "p1"}"#;
        assert!(serde_json::from_str::<GameAction>(json).is_err());
    }

    #[test]
    fn test_action_round_trip() {
        let action = GameAction {
            player_id: "p1".to_string(),
            kind: ActionKind::PlaceRoad {
                from: HexCoord::new(0, 0),
                to: HexCoord::new(1, 0),
            },
        };
        let json = serde_json::to_string(&action).unwrap();
        let back: GameAction = serde_json::from_str(&json).unwrap();
        assert_eq!(action, back);
    }
}
