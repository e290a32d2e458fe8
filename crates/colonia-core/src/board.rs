//! Game board representation: tiles, intersections, roads and ports.
//!
//! This module contains:
//! - Resource and terrain types
//! - The three fixed board shapes and their generation
//! - Intersection deduplication and port assignment
//! - Board query and mutation methods used by the rules engine
//!
//! The board scales with the player count: 2-4 players get the classic
//! 19-hex layout, 5-6 players a 24-hex layout and 7-8 players a 37-hex
//! layout. Terrain and number tokens are shuffled independently and
//! assigned positionally.

use crate::hex::HexCoord;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Player identifier. Players are referenced by a durable string id
/// (the server issues UUIDs) rather than a seat index, so persisted
/// states and actions stay valid across reloads.
pub type PlayerId = String;

/// Tile identifier, sequential in generation order
pub type TileId = u32;

/// Intersection identifier, sequential in generation order
pub type IntersectionId = u32;

/// Road identifier, sequential in placement order
pub type RoadId = u32;

/// Resource types produced by terrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
}

impl Resource {
    /// All resource types, in canonical enumeration order
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Brick,
        Resource::Sheep,
        Resource::Wheat,
        Resource::Ore,
    ];
}

/// Terrain types on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Forest,
    Hills,
    Pasture,
    Fields,
    Mountains,
    Desert,
}

impl Terrain {
    /// The resource this terrain produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Terrain::Forest => Some(Resource::Wood),
            Terrain::Hills => Some(Resource::Brick),
            Terrain::Pasture => Some(Resource::Sheep),
            Terrain::Fields => Some(Resource::Wheat),
            Terrain::Mountains => Some(Resource::Ore),
            Terrain::Desert => None,
        }
    }
}

/// What kind of building sits on an intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    Settlement,
    City,
}

impl BuildingKind {
    /// Resource units produced per matching dice roll
    pub fn resource_multiplier(&self) -> u32 {
        match self {
            BuildingKind::Settlement => 1,
            BuildingKind::City => 2,
        }
    }
}

/// A building on an intersection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub kind: BuildingKind,
    pub owner: PlayerId,
}

/// Trade-ratio modifier attached to a boundary intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Port {
    /// 3:1 trade for any resource
    Generic,
    /// 2:1 trade for a specific resource
    Specific(Resource),
}

impl Port {
    /// The bank exchange rate granted by this port
    pub fn rate(&self) -> u32 {
        match self {
            Port::Generic => 3,
            Port::Specific(_) => 2,
        }
    }
}

/// A single hex tile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub id: TileId,
    pub coordinate: HexCoord,
    pub terrain: Terrain,
    pub resource: Option<Resource>,
    /// Dice number that triggers production (2-12, never 7; None on desert)
    pub number_token: Option<u8>,
    pub has_robber: bool,
}

/// An intersection where settlements and cities are built
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intersection {
    pub id: IntersectionId,
    pub coordinate: HexCoord,
    pub building: Option<Building>,
    pub port: Option<Port>,
}

/// A road between two adjacent intersections
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Road {
    pub id: RoadId,
    pub from: HexCoord,
    pub to: HexCoord,
    pub owner: PlayerId,
}

/// The fixed 18-token number set. Shapes with more than 18 non-desert
/// tiles cycle through it (index mod 18) so every productive tile gets
/// a token.
pub const NUMBER_TOKENS: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

/// Ports placed on every board: four generic 3:1 and one 2:1 per resource
const PORT_SET: [Port; 9] = [
    Port::Generic,
    Port::Generic,
    Port::Generic,
    Port::Generic,
    Port::Specific(Resource::Wood),
    Port::Specific(Resource::Brick),
    Port::Specific(Resource::Sheep),
    Port::Specific(Resource::Wheat),
    Port::Specific(Resource::Ore),
];

/// One board shape: row layout plus terrain composition.
///
/// Each row entry is (r, q_start, q_end) inclusive. Terrain counts sum
/// exactly to the number of coordinates and contain exactly one desert,
/// so every board has one robber start position.
struct BoardLayout {
    rows: &'static [(i32, i32, i32)],
    terrain_counts: &'static [(Terrain, usize)],
}

/// 19 hexes (3-4-5-4-3), 2-4 players
static SMALL: BoardLayout = BoardLayout {
    rows: &[(-2, -1, 1), (-1, -1, 2), (0, -2, 2), (1, -2, 1), (2, -1, 1)],
    terrain_counts: &[
        (Terrain::Forest, 4),
        (Terrain::Hills, 3),
        (Terrain::Pasture, 4),
        (Terrain::Fields, 4),
        (Terrain::Mountains, 3),
        (Terrain::Desert, 1),
    ],
};

/// 24 hexes (4-5-6-5-4), 5-6 players
static MEDIUM: BoardLayout = BoardLayout {
    rows: &[(-2, -2, 1), (-1, -2, 2), (0, -3, 2), (1, -2, 2), (2, -1, 2)],
    terrain_counts: &[
        (Terrain::Forest, 5),
        (Terrain::Hills, 4),
        (Terrain::Pasture, 5),
        (Terrain::Fields, 5),
        (Terrain::Mountains, 4),
        (Terrain::Desert, 1),
    ],
};

/// 37 hexes (4-5-6-7-6-5-4), 7-8 players
static LARGE: BoardLayout = BoardLayout {
    rows: &[
        (-3, -2, 1),
        (-2, -2, 2),
        (-1, -3, 2),
        (0, -3, 3),
        (1, -2, 3),
        (2, -2, 2),
        (3, -1, 2),
    ],
    terrain_counts: &[
        (Terrain::Forest, 8),
        (Terrain::Hills, 6),
        (Terrain::Pasture, 8),
        (Terrain::Fields, 8),
        (Terrain::Mountains, 6),
        (Terrain::Desert, 1),
    ],
};

/// The complete game board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub tiles: Vec<Tile>,
    pub intersections: Vec<Intersection>,
    pub roads: Vec<Road>,
}

impl Board {
    /// Generate a randomized board sized for the given player count
    pub fn generate(player_count: usize) -> Self {
        let mut rng = rand::thread_rng();
        Self::generate_with_rng(player_count, &mut rng)
    }

    /// Generate with a provided RNG for deterministic boards in tests
    pub fn generate_with_rng<R: Rng>(player_count: usize, rng: &mut R) -> Self {
        let layout = Self::layout_for(player_count);
        let coordinates = Self::row_coordinates(layout.rows);

        // Expand and shuffle the terrain list
        let mut terrains: Vec<Terrain> = layout
            .terrain_counts
            .iter()
            .flat_map(|&(terrain, count)| std::iter::repeat(terrain).take(count))
            .collect();
        terrains.shuffle(rng);

        // Shuffle tokens once; cycle when the shape outsizes the token set
        let mut tokens = NUMBER_TOKENS.to_vec();
        tokens.shuffle(rng);

        let mut tiles = Vec::with_capacity(coordinates.len());
        let mut token_index = 0;
        for (i, coordinate) in coordinates.into_iter().enumerate() {
            let terrain = terrains[i];
            let number_token = if terrain == Terrain::Desert {
                None
            } else {
                let token = tokens[token_index % tokens.len()];
                token_index += 1;
                Some(token)
            };
            tiles.push(Tile {
                id: i as TileId,
                coordinate,
                terrain,
                resource: terrain.resource(),
                number_token,
                has_robber: terrain == Terrain::Desert,
            });
        }

        // Deduplicate the 6 corners of every tile, preserving generation
        // order. This order is the "board order" bots scan in.
        let mut intersections: Vec<Intersection> = Vec::new();
        let mut seen: HashSet<HexCoord> = HashSet::new();
        for tile in &tiles {
            for corner in tile.coordinate.corners() {
                if seen.insert(corner) {
                    intersections.push(Intersection {
                        id: intersections.len() as IntersectionId,
                        coordinate: corner,
                        building: None,
                        port: None,
                    });
                }
            }
        }

        let mut board = Self {
            tiles,
            intersections,
            roads: Vec::new(),
        };
        board.assign_ports(rng);
        board
    }

    fn layout_for(player_count: usize) -> &'static BoardLayout {
        if player_count >= 7 {
            &LARGE
        } else if player_count >= 5 {
            &MEDIUM
        } else {
            &SMALL
        }
    }

    fn row_coordinates(rows: &[(i32, i32, i32)]) -> Vec<HexCoord> {
        let mut coordinates = Vec::new();
        for &(r, q_start, q_end) in rows {
            for q in q_start..=q_end {
                coordinates.push(HexCoord::new(q, r));
            }
        }
        coordinates
    }

    /// Assign the 9-port set to shuffled boundary intersections.
    ///
    /// Boundary means touching at most 3 tiles; interior intersections of
    /// this coordinate model touch more.
    fn assign_ports<R: Rng>(&mut self, rng: &mut R) {
        let tile_coords: HashSet<HexCoord> = self.tiles.iter().map(|t| t.coordinate).collect();

        let mut boundary: Vec<usize> = self
            .intersections
            .iter()
            .enumerate()
            .filter(|(_, i)| {
                let touching = i
                    .coordinate
                    .touching_tiles()
                    .iter()
                    .filter(|c| tile_coords.contains(*c))
                    .count();
                touching <= 3
            })
            .map(|(idx, _)| idx)
            .collect();
        boundary.shuffle(rng);

        let mut ports = PORT_SET.to_vec();
        ports.shuffle(rng);

        for (idx, port) in boundary.into_iter().zip(ports) {
            self.intersections[idx].port = Some(port);
        }
    }

    // ==================== Query Methods ====================

    /// Get a tile by id
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.id == id)
    }

    /// Get a tile by coordinate
    pub fn tile_at(&self, coordinate: &HexCoord) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.coordinate == *coordinate)
    }

    /// Get an intersection by coordinate
    pub fn intersection_at(&self, coordinate: &HexCoord) -> Option<&Intersection> {
        self.intersections.iter().find(|i| i.coordinate == *coordinate)
    }

    /// Get a mutable intersection by coordinate
    pub fn intersection_at_mut(&mut self, coordinate: &HexCoord) -> Option<&mut Intersection> {
        self.intersections.iter_mut().find(|i| i.coordinate == *coordinate)
    }

    /// Intersections at the corners of a tile, in board order
    pub fn adjacent_intersections(&self, tile_coordinate: &HexCoord) -> Vec<&Intersection> {
        tile_coordinate
            .corners()
            .iter()
            .filter_map(|c| self.intersection_at(c))
            .collect()
    }

    /// Tiles whose corner set contains the given intersection
    pub fn adjacent_tiles(&self, intersection_coordinate: &HexCoord) -> Vec<&Tile> {
        intersection_coordinate
            .touching_tiles()
            .iter()
            .filter_map(|c| self.tile_at(c))
            .collect()
    }

    /// The tile currently holding the robber
    pub fn robber_tile(&self) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.has_robber)
    }

    /// Whether a road already connects the unordered pair (from, to)
    pub fn has_road_between(&self, from: &HexCoord, to: &HexCoord) -> bool {
        self.roads.iter().any(|r| {
            (r.from == *from && r.to == *to) || (r.from == *to && r.to == *from)
        })
    }

    /// Ports the player has access to through their buildings
    pub fn player_ports(&self, player: &str) -> Vec<Port> {
        self.intersections
            .iter()
            .filter(|i| {
                i.port.is_some()
                    && i.building
                        .as_ref()
                        .is_some_and(|b| b.owner == player)
            })
            .filter_map(|i| i.port)
            .collect()
    }

    // ==================== Mutation Methods ====================

    /// Place a settlement (assumes validation already done)
    pub fn place_settlement(&mut self, coordinate: &HexCoord, owner: PlayerId) {
        if let Some(intersection) = self.intersection_at_mut(coordinate) {
            intersection.building = Some(Building {
                kind: BuildingKind::Settlement,
                owner,
            });
        }
    }

    /// Upgrade an existing settlement to a city
    pub fn upgrade_to_city(&mut self, coordinate: &HexCoord) {
        if let Some(intersection) = self.intersection_at_mut(coordinate) {
            if let Some(building) = intersection.building.as_mut() {
                building.kind = BuildingKind::City;
            }
        }
    }

    /// Append a road (assumes validation already done)
    pub fn add_road(&mut self, from: HexCoord, to: HexCoord, owner: PlayerId) -> RoadId {
        let id = self.roads.len() as RoadId;
        self.roads.push(Road { id, from, to, owner });
        id
    }

    /// Move the robber onto the given tile, clearing it everywhere else
    pub fn place_robber(&mut self, tile_id: TileId) {
        for tile in &mut self.tiles {
            tile.has_robber = tile.id == tile_id;
        }
    }
}
