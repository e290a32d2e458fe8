//! Placement legality for settlements, cities and roads.
//!
//! Validation is side-effect free and idempotent: the same board and
//! arguments always yield the same verdict. The engine calls these before
//! any mutation; bots call them to enumerate feasible moves.

use crate::board::{Board, BuildingKind};
use crate::hex::HexCoord;
use thiserror::Error;

/// Why a placement was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementViolation {
    #[error("no intersection exists at this coordinate")]
    UnknownIntersection,

    #[error("the intersection is already occupied")]
    Occupied,

    #[error("too close to another settlement (at least one empty intersection required)")]
    TooClose,

    #[error("not connected to your roads or buildings")]
    NotConnected,

    #[error("the intersections are not adjacent")]
    NotAdjacent,

    #[error("a road already exists here")]
    RoadExists,

    #[error("no settlement at this location")]
    NoBuilding,

    #[error("this settlement belongs to another player")]
    NotOwned,

    #[error("there is already a city here")]
    AlreadyCity,
}

/// Check whether `player` may place a settlement at `coordinate`.
///
/// During setup the road-connectivity requirement is waived; the distance
/// rule applies in every phase and regardless of building owner.
pub fn settlement(
    coordinate: &HexCoord,
    player: &str,
    board: &Board,
    is_setup: bool,
) -> Result<(), PlacementViolation> {
    let intersection = board
        .intersection_at(coordinate)
        .ok_or(PlacementViolation::UnknownIntersection)?;

    if intersection.building.is_some() {
        return Err(PlacementViolation::Occupied);
    }

    // Distance rule: no building anywhere within hex distance 1
    let too_close = board.intersections.iter().any(|i| {
        i.building.is_some() && coordinate.distance_to(&i.coordinate) <= 1
    });
    if too_close {
        return Err(PlacementViolation::TooClose);
    }

    if !is_setup {
        let connected = board
            .roads
            .iter()
            .any(|r| r.owner == player && (r.from == *coordinate || r.to == *coordinate));
        if !connected {
            return Err(PlacementViolation::NotConnected);
        }
    }

    Ok(())
}

/// Check whether `player` may upgrade the settlement at `coordinate` to a city
pub fn city_upgrade(
    coordinate: &HexCoord,
    player: &str,
    board: &Board,
) -> Result<(), PlacementViolation> {
    let intersection = board
        .intersection_at(coordinate)
        .ok_or(PlacementViolation::UnknownIntersection)?;

    let building = intersection
        .building
        .as_ref()
        .ok_or(PlacementViolation::NoBuilding)?;

    if building.owner != player {
        return Err(PlacementViolation::NotOwned);
    }
    if building.kind == BuildingKind::City {
        return Err(PlacementViolation::AlreadyCity);
    }

    Ok(())
}

/// Check whether `player` may place a road between `from` and `to`.
///
/// During setup the network-connectivity requirement is waived.
pub fn road(
    from: &HexCoord,
    to: &HexCoord,
    player: &str,
    board: &Board,
    is_setup: bool,
) -> Result<(), PlacementViolation> {
    if board.intersection_at(from).is_none() || board.intersection_at(to).is_none() {
        return Err(PlacementViolation::UnknownIntersection);
    }

    if from.distance_to(to) != 1 {
        return Err(PlacementViolation::NotAdjacent);
    }

    if board.has_road_between(from, to) {
        return Err(PlacementViolation::RoadExists);
    }

    if !is_setup {
        let road_connected = board.roads.iter().any(|r| {
            r.owner == player
                && (r.from == *from || r.to == *from || r.from == *to || r.to == *to)
        });
        let building_connected = board.intersections.iter().any(|i| {
            i.building.as_ref().is_some_and(|b| b.owner == player)
                && (i.coordinate == *from || i.coordinate == *to)
        });
        if !road_connected && !building_connected {
            return Err(PlacementViolation::NotConnected);
        }
    }

    Ok(())
}
