use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{SimError, SimResult};
use super::{Direction, DirectionSet, IntersectionId, Point, TurnGeometry, WaypointPath};

/// (row, column) of a node in a grid layout.
pub type GridPos = (usize, usize);

/// A node of the road graph with its precomputed turn paths.
///
/// The turn table is indexed `[entry][exit]` by direction ordinal and always
/// holds a path for exactly the pairs whose sides are both connected and
/// distinct.
#[derive(Debug, Clone)]
pub struct Intersection {
    id: IntersectionId,
    grid_position: Option<GridPos>,
    center: Point,
    geometry: TurnGeometry,
    neighbors: [Option<IntersectionId>; 4],
    turn_paths: [[Option<WaypointPath>; 4]; 4],
    u_turn_paths: [Option<WaypointPath>; 4],
}

impl Intersection {
    pub fn new(id: IntersectionId, center: Point, geometry: TurnGeometry) -> Self {
        Self {
            id,
            grid_position: None,
            center,
            geometry,
            neighbors: [None; 4],
            turn_paths: Default::default(),
            u_turn_paths: Default::default(),
        }
    }

    pub fn with_grid_position(mut self, position: GridPos) -> Self {
        self.grid_position = Some(position);
        self
    }

    pub fn id(&self) -> IntersectionId {
        self.id
    }

    pub fn grid_position(&self) -> Option<GridPos> {
        self.grid_position
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn geometry(&self) -> &TurnGeometry {
        &self.geometry
    }

    /// Registers `neighbor` on the given side and rebuilds every turn path.
    ///
    /// Only this side of the link is recorded; the caller registers
    /// `direction.reverse()` on the neighbor.
    pub fn connect(&mut self, direction: Direction, neighbor: IntersectionId) -> SimResult<()> {
        self.neighbors[direction.index()] = Some(neighbor);
        self.recompute_turn_paths()
    }

    pub fn neighbor_in_direction(&self, direction: Direction) -> Option<IntersectionId> {
        self.neighbors[direction.index()]
    }

    pub fn connected_directions(&self) -> DirectionSet {
        Direction::ALL
            .into_iter()
            .filter(|d| self.neighbors[d.index()].is_some())
            .collect()
    }

    pub fn degree(&self) -> usize {
        self.connected_directions().len()
    }

    /// Connected sides a vehicle arriving from `entry` may leave through.
    pub fn valid_exits(&self, entry: Direction) -> DirectionSet {
        let mut exits = self.connected_directions();
        exits.remove(entry);
        exits
    }

    /// Uniformly picks one of [`valid_exits`](Self::valid_exits).
    ///
    /// An empty choice is reported as [`SimError::DeadEnd`] so the caller can
    /// apply its dead-end policy.
    pub fn random_exit<R: Rng + ?Sized>(&self, entry: Direction, rng: &mut R) -> SimResult<Direction> {
        let exits: Vec<Direction> = self.valid_exits(entry).iter().collect();
        exits.choose(rng).copied().ok_or(SimError::DeadEnd {
            intersection: self.id,
            entry,
        })
    }

    pub fn turn_path(&self, entry: Direction, exit: Direction) -> SimResult<&WaypointPath> {
        self.turn_paths[entry.index()][exit.index()]
            .as_ref()
            .ok_or(SimError::InvalidTurnRequest {
                intersection: self.id,
                entry,
                exit,
            })
    }

    /// Path back out through `side` for a vehicle that arrived from it.
    pub fn u_turn_path(&self, side: Direction) -> SimResult<&WaypointPath> {
        self.u_turn_paths[side.index()]
            .as_ref()
            .ok_or(SimError::InvalidTurnRequest {
                intersection: self.id,
                entry: side,
                exit: side,
            })
    }

    pub fn in_anchor(&self, side: Direction) -> Point {
        self.geometry.in_anchor(self.center, side)
    }

    pub fn out_anchor(&self, side: Direction) -> Point {
        self.geometry.out_anchor(self.center, side)
    }

    fn recompute_turn_paths(&mut self) -> SimResult<()> {
        let mut turn_paths: [[Option<WaypointPath>; 4]; 4] = Default::default();
        let mut u_turn_paths: [Option<WaypointPath>; 4] = Default::default();
        let connected = self.connected_directions();

        for entry in connected.iter() {
            for exit in connected.iter() {
                if let Some(points) = self.geometry.turn_points(self.center, entry, exit) {
                    turn_paths[entry.index()][exit.index()] = Some(WaypointPath::new(points)?);
                }
            }
            let points = self.geometry.u_turn_points(self.center, entry);
            u_turn_paths[entry.index()] = Some(WaypointPath::new(points)?);
        }

        self.turn_paths = turn_paths;
        self.u_turn_paths = u_turn_paths;
        Ok(())
    }
}
