use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

use crate::error::{SimError, SimResult};
use super::{Direction, Intersection, IntersectionId, Point, RoadNetwork, Vec2, WaypointPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub usize);

/// What a vehicle does when the only road out of an intersection is the one
/// it arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadEndPolicy {
    /// Turn around and leave through the arrival side.
    #[default]
    UTurn,
    /// Stop at the last waypoint and stay there.
    Park,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrivingParams {
    pub speed: f32,
    pub arrival_tolerance: f32,
    pub ground_clearance: f32,
    pub dead_end_policy: DeadEndPolicy,
}

impl Default for DrivingParams {
    fn default() -> Self {
        Self {
            speed: 1.0,
            arrival_tolerance: 0.1,
            ground_clearance: 0.5,
            dead_end_policy: DeadEndPolicy::UTurn,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Traveling,
    Parked,
}

/// Explicit starting state of a vehicle.
#[derive(Debug, Clone)]
pub struct AgentSeed {
    pub current: IntersectionId,
    pub entry: Direction,
    pub next: IntersectionId,
    pub exit: Direction,
    pub position: Point,
    pub heading: f32,
    pub path: WaypointPath,
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickEvent {
    Moved,
    /// Landed exactly on the target instead of stepping past it.
    Snapped,
    /// Reached a waypoint and now targets the next one on the same path.
    WaypointReached { target: Point },
    /// Finished a path and picked the next leg at `intersection`.
    PathChanged {
        intersection: IntersectionId,
        entry: Direction,
        exit: Direction,
        target: Point,
    },
    Parked,
}

/// Pose handed to the presentation layer after a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentPose {
    pub id: AgentId,
    /// World position, y up.
    pub position: Point3<f32>,
    pub yaw: f32,
}

enum Leg {
    Drive { exit: Direction, path: WaypointPath },
    Park,
}

impl Leg {
    /// A parked vehicle faces back the way it came.
    fn exit(&self, entry: Direction) -> Direction {
        match self {
            Leg::Drive { exit, .. } => *exit,
            Leg::Park => entry,
        }
    }
}

/// A vehicle following cached waypoint paths across the road network.
#[derive(Debug, Clone)]
pub struct VehicleAgent {
    id: AgentId,
    state: AgentState,
    current: IntersectionId,
    entry: Direction,
    next: IntersectionId,
    exit: Direction,
    path: WaypointPath,
    waypoint_index: usize,
    position: Point,
    heading: f32,
    last_yaw_delta: f32,
    velocity: Vec2,
    params: DrivingParams,
    rng: StdRng,
}

impl VehicleAgent {
    pub fn initialize(id: AgentId, seed: AgentSeed, params: DrivingParams, rng: StdRng) -> Self {
        let mut agent = Self {
            id,
            state: AgentState::Traveling,
            current: seed.current,
            entry: seed.entry,
            next: seed.next,
            exit: seed.exit,
            path: seed.path,
            waypoint_index: 0,
            position: seed.position,
            heading: wrap_angle(seed.heading),
            last_yaw_delta: 0.0,
            velocity: Vec2::zeros(),
            params,
            rng,
        };
        agent.steer_towards_target();
        agent
    }

    /// Places a vehicle on the in-lane of `entry` at `intersection`, facing
    /// into it, with a randomly chosen first turn.
    ///
    /// The `entry` side must carry a road.
    pub fn spawn(
        id: AgentId,
        network: &RoadNetwork,
        intersection: IntersectionId,
        entry: Direction,
        params: DrivingParams,
        mut rng: StdRng,
    ) -> SimResult<Self> {
        let node = network.get(intersection)?;
        if node.degree() == 0 {
            return Err(SimError::IsolatedIntersection { intersection });
        }
        if node.neighbor_in_direction(entry).is_none() {
            return Err(SimError::UnconnectedEntry { intersection, entry });
        }

        let position = node.in_anchor(entry);
        let heading_vector = entry.inbound_heading();
        let heading = heading_vector.y.atan2(heading_vector.x);

        let leg = plan_leg(node, entry, params.dead_end_policy, &mut rng)?;
        let exit = leg.exit(entry);
        let next = next_along(node, entry, exit)?;
        let parked = matches!(leg, Leg::Park);
        let path = match leg {
            Leg::Drive { path, .. } => path,
            // Parked on the stop line; the path only keeps the cursor valid
            Leg::Park => WaypointPath::new(vec![position])?,
        };

        let seed = AgentSeed {
            current: intersection,
            entry,
            next,
            exit,
            position,
            heading,
            path,
        };
        let mut agent = Self::initialize(id, seed, params, rng);
        if parked {
            agent.park();
        }
        Ok(agent)
    }

    /// Advances the vehicle by `elapsed` time units.
    pub fn tick(&mut self, network: &RoadNetwork, elapsed: f32) -> SimResult<TickEvent> {
        if self.state == AgentState::Parked {
            return Ok(TickEvent::Parked);
        }

        let target = self.target();
        let distance = (target - self.position).norm();

        if distance < self.params.arrival_tolerance {
            let next_index = self.waypoint_index + 1;
            let event = if next_index >= self.path.len() {
                self.enter_next_intersection(network)?
            } else {
                self.waypoint_index = next_index;
                TickEvent::WaypointReached { target: self.target() }
            };
            if self.state == AgentState::Traveling {
                self.steer_towards_target();
            }
            return Ok(event);
        }

        if distance < self.params.speed * elapsed {
            self.position = target;
            return Ok(TickEvent::Snapped);
        }

        self.position += self.velocity * elapsed;
        Ok(TickEvent::Moved)
    }

    /// Plans the leg through the next intersection and only then commits it,
    /// so a failed lookup leaves the agent untouched.
    fn enter_next_intersection(&mut self, network: &RoadNetwork) -> SimResult<TickEvent> {
        let node = network.get(self.next)?;
        let entry = self.exit.reverse();
        let leg = plan_leg(node, entry, self.params.dead_end_policy, &mut self.rng)?;
        let exit = leg.exit(entry);
        let next = next_along(node, entry, exit)?;

        self.current = node.id();
        self.entry = entry;
        self.exit = exit;
        self.next = next;

        match leg {
            Leg::Drive { path, .. } => {
                self.path = path;
                self.waypoint_index = 0;
                log::debug!(
                    "Vehicle {} at intersection {}: {} -> {} towards {}",
                    self.id.0,
                    self.current,
                    self.entry,
                    self.exit,
                    self.next
                );
                Ok(TickEvent::PathChanged {
                    intersection: self.current,
                    entry: self.entry,
                    exit: self.exit,
                    target: self.target(),
                })
            }
            Leg::Park => {
                self.waypoint_index = self.path.len() - 1;
                self.park();
                Ok(TickEvent::Parked)
            }
        }
    }

    fn park(&mut self) {
        log::warn!("Vehicle {} parked at dead end {}", self.id.0, self.current);
        self.state = AgentState::Parked;
        self.velocity = Vec2::zeros();
    }

    /// Turns towards the current target and resets the velocity to match.
    fn steer_towards_target(&mut self) {
        let to_target = self.target() - self.position;
        if to_target.norm() > f32::EPSILON {
            let desired = to_target.y.atan2(to_target.x);
            let delta = wrap_angle(desired - self.heading);
            self.heading = wrap_angle(self.heading + delta);
            self.last_yaw_delta = delta;
        } else {
            self.last_yaw_delta = 0.0;
        }
        self.velocity = Vec2::new(self.heading.cos(), self.heading.sin()) * self.params.speed;
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn is_parked(&self) -> bool {
        self.state == AgentState::Parked
    }

    pub fn current_intersection(&self) -> IntersectionId {
        self.current
    }

    pub fn entry_direction(&self) -> Direction {
        self.entry
    }

    pub fn next_intersection(&self) -> IntersectionId {
        self.next
    }

    pub fn exit_direction(&self) -> Direction {
        self.exit
    }

    pub fn active_path(&self) -> &WaypointPath {
        &self.path
    }

    pub fn waypoint_index(&self) -> usize {
        self.waypoint_index
    }

    pub fn target(&self) -> Point {
        self.path[self.waypoint_index]
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    /// Signed heading change applied by the most recent steer, in radians.
    pub fn last_yaw_delta(&self) -> f32 {
        self.last_yaw_delta
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn speed(&self) -> f32 {
        self.params.speed
    }

    pub fn params(&self) -> &DrivingParams {
        &self.params
    }

    pub fn pose(&self) -> AgentPose {
        AgentPose {
            id: self.id,
            position: Point3::new(self.position.x, self.params.ground_clearance, self.position.y),
            yaw: self.heading,
        }
    }
}

fn plan_leg<R: Rng + ?Sized>(
    node: &Intersection,
    entry: Direction,
    policy: DeadEndPolicy,
    rng: &mut R,
) -> SimResult<Leg> {
    match node.random_exit(entry, rng) {
        Ok(exit) => Ok(Leg::Drive {
            exit,
            path: node.turn_path(entry, exit)?.clone(),
        }),
        Err(SimError::DeadEnd { .. }) if node.neighbor_in_direction(entry).is_some() => match policy {
            DeadEndPolicy::UTurn => {
                log::warn!("Dead end at intersection {} from {}, turning around", node.id(), entry);
                Ok(Leg::Drive {
                    exit: entry,
                    path: node.u_turn_path(entry)?.clone(),
                })
            }
            DeadEndPolicy::Park => Ok(Leg::Park),
        },
        Err(SimError::DeadEnd { .. }) => Err(SimError::IsolatedIntersection {
            intersection: node.id(),
        }),
        Err(e) => Err(e),
    }
}

fn next_along(node: &Intersection, entry: Direction, exit: Direction) -> SimResult<IntersectionId> {
    node.neighbor_in_direction(exit).ok_or(SimError::InvalidTurnRequest {
        intersection: node.id(),
        entry,
        exit,
    })
}

/// Wraps an angle into (-π, π].
pub fn wrap_angle(angle: f32) -> f32 {
    let mut wrapped = angle % TAU;
    if wrapped > PI {
        wrapped -= TAU;
    } else if wrapped <= -PI {
        wrapped += TAU;
    }
    wrapped
}
