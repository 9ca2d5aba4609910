use nalgebra::{Vector2, Point2};
use std::fmt;
use std::time::{Duration, Instant};

pub mod direction;
pub mod geometry;
pub mod intersection;
pub mod network;
pub mod agent;
pub mod traffic;

pub use direction::*;
pub use geometry::*;
pub use intersection::*;
pub use network::*;
pub use agent::*;
pub use traffic::*;

/// Ground-plane vector; `y` holds the world z axis.
pub type Vec2 = Vector2<f32>;
pub type Point = Point2<f32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntersectionId(pub usize);

impl fmt::Display for IntersectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Emitted whenever a vehicle switches to a new waypoint path, for hosts that
/// visualise targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathChange {
    pub agent: AgentId,
    pub intersection: IntersectionId,
    pub entry: Direction,
    pub exit: Direction,
    pub target: Point,
}

impl PathChange {
    pub fn from_event(agent: AgentId, event: &TickEvent) -> Option<Self> {
        match *event {
            TickEvent::PathChanged { intersection, entry, exit, target } => Some(PathChange {
                agent,
                intersection,
                entry,
                exit,
                target,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationState {
    pub agents: Vec<VehicleAgent>,
    pub time: f32,
    pub dt: f32,
    pub ticks: u64,
    pub total_spawned: u32,
}

impl SimulationState {
    pub fn new(dt: f32) -> Self {
        Self {
            agents: Vec::new(),
            time: 0.0,
            dt,
            ticks: 0,
            total_spawned: 0,
        }
    }

    pub fn add_agent(&mut self, agent: VehicleAgent) {
        self.agents.push(agent);
        self.total_spawned += 1;
    }

    pub fn remove_agent(&mut self, id: AgentId) -> Option<VehicleAgent> {
        let pos = self.agents.iter().position(|a| a.id() == id)?;
        Some(self.agents.remove(pos))
    }

    pub fn get_agent(&self, id: AgentId) -> Option<&VehicleAgent> {
        self.agents.iter().find(|a| a.id() == id)
    }

    pub fn active_agents(&self) -> usize {
        self.agents.len()
    }

    pub fn parked_agents(&self) -> usize {
        self.agents.iter().filter(|a| a.is_parked()).count()
    }

    /// Position and yaw of every vehicle, in agent order.
    pub fn poses(&self) -> Vec<AgentPose> {
        self.agents.iter().map(VehicleAgent::pose).collect()
    }

    pub(crate) fn advance_clock(&mut self) {
        self.time += self.dt;
        self.ticks += 1;
    }
}

#[derive(Debug, Clone, Default)]
pub struct PerformanceMetrics {
    pub frame_time: Duration,
    pub simulation_time: Duration,
}

#[derive(Debug)]
pub struct PerformanceTracker {
    samples: Vec<PerformanceMetrics>,
    max_samples: usize,
    current_frame_start: Option<Instant>,
    current_sim_start: Option<Instant>,
    last_sim_time: Duration,
}

impl PerformanceTracker {
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: Vec::with_capacity(max_samples),
            max_samples: max_samples.max(1),
            current_frame_start: None,
            current_sim_start: None,
            last_sim_time: Duration::ZERO,
        }
    }

    pub fn start_frame(&mut self) {
        self.current_frame_start = Some(Instant::now());
    }

    pub fn start_simulation(&mut self) {
        self.current_sim_start = Some(Instant::now());
    }

    pub fn end_simulation(&mut self) {
        if let Some(start) = self.current_sim_start.take() {
            self.last_sim_time = start.elapsed();
        }
    }

    pub fn end_frame(&mut self) {
        if let Some(start) = self.current_frame_start.take() {
            let metrics = PerformanceMetrics {
                frame_time: start.elapsed(),
                simulation_time: std::mem::take(&mut self.last_sim_time),
            };

            if self.samples.len() >= self.max_samples {
                self.samples.remove(0);
            }
            self.samples.push(metrics);
        }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn average_frame_time(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }

        let total: Duration = self.samples.iter().map(|s| s.frame_time).sum();
        total / self.samples.len() as u32
    }

    pub fn average_simulation_time(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }

        let total: Duration = self.samples.iter().map(|s| s.simulation_time).sum();
        total / self.samples.len() as u32
    }

    pub fn fps(&self) -> f32 {
        let avg_frame_time = self.average_frame_time();
        if avg_frame_time.is_zero() {
            return 0.0;
        }
        1.0 / avg_frame_time.as_secs_f32()
    }
}
