//! Lane-level turn geometry for a four-way intersection.
//!
//! Every intersection exposes eight anchors, an *in* and an *out* anchor per
//! side. Vehicles keep to the right: the anchor for a heading `h` sits at
//! `center + anchor_distance * side + lane_offset * right_of(h)`. Turns are
//! sampled arcs around a corner of the intersection box.

use std::f32::consts::{FRAC_PI_2, PI};
use std::ops::Index;
use std::sync::Arc;

use crate::config::GeometryConfig;
use crate::error::{SimError, SimResult};
use super::{Direction, Point, Vec2};

/// Ordered, immutable, non-empty list of ground-plane waypoints.
///
/// Cloning shares the underlying buffer, so one cached path can be followed
/// by any number of vehicles at once.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointPath(Arc<[Point]>);

impl WaypointPath {
    pub fn new(points: Vec<Point>) -> SimResult<Self> {
        if points.is_empty() {
            return Err(SimError::EmptyPath);
        }
        Ok(Self(points.into()))
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    // Never true for a constructed path, kept for the usual len/is_empty pair.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Point> {
        self.0.get(index).copied()
    }

    pub fn first(&self) -> Point {
        self.0[0]
    }

    pub fn last(&self) -> Point {
        self.0[self.0.len() - 1]
    }

    /// True when both handles point at the same cached buffer.
    pub fn shares_storage_with(&self, other: &WaypointPath) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Index<usize> for WaypointPath {
    type Output = Point;

    fn index(&self, index: usize) -> &Point {
        &self.0[index]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    Straight,
    Right,
    Left,
}

impl TurnKind {
    /// `None` when entry and exit are the same side.
    pub fn classify(entry: Direction, exit: Direction) -> Option<TurnKind> {
        if entry == exit {
            return None;
        }
        if exit == entry.reverse() {
            return Some(TurnKind::Straight);
        }
        let heading_in = entry.inbound_heading();
        let heading_out = exit.outbound_heading();
        let cross = heading_in.x * heading_out.y - heading_in.y * heading_out.x;
        if cross < 0.0 {
            Some(TurnKind::Right)
        } else {
            Some(TurnKind::Left)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweep {
    Clockwise,
    CounterClockwise,
}

impl Sweep {
    fn sign(self) -> f32 {
        match self {
            Sweep::Clockwise => -1.0,
            Sweep::CounterClockwise => 1.0,
        }
    }
}

/// Samples `samples` points on a circular arc around `pivot`.
///
/// The arc starts at `start_angle` and covers `total_angle` radians in the
/// given sense with equal steps. The start point itself is never emitted; the
/// last sample sits exactly `total_angle` away from the start.
pub fn sample_arc(
    pivot: Point,
    radius: f32,
    start_angle: f32,
    sweep: Sweep,
    total_angle: f32,
    samples: usize,
) -> Vec<Point> {
    let samples = samples.max(1);
    let step = total_angle / samples as f32 * sweep.sign();
    (1..=samples)
        .map(|i| {
            let theta = start_angle + step * i as f32;
            Point::new(pivot.x + theta.cos() * radius, pivot.y + theta.sin() * radius)
        })
        .collect()
}

fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

fn right_of(heading: Vec2) -> Vec2 {
    Vec2::new(heading.y, -heading.x)
}

/// Geometric constants shared by every intersection of a network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnGeometry {
    /// Combined width of both lanes.
    pub side_length: f32,
    /// Sidewalk width around the intersection box.
    pub buffer: f32,
    pub right_radius: f32,
    pub left_radius: f32,
    pub arc_samples: usize,
}

impl Default for TurnGeometry {
    fn default() -> Self {
        Self::with_lane_radii(10.0, 2.0, 5)
    }
}

impl TurnGeometry {
    /// Geometry whose turn radii connect the lane anchors exactly.
    pub fn with_lane_radii(side_length: f32, buffer: f32, arc_samples: usize) -> Self {
        let lane_offset = side_length / 4.0;
        let anchor_distance = side_length / 2.0 + buffer / 2.0;
        Self {
            side_length,
            buffer,
            right_radius: anchor_distance - lane_offset,
            left_radius: anchor_distance + lane_offset,
            arc_samples,
        }
    }

    /// Radii left out of the config fall back to the lane-consistent values.
    pub fn from_config(config: &GeometryConfig) -> Self {
        let lane = Self::with_lane_radii(config.side_length, config.buffer, config.arc_samples);
        let geometry = Self {
            right_radius: config.right_radius.unwrap_or(lane.right_radius),
            left_radius: config.left_radius.unwrap_or(lane.left_radius),
            ..lane
        };

        if (geometry.right_radius - lane.right_radius).abs() > 1e-3
            || (geometry.left_radius - lane.left_radius).abs() > 1e-3
        {
            log::warn!(
                "Turn radii ({:.2}, {:.2}) do not meet the lane anchors; expected ({:.2}, {:.2})",
                geometry.right_radius,
                geometry.left_radius,
                lane.right_radius,
                lane.left_radius
            );
        }

        geometry
    }

    /// Distance of a lane centre from the median (half the width of one lane).
    pub fn lane_offset(&self) -> f32 {
        self.side_length / 4.0
    }

    /// Distance of the anchors from the center along the road axis.
    pub fn anchor_distance(&self) -> f32 {
        self.side_length / 2.0 + self.buffer / 2.0
    }

    /// Where a vehicle arriving from `side` enters the intersection.
    pub fn in_anchor(&self, center: Point, side: Direction) -> Point {
        center + side.offset() * self.anchor_distance() + right_of(side.inbound_heading()) * self.lane_offset()
    }

    /// Where a vehicle leaving towards `side` exits the intersection.
    pub fn out_anchor(&self, center: Point, side: Direction) -> Point {
        center + side.offset() * self.anchor_distance() + right_of(side.outbound_heading()) * self.lane_offset()
    }

    /// Corner of the intersection box shared by two perpendicular sides.
    pub fn corner(&self, center: Point, a: Direction, b: Direction) -> Point {
        center + (a.offset() + b.offset()) * self.anchor_distance()
    }

    /// Waypoints through the intersection, `None` when `entry == exit`.
    pub fn turn_points(&self, center: Point, entry: Direction, exit: Direction) -> Option<Vec<Point>> {
        let kind = TurnKind::classify(entry, exit)?;
        let points = match kind {
            TurnKind::Straight => vec![self.out_anchor(center, exit)],
            TurnKind::Right => self.corner_arc(center, entry, exit, self.right_radius, Sweep::Clockwise),
            TurnKind::Left => self.corner_arc(center, entry, exit, self.left_radius, Sweep::CounterClockwise),
        };
        Some(points)
    }

    /// Semicircle bringing a vehicle that arrived from `side` back out of it.
    pub fn u_turn_points(&self, center: Point, side: Direction) -> Vec<Point> {
        let pivot = center + side.offset() * self.anchor_distance();
        let start_angle = angle_of(right_of(side.inbound_heading()));
        sample_arc(
            pivot,
            self.lane_offset(),
            start_angle,
            Sweep::CounterClockwise,
            PI,
            self.arc_samples,
        )
    }

    fn corner_arc(&self, center: Point, entry: Direction, exit: Direction, radius: f32, sweep: Sweep) -> Vec<Point> {
        // The arc runs from the entry lane, which lies opposite the exit side
        // of the corner, to the exit lane, opposite the entry side.
        let pivot = self.corner(center, entry, exit);
        let start_angle = angle_of(-exit.offset());
        sample_arc(pivot, radius, start_angle, sweep, FRAC_PI_2, self.arc_samples)
    }
}
