use grid_traffic::simulation::{sample_arc, Direction, Point, Sweep, TurnGeometry, TurnKind, Vec2};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

const EPS: f32 = 1e-4;

fn assert_close(a: Point, b: Point) {
    assert!((a - b).norm() < EPS, "expected {:?} to be within {} of {:?}", a, EPS, b);
}

/// Signed angle from `a` to `b`, positive counter-clockwise.
fn signed_angle(a: Vec2, b: Vec2) -> f32 {
    let cross = a.x * b.y - a.y * b.x;
    cross.atan2(a.dot(&b))
}

fn perpendicular_pairs() -> Vec<(Direction, Direction)> {
    Direction::ALL
        .into_iter()
        .flat_map(|a| Direction::ALL.into_iter().map(move |b| (a, b)))
        .filter(|(a, b)| a != b && *b != a.reverse())
        .collect()
}

#[test]
fn reverse_is_an_involution() {
    for d in Direction::ALL {
        assert_eq!(d.reverse().reverse(), d);
        assert_ne!(d.reverse(), d);
    }
    assert_eq!(Direction::Left.reverse(), Direction::Right);
    assert_eq!(Direction::Up.reverse(), Direction::Down);
}

#[test]
fn straight_down_to_up_lands_on_up_out_anchor() {
    let geometry = TurnGeometry::with_lane_radii(10.0, 2.0, 5);
    let center = Point::new(10.0, -20.0);

    let points = geometry.turn_points(center, Direction::Down, Direction::Up).unwrap();

    assert_eq!(points.len(), 1);
    assert_close(points[0], Point::new(12.5, -14.0));
}

#[test]
fn straight_paths_are_single_exit_anchors() {
    let geometry = TurnGeometry::default();
    let center = Point::new(-44.0, 37.0);

    for entry in Direction::ALL {
        let exit = entry.reverse();
        let points = geometry.turn_points(center, entry, exit).unwrap();
        assert_eq!(points, vec![geometry.out_anchor(center, exit)]);
    }
}

#[test]
fn anchors_follow_right_hand_traffic() {
    let geometry = TurnGeometry::default();
    let c = Point::origin();

    assert_close(geometry.in_anchor(c, Direction::Down), Point::new(2.5, -6.0));
    assert_close(geometry.out_anchor(c, Direction::Down), Point::new(-2.5, -6.0));
    assert_close(geometry.in_anchor(c, Direction::Left), Point::new(-6.0, -2.5));
    assert_close(geometry.out_anchor(c, Direction::Left), Point::new(-6.0, 2.5));
    assert_close(geometry.in_anchor(c, Direction::Right), Point::new(6.0, 2.5));
    assert_close(geometry.out_anchor(c, Direction::Right), Point::new(6.0, -2.5));
    assert_close(geometry.in_anchor(c, Direction::Up), Point::new(-2.5, 6.0));
    assert_close(geometry.out_anchor(c, Direction::Up), Point::new(2.5, 6.0));
}

#[test]
fn every_turn_ends_on_the_exit_anchor() {
    let geometry = TurnGeometry::default();
    let center = Point::new(44.0, -81.0);

    for entry in Direction::ALL {
        for exit in Direction::ALL {
            if entry == exit {
                assert!(geometry.turn_points(center, entry, exit).is_none());
                continue;
            }
            let points = geometry.turn_points(center, entry, exit).unwrap();
            assert!(!points.is_empty());
            assert_close(*points.last().unwrap(), geometry.out_anchor(center, exit));
        }
    }
}

#[test]
fn turn_classification() {
    assert_eq!(TurnKind::classify(Direction::Down, Direction::Right), Some(TurnKind::Right));
    assert_eq!(TurnKind::classify(Direction::Right, Direction::Up), Some(TurnKind::Right));
    assert_eq!(TurnKind::classify(Direction::Up, Direction::Left), Some(TurnKind::Right));
    assert_eq!(TurnKind::classify(Direction::Left, Direction::Down), Some(TurnKind::Right));
    assert_eq!(TurnKind::classify(Direction::Down, Direction::Left), Some(TurnKind::Left));
    assert_eq!(TurnKind::classify(Direction::Left, Direction::Up), Some(TurnKind::Left));
    assert_eq!(TurnKind::classify(Direction::Down, Direction::Up), Some(TurnKind::Straight));
    assert_eq!(TurnKind::classify(Direction::Up, Direction::Up), None);
}

#[test]
fn arcs_have_n_points_on_their_radius() {
    for samples in [1, 5, 8] {
        let geometry = TurnGeometry::with_lane_radii(10.0, 2.0, samples);
        let center = Point::new(3.0, 7.0);

        for (entry, exit) in perpendicular_pairs() {
            let points = geometry.turn_points(center, entry, exit).unwrap();
            let radius = match TurnKind::classify(entry, exit).unwrap() {
                TurnKind::Right => geometry.right_radius,
                TurnKind::Left => geometry.left_radius,
                TurnKind::Straight => unreachable!(),
            };
            let corner = geometry.corner(center, entry, exit);

            assert_eq!(points.len(), samples, "{:?} -> {:?}", entry, exit);
            for &p in &points {
                assert!(((p - corner).norm() - radius).abs() < EPS);
            }
        }
    }
}

#[test]
fn arcs_sweep_monotonically_through_a_quarter_turn() {
    let geometry = TurnGeometry::default();
    let center = Point::origin();
    let n = geometry.arc_samples;
    let step = FRAC_PI_2 / n as f32;

    for (entry, exit) in perpendicular_pairs() {
        let kind = TurnKind::classify(entry, exit).unwrap();
        let sign = if kind == TurnKind::Right { -1.0 } else { 1.0 };
        let corner = geometry.corner(center, entry, exit);
        let points = geometry.turn_points(center, entry, exit).unwrap();

        // The entry anchor is the unsampled start of the arc
        let mut previous = geometry.in_anchor(center, entry) - corner;
        let mut total = 0.0;
        for &p in &points {
            let current = p - corner;
            let delta = signed_angle(previous, current);
            assert!((delta - sign * step).abs() < EPS, "{:?} -> {:?}: step {}", entry, exit, delta);
            total += delta;
            previous = current;
        }
        assert!((total.abs() - FRAC_PI_2).abs() < EPS);
    }
}

#[test]
fn left_radius_is_wider_than_right_radius() {
    let geometry = TurnGeometry::default();
    assert!((geometry.right_radius - 3.5).abs() < EPS);
    assert!((geometry.left_radius - 8.5).abs() < EPS);
    assert!(geometry.left_radius > geometry.right_radius);
}

#[test]
fn sample_arc_skips_the_start_angle() {
    let points = sample_arc(Point::origin(), 1.0, 0.0, Sweep::CounterClockwise, FRAC_PI_2, 2);

    assert_eq!(points.len(), 2);
    assert_close(points[0], Point::new(FRAC_PI_4.cos(), FRAC_PI_4.sin()));
    assert_close(points[1], Point::new(0.0, 1.0));

    let clockwise = sample_arc(Point::new(1.0, 1.0), 2.0, PI, Sweep::Clockwise, FRAC_PI_2, 1);
    assert_close(clockwise[0], Point::new(1.0, 3.0));
}

#[test]
fn u_turn_returns_through_the_arrival_side() {
    let geometry = TurnGeometry::default();
    let center = Point::new(44.0, 0.0);

    for side in Direction::ALL {
        let points = geometry.u_turn_points(center, side);
        let pivot = center + side.offset() * geometry.anchor_distance();

        assert_eq!(points.len(), geometry.arc_samples);
        assert_close(*points.last().unwrap(), geometry.out_anchor(center, side));
        for &p in &points {
            assert!(((p - pivot).norm() - geometry.lane_offset()).abs() < EPS);
        }
    }
}
