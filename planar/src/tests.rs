use crate::{Point, Polar, Region, approx_eq};
use core::f64::consts::PI;
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

fn unit_square() -> Region {
    Region::new(vec![
        Point::new(0., 0.),
        Point::new(1., 0.),
        Point::new(1., 1.),
        Point::new(0., 1.),
    ])
    .unwrap()
}

// integer inputs keep the coordinates finite and in a sane range
fn milli(x: i32, y: i32) -> Point {
    Point::new(x as f64 / 1000., y as f64 / 1000.)
}

#[quickcheck]
/// going to polar and back lands on the same point
fn polar_round_trip(x: i32, y: i32) -> TestResult {
    let p = milli(x, y);
    if p == Point::ORIGIN {
        return TestResult::discard();
    }
    let back = p.to_polar().to_point();
    let tolerance = 1e-9 * p.length().max(1.);
    TestResult::from_bool((back.x - p.x).abs() < tolerance && (back.y - p.y).abs() < tolerance)
}

#[quickcheck]
/// no matter how often or how far you turn, the angle stays in (-pi, pi]
fn turning_normalises(theta: f64, turns: Vec<f64>) -> TestResult {
    // anything beyond this is not a turn anyone makes, and sums near f64::MAX overflow
    let sane = |t: &f64| t.is_finite() && t.abs() < 1e6;
    if !sane(&theta) || !turns.iter().all(sane) {
        return TestResult::discard();
    }
    let mut p = Polar::new(1., theta);
    for t in turns {
        p = p.turn(t);
        if !(p.theta > -PI && p.theta <= PI) {
            return TestResult::failed();
        }
    }
    TestResult::passed()
}

#[quickcheck]
/// turning changes direction, never magnitude
fn turning_keeps_length(x: i32, y: i32, turn: i16) -> bool {
    let p = milli(x, y);
    let turned = p.to_polar().turn(turn as f64 / 100.).to_point();
    approx_eq(p.length(), turned.length())
}

#[quickcheck]
fn distance_matches_difference(a: (i32, i32), b: (i32, i32)) -> bool {
    let p = milli(a.0, a.1);
    let q = milli(b.0, b.1);
    p.distance_to_squared(q) == q.distance_to_squared(p)
        && approx_eq(p.distance_to(q), q.sub(p).length())
}

#[quickcheck]
/// every point of the closed unit square is inside it, boundary included
fn unit_square_contains_its_points(x: u16, y: u16) -> bool {
    let p = Point::new(x as f64 / u16::MAX as f64, y as f64 / u16::MAX as f64);
    unit_square().contains(p)
}

#[quickcheck]
/// and nothing that is clearly outside of it
fn unit_square_excludes_outside(x: i32, y: i32) -> TestResult {
    let p = milli(x, y);
    let margin = 1e-3;
    let inside_box = p.x > -margin && p.x < 1. + margin && p.y > -margin && p.y < 1. + margin;
    if inside_box {
        return TestResult::discard();
    }
    TestResult::from_bool(!unit_square().contains(p))
}

#[quickcheck]
/// moving both the region and the point changes nothing
fn translation_keeps_containment(x: u16, y: u16, dx: i16, dy: i16) -> bool {
    // stay off the boundary, where the shifted floats may round either way
    let p = Point::new(
        0.01 + (x as f64 / u16::MAX as f64) * 0.98,
        0.01 + (y as f64 / u16::MAX as f64) * 0.98,
    );
    let v = Point::new(dx as f64 / 100., dy as f64 / 100.);
    unit_square().translate(v).contains(p.add(v))
}
