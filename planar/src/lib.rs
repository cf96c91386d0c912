//! planar contains the few pieces of 2d math the creech simulation needs:
//! points (which double as displacement vectors), polar directions and
//! polygons that can tell whether a point lies inside of them.
//!
//! all types are small Copy values, every operation returns a new value.

use core::f64::consts::{PI, TAU};
use core::fmt;
use core::ops::{Add, Mul, Neg, Sub};

#[cfg(feature = "serde1")]
use serde as sd;

mod region;
pub use region::{LineSegment, Region, RegionError};

#[cfg(test)]
mod tests;

/// absolute tolerance for every float comparison in here.
/// if you compare geometry somewhere else, use approx_eq so boundary cases
/// get classified the same way everywhere.
pub const EPSILON: f64 = 1e-5;

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// normalises an angle into (-pi, pi]
pub fn rad_norm(theta: f64) -> f64 {
    if theta > -PI && theta <= PI {
        return theta;
    }
    let theta = theta.rem_euclid(TAU);
    if theta > PI { theta - TAU } else { theta }
}

/// a location, or the displacement between two of them
#[derive(Copy, Clone, PartialEq, Default, Debug)]
#[cfg_attr(feature = "serde1", derive(sd::Serialize, sd::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0., y: 0. };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn approx_eq(self, q: Point) -> bool {
        approx_eq(self.x, q.x) && approx_eq(self.y, q.y)
    }

    pub fn add(self, q: Point) -> Point {
        Point::new(self.x + q.x, self.y + q.y)
    }

    pub fn sub(self, q: Point) -> Point {
        Point::new(self.x - q.x, self.y - q.y)
    }

    pub fn scale(self, r: f64) -> Point {
        Point::new(self.x * r, self.y * r)
    }

    pub fn length(self) -> f64 {
        ((self.x * self.x) + (self.y * self.y)).sqrt()
    }

    /// turns the input into a vector that has length 1.
    /// the zero vector has no direction, you get NaNs back.
    pub fn unit(self) -> Point {
        self.scale(1. / self.length())
    }

    pub fn to_polar(self) -> Polar {
        Polar {
            r: self.length(),
            theta: self.y.atan2(self.x),
        }
    }

    /// direction and distance from self to q
    pub fn polar_to(self, q: Point) -> Polar {
        q.sub(self).to_polar()
    }

    /// prefer this over distance_to for comparisons, no sqrt needed
    pub fn distance_to_squared(self, q: Point) -> f64 {
        let dx = self.x - q.x;
        let dy = self.y - q.y;
        (dx * dx) + (dy * dy)
    }

    pub fn distance_to(self, q: Point) -> f64 {
        self.distance_to_squared(q).sqrt()
    }

    /// strictly closer than r
    pub fn near(self, q: Point, r: f64) -> bool {
        self.distance_to_squared(q) < r * r
    }

    pub fn move_by(self, step: Polar) -> Point {
        self.add(step.to_point())
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, q: Point) -> Point {
        Point::add(self, q)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, q: Point) -> Point {
        Point::sub(self, q)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, r: f64) -> Point {
        self.scale(r)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.5},{:.5}]", self.x, self.y)
    }
}

/// a direction with a magnitude.
/// theta is kept in (-pi, pi] by everything that rotates.
#[derive(Copy, Clone, PartialEq, Default, Debug)]
#[cfg_attr(feature = "serde1", derive(sd::Serialize, sd::Deserialize))]
pub struct Polar {
    pub r: f64,
    pub theta: f64,
}

pub const EAST: Polar = Polar { r: 1., theta: 0. };
pub const NORTH: Polar = Polar {
    r: 1.,
    theta: PI / 2.,
};
pub const WEST: Polar = Polar { r: 1., theta: PI };
pub const SOUTH: Polar = Polar {
    r: 1.,
    theta: -PI / 2.,
};

impl Polar {
    pub const fn new(r: f64, theta: f64) -> Self {
        Self { r, theta }
    }

    pub fn turn(self, dtheta: f64) -> Polar {
        Polar {
            r: self.r,
            theta: self.theta + dtheta,
        }
        .normalise()
    }

    pub fn turn_right(self) -> Polar {
        self.turn(-PI / 2.)
    }

    pub fn turn_left(self) -> Polar {
        self.turn(PI / 2.)
    }

    pub fn normalise(self) -> Polar {
        Polar {
            r: self.r,
            theta: rad_norm(self.theta),
        }
    }

    pub fn scale(self, r: f64) -> Polar {
        Polar {
            r: self.r * r,
            theta: self.theta,
        }
    }

    pub fn to_point(self) -> Point {
        let (sin, cos) = self.theta.sin_cos();
        Point::new(self.r * cos, self.r * sin)
    }
}

impl fmt::Display for Polar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5},{:.5})", self.r, self.theta)
    }
}

#[test]
fn turning_stays_normalised() {
    let mut p = NORTH;
    for _ in 0..100 {
        p = p.turn(PI / 8.);
        assert!(p.theta > -PI && p.theta <= PI, "{}", p);
    }
    // 100 * pi/8 = 12.5 pi, plus the initial pi/2 is a full 13 pi, so west.
    // might have landed on either side of the cut, hence the cosine
    approx::assert_abs_diff_eq!(p.theta.cos(), -1., epsilon = 1e-9);
    assert_eq!(WEST.turn(0.).theta, PI);
    assert_eq!(EAST.turn(-PI).theta, PI);
}

#[test]
fn quarter_turns() {
    approx::assert_abs_diff_eq!(NORTH.turn_right().theta, EAST.theta);
    approx::assert_abs_diff_eq!(NORTH.turn_left().theta, WEST.theta);
    approx::assert_abs_diff_eq!(EAST.turn_right().theta, SOUTH.theta);
    approx::assert_abs_diff_eq!(SOUTH.turn_right().theta, WEST.theta, epsilon = 1e-12);
}

#[test]
fn distances() {
    let p = Point::new(1., 1.);
    let q = Point::new(4., 5.);
    assert_eq!(p.distance_to_squared(q), 25.);
    assert_eq!(p.distance_to(q), 5.);
    assert!(p.near(q, 5.1));
    assert!(!p.near(q, 5.));
    approx::assert_abs_diff_eq!(q.sub(p).unit().length(), 1.);
    assert!(Point::ORIGIN.unit().x.is_nan());
}

#[test]
fn polar_conversion() {
    let p = Point::new(0., 2.).to_polar();
    approx::assert_abs_diff_eq!(p.r, 2.);
    approx::assert_abs_diff_eq!(p.theta, PI / 2.);
    let back = NORTH.scale(3.).to_point();
    assert!(back.approx_eq(Point::new(0., 3.)));
    let moved = Point::new(1., 1.).move_by(WEST.scale(2.));
    assert!(moved.approx_eq(Point::new(-1., 1.)));
    assert!((Point::new(1., 2.) - Point::new(1., 2.) * 2.).approx_eq(-Point::new(1., 2.)));
}
