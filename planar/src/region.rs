use crate::{EPSILON, Point, approx_eq};
use core::fmt;
use thiserror::Error;

#[cfg(feature = "serde1")]
use serde as sd;

/// length of the probe ray used by Region::contains, "infinity" for our purposes.
/// simulated worlds are a few dozen units across.
const RAY_LENGTH: f64 = 1e7;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegionError {
    #[error("a region needs at least one point")]
    Empty,
}

#[derive(Copy, Clone, PartialEq, Debug)]
enum Slope {
    Vertical,
    Gradient { m: f64, c: f64 },
}

/// a segment between two points, with its line equation precomputed.
/// only used as a helper for region calculations.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct LineSegment {
    pub from: Point,
    pub to: Point,
    slope: Slope,
}

impl LineSegment {
    pub fn new(from: Point, to: Point) -> Self {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let slope = if approx_eq(dx, 0.) {
            Slope::Vertical
        } else {
            let m = dy / dx;
            Slope::Gradient {
                m,
                c: from.y - (m * from.x),
            }
        };
        Self { from, to, slope }
    }

    pub fn is_vertical(&self) -> bool {
        self.slope == Slope::Vertical
    }

    /// None for vertical segments, their gradient is undefined
    pub fn gradient_and_intercept(&self) -> Option<(f64, f64)> {
        match self.slope {
            Slope::Vertical => None,
            Slope::Gradient { m, c } => Some((m, c)),
        }
    }

    /// evaluates the segment, extended to a line, at x
    pub fn eval(&self, x: f64) -> Option<f64> {
        self.gradient_and_intercept().map(|(m, c)| (m * x) + c)
    }

    pub fn bounding_rect_contains(&self, p: Point) -> bool {
        let min_x = self.from.x.min(self.to.x);
        let max_x = self.from.x.max(self.to.x);
        let min_y = self.from.y.min(self.to.y);
        let max_y = self.from.y.max(self.to.y);
        min_x - EPSILON <= p.x
            && max_x + EPSILON >= p.x
            && min_y - EPSILON <= p.y
            && max_y + EPSILON >= p.y
    }

    pub fn contains_point(&self, p: Point) -> bool {
        if !self.bounding_rect_contains(p) {
            return false;
        }
        match self.slope {
            Slope::Vertical => approx_eq(p.x, self.from.x),
            Slope::Gradient { m, c } => approx_eq((m * p.x) + c, p.y),
        }
    }

    pub fn contains_segment(&self, other: &LineSegment) -> bool {
        self.contains_point(other.from) && self.contains_point(other.to)
    }

    /// a point both segments share, if there is one.
    /// collinear segments that overlap meet at the start of the overlap.
    pub fn intersection(&self, other: &LineSegment) -> Option<Point> {
        match (self.slope, other.slope) {
            (Slope::Vertical, Slope::Vertical) => {
                if !approx_eq(self.from.x, other.from.x) {
                    return None;
                }
                let (lo, _hi) = overlap(
                    (self.from.y, self.to.y),
                    (other.from.y, other.to.y),
                )?;
                Some(Point::new(self.from.x, lo))
            }
            (Slope::Gradient { .. }, Slope::Vertical) => other.intersection(self),
            (Slope::Vertical, Slope::Gradient { m, c }) => {
                let x = self.from.x;
                let p = Point::new(x, (m * x) + c);
                self.within_both(other, p)
            }
            (Slope::Gradient { m, c }, Slope::Gradient { m: m2, c: c2 }) => {
                if approx_eq(m, m2) {
                    if !approx_eq(c, c2) {
                        // parallel
                        return None;
                    }
                    // co-incident
                    let (lo, _hi) = overlap(
                        (self.from.x, self.to.x),
                        (other.from.x, other.to.x),
                    )?;
                    return Some(Point::new(lo, (m * lo) + c));
                }
                let x = (c2 - c) / (m - m2);
                let p = Point::new(x, (m * x) + c);
                self.within_both(other, p)
            }
        }
    }

    pub fn intersects(&self, other: &LineSegment) -> bool {
        self.intersection(other).is_some()
    }

    fn within_both(&self, other: &LineSegment, p: Point) -> Option<Point> {
        if self.bounding_rect_contains(p) && other.bounding_rect_contains(p) {
            Some(p)
        } else {
            None
        }
    }
}

/// overlap of two 1d ranges, given in any order
fn overlap(a: (f64, f64), b: (f64, f64)) -> Option<(f64, f64)> {
    let lo = a.0.min(a.1).max(b.0.min(b.1));
    let hi = a.0.max(a.1).min(b.0.max(b.1));
    if lo <= hi + EPSILON {
        Some((lo, hi))
    } else {
        None
    }
}

impl fmt::Display for LineSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// a polygon, given by its corners in order.
/// the closing edge from the last point back to the first is implied.
/// self-intersecting polygons are not rejected, but points on their
/// boundaries may be classified either way.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde1", derive(sd::Serialize, sd::Deserialize))]
pub struct Region {
    points: Vec<Point>,
}

impl Region {
    pub fn new(points: Vec<Point>) -> Result<Self, RegionError> {
        if points.is_empty() {
            return Err(RegionError::Empty);
        }
        Ok(Self { points })
    }

    /// for a fixed number of corners, which can't be empty
    pub fn from_corners<const N: usize>(corners: [Point; N]) -> Self {
        const { assert!(N > 0, "a region needs at least one corner") };
        Self {
            points: corners.to_vec(),
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// the corners with the first one repeated at the end
    pub fn closed_points(&self) -> Vec<Point> {
        let mut pts = Vec::with_capacity(self.points.len() + 1);
        pts.extend_from_slice(&self.points);
        pts.push(self.points[0]);
        pts
    }

    pub fn edges(&self) -> impl Iterator<Item = LineSegment> + '_ {
        let first = core::iter::once(&self.points[0]);
        self.points
            .iter()
            .zip(self.points.iter().skip(1).chain(first))
            .map(|(from, to)| LineSegment::new(*from, *to))
    }

    pub fn centroid(&self) -> Point {
        let sum = self
            .points
            .iter()
            .fold(Point::ORIGIN, |acc, p| acc.add(*p));
        sum.scale(1. / self.points.len() as f64)
    }

    pub fn translate(&self, v: Point) -> Region {
        Region {
            points: self.points.iter().map(|p| p.add(v)).collect(),
        }
    }

    /// true if any corner of other lies inside self.
    /// this is only vertex sampling, two regions crossing like a plus sign
    /// do not overlap by this definition.
    pub fn overlaps(&self, other: &Region) -> bool {
        other.closed_points().into_iter().any(|p| self.contains(p))
    }

    /// even-odd ray casting. points on the boundary count as inside.
    pub fn contains(&self, q: Point) -> bool {
        // take a line segment "to infinity"
        let ray = LineSegment::new(q, Point::new(q.x + RAY_LENGTH, q.y));

        let mut crossings = 0;
        for edge in self.edges() {
            if edge.contains_point(q) {
                return true;
            }
            // collinear with the ray, but q is not on the edge.
            // do not count this tangential edge
            if ray.contains_segment(&edge) {
                continue;
            }
            let Some(p) = edge.intersection(&ray) else {
                continue;
            };
            // a ray through a corner touches two edges, only the one
            // leaving upwards gets to count it
            let other_end = if p.approx_eq(edge.from) {
                Some(edge.to)
            } else if p.approx_eq(edge.to) {
                Some(edge.from)
            } else {
                None
            };
            match other_end {
                Some(end) if end.y <= q.y => {}
                _ => crossings += 1,
            }
        }
        crossings % 2 == 1
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.points.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", p)?;
        }
        Ok(())
    }
}

#[cfg(test)]
fn square(pts: [(f64, f64); 4]) -> Region {
    Region::new(pts.iter().map(|&(x, y)| Point::new(x, y)).collect()).unwrap()
}

#[test]
fn segment_intersect_line() {
    let cases = [
        ((0., 0.), (1., 1.), (0., 1.), (1., 0.), Some((0.5, 0.5))),
        // parallel
        ((0., 0.), (1., 1.), (0., 1.), (1., 2.), None),
        // lines cross, segments don't
        ((0., 0.), (1., 1.), (3., 0.), (4., -1.), None),
        // vertical against sloped
        ((2., -1.), (2., 5.), (0., 0.), (4., 2.), Some((2., 1.))),
        ((0., 0.), (4., 2.), (2., -1.), (2., 5.), Some((2., 1.))),
        // two verticals on the same x, overlapping
        ((1., 0.), (1., 2.), (1., 5.), (1., 1.), Some((1., 1.))),
        // two verticals, apart
        ((1., 0.), (1., 2.), (1.5, 0.), (1.5, 2.), None),
        // co-incident, overlapping
        ((0., 0.), (2., 2.), (1., 1.), (3., 3.), Some((1., 1.))),
        // co-incident, disjoint
        ((0., 0.), (1., 0.), (2., 0.), (3., 0.), None),
    ];
    for (from, to, lfrom, lto, expected) in cases {
        let ls = LineSegment::new(Point::new(from.0, from.1), Point::new(to.0, to.1));
        let l = LineSegment::new(Point::new(lfrom.0, lfrom.1), Point::new(lto.0, lto.1));
        let got = ls.intersection(&l);
        match (got, expected) {
            (None, None) => {}
            (Some(p), Some((x, y))) => assert!(p.approx_eq(Point::new(x, y)), "{} and {} at {}", ls, l, p),
            _ => panic!("{} and {}: got {:?} expected {:?}", ls, l, got, expected),
        }
        assert_eq!(ls.intersects(&l), expected.is_some());
    }
}

#[test]
fn vertical_classification() {
    let v = LineSegment::new(Point::new(1., 0.), Point::new(1. + EPSILON / 2., 3.));
    assert!(v.is_vertical());
    assert_eq!(v.gradient_and_intercept(), None);
    assert_eq!(v.eval(1.), None);
    assert!(v.contains_point(Point::new(1., 2.)));
    assert!(!v.contains_point(Point::new(1., 3.5)));

    let s = LineSegment::new(Point::new(0., 1.), Point::new(2., 5.));
    assert_eq!(s.gradient_and_intercept(), Some((2., 1.)));
    assert_eq!(s.eval(3.), Some(7.));
    assert!(s.contains_point(Point::new(1., 3.)));
    assert!(!s.contains_point(Point::new(1., 3.1)));
    // on the line, beyond the segment
    assert!(!s.contains_point(Point::new(3., 7.)));
}

#[test]
fn bounding_rect_contains() {
    let cases = [
        ((0., 0.), (1., 1.), (0.5, 0.5), true),
        ((0., 0.), (1., 1.), (1., 1.), true),
        ((0., 0.), (1., 1.), (2., 2.), false),
        ((0., 0.), (1., 1.), (-0.1, -0.1), false),
        ((0., 1.), (0., 0.), (0., 0.4), true),
    ];
    for (from, to, p, expected) in cases {
        let ls = LineSegment::new(Point::new(from.0, from.1), Point::new(to.0, to.1));
        assert_eq!(ls.bounding_rect_contains(Point::new(p.0, p.1)), expected, "{} {:?}", ls, p);
    }
}

#[test]
fn region_contains() {
    let unit_square = square([(0., 0.), (1., 0.), (1., 1.), (0., 1.)]);
    // corners are not in the usual order, so this is really a bow tie
    // crossing over at (2.5, 2.5)
    let other_square = square([(2., 2.), (2., 3.), (3., 2.), (3., 3.)]);

    let cases = [
        (&unit_square, (-1., 0.), false),
        (&unit_square, (0.3, 0.4), true),
        (&unit_square, (1.3, 0.4), false),
        (&unit_square, (0.3, 1.4), false),
        (&unit_square, (-0.3, 0.4), false),
        (&unit_square, (0.3, -0.4), false),
        // corners included
        (&unit_square, (0., 0.), true),
        (&unit_square, (1., 0.), true),
        (&unit_square, (0., 1.), true),
        (&unit_square, (1., 1.), true),
        // sides included
        (&unit_square, (0., 0.5), true),
        (&unit_square, (1., 0.5), true),
        (&unit_square, (0.5, 0.), true),
        (&unit_square, (0.5, 1.), true),
        (&unit_square, (3., 2.), false),
        (&unit_square, (-3., -2.), false),
        (&unit_square, (3., -2.), false),
        (&unit_square, (-3., 2.), false),
        (&unit_square, (2., 0.), false),
        (&unit_square, (0., 2.), false),
        (&unit_square, (2., 2.), false),
        (&unit_square, (0., -1.), false),
        (&unit_square, (-1., -1.), false),
        (&unit_square, (-1., 1.), false),
        (&unit_square, (0.5, 0.5), true),
        (&unit_square, (0., -0.5), false),
        (&unit_square, (-0.5, 0.), false),
        (&unit_square, (1.5, 1.5), false),
        (&other_square, (0., 0.), false),
        (&other_square, (1., 0.), false),
        (&other_square, (1., 1.), false),
        (&other_square, (0., 1.), false),
        (&other_square, (2., 1.), false),
        (&other_square, (2.1, 2.1), true),
        (&other_square, (2.5, 2.5), true),
    ];
    for (region, (x, y), expected) in cases {
        let p = Point::new(x, y);
        assert_eq!(region.contains(p), expected, "{} in {}", p, region);
    }
}

#[test]
fn ray_through_corners() {
    // the probe ray from the centre leaves through the right corner,
    // touching two edges there
    let diamond = square([(-1., 0.), (0., -1.), (1., 0.), (0., 1.)]);
    assert!(diamond.contains(Point::new(0., 0.)));
    assert!(diamond.contains(Point::new(0.2, 0.1)));
    assert!(!diamond.contains(Point::new(-2., 0.)));
    assert!(!diamond.contains(Point::new(2., 0.)));
    assert!(!diamond.contains(Point::new(0.9, 0.9)));
}

#[test]
fn translate_and_overlap() {
    let unit_square = square([(0., 0.), (1., 0.), (1., 1.), (0., 1.)]);
    let moved = unit_square.translate(Point::new(0.5, 0.5));
    assert_eq!(moved.points()[2], Point::new(1.5, 1.5));
    assert!(unit_square.overlaps(&moved));
    assert!(moved.overlaps(&unit_square));
    let far = unit_square.translate(Point::new(5., 0.));
    assert!(!unit_square.overlaps(&far));
    assert!(unit_square.centroid().approx_eq(Point::new(0.5, 0.5)));
}

#[test]
fn closed_points_and_edges() {
    assert_eq!(Region::new(Vec::new()), Err(RegionError::Empty));
    let tri = Region::new(vec![
        Point::new(0., 0.),
        Point::new(1., 0.),
        Point::new(0., 1.),
    ])
    .unwrap();
    assert_eq!(
        Region::from_corners([Point::new(0., 0.), Point::new(1., 0.), Point::new(0., 1.)]),
        tri
    );
    let closed = tri.closed_points();
    assert_eq!(closed.len(), 4);
    assert_eq!(closed[0], closed[3]);
    let edges = tri.edges().collect::<Vec<_>>();
    assert_eq!(edges.len(), 3);
    assert_eq!(edges[2].from, Point::new(0., 1.));
    assert_eq!(edges[2].to, Point::new(0., 0.));
    assert_eq!(format!("{}", tri), "[0.00000,0.00000],[1.00000,0.00000],[0.00000,1.00000]");

    // a single point is its own degenerate region
    let dot = Region::new(vec![Point::new(1., 1.)]).unwrap();
    assert!(dot.contains(Point::new(1., 1.)));
    assert!(!dot.contains(Point::new(1., 2.)));
}
