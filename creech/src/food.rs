use crate::entity::EntityId;
use crate::renderer::{self, DrawCommand, Drawable};
use planar::Point;

#[derive(Clone, PartialEq, Debug)]
pub struct Food {
    id: EntityId,
    pos: Point,
    value: f64,
    density: f64,
}

impl Food {
    pub fn new(id: EntityId, pos: Point, value: f64, density: f64) -> Self {
        Self {
            id,
            pos,
            value,
            density,
        }
    }
    pub fn id(&self) -> EntityId {
        self.id
    }
    pub fn pos(&self) -> Point {
        self.pos
    }
    pub fn value(&self) -> f64 {
        self.value
    }
    pub fn size(&self) -> f64 {
        self.value * self.density
    }
    /// eaten up, gets removed at the end of the tick
    pub fn is_exhausted(&self) -> bool {
        self.value <= 0.
    }

    /// takes up to amount, returns how much was actually taken
    pub fn consume(&mut self, amount: f64) -> f64 {
        let taken = amount.min(self.value).max(0.);
        self.value -= taken;
        taken
    }

    fn glyph(&self) -> u8 {
        if self.value < 3. {
            b'.'
        } else if self.value < 6. {
            b'o'
        } else if self.value < 9. {
            b'O'
        } else {
            b'*'
        }
    }
}

/// a regular polygon around center, first corner repeated at the end
fn closed_polygon(sides: usize, center: Point, r: f64) -> Vec<Point> {
    let dtheta = std::f64::consts::TAU / sides as f64;
    (0..=sides)
        .map(|i| {
            let (sin, cos) = (dtheta * i as f64).sin_cos();
            Point::new(center.x + r * cos, center.y + r * sin)
        })
        .collect()
}

impl Drawable for Food {
    fn screen(&self) -> (i64, i64, u8) {
        (self.pos.x as i64, self.pos.y as i64, self.glyph())
    }
    fn web(&self) -> Vec<DrawCommand> {
        vec![renderer::poly(closed_polygon(6, self.pos, self.size() / 2.))]
    }
}

#[test]
fn glyph_tiers() {
    let cases = [(0.5, b'.'), (2.99, b'.'), (3., b'o'), (5.9, b'o'), (6., b'O'), (8.5, b'O'), (9., b'*'), (12., b'*')];
    for (value, glyph) in cases {
        let f = Food::new(EntityId(0), Point::new(-3.5, 2.7), value, 0.4);
        assert_eq!(f.screen(), (-3, 2, glyph), "value {}", value);
    }
}

#[test]
fn consume_is_bounded() {
    let mut f = Food::new(EntityId(0), Point::ORIGIN, 2.5, 0.4);
    approx::assert_abs_diff_eq!(f.size(), 1.);
    assert_eq!(f.consume(1.), 1.);
    assert_eq!(f.consume(-1.), 0.);
    assert!(!f.is_exhausted());
    assert_eq!(f.consume(4.), 1.5);
    assert_eq!(f.value(), 0.);
    assert!(f.is_exhausted());
    assert_eq!(f.consume(1.), 0.);
}

#[test]
fn hexagon() {
    let f = Food::new(EntityId(0), Point::new(1., 1.), 5., 0.4);
    let cmds = f.web();
    assert_eq!(cmds.len(), 1);
    let pts = &cmds[0].points;
    assert_eq!(pts.len(), 7);
    assert!(pts[0].approx_eq(pts[6]));
    for p in pts {
        approx::assert_abs_diff_eq!(p.distance_to(f.pos()), 1., epsilon = 1e-9);
    }
}
