use crate::config::c;
use crate::entity::{Entity, EntityId};
use crate::food::Food;
use crate::plan::{Plan, Step};
use crate::renderer::{self, DrawCommand, Drawable, Rgba};
use crate::world::World;

use planar::{Point, Polar, Region};
use rand::Rng;
use std::f64::consts::{FRAC_PI_4, PI};
use tracing::{debug, info};

#[derive(Clone, PartialEq, Debug)]
pub struct Creech {
    pub id: EntityId,
    pub name: String,
    pub pos: Point,
    /// only the direction matters, r is kept at 1
    pub facing: Polar,
    pub size: f64,
    pub energy: f64,
    /// set during planning, consumed during execution
    pub plan: Option<Plan>,
}

impl Creech {
    pub fn new(id: EntityId, name: impl Into<String>, pos: Point) -> Self {
        Self {
            id,
            name: name.into(),
            pos,
            facing: planar::NORTH,
            size: c::SIZE,
            energy: c::INITIAL_ENERGY,
            plan: None,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.energy <= 0.
    }

    pub fn is_full(&self) -> bool {
        self.energy >= c::MAX_ENERGY
    }

    /// how much it could still eat
    pub fn capacity(&self) -> f64 {
        (c::MAX_ENERGY - self.energy).max(0.)
    }

    /// a trapezoid reaching out in front of the creech, narrow at its back.
    /// corners go back left, front left, front right, back right.
    pub fn view_region(&self) -> Region {
        let heading = Polar::new(1., self.facing.theta);
        let front_side = heading.turn_left().scale(c::VIEW_SIDE_DISTANCE).to_point();
        let back_side = front_side * c::VIEW_BACK_FRACTION;
        let ahead = heading.scale(c::VIEW_DISTANCE).to_point();

        let front_left = self.pos + ahead + front_side;
        let front_right = front_left - front_side * 2.;
        let back_left = self.pos + back_side;
        let back_right = back_left - back_side * 2.;
        Region::from_corners([back_left, front_left, front_right, back_right])
    }

    /// decides what to do this tick based on what it can see.
    /// the closest thing in view wins, food is ignored once full.
    pub fn make_plan<R: Rng>(&self, world: &World, mut rng: R) -> Plan {
        let mut seen = world.observe(&self.view_region(), self.id);
        // stable, equally distant things stay in observation order
        seen.sort_by(|a, b| {
            let da = self.pos.distance_to_squared(a.pos());
            let db = self.pos.distance_to_squared(b.pos());
            da.total_cmp(&db)
        });

        let plan = seen
            .into_iter()
            .find_map(|e| match e {
                Entity::Food(_) if self.is_full() => None,
                Entity::Food(food) => Some(self.plan_eat(food)),
                Entity::Creech(other) => Some(self.plan_flee(other, &mut rng)),
            })
            .unwrap_or_else(|| self.plan_wander(&mut rng));
        debug!(creech = %self.name, kind = plan.name(), "{}", plan);
        plan
    }

    fn plan_wander<R: Rng>(&self, rng: &mut R) -> Plan {
        let turn = if rng.random_bool(c::WANDER_TURN_CHANCE) {
            (rng.random::<f64>() - 0.5) * c::MAX_TURN
        } else {
            0.
        };
        let dist = rng.random::<f64>() * c::MAX_MOVE;
        Plan::Wander { turn, dist }
    }

    fn plan_flee<R: Rng>(&self, other: &Creech, rng: &mut R) -> Plan {
        let turn = turn_helper(self.facing, self.pos, other.pos, c::MAX_TURN, false);
        let dist = rng.random::<f64>() * c::MAX_MOVE;
        Plan::Flee {
            from: other.id,
            turn,
            dist,
        }
    }

    fn plan_eat(&self, food: &Food) -> Plan {
        let turn = turn_helper(self.facing, self.pos, food.pos(), c::MAX_TURN, true);
        let dist = self.pos.distance_to(food.pos());
        // an advance of dist - EAT_RANGE can stop a rounding error short of the range
        let step = if dist <= c::EAT_RANGE + planar::EPSILON {
            Step::Bite(c::BITE.min(self.capacity()).min(food.value()))
        } else {
            Step::Advance(c::MAX_MOVE.min(dist - c::EAT_RANGE))
        };
        Plan::Eat {
            food: food.id(),
            turn,
            step,
        }
    }

    /// carries out the current plan, if there is one, and pays for it.
    /// bites are limited by what is left of the food right now, other creeches may have
    /// eaten from it earlier in the same tick.
    pub fn do_plan(&mut self, food: &mut [Food]) {
        let Some(plan) = self.plan.take() else {
            return;
        };
        self.facing = self.facing.turn(plan.turn());
        match plan {
            Plan::Wander { dist, .. } | Plan::Flee { dist, .. } => self.step(dist),
            Plan::Eat {
                step: Step::Advance(dist),
                ..
            } => self.step(dist),
            Plan::Eat {
                food: id,
                step: Step::Bite(amount),
                ..
            } => {
                if let Some(f) = food.iter_mut().find(|f| f.id() == id) {
                    let taken = f.consume(amount.min(self.capacity()));
                    self.energy = (self.energy + taken).min(c::MAX_ENERGY);
                }
            }
        }
        self.energy = (self.energy - plan.cost()).max(0.);
        if self.is_dead() {
            info!(creech = %self.name, pos = %self.pos, "starved");
        }
    }

    fn step(&mut self, dist: f64) {
        self.pos = self.pos.move_by(Polar::new(dist, self.facing.theta));
    }

    fn glyph(&self) -> u8 {
        if self.is_dead() {
            b'x'
        } else {
            facing_glyph(self.facing.theta)
        }
    }
}

/// the angle to turn by, at most max_turn, to face towards (or away from) target.
/// if the target is dead ahead, turning away goes left.
pub fn turn_helper(facing: Polar, from: Point, target: Point, max_turn: f64, towards: bool) -> f64 {
    let bearing = from.polar_to(target);
    let diff = planar::rad_norm(bearing.theta - facing.theta);
    if diff == 0. {
        return if towards { 0. } else { max_turn };
    }
    let dtheta = if towards {
        diff.abs().min(max_turn)
    } else {
        -(max_turn.min(PI - diff.abs()))
    };
    if diff < 0. { -dtheta } else { dtheta }
}

/// an arrow pointing in the direction of theta
pub fn facing_glyph(theta: f64) -> u8 {
    let diagonal = FRAC_PI_4;
    let back_diagonal = 3. * FRAC_PI_4;
    if theta.abs() <= diagonal {
        b'>'
    } else if theta > diagonal && theta < back_diagonal {
        b'^'
    } else if theta < -diagonal && theta > -back_diagonal {
        b'v'
    } else if theta.abs() >= back_diagonal {
        b'<'
    } else {
        panic!("facing {} points nowhere", theta)
    }
}

/// a line from `from` to `to` with a small head at `to`
fn arrow(from: Point, to: Point, head: f64) -> Vec<Point> {
    let back = Polar::new(head, from.polar_to(to).theta + PI);
    let left = back.turn(-FRAC_PI_4 / 2.).to_point();
    let right = back.turn(FRAC_PI_4 / 2.).to_point();
    vec![from, to, to + left, to + right, to]
}

impl Drawable for Creech {
    fn screen(&self) -> (i64, i64, u8) {
        (self.pos.x as i64, self.pos.y as i64, self.glyph())
    }

    fn web(&self) -> Vec<DrawCommand> {
        if self.is_dead() {
            let s = self.size / 2.;
            let a = Point::new(s, s);
            let b = Point::new(s, -s);
            return vec![
                renderer::poly(vec![self.pos - a, self.pos + a]),
                renderer::poly(vec![self.pos - b, self.pos + b]),
            ];
        }
        let nose = self.pos + Polar::new(self.size, self.facing.theta).to_point();
        let tint = Rgba::new(0.5, 0.1, 0.1, 0.2);
        let view = DrawCommand {
            points: self.view_region().closed_points(),
            line_colour: tint,
            do_fill: true,
            fill_colour: tint,
        };
        vec![renderer::poly(arrow(self.pos, nose, self.size * 0.3)), view]
    }
}

impl std::fmt::Display for Creech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} at {} facing {:.3} energy {:.2}",
            self.id, self.name, self.pos, self.facing.theta, self.energy
        )
    }
}

#[cfg(test)]
fn creech_at(x: f64, y: f64) -> Creech {
    Creech::new(EntityId(0), "test", Point::new(x, y))
}

#[test]
fn turn_towards_and_away() {
    use planar::{EAST, NORTH, SOUTH, WEST};
    let mt = PI / 10.;
    let o = Point::ORIGIN;
    let a = Point::new(1., 0.);
    let b = Point::new(1., 1.);
    let far = Point::new(100., 1.);
    let small = 1f64.atan2(100.);

    let cases = [
        (WEST, far, false, small),
        (EAST, a, true, 0.),
        (NORTH, a, true, -mt),
        (SOUTH, a, true, mt),
        (EAST, b, true, mt),
        (NORTH, b, true, -mt),
        (SOUTH, b, true, mt),
        (EAST, far, true, small),
        (EAST, a, false, mt),
        (NORTH, a, false, mt),
        (SOUTH, a, false, -mt),
        (EAST, b, false, -mt),
        (NORTH, b, false, mt),
        (SOUTH, b, false, -mt),
    ];
    for (facing, target, towards, expected) in cases {
        let got = turn_helper(facing, o, target, mt, towards);
        approx::assert_abs_diff_eq!(got, expected, epsilon = 1e-8);
    }
}

#[test]
fn turning_is_bounded() {
    let mt = PI / 8.;
    let facing = Polar::new(1., 0.3);
    for i in 0..64 {
        let target = Polar::new(2., i as f64 * PI / 32.).to_point();
        for towards in [true, false] {
            let t = turn_helper(facing, Point::ORIGIN, target, mt, towards);
            assert!(t.abs() <= mt + 1e-12, "{} {}", i, t);
        }
        // facing the target gets closer, not further
        let before = planar::rad_norm(target.to_polar().theta - facing.theta).abs();
        let t = turn_helper(facing, Point::ORIGIN, target, mt, true);
        let after = planar::rad_norm(target.to_polar().theta - facing.turn(t).theta).abs();
        assert!(after <= before + 1e-12);
        // and looking away never overshoots back towards it
        let t = turn_helper(facing, Point::ORIGIN, target, mt, false);
        let after = planar::rad_norm(target.to_polar().theta - facing.turn(t).theta).abs();
        assert!(after >= before - 1e-12, "{} {} {}", i, before, after);
    }
}

#[test]
fn glyphs() {
    let cases = [
        (0., b'>'),
        (FRAC_PI_4, b'>'),
        (-FRAC_PI_4, b'>'),
        (PI / 2., b'^'),
        (-PI / 2., b'v'),
        (3. * FRAC_PI_4, b'<'),
        (-3. * FRAC_PI_4, b'<'),
        (PI, b'<'),
    ];
    for (theta, glyph) in cases {
        assert_eq!(facing_glyph(theta), glyph, "{}", theta);
    }
    let mut dead = creech_at(2.7, -1.2);
    assert_eq!(dead.screen(), (2, -1, b'^'));
    dead.energy = 0.;
    assert_eq!(dead.screen(), (2, -1, b'x'));
    assert_eq!(dead.web().len(), 2);
}

#[test]
#[should_panic]
fn nan_facing() {
    facing_glyph(f64::NAN);
}

#[test]
fn view_trapezoid() {
    let c = creech_at(0., 0.);
    let corners = [
        Point::new(-0.8, 0.),
        Point::new(-4., 7.),
        Point::new(4., 7.),
        Point::new(0.8, 0.),
    ];
    let region = c.view_region();
    assert_eq!(region.points().len(), 4);
    for (got, expected) in region.points().iter().zip(corners) {
        assert!(got.approx_eq(expected), "{} {}", got, expected);
    }
    assert!(region.contains(Point::new(0., 3.)));
    assert!(region.contains(Point::new(3.9, 6.9)));
    assert!(!region.contains(Point::new(0., -1.)));
    assert!(!region.contains(Point::new(0., 7.5)));
    assert!(!region.contains(Point::new(3.9, 0.5)));

    // turning the creech turns the region with it
    let mut east = creech_at(1., 1.);
    east.facing = planar::EAST;
    let region = east.view_region();
    assert!(region.contains(Point::new(5., 1.)));
    assert!(!region.contains(Point::new(1., 5.)));
}

#[test]
fn eating_is_capped() {
    let mut me = creech_at(0., 0.);
    me.energy = 9.5;
    let mut food = vec![Food::new(EntityId(1), Point::new(0., 0.5), 10., 0.4)];
    for _ in 0..5 {
        me.plan = Some(Plan::Eat {
            food: EntityId(1),
            turn: 0.,
            step: Step::Bite(c::BITE),
        });
        me.do_plan(&mut food);
        assert!(me.energy <= c::MAX_ENERGY);
    }
    // topped up every time, the cost comes after
    approx::assert_abs_diff_eq!(me.energy, c::MAX_ENERGY - c::EAT_COST, epsilon = 1e-12);
    assert!(food[0].value() < 10.);
}

#[test]
fn bite_limited_by_remaining_food() {
    let mut me = creech_at(0., 0.);
    me.energy = 2.;
    let mut food = vec![Food::new(EntityId(1), Point::new(0., 0.5), 0.3, 0.4)];
    me.plan = Some(Plan::Eat {
        food: EntityId(1),
        turn: 0.,
        step: Step::Bite(1.),
    });
    me.do_plan(&mut food);
    approx::assert_abs_diff_eq!(me.energy, 2. + 0.3 - c::EAT_COST, epsilon = 1e-12);
    assert!(food[0].is_exhausted());
    assert_eq!(me.plan, None);
}

#[test]
fn executing_moves_and_costs() {
    let mut me = creech_at(0., 0.);
    me.plan = Some(Plan::Flee {
        from: EntityId(5),
        turn: -PI / 2.,
        dist: 0.5,
    });
    me.do_plan(&mut []);
    assert!(me.pos.approx_eq(Point::new(0.5, 0.)));
    approx::assert_abs_diff_eq!(me.facing.theta, 0., epsilon = 1e-12);
    approx::assert_abs_diff_eq!(me.energy, c::INITIAL_ENERGY - c::FLEE_COST, epsilon = 1e-12);

    // no plan, nothing happens
    let before = me.clone();
    me.do_plan(&mut []);
    assert_eq!(me, before);

    // energy never goes below zero
    me.energy = 0.01;
    me.plan = Some(Plan::Wander { turn: 0., dist: 0. });
    me.do_plan(&mut []);
    assert_eq!(me.energy, 0.);
    assert!(me.is_dead());
}

#[test]
fn closest_thing_wins() {
    let mut world = World::empty(7);
    let me = world.spawn_creech("me", Point::new(0., 0.));
    let food = world.place_food(Point::new(0., 2.), 5.);
    let other = world.spawn_creech("other", Point::new(0., 4.));

    let plan = world.creech(me).unwrap().make_plan(&world, rand::rng());
    match plan {
        Plan::Eat { food: f, step, .. } => {
            assert_eq!(f, food);
            assert_eq!(step, Step::Advance(c::MAX_MOVE));
        }
        p => panic!("expected to eat, got {}", p),
    }

    // a full creech skips the food and sees the other one
    world.creech_mut(me).unwrap().energy = c::MAX_ENERGY;
    match world.creech(me).unwrap().make_plan(&world, rand::rng()) {
        Plan::Flee { from, turn, dist } => {
            assert_eq!(from, other);
            approx::assert_abs_diff_eq!(turn, c::MAX_TURN);
            assert!((0. ..c::MAX_MOVE).contains(&dist));
        }
        p => panic!("expected to flee, got {}", p),
    }

    // the other one is facing away, it can't see anything
    let plan = world.creech(other).unwrap().make_plan(&world, rand::rng());
    assert_eq!(plan.name(), "wander");
    assert!(plan.turn().abs() <= c::MAX_TURN / 2.);
}

#[test]
fn bite_when_in_range() {
    let mut world = World::empty(7);
    let me = world.spawn_creech("me", Point::new(0., 0.));
    world.place_food(Point::new(0.5, 0.5), 0.4);
    world.creech_mut(me).unwrap().energy = 9.8;
    match world.creech(me).unwrap().make_plan(&world, rand::rng()) {
        Plan::Eat { turn, step, .. } => {
            approx::assert_abs_diff_eq!(turn, -c::MAX_TURN);
            match step {
                Step::Bite(amount) => approx::assert_abs_diff_eq!(amount, 0.2, epsilon = 1e-12),
                s => panic!("expected a bite, got {:?}", s),
            }
        }
        p => panic!("expected to eat, got {}", p),
    }
}

#[test]
fn bite_at_the_edge_of_the_range() {
    let mut world = World::empty(7);
    let me = world.spawn_creech("me", Point::new(0., 0.));
    world.place_food(Point::new(0., c::EAT_RANGE + 2e-16), 5.);
    match world.creech(me).unwrap().make_plan(&world, rand::rng()) {
        Plan::Eat {
            step: Step::Bite(amount),
            ..
        } => approx::assert_abs_diff_eq!(amount, c::BITE),
        p => panic!("expected a bite, got {}", p),
    }

    // where an off-axis walk actually ends up
    let mut world = World::empty(7);
    let me = world.spawn_creech("me", Point::new(0., 0.));
    let food = Point::new(3., 5.5);
    world.place_food(food, 5.);
    {
        let hungry = world.creech_mut(me).unwrap();
        hungry.facing = Polar::new(1., food.y.atan2(food.x));
        hungry.pos = food - hungry.facing.scale(c::EAT_RANGE + 4e-16).to_point();
        assert!(hungry.pos.distance_to(food) > c::EAT_RANGE);
    }
    assert!(matches!(
        world.creech(me).unwrap().make_plan(&world, rand::rng()),
        Plan::Eat {
            step: Step::Bite(_),
            ..
        }
    ));
}
