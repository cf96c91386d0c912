use crate::config;
use crate::config::f;
use crate::creech::Creech;
use crate::entity::{Entity, EntityId};
use crate::food::Food;
use crate::renderer::{RenderError, Renderer};

use planar::{Point, Region};
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

pub type DetRng = rand_pcg::Pcg64Mcg;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("no free spot for something of size {size} after {attempts} attempts")]
    Crowded { size: f64, attempts: usize },
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// a torus of width size.x and height size.y, centered on the origin
#[derive(Debug)]
pub struct World {
    size: Point,
    creeches: Vec<Creech>,
    food: Vec<Food>,
    rng: DetRng,
    next_id: u64,
    tick: u64,
}

#[derive(Debug)]
pub struct Report {
    pub tick: u64,
    pub alive: usize,
    pub dead: usize,
    pub avg_energy: f64,
    pub food: usize,
    pub food_value: f64,
}

/// wraps a single coordinate into (-size/2, size/2]
pub fn wrap(v: f64, size: f64) -> f64 {
    let half = size / 2.;
    if v > -half && v <= half {
        return v;
    }
    let v = v.rem_euclid(size);
    if v > half { v - size } else { v }
}

pub fn wrap_pos(p: Point, size: Point) -> Point {
    Point::new(wrap(p.x, size.x), wrap(p.y, size.y))
}

impl World {
    /// nothing in it yet
    pub fn empty(seed: u64) -> Self {
        Self::with_size(Point::new(config::WORLD_WIDTH, config::WORLD_HEIGHT), seed)
    }

    pub fn with_size(size: Point, seed: u64) -> Self {
        Self {
            size,
            creeches: Vec::new(),
            food: Vec::new(),
            rng: DetRng::seed_from_u64(seed),
            next_id: 0,
            tick: 0,
        }
    }

    /// the usual cast plus some randomly placed food
    pub fn new(seed: u64, food: usize) -> Result<Self, WorldError> {
        let mut world = Self::empty(seed);
        world.spawn_creech("bob", Point::new(0., 0.));
        world.spawn_creech("alice", Point::new(2., 2.));
        world.add_food(food)?;
        Ok(world)
    }

    fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }
    #[cfg(test)]
    pub fn creech(&self, id: EntityId) -> Option<&Creech> {
        self.creeches.iter().find(|c| c.id == id)
    }
    #[cfg(test)]
    pub fn creech_mut(&mut self, id: EntityId) -> Option<&mut Creech> {
        self.creeches.iter_mut().find(|c| c.id == id)
    }

    pub fn spawn_creech(&mut self, name: &str, pos: Point) -> EntityId {
        let id = self.next_id();
        let pos = wrap_pos(pos, self.size);
        self.creeches.push(Creech::new(id, name, pos));
        id
    }

    /// food at a fixed spot, no overlap checks
    pub fn place_food(&mut self, pos: Point, value: f64) -> EntityId {
        let id = self.next_id();
        let pos = wrap_pos(pos, self.size);
        self.food.push(Food::new(id, pos, value, f::DENSITY));
        id
    }

    /// food of random value at a random free spot
    pub fn spawn_food(&mut self) -> Result<EntityId, WorldError> {
        let value = self.rng.random::<f64>() * f::MAX_VALUE;
        let pos = self.random_empty_pos(value * f::DENSITY)?;
        Ok(self.place_food(pos, value))
    }

    pub fn add_food(&mut self, n: usize) -> Result<(), WorldError> {
        for _ in 0..n {
            self.spawn_food()?;
        }
        Ok(())
    }

    /// a uniformly random position at which something of this size
    /// would not overlap anything that is already here
    pub fn random_empty_pos(&mut self, size: f64) -> Result<Point, WorldError> {
        for _ in 0..config::SPAWN_ATTEMPTS {
            let p = Point::new(
                self.rng.random::<f64>() * self.size.x,
                self.rng.random::<f64>() * self.size.y,
            );
            let p = wrap_pos(p, self.size);
            if !self.entities().any(|e| e.pos().near(p, e.size() + size)) {
                return Ok(p);
            }
        }
        Err(WorldError::Crowded {
            size,
            attempts: config::SPAWN_ATTEMPTS,
        })
    }

    fn entities(&self) -> impl Iterator<Item = Entity<'_>> {
        let creeches = self.creeches.iter().map(Entity::Creech);
        let food = self.food.iter().map(Entity::Food);
        creeches.chain(food)
    }

    /// everything inside of region, except for the asking entity itself.
    /// creeches come first, then food, each in insertion order.
    pub fn observe(&self, region: &Region, exclude: EntityId) -> Vec<Entity<'_>> {
        self.entities()
            .filter(|e| e.id() != exclude)
            .filter(|e| region.contains(e.pos()))
            .collect()
    }

    /// one step of the simulation.
    /// every creech plans against the same unchanged world, then the plans are carried out
    /// one creech after the other.
    pub fn update(&mut self) {
        self.tick += 1;

        // one seed per tick from the world rng, mixed with the index
        // so it doesn't matter which thread plans which creech
        let tick_seed: u64 = self.rng.random();
        let world: &World = self;
        let plans = world
            .creeches
            .par_iter()
            .enumerate()
            .map(|(index, creech)| {
                if creech.is_dead() {
                    return None;
                }
                let rng = DetRng::seed_from_u64(tick_seed ^ index as u64);
                Some(creech.make_plan(world, rng))
            })
            .collect::<Vec<_>>();

        let food = &mut self.food;
        for (creech, plan) in self.creeches.iter_mut().zip(plans) {
            creech.plan = plan;
            creech.do_plan(food);
            creech.pos = wrap_pos(creech.pos, self.size);
        }

        let before = self.food.len();
        self.food.retain(|f| !f.is_exhausted());
        if self.food.len() < before {
            debug!(tick = self.tick, eaten = before - self.food.len(), "food used up");
        }

        if self.tick % config::REPORT_INTERVAL == 0 {
            self.report();
        }
    }

    pub fn init(&self, renderer: &mut dyn Renderer) -> Result<(), WorldError> {
        renderer.init(self.size.x, self.size.y)?;
        Ok(())
    }

    /// one full frame, food below creeches
    pub fn draw(&self, renderer: &mut dyn Renderer) -> Result<(), WorldError> {
        renderer.start_frame()?;
        for food in &self.food {
            renderer.draw(food)?;
        }
        for creech in &self.creeches {
            debug!(tick = self.tick, "{}", creech);
            renderer.draw(creech)?;
        }
        renderer.finish_frame()?;
        Ok(())
    }

    pub fn gen_report(&self) -> Report {
        let (alive, dead): (Vec<&Creech>, Vec<&Creech>) =
            self.creeches.iter().partition(|c| !c.is_dead());
        let avg_energy = if alive.is_empty() {
            0.
        } else {
            alive.iter().map(|c| c.energy).sum::<f64>() / alive.len() as f64
        };
        Report {
            tick: self.tick,
            alive: alive.len(),
            dead: dead.len(),
            avg_energy,
            food: self.food.len(),
            food_value: self.food.iter().map(Food::value).sum(),
        }
    }

    pub fn report(&self) {
        let r = self.gen_report();
        info!(
            tick = r.tick,
            alive = r.alive,
            dead = r.dead,
            avg_energy = r.avg_energy,
            food = r.food,
            food_value = r.food_value,
            "report"
        );
    }
}

impl PartialEq for World {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size
            && self.tick == other.tick
            && self.next_id == other.next_id
            && self.creeches == other.creeches
            && self.food == other.food
    }
}

#[test]
fn wrapping() {
    let size = 40.;
    let cases = [
        (0., 0.),
        (20., 20.),
        (-20., 20.),
        (21., -19.),
        (-21., 19.),
        (60., 20.),
        (-61.5, 18.5),
        (19.99, 19.99),
    ];
    for (v, expected) in cases {
        approx::assert_abs_diff_eq!(wrap(v, size), expected, epsilon = 1e-12);
    }
    for i in -1000..1000 {
        let v = i as f64 * 0.37;
        let once = wrap(v, size);
        assert!(once > -20. && once <= 20., "{} -> {}", v, once);
        assert_eq!(wrap(once, size), once);
    }
    let p = wrap_pos(Point::new(25., -41.), Point::new(40., 30.));
    assert!(p.approx_eq(Point::new(-15., -11.)));
}

#[test]
fn observing() {
    let mut world = World::empty(1);
    let me = world.spawn_creech("me", Point::new(0., 0.));
    let food = world.place_food(Point::new(0., 3.), 2.);
    let other = world.spawn_creech("other", Point::new(1., 5.));
    world.place_food(Point::new(0., -3.), 2.);

    let region = world.creech(me).unwrap().view_region();
    let seen = world.observe(&region, me).iter().map(Entity::id).collect::<Vec<_>>();
    assert_eq!(seen, [other, food]);

    // the region is not tied to the asking creech
    let all = world.observe(&region, EntityId(u64::MAX));
    assert_eq!(all.len(), 3);
}

#[test]
fn crowded_world() {
    let mut world = World::with_size(Point::new(2., 2.), 3);
    world.spawn_creech("big", Point::new(0., 0.));
    // nothing fits more than 10 away from the only creech on a 2x2 torus
    match world.random_empty_pos(10.) {
        Err(WorldError::Crowded { size, attempts }) => {
            assert_eq!(size, 10.);
            assert_eq!(attempts, config::SPAWN_ATTEMPTS);
        }
        r => panic!("expected to give up, got {:?}", r),
    }
    let p = World::empty(3).random_empty_pos(10.).unwrap();
    assert!(p.x > -20. && p.x <= 20. && p.y > -20. && p.y <= 20.);
}

#[test]
fn initial_world() {
    let world = World::new(42, 5).unwrap();
    assert_eq!(world.creeches.len(), 2);
    assert_eq!(world.creeches[0].name, "bob");
    assert_eq!(world.creeches[1].pos, Point::new(2., 2.));
    assert_eq!(world.food.len(), 5);
    let mut ids = world
        .creeches
        .iter()
        .map(|c| c.id)
        .chain(world.food.iter().map(Food::id))
        .collect::<Vec<_>>();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 7);
    for food in &world.food {
        assert!(food.value() >= 0. && food.value() < f::MAX_VALUE);
        for c in &world.creeches {
            assert!(!c.pos.near(food.pos(), food.size() + c.size));
        }
    }
    let r = world.gen_report();
    assert_eq!((r.alive, r.dead, r.food), (2, 0, 5));
    assert_eq!(r.avg_energy, config::c::INITIAL_ENERGY);
}

#[test]
fn determinism() {
    let mut w1 = World::new(1234, 8).unwrap();
    let mut w2 = World::new(1234, 8).unwrap();
    assert_eq!(w1, w2);
    for _ in 0..500 {
        w1.update();
        w2.update();
        assert_eq!(w1, w2);
    }
    // and a different seed gives a different world
    let mut w3 = World::new(4321, 8).unwrap();
    for _ in 0..500 {
        w3.update();
    }
    assert_ne!(w1, w3);
}

#[test]
fn walk_up_and_eat() {
    let mut world = World::empty(5);
    let me = world.spawn_creech("hungry", Point::new(0., 0.));
    world.creech_mut(me).unwrap().energy = 3.;
    let food = world.place_food(Point::new(0., 4.), 5.);

    // 0.5 per tick until it is exactly in range
    for tick in 1..=6 {
        world.update();
        let c = world.creech(me).unwrap();
        approx::assert_abs_diff_eq!(c.pos.x, 0., epsilon = 1e-9);
        approx::assert_abs_diff_eq!(c.pos.y, 0.5 * tick as f64, epsilon = 1e-9);
        assert_eq!(world.food[0].value(), 5.);
    }
    // then a bite per tick until it is gone
    for bites in 1..=5 {
        let energy = world.creech(me).unwrap().energy;
        world.update();
        let c = world.creech(me).unwrap();
        approx::assert_abs_diff_eq!(c.energy, energy + config::c::BITE - config::c::EAT_COST, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(c.pos.y, 3., epsilon = 1e-9);
        if bites < 5 {
            approx::assert_abs_diff_eq!(world.food[0].value(), 5. - bites as f64, epsilon = 1e-9);
        }
    }
    assert!(world.food.iter().all(|f| f.id() != food));
    assert!(world.food.is_empty());
}

#[test]
fn walk_up_and_eat_off_axis() {
    // the last advance lands within rounding of the eating range
    for target in [Point::new(3., 5.5), Point::new(1.7, 3.1), Point::new(-3., 6.)] {
        let mut world = World::empty(5);
        let me = world.spawn_creech("hungry", Point::new(0., 0.));
        world.creech_mut(me).unwrap().energy = 3.;
        world.place_food(target, 5.);

        let mut dist = target.length();
        let mut first_bite = None;
        for tick in 1..=40 {
            world.update();
            let c = world.creech(me).unwrap();
            let now = c.pos.distance_to(target);
            assert!(now <= dist + 1e-9, "{target:?}: moved away at tick {tick}, {dist} -> {now}");
            dist = now;
            let eaten = world.food.first().is_none_or(|f| f.value() < 5.);
            if eaten && first_bite.is_none() {
                first_bite = Some(tick);
            }
            if world.food.is_empty() || c.is_full() {
                break;
            }
        }
        assert!(first_bite.is_some_and(|t| t <= 20), "{target:?}: first bite at {first_bite:?}");
        assert!(world.food.is_empty() || world.creech(me).unwrap().is_full(), "{target:?}");
    }
}

#[test]
fn flee_from_each_other() {
    for seed in 0..50 {
        let mut world = World::empty(seed);
        let bob = world.spawn_creech("bob", Point::new(0., 0.));
        let alice = world.spawn_creech("alice", Point::new(0., 3.));
        world.creech_mut(alice).unwrap().facing = planar::SOUTH;

        for tick in 0..10 {
            let b = world.creech(bob).unwrap();
            let a = world.creech(alice).unwrap();
            if tick == 0 {
                // both see each other right away
                let plan = b.make_plan(&world, rand::rng());
                assert_eq!(plan.name(), "flee");
                let plan = a.make_plan(&world, rand::rng());
                assert_eq!(plan.name(), "flee");
            }
            world.update();
            if tick == 0 {
                // head on, so both go left
                let b = world.creech(bob).unwrap();
                let a = world.creech(alice).unwrap();
                approx::assert_abs_diff_eq!(b.facing.theta, planar::NORTH.theta + config::c::MAX_TURN);
                approx::assert_abs_diff_eq!(a.facing.theta, planar::SOUTH.theta + config::c::MAX_TURN);
            }
            let b = world.creech(bob).unwrap();
            let a = world.creech(alice).unwrap();
            let d = b.pos.distance_to(a.pos);
            // never touching
            assert!(d > b.size / 2. + a.size / 2., "seed {} tick {}: {}", seed, tick, d);
        }
    }
}

#[test]
fn starve_without_food() {
    let mut world = World::empty(9);
    let me = world.spawn_creech("alone", Point::new(0., 0.));
    let mut last = world.creech(me).unwrap().energy;
    let mut ticks = 0;
    while !world.creech(me).unwrap().is_dead() {
        world.update();
        let energy = world.creech(me).unwrap().energy;
        assert!(energy < last);
        last = energy;
        ticks += 1;
        assert!(ticks < 1000);
    }
    assert_eq!(last, 0.);
    let dead = world.creech(me).unwrap().clone();
    for _ in 0..10 {
        world.update();
    }
    assert_eq!(world.creech(me).unwrap(), &dead);
    assert_eq!(world.gen_report().dead, 1);
}

#[test]
fn drawing() {
    use crate::renderer::screen::Screen;
    let mut world = World::with_size(Point::new(6., 4.), 2);
    world.spawn_creech("bob", Point::new(1., 1.));
    world.place_food(Point::new(-2., -1.), 9.5);

    let mut screen = Screen::new(Vec::new());
    assert!(matches!(
        world.draw(&mut screen),
        Err(WorldError::Render(RenderError::NotInitialised))
    ));
    world.init(&mut screen).unwrap();
    world.draw(&mut screen).unwrap();
    let rows = screen
        .rows()
        .iter()
        .map(|r| String::from_utf8_lossy(r).into_owned())
        .collect::<Vec<_>>();
    assert_eq!(rows, ["      \n", "    ^ \n", "      \n", " *    \n"]);
}
