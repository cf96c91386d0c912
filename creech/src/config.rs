pub const WORLD_WIDTH: f64 = 40.;
pub const WORLD_HEIGHT: f64 = 40.;

pub const INITIAL_FOOD: usize = 5;
// random placement gives up after this many rejected positions
pub const SPAWN_ATTEMPTS: usize = 10_000;

// in ticks
pub const REPORT_INTERVAL: u64 = 100;

/// creech settings
pub mod c {
    use std::f64::consts::PI;

    pub const SIZE: f64 = 1.;

    // per tick
    pub const MAX_MOVE: f64 = 0.5;
    pub const MAX_TURN: f64 = PI * 0.125;

    // the view region is a trapezoid, VIEW_DISTANCE long,
    // 2 * VIEW_SIDE_DISTANCE wide at the front
    // and VIEW_BACK_FRACTION of that at the creech itself
    pub const VIEW_DISTANCE: f64 = 7.;
    pub const VIEW_SIDE_DISTANCE: f64 = 4.;
    pub const VIEW_BACK_FRACTION: f64 = 0.2;

    pub const MAX_ENERGY: f64 = 10.;
    pub const INITIAL_ENERGY: f64 = 7.;
    pub const BITE: f64 = 1.;
    pub const EAT_RANGE: f64 = SIZE;

    pub const WANDER_TURN_CHANCE: f64 = 0.4;

    // metabolic cost of each plan, paid when it is executed
    pub const WANDER_COST: f64 = 0.05;
    pub const EAT_COST: f64 = 0.05;
    pub const FLEE_COST: f64 = 0.1;
}

/// food settings
pub mod f {
    pub const MAX_VALUE: f64 = 10.;
    // size = value * density
    pub const DENSITY: f64 = 0.4;
}
