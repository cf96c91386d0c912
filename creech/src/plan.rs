use crate::config::c;
use crate::entity::EntityId;

/// what an eating creech does after turning towards its food
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Step {
    /// already in range, take this much
    Bite(f64),
    /// move this far along the new facing
    Advance(f64),
}

/// a decision made while looking at the world, carried out in the second half of the tick.
/// everything that needs the world state is worked out up front, so executing a plan only
/// touches the creech and, for a bite, the food it is eating.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Plan {
    Wander { turn: f64, dist: f64 },
    Flee { from: EntityId, turn: f64, dist: f64 },
    Eat { food: EntityId, turn: f64, step: Step },
}

impl Plan {
    pub fn name(&self) -> &'static str {
        match self {
            Plan::Wander { .. } => "wander",
            Plan::Flee { .. } => "flee",
            Plan::Eat { .. } => "eat",
        }
    }

    /// energy used up by executing the plan, even wandering is not free
    pub fn cost(&self) -> f64 {
        match self {
            Plan::Wander { .. } => c::WANDER_COST,
            Plan::Flee { .. } => c::FLEE_COST,
            Plan::Eat { .. } => c::EAT_COST,
        }
    }

    pub fn turn(&self) -> f64 {
        match *self {
            Plan::Wander { turn, .. } | Plan::Flee { turn, .. } | Plan::Eat { turn, .. } => turn,
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Plan::Wander { turn, dist } => write!(f, "wander turn {:.3} dist {:.3}", turn, dist),
            Plan::Flee { from, turn, dist } => {
                write!(f, "flee {} turn {:.3} dist {:.3}", from, turn, dist)
            }
            Plan::Eat { food, turn, step } => match step {
                Step::Bite(amount) => write!(f, "eat {} turn {:.3} bite {:.3}", food, turn, amount),
                Step::Advance(dist) => {
                    write!(f, "eat {} turn {:.3} advance {:.3}", food, turn, dist)
                }
            },
        }
    }
}

#[test]
fn names_and_costs() {
    let wander = Plan::Wander { turn: 0.1, dist: 0.2 };
    let flee = Plan::Flee {
        from: EntityId(3),
        turn: -0.1,
        dist: 0.4,
    };
    let eat = Plan::Eat {
        food: EntityId(7),
        turn: 0.,
        step: Step::Bite(1.),
    };
    assert_eq!(wander.name(), "wander");
    assert_eq!(flee.name(), "flee");
    assert_eq!(eat.name(), "eat");
    assert!(wander.cost() > 0.);
    assert!(flee.cost() > wander.cost());
    assert_eq!(flee.turn(), -0.1);
    assert_eq!(format!("{}", eat), "eat #7 turn 0.000 bite 1.000");
}
