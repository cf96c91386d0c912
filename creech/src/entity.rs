use crate::creech::Creech;
use crate::food::Food;
use planar::Point;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// something a creech can see
#[derive(Copy, Clone, Debug)]
pub enum Entity<'w> {
    Creech(&'w Creech),
    Food(&'w Food),
}

impl Entity<'_> {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Creech(c) => c.id,
            Entity::Food(f) => f.id(),
        }
    }
    pub fn pos(&self) -> Point {
        match self {
            Entity::Creech(c) => c.pos,
            Entity::Food(f) => f.pos(),
        }
    }
    pub fn size(&self) -> f64 {
        match self {
            Entity::Creech(c) => c.size,
            Entity::Food(f) => f.size(),
        }
    }
}
