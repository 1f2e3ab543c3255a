pub mod position;
pub mod shapes;

pub use position::{Position, PositionI};
pub use shapes::{Aabb, CollisionPair, EntityPoint, Rectangle};
