//! Physics domain — kinematic перемещение поверх rapier (parry) shape queries
//!
//! Velocity интегрируем сами (LocomotionController), rapier только для collisions:
//! капсула актора против ground plane + cuboid blockers, overlap-box для атак босса.

pub mod collision;

pub use collision::{
    sync_collision_world, ActorShape, Blocker, BlockerVolume, CollisionWorld, MoveResult,
    CONTACT_SKIN, GROUND_SKIN,
};
pub(crate) use collision::shapes_intersect;
