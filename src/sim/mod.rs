//! Deterministic simulation module
//!
//! All gameplay primitives live here. This module must be pure and deterministic:
//! - Frame-counted time only
//! - Seeded RNG only
//! - Stable iteration order (spawn order / entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod motion;
pub mod paddle;
pub mod pool;
pub mod progression;
pub mod scene;

pub use collision::{child_radius, contains_point, first_hit, merge, overlaps, split};
pub use entity::{BallVariant, EnemyPattern, Entity, EntityId, EntityKind, Owner, Shape, Spawn};
pub use motion::{Boundary, Bounds, Contact, EdgeRule, Side, StepOutcome, fall, step};
pub use paddle::{FireControl, Paddle, bullet};
pub use pool::{EntityPool, EvictionPolicy, PairOutcome, Resolution, Which};
pub use progression::{Crossing, Difficulty, Progress, ProgressStep};
pub use scene::{Scene, SceneEvent, SceneMachine};
