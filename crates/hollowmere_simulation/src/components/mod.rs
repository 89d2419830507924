//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: идентичность и здоровье (Actor, Category, Health, DisplayName)
//! - movement: скорость и направление взгляда (Velocity, Facing)

pub mod actor;
pub mod movement;

pub use actor::*;
pub use movement::*;
