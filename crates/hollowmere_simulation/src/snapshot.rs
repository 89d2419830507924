//! Snapshot-схема симуляции (surface для persistence collaborator).
//!
//! Оригинальный save-путь ничего не персистил, поэтому схема определена
//! с нуля: на entity — `{id, category, position, health, state_tag,
//! timers}`. Захват отсортирован по entity index — детерминированный
//! порядок для сравнения прогонов. Только capture: файловый I/O и выбор
//! формата — ответственность collaborator'а (схема serde-совместима).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::behavior::{EnemyState, MeleeAttackState};
use crate::combat::{DespawnAfter, PlayerAttackState};
use crate::components::{Actor, Category, Health};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub entities: Vec<EntitySnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: u32,
    pub category: Category,
    pub position: (f32, f32),
    pub health_current: u32,
    pub health_max: u32,
    pub state_tag: String,
    /// Остаточные таймеры в фиксированном порядке: state-таймер (wait /
    /// attack phase), затем grace-деспавн, если есть.
    pub timers: Vec<f32>,
}

/// Снимает состояние всех акторов мира.
pub fn capture(world: &mut World) -> SimSnapshot {
    let mut actors = world.query::<(Entity, &Actor, &Transform, &Health)>();
    let mut base: Vec<(Entity, Category, (f32, f32), u32, u32)> = actors
        .iter(world)
        .map(|(entity, actor, transform, health)| {
            (
                entity,
                actor.category,
                (transform.translation.x, transform.translation.y),
                health.current,
                health.max,
            )
        })
        .collect();

    // Сортировка по entity index — детерминизм снапшота
    base.sort_by_key(|(entity, ..)| entity.index());

    let mut entities = Vec::with_capacity(base.len());
    for (entity, category, position, health_current, health_max) in base {
        let mut timers = Vec::new();

        let state_tag = if let Some(state) = world.get::<EnemyState>(entity) {
            if let EnemyState::Waiting { remaining } = state {
                timers.push(*remaining);
            }
            state.tag().to_string()
        } else if let Some(attack) = world.get::<PlayerAttackState>(entity) {
            timers.push(attack.phase.remaining());
            attack.tag().to_string()
        } else {
            "idle".to_string()
        };

        if let Some(attack) = world.get::<MeleeAttackState>(entity) {
            timers.push(attack.phase.remaining());
        }
        if let Some(despawn) = world.get::<DespawnAfter>(entity) {
            timers.push(despawn.remaining);
        }

        entities.push(EntitySnapshot {
            id: entity.index(),
            category,
            position,
            health_current,
            health_max,
            state_tag,
            timers,
        });
    }

    SimSnapshot { entities }
}
