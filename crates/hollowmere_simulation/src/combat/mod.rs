//! Combat module
//!
//! ECS ответственность:
//! - Player combat controller: движение + Active/CoolingDown автомат атаки
//! - Единая точка мутации Health: apply_damage (MeleeHit → DamageDealt)
//! - Death handling: Dead маркер, grace-деспавн
//!
//! Наружу (presentation collaborator) уходят только события:
//! DamageDealt / HealthChanged / EntityDied / AttackPerformed.
//! Обратных ссылок из презентации в gameplay-state нет.

use bevy::prelude::*;

pub mod damage;
pub mod player;

pub use damage::{
    Dead, DespawnAfter, DamageDealt, EntityDied, HealthChanged, MeleeHit, DESPAWN_GRACE,
};
pub use player::{
    AttackPerformed, Player, PlayerAttackPhase, PlayerAttackState, PlayerInput, PlayerStats,
};

use crate::SimSet;

/// Combat Plugin
///
/// Порядок выполнения (chained, FixedUpdate):
/// 1. player_movement — сглаженная интеграция input → velocity → position
/// 2. player_attack — edge-triggered запуск атаки, радиальный multi-hit
/// 3. update_player_attack_phases — Active / CoolingDown таймеры
/// 4. apply_damage — MeleeHit → Health (единственная точка мутации)
/// 5. handle_death — Dead маркер, отключение автоматов, grace-таймер
/// 6. despawn_after_timeout — удаление из мира
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<MeleeHit>()
            .add_event::<DamageDealt>()
            .add_event::<HealthChanged>()
            .add_event::<EntityDied>()
            .add_event::<AttackPerformed>();

        app.add_systems(
            FixedUpdate,
            (
                player::player_movement,
                player::player_attack,
                player::update_player_attack_phases,
                damage::apply_damage,
                damage::handle_death,
                damage::despawn_after_timeout,
            )
                .chain()
                .in_set(SimSet::Combat),
        );
    }
}
