//! Enemy behavior module
//!
//! Конечный автомат врага: Patrolling → Waiting → Attacking → Dead.
//! Dead терминален и поглощающий — все переходы из него no-op, таймеры
//! считаются отменёнными (liveness guard = `Without<Dead>`).
//!
//! Урон приходит ортогонально этому автомату: flash/числа урона/readout
//! живут в feedback-модуле и не трогают таймеры патруля и атаки.

use bevy::prelude::*;

pub mod enemy;
pub mod melee;

pub use enemy::{random_in_unit_disc, EnemyState, EnemyStats, PatrolRoute, ARRIVAL_EPSILON};
pub use melee::{AttackPhase, MeleeAttackState, PhaseEvent};

use crate::combat::MeleeHit;
use crate::SimSet;

/// Behavior Plugin
///
/// Порядок выполнения (chained, FixedUpdate):
/// 1. patrol_movement — движение к текущей patrol-цели
/// 2. waiting_countdown — таймер ожидания + редро цели
/// 3. attack_trigger — proximity-триггер атаки
/// 4. update_melee_attack_phases — wind-up / recovery таймеры
pub struct BehaviorPlugin;

impl Plugin for BehaviorPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<MeleeHit>();

        app.add_systems(
            FixedUpdate,
            (
                enemy::patrol_movement,
                enemy::waiting_countdown,
                enemy::attack_trigger,
                melee::update_melee_attack_phases,
            )
                .chain()
                .in_set(SimSet::Behavior),
        );
    }
}
