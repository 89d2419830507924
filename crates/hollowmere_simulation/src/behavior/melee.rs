//! Melee-фазы атаки врага: WindUp → Recovery.
//!
//! Контракт: начатая атака всегда проходит WindUp до Recovery и всегда
//! снимает Attacking в конце Recovery — независимо от валидности цели.
//! Урон применяется один раз, в момент истечения WindUp, после
//! ре-валидации дистанции (цель могла уйти или умереть за время замаха).

use bevy::prelude::*;

use crate::combat::{Dead, MeleeHit};
use crate::components::{Actor, Health};
use crate::log;
use crate::spatial::within_radius;

use super::enemy::{EnemyState, EnemyStats, PatrolRoute, ARRIVAL_EPSILON};

/// Фаза атаки с остаточным таймером.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum AttackPhase {
    WindUp { remaining: f32 },
    Recovery { remaining: f32 },
}

impl AttackPhase {
    pub fn remaining(&self) -> f32 {
        match self {
            AttackPhase::WindUp { remaining } | AttackPhase::Recovery { remaining } => *remaining,
        }
    }
}

/// Граница фазы, пересечённая на этом тике.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    /// WindUp истёк: момент коммита урона (после ре-валидации цели)
    Commit,
    /// Recovery истёк: атака завершена, компонент снимается
    Finished,
}

/// Sub-автомат атаки. Висит на враге только пока EnemyState::Attacking.
#[derive(Component, Debug, Clone)]
pub struct MeleeAttackState {
    pub phase: AttackPhase,
    pub target: Entity,
}

impl MeleeAttackState {
    pub fn wind_up(duration: f32, target: Entity) -> Self {
        Self {
            phase: AttackPhase::WindUp {
                remaining: duration,
            },
            target,
        }
    }

    /// Продвигает фазовый таймер на `delta`.
    ///
    /// Неположительная длительность трактуется как "уже истекла" — граница
    /// срабатывает на первом же тике, а не фолтит.
    pub fn tick(&mut self, delta: f32, recovery_duration: f32) -> Option<PhaseEvent> {
        match self.phase {
            AttackPhase::WindUp { remaining } => {
                let remaining = remaining - delta;
                if remaining <= 0.0 {
                    self.phase = AttackPhase::Recovery {
                        remaining: recovery_duration,
                    };
                    Some(PhaseEvent::Commit)
                } else {
                    self.phase = AttackPhase::WindUp { remaining };
                    None
                }
            }
            AttackPhase::Recovery { remaining } => {
                let remaining = remaining - delta;
                if remaining <= 0.0 {
                    Some(PhaseEvent::Finished)
                } else {
                    self.phase = AttackPhase::Recovery { remaining };
                    None
                }
            }
        }
    }
}

/// Система: продвижение фаз атаки
///
/// Commit: цель ещё жива и в attack_range → один MeleeHit; иначе промах,
/// молча. В обоих случаях атака идёт в Recovery. Finished: компонент
/// снимается, враг возвращается в Patrolling/Waiting по текущей позиции
/// относительно patrol-цели. Мёртвые враги отфильтрованы — их таймеры
/// считаются отменёнными.
pub fn update_melee_attack_phases(
    mut commands: Commands,
    mut attackers: Query<
        (
            Entity,
            &Transform,
            &EnemyStats,
            &PatrolRoute,
            &mut EnemyState,
            &mut MeleeAttackState,
        ),
        Without<Dead>,
    >,
    targets: Query<(&Transform, &Health), With<Actor>>,
    mut hits: EventWriter<MeleeHit>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, transform, stats, route, mut state, mut attack) in attackers.iter_mut() {
        match attack.tick(delta, stats.recovery) {
            Some(PhaseEvent::Commit) => {
                let position = transform.translation.truncate();
                let target_in_range = targets
                    .get(attack.target)
                    .map(|(target_transform, target_health)| {
                        target_health.is_alive()
                            && within_radius(
                                position,
                                target_transform.translation.truncate(),
                                stats.attack_range,
                            )
                    })
                    .unwrap_or(false); // цель удалена между триггером и коммитом — промах

                if target_in_range {
                    hits.write(MeleeHit {
                        attacker: entity,
                        target: attack.target,
                        damage: stats.attack_damage,
                        source_position: position,
                    });
                    log(&format!(
                        "⚔️ Enemy {:?} hits {:?} for {}",
                        entity, attack.target, stats.attack_damage
                    ));
                } else {
                    log(&format!("⚔️ Enemy {:?} swing misses", entity));
                }
            }
            Some(PhaseEvent::Finished) => {
                commands.entity(entity).remove::<MeleeAttackState>();
                // Возобновляем движенческий автомат с того места, которое
                // следует из позиции: на точке — ждём, иначе — идём
                let position = transform.translation.truncate();
                *state = if position.distance(route.target) < ARRIVAL_EPSILON {
                    EnemyState::Waiting {
                        remaining: stats.wait_time,
                    }
                } else {
                    EnemyState::Patrolling
                };
            }
            None => {}
        }
    }
}
