//! Player combat controller: движение + автомат атаки Idle → Active →
//! CoolingDown.
//!
//! Движение НЕ приостанавливается на время атаки — оригинальное
//! поведение не гейтило локомоцию по attack-state, мы сохраняем это как
//! осознанное решение (см. DESIGN.md).

use bevy::prelude::*;

use crate::combat::damage::{Dead, MeleeHit};
use crate::components::{Actor, Category, Facing, Health, Velocity};
use crate::log;
use crate::spatial::entities_in_radius;

/// Маркер игрока.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Параметры игрока.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PlayerStats {
    /// Целевая скорость движения (м/с)
    pub move_speed: f32,
    /// Коэффициент экспоненциального сглаживания velocity (1/с)
    pub acceleration: f32,
    /// Радиус радиальной атаки (м)
    pub attack_range: f32,
    /// Урон одной атаки (каждой цели)
    pub attack_damage: u32,
    /// Полный cooldown атаки (сек)
    pub attack_cooldown: f32,
    /// Длительность Active-фазы (сек), ≤ attack_cooldown
    pub active_duration: f32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            acceleration: 50.0,
            attack_range: 1.2,
            attack_damage: 20,
            attack_cooldown: 0.3,
            active_duration: 0.2,
        }
    }
}

/// Input collaborator: заполняется хостом каждый тик. attack_pressed —
/// edge-triggered (не held) и потребляется контроллером.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct PlayerInput {
    pub axis: Vec2,
    pub attack_pressed: bool,
}

/// Событие: атака выполнена (для презентации — жёлтый flash).
#[derive(Event, Debug, Clone)]
pub struct AttackPerformed {
    pub entity: Entity,
}

/// Фаза атаки игрока с остаточным таймером.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerAttackPhase {
    Active { remaining: f32 },
    CoolingDown { remaining: f32 },
}

impl PlayerAttackPhase {
    pub fn remaining(&self) -> f32 {
        match self {
            PlayerAttackPhase::Active { remaining }
            | PlayerAttackPhase::CoolingDown { remaining } => *remaining,
        }
    }
}

/// Состояние атаки. Отсутствие компонента = Idle; новая атака допустима
/// только из Idle.
#[derive(Component, Debug, Clone)]
pub struct PlayerAttackState {
    pub phase: PlayerAttackPhase,
}

impl PlayerAttackState {
    pub fn begin(active_duration: f32) -> Self {
        Self {
            phase: PlayerAttackPhase::Active {
                remaining: active_duration,
            },
        }
    }

    pub fn tag(&self) -> &'static str {
        match self.phase {
            PlayerAttackPhase::Active { .. } => "attack_active",
            PlayerAttackPhase::CoolingDown { .. } => "attack_cooldown",
        }
    }

    /// Продвигает таймер фазы. true — атака завершена (cooldown вышел),
    /// компонент пора снимать. CoolingDown = attack_cooldown −
    /// active_duration, клампится в ноль (истекает немедленно).
    pub fn tick(&mut self, delta: f32, attack_cooldown: f32, active_duration: f32) -> bool {
        match self.phase {
            PlayerAttackPhase::Active { remaining } => {
                let remaining = remaining - delta;
                if remaining <= 0.0 {
                    self.phase = PlayerAttackPhase::CoolingDown {
                        remaining: (attack_cooldown - active_duration).max(0.0),
                    };
                } else {
                    self.phase = PlayerAttackPhase::Active { remaining };
                }
                false
            }
            PlayerAttackPhase::CoolingDown { remaining } => {
                let remaining = remaining - delta;
                if remaining <= 0.0 {
                    true
                } else {
                    self.phase = PlayerAttackPhase::CoolingDown { remaining };
                    false
                }
            }
        }
    }
}

/// Система: интеграция движения
///
/// Экспоненциальное сглаживание velocity к axis * move_speed (critically
/// damped approach, без мгновенных разворотов), затем интеграция в
/// transform. Работает и во время атаки.
pub fn player_movement(
    mut players: Query<
        (&mut Transform, &mut Velocity, &mut Facing, &PlayerStats),
        (With<Player>, Without<Dead>),
    >,
    input: Res<PlayerInput>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (mut transform, mut velocity, mut facing, stats) in players.iter_mut() {
        let target = input.axis.normalize_or_zero() * stats.move_speed;
        let blend = (stats.acceleration * delta).min(1.0);

        velocity.0 = velocity.0.lerp(target, blend);
        transform.translation += (velocity.0 * delta).extend(0.0);

        if velocity.0.x.abs() > 0.01 {
            facing.left = velocity.0.x < 0.0;
        }
    }
}

/// Система: запуск атаки
///
/// Edge-triggered: флаг потребляется независимо от исхода. Из Idle —
/// немедленный радиальный запрос к spatial service и по одному MeleeHit
/// каждому живому врагу в радиусе (multi-hit, без ограничения на одну
/// цель). Запрос во время Attacking отклоняется.
pub fn player_attack(
    mut input: ResMut<PlayerInput>,
    mut commands: Commands,
    players: Query<
        (Entity, &Transform, &PlayerStats, Option<&PlayerAttackState>),
        (With<Player>, Without<Dead>),
    >,
    actors: Query<(Entity, &Actor, &Transform, &Health)>,
    mut hits: EventWriter<MeleeHit>,
    mut performed: EventWriter<AttackPerformed>,
) {
    if !std::mem::take(&mut input.attack_pressed) {
        return;
    }

    for (entity, transform, stats, attacking) in players.iter() {
        if attacking.is_some() {
            log("Attack request rejected: still attacking");
            continue;
        }

        let position = transform.translation.truncate();
        commands
            .entity(entity)
            .insert(PlayerAttackState::begin(stats.active_duration));
        performed.write(AttackPerformed { entity });

        let enemies = entities_in_radius(
            Some(entity),
            position,
            stats.attack_range,
            Category::Enemy,
            &actors,
        );
        log(&format!(
            "⚔️ Player attack: {} enemies in range",
            enemies.len()
        ));

        for target in enemies {
            hits.write(MeleeHit {
                attacker: entity,
                target,
                damage: stats.attack_damage,
                source_position: position,
            });
        }
    }
}

/// Система: таймеры Active / CoolingDown
pub fn update_player_attack_phases(
    mut commands: Commands,
    mut players: Query<(Entity, &mut PlayerAttackState, &PlayerStats), Without<Dead>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut attack, stats) in players.iter_mut() {
        if attack.tick(delta, stats.attack_cooldown, stats.active_duration) {
            commands.entity(entity).remove::<PlayerAttackState>();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_attack_rejected_until_cooldown_ends() {
        // cooldown 0.3, active 0.2: запрос в t=0.25 отклонён (ещё Attacking),
        // в t=0.35 принят (уже Idle)
        let mut attack = PlayerAttackState::begin(0.2);

        // t = 0.25: Active истёк, CoolingDown ещё идёт → компонент на месте
        assert!(!attack.tick(0.25, 0.3, 0.2));
        assert!(matches!(
            attack.phase,
            PlayerAttackPhase::CoolingDown { .. }
        ));

        // t = 0.35: cooldown вышел → компонент снимается, атака снова доступна
        assert!(attack.tick(0.1, 0.3, 0.2));
    }

    #[test]
    fn test_cooldown_shorter_than_active_clamps_to_zero() {
        let mut attack = PlayerAttackState::begin(0.2);
        assert!(!attack.tick(0.2, 0.1, 0.2));

        let PlayerAttackPhase::CoolingDown { remaining } = attack.phase else {
            panic!("expected CoolingDown");
        };
        assert_eq!(remaining, 0.0);

        // Нулевой cooldown истекает на первом же тике
        assert!(attack.tick(1.0 / 60.0, 0.1, 0.2));
    }

    #[test]
    fn test_phase_tags() {
        let mut attack = PlayerAttackState::begin(0.2);
        assert_eq!(attack.tag(), "attack_active");

        attack.tick(0.25, 0.3, 0.2);
        assert_eq!(attack.tag(), "attack_cooldown");
    }

    #[test]
    fn test_velocity_smoothing_approaches_target() {
        // Сглаживание: velocity асимптотически приближается к axis * speed
        let stats = PlayerStats::default();
        let delta = 1.0 / 60.0;
        let target = Vec2::X * stats.move_speed;

        let mut velocity = Vec2::ZERO;
        for _ in 0..60 {
            let blend = (stats.acceleration * delta).min(1.0);
            velocity = velocity.lerp(target, blend);
        }

        assert!((velocity - target).length() < 0.01);
    }
}
