//! Патрульный автомат врага: Patrolling / Waiting / Attacking / Dead.
//!
//! Patrol-цели выбираются вслепую внутри `patrol_radius` от точки спавна
//! (никакого pathfinding). Новая цель всегда считается от home, не от
//! предыдущей цели — дрейф не накапливается.

use bevy::prelude::*;
use rand::Rng;

use crate::combat::Dead;
use crate::components::{Actor, Category, Facing, Health};
use crate::spatial::entities_in_radius;
use crate::{log, DeterministicRng};

use super::melee::MeleeAttackState;

/// Дистанция, на которой patrol-цель считается достигнутой.
pub const ARRIVAL_EPSILON: f32 = 0.1;

/// Состояние автомата врага. Ровно одно активно; Dead терминален.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub enum EnemyState {
    /// Движемся к текущей patrol-цели
    Patrolling,

    /// Стоим на точке, ждём таймер перед выбором новой цели
    Waiting { remaining: f32 },

    /// Атакуем игрока (фазы в MeleeAttackState)
    Attacking,

    /// Мёртв. Поглощающее состояние, переходов наружу нет.
    Dead,
}

impl Default for EnemyState {
    fn default() -> Self {
        Self::Patrolling
    }
}

impl EnemyState {
    pub fn tag(&self) -> &'static str {
        match self {
            EnemyState::Patrolling => "patrolling",
            EnemyState::Waiting { .. } => "waiting",
            EnemyState::Attacking => "attacking",
            EnemyState::Dead => "dead",
        }
    }
}

/// Параметры врага (скорость, радиусы, тайминги атаки).
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct EnemyStats {
    /// Скорость патруля (м/с)
    pub move_speed: f32,
    /// Радиус выбора patrol-целей вокруг точки спавна (м)
    pub patrol_radius: f32,
    /// Пауза на достигнутой точке (сек)
    pub wait_time: f32,
    /// Радиус атаки; он же — радиус attack-триггера (м)
    pub attack_range: f32,
    /// Урон одной атаки
    pub attack_damage: u32,
    /// Длительность wind-up фазы (сек)
    pub windup: f32,
    /// Длительность recovery фазы (сек)
    pub recovery: f32,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            move_speed: 2.0,
            patrol_radius: 3.0,
            wait_time: 2.0,
            attack_range: 1.0,
            attack_damage: 10,
            windup: 0.2,
            recovery: 0.3,
        }
    }
}

/// Patrol-маршрут: home фиксирован при спавне, target перевыбирается
/// при каждом истечении Waiting.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct PatrolRoute {
    pub home: Vec2,
    pub target: Vec2,
}

/// Равномерная точка в единичном диске (sqrt-семплинг по радиусу).
pub fn random_in_unit_disc(rng: &mut impl Rng) -> Vec2 {
    let r = rng.gen::<f32>().sqrt();
    let theta = rng.gen_range(0.0..std::f32::consts::TAU);
    Vec2::new(theta.cos(), theta.sin()) * r
}

/// Система: движение в Patrolling
///
/// Шаг к цели с клампом на overshoot (MoveTowards-семантика), обновление
/// Facing. В пределах ARRIVAL_EPSILON от цели — переход в Waiting.
pub fn patrol_movement(
    mut enemies: Query<
        (
            &mut Transform,
            &mut Facing,
            &mut EnemyState,
            &EnemyStats,
            &PatrolRoute,
        ),
        Without<Dead>,
    >,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (mut transform, mut facing, mut state, stats, route) in enemies.iter_mut() {
        if *state != EnemyState::Patrolling {
            continue;
        }

        let position = transform.translation.truncate();
        let to_target = route.target - position;
        let distance = to_target.length();

        if distance < ARRIVAL_EPSILON {
            *state = EnemyState::Waiting {
                remaining: stats.wait_time,
            };
            continue;
        }

        let step = stats.move_speed * delta;
        let new_position = if step >= distance {
            route.target
        } else {
            position + to_target / distance * step
        };

        if (new_position.x - position.x).abs() > f32::EPSILON {
            facing.left = new_position.x < position.x;
        }
        transform.translation = new_position.extend(0.0);
    }
}

/// Система: отсчёт Waiting и редро patrol-цели
///
/// По истечении таймера новая цель берётся внутри patrol_radius от home.
/// Урон этот переход не прерывает — damage-путь ортогонален.
pub fn waiting_countdown(
    mut enemies: Query<(&mut EnemyState, &mut PatrolRoute, &EnemyStats), Without<Dead>>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (mut state, mut route, stats) in enemies.iter_mut() {
        let EnemyState::Waiting { remaining } = *state else {
            continue;
        };

        let remaining = remaining - delta;
        if remaining <= 0.0 {
            // Всегда от home, не от предыдущей цели
            route.target = route.home + random_in_unit_disc(&mut rng.rng) * stats.patrol_radius;
            *state = EnemyState::Patrolling;
        } else {
            *state = EnemyState::Waiting { remaining };
        }
    }
}

/// Система: proximity-триггер атаки
///
/// Живой игрок внутри attack-триггера (радиус = attack_range) переводит
/// врага в Attacking и вешает MeleeAttackState в фазе WindUp. Пока атака
/// в полёте, повторные overlap'ы игнорируются (re-entry guard — проверка
/// состояния Attacking).
pub fn attack_trigger(
    mut commands: Commands,
    mut enemies: Query<(Entity, &Transform, &EnemyStats, &mut EnemyState), Without<Dead>>,
    actors: Query<(Entity, &Actor, &Transform, &Health)>,
) {
    for (entity, transform, stats, mut state) in enemies.iter_mut() {
        if matches!(*state, EnemyState::Attacking | EnemyState::Dead) {
            continue;
        }

        let position = transform.translation.truncate();
        let players = entities_in_radius(
            Some(entity),
            position,
            stats.attack_range,
            Category::Player,
            &actors,
        );

        if let Some(&target) = players.first() {
            *state = EnemyState::Attacking;
            commands
                .entity(entity)
                .insert(MeleeAttackState::wind_up(stats.windup, target));
            log(&format!(
                "⚔️ Enemy {:?} starts attack (windup {:.2}s)",
                entity, stats.windup
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_unit_disc_sampling_is_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..1000 {
            let point = random_in_unit_disc(&mut rng);
            assert!(point.length() <= 1.0 + 1e-6, "point {:?} outside disc", point);
        }
    }

    #[test]
    fn test_patrol_targets_anchor_to_home() {
        // Редро цели всегда от home — дрейф не накапливается
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let home = Vec2::new(10.0, -3.0);
        let radius = 3.0;

        let mut target = home;
        for _ in 0..500 {
            target = home + random_in_unit_disc(&mut rng) * radius;
            assert!(
                home.distance(target) <= radius + 1e-4,
                "target {:?} drifted beyond {} of home",
                target,
                radius
            );
        }

        let _ = target;
    }

    #[test]
    fn test_waiting_timer_logic() {
        let mut state = EnemyState::Waiting { remaining: 2.0 };
        let delta = 0.5;

        for expected in [1.5, 1.0, 0.5] {
            if let EnemyState::Waiting { remaining } = state {
                state = EnemyState::Waiting {
                    remaining: remaining - delta,
                };
                let EnemyState::Waiting { remaining } = state else {
                    unreachable!()
                };
                assert!((remaining - expected).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_state_tags() {
        assert_eq!(EnemyState::Patrolling.tag(), "patrolling");
        assert_eq!(EnemyState::Waiting { remaining: 1.0 }.tag(), "waiting");
        assert_eq!(EnemyState::Attacking.tag(), "attacking");
        assert_eq!(EnemyState::Dead.tag(), "dead");
    }
}
