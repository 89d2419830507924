//! Hollowmere Simulation Core
//!
//! Headless детерминированная 2D melee-симуляция на Bevy ECS:
//! - Враги патрулируют вокруг точки спавна и атакуют игрока по proximity
//!   (wind-up → commit → recovery)
//! - Игрок интегрирует input со сглаживанием и бьёт радиально по площади
//! - Урон и смерть идут через единый damage pipeline с событиями наружу
//!
//! Центрального планировщика нет: каждый автомат двигается независимо в
//! FixedUpdate (60Hz), корректность interleaving'а — ответственность
//! liveness guard'ов и клампящих мутаций.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

pub mod behavior;
pub mod combat;
pub mod components;
pub mod feedback;
pub mod logger;
pub mod snapshot;
pub mod spatial;

// Re-export базовых типов для удобства
pub use behavior::{
    random_in_unit_disc, AttackPhase, BehaviorPlugin, EnemyState, EnemyStats, MeleeAttackState,
    PatrolRoute, PhaseEvent, ARRIVAL_EPSILON,
};
pub use combat::{
    AttackPerformed, CombatPlugin, DamageDealt, Dead, DespawnAfter, EntityDied, HealthChanged,
    MeleeHit, Player, PlayerAttackPhase, PlayerAttackState, PlayerInput, PlayerStats,
    DESPAWN_GRACE,
};
pub use components::*;
pub use feedback::{
    DamageNumber, FeedbackPlugin, FlashTint, HealthReadout, HitFlash, DAMAGE_NUMBER_DURATION,
    FLASH_DURATION, HEALTH_READOUT_DURATION,
};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel,
    LogPrinter,
};
pub use snapshot::{capture, EntitySnapshot, SimSnapshot};
pub use spatial::entities_in_radius;

/// Частота симуляции (FixedUpdate).
pub const SIM_HZ: f64 = 60.0;

/// Порядок подсистем внутри тика. Между сетами — chain: behavior пишет
/// MeleeHit, combat их применяет, feedback видит события того же тика.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    Behavior,
    Combat,
    Feedback,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(SIM_HZ))
            .init_resource::<PlayerInput>()
            .configure_sets(
                FixedUpdate,
                (SimSet::Behavior, SimSet::Combat, SimSet::Feedback).chain(),
            )
            .add_plugins((BehaviorPlugin, CombatPlugin, FeedbackPlugin));

        // Seed по умолчанию, если хост не вставил свой
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }
    }
}

/// Детерминистичный RNG resource (seeded). Единственный источник
/// случайности: patrol-цели и имена врагов берутся отсюда, тесты сидят
/// его явно.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции.
///
/// Часы двигаются вручную (`TimeUpdateStrategy::ManualDuration`): каждый
/// `app.update()` — ровно один тик 1/60s, без привязки к wall-clock.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();

    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / SIM_HZ,
        )))
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(SIM_HZ));

    app
}

/// Spawn helper: игрок с полным набором компонентов.
pub fn spawn_player(world: &mut World, position: Vec2) -> Entity {
    world
        .spawn((
            Transform::from_translation(position.extend(0.0)),
            Actor {
                category: Category::Player,
            },
            Player,
            Health::new(100),
            PlayerStats::default(),
            Velocity::default(),
            Facing::default(),
        ))
        .id()
}

/// Spawn helper: враг. Имя и первая patrol-цель берутся из
/// DeterministicRng в момент спавна (имя больше не меняется).
pub fn spawn_enemy(world: &mut World, position: Vec2) -> Entity {
    let stats = EnemyStats::default();
    let (name, target) = {
        let mut rng = world.resource_mut::<DeterministicRng>();
        let name = DisplayName::random(&mut rng.rng);
        let target = position + random_in_unit_disc(&mut rng.rng) * stats.patrol_radius;
        (name, target)
    };

    log(&format!("Spawned enemy \"{}\" at {:?}", name.0, position));

    world
        .spawn((
            Transform::from_translation(position.extend(0.0)),
            Actor {
                category: Category::Enemy,
            },
            Health::new(100),
            stats,
            EnemyState::Patrolling,
            PatrolRoute {
                home: position,
                target,
            },
            name,
            Facing::default(),
            HealthReadout::default(),
        ))
        .id()
}
