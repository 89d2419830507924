//! Damage pipeline: MeleeHit → Health → события наружу.
//!
//! Health — единственный shared-state, который мутируют разные акторы
//! (игрок бьёт врагов, враги бьют игрока). Дисциплина: клампящая мутация
//! плюс liveness guard перед ней; порядок применения в пределах тика
//! не влияет на результат.

use bevy::prelude::*;

use crate::behavior::{EnemyState, MeleeAttackState};
use crate::combat::player::PlayerAttackState;
use crate::components::{DisplayName, Health, Velocity};
use crate::log;

/// Grace-задержка перед деспавном мёртвой entity (сек) — даёт transient
/// визуалу дожить.
pub const DESPAWN_GRACE: f32 = 0.1;

/// Событие-намерение: нанести урон. Потребляется apply_damage в этом же
/// тике, нигде не хранится.
#[derive(Event, Debug, Clone)]
pub struct MeleeHit {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
    pub source_position: Vec2,
}

/// Событие: урон применён (для presentation collaborator).
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
    pub source_position: Vec2,
    pub target_died: bool,
}

/// Событие: здоровье изменилось (числа для health readout).
#[derive(Event, Debug, Clone)]
pub struct HealthChanged {
    pub entity: Entity,
    pub current: u32,
    pub max: u32,
}

/// Событие: entity умерла. Генерируется ровно один раз на entity.
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Маркер: entity мертва. Терминален; все системы с таймерами фильтруют
/// по Without<Dead> — "отмена" in-flight таймеров.
#[derive(Component, Debug, Default)]
pub struct Dead;

/// Отложенный деспавн после смерти.
#[derive(Component, Debug, Clone, Copy)]
pub struct DespawnAfter {
    pub remaining: f32,
}

impl DespawnAfter {
    pub fn new(delay: f32) -> Self {
        Self { remaining: delay }
    }

    /// true когда таймер истёк. Неположительная задержка истекает на
    /// первом же тике.
    pub fn tick(&mut self, delta: f32) -> bool {
        self.remaining -= delta;
        self.remaining <= 0.0
    }
}

/// Система: применение урона (единственная точка мутации Health)
///
/// 1. Цель без Health или уже удалена — промах, молча; остальные цели
///    той же активации не затрагиваются.
/// 2. Мёртвая цель — no-op (double-death не ошибка, EntityDied не
///    перегенерируется).
/// 3. Иначе: clamped мутация + HealthChanged + DamageDealt; на переходе
///    living → dead — один EntityDied.
pub fn apply_damage(
    mut hit_events: EventReader<MeleeHit>,
    mut damage_events: EventWriter<DamageDealt>,
    mut health_events: EventWriter<HealthChanged>,
    mut died_events: EventWriter<EntityDied>,
    mut targets: Query<(&mut Health, Option<&DisplayName>)>,
) {
    for hit in hit_events.read() {
        let Ok((mut health, name)) = targets.get_mut(hit.target) else {
            // Цель исчезла между триггером и разрешением — промах, не ошибка
            continue;
        };

        // Liveness guard: трупы урон не получают
        if !health.is_alive() {
            continue;
        }

        health.take_damage(hit.damage);
        let died = !health.is_alive();

        health_events.write(HealthChanged {
            entity: hit.target,
            current: health.current,
            max: health.max,
        });
        damage_events.write(DamageDealt {
            attacker: hit.attacker,
            target: hit.target,
            damage: hit.damage,
            source_position: hit.source_position,
            target_died: died,
        });

        if died {
            died_events.write(EntityDied {
                entity: hit.target,
                killer: Some(hit.attacker),
            });
            log(&format!(
                "💀 {} {:?} killed by {:?}",
                name.map(|n| n.0.as_str()).unwrap_or("entity"),
                hit.target,
                hit.attacker
            ));
        }
    }
}

/// Система: обработка смерти
///
/// Переводит автомат врага в Dead, снимает in-flight атаки, глушит
/// velocity и вешает Dead + grace-деспавн. Идемпотентна: EntityDied
/// приходит один раз, а повторный insert тех же маркеров — no-op.
pub fn handle_death(
    mut commands: Commands,
    mut died_events: EventReader<EntityDied>,
    mut bodies: Query<(Option<&mut EnemyState>, Option<&mut Velocity>)>,
) {
    for event in died_events.read() {
        if let Ok((enemy_state, velocity)) = bodies.get_mut(event.entity) {
            if let Some(mut state) = enemy_state {
                *state = EnemyState::Dead;
            }
            if let Some(mut velocity) = velocity {
                velocity.0 = Vec2::ZERO;
            }
        }

        if let Ok(mut entity_commands) = commands.get_entity(event.entity) {
            entity_commands
                .remove::<MeleeAttackState>()
                .remove::<PlayerAttackState>()
                .insert(Dead)
                .insert(DespawnAfter::new(DESPAWN_GRACE));
        }
    }
}

/// Система: grace-деспавн мёртвых entity
pub fn despawn_after_timeout(
    mut commands: Commands,
    mut pending: Query<(Entity, &mut DespawnAfter)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut despawn) in pending.iter_mut() {
        if despawn.tick(delta) {
            commands.entity(entity).despawn();
            log(&format!("✅ Entity {:?} despawned after grace delay", entity));
        }
    }
}
