//! Damage Feedback Presenter: transient-визуал, управляемый событиями.
//!
//! Потребляет DamageDealt / AttackPerformed / HealthChanged и ведёт
//! самозавершающиеся косметические элементы: flash-подкраску, всплывающие
//! числа урона, health readout. На gameplay не влияет ничем; таймеры
//! независимы и конкурентны (flash не ставит на паузу атаку и наоборот).
//! Core не форматирует строки — наружу уходят числа и tint-метка,
//! рендер-слой интерпретирует их сам.

use bevy::prelude::*;

use crate::combat::{AttackPerformed, DamageDealt, HealthChanged};
use crate::SimSet;

/// Длительность flash-подкраски (сек).
pub const FLASH_DURATION: f32 = 0.1;
/// Время жизни всплывающего числа урона (сек).
pub const DAMAGE_NUMBER_DURATION: f32 = 0.5;
/// Высота подъёма числа урона за время жизни (м).
pub const DAMAGE_NUMBER_RISE: f32 = 1.0;
/// Сколько readout остаётся видимым после обновления (сек).
pub const HEALTH_READOUT_DURATION: f32 = 3.0;

/// Какой тинт показывает рендер-слой.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashTint {
    /// Получен урон (красный в референс-рендере)
    Damage,
    /// Атака выполнена (жёлтый)
    Attack,
}

/// Кратковременная подкраска актора. Повторный insert перезапускает таймер.
#[derive(Component, Debug, Clone, Copy)]
pub struct HitFlash {
    pub tint: FlashTint,
    pub remaining: f32,
}

impl HitFlash {
    pub fn damage() -> Self {
        Self {
            tint: FlashTint::Damage,
            remaining: FLASH_DURATION,
        }
    }

    pub fn attack() -> Self {
        Self {
            tint: FlashTint::Attack,
            remaining: FLASH_DURATION,
        }
    }
}

/// Всплывающее число урона: отдельная entity, линейный подъём и линейный
/// fade, самоуничтожение по истечении. Переживает свою цель.
#[derive(Component, Debug, Clone)]
pub struct DamageNumber {
    pub value: u32,
    pub origin: Vec2,
    pub elapsed: f32,
    pub duration: f32,
    pub rise_height: f32,
}

impl DamageNumber {
    pub fn new(value: u32, origin: Vec2) -> Self {
        Self {
            value,
            origin,
            elapsed: 0.0,
            duration: DAMAGE_NUMBER_DURATION,
            rise_height: DAMAGE_NUMBER_RISE,
        }
    }

    /// Нормированный возраст 0..1.
    fn progress(&self) -> f32 {
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Текущая позиция (подъём линеен по времени).
    pub fn position(&self) -> Vec2 {
        self.origin + Vec2::Y * self.rise_height * self.progress()
    }

    /// Текущая прозрачность: 1 при спавне, 0 на излёте.
    pub fn alpha(&self) -> f32 {
        1.0 - self.progress()
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Health readout над врагом: скрыт, пока remaining == 0; каждый
/// HealthChanged обновляет числа и перезапускает таймер показа.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct HealthReadout {
    pub remaining: f32,
    pub current: u32,
    pub max: u32,
}

impl HealthReadout {
    pub fn is_visible(&self) -> bool {
        self.remaining > 0.0
    }

    pub fn refresh(&mut self, current: u32, max: u32) {
        self.current = current;
        self.max = max;
        self.remaining = HEALTH_READOUT_DURATION;
    }
}

/// Система: реакция на применённый урон
///
/// Красный flash на цели + спавн всплывающего числа чуть выше цели.
/// Цель могла уже деспавниться — тогда просто нечего показывать.
pub fn spawn_damage_feedback(
    mut commands: Commands,
    mut damage_events: EventReader<DamageDealt>,
    positions: Query<&Transform>,
) {
    for event in damage_events.read() {
        let Ok(transform) = positions.get(event.target) else {
            continue;
        };
        let origin = transform.translation.truncate() + Vec2::Y * 0.5;

        commands.spawn((
            Transform::from_translation(origin.extend(0.0)),
            DamageNumber::new(event.damage, origin),
        ));

        if let Ok(mut entity_commands) = commands.get_entity(event.target) {
            entity_commands.insert(HitFlash::damage());
        }
    }
}

/// Система: жёлтый flash на атакующем игроке
pub fn attack_feedback(
    mut commands: Commands,
    mut attack_events: EventReader<AttackPerformed>,
) {
    for event in attack_events.read() {
        if let Ok(mut entity_commands) = commands.get_entity(event.entity) {
            entity_commands.insert(HitFlash::attack());
        }
    }
}

/// Система: обновление health readout'ов из HealthChanged
pub fn refresh_health_readouts(
    mut health_events: EventReader<HealthChanged>,
    mut readouts: Query<&mut HealthReadout>,
) {
    for event in health_events.read() {
        // У игрока readout'а нет — молча пропускаем
        let Ok(mut readout) = readouts.get_mut(event.entity) else {
            continue;
        };
        readout.refresh(event.current, event.max);
    }
}

/// Система: таймеры flash — по истечении компонент снимается (цвет
/// вернулся к базовому)
pub fn update_hit_flashes(
    mut commands: Commands,
    mut flashes: Query<(Entity, &mut HitFlash)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut flash) in flashes.iter_mut() {
        flash.remaining -= delta;
        if flash.remaining <= 0.0 {
            commands.entity(entity).remove::<HitFlash>();
        }
    }
}

/// Система: подъём/фейд чисел урона, деспавн истёкших
pub fn update_damage_numbers(
    mut commands: Commands,
    mut numbers: Query<(Entity, &mut DamageNumber, &mut Transform)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut number, mut transform) in numbers.iter_mut() {
        number.elapsed += delta;
        if number.is_expired() {
            commands.entity(entity).despawn();
            continue;
        }
        transform.translation = number.position().extend(0.0);
    }
}

/// Система: автоскрытие health readout'ов
pub fn update_health_readouts(mut readouts: Query<&mut HealthReadout>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for mut readout in readouts.iter_mut() {
        if readout.remaining > 0.0 {
            readout.remaining = (readout.remaining - delta).max(0.0);
        }
    }
}

/// Feedback Plugin. Идёт после combat-систем того же тика, чтобы видеть
/// события до их очистки.
pub struct FeedbackPlugin;

impl Plugin for FeedbackPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                spawn_damage_feedback,
                attack_feedback,
                refresh_health_readouts,
                update_hit_flashes,
                update_damage_numbers,
                update_health_readouts,
            )
                .chain()
                .in_set(SimSet::Feedback),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_number_rises_linearly() {
        let mut number = DamageNumber::new(20, Vec2::ZERO);

        number.elapsed = 0.25; // половина жизни
        assert!((number.position().y - 0.5).abs() < 1e-6);
        assert!((number.alpha() - 0.5).abs() < 1e-6);

        number.elapsed = 0.5;
        assert!(number.is_expired());
        assert_eq!(number.alpha(), 0.0);
    }

    #[test]
    fn test_readout_visibility_window() {
        let mut readout = HealthReadout::default();
        assert!(!readout.is_visible());

        readout.refresh(70, 100);
        assert!(readout.is_visible());
        assert_eq!((readout.current, readout.max), (70, 100));

        readout.remaining = 0.0;
        assert!(!readout.is_visible());
    }

    #[test]
    fn test_refresh_restarts_timer() {
        let mut readout = HealthReadout::default();
        readout.refresh(70, 100);
        readout.remaining = 0.4;

        readout.refresh(50, 100);
        assert_eq!(readout.remaining, HEALTH_READOUT_DURATION);
        assert_eq!(readout.current, 50);
    }
}
