//! Spatial Query Service: point-in-time радиальные запросы по акторам.
//!
//! Нет персистентного индекса и кэша — entity count ограничен, линейный
//! проход по актор-запросу каждый тик дешевле поддержки структуры.
//! Чисто наблюдательный модуль, ничего не мутирует.

use bevy::prelude::*;

use crate::components::{Actor, Category, Health};

/// Inclusive-boundary проверка попадания точки в круг.
pub(crate) fn within_radius(center: Vec2, point: Vec2, radius: f32) -> bool {
    center.distance_squared(point) <= radius * radius
}

/// Все живые акторы категории `category`, чья позиция лежит в `radius`
/// от `center` (граница включительно). `origin` исключается из результата.
///
/// Результат неупорядочен: callers не должны зависеть от порядка для
/// gameplay-решений (урон коммутативен, Health клампит).
pub fn entities_in_radius(
    origin: Option<Entity>,
    center: Vec2,
    radius: f32,
    category: Category,
    actors: &Query<(Entity, &Actor, &Transform, &Health)>,
) -> Vec<Entity> {
    let mut found = Vec::new();

    for (entity, actor, transform, health) in actors.iter() {
        if Some(entity) == origin {
            continue;
        }
        if actor.category != category {
            continue;
        }
        // Только живые: мёртвые отфильтрованы уже здесь, caller'у не нужен
        // повторный liveness-чек для чтения
        if !health.is_alive() {
            continue;
        }
        if within_radius(center, transform.translation.truncate(), radius) {
            found.push(entity);
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_is_inclusive() {
        let center = Vec2::ZERO;
        assert!(within_radius(center, Vec2::new(1.2, 0.0), 1.2));
        assert!(within_radius(center, Vec2::new(0.5, 0.0), 1.2));
        assert!(!within_radius(center, Vec2::new(1.2001, 0.0), 1.2));
    }

    #[test]
    fn test_radius_check_is_euclidean() {
        // (0.9, 0.9) лежит дальше 1.2 (дистанция ≈ 1.27)
        assert!(!within_radius(Vec2::ZERO, Vec2::new(0.9, 0.9), 1.2));
        // (0.8, 0.8) ближе (≈ 1.13)
        assert!(within_radius(Vec2::ZERO, Vec2::new(0.8, 0.8), 1.2));
    }
}
