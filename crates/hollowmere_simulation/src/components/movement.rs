//! Movement компоненты: скорость и направление взгляда

use bevy::prelude::*;

/// Текущая скорость актора (м/с). Игрок интегрирует её со сглаживанием,
/// враги двигаются напрямую по transform (MoveTowards-семантика).
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Velocity(pub Vec2);

/// Направление взгляда (флип спрайта). Чисто косметика, обновляется
/// из горизонтального движения.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Facing {
    pub left: bool,
}
