//! Базовые компоненты акторов: Actor, Health, DisplayName

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Категория актора. Spatial queries фильтруют по ней.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Reflect)]
pub enum Category {
    Player,
    Enemy,
}

/// Актор — позиционированное живое существо с идентичностью и жизненным циклом.
#[derive(Component, Debug, Clone, Copy)]
pub struct Actor {
    pub category: Category,
}

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max. Мутируется только центральной
/// `apply_damage` системой; смерть — односторонний идемпотентный переход.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Клампит на нуле: урон поверх смерти — no-op на уровне caller'а
    /// (apply_damage не зовёт take_damage для трупов).
    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }
}

/// Фиксированный набор имён врагов (из оригинального бестиария).
pub const ENEMY_NAMES: [&str; 16] = [
    "Goblin", "Orc", "Troll", "Slime", "Bat", "Spider", "Skeleton", "Ghost",
    "Imp", "Kobold", "Rat", "Wolf", "Bandit", "Thief", "Rogue", "Witch",
];

/// Косметическое имя, выбирается один раз при спавне и не меняется.
#[derive(Component, Debug, Clone)]
pub struct DisplayName(pub String);

impl DisplayName {
    pub fn random(rng: &mut impl Rng) -> Self {
        Self(ENEMY_NAMES[rng.gen_range(0..ENEMY_NAMES.len())].to_string())
    }
}
