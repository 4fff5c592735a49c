//! Boss events

use bevy::prelude::*;

use super::components::{AttackEffect, BossStateKind};

#[derive(Event, Debug, Clone, PartialEq)]
pub struct BossStateChanged {
    pub boss: Entity,
    pub from: BossStateKind,
    pub to: BossStateKind,
}

/// Удар случился (animation event внутри своего паттерна)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct BossAttackFired {
    pub boss: Entity,
    pub pattern: usize,
    pub name: String,
    pub effect: AttackEffect,
    /// Только для area-паттернов: была ли цель внутри области
    pub target_hit: Option<bool>,
}
