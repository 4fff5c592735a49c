//! Boss domain — FSM атакующего босса
//!
//! Босс не знает про урон: FSM отвечает за выбор паттерна и тайминги,
//! удары приходят animation events (`TimelineCue::BossStrike`) и
//! превращаются в `BossAttackFired`.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod state_machine;
pub mod systems;


pub use components::{
    AttackEffect, AttackPattern, Boss, BossConfig, BossState, BossStateKind, BossTarget,
};
pub use events::{BossAttackFired, BossStateChanged};
pub use state_machine::{draw_pattern, sweep_hits, BossBrain, BossTickOutput};

use crate::animation::TimelineInbox;
use crate::SimSet;

pub fn boss_bundle(position: Vec3, config: &BossConfig, target: Option<Entity>) -> impl Bundle {
    (
        Boss,
        Transform::from_translation(position),
        BossBrain::new(config.clone()),
        BossTarget(target),
        TimelineInbox::default(),
    )
}

pub fn spawn_boss(
    commands: &mut Commands,
    position: Vec3,
    config: &BossConfig,
    target: Option<Entity>,
) -> Entity {
    let entity = commands.spawn(boss_bundle(position, config, target)).id();
    crate::log(&format!(
        "🤖 Boss spawned: {:?} at {:?} ({} patterns)",
        entity,
        position,
        config.patterns.len()
    ));
    entity
}

pub struct BossPlugin;

impl Plugin for BossPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<BossStateChanged>()
            .add_event::<BossAttackFired>()
            .add_systems(FixedUpdate, systems::tick_bosses.in_set(SimSet::Enemies));
    }
}
