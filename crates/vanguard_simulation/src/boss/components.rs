//! Boss components (config, FSM state, target).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Marker для босса
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Boss;

/// Кого преследует босс; `None` → первый entity с `Player`
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct BossTarget(pub Option<Entity>);

/// Что делает удар в момент animation event (само применение урона — у хоста)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttackEffect {
    /// Box перед боссом: size (x = ширина, y = высота, z = глубина)
    AreaSweep { size: [f32; 3] },
    Shockwave,
    Projectile,
    Beam,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackPattern {
    pub name: String,
    /// Trigger аниматора на входе в состояние
    pub trigger: String,
    /// Секунды до перехода в Recover
    pub duration: f32,
    pub effect: AttackEffect,
}

impl AttackPattern {
    pub fn new(name: &str, trigger: &str, duration: f32, effect: AttackEffect) -> Self {
        Self {
            name: name.to_string(),
            trigger: trigger.to_string(),
            duration,
            effect,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    pub detection_range: f32,
    pub attack_range: f32,
    pub recover_time: f32,
    pub rotation_speed: f32,
    /// Атака только если угол до цели меньше этого (градусы)
    pub facing_threshold_degrees: f32,
    pub idle_trigger: String,
    pub recover_trigger: String,
    pub patterns: Vec<AttackPattern>,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            detection_range: 20.0,
            attack_range: 10.0,
            recover_time: 2.0,
            rotation_speed: 5.0,
            facing_threshold_degrees: 15.0,
            idle_trigger: "Idle".to_string(),
            recover_trigger: "Overheat".to_string(),
            patterns: vec![
                AttackPattern::new("Sweep", "DoSweep", 2.0, AttackEffect::AreaSweep { size: [5.0, 2.0, 3.0] }),
                AttackPattern::new("Clap", "DoClap", 2.0, AttackEffect::Shockwave),
                AttackPattern::new("Missile", "DoMissile", 2.0, AttackEffect::Projectile),
                AttackPattern::new("Laser", "DoLaser", 3.0, AttackEffect::Beam),
            ],
        }
    }
}

/// Состояние FSM босса (таймеры живут внутри варианта)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BossState {
    Idle,
    Tracking,
    Attack { pattern: usize, elapsed: f32 },
    Recover { elapsed: f32 },
}

/// Состояние без таймеров — для событий и логов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BossStateKind {
    Idle,
    Tracking,
    Attack(usize),
    Recover,
}

impl BossState {
    pub fn kind(&self) -> BossStateKind {
        match self {
            BossState::Idle => BossStateKind::Idle,
            BossState::Tracking => BossStateKind::Tracking,
            BossState::Attack { pattern, .. } => BossStateKind::Attack(*pattern),
            BossState::Recover { .. } => BossStateKind::Recover,
        }
    }
}
