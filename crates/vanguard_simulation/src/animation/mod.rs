//! Animation bridge — граница с анимационной системой хоста
//!
//! Симуляция не анимирует сама. Связь двусторонняя и узкая:
//! - наружу: `AnimationRequest` (триггеры) + `AnimatorParams` (проекция MotionState)
//! - внутрь: `AnimatorPlayback` (poll: текущий state + normalized time)
//!   и `TimelineInbox` (callbacks таймлайна: slide enter/exit, checkpoints, steps, boss strikes)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::player::MotionState;
use crate::SimClock;

/// Write-only команды аниматору
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationCommand {
    /// Reset trigger + JumpIndex = stage + trigger Jump
    Jump { stage: u8 },
    ResetJumpIndex,
    Slide,
    PlayAttack,
    /// Вернуть аниматор в idle, сбросить отложенные триггеры атаки
    StopAttack,
    IdleAlt,
    /// Именованный trigger босса (Idle, DoSweep, Overheat, …)
    Trigger(String),
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct AnimationRequest {
    pub entity: Entity,
    pub command: AnimationCommand,
}

/// Callbacks таймлайна (порядок вызова задаёт хост: checkpoint 1 → 2 → complete)
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineCue {
    /// Вход в slide state; `None` → направление, захваченное при запросе slide
    SlideEnter { direction: Option<Vec3> },
    SlideExit,
    ComboCheckpoint { section: usize },
    ComboComplete,
    StrikeStep { index: usize },
    BossStrike { pattern: usize },
}

/// Очередь cues, которую хост заполняет между тиками
#[derive(Component, Debug, Clone, Default)]
pub struct TimelineInbox {
    cues: Vec<TimelineCue>,
}

impl TimelineInbox {
    pub fn push(&mut self, cue: TimelineCue) {
        self.cues.push(cue);
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn drain(&mut self) -> Vec<TimelineCue> {
        std::mem::take(&mut self.cues)
    }
}

/// Poll текущего состояния аниматора (base layer)
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct AnimatorPlayback {
    pub state_name: String,
    pub normalized_time: f32,
}

/// Параметры аниматора, выведенные из MotionState (read-only проекция)
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AnimatorParams {
    pub is_moving: bool,
    pub is_sliding: bool,
    pub is_grounded: bool,
    pub is_jumping: bool,
    pub run_speed: f32,
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub idle_alt_interval: f32,
    pub base_idle_state: String,
    pub fast_run_speed: f32,
    pub run_speed: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            idle_alt_interval: 5.0,
            base_idle_state: "Idle".to_string(),
            fast_run_speed: 1.2,
            run_speed: 1.0,
        }
    }
}

impl AnimatorParams {
    pub fn project(motion: &MotionState, config: &AnimationConfig) -> Self {
        Self {
            is_moving: motion.is_moving(),
            is_sliding: motion.is_sliding(),
            is_grounded: motion.is_grounded(),
            is_jumping: motion.is_jumping(),
            run_speed: if motion.is_fast_run() {
                config.fast_run_speed
            } else {
                config.run_speed
            },
        }
    }
}

/// Idle fidget: после N секунд непрерывного idle в базовом state → IdleAlt
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct IdleFidget {
    is_idle: bool,
    timer: f32,
}

impl IdleFidget {
    /// Любая смена idle-статуса рвёт непрерывность
    pub fn set_idle(&mut self, idle: bool) {
        if self.is_idle == idle {
            return;
        }
        self.is_idle = idle;
        self.timer = 0.0;
    }

    /// Накопление + проверка; true = пора играть IdleAlt (таймер сбрасывается)
    pub fn advance(&mut self, dt: f32, in_base_idle: bool, interval: f32) -> bool {
        if !self.is_idle || !in_base_idle {
            return false;
        }

        self.timer += dt;
        if self.timer < interval {
            return false;
        }

        self.timer = 0.0;
        true
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }
}

/// Система: MotionState → AnimatorParams (WriteBack)
pub fn project_animator_params(
    config: Res<AnimationConfig>,
    mut query: Query<(&MotionState, &mut AnimatorParams)>,
) {
    for (motion, mut params) in query.iter_mut() {
        let projected = AnimatorParams::project(motion, &config);
        if *params != projected {
            *params = projected;
        }
    }
}

/// Система: idle fidget (WriteBack)
pub fn update_idle_fidget(
    config: Res<AnimationConfig>,
    clock: Res<SimClock>,
    mut query: Query<(Entity, &MotionState, &AnimatorPlayback, &mut IdleFidget)>,
    mut animations: EventWriter<AnimationRequest>,
) {
    for (entity, motion, playback, mut fidget) in query.iter_mut() {
        fidget.set_idle(motion.is_idle());

        let in_base_idle = playback.state_name == config.base_idle_state;
        if fidget.advance(clock.delta, in_base_idle, config.idle_alt_interval) {
            crate::log(&format!("🥱 {:?}: idle fidget", entity));
            animations.write(AnimationRequest {
                entity,
                command: AnimationCommand::IdleAlt,
            });
        }
    }
}
