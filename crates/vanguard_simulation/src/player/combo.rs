//! ComboController — до трёх ударов с буфером ввода
//!
//! Idle → Active(1) → Active(2) → Active(3) → Idle.
//! Направление фиксируется по камере в момент первого удара и держится
//! до конца серии (шаги и поворот используют только его).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::locomotion::LocomotionController;
use super::motion_state::MotionState;
use crate::camera::CameraView;
use crate::physics::CollisionWorld;
use crate::shared::flat_direction;

/// Что делать с jump/slide, пока combo держит movement lock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComboCancelPolicy {
    /// Jump/slide игнорируются до конца серии
    #[default]
    BlockActions,
    /// Jump/slide обрывают серию и выполняются
    CancelCombo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboConfig {
    pub input_window: f32,
    pub max_strikes: u8,
    /// Шаг вперёд на каждом ударе (индекс = номер удара)
    pub step_distances: Vec<f32>,
    pub cancel_policy: ComboCancelPolicy,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            input_window: 1.0,
            max_strikes: 3,
            step_distances: vec![0.15, 0.2, 0.25],
            cancel_policy: ComboCancelPolicy::BlockActions,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComboSequenceState {
    pub input_count: u8,
    pub last_input_time: f32,
    /// Zero = направления нет, шаги и поворот пропускаются
    pub cached_direction: Vec3,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComboInputOutcome {
    Started { direction: Option<Vec3> },
    Buffered { count: u8 },
    IgnoredAtMax,
    IgnoredOutsideWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointOutcome {
    Advance,
    EndedInsufficientInput,
    EndedWindowExpired,
    /// Секция за пределами max strikes: ничего не трогаем, не продвигаемся
    InvalidSection,
    /// Серии нет (запоздалый cue после отмены): StopAttack не нужен
    Inactive,
}

impl CheckpointOutcome {
    pub fn advances(&self) -> bool {
        matches!(self, CheckpointOutcome::Advance)
    }

    pub fn ended_sequence(&self) -> bool {
        matches!(
            self,
            CheckpointOutcome::EndedInsufficientInput | CheckpointOutcome::EndedWindowExpired
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSkip {
    NoDirection,
    InvalidIndex(usize),
}

#[derive(Component, Debug, Clone, Default)]
pub struct ComboController {
    pub config: ComboConfig,
    sequence: ComboSequenceState,
}

impl ComboController {
    pub fn new(config: ComboConfig) -> Self {
        Self {
            config,
            sequence: ComboSequenceState::default(),
        }
    }

    pub fn sequence(&self) -> &ComboSequenceState {
        &self.sequence
    }

    pub fn is_active(&self) -> bool {
        self.sequence.active
    }

    pub fn on_attack_input(
        &mut self,
        now: f32,
        camera: Option<&CameraView>,
        motion: &mut MotionState,
    ) -> ComboInputOutcome {
        if !self.sequence.active {
            let direction = camera.and_then(|camera| flat_direction(camera.forward));
            self.sequence = ComboSequenceState {
                input_count: 1,
                last_input_time: now,
                cached_direction: direction.unwrap_or(Vec3::ZERO),
                active: true,
            };
            motion.report_combat(true);
            return ComboInputOutcome::Started { direction };
        }

        if now - self.sequence.last_input_time > self.config.input_window {
            return ComboInputOutcome::IgnoredOutsideWindow;
        }

        if self.sequence.input_count >= self.config.max_strikes {
            return ComboInputOutcome::IgnoredAtMax;
        }

        self.sequence.input_count += 1;
        self.sequence.last_input_time = now;
        ComboInputOutcome::Buffered {
            count: self.sequence.input_count,
        }
    }

    /// Checkpoint `section` требует `section + 1` буферизованных ударов
    pub fn on_checkpoint(&mut self, section: usize, now: f32, motion: &mut MotionState) -> CheckpointOutcome {
        if section >= self.config.max_strikes as usize {
            return CheckpointOutcome::InvalidSection;
        }

        if !self.sequence.active {
            return CheckpointOutcome::Inactive;
        }

        let required = section + 1;
        if (self.sequence.input_count as usize) < required {
            self.force_end(motion);
            return CheckpointOutcome::EndedInsufficientInput;
        }

        if now - self.sequence.last_input_time > self.config.input_window {
            self.force_end(motion);
            return CheckpointOutcome::EndedWindowExpired;
        }

        CheckpointOutcome::Advance
    }

    /// Конец анимации серии; true если серия была активна
    pub fn on_sequence_complete(&mut self, motion: &mut MotionState) -> bool {
        self.force_end(motion)
    }

    pub fn cancel(&mut self, motion: &mut MotionState) -> bool {
        self.force_end(motion)
    }

    fn force_end(&mut self, motion: &mut MotionState) -> bool {
        let was_active = self.sequence.active;
        self.sequence = ComboSequenceState::default();
        motion.report_combat(false);
        was_active
    }

    pub fn step_displacement(&self, strike_index: usize) -> Result<Vec3, StepSkip> {
        let distance = self
            .config
            .step_distances
            .get(strike_index)
            .copied()
            .ok_or(StepSkip::InvalidIndex(strike_index))?;

        if self.sequence.cached_direction == Vec3::ZERO {
            return Err(StepSkip::NoDirection);
        }

        Ok(self.sequence.cached_direction * distance)
    }

    /// Root motion шага: идёт мимо movement lock
    pub fn apply_step_displacement(
        &self,
        strike_index: usize,
        locomotion: &mut LocomotionController,
        transform: &mut Transform,
        world: &CollisionWorld,
    ) -> Result<Vec3, StepSkip> {
        let delta = self.step_displacement(strike_index)?;
        locomotion.apply_external_displacement(delta, transform, world);
        Ok(delta)
    }

    /// Направление, куда персонаж обязан смотреть, пока серия активна
    pub fn facing_override(&self) -> Option<Vec3> {
        if !self.sequence.active || self.sequence.cached_direction == Vec3::ZERO {
            return None;
        }
        Some(self.sequence.cached_direction)
    }
}
