//! JumpController — двухступенчатый прыжок с debounce
//!
//! Stage принадлежит только этому контроллеру: растёт в `try_jump`,
//! сбрасывается в `on_landed`, который вызывает LocomotionController
//! ровно один раз на подтверждённое приземление.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::locomotion::LocomotionController;
use super::motion_state::MotionState;
use crate::SimClock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    pub max_jump_count: u8,
    pub jump_force: f32,
    /// Минимум между двумя принятыми прыжками (anti-spam, любой stage)
    pub ground_debounce: f32,
    /// Минимум между прыжком stage 1 и воздушным прыжком
    pub air_jump_interval: f32,
    /// После двойного прыжка: защита следующего прыжка с земли
    pub double_jump_recovery: f32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            max_jump_count: 2,
            jump_force: 5.0,
            ground_debounce: 0.15,
            air_jump_interval: 0.15,
            double_jump_recovery: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpRejection {
    AlreadyProcessedThisTick,
    MaxStageReached,
    InputDebounce,
    AirJumpInterval,
    DoubleJumpRecovery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpOutcome {
    Jumped { stage: u8 },
    Rejected(JumpRejection),
}

impl JumpOutcome {
    pub fn is_jump(&self) -> bool {
        matches!(self, JumpOutcome::Jumped { .. })
    }
}

#[derive(Component, Debug, Clone, Default)]
pub struct JumpController {
    pub config: JumpConfig,
    stage: u8,
    /// Время прыжка stage 1 (с земли)
    last_ground_jump_time: Option<f32>,
    /// Время последнего воздушного прыжка (stage >= 2)
    last_air_jump_time: Option<f32>,
    last_attempt_tick: Option<u64>,
}

impl JumpController {
    pub fn new(config: JumpConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn stage(&self) -> u8 {
        self.stage
    }

    fn last_jump_time(&self) -> Option<f32> {
        match (self.last_ground_jump_time, self.last_air_jump_time) {
            (Some(ground), Some(air)) => Some(ground.max(air)),
            (ground, air) => ground.or(air),
        }
    }

    fn check_gate(&self, now: f32) -> Result<(), JumpRejection> {
        let since = |time: Option<f32>| time.map(|t| now - t);
        let config = &self.config;

        if self.stage >= config.max_jump_count {
            return Err(JumpRejection::MaxStageReached);
        }

        if since(self.last_jump_time()).is_some_and(|elapsed| elapsed < config.ground_debounce) {
            return Err(JumpRejection::InputDebounce);
        }

        if self.stage == 0 {
            if since(self.last_air_jump_time).is_some_and(|elapsed| elapsed < config.double_jump_recovery) {
                return Err(JumpRejection::DoubleJumpRecovery);
            }
        } else {
            let previous = if self.stage == 1 {
                self.last_ground_jump_time
            } else {
                self.last_air_jump_time
            };
            if since(previous).is_some_and(|elapsed| elapsed < config.air_jump_interval) {
                return Err(JumpRejection::AirJumpInterval);
            }
        }

        Ok(())
    }

    /// Попытка прыжка (jump edge из ввода)
    ///
    /// Один тик = максимум одна попытка, даже отклонённая.
    pub fn try_jump(
        &mut self,
        clock: &SimClock,
        motion: &mut MotionState,
        locomotion: &mut LocomotionController,
    ) -> JumpOutcome {
        if self.last_attempt_tick == Some(clock.tick) {
            return JumpOutcome::Rejected(JumpRejection::AlreadyProcessedThisTick);
        }
        self.last_attempt_tick = Some(clock.tick);

        if let Err(rejection) = self.check_gate(clock.elapsed) {
            return JumpOutcome::Rejected(rejection);
        }

        self.stage += 1;
        if self.stage == 1 {
            self.last_ground_jump_time = Some(clock.elapsed);
        } else {
            self.last_air_jump_time = Some(clock.elapsed);
        }

        locomotion.set_vertical_velocity(self.config.jump_force);
        motion.report_jump(self.stage, true);

        JumpOutcome::Jumped { stage: self.stage }
    }

    /// Подтверждённое приземление (единственный сброс stage)
    ///
    /// Возвращает stage, который был до сброса.
    pub fn on_landed(&mut self, motion: &mut MotionState) -> u8 {
        let previous = self.stage;
        self.stage = 0;
        motion.report_jump(0, false);
        previous
    }

    /// В воздухе: jumping = stage > 0 (просто падение без прыжка — не jumping)
    pub fn sync_airborne(&self, motion: &mut MotionState) {
        motion.report_jump(self.stage, self.stage > 0);
    }
}
