//! LocomotionController — перемещение, гравитация, slide, click-to-move
//!
//! Порядок внутри тика (один режим на тик):
//! 1. slide активен → гравитация + шаг по кривой, больше ничего
//! 2. click input (клавиатура отменяет click-move)
//! 3. направление: click → keyboard (camera-relative)
//! 4. гравитация + подтверждение приземления (→ JumpController::on_landed)
//! 5. запись moving/fast_run в MotionState
//! 6. перемещение + поворот (при lock — только гравитация)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::jump::JumpController;
use super::motion_state::MotionState;
use crate::animation::AnimatorPlayback;
use crate::camera::CameraView;
use crate::diagnostics::DiagnosticKind;
use crate::input::InputSnapshot;
use crate::physics::CollisionWorld;
use crate::shared::{flat_direction, flatten, slerp_towards, yaw_rotation, DisplacementCurve};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    pub move_speed: f32,
    pub fast_run_speed: f32,
    pub gravity: f32,
    pub rotation_speed: f32,
    pub click_stop_distance: f32,
    /// Сколько секунд можно упираться в стену, прежде чем click-move отменится
    pub click_blocked_stop_time: f32,
    /// Перемещение за тик ниже этого = "не сдвинулись"
    pub stuck_displacement_epsilon: f32,
    /// Vertical velocity на земле (прижимает к полу)
    pub ground_stick_velocity: f32,
    pub slide_total_distance: f32,
    pub slide_curve: DisplacementCurve,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            fast_run_speed: 8.0,
            gravity: -9.81,
            rotation_speed: 15.0,
            click_stop_distance: 0.1,
            click_blocked_stop_time: 1.0,
            stuck_displacement_epsilon: 0.001,
            ground_stick_velocity: -2.0,
            slide_total_distance: 2.5,
            slide_curve: DisplacementCurve::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClickMoveState {
    pub destination: Vec3,
    pub active: bool,
    pub blocked_elapsed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickCancelReason {
    Arrived,
    Stuck,
    KeyboardOverride,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct SlideTrack {
    direction: Vec3,
    last_curve_value: f32,
}

/// Всё, что локомоции нужно от внешнего мира на один тик
pub struct LocomotionFrame<'a> {
    pub dt: f32,
    pub input: &'a InputSnapshot,
    pub camera: Option<&'a CameraView>,
    pub playback: Option<&'a AnimatorPlayback>,
    pub world: &'a CollisionWorld,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocomotionReport {
    /// Подтверждённое приземление в этом тике
    pub landed: bool,
    pub click_cancelled: Option<ClickCancelReason>,
    pub diagnostics: Vec<DiagnosticKind>,
}

#[derive(Component, Debug, Clone, Default)]
pub struct LocomotionController {
    pub config: LocomotionConfig,
    vertical_velocity: f32,
    move_direction: Vec3,
    click: ClickMoveState,
    slide: SlideTrack,
    pending_slide_direction: Vec3,
    slide_input_latched: bool,
    /// Результат последнего move_and_collide (аналог CharacterController.isGrounded)
    last_move_grounded: bool,
    prev_grounded: bool,
}

impl LocomotionController {
    pub fn new(config: LocomotionConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Актор появился стоя на опоре: история grounded уже "на земле",
    /// поэтому первый тик не подтверждает приземление (нет Landed / ResetJumpIndex)
    pub fn with_ground_contact(mut self) -> Self {
        self.last_move_grounded = true;
        self.prev_grounded = true;
        self
    }

    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    pub fn move_direction(&self) -> Vec3 {
        self.move_direction
    }

    pub fn click_state(&self) -> ClickMoveState {
        self.click
    }

    pub fn pending_slide_direction(&self) -> Vec3 {
        self.pending_slide_direction
    }

    // --- Tick ---

    pub fn tick(
        &mut self,
        frame: &LocomotionFrame,
        transform: &mut Transform,
        motion: &mut MotionState,
        jump: &mut JumpController,
    ) -> LocomotionReport {
        let mut report = LocomotionReport::default();

        if motion.is_sliding() {
            report.landed = self.apply_gravity(frame.dt, motion, jump);

            let slide_step = match frame.playback {
                Some(playback) => self.slide_step(playback.normalized_time),
                None => {
                    report.diagnostics.push(DiagnosticKind::MissingAnimatorPlayback);
                    Vec3::ZERO
                }
            };
            // Вертикаль интегрируем всегда, даже если кривая стоит на месте
            let delta = slide_step + Vec3::Y * self.vertical_velocity * frame.dt;
            self.move_by(delta, transform, frame.world);
            return report;
        }

        let locked = motion.is_input_movement_locked();

        if locked {
            self.move_direction = Vec3::ZERO;
        } else {
            self.handle_click_input(frame.input, &mut report);
            self.move_direction = self.resolve_direction(frame, transform.translation, &mut report);
        }

        report.landed = self.apply_gravity(frame.dt, motion, jump);

        let moving = self.move_direction != Vec3::ZERO;
        let fast_run = moving && frame.input.is_keyboard_move() && frame.input.fast_run_held;
        motion.report_locomotion(moving, fast_run);

        self.apply_movement(frame, transform, fast_run, &mut report);
        report
    }

    fn handle_click_input(&mut self, input: &InputSnapshot, report: &mut LocomotionReport) {
        if let Some(destination) = input.click_destination {
            self.set_click_destination(destination);
        }

        if input.is_keyboard_move() && self.click.active {
            self.cancel_click_move();
            report.click_cancelled = Some(ClickCancelReason::KeyboardOverride);
        }
    }

    fn resolve_direction(
        &mut self,
        frame: &LocomotionFrame,
        position: Vec3,
        report: &mut LocomotionReport,
    ) -> Vec3 {
        if self.click.active {
            let to_destination = flatten(self.click.destination - position);
            if to_destination.length() <= self.config.click_stop_distance {
                self.click.active = false;
                report.click_cancelled = Some(ClickCancelReason::Arrived);
                return Vec3::ZERO;
            }
            return to_destination.normalize_or_zero();
        }

        if !frame.input.is_keyboard_move() {
            return Vec3::ZERO;
        }

        match frame.camera {
            Some(camera) => {
                let direction = camera.relative_direction(frame.input.move_axis);
                if direction == Vec3::ZERO {
                    report.diagnostics.push(DiagnosticKind::DegenerateDirection);
                }
                direction
            }
            None => {
                report.diagnostics.push(DiagnosticKind::MissingCamera);
                Vec3::ZERO
            }
        }
    }

    /// Гравитация + ground state machine; true = приземление подтверждено в этом тике
    fn apply_gravity(&mut self, dt: f32, motion: &mut MotionState, jump: &mut JumpController) -> bool {
        let mut landed = false;

        if self.last_move_grounded && self.vertical_velocity <= 0.0 {
            motion.report_grounded(true);
            if !self.prev_grounded {
                landed = true;
                jump.on_landed(motion);
            }
            self.vertical_velocity = self.config.ground_stick_velocity;
        } else {
            motion.report_grounded(false);
            jump.sync_airborne(motion);
        }

        self.prev_grounded = motion.is_grounded();
        self.vertical_velocity += self.config.gravity * dt;
        landed
    }

    fn apply_movement(
        &mut self,
        frame: &LocomotionFrame,
        transform: &mut Transform,
        fast_run: bool,
        report: &mut LocomotionReport,
    ) {
        let vertical = Vec3::Y * self.vertical_velocity;

        if self.move_direction == Vec3::ZERO {
            self.move_by(vertical * frame.dt, transform, frame.world);
            return;
        }

        let speed = if fast_run {
            self.config.fast_run_speed
        } else {
            self.config.move_speed
        };

        let before = transform.translation;
        self.move_by((self.move_direction * speed + vertical) * frame.dt, transform, frame.world);

        if self.click.active {
            let moved = transform.translation.distance(before);
            if moved < self.config.stuck_displacement_epsilon {
                self.click.blocked_elapsed += frame.dt;
            } else {
                self.click.blocked_elapsed = 0.0;
            }

            if self.click.blocked_elapsed >= self.config.click_blocked_stop_time {
                self.click.active = false;
                self.move_direction = Vec3::ZERO;
                report.click_cancelled = Some(ClickCancelReason::Stuck);
                return;
            }
        }

        transform.rotation = slerp_towards(
            transform.rotation,
            self.move_direction,
            self.config.rotation_speed,
            frame.dt,
        );
    }

    fn move_by(&mut self, delta: Vec3, transform: &mut Transform, world: &CollisionWorld) {
        let result = world.move_and_collide(transform.translation, delta);
        transform.translation = result.position;
        self.last_move_grounded = result.grounded;
    }

    /// Горизонтальный шаг slide за тик по приросту кривой (назад не двигаемся)
    fn slide_step(&mut self, normalized_time: f32) -> Vec3 {
        let t = normalized_time.clamp(0.0, 1.0);
        let value = self.config.slide_curve.evaluate(t);
        let distance = (value - self.slide.last_curve_value) * self.config.slide_total_distance;
        self.slide.last_curve_value = value;

        if distance > 0.0 {
            self.slide.direction * distance
        } else {
            Vec3::ZERO
        }
    }

    // --- Slide ---

    /// Rising edge slide-кнопки с latch: одно нажатие = один запрос
    pub fn poll_slide_input(&mut self, held: bool) -> bool {
        if !held {
            self.slide_input_latched = false;
            return false;
        }
        if self.slide_input_latched {
            return false;
        }
        self.slide_input_latched = true;
        true
    }

    /// Запрос slide: гасит click-move и запоминает направление камеры до SlideEnter
    ///
    /// `false` = направление недоступно (камеры нет или она смотрит вертикально),
    /// pending остаётся нулевым и SlideEnter без явного направления ничего не сделает.
    pub fn request_slide(&mut self, camera: Option<&CameraView>) -> bool {
        self.cancel_click_move();
        self.move_direction = Vec3::ZERO;
        self.pending_slide_direction = camera
            .and_then(|camera| flat_direction(camera.forward))
            .unwrap_or(Vec3::ZERO);
        self.pending_slide_direction != Vec3::ZERO
    }

    pub fn start_slide(&mut self, direction: Vec3, transform: &mut Transform, motion: &mut MotionState) -> bool {
        let Some(direction) = flat_direction(direction) else {
            return false;
        };

        self.move_direction = Vec3::ZERO;
        self.slide = SlideTrack {
            direction,
            last_curve_value: 0.0,
        };
        transform.rotation = yaw_rotation(direction);
        motion.report_sliding(true);
        true
    }

    pub fn start_slide_from_pending(&mut self, transform: &mut Transform, motion: &mut MotionState) -> bool {
        let direction = std::mem::take(&mut self.pending_slide_direction);
        self.start_slide(direction, transform, motion)
    }

    pub fn end_slide(&mut self, motion: &mut MotionState) {
        motion.report_sliding(false);
    }

    // --- Bridge ---

    pub fn set_click_destination(&mut self, destination: Vec3) {
        self.click = ClickMoveState {
            destination,
            active: true,
            blocked_elapsed: 0.0,
        };
    }

    pub fn cancel_click_move(&mut self) {
        self.click.active = false;
        self.click.blocked_elapsed = 0.0;
    }

    /// Жёсткая перезапись (JumpController)
    pub fn set_vertical_velocity(&mut self, velocity: f32) {
        self.vertical_velocity = velocity;
    }

    /// Прямой сдвиг мимо обычного движения (root motion шагов combo)
    pub fn apply_external_displacement(
        &mut self,
        delta: Vec3,
        transform: &mut Transform,
        world: &CollisionWorld,
    ) {
        self.move_by(delta, transform, world);
    }
}
