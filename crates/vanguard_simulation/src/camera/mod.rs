//! Camera domain — орбитальная камера + `CameraView` collaborator
//!
//! Locomotion/combo/slide читают только `CameraView { forward, right }`
//! (poll раз в тик). Кто его заполняет — хосту решать: либо реальная камера
//! движка пишет resource напрямую, либо `OrbitCamera` считает его из ввода игрока.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::input::InputSnapshot;
use crate::player::Player;
use crate::shared::flatten;
use crate::{SimClock, SimSet};

/// Scroll ниже этого порога игнорируется
const ZOOM_INPUT_EPSILON: f32 = 0.01;
/// Масштаб pitch: look.y в пикселях, вертикальная ось 0..1
const PITCH_INPUT_SCALE: f32 = 0.005;

/// Текущий basis камеры (world space)
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub forward: Vec3,
    pub right: Vec3,
}

impl Default for CameraView {
    fn default() -> Self {
        Self::from_forward(Vec3::NEG_Z)
    }
}

impl CameraView {
    pub fn from_forward(forward: Vec3) -> Self {
        Self {
            forward,
            right: forward.cross(Vec3::Y).normalize_or_zero(),
        }
    }

    /// WASD (x = right, y = forward) → горизонтальное направление в world space
    ///
    /// Zero если basis вырожден или ввод нулевой.
    pub fn relative_direction(&self, axis: Vec2) -> Vec3 {
        let forward = flatten(self.forward).normalize_or_zero();
        let right = flatten(self.right).normalize_or_zero();
        (forward * axis.y + right * axis.x).normalize_or_zero()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Градусы yaw на единицу look.x в секунду
    pub yaw_speed: f32,
    pub pitch_speed: f32,
    /// Угол над горизонтом при pitch = 0 и pitch = 1
    pub min_pitch_degrees: f32,
    pub max_pitch_degrees: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub zoom_speed: f32,
    pub zoom_damping: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            yaw_speed: 120.0,
            pitch_speed: 90.0,
            min_pitch_degrees: -10.0,
            max_pitch_degrees: 70.0,
            min_zoom: 0.0,
            max_zoom: 1.0,
            zoom_speed: 3.0,
            zoom_damping: 10.0,
        }
    }
}

/// Орбита вокруг игрока: yaw (градусы), pitch (0..1), radial zoom
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub config: CameraConfig,
    pub yaw_degrees: f32,
    pub pitch: f32,
    pub radial: f32,
}

impl OrbitCamera {
    pub fn new(config: CameraConfig) -> Self {
        let radial = (config.min_zoom + config.max_zoom) * 0.5;
        Self {
            config,
            yaw_degrees: 0.0,
            pitch: 0.5,
            radial,
        }
    }

    /// Rotate-hold: yaw/pitch от look delta; иначе zoom от scroll
    ///
    /// Возвращает true, если scroll был прочитан (его надо обнулить у источника).
    pub fn apply_input(&mut self, input: &InputSnapshot, dt: f32) -> bool {
        if input.rotate_held {
            let look = input.look_delta;
            if look != Vec2::ZERO {
                self.yaw_degrees += look.x * self.config.yaw_speed * dt;
                let pitch_delta = -look.y * self.config.pitch_speed * PITCH_INPUT_SCALE * dt;
                self.pitch = (self.pitch + pitch_delta).clamp(0.0, 1.0);
            }
            // Zoom во время вращения выбрасываем
            return input.zoom != 0.0;
        }

        if input.zoom.abs() < ZOOM_INPUT_EPSILON {
            return false;
        }

        let target = (self.radial + input.zoom * self.config.zoom_speed)
            .clamp(self.config.min_zoom, self.config.max_zoom);
        let t = (self.config.zoom_damping * dt).clamp(0.0, 1.0);
        self.radial += (target - self.radial) * t;
        true
    }

    pub fn pitch_degrees(&self) -> f32 {
        let config = &self.config;
        config.min_pitch_degrees + (config.max_pitch_degrees - config.min_pitch_degrees) * self.pitch
    }

    /// Камера на орбите смотрит на цель: forward = -(offset direction)
    pub fn view(&self) -> CameraView {
        let yaw = self.yaw_degrees.to_radians();
        let elevation = self.pitch_degrees().to_radians();
        let offset = Vec3::new(
            yaw.sin() * elevation.cos(),
            elevation.sin(),
            yaw.cos() * elevation.cos(),
        );
        CameraView::from_forward(-offset)
    }
}

/// Система: орбита читает ввод игрока и публикует `CameraView`
pub fn update_orbit_camera(
    mut commands: Commands,
    orbit: Option<ResMut<OrbitCamera>>,
    view: Option<ResMut<CameraView>>,
    clock: Res<SimClock>,
    mut players: Query<&mut InputSnapshot, With<Player>>,
) {
    let Some(mut orbit) = orbit else {
        return;
    };

    if let Some(mut input) = players.iter_mut().next() {
        if orbit.apply_input(&input, clock.delta) {
            input.zoom = 0.0;
        }
    }

    match view {
        Some(mut view) => *view = orbit.view(),
        None => commands.insert_resource(orbit.view()),
    }
}

/// Plugin камеры: только система; `OrbitCamera` добавляет хост (или `insert_orbit_camera`)
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, update_orbit_camera.in_set(SimSet::Clock));
    }
}

pub fn insert_orbit_camera(app: &mut App, config: CameraConfig) {
    let orbit = OrbitCamera::new(config);
    let view = orbit.view();
    app.insert_resource(orbit).insert_resource(view);
}
