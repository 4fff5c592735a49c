//! Хелперы горизонтальной плоскости (locomotion, combo, boss tracking)
//!
//! Соглашение Bevy: forward = -Z. Все повороты здесь yaw-only (вокруг Y).

use bevy::prelude::*;

/// Квадрат длины, ниже которого горизонтальная проекция считается вырожденной
/// (камера смотрит строго вниз/вверх).
pub const MIN_DIRECTION_LENGTH_SQUARED: f32 = 0.01;

/// Обнуляет вертикальную компоненту
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Нормализованное горизонтальное направление; `None` если проекция вырождена
pub fn flat_direction(v: Vec3) -> Option<Vec3> {
    let flat = flatten(v);
    if flat.length_squared() < MIN_DIRECTION_LENGTH_SQUARED {
        return None;
    }
    Some(flat.normalize())
}

/// Поворот, у которого forward (-Z) смотрит вдоль горизонтальной части `direction`
///
/// Нулевой вектор → identity.
pub fn yaw_rotation(direction: Vec3) -> Quat {
    let flat = flatten(direction);
    if flat.length_squared() <= f32::EPSILON {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_y(f32::atan2(-flat.x, -flat.z))
}

/// Slerp от `current` к повороту на `direction` (фактор speed * dt, не больше 1)
pub fn slerp_towards(current: Quat, direction: Vec3, speed: f32, dt: f32) -> Quat {
    let t = (speed * dt).clamp(0.0, 1.0);
    current.slerp(yaw_rotation(direction), t).normalize()
}

/// Forward поворота (-Z в Bevy)
pub fn facing(rotation: Quat) -> Vec3 {
    rotation * Vec3::NEG_Z
}

/// Угол между векторами в градусах (0, если любой нулевой)
pub fn angle_degrees(a: Vec3, b: Vec3) -> f32 {
    if a.length_squared() <= f32::EPSILON || b.length_squared() <= f32::EPSILON {
        return 0.0;
    }
    a.angle_between(b).to_degrees()
}
