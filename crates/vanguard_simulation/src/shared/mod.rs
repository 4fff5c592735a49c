//! Shared domain — cross-cutting helpers
//!
//! - math: горизонтальные направления, yaw-only повороты, угол до цели
//! - curve: кривая смещения (slide), задаётся ключами в конфиге

pub mod curve;
pub mod math;

pub use curve::*;
pub use math::*;
