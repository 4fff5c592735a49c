//! Input domain — снимок ввода за тик
//!
//! Хост (движок, replay, сеть) заполняет `InputSnapshot` один раз за кадр.
//! Симуляции всё равно откуда пришли данные. One-shot edges (`*_pressed`)
//! сбрасываются в конце тика системой `consume_input_edges`, held-состояния
//! остаются как есть до следующей записи хостом.

use bevy::prelude::*;

/// Квадрат длины move-вектора, выше которого считаем что WASD нажат
pub const KEYBOARD_MOVE_THRESHOLD_SQUARED: f32 = 0.01;

#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct InputSnapshot {
    /// WASD / stick (x = right, y = forward)
    pub move_axis: Vec2,
    /// Mouse delta для орбитальной камеры
    pub look_delta: Vec2,
    /// Scroll; камера обнуляет после применения
    pub zoom: f32,
    /// Точка на земле под курсором, пока зажата кнопка click-move (ray cast делает хост)
    pub click_destination: Option<Vec3>,

    pub fast_run_held: bool,
    pub rotate_held: bool,
    pub slide_held: bool,

    pub jump_pressed: bool,
    pub attack_pressed: bool,
    /// Слот оружия, выбранный в этом тике
    pub equip_slot: Option<usize>,
}

impl InputSnapshot {
    pub fn is_keyboard_move(&self) -> bool {
        self.move_axis.length_squared() > KEYBOARD_MOVE_THRESHOLD_SQUARED
    }

    pub fn clear_edges(&mut self) {
        self.jump_pressed = false;
        self.attack_pressed = false;
        self.equip_slot = None;
    }
}

/// Система: one-shot edges живут ровно один тик
pub fn consume_input_edges(mut query: Query<&mut InputSnapshot>) {
    for mut input in query.iter_mut() {
        input.clear_edges();
    }
}
