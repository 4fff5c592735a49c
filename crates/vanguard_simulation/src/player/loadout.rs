//! Weapon loadout — какой слот экипирован (для MotionState.weapon_equipped)
//!
//! Сами предметы/инвентарь живут у хоста, здесь только индекс слота.

use bevy::prelude::*;

use super::motion_state::MotionState;

#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct WeaponLoadout {
    pub slots: Vec<String>,
    equipped: Option<usize>,
}

impl WeaponLoadout {
    pub fn new(slots: Vec<String>) -> Self {
        Self {
            slots,
            equipped: None,
        }
    }

    pub fn equipped(&self) -> Option<&str> {
        self.equipped
            .and_then(|index| self.slots.get(index))
            .map(String::as_str)
    }

    pub fn is_equipped(&self, index: usize) -> bool {
        self.equipped == Some(index)
    }

    /// Невалидный индекс = no-op (false)
    pub fn equip(&mut self, index: usize, motion: &mut MotionState) -> bool {
        if index >= self.slots.len() {
            return false;
        }
        self.equipped = Some(index);
        motion.report_weapon_equipped(true);
        true
    }

    pub fn unequip(&mut self, motion: &mut MotionState) {
        self.equipped = None;
        motion.report_weapon_equipped(false);
    }
}
