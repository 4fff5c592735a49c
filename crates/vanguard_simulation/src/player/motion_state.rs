//! MotionState — blackboard движения/боя игрока
//!
//! Один компонент на актора. Читают все (анимация, UI, AI), пишет каждое поле
//! ровно один контроллер через свой `report_*` метод:
//!
//! | поле                              | writer               |
//! |-----------------------------------|----------------------|
//! | grounded / moving / fast_run      | LocomotionController |
//! | sliding                           | LocomotionController |
//! | jumping / jump_stage              | JumpController       |
//! | attacking / input_movement_locked | ComboController      |
//! | weapon_equipped                   | WeaponLoadout        |

use bevy::prelude::*;

#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct MotionState {
    is_moving: bool,
    is_fast_run: bool,
    is_sliding: bool,
    is_grounded: bool,
    is_jumping: bool,
    /// 0 = на земле / без прыжка, 1 = первый прыжок, 2 = двойной
    jump_stage: u8,
    is_attacking: bool,
    is_input_movement_locked: bool,
    weapon_equipped: bool,
}

impl MotionState {
    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    pub fn is_fast_run(&self) -> bool {
        self.is_fast_run
    }

    pub fn is_sliding(&self) -> bool {
        self.is_sliding
    }

    pub fn is_grounded(&self) -> bool {
        self.is_grounded
    }

    pub fn is_jumping(&self) -> bool {
        self.is_jumping
    }

    pub fn jump_stage(&self) -> u8 {
        self.jump_stage
    }

    pub fn is_attacking(&self) -> bool {
        self.is_attacking
    }

    pub fn is_input_movement_locked(&self) -> bool {
        self.is_input_movement_locked
    }

    pub fn weapon_equipped(&self) -> bool {
        self.weapon_equipped
    }

    pub fn is_idle(&self) -> bool {
        !self.is_moving && !self.is_sliding
    }

    // --- LocomotionController ---

    pub(crate) fn report_grounded(&mut self, grounded: bool) {
        self.is_grounded = grounded;
    }

    pub(crate) fn report_locomotion(&mut self, moving: bool, fast_run: bool) {
        self.is_moving = moving;
        self.is_fast_run = fast_run;
    }

    pub(crate) fn report_sliding(&mut self, sliding: bool) {
        self.is_sliding = sliding;
    }

    // --- JumpController ---

    pub(crate) fn report_jump(&mut self, stage: u8, jumping: bool) {
        self.jump_stage = stage;
        self.is_jumping = jumping;
    }

    // --- ComboController ---

    /// Lock и attacking всегда выставляются вместе: lock возможен только внутри combo
    pub(crate) fn report_combat(&mut self, sequence_active: bool) {
        self.is_attacking = sequence_active;
        self.is_input_movement_locked = sequence_active;
    }

    // --- WeaponLoadout ---

    pub(crate) fn report_weapon_equipped(&mut self, equipped: bool) {
        self.weapon_equipped = equipped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle_and_unlocked() {
        let state = MotionState::default();
        assert!(state.is_idle());
        assert_eq!(state.jump_stage(), 0);
        assert!(!state.is_input_movement_locked());
    }

    #[test]
    fn test_idle_derivation() {
        let mut state = MotionState::default();
        state.report_locomotion(true, false);
        assert!(!state.is_idle());

        state.report_locomotion(false, false);
        state.report_sliding(true);
        assert!(!state.is_idle());

        state.report_sliding(false);
        assert!(state.is_idle());
    }

    #[test]
    fn test_combat_report_couples_lock_and_attacking() {
        let mut state = MotionState::default();
        state.report_combat(true);
        assert!(state.is_attacking() && state.is_input_movement_locked());

        state.report_combat(false);
        assert!(!state.is_attacking() && !state.is_input_movement_locked());
    }
}
