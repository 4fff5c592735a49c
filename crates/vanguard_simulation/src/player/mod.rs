//! Player domain — локомоция, прыжок, combo, blackboard
//!
//! Каждый контроллер — компонент с чистыми методами (часы и collaborators
//! приходят аргументами), системы в `systems.rs` только связывают их с ECS.

use bevy::prelude::*;

pub mod combo;
pub mod events;
pub mod jump;
pub mod loadout;
pub mod locomotion;
pub mod motion_state;
pub mod systems;


pub use combo::{
    CheckpointOutcome, ComboCancelPolicy, ComboConfig, ComboController, ComboInputOutcome,
    ComboSequenceState, StepSkip,
};
pub use events::{ComboCheckpointResolved, Landed};
pub use jump::{JumpConfig, JumpController, JumpOutcome, JumpRejection};
pub use loadout::WeaponLoadout;
pub use locomotion::{
    ClickCancelReason, ClickMoveState, LocomotionConfig, LocomotionController, LocomotionFrame,
    LocomotionReport,
};
pub use motion_state::MotionState;

use crate::animation::{AnimatorParams, AnimatorPlayback, IdleFidget, TimelineInbox};
use crate::config::SimulationConfig;
use crate::input::InputSnapshot;
use crate::physics::GROUND_SKIN;
use crate::SimSet;

/// Marker: entity, которым управляет ввод игрока
///
/// Орбитальная камера читает ввод первого такого entity,
/// босс без явной цели преследует его же.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Полный набор компонентов игрока
///
/// Спавн на уровне земли = уже стоим (без Landed на первом тике).
/// Спавн выше (в воздухе или на blocker'е) = обычное падение и одно приземление.
pub fn player_bundle(position: Vec3, config: &SimulationConfig) -> impl Bundle {
    let mut motion = MotionState::default();
    let mut locomotion = LocomotionController::new(config.locomotion.clone());
    if position.y <= config.ground_height + GROUND_SKIN {
        motion.report_grounded(true);
        locomotion = locomotion.with_ground_contact();
    }

    (
        Player,
        Transform::from_translation(position),
        motion,
        InputSnapshot::default(),
        locomotion,
        JumpController::new(config.jump.clone()),
        ComboController::new(config.combo.clone()),
        WeaponLoadout::new(config.weapon_slots.clone()),
        (
            TimelineInbox::default(),
            AnimatorPlayback {
                state_name: config.animation.base_idle_state.clone(),
                normalized_time: 0.0,
            },
            AnimatorParams::default(),
            IdleFidget::default(),
        ),
    )
}

pub fn spawn_player(commands: &mut Commands, position: Vec3, config: &SimulationConfig) -> Entity {
    let entity = commands.spawn(player_bundle(position, config)).id();
    crate::log(&format!("🧍 Player spawned: {:?} at {:?}", entity, position));
    entity
}

/// Player Plugin
///
/// Порядок выполнения:
/// 1. Actions: timeline cues → jump → slide → attack → equip
/// 2. Motion: locomotion tick
/// 3. WriteBack: combo facing override
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<Landed>().add_event::<ComboCheckpointResolved>();

        app.add_systems(
            FixedUpdate,
            (
                systems::process_timeline_cues,
                systems::handle_jump_input,
                systems::handle_slide_input,
                systems::handle_attack_input,
                systems::handle_equip_input,
            )
                .chain()
                .in_set(SimSet::Actions),
        )
        .add_systems(FixedUpdate, systems::tick_locomotion.in_set(SimSet::Motion))
        .add_systems(FixedUpdate, systems::apply_combo_facing.in_set(SimSet::WriteBack));
    }
}
