//! Player systems — тонкие адаптеры ECS → контроллеры
//!
//! Порядок (FixedUpdate):
//! - SimSet::Actions: timeline cues → jump → slide → attack → equip
//! - SimSet::Motion: locomotion tick
//! - SimSet::WriteBack: combo facing override

use bevy::prelude::*;

use super::combo::{CheckpointOutcome, ComboCancelPolicy, ComboController, ComboInputOutcome, StepSkip};
use super::events::{ComboCheckpointResolved, Landed};
use super::jump::{JumpController, JumpOutcome};
use super::loadout::WeaponLoadout;
use super::locomotion::{LocomotionController, LocomotionFrame};
use super::motion_state::MotionState;
use crate::animation::{AnimationCommand, AnimationRequest, AnimatorPlayback, TimelineCue, TimelineInbox};
use crate::camera::CameraView;
use crate::diagnostics::{report_diagnostic, DiagnosticKind, SimDiagnostic};
use crate::input::InputSnapshot;
use crate::physics::CollisionWorld;
use crate::shared::yaw_rotation;
use crate::SimClock;

/// Combo держит lock: можно ли выполнить jump/slide в этом тике
///
/// При `CancelCombo` серия обрывается здесь же (и аниматор получает StopAttack).
fn combo_allows_action(
    entity: Entity,
    combo: &mut ComboController,
    motion: &mut MotionState,
    animations: &mut EventWriter<AnimationRequest>,
) -> bool {
    if !motion.is_input_movement_locked() {
        return true;
    }

    match combo.config.cancel_policy {
        ComboCancelPolicy::BlockActions => false,
        ComboCancelPolicy::CancelCombo => {
            if combo.cancel(motion) {
                crate::log(&format!("⚔️ {:?}: combo cancelled by action", entity));
                animations.write(AnimationRequest {
                    entity,
                    command: AnimationCommand::StopAttack,
                });
            }
            true
        }
    }
}

fn missing_direction_kind(camera: Option<&CameraView>) -> DiagnosticKind {
    if camera.is_some() {
        DiagnosticKind::DegenerateDirection
    } else {
        DiagnosticKind::MissingCamera
    }
}

/// Система: callbacks таймлайна (slide enter/exit, checkpoints, steps)
pub fn process_timeline_cues(
    clock: Res<SimClock>,
    world: Res<CollisionWorld>,
    mut query: Query<(
        Entity,
        &mut TimelineInbox,
        &mut LocomotionController,
        &mut ComboController,
        &mut MotionState,
        &mut Transform,
    )>,
    mut animations: EventWriter<AnimationRequest>,
    mut checkpoints: EventWriter<ComboCheckpointResolved>,
    mut diagnostics: EventWriter<SimDiagnostic>,
) {
    for (entity, mut inbox, mut locomotion, mut combo, mut motion, mut transform) in query.iter_mut() {
        if inbox.is_empty() {
            continue;
        }

        for cue in inbox.drain() {
            match cue {
                TimelineCue::SlideEnter { direction } => {
                    let started = match direction {
                        Some(direction) => locomotion.start_slide(direction, &mut transform, &mut motion),
                        None => locomotion.start_slide_from_pending(&mut transform, &mut motion),
                    };
                    if started {
                        crate::log(&format!("💨 {:?}: slide started", entity));
                    } else {
                        report_diagnostic(&mut diagnostics, Some(entity), DiagnosticKind::DegenerateDirection);
                    }
                }
                TimelineCue::SlideExit => {
                    locomotion.end_slide(&mut motion);
                }
                TimelineCue::ComboCheckpoint { section } => {
                    let outcome = combo.on_checkpoint(section, clock.elapsed, &mut motion);
                    if outcome == CheckpointOutcome::InvalidSection {
                        report_diagnostic(
                            &mut diagnostics,
                            Some(entity),
                            DiagnosticKind::InvalidCheckpoint { section },
                        );
                    }
                    if outcome.ended_sequence() {
                        crate::log(&format!("⚔️ {:?}: combo ended at checkpoint {} ({:?})", entity, section, outcome));
                        animations.write(AnimationRequest {
                            entity,
                            command: AnimationCommand::StopAttack,
                        });
                    }
                    checkpoints.write(ComboCheckpointResolved {
                        entity,
                        section,
                        advance: outcome.advances(),
                    });
                }
                TimelineCue::ComboComplete => {
                    if combo.on_sequence_complete(&mut motion) {
                        crate::log(&format!("⚔️ {:?}: combo complete", entity));
                    }
                    animations.write(AnimationRequest {
                        entity,
                        command: AnimationCommand::StopAttack,
                    });
                }
                TimelineCue::StrikeStep { index } => {
                    match combo.apply_step_displacement(index, &mut locomotion, &mut transform, &world) {
                        Ok(_) => {}
                        // Нет направления — шаг просто пропускается
                        Err(StepSkip::NoDirection) => {}
                        Err(StepSkip::InvalidIndex(index)) => {
                            report_diagnostic(
                                &mut diagnostics,
                                Some(entity),
                                DiagnosticKind::InvalidComboStep { index },
                            );
                        }
                    }
                }
                TimelineCue::BossStrike { pattern } => {
                    crate::log(&format!("{:?}: boss strike cue {} on player ignored", entity, pattern));
                }
            }
        }
    }
}

/// Система: jump edge
pub fn handle_jump_input(
    clock: Res<SimClock>,
    mut query: Query<(
        Entity,
        &InputSnapshot,
        &mut JumpController,
        &mut LocomotionController,
        &mut ComboController,
        &mut MotionState,
    )>,
    mut animations: EventWriter<AnimationRequest>,
) {
    for (entity, input, mut jump, mut locomotion, mut combo, mut motion) in query.iter_mut() {
        if !input.jump_pressed {
            continue;
        }
        if !combo_allows_action(entity, &mut combo, &mut motion, &mut animations) {
            continue;
        }

        match jump.try_jump(&clock, &mut motion, &mut locomotion) {
            JumpOutcome::Jumped { stage } => {
                crate::log(&format!("🦘 {:?}: jump stage {}", entity, stage));
                animations.write(AnimationRequest {
                    entity,
                    command: AnimationCommand::Jump { stage },
                });
            }
            JumpOutcome::Rejected(reason) => {
                crate::log(&format!("{:?}: jump rejected ({:?})", entity, reason));
            }
        }
    }
}

/// Система: slide edge (latch: одно нажатие = один запрос)
pub fn handle_slide_input(
    camera: Option<Res<CameraView>>,
    mut query: Query<(
        Entity,
        &InputSnapshot,
        &mut LocomotionController,
        &mut ComboController,
        &mut MotionState,
    )>,
    mut animations: EventWriter<AnimationRequest>,
    mut diagnostics: EventWriter<SimDiagnostic>,
) {
    let camera = camera.as_deref();

    for (entity, input, mut locomotion, mut combo, mut motion) in query.iter_mut() {
        if !locomotion.poll_slide_input(input.slide_held) {
            continue;
        }
        if !combo_allows_action(entity, &mut combo, &mut motion, &mut animations) {
            continue;
        }

        if !locomotion.request_slide(camera) {
            report_diagnostic(&mut diagnostics, Some(entity), missing_direction_kind(camera));
        }
        animations.write(AnimationRequest {
            entity,
            command: AnimationCommand::Slide,
        });
    }
}

/// Система: attack edge → combo
pub fn handle_attack_input(
    clock: Res<SimClock>,
    camera: Option<Res<CameraView>>,
    mut query: Query<(Entity, &InputSnapshot, &mut ComboController, &mut MotionState)>,
    mut animations: EventWriter<AnimationRequest>,
    mut diagnostics: EventWriter<SimDiagnostic>,
) {
    let camera = camera.as_deref();

    for (entity, input, mut combo, mut motion) in query.iter_mut() {
        if !input.attack_pressed {
            continue;
        }

        match combo.on_attack_input(clock.elapsed, camera, &mut motion) {
            ComboInputOutcome::Started { direction } => {
                crate::log(&format!("⚔️ {:?}: combo started", entity));
                if direction.is_none() {
                    report_diagnostic(&mut diagnostics, Some(entity), missing_direction_kind(camera));
                }
                animations.write(AnimationRequest {
                    entity,
                    command: AnimationCommand::PlayAttack,
                });
            }
            ComboInputOutcome::Buffered { count } => {
                crate::log(&format!("⚔️ {:?}: combo input buffered ({})", entity, count));
            }
            ComboInputOutcome::IgnoredAtMax | ComboInputOutcome::IgnoredOutsideWindow => {}
        }
    }
}

/// Система: выбор слота оружия (тот же слот ещё раз = убрать)
pub fn handle_equip_input(
    mut query: Query<(Entity, &InputSnapshot, &mut WeaponLoadout, &mut MotionState)>,
    mut diagnostics: EventWriter<SimDiagnostic>,
) {
    for (entity, input, mut loadout, mut motion) in query.iter_mut() {
        let Some(index) = input.equip_slot else {
            continue;
        };

        // Повторный выбор того же слота = убрать оружие
        if loadout.is_equipped(index) {
            loadout.unequip(&mut motion);
            crate::log(&format!("{:?}: weapon slot {} holstered", entity, index));
            continue;
        }

        if !loadout.equip(index, &mut motion) {
            report_diagnostic(&mut diagnostics, Some(entity), DiagnosticKind::InvalidWeaponSlot { index });
        }
    }
}

/// Система: locomotion tick (slide / click / keyboard / gravity / landing)
pub fn tick_locomotion(
    clock: Res<SimClock>,
    world: Res<CollisionWorld>,
    camera: Option<Res<CameraView>>,
    mut query: Query<(
        Entity,
        &InputSnapshot,
        &mut LocomotionController,
        &mut JumpController,
        &mut MotionState,
        &mut Transform,
        Option<&AnimatorPlayback>,
    )>,
    mut landed_events: EventWriter<Landed>,
    mut animations: EventWriter<AnimationRequest>,
    mut diagnostics: EventWriter<SimDiagnostic>,
) {
    for (entity, input, mut locomotion, mut jump, mut motion, mut transform, playback) in query.iter_mut() {
        let stage_before = jump.stage();
        let frame = LocomotionFrame {
            dt: clock.delta,
            input,
            camera: camera.as_deref(),
            playback,
            world: &world,
        };

        let report = locomotion.tick(&frame, &mut transform, &mut motion, &mut jump);

        if report.landed {
            crate::log(&format!("🛬 {:?}: landed (jump stage {})", entity, stage_before));
            landed_events.write(Landed {
                entity,
                jump_stage: stage_before,
            });
            animations.write(AnimationRequest {
                entity,
                command: AnimationCommand::ResetJumpIndex,
            });
        }

        if let Some(reason) = report.click_cancelled {
            crate::log(&format!("{:?}: click-move stopped ({:?})", entity, reason));
        }

        for kind in report.diagnostics {
            report_diagnostic(&mut diagnostics, Some(entity), kind);
        }
    }
}

/// Система: пока серия активна, персонаж смотрит строго по направлению combo
pub fn apply_combo_facing(mut query: Query<(&ComboController, &mut Transform)>) {
    for (combo, mut transform) in query.iter_mut() {
        if let Some(direction) = combo.facing_override() {
            transform.rotation = yaw_rotation(direction);
        }
    }
}
