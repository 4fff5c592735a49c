//! Integration tests: игрок в полном SimulationPlugin (ввод → системы → события)

use bevy::prelude::*;
use vanguard_simulation::shared::facing;
use vanguard_simulation::{
    create_headless_app, player_bundle, AnimationCommand, AnimationRequest, AnimatorPlayback,
    Blocker, CameraView, ComboCancelPolicy, ComboCheckpointResolved, DiagnosticKind, InputSnapshot,
    Landed, MotionState, SimClock, SimDiagnostic, SimSet, SimulationConfig, SimulationPlugin,
    TimelineCue, TimelineInbox, WeaponLoadout,
};

/// Копия всех событий типа E (FixedUpdate → ресурс для assert'ов)
#[derive(Resource)]
struct Recorded<E: Event + Clone>(Vec<E>);

fn record<E: Event + Clone>(mut reader: EventReader<E>, mut recorded: ResMut<Recorded<E>>) {
    recorded.0.extend(reader.read().cloned());
}

fn setup_app(with_camera: bool) -> (App, Entity) {
    setup_app_with(with_camera, Vec3::ZERO, SimulationConfig::default())
}

fn setup_app_with(with_camera: bool, spawn_at: Vec3, config: SimulationConfig) -> (App, Entity) {
    let mut app = create_headless_app(7);
    app.add_plugins(SimulationPlugin)
        .insert_resource(Recorded::<Landed>(Vec::new()))
        .insert_resource(Recorded::<AnimationRequest>(Vec::new()))
        .insert_resource(Recorded::<ComboCheckpointResolved>(Vec::new()))
        .insert_resource(Recorded::<SimDiagnostic>(Vec::new()))
        .add_systems(
            FixedUpdate,
            (
                record::<Landed>,
                record::<AnimationRequest>,
                record::<ComboCheckpointResolved>,
                record::<SimDiagnostic>,
            )
                .after(SimSet::Enemies),
        );

    if with_camera {
        app.insert_resource(CameraView::default());
    }

    let player = app.world_mut().spawn(player_bundle(spawn_at, &config)).id();

    (app, player)
}

fn tick(app: &App) -> u64 {
    app.world().resource::<SimClock>().tick
}

/// Прогоняет ровно `ticks` fixed тиков (update без fixed тика не считается)
fn run_ticks(app: &mut App, ticks: u64) {
    let target = tick(app) + ticks;
    let mut guard = 0;
    while tick(app) < target {
        app.update();
        guard += 1;
        assert!(guard < ticks * 4 + 10, "fixed tick не идёт");
    }
}

fn input_mut(app: &mut App, player: Entity) -> Mut<'_, InputSnapshot> {
    app.world_mut()
        .get_mut::<InputSnapshot>(player)
        .expect("player has InputSnapshot")
}

fn motion(app: &App, player: Entity) -> MotionState {
    app.world()
        .get::<MotionState>(player)
        .expect("player has MotionState")
        .clone()
}

fn position(app: &App, player: Entity) -> Vec3 {
    app.world()
        .get::<Transform>(player)
        .expect("player has Transform")
        .translation
}

fn push_cue(app: &mut App, player: Entity, cue: TimelineCue) {
    app.world_mut()
        .get_mut::<TimelineInbox>(player)
        .expect("player has TimelineInbox")
        .push(cue);
}

fn animation_commands(app: &App) -> Vec<AnimationCommand> {
    app.world()
        .resource::<Recorded<AnimationRequest>>()
        .0
        .iter()
        .map(|request| request.command.clone())
        .collect()
}

fn diagnostics(app: &App) -> Vec<DiagnosticKind> {
    app.world()
        .resource::<Recorded<SimDiagnostic>>()
        .0
        .iter()
        .map(|diagnostic| diagnostic.kind.clone())
        .collect()
}

#[test]
fn test_player_spawned_on_ground_does_not_land() {
    let (mut app, player) = setup_app(true);

    run_ticks(&mut app, 30);

    assert!(app.world().resource::<Recorded<Landed>>().0.is_empty());
    assert!(!animation_commands(&app).contains(&AnimationCommand::ResetJumpIndex));
    assert!(motion(&app, player).is_grounded());
    assert_eq!(position(&app, player).y, 0.0);
}

#[test]
fn test_player_spawned_in_air_lands_once() {
    let (mut app, player) = setup_app_with(true, Vec3::new(0.0, 1.0, 0.0), SimulationConfig::default());

    run_ticks(&mut app, 60);

    let landed = &app.world().resource::<Recorded<Landed>>().0;
    assert_eq!(landed.len(), 1, "ровно одно приземление на касание земли");
    assert_eq!(landed[0].entity, player);
    assert_eq!(landed[0].jump_stage, 0);
    assert!(motion(&app, player).is_grounded());
    assert_eq!(position(&app, player).y, 0.0);
}

#[test]
fn test_player_lands_on_blocker_and_walks_off() {
    let (mut app, player) = setup_app_with(true, Vec3::new(0.0, 1.0, 0.0), SimulationConfig::default());
    app.world_mut().spawn((
        Blocker {
            half_extents: Vec3::new(1.0, 0.25, 1.0),
        },
        Transform::from_xyz(0.0, 0.25, 0.0),
    ));

    run_ticks(&mut app, 60);
    let on_top = position(&app, player);
    assert!((on_top.y - 0.5).abs() < 0.01, "стоим на ящике, got {:?}", on_top);
    assert!(motion(&app, player).is_grounded());
    assert_eq!(app.world().resource::<Recorded<Landed>>().0.len(), 1);

    // Вперёд (-Z) до края и вниз на землю
    input_mut(&mut app, player).move_axis = Vec2::new(0.0, 1.0);
    run_ticks(&mut app, 60);

    let walked = position(&app, player);
    assert!(walked.z < -2.0, "ушли с ящика, got {:?}", walked);
    assert_eq!(walked.y, 0.0);
    assert_eq!(app.world().resource::<Recorded<Landed>>().0.len(), 2);
}

#[test]
fn test_double_jump_then_landing_resets_stage() {
    let (mut app, player) = setup_app(true);
    run_ticks(&mut app, 10);

    input_mut(&mut app, player).jump_pressed = true;
    run_ticks(&mut app, 1);
    assert_eq!(motion(&app, player).jump_stage(), 1);
    assert!(!input_mut(&mut app, player).jump_pressed, "edge сброшен в Cleanup");

    run_ticks(&mut app, 15);
    input_mut(&mut app, player).jump_pressed = true;
    run_ticks(&mut app, 1);
    assert_eq!(motion(&app, player).jump_stage(), 2);
    assert!(position(&app, player).y > 0.0);

    // Третий прыжок в воздухе отклоняется
    run_ticks(&mut app, 15);
    input_mut(&mut app, player).jump_pressed = true;
    run_ticks(&mut app, 1);
    assert_eq!(motion(&app, player).jump_stage(), 2);

    let mut guard = 0;
    while app.world().resource::<Recorded<Landed>>().0.is_empty() {
        run_ticks(&mut app, 1);
        guard += 1;
        assert!(guard < 300, "игрок так и не приземлился");
    }

    let landed = &app.world().resource::<Recorded<Landed>>().0;
    assert_eq!(landed.len(), 1);
    assert_eq!(landed[0].jump_stage, 2);
    assert_eq!(motion(&app, player).jump_stage(), 0);
    assert!(!motion(&app, player).is_jumping());

    let commands = animation_commands(&app);
    assert!(commands.contains(&AnimationCommand::Jump { stage: 1 }));
    assert!(commands.contains(&AnimationCommand::Jump { stage: 2 }));
    assert!(commands.contains(&AnimationCommand::ResetJumpIndex));
}

#[test]
fn test_keyboard_move_is_camera_relative() {
    let (mut app, player) = setup_app(true);
    run_ticks(&mut app, 5);

    input_mut(&mut app, player).move_axis = Vec2::new(0.0, 1.0);
    run_ticks(&mut app, 30);

    let moved = position(&app, player);
    assert!(moved.z < -0.5, "вперёд камеры = -Z, got {:?}", moved);
    assert!(moved.x.abs() < 1e-4);
    assert!(motion(&app, player).is_moving());

    input_mut(&mut app, player).move_axis = Vec2::ZERO;
    run_ticks(&mut app, 1);
    assert!(!motion(&app, player).is_moving());
}

#[test]
fn test_missing_camera_blocks_keyboard_move() {
    let (mut app, player) = setup_app(false);
    run_ticks(&mut app, 5);

    input_mut(&mut app, player).move_axis = Vec2::new(1.0, 0.0);
    run_ticks(&mut app, 10);

    assert_eq!(position(&app, player).x, 0.0);
    assert!(diagnostics(&app).contains(&DiagnosticKind::MissingCamera));
}

#[test]
fn test_full_combo_via_timeline_cues() {
    let (mut app, player) = setup_app(true);
    run_ticks(&mut app, 5);

    input_mut(&mut app, player).attack_pressed = true;
    run_ticks(&mut app, 1);
    assert!(motion(&app, player).is_attacking());
    assert!(motion(&app, player).is_input_movement_locked());
    assert!(animation_commands(&app).contains(&AnimationCommand::PlayAttack));

    // Шаг вперёд (root motion) идёт мимо lock
    push_cue(&mut app, player, TimelineCue::StrikeStep { index: 0 });
    run_ticks(&mut app, 1);
    assert!(position(&app, player).z < -0.1);

    input_mut(&mut app, player).attack_pressed = true;
    run_ticks(&mut app, 10);
    push_cue(&mut app, player, TimelineCue::ComboCheckpoint { section: 1 });
    run_ticks(&mut app, 1);

    input_mut(&mut app, player).attack_pressed = true;
    run_ticks(&mut app, 10);
    push_cue(&mut app, player, TimelineCue::ComboCheckpoint { section: 2 });
    run_ticks(&mut app, 1);

    let resolved = &app.world().resource::<Recorded<ComboCheckpointResolved>>().0;
    assert_eq!(resolved.len(), 2);
    assert!(resolved.iter().all(|checkpoint| checkpoint.advance));
    assert!(motion(&app, player).is_input_movement_locked());

    push_cue(&mut app, player, TimelineCue::ComboComplete);
    run_ticks(&mut app, 1);
    assert!(!motion(&app, player).is_attacking());
    assert!(!motion(&app, player).is_input_movement_locked());
    assert!(animation_commands(&app).contains(&AnimationCommand::StopAttack));
}

#[test]
fn test_starved_combo_ends_at_checkpoint() {
    let (mut app, player) = setup_app(true);
    run_ticks(&mut app, 5);

    input_mut(&mut app, player).attack_pressed = true;
    run_ticks(&mut app, 1);

    push_cue(&mut app, player, TimelineCue::ComboCheckpoint { section: 1 });
    run_ticks(&mut app, 1);

    let resolved = &app.world().resource::<Recorded<ComboCheckpointResolved>>().0;
    assert_eq!(resolved.len(), 1);
    assert!(!resolved[0].advance);
    assert!(!motion(&app, player).is_input_movement_locked());
}

#[test]
fn test_stale_checkpoint_without_combo_sends_no_stop() {
    let (mut app, player) = setup_app(true);
    run_ticks(&mut app, 5);

    push_cue(&mut app, player, TimelineCue::ComboCheckpoint { section: 1 });
    run_ticks(&mut app, 1);

    let resolved = &app.world().resource::<Recorded<ComboCheckpointResolved>>().0;
    assert_eq!(resolved.len(), 1);
    assert!(!resolved[0].advance);
    assert!(!animation_commands(&app).contains(&AnimationCommand::StopAttack));
    assert!(!motion(&app, player).is_attacking());
}

#[test]
fn test_combo_blocks_jump_and_slide_by_default() {
    let (mut app, player) = setup_app(true);
    run_ticks(&mut app, 5);

    input_mut(&mut app, player).attack_pressed = true;
    run_ticks(&mut app, 1);

    input_mut(&mut app, player).jump_pressed = true;
    run_ticks(&mut app, 1);
    assert_eq!(motion(&app, player).jump_stage(), 0);
    assert!(motion(&app, player).is_input_movement_locked());

    input_mut(&mut app, player).slide_held = true;
    run_ticks(&mut app, 1);
    assert!(motion(&app, player).is_input_movement_locked());

    let commands = animation_commands(&app);
    assert!(!commands.contains(&AnimationCommand::Slide));
    assert!(!commands.contains(&AnimationCommand::StopAttack));
    assert!(!commands.iter().any(|command| matches!(command, AnimationCommand::Jump { .. })));
}

#[test]
fn test_jump_cancels_combo_with_cancel_policy() {
    let mut config = SimulationConfig::default();
    config.combo.cancel_policy = ComboCancelPolicy::CancelCombo;
    let (mut app, player) = setup_app_with(true, Vec3::ZERO, config);
    run_ticks(&mut app, 5);

    input_mut(&mut app, player).attack_pressed = true;
    run_ticks(&mut app, 1);
    assert!(motion(&app, player).is_attacking());

    input_mut(&mut app, player).jump_pressed = true;
    run_ticks(&mut app, 1);

    assert!(!motion(&app, player).is_attacking());
    assert!(!motion(&app, player).is_input_movement_locked());
    assert_eq!(motion(&app, player).jump_stage(), 1);

    let commands = animation_commands(&app);
    let stop = commands.iter().position(|command| *command == AnimationCommand::StopAttack);
    let jump = commands.iter().position(|command| *command == AnimationCommand::Jump { stage: 1 });
    assert!(stop.is_some() && jump.is_some());
    assert!(stop < jump, "сначала StopAttack, потом прыжок: {:?}", commands);
}

#[test]
fn test_combo_facing_holds_while_camera_turns() {
    let (mut app, player) = setup_app(true);
    run_ticks(&mut app, 5);

    input_mut(&mut app, player).attack_pressed = true;
    run_ticks(&mut app, 1);

    app.insert_resource(CameraView::from_forward(Vec3::X));
    input_mut(&mut app, player).move_axis = Vec2::new(0.0, 1.0);
    run_ticks(&mut app, 20);

    assert!(motion(&app, player).is_attacking());
    let rotation = app
        .world()
        .get::<Transform>(player)
        .expect("player has Transform")
        .rotation;
    let forward = facing(rotation);
    assert!((forward - Vec3::NEG_Z).length() < 1e-4, "facing {:?}", forward);
    assert!(position(&app, player).x.abs() < 1e-4);
}

#[test]
fn test_slide_follows_playback_curve() {
    let (mut app, player) = setup_app(true);
    run_ticks(&mut app, 5);

    input_mut(&mut app, player).slide_held = true;
    run_ticks(&mut app, 1);
    assert!(animation_commands(&app).contains(&AnimationCommand::Slide));

    push_cue(&mut app, player, TimelineCue::SlideEnter { direction: None });
    run_ticks(&mut app, 1);
    assert!(motion(&app, player).is_sliding());

    app.world_mut()
        .get_mut::<AnimatorPlayback>(player)
        .expect("player has AnimatorPlayback")
        .normalized_time = 1.0;
    run_ticks(&mut app, 1);

    let slid = position(&app, player);
    let distance = SimulationConfig::default().locomotion.slide_total_distance;
    assert!((slid.z + distance).abs() < 1e-3, "slid to {:?}", slid);

    push_cue(&mut app, player, TimelineCue::SlideExit);
    run_ticks(&mut app, 1);
    assert!(!motion(&app, player).is_sliding());
}

#[test]
fn test_equip_slots() {
    let (mut app, player) = setup_app(true);
    run_ticks(&mut app, 2);

    input_mut(&mut app, player).equip_slot = Some(1);
    run_ticks(&mut app, 1);
    assert!(motion(&app, player).weapon_equipped());
    assert_eq!(
        app.world().get::<WeaponLoadout>(player).and_then(|loadout| loadout.equipped()),
        Some("Hammer")
    );

    input_mut(&mut app, player).equip_slot = Some(9);
    run_ticks(&mut app, 1);
    assert!(diagnostics(&app).contains(&DiagnosticKind::InvalidWeaponSlot { index: 9 }));
    assert!(motion(&app, player).weapon_equipped());

    // Тот же слот ещё раз — оружие убрано
    input_mut(&mut app, player).equip_slot = Some(1);
    run_ticks(&mut app, 1);
    assert!(!motion(&app, player).weapon_equipped());
    assert_eq!(
        app.world().get::<WeaponLoadout>(player).and_then(|loadout| loadout.equipped()),
        None
    );
}

#[test]
fn test_idle_fidget_fires_after_interval() {
    let (mut app, _player) = setup_app(true);

    // idle_alt_interval = 5s при 60Hz
    run_ticks(&mut app, 5 * 60 + 10);

    let fidgets = animation_commands(&app)
        .into_iter()
        .filter(|command| *command == AnimationCommand::IdleAlt)
        .count();
    assert_eq!(fidgets, 1);
}
