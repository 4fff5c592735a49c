//! Integration tests: FSM босса в полном SimulationPlugin

use bevy::prelude::*;
use vanguard_simulation::{
    boss_bundle, create_headless_app, AnimationCommand, AnimationRequest, BossAttackFired,
    BossBrain, BossConfig, BossState, BossStateChanged, BossStateKind, DiagnosticKind, Player,
    SimClock, SimDiagnostic, SimSet, SimulationPlugin, TimelineCue, TimelineInbox,
};

#[derive(Resource)]
struct Recorded<E: Event + Clone>(Vec<E>);

fn record<E: Event + Clone>(mut reader: EventReader<E>, mut recorded: ResMut<Recorded<E>>) {
    recorded.0.extend(reader.read().cloned());
}

/// Босс в начале координат (смотрит в -Z), цель — неподвижный Player
fn setup_arena(seed: u64, target_position: Option<Vec3>, config: BossConfig) -> (App, Entity) {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin)
        .insert_resource(Recorded::<BossStateChanged>(Vec::new()))
        .insert_resource(Recorded::<BossAttackFired>(Vec::new()))
        .insert_resource(Recorded::<AnimationRequest>(Vec::new()))
        .insert_resource(Recorded::<SimDiagnostic>(Vec::new()))
        .add_systems(
            FixedUpdate,
            (
                record::<BossStateChanged>,
                record::<BossAttackFired>,
                record::<AnimationRequest>,
                record::<SimDiagnostic>,
            )
                .after(SimSet::Enemies),
        );

    if let Some(position) = target_position {
        // Голая цель: только маркер и Transform, без контроллеров игрока
        app.world_mut()
            .spawn((Player, Transform::from_translation(position)));
    }

    let boss = app
        .world_mut()
        .spawn(boss_bundle(Vec3::ZERO, &config, None))
        .id();

    (app, boss)
}

fn run_ticks(app: &mut App, ticks: u64) {
    let target = app.world().resource::<SimClock>().tick + ticks;
    let mut guard = 0;
    while app.world().resource::<SimClock>().tick < target {
        app.update();
        guard += 1;
        assert!(guard < ticks * 4 + 10, "fixed tick не идёт");
    }
}

fn boss_state(app: &App, boss: Entity) -> BossState {
    app.world()
        .get::<BossBrain>(boss)
        .expect("boss has BossBrain")
        .current()
}

fn transitions(app: &App) -> Vec<(BossStateKind, BossStateKind)> {
    app.world()
        .resource::<Recorded<BossStateChanged>>()
        .0
        .iter()
        .map(|change| (change.from, change.to))
        .collect()
}

fn attack_patterns(app: &App) -> Vec<usize> {
    transitions(app)
        .into_iter()
        .filter_map(|(_, to)| match to {
            BossStateKind::Attack(pattern) => Some(pattern),
            _ => None,
        })
        .collect()
}

#[test]
fn test_boss_stays_idle_without_target_in_range() {
    let (mut app, boss) = setup_arena(1, Some(Vec3::new(0.0, 0.0, -30.0)), BossConfig::default());

    run_ticks(&mut app, 120);

    assert_eq!(boss_state(&app, boss), BossState::Idle);
    assert!(transitions(&app).is_empty());

    // Вход в Idle на старте — единственный trigger
    let triggers: Vec<_> = app
        .world()
        .resource::<Recorded<AnimationRequest>>()
        .0
        .iter()
        .filter(|request| request.entity == boss)
        .map(|request| request.command.clone())
        .collect();
    assert_eq!(triggers, vec![AnimationCommand::Trigger("Idle".to_string())]);
}

#[test]
fn test_boss_attack_cycle_with_target_ahead() {
    let (mut app, boss) = setup_arena(3, Some(Vec3::new(0.0, 0.0, -5.0)), BossConfig::default());

    run_ticks(&mut app, 5);

    let seen = transitions(&app);
    assert_eq!(seen[0], (BossStateKind::Idle, BossStateKind::Tracking));
    assert!(matches!(seen[1], (BossStateKind::Tracking, BossStateKind::Attack(_))));

    // Самый длинный паттерн 3s, потом Recover 2s и снова Tracking → Attack
    run_ticks(&mut app, 60 * 6);

    let seen = transitions(&app);
    assert!(seen.contains(&(BossStateKind::Recover, BossStateKind::Tracking)));
    assert!(seen
        .iter()
        .any(|(from, to)| matches!(from, BossStateKind::Attack(_)) && *to == BossStateKind::Recover));

    let patterns = attack_patterns(&app);
    assert!(patterns.len() >= 2);
    for pair in patterns.windows(2) {
        assert_ne!(pair[0], pair[1], "паттерн не повторяется подряд");
    }

    let overheat = AnimationCommand::Trigger("Overheat".to_string());
    assert!(app
        .world()
        .resource::<Recorded<AnimationRequest>>()
        .0
        .iter()
        .any(|request| request.entity == boss && request.command == overheat));
}

#[test]
fn test_strike_cue_fires_attack_event() {
    // Цель в пределах sweep-области перед боссом
    let (mut app, boss) = setup_arena(5, Some(Vec3::new(0.0, 0.0, -2.0)), BossConfig::default());

    run_ticks(&mut app, 5);
    let BossState::Attack { pattern, .. } = boss_state(&app, boss) else {
        panic!("boss should be attacking, got {:?}", boss_state(&app, boss));
    };

    app.world_mut()
        .get_mut::<TimelineInbox>(boss)
        .expect("boss has TimelineInbox")
        .push(TimelineCue::BossStrike { pattern });
    run_ticks(&mut app, 1);

    let fired = &app.world().resource::<Recorded<BossAttackFired>>().0;
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].pattern, pattern);
    assert_eq!(fired[0].name, BossConfig::default().patterns[pattern].name);
    if pattern == 0 {
        assert_eq!(fired[0].target_hit, Some(true));
    } else {
        assert_eq!(fired[0].target_hit, None);
    }
}

#[test]
fn test_strike_cue_for_other_pattern_is_diagnosed() {
    let (mut app, boss) = setup_arena(5, Some(Vec3::new(0.0, 0.0, -2.0)), BossConfig::default());

    run_ticks(&mut app, 5);
    let BossState::Attack { pattern, .. } = boss_state(&app, boss) else {
        panic!("boss should be attacking");
    };
    let other = (pattern + 1) % BossConfig::default().patterns.len();

    app.world_mut()
        .get_mut::<TimelineInbox>(boss)
        .expect("boss has TimelineInbox")
        .push(TimelineCue::BossStrike { pattern: other });
    run_ticks(&mut app, 1);

    assert!(app.world().resource::<Recorded<BossAttackFired>>().0.is_empty());
    let diagnostics = &app.world().resource::<Recorded<SimDiagnostic>>().0;
    assert!(diagnostics
        .iter()
        .any(|diagnostic| diagnostic.kind == DiagnosticKind::InvalidPatternIndex { index: other }));
}

#[test]
fn test_missing_target_reported_once() {
    let (mut app, boss) = setup_arena(9, None, BossConfig::default());

    run_ticks(&mut app, 30);

    assert_eq!(boss_state(&app, boss), BossState::Idle);
    let missing = app
        .world()
        .resource::<Recorded<SimDiagnostic>>()
        .0
        .iter()
        .filter(|diagnostic| diagnostic.kind == DiagnosticKind::MissingTarget)
        .count();
    assert_eq!(missing, 1);
}

#[test]
fn test_empty_pattern_list_keeps_tracking() {
    let config = BossConfig {
        patterns: Vec::new(),
        ..BossConfig::default()
    };
    let (mut app, boss) = setup_arena(2, Some(Vec3::new(0.0, 0.0, -5.0)), config);

    run_ticks(&mut app, 20);

    assert_eq!(boss_state(&app, boss), BossState::Tracking);
    assert!(app
        .world()
        .resource::<Recorded<SimDiagnostic>>()
        .0
        .iter()
        .any(|diagnostic| diagnostic.kind == DiagnosticKind::NoAttackPatterns));
}
