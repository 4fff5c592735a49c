//! Headless прогон Vanguard simulation
//!
//! Скриптованный ввод + эмуляция анимационного таймлайна хоста
//! (slide enter/exit, combo checkpoints, boss strikes).
//!
//! Usage: vanguard_simulation [config.ron]

use std::path::Path;

use bevy::prelude::*;
use vanguard_simulation::{
    advance_sim_clock, boss_bundle, create_headless_app, insert_orbit_camera, log, log_error,
    log_info, player_bundle, AnimationCommand, AnimationRequest, AnimatorPlayback, BossAttackFired,
    Blocker, BossStateChanged, BossStateKind, ComboCheckpointResolved, InputSnapshot, Landed, MotionState,
    Player, SimClock, SimSet, SimulationConfig, SimulationPlugin, TimelineCue, TimelineInbox,
};

const SEED: u64 = 42;
const TICKS: u64 = 900;

/// Тиков между границами ударов combo / длительность slide-анимации
const STRIKE_TICKS: u64 = 18;
const SLIDE_TICKS: u64 = 40;

/// Отложенные timeline cues (то, что в движке прислал бы Animator)
#[derive(Resource, Default)]
struct HostTimeline {
    pending: Vec<(u64, Entity, TimelineCue)>,
    slide_started_at: Option<u64>,
}

impl HostTimeline {
    fn schedule(&mut self, due: u64, entity: Entity, cue: TimelineCue) {
        self.pending.push((due, entity, cue));
    }
}

#[derive(Resource, Default, Debug)]
struct RunStats {
    landings: u32,
    boss_attacks: u32,
    boss_hits: u32,
    combo_checkpoints: u32,
}

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match SimulationConfig::load(Path::new(&path)) {
            Ok(config) => config,
            Err(err) => {
                log_error(&format!("❌ {}", err));
                std::process::exit(1);
            }
        },
        None => SimulationConfig::default(),
    };

    log_info(&format!("Starting Vanguard headless simulation (seed: {})", SEED));

    let mut app = create_headless_app(SEED);
    app.insert_resource(config.clone())
        .add_plugins(SimulationPlugin)
        .init_resource::<HostTimeline>()
        .init_resource::<RunStats>()
        .add_systems(
            FixedUpdate,
            scripted_input.in_set(SimSet::Clock).after(advance_sim_clock),
        )
        .add_systems(
            FixedUpdate,
            (emulate_player_timeline, emulate_boss_timeline, collect_stats)
                .chain()
                .after(SimSet::Enemies)
                .before(SimSet::Cleanup),
        );
    insert_orbit_camera(&mut app, config.camera.clone());

    let world = app.world_mut();
    let player = world.spawn(player_bundle(Vec3::ZERO, &config)).id();
    let boss = world
        .spawn(boss_bundle(Vec3::new(0.0, 0.0, -18.0), &config.boss, Some(player)))
        .id();
    world.spawn((
        Blocker {
            half_extents: Vec3::new(0.5, 1.5, 3.0),
        },
        Transform::from_xyz(6.0, 1.5, -6.0),
    ));
    log(&format!("🧍 Player {:?}, 🤖 Boss {:?}", player, boss));

    for tick in 0..TICKS {
        app.update();

        if tick % 100 == 0 {
            let world = app.world_mut();
            let mut players = world.query_filtered::<(&Transform, &MotionState), With<Player>>();
            if let Some((transform, motion)) = players.iter(world).next() {
                log_info(&format!(
                    "Tick {}: player at {:.2?} (grounded: {}, attacking: {}, stage: {})",
                    tick,
                    transform.translation,
                    motion.is_grounded(),
                    motion.is_attacking(),
                    motion.jump_stage()
                ));
            }
        }
    }

    let stats = app.world().resource::<RunStats>();
    log_info(&format!("Simulation complete! {:?}", stats));
}

/// Ввод игрока по номеру тика
fn scripted_input(clock: Res<SimClock>, mut players: Query<&mut InputSnapshot, With<Player>>) {
    let tick = clock.tick;
    for mut input in players.iter_mut() {
        input.move_axis = if (1..=90).contains(&tick) {
            Vec2::new(0.0, 1.0)
        } else {
            Vec2::ZERO
        };
        input.fast_run_held = (30..=90).contains(&tick);
        input.slide_held = (320..=325).contains(&tick);

        match tick {
            100 | 112 => input.jump_pressed = true,
            200 | 600 => input.equip_slot = Some(0),
            220 | 232 | 244 => input.attack_pressed = true,
            400 => input.click_destination = Some(Vec3::new(4.0, 0.0, -6.0)),
            _ => {}
        }
    }
}

/// Animator игрока: slide и combo таймлайн
fn emulate_player_timeline(
    clock: Res<SimClock>,
    mut timeline: ResMut<HostTimeline>,
    mut requests: EventReader<AnimationRequest>,
    mut resolved: EventReader<ComboCheckpointResolved>,
    mut players: Query<(&mut TimelineInbox, &mut AnimatorPlayback), With<Player>>,
) {
    let now = clock.tick;

    for request in requests.read() {
        match request.command {
            AnimationCommand::PlayAttack => {
                timeline.schedule(now + 1, request.entity, TimelineCue::StrikeStep { index: 0 });
                timeline.schedule(now + STRIKE_TICKS, request.entity, TimelineCue::ComboCheckpoint { section: 1 });
            }
            AnimationCommand::Slide => {
                timeline.schedule(now + 1, request.entity, TimelineCue::SlideEnter { direction: None });
                timeline.schedule(now + SLIDE_TICKS, request.entity, TimelineCue::SlideExit);
                timeline.slide_started_at = Some(now + 1);
            }
            _ => {}
        }
    }

    for checkpoint in resolved.read() {
        if !checkpoint.advance {
            continue;
        }
        let next = checkpoint.section + 1;
        timeline.schedule(now + 1, checkpoint.entity, TimelineCue::StrikeStep { index: checkpoint.section });
        let cue = if next < 3 {
            TimelineCue::ComboCheckpoint { section: next }
        } else {
            TimelineCue::ComboComplete
        };
        timeline.schedule(now + STRIKE_TICKS, checkpoint.entity, cue);
    }

    // Slide clip: normalized time растёт, пока идёт анимация
    let slide_time = timeline.slide_started_at.and_then(|start| {
        let elapsed = now.checked_sub(start)?;
        (elapsed <= SLIDE_TICKS).then(|| elapsed as f32 / SLIDE_TICKS as f32)
    });

    let mut due = Vec::new();
    timeline.pending.retain(|(at, entity, cue)| {
        if *at <= now {
            due.push((*entity, cue.clone()));
            false
        } else {
            true
        }
    });

    for (entity, cue) in due {
        if let Ok((mut inbox, _)) = players.get_mut(entity) {
            inbox.push(cue);
        }
    }

    for (_, mut playback) in players.iter_mut() {
        match slide_time {
            Some(t) => {
                playback.state_name = "Slide".to_string();
                playback.normalized_time = t;
            }
            None if playback.state_name == "Slide" => {
                playback.state_name = "Idle".to_string();
                playback.normalized_time = 0.0;
            }
            None => {}
        }
    }
}

/// Animator босса: удар сразу на входе в attack-клип
fn emulate_boss_timeline(mut changes: EventReader<BossStateChanged>, mut inboxes: Query<&mut TimelineInbox>) {
    for change in changes.read() {
        if let BossStateKind::Attack(pattern) = change.to {
            if let Ok(mut inbox) = inboxes.get_mut(change.boss) {
                inbox.push(TimelineCue::BossStrike { pattern });
            }
        }
    }
}

fn collect_stats(
    mut stats: ResMut<RunStats>,
    mut landed: EventReader<Landed>,
    mut attacks: EventReader<BossAttackFired>,
    mut checkpoints: EventReader<ComboCheckpointResolved>,
) {
    stats.landings += landed.read().count() as u32;
    for attack in attacks.read() {
        stats.boss_attacks += 1;
        if attack.target_hit == Some(true) {
            stats.boss_hits += 1;
            log(&format!("💥 {} hit the player", attack.name));
        }
    }
    stats.combo_checkpoints += checkpoints.read().count() as u32;
}
