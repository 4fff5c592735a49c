//! Vanguard Simulation Core
//!
//! Headless ECS-симуляция на Bevy 0.16: локомоция/прыжок/combo игрока
//! и FSM босса. Рендер, анимация, ввод и камера движка — у хоста;
//! сюда приходят только данные (InputSnapshot, CameraView, TimelineInbox,
//! AnimatorPlayback), наружу уходят события и AnimatorParams.
//!
//! Порядок тика (FixedUpdate, 60Hz):
//! Clock → Actions → Motion → WriteBack → Enemies → Cleanup

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

pub mod animation;
pub mod boss;
pub mod camera;
pub mod config;
pub mod diagnostics;
pub mod input;
pub mod logger;
pub mod physics;
pub mod player;
pub mod shared;

pub use animation::{
    AnimationCommand, AnimationConfig, AnimationRequest, AnimatorParams, AnimatorPlayback,
    IdleFidget, TimelineCue, TimelineInbox,
};
pub use boss::{
    boss_bundle, spawn_boss, AttackEffect, AttackPattern, Boss, BossAttackFired, BossBrain,
    BossConfig, BossPlugin, BossState, BossStateChanged, BossStateKind, BossTarget,
};
pub use camera::{insert_orbit_camera, CameraConfig, CameraPlugin, CameraView, OrbitCamera};
pub use config::{ConfigLoadError, SimulationConfig};
pub use diagnostics::{DiagnosticKind, SimDiagnostic};
pub use input::InputSnapshot;
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel,
    LogPrinter, MemoryLogger,
};
pub use physics::{Blocker, CollisionWorld};
pub use player::{
    player_bundle, spawn_player, ComboCancelPolicy, ComboCheckpointResolved, ComboController,
    JumpController, Landed, LocomotionController, MotionState, Player, PlayerPlugin, WeaponLoadout,
};

/// Длительность одного fixed tick (60Hz)
pub const TICK: Duration = Duration::from_nanos(16_666_667);

/// Фазы тика, строго последовательно
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    /// Часы, collision world, камера
    Clock,
    /// Timeline cues + one-shot edges ввода (jump / slide / attack / equip)
    Actions,
    /// Локомоция и гравитация
    Motion,
    /// Facing override, проекция в аниматор, idle fidget
    WriteBack,
    Enemies,
    /// Сброс one-shot edges
    Cleanup,
}

/// Часы симуляции: номер тика (для de-dup "один раз за кадр") и время
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
    pub tick: u64,
    pub elapsed: f32,
    pub delta: f32,
}

impl SimClock {
    pub fn advance(&mut self, delta: f32) {
        self.tick += 1;
        self.delta = delta;
        self.elapsed += delta;
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Система: продвигает SimClock на fixed delta
pub fn advance_sim_clock(time: Res<Time<Fixed>>, mut clock: ResMut<SimClock>) {
    clock.advance(time.delta_secs());
}

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Ресурсы, которые уже вставлены (DeterministicRng, SimulationConfig),
/// не перезаписываются.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }
        app.init_resource::<SimulationConfig>();

        let config = app.world().resource::<SimulationConfig>().clone();

        app.insert_resource(Time::<Fixed>::from_duration(TICK))
            .init_resource::<SimClock>()
            .insert_resource(CollisionWorld {
                ground_height: config.ground_height,
                ..Default::default()
            })
            .insert_resource(config.animation.clone())
            .add_event::<AnimationRequest>()
            .add_event::<SimDiagnostic>()
            .configure_sets(
                FixedUpdate,
                (
                    SimSet::Clock,
                    SimSet::Actions,
                    SimSet::Motion,
                    SimSet::WriteBack,
                    SimSet::Enemies,
                    SimSet::Cleanup,
                )
                    .chain(),
            )
            .add_systems(
                FixedUpdate,
                (advance_sim_clock, physics::sync_collision_world)
                    .chain()
                    .in_set(SimSet::Clock),
            )
            .add_systems(
                FixedUpdate,
                (animation::project_animator_params, animation::update_idle_fidget)
                    .chain()
                    .in_set(SimSet::WriteBack)
                    .after(player::systems::apply_combo_facing),
            )
            .add_systems(FixedUpdate, input::consume_input_edges.in_set(SimSet::Cleanup))
            .add_plugins((PlayerPlugin, BossPlugin, CameraPlugin));

        crate::log("🚀 SimulationPlugin ready");
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время шагает вручную: один `app.update()` = один fixed tick.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_duration(TICK))
        .insert_resource(TimeUpdateStrategy::ManualDuration(TICK));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
