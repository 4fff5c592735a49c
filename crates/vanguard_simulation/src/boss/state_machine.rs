//! Boss FSM: Idle → Tracking → Attack(N) → Recover → Tracking …
//!
//! Enter/Execute/Exit на enum-состояниях. Переход синхронный:
//! Exit старого → Enter нового внутри одного `change_state`.

use bevy::prelude::*;
use bevy_rapier3d::rapier::math::Vector;
use bevy_rapier3d::rapier::parry::shape::Cuboid;
use rand::Rng;

use super::components::{AttackEffect, AttackPattern, BossConfig, BossState, BossStateKind};
use crate::diagnostics::DiagnosticKind;
use crate::physics::{shapes_intersect, ActorShape};
use crate::shared::{angle_degrees, facing, flat_direction, slerp_towards};

/// Что тик FSM хочет сообщить наружу
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BossTickOutput {
    /// Triggers аниматора в порядке Enter
    pub triggers: Vec<String>,
    pub transitions: Vec<(BossStateKind, BossStateKind)>,
    pub diagnostics: Vec<DiagnosticKind>,
}

/// Равномерный выбор из `[0, count)` без повтора `last` (если есть альтернатива)
pub fn draw_pattern<R: Rng + ?Sized>(rng: &mut R, count: usize, last: Option<usize>) -> Option<usize> {
    if count == 0 {
        return None;
    }

    let mut next = rng.gen_range(0..count);
    while count > 1 && Some(next) == last {
        next = rng.gen_range(0..count);
    }
    Some(next)
}

/// Задевает ли sweep-box перед боссом (forward = -Z) капсулу цели, стоящей на `target`
///
/// Overlap считаем в локальном пространстве босса: босс только рыскает по Y,
/// поэтому вертикальная капсула цели остаётся вертикальной.
pub fn sweep_hits(boss: &Transform, size: [f32; 3], target: Vec3) -> bool {
    let [width, height, depth] = size;
    let half = Vec3::new(width, height, depth).abs() * 0.5;
    let area = Cuboid::new(Vector::new(half.x, half.y, half.z));
    let area_center = Vec3::new(0.0, half.y, -half.z);

    let actor = ActorShape::default();
    let local_feet = boss.rotation.inverse() * (target - boss.translation);

    shapes_intersect(
        area_center,
        &area,
        local_feet + actor.center_offset(),
        &actor.capsule(),
    )
}

#[derive(Component, Debug, Clone)]
pub struct BossBrain {
    pub config: BossConfig,
    state: BossState,
    started: bool,
    last_pattern: Option<usize>,
    target_missing: bool,
}

impl BossBrain {
    pub fn new(config: BossConfig) -> Self {
        Self {
            config,
            state: BossState::Idle,
            started: false,
            last_pattern: None,
            target_missing: false,
        }
    }

    pub fn current(&self) -> BossState {
        self.state
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn last_pattern(&self) -> Option<usize> {
        self.last_pattern
    }

    /// Вход в начальный Idle (один раз)
    pub fn start(&mut self, out: &mut BossTickOutput) {
        if self.started {
            return;
        }
        self.started = true;
        self.state = BossState::Idle;
        self.enter(out);
    }

    pub fn change_state(&mut self, next: BossState, out: &mut BossTickOutput) {
        let from = self.state.kind();
        self.exit();
        self.state = next;
        self.enter(out);
        out.transitions.push((from, next.kind()));
    }

    pub fn select_pattern<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<usize> {
        let next = draw_pattern(rng, self.config.patterns.len(), self.last_pattern)?;
        self.last_pattern = Some(next);
        Some(next)
    }

    /// Отмечает потерю/возврат цели; true только на первом тике потери
    pub fn note_target_presence(&mut self, present: bool) -> bool {
        let newly_missing = !present && !self.target_missing;
        self.target_missing = !present;
        newly_missing
    }

    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        target: Option<Vec3>,
        transform: &mut Transform,
        rng: &mut R,
    ) -> BossTickOutput {
        let mut out = BossTickOutput::default();
        self.start(&mut out);

        if let Some(next) = self.execute(dt, target, transform, rng, &mut out) {
            self.change_state(next, &mut out);
        }
        out
    }

    /// Animation event удара: валиден только пока играет именно этот паттерн
    pub fn on_strike_cue(&self, pattern: usize) -> Result<&AttackPattern, DiagnosticKind> {
        let invalid = DiagnosticKind::InvalidPatternIndex { index: pattern };
        let attack = self.config.patterns.get(pattern).ok_or(invalid.clone())?;

        match self.state {
            BossState::Attack { pattern: current, .. } if current == pattern => Ok(attack),
            _ => Err(invalid),
        }
    }

    /// Есть ли у паттерна область, которую надо проверить на попадание
    pub fn strike_area(&self, pattern: usize) -> Option<[f32; 3]> {
        match self.config.patterns.get(pattern)?.effect {
            AttackEffect::AreaSweep { size } => Some(size),
            _ => None,
        }
    }

    fn enter(&mut self, out: &mut BossTickOutput) {
        match self.state {
            BossState::Idle => out.triggers.push(self.config.idle_trigger.clone()),
            BossState::Tracking => {}
            BossState::Attack { pattern, .. } => match self.config.patterns.get(pattern) {
                Some(attack) => out.triggers.push(attack.trigger.clone()),
                None => out
                    .diagnostics
                    .push(DiagnosticKind::InvalidPatternIndex { index: pattern }),
            },
            BossState::Recover { .. } => out.triggers.push(self.config.recover_trigger.clone()),
        }
    }

    fn exit(&mut self) {
        crate::log(&format!("🤖 Boss leaves {:?}", self.state.kind()));
    }

    fn execute<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        target: Option<Vec3>,
        transform: &mut Transform,
        rng: &mut R,
        out: &mut BossTickOutput,
    ) -> Option<BossState> {
        match self.state {
            BossState::Idle => {
                let target = target?;
                let distance = transform.translation.distance(target);
                (distance <= self.config.detection_range).then_some(BossState::Tracking)
            }
            BossState::Tracking => self.execute_tracking(dt, target?, transform, rng, out),
            BossState::Attack { pattern, elapsed } => {
                let elapsed = elapsed + dt;
                // Паттерн исчез из конфига — сразу в Recover
                let duration = self
                    .config
                    .patterns
                    .get(pattern)
                    .map_or(0.0, |attack| attack.duration);

                if elapsed >= duration {
                    return Some(BossState::Recover { elapsed: 0.0 });
                }
                self.state = BossState::Attack { pattern, elapsed };
                None
            }
            BossState::Recover { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= self.config.recover_time {
                    return Some(BossState::Tracking);
                }
                self.state = BossState::Recover { elapsed };
                None
            }
        }
    }

    fn execute_tracking<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        target: Vec3,
        transform: &mut Transform,
        rng: &mut R,
        out: &mut BossTickOutput,
    ) -> Option<BossState> {
        let to_target = target - transform.translation;
        let direction = flat_direction(to_target);

        if let Some(direction) = direction {
            transform.rotation = slerp_towards(transform.rotation, direction, self.config.rotation_speed, dt);
        }

        let distance = to_target.length();
        if distance <= self.config.attack_range {
            // Цель строго над/под боссом считается "в прицеле"
            let angle = direction.map_or(0.0, |direction| angle_degrees(facing(transform.rotation), direction));
            if angle >= self.config.facing_threshold_degrees {
                return None;
            }

            return match self.select_pattern(rng) {
                Some(pattern) => Some(BossState::Attack { pattern, elapsed: 0.0 }),
                None => {
                    out.diagnostics.push(DiagnosticKind::NoAttackPatterns);
                    None
                }
            };
        }

        (distance > self.config.detection_range).then_some(BossState::Idle)
    }
}
