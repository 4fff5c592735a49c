//! Collision world для kinematic акторов (rapier/parry shape queries)
//!
//! Ground plane (y = ground_height) + статические cuboid blockers.
//! Актор — вертикальная капсула (как `Collider::capsule_y(0.5, 0.4)`), ноги = низ капсулы.
//! Перемещение как у KinematicCharacterController: горизонталь с fallback на
//! скольжение по осям, вертикаль упирается в верх/низ blockers через contact bisection.

use bevy::prelude::*;
use bevy_rapier3d::rapier::parry::query;
use bevy_rapier3d::rapier::parry::shape::{Capsule, Cuboid, Shape};
use bevy_rapier3d::rapier::math::{Isometry, Real, Vector};

/// Допуск на касание земли (numerical errors после интеграции)
pub const GROUND_SKIN: f32 = 0.001;

/// Зазор, который оставляем между капсулой и поверхностью blocker'а после контакта
pub const CONTACT_SKIN: f32 = 0.005;

/// Итераций bisection при поиске точки контакта по вертикали
const CONTACT_ITERATIONS: usize = 14;

/// Статическое препятствие, центр = Transform.translation
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Blocker {
    pub half_extents: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockerVolume {
    pub center: Vec3,
    pub shape: Cuboid,
}

impl BlockerVolume {
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            center,
            shape: Cuboid::new(Vector::new(half.x, half.y, half.z)),
        }
    }

    pub fn top(&self) -> f32 {
        self.center.y + self.shape.half_extents.y
    }
}

/// Форма актора: капсула вдоль Y, стоящая на точке ног
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorShape {
    pub half_height: f32,
    pub radius: f32,
}

impl Default for ActorShape {
    fn default() -> Self {
        Self {
            half_height: 0.5,
            radius: 0.4,
        }
    }
}

impl ActorShape {
    pub fn capsule(&self) -> Capsule {
        Capsule::new_y(self.half_height as Real, self.radius as Real)
    }

    /// Центр капсулы над точкой ног
    pub fn center_offset(&self) -> Vec3 {
        Vec3::Y * (self.half_height + self.radius)
    }
}

pub(crate) fn isometry_at(point: Vec3) -> Isometry<Real> {
    Isometry::translation(point.x as Real, point.y as Real, point.z as Real)
}

/// Пересекаются ли две формы (unsupported пара = нет пересечения)
pub(crate) fn shapes_intersect(
    first_at: Vec3,
    first: &dyn Shape,
    second_at: Vec3,
    second: &dyn Shape,
) -> bool {
    matches!(
        query::intersection_test(&isometry_at(first_at), first, &isometry_at(second_at), second),
        Ok(true)
    )
}

/// Результат одного `move_and_collide` (аналог CharacterController.Move + isGrounded)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveResult {
    pub position: Vec3,
    pub grounded: bool,
}

#[derive(Resource, Debug, Clone)]
pub struct CollisionWorld {
    pub ground_height: f32,
    pub actor: ActorShape,
    pub blockers: Vec<BlockerVolume>,
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self {
            ground_height: 0.0,
            actor: ActorShape::default(),
            blockers: Vec::new(),
        }
    }
}

impl CollisionWorld {
    /// Пересекает ли капсула актора с ногами в `feet` хоть один blocker
    pub fn is_blocked(&self, feet: Vec3) -> bool {
        let capsule = self.actor.capsule();
        let center = feet + self.actor.center_offset();
        self.blockers
            .iter()
            .any(|blocker| shapes_intersect(center, &capsule, blocker.center, &blocker.shape))
    }

    /// Двигает актора на `delta`, упираясь в blockers и землю
    ///
    /// Горизонталь: полный шаг → только X → только Z → стоим.
    /// Вертикаль: шаг до контакта с blocker'ом (сверху = опора), ниже земли не проваливаемся.
    /// Уже застрявший в blocker'е актор двигается свободно, пока не выйдет.
    pub fn move_and_collide(&self, from: Vec3, delta: Vec3) -> MoveResult {
        let penetrating = self.is_blocked(from);
        let free = |point: Vec3| penetrating || !self.is_blocked(point);

        let mut position = from;
        let horizontal = Vec3::new(delta.x, 0.0, delta.z);
        if horizontal != Vec3::ZERO {
            let candidates = [
                horizontal,
                Vec3::new(horizontal.x, 0.0, 0.0),
                Vec3::new(0.0, 0.0, horizontal.z),
            ];

            if let Some(step) = candidates
                .iter()
                .filter(|step| **step != Vec3::ZERO)
                .find(|step| free(from + **step))
            {
                position += *step;
            }
        }

        let mut grounded = false;
        if delta.y != 0.0 {
            // Проверяем точку на skin дальше шага: останавливаемся с зазором, а не вплотную
            let probe = position + Vec3::Y * (delta.y + delta.y.signum() * CONTACT_SKIN);
            if free(probe) {
                position.y += delta.y;
            } else {
                position.y = self.vertical_contact(position, delta.y);
                // Контакт снизу = стоим на blocker'е
                grounded = delta.y < 0.0;
            }
        }

        if position.y <= self.ground_height + GROUND_SKIN {
            position.y = self.ground_height;
            grounded = delta.y <= 0.0;
        }

        MoveResult { position, grounded }
    }

    /// Высота ног после вертикального шага до контакта (с зазором CONTACT_SKIN)
    fn vertical_contact(&self, position: Vec3, dy: f32) -> f32 {
        let direction = dy.signum();
        let mut reached = 0.0_f32;
        let mut blocked = dy.abs() + CONTACT_SKIN;
        for _ in 0..CONTACT_ITERATIONS {
            let mid = (reached + blocked) * 0.5;
            if self.is_blocked(position + Vec3::Y * direction * mid) {
                blocked = mid;
            } else {
                reached = mid;
            }
        }

        let travel = (reached - CONTACT_SKIN).clamp(0.0, dy.abs());
        position.y + direction * travel
    }
}

/// Система: пересобирает blockers из `Blocker` + Transform (раз в тик, SimSet::Clock)
pub fn sync_collision_world(
    mut world: ResMut<CollisionWorld>,
    blockers: Query<(&Blocker, &Transform)>,
) {
    world.blockers.clear();
    world.blockers.extend(
        blockers
            .iter()
            .map(|(blocker, transform)| BlockerVolume::from_center(transform.translation, blocker.half_extents)),
    );
}
