//! Boss systems (SimSet::Enemies)

use bevy::prelude::*;

use super::components::{BossTarget, BossStateKind};
use super::events::{BossAttackFired, BossStateChanged};
use super::state_machine::{sweep_hits, BossBrain};
use crate::animation::{AnimationCommand, AnimationRequest, TimelineCue, TimelineInbox};
use crate::diagnostics::{report_diagnostic, DiagnosticKind, SimDiagnostic};
use crate::player::Player;
use crate::{DeterministicRng, SimClock};

/// Система: strike cues + тик FSM
///
/// Цель: явный `BossTarget`, иначе первый `Player`.
pub fn tick_bosses(
    clock: Res<SimClock>,
    mut rng: ResMut<DeterministicRng>,
    mut bosses: Query<(
        Entity,
        &mut BossBrain,
        &mut Transform,
        &BossTarget,
        Option<&mut TimelineInbox>,
    )>,
    targets: Query<&Transform, Without<BossBrain>>,
    players: Query<Entity, (With<Player>, Without<BossBrain>)>,
    mut state_events: EventWriter<BossStateChanged>,
    mut attack_events: EventWriter<BossAttackFired>,
    mut animations: EventWriter<AnimationRequest>,
    mut diagnostics: EventWriter<SimDiagnostic>,
) {
    let fallback_target = players.iter().next();

    for (entity, mut brain, mut transform, target, inbox) in bosses.iter_mut() {
        let target_entity = target.0.or(fallback_target);
        let target_position = target_entity.and_then(|target| targets.get(target).ok()).map(|t| t.translation);

        if brain.note_target_presence(target_position.is_some()) {
            report_diagnostic(&mut diagnostics, Some(entity), DiagnosticKind::MissingTarget);
        }

        // Cues обрабатываем до тика: они относятся к уже сыгранному кадру анимации
        if let Some(mut inbox) = inbox {
            for cue in inbox.drain() {
                let TimelineCue::BossStrike { pattern } = cue else {
                    continue;
                };

                match brain.on_strike_cue(pattern) {
                    Ok(attack) => {
                        let target_hit = brain.strike_area(pattern).and_then(|size| {
                            target_position.map(|target| sweep_hits(&transform, size, target))
                        });
                        crate::log(&format!("💥 Boss {:?}: {} fired (hit: {:?})", entity, attack.name, target_hit));
                        attack_events.write(BossAttackFired {
                            boss: entity,
                            pattern,
                            name: attack.name.clone(),
                            effect: attack.effect.clone(),
                            target_hit,
                        });
                    }
                    Err(kind) => report_diagnostic(&mut diagnostics, Some(entity), kind),
                }
            }
        }

        let output = brain.tick(clock.delta, target_position, &mut transform, &mut rng.rng);

        for trigger in output.triggers {
            animations.write(AnimationRequest {
                entity,
                command: AnimationCommand::Trigger(trigger),
            });
        }

        for (from, to) in output.transitions {
            crate::log(&format!("🤖 Boss {:?}: {:?} → {:?}", entity, from, to));
            if let BossStateKind::Attack(pattern) = to {
                crate::log_info(&format!("🤖 Boss {:?}: attack pattern {}", entity, pattern));
            }
            state_events.write(BossStateChanged {
                boss: entity,
                from,
                to,
            });
        }

        for kind in output.diagnostics {
            report_diagnostic(&mut diagnostics, Some(entity), kind);
        }
    }
}
