//! Diagnostics — policy no-ops как события
//!
//! Геймплейные пути не возвращают ошибок: отсутствующий collaborator,
//! невалидный индекс или вырожденное направление просто пропускают
//! действие на этот тик. Каждый такой случай пишется в лог (warning)
//! и публикуется как `SimDiagnostic`, чтобы хост/тесты могли их видеть.

use bevy::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    /// Нет `CameraView` — camera-relative движение / направление combo недоступны
    MissingCamera,
    /// Slide активен, но нет `AnimatorPlayback` для кривой
    MissingAnimatorPlayback,
    /// Босс не нашёл цель (BossTarget указывает на несуществующую entity)
    MissingTarget,
    /// Strike step вне таблицы шагов combo
    InvalidComboStep { index: usize },
    /// Checkpoint с индексом вне max strikes
    InvalidCheckpoint { section: usize },
    /// Cue босса для несуществующего паттерна или паттерна, который сейчас не играет
    InvalidPatternIndex { index: usize },
    /// Босс готов атаковать, а паттернов нет
    NoAttackPatterns,
    /// Горизонтальная проекция направления ~0 (камера смотрит вертикально, slide без направления)
    DegenerateDirection,
    /// Слот оружия вне loadout
    InvalidWeaponSlot { index: usize },
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct SimDiagnostic {
    pub entity: Option<Entity>,
    pub kind: DiagnosticKind,
}

impl SimDiagnostic {
    pub fn new(entity: Option<Entity>, kind: DiagnosticKind) -> Self {
        Self { entity, kind }
    }
}

/// Пишет warning и публикует событие
pub fn report_diagnostic(
    writer: &mut EventWriter<SimDiagnostic>,
    entity: Option<Entity>,
    kind: DiagnosticKind,
) {
    crate::log_warning(&format!("⚠️ {:?}: {:?}", entity, kind));
    writer.write(SimDiagnostic::new(entity, kind));
}
