//! Player events (наружу: анимация/UI/звук)

use bevy::prelude::*;

/// Подтверждённое приземление (ровно одно на касание земли)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct Landed {
    pub entity: Entity,
    /// Stage прыжка до сброса (0 = просто упал)
    pub jump_stage: u8,
}

/// Ответ на combo checkpoint: продолжать серию или нет
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ComboCheckpointResolved {
    pub entity: Entity,
    pub section: usize,
    pub advance: bool,
}
