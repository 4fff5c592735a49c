//! Tuning config — все числа геймплея в одном RON файле
//!
//! Каждая секция `#[serde(default)]`: в файле достаточно указать только то,
//! что отличается от значений по умолчанию.

use bevy::prelude::*;
use ron::Options;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::animation::AnimationConfig;
use crate::boss::BossConfig;
use crate::camera::CameraConfig;
use crate::player::{ComboConfig, JumpConfig, LocomotionConfig};

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub locomotion: LocomotionConfig,
    pub jump: JumpConfig,
    pub combo: ComboConfig,
    pub boss: BossConfig,
    pub camera: CameraConfig,
    pub animation: AnimationConfig,
    pub weapon_slots: Vec<String>,
    pub ground_height: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            locomotion: LocomotionConfig::default(),
            jump: JumpConfig::default(),
            combo: ComboConfig::default(),
            boss: BossConfig::default(),
            camera: CameraConfig::default(),
            animation: AnimationConfig::default(),
            weapon_slots: vec!["Sword".to_string(), "Hammer".to_string()],
            ground_height: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigLoadError {
    pub file: String,
    pub message: String,
}

impl std::fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to load {}: {}", self.file, self.message)
    }
}

impl std::error::Error for ConfigLoadError {}

fn ron_options() -> Options {
    Options::default().with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
}

impl SimulationConfig {
    /// `source` — имя для сообщения об ошибке (путь или "<inline>")
    pub fn from_ron_str(contents: &str, source: &str) -> Result<Self, ConfigLoadError> {
        ron_options()
            .from_str(contents)
            .map_err(|e| ConfigLoadError {
                file: source.to_string(),
                message: format!("Parse error: {}", e),
            })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let file_name = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|e| ConfigLoadError {
            file: file_name.clone(),
            message: format!("IO error: {}", e),
        })?;

        let config = Self::from_ron_str(&contents, &file_name)?;
        crate::log_info(&format!("⚙️ Config loaded from {}", file_name));
        Ok(config)
    }
}
