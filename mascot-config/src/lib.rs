use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

// --- Error Type ---
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

// --- Enums for Choices ---
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageFormat {
    #[default]
    Json,
    Binary,
}

/// Where mascot records are kept between runs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageBackend {
    /// One file per storage key inside `path`.
    File { path: String },
    /// Process-local map, optionally capped to emulate a storage quota.
    Memory {
        #[serde(default)]
        quota_bytes: Option<usize>,
    },
}

impl Default for StorageBackend {
    fn default() -> Self {
        StorageBackend::File { path: default_storage_path() }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PointerScript {
    None,
    #[default]
    Orbit,
}

// --- Configuration Sections ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ViewportSettings {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self { width: 1280.0, height: 720.0 }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    #[serde(default = "default_true")]
    pub collisions_enabled: bool,
    /// Collision restitution ("strength"); clamped to [0, 1] on use.
    #[serde(default = "default_restitution")]
    pub restitution: f32,
    #[serde(default = "default_true")]
    pub show_collision_messages: bool,
    #[serde(default = "default_cell_size")]
    pub grid_cell_size: f32,
    #[serde(default = "default_max_projectiles")]
    pub max_projectiles: usize,
    #[serde(default = "default_max_particles")]
    pub max_particles: usize,
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: f64,
    #[serde(default = "default_ai_interval_ms")]
    pub ai_interval_ms: f64,
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

fn default_true() -> bool { true }
fn default_restitution() -> f32 { 0.8 }
fn default_cell_size() -> f32 { 150.0 }
fn default_max_projectiles() -> usize { 100 }
fn default_max_particles() -> usize { 300 }
fn default_save_debounce_ms() -> f64 { 500.0 }
fn default_ai_interval_ms() -> f64 { 100.0 }

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            collisions_enabled: true,
            restitution: default_restitution(),
            show_collision_messages: true,
            grid_cell_size: default_cell_size(),
            max_projectiles: default_max_projectiles(),
            max_particles: default_max_particles(),
            save_debounce_ms: default_save_debounce_ms(),
            ai_interval_ms: default_ai_interval_ms(),
            rng_seed: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PersistenceSettings {
    #[serde(default)]
    pub format: StorageFormat,
    #[serde(default)]
    pub backend: StorageBackend,
    /// Embedded images larger than this are dropped by the degraded save.
    #[serde(default = "default_degrade_threshold")]
    pub degrade_threshold_bytes: usize,
}

fn default_storage_path() -> String { "mascot-data".to_string() }
fn default_degrade_threshold() -> usize { 64 * 1024 }

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            format: StorageFormat::default(),
            backend: StorageBackend::default(),
            degrade_threshold_bytes: default_degrade_threshold(),
        }
    }
}

/// Mascots to create when nothing has been persisted yet.
/// `ai` and `weapon` are free-form; unknown names fall back to defaults.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InitialMascotConfig {
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub ai: Option<String>,
    #[serde(default)]
    pub weapon: Option<String>,
    #[serde(default)]
    pub action_mode: bool,
}

fn default_count() -> u32 { 1 }

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunnerSettings {
    #[serde(default)]
    pub pointer: PointerScript,
    #[serde(default)]
    pub demo_fire: bool,
    #[serde(default = "default_stats_every")]
    pub stats_every_frames: u32,
}

fn default_stats_every() -> u32 { 600 }

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            pointer: PointerScript::default(),
            demo_fire: false,
            stats_every_frames: default_stats_every(),
        }
    }
}

// --- Top-Level Config Struct ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_framerate")]
    pub framerate: u32,
    #[serde(default)]
    pub viewport: ViewportSettings,
    #[serde(default)]
    pub simulation: SimulationSettings,
    #[serde(default)]
    pub persistence: PersistenceSettings,
    #[serde(default)]
    pub initial_state: Vec<InitialMascotConfig>,
    #[serde(default)]
    pub runner: RunnerSettings,
}

fn default_framerate() -> u32 { 60 }

impl Default for Config {
    fn default() -> Self {
        Self {
            framerate: default_framerate(),
            viewport: ViewportSettings::default(),
            simulation: SimulationSettings::default(),
            persistence: PersistenceSettings::default(),
            initial_state: Vec::new(),
            runner: RunnerSettings::default(),
        }
    }
}

// --- Loading Function ---

/// Reads a config file, choosing TOML for `.toml` paths and JSON otherwise,
/// then validates it.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let config: Config = if is_toml {
        toml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };

    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.framerate == 0 {
        return Err(ConfigError::Validation("Framerate cannot be zero.".to_string()));
    }

    if config.viewport.width <= 0.0 || config.viewport.height <= 0.0 {
        return Err(ConfigError::Validation("Viewport dimensions must be positive.".to_string()));
    }

    if config.simulation.grid_cell_size <= 0.0 {
        return Err(ConfigError::Validation("Grid cell size must be positive.".to_string()));
    }

    if config.simulation.max_projectiles == 0 {
        return Err(ConfigError::Validation("Projectile cap must be greater than 0.".to_string()));
    }

    if config.simulation.save_debounce_ms < 0.0 || config.simulation.ai_interval_ms < 0.0 {
        return Err(ConfigError::Validation("Timer intervals cannot be negative.".to_string()));
    }

    Ok(())
}

impl SimulationSettings {
    /// Restitution clamped into the physically meaningful range.
    pub fn clamped_restitution(&self) -> f32 {
        if self.restitution.is_finite() {
            self.restitution.clamp(0.0, 1.0)
        } else {
            default_restitution()
        }
    }
}
