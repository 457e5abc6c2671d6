//! Persistence collaborator contract and the record shape it stores.

use serde::{Deserialize, Serialize};

/// One persisted mascot. Every field except `id` is optional so that
/// older or hand-edited records still load; missing values fall back to
/// the mascot defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MascotRecord {
    pub id: String,
    pub image: Option<String>,
    pub is_custom: Option<bool>,
    pub size: Option<f64>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub vx: Option<f32>,
    pub vy: Option<f32>,
    pub disabled: Option<bool>,
    pub no_float: Option<bool>,
    pub effect3d: Option<bool>,
    pub action_mode: Option<bool>,
    pub weapon_type: Option<String>,
    pub ai_type: Option<String>,
}

impl MascotRecord {
    /// A record carrying only an id.
    pub fn bare(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            image: None,
            is_custom: None,
            size: None,
            x: None,
            y: None,
            vx: None,
            vy: None,
            disabled: None,
            no_float: None,
            effect3d: None,
            action_mode: None,
            weapon_type: None,
            ai_type: None,
        }
    }
}

/// Persisted collision preferences. A missing field keeps the configured
/// value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionRecord {
    pub enabled: Option<bool>,
    pub strength: Option<f32>,
    pub show_messages: Option<bool>,
}

impl CollisionRecord {
    pub fn is_empty(&self) -> bool {
        self.enabled.is_none() && self.strength.is_none() && self.show_messages.is_none()
    }
}

/// Where the manager hands snapshots of its mascots.
pub trait Persistence {
    /// Best-effort and fire-and-forget from the simulation's point of view.
    /// Returns whether the snapshot was accepted (written or queued).
    fn save(&mut self, records: Vec<MascotRecord>) -> bool;

    /// `None` or an empty list means there is no previous state.
    fn load(&mut self) -> Option<Vec<MascotRecord>>;

    /// Stores the collision preferences. Stores without a place for them
    /// accept and drop the value.
    fn save_collision(&mut self, _settings: CollisionRecord) -> bool {
        true
    }

    fn load_collision(&mut self) -> Option<CollisionRecord> {
        None
    }
}

/// Keeps nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPersistence;

impl Persistence for NullPersistence {
    fn save(&mut self, _records: Vec<MascotRecord>) -> bool {
        true
    }

    fn load(&mut self) -> Option<Vec<MascotRecord>> {
        None
    }
}
