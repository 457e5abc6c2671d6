use crate::error::PersistenceError;
use crate::serializer::Serializer;
use crate::store::KeyValueStore;
use log::{debug, info, warn};
use mascot_simulation::{CollisionRecord, MascotRecord, Persistence};
use std::time::{SystemTime, UNIX_EPOCH};

pub const DATA_KEY: &str = "mascots-data";
pub const LEGACY_IMAGE_KEY: &str = "mascot-image";
pub const LEGACY_IS_CUSTOM_KEY: &str = "mascot-is-custom";
pub const LEGACY_SIZE_KEY: &str = "mascot-size";
pub const LEGACY_DISABLED_KEY: &str = "mascot-disabled";
pub const LEGACY_NO_FLOAT_KEY: &str = "mascot-no-float";
pub const COLLISION_ENABLED_KEY: &str = "collision-enabled";
pub const COLLISION_STRENGTH_KEY: &str = "collision-strength";
pub const COLLISION_MESSAGES_KEY: &str = "collision-messages";

const LEGACY_KEYS: [&str; 5] = [
    LEGACY_IMAGE_KEY,
    LEGACY_IS_CUSTOM_KEY,
    LEGACY_SIZE_KEY,
    LEGACY_DISABLED_KEY,
    LEGACY_NO_FLOAT_KEY,
];
const LEGACY_DEFAULT_SIZE: f64 = 64.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Full,
    /// Written after dropping `dropped` oversized embedded images.
    Degraded { dropped: usize },
}

/// Reads and writes the mascot collection through a key-value store.
pub struct MascotRepository {
    store: Box<dyn KeyValueStore>,
    serializer: Box<dyn Serializer>,
    degrade_threshold_bytes: usize,
}

impl MascotRepository {
    pub fn new(store: Box<dyn KeyValueStore>, serializer: Box<dyn Serializer>, degrade_threshold_bytes: usize) -> Self {
        Self { store, serializer, degrade_threshold_bytes }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Full write first; on failure one retry without large embedded images.
    pub fn save(&mut self, records: &[MascotRecord]) -> Result<SaveOutcome, PersistenceError> {
        let err = match self.write(records) {
            Ok(()) => return Ok(SaveOutcome::Full),
            Err(err) => err,
        };

        let (degraded, dropped) = strip_large_images(records, self.degrade_threshold_bytes);
        if dropped == 0 {
            return Err(err);
        }
        warn!(
            "Saving {} mascots failed ({}); retrying without {} embedded images",
            records.len(),
            err,
            dropped
        );
        self.write(&degraded)?;
        info!("Saved mascots in degraded form");
        Ok(SaveOutcome::Degraded { dropped })
    }

    fn write(&mut self, records: &[MascotRecord]) -> Result<(), PersistenceError> {
        let bytes = self.serializer.encode(records)?;
        self.store.set(DATA_KEY, &bytes)?;
        debug!("Wrote {} mascots ({} bytes)", records.len(), bytes.len());
        Ok(())
    }

    /// `None` means no usable state. Unreadable data counts as absent, and
    /// the single-mascot legacy keys are migrated when present.
    pub fn load(&mut self) -> Result<Option<Vec<MascotRecord>>, PersistenceError> {
        if let Some(bytes) = self.store.get(DATA_KEY)? {
            match self.serializer.decode(&bytes) {
                Ok(records) if !records.is_empty() => return Ok(Some(records)),
                Ok(_) => debug!("Stored mascot collection is empty"),
                Err(err) => warn!("Ignoring unreadable mascot data: {}", err),
            }
        }
        self.migrate_legacy()
    }

    fn read_string(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self
            .store
            .get(key)?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn read_flag(&self, key: &str) -> Result<bool, PersistenceError> {
        Ok(self.read_string(key)?.is_some_and(|value| value.trim() == "true"))
    }

    /// Each preference lives under its own key as plain text.
    pub fn save_collision(&mut self, settings: &CollisionRecord) -> Result<(), PersistenceError> {
        if let Some(enabled) = settings.enabled {
            self.store.set(COLLISION_ENABLED_KEY, enabled.to_string().as_bytes())?;
        }
        if let Some(strength) = settings.strength {
            self.store.set(COLLISION_STRENGTH_KEY, strength.to_string().as_bytes())?;
        }
        if let Some(show) = settings.show_messages {
            self.store.set(COLLISION_MESSAGES_KEY, show.to_string().as_bytes())?;
        }
        debug!("Wrote collision settings {:?}", settings);
        Ok(())
    }

    /// `None` when no preference was ever stored. An unparsable strength
    /// is ignored.
    pub fn load_collision(&mut self) -> Result<Option<CollisionRecord>, PersistenceError> {
        let settings = CollisionRecord {
            enabled: self.read_string(COLLISION_ENABLED_KEY)?.map(|value| value.trim() == "true"),
            strength: self
                .read_string(COLLISION_STRENGTH_KEY)?
                .and_then(|raw| raw.trim().parse::<f32>().ok())
                .filter(|strength| strength.is_finite()),
            show_messages: self.read_string(COLLISION_MESSAGES_KEY)?.map(|value| value.trim() == "true"),
        };
        Ok((!settings.is_empty()).then_some(settings))
    }

    fn migrate_legacy(&mut self) -> Result<Option<Vec<MascotRecord>>, PersistenceError> {
        let Some(image) = self.read_string(LEGACY_IMAGE_KEY)? else {
            return Ok(None);
        };

        let size = self
            .read_string(LEGACY_SIZE_KEY)?
            .and_then(|raw| leading_integer(&raw))
            .filter(|size| *size > 0)
            .map_or(LEGACY_DEFAULT_SIZE, |size| size as f64);

        let mut record = MascotRecord::bare(legacy_id());
        record.image = Some(image);
        record.is_custom = Some(self.read_flag(LEGACY_IS_CUSTOM_KEY)?);
        record.size = Some(size);
        record.disabled = Some(self.read_flag(LEGACY_DISABLED_KEY)?);
        record.no_float = Some(self.read_flag(LEGACY_NO_FLOAT_KEY)?);
        let records = vec![record];

        self.save(&records)?;
        for key in LEGACY_KEYS {
            self.store.remove(key)?;
        }
        info!("Migrated legacy single-mascot settings");
        Ok(Some(records))
    }
}

impl Persistence for MascotRepository {
    fn save(&mut self, records: Vec<MascotRecord>) -> bool {
        match MascotRepository::save(self, &records) {
            Ok(_) => true,
            Err(err) => {
                warn!("Could not save mascots: {}", err);
                false
            }
        }
    }

    fn load(&mut self) -> Option<Vec<MascotRecord>> {
        MascotRepository::load(self).unwrap_or_else(|err| {
            warn!("Could not load mascots: {}", err);
            None
        })
    }

    fn save_collision(&mut self, settings: CollisionRecord) -> bool {
        match MascotRepository::save_collision(self, &settings) {
            Ok(()) => true,
            Err(err) => {
                warn!("Could not save collision settings: {}", err);
                false
            }
        }
    }

    fn load_collision(&mut self) -> Option<CollisionRecord> {
        MascotRepository::load_collision(self).unwrap_or_else(|err| {
            warn!("Could not load collision settings: {}", err);
            None
        })
    }
}

/// Integer at the start of `raw` after leading whitespace, ignoring any
/// trailing text: `"100px"` and `"100.7"` both give 100.
fn leading_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    let digits = unsigned.len() - unsigned.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let sign_len = raw.len() - unsigned.len();
    raw[..sign_len + digits].parse().ok()
}

fn legacy_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    format!("mascot_{millis}_legacy")
}

/// Decoded payload size of a `data:` URI, or `None` for plain references.
pub fn embedded_image_bytes(image: &str) -> Option<usize> {
    let rest = image.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    if header.ends_with(";base64") {
        Some(base64::decode(payload).map_or(payload.len(), |bytes| bytes.len()))
    } else {
        Some(payload.len())
    }
}

/// Copies `records`, replacing embedded images above `threshold` bytes
/// with the built-in sprite. Returns the copy and how many were dropped.
pub fn strip_large_images(records: &[MascotRecord], threshold: usize) -> (Vec<MascotRecord>, usize) {
    let mut dropped = 0;
    let stripped = records
        .iter()
        .cloned()
        .map(|mut record| {
            let oversized = record
                .image
                .as_deref()
                .and_then(embedded_image_bytes)
                .is_some_and(|bytes| bytes > threshold);
            if oversized {
                record.image = None;
                record.is_custom = Some(false);
                dropped += 1;
            }
            record
        })
        .collect();
    (stripped, dropped)
}
