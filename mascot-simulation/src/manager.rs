//! The simulation manager: sole owner of mascots and projectiles.
//!
//! Per visible frame the order is fixed: held triggers fire, population
//! caps are enforced, projectiles advance (and apply their hits), mascots
//! advance, the grid is rebuilt, then neighbouring pairs are resolved.
//! Hidden frames only service the save debounce.

use crate::debounce::Debouncer;
use crate::effects::Effects;
use crate::error::SimError;
use crate::geometry::{pair_mut, Vec2, Viewport};
use crate::mascot::{AiPersonality, Mascot, MascotConfig, MascotId, TickContext};
use crate::persistence::{CollisionRecord, NullPersistence, Persistence};
use crate::projectile::Projectile;
use crate::spatial::SpatialGrid;
use crate::weapon::{FireTrigger, WeaponType};
use log::{debug, info, warn};
use mascot_config::{InitialMascotConfig, SimulationSettings};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Persisted state is being restored; autosave is suppressed.
    Loading,
    Running,
}

/// Host input for one animation frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub now_ms: f64,
    pub pointer: Option<Vec2>,
    pub visible: bool,
}

impl Frame {
    pub fn visible(now_ms: f64, pointer: Option<Vec2>) -> Self {
        Self { now_ms, pointer, visible: true }
    }

    pub fn hidden(now_ms: f64) -> Self {
        Self { now_ms, pointer: None, visible: false }
    }
}

pub struct Manager {
    settings: SimulationSettings,
    viewport: Viewport,
    mascots: Vec<Mascot>,
    projectiles: VecDeque<Projectile>,
    next_projectile_id: u64,
    grid: SpatialGrid,
    persistence: Box<dyn Persistence>,
    save_debounce: Debouncer,
    collision_dirty: bool,
    lifecycle: Lifecycle,
    selected: Option<MascotId>,
    rng: StdRng,
    frame_count: u64,
    last_now_ms: f64,
}

impl Manager {
    /// An empty manager in the `Loading` state. Call [`Manager::restore`]
    /// to populate it and start running.
    pub fn new(settings: SimulationSettings, viewport: Viewport) -> Self {
        let rng = match settings.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            grid: SpatialGrid::new(settings.grid_cell_size),
            save_debounce: Debouncer::new(settings.save_debounce_ms),
            settings,
            viewport,
            mascots: Vec::new(),
            projectiles: VecDeque::new(),
            next_projectile_id: 0,
            persistence: Box::new(NullPersistence),
            collision_dirty: false,
            lifecycle: Lifecycle::Loading,
            selected: None,
            rng,
            frame_count: 0,
            last_now_ms: 0.0,
        }
    }

    pub fn with_persistence(mut self, persistence: Box<dyn Persistence>) -> Self {
        self.persistence = persistence;
        self
    }

    /// Loads persisted collision preferences and mascots, falling back to
    /// `initial` and finally to a single default mascot. Nothing is saved
    /// while this runs.
    pub fn restore(&mut self, initial: &[InitialMascotConfig]) {
        self.lifecycle = Lifecycle::Loading;
        self.save_debounce.cancel();
        self.collision_dirty = false;
        self.mascots.clear();
        self.projectiles.clear();
        self.selected = None;

        if let Some(saved) = self.persistence.load_collision() {
            self.apply_collision_record(saved);
        }

        let configs: Vec<MascotConfig> = match self.persistence.load() {
            Some(records) if !records.is_empty() => {
                info!("Restoring {} persisted mascots", records.len());
                records.into_iter().map(MascotConfig::from).collect()
            }
            _ => initial
                .iter()
                .flat_map(|entry| std::iter::repeat(MascotConfig::from(entry)).take(entry.count as usize))
                .collect(),
        };
        for config in configs {
            self.add_mascot(config);
        }
        if self.mascots.is_empty() {
            self.add_mascot(MascotConfig::default());
        }

        self.lifecycle = Lifecycle::Running;
        info!("Manager running with {} mascots", self.mascots.len());
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn mascots(&self) -> &[Mascot] {
        &self.mascots
    }

    pub fn mascot(&self, id: &MascotId) -> Option<&Mascot> {
        self.mascots.iter().find(|m| m.id() == id)
    }

    /// Live projectiles, oldest first.
    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter()
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    fn index_of(&self, id: &MascotId) -> Option<usize> {
        self.mascots.iter().position(|m| m.id() == id)
    }

    fn mascot_mut(&mut self, id: &MascotId) -> Result<&mut Mascot, SimError> {
        self.mascots
            .iter_mut()
            .find(|m| m.id() == id)
            .ok_or_else(|| SimError::UnknownMascot(id.clone()))
    }

    /// Applies `change` and schedules a save when it touched persisted fields.
    fn update<F>(&mut self, id: &MascotId, persisted: bool, change: F) -> Result<(), SimError>
    where
        F: FnOnce(&mut Mascot),
    {
        change(self.mascot_mut(id)?);
        if persisted {
            self.mark_dirty();
        }
        Ok(())
    }

    pub fn add_mascot(&mut self, mut config: MascotConfig) -> MascotId {
        if let Some(id) = &config.id {
            if self.index_of(id).is_some() {
                warn!("Duplicate mascot id {}; assigning a fresh one", id);
                config.id = None;
            }
        }
        let mascot = Mascot::new(config, &self.viewport, &mut self.rng);
        let id = mascot.id().clone();
        debug!("Added mascot {} at {:?}", id, mascot.position);
        self.mascots.push(mascot);
        if self.selected.is_none() {
            self.selected = Some(id.clone());
        }
        self.mark_dirty();
        id
    }

    /// Refuses to remove the last mascot; at least one always exists.
    pub fn remove_mascot(&mut self, id: &MascotId) -> Result<(), SimError> {
        let index = self.index_of(id).ok_or_else(|| SimError::UnknownMascot(id.clone()))?;
        if self.mascots.len() <= 1 {
            warn!("Refusing to remove the last mascot {}", id);
            return Err(SimError::LastMascot);
        }
        self.mascots.remove(index);
        if self.selected.as_ref() == Some(id) {
            self.selected = self.mascots.first().map(|m| m.id().clone());
        }
        info!("Removed mascot {}", id);
        self.mark_dirty();
        Ok(())
    }

    pub fn select(&mut self, id: &MascotId) -> Result<(), SimError> {
        if self.index_of(id).is_none() {
            return Err(SimError::UnknownMascot(id.clone()));
        }
        self.selected = Some(id.clone());
        Ok(())
    }

    pub fn selected(&self) -> Option<&Mascot> {
        self.selected.as_ref().and_then(|id| self.mascot(id))
    }

    pub fn set_size(&mut self, id: &MascotId, size: f64) -> Result<(), SimError> {
        self.update(id, true, |m| m.set_size(size))
    }

    pub fn set_image(&mut self, id: &MascotId, image: impl Into<String>, is_custom: bool) -> Result<(), SimError> {
        let image = image.into();
        self.update(id, true, |m| m.set_image(image, is_custom))
    }

    pub fn set_aspect(&mut self, id: &MascotId, aspect: f32) -> Result<(), SimError> {
        self.update(id, false, |m| m.set_aspect(aspect))
    }

    pub fn set_disabled(&mut self, id: &MascotId, disabled: bool) -> Result<(), SimError> {
        self.update(id, true, |m| {
            m.disabled = disabled;
            if disabled {
                m.trigger = None;
                m.dragging = false;
            }
        })
    }

    pub fn set_float_disabled(&mut self, id: &MascotId, float_disabled: bool) -> Result<(), SimError> {
        self.update(id, true, |m| m.float_disabled = float_disabled)
    }

    pub fn set_effect_3d(&mut self, id: &MascotId, enabled: bool) -> Result<(), SimError> {
        self.update(id, true, |m| m.effect_3d = enabled)
    }

    pub fn set_action_mode(&mut self, id: &MascotId, enabled: bool) -> Result<(), SimError> {
        self.update(id, true, |m| {
            m.action_mode = enabled;
            if !enabled {
                m.trigger = None;
            }
        })
    }

    pub fn set_weapon(&mut self, id: &MascotId, weapon: WeaponType) -> Result<(), SimError> {
        self.update(id, true, |m| m.weapon = weapon)
    }

    pub fn set_ai(&mut self, id: &MascotId, ai: AiPersonality) -> Result<(), SimError> {
        self.update(id, true, |m| m.ai = ai)
    }

    pub fn set_position(&mut self, id: &MascotId, position: Vec2) -> Result<(), SimError> {
        self.update(id, true, |m| m.set_position(position))
    }

    pub fn set_velocity(&mut self, id: &MascotId, velocity: Vec2) -> Result<(), SimError> {
        self.update(id, true, |m| m.set_velocity(velocity))
    }

    /// Releasing a drag saves the final position.
    pub fn set_dragging(&mut self, id: &MascotId, dragging: bool) -> Result<(), SimError> {
        self.update(id, !dragging, |m| m.dragging = dragging)
    }

    pub fn reset_mascot(&mut self, id: &MascotId) -> Result<(), SimError> {
        self.update(id, true, Mascot::reset)
    }

    pub fn reset_clicks(&mut self, id: &MascotId) -> Result<(), SimError> {
        self.update(id, false, Mascot::reset_clicks)
    }

    pub fn set_collisions_enabled(&mut self, enabled: bool) {
        self.settings.collisions_enabled = enabled;
        self.mark_collision_dirty();
    }

    pub fn set_restitution(&mut self, restitution: f32) {
        self.settings.restitution = restitution;
        self.mark_collision_dirty();
    }

    pub fn set_show_collision_messages(&mut self, show: bool) {
        self.settings.show_collision_messages = show;
        self.mark_collision_dirty();
    }

    /// The collision preferences as they are persisted.
    pub fn collision_record(&self) -> CollisionRecord {
        CollisionRecord {
            enabled: Some(self.settings.collisions_enabled),
            strength: Some(self.settings.restitution),
            show_messages: Some(self.settings.show_collision_messages),
        }
    }

    fn apply_collision_record(&mut self, saved: CollisionRecord) {
        if let Some(enabled) = saved.enabled {
            self.settings.collisions_enabled = enabled;
        }
        if let Some(strength) = saved.strength.filter(|s| s.is_finite()) {
            self.settings.restitution = strength;
        }
        if let Some(show) = saved.show_messages {
            self.settings.show_collision_messages = show;
        }
        info!(
            "Restored collision settings: enabled={} strength={} messages={}",
            self.settings.collisions_enabled, self.settings.restitution, self.settings.show_collision_messages
        );
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        for mascot in &mut self.mascots {
            mascot.clamp_to_viewport(&viewport);
        }
    }

    /// Click on a mascot. Returns the message it says.
    pub fn interact(&mut self, id: &MascotId, point: Vec2, now_ms: f64) -> Result<&'static str, SimError> {
        let index = self.index_of(id).ok_or_else(|| SimError::UnknownMascot(id.clone()))?;
        let mascot = &mut self.mascots[index];
        if mascot.disabled {
            return Err(SimError::MascotDisabled(id.clone()));
        }
        Ok(mascot.on_interact(point, now_ms, &mut self.rng))
    }

    /// Presses the trigger. The first shot goes out on the next visible tick.
    pub fn start_firing(&mut self, id: &MascotId, aim: Vec2, now_ms: f64) -> Result<(), SimError> {
        let mascot = self.mascot_mut(id)?;
        if mascot.disabled {
            return Err(SimError::MascotDisabled(id.clone()));
        }
        if !mascot.action_mode {
            return Err(SimError::ActionModeDisabled(id.clone()));
        }
        match mascot.trigger {
            Some(trigger) if trigger.held => mascot.trigger = Some(FireTrigger { aim, ..trigger }),
            _ => mascot.trigger = Some(FireTrigger::pressed(aim, now_ms)),
        }
        Ok(())
    }

    pub fn update_aim(&mut self, id: &MascotId, aim: Vec2) -> Result<(), SimError> {
        if let Some(trigger) = self.mascot_mut(id)?.trigger.as_mut() {
            trigger.aim = aim;
        }
        Ok(())
    }

    /// Releases every trigger. Safe to call from any number of places.
    pub fn stop_firing(&mut self) {
        for mascot in &mut self.mascots {
            mascot.release_trigger();
        }
    }

    /// Clears every trigger without the pending first shot. For focus loss
    /// and context menus, where no release event will follow.
    pub fn cancel_firing(&mut self) {
        for mascot in &mut self.mascots {
            mascot.cancel_trigger();
        }
    }

    pub fn stop_firing_for(&mut self, id: &MascotId) -> Result<(), SimError> {
        self.mascot_mut(id)?.release_trigger();
        Ok(())
    }

    /// Adds a projectile, evicting the oldest ones beyond the cap.
    pub fn spawn_projectile(&mut self, mut projectile: Projectile) -> u64 {
        projectile.id = self.next_projectile_id;
        self.next_projectile_id += 1;
        self.projectiles.push_back(projectile);
        self.enforce_projectile_cap();
        self.next_projectile_id - 1
    }

    fn enforce_projectile_cap(&mut self) {
        let cap = self.settings.max_projectiles;
        let mut evicted = 0;
        while self.projectiles.len() > cap {
            self.projectiles.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            debug!("Evicted {} oldest projectiles (cap {})", evicted, cap);
        }
    }

    pub fn tick(&mut self, frame: &Frame, effects: &mut dyn Effects) {
        self.last_now_ms = frame.now_ms;
        if self.save_debounce.poll(frame.now_ms) {
            self.save_now();
        }
        if !frame.visible {
            return;
        }
        self.frame_count += 1;

        self.fire_held_triggers(frame.now_ms, effects);
        effects.trim_particles(self.settings.max_particles);
        self.enforce_projectile_cap();

        for projectile in self.projectiles.iter_mut() {
            projectile.advance(&mut self.mascots, effects);
        }
        self.projectiles.retain(Projectile::is_alive);

        let ctx = TickContext {
            now_ms: frame.now_ms,
            viewport: self.viewport,
            pointer: frame.pointer,
            ai_interval_ms: self.settings.ai_interval_ms,
        };
        for mascot in self.mascots.iter_mut() {
            mascot.advance(&ctx, &mut self.rng);
        }

        self.grid.rebuild(&self.mascots);
        if self.settings.collisions_enabled {
            self.resolve_collisions(frame.now_ms);
        }
    }

    fn fire_held_triggers(&mut self, now_ms: f64, effects: &mut dyn Effects) {
        if self.mascots.iter().all(|m| m.trigger.is_none()) {
            return;
        }
        let targets: Vec<MascotId> = self
            .mascots
            .iter()
            .filter(|m| m.is_active())
            .map(|m| m.id().clone())
            .collect();

        let mut spawned = Vec::new();
        for mascot in self.mascots.iter_mut() {
            let Some(trigger) = mascot.trigger else {
                continue;
            };
            if mascot.disabled || !mascot.action_mode {
                mascot.trigger = None;
                continue;
            }
            if now_ms < trigger.next_at {
                continue;
            }

            spawned.extend(mascot.fire_weapon(trigger.aim, &targets, &mut self.rng));
            if let Some(sound) = mascot.weapon.fire_sound() {
                effects.play_spatial_sound(sound, mascot.center().x);
            }
            mascot.trigger = match mascot.weapon.repeat_interval_ms() {
                Some(interval) if trigger.held => Some(FireTrigger {
                    next_at: now_ms + interval,
                    shots: trigger.shots + 1,
                    ..trigger
                }),
                _ => None,
            };
        }

        for projectile in spawned {
            self.spawn_projectile(projectile);
        }
    }

    /// Each unordered neighbour pair is resolved at most once per frame.
    fn resolve_collisions(&mut self, now_ms: f64) {
        let restitution = self.settings.clamped_restitution();
        let mut seen: HashSet<(usize, usize)> = HashSet::new();

        for i in 0..self.mascots.len() {
            let neighbors = self.grid.query_neighbors(&self.mascots[i]);
            for j in neighbors {
                let pair = (i.min(j), i.max(j));
                if i == j || !seen.insert(pair) {
                    continue;
                }
                let Some((a, b)) = pair_mut(&mut self.mascots, pair.0, pair.1) else {
                    continue;
                };
                if !a.check_collision_with(b) {
                    continue;
                }
                a.resolve_collision(b, restitution, &mut self.rng);
                a.sanitize(&self.viewport);
                b.sanitize(&self.viewport);
                if self.settings.show_collision_messages {
                    a.remark_on_collision(now_ms, &mut self.rng);
                    b.remark_on_collision(now_ms, &mut self.rng);
                }
            }
        }
    }

    fn mark_dirty(&mut self) {
        if self.lifecycle == Lifecycle::Loading {
            return;
        }
        self.save_debounce.mark(self.last_now_ms);
    }

    fn mark_collision_dirty(&mut self) {
        if self.lifecycle == Lifecycle::Loading {
            return;
        }
        self.collision_dirty = true;
        self.save_debounce.mark(self.last_now_ms);
    }

    pub fn is_save_pending(&self) -> bool {
        self.save_debounce.is_pending()
    }

    /// Writes a pending save immediately. Returns false when nothing was
    /// pending or the store rejected it.
    pub fn flush_save(&mut self) -> bool {
        if !self.save_debounce.is_pending() {
            return false;
        }
        self.save_debounce.cancel();
        self.save_now()
    }

    fn save_now(&mut self) -> bool {
        let records = self.mascots.iter().map(Mascot::to_record).collect();
        let accepted = self.persistence.save(records);
        if accepted {
            debug!("Saved {} mascots", self.mascots.len());
        } else {
            warn!("Save of {} mascots was rejected; keeping in-memory state", self.mascots.len());
        }

        if self.collision_dirty {
            let settings = self.collision_record();
            if self.persistence.save_collision(settings) {
                self.collision_dirty = false;
            } else {
                warn!("Save of collision settings was rejected");
            }
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::NullEffects;
    use crate::persistence::MascotRecord;
    use crate::projectile::ProjectileKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Recording {
        stored: Rc<RefCell<Option<Vec<MascotRecord>>>>,
        saves: Rc<RefCell<usize>>,
        collision: Rc<RefCell<Option<CollisionRecord>>>,
    }

    impl Persistence for Recording {
        fn save(&mut self, records: Vec<MascotRecord>) -> bool {
            *self.saves.borrow_mut() += 1;
            *self.stored.borrow_mut() = Some(records);
            true
        }

        fn load(&mut self) -> Option<Vec<MascotRecord>> {
            self.stored.borrow().clone()
        }

        fn save_collision(&mut self, settings: CollisionRecord) -> bool {
            *self.collision.borrow_mut() = Some(settings);
            true
        }

        fn load_collision(&mut self) -> Option<CollisionRecord> {
            *self.collision.borrow()
        }
    }

    fn settings() -> SimulationSettings {
        SimulationSettings { rng_seed: Some(11), ..SimulationSettings::default() }
    }

    fn manager() -> Manager {
        let mut manager = Manager::new(settings(), Viewport::new(800.0, 600.0));
        manager.restore(&[]);
        manager
    }

    /// Default mascot disabled so stray shots cannot hit it.
    fn quiet_manager() -> Manager {
        let mut manager = manager();
        let first = manager.mascots()[0].id().clone();
        manager.set_disabled(&first, true).unwrap();
        manager
    }

    fn placed(id: &str, x: f32, y: f32) -> MascotConfig {
        MascotConfig {
            id: Some(MascotId::from(id)),
            x: Some(x),
            y: Some(y),
            vx: Some(0.0),
            vy: Some(0.0),
            action_mode: true,
            ..MascotConfig::default()
        }
    }

    #[test]
    fn restore_without_state_creates_one_mascot() {
        let manager = manager();
        assert_eq!(manager.lifecycle(), Lifecycle::Running);
        assert_eq!(manager.mascots().len(), 1);
        assert!(!manager.is_save_pending());
        assert!(manager.selected().is_some());
    }

    #[test]
    fn restore_uses_initial_configs() {
        let mut manager = Manager::new(settings(), Viewport::new(800.0, 600.0));
        let initial = InitialMascotConfig {
            count: 3,
            size: Some(100),
            ai: Some("shy".into()),
            weapon: Some("shotgun".into()),
            action_mode: true,
        };
        manager.restore(&[initial]);
        assert_eq!(manager.mascots().len(), 3);
        assert!(manager.mascots().iter().all(|m| m.size() == 100 && m.ai == AiPersonality::Shy));
        assert!(!manager.is_save_pending());
    }

    #[test]
    fn last_mascot_cannot_be_removed() {
        let mut manager = manager();
        let only = manager.mascots()[0].id().clone();
        assert_eq!(manager.remove_mascot(&only), Err(SimError::LastMascot));
        assert_eq!(manager.mascots().len(), 1);
        assert_eq!(
            manager.remove_mascot(&MascotId::from("ghost")),
            Err(SimError::UnknownMascot(MascotId::from("ghost")))
        );
    }

    #[test]
    fn removing_selected_selects_first_remaining() {
        let mut manager = manager();
        let first = manager.mascots()[0].id().clone();
        let second = manager.add_mascot(placed("second", 10.0, 10.0));
        manager.select(&second).unwrap();
        manager.remove_mascot(&second).unwrap();
        assert_eq!(manager.selected().map(|m| m.id().clone()), Some(first));
    }

    #[test]
    fn mutations_are_debounced_into_one_save() {
        let store = Recording::default();
        let mut manager =
            Manager::new(settings(), Viewport::new(800.0, 600.0)).with_persistence(Box::new(store.clone()));
        manager.restore(&[]);
        let id = manager.mascots()[0].id().clone();

        manager.tick(&Frame::visible(0.0, None), &mut NullEffects);
        for size in [70.0, 80.0, 90.0] {
            manager.set_size(&id, size).unwrap();
        }
        manager.tick(&Frame::visible(400.0, None), &mut NullEffects);
        assert_eq!(*store.saves.borrow(), 0);
        manager.tick(&Frame::visible(500.0, None), &mut NullEffects);
        assert_eq!(*store.saves.borrow(), 1);
        let saved = store.stored.borrow().clone().unwrap();
        assert_eq!(saved[0].size, Some(90.0));

        manager.tick(&Frame::visible(2000.0, None), &mut NullEffects);
        assert_eq!(*store.saves.borrow(), 1);
    }

    #[test]
    fn hidden_frames_skip_physics_but_still_save() {
        let store = Recording::default();
        let mut manager =
            Manager::new(settings(), Viewport::new(800.0, 600.0)).with_persistence(Box::new(store.clone()));
        manager.restore(&[]);
        let id = manager.mascots()[0].id().clone();
        manager.set_velocity(&id, Vec2::new(1.0, 1.0)).unwrap();
        let before = manager.mascot(&id).unwrap().position;

        manager.tick(&Frame::hidden(1000.0), &mut NullEffects);
        assert_eq!(manager.mascot(&id).unwrap().position, before);
        assert_eq!(manager.frame_count(), 0);
        assert_eq!(*store.saves.borrow(), 1);
    }

    #[test]
    fn projectile_cap_keeps_newest() {
        let mut manager = manager();
        let mut ids = Vec::new();
        for i in 0..150 {
            let projectile = Projectile::new(
                ProjectileKind::Bullet,
                Vec2::new(-1000.0, -1000.0 - i as f32),
                Vec2::ZERO,
                None,
            );
            ids.push(manager.spawn_projectile(projectile));
        }
        assert_eq!(manager.projectile_count(), 100);
        let kept: Vec<u64> = manager.projectiles().map(Projectile::id).collect();
        assert_eq!(kept, ids[50..].to_vec());
    }

    #[test]
    fn firing_requires_action_mode() {
        let mut manager = manager();
        let id = manager.add_mascot(MascotConfig { action_mode: false, ..placed("calm", 0.0, 0.0) });
        assert_eq!(
            manager.start_firing(&id, Vec2::ZERO, 0.0),
            Err(SimError::ActionModeDisabled(id.clone()))
        );
    }

    #[test]
    fn quick_click_still_fires_a_single_press_weapon() {
        let mut manager = quiet_manager();
        let id = manager.add_mascot(MascotConfig { weapon: Some(WeaponType::Shotgun), ..placed("s", 300.0, 300.0) });
        manager.start_firing(&id, Vec2::new(700.0, 332.0), 0.0).unwrap();
        manager.stop_firing();
        manager.tick(&Frame::visible(16.0, None), &mut NullEffects);
        assert_eq!(manager.projectile_count(), 6);
        manager.tick(&Frame::visible(32.0, None), &mut NullEffects);
        assert!(!manager.mascot(&id).unwrap().is_firing());
        assert!(manager.projectile_count() <= 6);
    }

    #[test]
    fn held_machinegun_repeats_until_released() {
        let mut manager = quiet_manager();
        manager.set_collisions_enabled(false);
        let id = manager.add_mascot(placed("gunner", 300.0, 300.0));
        manager.start_firing(&id, Vec2::new(300.0, 0.0), 0.0).unwrap();
        for frame in 0..=30 {
            manager.tick(&Frame::visible(f64::from(frame) * 10.0, None), &mut NullEffects);
        }
        // shots at 0, 100, 200 and 300 ms
        assert_eq!(manager.projectile_count(), 4);

        manager.stop_firing();
        manager.stop_firing();
        assert!(!manager.mascot(&id).unwrap().is_firing());
        manager.tick(&Frame::visible(400.0, None), &mut NullEffects);
        assert_eq!(manager.projectile_count(), 4);
    }

    #[test]
    fn cancel_drops_a_press_that_has_not_fired() {
        let mut manager = quiet_manager();
        let id = manager.add_mascot(placed("gunner", 300.0, 300.0));
        manager.start_firing(&id, Vec2::new(300.0, 0.0), 0.0).unwrap();
        manager.cancel_firing();
        manager.cancel_firing();
        assert!(!manager.mascot(&id).unwrap().is_firing());
        manager.tick(&Frame::visible(16.0, None), &mut NullEffects);
        assert_eq!(manager.projectile_count(), 0);
    }

    #[test]
    fn collision_settings_are_saved_and_restored() {
        let store = Recording::default();
        let mut manager =
            Manager::new(settings(), Viewport::new(800.0, 600.0)).with_persistence(Box::new(store.clone()));
        manager.restore(&[]);
        assert_eq!(*store.collision.borrow(), None);

        manager.tick(&Frame::visible(0.0, None), &mut NullEffects);
        manager.set_restitution(0.3);
        manager.set_show_collision_messages(false);
        assert!(manager.is_save_pending());
        manager.tick(&Frame::visible(600.0, None), &mut NullEffects);
        assert_eq!(
            *store.collision.borrow(),
            Some(CollisionRecord { enabled: Some(true), strength: Some(0.3), show_messages: Some(false) })
        );

        let mut reopened =
            Manager::new(settings(), Viewport::new(800.0, 600.0)).with_persistence(Box::new(store.clone()));
        reopened.restore(&[]);
        assert_eq!(reopened.settings().restitution, 0.3);
        assert!(!reopened.settings().show_collision_messages);
        assert!(reopened.settings().collisions_enabled);
        assert!(!reopened.is_save_pending());
    }

    #[test]
    fn partial_collision_record_keeps_configured_values() {
        let store = Recording::default();
        *store.collision.borrow_mut() =
            Some(CollisionRecord { enabled: Some(false), strength: Some(f32::NAN), show_messages: None });
        let mut manager =
            Manager::new(settings(), Viewport::new(800.0, 600.0)).with_persistence(Box::new(store.clone()));
        manager.restore(&[]);
        assert!(!manager.settings().collisions_enabled);
        assert_eq!(manager.settings().restitution, SimulationSettings::default().restitution);
        assert!(manager.settings().show_collision_messages);
    }

    #[test]
    fn viewport_shrink_clamps_mascots() {
        let mut manager = manager();
        let id = manager.add_mascot(placed("edge", 700.0, 500.0));
        manager.set_viewport(Viewport::new(400.0, 300.0));
        let mascot = manager.mascot(&id).unwrap();
        assert_eq!(mascot.position, Vec2::new(336.0, 236.0));
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut manager = manager();
        let ghost = MascotId::from("ghost");
        assert!(manager.set_size(&ghost, 100.0).is_err());
        assert!(manager.interact(&ghost, Vec2::ZERO, 0.0).is_err());
        assert!(manager.stop_firing_for(&ghost).is_err());
    }
}
