//! Transient projectiles and their hit handling.
//!
//! A missile keeps only the *id* of its target and looks it up every
//! tick; once the target is gone or disabled the missile flies straight.

use crate::effects::{Effects, ImpactKind, SoundKind};
use crate::geometry::{self, Vec2};
use crate::mascot::{Mascot, MascotId};
use log::{debug, warn};

const GRENADE_GRAVITY: f32 = 0.15;
const MISSILE_TURN: f32 = 0.4;
const MISSILE_MAX_SPEED: f32 = 8.0;
const KNOCKBACK: f32 = 0.6;
const BURN_PUSH: f32 = 0.1;
pub const BLAST_RADIUS: f32 = 100.0;
const BLAST_FORCE: f32 = 150.0;
const BLAST_MIN_DISTANCE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectileKind {
    Bullet,
    Flame,
    Grenade,
    Missile,
}

impl ProjectileKind {
    /// Lifetime in ticks. A grenade's lifetime is its fuse.
    pub fn max_lifetime(self) -> u32 {
        match self {
            Self::Flame => 30,
            Self::Missile => 240,
            Self::Bullet | Self::Grenade => 180,
        }
    }

    /// Flames only hit-test every fifth tick.
    pub fn hit_interval(self) -> u32 {
        match self {
            Self::Flame => 5,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub(crate) id: u64,
    pub kind: ProjectileKind,
    pub position: Vec2,
    pub velocity: Vec2,
    owner: Option<MascotId>,
    pub(crate) target: Option<MascotId>,
    age: u32,
    alive: bool,
    exploded: bool,
}

impl Projectile {
    pub fn new(kind: ProjectileKind, position: Vec2, velocity: Vec2, owner: Option<MascotId>) -> Self {
        Self {
            id: 0,
            kind,
            position,
            velocity,
            owner,
            target: None,
            age: 0,
            alive: true,
            exploded: false,
        }
    }

    /// Spawn sequence number assigned by the manager.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn owner(&self) -> Option<&MascotId> {
        self.owner.as_ref()
    }

    pub fn target(&self) -> Option<&MascotId> {
        self.target.as_ref()
    }

    pub fn with_target(mut self, target: MascotId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    fn can_hit(&self, mascot: &Mascot) -> bool {
        mascot.is_active() && self.owner.as_ref() != Some(mascot.id())
    }

    fn touches(&self, mascot: &Mascot) -> bool {
        self.position.distance(mascot.center()) < mascot.half_extent()
    }

    /// Point of contact in the mascot's local box.
    fn local_point(&self, mascot: &Mascot) -> Vec2 {
        (self.position - mascot.position).clamp(Vec2::ZERO, Vec2::new(mascot.width(), mascot.height()))
    }

    /// One tick: steer, integrate, hit-test, expire.
    pub fn advance(&mut self, mascots: &mut [Mascot], effects: &mut dyn Effects) {
        if !self.alive {
            return;
        }

        match self.kind {
            ProjectileKind::Missile => self.home(mascots),
            ProjectileKind::Grenade => self.velocity.y += GRENADE_GRAVITY,
            ProjectileKind::Bullet | ProjectileKind::Flame => {}
        }
        self.position += self.velocity;
        self.age += 1;

        if !geometry::is_finite(self.position) || !geometry::is_finite(self.velocity) {
            warn!("Projectile {} reached a non-finite state; discarding it", self.id);
            self.alive = false;
            return;
        }

        if self.age % self.kind.hit_interval() == 0 {
            self.hit_test(mascots, effects);
        }

        if self.alive && self.age >= self.kind.max_lifetime() {
            if self.kind == ProjectileKind::Grenade {
                self.explode(mascots, effects);
            }
            self.alive = false;
        }
    }

    fn home(&mut self, mascots: &[Mascot]) {
        let Some(target_id) = &self.target else {
            return;
        };
        match mascots.iter().find(|m| m.id() == target_id && m.is_active()) {
            Some(target) => {
                let pull = (target.center() - self.position).normalize_or_zero() * MISSILE_TURN;
                self.velocity = (self.velocity + pull).clamp_length_max(MISSILE_MAX_SPEED);
            }
            None => {
                debug!("Missile {} lost target {}", self.id, target_id);
                self.target = None;
            }
        }
    }

    fn hit_test(&mut self, mascots: &mut [Mascot], effects: &mut dyn Effects) {
        if self.kind == ProjectileKind::Flame {
            self.burn(mascots, effects);
            return;
        }
        let Some(index) = mascots.iter().position(|m| self.can_hit(m) && self.touches(m)) else {
            return;
        };
        match self.kind {
            ProjectileKind::Grenade => self.explode(mascots, effects),
            _ => self.strike(&mut mascots[index], effects),
        }
    }

    fn strike(&mut self, mascot: &mut Mascot, effects: &mut dyn Effects) {
        let local = self.local_point(mascot);
        effects.on_impact(ImpactKind::Hole, mascot, local.x, local.y);
        mascot.velocity += self.velocity.normalize_or_zero() * KNOCKBACK;
        if self.kind == ProjectileKind::Missile {
            effects.on_explosion(self.position.x, self.position.y);
            effects.play_spatial_sound(SoundKind::Explosion, self.position.x);
        }
        self.alive = false;
    }

    /// Flames scorch everything they overlap and keep going.
    fn burn(&mut self, mascots: &mut [Mascot], effects: &mut dyn Effects) {
        let push = self.velocity.normalize_or_zero() * BURN_PUSH;
        for mascot in mascots.iter_mut() {
            if self.can_hit(mascot) && self.touches(mascot) {
                let local = self.local_point(mascot);
                effects.on_impact(ImpactKind::Scorch, mascot, local.x, local.y);
                mascot.velocity += push;
            }
        }
    }

    /// Area blast. Idempotent: a second call does nothing.
    pub fn explode(&mut self, mascots: &mut [Mascot], effects: &mut dyn Effects) {
        if self.exploded {
            return;
        }
        self.exploded = true;
        self.alive = false;

        for mascot in mascots.iter_mut() {
            if !self.can_hit(mascot) {
                continue;
            }
            let offset = mascot.center() - self.position;
            let distance = offset.length();
            if distance >= BLAST_RADIUS {
                continue;
            }
            let local = self.local_point(mascot);
            effects.on_impact(ImpactKind::Scorch, mascot, local.x, local.y);

            let away = if distance > f32::EPSILON { offset / distance } else { Vec2::NEG_Y };
            mascot.velocity += away * (BLAST_FORCE / distance.max(BLAST_MIN_DISTANCE));
        }
        effects.on_explosion(self.position.x, self.position.y);
        effects.play_spatial_sound(SoundKind::Explosion, self.position.x);
    }
}
