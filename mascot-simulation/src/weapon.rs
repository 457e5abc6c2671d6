//! Weapon loadouts and the projectiles each one spawns.

use crate::effects::SoundKind;
use crate::geometry::{rotate, Vec2};
use crate::mascot::{Mascot, MascotId};
use crate::projectile::{Projectile, ProjectileKind};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

const BULLET_SPEED: f32 = 10.0;
const BULLET_JITTER: f32 = 0.05;
const PELLET_SPEED: f32 = 9.0;
const PELLET_COUNT: usize = 6;
const PELLET_FAN: f32 = 0.6;
const FLAME_SPEED: f32 = 5.0;
const FLAME_JITTER: f32 = 0.25;
const GRENADE_SPEED: f32 = 6.0;
const MISSILE_SPEED: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponType {
    #[default]
    Machinegun,
    Shotgun,
    Flamethrower,
    Grenade,
    Missile,
}

impl WeaponType {
    /// Unknown names fall back to the machinegun.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "shotgun" => Self::Shotgun,
            "flamethrower" => Self::Flamethrower,
            "grenade" => Self::Grenade,
            "missile" => Self::Missile,
            _ => Self::Machinegun,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Machinegun => "machinegun",
            Self::Shotgun => "shotgun",
            Self::Flamethrower => "flamethrower",
            Self::Grenade => "grenade",
            Self::Missile => "missile",
        }
    }

    /// Delay between shots while the trigger is held. `None` for
    /// single-press weapons.
    pub fn repeat_interval_ms(self) -> Option<f64> {
        match self {
            Self::Machinegun => Some(100.0),
            Self::Flamethrower => Some(50.0),
            Self::Shotgun | Self::Grenade | Self::Missile => None,
        }
    }

    pub fn is_continuous(self) -> bool {
        self.repeat_interval_ms().is_some()
    }

    /// Sound played at the shooter when the weapon goes off.
    pub fn fire_sound(self) -> Option<SoundKind> {
        match self {
            Self::Machinegun | Self::Shotgun => Some(SoundKind::Bullet),
            Self::Flamethrower => Some(SoundKind::Flame),
            Self::Grenade | Self::Missile => None,
        }
    }
}

/// A pressed trigger. Lives on the mascot until released, or after a
/// single-press weapon has fired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FireTrigger {
    pub aim: Vec2,
    pub next_at: f64,
    pub held: bool,
    pub shots: u32,
}

impl FireTrigger {
    pub fn pressed(aim: Vec2, now_ms: f64) -> Self {
        Self { aim, next_at: now_ms, held: true, shots: 0 }
    }
}

impl Mascot {
    /// Unit vector from the centre toward `aim`, or the heading when the
    /// aim point sits on the centre.
    pub fn aim_direction(&self, aim: Vec2) -> Vec2 {
        let toward = (aim - self.center()).normalize_or_zero();
        if toward != Vec2::ZERO {
            return toward;
        }
        let heading = self.velocity.normalize_or_zero();
        if heading != Vec2::ZERO {
            heading
        } else {
            Vec2::X
        }
    }

    /// Lets go of the trigger. A press that has not fired yet still gets
    /// its first shot on the next tick.
    pub(crate) fn release_trigger(&mut self) {
        let fired = match self.trigger.as_mut() {
            Some(trigger) => {
                trigger.held = false;
                trigger.shots > 0
            }
            None => false,
        };
        if fired {
            self.trigger = None;
        }
    }

    /// Drops the trigger outright, including a press that has not fired.
    pub(crate) fn cancel_trigger(&mut self) {
        self.trigger = None;
    }

    /// One press worth of projectiles for the current weapon. `targets`
    /// lists the ids a missile may lock on to.
    pub fn fire_weapon<R: Rng + ?Sized>(
        &self,
        aim: Vec2,
        targets: &[MascotId],
        rng: &mut R,
    ) -> SmallVec<[Projectile; 8]> {
        let direction = self.aim_direction(aim);
        let mut shots = SmallVec::new();
        match self.weapon {
            WeaponType::Machinegun => {
                let jitter = rng.gen_range(-BULLET_JITTER..=BULLET_JITTER);
                shots.push(self.fire_bullet(rotate(direction, jitter), BULLET_SPEED));
            }
            WeaponType::Shotgun => {
                let step = PELLET_FAN / (PELLET_COUNT - 1) as f32;
                for pellet in 0..PELLET_COUNT {
                    let angle = -PELLET_FAN / 2.0 + step * pellet as f32;
                    shots.push(self.fire_bullet(rotate(direction, angle), PELLET_SPEED));
                }
            }
            WeaponType::Flamethrower => shots.push(self.fire_flame(direction, rng)),
            WeaponType::Grenade => shots.push(self.fire_grenade(direction)),
            WeaponType::Missile => shots.push(self.fire_missile(direction, targets, rng)),
        }
        shots
    }

    pub fn fire_bullet(&self, direction: Vec2, speed: f32) -> Projectile {
        self.launch(ProjectileKind::Bullet, direction * speed)
    }

    pub fn fire_flame<R: Rng + ?Sized>(&self, direction: Vec2, rng: &mut R) -> Projectile {
        let jitter = rng.gen_range(-FLAME_JITTER..=FLAME_JITTER);
        self.launch(ProjectileKind::Flame, rotate(direction, jitter) * FLAME_SPEED)
    }

    pub fn fire_grenade(&self, direction: Vec2) -> Projectile {
        self.launch(ProjectileKind::Grenade, direction * GRENADE_SPEED)
    }

    /// Locks on to a random other target at launch and never re-acquires.
    pub fn fire_missile<R: Rng + ?Sized>(&self, direction: Vec2, targets: &[MascotId], rng: &mut R) -> Projectile {
        let candidates: SmallVec<[&MascotId; 16]> = targets.iter().filter(|id| *id != self.id()).collect();
        let mut missile = self.launch(ProjectileKind::Missile, direction * MISSILE_SPEED);
        missile.target = candidates.choose(rng).map(|id| (*id).clone());
        missile
    }

    fn launch(&self, kind: ProjectileKind, velocity: Vec2) -> Projectile {
        Projectile::new(kind, self.center(), velocity, Some(self.id().clone()))
    }
}
