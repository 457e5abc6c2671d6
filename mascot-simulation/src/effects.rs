//! Effects collaborator: particles, impact decals, screen shake and sound
//! live outside the engine. Projectile hit handling calls into it
//! synchronously; implementations must not block or panic.

use crate::mascot::Mascot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImpactKind {
    Hole,
    Scorch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundKind {
    Bullet,
    Flame,
    Explosion,
}

pub trait Effects {
    /// A mark left on `mascot` at mascot-local coordinates.
    fn on_impact(&mut self, kind: ImpactKind, mascot: &Mascot, local_x: f32, local_y: f32);

    fn on_explosion(&mut self, x: f32, y: f32);

    fn play_spatial_sound(&mut self, kind: SoundKind, screen_x: f32);

    /// Drop the oldest particles beyond `max`. Called once per visible frame.
    fn trim_particles(&mut self, _max: usize) {}
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEffects;

impl Effects for NullEffects {
    fn on_impact(&mut self, _kind: ImpactKind, _mascot: &Mascot, _local_x: f32, _local_y: f32) {}

    fn on_explosion(&mut self, _x: f32, _y: f32) {}

    fn play_spatial_sound(&mut self, _kind: SoundKind, _screen_x: f32) {}
}
