use log::debug;
use mascot_simulation::{Effects, ImpactKind, Mascot, SoundKind};

/// Headless stand-in for particles and audio: logs each notification at
/// debug level and keeps running totals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LogEffects {
    pub impacts: u64,
    pub explosions: u64,
    pub sounds: u64,
}

impl Effects for LogEffects {
    fn on_impact(&mut self, kind: ImpactKind, mascot: &Mascot, local_x: f32, local_y: f32) {
        self.impacts += 1;
        debug!("{:?} on {} at ({:.1}, {:.1})", kind, mascot.id(), local_x, local_y);
    }

    fn on_explosion(&mut self, x: f32, y: f32) {
        self.explosions += 1;
        debug!("Explosion at ({:.1}, {:.1})", x, y);
    }

    fn play_spatial_sound(&mut self, kind: SoundKind, screen_x: f32) {
        self.sounds += 1;
        debug!("Sound {:?} at x={:.1}", kind, screen_x);
    }
}
