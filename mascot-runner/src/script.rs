//! Scripted input for headless runs: a pointer orbiting the viewport
//! centre and, optionally, periodic volleys from action-mode mascots.

use log::debug;
use mascot_config::{Config, PointerScript};
use mascot_simulation::{Manager, MascotId, Vec2, Viewport};
use rand::rngs::StdRng;
use rand::Rng;
use std::f64::consts::TAU;

const ORBIT_PERIOD_MS: f64 = 8000.0;
const VOLLEY_EVERY_MS: f64 = 3000.0;
const VOLLEY_LENGTH_MS: f64 = 600.0;

pub struct DemoScript {
    pointer: PointerScript,
    demo_fire: bool,
    viewport: Viewport,
    rng: StdRng,
    next_volley_ms: f64,
    volley_until: Option<f64>,
}

impl DemoScript {
    pub fn new(config: &Config, rng: StdRng) -> Self {
        Self {
            pointer: config.runner.pointer,
            demo_fire: config.runner.demo_fire,
            viewport: Viewport::from(&config.viewport),
            rng,
            next_volley_ms: VOLLEY_EVERY_MS,
            volley_until: None,
        }
    }

    pub fn pointer(&self, now_ms: f64) -> Option<Vec2> {
        match self.pointer {
            PointerScript::None => None,
            PointerScript::Orbit => {
                let center = Vec2::new(self.viewport.width / 2.0, self.viewport.height / 2.0);
                let radius = self.viewport.width.min(self.viewport.height) / 3.0;
                let angle = (now_ms / ORBIT_PERIOD_MS * TAU) as f32;
                Some(center + Vec2::new(angle.cos(), angle.sin()) * radius)
            }
        }
    }

    /// Presses and releases triggers on a fixed cadence.
    pub fn drive(&mut self, manager: &mut Manager, now_ms: f64) {
        if !self.demo_fire {
            return;
        }
        if let Some(until) = self.volley_until {
            if now_ms >= until {
                manager.stop_firing();
                self.volley_until = None;
                self.next_volley_ms = now_ms + VOLLEY_EVERY_MS;
            }
            return;
        }
        if now_ms < self.next_volley_ms {
            return;
        }

        let shooters: Vec<MascotId> = manager
            .mascots()
            .iter()
            .filter(|m| m.action_mode && m.is_active())
            .map(|m| m.id().clone())
            .collect();
        let aim = Vec2::new(
            self.rng.gen_range(0.0..self.viewport.width),
            self.rng.gen_range(0.0..self.viewport.height),
        );
        for id in &shooters {
            if let Err(err) = manager.start_firing(id, aim, now_ms) {
                debug!("Volley skipped: {}", err);
            }
        }
        debug!("Volley from {} mascots toward {:?}", shooters.len(), aim);
        self.volley_until = Some(now_ms + VOLLEY_LENGTH_MS);
    }
}
