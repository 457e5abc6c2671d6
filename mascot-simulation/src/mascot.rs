//! A single simulated mascot: kinematics, bounce, wander, pointer AI,
//! flee-on-click and collision response.

use crate::geometry::{self, random_unit, Vec2, Viewport};
use crate::persistence::MascotRecord;
use crate::weapon::{FireTrigger, WeaponType};
use log::warn;
use mascot_config::InitialMascotConfig;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

pub const MIN_SIZE: u32 = 32;
pub const MAX_SIZE: u32 = 1280;
pub const DEFAULT_SIZE: u32 = 64;
pub const DEFAULT_IMAGE: &str = "mascot.png";

pub const IDLE_SPEED: f32 = 1.5;
pub const RUNNING_SPEED: f32 = 2.5;
/// Velocity cap applied after wander nudges and AI steering.
pub const SPEED_CAP: f32 = 2.0;
const INITIAL_VELOCITY_SCALE: f32 = 1.0;
const WANDER_CHANCE: f32 = 0.01;
const WANDER_NUDGE: f32 = 0.5;

const CURIOUS_ACCEL: f32 = 0.05;
const SHY_ACCEL: f32 = 0.08;
const AGGRESSIVE_ACCEL: f32 = 0.12;

const RUN_DURATION_MS: f64 = 2000.0;
const SPEECH_DURATION_MS: f64 = 3000.0;
const RAPID_CLICK_MS: f64 = 500.0;
const RAPID_CLICK_BONUS: u32 = 2;
const ANNOYED_THRESHOLD: u32 = 20;

/// Collision circles are deliberately generous: mean edge / 2.5.
const RADIUS_DIVISOR: f32 = 2.5;
/// Below this center distance the collision normal is unreliable.
const DEADLOCK_DISTANCE: f32 = 10.0;
const DEADLOCK_KICK: f32 = 3.0;

const NORMAL_MESSAGES: &[&str] = &[
    "Hey, that tickles!",
    "Ouch!",
    "Catch me if you can!",
    "Stop it~",
    "That was close!",
    "Eek!",
    "I'm busy!",
    "Running away!",
    "Can't catch me!",
    "Hehe",
];

const ANNOYED_MESSAGES: &[&str] = &[
    "Seriously, are you bored?",
    "Okay, that's enough...",
    "You click way too much.",
    "I'm getting angry.",
    "...I'll just ignore you.",
    "One more time and I'm leaving!",
    "Please stop.",
    "Last warning!!",
    "Your persistence is impressive, I guess.",
];

const COLLISION_MESSAGES: &[&str] = &["Bonk!", "Watch it!", "Excuse me!", "Oof!", "Sorry!"];

/// Stable identity, kept verbatim across save and load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MascotId(String);

impl MascotId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// `mascot_<unix millis>_<9 base-36 chars>`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let suffix: String = (0..9)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        Self(format!("mascot_{millis}_{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MascotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MascotId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiPersonality {
    #[default]
    Neutral,
    Curious,
    Shy,
    Aggressive,
}

impl AiPersonality {
    /// Unknown names fall back to `Neutral`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "curious" => Self::Curious,
            "shy" => Self::Shy,
            "aggressive" => Self::Aggressive,
            _ => Self::Neutral,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Curious => "curious",
            Self::Shy => "shy",
            Self::Aggressive => "aggressive",
        }
    }
}

/// Construction parameters. Anything left `None` is randomised or defaulted.
#[derive(Debug, Clone, Default)]
pub struct MascotConfig {
    pub id: Option<MascotId>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub vx: Option<f32>,
    pub vy: Option<f32>,
    pub size: Option<f64>,
    pub image: Option<String>,
    pub is_custom: bool,
    pub disabled: bool,
    pub float_disabled: bool,
    pub effect_3d: bool,
    pub action_mode: bool,
    pub weapon: Option<WeaponType>,
    pub ai: Option<AiPersonality>,
}

impl From<MascotRecord> for MascotConfig {
    fn from(record: MascotRecord) -> Self {
        // A record whose image was dropped by a degraded save shows the built-in sprite.
        let is_custom = record.image.is_some() && record.is_custom.unwrap_or(false);
        Self {
            id: Some(MascotId::new(record.id)),
            x: record.x,
            y: record.y,
            vx: record.vx,
            vy: record.vy,
            size: record.size,
            image: record.image,
            is_custom,
            disabled: record.disabled.unwrap_or(false),
            float_disabled: record.no_float.unwrap_or(false),
            effect_3d: record.effect3d.unwrap_or(false),
            action_mode: record.action_mode.unwrap_or(false),
            weapon: record.weapon_type.as_deref().map(WeaponType::from_name),
            ai: record.ai_type.as_deref().map(AiPersonality::from_name),
        }
    }
}

impl From<&InitialMascotConfig> for MascotConfig {
    fn from(initial: &InitialMascotConfig) -> Self {
        Self {
            size: initial.size.map(f64::from),
            action_mode: initial.action_mode,
            weapon: initial.weapon.as_deref().map(WeaponType::from_name),
            ai: initial.ai.as_deref().map(AiPersonality::from_name),
            ..Self::default()
        }
    }
}

/// Non-positive or non-finite sizes mean "unspecified".
pub fn clamp_size(size: Option<f64>) -> u32 {
    match size {
        Some(size) if size.is_finite() && size > 0.0 => {
            (size.round() as i64).clamp(i64::from(MIN_SIZE), i64::from(MAX_SIZE)) as u32
        }
        _ => DEFAULT_SIZE,
    }
}

/// Per-frame inputs shared by every mascot.
#[derive(Debug, Clone, Copy)]
pub struct TickContext {
    pub now_ms: f64,
    pub viewport: Viewport,
    pub pointer: Option<Vec2>,
    pub ai_interval_ms: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct Speech {
    text: &'static str,
    until_ms: f64,
}

#[derive(Debug, Clone)]
pub struct Mascot {
    id: MascotId,
    pub position: Vec2,
    pub velocity: Vec2,
    size: u32,
    pub image: String,
    pub is_custom: bool,
    /// Height/width of a custom image, reported by the presentation layer.
    aspect: f32,
    pub disabled: bool,
    pub float_disabled: bool,
    pub effect_3d: bool,
    pub action_mode: bool,
    pub weapon: WeaponType,
    pub ai: AiPersonality,
    pub dragging: bool,

    last_ai_at: f64,
    running_until: Option<f64>,
    click_count: u32,
    last_click_at: Option<f64>,
    speech: Option<Speech>,
    pub(crate) trigger: Option<FireTrigger>,
}

impl Mascot {
    pub fn new<R: Rng + ?Sized>(config: MascotConfig, viewport: &Viewport, rng: &mut R) -> Self {
        let id = match config.id {
            Some(id) => id,
            None => MascotId::generate(rng),
        };
        let finite = |value: Option<f32>| value.filter(|v| v.is_finite());

        let x = finite(config.x).unwrap_or_else(|| rng.gen::<f32>() * (viewport.width - 100.0).max(0.0));
        let y = finite(config.y).unwrap_or_else(|| rng.gen::<f32>() * (viewport.height - 100.0).max(0.0));
        let vx = finite(config.vx).unwrap_or_else(|| random_axis_velocity(rng));
        let vy = finite(config.vy).unwrap_or_else(|| random_axis_velocity(rng));

        Self {
            id,
            position: Vec2::new(x, y),
            velocity: Vec2::new(vx, vy),
            size: clamp_size(config.size),
            image: config.image.unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            is_custom: config.is_custom,
            aspect: 1.0,
            disabled: config.disabled,
            float_disabled: config.float_disabled,
            effect_3d: config.effect_3d,
            action_mode: config.action_mode,
            weapon: config.weapon.unwrap_or_default(),
            ai: config.ai.unwrap_or_default(),
            dragging: false,
            last_ai_at: f64::NEG_INFINITY,
            running_until: None,
            click_count: 0,
            last_click_at: None,
            speech: None,
            trigger: None,
        }
    }

    pub fn id(&self) -> &MascotId {
        &self.id
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn set_size(&mut self, size: f64) {
        self.size = clamp_size(Some(size));
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    pub fn set_image(&mut self, image: impl Into<String>, is_custom: bool) {
        self.image = image.into();
        self.is_custom = is_custom;
        if !is_custom {
            self.aspect = 1.0;
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = if aspect.is_finite() && aspect > 0.0 { aspect.clamp(0.1, 10.0) } else { 1.0 };
    }

    /// Built-in sprite, default size, visible and floating.
    pub fn reset(&mut self) {
        self.set_image(DEFAULT_IMAGE, false);
        self.size = DEFAULT_SIZE;
        self.disabled = false;
        self.float_disabled = false;
    }

    pub fn is_active(&self) -> bool {
        !self.disabled
    }

    pub fn is_running(&self) -> bool {
        self.running_until.is_some()
    }

    pub fn is_firing(&self) -> bool {
        self.trigger.is_some()
    }

    pub fn click_count(&self) -> u32 {
        self.click_count
    }

    pub fn reset_clicks(&mut self) {
        self.click_count = 0;
        self.last_click_at = None;
    }

    /// Text of the speech bubble currently shown, if any.
    pub fn speech(&self) -> Option<&'static str> {
        self.speech.as_ref().map(|speech| speech.text)
    }

    /// Image embedded inline (data URI) rather than referenced by name.
    pub fn has_embedded_image(&self) -> bool {
        self.image.starts_with("data:")
    }

    pub fn width(&self) -> f32 {
        self.size as f32
    }

    pub fn height(&self) -> f32 {
        if self.is_custom {
            self.size as f32 * self.aspect
        } else {
            self.size as f32
        }
    }

    pub fn center(&self) -> Vec2 {
        self.position + Vec2::new(self.width() / 2.0, self.height() / 2.0)
    }

    pub fn radius(&self) -> f32 {
        (self.width() + self.height()) / 2.0 / RADIUS_DIVISOR
    }

    /// Mean half edge; projectiles closer than this to the center hit.
    pub fn half_extent(&self) -> f32 {
        (self.width() + self.height()) / 4.0
    }

    pub fn advance<R: Rng + ?Sized>(&mut self, ctx: &TickContext, rng: &mut R) {
        if self.disabled {
            return;
        }
        self.expire_timers(ctx.now_ms, rng);

        if !self.dragging {
            let multiplier = if self.is_running() { RUNNING_SPEED / IDLE_SPEED } else { 1.0 };
            self.position += self.velocity * multiplier;
        }
        self.bounce(&ctx.viewport);

        if !self.is_running() && rng.gen::<f32>() < WANDER_CHANCE {
            let nudge = Vec2::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5) * WANDER_NUDGE;
            self.velocity = (self.velocity + nudge).clamp_length_max(SPEED_CAP);
        }

        // Throttled so pointer jitter doesn't cause twitchy steering.
        if !self.is_running() && !self.is_firing() && ctx.now_ms - self.last_ai_at >= ctx.ai_interval_ms {
            self.last_ai_at = ctx.now_ms;
            if let Some(pointer) = ctx.pointer {
                self.steer_toward_pointer(pointer, rng);
            }
        }

        self.sanitize(&ctx.viewport);
    }

    fn expire_timers<R: Rng + ?Sized>(&mut self, now_ms: f64, rng: &mut R) {
        if self.running_until.is_some_and(|until| now_ms >= until) {
            self.running_until = None;
            self.velocity = Vec2::new(random_axis_velocity(rng), random_axis_velocity(rng));
        }
        if self.speech.as_ref().is_some_and(|speech| now_ms >= speech.until_ms) {
            self.speech = None;
        }
    }

    /// Reflects off the viewport edges, always pointing back inside.
    fn bounce(&mut self, viewport: &Viewport) {
        let max = viewport.max_corner(self.width(), self.height());
        if self.position.x < 0.0 {
            self.position.x = 0.0;
            self.velocity.x = self.velocity.x.abs();
        } else if self.position.x > max.x {
            self.position.x = max.x;
            self.velocity.x = -self.velocity.x.abs();
        }
        if self.position.y < 0.0 {
            self.position.y = 0.0;
            self.velocity.y = self.velocity.y.abs();
        } else if self.position.y > max.y {
            self.position.y = max.y;
            self.velocity.y = -self.velocity.y.abs();
        }
    }

    /// Pulls the mascot back inside after the viewport shrinks.
    pub fn clamp_to_viewport(&mut self, viewport: &Viewport) {
        let max = viewport.max_corner(self.width(), self.height());
        self.position = self.position.clamp(Vec2::ZERO, max);
    }

    /// Personality-driven nudge of the velocity. Never touches position.
    pub fn steer_toward_pointer<R: Rng + ?Sized>(&mut self, pointer: Vec2, rng: &mut R) {
        let offset = pointer - self.center();
        let distance = offset.length();
        let toward = if distance > f32::EPSILON { offset / distance } else { random_unit(rng) };

        let (accel, cap) = match self.ai {
            AiPersonality::Neutral => return,
            AiPersonality::Curious if distance > 50.0 && distance < 400.0 => (toward * CURIOUS_ACCEL, SPEED_CAP),
            AiPersonality::Shy if distance < 200.0 => (-toward * SHY_ACCEL, SPEED_CAP),
            AiPersonality::Aggressive if distance < 500.0 => (toward * AGGRESSIVE_ACCEL, SPEED_CAP * 1.5),
            _ => return,
        };
        self.velocity = (self.velocity + accel).clamp_length_max(cap);
    }

    /// Click/tap on the mascot: flee from `point` for two seconds and
    /// return the message to show. Past twenty clicks the tone changes.
    pub fn on_interact<R: Rng + ?Sized>(&mut self, point: Vec2, now_ms: f64, rng: &mut R) -> &'static str {
        self.click_count += 1;
        if self.last_click_at.is_some_and(|last| now_ms - last < RAPID_CLICK_MS) {
            self.click_count += RAPID_CLICK_BONUS;
        }
        self.last_click_at = Some(now_ms);

        let away = self.center() - point;
        let direction = if away.length_squared() > f32::EPSILON { away.normalize() } else { random_unit(rng) };
        self.velocity = direction * RUNNING_SPEED;
        self.running_until = Some(now_ms + RUN_DURATION_MS);

        let pool = if self.click_count > ANNOYED_THRESHOLD { ANNOYED_MESSAGES } else { NORMAL_MESSAGES };
        let text = pool.choose(rng).copied().unwrap_or(NORMAL_MESSAGES[0]);
        self.speech = Some(Speech { text, until_ms: now_ms + SPEECH_DURATION_MS });
        text
    }

    /// Shows a collision remark unless a bubble is already up.
    pub(crate) fn remark_on_collision<R: Rng + ?Sized>(&mut self, now_ms: f64, rng: &mut R) {
        if self.speech.is_some() {
            return;
        }
        if let Some(text) = COLLISION_MESSAGES.choose(rng).copied() {
            self.speech = Some(Speech { text, until_ms: now_ms + SPEECH_DURATION_MS });
        }
    }

    pub fn check_collision_with(&self, other: &Mascot) -> bool {
        if self.disabled || other.disabled || self.id == other.id {
            return false;
        }
        self.center().distance(other.center()) < self.radius() + other.radius()
    }

    /// Impulse response with mass proportional to size. Near-coincident
    /// centers get a random kick instead, since the normal is undefined.
    pub fn resolve_collision<R: Rng + ?Sized>(&mut self, other: &mut Mascot, restitution: f32, rng: &mut R) {
        let delta = other.center() - self.center();
        let distance = delta.length();
        let mass_a = self.size as f32;
        let mass_b = other.size as f32;
        let reach = self.radius() + other.radius();

        if distance < DEADLOCK_DISTANCE {
            let kick = random_unit(rng);
            self.velocity -= kick * DEADLOCK_KICK;
            other.velocity += kick * DEADLOCK_KICK;
            let separation = (reach - distance).max(0.0) / 2.0 + 1.0;
            self.position -= kick * separation;
            other.position += kick * separation;
            return;
        }

        let normal = delta / distance;
        let approach = (other.velocity - self.velocity).dot(normal);
        if approach < 0.0 {
            let impulse = -(1.0 + restitution) * approach / (1.0 / mass_a + 1.0 / mass_b);
            self.velocity -= normal * (impulse / mass_a);
            other.velocity += normal * (impulse / mass_b);
        }

        let penetration = reach - distance;
        if penetration > 0.0 {
            let total = mass_a + mass_b;
            self.position -= normal * (penetration * mass_b / total);
            other.position += normal * (penetration * mass_a / total);
        }
    }

    /// Resets any non-finite component. Returns true when something was fixed.
    pub(crate) fn sanitize(&mut self, viewport: &Viewport) -> bool {
        if geometry::is_finite(self.position) && geometry::is_finite(self.velocity) {
            return false;
        }
        warn!(
            "Mascot {} reached a non-finite state (pos={:?}, vel={:?}); resetting it",
            self.id, self.position, self.velocity
        );
        if !geometry::is_finite(self.velocity) {
            self.velocity = Vec2::ZERO;
        }
        if !geometry::is_finite(self.position) {
            self.position = Vec2::ZERO;
        }
        self.clamp_to_viewport(viewport);
        true
    }

    /// Persisted fields only; transient combat and AI state is dropped.
    pub fn to_record(&self) -> MascotRecord {
        MascotRecord {
            id: self.id.as_str().to_string(),
            image: Some(self.image.clone()),
            is_custom: Some(self.is_custom),
            size: Some(f64::from(self.size)),
            x: Some(self.position.x),
            y: Some(self.position.y),
            vx: Some(self.velocity.x),
            vy: Some(self.velocity.y),
            disabled: Some(self.disabled),
            no_float: Some(self.float_disabled),
            effect3d: Some(self.effect_3d),
            action_mode: Some(self.action_mode),
            weapon_type: Some(self.weapon.as_str().to_string()),
            ai_type: Some(self.ai.as_str().to_string()),
        }
    }
}

fn random_axis_velocity<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    (rng.gen::<f32>() - 0.5) * 2.0 * INITIAL_VELOCITY_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn at(id: &str, x: f32, y: f32, vx: f32, vy: f32) -> Mascot {
        let config = MascotConfig {
            id: Some(MascotId::from(id)),
            x: Some(x),
            y: Some(y),
            vx: Some(vx),
            vy: Some(vy),
            ..MascotConfig::default()
        };
        Mascot::new(config, &Viewport::new(1000.0, 1000.0), &mut rng())
    }

    fn ctx(now_ms: f64, pointer: Option<Vec2>) -> TickContext {
        TickContext { now_ms, viewport: Viewport::new(1000.0, 1000.0), pointer, ai_interval_ms: 100.0 }
    }

    #[test]
    fn size_is_clamped_and_defaulted() {
        assert_eq!(clamp_size(Some(10.0)), MIN_SIZE);
        assert_eq!(clamp_size(Some(5000.0)), MAX_SIZE);
        assert_eq!(clamp_size(Some(100.4)), 100);
        assert_eq!(clamp_size(Some(f64::NAN)), DEFAULT_SIZE);
        assert_eq!(clamp_size(Some(0.0)), DEFAULT_SIZE);
        assert_eq!(clamp_size(None), DEFAULT_SIZE);

        let mut mascot = at("a", 0.0, 0.0, 0.0, 0.0);
        mascot.set_size(2000.0);
        assert_eq!(mascot.size(), MAX_SIZE);
    }

    #[test]
    fn default_construction_stays_in_ranges() {
        let mut rng = rng();
        let viewport = Viewport::new(800.0, 600.0);
        for _ in 0..50 {
            let mascot = Mascot::new(MascotConfig::default(), &viewport, &mut rng);
            assert!(mascot.position.x >= 0.0 && mascot.position.x <= 700.0);
            assert!(mascot.position.y >= 0.0 && mascot.position.y <= 500.0);
            assert!(mascot.velocity.x.abs() <= 1.0 && mascot.velocity.y.abs() <= 1.0);
            assert_eq!(mascot.size(), DEFAULT_SIZE);
            assert_eq!(mascot.image, DEFAULT_IMAGE);
            assert!(mascot.id().as_str().starts_with("mascot_"));
        }
    }

    #[test]
    fn unknown_enum_names_fall_back() {
        assert_eq!(AiPersonality::from_name("SHY"), AiPersonality::Shy);
        assert_eq!(AiPersonality::from_name("grumpy"), AiPersonality::Neutral);
    }

    #[test]
    fn geometry_uses_generous_radius() {
        let mascot = at("a", 10.0, 20.0, 0.0, 0.0);
        assert_eq!(mascot.center(), Vec2::new(42.0, 52.0));
        assert!((mascot.radius() - 25.6).abs() < 1e-4);
    }

    #[test]
    fn custom_image_aspect_changes_height() {
        let mut mascot = at("a", 0.0, 0.0, 0.0, 0.0);
        mascot.set_image("data:image/png;base64,AAAA", true);
        mascot.set_aspect(0.5);
        assert_eq!(mascot.height(), 32.0);
        mascot.set_image(DEFAULT_IMAGE, false);
        assert_eq!(mascot.height(), 64.0);
    }

    #[test]
    fn collision_check_is_symmetric_and_ignores_disabled() {
        let a = at("a", 0.0, 0.0, 0.0, 0.0);
        let mut b = at("b", 40.0, 0.0, 0.0, 0.0);
        assert!(a.check_collision_with(&b));
        assert_eq!(a.check_collision_with(&b), b.check_collision_with(&a));

        let far = at("c", 200.0, 0.0, 0.0, 0.0);
        assert!(!a.check_collision_with(&far));
        assert!(!far.check_collision_with(&a));

        b.disabled = true;
        assert!(!a.check_collision_with(&b));
        assert!(!a.check_collision_with(&a.clone()));
    }

    #[test]
    fn resolved_collision_separates() {
        let mut a = at("a", 0.0, 0.0, 1.5, 0.2);
        let mut b = at("b", 30.0, 5.0, -1.0, 0.0);
        let normal = (b.center() - a.center()).normalize();
        a.resolve_collision(&mut b, 0.8, &mut rng());
        assert!((b.velocity - a.velocity).dot(normal) >= 0.0);
        assert!(a.center().distance(b.center()) >= a.radius() + b.radius() - 1e-3);
    }

    #[test]
    fn heavier_mascot_changes_velocity_less() {
        let mut small = at("s", 0.0, 0.0, 1.0, 0.0);
        let mut large = at("l", 30.0, 0.0, -1.0, 0.0);
        large.set_size(256.0);
        large.position = Vec2::new(small.center().x + 50.0 - 128.0, small.center().y - 128.0);
        small.resolve_collision(&mut large, 1.0, &mut rng());
        assert!((small.velocity.x - 1.0).abs() > (large.velocity.x + 1.0).abs());
    }

    #[test]
    fn coincident_centers_get_finite_kick() {
        let mut a = at("a", 100.0, 100.0, 0.0, 0.0);
        let mut b = at("b", 100.0, 100.0, 0.0, 0.0);
        a.resolve_collision(&mut b, 0.8, &mut rng());
        for mascot in [&a, &b] {
            assert!(geometry::is_finite(mascot.velocity));
            assert!(mascot.velocity.length() > 0.0);
        }
        assert!(a.center().distance(b.center()) > 0.0);
    }

    #[test]
    fn bounce_reflects_and_clamps() {
        let mut mascot = at("a", 990.0, 500.0, 5.0, 0.0);
        mascot.advance(&ctx(0.0, None), &mut rng());
        assert_eq!(mascot.position.x, 936.0);
        assert!(mascot.velocity.x < 0.0);
    }

    #[test]
    fn bounce_points_velocity_inward_without_double_flip() {
        // pushed past the right edge while already heading left: sign kept
        let mut mascot = at("a", 2000.0, 500.0, -3.0, 0.0);
        mascot.bounce(&Viewport::new(1000.0, 1000.0));
        assert_eq!(mascot.position.x, 936.0);
        assert_eq!(mascot.velocity.x, -3.0);

        // past the top edge heading up: sign flips
        let mut mascot = at("b", 500.0, -20.0, 0.0, -4.0);
        mascot.bounce(&Viewport::new(1000.0, 1000.0));
        assert_eq!(mascot.position.y, 0.0);
        assert_eq!(mascot.velocity.y, 4.0);

        // inside the viewport nothing changes
        let mut mascot = at("c", 100.0, 100.0, -1.0, 2.0);
        mascot.bounce(&Viewport::new(1000.0, 1000.0));
        assert_eq!(mascot.velocity, Vec2::new(-1.0, 2.0));
    }

    #[test]
    fn interaction_flees_from_point_and_escalates() {
        let mut rng = rng();
        let mut mascot = at("a", 100.0, 100.0, 0.0, 0.0);
        let text = mascot.on_interact(Vec2::new(100.0, 132.0), 0.0, &mut rng);
        assert!(NORMAL_MESSAGES.contains(&text));
        assert!(mascot.is_running());
        assert!((mascot.velocity - Vec2::new(RUNNING_SPEED, 0.0)).length() < 1e-4);
        assert_eq!(mascot.speech(), Some(text));

        // rapid repeats add a bonus
        mascot.on_interact(Vec2::ZERO, 100.0, &mut rng);
        assert_eq!(mascot.click_count(), 4);

        for i in 0..20 {
            mascot.on_interact(Vec2::ZERO, 1000.0 * f64::from(i + 1), &mut rng);
        }
        assert!(mascot.click_count() > ANNOYED_THRESHOLD);
        let text = mascot.on_interact(Vec2::ZERO, 25_000.0, &mut rng);
        assert!(ANNOYED_MESSAGES.contains(&text));

        mascot.reset_clicks();
        assert_eq!(mascot.click_count(), 0);
    }

    #[test]
    fn running_state_expires_after_two_seconds() {
        let mut rng = rng();
        let mut mascot = at("a", 400.0, 400.0, 0.0, 0.0);
        mascot.on_interact(Vec2::new(0.0, 0.0), 1000.0, &mut rng);
        mascot.advance(&ctx(2500.0, None), &mut rng);
        assert!(mascot.is_running());
        mascot.advance(&ctx(3000.0, None), &mut rng);
        assert!(!mascot.is_running());
        assert!(mascot.velocity.x.abs() <= SPEED_CAP && mascot.velocity.y.abs() <= SPEED_CAP);
        mascot.advance(&ctx(4000.0, None), &mut rng);
        assert_eq!(mascot.speech(), None);
    }

    #[test]
    fn personalities_steer_relative_to_pointer() {
        let mut rng = rng();
        let pointer = Vec2::new(332.0, 132.0);

        let mut curious = at("c", 100.0, 100.0, 0.0, 0.0);
        curious.ai = AiPersonality::Curious;
        curious.steer_toward_pointer(pointer, &mut rng);
        assert!(curious.velocity.x > 0.0);

        let mut shy = at("s", 100.0, 100.0, 0.0, 0.0);
        shy.ai = AiPersonality::Shy;
        shy.steer_toward_pointer(Vec2::new(232.0, 132.0), &mut rng);
        assert!(shy.velocity.x < 0.0);

        let mut aggressive = at("g", 100.0, 100.0, 0.0, 0.0);
        aggressive.ai = AiPersonality::Aggressive;
        aggressive.steer_toward_pointer(pointer, &mut rng);
        assert!(aggressive.velocity.x > curious.velocity.x);

        let mut neutral = at("n", 100.0, 100.0, 0.0, 0.0);
        neutral.steer_toward_pointer(pointer, &mut rng);
        assert_eq!(neutral.velocity, Vec2::ZERO);

        // curious ignores pointers that are too close
        let mut close = at("k", 100.0, 100.0, 0.0, 0.0);
        close.ai = AiPersonality::Curious;
        close.steer_toward_pointer(Vec2::new(140.0, 132.0), &mut rng);
        assert_eq!(close.velocity, Vec2::ZERO);
    }

    #[test]
    fn ai_is_throttled() {
        let mut rng = rng();
        let mut mascot = at("a", 400.0, 400.0, 0.0, 0.0);
        mascot.ai = AiPersonality::Aggressive;
        let pointer = Some(Vec2::new(700.0, 432.0));
        mascot.advance(&ctx(0.0, pointer), &mut rng);
        let after_first = mascot.last_ai_at;
        mascot.advance(&ctx(50.0, pointer), &mut rng);
        assert_eq!(mascot.last_ai_at, after_first);
        mascot.advance(&ctx(100.0, pointer), &mut rng);
        assert_eq!(mascot.last_ai_at, 100.0);
    }

    #[test]
    fn record_roundtrip_keeps_visible_state() {
        let mut original = at("keep-me", 12.5, 40.25, -0.75, 0.5);
        original.set_size(200.0);
        original.disabled = true;
        original.float_disabled = true;
        original.weapon = WeaponType::Missile;
        original.ai = AiPersonality::Shy;
        original.on_interact(Vec2::ZERO, 0.0, &mut rng());

        let restored = Mascot::new(
            MascotConfig::from(original.to_record()),
            &Viewport::new(1000.0, 1000.0),
            &mut rng(),
        );
        assert_eq!(restored.id(), original.id());
        assert_eq!(restored.position, original.position);
        assert_eq!(restored.velocity, original.velocity);
        assert_eq!(restored.size(), 200);
        assert!(restored.disabled && restored.float_disabled);
        assert_eq!(restored.weapon, WeaponType::Missile);
        assert_eq!(restored.ai, AiPersonality::Shy);
        assert_eq!(restored.click_count(), 0);
        assert!(!restored.is_running());
    }

    #[test]
    fn degraded_record_falls_back_to_builtin_image() {
        let mut record = MascotRecord::bare("m");
        record.is_custom = Some(true);
        let mascot = Mascot::new(MascotConfig::from(record), &Viewport::new(500.0, 500.0), &mut rng());
        assert_eq!(mascot.image, DEFAULT_IMAGE);
        assert!(!mascot.is_custom);
    }

    #[test]
    fn non_finite_state_is_reset() {
        let mut mascot = at("a", 10.0, 10.0, 0.0, 0.0);
        mascot.velocity = Vec2::new(f32::NAN, 1.0);
        assert!(mascot.sanitize(&Viewport::new(100.0, 100.0)));
        assert_eq!(mascot.velocity, Vec2::ZERO);
        assert!(!mascot.sanitize(&Viewport::new(100.0, 100.0)));
    }
}
