//! Mascot simulation engine: independently moving mascots with bounce
//! physics, pairwise collisions, a small pointer-driven AI, weapons that
//! spawn projectiles, and a debounced hand-off of state to persistence.
//!
//! Everything here is pure data plus update rules. Rendering, sound and
//! storage are collaborators reached through the [`Effects`] and
//! [`Persistence`] traits.

pub mod debounce;
pub mod effects;
pub mod error;
pub mod geometry;
pub mod manager;
pub mod mascot;
pub mod persistence;
pub mod projectile;
pub mod spatial;
pub mod weapon;

pub use debounce::Debouncer;
pub use effects::{Effects, ImpactKind, NullEffects, SoundKind};
pub use error::SimError;
pub use geometry::{Vec2, Viewport};
pub use manager::{Frame, Lifecycle, Manager};
pub use mascot::{AiPersonality, Mascot, MascotConfig, MascotId, TickContext};
pub use persistence::{CollisionRecord, MascotRecord, NullPersistence, Persistence};
pub use projectile::{Projectile, ProjectileKind};
pub use spatial::SpatialGrid;
pub use weapon::WeaponType;
