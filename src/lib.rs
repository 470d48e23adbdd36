//! # Ballpit
//!
//! An interactive ball pit: a few hundred spheres bouncing inside the
//! visible volume, pushed around by each other and by a sphere that
//! follows the pointer.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ballpit::prelude::*;
//!
//! fn main() -> Result<(), BallpitError> {
//!     let config = BallpitConfig::default()
//!         .with_count(150)
//!         .with_colors(vec![0xff6b6b, 0x4ecdc4, 0xffe66d]);
//!     ballpit::run(config)
//! }
//! ```
//!
//! ## Architecture
//!
//! The crate separates the simulation from the platform:
//!
//! - [`physics`] steps particle positions with gravity, friction, pairwise
//!   sphere collisions, a pointer-controlled sphere and wall bounces.
//! - [`interaction`] hit-tests pointer and touch input against tracked
//!   surfaces and reports enter/move/leave/click events.
//! - [`camera`] turns a pointer position into a world-space target.
//! - [`render_loop`] and [`render_core`] own the start/stop lifecycle,
//!   visibility gating, debounced resizes and teardown.
//! - [`scene`] is the contract with the renderer: the core fills a scene
//!   and calls [`RenderBackend::render`] once per frame.
//!
//! [`Ballpit`] ties these together for one surface. The [`app`] module
//! hosts it in a winit window with the [`gpu`] backend; tests drive it
//! with mock backends and schedulers instead.
//!
//! ## Embedding
//!
//! ```ignore
//! let registry = InteractionRegistry::shared();
//! let mut ballpit = BallpitBuilder::new()
//!     .with_config(config)
//!     .with_surface(surface)
//!     .with_registry(registry.clone())
//!     .build(backend, scheduler)?;
//!
//! ballpit.set_intersecting(true, Instant::now());
//!
//! // on every frame callback
//! ballpit.frame(Instant::now());
//!
//! // on pointer input
//! let events = registry.borrow_mut().pointer_move(position);
//! ballpit.handle_interactions(&events);
//! ```

pub mod app;
mod ballpit;
pub mod camera;
pub mod color;
pub mod config;
pub mod error;
pub mod gpu;
pub mod interaction;
pub mod physics;
pub mod render_core;
pub mod render_loop;
pub mod scene;
pub mod spheres;
pub mod time;

pub use app::run;
pub use ballpit::{Ballpit, BallpitBuilder};
pub use config::{BallpitConfig, MaterialParams, PhysicsConfig, ScatteringParams, SurfaceSizing, ViewConfig};
pub use error::{BallpitError, ConfigError, GpuError};
pub use glam::{Vec2, Vec3};
pub use interaction::{
    DrawSurface, InteractionEvent, InteractionHandle, InteractionKind, InteractionRegistry, InteractionState, Rect,
    SharedRegistry, SurfaceId,
};
pub use physics::{ParticleSet, PhysicsEngine};
pub use render_loop::{FrameInfo, FrameScheduler};
pub use scene::RenderBackend;

/// Everything needed to configure and embed a ball pit.
///
/// ```ignore
/// use ballpit::prelude::*;
/// ```
pub mod prelude {
    pub use crate::ballpit::{Ballpit, BallpitBuilder};
    pub use crate::config::{BallpitConfig, PhysicsConfig, SurfaceSizing, ViewConfig};
    pub use crate::error::BallpitError;
    pub use crate::interaction::{DrawSurface, InteractionRegistry, Rect, SurfaceId};
    pub use crate::render_loop::FrameScheduler;
    pub use crate::scene::RenderBackend;
    pub use glam::{Vec2, Vec3};
}
