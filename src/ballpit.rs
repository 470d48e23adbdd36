//! The ball pit component: builder, pointer wiring and host operations.

use std::rc::Rc;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::camera::RayProjector;
use crate::config::BallpitConfig;
use crate::error::BallpitError;
use crate::interaction::{
    DrawSurface, InteractionEvent, InteractionHandle, InteractionKind, InteractionRegistry, SharedRegistry,
};
use crate::physics::PhysicsEngine;
use crate::render_core::{BallpitCore, SurfaceSize};
use crate::render_loop::{FrameInfo, FrameScheduler};
use crate::scene::RenderBackend;
use crate::spheres::Spheres;

/// Builder for a [`Ballpit`].
///
/// ```ignore
/// let ballpit = BallpitBuilder::new()
///     .with_config(BallpitConfig::default().with_count(100))
///     .with_surface(surface)
///     .with_registry(registry.clone())
///     .build(backend, scheduler)?;
/// ```
#[derive(Default)]
pub struct BallpitBuilder {
    config: BallpitConfig,
    surface: Option<Rc<dyn DrawSurface>>,
    registry: Option<SharedRegistry>,
    seed: Option<u64>,
}

impl BallpitBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: BallpitConfig) -> Self {
        self.config = config;
        self
    }

    /// Surface to draw on and track the pointer over. Required.
    pub fn with_surface(mut self, surface: Rc<dyn DrawSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Share an interaction registry with other components. A private one
    /// is created otherwise.
    pub fn with_registry(mut self, registry: SharedRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Seed the initial layout (and every layout after `set_count`).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the component on the surface.
    ///
    /// Registers the surface for pointer tracking, sizes the camera and sets
    /// the physics bounds from the visible world. The loop stays stopped
    /// until the surface is reported visible.
    pub fn build<B, S>(self, backend: B, scheduler: S) -> Result<Ballpit<B, S>, BallpitError>
    where
        B: RenderBackend,
        S: FrameScheduler,
    {
        let surface = self.surface.ok_or(BallpitError::NoSurface)?;
        let registry = self.registry.unwrap_or_else(InteractionRegistry::shared);
        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let mut config = self.config;
        let mut core = BallpitCore::new(surface.clone(), backend, scheduler, &config.view);
        let size = core.resize();
        apply_bounds(&mut config, size);

        let spheres = {
            let physics = PhysicsEngine::with_rng(config.physics.clone(), &mut rng);
            let (backend, scene) = core.backend_and_scene();
            Spheres::with_physics(config.clone(), physics, backend, scene)
        };
        let interaction = InteractionRegistry::register(&registry, surface);

        Ok(Ballpit {
            core,
            spheres,
            config,
            registry,
            interaction,
            projector: RayProjector::new(),
            rng,
            paused: false,
        })
    }
}

/// An interactive ball pit bound to one drawable surface.
pub struct Ballpit<B: RenderBackend, S: FrameScheduler> {
    core: BallpitCore<B, S>,
    spheres: Spheres,
    config: BallpitConfig,
    registry: SharedRegistry,
    interaction: InteractionHandle,
    projector: RayProjector,
    rng: SmallRng,
    paused: bool,
}

impl<B: RenderBackend, S: FrameScheduler> Ballpit<B, S> {
    pub fn builder() -> BallpitBuilder {
        BallpitBuilder::new()
    }

    pub fn core(&self) -> &BallpitCore<B, S> {
        &self.core
    }

    pub fn spheres(&self) -> &Spheres {
        &self.spheres
    }

    /// Current configuration, with bounds following the viewport.
    pub fn config(&self) -> &BallpitConfig {
        &self.config
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn size(&self) -> SurfaceSize {
        self.core.size()
    }

    pub fn is_running(&self) -> bool {
        self.core.is_running()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }

    /// Handle a frame callback from the scheduler.
    pub fn frame(&mut self, now: Instant) -> Option<FrameInfo> {
        let paused = self.paused;
        let spheres = &mut self.spheres;
        self.core.frame(
            now,
            |info, scene| {
                if !paused {
                    spheres.update(info.delta, scene);
                }
            },
            |_| {},
        )
    }

    /// React to an event from the interaction registry.
    ///
    /// Moving over the surface steers particle 0 towards the pointer's spot
    /// on the plane through the origin; leaving releases it.
    pub fn handle_interaction(&mut self, event: &InteractionEvent) {
        if self.core.is_disposed() || event.surface != self.interaction.surface() {
            return;
        }
        match event.kind {
            InteractionKind::Move => {
                let target = self.projector.project(self.core.camera(), event.state.n_position);
                let physics = self.spheres.physics_mut();
                physics.set_center(target);
                physics.set_control_sphere0(true);
            }
            InteractionKind::Leave => {
                self.spheres.physics_mut().set_control_sphere0(false);
            }
            InteractionKind::Enter | InteractionKind::Click => {}
        }
    }

    /// Pass a batch of registry events through [`handle_interaction`](Self::handle_interaction).
    pub fn handle_interactions(&mut self, events: &[InteractionEvent]) {
        for event in events {
            self.handle_interaction(event);
        }
    }

    /// The surface entered or left the viewport.
    pub fn set_intersecting(&mut self, intersecting: bool, now: Instant) {
        self.core.set_intersecting(intersecting, now);
    }

    /// The app went to the background or came back.
    pub fn set_hidden(&mut self, hidden: bool, now: Instant) {
        self.core.set_hidden(hidden, now);
    }

    /// Record a resize event. Applied by [`poll_resize`](Self::poll_resize)
    /// once the debounce delay has passed.
    pub fn request_resize(&mut self, now: Instant) {
        self.core.request_resize(now);
    }

    pub fn resize_deadline(&self) -> Option<Instant> {
        self.core.resize_deadline()
    }

    pub fn poll_resize(&mut self, now: Instant) -> Option<SurfaceSize> {
        let size = self.core.poll_resize(now)?;
        self.after_resize(size);
        Some(size)
    }

    /// Resize right away, skipping the debounce.
    pub fn resize(&mut self) -> SurfaceSize {
        let size = self.core.resize();
        self.after_resize(size);
        size
    }

    fn after_resize(&mut self, size: SurfaceSize) {
        apply_bounds(&mut self.config, size);
        self.spheres
            .physics_mut()
            .set_bounds(self.config.physics.max_x, self.config.physics.max_y);
    }

    /// Rebuild the pit with `count` spheres. Positions are re-randomized and
    /// the old mesh's resources are released first.
    pub fn set_count(&mut self, count: usize) {
        if self.core.is_disposed() {
            return;
        }
        self.core.clear();
        self.config.physics.count = count;
        let physics = PhysicsEngine::with_rng(self.config.physics.clone(), &mut self.rng);
        let (backend, scene) = self.core.backend_and_scene();
        self.spheres = Spheres::with_physics(self.config.clone(), physics, backend, scene);
    }

    /// Freeze or resume the physics. Drawing continues while paused.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        log::debug!("ball pit {}", if self.paused { "paused" } else { "resumed" });
        self.paused
    }

    /// Stop tracking the pointer, stop the loop and release every resource.
    /// Calling it again does nothing.
    pub fn dispose(&mut self) {
        self.interaction.dispose();
        self.core.dispose();
    }
}

fn apply_bounds(config: &mut BallpitConfig, size: SurfaceSize) {
    if size.w_width > 0.0 && size.w_height > 0.0 {
        config.physics.max_x = size.w_width / 2.0;
        config.physics.max_y = size.w_height / 2.0;
    }
}
