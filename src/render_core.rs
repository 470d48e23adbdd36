//! Render core: camera, scene, backend and the loop that drives them.

use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::camera::{PerspectiveCamera, WorldSize};
use crate::config::{SurfaceSizing, ViewConfig};
use crate::interaction::DrawSurface;
use crate::render_loop::{FrameInfo, FrameScheduler, GateAction, RenderLoop, ResizeDebouncer, VisibilityGate};
use crate::scene::{RenderBackend, Scene};

/// Surface dimensions recomputed on every resize.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceSize {
    /// Logical pixels.
    pub width: f32,
    pub height: f32,
    pub ratio: f32,
    /// Visible world width at the camera distance.
    pub w_width: f32,
    /// Visible world height at the camera distance.
    pub w_height: f32,
    pub pixel_ratio: f32,
}

/// Owns the camera, scene and backend for one drawable surface.
pub struct BallpitCore<B: RenderBackend, S: FrameScheduler> {
    surface: Rc<dyn DrawSurface>,
    backend: B,
    scheduler: S,
    camera: PerspectiveCamera,
    scene: Scene,
    size: SurfaceSize,
    sizing: SurfaceSizing,
    min_pixel_ratio: Option<f32>,
    max_pixel_ratio: Option<f32>,
    render_loop: RenderLoop,
    gate: VisibilityGate,
    resize: ResizeDebouncer,
    disposed: bool,
}

impl<B: RenderBackend, S: FrameScheduler> BallpitCore<B, S> {
    /// Create a stopped core. Call [`resize`](Self::resize) before the first frame.
    pub fn new(surface: Rc<dyn DrawSurface>, backend: B, scheduler: S, view: &ViewConfig) -> Self {
        Self {
            surface,
            backend,
            scheduler,
            camera: PerspectiveCamera::new(view),
            scene: Scene::new(),
            size: SurfaceSize::default(),
            sizing: view.sizing,
            min_pixel_ratio: view.min_pixel_ratio,
            max_pixel_ratio: view.max_pixel_ratio,
            render_loop: RenderLoop::new(),
            gate: VisibilityGate::new(),
            resize: ResizeDebouncer::new(Duration::from_millis(view.resize_debounce_ms)),
            disposed: false,
        }
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Backend and scene together, for building meshes.
    pub fn backend_and_scene(&mut self) -> (&mut B, &mut Scene) {
        (&mut self.backend, &mut self.scene)
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn surface(&self) -> &Rc<dyn DrawSurface> {
        &self.surface
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    pub fn is_running(&self) -> bool {
        self.render_loop.is_running()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Start the loop. Ignored once disposed.
    pub fn start(&mut self, now: Instant) {
        if self.disposed {
            return;
        }
        self.render_loop.start(now, &mut self.scheduler);
    }

    pub fn stop(&mut self) {
        self.render_loop.stop(&mut self.scheduler);
    }

    /// The surface entered (`true`) or left the viewport.
    pub fn set_intersecting(&mut self, intersecting: bool, now: Instant) {
        let action = self.gate.set_intersecting(intersecting);
        self.apply(action, now);
    }

    /// The page/app was hidden (`true`) or shown again.
    pub fn set_hidden(&mut self, hidden: bool, now: Instant) {
        let action = self.gate.set_hidden(hidden);
        self.apply(action, now);
    }

    fn apply(&mut self, action: GateAction, now: Instant) {
        match action {
            GateAction::Start => self.start(now),
            GateAction::Stop => self.stop(),
            GateAction::Nothing => {}
        }
    }

    /// Run one delivered frame: `before` (physics), the draw call, then `after`.
    ///
    /// Returns `None` without calling anything when the frame is stale.
    pub fn frame<F, G>(&mut self, now: Instant, before: F, after: G) -> Option<FrameInfo>
    where
        F: FnOnce(&FrameInfo, &mut Scene),
        G: FnOnce(&FrameInfo),
    {
        let info = self.render_loop.frame(now, &mut self.scheduler)?;
        before(&info, &mut self.scene);
        self.backend.render(&self.scene, &self.camera);
        after(&info);
        Some(info)
    }

    /// Record a platform resize event; the resize itself is debounced.
    pub fn request_resize(&mut self, now: Instant) {
        if matches!(self.sizing, SurfaceSizing::Fixed { .. }) {
            return;
        }
        self.resize.schedule(now);
    }

    /// When the pending resize (if any) is due.
    pub fn resize_deadline(&self) -> Option<Instant> {
        self.resize.deadline()
    }

    /// Apply a due debounced resize.
    pub fn poll_resize(&mut self, now: Instant) -> Option<SurfaceSize> {
        if self.resize.poll(now) {
            Some(self.resize())
        } else {
            None
        }
    }

    /// Resize immediately from the surface (or the fixed size).
    pub fn resize(&mut self) -> SurfaceSize {
        let (width, height) = match self.sizing {
            SurfaceSizing::Fixed { width, height } => (width, height),
            SurfaceSizing::Surface => {
                let rect = self.surface.bounding_rect();
                (rect.width, rect.height)
            }
        };
        self.resize_to(width, height)
    }

    /// Resize to an explicit logical size.
    ///
    /// Zero-sized surfaces (minimized windows) keep the previous camera.
    pub fn resize_to(&mut self, width: f32, height: f32) -> SurfaceSize {
        if self.disposed || width <= 0.0 || height <= 0.0 {
            return self.size;
        }
        self.camera.set_aspect(width / height);
        let WorldSize {
            width: w_width,
            height: w_height,
        } = self.camera.world_size();

        let pixel_ratio = self.clamp_pixel_ratio(self.surface.device_pixel_ratio());
        self.backend.set_size(width, height, pixel_ratio);

        self.size = SurfaceSize {
            width,
            height,
            ratio: width / height,
            w_width,
            w_height,
            pixel_ratio,
        };
        log::debug!(
            "resized to {}x{} (world {:.2}x{:.2}, fov {:.1}, dpr {})",
            width,
            height,
            w_width,
            w_height,
            self.camera.fov,
            pixel_ratio
        );
        self.size
    }

    fn clamp_pixel_ratio(&self, ratio: f32) -> f32 {
        match (self.min_pixel_ratio, self.max_pixel_ratio) {
            (_, Some(max)) if ratio > max => max,
            (Some(min), _) if ratio < min => min,
            _ => ratio,
        }
    }

    /// Release the scene's resources. Used when rebuilding the spheres.
    pub fn clear(&mut self) {
        self.scene.clear(&mut self.backend);
    }

    /// Stop the loop and release all scene and backend resources.
    /// Calling it again does nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.stop();
        self.resize.cancel();
        self.clear();
        self.backend.dispose();
        self.disposed = true;
        log::debug!("render core disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{Rect, SurfaceId};
    use crate::scene::{GeometryHandle, MaterialDesc, MaterialHandle};
    use std::cell::Cell;

    struct FakeSurface {
        rect: Cell<Rect>,
        dpr: f32,
    }

    impl DrawSurface for FakeSurface {
        fn id(&self) -> SurfaceId {
            SurfaceId(1)
        }
        fn bounding_rect(&self) -> Rect {
            self.rect.get()
        }
        fn device_pixel_ratio(&self) -> f32 {
            self.dpr
        }
    }

    #[derive(Default)]
    struct SizeBackend {
        sizes: Vec<(f32, f32, f32)>,
        renders: usize,
        disposed: usize,
    }

    impl RenderBackend for SizeBackend {
        fn create_sphere_geometry(&mut self) -> GeometryHandle {
            GeometryHandle(1)
        }
        fn create_material(&mut self, _desc: &MaterialDesc) -> MaterialHandle {
            MaterialHandle(1)
        }
        fn release_geometry(&mut self, _handle: GeometryHandle) {}
        fn release_material(&mut self, _handle: MaterialHandle) {}
        fn set_size(&mut self, width: f32, height: f32, pixel_ratio: f32) {
            self.sizes.push((width, height, pixel_ratio));
        }
        fn render(&mut self, _scene: &Scene, _camera: &PerspectiveCamera) {
            self.renders += 1;
        }
        fn dispose(&mut self) {
            self.disposed += 1;
        }
    }

    #[derive(Default)]
    struct Frames(usize);

    impl FrameScheduler for Frames {
        fn request_frame(&mut self) {
            self.0 += 1;
        }
    }

    fn make_core(view: ViewConfig, width: f32, height: f32, dpr: f32) -> BallpitCore<SizeBackend, Frames> {
        let surface = Rc::new(FakeSurface {
            rect: Cell::new(Rect::new(0.0, 0.0, width, height)),
            dpr,
        });
        BallpitCore::new(surface, SizeBackend::default(), Frames::default(), &view)
    }

    #[test]
    fn test_resize_derives_world_size() {
        let view = ViewConfig {
            max_aspect: None,
            ..ViewConfig::default()
        };
        let mut core = make_core(view, 1280.0, 720.0, 1.0);
        let size = core.resize();

        let expected = 2.0 * (25.0_f32.to_radians()).tan() * 20.0;
        assert!((size.w_height - expected).abs() < 1e-4);
        assert!((size.w_width - expected * 1280.0 / 720.0).abs() < 1e-4);
        assert_eq!(core.backend().sizes, vec![(1280.0, 720.0, 1.0)]);
    }

    #[test]
    fn test_pixel_ratio_is_clamped() {
        let view = ViewConfig {
            max_pixel_ratio: Some(1.5),
            ..ViewConfig::default()
        };
        let mut core = make_core(view, 100.0, 100.0, 3.0);
        assert_eq!(core.resize().pixel_ratio, 1.5);

        let view = ViewConfig {
            min_pixel_ratio: Some(1.0),
            ..ViewConfig::default()
        };
        let mut core_low = make_core(view, 100.0, 100.0, 0.5);
        assert_eq!(core_low.resize().pixel_ratio, 1.0);
    }

    #[test]
    fn test_zero_size_keeps_previous() {
        let mut core = make_core(ViewConfig::default(), 400.0, 300.0, 1.0);
        let before = core.resize();
        let after = core.resize_to(0.0, 300.0);
        assert_eq!(before, after);
        assert_eq!(core.backend().sizes.len(), 1);
    }

    #[test]
    fn test_fixed_sizing_ignores_resize_events() {
        let view = ViewConfig {
            sizing: SurfaceSizing::Fixed {
                width: 640.0,
                height: 480.0,
            },
            ..ViewConfig::default()
        };
        let mut core = make_core(view, 10.0, 10.0, 1.0);
        assert_eq!(core.resize().width, 640.0);
        let now = Instant::now();
        core.request_resize(now);
        assert!(core.resize_deadline().is_none());
    }

    #[test]
    fn test_debounced_resize() {
        let mut core = make_core(ViewConfig::default(), 400.0, 300.0, 1.0);
        let t0 = Instant::now();
        core.request_resize(t0);
        assert!(core.poll_resize(t0 + Duration::from_millis(50)).is_none());
        let size = core.poll_resize(t0 + Duration::from_millis(100)).unwrap();
        assert_eq!(size.width, 400.0);
    }

    #[test]
    fn test_frame_runs_hooks_around_draw() {
        let mut core = make_core(ViewConfig::default(), 400.0, 300.0, 1.0);
        let t0 = Instant::now();
        core.set_intersecting(true, t0);

        let order = std::cell::RefCell::new(Vec::new());
        let info = core.frame(
            t0 + Duration::from_millis(16),
            |_, _| order.borrow_mut().push("before"),
            |_| order.borrow_mut().push("after"),
        );
        assert!(info.is_some());
        assert_eq!(*order.borrow(), vec!["before", "after"]);
        assert_eq!(core.backend().renders, 1);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut core = make_core(ViewConfig::default(), 400.0, 300.0, 1.0);
        core.start(Instant::now());
        core.dispose();
        core.dispose();
        assert!(!core.is_running());
        assert_eq!(core.backend().disposed, 1);

        core.start(Instant::now());
        assert!(!core.is_running());
    }
}
