//! Native host: a winit window driving one [`Ballpit`].
//!
//! Platform events map onto the component like this:
//!
//! | winit | ball pit |
//! |-------|----------|
//! | `CursorMoved`, `CursorLeft`, left click, `Touch` | interaction registry |
//! | `Occluded(b)` | surface intersecting = `!b` |
//! | `suspended` / `resumed` | app hidden / visible |
//! | `Resized`, `ScaleFactorChanged` | debounced resize |
//! | `RedrawRequested` | one frame |
//! | `CloseRequested` | dispose and exit |
//!
//! Keys: `Space` pauses, `Up`/`Down` double or halve the sphere count,
//! `Escape` quits.

use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalPosition,
    event::{ElementState, KeyEvent, MouseButton, Touch, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::ballpit::{Ballpit, BallpitBuilder};
use crate::config::BallpitConfig;
use crate::error::BallpitError;
use crate::gpu::WgpuBackend;
use crate::interaction::{DrawSurface, InteractionEvent, InteractionRegistry, Rect, SharedRegistry, SurfaceId};
use crate::render_loop::FrameScheduler;

const TITLE: &str = "Ballpit";

/// A winit window as a drawable surface. Coordinates are logical pixels
/// relative to the client area.
pub struct WindowSurface {
    window: Arc<Window>,
}

impl WindowSurface {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }
}

impl DrawSurface for WindowSurface {
    fn id(&self) -> SurfaceId {
        SurfaceId(u64::from(self.window.id()))
    }

    fn bounding_rect(&self) -> Rect {
        let size = self
            .window
            .inner_size()
            .to_logical::<f32>(self.window.scale_factor());
        Rect::new(0.0, 0.0, size.width, size.height)
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.window.scale_factor() as f32
    }
}

/// Frames are redraw requests. winit cannot take one back, so a stale
/// redraw reaches the loop and is dropped there.
pub struct WindowScheduler {
    window: Arc<Window>,
}

impl WindowScheduler {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }
}

impl FrameScheduler for WindowScheduler {
    fn request_frame(&mut self) {
        self.window.request_redraw();
    }
}

type WindowBallpit = Ballpit<WgpuBackend, WindowScheduler>;

/// winit application hosting a ball pit in its own window.
pub struct BallpitApp {
    config: BallpitConfig,
    registry: SharedRegistry,
    window: Option<Arc<Window>>,
    ballpit: Option<WindowBallpit>,
    touches: Vec<(u64, Vec2)>,
    error: Option<BallpitError>,
}

impl BallpitApp {
    pub fn new(config: BallpitConfig) -> Self {
        Self {
            config,
            registry: InteractionRegistry::shared(),
            window: None,
            ballpit: None,
            touches: Vec::new(),
            error: None,
        }
    }

    fn create(&mut self, event_loop: &ActiveEventLoop) -> Result<(), BallpitError> {
        let window_attrs = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let backend = pollster::block_on(WgpuBackend::new(window.clone()))?;
        let mut ballpit = BallpitBuilder::new()
            .with_config(self.config.clone())
            .with_surface(Rc::new(WindowSurface::new(window.clone())))
            .with_registry(self.registry.clone())
            .build(backend, WindowScheduler::new(window.clone()))?;
        ballpit.set_intersecting(true, Instant::now());

        self.window = Some(window);
        self.ballpit = Some(ballpit);
        Ok(())
    }

    fn dispatch(&mut self, events: Vec<InteractionEvent>) {
        if let Some(ballpit) = &mut self.ballpit {
            ballpit.handle_interactions(&events);
        }
    }

    fn logical(&self, position: PhysicalPosition<f64>) -> Vec2 {
        let scale = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
        let p = position.to_logical::<f32>(scale);
        Vec2::new(p.x, p.y)
    }

    fn touch(&mut self, touch: Touch) {
        let position = self.logical(touch.location);
        let events = match touch.phase {
            TouchPhase::Started => {
                self.touches.push((touch.id, position));
                let points = self.touch_points();
                if self.touches.len() == 1 {
                    self.registry.borrow_mut().touch_start(&points)
                } else {
                    self.registry.borrow_mut().touch_move(&points)
                }
            }
            TouchPhase::Moved => {
                if let Some(entry) = self.touches.iter_mut().find(|(id, _)| *id == touch.id) {
                    entry.1 = position;
                }
                let points = self.touch_points();
                self.registry.borrow_mut().touch_move(&points)
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.touches.retain(|(id, _)| *id != touch.id);
                if self.touches.is_empty() {
                    self.registry.borrow_mut().touch_end()
                } else {
                    Vec::new()
                }
            }
        };
        self.dispatch(events);
    }

    fn touch_points(&self) -> Vec<Vec2> {
        self.touches.iter().map(|(_, p)| *p).collect()
    }

    fn key(&mut self, event_loop: &ActiveEventLoop, event: KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        let Some(ballpit) = &mut self.ballpit else {
            return;
        };
        match event.logical_key {
            Key::Named(NamedKey::Space) => {
                ballpit.toggle_pause();
            }
            Key::Named(NamedKey::ArrowUp) => {
                let count = (ballpit.spheres().count() * 2).max(1);
                ballpit.set_count(count);
            }
            Key::Named(NamedKey::ArrowDown) => {
                let count = (ballpit.spheres().count() / 2).max(1);
                ballpit.set_count(count);
            }
            Key::Named(NamedKey::Escape) => self.close(event_loop),
            _ => {}
        }
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(ballpit) = &mut self.ballpit {
            ballpit.dispose();
        }
        event_loop.exit();
    }

    fn redraw(&mut self) {
        let (Some(ballpit), Some(window)) = (&mut self.ballpit, &self.window) else {
            return;
        };
        let Some(info) = ballpit.frame(Instant::now()) else {
            return;
        };
        if info.frame % 30 == 0 {
            let fps = ballpit.core().render_loop().clock().fps();
            let paused = if ballpit.is_paused() { " (paused)" } else { "" };
            window.set_title(&format!(
                "{} - {} spheres - {:.0} fps{}",
                TITLE,
                ballpit.spheres().count(),
                fps,
                paused
            ));
        }
    }
}

impl ApplicationHandler for BallpitApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create(event_loop) {
                log::error!("failed to start: {}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        } else if let Some(ballpit) = &mut self.ballpit {
            ballpit.set_hidden(false, Instant::now());
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ballpit) = &mut self.ballpit {
            ballpit.set_hidden(true, Instant::now());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.close(event_loop),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(ballpit) = &mut self.ballpit {
                    ballpit.request_resize(Instant::now());
                }
            }
            WindowEvent::Occluded(occluded) => {
                if let Some(ballpit) = &mut self.ballpit {
                    ballpit.set_intersecting(!occluded, Instant::now());
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = self.logical(position);
                let events = self.registry.borrow_mut().pointer_move(position);
                self.dispatch(events);
            }
            WindowEvent::CursorLeft { .. } => {
                let events = self.registry.borrow_mut().pointer_leave();
                self.dispatch(events);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                let mut registry = self.registry.borrow_mut();
                let pointer = registry.pointer();
                let events = registry.click(pointer);
                drop(registry);
                self.dispatch(events);
            }
            WindowEvent::Touch(touch) => self.touch(touch),
            WindowEvent::KeyboardInput { event, .. } => self.key(event_loop, event),
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(ballpit) = &mut self.ballpit else {
            return;
        };
        ballpit.poll_resize(Instant::now());
        match ballpit.resize_deadline() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}

/// Open a window and run the ball pit until it is closed.
pub fn run(config: BallpitConfig) -> Result<(), BallpitError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = BallpitApp::new(config);
    event_loop.run_app(&mut app)?;
    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
