//! Pointer and touch tracking over drawable surfaces.
//!
//! One [`InteractionRegistry`] is shared by every tracked surface in the
//! process. The host forwards raw pointer/touch events to it once; the
//! registry hit-tests each tracked surface against its *current* bounding
//! rectangle (queried on every event, never cached) and returns the
//! resulting [`InteractionEvent`]s.
//!
//! The registry "listens" only while at least one surface is tracked: the
//! first [`register`](InteractionRegistry::register) installs the shared
//! subscription and dropping the last registration removes it. While not
//! listening, incoming events are ignored.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InteractionRegistry::shared();
//! let handle = InteractionRegistry::register(&registry, surface.clone());
//!
//! // In the host's event handler:
//! let events = registry.borrow_mut().pointer_move(Vec2::new(x, y));
//! for event in events {
//!     ballpit.handle_interaction(&event);
//! }
//!
//! handle.dispose();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

/// Identity of a tracked surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

/// Axis-aligned rectangle in client coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Inclusive on every edge.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left
            && point.x <= self.left + self.width
            && point.y >= self.top
            && point.y <= self.top + self.height
    }
}

/// Something the ball pit can draw on and track the pointer over.
pub trait DrawSurface {
    /// Stable identity used as the registry key.
    fn id(&self) -> SurfaceId;

    /// Current bounds in client coordinates (logical pixels).
    fn bounding_rect(&self) -> Rect;

    /// Physical pixels per logical pixel.
    fn device_pixel_ratio(&self) -> f32 {
        1.0
    }
}

/// Per-surface pointer state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractionState {
    /// Pointer position relative to the surface's top-left corner.
    pub position: Vec2,
    /// Pointer position in `[-1, 1]²`, y up.
    pub n_position: Vec2,
    pub hover: bool,
    pub touching: bool,
}

impl InteractionState {
    fn update_position(&mut self, pointer: Vec2, rect: &Rect) {
        self.position = Vec2::new(pointer.x - rect.left, pointer.y - rect.top);
        self.n_position = Vec2::new(
            (self.position.x / rect.width) * 2.0 - 1.0,
            (-self.position.y / rect.height) * 2.0 + 1.0,
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Enter,
    Move,
    Leave,
    Click,
}

/// A transition or movement on one surface, with the state after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionEvent {
    pub surface: SurfaceId,
    pub kind: InteractionKind,
    pub state: InteractionState,
}

struct TrackedSurface {
    surface: Rc<dyn DrawSurface>,
    state: InteractionState,
}

/// Process-wide registry of tracked surfaces.
#[derive(Default)]
pub struct InteractionRegistry {
    // Vec keeps registration order for event delivery.
    entries: Vec<TrackedSurface>,
    pointer: Vec2,
    listening: bool,
}

/// Registry shared between the host's event handler and its components.
pub type SharedRegistry = Rc<RefCell<InteractionRegistry>>;

impl InteractionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the registry behind a shared handle.
    pub fn shared() -> SharedRegistry {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Start tracking `surface` and return a handle that stops tracking it.
    ///
    /// Registering an already tracked surface keeps the existing state.
    pub fn register(registry: &SharedRegistry, surface: Rc<dyn DrawSurface>) -> InteractionHandle {
        let id = surface.id();
        registry.borrow_mut().track(surface);
        InteractionHandle {
            id,
            registry: Rc::downgrade(registry),
            disposed: false,
        }
    }

    /// Track `surface`. Returns `false` if it was already tracked.
    pub fn track(&mut self, surface: Rc<dyn DrawSurface>) -> bool {
        let id = surface.id();
        if self.entries.iter().any(|e| e.surface.id() == id) {
            return false;
        }
        self.entries.push(TrackedSurface {
            surface,
            state: InteractionState::default(),
        });
        if !self.listening {
            self.listening = true;
            log::debug!("interaction listeners installed");
        }
        true
    }

    /// Stop tracking `id`. Returns `false` if it was not tracked.
    pub fn untrack(&mut self, id: SurfaceId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.surface.id() != id);
        let removed = self.entries.len() != before;
        if self.entries.is_empty() && self.listening {
            self.listening = false;
            log::debug!("interaction listeners removed");
        }
        removed
    }

    /// Whether the shared subscription is installed.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Number of tracked surfaces.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// State of a tracked surface.
    pub fn state(&self, id: SurfaceId) -> Option<&InteractionState> {
        self.entries
            .iter()
            .find(|e| e.surface.id() == id)
            .map(|e| &e.state)
    }

    /// Last pointer position in client coordinates.
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Pointer moved to `position`.
    pub fn pointer_move(&mut self, position: Vec2) -> Vec<InteractionEvent> {
        let mut events = Vec::new();
        if !self.listening {
            return events;
        }
        self.pointer = position;
        for entry in &mut self.entries {
            let id = entry.surface.id();
            let rect = entry.surface.bounding_rect();
            let state = &mut entry.state;
            if rect.contains(position) {
                state.update_position(position, &rect);
                if !state.hover {
                    state.hover = true;
                    events.push(event(id, InteractionKind::Enter, state));
                }
                events.push(event(id, InteractionKind::Move, state));
            } else if state.hover && !state.touching {
                state.hover = false;
                events.push(event(id, InteractionKind::Leave, state));
            }
        }
        events
    }

    /// Pointer left the client area entirely.
    pub fn pointer_leave(&mut self) -> Vec<InteractionEvent> {
        let mut events = Vec::new();
        if !self.listening {
            return events;
        }
        for entry in &mut self.entries {
            if entry.state.hover {
                entry.state.hover = false;
                events.push(event(entry.surface.id(), InteractionKind::Leave, &entry.state));
            }
        }
        events
    }

    /// Click at `position`. Every surface's position is refreshed; only
    /// surfaces containing the point get a click.
    pub fn click(&mut self, position: Vec2) -> Vec<InteractionEvent> {
        let mut events = Vec::new();
        if !self.listening {
            return events;
        }
        self.pointer = position;
        for entry in &mut self.entries {
            let rect = entry.surface.bounding_rect();
            entry.state.update_position(position, &rect);
            if rect.contains(position) {
                events.push(event(entry.surface.id(), InteractionKind::Click, &entry.state));
            }
        }
        events
    }

    /// A touch began. Only the first touch point is tracked.
    pub fn touch_start(&mut self, touches: &[Vec2]) -> Vec<InteractionEvent> {
        let mut events = Vec::new();
        let Some(&position) = touches.first() else {
            return events;
        };
        if !self.listening {
            return events;
        }
        self.pointer = position;
        for entry in &mut self.entries {
            let id = entry.surface.id();
            let rect = entry.surface.bounding_rect();
            let state = &mut entry.state;
            if rect.contains(position) {
                state.touching = true;
                state.update_position(position, &rect);
                if !state.hover {
                    state.hover = true;
                    events.push(event(id, InteractionKind::Enter, state));
                }
                events.push(event(id, InteractionKind::Move, state));
            }
        }
        events
    }

    /// A touch moved. A drag that started inside keeps delivering moves
    /// after leaving the surface, until the touch ends.
    pub fn touch_move(&mut self, touches: &[Vec2]) -> Vec<InteractionEvent> {
        let mut events = Vec::new();
        let Some(&position) = touches.first() else {
            return events;
        };
        if !self.listening {
            return events;
        }
        self.pointer = position;
        for entry in &mut self.entries {
            let id = entry.surface.id();
            let rect = entry.surface.bounding_rect();
            let state = &mut entry.state;
            state.update_position(position, &rect);
            if rect.contains(position) {
                if !state.hover {
                    state.hover = true;
                    state.touching = true;
                    events.push(event(id, InteractionKind::Enter, state));
                }
                events.push(event(id, InteractionKind::Move, state));
            } else if state.hover && state.touching {
                events.push(event(id, InteractionKind::Move, state));
            }
        }
        events
    }

    /// All touches ended or were cancelled.
    pub fn touch_end(&mut self) -> Vec<InteractionEvent> {
        let mut events = Vec::new();
        if !self.listening {
            return events;
        }
        for entry in &mut self.entries {
            let state = &mut entry.state;
            if state.touching {
                state.touching = false;
                if state.hover {
                    state.hover = false;
                    events.push(event(entry.surface.id(), InteractionKind::Leave, state));
                }
            }
        }
        events
    }
}

fn event(surface: SurfaceId, kind: InteractionKind, state: &InteractionState) -> InteractionEvent {
    InteractionEvent {
        surface,
        kind,
        state: *state,
    }
}

/// Registration of one surface. Disposing it is idempotent.
#[derive(Debug)]
pub struct InteractionHandle {
    id: SurfaceId,
    registry: std::rc::Weak<RefCell<InteractionRegistry>>,
    disposed: bool,
}

impl InteractionHandle {
    pub fn surface(&self) -> SurfaceId {
        self.id
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Stop tracking the surface. Later calls do nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().untrack(self.id);
        }
    }
}
