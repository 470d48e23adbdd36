//! Render loop lifecycle.
//!
//! The loop is a two-state machine, `Stopped` and `Running`. While running,
//! every delivered frame schedules the next one through a
//! [`FrameScheduler`]; stopping cancels the pending frame and freezes the
//! clock. A frame delivered after a stop (already queued by the platform) is
//! dropped.
//!
//! Two independent signals gate the loop: whether the surface intersects
//! the viewport and whether the page/app is in the foreground. The loop runs
//! only while both hold. [`VisibilityGate`] folds the two signals into
//! start/stop decisions.

use std::time::{Duration, Instant};

use crate::time::FrameClock;

/// Platform hook for per-frame callbacks (`requestAnimationFrame`-style).
pub trait FrameScheduler {
    /// Ask for one frame callback.
    fn request_frame(&mut self);

    /// Drop the pending callback, if the platform supports it.
    fn cancel_frame(&mut self) {}
}

/// Timing handed to the per-frame hooks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Seconds since the previous frame.
    pub delta: f32,
    /// Seconds the loop has been running in total.
    pub elapsed: f32,
    /// Frames delivered while running.
    pub frame: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// Start/stop state machine around a [`FrameClock`].
#[derive(Debug)]
pub struct RenderLoop {
    state: LoopState,
    clock: FrameClock,
    frame_pending: bool,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Stopped,
            clock: FrameClock::new(),
            frame_pending: false,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// `Stopped → Running`. No-op when already running.
    pub fn start(&mut self, now: Instant, scheduler: &mut dyn FrameScheduler) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = LoopState::Running;
        self.clock.start(now);
        self.schedule(scheduler);
        log::debug!("render loop started");
        true
    }

    /// `Running → Stopped`. No-op when already stopped.
    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        if !self.is_running() {
            return false;
        }
        if self.frame_pending {
            scheduler.cancel_frame();
            self.frame_pending = false;
        }
        self.state = LoopState::Stopped;
        self.clock.stop();
        log::debug!("render loop stopped");
        true
    }

    /// Handle a delivered frame callback.
    ///
    /// Returns `None` for a stale frame (the loop is stopped). Otherwise the
    /// next frame is scheduled before the timing is returned, so the caller's
    /// hooks and draw call run inside an already-rescheduled frame.
    pub fn frame(&mut self, now: Instant, scheduler: &mut dyn FrameScheduler) -> Option<FrameInfo> {
        self.frame_pending = false;
        if !self.is_running() {
            return None;
        }
        self.schedule(scheduler);
        let (delta, elapsed) = self.clock.tick(now);
        Some(FrameInfo {
            delta,
            elapsed,
            frame: self.clock.frame(),
        })
    }

    fn schedule(&mut self, scheduler: &mut dyn FrameScheduler) {
        scheduler.request_frame();
        self.frame_pending = true;
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

/// What the loop should do after a visibility signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    Start,
    Stop,
    Nothing,
}

/// Combines viewport intersection and page visibility.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityGate {
    intersecting: bool,
    hidden: bool,
}

impl VisibilityGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface entered or left the viewport.
    pub fn set_intersecting(&mut self, intersecting: bool) -> GateAction {
        self.intersecting = intersecting;
        if self.should_run() {
            GateAction::Start
        } else {
            GateAction::Stop
        }
    }

    /// Page/app went to the background or came back. Only acts while the
    /// surface is on screen.
    pub fn set_hidden(&mut self, hidden: bool) -> GateAction {
        self.hidden = hidden;
        if !self.intersecting {
            return GateAction::Nothing;
        }
        if hidden {
            GateAction::Stop
        } else {
            GateAction::Start
        }
    }

    pub fn is_intersecting(&self) -> bool {
        self.intersecting
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn should_run(&self) -> bool {
        self.intersecting && !self.hidden
    }
}

/// Coalesces bursts of resize events into one resize after a quiet period.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl ResizeDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Record a resize event, pushing the deadline back.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Pending deadline, for the host's wake-up timer.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` once when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
