//! Frame timing for the render loop.
//!
//! [`FrameClock`] measures the time between frames while the loop runs.
//! Stopping the clock freezes `elapsed`; the first frame after a restart
//! measures from the restart, not from the last frame before the stop.
//!
//! # Example
//!
//! ```ignore
//! use ballpit::time::FrameClock;
//! use std::time::Instant;
//!
//! let mut clock = FrameClock::new();
//! clock.start(Instant::now());
//!
//! // Every frame:
//! let (delta, elapsed) = clock.tick(Instant::now());
//! ```

use std::time::{Duration, Instant};

/// Delta/elapsed tracking for a start/stop render loop.
#[derive(Debug)]
pub struct FrameClock {
    /// When the last frame (or the last start) occurred.
    last_frame: Option<Instant>,
    /// Accumulated running time in seconds.
    elapsed_secs: f32,
    /// Time since last frame in seconds.
    delta_secs: f32,
    /// Frames ticked while running.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Option<Instant>,
    fps_update_interval: Duration,
    running: bool,
}

impl FrameClock {
    /// Create a stopped clock.
    pub fn new() -> Self {
        Self {
            last_frame: None,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: None,
            fps_update_interval: Duration::from_millis(500),
            running: false,
        }
    }

    /// Start (or restart) measuring from `now`.
    pub fn start(&mut self, now: Instant) {
        self.last_frame = Some(now);
        self.fps_update_time = Some(now);
        self.fps_frame_count = self.frame_count;
        self.running = true;
    }

    /// Stop measuring. `elapsed` keeps its value until the next start.
    pub fn stop(&mut self) {
        self.running = false;
        self.delta_secs = 0.0;
    }

    /// Record a frame at `now`.
    ///
    /// Returns `(delta, elapsed)`. While stopped both stay frozen and the
    /// delta is zero.
    pub fn tick(&mut self, now: Instant) -> (f32, f32) {
        if !self.running {
            self.delta_secs = 0.0;
            return (self.delta_secs, self.elapsed_secs);
        }

        let last = self.last_frame.unwrap_or(now);
        self.delta_secs = now.saturating_duration_since(last).as_secs_f32();
        self.elapsed_secs += self.delta_secs;
        self.last_frame = Some(now);
        self.frame_count += 1;

        let fps_since = self.fps_update_time.unwrap_or(now);
        let fps_elapsed = now.saturating_duration_since(fps_since);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = Some(now);
        }

        (self.delta_secs, self.elapsed_secs)
    }

    /// Time since last frame in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total running time in seconds.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Frames ticked while running.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
