//! Frame and spawn clocks.
//!
//! [`Time`] tracks wall-clock frame timing for the front end (delta, frame
//! count, FPS, pause). [`SpawnClock`] turns elapsed time into a number of
//! fixed-interval spawn events, so spawning keeps its own cadence no matter
//! how fast frames arrive.
//!
//! # Example
//!
//! ```ignore
//! let mut time = Time::new();
//! let mut clock = SpawnClock::new(Duration::from_millis(10), 16);
//!
//! // In your frame loop:
//! let delta = time.update();
//! for _ in 0..clock.advance(delta) {
//!     // spawn one ray
//! }
//! ```

use std::time::{Duration, Instant};

/// Time tracking for the frame loop.
#[derive(Debug)]
pub struct Time {
    /// When the timer was created.
    start: Instant,
    /// When the last frame occurred.
    last_frame: Instant,
    /// Time since last frame.
    delta: Duration,
    /// Total frames since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    /// How often to update FPS calculation.
    fps_update_interval: Duration,
    /// Whether time is paused.
    paused: bool,
    /// Total time spent paused.
    pause_elapsed: Duration,
}

impl Time {
    /// Create a new time tracker starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta: Duration::ZERO,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            paused: false,
            pause_elapsed: Duration::ZERO,
        }
    }

    /// Update timing values. Call once per frame.
    ///
    /// Returns the delta, which is zero while paused.
    pub fn update(&mut self) -> Duration {
        let now = Instant::now();

        if self.paused {
            self.delta = Duration::ZERO;
            return self.delta;
        }

        self.delta = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.delta
    }

    /// Unpaused time since start.
    pub fn elapsed(&self) -> Duration {
        let end = if self.paused { self.last_frame } else { Instant::now() };
        end.duration_since(self.start).saturating_sub(self.pause_elapsed)
    }

    /// Time since last frame.
    #[inline]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Whether time is currently paused.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause time progression.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume time progression after pausing.
    pub fn resume(&mut self) {
        if self.paused {
            let now = Instant::now();
            self.pause_elapsed += now.duration_since(self.last_frame);
            self.last_frame = now;
            self.paused = false;
        }
    }

    /// Toggle pause state.
    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-interval event source driven by elapsed time.
#[derive(Debug, Clone)]
pub struct SpawnClock {
    interval: Duration,
    max_per_advance: u32,
    accumulated: Duration,
}

impl SpawnClock {
    /// Fire once every `interval`, at most `max_per_advance` times per call.
    pub fn new(interval: Duration, max_per_advance: u32) -> Self {
        Self {
            interval: interval.max(Duration::from_micros(1)),
            max_per_advance: max_per_advance.max(1),
            accumulated: Duration::ZERO,
        }
    }

    /// Add `delta` and return how many events are due.
    ///
    /// Events beyond the per-call cap are dropped rather than queued, so a
    /// long stall does not produce a burst afterwards.
    pub fn advance(&mut self, delta: Duration) -> u32 {
        self.accumulated += delta;
        let due = self.accumulated.as_nanos() / self.interval.as_nanos();
        if due == 0 {
            return 0;
        }
        let consumed = self.interval.as_nanos() * due;
        self.accumulated = Duration::from_nanos((self.accumulated.as_nanos() - consumed) as u64);
        due.min(self.max_per_advance as u128) as u32
    }

    /// Forget any partially accumulated interval.
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert!(!time.is_paused());
    }

    #[test]
    fn test_time_update() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(10));
        let delta = time.update();

        assert!(time.elapsed() >= delta);
        assert!(delta > Duration::ZERO);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_time_pause() {
        let mut time = Time::new();
        time.update();

        time.pause();
        assert!(time.is_paused());

        let elapsed_before = time.elapsed();
        thread::sleep(Duration::from_millis(10));
        time.update();

        assert_eq!(time.elapsed(), elapsed_before);
        assert_eq!(time.delta(), Duration::ZERO);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_spawn_clock_accumulates() {
        let mut clock = SpawnClock::new(Duration::from_millis(10), 100);
        assert_eq!(clock.advance(Duration::from_millis(4)), 0);
        assert_eq!(clock.advance(Duration::from_millis(4)), 0);
        assert_eq!(clock.advance(Duration::from_millis(4)), 1);
        // 2ms carried over
        assert_eq!(clock.advance(Duration::from_millis(28)), 3);
    }

    #[test]
    fn test_spawn_clock_caps_bursts() {
        let mut clock = SpawnClock::new(Duration::from_millis(10), 16);
        assert_eq!(clock.advance(Duration::from_secs(5)), 16);
        assert_eq!(clock.advance(Duration::ZERO), 0);
    }

    #[test]
    fn test_spawn_clock_reset() {
        let mut clock = SpawnClock::new(Duration::from_millis(10), 16);
        clock.advance(Duration::from_millis(9));
        clock.reset();
        assert_eq!(clock.advance(Duration::from_millis(2)), 0);
    }
}
