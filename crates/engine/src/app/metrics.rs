use std::time::{Duration, Instant};

/// Pacing summary for one reporting window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub avg_frame_ms: f32,
    pub worst_frame_ms: f32,
    /// Frames whose tick backlog exceeded the per-frame cap and was dropped.
    pub clamped_frames: u32,
}

#[derive(Debug)]
pub(crate) struct LoopMetrics {
    window_start: Instant,
    window: Duration,
    frames: u32,
    ticks: u32,
    clamped_frames: u32,
    total_frame_time: Duration,
    worst_frame_time: Duration,
}

impl LoopMetrics {
    pub(crate) fn new(window: Duration, now: Instant) -> Self {
        Self {
            window_start: now,
            window,
            frames: 0,
            ticks: 0,
            clamped_frames: 0,
            total_frame_time: Duration::ZERO,
            worst_frame_time: Duration::ZERO,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_time: Duration, clamped: bool) {
        self.frames = self.frames.saturating_add(1);
        self.total_frame_time = self.total_frame_time.saturating_add(frame_time);
        self.worst_frame_time = self.worst_frame_time.max(frame_time);
        if clamped {
            self.clamped_frames = self.clamped_frames.saturating_add(1);
        }
    }

    pub(crate) fn record_ticks(&mut self, count: u32) {
        self.ticks = self.ticks.saturating_add(count);
    }

    /// Closes the window once it has elapsed and starts a fresh one.
    pub(crate) fn take_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }
        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let avg_frame_ms = match self.frames {
            0 => 0.0,
            frames => self.total_frame_time.as_secs_f32() * 1000.0 / frames as f32,
        };
        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / seconds,
            tps: self.ticks as f32 / seconds,
            avg_frame_ms,
            worst_frame_ms: self.worst_frame_time.as_secs_f32() * 1000.0,
            clamped_frames: self.clamped_frames,
        };
        *self = Self::new(self.window, now);
        Some(snapshot)
    }
}
