use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
}

/// Counts frames and simulation ticks over a fixed reporting interval.
#[derive(Debug)]
pub(crate) struct LoopRateMeter {
    window_start: Instant,
    interval: Duration,
    frames: u32,
    ticks: u32,
    frame_time_total: Duration,
}

impl LoopRateMeter {
    pub(crate) fn new(interval: Duration, now: Instant) -> Self {
        Self {
            window_start: now,
            interval,
            frames: 0,
            ticks: 0,
            frame_time_total: Duration::ZERO,
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_total = self.frame_time_total.saturating_add(frame_dt);
    }

    pub(crate) fn record_ticks(&mut self, ticks: u32) {
        self.ticks = self.ticks.saturating_add(ticks);
    }

    /// Emits rates once per interval and starts a new window.
    pub(crate) fn poll(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.interval {
            return None;
        }

        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = match self.frames {
            0 => 0.0,
            frames => self.frame_time_total.as_secs_f32() * 1000.0 / frames as f32,
        };
        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / seconds,
            tps: self.ticks as f32 / seconds,
            frame_time_ms,
        };

        *self = Self::new(self.interval, now);
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_reports_rates_after_interval() {
        let base = Instant::now();
        let mut meter = LoopRateMeter::new(Duration::from_secs(1), base);
        meter.record_frame(Duration::from_millis(16));
        meter.record_frame(Duration::from_millis(18));
        meter.record_ticks(3);
        meter.record_ticks(1);

        let snapshot = meter
            .poll(base + Duration::from_secs(1))
            .expect("snapshot after interval");
        assert!((snapshot.fps - 2.0).abs() < 0.05);
        assert!((snapshot.tps - 4.0).abs() < 0.05);
        assert!((snapshot.frame_time_ms - 17.0).abs() < 0.001);
    }

    #[test]
    fn poll_is_silent_before_interval() {
        let base = Instant::now();
        let mut meter = LoopRateMeter::new(Duration::from_secs(1), base);
        meter.record_frame(Duration::from_millis(16));
        assert!(meter.poll(base + Duration::from_millis(500)).is_none());
    }

    #[test]
    fn poll_resets_counters_for_next_window() {
        let base = Instant::now();
        let mut meter = LoopRateMeter::new(Duration::from_secs(1), base);
        meter.record_ticks(60);
        let first = base + Duration::from_secs(1);
        meter.poll(first).expect("first window");

        let second = meter
            .poll(first + Duration::from_secs(1))
            .expect("second window");
        assert_eq!(second.tps, 0.0);
        assert_eq!(second.frame_time_ms, 0.0);
    }
}
