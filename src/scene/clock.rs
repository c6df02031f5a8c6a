use std::time::{Duration, Instant};

/// Timing of a single frame.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,
    pub now: Instant,
    pub frame_index: u64,
}

/// Produces clamped per-frame delta times and a running FPS average.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
    report_started: Instant,
    report_frames: u32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            last: start,
            frame_index: 0,
            dt_min: Duration::from_micros(100),
            dt_max: Duration::from_millis(250),
            report_started: start,
            report_frames: 0,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;
        self.report_frames += 1;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }

    /// Returns the average FPS once `interval` has passed since the last report.
    pub fn fps_report(&mut self, now: Instant, interval: Duration) -> Option<f32> {
        let elapsed = now.saturating_duration_since(self.report_started);
        if elapsed < interval || self.report_frames == 0 {
            return None;
        }
        let fps = self.report_frames as f32 / elapsed.as_secs_f32();
        self.report_started = now;
        self.report_frames = 0;
        Some(fps)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_time_is_clamped() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);

        let ft = clock.tick_at(start);
        assert_eq!(ft.dt, Duration::from_micros(100).as_secs_f32());
        assert_eq!(ft.frame_index, 0);

        let ft = clock.tick_at(start + Duration::from_secs(5));
        assert_eq!(ft.dt, 0.25);
        assert_eq!(ft.frame_index, 1);

        let ft = clock.tick_at(start + Duration::from_secs(5) + Duration::from_millis(16));
        assert!((ft.dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn fps_is_reported_after_interval() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        for i in 1..=120 {
            clock.tick_at(start + Duration::from_millis(i * 16));
        }
        assert!(clock.fps_report(start + Duration::from_secs(1), Duration::from_secs(2)).is_none());

        let fps = clock
            .fps_report(start + Duration::from_secs(2), Duration::from_secs(2))
            .unwrap();
        assert!((fps - 60.0).abs() < 1e-3);
        assert!(clock.fps_report(start + Duration::from_secs(3), Duration::from_secs(2)).is_none());
    }
}
