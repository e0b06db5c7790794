use std::time::{Duration, Instant};

const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Smoothed frame rate, reported at most once per second.
pub struct FrameStats {
    last_frame: Instant,
    last_report: Instant,
    smoothed_fps: f32,
    smoothing: f32,
}

impl FrameStats {
    pub fn new(now: Instant) -> Self {
        Self {
            last_frame: now,
            last_report: now,
            smoothed_fps: 60.0,
            smoothing: 0.05,
        }
    }

    #[cfg(test)]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }

    /// Record a finished frame. Returns the smoothed rate when a report is due.
    pub fn end_frame(&mut self, now: Instant) -> Option<f32> {
        let frame_time = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        if frame_time > 0.0 {
            self.smoothed_fps =
                self.smoothed_fps * (1.0 - self.smoothing) + self.smoothing / frame_time;
        }
        if now.duration_since(self.last_report) >= REPORT_INTERVAL {
            self.last_report = now;
            Some(self.smoothed_fps)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_to_frame_rate() {
        let start = Instant::now();
        let mut stats = FrameStats::new(start);
        let frame = Duration::from_millis(20);
        for i in 1..=400 {
            stats.end_frame(start + frame * i);
        }
        assert!((stats.fps() - 50.0).abs() < 0.5);
    }

    #[test]
    fn reports_once_per_second() {
        let start = Instant::now();
        let mut stats = FrameStats::new(start);
        let reports = (1..=120)
            .filter_map(|i| stats.end_frame(start + Duration::from_millis(25) * i))
            .count();
        assert_eq!(reports, 3);
    }
}
