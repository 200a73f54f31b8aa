use std::time::{Duration, Instant};

/// Published panel stats: average inference latency and derived FPS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterReading {
    pub avg_ms: f64,
    pub fps: f64,
}

/// Windowed inference latency meter.
///
/// Samples are bracketed by `record_start` / `record_stop`. Stops fold the
/// elapsed time into the current window; once per `window` the averages are
/// published and the window resets. The very first completed sample publishes
/// immediately so the panel is never blank at startup.
pub struct InferenceMeter {
    window: Duration,
    sum_ms: f64,
    count: u32,
    started: Option<Instant>,
    last_publish: Option<Instant>,
}

impl InferenceMeter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            sum_ms: 0.0,
            count: 0,
            started: None,
            last_publish: None,
        }
    }

    pub fn record_start(&mut self) {
        self.start_at(Instant::now());
    }

    /// Folds the open sample into the window. Returns a reading when the
    /// publish interval has elapsed. A stop without a matching start is
    /// ignored.
    pub fn record_stop(&mut self) -> Option<MeterReading> {
        self.stop_at(Instant::now())
    }

    pub fn start_at(&mut self, now: Instant) {
        self.started = Some(now);
    }

    pub fn stop_at(&mut self, now: Instant) -> Option<MeterReading> {
        let started = self.started.take()?;
        self.sum_ms += now.saturating_duration_since(started).as_secs_f64() * 1000.0;
        self.count += 1;
        self.publish_at(now)
    }

    fn publish_at(&mut self, now: Instant) -> Option<MeterReading> {
        let due = match self.last_publish {
            None => true,
            Some(t) => now.saturating_duration_since(t) >= self.window,
        };
        if !due || self.count == 0 {
            return None;
        }

        let avg_ms = self.sum_ms / self.count as f64;
        let fps = if avg_ms > 0.0 { 1000.0 / avg_ms } else { 0.0 };

        self.sum_ms = 0.0;
        self.count = 0;
        self.last_publish = Some(now);

        Some(MeterReading { avg_ms, fps })
    }
}
