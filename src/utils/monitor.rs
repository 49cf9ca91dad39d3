use std::time::{Duration, Instant};

/// Startup took longer than this and gets a warning.
pub const SLOW_LOAD_THRESHOLD: Duration = Duration::from_millis(3000);

/// Measures how long the site took to become interactive.
#[derive(Debug, Clone)]
pub struct LoadTimer {
    start_time: Instant,
    enabled: bool,
}

impl LoadTimer {
    pub fn new(enabled: bool) -> Self {
        Self {
            start_time: Instant::now(),
            enabled,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn is_slow(&self) -> bool {
        self.elapsed() > SLOW_LOAD_THRESHOLD
    }

    pub fn log_phase(&self, phase: &str) {
        if self.enabled {
            tracing::debug!("⏱️ {} - {:?} since start", phase, self.elapsed());
        }
    }

    pub fn log_final(&self) {
        if !self.enabled {
            return;
        }
        let elapsed = self.elapsed();
        tracing::info!("📊 Page load time: {}ms", elapsed.as_millis());
        if elapsed > SLOW_LOAD_THRESHOLD {
            tracing::warn!("🐢 Page load time is too high!");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for LoadTimer {
    fn default() -> Self {
        Self::new(true)
    }
}
