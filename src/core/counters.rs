//! Stats counters (`data-count` elements) that count up once the stats
//! section scrolls into view.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Fraction of the stats section that must be on screen to start counters.
pub const COUNTER_THRESHOLD: f64 = 0.5;
pub const COUNTER_FRAME: Duration = Duration::from_millis(16);

/// Values shown by a stats counter, one per 16 ms frame. The running value
/// grows by `target / (duration / 16ms)` and is shown floored; the last frame
/// is exactly the target.
#[derive(Debug, Clone)]
pub struct CounterFrames {
    target: u64,
    increment: f64,
    current: f64,
    done: bool,
}

impl CounterFrames {
    pub fn new(target: u64, duration: Duration) -> Self {
        let frames = duration.as_millis() as f64 / COUNTER_FRAME.as_millis() as f64;
        let mut increment = target as f64 / frames;
        if !increment.is_finite() || increment <= 0.0 {
            increment = target.max(1) as f64;
        }
        Self {
            target,
            increment,
            current: 0.0,
            done: false,
        }
    }
}

impl Iterator for CounterFrames {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.done {
            return None;
        }
        self.current += self.increment;
        if self.current >= self.target as f64 {
            self.done = true;
            Some(self.target)
        } else {
            Some(self.current.floor() as u64)
        }
    }
}

/// One counter. Animates once; later triggers are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct StatCounter {
    pub label: String,
    pub target: u64,
    pub value: u64,
    started: bool,
}

impl StatCounter {
    pub fn new(label: impl Into<String>, target: u64) -> Self {
        Self {
            label: label.into(),
            target,
            value: 0,
            started: false,
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Marks the counter as started and hands out its frames. `None` if it
    /// already ran.
    pub fn begin(&mut self, duration: Duration) -> Option<CounterFrames> {
        if self.started {
            return None;
        }
        self.started = true;
        Some(CounterFrames::new(self.target, duration))
    }
}

/// The page's counters, shared with the ticker task that animates them.
#[derive(Debug, Clone, Default)]
pub struct Counters {
    inner: Arc<Mutex<Vec<StatCounter>>>,
}

impl Counters {
    pub fn new(counters: Vec<StatCounter>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(counters)),
        }
    }

    pub fn snapshot(&self) -> Vec<StatCounter> {
        self.lock().clone()
    }

    pub fn value(&self, label: &str) -> Option<u64> {
        self.lock()
            .iter()
            .find(|counter| counter.label == label)
            .map(|counter| counter.value)
    }

    /// Starts every counter that has not run yet and returns right away; a
    /// background ticker drives the frames. Without a runtime the counters
    /// jump to their targets. Returns how many counters were started.
    pub fn start(&self, duration: Duration) -> usize {
        let running: Vec<(usize, CounterFrames)> = self
            .lock()
            .iter_mut()
            .enumerate()
            .filter_map(|(index, counter)| counter.begin(duration).map(|frames| (index, frames)))
            .collect();
        if running.is_empty() {
            return 0;
        }

        let started = running.len();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let counters = self.clone();
                handle.spawn(async move { counters.tick(running).await });
            }
            Err(_) => {
                tracing::debug!("No runtime, counters jump to their targets");
                let mut list = self.lock();
                for (index, _) in &running {
                    if let Some(counter) = list.get_mut(*index) {
                        counter.value = counter.target;
                    }
                }
            }
        }
        started
    }

    async fn tick(&self, mut running: Vec<(usize, CounterFrames)>) {
        let mut ticker = tokio::time::interval(COUNTER_FRAME);
        // first tick of an interval completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let mut advanced = false;
            {
                let mut list = self.lock();
                for (index, frames) in running.iter_mut() {
                    if let Some(value) = frames.next() {
                        if let Some(counter) = list.get_mut(*index) {
                            counter.value = value;
                        }
                        advanced = true;
                    }
                }
            }
            if !advanced {
                break;
            }
        }
        for counter in self.lock().iter() {
            tracing::debug!("🔢 Counter '{}' reached {}", counter.label, counter.value);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StatCounter>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
