use parking_lot::Mutex;
use serde::Serialize;
use std::time::{Duration, Instant};

/// A value together with how long it took to produce.
#[derive(Debug)]
pub struct Timed<T> {
    pub step: &'static str,
    pub value: T,
    pub elapsed: Duration,
    pub over_threshold: bool,
}

/// Runs `f`, measuring wall-clock time. Exceeding `threshold` only logs a
/// warning; the value is always returned.
pub fn timed<T, F>(step: &'static str, threshold: Duration, f: F) -> Timed<T>
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let value = f();
    let elapsed = start.elapsed();

    let over_threshold = elapsed > threshold;
    if over_threshold {
        tracing::warn!(
            step,
            elapsed = ?elapsed,
            "{} exceeded the threshold of {:.2} seconds",
            step,
            threshold.as_secs_f64()
        );
    } else {
        tracing::debug!(step, elapsed = ?elapsed, "step finished");
    }

    Timed {
        step,
        value,
        elapsed,
        over_threshold,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepTiming {
    pub step: &'static str,
    pub seconds: f64,
    pub over_threshold: bool,
}

/// Per-refresh record of timed steps, owned by whoever runs the pipeline.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimingLedger {
    steps: Vec<StepTiming>,
    #[serde(skip)]
    total: Duration,
}

impl TimingLedger {
    /// Records the measurement and hands back the measured value.
    pub fn record<T>(&mut self, timed: Timed<T>) -> T {
        self.total += timed.elapsed;
        self.steps.push(StepTiming {
            step: timed.step,
            seconds: timed.elapsed.as_secs_f64(),
            over_threshold: timed.over_threshold,
        });
        timed.value
    }

    pub fn steps(&self) -> &[StepTiming] {
        &self.steps
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn warnings(&self) -> impl Iterator<Item = &StepTiming> {
        self.steps.iter().filter(|s| s.over_threshold)
    }
}

/// Running total across refreshes for the life of the process.
#[derive(Debug, Default)]
pub struct SessionClock {
    total: Mutex<Duration>,
}

impl SessionClock {
    /// Adds `elapsed` and returns the new total.
    pub fn add(&self, elapsed: Duration) -> Duration {
        let mut total = self.total.lock();
        *total += elapsed;
        *total
    }

    pub fn total(&self) -> Duration {
        *self.total.lock()
    }
}
