//! Per-search debug logging and step timings.
//!
//! A [`SearchLogger`] travels with the search settings instead of living in
//! global state. Debug messages and step timings are only produced when the
//! logger was created in debug mode.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Accumulated wall-clock time per named step.
#[derive(Debug, Default)]
pub struct Metrics {
    timings: Mutex<BTreeMap<&'static str, Duration>>,
}

impl Metrics {
    /// Adds `elapsed` to the total for `step`.
    pub fn record(&self, step: &'static str, elapsed: Duration) {
        let mut timings = self.timings.lock().unwrap_or_else(PoisonError::into_inner);
        let total = timings.entry(step).or_default();
        *total = total.saturating_add(elapsed);
    }

    /// Returns the accumulated total for `step`.
    #[must_use]
    pub fn total(&self, step: &str) -> Option<Duration> {
        self.timings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(step)
            .copied()
    }

    /// Returns a copy of every total.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<&'static str, Duration> {
        self.timings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Debug logger handed to every search stage.
#[derive(Debug, Default)]
pub struct SearchLogger {
    debug: bool,
    metrics: Metrics,
}

impl SearchLogger {
    /// Creates a logger; `debug` enables step and comparison messages.
    #[must_use]
    pub fn new(debug: bool) -> Self {
        Self {
            debug,
            metrics: Metrics::default(),
        }
    }

    /// Returns whether debug messages are emitted.
    #[must_use]
    pub const fn is_debug(&self) -> bool {
        self.debug
    }

    /// Emits a debug message.
    pub fn log(&self, message: fmt::Arguments<'_>) {
        if self.debug {
            tracing::debug!(target: "sift::search", "{message}");
        }
    }

    /// Marks the start of a step.
    pub fn step_start(&self, step: &str) {
        if self.debug {
            tracing::debug!(target: "sift::search", step, "start");
        }
    }

    /// Marks the end of a step.
    pub fn step_end(&self, step: &str) {
        if self.debug {
            tracing::debug!(target: "sift::search", step, "end");
        }
    }

    /// Starts timing `step`; the time is recorded when the guard drops.
    ///
    /// Outside debug mode the guard is inert.
    #[must_use]
    pub fn measure(&self, step: &'static str) -> Measure<'_> {
        Measure {
            metrics: &self.metrics,
            step,
            started: self.debug.then(Instant::now),
        }
    }

    /// Returns the collected timings.
    #[must_use]
    pub const fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Emits every collected timing as a debug event.
    pub fn log_metrics(&self) {
        for (step, total) in self.metrics.snapshot() {
            tracing::debug!(
                target: "sift::metrics",
                step,
                elapsed_us = u64::try_from(total.as_micros()).unwrap_or(u64::MAX),
                "step timing"
            );
        }
    }
}

/// Timing guard returned by [`SearchLogger::measure`].
#[derive(Debug)]
pub struct Measure<'l> {
    metrics: &'l Metrics,
    step: &'static str,
    started: Option<Instant>,
}

impl Drop for Measure<'_> {
    fn drop(&mut self) {
        if let Some(started) = self.started {
            self.metrics.record(self.step, started.elapsed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_records_on_drop() {
        let logger = SearchLogger::new(true);
        {
            let _guard = logger.measure("parse");
        }
        assert!(logger.metrics().total("parse").is_some());
        assert!(logger.metrics().total("match").is_none());
    }

    #[test]
    fn measure_is_inert_outside_debug_mode() {
        let logger = SearchLogger::new(false);
        {
            let _guard = logger.measure("compare");
        }
        assert!(logger.metrics().snapshot().is_empty());
    }

    #[test]
    fn record_accumulates() {
        let metrics = Metrics::default();
        metrics.record("search", Duration::from_millis(2));
        metrics.record("search", Duration::from_millis(3));
        assert_eq!(metrics.total("search"), Some(Duration::from_millis(5)));
    }
}
