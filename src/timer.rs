//! Elapsed-time display
//!
//! The timer does not own an interval of its own: the quiz schedules a
//! `TimerTick` alarm every second and calls [`Timer::tick`] when it fires.

use std::{fmt, time::Duration};

use web_time::Instant;

/// Wall-clock stopwatch that reports `m:ss` on every tick
#[derive(Default)]
pub struct Timer {
    start: Option<Instant>,
    on_tick: Option<Box<dyn FnMut(&str)>>,
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("start", &self.start)
            .finish_non_exhaustive()
    }
}

impl Timer {
    /// Creates a stopped timer
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts timing from now and registers the tick callback
    ///
    /// Starting an already running timer restarts it from zero.
    pub fn start<F: FnMut(&str) + 'static>(&mut self, on_tick: F) {
        self.start_at(Instant::now(), on_tick);
    }

    /// Starts timing from `start`
    pub fn start_at<F: FnMut(&str) + 'static>(&mut self, start: Instant, on_tick: F) {
        self.start = Some(start);
        self.on_tick = Some(Box::new(on_tick));
    }

    /// Computes the formatted elapsed time and hands it to the callback
    ///
    /// # Returns
    ///
    /// The formatted string, or `None` when the timer is stopped
    pub fn tick(&mut self) -> Option<String> {
        let start = self.start?;
        let formatted = format_elapsed(start.elapsed());
        if let Some(on_tick) = &mut self.on_tick {
            on_tick(&formatted);
        }
        Some(formatted)
    }

    /// Stops the timer and forgets the start time and callback
    pub fn stop(&mut self) {
        self.start = None;
        self.on_tick = None;
    }

    /// Whether the timer is running
    pub fn is_running(&self) -> bool {
        self.start.is_some()
    }

    /// Time since start, or zero when stopped
    pub fn elapsed(&self) -> Duration {
        self.start.map(|start| start.elapsed()).unwrap_or_default()
    }
}

/// Formats a duration as `m:ss`, truncating to whole seconds
pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::ZERO), "0:00");
        assert_eq!(format_elapsed(Duration::from_millis(9_999)), "0:09");
        assert_eq!(format_elapsed(Duration::from_secs(65)), "1:05");
        assert_eq!(format_elapsed(Duration::from_secs(600)), "10:00");
    }

    #[test]
    fn test_stopped_timer_does_not_tick() {
        let mut timer = Timer::new();
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.elapsed(), Duration::ZERO);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_tick_invokes_callback() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut timer = Timer::new();
        timer.start(move |text| sink.borrow_mut().push(text.to_string()));

        let formatted = timer.tick();
        assert_eq!(formatted.as_deref(), Some("0:00"));
        assert_eq!(seen.borrow().as_slice(), ["0:00".to_string()]);
    }

    #[test]
    fn test_start_at_past_instant() {
        let Some(start) = Instant::now().checked_sub(Duration::from_secs(125)) else {
            return;
        };
        let mut timer = Timer::new();
        timer.start_at(start, |_| {});

        assert_eq!(timer.tick().as_deref(), Some("2:05"));
        assert!(timer.elapsed() >= Duration::from_secs(125));
    }

    #[test]
    fn test_stop_requires_fresh_start() {
        let mut timer = Timer::new();
        timer.start(|_| {});
        timer.stop();

        assert!(!timer.is_running());
        assert_eq!(timer.tick(), None);

        timer.start(|_| {});
        assert!(timer.is_running());
    }
}
