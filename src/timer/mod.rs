//! Timer module - per-exercise stopwatch and rest countdown
//!
//! Timers are session state only. They are never persisted and are driven
//! by a single external tick, once per second.

use std::collections::HashMap;

/// Count-up stopwatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElapsedTimer {
    elapsed: u32,
    running: bool,
}

impl ElapsedTimer {
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start when stopped, pause when running
    pub fn toggle(&mut self) {
        self.running = !self.running;
    }

    /// Back to zero; running state is kept
    pub fn reset(&mut self) {
        self.elapsed = 0;
    }

    pub fn tick(&mut self) {
        if self.running {
            self.elapsed = self.elapsed.saturating_add(1);
        }
    }
}

/// Rest countdown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestTimer {
    remaining: u32,
    resting: bool,
}

impl RestTimer {
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_resting(&self) -> bool {
        self.resting
    }

    /// Begin counting down from `rest_time` seconds.
    ///
    /// A zero rest time has nothing to count, so the timer stays idle.
    pub fn start(&mut self, rest_time: u32) {
        self.remaining = rest_time;
        self.resting = rest_time > 0;
    }

    pub fn stop(&mut self) {
        self.resting = false;
    }

    /// The play/pause button: stop when resting, otherwise start afresh
    pub fn toggle(&mut self, rest_time: u32) {
        if self.resting {
            self.stop();
        } else {
            self.start(rest_time);
        }
    }

    pub fn tick(&mut self) {
        if !self.resting {
            return;
        }
        if self.remaining <= 1 {
            self.remaining = 0;
            self.resting = false;
        } else {
            self.remaining -= 1;
        }
    }
}

/// Both timers of one exercise row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowTimers {
    pub elapsed: ElapsedTimer,
    pub rest: RestTimer,
}

impl RowTimers {
    pub fn tick(&mut self) {
        self.elapsed.tick();
        self.rest.tick();
    }

    fn is_idle(&self) -> bool {
        self == &RowTimers::default()
    }
}

/// Timers for every exercise row, keyed by exercise id
#[derive(Debug, Default)]
pub struct TimerBoard {
    rows: HashMap<String, RowTimers>,
}

impl TimerBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, exercise_id: &str) -> RowTimers {
        self.rows.get(exercise_id).cloned().unwrap_or_default()
    }

    pub fn row(&mut self, exercise_id: &str) -> &mut RowTimers {
        self.rows.entry(exercise_id.to_string()).or_default()
    }

    /// One second passed
    pub fn tick(&mut self) {
        for timers in self.rows.values_mut() {
            timers.tick();
        }
    }

    /// Drop rows whose exercise no longer exists or that hold nothing
    pub fn retain(&mut self, mut exists: impl FnMut(&str) -> bool) {
        self.rows.retain(|id, t| exists(id.as_str()) && !t.is_idle());
    }
}

/// `m:ss`, as shown next to the timers
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
