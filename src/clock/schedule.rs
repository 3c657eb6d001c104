use std::ops::ControlFlow;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, TimeDelta, Timelike};

use crate::{clock::digits::ClockReading, foundation::error::NixieResult};

/// Snapshots a widget timeline provides per refresh.
pub const WIDGET_TIMELINE_ENTRIES: usize = 15;

/// Wall-clock time provider.
pub trait TimeSource {
    fn now(&self) -> NaiveDateTime;
}

/// Local system time via `chrono::Local`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant; used for previews.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDateTime);

impl TimeSource for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Blocks the calling thread between ticks.
pub trait Sleeper {
    fn sleep(&mut self, d: Duration);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, d: Duration) {
        std::thread::sleep(d);
    }
}

/// Truncate to second 0 of the containing minute.
pub fn minute_start(t: NaiveDateTime) -> NaiveDateTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

/// Time remaining until the next minute boundary (never zero; at an exact boundary the
/// result is a full minute).
pub fn until_next_minute(now: NaiveDateTime) -> Duration {
    let next = minute_start(now) + TimeDelta::minutes(1);
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

/// One redraw request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    /// Instant the snapshot represents (minute-aligned for live ticks).
    pub at: NaiveDateTime,
    pub reading: ClockReading,
}

impl Tick {
    fn at_minute_of(now: NaiveDateTime) -> Self {
        let at = minute_start(now);
        Self {
            at,
            reading: ClockReading::from_time(&at),
        }
    }
}

/// Emits one [`Tick`] per wall-clock minute, aligned to second 0.
///
/// The wait is recomputed from the clock before every sleep, so a late or early wake-up
/// never accumulates drift. Any change of minute counts as the next tick, including a
/// wall clock that was set back.
pub struct MinuteTicker<C, S> {
    clock: C,
    sleeper: S,
}

impl<C: TimeSource, S: Sleeper> MinuteTicker<C, S> {
    pub fn new(clock: C, sleeper: S) -> Self {
        Self { clock, sleeper }
    }

    /// Deliver ticks to `on_tick` until it breaks or `max_ticks` have been delivered.
    ///
    /// The first tick fires immediately for the current minute. Returns the number of ticks
    /// delivered.
    pub fn run(
        &mut self,
        max_ticks: Option<u64>,
        mut on_tick: impl FnMut(Tick) -> NixieResult<ControlFlow<()>>,
    ) -> NixieResult<u64> {
        let mut delivered = 0u64;
        let mut current = Tick::at_minute_of(self.clock.now());

        loop {
            if max_ticks.is_some_and(|max| delivered >= max) {
                break;
            }
            tracing::debug!(at = %current.at, reading = %current.reading, "minute tick");
            delivered += 1;
            if on_tick(current)?.is_break() {
                break;
            }
            if max_ticks.is_some_and(|max| delivered >= max) {
                break;
            }
            current = self.wait_for_next_minute(current.at);
        }

        Ok(delivered)
    }

    fn wait_for_next_minute(&mut self, last: NaiveDateTime) -> Tick {
        loop {
            let now = self.clock.now();
            if minute_start(now) != last {
                return Tick::at_minute_of(now);
            }
            self.sleeper.sleep(until_next_minute(now));
        }
    }
}

/// A widget-style timeline: `count` snapshots one minute apart starting at `start`.
pub fn timeline(start: NaiveDateTime, count: usize) -> Vec<Tick> {
    (0..count)
        .map(|offset| {
            let at = start + TimeDelta::minutes(offset as i64);
            Tick {
                at,
                reading: ClockReading::from_time(&at),
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/clock/schedule.rs"]
mod tests;
