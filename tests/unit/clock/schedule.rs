use std::{cell::Cell, rc::Rc};

use chrono::NaiveDate;

use super::*;

fn at(h: u32, m: u32, s: u32, ms: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 7, 3)
        .unwrap()
        .and_hms_milli_opt(h, m, s, ms)
        .unwrap()
}

/// Simulated wall clock whose sleeps advance time.
#[derive(Clone)]
struct SimClock {
    now: Rc<Cell<NaiveDateTime>>,
    sleeps: Rc<Cell<u32>>,
    /// Extra time added to every sleep (late wake-up).
    lag: Duration,
}

impl TimeSource for SimClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

impl Sleeper for SimClock {
    fn sleep(&mut self, d: Duration) {
        self.sleeps.set(self.sleeps.get() + 1);
        let step = TimeDelta::from_std(d + self.lag).unwrap();
        self.now.set(self.now.get() + step);
    }
}

fn sim(start: NaiveDateTime, lag: Duration) -> SimClock {
    SimClock {
        now: Rc::new(Cell::new(start)),
        sleeps: Rc::new(Cell::new(0)),
        lag,
    }
}

#[test]
fn minute_start_truncates_seconds_and_nanos() {
    assert_eq!(minute_start(at(9, 41, 27, 350)), at(9, 41, 0, 0));
    assert_eq!(minute_start(at(9, 41, 0, 0)), at(9, 41, 0, 0));
}

#[test]
fn wait_targets_the_next_boundary() {
    assert_eq!(
        until_next_minute(at(9, 41, 27, 500)),
        Duration::from_millis(32_500)
    );
    assert_eq!(until_next_minute(at(9, 41, 0, 0)), Duration::from_secs(60));
    assert_eq!(
        until_next_minute(at(23, 59, 59, 999)),
        Duration::from_millis(1)
    );
}

#[test]
fn ticks_land_on_consecutive_minute_starts() {
    let clock = sim(at(10, 58, 42, 0), Duration::ZERO);
    let mut ticker = MinuteTicker::new(clock.clone(), clock.clone());

    let mut seen = Vec::new();
    let n = ticker
        .run(Some(3), |tick| {
            seen.push(tick);
            Ok(ControlFlow::Continue(()))
        })
        .unwrap();

    assert_eq!(n, 3);
    let ats: Vec<NaiveDateTime> = seen.iter().map(|t| t.at).collect();
    assert_eq!(ats, vec![at(10, 58, 0, 0), at(10, 59, 0, 0), at(11, 0, 0, 0)]);
    assert_eq!(seen[2].reading, ClockReading::new(11, 0).unwrap());
    assert_eq!(clock.now.get(), at(11, 0, 0, 0));
}

#[test]
fn late_wakeups_do_not_accumulate_drift() {
    let clock = sim(at(8, 0, 30, 0), Duration::from_millis(700));
    let mut ticker = MinuteTicker::new(clock.clone(), clock.clone());

    let mut ats = Vec::new();
    ticker
        .run(Some(4), |tick| {
            ats.push(tick.at);
            Ok(ControlFlow::Continue(()))
        })
        .unwrap();

    assert_eq!(
        ats,
        vec![
            at(8, 0, 0, 0),
            at(8, 1, 0, 0),
            at(8, 2, 0, 0),
            at(8, 3, 0, 0)
        ]
    );
    assert_eq!(clock.now.get(), at(8, 3, 0, 700));
}

#[test]
fn clock_set_back_redraws_without_waiting_for_the_old_minute() {
    let clock = sim(at(1, 59, 30, 0), Duration::ZERO);
    let mut ticker = MinuteTicker::new(clock.clone(), clock.clone());

    let mut ats = Vec::new();
    ticker
        .run(Some(3), |tick| {
            ats.push(tick.at);
            if ats.len() == 1 {
                // DST fall-back: local time repeats the previous hour.
                clock.now.set(clock.now.get() - TimeDelta::hours(1));
            }
            Ok(ControlFlow::Continue(()))
        })
        .unwrap();

    assert_eq!(ats, vec![at(1, 59, 0, 0), at(0, 59, 0, 0), at(1, 0, 0, 0)]);
    assert_eq!(clock.sleeps.get(), 1);
}

#[test]
fn callback_break_stops_the_loop() {
    let clock = sim(at(12, 0, 0, 0), Duration::ZERO);
    let mut ticker = MinuteTicker::new(clock.clone(), clock.clone());
    let n = ticker
        .run(None, |tick| {
            Ok(if tick.reading.minute() == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            })
        })
        .unwrap();
    assert_eq!(n, 3);
    assert_eq!(clock.sleeps.get(), 2);
}

#[test]
fn callback_errors_propagate() {
    let clock = sim(at(12, 0, 0, 0), Duration::ZERO);
    let mut ticker = MinuteTicker::new(clock.clone(), clock);
    let err = ticker
        .run(None, |_| Err(crate::NixieError::render("surface lost")))
        .unwrap_err();
    assert!(err.to_string().contains("surface lost"));
}

#[test]
fn zero_tick_limit_delivers_nothing() {
    let clock = sim(at(12, 0, 0, 0), Duration::ZERO);
    let mut ticker = MinuteTicker::new(clock.clone(), clock.clone());
    let n = ticker
        .run(Some(0), |_| Ok(ControlFlow::Continue(())))
        .unwrap();
    assert_eq!(n, 0);
    assert_eq!(clock.sleeps.get(), 0);
}

#[test]
fn timeline_spans_fifteen_minutes_across_midnight() {
    let entries = timeline(at(23, 50, 12, 0), WIDGET_TIMELINE_ENTRIES);
    assert_eq!(entries.len(), 15);
    assert_eq!(entries[0].reading, ClockReading::new(23, 50).unwrap());
    assert_eq!(entries[9].reading, ClockReading::new(23, 59).unwrap());
    assert_eq!(entries[10].reading, ClockReading::new(0, 0).unwrap());
    assert_eq!(entries[14].reading, ClockReading::new(0, 4).unwrap());
}

#[test]
fn fixed_clock_is_constant() {
    let c = FixedClock(at(6, 30, 0, 0));
    assert_eq!(c.now(), c.now());
}
