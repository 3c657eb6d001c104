use std::{cell::Cell, rc::Rc};

use super::*;

#[derive(Clone)]
struct Switchable(Rc<Cell<HourCycle>>);

impl LocaleSource for Switchable {
    fn hour_cycle(&self) -> HourCycle {
        self.0.get()
    }
}

fn switchable(initial: HourCycle) -> (Rc<Cell<HourCycle>>, LocaleObserver) {
    let cell = Rc::new(Cell::new(initial));
    let observer = LocaleObserver::new(Box::new(Switchable(cell.clone())));
    (cell, observer)
}

#[test]
fn locale_names_map_to_hour_cycles() {
    assert_eq!(hour_cycle_for_locale("en_US.UTF-8"), HourCycle::TwelveHour);
    assert_eq!(hour_cycle_for_locale("en-AU"), HourCycle::TwelveHour);
    assert_eq!(hour_cycle_for_locale("en"), HourCycle::TwelveHour);
    assert_eq!(hour_cycle_for_locale("ko_KR.UTF-8"), HourCycle::TwelveHour);
    assert_eq!(hour_cycle_for_locale("es_MX"), HourCycle::TwelveHour);
    assert_eq!(hour_cycle_for_locale("en_GB.UTF-8"), HourCycle::TwentyFourHour);
    assert_eq!(hour_cycle_for_locale("de_DE@euro"), HourCycle::TwentyFourHour);
    assert_eq!(hour_cycle_for_locale("fr_CA"), HourCycle::TwentyFourHour);
    assert_eq!(hour_cycle_for_locale("C"), HourCycle::TwentyFourHour);
    assert_eq!(hour_cycle_for_locale("POSIX"), HourCycle::TwentyFourHour);
    assert_eq!(hour_cycle_for_locale(""), HourCycle::TwentyFourHour);
}

#[test]
fn preference_parses_and_builds_sources() {
    assert_eq!("auto".parse::<HourCyclePreference>().unwrap(), HourCyclePreference::Auto);
    assert_eq!("12".parse::<HourCyclePreference>().unwrap(), HourCyclePreference::H12);
    assert_eq!("H23".parse::<HourCyclePreference>().unwrap(), HourCyclePreference::H24);
    assert!("sometimes".parse::<HourCyclePreference>().is_err());

    assert_eq!(
        HourCyclePreference::H12.into_source().hour_cycle(),
        HourCycle::TwelveHour
    );
    assert_eq!(
        HourCyclePreference::H24.into_source().hour_cycle(),
        HourCycle::TwentyFourHour
    );
}

#[test]
fn observer_reads_initial_preference_once() {
    let (_, observer) = switchable(HourCycle::TwelveHour);
    assert!(!observer.prefers_24_hour());
    assert_eq!(observer.hour_cycle(), HourCycle::TwelveHour);
}

#[test]
fn refresh_notifies_only_on_change() {
    let (cell, mut observer) = switchable(HourCycle::TwelveHour);
    let seen = Rc::new(Cell::new(0u32));
    let seen_cb = seen.clone();
    let _sub = observer.subscribe(move |_| seen_cb.set(seen_cb.get() + 1));

    assert!(!observer.refresh());
    assert_eq!(seen.get(), 0);

    cell.set(HourCycle::TwentyFourHour);
    assert!(observer.refresh());
    assert!(observer.prefers_24_hour());
    assert_eq!(seen.get(), 1);

    assert!(!observer.refresh());
    assert_eq!(seen.get(), 1);
}

#[test]
fn dropped_subscription_stops_receiving() {
    let (cell, mut observer) = switchable(HourCycle::TwelveHour);
    let seen = Rc::new(Cell::new(None));
    let seen_cb = seen.clone();
    let sub = observer.subscribe(move |c| seen_cb.set(Some(c)));
    assert_eq!(observer.subscriber_count(), 1);

    drop(sub);
    assert_eq!(observer.subscriber_count(), 0);

    cell.set(HourCycle::TwentyFourHour);
    assert!(observer.refresh());
    assert_eq!(seen.get(), None);
}

#[test]
fn cancel_unsubscribes_explicitly() {
    let (cell, mut observer) = switchable(HourCycle::TwentyFourHour);
    let seen = Rc::new(Cell::new(false));
    let seen_cb = seen.clone();
    let sub = observer.subscribe(move |_| seen_cb.set(true));
    sub.cancel();

    cell.set(HourCycle::TwelveHour);
    observer.refresh();
    assert!(!seen.get());
}
