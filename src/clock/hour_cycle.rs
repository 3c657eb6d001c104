use std::{cell::Cell, rc::Rc};

use crate::foundation::error::{NixieError, NixieResult};

/// How the displayed hour counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HourCycle {
    /// 1-12 with an AM/PM tag.
    TwelveHour,
    /// 0-23.
    TwentyFourHour,
}

impl HourCycle {
    pub fn uses_24_hour(self) -> bool {
        self == HourCycle::TwentyFourHour
    }
}

/// Configured hour-cycle preference; `Auto` defers to the ambient locale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HourCyclePreference {
    #[default]
    Auto,
    H12,
    H24,
}

impl std::str::FromStr for HourCyclePreference {
    type Err = NixieError;

    fn from_str(s: &str) -> NixieResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "12" | "h12" => Ok(Self::H12),
            "24" | "h24" | "h23" => Ok(Self::H24),
            other => Err(NixieError::config(format!(
                "unknown hour cycle '{other}' (expected auto, h12 or h24)"
            ))),
        }
    }
}

/// Supplies the current hour-cycle preference.
pub trait LocaleSource {
    fn hour_cycle(&self) -> HourCycle;
}

/// Reads the POSIX locale environment (`LC_ALL`, then `LC_TIME`, then `LANG`).
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvLocale;

impl EnvLocale {
    pub fn locale_name(&self) -> Option<String> {
        ["LC_ALL", "LC_TIME", "LANG"]
            .into_iter()
            .filter_map(|key| std::env::var(key).ok())
            .find(|v| !v.trim().is_empty())
    }
}

impl LocaleSource for EnvLocale {
    fn hour_cycle(&self) -> HourCycle {
        self.locale_name()
            .map(|name| hour_cycle_for_locale(&name))
            .unwrap_or(HourCycle::TwentyFourHour)
    }
}

/// A locale source that never changes; used for explicit configuration and tests.
#[derive(Clone, Copy, Debug)]
pub struct FixedLocale(pub HourCycle);

impl LocaleSource for FixedLocale {
    fn hour_cycle(&self) -> HourCycle {
        self.0
    }
}

impl HourCyclePreference {
    /// Build the source matching this preference.
    pub fn into_source(self) -> Box<dyn LocaleSource> {
        match self {
            HourCyclePreference::Auto => Box::new(EnvLocale),
            HourCyclePreference::H12 => Box::new(FixedLocale(HourCycle::TwelveHour)),
            HourCyclePreference::H24 => Box::new(FixedLocale(HourCycle::TwentyFourHour)),
        }
    }
}

const TWELVE_HOUR_LANGUAGES: &[&str] = &["ar", "bn", "hi", "ko", "ur"];
const TWELVE_HOUR_EN_REGIONS: &[&str] = &[
    "US", "CA", "AU", "NZ", "IN", "PH", "PK", "EG", "SA", "MY",
];
const TWELVE_HOUR_ES_REGIONS: &[&str] = &["US", "MX", "CO"];

/// Best-effort hour cycle for a POSIX locale name such as `en_US.UTF-8`.
///
/// `C`, `POSIX` and unrecognized names use the 24-hour cycle.
pub fn hour_cycle_for_locale(name: &str) -> HourCycle {
    let base = name.split(['.', '@']).next().unwrap_or_default().trim();
    let (lang, region) = match base.split_once(['_', '-']) {
        Some((l, r)) => (l.to_ascii_lowercase(), Some(r.to_ascii_uppercase())),
        None => (base.to_ascii_lowercase(), None),
    };

    let twelve = match (lang.as_str(), region.as_deref()) {
        ("" | "c" | "posix", _) => false,
        (l, _) if TWELVE_HOUR_LANGUAGES.contains(&l) => true,
        ("en", None) => true,
        ("en", Some(r)) => TWELVE_HOUR_EN_REGIONS.contains(&r),
        ("es", Some(r)) => TWELVE_HOUR_ES_REGIONS.contains(&r),
        _ => false,
    };

    if twelve {
        HourCycle::TwelveHour
    } else {
        HourCycle::TwentyFourHour
    }
}

type Callback = Box<dyn FnMut(HourCycle)>;

struct Subscriber {
    active: Rc<Cell<bool>>,
    callback: Callback,
}

/// Tracks the hour-cycle preference and notifies subscribers when it changes.
///
/// Changes are picked up by [`LocaleObserver::refresh`], which hosts call once per redraw
/// tick.
pub struct LocaleObserver {
    source: Box<dyn LocaleSource>,
    current: HourCycle,
    subscribers: Vec<Subscriber>,
}

impl LocaleObserver {
    pub fn new(source: Box<dyn LocaleSource>) -> Self {
        let current = source.hour_cycle();
        tracing::debug!(?current, "initial hour cycle");
        Self {
            source,
            current,
            subscribers: Vec::new(),
        }
    }

    pub fn hour_cycle(&self) -> HourCycle {
        self.current
    }

    pub fn prefers_24_hour(&self) -> bool {
        self.current.uses_24_hour()
    }

    /// Re-query the source. Returns true and notifies subscribers if the preference changed.
    pub fn refresh(&mut self) -> bool {
        let next = self.source.hour_cycle();
        if next == self.current {
            return false;
        }
        tracing::debug!(from = ?self.current, to = ?next, "hour cycle changed");
        self.current = next;

        self.subscribers.retain(|s| s.active.get());
        for sub in self.subscribers.iter_mut() {
            // A callback may drop another subscriber's handle.
            if sub.active.get() {
                (sub.callback)(next);
            }
        }
        true
    }

    /// Register `callback` for preference changes until the returned handle is dropped.
    pub fn subscribe(&mut self, callback: impl FnMut(HourCycle) + 'static) -> Subscription {
        let active = Rc::new(Cell::new(true));
        self.subscribers.retain(|s| s.active.get());
        self.subscribers.push(Subscriber {
            active: active.clone(),
            callback: Box::new(callback),
        });
        Subscription { active }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.iter().filter(|s| s.active.get()).count()
    }
}

/// Handle for a [`LocaleObserver`] subscription; unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    active: Rc<Cell<bool>>,
}

impl Subscription {
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.active.set(false);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/clock/hour_cycle.rs"]
mod tests;
