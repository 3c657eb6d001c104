use chrono::Timelike;

use crate::{
    foundation::error::{NixieError, NixieResult},
    geometry::table::TubeIndex,
};

/// Hour/minute pair in 24-hour form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawReading")]
pub struct ClockReading {
    hour: u8,
    minute: u8,
}

#[derive(serde::Deserialize)]
struct RawReading {
    hour: u8,
    minute: u8,
}

impl TryFrom<RawReading> for ClockReading {
    type Error = NixieError;

    fn try_from(raw: RawReading) -> Result<Self, Self::Error> {
        Self::new(raw.hour, raw.minute)
    }
}

impl ClockReading {
    pub fn new(hour: u8, minute: u8) -> NixieResult<Self> {
        if hour > 23 {
            return Err(NixieError::validation(format!(
                "hour must be in 0..=23, got {hour}"
            )));
        }
        if minute > 59 {
            return Err(NixieError::validation(format!(
                "minute must be in 0..=59, got {minute}"
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Take the hour and minute fields of any chrono time value.
    pub fn from_time<T: Timelike>(t: &T) -> Self {
        // chrono guarantees hour < 24 and minute < 60.
        Self {
            hour: t.hour() as u8,
            minute: t.minute() as u8,
        }
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }
}

impl std::str::FromStr for ClockReading {
    type Err = NixieError;

    /// Parse `HH:MM` (24-hour).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| NixieError::validation(format!("expected HH:MM, got '{s}'")))?;
        let hour = h
            .parse::<u8>()
            .map_err(|e| NixieError::validation(format!("invalid hour '{h}': {e}")))?;
        let minute = m
            .parse::<u8>()
            .map_err(|e| NixieError::validation(format!("invalid minute '{m}': {e}")))?;
        Self::new(hour, minute)
    }
}

impl std::fmt::Display for ClockReading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A digit glyph that exists in a specific tube.
///
/// The digit is always below [`TubeIndex::glyph_count`] for its tube, including after
/// deserialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawGlyph")]
pub struct Glyph {
    tube: TubeIndex,
    digit: u8,
}

#[derive(serde::Deserialize)]
struct RawGlyph {
    tube: TubeIndex,
    digit: u8,
}

impl TryFrom<RawGlyph> for Glyph {
    type Error = NixieError;

    fn try_from(raw: RawGlyph) -> Result<Self, Self::Error> {
        Self::new(raw.tube, raw.digit).ok_or_else(|| {
            NixieError::validation(format!("tube {} has no digit {}", raw.tube.letter(), raw.digit))
        })
    }
}

impl Glyph {
    pub fn new(tube: TubeIndex, digit: u8) -> Option<Self> {
        (digit < tube.glyph_count()).then_some(Self { tube, digit })
    }

    /// Saturate `digit` to the highest glyph the tube carries.
    pub fn clamped(tube: TubeIndex, digit: u8) -> Self {
        Self {
            tube,
            digit: digit.min(tube.glyph_count() - 1),
        }
    }

    pub fn tube(self) -> TubeIndex {
        self.tube
    }

    pub fn digit(self) -> u8 {
        self.digit
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    pub fn label(self) -> &'static str {
        match self {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        }
    }
}

/// Glyphs to light in each tube, plus the AM/PM tag for 12-hour displays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DigitSelection {
    pub tube_a: Glyph,
    pub tube_b: Glyph,
    pub tube_c: Glyph,
    pub tube_d: Glyph,
    pub meridiem: Option<Meridiem>,
}

impl DigitSelection {
    /// Glyphs in draw order (tube A to D).
    pub fn glyphs(&self) -> [Glyph; 4] {
        [self.tube_a, self.tube_b, self.tube_c, self.tube_d]
    }
}

/// Map a 24-hour time to tube glyphs.
///
/// Pure and total over `u8`: out-of-range input saturates into the tubes' glyph sets
/// instead of failing.
pub fn map_digits(hour24: u8, minute: u8, use_24_hour_cycle: bool) -> DigitSelection {
    let hour = if use_24_hour_cycle {
        hour24
    } else {
        match hour24 % 12 {
            0 => 12,
            h => h,
        }
    };

    let meridiem = if use_24_hour_cycle {
        None
    } else if hour24 >= 12 {
        Some(Meridiem::Pm)
    } else {
        Some(Meridiem::Am)
    };

    DigitSelection {
        tube_a: Glyph::clamped(TubeIndex::A, (hour / 10).min(2)),
        tube_b: Glyph::clamped(TubeIndex::B, hour % 10),
        tube_c: Glyph::clamped(TubeIndex::C, (minute / 10).min(5)),
        tube_d: Glyph::clamped(TubeIndex::D, minute % 10),
        meridiem,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/clock/digits.rs"]
mod tests;
