//! Timezone helpers: validation and conversion utilities.
//!
//! Toggl entries carry timezone-aware start times, and the session start
//! time defaults to "now in the configured timezone" when no reviews exist
//! yet, so every sync resolves one validated IANA timezone up front.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimezoneError {
    #[error("invalid timezone '{0}'")]
    Invalid(String),
}

/// A validated IANA timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timezone {
    name: String,
    tz: Tz,
}

impl Timezone {
    /// Validate an IANA timezone name (e.g. "America/New_York").
    pub fn new(name: &str) -> Result<Self, TimezoneError> {
        let tz = Tz::from_str(name).map_err(|_| TimezoneError::Invalid(name.to_string()))?;
        Ok(Self {
            name: name.to_string(),
            tz,
        })
    }

    pub fn utc() -> Self {
        Self {
            name: "UTC".to_string(),
            tz: Tz::UTC,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Current wall-clock time in this timezone.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    /// Convert a UTC instant into this timezone.
    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.tz)
    }

    /// Midnight at the start of the current local day, as a UTC instant.
    /// Returns `None` for the rare local times skipped by a DST transition.
    pub fn start_of_local_day(&self) -> Option<DateTime<Utc>> {
        let midnight = self.now().date_naive().and_hms_opt(0, 0, 0)?;
        self.tz
            .from_local_datetime(&midnight)
            .earliest()
            .map(|t| t.with_timezone(&Utc))
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Whether a timezone name is a valid IANA identifier.
pub fn is_valid_timezone(name: &str) -> bool {
    Tz::from_str(name).is_ok()
}

/// Common timezones offered for configuration.
pub fn common_timezones() -> &'static [&'static str] {
    &[
        "UTC",
        "America/New_York",
        "America/Chicago",
        "America/Denver",
        "America/Los_Angeles",
        "Europe/London",
        "Europe/Paris",
        "Europe/Berlin",
        "Asia/Tokyo",
        "Asia/Shanghai",
        "Asia/Seoul",
        "Asia/Kolkata",
        "Australia/Sydney",
        "Australia/Melbourne",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn valid_timezone_accepted() {
        let tz = Timezone::new("Asia/Tokyo").unwrap();
        assert_eq!(tz.name(), "Asia/Tokyo");
    }

    #[test]
    fn invalid_timezone_rejected() {
        assert!(matches!(
            Timezone::new("Mars/Olympus_Mons"),
            Err(TimezoneError::Invalid(_))
        ));
        assert!(!is_valid_timezone("not-a-zone"));
    }

    #[test]
    fn localize_shifts_offset_not_instant() {
        let tz = Timezone::new("America/New_York").unwrap();
        let utc = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let local = tz.localize(utc);
        assert_eq!(local.hour(), 7); // EST is UTC-5 in January
        assert_eq!(local.with_timezone(&Utc), utc);
    }

    #[test]
    fn start_of_local_day_is_midnight() {
        let tz = Timezone::utc();
        let start = tz.start_of_local_day().unwrap();
        assert_eq!(start.hour(), 0);
        assert_eq!(start.minute(), 0);
    }

    #[test]
    fn common_timezones_are_all_valid() {
        for name in common_timezones() {
            assert!(is_valid_timezone(name), "{name} should be valid");
        }
    }
}
