use chrono::{DateTime, Datelike, Timelike, Utc};

use super::NmeaError;

pub const SECONDS_PER_WEEK: u32 = 604_800;
/// Time-of-week register units (1/100 s) in one week.
pub const CENTIS_PER_WEEK: u32 = SECONDS_PER_WEEK * 100;
/// 1980-01-06T00:00:00Z as Unix seconds (3657 days).
pub const GPS_EPOCH_UNIX_SECS: i64 = 315_964_800;

/// UTC calendar time. Leap seconds since 1980 are not applied, so this runs
/// ahead of true UTC by the accumulated GPS-UTC offset.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub centis: u8,
}

/// Resolves a GPS week number and time of week (1/100 s) to a calendar
/// time. The time of week is taken modulo one week first, so any register
/// value yields a valid time of day within `week`.
pub fn resolve_gps_time(week: u16, time_of_week: u32) -> Result<CalendarTime, NmeaError> {
    let tow = time_of_week % CENTIS_PER_WEEK;
    let gps_secs = i64::from(week) * i64::from(SECONDS_PER_WEEK) + i64::from(tow / 100);

    let dt = DateTime::<Utc>::from_timestamp(GPS_EPOCH_UNIX_SECS + gps_secs, 0)
        .ok_or(NmeaError::InvalidInput)?;

    Ok(CalendarTime {
        // week is 16 bits, which tops out in the year 3236
        year: dt.year() as u16,
        month: dt.month() as u8,
        day: dt.day() as u8,
        hour: dt.hour() as u8,
        minute: dt.minute() as u8,
        second: dt.second() as u8,
        centis: (tow % 100) as u8,
    })
}
