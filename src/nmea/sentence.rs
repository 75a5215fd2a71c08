use core::fmt::Write;

use super::{
    angle::degrees_to_dms,
    checksum::append_checksum,
    time::resolve_gps_time,
    LineEnding, NmeaError, SliceWriter,
};
use crate::registers::{Coordinates, Detail, StatusSnapshot};

/// Longest `$GPGGA` body before the checksum:
/// `$GPGGA,` `hhmmss,` `ddmm.ffffff,N,` `dddmm.ffffff,E,` `2,` `255,` `0.9,`
/// `-2147483648.0,M,` `0.0,M,` `,`
pub const GGA_MAX_BODY_LEN: usize = 7 + 7 + 14 + 15 + 2 + 4 + 4 + 16 + 6 + 1;

/// Longest `$GPZDA` body before the checksum:
/// `$GPZDA,` `hhmmss.ss,` `dd,` `mm,` `yyyy,` `00,` `00`
pub const ZDA_MAX_BODY_LEN: usize = 7 + 10 + 3 + 3 + 5 + 3 + 2;

/// `*hh`
const CHECKSUM_FIELD_LEN: usize = 3;

/// GGA fix quality digit. The receiver only reports 2D and 3D fix flags, so
/// nothing past `3D` is ever produced.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FixQuality {
    None = 0,
    Fix2D = 1,
    Fix3D = 2,
}

impl From<&StatusSnapshot> for FixQuality {
    fn from(status: &StatusSnapshot) -> Self {
        if status.has_3d_fix() {
            FixQuality::Fix3D
        } else if status.has_2d_fix() {
            FixQuality::Fix2D
        } else {
            FixQuality::None
        }
    }
}

fn reserve(dest: &[u8], max_body: usize, ending: LineEnding) -> Result<(), NmeaError> {
    let needed = max_body + CHECKSUM_FIELD_LEN + ending.len();
    if dest.len() < needed {
        return Err(NmeaError::InsufficientBuffer {
            needed,
            available: dest.len(),
        });
    }
    Ok(())
}

/// Writes a checksummed `$GPGGA` position fix into `dest` and returns its
/// length.
///
/// `dest` must hold the longest possible GGA sentence even when this one
/// would be shorter. With no fix the caller passes zeroed `location` and
/// `detail` and gets a well-formed sentence with quality `0`.
pub fn format_gga(
    status: &StatusSnapshot,
    location: &Coordinates,
    detail: &Detail,
    dest: &mut [u8],
    ending: LineEnding,
) -> Result<usize, NmeaError> {
    reserve(dest, GGA_MAX_BODY_LEN, ending)?;
    if !location.in_range() {
        warn!(
            "coordinates out of range: {=i32}, {=i32}",
            location.latitude,
            location.longitude
        );
        return Err(NmeaError::InvalidInput);
    }

    let time = resolve_gps_time(detail.gps_week, detail.time_of_week)?;
    let lat = degrees_to_dms(location.latitude);
    let lon = degrees_to_dms(location.longitude);

    let available = dest.len();
    let mut w = SliceWriter::new(dest);
    write!(
        w,
        "$GPGGA,{:02}{:02}{:02},{:02}{:02}.{:06},{},{:03}{:02}.{:06},{},{},{:02},0.9,{}.0,M,0.0,M,,",
        time.hour,
        time.minute,
        time.second,
        lat.degrees,
        lat.minutes,
        lat.fraction,
        if location.latitude < 0 { 'S' } else { 'N' },
        lon.degrees,
        lon.minutes,
        lon.fraction,
        if location.longitude < 0 { 'W' } else { 'E' },
        FixQuality::from(status) as u8,
        status.satellites(),
        detail.altitude,
    )
    .map_err(|_| NmeaError::InsufficientBuffer {
        needed: GGA_MAX_BODY_LEN,
        available,
    })?;
    let body_len = w.position();

    let out = append_checksum(dest, body_len, ending)?;
    trace!("GGA {=usize} bytes, checksum {=u8:x}", out.len, out.checksum);
    Ok(out.len)
}

/// Writes a checksummed `$GPZDA` date and time into `dest` and returns its
/// length. The local zone fields are always `00,00`.
pub fn format_zda(detail: &Detail, dest: &mut [u8], ending: LineEnding) -> Result<usize, NmeaError> {
    reserve(dest, ZDA_MAX_BODY_LEN, ending)?;

    let time = resolve_gps_time(detail.gps_week, detail.time_of_week)?;

    let available = dest.len();
    let mut w = SliceWriter::new(dest);
    write!(
        w,
        "$GPZDA,{:02}{:02}{:02}.{:02},{:02},{:02},{:04},00,00",
        time.hour, time.minute, time.second, time.centis, time.day, time.month, time.year,
    )
    .map_err(|_| NmeaError::InsufficientBuffer {
        needed: ZDA_MAX_BODY_LEN,
        available,
    })?;
    let body_len = w.position();

    let out = append_checksum(dest, body_len, ending)?;
    trace!("ZDA {=usize} bytes, checksum {=u8:x}", out.len, out.checksum);
    Ok(out.len)
}
