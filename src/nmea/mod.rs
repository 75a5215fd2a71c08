use core::fmt;

use tinyvec::ArrayVec;

use crate::registers::{Coordinates, Detail, StatusSnapshot};

pub mod angle;
pub mod checksum;
pub mod sentence;
pub mod time;

pub use angle::{degrees_to_dms, Dms};
pub use checksum::{append_checksum, checksum, verify, Checksummed};
pub use sentence::{format_gga, format_zda, FixQuality, GGA_MAX_BODY_LEN, ZDA_MAX_BODY_LEN};
pub use time::{resolve_gps_time, CalendarTime};

/// Longest sentence NMEA 0183 allows, `$` through the line ending.
pub const MAX_SENTENCE_LEN: usize = 82;

#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NmeaError {
    #[error("destination holds {available} bytes, sentence needs {needed}")]
    InsufficientBuffer { needed: usize, available: usize },
    #[error("snapshot value outside the encodable range")]
    InvalidInput,
}

/// What follows the `*hh` checksum.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineEnding {
    None,
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub const fn as_bytes(self) -> &'static [u8] {
        match self {
            LineEnding::None => b"",
            LineEnding::Lf => b"\n",
            LineEnding::CrLf => b"\r\n",
        }
    }

    pub const fn len(self) -> usize {
        self.as_bytes().len()
    }
}

/// `fmt::Write` sink over a borrowed slice. Unlike a growable buffer it
/// refuses the whole write once the slice is full, so callers see the
/// overflow instead of a silently truncated sentence.
pub(crate) struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> SliceWriter<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }
}

impl fmt::Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let end = self.pos.checked_add(bytes.len()).ok_or(fmt::Error)?;
        let dst = self.buf.get_mut(self.pos..end).ok_or(fmt::Error)?;
        dst.copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }
}

/// A complete, checksummed sentence held by value.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Sentence(ArrayVec<[u8; MAX_SENTENCE_LEN]>);

#[cfg(feature = "defmt")]
impl defmt::Format for Sentence {
    fn format(&self, fmt: defmt::Formatter) {
        match self.as_str() {
            Some(s) => defmt::write!(fmt, "{=str}", s),
            None => defmt::write!(fmt, "{=[u8]}", self.as_bytes()),
        }
    }
}

impl Sentence {
    pub fn gga(
        status: &StatusSnapshot,
        location: &Coordinates,
        detail: &Detail,
        ending: LineEnding,
    ) -> Result<Self, NmeaError> {
        Self::render(|buf| format_gga(status, location, detail, buf, ending))
    }

    pub fn zda(detail: &Detail, ending: LineEnding) -> Result<Self, NmeaError> {
        Self::render(|buf| format_zda(detail, buf, ending))
    }

    fn render(
        f: impl FnOnce(&mut [u8]) -> Result<usize, NmeaError>,
    ) -> Result<Self, NmeaError> {
        let mut data = [0u8; MAX_SENTENCE_LEN];
        let len = f(&mut data)?;
        Ok(Self(ArrayVec::from_array_len(data, len)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(self.0.as_slice()).ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Sentence {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
