//! Quadrino / I2C_GPS_NAV register map.
//!
//! Registers are little-endian. Everything is decoded with explicit shifts
//! and masks; raw bytes are never reinterpreted as structs.

/// Default 7-bit bus address.
pub const QUADRINO_GPS_ADDRESS: u8 = 0x20;

pub mod reg {
    /// Status word, see [`super::StatusSnapshot`].
    pub const STATUS: u8 = 0x00;
    /// Latitude then longitude, i32 each.
    pub const LOCATION: u8 = 0x07;
    /// Ground speed, altitude, ground course, GPS week, time of week.
    pub const GROUND_SPEED: u8 = 0x1f;
}

pub const STATUS_LEN: usize = 2;
pub const LOCATION_LEN: usize = 8;
pub const DETAIL_LEN: usize = 18;

// Status word layout
const NEW_DATA: u16 = 1 << 0;
const FIX_2D: u16 = 1 << 1;
const FIX_3D: u16 = 1 << 2;
const WAYPOINT_REACHED: u16 = 1 << 3;
const NUMSATS_SHIFT: u16 = 8;

/// One read of the status word. The raw value is kept so reserved bits
/// travel with the snapshot untouched.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusSnapshot {
    raw: u16,
}

impl StatusSnapshot {
    pub const fn from_raw(raw: u16) -> Self {
        Self { raw }
    }

    pub fn from_le_bytes(bytes: [u8; STATUS_LEN]) -> Self {
        Self::from_raw(u16::from_le_bytes(bytes))
    }

    pub const fn raw(&self) -> u16 {
        self.raw
    }

    pub const fn has_new_data(&self) -> bool {
        self.raw & NEW_DATA != 0
    }

    pub const fn has_2d_fix(&self) -> bool {
        self.raw & FIX_2D != 0
    }

    pub const fn has_3d_fix(&self) -> bool {
        self.raw & FIX_3D != 0
    }

    pub const fn has_fix(&self) -> bool {
        self.has_2d_fix() || self.has_3d_fix()
    }

    pub const fn waypoint_reached(&self) -> bool {
        self.raw & WAYPOINT_REACHED != 0
    }

    pub const fn satellites(&self) -> u8 {
        (self.raw >> NUMSATS_SHIFT) as u8
    }
}

/// Position in 1e-7 degrees.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Coordinates {
    pub latitude: i32,
    pub longitude: i32,
}

pub const LATITUDE_LIMIT: i32 = 900_000_000;
pub const LONGITUDE_LIMIT: i32 = 1_800_000_000;

impl Coordinates {
    pub fn from_le_bytes(bytes: [u8; LOCATION_LEN]) -> Self {
        Self {
            latitude: i32::from_le_bytes(word(&bytes, 0)),
            longitude: i32::from_le_bytes(word(&bytes, 4)),
        }
    }

    /// Within ±90° latitude and ±180° longitude.
    pub const fn in_range(&self) -> bool {
        self.latitude >= -LATITUDE_LIMIT
            && self.latitude <= LATITUDE_LIMIT
            && self.longitude >= -LONGITUDE_LIMIT
            && self.longitude <= LONGITUDE_LIMIT
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Detail {
    pub ground_speed: i32,
    /// Meters.
    pub altitude: i32,
    pub ground_course: i32,
    /// Weeks since 1980-01-06.
    pub gps_week: u16,
    /// Hundredths of a second since the start of the GPS week.
    pub time_of_week: u32,
}

impl Detail {
    pub fn from_le_bytes(bytes: [u8; DETAIL_LEN]) -> Self {
        Self {
            ground_speed: i32::from_le_bytes(word(&bytes, 0)),
            altitude: i32::from_le_bytes(word(&bytes, 4)),
            ground_course: i32::from_le_bytes(word(&bytes, 8)),
            gps_week: u16::from_le_bytes([bytes[12], bytes[13]]),
            time_of_week: u32::from_le_bytes(word(&bytes, 14)),
        }
    }
}

fn word(bytes: &[u8], at: usize) -> [u8; 4] {
    [bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_bits() {
        let s = StatusSnapshot::from_le_bytes([0b0000_1011, 7]);
        assert!(s.has_new_data());
        assert!(s.has_2d_fix());
        assert!(!s.has_3d_fix());
        assert!(s.waypoint_reached());
        assert!(s.has_fix());
        assert_eq!(s.satellites(), 7);
    }

    #[test]
    fn status_keeps_reserved_bits() {
        let s = StatusSnapshot::from_raw(0xfff0);
        assert_eq!(s.raw(), 0xfff0);
        assert!(!s.has_fix());
        assert_eq!(s.satellites(), 0xff);
    }

    #[test]
    fn location_block() {
        let mut bytes = [0u8; LOCATION_LEN];
        bytes[..4].copy_from_slice(&278_165_079i32.to_le_bytes());
        bytes[4..].copy_from_slice(&(-827_941_423i32).to_le_bytes());
        assert_eq!(
            Coordinates::from_le_bytes(bytes),
            Coordinates {
                latitude: 278_165_079,
                longitude: -827_941_423,
            }
        );
    }

    #[test]
    fn detail_block() {
        let mut bytes = [0u8; DETAIL_LEN];
        bytes[0..4].copy_from_slice(&250i32.to_le_bytes());
        bytes[4..8].copy_from_slice(&(-3i32).to_le_bytes());
        bytes[8..12].copy_from_slice(&1800i32.to_le_bytes());
        bytes[12..14].copy_from_slice(&1904u16.to_le_bytes());
        bytes[14..18].copy_from_slice(&28_036_800u32.to_le_bytes());
        assert_eq!(
            Detail::from_le_bytes(bytes),
            Detail {
                ground_speed: 250,
                altitude: -3,
                ground_course: 1800,
                gps_week: 1904,
                time_of_week: 28_036_800,
            }
        );
    }

    #[test]
    fn coordinate_limits() {
        assert!(Coordinates {
            latitude: -LATITUDE_LIMIT,
            longitude: LONGITUDE_LIMIT
        }
        .in_range());
        assert!(!Coordinates {
            latitude: LATITUDE_LIMIT + 1,
            longitude: 0
        }
        .in_range());
        assert!(!Coordinates {
            latitude: 0,
            longitude: i32::MIN
        }
        .in_range());
    }
}
