/// Register units per degree (1e-7 degree fixed point).
pub const UNITS_PER_DEGREE: u32 = 10_000_000;

/// Digits kept after the decimal point of the minutes.
pub const FRACTION_DIGITS: usize = 6;
const FRACTION_SCALE: u64 = 1_000_000;

/// Magnitude of an angle as whole degrees, whole minutes and the
/// fractional part of the minute in millionths. The sign is not kept;
/// callers pick the hemisphere letter from the original value.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dms {
    pub degrees: u16,
    pub minutes: u8,
    pub fraction: u32,
}

/// Splits a 1e-7 degree value into degrees, minutes and millionths of a
/// minute, without floating point.
pub fn degrees_to_dms(value: i32) -> Dms {
    let magnitude = value.unsigned_abs();
    let degrees = magnitude / UNITS_PER_DEGREE;
    let remainder = magnitude % UNITS_PER_DEGREE;

    // remainder * 60 is in 1e-7 minutes and needs more than 32 bits
    let scaled = u64::from(remainder) * 60;
    let minutes = scaled / u64::from(UNITS_PER_DEGREE);
    let fraction = (scaled % u64::from(UNITS_PER_DEGREE)) * FRACTION_SCALE
        / u64::from(UNITS_PER_DEGREE);

    Dms {
        // |i32::MIN| / 1e7 is 214
        degrees: degrees as u16,
        minutes: minutes as u8,
        fraction: fraction as u32,
    }
}

impl Dms {
    /// Back to 1e-7 degree units, rounding to nearest. Used to check the
    /// split loses less than one unit.
    pub fn to_units(&self) -> u32 {
        let millionths =
            u64::from(self.minutes) * FRACTION_SCALE + u64::from(self.fraction);
        // millionths of a minute * 1e7 / (60 * 1e6)
        let units = (millionths * 10 + 30) / 60;
        self.degrees as u32 * UNITS_PER_DEGREE + units as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero() {
        assert_eq!(
            degrees_to_dms(0),
            Dms {
                degrees: 0,
                minutes: 0,
                fraction: 0
            }
        );
    }

    #[test]
    fn st_petersburg() {
        // 27.8165079 N, 82.7941423 W
        let lat = degrees_to_dms(278_165_079);
        assert_eq!((lat.degrees, lat.minutes, lat.fraction), (27, 48, 990_474));

        let lon = degrees_to_dms(-827_941_423);
        assert_eq!((lon.degrees, lon.minutes, lon.fraction), (82, 47, 648_538));
    }

    #[test]
    fn sign_is_dropped() {
        assert_eq!(degrees_to_dms(-235_399_468), degrees_to_dms(235_399_468));
    }

    #[test]
    fn range_limits() {
        assert_eq!(
            degrees_to_dms(900_000_000),
            Dms {
                degrees: 90,
                minutes: 0,
                fraction: 0
            }
        );
        assert_eq!(degrees_to_dms(-1_800_000_000).degrees, 180);
        assert_eq!(degrees_to_dms(1_799_999_999).degrees, 179);
        assert_eq!(degrees_to_dms(1_799_999_999).minutes, 59);
        assert_eq!(degrees_to_dms(1_799_999_999).fraction, 999_994);
        // not a valid coordinate, but must not overflow
        assert_eq!(degrees_to_dms(i32::MIN).degrees, 214);
    }

    #[test]
    fn split_round_trips_within_one_unit() {
        let mut state = 0x2545_f491_4f6c_dd1du64;
        for _ in 0..10_000 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let v = (state % 3_600_000_001) as i64 - 1_800_000_000;
            let v = v as i32;

            let dms = degrees_to_dms(v);
            assert!(dms.minutes < 60);
            assert!(dms.fraction < 1_000_000);
            let diff = dms.to_units().abs_diff(v.unsigned_abs());
            assert!(diff <= 1, "{v} -> {dms:?}");
        }
    }
}
