use crate::{nmea::LineEnding, registers::QUADRINO_GPS_ADDRESS};

/// By default the receiver refreshes its registers once a second
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 1000;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverConfig {
    /// 7-bit I2C address of the receiver.
    pub address: u8,
    pub poll_interval_ms: u32,
    pub line_ending: LineEnding,
    /// Emit `$GPGGA` on every poll.
    pub gga: bool,
    /// Emit `$GPZDA` on every poll.
    pub zda: bool,
}

impl DriverConfig {
    pub const fn new() -> Self {
        Self {
            address: QUADRINO_GPS_ADDRESS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            line_ending: LineEnding::Lf,
            gga: true,
            zda: true,
        }
    }

    pub const fn with_address(self, address: u8) -> Self {
        Self { address, ..self }
    }

    pub const fn with_poll_interval_ms(self, poll_interval_ms: u32) -> Self {
        Self {
            poll_interval_ms,
            ..self
        }
    }

    pub const fn with_line_ending(self, line_ending: LineEnding) -> Self {
        Self {
            line_ending,
            ..self
        }
    }

    pub const fn with_gga(self, gga: bool) -> Self {
        Self { gga, ..self }
    }

    pub const fn with_zda(self, zda: bool) -> Self {
        Self { zda, ..self }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = DriverConfig::default();
        assert_eq!(c.address, 0x20);
        assert_eq!(c.poll_interval_ms, 1000);
        assert_eq!(c.line_ending, LineEnding::Lf);
        assert!(c.gga && c.zda);
    }

    #[test]
    fn builders_are_const() {
        const C: DriverConfig = DriverConfig::new()
            .with_address(0x21)
            .with_poll_interval_ms(250)
            .with_line_ending(LineEnding::CrLf)
            .with_zda(false);
        assert_eq!(C.address, 0x21);
        assert_eq!(C.poll_interval_ms, 250);
        assert_eq!(C.line_ending, LineEnding::CrLf);
        assert!(C.gga);
        assert!(!C.zda);
    }
}
