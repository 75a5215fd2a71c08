use embedded_hal::blocking::i2c::WriteRead;
use tinyvec::ArrayVec;

use crate::{
    config::DriverConfig,
    nmea::{NmeaError, Sentence},
    registers::{
        reg, Coordinates, Detail, StatusSnapshot, DETAIL_LEN, LOCATION_LEN, STATUS_LEN,
    },
};

#[derive(thiserror::Error, Debug)]
pub enum GpsError<E> {
    #[error("couldn't read register {register:#04x} from GPS")]
    Bus { register: u8, error: E },
    #[error("couldn't format sentence")]
    Nmea(#[from] NmeaError),
}

/// Sentences produced by one poll, in transmit order.
pub type Sentences = ArrayVec<[Sentence; 2]>;

/// Everything read in one poll cycle. Without a fix the location and detail
/// are zeroed rather than read.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    pub status: StatusSnapshot,
    pub location: Coordinates,
    pub detail: Detail,
}

impl Reading {
    pub fn no_fix(status: StatusSnapshot) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Renders the sentences enabled in `config`, GGA first.
    pub fn render(&self, config: &DriverConfig) -> Result<Sentences, NmeaError> {
        let mut out = Sentences::new();
        if config.gga {
            out.push(Sentence::gga(
                &self.status,
                &self.location,
                &self.detail,
                config.line_ending,
            )?);
        }
        if config.zda {
            out.push(Sentence::zda(&self.detail, config.line_ending)?);
        }
        Ok(out)
    }
}

/// Register-level driver for a Quadrino GPS on an I2C bus.
pub struct QuadrinoGps<I2C> {
    i2c: I2C,
    config: DriverConfig,
}

impl<I2C, E> QuadrinoGps<I2C>
where
    I2C: WriteRead<Error = E>,
{
    pub fn new(i2c: I2C, config: &DriverConfig) -> Self {
        Self {
            i2c,
            config: *config,
        }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_register<const N: usize>(&mut self, register: u8) -> Result<[u8; N], GpsError<E>> {
        let mut buf = [0u8; N];
        self.i2c
            .write_read(self.config.address, &[register], &mut buf)
            .map_err(|error| {
                warn!("couldn't read register {=u8:x} from GPS", register);
                GpsError::Bus { register, error }
            })?;
        Ok(buf)
    }

    pub fn read_status(&mut self) -> Result<StatusSnapshot, GpsError<E>> {
        self.read_register::<STATUS_LEN>(reg::STATUS)
            .map(StatusSnapshot::from_le_bytes)
    }

    pub fn read_location(&mut self) -> Result<Coordinates, GpsError<E>> {
        self.read_register::<LOCATION_LEN>(reg::LOCATION)
            .map(Coordinates::from_le_bytes)
    }

    pub fn read_detail(&mut self) -> Result<Detail, GpsError<E>> {
        self.read_register::<DETAIL_LEN>(reg::GROUND_SPEED)
            .map(Detail::from_le_bytes)
    }

    /// Reads the status word and, if the receiver has a 2D or 3D fix, the
    /// detail and location blocks.
    pub fn poll(&mut self) -> Result<Reading, GpsError<E>> {
        let status = self.read_status()?;
        if !status.has_fix() {
            debug!("no fix, {=u8} satellites", status.satellites());
            return Ok(Reading::no_fix(status));
        }

        let detail = self.read_detail()?;
        let location = self.read_location()?;
        trace!("fix at {=i32}, {=i32}", location.latitude, location.longitude);
        Ok(Reading {
            status,
            location,
            detail,
        })
    }

    /// One poll cycle: read the receiver and render the configured
    /// sentences. Either step failing yields no sentences at all.
    pub fn poll_sentences(&mut self) -> Result<Sentences, GpsError<E>> {
        let reading = self.poll()?;
        Ok(reading.render(&self.config)?)
    }
}
