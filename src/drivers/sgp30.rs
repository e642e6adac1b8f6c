//! Sensirion SGP30 gas sensor driver (eCO2 / TVOC) over `embedded-hal` I²C.
//!
//! Every command is a 16-bit big-endian word.  Every data word in either
//! direction is followed by its CRC-8.  Commands need a fixed processing
//! delay before the response can be read.
//!
//! | Command               | Code   | Delay | Response      |
//! |-----------------------|--------|-------|---------------|
//! | `iaq_init`            | 0x2003 | 10 ms | none          |
//! | `measure_iaq`         | 0x2008 | 12 ms | eCO2, TVOC    |
//! | `get_iaq_baseline`    | 0x2015 | 10 ms | eCO2, TVOC    |
//! | `set_iaq_baseline`    | 0x201E | 10 ms | none          |
//! | `set_absolute_humidity` | 0x2061 | 10 ms | none        |
//! | `get_serial_id`       | 0x3682 | 1 ms  | 3 words       |
//!
//! `set_iaq_baseline` takes the TVOC word **first**, the reverse of the
//! order `get_iaq_baseline` returns.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::debug;

use crate::calibration::BaselinePair;
use crate::error::SensorError;

use super::crc::crc8;

/// Fixed I²C address of the SGP30.
pub const ADDRESS: u8 = 0x58;

const IAQ_INIT: u16 = 0x2003;
const MEASURE_IAQ: u16 = 0x2008;
const GET_IAQ_BASELINE: u16 = 0x2015;
const SET_IAQ_BASELINE: u16 = 0x201E;
const SET_ABSOLUTE_HUMIDITY: u16 = 0x2061;
const GET_SERIAL_ID: u16 = 0x3682;

pub struct Sgp30<I2C, D> {
    i2c: I2C,
    delay: D,
    initialized: bool,
}

impl<I2C, D> Sgp30<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            initialized: false,
        }
    }

    /// 48-bit serial number as three words.
    pub fn serial(&mut self) -> Result<[u16; 3], SensorError> {
        self.command(GET_SERIAL_ID, &[])?;
        self.delay.delay_ms(1);
        let mut words = [0u16; 3];
        self.read_words(&mut words)?;
        Ok(words)
    }

    /// Start the air-quality algorithm.  Resets the on-chip baseline.
    pub fn iaq_init(&mut self) -> Result<(), SensorError> {
        self.command(IAQ_INIT, &[])?;
        self.delay.delay_ms(10);
        self.initialized = true;
        debug!("SGP30: iaq_init done");
        Ok(())
    }

    /// One measurement: `(eCO2 ppm, TVOC ppb)`.
    ///
    /// The algorithm expects this to be called once per second.
    pub fn measure_iaq(&mut self) -> Result<(u16, u16), SensorError> {
        if !self.initialized {
            return Err(SensorError::NotInitialized);
        }
        self.command(MEASURE_IAQ, &[])?;
        self.delay.delay_ms(12);
        let mut words = [0u16; 2];
        self.read_words(&mut words)?;
        Ok((words[0], words[1]))
    }

    pub fn get_baseline(&mut self) -> Result<BaselinePair, SensorError> {
        if !self.initialized {
            return Err(SensorError::NotInitialized);
        }
        self.command(GET_IAQ_BASELINE, &[])?;
        self.delay.delay_ms(10);
        let mut words = [0u16; 2];
        self.read_words(&mut words)?;
        Ok(BaselinePair::new(words[0], words[1]))
    }

    /// Write a baseline previously read with [`Self::get_baseline`].
    ///
    /// Must follow `iaq_init`.  A zero pair is never a learned baseline and
    /// is refused without touching the bus.
    pub fn set_baseline(&mut self, baseline: BaselinePair) -> Result<(), SensorError> {
        if !self.initialized {
            return Err(SensorError::NotInitialized);
        }
        if baseline.co2 == 0 && baseline.voc == 0 {
            return Err(SensorError::BaselineRejected);
        }
        self.command(SET_IAQ_BASELINE, &[baseline.voc, baseline.co2])?;
        self.delay.delay_ms(10);
        Ok(())
    }

    /// Absolute humidity in g/m³ as 8.8 fixed point.  Zero disables
    /// compensation.
    pub fn set_absolute_humidity(&mut self, absolute_8_8: u16) -> Result<(), SensorError> {
        self.command(SET_ABSOLUTE_HUMIDITY, &[absolute_8_8])?;
        self.delay.delay_ms(10);
        Ok(())
    }

    fn command(&mut self, cmd: u16, args: &[u16]) -> Result<(), SensorError> {
        let mut buf = [0u8; 8];
        buf[..2].copy_from_slice(&cmd.to_be_bytes());
        let mut len = 2;
        for word in args.iter().take(2) {
            let bytes = word.to_be_bytes();
            buf[len..len + 2].copy_from_slice(&bytes);
            buf[len + 2] = crc8(&bytes);
            len += 3;
        }
        self.i2c
            .write(ADDRESS, &buf[..len])
            .map_err(|_| SensorError::Communication)
    }

    fn read_words(&mut self, words: &mut [u16]) -> Result<(), SensorError> {
        let mut buf = [0u8; 9];
        let len = words.len() * 3;
        let raw = &mut buf[..len];
        self.i2c
            .read(ADDRESS, raw)
            .map_err(|_| SensorError::Communication)?;

        for (word, chunk) in words.iter_mut().zip(raw.chunks_exact(3)) {
            if crc8(&chunk[..2]) != chunk[2] {
                return Err(SensorError::Crc);
            }
            *word = u16::from_be_bytes([chunk[0], chunk[1]]);
        }
        Ok(())
    }
}

/// Absolute humidity (8.8 fixed-point g/m³) from temperature and relative
/// humidity, via the Magnus formula.
pub fn absolute_humidity_8_8(temperature_c: f32, relative_humidity_percent: f32) -> u16 {
    let exponent = 17.62 * temperature_c / (243.12 + temperature_c);
    let vapour_pressure_hpa =
        (relative_humidity_percent / 100.0) * 6.112 * micromath::F32(exponent).exp().0;
    let grams_per_m3 = 216.7 * vapour_pressure_hpa / (273.15 + temperature_c);

    let fixed = grams_per_m3 * 256.0;
    if fixed <= 0.0 {
        0
    } else if fixed >= f32::from(u16::MAX) {
        u16::MAX
    } else {
        fixed as u16
    }
}
