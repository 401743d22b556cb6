use core::fmt;
use core::fmt::{Display, Formatter};

use embedded_hal::{digital, spi};

#[cfg(feature = "defmt")]
use defmt::Format;

use crate::{configs::Oscillator, ll};

/// An error that can occur when configuring or reading the sensor
pub enum Error<SPI, IRQ>
where
    SPI: spi::ErrorType,
    IRQ: digital::ErrorType,
{
    /// Error occured while using the SPI bus
    Spi(ll::Error<SPI>),

    /// Error occured while reading the interrupt pin
    Pin(IRQ::Error),

    /// The supplied value is outside the set the hardware accepts
    ///
    /// Reported before any bus traffic is issued.
    InvalidConfiguration,

    /// The RC oscillators did not report calibration done within the deadline
    ///
    /// The sensor is left in a consistent state; triggering the calibration
    /// again is safe.
    CalibrationTimeout,

    /// The chip reports a bad lock on one or both RC oscillators
    CalibrationFailed(Oscillator),
}

impl<SPI, IRQ> From<ll::Error<SPI>> for Error<SPI, IRQ>
where
    SPI: spi::ErrorType,
    IRQ: digital::ErrorType,
{
    fn from(error: ll::Error<SPI>) -> Self {
        Error::Spi(error)
    }
}

impl<SPI, IRQ> Display for Error<SPI, IRQ>
where
    SPI: spi::ErrorType,
    SPI::Error: fmt::Debug,
    IRQ: digital::ErrorType,
    IRQ::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl<SPI, IRQ> std::error::Error for Error<SPI, IRQ>
where
    SPI: spi::ErrorType,
    SPI::Error: fmt::Debug,
    IRQ: digital::ErrorType,
    IRQ::Error: fmt::Debug,
{
}

// We can't derive this implementation, as `Debug` is only implemented
// conditionally for `ll::Error`.
impl<SPI, IRQ> fmt::Debug for Error<SPI, IRQ>
where
    SPI: spi::ErrorType,
    SPI::Error: fmt::Debug,
    IRQ: digital::ErrorType,
    IRQ::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Spi(error) => write!(f, "Spi({:?})", error),
            Error::Pin(error) => write!(f, "Pin({:?})", error),
            Error::InvalidConfiguration => write!(f, "InvalidConfiguration"),
            Error::CalibrationTimeout => write!(f, "CalibrationTimeout"),
            Error::CalibrationFailed(oscillator) => {
                write!(f, "CalibrationFailed({:?})", oscillator)
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl<SPI, IRQ> Format for Error<SPI, IRQ>
where
    SPI: spi::ErrorType,
    IRQ: digital::ErrorType,
{
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Spi(error) => defmt::write!(f, "Spi({:?})", error),
            Error::Pin(_) => defmt::write!(f, "Pin()"),
            Error::InvalidConfiguration => defmt::write!(f, "InvalidConfiguration"),
            Error::CalibrationTimeout => defmt::write!(f, "CalibrationTimeout"),
            Error::CalibrationFailed(oscillator) => {
                defmt::write!(f, "CalibrationFailed({:?})", oscillator)
            }
        }
    }
}
