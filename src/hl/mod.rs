//! High-level interface to the AS3935
//!
//! The entry point to this API is the [AS3935] struct. Please refer to the
//! documentation there for more details.
//!
//! This module implements a high-level interface to the AS3935. This is the
//! recommended way to access the AS3935 using this crate, unless you need the
//! greater flexibility provided by the [register-level interface].
//!
//! [register-level interface]: ../ll/index.html

use core::fmt;

pub use error::*;

use crate::ll;

mod calib;
mod config;
mod error;
mod events;
mod tuning;

/// Entry point to the AS3935 driver API
///
/// Wraps the SPI device the sensor is connected to and the digital input the
/// sensor's IRQ line is wired to. The IRQ line is held high for at least one
/// second per event, so it may be polled on platforms without interrupt
/// support.
///
/// The sensor is a single shared resource: a read-modify-write settings
/// update is two bus transactions, so access from multiple threads must be
/// serialized around the whole handle.
pub struct AS3935<SPI, IRQ> {
    ll: ll::AS3935<SPI>,
    irq: IRQ,
}

impl<SPI, IRQ> AS3935<SPI, IRQ> {
    /// Create a new instance of `AS3935`
    ///
    /// Requires the SPI device and the interrupt input pin that are connected
    /// to the AS3935.
    pub fn new(spi: SPI, irq: IRQ) -> Self {
        AS3935 {
            ll: ll::AS3935::new(spi),
            irq,
        }
    }

    /// Provides direct access to the register-level API
    ///
    /// Be aware that by using the register-level API, you can invalidate
    /// various assumptions that the high-level API makes about the operation
    /// of the AS3935. Don't use the register-level and high-level APIs in
    /// tandem, unless you know what you're doing.
    pub fn ll(&mut self) -> &mut ll::AS3935<SPI> {
        &mut self.ll
    }

    /// Consumes the driver and returns the SPI device and the IRQ pin
    pub fn free(self) -> (SPI, IRQ) {
        (self.ll.spi, self.irq)
    }
}

// Can't be derived without putting requirements on `SPI` and `IRQ`.
impl<SPI, IRQ> fmt::Debug for AS3935<SPI, IRQ> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AS3935 {{ .. }}")
    }
}
