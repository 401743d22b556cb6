use embedded_hal::digital::{self, InputPin};

use crate::{configs::Event, maybe_async_attr, spi_type, Error, AS3935};

/// Minimum pause between the IRQ line asserting and reading the reason
/// register, per the datasheet
const IRQ_SETTLE_US: u32 = 200;

/// The strike energy registers hold a 22-bit value
const ENERGY_MASK: u32 = 0x3F_FFFF;

/// Distance register value reported while the storm is out of range
const DISTANCE_OUT_OF_RANGE: u8 = 0x3F;
/// Distance register value reported while the storm is overhead
const DISTANCE_OVERHEAD: u8 = 0x01;

impl<SPI, IRQ> AS3935<SPI, IRQ>
where
    SPI: spi_type::spi::SpiDevice<u8>,
    IRQ: digital::ErrorType,
{
    /// Returns the reason for the last interrupt
    ///
    /// The hardware clears the reason register when it is read, so the value
    /// can only be retrieved once per event. Waits out the settle time the
    /// datasheet requires between the IRQ line asserting and the read.
    #[maybe_async_attr]
    pub async fn interrupt_status<D>(&mut self, delay: &mut D) -> Result<Event, Error<SPI, IRQ>>
    where
        D: spi_type::delay::DelayNs,
    {
        delay.delay_us(IRQ_SETTLE_US).await;

        Ok(Event::from_reg(self.ll.int().read().await?))
    }

    /// Returns the calculated energy of the last strike
    ///
    /// This is a dimensionless figure without physical meaning.
    #[maybe_async_attr]
    pub async fn energy(&mut self) -> Result<u32, Error<SPI, IRQ>> {
        let mmsb = self.ll.s_lig_mm().read().await? as u32;
        let msb = self.ll.s_lig_m().read().await? as u32;
        let lsb = self.ll.s_lig_l().read().await? as u32;

        Ok(((mmsb << 16) | (msb << 8) | lsb) & ENERGY_MASK)
    }

    /// Returns the estimated distance to the storm front in km
    ///
    /// `None` means the storm is out of range (more than 40 km away); zero
    /// means it is overhead.
    #[maybe_async_attr]
    pub async fn distance(&mut self) -> Result<Option<u8>, Error<SPI, IRQ>> {
        Ok(match self.ll.distance().read().await? {
            DISTANCE_OUT_OF_RANGE => None,
            DISTANCE_OVERHEAD => Some(0),
            km => Some(km),
        })
    }
}

impl<SPI, IRQ> AS3935<SPI, IRQ>
where
    SPI: spi_type::spi::SpiDevice<u8>,
    IRQ: InputPin,
{
    /// Returns the state of the interrupt pin
    ///
    /// `None` while the display flags route a clock or the antenna frequency
    /// to the pin, as the level then carries no event information. The pin is
    /// held high for at least one second after a lightning event.
    #[maybe_async_attr]
    pub async fn interrupt_set(&mut self) -> Result<Option<bool>, Error<SPI, IRQ>> {
        if self.ll.disp_flags().read().await? != 0 {
            return Ok(None);
        }

        self.irq.is_high().map(Some).map_err(Error::Pin)
    }
}
