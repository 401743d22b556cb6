use embedded_hal::digital;

use crate::{
    configs::{index_in_table, FREQ_DIVISION_RATIOS},
    maybe_async_attr, spi_type, Error, AS3935,
};

/// Largest tuning capacitance the chip can add, in pF
pub(crate) const TUNING_CAP_MAX: u8 = 120;

/// One step of the tuning capacitor ladder, in pF
const TUNING_CAP_STEP: u8 = 8;

/// Display-flag value routing the antenna frequency to the IRQ pin
const DISPLAY_LCO: u8 = 0x04;
/// Display-flag value routing the SRCO clock to the IRQ pin
const DISPLAY_SRCO: u8 = 0x02;
/// Display-flag value routing the TRCO clock to the IRQ pin
const DISPLAY_TRCO: u8 = 0x01;

impl<SPI, IRQ> AS3935<SPI, IRQ>
where
    SPI: spi_type::spi::SpiDevice<u8>,
    IRQ: digital::ErrorType,
{
    /// Returns the antenna frequency division ratio
    #[maybe_async_attr]
    pub async fn freq_divisor(&mut self) -> Result<u8, Error<SPI, IRQ>> {
        let index = self.ll.lco_fdiv().read().await?;

        Ok(FREQ_DIVISION_RATIOS[index as usize])
    }

    /// Sets the division ratio applied to the antenna resonance frequency
    /// while it is routed to the IRQ pin
    ///
    /// One of 16, 32, 64 or 128.
    #[maybe_async_attr]
    pub async fn set_freq_divisor(&mut self, divisor: u8) -> Result<(), Error<SPI, IRQ>> {
        let index =
            index_in_table(&FREQ_DIVISION_RATIOS, divisor).ok_or(Error::InvalidConfiguration)?;

        Ok(self.ll.lco_fdiv().write(index).await?)
    }

    /// Returns the antenna tuning capacitance in pF
    #[maybe_async_attr]
    pub async fn tuning_capacitance(&mut self) -> Result<u8, Error<SPI, IRQ>> {
        Ok(self.ll.tun_cap().read().await? * TUNING_CAP_STEP)
    }

    /// Sets the antenna tuning capacitance
    ///
    /// Capacitance to add, 0 to 120 pF, rounded down to the nearest multiple
    /// of 8.
    #[maybe_async_attr]
    pub async fn set_tuning_capacitance(&mut self, picofarads: u8) -> Result<(), Error<SPI, IRQ>> {
        if picofarads > TUNING_CAP_MAX {
            return Err(Error::InvalidConfiguration);
        }

        Ok(self.ll.tun_cap().write(picofarads / TUNING_CAP_STEP).await?)
    }

    /// Returns whether the divided antenna frequency is routed to the IRQ pin
    #[maybe_async_attr]
    pub async fn output_antenna_freq(&mut self) -> Result<bool, Error<SPI, IRQ>> {
        Ok(self.ll.disp_flags().read().await? == DISPLAY_LCO)
    }

    /// Routes the divided antenna resonance frequency to the IRQ pin
    ///
    /// Used for trimming the antenna. While enabled the pin no longer
    /// signals events.
    #[maybe_async_attr]
    pub async fn set_output_antenna_freq(&mut self, enabled: bool) -> Result<(), Error<SPI, IRQ>> {
        let flags = if enabled { DISPLAY_LCO } else { 0 };

        Ok(self.ll.disp_flags().write(flags).await?)
    }

    /// Returns whether the SRCO clock is routed to the IRQ pin
    #[maybe_async_attr]
    pub async fn output_srco(&mut self) -> Result<bool, Error<SPI, IRQ>> {
        Ok(self.ll.disp_flags().read().await? == DISPLAY_SRCO)
    }

    /// Routes the SRCO clock to the IRQ pin
    #[maybe_async_attr]
    pub async fn set_output_srco(&mut self, enabled: bool) -> Result<(), Error<SPI, IRQ>> {
        let flags = if enabled { DISPLAY_SRCO } else { 0 };

        Ok(self.ll.disp_flags().write(flags).await?)
    }

    /// Returns whether the TRCO clock is routed to the IRQ pin
    #[maybe_async_attr]
    pub async fn output_trco(&mut self) -> Result<bool, Error<SPI, IRQ>> {
        Ok(self.ll.disp_flags().read().await? == DISPLAY_TRCO)
    }

    /// Routes the TRCO clock to the IRQ pin
    #[maybe_async_attr]
    pub async fn set_output_trco(&mut self, enabled: bool) -> Result<(), Error<SPI, IRQ>> {
        let flags = if enabled { DISPLAY_TRCO } else { 0 };

        Ok(self.ll.disp_flags().write(flags).await?)
    }
}
