use embedded_hal::digital;

use super::tuning::TUNING_CAP_MAX;
use crate::{
    configs::{index_in_table, Config, FREQ_DIVISION_RATIOS, STRIKE_COUNT_THRESHOLDS},
    maybe_async_attr, spi_type, Error, AS3935,
};

/// Analogue front-end gain for indoor operation
const AFE_GAIN_INDOOR: u8 = 0x12;
/// Analogue front-end gain for outdoor operation
const AFE_GAIN_OUTDOOR: u8 = 0x0E;

const WATCHDOG_MAX: u8 = 0x0A;
const NOISE_FLOOR_MAX: u8 = 0x07;
const SPIKE_THRESHOLD_MAX: u8 = 0x0B;

impl<SPI, IRQ> AS3935<SPI, IRQ>
where
    SPI: spi_type::spi::SpiDevice<u8>,
    IRQ: digital::ErrorType,
{
    /// Returns whether the analogue front-end is set up for indoor use
    #[maybe_async_attr]
    pub async fn indoor(&mut self) -> Result<bool, Error<SPI, IRQ>> {
        Ok(self.ll.afe_gb().read().await? == AFE_GAIN_INDOOR)
    }

    /// Selects the indoor or outdoor analogue front-end gain
    ///
    /// Must be set to `true` if the sensor is used indoors. The default is
    /// indoor.
    #[maybe_async_attr]
    pub async fn set_indoor(&mut self, indoor: bool) -> Result<(), Error<SPI, IRQ>> {
        let gain = if indoor {
            AFE_GAIN_INDOOR
        } else {
            AFE_GAIN_OUTDOOR
        };

        Ok(self.ll.afe_gb().write(gain).await?)
    }

    /// Returns whether the analogue front-end is set up for outdoor use
    #[maybe_async_attr]
    pub async fn outdoor(&mut self) -> Result<bool, Error<SPI, IRQ>> {
        Ok(!self.indoor().await?)
    }

    /// Selects the outdoor or indoor analogue front-end gain
    ///
    /// Equivalent of calling [`set_indoor`] with the opposite value.
    ///
    /// [`set_indoor`]: #method.set_indoor
    #[maybe_async_attr]
    pub async fn set_outdoor(&mut self, outdoor: bool) -> Result<(), Error<SPI, IRQ>> {
        self.set_indoor(!outdoor).await
    }

    /// Returns the watchdog threshold
    #[maybe_async_attr]
    pub async fn watchdog(&mut self) -> Result<u8, Error<SPI, IRQ>> {
        Ok(self.ll.wdth().read().await?)
    }

    /// Sets the watchdog threshold, 0 to 10
    ///
    /// Higher thresholds decrease triggers by disturbers but reduce
    /// sensitivity to lightning strikes.
    #[maybe_async_attr]
    pub async fn set_watchdog(&mut self, value: u8) -> Result<(), Error<SPI, IRQ>> {
        if value > WATCHDOG_MAX {
            return Err(Error::InvalidConfiguration);
        }

        Ok(self.ll.wdth().write(value).await?)
    }

    /// Returns the noise floor level
    #[maybe_async_attr]
    pub async fn noise_floor_limit(&mut self) -> Result<u8, Error<SPI, IRQ>> {
        Ok(self.ll.nf_lev().read().await?)
    }

    /// Sets the noise floor level, 0 to 7
    ///
    /// When the background noise exceeds this level the chip issues a
    /// noise-high interrupt. Higher values allow operation with higher
    /// background noise.
    #[maybe_async_attr]
    pub async fn set_noise_floor_limit(&mut self, value: u8) -> Result<(), Error<SPI, IRQ>> {
        if value > NOISE_FLOOR_MAX {
            return Err(Error::InvalidConfiguration);
        }

        Ok(self.ll.nf_lev().write(value).await?)
    }

    /// Returns the spike rejection threshold
    #[maybe_async_attr]
    pub async fn spike_threshold(&mut self) -> Result<u8, Error<SPI, IRQ>> {
        Ok(self.ll.srej().read().await?)
    }

    /// Sets the spike rejection threshold, 0 to 11
    ///
    /// Higher values reduce false triggers but reduce sensitivity.
    #[maybe_async_attr]
    pub async fn set_spike_threshold(&mut self, value: u8) -> Result<(), Error<SPI, IRQ>> {
        if value > SPIKE_THRESHOLD_MAX {
            return Err(Error::InvalidConfiguration);
        }

        Ok(self.ll.srej().write(value).await?)
    }

    /// Returns the strike-count threshold
    #[maybe_async_attr]
    pub async fn strike_count_threshold(&mut self) -> Result<u8, Error<SPI, IRQ>> {
        let index = self.ll.min_num_ligh().read().await?;

        Ok(STRIKE_COUNT_THRESHOLDS[index as usize])
    }

    /// Sets the minimum number of strikes before an interrupt is issued
    ///
    /// One of 1, 5, 9 or 16. The threshold is reset to its default after
    /// being triggered.
    #[maybe_async_attr]
    pub async fn set_strike_count_threshold(&mut self, count: u8) -> Result<(), Error<SPI, IRQ>> {
        let index = index_in_table(&STRIKE_COUNT_THRESHOLDS, count)
            .ok_or(Error::InvalidConfiguration)?;

        Ok(self.ll.min_num_ligh().write(index).await?)
    }

    /// Returns whether disturber events are masked
    #[maybe_async_attr]
    pub async fn disturber_mask(&mut self) -> Result<bool, Error<SPI, IRQ>> {
        Ok(self.ll.mask_dist().read().await? != 0)
    }

    /// Suppresses or allows interrupts for disturber events
    #[maybe_async_attr]
    pub async fn set_disturber_mask(&mut self, masked: bool) -> Result<(), Error<SPI, IRQ>> {
        Ok(self.ll.mask_dist().write(masked as u8).await?)
    }

    /// Clears the statistics of the distance estimation block
    #[maybe_async_attr]
    pub async fn clear_stats(&mut self) -> Result<(), Error<SPI, IRQ>> {
        self.ll.cl_stat().write(1).await?;
        self.ll.cl_stat().write(0).await?;
        self.ll.cl_stat().write(1).await?;

        Ok(())
    }

    /// Applies a whole [`Config`] in one go
    ///
    /// Every entry is validated before the first register is written, so an
    /// invalid configuration leaves the sensor untouched.
    #[maybe_async_attr]
    pub async fn configure(&mut self, config: Config) -> Result<(), Error<SPI, IRQ>> {
        if config.watchdog > WATCHDOG_MAX
            || config.noise_floor_limit > NOISE_FLOOR_MAX
            || config.spike_threshold > SPIKE_THRESHOLD_MAX
            || index_in_table(&STRIKE_COUNT_THRESHOLDS, config.strike_count_threshold).is_none()
            || index_in_table(&FREQ_DIVISION_RATIOS, config.freq_divisor).is_none()
            || config.tuning_capacitance > TUNING_CAP_MAX
        {
            return Err(Error::InvalidConfiguration);
        }

        self.set_indoor(config.indoor).await?;
        self.set_watchdog(config.watchdog).await?;
        self.set_noise_floor_limit(config.noise_floor_limit).await?;
        self.set_spike_threshold(config.spike_threshold).await?;
        self.set_strike_count_threshold(config.strike_count_threshold)
            .await?;
        self.set_disturber_mask(config.disturber_masked).await?;
        self.set_freq_divisor(config.freq_divisor).await?;
        self.set_tuning_capacitance(config.tuning_capacitance).await?;

        Ok(())
    }
}
