//! Low-level interface to the AS3935
//!
//! This module implements a register-level interface to the AS3935. Users of
//! this library should typically not need to use this. Please consider using
//! the [high-level interface] instead.
//!
//! **NOTE**: Field access methods accept a full byte even when the field
//! consists of fewer bits. If you pass a value that is too large to be written
//! to the field, it will be silently truncated.
//!
//! [high-level interface]: ../hl/index.html

use core::fmt;

use embedded_hal::spi::{self, Operation};

#[cfg(feature = "defmt")]
use defmt::Format;

use crate::{maybe_async_attr, spi_type};

/// Register addresses are 6 bits wide; excess address bits are discarded.
const ADDRESS_MASK: u8 = 0x3F;

/// Direction bit of the command byte; set for a read transaction.
const SPI_READ: u8 = 0x40;

const fn read_command(address: u8) -> u8 {
    SPI_READ | (address & ADDRESS_MASK)
}

const fn write_command(address: u8) -> u8 {
    address & ADDRESS_MASK
}

/// Entry point to the AS3935 driver's low-level API
///
/// Please consider using [hl::AS3935] instead.
///
/// [hl::AS3935]: ../hl/struct.AS3935.html
#[derive(Copy, Clone)]
pub struct AS3935<SPI> {
    pub(crate) spi: SPI,
}

impl<SPI> AS3935<SPI> {
    /// Create a new instance of `AS3935`
    ///
    /// Requires the SPI device the sensor is connected to. The device must be
    /// configured for SPI mode 1 and at most 2 MHz.
    pub fn new(spi: SPI) -> Self {
        AS3935 { spi }
    }

    /// Allow access to the SPI bus
    pub fn bus(&mut self) -> &mut SPI {
        &mut self.spi
    }
}

impl<SPI> AS3935<SPI>
where
    SPI: spi_type::spi::SpiDevice<u8>,
{
    /// Read the register byte at `address`
    ///
    /// The command byte and the data byte are exchanged back to back within a
    /// single chip-select acquisition.
    #[maybe_async_attr]
    pub async fn read(&mut self, address: u8) -> Result<u8, Error<SPI>> {
        let command = [read_command(address)];
        let mut data = [0];

        self.spi
            .transaction(&mut [Operation::Write(&command), Operation::Read(&mut data)])
            .await
            .map_err(Error::Spi)?;

        Ok(data[0])
    }

    /// Write `byte` to the register at `address`
    #[maybe_async_attr]
    pub async fn write(&mut self, address: u8, byte: u8) -> Result<(), Error<SPI>> {
        let buffer = [write_command(address), byte];

        self.spi
            .transaction(&mut [Operation::Write(&buffer)])
            .await
            .map_err(Error::Spi)
    }
}

/// A bit-field within one of the AS3935's registers
///
/// The mask is stored pre-shifted, so `(byte & mask) >> offset` yields the
/// field's value. Several fields may share one register address; writes go
/// through a read-modify-write cycle to leave the co-resident fields alone.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub struct Field {
    /// Address of the register holding the field, 0x00 to 0x3F
    pub addr: u8,
    /// Index of the field's lowest bit within the register byte
    pub offset: u8,
    /// Mask selecting the field's bits, shifted into position
    pub mask: u8,
}

/// Provides access to a register field
///
/// You can get an instance for a given field using one of the methods on
/// [`AS3935`].
pub struct FieldAccessor<'s, SPI> {
    device: &'s mut AS3935<SPI>,
    field: Field,
}

impl<SPI> FieldAccessor<'_, SPI>
where
    SPI: spi_type::spi::SpiDevice<u8>,
{
    /// Read the field's value
    ///
    /// Some registers are cleared by the hardware when read; that side effect
    /// is documented on the individual field accessors.
    #[maybe_async_attr]
    pub async fn read(&mut self) -> Result<u8, Error<SPI>> {
        let byte = self.device.read(self.field.addr).await?;

        Ok((byte & self.field.mask) >> self.field.offset)
    }

    /// Write the field's value
    ///
    /// The register byte is read back first, so fields sharing the byte keep
    /// their values. The read and the write are two separate transactions;
    /// callers that share the device across threads must serialize access
    /// around the whole cycle.
    #[maybe_async_attr]
    pub async fn write(&mut self, value: u8) -> Result<(), Error<SPI>> {
        let mut byte = self.device.read(self.field.addr).await?;

        byte &= !self.field.mask;
        byte |= (value << self.field.offset) & self.field.mask;

        self.device.write(self.field.addr, byte).await
    }
}

/// An SPI error that can occur when communicating with the AS3935
pub enum Error<SPI>
where
    SPI: spi::ErrorType,
{
    /// SPI error occured during a transaction
    Spi(SPI::Error),
}

// We can't derive this implementation, as the compiler will complain that the
// associated error type doesn't implement `Debug`.
impl<SPI> fmt::Debug for Error<SPI>
where
    SPI: spi::ErrorType,
    SPI::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Spi(error) => write!(f, "Spi({:?})", error),
        }
    }
}

#[cfg(feature = "defmt")]
impl<SPI> Format for Error<SPI>
where
    SPI: spi::ErrorType,
{
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Spi(_) => defmt::write!(f, "Spi()"),
        }
    }
}

/// Generates field constants and accessor methods
macro_rules! impl_fields {
    (
        $(
            $addr:expr,
            $offset:expr,
            $mask:expr,
            $name:ident($name_lower:ident);
            #[$doc:meta]
        )*
    ) => {
        $(
            #[$doc]
            pub const $name: Field = Field {
                addr: $addr,
                offset: $offset,
                mask: $mask,
            };
        )*

        impl<SPI> AS3935<SPI> {
            $(
                #[$doc]
                pub fn $name_lower(&mut self) -> FieldAccessor<SPI> {
                    FieldAccessor {
                        device: self,
                        field: $name,
                    }
                }
            )*
        }
    };
}

// The whole register map is defined in this macro invocation. It follows the
// following syntax:
// <address>, <bit-offset>, <bit-mask>, NAME(name); /// <doc>
//
// The constants come straight from the AS3935 datasheet, section 8.8, and are
// the interoperability contract with the chip.

impl_fields! {
    0x00, 0, 0x01, PWD(pwd); /// Power-down flag
    0x00, 1, 0x3E, AFE_GB(afe_gb); /// Analogue front-end gain boost
    0x01, 0, 0x0F, WDTH(wdth); /// Watchdog threshold
    0x01, 4, 0x70, NF_LEV(nf_lev); /// Noise floor level
    0x02, 0, 0x0F, SREJ(srej); /// Spike rejection threshold
    0x02, 4, 0x30, MIN_NUM_LIGH(min_num_ligh); /// Minimum number of lightning events, as a table index
    0x02, 6, 0x40, CL_STAT(cl_stat); /// Clear the distance estimation statistics
    0x03, 0, 0x0F, INT(int); /// Interrupt reason; cleared by the hardware when read
    0x03, 5, 0x20, MASK_DIST(mask_dist); /// Mask disturber events
    0x03, 6, 0xC0, LCO_FDIV(lco_fdiv); /// Antenna frequency division ratio, as a table index
    0x04, 0, 0xFF, S_LIG_L(s_lig_l); /// Strike energy, least significant byte
    0x05, 0, 0xFF, S_LIG_M(s_lig_m); /// Strike energy, middle byte
    0x06, 0, 0x1F, S_LIG_MM(s_lig_mm); /// Strike energy, most significant bits
    0x07, 0, 0x3F, DISTANCE(distance); /// Estimated distance to the storm front
    0x08, 0, 0x0F, TUN_CAP(tun_cap); /// Internal antenna tuning capacitance, in steps of 8 pF
    0x08, 5, 0xE0, DISP_FLAGS(disp_flags); /// Route the TRCO/SRCO clocks or the antenna frequency to the IRQ pin
    0x3A, 6, 0x40, TRCO_CALIB_NOK(trco_calib_nok); /// Timer RC oscillator calibration failed
    0x3A, 7, 0x80, TRCO_CALIB_DONE(trco_calib_done); /// Timer RC oscillator calibration finished
    0x3B, 6, 0x40, SRCO_CALIB_NOK(srco_calib_nok); /// System RC oscillator calibration failed
    0x3B, 7, 0x80, SRCO_CALIB_DONE(srco_calib_done); /// System RC oscillator calibration finished
    0x3C, 0, 0xFF, PRESET_DEFAULT(preset_default); /// Write the direct command value to restore factory defaults
    0x3D, 0, 0xFF, CALIB_RCO(calib_rco); /// Write the direct command value to start RC oscillator calibration
}

#[cfg(test)]
mod test {
    use super::*;

    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    #[test]
    fn command_bytes() {
        assert_eq!(read_command(0x00), 0x40);
        assert_eq!(read_command(0x3F), 0x7F);
        assert_eq!(read_command(0x40), 0x40);
        assert_eq!(read_command(0xFF), 0x7F);

        assert_eq!(write_command(0x00), 0x00);
        assert_eq!(write_command(0x3F), 0x3F);
        assert_eq!(write_command(0x40), 0x00);
        assert_eq!(write_command(0xFF), 0x3F);
    }

    #[maybe_async::test(not(feature = "async"), async(feature = "async", tokio::test))]
    async fn read_is_one_framed_transaction() {
        let spi = SpiMock::new(&[
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x41]),
            SpiTransaction::read_vec(vec![0x27]),
            SpiTransaction::transaction_end(),
        ]);

        let mut as3935 = AS3935::new(spi);

        assert_eq!(as3935.read(0x01).await.unwrap(), 0x27);

        as3935.spi.done();
    }

    #[maybe_async::test(not(feature = "async"), async(feature = "async", tokio::test))]
    async fn write_is_one_framed_transaction() {
        let spi = SpiMock::new(&[
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x08, 0x07]),
            SpiTransaction::transaction_end(),
        ]);

        let mut as3935 = AS3935::new(spi);

        as3935.write(0x08, 0x07).await.unwrap();

        as3935.spi.done();
    }

    #[maybe_async::test(not(feature = "async"), async(feature = "async", tokio::test))]
    async fn field_read_masks_and_shifts() {
        let spi = SpiMock::new(&[
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x41]),
            SpiTransaction::read_vec(vec![0x76]),
            SpiTransaction::transaction_end(),
        ]);

        let mut as3935 = AS3935::new(spi);

        // 0x76 & 0x70 >> 4
        assert_eq!(as3935.nf_lev().read().await.unwrap(), 0x07);

        as3935.spi.done();
    }

    #[maybe_async::test(not(feature = "async"), async(feature = "async", tokio::test))]
    async fn field_write_preserves_neighbouring_fields() {
        let spi = SpiMock::new(&[
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x41]),
            SpiTransaction::read_vec(vec![0xA5]),
            SpiTransaction::transaction_end(),
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x01, 0xAC]),
            SpiTransaction::transaction_end(),
        ]);

        let mut as3935 = AS3935::new(spi);

        // The noise floor bits (0x70) and the reserved MSB of register 0x01
        // must survive a watchdog write.
        as3935.wdth().write(0x0C).await.unwrap();

        as3935.spi.done();
    }

    #[maybe_async::test(not(feature = "async"), async(feature = "async", tokio::test))]
    async fn field_write_truncates_oversized_values() {
        let spi = SpiMock::new(&[
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x42]),
            SpiTransaction::read_vec(vec![0x8F]),
            SpiTransaction::transaction_end(),
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x02, 0xBF]),
            SpiTransaction::transaction_end(),
        ]);

        let mut as3935 = AS3935::new(spi);

        // 0xFF is far wider than the 2-bit field; only the masked bits may
        // reach the register.
        as3935.min_num_ligh().write(0xFF).await.unwrap();

        as3935.spi.done();
    }

    #[maybe_async::test(not(feature = "async"), async(feature = "async", tokio::test))]
    async fn field_round_trip() {
        for value in 0..=0x07 {
            let reg = value << 4;
            let spi = SpiMock::new(&[
                SpiTransaction::transaction_start(),
                SpiTransaction::write_vec(vec![0x41]),
                SpiTransaction::read_vec(vec![0x00]),
                SpiTransaction::transaction_end(),
                SpiTransaction::transaction_start(),
                SpiTransaction::write_vec(vec![0x01, reg]),
                SpiTransaction::transaction_end(),
                SpiTransaction::transaction_start(),
                SpiTransaction::write_vec(vec![0x41]),
                SpiTransaction::read_vec(vec![reg]),
                SpiTransaction::transaction_end(),
            ]);

            let mut as3935 = AS3935::new(spi);

            as3935.nf_lev().write(value).await.unwrap();
            assert_eq!(as3935.nf_lev().read().await.unwrap(), value);

            as3935.spi.done();
        }
    }
}
