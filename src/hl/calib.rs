use embedded_hal::digital;

use crate::{
    configs::Oscillator,
    ll, maybe_async_attr, spi_type,
    time::{Duration, Monotonic},
    Error, AS3935,
};

/// Value written to a whole-byte command register to trigger its action
const DIRECT_COMMAND: u8 = 0x96;

/// Deadline for both oscillators to report calibration done
const CALIBRATION_TIMEOUT: Duration = Duration::from_millis(1000);

/// Settle time for the SRCO display toggle during wake-up
const WAKE_SETTLE_US: u32 = 2_000;

impl<SPI, IRQ> AS3935<SPI, IRQ>
where
    SPI: spi_type::spi::SpiDevice<u8>,
    IRQ: digital::ErrorType,
{
    /// Calibrates the two internal RC oscillators
    ///
    /// Required after the chip is powered back up from its low-power state;
    /// [`wake_up`] runs it automatically. Writes the direct command once,
    /// then polls the done flag of each oscillator until both are set in the
    /// same pass or one second of `clock` time has elapsed, and finally
    /// checks the two failure flags.
    ///
    /// Neither error outcome is fatal. The trigger is safe to repeat, so the
    /// caller may simply call this method again. The loop holds the bus and
    /// the calling thread for up to the full deadline; it cannot be
    /// cancelled from the outside.
    ///
    /// [`wake_up`]: #method.wake_up
    #[maybe_async_attr]
    pub async fn calibrate_clocks<M>(&mut self, clock: &mut M) -> Result<(), Error<SPI, IRQ>>
    where
        M: Monotonic,
    {
        self.ll.write(ll::CALIB_RCO.addr, DIRECT_COMMAND).await?;

        let started = clock.now();
        loop {
            let trco_done = self.ll.trco_calib_done().read().await? != 0;
            let srco_done = self.ll.srco_calib_done().read().await? != 0;

            if trco_done && srco_done {
                break;
            }

            // Checked after the flag reads, so the poll that was in flight
            // when the deadline passed still counts.
            if clock.now().duration_since(started) > CALIBRATION_TIMEOUT {
                return Err(Error::CalibrationTimeout);
            }
        }

        let trco_nok = self.ll.trco_calib_nok().read().await? != 0;
        let srco_nok = self.ll.srco_calib_nok().read().await? != 0;

        match (trco_nok, srco_nok) {
            (false, false) => Ok(()),
            (true, false) => Err(Error::CalibrationFailed(Oscillator::Trco)),
            (false, true) => Err(Error::CalibrationFailed(Oscillator::Srco)),
            (true, true) => Err(Error::CalibrationFailed(Oscillator::Both)),
        }
    }

    /// Returns whether the unit is powered down
    #[maybe_async_attr]
    pub async fn is_powered_down(&mut self) -> Result<bool, Error<SPI, IRQ>> {
        Ok(self.ll.pwd().read().await? != 0)
    }

    /// Puts the unit into its low-power state
    ///
    /// The registers keep their contents, but the RC oscillators stop and
    /// must be recalibrated on wake-up.
    #[maybe_async_attr]
    pub async fn enter_power_down(&mut self) -> Result<(), Error<SPI, IRQ>> {
        Ok(self.ll.pwd().write(1).await?)
    }

    /// Wakes the unit up from its low-power state
    ///
    /// Follows the datasheet's wake-up sequence: clear the power-down flag,
    /// recalibrate the RC oscillators, then route the SRCO clock to the IRQ
    /// pin for 2 ms before handing the pin back to interrupt duty. Does
    /// nothing if the unit is already awake.
    #[maybe_async_attr]
    pub async fn wake_up<M, D>(
        &mut self,
        clock: &mut M,
        delay: &mut D,
    ) -> Result<(), Error<SPI, IRQ>>
    where
        M: Monotonic,
        D: spi_type::delay::DelayNs,
    {
        if !self.is_powered_down().await? {
            return Ok(());
        }

        self.ll.pwd().write(0).await?;
        self.calibrate_clocks(clock).await?;

        self.set_output_srco(true).await?;
        delay.delay_us(WAKE_SETTLE_US).await;
        self.set_output_srco(false).await?;

        Ok(())
    }

    /// Resets all settings to their factory defaults
    #[maybe_async_attr]
    pub async fn reset(&mut self) -> Result<(), Error<SPI, IRQ>> {
        Ok(self.ll.write(ll::PRESET_DEFAULT.addr, DIRECT_COMMAND).await?)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use embedded_hal_mock::eh1::{
        delay::NoopDelay,
        digital::Mock as PinMock,
        spi::{Mock as SpiMock, Transaction as SpiTransaction},
    };

    use crate::time::Instant;

    /// A clock that advances by a fixed step on every reading
    struct FakeClock {
        now: u64,
        step: u64,
    }

    impl FakeClock {
        fn with_step(step: u64) -> Self {
            FakeClock { now: 0, step }
        }
    }

    impl Monotonic for FakeClock {
        fn now(&mut self) -> Instant {
            let now = Instant::from_micros(self.now);
            self.now += self.step;
            now
        }
    }

    fn sensor(expectations: &[SpiTransaction<u8>]) -> AS3935<SpiMock<u8>, PinMock> {
        AS3935::new(SpiMock::new(expectations), PinMock::new(&[]))
    }

    fn finish(sensor: AS3935<SpiMock<u8>, PinMock>) {
        let (mut spi, mut irq) = sensor.free();
        spi.done();
        irq.done();
    }

    fn trigger_write() -> [SpiTransaction<u8>; 3] {
        [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x3D, 0x96]),
            SpiTransaction::transaction_end(),
        ]
    }

    fn flag_read(command: u8, value: u8) -> [SpiTransaction<u8>; 4] {
        [
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![command]),
            SpiTransaction::read_vec(vec![value]),
            SpiTransaction::transaction_end(),
        ]
    }

    #[maybe_async::test(not(feature = "async"), async(feature = "async", tokio::test))]
    async fn calibration_succeeds_once_both_oscillators_report_done() {
        let mut expectations = Vec::new();
        expectations.extend(trigger_write());
        // First poll: neither oscillator is done yet.
        expectations.extend(flag_read(0x7A, 0x00));
        expectations.extend(flag_read(0x7B, 0x00));
        // Second poll: both report done in the same pass.
        expectations.extend(flag_read(0x7A, 0x80));
        expectations.extend(flag_read(0x7B, 0x80));
        // Neither failure flag is set.
        expectations.extend(flag_read(0x7A, 0x00));
        expectations.extend(flag_read(0x7B, 0x00));

        let mut sensor = sensor(&expectations);
        let mut clock = FakeClock::with_step(1000);

        sensor.calibrate_clocks(&mut clock).await.unwrap();

        finish(sensor);
    }

    #[maybe_async::test(not(feature = "async"), async(feature = "async", tokio::test))]
    async fn calibration_times_out_against_the_monotonic_clock() {
        let mut expectations = Vec::new();
        expectations.extend(trigger_write());
        expectations.extend(flag_read(0x7A, 0x00));
        expectations.extend(flag_read(0x7B, 0x00));

        let mut sensor = sensor(&expectations);
        // Each reading advances the clock by two seconds, so the deadline
        // has passed right after the first pair of flag reads.
        let mut clock = FakeClock::with_step(2_000_000);

        assert!(matches!(
            sensor.calibrate_clocks(&mut clock).await,
            Err(Error::CalibrationTimeout)
        ));

        finish(sensor);
    }

    #[maybe_async::test(not(feature = "async"), async(feature = "async", tokio::test))]
    async fn calibration_reports_the_failing_oscillator() {
        let cases = [
            (0x40, 0x00, Oscillator::Trco),
            (0x00, 0x40, Oscillator::Srco),
            (0x40, 0x40, Oscillator::Both),
        ];

        for (trco_nok, srco_nok, failing) in cases {
            let mut expectations = Vec::new();
            expectations.extend(trigger_write());
            expectations.extend(flag_read(0x7A, 0x80));
            expectations.extend(flag_read(0x7B, 0x80));
            expectations.extend(flag_read(0x7A, trco_nok));
            expectations.extend(flag_read(0x7B, srco_nok));

            let mut sensor = sensor(&expectations);
            let mut clock = FakeClock::with_step(1000);

            assert!(matches!(
                sensor.calibrate_clocks(&mut clock).await,
                Err(Error::CalibrationFailed(oscillator)) if oscillator == failing
            ));

            finish(sensor);
        }
    }

    #[maybe_async::test(not(feature = "async"), async(feature = "async", tokio::test))]
    async fn wake_up_runs_the_datasheet_sequence() {
        let mut expectations = Vec::new();
        // Power-down flag is set, indoor gain in the neighbouring bits.
        expectations.extend(flag_read(0x40, 0x25));
        // Clearing the flag preserves the front-end gain bits.
        expectations.extend(flag_read(0x40, 0x25));
        expectations.extend([
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x00, 0x24]),
            SpiTransaction::transaction_end(),
        ]);
        // Calibration runs to completion.
        expectations.extend(trigger_write());
        expectations.extend(flag_read(0x7A, 0x80));
        expectations.extend(flag_read(0x7B, 0x80));
        expectations.extend(flag_read(0x7A, 0x00));
        expectations.extend(flag_read(0x7B, 0x00));
        // SRCO goes out on the IRQ pin for the settle time.
        expectations.extend(flag_read(0x48, 0x00));
        expectations.extend([
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x08, 0x40]),
            SpiTransaction::transaction_end(),
        ]);
        expectations.extend(flag_read(0x48, 0x40));
        expectations.extend([
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x08, 0x00]),
            SpiTransaction::transaction_end(),
        ]);

        let mut sensor = sensor(&expectations);
        let mut clock = FakeClock::with_step(1000);

        sensor
            .wake_up(&mut clock, &mut NoopDelay::new())
            .await
            .unwrap();

        finish(sensor);
    }

    #[maybe_async::test(not(feature = "async"), async(feature = "async", tokio::test))]
    async fn wake_up_does_nothing_while_awake() {
        let mut expectations = Vec::new();
        expectations.extend(flag_read(0x40, 0x00));

        let mut sensor = sensor(&expectations);
        let mut clock = FakeClock::with_step(1000);

        sensor
            .wake_up(&mut clock, &mut NoopDelay::new())
            .await
            .unwrap();

        finish(sensor);
    }

    #[maybe_async::test(not(feature = "async"), async(feature = "async", tokio::test))]
    async fn reset_writes_the_direct_command() {
        let mut sensor = sensor(&[
            SpiTransaction::transaction_start(),
            SpiTransaction::write_vec(vec![0x3C, 0x96]),
            SpiTransaction::transaction_end(),
        ]);

        sensor.reset().await.unwrap();

        finish(sensor);
    }
}
