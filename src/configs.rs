//! Configuration structs and enumerations for the sensor's settings
//!
//! This module houses the datastructures that describe how the sensing engine
//! is configured and what the interrupt register reports. A [`Config`] can be
//! applied in one go with [`AS3935::configure`].
//!
//! [`AS3935::configure`]: ../hl/struct.AS3935.html#method.configure

/// Strike-count thresholds supported by the hardware
///
/// The register stores the position of the threshold in this table, not the
/// threshold itself.
pub const STRIKE_COUNT_THRESHOLDS: [u8; 4] = [1, 5, 9, 16];

/// Antenna frequency division ratios supported by the hardware
///
/// The register stores the position of the ratio in this table, not the ratio
/// itself.
pub const FREQ_DIVISION_RATIOS: [u8; 4] = [16, 32, 64, 128];

/// Returns the register index of `value` within one of the lookup tables
///
/// The tables hold at most four entries, so a linear scan is all it takes.
pub(crate) fn index_in_table(table: &[u8], value: u8) -> Option<u8> {
    table.iter().position(|&entry| entry == value).map(|i| i as u8)
}

/// Sensing configuration
///
/// The defaults match the chip's power-on values.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Analogue front-end gain for indoor use. Set to `false` when the sensor
    /// is mounted outdoors.
    pub indoor: bool,
    /// Watchdog threshold, 0 to 10. Higher values reject more disturbers at
    /// the cost of sensitivity.
    pub watchdog: u8,
    /// Noise floor level, 0 to 7. Higher values tolerate more background
    /// noise.
    pub noise_floor_limit: u8,
    /// Spike rejection threshold, 0 to 11. Higher values reject more false
    /// triggers at the cost of sensitivity.
    pub spike_threshold: u8,
    /// Minimum number of strikes before an interrupt fires. One of 1, 5, 9
    /// or 16.
    pub strike_count_threshold: u8,
    /// Suppress interrupts for disturber events.
    pub disturber_masked: bool,
    /// Antenna frequency division ratio used during tuning. One of 16, 32,
    /// 64 or 128.
    pub freq_divisor: u8,
    /// Antenna tuning capacitance in pF, 0 to 120 in steps of 8.
    pub tuning_capacitance: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            indoor: true,
            watchdog: 2,
            noise_floor_limit: 2,
            spike_threshold: 2,
            strike_count_threshold: 1,
            disturber_masked: false,
            freq_divisor: 16,
            tuning_capacitance: 0,
        }
    }
}

/// Events reported by the interrupt register
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    /// The distance estimate changed after old strike data was purged
    DistanceChanged = 0x00,
    /// The noise level exceeds the configured noise floor; stays asserted
    /// while the noise remains
    NoiseHigh = 0x01,
    /// A disturber was detected
    Disturber = 0x04,
    /// A lightning strike was detected
    Lightning = 0x08,
}

impl Event {
    pub(crate) fn from_reg(value: u8) -> Self {
        match value {
            0x08 => Event::Lightning,
            0x04 => Event::Disturber,
            0x01 => Event::NoiseHigh,
            _ => Event::DistanceChanged,
        }
    }
}

/// Identifies the internal RC oscillator(s) that failed to calibrate
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Oscillator {
    /// The 1.1 MHz timer RC oscillator
    Trco,
    /// The 32.768 kHz system RC oscillator
    Srco,
    /// Both oscillators
    Both,
}
