//! Driver crate for the AS3935 franklin lightning sensor
//!
//! The recommended way to use this driver is the [high-level interface]. If you
//! require a higher degree of flexibility, you can use the
//! [register-level interface] instead.
//!
//! This driver is built on top of [`embedded-hal`], which means it is portable
//! and can be used on any platform that implements the `embedded-hal` API.
//!
//! With the `async` cargo feature enabled (the default), every method that
//! touches the bus is `async` and bound to [`embedded-hal-async`]; without it
//! the same methods are plain blocking functions.
//!
//! [high-level interface]: hl/index.html
//! [register-level interface]: ll/index.html
//! [`embedded-hal`]: https://crates.io/crates/embedded-hal
//! [`embedded-hal-async`]: https://crates.io/crates/embedded-hal-async
#![cfg_attr(not(any(test, feature = "std")), no_main)]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "async")]
pub(crate) use maybe_async::must_be_async as maybe_async_attr;
#[cfg(not(feature = "async"))]
pub(crate) use maybe_async::must_be_sync as maybe_async_attr;

#[cfg(not(feature = "async"))]
pub(crate) use embedded_hal as spi_type;
#[cfg(feature = "async")]
pub(crate) use embedded_hal_async as spi_type;

pub mod configs;
pub mod hl;
pub mod ll;
pub mod time;

pub use crate::{
    configs::{Config, Event, Oscillator},
    hl::{Error, AS3935},
    time::Monotonic,
};
