#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]
#![allow(clippy::identity_op)]

//! # Bring-up driver for the MCP2518FD CAN FD controller
//!
//! Crate currently offers the following features:
//! * SPI framing of register and message RAM access on top of [embedded_hal::spi::SpiDevice]
//! * Typed register model with explicit field offsets and reserved-bit preservation
//! * Bring-up state machine from reset to the requested operation mode
//! * Validation of bit timing, message RAM layout and filters before touching the device
//! * no_std support
//!
//!## Bring-up example
//!
//!```
//!use mcp2518fd::example::{ExampleDelay, ExampleSPIDevice};
//!use mcp2518fd::can::MCP2518FD;
//!use mcp2518fd::filter::Filter;
//!use mcp2518fd::config::*;
//!use mcp2518fd::status::OperationMode;
//!use embedded_can::{Id, StandardId};
//!
//!let mut delay = ExampleDelay::default();
//!let mut controller = MCP2518FD::new(ExampleSPIDevice::default());
//!
//! // One receive FIFO with four 8-byte messages
//!let fifos = [FifoConfiguration::receive(1, 4, PayloadSize::EightBytes)];
//!
//! // Route standard ID 0x55 to FIFO 1
//!let mut filter = Filter::new(Id::Standard(StandardId::new(0x55).unwrap()), 0, 1).unwrap();
//!filter.match_standard_only();
//!let filters = [filter];
//!
//!let plan = BringUpPlan {
//!    mode: OperationMode::NormalCAN2_0,
//!    nominal_timing: NominalBitTiming::for_bit_rate(40_000_000, 500_000).unwrap(),
//!    fifos: &fifos,
//!    filters: &filters,
//!    ..Default::default()
//!};
//!
//!controller.init(&plan, &mut delay).unwrap();
//!
//!assert_eq!(OperationMode::NormalCAN2_0, controller.current_mode());
//!assert_eq!(Some(4), controller.device_revision());
//!```

pub mod can;
pub mod config;
pub mod example;
pub mod filter;
pub mod ram;
pub mod registers;
pub mod status;
pub mod transport;

#[cfg(test)]
pub(crate) mod mocks;
#[cfg(test)]
mod tests;
