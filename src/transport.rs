//! # SPI framing
//!
//! Every transaction starts with a two byte command header: four instruction bits
//! followed by the twelve bit address. Register payloads are transmitted least
//! significant byte first.
//!
//! ```
//!# use mcp2518fd::transport::Transport;
//!# use mcp2518fd::example::ExampleSPIDevice;
//! let mut transport = Transport::new(ExampleSPIDevice::default());
//!
//! transport.write_reg(0x1F0, 0x0000_0123).unwrap();
//! assert_eq!(0x0000_0123, transport.read_reg(0x1F0).unwrap());
//! ```
use crate::registers::{RAM_END, RAM_START};
use byteorder::{ByteOrder, LittleEndian};
use core::fmt::{Debug, Formatter};
use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{Operation as SpiOperation, SpiDevice};
use log::debug;

/// Time the oscillator needs to restart after a reset instruction
const RESET_DELAY_MS: u32 = 2;

/// SPI instruction placed in the upper nibble of the first command byte
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    Reset = 0b0000,
    Write = 0b0010,
    Read = 0b0011,
    WriteCrc = 0b1010,
    ReadCrc = 0b1011,
    WriteSafe = 0b1100,
}

impl Instruction {
    /// Creates the two byte command header for the given register address
    pub fn header(self, address: u16) -> [u8; 2] {
        let command = (address & 0x0FFF) | ((self as u16) << 12);

        [(command >> 8) as u8, (command & 0xFF) as u8]
    }
}

pub enum SpiError<B: SpiDevice<u8>> {
    BusError(B::Error),
}

impl<B: SpiDevice<u8>> Debug for SpiError<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BusError(error) => f.debug_tuple("BusError").field(error).finish(),
        }
    }
}

impl<B: SpiDevice<u8>> PartialEq for SpiError<B> {
    fn eq(&self, other: &Self) -> bool {
        matches!((self, other), (Self::BusError(_), Self::BusError(_)))
    }
}

/// Errors of message RAM access
pub enum TransportError<B: SpiDevice<u8>> {
    /// SPI bus transfer error
    BusErr(SpiError<B>),
    /// Access outside of message RAM or not word aligned
    InvalidRamAddress(u16),
    /// Payload buffer length not a multiple of 4 bytes
    InvalidBufferSize(usize),
}

impl<B: SpiDevice<u8>> Debug for TransportError<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BusErr(error) => f.debug_tuple("BusErr").field(error).finish(),
            Self::InvalidRamAddress(address) => f.debug_tuple("InvalidRamAddress").field(address).finish(),
            Self::InvalidBufferSize(size) => f.debug_tuple("InvalidBufferSize").field(size).finish(),
        }
    }
}

impl<B: SpiDevice<u8>> PartialEq for TransportError<B> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::BusErr(a), Self::BusErr(b)) => a == b,
            (Self::InvalidRamAddress(a), Self::InvalidRamAddress(b)) => a == b,
            (Self::InvalidBufferSize(a), Self::InvalidBufferSize(b)) => a == b,
            _ => false,
        }
    }
}

impl<B: SpiDevice<u8>> From<SpiError<B>> for TransportError<B> {
    fn from(value: SpiError<B>) -> Self {
        TransportError::BusErr(value)
    }
}

/// Framing layer on top of a SPI device. Chip select is owned by the [SpiDevice], so each
/// method call is exactly one chip select cycle.
pub struct Transport<B: SpiDevice<u8>> {
    device: B,
}

impl<B: SpiDevice<u8>> Transport<B> {
    pub fn new(device: B) -> Self {
        Self { device }
    }

    /// Returns the underlying SPI device
    pub fn release(self) -> B {
        self.device
    }

    /// Resets all registers to their default values and waits for the oscillator to restart.
    /// Device is in configuration mode afterwards.
    pub fn reset<DL: DelayNs>(&mut self, delay: &mut DL) -> Result<(), SpiError<B>> {
        let mut buffer = Instruction::Reset.header(0x000);
        self.device.transfer_in_place(&mut buffer).map_err(SpiError::BusError)?;

        delay.delay_ms(RESET_DELAY_MS);
        Ok(())
    }

    /// 4-byte SFR read
    pub fn read_reg(&mut self, register: u16) -> Result<u32, SpiError<B>> {
        let mut buffer = [0u8; 6];
        buffer[..2].copy_from_slice(&Instruction::Read.header(register));

        self.device.transfer_in_place(&mut buffer).map_err(SpiError::BusError)?;

        Ok(LittleEndian::read_u32(&buffer[2..]))
    }

    /// 4-byte SFR write
    pub fn write_reg(&mut self, register: u16, value: u32) -> Result<(), SpiError<B>> {
        let mut buffer = [0u8; 6];
        buffer[..2].copy_from_slice(&Instruction::Write.header(register));
        LittleEndian::write_u32(&mut buffer[2..], value);

        self.device.transfer_in_place(&mut buffer).map_err(SpiError::BusError)?;

        Ok(())
    }

    /// Reads consecutive message RAM words starting at the given address
    pub fn read_ram(&mut self, address: u16, data: &mut [u8]) -> Result<(), TransportError<B>> {
        Self::verify_ram_access(address, data.len())?;

        let header = Instruction::Read.header(address);
        let mut operations = [SpiOperation::Write(&header), SpiOperation::Read(data)];
        self.device.transaction(&mut operations).map_err(SpiError::BusError)?;

        Ok(())
    }

    /// Writes consecutive message RAM words starting at the given address
    pub fn write_ram(&mut self, address: u16, data: &[u8]) -> Result<(), TransportError<B>> {
        Self::verify_ram_access(address, data.len())?;

        let header = Instruction::Write.header(address);
        let mut operations = [SpiOperation::Write(&header), SpiOperation::Write(data)];
        self.device.transaction(&mut operations).map_err(SpiError::BusError)?;

        Ok(())
    }

    /// Verify address within RAM bounds and word aligned
    fn verify_ram_access(address: u16, length: usize) -> Result<(), TransportError<B>> {
        if length % 4 != 0 {
            debug!("RAM access length {length} is not a multiple of 4");
            return Err(TransportError::InvalidBufferSize(length));
        }

        if address < RAM_START || address % 4 != 0 || address as usize + length > RAM_END as usize + 1 {
            debug!("RAM access at 0x{address:03X} with {length} bytes is out of bounds");
            return Err(TransportError::InvalidRamAddress(address));
        }

        Ok(())
    }
}
