//! # Mock dummy structure for doc examples
//!
//! [ExampleSPIDevice] keeps all registers in memory and behaves like an idle MCP2518FD:
//! clocks are always ready, mode requests are acknowledged immediately and FIFO resets
//! complete instantly.
use crate::registers::{
    field_bits, CanControl, CiCON, CiTEFCON, DataBitTimeConfig, DeviceId, ErrorCount, FifoControl, IoControl, NominalBitTimeConfig, Oscillator,
    Register, RxFifoControl, SingleRegister, TefControl, TransmitterDelayCompensation, TxQueueControl, OSC,
};
use core::convert::Infallible;
use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{ErrorType, Operation, SpiDevice};

/// Number of 32-bit words in the 12-bit address space
const WORDS: usize = 0x1000 / 4;

/// Revision reported in DEVID
const REVISION: u32 = 0x4;

#[derive(Debug)]
pub struct ExampleSPIDevice {
    memory: [u32; WORDS],
}

impl Default for ExampleSPIDevice {
    fn default() -> Self {
        let mut device = Self { memory: [0; WORDS] };
        device.reset();
        device
    }
}

impl ExampleSPIDevice {
    fn reset(&mut self) {
        self.memory = [0; WORDS];

        self.set(CanControl::ADDRESS, CanControl::RESET);
        self.set(NominalBitTimeConfig::ADDRESS, NominalBitTimeConfig::RESET);
        self.set(DataBitTimeConfig::ADDRESS, DataBitTimeConfig::RESET);
        self.set(TransmitterDelayCompensation::ADDRESS, TransmitterDelayCompensation::RESET);
        self.set(ErrorCount::ADDRESS, ErrorCount::RESET);
        self.set(TefControl::ADDRESS, TefControl::RESET);
        self.set(TxQueueControl::ADDRESS, TxQueueControl::RESET);
        self.set(Oscillator::ADDRESS, Oscillator::RESET);
        self.set(IoControl::ADDRESS, IoControl::RESET);
        self.set(DeviceId::ADDRESS, (1 << 4) | REVISION);

        for channel in 1..32 {
            self.set(FifoControl::address(channel), RxFifoControl::RESET);
        }
    }

    fn get(&self, address: u16) -> u32 {
        self.memory[(address as usize & 0xFFF) / 4]
    }

    fn set(&mut self, address: u16, value: u32) {
        self.memory[(address as usize & 0xFFF) / 4] = value;
    }

    fn read(&self, address: u16) -> u32 {
        if address == Oscillator::ADDRESS {
            return self.get(address) | field_bits(&OSC::OSCRDY) | field_bits(&OSC::SCLKRDY);
        }

        self.get(address)
    }

    fn write(&mut self, address: u16, value: u32) {
        let first_fifo = FifoControl::address(0);
        let fifo_control = address == TefControl::ADDRESS
            || ((first_fifo..=FifoControl::address(31)).contains(&address) && (address - first_fifo) % 12 == 0);

        let value = if address == CanControl::ADDRESS {
            let mode = CanControl::from_word(value).read(CiCON::REQOP);
            (value & !field_bits(&CiCON::OPMOD)) | (mode << CiCON::OPMOD.shift)
        } else if fifo_control {
            value & !field_bits(&CiTEFCON::FRESET)
        } else {
            value
        };

        self.set(address, value);
    }

    fn address(header: &[u8]) -> u16 {
        (((header[0] & 0x0F) as u16) << 8) | header[1] as u16
    }

    fn read_words(&self, address: u16, data: &mut [u8]) {
        for (i, word) in data.chunks_exact_mut(4).enumerate() {
            word.copy_from_slice(&self.read(address + 4 * i as u16).to_le_bytes());
        }
    }

    fn write_words(&mut self, address: u16, data: &[u8]) {
        for (i, word) in data.chunks_exact(4).enumerate() {
            self.write(address + 4 * i as u16, u32::from_le_bytes([word[0], word[1], word[2], word[3]]));
        }
    }
}

impl ErrorType for ExampleSPIDevice {
    type Error = Infallible;
}

impl SpiDevice<u8> for ExampleSPIDevice {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        let mut address = None;

        for operation in operations.iter_mut() {
            match (operation, address) {
                (Operation::Write(data), None) if data.len() >= 2 => address = Some(Self::address(data)),
                (Operation::Write(data), Some(address)) => self.write_words(address, data),
                (Operation::Read(data), Some(address)) => self.read_words(address, data),
                _ => {}
            }
        }

        Ok(())
    }

    fn transfer_in_place(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        if buf.len() < 2 {
            return Ok(());
        }

        let address = Self::address(buf);
        match buf[0] >> 4 {
            0x0 => self.reset(),
            0x2 => self.write_words(address, &buf[2..]),
            0x3 => self.read_words(address, &mut buf[2..]),
            _ => {}
        }

        Ok(())
    }
}

/// Delay returning immediately
#[derive(Default, Debug)]
pub struct ExampleDelay {}

impl DelayNs for ExampleDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}
