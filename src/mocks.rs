use crate::registers::{
    field_bits, CanControl, CiCON, CiTEFCON, DataBitTimeConfig, DeviceId, ErrorCount, FifoControl, IoControl, NominalBitTimeConfig, Oscillator,
    Register, RxFifoControl, SingleRegister, TefControl, TransmitterDelayCompensation, TxQueueControl, OSC,
};
use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{Error, ErrorKind, ErrorType, Operation, SpiDevice};
use mockall::mock;

mock! {
    pub Delay {}

    impl DelayNs for Delay {
        fn delay_ns(&mut self, ns: u32);
    }
}

/// Delay recording every requested duration
#[derive(Default, Debug)]
pub struct RecordingDelay {
    pub delays_ns: Vec<u32>,
}

impl RecordingDelay {
    /// Number of delays with the given duration
    pub fn count(&self, ns: u32) -> usize {
        self.delays_ns.iter().filter(|delay| **delay == ns).count()
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delays_ns.push(ns);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SimulatedBusError;

impl Error for SimulatedBusError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Register access decoded from a frame
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Access {
    Reset,
    Read(u16, u32),
    Write(u16, u32),
}

/// Memory backed MCP2518FD simulation
pub struct SimulatedDevice {
    /// SFR and RAM words indexed by address / 4
    pub memory: [u32; 1024],

    /// Raw frames as clocked out by the host
    pub frames: Vec<Vec<u8>>,

    /// Word accesses in order of occurrence
    pub accesses: Vec<Access>,

    /// OSCRDY is reported
    pub oscillator_stable: bool,

    /// SCLKRDY is reported once OSC got written
    pub system_clock_stable: bool,

    /// PLLRDY is reported if the PLL is enabled
    pub pll_stable: bool,

    /// OPMOD follows REQOP on CiCON writes
    pub follow_mode_requests: bool,

    /// FRESET is cleared immediately on FIFO control writes
    pub fifo_reset_clears: bool,

    /// Number of CiCON reads still reporting the busy flag
    pub busy_reads: u32,

    /// Value returned on DEVID reads
    pub device_id: u32,

    /// Frames addressing this register fail
    pub failing_address: Option<u16>,

    /// OSC was written since the last reset
    pub clock_configured: bool,
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        let mut device = Self {
            memory: [0; 1024],
            frames: Vec::new(),
            accesses: Vec::new(),
            oscillator_stable: true,
            system_clock_stable: true,
            pll_stable: true,
            follow_mode_requests: true,
            fifo_reset_clears: true,
            busy_reads: 0,
            device_id: 0x18,
            failing_address: None,
            clock_configured: false,
        };

        device.load_reset_values();
        device
    }
}

impl SimulatedDevice {
    pub fn word(&self, address: u16) -> u32 {
        self.memory[(address as usize & 0xFFF) / 4]
    }

    pub fn set_word(&mut self, address: u16, value: u32) {
        self.memory[(address as usize & 0xFFF) / 4] = value;
    }

    /// All words written to the given address
    pub fn writes_to(&self, address: u16) -> Vec<u32> {
        self.accesses
            .iter()
            .filter_map(|access| match access {
                Access::Write(target, value) if *target == address => Some(*value),
                _ => None,
            })
            .collect()
    }

    /// Number of reads of the given address
    pub fn reads_of(&self, address: u16) -> usize {
        self.accesses
            .iter()
            .filter(|access| matches!(access, Access::Read(target, _) if *target == address))
            .count()
    }

    pub fn write_count(&self) -> usize {
        self.accesses.iter().filter(|access| matches!(access, Access::Write(..))).count()
    }

    /// Position of the first matching access
    pub fn position(&self, access: Access) -> Option<usize> {
        self.accesses.iter().position(|other| *other == access)
    }

    fn load_reset_values(&mut self) {
        self.memory = [0; 1024];

        self.set_word(CanControl::ADDRESS, CanControl::RESET);
        self.set_word(NominalBitTimeConfig::ADDRESS, NominalBitTimeConfig::RESET);
        self.set_word(DataBitTimeConfig::ADDRESS, DataBitTimeConfig::RESET);
        self.set_word(TransmitterDelayCompensation::ADDRESS, TransmitterDelayCompensation::RESET);
        self.set_word(ErrorCount::ADDRESS, ErrorCount::RESET);
        self.set_word(TefControl::ADDRESS, TefControl::RESET);
        self.set_word(TxQueueControl::ADDRESS, TxQueueControl::RESET);
        self.set_word(Oscillator::ADDRESS, Oscillator::RESET);
        self.set_word(IoControl::ADDRESS, IoControl::RESET);

        for channel in 1..32 {
            self.set_word(FifoControl::address(channel), RxFifoControl::RESET);
        }

        self.clock_configured = false;
    }

    fn is_fifo_control(address: u16) -> bool {
        let first = FifoControl::address(0);

        address == TefControl::ADDRESS || ((first..=FifoControl::address(31)).contains(&address) && (address - first) % 12 == 0)
    }

    fn read(&mut self, address: u16) -> u32 {
        let value = match address {
            0xE00 => {
                let stored = self.word(address) & !Oscillator::READ_ONLY;
                let mut value = stored;

                if self.oscillator_stable {
                    value |= field_bits(&OSC::OSCRDY);
                }
                if self.system_clock_stable && self.clock_configured {
                    value |= field_bits(&OSC::SCLKRDY);
                }
                if self.pll_stable && Oscillator::from_word(stored).is_set(OSC::PLLEN) {
                    value |= field_bits(&OSC::PLLRDY);
                }

                value
            }
            0x000 if self.busy_reads > 0 => {
                self.busy_reads -= 1;
                self.word(address) | field_bits(&CiCON::BUSY)
            }
            0xE14 => self.device_id,
            _ => self.word(address),
        };

        self.accesses.push(Access::Read(address, value));
        value
    }

    fn write(&mut self, address: u16, value: u32) {
        self.accesses.push(Access::Write(address, value));

        let stored = if address == CanControl::ADDRESS {
            let mode = if self.follow_mode_requests {
                CanControl::from_word(value).read(CiCON::REQOP)
            } else {
                CanControl::from_word(self.word(address)).read(CiCON::OPMOD)
            };

            (value & CanControl::WRITABLE) | (mode << CiCON::OPMOD.shift)
        } else if address == Oscillator::ADDRESS {
            self.clock_configured = true;
            value
        } else if address == DeviceId::ADDRESS {
            self.word(address)
        } else if Self::is_fifo_control(address) && self.fifo_reset_clears {
            value & !field_bits(&CiTEFCON::FRESET)
        } else {
            value
        };

        self.set_word(address, stored);
    }

    fn check(&self, address: u16) -> Result<(), SimulatedBusError> {
        if self.failing_address == Some(address) {
            return Err(SimulatedBusError);
        }

        Ok(())
    }

    fn address(header: &[u8]) -> u16 {
        (((header[0] & 0x0F) as u16) << 8) | header[1] as u16
    }
}

impl ErrorType for SimulatedDevice {
    type Error = SimulatedBusError;
}

impl SpiDevice<u8> for SimulatedDevice {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        let mut frame = Vec::new();
        let mut header: Option<u16> = None;

        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(data) if header.is_none() => {
                    let address = Self::address(data);
                    self.check(address)?;

                    header = Some(address);
                    frame.extend_from_slice(data);
                }
                Operation::Write(data) => {
                    frame.extend_from_slice(data);

                    if let Some(address) = header {
                        for (i, word) in data.chunks_exact(4).enumerate() {
                            let value = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
                            self.write(address + 4 * i as u16, value);
                        }
                    }
                }
                Operation::Read(data) => {
                    frame.extend(core::iter::repeat(0).take(data.len()));

                    if let Some(address) = header {
                        for (i, word) in data.chunks_exact_mut(4).enumerate() {
                            word.copy_from_slice(&self.read(address + 4 * i as u16).to_le_bytes());
                        }
                    }
                }
                _ => {}
            }
        }

        self.frames.push(frame);
        Ok(())
    }

    fn transfer_in_place(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        let address = Self::address(buf);
        self.check(address)?;
        self.frames.push(buf.to_vec());

        match buf[0] >> 4 {
            0x0 => {
                self.accesses.push(Access::Reset);
                self.load_reset_values();
            }
            0x2 => {
                for (i, word) in buf[2..].chunks_exact(4).enumerate() {
                    let value = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
                    self.write(address + 4 * i as u16, value);
                }
            }
            0x3 => {
                for (i, word) in buf[2..].chunks_exact_mut(4).enumerate() {
                    word.copy_from_slice(&self.read(address + 4 * i as u16).to_le_bytes());
                }
            }
            _ => {}
        }

        Ok(())
    }
}
