//!# Bring-up plan
//! [BringUpPlan] describes everything the controller is configured with before it leaves
//! configuration mode: clock, bit timing, message RAM layout, filters and the target mode.
//!
//! ```
//!# use mcp2518fd::config::*;
//!# use mcp2518fd::status::OperationMode;
//! let fifos = [
//!     FifoConfiguration::receive(1, 8, PayloadSize::EightBytes),
//!     FifoConfiguration::transmit(2, 4, PayloadSize::SixtyFourBytes, 10),
//! ];
//!
//! let plan = BringUpPlan {
//!     mode: OperationMode::NormalCANFD,
//!     nominal_timing: NominalBitTiming::for_bit_rate(40_000_000, 1_000_000).unwrap(),
//!     data_timing: DataBitTiming::for_bit_rate(40_000_000, 4_000_000).unwrap(),
//!     fifos: &fifos,
//!     ..Default::default()
//! };
//!
//! assert!(plan.validate().is_ok());
//! ```
use crate::can::{ErrorKind, Fault, State};
use crate::filter::Filter;
use crate::ram::RamLayout;
use crate::registers::{
    CiDBTCFG, CiFIFOCON_RX, CiFIFOCON_TX, CiNBTCFG, CiTDC, CiTEFCON, CiTXQCON, DataBitTimeConfig, FifoControl,
    NominalBitTimeConfig, Oscillator, Register, RxFifoControl, TefControl, TransmitterDelayCompensation,
    TxFifoControl, TxQueueControl, OSC, RAM_SIZE,
};
use crate::status::OperationMode;
use bitflags::bitflags;
use log::debug;

/// Highest FIFO channel, channel 0 is the transmit queue
pub const MAX_FIFO_CHANNEL: u8 = 31;

/// Highest filter index
pub const MAX_FILTER_INDEX: u8 = 31;

/// Maximum number of messages per FIFO
pub const MAX_FIFO_DEPTH: u8 = 32;

/// Highest transmit priority
pub const MAX_TX_PRIORITY: u8 = 31;

/// Entire configuration applied during bring-up
#[derive(Clone, Debug)]
pub struct BringUpPlan<'a> {
    /// Operation mode requested once configuration is done
    pub mode: OperationMode,

    pub clock: ClockConfiguration,

    /// Bit timing of arbitration phase and CAN 2.0 frames
    pub nominal_timing: NominalBitTiming,

    /// Bit timing of the CAN FD data phase
    pub data_timing: DataBitTiming,

    /// Transmitter delay compensation mode
    pub tdc_mode: TdcMode,

    /// Transmit queue (channel 0), always enabled
    pub tx_queue: TxQueueConfiguration,

    /// Transmit event FIFO, transmitted messages are only stored if set
    pub tef: Option<TefConfiguration>,

    /// Receive and transmit FIFOs on channels 1..=31
    pub fifos: &'a [FifoConfiguration],

    pub filters: &'a [Filter],
}

impl Default for BringUpPlan<'_> {
    fn default() -> Self {
        Self {
            mode: OperationMode::NormalCANFD,
            clock: ClockConfiguration::default(),
            nominal_timing: NominalBitTiming::default(),
            data_timing: DataBitTiming::default(),
            tdc_mode: TdcMode::Automatic,
            tx_queue: TxQueueConfiguration::default(),
            tef: None,
            fifos: &[],
            filters: &[],
        }
    }
}

impl BringUpPlan<'_> {
    /// Checks the whole plan without touching the device.
    /// Faults are tagged with the bring-up state configuring the offending part.
    pub fn validate(&self) -> Result<(), Fault> {
        if !self.nominal_timing.is_valid() || !self.data_timing.is_valid() {
            debug!("Invalid bit timing: {:?} / {:?}", self.nominal_timing, self.data_timing);
            return Err(Fault::new(State::BitTimingCfg, ErrorKind::BadTiming));
        }

        self.validate_fifos()
            .map_err(|kind| Fault::new(State::FifoCfg, kind))?;

        self.validate_filters()
            .map_err(|kind| Fault::new(State::FilterCfg, kind))
    }

    /// Retransmission attempts are only honored if restricted in CiCON
    pub(crate) fn restricts_retransmission(&self) -> bool {
        self.tx_queue.attempts != RetransmissionAttempts::Unlimited
            || self.fifos.iter().any(|fifo| match fifo.mode {
                FifoMode::Transmit(options) => options.attempts != RetransmissionAttempts::Unlimited,
                FifoMode::Receive(_) => false,
            })
    }

    /// True if any filter matches on the 12th SID bit of CAN FD frames
    pub(crate) fn uses_sid11(&self) -> bool {
        self.filters.iter().any(|filter| filter.uses_sid11())
    }

    /// Bytes of message RAM required by TEF, TXQ and FIFO channels up to the highest configured
    /// one, including reset sized channels in between
    pub fn ram_footprint(&self) -> usize {
        self.ram_layout().total()
    }

    /// Message RAM regions assigned to TEF, TXQ and FIFOs
    pub fn ram_layout(&self) -> RamLayout {
        RamLayout::from_plan(self)
    }

    /// Returns the configuration of the given FIFO channel
    pub fn fifo(&self, channel: u8) -> Option<&FifoConfiguration> {
        self.fifos.iter().find(|fifo| fifo.channel == channel)
    }

    fn validate_fifos(&self) -> Result<(), ErrorKind> {
        let depths = self.fifos.iter().map(|fifo| fifo.depth);
        let depths = depths.chain(Some(self.tx_queue.depth)).chain(self.tef.map(|tef| tef.depth));

        for depth in depths {
            if depth == 0 || depth > MAX_FIFO_DEPTH {
                debug!("FIFO depth {depth} out of range");
                return Err(ErrorKind::BadFifoPlan);
            }
        }

        if self.tx_queue.priority > MAX_TX_PRIORITY {
            return Err(ErrorKind::BadFifoPlan);
        }

        let footprint = self.ram_footprint();
        if footprint > RAM_SIZE {
            debug!("FIFO plan requires {footprint} bytes of message RAM");
            return Err(ErrorKind::RamOverflow);
        }

        for (i, fifo) in self.fifos.iter().enumerate() {
            if fifo.channel == 0 || fifo.channel > MAX_FIFO_CHANNEL {
                debug!("FIFO channel {} out of range", fifo.channel);
                return Err(ErrorKind::BadFifoPlan);
            }

            if self.fifos[..i].iter().any(|other| other.channel == fifo.channel) {
                debug!("FIFO channel {} configured twice", fifo.channel);
                return Err(ErrorKind::BadFifoPlan);
            }

            if let FifoMode::Transmit(options) = fifo.mode {
                if options.priority > MAX_TX_PRIORITY {
                    return Err(ErrorKind::BadFifoPlan);
                }
            }
        }

        Ok(())
    }

    fn validate_filters(&self) -> Result<(), ErrorKind> {
        for (i, filter) in self.filters.iter().enumerate() {
            let target = filter.target_fifo();

            if self.filters[..i].iter().any(|other| other.index() == filter.index()) {
                debug!("Filter {} configured twice", filter.index());
                return Err(ErrorKind::BadFilterTarget);
            }

            let receives = matches!(self.fifo(target), Some(fifo) if fifo.mode.is_receive());
            if target == 0 || target > MAX_FIFO_CHANNEL || !receives {
                debug!("Filter {} targets FIFO {target} which is no receive FIFO", filter.index());
                return Err(ErrorKind::BadFilterTarget);
            }
        }

        Ok(())
    }
}

/// Oscillator/Clock configuration
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ClockConfiguration {
    /// Divisor for clock output
    pub clock_output: ClockOutputDivisor,

    /// Divisor for system clock
    pub system_clock: SystemClockDivisor,

    /// Disable clock/oscillator?
    pub disable_clock: bool,

    /// PLL configuration
    pub pll: PLLSetting,

    /// Enter low power mode when sleeping
    pub low_power: bool,
}

impl ClockConfiguration {
    /// Maps register values to configuration
    pub(crate) fn from_register(register: Oscillator) -> Self {
        Self {
            clock_output: ClockOutputDivisor::from_register(register.read(OSC::CLKODIV)),
            system_clock: SystemClockDivisor::from_register(register.read(OSC::SCLKDIV)),
            disable_clock: register.is_set(OSC::OSCDIS),
            pll: PLLSetting::from_register(register.read(OSC::PLLEN)),
            low_power: register.is_set(OSC::LPMEN),
        }
    }

    /// Encodes the configuration to register value
    pub(crate) fn as_register(&self) -> Oscillator {
        Oscillator::default().with(
            OSC::PLLEN.val(self.pll as u32)
                + OSC::OSCDIS.val(self.disable_clock as u32)
                + OSC::LPMEN.val(self.low_power as u32)
                + OSC::SCLKDIV.val(self.system_clock as u32)
                + OSC::CLKODIV.val(self.clock_output as u32),
        )
    }
}

/// Divisor for clock output
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum ClockOutputDivisor {
    DivideBy10 = 0b11,
    DivideBy4 = 0b10,
    DivideBy2 = 0b01,
    #[default]
    DivideBy1 = 0b00,
}

impl ClockOutputDivisor {
    pub(crate) fn from_register(bits: u32) -> Self {
        match bits {
            0b11 => Self::DivideBy10,
            0b10 => Self::DivideBy4,
            0b01 => Self::DivideBy2,
            _ => Self::DivideBy1,
        }
    }
}

/// Divisor for system clock
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum SystemClockDivisor {
    DivideBy2 = 0b1,
    #[default]
    DivideBy1 = 0b0,
}

impl SystemClockDivisor {
    pub(crate) fn from_register(bits: u32) -> Self {
        if bits != 0 {
            Self::DivideBy2
        } else {
            Self::DivideBy1
        }
    }
}

/// PLL configuration
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum PLLSetting {
    /// System clock from 10x PLL
    TenTimesPLL = 0b1,
    /// System clock comes directly from XTAL oscillator
    #[default]
    DirectXTALOscillator = 0b0,
}

impl PLLSetting {
    pub(crate) fn from_register(bits: u32) -> Self {
        if bits != 0 {
            Self::TenTimesPLL
        } else {
            Self::DirectXTALOscillator
        }
    }
}

/// Splits a bit time into `(brp, tseg1, tseg2)` register values with the sample point at ~80 %.
/// The smallest prescaler yielding an integral number of time quanta is used.
fn split_bit_time(sys_clk: u32, bit_rate: u32, max_tseg1: u32, max_tseg2: u32) -> Option<(u32, u32, u32)> {
    if bit_rate == 0 {
        return None;
    }

    for brp in 0..=255u64 {
        let divisor = (brp + 1) * bit_rate as u64;
        if sys_clk as u64 % divisor != 0 {
            continue;
        }

        let quanta = (sys_clk as u64 / divisor) as u32;
        if quanta < 4 {
            return None;
        }

        let tseg2 = (quanta + 2) / 5;
        let tseg1 = quanta - 1 - tseg2;

        if tseg1 - 1 <= max_tseg1 && tseg2 - 1 <= max_tseg2 {
            return Some((brp as u32, tseg1 - 1, tseg2 - 1));
        }
    }

    None
}

/// Nominal bit timing in register representation (all values are one less than the
/// number of time quanta)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NominalBitTiming {
    pub brp: u8,
    pub tseg1: u8,
    pub tseg2: u8,
    pub sjw: u8,
}

impl Default for NominalBitTiming {
    /// 500 kbit/s at 40 MHz system clock
    fn default() -> Self {
        Self {
            brp: 0,
            tseg1: 62,
            tseg2: 15,
            sjw: 15,
        }
    }
}

impl NominalBitTiming {
    /// Calculates timing for the given system clock and bit rate, both in Hz
    pub fn for_bit_rate(sys_clk: u32, bit_rate: u32) -> Option<Self> {
        let (brp, tseg1, tseg2) = split_bit_time(sys_clk, bit_rate, 255, 127)?;

        Some(Self {
            brp: brp as u8,
            tseg1: tseg1 as u8,
            tseg2: tseg2 as u8,
            sjw: tseg2 as u8,
        })
    }

    pub fn is_valid(&self) -> bool {
        let sjw_limit = (self.tseg1 as u16 + 1).min(self.tseg2 as u16);

        self.tseg2 <= 127 && self.sjw as u16 <= sjw_limit
    }

    pub(crate) fn as_register(&self) -> NominalBitTimeConfig {
        NominalBitTimeConfig::default().with(
            CiNBTCFG::BRP.val(self.brp as u32)
                + CiNBTCFG::TSEG1.val(self.tseg1 as u32)
                + CiNBTCFG::TSEG2.val(self.tseg2 as u32)
                + CiNBTCFG::SJW.val(self.sjw as u32),
        )
    }
}

/// Data phase bit timing in register representation
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DataBitTiming {
    pub brp: u8,
    pub tseg1: u8,
    pub tseg2: u8,
    pub sjw: u8,
}

impl Default for DataBitTiming {
    /// 2 Mbit/s at 40 MHz system clock
    fn default() -> Self {
        Self {
            brp: 0,
            tseg1: 14,
            tseg2: 3,
            sjw: 3,
        }
    }
}

impl DataBitTiming {
    /// Calculates timing for the given system clock and data bit rate, both in Hz
    pub fn for_bit_rate(sys_clk: u32, bit_rate: u32) -> Option<Self> {
        let (brp, tseg1, tseg2) = split_bit_time(sys_clk, bit_rate, 31, 15)?;

        Some(Self {
            brp: brp as u8,
            tseg1: tseg1 as u8,
            tseg2: tseg2 as u8,
            sjw: tseg2 as u8,
        })
    }

    pub fn is_valid(&self) -> bool {
        let sjw_limit = (self.tseg1 as u16 + 1).min(self.tseg2 as u16);

        self.tseg1 <= 31 && self.tseg2 <= 15 && self.sjw as u16 <= sjw_limit
    }

    /// Transmitter delay compensation offset: data sample point in system clocks, capped to
    /// the largest positive TDCO value
    pub fn tdc_offset(&self) -> u8 {
        let offset = (self.tseg1 as u16 + 1) * (self.brp as u16 + 1);
        offset.min(63) as u8
    }

    pub(crate) fn as_register(&self) -> DataBitTimeConfig {
        DataBitTimeConfig::default().with(
            CiDBTCFG::BRP.val(self.brp as u32)
                + CiDBTCFG::TSEG1.val(self.tseg1 as u32)
                + CiDBTCFG::TSEG2.val(self.tseg2 as u32)
                + CiDBTCFG::SJW.val(self.sjw as u32),
        )
    }
}

/// Transmitter delay compensation mode
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TdcMode {
    Disabled = 0b00,
    Manual = 0b01,
    Automatic = 0b10,
}

impl TdcMode {
    pub(crate) fn as_register(&self, timing: &DataBitTiming, sid11: bool) -> TransmitterDelayCompensation {
        TransmitterDelayCompensation::default().with(
            CiTDC::TDCMOD.val(*self as u32)
                + CiTDC::TDCO.val(timing.tdc_offset() as u32)
                + CiTDC::SID11EN.val(sid11 as u32),
        )
    }
}

/// Payload size of a FIFO message object
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PayloadSize {
    EightBytes = 0b000,
    TwelveBytes = 0b001,
    SixteenBytes = 0b010,
    TwentyBytes = 0b011,
    TwentyFourBytes = 0b100,
    ThirtyTwoBytes = 0b101,
    FortyEightBytes = 0b110,
    SixtyFourBytes = 0b111,
}

impl PayloadSize {
    /// Number of payload bytes
    pub fn bytes(&self) -> usize {
        match self {
            Self::EightBytes => 8,
            Self::TwelveBytes => 12,
            Self::SixteenBytes => 16,
            Self::TwentyBytes => 20,
            Self::TwentyFourBytes => 24,
            Self::ThirtyTwoBytes => 32,
            Self::FortyEightBytes => 48,
            Self::SixtyFourBytes => 64,
        }
    }
}

/// Retransmission attempts, only used if retransmission is restricted
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RetransmissionAttempts {
    Disabled = 0b00,
    Three = 0b01,
    Unlimited = 0b11,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RxInterrupts(u8);

bitflags! {
    impl RxInterrupts: u8 {
        const NOT_EMPTY = 1 << 0;
        const HALF_FULL = 1 << 1;
        const FULL = 1 << 2;
        const OVERFLOW = 1 << 3;
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TxInterrupts(u8);

bitflags! {
    impl TxInterrupts: u8 {
        const NOT_FULL = 1 << 0;
        const HALF_EMPTY = 1 << 1;
        const EMPTY = 1 << 2;
        const ATTEMPTS_EXHAUSTED = 1 << 4;
    }
}

/// Receive specific FIFO options
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RxOptions {
    /// Store a 32-bit time stamp with every received message
    pub timestamp: bool,
    pub interrupts: RxInterrupts,
}

/// Transmit specific FIFO options
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TxOptions {
    /// Message transmit priority, 31 is highest
    pub priority: u8,
    pub attempts: RetransmissionAttempts,
    /// Answer remote transmission requests automatically
    pub auto_rtr: bool,
    pub interrupts: TxInterrupts,
}

impl Default for TxOptions {
    fn default() -> Self {
        Self {
            priority: 0,
            attempts: RetransmissionAttempts::Unlimited,
            auto_rtr: false,
            interrupts: TxInterrupts::empty(),
        }
    }
}

/// Direction of a FIFO together with its direction specific options
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FifoMode {
    Receive(RxOptions),
    Transmit(TxOptions),
}

impl FifoMode {
    pub fn is_receive(&self) -> bool {
        matches!(self, Self::Receive(_))
    }
}

/// FIFO configuration of channels 1..=31
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FifoConfiguration {
    pub channel: u8,
    /// Number of message objects (1-32)
    pub depth: u8,
    pub payload: PayloadSize,
    pub mode: FifoMode,
}

impl FifoConfiguration {
    /// Receive FIFO without time stamps and interrupts
    pub fn receive(channel: u8, depth: u8, payload: PayloadSize) -> Self {
        Self {
            channel,
            depth,
            payload,
            mode: FifoMode::Receive(RxOptions::default()),
        }
    }

    /// Transmit FIFO with unlimited retransmission attempts
    pub fn transmit(channel: u8, depth: u8, payload: PayloadSize, priority: u8) -> Self {
        Self {
            channel,
            depth,
            payload,
            mode: FifoMode::Transmit(TxOptions {
                priority,
                ..Default::default()
            }),
        }
    }

    /// Size of a single message object in RAM
    pub fn object_size(&self) -> usize {
        let timestamp = match self.mode {
            FifoMode::Receive(options) if options.timestamp => 4,
            _ => 0,
        };

        8 + timestamp + self.payload.bytes()
    }

    /// Encodes the configuration to the direction specific CiFIFOCON layout.
    /// FIFO reset is requested in the same write.
    pub(crate) fn as_register(&self) -> FifoControl {
        match self.mode {
            FifoMode::Receive(options) => {
                let irq = options.interrupts;

                FifoControl::Rx(RxFifoControl::default().with(
                    CiFIFOCON_RX::TXEN::CLEAR
                        + CiFIFOCON_RX::FSIZE.val((self.depth - 1) as u32)
                        + CiFIFOCON_RX::PLSIZE.val(self.payload as u32)
                        + CiFIFOCON_RX::RXTSEN.val(options.timestamp as u32)
                        + CiFIFOCON_RX::TFNRFNIE.val(irq.contains(RxInterrupts::NOT_EMPTY) as u32)
                        + CiFIFOCON_RX::TFHRFHIE.val(irq.contains(RxInterrupts::HALF_FULL) as u32)
                        + CiFIFOCON_RX::TFERFFIE.val(irq.contains(RxInterrupts::FULL) as u32)
                        + CiFIFOCON_RX::RXOVIE.val(irq.contains(RxInterrupts::OVERFLOW) as u32)
                        + CiFIFOCON_RX::FRESET::SET,
                ))
            }
            FifoMode::Transmit(options) => {
                let irq = options.interrupts;

                FifoControl::Tx(TxFifoControl::default().with(
                    CiFIFOCON_TX::TXEN::SET
                        + CiFIFOCON_TX::FSIZE.val((self.depth - 1) as u32)
                        + CiFIFOCON_TX::PLSIZE.val(self.payload as u32)
                        + CiFIFOCON_TX::TXPRI.val(options.priority as u32)
                        + CiFIFOCON_TX::TXAT.val(options.attempts as u32)
                        + CiFIFOCON_TX::RTREN.val(options.auto_rtr as u32)
                        + CiFIFOCON_TX::TFNRFNIE.val(irq.contains(TxInterrupts::NOT_FULL) as u32)
                        + CiFIFOCON_TX::TFHRFHIE.val(irq.contains(TxInterrupts::HALF_EMPTY) as u32)
                        + CiFIFOCON_TX::TFERFFIE.val(irq.contains(TxInterrupts::EMPTY) as u32)
                        + CiFIFOCON_TX::TXATIE.val(irq.contains(TxInterrupts::ATTEMPTS_EXHAUSTED) as u32)
                        + CiFIFOCON_TX::FRESET::SET,
                ))
            }
        }
    }
}

/// Transmit queue configuration (channel 0)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TxQueueConfiguration {
    pub depth: u8,
    pub payload: PayloadSize,
    pub priority: u8,
    pub attempts: RetransmissionAttempts,
    /// Half empty interrupt is not available for the transmit queue
    pub interrupts: TxInterrupts,
}

impl Default for TxQueueConfiguration {
    fn default() -> Self {
        Self {
            depth: 1,
            payload: PayloadSize::EightBytes,
            priority: 0,
            attempts: RetransmissionAttempts::Unlimited,
            interrupts: TxInterrupts::empty(),
        }
    }
}

impl TxQueueConfiguration {
    /// Size of a single message object in RAM
    pub fn object_size(&self) -> usize {
        8 + self.payload.bytes()
    }

    pub(crate) fn as_register(&self) -> TxQueueControl {
        let irq = self.interrupts;

        TxQueueControl::default().with(
            CiTXQCON::TXEN::SET
                + CiTXQCON::FSIZE.val((self.depth - 1) as u32)
                + CiTXQCON::PLSIZE.val(self.payload as u32)
                + CiTXQCON::TXPRI.val(self.priority as u32)
                + CiTXQCON::TXAT.val(self.attempts as u32)
                + CiTXQCON::TXQNIE.val(irq.contains(TxInterrupts::NOT_FULL) as u32)
                + CiTXQCON::TXQEIE.val(irq.contains(TxInterrupts::EMPTY) as u32)
                + CiTXQCON::TXATIE.val(irq.contains(TxInterrupts::ATTEMPTS_EXHAUSTED) as u32)
                + CiTXQCON::FRESET::SET,
        )
    }
}

/// Transmit event FIFO configuration
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TefConfiguration {
    pub depth: u8,
    /// Store a 32-bit time stamp with every event
    pub timestamp: bool,
    pub interrupts: RxInterrupts,
}

impl Default for TefConfiguration {
    fn default() -> Self {
        Self {
            depth: 1,
            timestamp: false,
            interrupts: RxInterrupts::empty(),
        }
    }
}

impl TefConfiguration {
    /// Size of a single event object in RAM
    pub fn object_size(&self) -> usize {
        8 + if self.timestamp { 4 } else { 0 }
    }

    pub(crate) fn as_register(&self) -> TefControl {
        let irq = self.interrupts;

        TefControl::default().with(
            CiTEFCON::FSIZE.val((self.depth - 1) as u32)
                + CiTEFCON::TEFTSEN.val(self.timestamp as u32)
                + CiTEFCON::TEFNEIE.val(irq.contains(RxInterrupts::NOT_EMPTY) as u32)
                + CiTEFCON::TEFHIE.val(irq.contains(RxInterrupts::HALF_FULL) as u32)
                + CiTEFCON::TEFFIE.val(irq.contains(RxInterrupts::FULL) as u32)
                + CiTEFCON::TEFOVIE.val(irq.contains(RxInterrupts::OVERFLOW) as u32)
                + CiTEFCON::FRESET::SET,
        )
    }
}
