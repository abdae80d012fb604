use crate::registers::{
    BusDiagnostic0, BusDiagnostic1, CanControl, CiBDIAG0, CiBDIAG1, CiCON, CiTREC, ErrorCount, Oscillator, Register, OSC,
};

///  Operation status read from CiCON register
#[derive(Copy, Clone, Debug)]
pub struct OperationStatus {
    /// Current operation mode
    pub mode: OperationMode,

    /// Mode requested last
    pub requested_mode: OperationMode,

    /// True if TXQ is enabled an reserves space in RAM
    pub txq_reserved: bool,

    /// True if transmitted messages are stored in TEF and RAM space is reserved
    pub store_transmit_event: bool,

    /// True => Transition to listen-only mode on system error bit
    /// False => Transition to restricted-operation mode on system error bit
    pub error_trans_listen_only_mode: bool,

    /// True => Restricted retransmission attempts. TXAT is used
    /// False => Unlimited number of retransmission attempts, TXAT will be ignored
    pub restrict_retransmission: bool,

    /// True while the CAN module is still processing a message or mode change
    pub busy: bool,
}

impl OperationStatus {
    pub(crate) fn from_register(register: CanControl) -> Self {
        Self {
            mode: register.operation_mode(),
            requested_mode: OperationMode::from_bits(register.read(CiCON::REQOP)),
            txq_reserved: register.is_set(CiCON::TXQEN),
            store_transmit_event: register.is_set(CiCON::STEF),
            error_trans_listen_only_mode: register.is_set(CiCON::SERR2LOM),
            restrict_retransmission: register.is_set(CiCON::RTXAT),
            busy: register.is_set(CiCON::BUSY),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OperationMode {
    /// Module is in normal CAN FD mode, supports mixing of CAN FDC can classic CAN 2.0 frames
    NormalCANFD = 0b000,
    /// Module is in sleep mode
    Sleep = 0b001,
    /// Module is in internal loopback mode
    InternalLoopback = 0b010,
    /// Module is in listen-only mode
    ListenOnly = 0b011,
    /// Module is in configuration mode
    Configuration = 0b100,
    /// Module is in external loopback mode
    ExternalLoopback = 0b101,
    /// Module is in normal CAN 2.0 mode, possible error frames on CAN FD frames
    NormalCAN2_0 = 0b110,
    /// Module is in restricted operation mode
    RestrictedOperation = 0b111,
}

impl OperationMode {
    /// Maps the three mode bits of OPMOD/REQOP
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0b111 {
            0b000 => Self::NormalCANFD,
            0b001 => Self::Sleep,
            0b010 => Self::InternalLoopback,
            0b011 => Self::ListenOnly,
            0b100 => Self::Configuration,
            0b101 => Self::ExternalLoopback,
            0b110 => Self::NormalCAN2_0,
            _ => Self::RestrictedOperation,
        }
    }
}

/// Oscillator status read from OSC register
#[derive(Copy, Clone, Debug)]
pub struct OscillatorStatus {
    /// Clock is running and stable
    pub sclk_ready: bool,

    /// Oscillator is running and stable
    pub clock_ready: bool,

    /// PLL is locked
    pub pll_ready: bool,
}

impl OscillatorStatus {
    pub(crate) fn from_register(register: Oscillator) -> Self {
        Self {
            sclk_ready: register.is_set(OSC::SCLKRDY),
            clock_ready: register.is_set(OSC::OSCRDY),
            pll_ready: register.is_set(OSC::PLLRDY),
        }
    }
}

/// Fault confinement state derived from CiTREC
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorState {
    Active,
    Warning,
    Passive,
    BusOff,
}

/// Error counters read from CiTREC register
#[derive(Copy, Clone, Debug)]
pub struct ErrorCounters {
    pub rx_errors: u8,
    pub tx_errors: u8,
    pub state: ErrorState,
}

impl ErrorCounters {
    pub(crate) fn from_register(register: ErrorCount) -> Self {
        let state = if register.is_set(CiTREC::TXBO) {
            ErrorState::BusOff
        } else if register.is_set(CiTREC::TXBP) || register.is_set(CiTREC::RXBP) {
            ErrorState::Passive
        } else if register.is_set(CiTREC::EWARN) {
            ErrorState::Warning
        } else {
            ErrorState::Active
        };

        Self {
            rx_errors: register.read(CiTREC::REC) as u8,
            tx_errors: register.read(CiTREC::TEC) as u8,
            state,
        }
    }
}

/// Bus diagnostics read from CiBDIAG0 and CiBDIAG1
#[derive(Copy, Clone, Debug)]
pub struct BusDiagnostics {
    pub nominal_rx_errors: u8,
    pub nominal_tx_errors: u8,
    pub data_rx_errors: u8,
    pub data_tx_errors: u8,

    /// Messages received or transmitted without error since last error
    pub error_free_messages: u16,

    /// Any nominal bit rate error flag (bit0, bit1, ack, form, stuff, crc) is set
    pub nominal_error: bool,

    /// Any data bit rate error flag is set
    pub data_error: bool,

    /// Device went bus-off
    pub bus_off: bool,
}

impl BusDiagnostics {
    pub(crate) fn from_registers(counters: BusDiagnostic0, flags: BusDiagnostic1) -> Self {
        let nominal = [
            CiBDIAG1::NBIT0ERR,
            CiBDIAG1::NBIT1ERR,
            CiBDIAG1::NACKERR,
            CiBDIAG1::NFORMERR,
            CiBDIAG1::NSTUFERR,
            CiBDIAG1::NCRCERR,
        ];
        let data = [
            CiBDIAG1::DBIT0ERR,
            CiBDIAG1::DBIT1ERR,
            CiBDIAG1::DACKERR,
            CiBDIAG1::DFORMERR,
            CiBDIAG1::DSTUFERR,
            CiBDIAG1::DCRCERR,
        ];

        Self {
            nominal_rx_errors: counters.read(CiBDIAG0::NRERRCNT) as u8,
            nominal_tx_errors: counters.read(CiBDIAG0::NTERRCNT) as u8,
            data_rx_errors: counters.read(CiBDIAG0::DRERRCNT) as u8,
            data_tx_errors: counters.read(CiBDIAG0::DTERRCNT) as u8,
            error_free_messages: flags.read(CiBDIAG1::EFMSGCNT) as u16,
            nominal_error: nominal.into_iter().any(|field| flags.is_set(field)),
            data_error: data.into_iter().any(|field| flags.is_set(field)),
            bus_off: flags.is_set(CiBDIAG1::TXBOERR),
        }
    }
}
