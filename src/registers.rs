//! # Register model
//!
//! Typed views over the special function registers of the MCP2518FD. Every register is a
//! 32-bit word. Field layouts are declared with `tock_registers::register_bitfields!`, one
//! bitfield module per register named after the SFR (`CiCON`, `OSC`, ...), and the newtypes in
//! this module add reset values, access classes and addresses on top.
//!
//! Bits that are neither a writable nor a read-only field are *reserved*. [Register::with]
//! never touches them, so a value read from the device and written back keeps them as they were.
//!
//! ```
//!# use mcp2518fd::registers::{CanControl, CiCON, Register};
//! let control = CanControl::default().with(CiCON::TXQEN::SET + CiCON::ISOCRCEN::SET);
//!
//! assert_eq!(0, control.word() & CanControl::RESERVED);
//! assert!(control.is_set(CiCON::TXQEN));
//! ```
#![allow(unused_braces, unused_parens)]
use crate::status::OperationMode;
use modular_bitfield_msb::prelude::*;
use tock_registers::fields::{Field, FieldValue};
use tock_registers::{register_bitfields, LocalRegisterCopy, RegisterLongName};

/// First address of message RAM
pub const RAM_START: u16 = 0x400;

/// Size of message RAM in bytes
pub const RAM_SIZE: usize = 2048;

/// Last valid address of message RAM
pub const RAM_END: u16 = RAM_START + RAM_SIZE as u16 - 1;

/// Access class of a register field
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Access {
    /// Freely readable and writable
    ReadWrite,
    /// Driven by the device, writes are ignored
    ReadOnly,
    /// Set by the device, cleared by software
    Clearable,
}

impl Access {
    pub const fn is_writable(&self) -> bool {
        !matches!(self, Access::ReadOnly)
    }
}

/// Bits covered by the given field
pub const fn field_bits<R: RegisterLongName>(field: &Field<u32, R>) -> u32 {
    field.mask << field.shift
}

const fn mask_of<R: RegisterLongName>(fields: &[(Field<u32, R>, Access)], writable: bool) -> u32 {
    let mut mask = 0;
    let mut i = 0;

    while i < fields.len() {
        if fields[i].1.is_writable() == writable {
            mask |= field_bits(&fields[i].0);
        }
        i += 1;
    }

    mask
}

/// 32-bit register word with a typed field view
pub trait Register: Copy + Sized {
    /// Bitfield description generated by `register_bitfields!`
    type Bits: RegisterLongName + 'static;

    /// Value after power-on or reset instruction
    const RESET: u32;

    /// All named fields of the register with their access class
    const FIELDS: &'static [(Field<u32, Self::Bits>, Access)];

    /// Bits which may be changed by software
    const WRITABLE: u32 = mask_of(Self::FIELDS, true);

    /// Bits driven by the device
    const READ_ONLY: u32 = mask_of(Self::FIELDS, false);

    /// Unimplemented bits
    const RESERVED: u32 = !(Self::WRITABLE | Self::READ_ONLY);

    fn from_word(word: u32) -> Self;

    fn word(&self) -> u32;

    fn local(&self) -> LocalRegisterCopy<u32, Self::Bits> {
        LocalRegisterCopy::new(self.word())
    }

    /// Extracts the value of the given field
    fn read(&self, field: Field<u32, Self::Bits>) -> u32 {
        self.local().read(field)
    }

    fn is_set(&self, field: Field<u32, Self::Bits>) -> bool {
        self.local().is_set(field)
    }

    /// Updates the writable bits named by the field values, all other bits are kept
    fn with(self, value: FieldValue<u32, Self::Bits>) -> Self {
        let mut local = self.local();
        local.modify(value);

        Self::from_word((local.get() & Self::WRITABLE) | (self.word() & !Self::WRITABLE))
    }

    /// Word transmitted on register write. Read-only bits are sent as zero.
    fn encode(&self) -> u32 {
        self.word() & !Self::READ_ONLY
    }
}

/// Register with a single fixed address
pub trait SingleRegister: Register {
    const ADDRESS: u16;
}

/// Register layout repeated for every FIFO channel or filter
pub trait RepeatedRegister: Register {
    const BASE: u16;
    const STRIDE: u16;
    const COUNT: u8;

    /// Address of the instance with the given index
    fn address(index: u8) -> u16 {
        Self::BASE + Self::STRIDE * index as u16
    }
}

macro_rules! register {
    (
        $(#[$meta:meta])*
        $name:ident($bits:ident) = $reset:expr;
        $(
            $(#[$field_meta:meta])*
            $field:ident @ $offset:literal, $width:literal, $access:ident;
        )*
    ) => {
        register_bitfields![u32,
            $(#[$meta])*
            pub $bits [
                $(
                    $(#[$field_meta])*
                    $field OFFSET($offset) NUMBITS($width) []
                ),*
            ]
        ];

        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub struct $name(u32);

        impl Register for $name {
            type Bits = $bits::Register;

            const RESET: u32 = $reset;
            const FIELDS: &'static [(Field<u32, $bits::Register>, Access)] =
                &[$(($bits::$field, Access::$access)),*];

            fn from_word(word: u32) -> Self {
                Self(word)
            }

            fn word(&self) -> u32 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self($reset)
            }
        }
    };
}

macro_rules! single {
    ($name:ident, $address:expr) => {
        impl SingleRegister for $name {
            const ADDRESS: u16 = $address;
        }
    };
}

macro_rules! repeated {
    ($name:ident, $base:expr, $stride:expr, $count:expr) => {
        impl RepeatedRegister for $name {
            const BASE: u16 = $base;
            const STRIDE: u16 = $stride;
            const COUNT: u8 = $count;
        }
    };
}

register! {
    /// CiCON: CAN control register
    CanControl(CiCON) = 0x0498_0760;
    /// DeviceNet filter bit number
    DNCNT @ 0, 5, ReadWrite;
    /// ISO CRC enable
    ISOCRCEN @ 5, 1, ReadWrite;
    /// Protocol exception event detection disabled
    PXEDIS @ 6, 1, ReadWrite;
    /// Wake-up filter enable
    WAKFIL @ 8, 1, ReadWrite;
    /// Wake-up filter time
    WFT @ 9, 2, ReadWrite;
    /// CAN module is busy
    BUSY @ 11, 1, ReadOnly;
    /// Bit rate switching disable
    BRSDIS @ 12, 1, ReadWrite;
    /// Restrict retransmission attempts
    RTXAT @ 16, 1, ReadWrite;
    /// Transmit ESI in gateway mode
    ESIGM @ 17, 1, ReadWrite;
    /// Transition to listen-only mode on system error
    SERR2LOM @ 18, 1, ReadWrite;
    /// Store transmitted messages in TEF
    STEF @ 19, 1, ReadWrite;
    /// Enable transmit queue
    TXQEN @ 20, 1, ReadWrite;
    /// Current operation mode
    OPMOD @ 21, 3, ReadOnly;
    /// Requested operation mode
    REQOP @ 24, 3, ReadWrite;
    /// Abort all pending transmissions
    ABAT @ 27, 1, ReadWrite;
    /// Transmit bandwidth sharing delay
    TXBWS @ 28, 4, ReadWrite;
}
single!(CanControl, 0x000);

impl CanControl {
    /// Mode the device currently operates in
    pub fn operation_mode(&self) -> OperationMode {
        OperationMode::from_bits(self.read(CiCON::OPMOD))
    }

    /// Requests the given operation mode
    pub fn with_requested_mode(self, mode: OperationMode) -> Self {
        self.with(CiCON::REQOP.val(mode as u32))
    }
}

register! {
    /// CiNBTCFG: nominal bit time configuration
    NominalBitTimeConfig(CiNBTCFG) = 0x003E_0F0F;
    /// Synchronization jump width
    SJW @ 0, 7, ReadWrite;
    /// Time segment 2 (phase segment 2)
    TSEG2 @ 8, 7, ReadWrite;
    /// Time segment 1 (propagation segment + phase segment 1)
    TSEG1 @ 16, 8, ReadWrite;
    /// Baud rate prescaler
    BRP @ 24, 8, ReadWrite;
}
single!(NominalBitTimeConfig, 0x004);

register! {
    /// CiDBTCFG: data bit time configuration
    DataBitTimeConfig(CiDBTCFG) = 0x000E_0303;
    SJW @ 0, 4, ReadWrite;
    TSEG2 @ 8, 4, ReadWrite;
    TSEG1 @ 16, 5, ReadWrite;
    BRP @ 24, 8, ReadWrite;
}
single!(DataBitTimeConfig, 0x008);

register! {
    /// CiTDC: transmitter delay compensation
    TransmitterDelayCompensation(CiTDC) = 0x0002_1000;
    /// Measured delay
    TDCV @ 0, 6, ReadOnly;
    /// Offset, two's complement
    TDCO @ 8, 7, ReadWrite;
    /// Compensation mode
    TDCMOD @ 16, 2, ReadWrite;
    /// Enable 12-bit SID in CAN FD base format
    SID11EN @ 24, 1, ReadWrite;
    /// Enable edge filtering during bus integration
    EDGFLTEN @ 25, 1, ReadWrite;
}
single!(TransmitterDelayCompensation, 0x00C);

register! {
    /// CiINT: interrupt flags (lower half) and enables (upper half)
    Interrupts(CiINT) = 0x0000_0000;
    TXIF @ 0, 1, ReadOnly;
    RXIF @ 1, 1, ReadOnly;
    TBCIF @ 2, 1, Clearable;
    MODIF @ 3, 1, Clearable;
    TEFIF @ 4, 1, ReadOnly;
    ECCIF @ 8, 1, ReadOnly;
    SPICRCIF @ 9, 1, ReadOnly;
    TXATIF @ 10, 1, ReadOnly;
    RXOVIF @ 11, 1, ReadOnly;
    SERRIF @ 12, 1, Clearable;
    CERRIF @ 13, 1, Clearable;
    WAKIF @ 14, 1, Clearable;
    IVMIF @ 15, 1, Clearable;
    /// All sixteen interrupt enable bits
    ENABLES @ 16, 16, ReadWrite;
}
single!(Interrupts, 0x01C);

register! {
    /// CiTREC: transmit/receive error count
    ErrorCount(CiTREC) = 0x0020_0000;
    REC @ 0, 8, ReadOnly;
    TEC @ 8, 8, ReadOnly;
    EWARN @ 16, 1, ReadOnly;
    RXWARN @ 17, 1, ReadOnly;
    TXWARN @ 18, 1, ReadOnly;
    RXBP @ 19, 1, ReadOnly;
    TXBP @ 20, 1, ReadOnly;
    TXBO @ 21, 1, ReadOnly;
}
single!(ErrorCount, 0x034);

register! {
    /// CiBDIAG0: bus diagnostic error counters
    BusDiagnostic0(CiBDIAG0) = 0x0000_0000;
    NRERRCNT @ 0, 8, Clearable;
    NTERRCNT @ 8, 8, Clearable;
    DRERRCNT @ 16, 8, Clearable;
    DTERRCNT @ 24, 8, Clearable;
}
single!(BusDiagnostic0, 0x038);

register! {
    /// CiBDIAG1: bus diagnostic error flags
    BusDiagnostic1(CiBDIAG1) = 0x0000_0000;
    EFMSGCNT @ 0, 16, Clearable;
    NBIT0ERR @ 16, 1, Clearable;
    NBIT1ERR @ 17, 1, Clearable;
    NACKERR @ 18, 1, Clearable;
    NFORMERR @ 19, 1, Clearable;
    NSTUFERR @ 20, 1, Clearable;
    NCRCERR @ 21, 1, Clearable;
    TXBOERR @ 23, 1, Clearable;
    DBIT0ERR @ 24, 1, Clearable;
    DBIT1ERR @ 25, 1, Clearable;
    DACKERR @ 26, 1, Clearable;
    DFORMERR @ 27, 1, Clearable;
    DSTUFERR @ 28, 1, Clearable;
    DCRCERR @ 29, 1, Clearable;
    ESI @ 30, 1, Clearable;
}
single!(BusDiagnostic1, 0x03C);

register! {
    /// CiTEFCON: transmit event FIFO control
    TefControl(CiTEFCON) = 0x0000_0400;
    TEFNEIE @ 0, 1, ReadWrite;
    TEFHIE @ 1, 1, ReadWrite;
    TEFFIE @ 2, 1, ReadWrite;
    TEFOVIE @ 3, 1, ReadWrite;
    TEFTSEN @ 5, 1, ReadWrite;
    UINC @ 8, 1, ReadWrite;
    FRESET @ 10, 1, ReadWrite;
    /// Number of messages minus one
    FSIZE @ 24, 5, ReadWrite;
}
single!(TefControl, 0x040);

register! {
    /// CiTEFSTA: transmit event FIFO status
    TefStatus(CiTEFSTA) = 0x0000_0000;
    TEFNEIF @ 0, 1, ReadOnly;
    TEFHIF @ 1, 1, ReadOnly;
    TEFFIF @ 2, 1, ReadOnly;
    TEFOVIF @ 3, 1, Clearable;
}
single!(TefStatus, 0x044);

register! {
    /// CiTEFUA: transmit event FIFO user address
    TefUserAddress(CiTEFUA) = 0x0000_0000;
    UA @ 0, 12, ReadOnly;
}
single!(TefUserAddress, 0x048);

register! {
    /// CiFIFOBA: start of FIFO objects in message RAM
    FifoBaseAddress(CiFIFOBA) = 0x0000_0000;
    BA @ 0, 32, ReadWrite;
}
single!(FifoBaseAddress, 0x04C);

register! {
    /// CiTXQCON: transmit queue control
    TxQueueControl(CiTXQCON) = 0x0060_0400;
    TXQNIE @ 0, 1, ReadWrite;
    TXQEIE @ 2, 1, ReadWrite;
    TXATIE @ 4, 1, ReadWrite;
    TXEN @ 7, 1, ReadWrite;
    UINC @ 8, 1, ReadWrite;
    TXREQ @ 9, 1, ReadWrite;
    FRESET @ 10, 1, ReadWrite;
    TXPRI @ 16, 5, ReadWrite;
    TXAT @ 21, 2, ReadWrite;
    FSIZE @ 24, 5, ReadWrite;
    PLSIZE @ 29, 3, ReadWrite;
}
single!(TxQueueControl, 0x050);

register! {
    /// CiTXQSTA: transmit queue status
    TxQueueStatus(CiTXQSTA) = 0x0000_0000;
    TXQNIF @ 0, 1, ReadOnly;
    TXQEIF @ 2, 1, ReadOnly;
    TXATIF @ 4, 1, Clearable;
    TXERR @ 5, 1, Clearable;
    TXLARB @ 6, 1, Clearable;
    TXABT @ 7, 1, Clearable;
    TXQCI @ 8, 5, ReadOnly;
}
single!(TxQueueStatus, 0x054);

register! {
    /// CiFIFOCON layout of a FIFO configured for reception (`TXEN` = 0)
    RxFifoControl(CiFIFOCON_RX) = 0x0060_0400;
    TFNRFNIE @ 0, 1, ReadWrite;
    TFHRFHIE @ 1, 1, ReadWrite;
    TFERFFIE @ 2, 1, ReadWrite;
    RXOVIE @ 3, 1, ReadWrite;
    RXTSEN @ 5, 1, ReadWrite;
    TXEN @ 7, 1, ReadWrite;
    UINC @ 8, 1, ReadWrite;
    FRESET @ 10, 1, ReadWrite;
    FSIZE @ 24, 5, ReadWrite;
    PLSIZE @ 29, 3, ReadWrite;
}
repeated!(RxFifoControl, 0x050, 12, 32);

register! {
    /// CiFIFOCON layout of a FIFO configured for transmission (`TXEN` = 1)
    TxFifoControl(CiFIFOCON_TX) = 0x0060_0400;
    TFNRFNIE @ 0, 1, ReadWrite;
    TFHRFHIE @ 1, 1, ReadWrite;
    TFERFFIE @ 2, 1, ReadWrite;
    TXATIE @ 4, 1, ReadWrite;
    RTREN @ 6, 1, ReadWrite;
    TXEN @ 7, 1, ReadWrite;
    UINC @ 8, 1, ReadWrite;
    TXREQ @ 9, 1, ReadWrite;
    FRESET @ 10, 1, ReadWrite;
    TXPRI @ 16, 5, ReadWrite;
    TXAT @ 21, 2, ReadWrite;
    FSIZE @ 24, 5, ReadWrite;
    PLSIZE @ 29, 3, ReadWrite;
}
repeated!(TxFifoControl, 0x050, 12, 32);

/// CiFIFOCON of channel 1..31. The `TXEN` bit selects which of the two layouts applies.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FifoControl {
    Rx(RxFifoControl),
    Tx(TxFifoControl),
}

impl FifoControl {
    /// Decodes the word according to its `TXEN` bit
    pub fn from_word(word: u32) -> Self {
        if RxFifoControl::from_word(word).is_set(CiFIFOCON_RX::TXEN) {
            Self::Tx(TxFifoControl::from_word(word))
        } else {
            Self::Rx(RxFifoControl::from_word(word))
        }
    }

    /// Word transmitted on register write
    pub fn encode(&self) -> u32 {
        match self {
            Self::Rx(control) => control.encode(),
            Self::Tx(control) => control.encode(),
        }
    }

    /// True while the FIFO reset is still in progress
    pub fn freset(&self) -> bool {
        match self {
            Self::Rx(control) => control.is_set(CiFIFOCON_RX::FRESET),
            Self::Tx(control) => control.is_set(CiFIFOCON_TX::FRESET),
        }
    }

    pub fn address(channel: u8) -> u16 {
        RxFifoControl::address(channel)
    }
}

register! {
    /// CiFIFOSTA: FIFO status, union of the receive and transmit flags
    FifoStatus(CiFIFOSTA) = 0x0000_0000;
    TFNRFNIF @ 0, 1, ReadOnly;
    TFHRFHIF @ 1, 1, ReadOnly;
    TFERFFIF @ 2, 1, ReadOnly;
    RXOVIF @ 3, 1, Clearable;
    TXATIF @ 4, 1, Clearable;
    TXERR @ 5, 1, Clearable;
    TXLARB @ 6, 1, Clearable;
    TXABT @ 7, 1, Clearable;
    FIFOCI @ 8, 5, ReadOnly;
}
repeated!(FifoStatus, 0x054, 12, 32);

register! {
    /// CiFIFOUA: address of the next message object, relative to RAM start
    FifoUserAddress(CiFIFOUA) = 0x0000_0000;
    UA @ 0, 12, ReadOnly;
}
repeated!(FifoUserAddress, 0x058, 12, 32);

register! {
    /// CiFLTCON: filter control word holding four filter control bytes
    FilterControl(CiFLTCON) = 0x0000_0000;
    F0BP @ 0, 5, ReadWrite;
    FLTEN0 @ 7, 1, ReadWrite;
    F1BP @ 8, 5, ReadWrite;
    FLTEN1 @ 15, 1, ReadWrite;
    F2BP @ 16, 5, ReadWrite;
    FLTEN2 @ 23, 1, ReadWrite;
    F3BP @ 24, 5, ReadWrite;
    FLTEN3 @ 31, 1, ReadWrite;
}
repeated!(FilterControl, 0x1D0, 4, 8);

impl FilterControl {
    /// Address of the word containing the control byte of the given filter
    pub fn address_of_filter(filter_index: u8) -> u16 {
        Self::address(filter_index / 4)
    }

    /// Control byte of the given filter
    pub fn byte(&self, filter_index: u8) -> FilterControlByte {
        let shift = 8 * (filter_index % 4);
        FilterControlByte::from((self.0 >> shift) as u8)
    }

    /// Replaces exactly the control byte of the given filter
    pub fn with_byte(self, filter_index: u8, byte: FilterControlByte) -> Self {
        let shift = 8 * (filter_index % 4);
        let mask = 0xFFu32 << shift;

        Self((self.0 & !mask) | ((u8::from(byte) as u32) << shift))
    }
}

#[bitfield]
#[derive(Default, Copy, Clone, Debug)]
#[repr(u8)]
/// Single byte of CiFLTCON belonging to one filter
pub struct FilterControlByte {
    /// Filter enable bit
    pub enable: bool,
    #[skip]
    __: B2,
    /// FIFO channel receiving matching messages
    pub buffer_pointer: B5,
}

register! {
    /// CiFLTOBJ: filter object
    FilterObject(CiFLTOBJ) = 0x0000_0000;
    /// Standard identifier or the 11 MSBs of an extended identifier
    SID @ 0, 11, ReadWrite;
    /// 18 LSBs of an extended identifier
    EID @ 11, 18, ReadWrite;
    /// 12th standard identifier bit in FD mode
    SID11 @ 29, 1, ReadWrite;
    /// Match only extended identifiers (if MIDE set)
    EXIDE @ 30, 1, ReadWrite;
}
repeated!(FilterObject, 0x1F0, 8, 32);

register! {
    /// CiMASK: filter mask
    FilterMask(CiMASK) = 0x0000_0000;
    MSID @ 0, 11, ReadWrite;
    MEID @ 11, 18, ReadWrite;
    MSID11 @ 29, 1, ReadWrite;
    /// Match identifier type given by EXIDE
    MIDE @ 30, 1, ReadWrite;
}
repeated!(FilterMask, 0x1F4, 8, 32);

register! {
    /// OSC: oscillator control
    Oscillator(OSC) = 0x0000_0460;
    PLLEN @ 0, 1, ReadWrite;
    OSCDIS @ 2, 1, ReadWrite;
    LPMEN @ 3, 1, ReadWrite;
    SCLKDIV @ 4, 1, ReadWrite;
    CLKODIV @ 5, 2, ReadWrite;
    PLLRDY @ 8, 1, ReadOnly;
    OSCRDY @ 10, 1, ReadOnly;
    SCLKRDY @ 12, 1, ReadOnly;
}
single!(Oscillator, 0xE00);

register! {
    /// IOCON: input/output control
    IoControl(IOCON) = 0x0000_0003;
    TRIS0 @ 0, 1, ReadWrite;
    TRIS1 @ 1, 1, ReadWrite;
    XSTBYEN @ 6, 1, ReadWrite;
    LAT0 @ 8, 1, ReadWrite;
    LAT1 @ 9, 1, ReadWrite;
    GPIO0 @ 16, 1, ReadOnly;
    GPIO1 @ 17, 1, ReadOnly;
    PM0 @ 24, 1, ReadWrite;
    PM1 @ 25, 1, ReadWrite;
    TXCANOD @ 28, 1, ReadWrite;
    SOF @ 29, 1, ReadWrite;
    INTOD @ 30, 1, ReadWrite;
}
single!(IoControl, 0xE04);

register! {
    /// DEVID: device identification
    DeviceId(DEVID) = 0x0000_0000;
    /// Silicon revision
    REV @ 0, 4, ReadOnly;
    /// Device, 0x1 for MCP2518FD
    DEV @ 4, 4, ReadOnly;
}
single!(DeviceId, 0xE14);
