//!# CAN Filter
//! The [Filter] object describes one of the 32 acceptance filters of the MCP2518FD together
//! with its mask and the receive FIFO matching messages are stored in.
//! Lower index of the filter means higher priority (highest priority =0, lowest priority = 31).
//!
//! ```
//!# use mcp2518fd::filter::Filter;
//!# use embedded_can::{Id,ExtendedId};
//!
//! // ID to match
//! let id = Id::Extended(ExtendedId::new(0xC672).unwrap());
//! // Create filter with index 2, routing matches to FIFO 1
//! let mut filter = Filter::new(id, 2, 1).unwrap();
//! // Set mask MSB bits, so that only the MSB of the message ID needs to match the filter
//! filter.set_mask_extended_id(0xFF00);
//! ```
use crate::config::MAX_FILTER_INDEX;
use crate::registers::{CiFLTOBJ, CiMASK, FilterControlByte, FilterMask, FilterObject, Register};
use embedded_can::Id;

/// Bits of a standard identifier
const STANDARD_IDENTIFIER_MASK: u32 = 0x7FF;

/// Bits of an extended identifier
const EXTENDED_IDENTIFIER_MASK: u32 = 0x1FFF_FFFF;

/// Lower 18 bits of an extended identifier, stored in the EID field
const EXTENDED_LOW_MASK: u32 = 0x3FFFF;

/// Struct representing a filter object
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    /// filter & mask index
    index: u8,
    /// FIFO channel receiving matching messages
    target: u8,
    object: FilterObject,
    mask: FilterMask,
}

impl Filter {
    /// Create new filter from [embedded_can::Id], filter index and target FIFO, no mask.
    /// Returns None if the index exceeds the number of filters.
    pub fn new(identifier: Id, index: u8, target_fifo: u8) -> Option<Self> {
        if index > MAX_FILTER_INDEX {
            return None;
        }

        let mut filter = Self {
            index,
            target: target_fifo,
            object: FilterObject::default(),
            mask: FilterMask::default(),
        };

        filter.set_id(identifier);

        Some(filter)
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn target_fifo(&self) -> u8 {
        self.target
    }

    /// Set mask for extended Id, bits exceeding 29 bits are ignored
    pub fn set_mask_extended_id(&mut self, mask: u32) {
        let mask = mask & EXTENDED_IDENTIFIER_MASK;

        self.mask = self
            .mask
            .with(CiMASK::MEID.val(mask & EXTENDED_LOW_MASK) + CiMASK::MSID.val((mask >> 18) & STANDARD_IDENTIFIER_MASK));
    }

    /// Set mask for standard Id, bits exceeding 11 bits are ignored
    pub fn set_mask_standard_id(&mut self, mask: u16) {
        self.mask = self.mask.with(CiMASK::MSID.val(mask as u32 & STANDARD_IDENTIFIER_MASK));
    }

    /// Set filter and mask so that only messages with Standard Id match
    pub fn match_standard_only(&mut self) {
        self.mask = self.mask.with(CiMASK::MIDE::SET);
        self.object = self.object.with(CiFLTOBJ::EXIDE::CLEAR);
    }

    /// Set filter and mask so that only messages with Extended Id match
    pub fn match_extended_only(&mut self) {
        self.mask = self.mask.with(CiMASK::MIDE::SET);
        self.object = self.object.with(CiFLTOBJ::EXIDE::SET);
    }

    /// Matches the 12th SID bit of CAN FD base frames. Requires SID11EN, which is set during
    /// bring-up as soon as one filter uses it.
    pub fn set_sid11(&mut self, value: bool, masked: bool) {
        self.object = self.object.with(CiFLTOBJ::SID11.val(value as u32));
        self.mask = self.mask.with(CiMASK::MSID11.val(masked as u32));
    }

    pub(crate) fn uses_sid11(&self) -> bool {
        self.mask.is_set(CiMASK::MSID11)
    }

    pub(crate) fn object(&self) -> FilterObject {
        self.object
    }

    pub(crate) fn mask(&self) -> FilterMask {
        self.mask
    }

    /// Control byte enabling the filter and pointing to the target FIFO
    pub(crate) fn control_byte(&self, enable: bool) -> FilterControlByte {
        FilterControlByte::new()
            .with_enable(enable)
            .with_buffer_pointer(self.target)
    }

    fn set_id(&mut self, identifier: Id) {
        self.object = match identifier {
            Id::Standard(sid) => self.object.with(CiFLTOBJ::SID.val(sid.as_raw() as u32) + CiFLTOBJ::EXIDE::CLEAR),
            Id::Extended(eid) => self.object.with(
                CiFLTOBJ::EID.val(eid.as_raw() & EXTENDED_LOW_MASK)
                    + CiFLTOBJ::SID.val((eid.as_raw() >> 18) & STANDARD_IDENTIFIER_MASK)
                    + CiFLTOBJ::EXIDE::SET,
            ),
        };
    }
}
