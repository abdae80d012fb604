//! Message RAM layout
//!
//! The controller places the transmit event FIFO, the transmit queue and FIFO channels 1..=31
//! back to back starting at [RAM_START], in that order. Every channel below the highest configured
//! one occupies RAM: a channel missing from the plan keeps its reset configuration of one object
//! with an 8-byte payload. Channels above the highest configured one take no space.
use crate::config::BringUpPlan;
use crate::registers::{RAM_SIZE, RAM_START};

/// Object size of a FIFO left at reset: 8-byte header and 8-byte payload, no time stamp
pub const RESET_OBJECT_SIZE: usize = 16;

/// Area of message RAM reserved for one FIFO
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RamRegion {
    /// Absolute address of the first message object
    pub start: u16,
    /// Size of a single message object in bytes
    pub object_size: usize,
    /// Number of message objects
    pub depth: u8,
}

impl RamRegion {
    /// Total bytes of the region
    pub fn size(&self) -> usize {
        self.object_size * self.depth as usize
    }

    /// Address of the message object with the given index
    pub fn object_address(&self, index: u8) -> u16 {
        self.start + (self.object_size * index as usize) as u16
    }
}

/// Message RAM footprint of a [BringUpPlan]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RamLayout {
    pub tef: Option<RamRegion>,
    pub tx_queue: RamRegion,
    /// Indexed by FIFO channel, index 0 is always None. Unconfigured channels below the highest
    /// configured one hold their reset sized region.
    pub fifos: [Option<RamRegion>; 32],
    total: usize,
}

impl RamLayout {
    pub fn from_plan(plan: &BringUpPlan) -> Self {
        let mut next = 0usize;
        let mut allocate = |object_size: usize, depth: u8| {
            let region = RamRegion {
                start: (RAM_START as usize + next) as u16,
                object_size,
                depth,
            };
            next += object_size * depth as usize;
            region
        };

        let tef = plan.tef.map(|tef| allocate(tef.object_size(), tef.depth));

        let tx_queue = allocate(plan.tx_queue.object_size(), plan.tx_queue.depth);

        let highest = (1..32u8).rev().find(|channel| plan.fifo(*channel).is_some()).unwrap_or(0);

        let mut fifos = [None; 32];
        for channel in 1..=highest {
            fifos[channel as usize] = Some(match plan.fifo(channel) {
                Some(fifo) => allocate(fifo.object_size(), fifo.depth),
                None => allocate(RESET_OBJECT_SIZE, 1),
            });
        }

        Self {
            tef,
            tx_queue,
            fifos,
            total: next,
        }
    }

    /// Required bytes of message RAM
    pub fn total(&self) -> usize {
        self.total
    }

    /// True if the layout does not exceed the 2 KiB message RAM
    pub fn fits(&self) -> bool {
        self.total <= RAM_SIZE
    }
}
