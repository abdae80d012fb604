use crate::can::{ErrorKind, Fault, State};
use crate::config::{
    BringUpPlan, ClockConfiguration, ClockOutputDivisor, DataBitTiming, FifoConfiguration, FifoMode,
    NominalBitTiming, PLLSetting, PayloadSize, RetransmissionAttempts, RxInterrupts, RxOptions, SystemClockDivisor,
    TefConfiguration, TxInterrupts, TxOptions, TxQueueConfiguration,
};
use crate::filter::Filter;
use crate::registers::{FifoControl, Oscillator, Register};
use embedded_can::{Id, StandardId};

fn filter(index: u8, target: u8) -> Filter {
    Filter::new(Id::Standard(StandardId::new(0x100).unwrap()), index, target).unwrap()
}

fn fifo_fault(fifos: &[FifoConfiguration]) -> Result<(), Fault> {
    BringUpPlan {
        fifos,
        ..Default::default()
    }
    .validate()
}

#[test]
fn test_clock_from_register() {
    let clock = ClockConfiguration::from_register(Oscillator::from_word(0b0110_0100));
    assert_eq!(ClockOutputDivisor::DivideBy10, clock.clock_output);
    assert!(clock.disable_clock);

    assert_eq!(
        ClockOutputDivisor::DivideBy4,
        ClockConfiguration::from_register(Oscillator::from_word(0b0100_0000)).clock_output
    );
    assert_eq!(
        ClockOutputDivisor::DivideBy2,
        ClockConfiguration::from_register(Oscillator::from_word(0b0010_0000)).clock_output
    );
    assert_eq!(
        ClockOutputDivisor::DivideBy1,
        ClockConfiguration::from_register(Oscillator::from_word(0b0000_0100)).clock_output
    );

    let clock = ClockConfiguration::from_register(Oscillator::from_word(0b0001_1001));
    assert_eq!(SystemClockDivisor::DivideBy2, clock.system_clock);
    assert_eq!(PLLSetting::TenTimesPLL, clock.pll);
    assert!(clock.low_power);
    assert!(!clock.disable_clock);

    // reset value of OSC
    let clock = ClockConfiguration::from_register(Oscillator::default());
    assert_eq!(ClockOutputDivisor::DivideBy10, clock.clock_output);
    assert_eq!(SystemClockDivisor::DivideBy1, clock.system_clock);
    assert_eq!(PLLSetting::DirectXTALOscillator, clock.pll);
}

#[test]
fn test_clock_as_register() {
    assert_eq!(0x0000_0000, ClockConfiguration::default().as_register().encode());

    let clock = ClockConfiguration {
        clock_output: ClockOutputDivisor::DivideBy10,
        system_clock: SystemClockDivisor::DivideBy2,
        disable_clock: false,
        pll: PLLSetting::TenTimesPLL,
        low_power: true,
    };
    assert_eq!(0b0111_1001, clock.as_register().encode());
    assert_eq!(clock, ClockConfiguration::from_register(clock.as_register()));
}

#[test]
fn test_bit_timing_for_bit_rate() {
    assert_eq!(
        Some(NominalBitTiming::default()),
        NominalBitTiming::for_bit_rate(40_000_000, 500_000)
    );
    assert_eq!(Some(DataBitTiming::default()), DataBitTiming::for_bit_rate(40_000_000, 2_000_000));

    assert_eq!(
        Some(NominalBitTiming {
            brp: 0,
            tseg1: 30,
            tseg2: 7,
            sjw: 7
        }),
        NominalBitTiming::for_bit_rate(40_000_000, 1_000_000)
    );

    // 800 time quanta exceed TSEG2, prescaler is increased
    assert_eq!(
        Some(NominalBitTiming {
            brp: 3,
            tseg1: 158,
            tseg2: 39,
            sjw: 39
        }),
        NominalBitTiming::for_bit_rate(40_000_000, 50_000)
    );

    assert_eq!(
        Some(DataBitTiming {
            brp: 0,
            tseg1: 6,
            tseg2: 1,
            sjw: 1
        }),
        DataBitTiming::for_bit_rate(40_000_000, 4_000_000)
    );

    assert_eq!(None, DataBitTiming::for_bit_rate(40_000_000, 0));
    assert_eq!(None, DataBitTiming::for_bit_rate(40_000_000, 20_000_000));
    assert_eq!(None, NominalBitTiming::for_bit_rate(40_000_000, 300_001));
}

#[test]
fn test_bit_timing_validation() {
    assert!(NominalBitTiming::default().is_valid());
    assert!(DataBitTiming::default().is_valid());

    let nominal = NominalBitTiming {
        brp: 255,
        tseg1: 255,
        tseg2: 127,
        sjw: 127,
    };
    assert!(nominal.is_valid());
    assert!(!NominalBitTiming { tseg2: 128, ..nominal }.is_valid());
    assert!(!NominalBitTiming { sjw: 16, ..NominalBitTiming::default() }.is_valid());
    assert!(!NominalBitTiming {
        tseg1: 2,
        tseg2: 15,
        sjw: 4,
        brp: 0
    }
    .is_valid());

    let data = DataBitTiming {
        brp: 255,
        tseg1: 31,
        tseg2: 15,
        sjw: 15,
    };
    assert!(data.is_valid());
    assert!(!DataBitTiming { tseg1: 32, ..data }.is_valid());
    assert!(!DataBitTiming { tseg2: 16, sjw: 0, ..data }.is_valid());
    assert!(!DataBitTiming { sjw: 4, ..DataBitTiming::default() }.is_valid());
}

#[test]
fn test_tdc_offset() {
    assert_eq!(15, DataBitTiming::default().tdc_offset());
    assert_eq!(
        30,
        DataBitTiming {
            brp: 1,
            tseg1: 14,
            tseg2: 3,
            sjw: 3
        }
        .tdc_offset()
    );
    assert_eq!(
        63,
        DataBitTiming {
            brp: 3,
            tseg1: 31,
            tseg2: 3,
            sjw: 3
        }
        .tdc_offset()
    );
}

#[test]
fn test_payload_size() {
    assert_eq!(8, PayloadSize::EightBytes.bytes());
    assert_eq!(20, PayloadSize::TwentyBytes.bytes());
    assert_eq!(48, PayloadSize::FortyEightBytes.bytes());
    assert_eq!(64, PayloadSize::SixtyFourBytes.bytes());
}

#[test]
fn test_object_sizes() {
    let rx = FifoConfiguration {
        channel: 1,
        depth: 2,
        payload: PayloadSize::TwelveBytes,
        mode: FifoMode::Receive(RxOptions {
            timestamp: true,
            interrupts: RxInterrupts::empty(),
        }),
    };
    assert_eq!(24, rx.object_size());
    assert_eq!(72, FifoConfiguration::transmit(2, 1, PayloadSize::SixtyFourBytes, 0).object_size());

    assert_eq!(8, TefConfiguration::default().object_size());
    assert_eq!(
        12,
        TefConfiguration {
            timestamp: true,
            ..Default::default()
        }
        .object_size()
    );
    assert_eq!(16, TxQueueConfiguration::default().object_size());
}

#[test]
fn test_rx_fifo_as_register() {
    let fifo = FifoConfiguration {
        channel: 1,
        depth: 32,
        payload: PayloadSize::SixtyFourBytes,
        mode: FifoMode::Receive(RxOptions {
            timestamp: true,
            interrupts: RxInterrupts::NOT_EMPTY | RxInterrupts::OVERFLOW,
        }),
    };

    let control = fifo.as_register();
    assert_eq!(0xFF60_0429, control.encode());
    assert!(matches!(control, FifoControl::Rx(_)));
}

#[test]
fn test_tx_fifo_as_register() {
    let fifo = FifoConfiguration {
        channel: 3,
        depth: 1,
        payload: PayloadSize::EightBytes,
        mode: FifoMode::Transmit(TxOptions {
            priority: 31,
            attempts: RetransmissionAttempts::Disabled,
            auto_rtr: true,
            interrupts: TxInterrupts::EMPTY | TxInterrupts::ATTEMPTS_EXHAUSTED,
        }),
    };

    let control = fifo.as_register();
    assert_eq!(0x001F_04D4, control.encode());
    assert!(matches!(control, FifoControl::Tx(_)));
}

#[test]
fn test_tx_queue_as_register() {
    let queue = TxQueueConfiguration {
        depth: 8,
        payload: PayloadSize::SixteenBytes,
        priority: 5,
        attempts: RetransmissionAttempts::Three,
        interrupts: TxInterrupts::NOT_FULL,
    };

    assert_eq!(0x4725_0481, queue.as_register().encode());
}

#[test]
fn test_default_plan_is_valid() {
    let plan = BringUpPlan::default();

    assert_eq!(Ok(()), plan.validate());
    assert_eq!(16, plan.ram_footprint());
    assert!(!plan.restricts_retransmission());
}

#[test]
fn test_validate_fifo_plan() {
    assert_eq!(
        Err(Fault::new(State::FifoCfg, ErrorKind::BadFifoPlan)),
        fifo_fault(&[FifoConfiguration::receive(0, 1, PayloadSize::EightBytes)])
    );
    assert_eq!(
        Err(Fault::new(State::FifoCfg, ErrorKind::BadFifoPlan)),
        fifo_fault(&[FifoConfiguration::receive(32, 1, PayloadSize::EightBytes)])
    );
    assert_eq!(
        Err(Fault::new(State::FifoCfg, ErrorKind::BadFifoPlan)),
        fifo_fault(&[FifoConfiguration::receive(1, 0, PayloadSize::EightBytes)])
    );
    assert_eq!(
        Err(Fault::new(State::FifoCfg, ErrorKind::BadFifoPlan)),
        fifo_fault(&[FifoConfiguration::receive(1, 33, PayloadSize::EightBytes)])
    );
    assert_eq!(
        Err(Fault::new(State::FifoCfg, ErrorKind::BadFifoPlan)),
        fifo_fault(&[
            FifoConfiguration::receive(4, 1, PayloadSize::EightBytes),
            FifoConfiguration::transmit(4, 1, PayloadSize::EightBytes, 0),
        ])
    );
    assert_eq!(
        Err(Fault::new(State::FifoCfg, ErrorKind::BadFifoPlan)),
        fifo_fault(&[FifoConfiguration::transmit(2, 1, PayloadSize::EightBytes, 32)])
    );

    let plan = BringUpPlan {
        tef: Some(TefConfiguration {
            depth: 0,
            ..Default::default()
        }),
        ..Default::default()
    };
    assert_eq!(Err(Fault::new(State::FifoCfg, ErrorKind::BadFifoPlan)), plan.validate());
}

#[test]
fn test_validate_ram_budget() {
    // 16 bytes TXQ + 2032 bytes FIFOs fill the RAM exactly
    let fits = [
        FifoConfiguration::receive(1, 28, PayloadSize::SixtyFourBytes),
        FifoConfiguration::receive(2, 1, PayloadSize::EightBytes),
    ];
    let plan = BringUpPlan {
        fifos: &fits,
        ..Default::default()
    };
    assert_eq!(2048, plan.ram_footprint());
    assert_eq!(Ok(()), plan.validate());

    let overflow = [
        FifoConfiguration::receive(1, 28, PayloadSize::SixtyFourBytes),
        FifoConfiguration::receive(2, 1, PayloadSize::TwelveBytes),
    ];
    assert_eq!(Err(Fault::new(State::FifoCfg, ErrorKind::RamOverflow)), fifo_fault(&overflow));
}

#[test]
fn test_validate_filters() {
    let fifos = [
        FifoConfiguration::receive(1, 4, PayloadSize::EightBytes),
        FifoConfiguration::transmit(2, 4, PayloadSize::EightBytes, 1),
    ];
    let validate = |filters: &[Filter]| {
        BringUpPlan {
            fifos: &fifos,
            filters,
            ..Default::default()
        }
        .validate()
    };
    let bad_target = Err(Fault::new(State::FilterCfg, ErrorKind::BadFilterTarget));

    assert_eq!(Ok(()), validate(&[filter(0, 1), filter(31, 1)]));
    assert_eq!(bad_target, validate(&[filter(0, 0)]));
    assert_eq!(bad_target, validate(&[filter(0, 2)]));
    assert_eq!(bad_target, validate(&[filter(0, 3)]));
    assert_eq!(bad_target, validate(&[filter(0, 32)]));
    assert_eq!(bad_target, validate(&[filter(5, 1), filter(5, 1)]));
}

#[test]
fn test_validate_timing_first() {
    let fifos = [FifoConfiguration::receive(0, 4, PayloadSize::EightBytes)];
    let plan = BringUpPlan {
        nominal_timing: NominalBitTiming {
            tseg2: 128,
            ..Default::default()
        },
        fifos: &fifos,
        ..Default::default()
    };

    assert_eq!(Err(Fault::new(State::BitTimingCfg, ErrorKind::BadTiming)), plan.validate());
}

#[test]
fn test_restricts_retransmission() {
    let fifos = [FifoConfiguration {
        channel: 1,
        depth: 1,
        payload: PayloadSize::EightBytes,
        mode: FifoMode::Transmit(TxOptions {
            attempts: RetransmissionAttempts::Disabled,
            ..Default::default()
        }),
    }];
    let plan = BringUpPlan {
        fifos: &fifos,
        ..Default::default()
    };
    assert!(plan.restricts_retransmission());

    let plan = BringUpPlan {
        tx_queue: TxQueueConfiguration {
            attempts: RetransmissionAttempts::Three,
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(plan.restricts_retransmission());
}
