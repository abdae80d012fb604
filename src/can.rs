//!# CAN Controller device
//!
//! [MCP2518FD::init] brings the controller from an unknown state into the requested
//! operation mode. Every step is a state of [State], a failure is reported as [Fault]
//! carrying the state it occurred in.
//!
//!```
//!# use mcp2518fd::can::{MCP2518FD, State};
//!# use mcp2518fd::config::BringUpPlan;
//!# use mcp2518fd::example::*;
//!#
//! let mut delay = ExampleDelay {};
//!
//! // Initialize controller object
//! let mut can_controller = MCP2518FD::new(ExampleSPIDevice::default());
//!
//! // Use default plan: 500 kbit/s nominal, 2 Mbit/s data, CAN FD mode
//! can_controller.init(&BringUpPlan::default(), &mut delay).unwrap();
//!
//! assert_eq!(State::Ready, can_controller.state());
//! ```
use crate::config::{BringUpPlan, ClockConfiguration, FifoConfiguration, PLLSetting};
use crate::filter::Filter;
use crate::registers::{
    BusDiagnostic0, BusDiagnostic1, CanControl, CiCON, CiFIFOBA, DataBitTimeConfig, DeviceId, ErrorCount,
    FifoBaseAddress, FifoControl, FilterControl, FilterMask, FilterObject, NominalBitTimeConfig, Oscillator,
    Register, RepeatedRegister, SingleRegister, TefControl, TransmitterDelayCompensation, TxQueueControl, DEVID,
    OSC, RAM_SIZE,
};
use crate::status::{BusDiagnostics, ErrorCounters, OperationMode, OperationStatus, OscillatorStatus};
use crate::transport::{SpiError, Transport};
use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;
use log::{debug, error, info, warn};

/// Maximum number of register reads while waiting for a condition
pub const POLL_ATTEMPTS: u32 = 10_000;

/// Delay between two polling reads
pub const POLL_INTERVAL_US: u32 = 100;

/// Time granted to the clock after changing the oscillator configuration
const CLOCK_SETTLE_MS: u32 = 5;

/// DEV nibble of DEVID identifying a MCP2518FD
const EXPECTED_DEVICE: u32 = 0x1;

/// Bring-up step the controller is in
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    /// Nothing was done yet
    Cold,
    /// Waiting for oscillator after reset
    OscWait,
    /// Oscillator configuration
    ClkCfg,
    /// Configuration mode entry and identity check
    CfgMode,
    /// CiCON configuration
    CanCfg,
    /// Nominal/data bit timing and transmitter delay compensation
    BitTimingCfg,
    /// TEF, TXQ and FIFO configuration
    FifoCfg,
    /// Filter configuration
    FilterCfg,
    /// Requesting the target operation mode
    ModeRequest,
    /// Device is configured and operates in target mode
    Ready,
    /// Bring-up failed, a new [MCP2518FD::init] is required
    Fault,
}

/// Reason of a failed bring-up
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// SPI transfer failed
    BusIo,
    /// Oscillator did not get ready within timeout
    OscUnstable,
    /// System clock (or PLL) did not get ready within timeout
    SclkUnstable,
    /// Device did not enter the requested operation mode within timeout
    ModeTimeout,
    /// DEVID does not identify a MCP2518FD
    WrongDevice,
    /// Invalid nominal or data bit timing
    BadTiming,
    /// Configured FIFOs exceed the message RAM
    RamOverflow,
    /// Filter index used twice or filter targets no receive FIFO
    BadFilterTarget,
    /// CAN module or FIFO reset still busy after timeout
    ControllerBusy,
    /// FIFO channel, depth or priority out of range
    BadFifoPlan,
}

impl<B: SpiDevice<u8>> From<SpiError<B>> for ErrorKind {
    fn from(error: SpiError<B>) -> Self {
        debug!("SPI transfer failed: {error:?}");
        ErrorKind::BusIo
    }
}

/// Bring-up failure together with the state it happened in
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Fault {
    pub state: State,
    pub kind: ErrorKind,
}

impl Fault {
    pub fn new(state: State, kind: ErrorKind) -> Self {
        Self { state, kind }
    }
}

/// Main MCP2518FD CAN controller device
pub struct MCP2518FD<B: SpiDevice<u8>> {
    transport: Transport<B>,

    /// Current bring-up state
    state: State,

    /// Operation mode reported by the last CiCON read
    mode: OperationMode,

    /// Silicon revision, known after identity check
    revision: Option<u8>,
}

impl<B: SpiDevice<u8>> MCP2518FD<B> {
    pub fn new(device: B) -> Self {
        Self {
            transport: Transport::new(device),
            state: State::Cold,
            mode: OperationMode::Configuration,
            revision: None,
        }
    }

    /// Returns the underlying SPI device
    pub fn release(self) -> B {
        self.transport.release()
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Operation mode last reported by the device
    pub fn current_mode(&self) -> OperationMode {
        self.mode
    }

    /// Silicon revision, None until the identity check passed
    pub fn device_revision(&self) -> Option<u8> {
        self.revision
    }

    /// Resets and configures the device according to the given plan.
    ///
    /// The plan is validated first, so an invalid plan leaves the device untouched.
    /// Any failure is terminal, a new call to `init` starts over with a reset.
    pub fn init<DL: DelayNs>(&mut self, plan: &BringUpPlan, delay: &mut DL) -> Result<(), Fault> {
        self.state = State::Cold;
        self.revision = None;

        if let Err(fault) = plan.validate() {
            error!("Rejected bring-up plan in state {:?}: {:?}", fault.state, fault.kind);
            self.state = State::Fault;
            return Err(fault);
        }

        match self.bring_up(plan, delay) {
            Ok(()) => {
                self.state = State::Ready;
                info!("MCP2518FD ready in mode {:?}", self.mode);
                Ok(())
            }
            Err(kind) => {
                let fault = Fault::new(self.state, kind);
                error!("Bring-up failed in state {:?}: {:?}", fault.state, fault.kind);
                self.state = State::Fault;
                Err(fault)
            }
        }
    }

    /// Requests the given operation mode and waits until the device reports it.
    /// Returns immediately if the device already operates in that mode.
    pub fn set_mode<DL: DelayNs>(&mut self, mode: OperationMode, delay: &mut DL) -> Result<(), ErrorKind> {
        let control = self.read_register::<CanControl>()?;
        self.enter_mode(control, mode, delay)
    }

    /// Reads and returns the operation status
    pub fn read_operation_status(&mut self) -> Result<OperationStatus, ErrorKind> {
        let control = self.read_register::<CanControl>()?;

        Ok(OperationStatus::from_register(control))
    }

    /// Reads and returns the oscillator status
    pub fn read_oscillator_status(&mut self) -> Result<OscillatorStatus, ErrorKind> {
        let oscillator = self.read_register::<Oscillator>()?;

        Ok(OscillatorStatus::from_register(oscillator))
    }

    /// Reads back the oscillator configuration currently active on the device
    pub fn read_clock_configuration(&mut self) -> Result<ClockConfiguration, ErrorKind> {
        let oscillator = self.read_register::<Oscillator>()?;

        Ok(ClockConfiguration::from_register(oscillator))
    }

    /// Reads and returns the transmit/receive error counters
    pub fn read_error_counters(&mut self) -> Result<ErrorCounters, ErrorKind> {
        let counters = self.read_register::<ErrorCount>()?;

        Ok(ErrorCounters::from_register(counters))
    }

    /// Reads and returns the bus diagnostic registers
    pub fn read_bus_diagnostics(&mut self) -> Result<BusDiagnostics, ErrorKind> {
        let counters = self.read_register::<BusDiagnostic0>()?;
        let flags = self.read_register::<BusDiagnostic1>()?;

        Ok(BusDiagnostics::from_registers(counters, flags))
    }

    /// Reads any register with a fixed address
    pub fn read_register<R: SingleRegister>(&mut self) -> Result<R, ErrorKind> {
        let register = R::from_word(self.transport.read_reg(R::ADDRESS)?);

        if let Some(control) = Self::as_can_control::<R>(&register) {
            self.mode = control.operation_mode();
        }

        Ok(register)
    }

    fn bring_up<DL: DelayNs>(&mut self, plan: &BringUpPlan, delay: &mut DL) -> Result<(), ErrorKind> {
        self.transport.reset(delay)?;
        self.mode = OperationMode::Configuration;

        self.state = State::OscWait;
        let oscillator = self.poll::<Oscillator, _, _>(POLL_ATTEMPTS, delay, ErrorKind::OscUnstable, |osc| {
            osc.is_set(OSC::OSCRDY)
        })?;
        if oscillator.word() != Oscillator::RESET {
            warn!("OSC differs from reset value: 0x{:08X}", oscillator.word());
        }

        self.state = State::ClkCfg;
        self.configure_clock(plan, delay)?;

        self.state = State::CfgMode;
        let control = self.read_register::<CanControl>()?;
        if control.word() != CanControl::RESET {
            warn!("CiCON differs from reset value: 0x{:08X}", control.word());
        }
        self.enter_mode(control, OperationMode::Configuration, delay)?;
        self.verify_identity()?;

        self.state = State::CanCfg;
        self.configure_controller(plan, delay)?;

        self.state = State::BitTimingCfg;
        self.configure_bit_timing(plan)?;

        self.state = State::FifoCfg;
        self.configure_fifos(plan, delay)?;

        self.state = State::FilterCfg;
        for filter in plan.filters {
            self.configure_filter(filter)?;
        }

        self.state = State::ModeRequest;
        self.set_mode(plan.mode, delay)
    }

    fn configure_clock<DL: DelayNs>(&mut self, plan: &BringUpPlan, delay: &mut DL) -> Result<(), ErrorKind> {
        self.write_register(plan.clock.as_register())?;
        delay.delay_ms(CLOCK_SETTLE_MS);

        let pll = plan.clock.pll == PLLSetting::TenTimesPLL;
        self.poll::<Oscillator, _, _>(POLL_ATTEMPTS, delay, ErrorKind::SclkUnstable, |osc| {
            osc.is_set(OSC::SCLKRDY) && (!pll || osc.is_set(OSC::PLLRDY))
        })?;

        debug!("System clock ready");
        Ok(())
    }

    fn verify_identity(&mut self) -> Result<(), ErrorKind> {
        let id = self.read_register::<DeviceId>()?;

        if id.read(DEVID::DEV) != EXPECTED_DEVICE {
            debug!("Unexpected device ID 0x{:X}", id.read(DEVID::DEV));
            return Err(ErrorKind::WrongDevice);
        }

        let revision = id.read(DEVID::REV) as u8;
        self.revision = Some(revision);
        debug!("Found MCP2518FD revision {revision}");
        Ok(())
    }

    /// Writes the canonical CiCON configuration once the CAN module is idle
    fn configure_controller<DL: DelayNs>(&mut self, plan: &BringUpPlan, delay: &mut DL) -> Result<(), ErrorKind> {
        let control = self.poll::<CanControl, _, _>(POLL_ATTEMPTS, delay, ErrorKind::ControllerBusy, |control| {
            !control.is_set(CiCON::BUSY)
        })?;

        let control = control
            .with(
                CiCON::DNCNT.val(0)
                    + CiCON::ISOCRCEN::SET
                    + CiCON::PXEDIS::CLEAR
                    + CiCON::WAKFIL::CLEAR
                    + CiCON::BRSDIS::CLEAR
                    + CiCON::RTXAT.val(plan.restricts_retransmission() as u32)
                    + CiCON::ESIGM::CLEAR
                    + CiCON::SERR2LOM::CLEAR
                    + CiCON::STEF.val(plan.tef.is_some() as u32)
                    + CiCON::TXQEN::SET
                    + CiCON::TXBWS.val(0)
                    + CiCON::ABAT::CLEAR,
            )
            .with_requested_mode(OperationMode::Configuration);

        self.write_register(control)
    }

    fn configure_bit_timing(&mut self, plan: &BringUpPlan) -> Result<(), ErrorKind> {
        let nominal: NominalBitTimeConfig = plan.nominal_timing.as_register();
        let data: DataBitTimeConfig = plan.data_timing.as_register();
        let tdc: TransmitterDelayCompensation = plan.tdc_mode.as_register(&plan.data_timing, plan.uses_sid11());

        self.write_register(nominal)?;
        self.write_register(data)?;
        self.write_register(tdc)
    }

    /// Programs TEF, TXQ and all planned FIFOs, each followed by a FIFO reset
    fn configure_fifos<DL: DelayNs>(&mut self, plan: &BringUpPlan, delay: &mut DL) -> Result<(), ErrorKind> {
        self.write_register(FifoBaseAddress::default().with(CiFIFOBA::BA.val(0)))?;

        let layout = plan.ram_layout();
        debug!("Message RAM: {} of {} bytes used", layout.total(), RAM_SIZE);

        if let Some(tef) = plan.tef {
            self.write_register(tef.as_register())?;
            self.wait_fifo_reset(TefControl::ADDRESS, delay)?;
        }

        self.write_register(plan.tx_queue.as_register())?;
        self.wait_fifo_reset(TxQueueControl::ADDRESS, delay)?;

        for fifo in plan.fifos {
            if let Some(region) = layout.fifos[fifo.channel as usize] {
                debug!("FIFO {} objects start at 0x{:03X}", fifo.channel, region.start);
            }

            self.configure_fifo(fifo, delay)?;
        }

        Ok(())
    }

    fn configure_fifo<DL: DelayNs>(&mut self, fifo: &FifoConfiguration, delay: &mut DL) -> Result<(), ErrorKind> {
        let address = FifoControl::address(fifo.channel);

        self.transport.write_reg(address, fifo.as_register().encode())?;
        self.wait_fifo_reset(address, delay)?;

        debug!("Configured FIFO {}: {:?}", fifo.channel, fifo.mode);
        Ok(())
    }

    /// Disables the filter, writes object and mask and enables it pointing to the target FIFO
    fn configure_filter(&mut self, filter: &Filter) -> Result<(), ErrorKind> {
        let index = filter.index();
        let control_address = FilterControl::address_of_filter(index);

        let control = FilterControl::from_word(self.transport.read_reg(control_address)?);
        let disabled = control.with_byte(index, control.byte(index).with_enable(false));
        self.transport.write_reg(control_address, disabled.encode())?;

        self.transport.write_reg(FilterObject::address(index), filter.object().encode())?;
        self.transport.write_reg(FilterMask::address(index), filter.mask().encode())?;

        let enabled = disabled.with_byte(index, filter.control_byte(true));
        self.transport.write_reg(control_address, enabled.encode())?;

        debug!("Filter {index} enabled for FIFO {}", filter.target_fifo());
        Ok(())
    }

    /// Requests the mode based on an already read CiCON value. That read counts as the first
    /// of at most [POLL_ATTEMPTS] CiCON reads spent on the mode change.
    fn enter_mode<DL: DelayNs>(&mut self, control: CanControl, mode: OperationMode, delay: &mut DL) -> Result<(), ErrorKind> {
        if control.operation_mode() == mode {
            debug!("Device already in mode {mode:?}");
            return Ok(());
        }

        self.write_register(control.with_requested_mode(mode))?;

        let mut observed = self.mode;
        let result = self.poll::<CanControl, _, _>(POLL_ATTEMPTS - 1, delay, ErrorKind::ModeTimeout, |control| {
            observed = control.operation_mode();
            observed == mode
        });
        self.mode = observed;

        if result.is_err() {
            debug!("Device did not enter mode {mode:?} within timeout. Current mode: {observed:?}");
        }

        result.map(|_| ())
    }

    /// Waits until FRESET of the FIFO control register at the given address got cleared
    fn wait_fifo_reset<DL: DelayNs>(&mut self, address: u16, delay: &mut DL) -> Result<(), ErrorKind> {
        self.poll_word(address, POLL_ATTEMPTS, delay, ErrorKind::ControllerBusy, |word| {
            !FifoControl::from_word(word).freset()
        })?;

        Ok(())
    }

    /// Reads the register until the condition holds, returns the last value read
    fn poll<R, DL, F>(&mut self, attempts: u32, delay: &mut DL, timeout: ErrorKind, mut ready: F) -> Result<R, ErrorKind>
    where
        R: SingleRegister,
        DL: DelayNs,
        F: FnMut(&R) -> bool,
    {
        let word = self.poll_word(R::ADDRESS, attempts, delay, timeout, |word| ready(&R::from_word(word)))?;
        let register = R::from_word(word);

        if let Some(control) = Self::as_can_control::<R>(&register) {
            self.mode = control.operation_mode();
        }

        Ok(register)
    }

    /// Reads the word at the given address up to `attempts` times with a delay of
    /// [POLL_INTERVAL_US] after every read not fulfilling the condition
    fn poll_word<DL, F>(
        &mut self,
        address: u16,
        attempts: u32,
        delay: &mut DL,
        timeout: ErrorKind,
        mut ready: F,
    ) -> Result<u32, ErrorKind>
    where
        DL: DelayNs,
        F: FnMut(u32) -> bool,
    {
        for _ in 0..attempts {
            let word = self.transport.read_reg(address)?;

            if ready(word) {
                return Ok(word);
            }

            delay.delay_us(POLL_INTERVAL_US);
        }

        debug!("Timeout polling register 0x{address:03X}");
        Err(timeout)
    }

    fn write_register<R: SingleRegister>(&mut self, register: R) -> Result<(), ErrorKind> {
        self.transport.write_reg(R::ADDRESS, register.encode())?;

        Ok(())
    }

    /// CiCON view of a register, used to track the operation mode on every read
    fn as_can_control<R: SingleRegister>(register: &R) -> Option<CanControl> {
        (R::ADDRESS == CanControl::ADDRESS).then(|| CanControl::from_word(register.word()))
    }
}
