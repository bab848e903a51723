//! # Type-erased, value-level module for GPIO pins
//!
//! Although the type-level API is generally preferred, it is not suitable in
//! all cases. Because each pin is represented by a distinct type, it is not
//! possible to store multiple pins in a homogeneous data structure. The
//! value-level API solves this problem by erasing the type information and
//! tracking the pin at run-time.
//!
//! Value-level pins are represented by the [`DynPin`] type. [`DynPin`] carries
//! a [`DynPinId`] and a [`DynPinMode`], mirroring the type-level API.
//!
//! Instances of [`DynPin`] cannot be created directly. Rather, they must be
//! created from their type-level equivalents using [`From`]/[`Into`].
//!
//! ```ignore
//! // Move a pin out of the Pins struct and convert to a DynPin
//! let pa0: DynPin = pins.pa0.into();
//! ```
//!
//! Conversions between pin modes use a value-level version of the type-level
//! API.
//!
//! ```ignore
//! // Use one of the literal function names
//! pa0.into_floating_input();
//! // Use a method and a DynPinMode variant
//! pa0.into_mode(DYN_FLOATING_INPUT);
//! ```
//!
//! Because the pin state cannot be tracked at compile-time, many [`DynPin`]
//! operations become fallible. Run-time checks are inserted to ensure that
//! users don't try to, for example, set the output level of an input pin.
//!
//! Users may try to convert value-level pins back to their type-level
//! equivalents. However, this option is fallible, because the compiler cannot
//! guarantee the pin has the correct ID or is in the correct mode at
//! compile-time. Use [`TryFrom`](core::convert::TryFrom)/
//! [`TryInto`](core::convert::TryInto) for this conversion.
//!
//! # Embedded HAL traits
//!
//! This module implements the embedded HAL GPIO traits for [`DynPin`].
//! Whereas the type-level API uses `Error = core::convert::Infallible`, the
//! value-level API returns [`PinError::InvalidPinType`] if the pin is not in
//! the correct [`DynPinMode`] for the operation.

use super::{
    pins::{InterruptEdge, Pin, PinError, PinId, PinMode, Speed},
    reg::RegisterInterface,
};
use crate::regs::{Exti, NvicIser, PortRegisterBlock, Rcc, Syscfg};
use embedded_hal::digital::v2::{InputPin, OutputPin, StatefulOutputPin, ToggleableOutputPin};

//==================================================================================================
//  DynPinMode configurations
//==================================================================================================

/// Value-level `enum` for input configurations
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DynInput {
    Floating,
    PullDown,
    PullUp,
}

/// Value-level `enum` for output configurations
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DynOutput {
    PushPull,
    OpenDrain,
}

/// Value-level `enum` for the 16 alternate function codes
///
/// The discriminant is the 4-bit AFR field value.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DynAlternate {
    Af0 = 0,
    Af1 = 1,
    Af2 = 2,
    Af3 = 3,
    Af4 = 4,
    Af5 = 5,
    Af6 = 6,
    Af7 = 7,
    Af8 = 8,
    Af9 = 9,
    Af10 = 10,
    Af11 = 11,
    Af12 = 12,
    Af13 = 13,
    Af14 = 14,
    Af15 = 15,
}

//==================================================================================================
//  DynPinMode
//==================================================================================================

/// Value-level `enum` representing pin modes
///
/// These are the four legal states of the MODER field. An interrupt-routed
/// pin is not a separate mode, it stays an [`Input`](DynPinMode::Input).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DynPinMode {
    Input(DynInput),
    Output(DynOutput),
    Alternate(DynAlternate),
    Analog,
}

/// Value-level variant of [`DynPinMode`] for floating input mode
pub const DYN_FLOATING_INPUT: DynPinMode = DynPinMode::Input(DynInput::Floating);
/// Value-level variant of [`DynPinMode`] for pull-down input mode
pub const DYN_PULL_DOWN_INPUT: DynPinMode = DynPinMode::Input(DynInput::PullDown);
/// Value-level variant of [`DynPinMode`] for pull-up input mode
pub const DYN_PULL_UP_INPUT: DynPinMode = DynPinMode::Input(DynInput::PullUp);

/// Value-level variant of [`DynPinMode`] for push-pull output mode
pub const DYN_PUSH_PULL_OUTPUT: DynPinMode = DynPinMode::Output(DynOutput::PushPull);
/// Value-level variant of [`DynPinMode`] for open-drain output mode
pub const DYN_OPEN_DRAIN_OUTPUT: DynPinMode = DynPinMode::Output(DynOutput::OpenDrain);

/// Value-level variant of [`DynPinMode`] for analog mode
pub const DYN_ANALOG: DynPinMode = DynPinMode::Analog;

//==================================================================================================
//  DynGroup & DynPinId
//==================================================================================================

/// Value-level `enum` for the eight GPIO ports
///
/// The discriminant doubles as the port code written into the EXTI line
/// multiplexer and as the index of the port's clock and reset bits.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DynGroup {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

/// Value-level `struct` representing pin IDs
///
/// Instances only exist for pins 0-15 of ports A-H; the fields cannot be
/// forged from outside the crate, which is what makes the unchecked bit
/// shifts downstream sound.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct DynPinId {
    group: DynGroup,
    num: u8,
}

impl DynPinId {
    pub(crate) const fn new(group: DynGroup, num: u8) -> Self {
        DynPinId { group, num }
    }

    /// Port this pin belongs to
    #[inline]
    pub fn group(&self) -> DynGroup {
        self.group
    }

    /// Pin number within the port, 0-15
    #[inline]
    pub fn num(&self) -> u8 {
        self.num
    }
}

//==================================================================================================
//  DynRegisters
//==================================================================================================

/// Provide a safe register interface for [`DynPin`]s
///
/// This `struct` takes ownership of a [`DynPinId`] and provides an API to
/// access the corresponding registers.
struct DynRegisters {
    port: *const PortRegisterBlock,
    id: DynPinId,
}

// [`DynRegisters`] takes ownership of the [`DynPinId`], and [`DynPin`]
// guarantees that each pin is a singleton, so this implementation is safe.
unsafe impl RegisterInterface for DynRegisters {
    #[inline]
    fn id(&self) -> DynPinId {
        self.id
    }

    #[inline]
    fn port_reg(&self) -> &PortRegisterBlock {
        unsafe { &*self.port }
    }
}

impl DynRegisters {
    /// Create a new instance of [`DynRegisters`]
    ///
    /// # Safety
    ///
    /// Users must never create two simultaneous instances of this `struct`
    /// with the same [`DynPinId`], and `port` must be the block of the ID's
    /// port
    #[inline]
    unsafe fn new(port: *const PortRegisterBlock, id: DynPinId) -> Self {
        DynRegisters { port, id }
    }
}

//==================================================================================================
//  DynPin
//==================================================================================================

/// A value-level pin, parameterized by [`DynPinId`] and [`DynPinMode`]
///
/// This type acts as a type-erased version of [`Pin`]. Every pin is
/// represented by the same type, and pins are tracked and distinguished at
/// run-time.
pub struct DynPin {
    regs: DynRegisters,
    mode: DynPinMode,
}

// See the Send impl for Pin
unsafe impl Send for DynPin {}

impl DynPin {
    /// Create a new [`DynPin`]
    ///
    /// # Safety
    ///
    /// Each [`DynPin`] must be a singleton. For a given [`DynPinId`], there
    /// must be at most one corresponding [`DynPin`] in existence at any given
    /// time. Violating this requirement is `unsafe`.
    #[inline]
    unsafe fn new(port: *const PortRegisterBlock, id: DynPinId, mode: DynPinMode) -> Self {
        DynPin {
            regs: DynRegisters::new(port, id),
            mode,
        }
    }

    /// Return a copy of the pin ID
    #[inline]
    pub fn id(&self) -> DynPinId {
        self.regs.id
    }

    /// Return a copy of the pin mode
    #[inline]
    pub fn mode(&self) -> DynPinMode {
        self.mode
    }

    /// Convert the pin to the requested [`DynPinMode`]
    #[inline]
    pub fn into_mode(&mut self, mode: DynPinMode) {
        // Only modify registers if we are actually changing pin mode
        if mode != self.mode {
            self.regs.change_mode(mode);
            self.mode = mode;
        }
    }

    #[inline]
    pub fn into_floating_input(&mut self) {
        self.into_mode(DYN_FLOATING_INPUT);
    }

    #[inline]
    pub fn into_pull_down_input(&mut self) {
        self.into_mode(DYN_PULL_DOWN_INPUT);
    }

    #[inline]
    pub fn into_pull_up_input(&mut self) {
        self.into_mode(DYN_PULL_UP_INPUT);
    }

    #[inline]
    pub fn into_push_pull_output(&mut self) {
        self.into_mode(DYN_PUSH_PULL_OUTPUT);
    }

    #[inline]
    pub fn into_open_drain_output(&mut self) {
        self.into_mode(DYN_OPEN_DRAIN_OUTPUT);
    }

    #[inline]
    pub fn into_analog(&mut self) {
        self.into_mode(DYN_ANALOG);
    }

    #[inline]
    pub fn into_alternate(&mut self, af: DynAlternate) {
        self.into_mode(DynPinMode::Alternate(af));
    }

    /// Set the output slew rate
    ///
    /// Fails if the pin does not drive anything, i.e. is neither an output
    /// nor an alternate function.
    pub fn set_speed(&mut self, speed: Speed) -> Result<(), PinError> {
        match self.mode {
            DynPinMode::Output(_) | DynPinMode::Alternate(_) => {
                self.regs.set_speed(speed);
                Ok(())
            }
            _ => Err(PinError::InvalidPinType),
        }
    }

    /// Route a voltage edge on this pin to a CPU interrupt
    ///
    /// Value-level version of [`Pin::interrupt_edge`]; the pin must be in an
    /// input mode.
    pub fn interrupt_edge(
        &mut self,
        edge: InterruptEdge,
        rcc: &mut Rcc,
        syscfg: &mut Syscfg,
        exti: &mut Exti,
        nvic: &mut NvicIser,
    ) -> Result<(), PinError> {
        match self.mode {
            DynPinMode::Input(_) => {
                crate::exti::enable_interrupt_line(rcc, syscfg, exti, nvic, self.regs.id, edge);
                Ok(())
            }
            _ => Err(PinError::InvalidPinType),
        }
    }

    #[inline]
    fn _read(&self) -> Result<bool, PinError> {
        match self.mode {
            DynPinMode::Input(_) | DYN_OPEN_DRAIN_OUTPUT => Ok(self.regs.read_pin()),
            _ => Err(PinError::InvalidPinType),
        }
    }

    #[inline]
    fn _write(&mut self, bit: bool) -> Result<(), PinError> {
        match self.mode {
            DynPinMode::Output(_) => {
                self.regs.write_pin(bit);
                Ok(())
            }
            _ => Err(PinError::InvalidPinType),
        }
    }

    #[inline]
    fn _read_out(&self) -> Result<bool, PinError> {
        match self.mode {
            DynPinMode::Output(_) => Ok(self.regs.read_out()),
            _ => Err(PinError::InvalidPinType),
        }
    }

    #[inline]
    fn _toggle(&mut self) -> Result<(), PinError> {
        match self.mode {
            DynPinMode::Output(_) => {
                self.regs.toggle();
                Ok(())
            }
            _ => Err(PinError::InvalidPinType),
        }
    }
}

//==================================================================================================
//  Convert between Pin and DynPin
//==================================================================================================

impl<I: PinId, M: PinMode> From<Pin<I, M>> for DynPin {
    /// Erase the type-level information in a [`Pin`] and return a value-level
    /// [`DynPin`]
    #[inline]
    fn from(pin: Pin<I, M>) -> Self {
        // The Pin was a singleton and is dropped here
        unsafe { DynPin::new(pin.regs.port, I::DYN, M::DYN) }
    }
}

impl<I: PinId, M: PinMode> TryFrom<DynPin> for Pin<I, M> {
    type Error = PinError;

    /// Try to recreate a type-level [`Pin`] from a value-level [`DynPin`]
    ///
    /// There is no way for the compiler to know if the conversion will be
    /// successful at compile-time. We must verify the conversion at run-time
    /// or refuse to perform it.
    #[inline]
    fn try_from(pin: DynPin) -> Result<Self, Self::Error> {
        if pin.regs.id == I::DYN && pin.mode == M::DYN {
            // The DynPin was a singleton and is dropped here
            Ok(unsafe { Self::new(pin.regs.port) })
        } else {
            Err(PinError::InvalidPinType)
        }
    }
}

//==================================================================================================
//  Embedded HAL traits
//==================================================================================================

impl OutputPin for DynPin {
    type Error = PinError;

    #[inline]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self._write(true)
    }

    #[inline]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self._write(false)
    }
}

impl StatefulOutputPin for DynPin {
    #[inline]
    fn is_set_high(&self) -> Result<bool, Self::Error> {
        self._read_out()
    }

    #[inline]
    fn is_set_low(&self) -> Result<bool, Self::Error> {
        self._read_out().map(|v| !v)
    }
}

impl ToggleableOutputPin for DynPin {
    type Error = PinError;

    #[inline]
    fn toggle(&mut self) -> Result<(), Self::Error> {
        self._toggle()
    }
}

impl InputPin for DynPin {
    type Error = PinError;

    #[inline]
    fn is_high(&self) -> Result<bool, Self::Error> {
        self._read()
    }

    #[inline]
    fn is_low(&self) -> Result<bool, Self::Error> {
        self._read().map(|v| !v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::{PinsE, PC13};
    use crate::regs::{zeroed_block, Gpioc, Gpioe, PortRegisterBlock, Rcc, RccRegisterBlock};

    #[test]
    fn mode_sweep_touches_only_own_window() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let port_block: PortRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let pins = PinsE::new(&mut rcc, Gpioe::test_instance(&port_block));

        let mut dpins: [DynPin; 16] = [
            pins.pe0.into(),
            pins.pe1.into(),
            pins.pe2.into(),
            pins.pe3.into(),
            pins.pe4.into(),
            pins.pe5.into(),
            pins.pe6.into(),
            pins.pe7.into(),
            pins.pe8.into(),
            pins.pe9.into(),
            pins.pe10.into(),
            pins.pe11.into(),
            pins.pe12.into(),
            pins.pe13.into(),
            pins.pe14.into(),
            pins.pe15.into(),
        ];

        let sweep = [
            (DYN_PUSH_PULL_OUTPUT, 0b01),
            (DYN_ANALOG, 0b11),
            (DynPinMode::Alternate(DynAlternate::Af3), 0b10),
            (DYN_FLOATING_INPUT, 0b00),
        ];
        for (num, pin) in dpins.iter_mut().enumerate() {
            for (mode, field) in sweep {
                let shift = 2 * num as u32;
                let before = port_block.moder.read();
                pin.into_mode(mode);
                let after = port_block.moder.read();
                assert_eq!((after >> shift) & 0b11, field);
                // Every other pin's window is untouched
                assert_eq!(after & !(0b11 << shift), before & !(0b11 << shift));
            }
        }
    }

    #[test]
    fn operations_in_wrong_mode_are_rejected() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let port_block: PortRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let pins = PinsE::new(&mut rcc, Gpioe::test_instance(&port_block));

        let mut pe4: DynPin = pins.pe4.into();
        assert_eq!(pe4.set_high(), Err(PinError::InvalidPinType));
        assert_eq!(pe4.toggle(), Err(PinError::InvalidPinType));
        assert_eq!(pe4.set_speed(Speed::Fast), Err(PinError::InvalidPinType));
        // Nothing was written
        assert_eq!(port_block.bsrr.read(), 0);
        assert_eq!(port_block.odr.read(), 0);
        assert_eq!(port_block.ospeedr.read(), 0);

        pe4.into_push_pull_output();
        assert_eq!(pe4.is_high(), Err(PinError::InvalidPinType));
        assert!(pe4.set_high().is_ok());
        assert_eq!(port_block.bsrr.read(), 1 << 4);
    }

    #[test]
    fn open_drain_output_is_readable() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let port_block: PortRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let pins = PinsE::new(&mut rcc, Gpioe::test_instance(&port_block));

        let mut pe9: DynPin = pins.pe9.into();
        pe9.into_open_drain_output();
        port_block.idr.write(1 << 9);
        assert_eq!(pe9.is_high(), Ok(true));
    }

    #[test]
    fn typed_dyn_roundtrip() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let port_block: PortRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let pins = crate::gpio::PinsC::new(&mut rcc, Gpioc::test_instance(&port_block));

        let pc13 = pins.pc13.into_pull_up_input();
        let dyn_pin: DynPin = pc13.into();
        assert_eq!(dyn_pin.mode(), DYN_PULL_UP_INPUT);
        assert_eq!(dyn_pin.id().num(), 13);
        assert_eq!(dyn_pin.id().group(), DynGroup::C);

        // Wrong target mode is refused
        let res: Result<Pin<PC13, crate::gpio::PushPullOutput>, _> = dyn_pin.try_into();
        assert!(res.is_err());
    }
}
