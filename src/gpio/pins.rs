//! # Type-level module for GPIO pins
//!
//! This module provides a type-level API for GPIO pins. It uses the type
//! system to track the state of pins at compile-time, so invalid register
//! writes (driving an input pin, arming an interrupt edge on a pin in analog
//! mode, alternate function codes on non-alternate pins) are rejected before
//! the code ever runs. The layout follows the
//! [ATSAMD HAL](https://docs.rs/atsamd-hal/0.13.0/atsamd_hal/gpio/v2/index.html)
//! pattern.
//!
//! Type-level [`Pin`]s are parameterized by two type-level enums, [`PinId`]
//! and [`PinMode`].
//!
//! ```ignore
//! pub struct Pin<I, M>
//! where
//!     I: PinId,
//!     M: PinMode,
//! {
//!     // ...
//! }
//! ```
//!
//! A `PinId` identifies a pin by its port (A-H) and pin number, e.g.
//! [`PC13`]. A `PinMode` is one of [`Input`], [`Output`], [`Alternate`] or
//! [`Analog`], the four states of the two-bit MODER field.
//!
//! It is not possible for users to create new instances of a [`Pin`].
//! Singleton instances of each pin are made available through the per-port
//! pin collections ([`PinsA`] .. [`PinsH`]), which consume the port
//! peripheral proxy and enable its bus clock before any pin register is
//! touched:
//!
//! ```ignore
//! let mut dp = Peripherals::take().unwrap();
//! let pinsc = PinsC::new(&mut dp.RCC, dp.GPIOC);
//! let button = pinsc.pc13.into_pull_up_input();
//! ```
//!
//! Pins are converted between modes with the `into_*` methods or the generic
//! [`Pin::into_mode`].
//!
//! # Interrupt routing
//!
//! Requesting an interrupt edge is deliberately *not* a [`PinMode`]: the
//! hardware MODER field has no interrupt state, and an interrupt-configured
//! pin stays a plain input. [`Pin::interrupt_edge`] leaves MODER alone and
//! wires the line-multiplexer, trigger and interrupt-controller stages in
//! the [`exti`](crate::exti) module instead.
//!
//! # Embedded HAL traits
//!
//! This module implements the embedded HAL GPIO traits for each [`Pin`] in
//! the corresponding [`PinMode`]s, namely [`InputPin`], [`OutputPin`],
//! [`StatefulOutputPin`] and [`ToggleableOutputPin`].

use super::dynpins::{DynAlternate, DynGroup, DynInput, DynOutput, DynPinId, DynPinMode};
use super::reg::RegisterInterface;
use crate::{
    clock::{enable_peripheral_clock, PeripheralClock},
    regs::{Exti, NvicIser, PortRegisterBlock, Rcc, Syscfg},
    typelevel::Is,
    Sealed,
};
use core::convert::Infallible;
use core::marker::PhantomData;
use embedded_hal::digital::v2::{InputPin, OutputPin, StatefulOutputPin, ToggleableOutputPin};
use paste::paste;

//==================================================================================================
//  Errors and Definitions
//==================================================================================================

/// Voltage transitions that latch a pending interrupt on an EXTI line
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InterruptEdge {
    HighToLow,
    LowToHigh,
    BothEdges,
}

/// Output slew rate, the two-bit OSPEEDR value
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Speed {
    Low = 0b00,
    Medium = 0b01,
    Fast = 0b10,
    High = 0b11,
}

/// GPIO error type
#[derive(Debug, PartialEq, Eq)]
pub enum PinError {
    /// The pin did not have the correct mode for the requested operation.
    /// [`DynPin`](crate::gpio::DynPin)s are not tracked and verified at
    /// compile-time, so run-time operations are fallible.
    InvalidPinType,
}

//==================================================================================================
// Input configuration
//==================================================================================================

/// Type-level enum for input configurations
///
/// The valid options are [`Floating`], [`PullDown`] and [`PullUp`].
pub trait InputConfig: Sealed {
    /// Corresponding [`DynInput`](super::DynInput)
    const DYN: DynInput;
}

pub enum Floating {}
pub enum PullDown {}
pub enum PullUp {}

impl InputConfig for Floating {
    const DYN: DynInput = DynInput::Floating;
}
impl InputConfig for PullDown {
    const DYN: DynInput = DynInput::PullDown;
}
impl InputConfig for PullUp {
    const DYN: DynInput = DynInput::PullUp;
}

impl Sealed for Floating {}
impl Sealed for PullDown {}
impl Sealed for PullUp {}

/// Type-level variant of [`PinMode`] for floating input mode
pub type InputFloating = Input<Floating>;
/// Type-level variant of [`PinMode`] for pull-down input mode
pub type InputPullDown = Input<PullDown>;
/// Type-level variant of [`PinMode`] for pull-up input mode
pub type InputPullUp = Input<PullUp>;

/// Type-level variant of [`PinMode`] for input modes
///
/// Type `C` is one of three input configurations: [`Floating`], [`PullDown`]
/// or [`PullUp`]
pub struct Input<C: InputConfig> {
    cfg: PhantomData<C>,
}

impl<C: InputConfig> Sealed for Input<C> {}

//==================================================================================================
// Output configuration
//==================================================================================================

pub trait OutputConfig: Sealed {
    const DYN: DynOutput;
}

/// Type-level variant of [`OutputConfig`] for a push-pull configuration
pub enum PushPull {}
/// Type-level variant of [`OutputConfig`] for an open drain configuration
pub enum OpenDrain {}

impl Sealed for PushPull {}
impl Sealed for OpenDrain {}

impl OutputConfig for PushPull {
    const DYN: DynOutput = DynOutput::PushPull;
}
impl OutputConfig for OpenDrain {
    const DYN: DynOutput = DynOutput::OpenDrain;
}

/// Type-level variant of [`PinMode`] for output modes
///
/// Type `C` is one of two output configurations: [`PushPull`] or
/// [`OpenDrain`]
pub struct Output<C: OutputConfig> {
    cfg: PhantomData<C>,
}

impl<C: OutputConfig> Sealed for Output<C> {}

/// Type-level variant of [`PinMode`] for push-pull output mode
pub type PushPullOutput = Output<PushPull>;
/// Type-level variant of [`PinMode`] for open drain output mode
pub type OutputOpenDrain = Output<OpenDrain>;

//==================================================================================================
//  Analog configuration
//==================================================================================================

/// Type-level variant of [`PinMode`] for analog mode
///
/// Both MODER bits are set and the pull resistors are disconnected.
pub enum Analog {}
impl Sealed for Analog {}

//==================================================================================================
//  Alternate configurations
//==================================================================================================

/// Type-level enum for the 16 alternate peripheral function codes
pub trait AlternateConfig: Sealed {
    const DYN: DynAlternate;
}

macro_rules! alt_func {
    ($(($Af:ident, $NUM:literal),)+) => {
        $(
            paste! {
                #[doc = "Type-level variant of [`AlternateConfig`] for alternate function " $NUM]
                pub enum $Af {}
                impl Sealed for $Af {}
                impl AlternateConfig for $Af {
                    const DYN: DynAlternate = DynAlternate::$Af;
                }
            }
        )+
    };
}

alt_func!(
    (Af0, 0),
    (Af1, 1),
    (Af2, 2),
    (Af3, 3),
    (Af4, 4),
    (Af5, 5),
    (Af6, 6),
    (Af7, 7),
    (Af8, 8),
    (Af9, 9),
    (Af10, 10),
    (Af11, 11),
    (Af12, 12),
    (Af13, 13),
    (Af14, 14),
    (Af15, 15),
);

/// Type-level variant of [`PinMode`] for alternate peripheral functions
///
/// Type `C` is an [`AlternateConfig`]. Which peripheral a code selects on a
/// given pin comes from the board's alternate function table and is not
/// modeled here.
pub struct Alternate<C: AlternateConfig> {
    cfg: PhantomData<C>,
}

impl<C: AlternateConfig> Sealed for Alternate<C> {}

/// Type alias for the [`PinMode`] at reset
pub type Reset = InputFloating;

//==================================================================================================
//  Pin modes
//==================================================================================================

/// Type-level enum representing pin modes
///
/// The valid options are [`Input`], [`Output`], [`Alternate`] and
/// [`Analog`], the four legal states of the hardware MODER field. Interrupt
/// configuration is intentionally absent here, see the module docs.
pub trait PinMode: Sealed {
    /// Corresponding [`DynPinMode`](super::DynPinMode)
    const DYN: DynPinMode;
}

impl<C: InputConfig> PinMode for Input<C> {
    const DYN: DynPinMode = DynPinMode::Input(C::DYN);
}
impl<C: OutputConfig> PinMode for Output<C> {
    const DYN: DynPinMode = DynPinMode::Output(C::DYN);
}
impl<C: AlternateConfig> PinMode for Alternate<C> {
    const DYN: DynPinMode = DynPinMode::Alternate(C::DYN);
}
impl PinMode for Analog {
    const DYN: DynPinMode = DynPinMode::Analog;
}

//==================================================================================================
//  Pin IDs
//==================================================================================================

/// Type-level enum for pin IDs
pub trait PinId: Sealed {
    /// Corresponding [`DynPinId`](super::DynPinId)
    const DYN: DynPinId;
}

macro_rules! pin_id {
    ($Group:ident, $Id:ident, $NUM:literal) => {
        // Need paste macro to use ident in doc attribute
        paste! {
            #[doc = "Pin ID representing pin " $Id]
            pub enum $Id {}
            impl Sealed for $Id {}
            impl PinId for $Id {
                const DYN: DynPinId = DynPinId::new(DynGroup::$Group, $NUM);
            }
        }
    };
}

//==================================================================================================
//  Pin
//==================================================================================================

/// A type-level GPIO pin, parameterized by [`PinId`] and [`PinMode`] types
pub struct Pin<I: PinId, M: PinMode> {
    pub(in crate::gpio) regs: Registers<I>,
    mode: PhantomData<M>,
}

impl<I: PinId, M: PinMode> Sealed for Pin<I, M> {}

// The pin only touches registers of its own singleton ID
unsafe impl<I: PinId, M: PinMode> Send for Pin<I, M> {}

impl<I: PinId, M: PinMode> AnyPin for Pin<I, M> {
    type Id = I;
    type Mode = M;
}

impl<I: PinId, M: PinMode> Pin<I, M> {
    /// Create a new [`Pin`]
    ///
    /// # Safety
    ///
    /// Each [`Pin`] must be a singleton. For a given [`PinId`], there must be
    /// at most one corresponding [`Pin`] in existence at any given time, and
    /// `port` must point at the register block the ID belongs to.
    #[inline]
    pub(crate) unsafe fn new(port: *const PortRegisterBlock) -> Pin<I, M> {
        Pin {
            regs: Registers::new(port),
            mode: PhantomData,
        }
    }

    /// Convert the pin to the requested [`PinMode`]
    #[inline]
    pub fn into_mode<N: PinMode>(mut self) -> Pin<I, N> {
        // Only modify registers if we are actually changing pin mode
        // This check should compile away
        if N::DYN != M::DYN {
            self.regs.change_mode::<N>();
        }
        let port = self.regs.port;
        // Safe because we drop the existing Pin
        unsafe { Pin::new(port) }
    }

    /// Configure the pin to operate as a floating input
    #[inline]
    pub fn into_floating_input(self) -> Pin<I, InputFloating> {
        self.into_mode()
    }

    /// Configure the pin to operate as a pulled down input
    #[inline]
    pub fn into_pull_down_input(self) -> Pin<I, InputPullDown> {
        self.into_mode()
    }

    /// Configure the pin to operate as a pulled up input
    #[inline]
    pub fn into_pull_up_input(self) -> Pin<I, InputPullUp> {
        self.into_mode()
    }

    /// Configure the pin to operate as a push-pull output
    #[inline]
    pub fn into_push_pull_output(self) -> Pin<I, PushPullOutput> {
        self.into_mode()
    }

    /// Configure the pin to operate as an open-drain output
    #[inline]
    pub fn into_open_drain_output(self) -> Pin<I, OutputOpenDrain> {
        self.into_mode()
    }

    /// Configure the pin for analog use, disconnecting the digital paths
    #[inline]
    pub fn into_analog(self) -> Pin<I, Analog> {
        self.into_mode()
    }

    /// Configure the pin for the given alternate function code
    ///
    /// The mapping from code to peripheral is board specific, see the device
    /// datasheet's alternate function table.
    #[inline]
    pub fn into_alternate<C: AlternateConfig>(self) -> Pin<I, Alternate<C>> {
        self.into_mode()
    }

    #[inline]
    pub(crate) fn _set_high(&mut self) {
        self.regs.write_pin(true)
    }

    #[inline]
    pub(crate) fn _set_low(&mut self) {
        self.regs.write_pin(false)
    }

    #[inline]
    pub(crate) fn _toggle(&mut self) {
        self.regs.toggle();
    }

    #[inline]
    pub(crate) fn _is_low(&self) -> bool {
        !self.regs.read_pin()
    }

    #[inline]
    pub(crate) fn _is_high(&self) -> bool {
        self.regs.read_pin()
    }
}

pub type SpecificPin<P> = Pin<<P as AnyPin>::Id, <P as AnyPin>::Mode>;

//==================================================================================================
//  AnyPin
//==================================================================================================

/// Type class for [`Pin`] types
///
/// This trait uses the `AnyKind` trait pattern to create a type class for
/// [`Pin`] types. See the [`typelevel`](crate::typelevel) documentation for
/// more details on the pattern.
pub trait AnyPin: Is<Type = SpecificPin<Self>> {
    type Id: PinId;
    type Mode: PinMode;
}

impl<I: PinId, M: PinMode> AsRef<Self> for Pin<I, M> {
    #[inline]
    fn as_ref(&self) -> &Self {
        self
    }
}

impl<I: PinId, M: PinMode> AsMut<Self> for Pin<I, M> {
    #[inline]
    fn as_mut(&mut self) -> &mut Self {
        self
    }
}

//==================================================================================================
//  Additional functionality
//==================================================================================================

impl<I: PinId, C: InputConfig> Pin<I, Input<C>> {
    /// Route a voltage edge on this pin to a CPU interrupt
    ///
    /// Runs the full three-stage chain in order: the pin's line is assigned
    /// to its port in the SYSCFG multiplexer, the line is unmasked and the
    /// requested trigger edges are armed in EXTI, and the line's vector is
    /// enabled in the NVIC. MODER is not touched, the pin stays an input.
    ///
    /// Reconfiguring the edge of a line that is already live has a transient
    /// window with no edge armed; mask the line first if that matters, see
    /// [`exti::mask_line`](crate::exti::mask_line).
    pub fn interrupt_edge(
        self,
        edge: InterruptEdge,
        rcc: &mut Rcc,
        syscfg: &mut Syscfg,
        exti: &mut Exti,
        nvic: &mut NvicIser,
    ) -> Self {
        crate::exti::enable_interrupt_line(rcc, syscfg, exti, nvic, I::DYN, edge);
        self
    }
}

impl<I: PinId, C: OutputConfig> Pin<I, Output<C>> {
    /// Set the output slew rate
    #[inline]
    pub fn speed(mut self, speed: Speed) -> Self {
        self.regs.set_speed(speed);
        self
    }
}

impl<I: PinId, C: AlternateConfig> Pin<I, Alternate<C>> {
    /// Set the output slew rate of the alternate function output
    #[inline]
    pub fn speed(mut self, speed: Speed) -> Self {
        self.regs.set_speed(speed);
        self
    }
}

//==================================================================================================
//  Embedded HAL traits
//==================================================================================================

impl<I: PinId, C: OutputConfig> OutputPin for Pin<I, Output<C>> {
    type Error = Infallible;

    #[inline]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self._set_high();
        Ok(())
    }

    #[inline]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self._set_low();
        Ok(())
    }
}

impl<I: PinId, C: OutputConfig> StatefulOutputPin for Pin<I, Output<C>> {
    #[inline]
    fn is_set_high(&self) -> Result<bool, Self::Error> {
        Ok(self.regs.read_out())
    }

    #[inline]
    fn is_set_low(&self) -> Result<bool, Self::Error> {
        Ok(!self.regs.read_out())
    }
}

impl<I: PinId, C: OutputConfig> ToggleableOutputPin for Pin<I, Output<C>> {
    type Error = Infallible;

    #[inline]
    fn toggle(&mut self) -> Result<(), Self::Error> {
        self._toggle();
        Ok(())
    }
}

impl<I: PinId, C: InputConfig> InputPin for Pin<I, Input<C>> {
    type Error = Infallible;

    #[inline]
    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(self._is_high())
    }
    #[inline]
    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(self._is_low())
    }
}

// An open-drain output can be read back through IDR while released
impl<I: PinId> InputPin for Pin<I, OutputOpenDrain> {
    type Error = Infallible;

    #[inline]
    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(self._is_high())
    }

    #[inline]
    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(self._is_low())
    }
}

//==================================================================================================
//  Registers
//==================================================================================================

/// Provide a safe register interface for [`Pin`]s
///
/// This `struct` takes ownership of a [`PinId`] and provides an API to
/// access the corresponding registers.
pub(in crate::gpio) struct Registers<I: PinId> {
    pub(in crate::gpio) port: *const PortRegisterBlock,
    id: PhantomData<I>,
}

// [`Registers`] takes ownership of the [`PinId`], and [`Pin`] guarantees that
// each pin is a singleton, so this implementation is safe.
unsafe impl<I: PinId> RegisterInterface for Registers<I> {
    #[inline]
    fn id(&self) -> DynPinId {
        I::DYN
    }

    #[inline]
    fn port_reg(&self) -> &PortRegisterBlock {
        unsafe { &*self.port }
    }
}

impl<I: PinId> Registers<I> {
    /// Create a new instance of [`Registers`]
    ///
    /// # Safety
    ///
    /// Users must never create two simultaneous instances of this `struct`
    /// with the same [`PinId`], and `port` must be the block of the ID's port
    #[inline]
    unsafe fn new(port: *const PortRegisterBlock) -> Self {
        Registers {
            port,
            id: PhantomData,
        }
    }

    /// Provide a type-level equivalent for the
    /// [`RegisterInterface::change_mode`] method.
    #[inline]
    pub(in crate::gpio) fn change_mode<M: PinMode>(&mut self) {
        RegisterInterface::change_mode(self, M::DYN);
    }

    #[inline]
    pub(in crate::gpio) fn set_speed(&mut self, speed: Speed) {
        RegisterInterface::set_speed(self, speed);
    }

    #[inline]
    pub(in crate::gpio) fn read_out(&self) -> bool {
        RegisterInterface::read_out(self)
    }

    #[inline]
    fn write_pin(&mut self, bit: bool) {
        RegisterInterface::write_pin(self, bit);
    }

    #[inline]
    fn toggle(&mut self) {
        RegisterInterface::toggle(self);
    }

    #[inline]
    fn read_pin(&self) -> bool {
        RegisterInterface::read_pin(self)
    }
}

//==================================================================================================
//  Pin definitions
//==================================================================================================

macro_rules! pins {
    (
        $Port:ident, $PortClock:ident, $PinsName:ident, $($Id:ident,)+,
    ) => {
        paste!(
            /// Collection of all the individual [`Pin`]s for a given port
            pub struct $PinsName {
                port: $Port,
                $(
                    #[doc = "Pin " $Id]
                    pub [<$Id:lower>]: Pin<$Id, Reset>,
                )+
            }

            impl $PinsName {
                /// Create a new struct containing all the pins of the port.
                ///
                /// The port's bus clock is enabled here, before any pin
                /// register is touched, so the clock-before-configuration
                /// ordering cannot be violated through this API.
                #[inline]
                pub fn new(rcc: &mut Rcc, port: $Port) -> $PinsName {
                    enable_peripheral_clock(rcc, PeripheralClock::$PortClock);
                    let block = port.block_ptr();
                    $PinsName {
                        port,
                        // Safe because we only create one `Pin` per `PinId`
                        $(
                            [<$Id:lower>]: unsafe { Pin::new(block) },
                        )+
                    }
                }

                /// Input levels of the whole port, one bit per pin
                #[inline]
                pub fn read(&self) -> u16 {
                    (self.port.idr.read() & 0xFFFF) as u16
                }

                /// Drive all 16 output bits of the port at once
                ///
                /// The reserved upper half of ODR is masked and preserved.
                /// This is a read-modify-write and races with any concurrent
                /// writer of the same port, including the single-pin toggle.
                #[inline]
                pub fn write(&mut self, value: u16) {
                    self.port.odr.modify(|r| (r & !0xFFFF) | value as u32);
                }

                /// Consumes the Pins struct and returns the port proxy
                pub fn release(self) -> $Port {
                    self.port
                }
            }
        );
    }
}

macro_rules! declare_pins {
    (
        $Group:ident, $PinsName:ident, $Port:ident, $PortClock:ident,
        [$(($Id:ident, $NUM:literal),)+]
    ) => {
        pins!($Port, $PortClock, $PinsName, $($Id,)+,);
        $(
            pin_id!($Group, $Id, $NUM);
        )+
    }
}

use crate::regs::{Gpioa, Gpiob, Gpioc, Gpiod, Gpioe, Gpiof, Gpiog, Gpioh};

declare_pins!(
    A,
    PinsA,
    Gpioa,
    PortA,
    [
        (PA0, 0),
        (PA1, 1),
        (PA2, 2),
        (PA3, 3),
        (PA4, 4),
        (PA5, 5),
        (PA6, 6),
        (PA7, 7),
        (PA8, 8),
        (PA9, 9),
        (PA10, 10),
        (PA11, 11),
        (PA12, 12),
        (PA13, 13),
        (PA14, 14),
        (PA15, 15),
    ]
);

declare_pins!(
    B,
    PinsB,
    Gpiob,
    PortB,
    [
        (PB0, 0),
        (PB1, 1),
        (PB2, 2),
        (PB3, 3),
        (PB4, 4),
        (PB5, 5),
        (PB6, 6),
        (PB7, 7),
        (PB8, 8),
        (PB9, 9),
        (PB10, 10),
        (PB11, 11),
        (PB12, 12),
        (PB13, 13),
        (PB14, 14),
        (PB15, 15),
    ]
);

declare_pins!(
    C,
    PinsC,
    Gpioc,
    PortC,
    [
        (PC0, 0),
        (PC1, 1),
        (PC2, 2),
        (PC3, 3),
        (PC4, 4),
        (PC5, 5),
        (PC6, 6),
        (PC7, 7),
        (PC8, 8),
        (PC9, 9),
        (PC10, 10),
        (PC11, 11),
        (PC12, 12),
        (PC13, 13),
        (PC14, 14),
        (PC15, 15),
    ]
);

declare_pins!(
    D,
    PinsD,
    Gpiod,
    PortD,
    [
        (PD0, 0),
        (PD1, 1),
        (PD2, 2),
        (PD3, 3),
        (PD4, 4),
        (PD5, 5),
        (PD6, 6),
        (PD7, 7),
        (PD8, 8),
        (PD9, 9),
        (PD10, 10),
        (PD11, 11),
        (PD12, 12),
        (PD13, 13),
        (PD14, 14),
        (PD15, 15),
    ]
);

declare_pins!(
    E,
    PinsE,
    Gpioe,
    PortE,
    [
        (PE0, 0),
        (PE1, 1),
        (PE2, 2),
        (PE3, 3),
        (PE4, 4),
        (PE5, 5),
        (PE6, 6),
        (PE7, 7),
        (PE8, 8),
        (PE9, 9),
        (PE10, 10),
        (PE11, 11),
        (PE12, 12),
        (PE13, 13),
        (PE14, 14),
        (PE15, 15),
    ]
);

declare_pins!(
    F,
    PinsF,
    Gpiof,
    PortF,
    [
        (PF0, 0),
        (PF1, 1),
        (PF2, 2),
        (PF3, 3),
        (PF4, 4),
        (PF5, 5),
        (PF6, 6),
        (PF7, 7),
        (PF8, 8),
        (PF9, 9),
        (PF10, 10),
        (PF11, 11),
        (PF12, 12),
        (PF13, 13),
        (PF14, 14),
        (PF15, 15),
    ]
);

declare_pins!(
    G,
    PinsG,
    Gpiog,
    PortG,
    [
        (PG0, 0),
        (PG1, 1),
        (PG2, 2),
        (PG3, 3),
        (PG4, 4),
        (PG5, 5),
        (PG6, 6),
        (PG7, 7),
        (PG8, 8),
        (PG9, 9),
        (PG10, 10),
        (PG11, 11),
        (PG12, 12),
        (PG13, 13),
        (PG14, 14),
        (PG15, 15),
    ]
);

declare_pins!(
    H,
    PinsH,
    Gpioh,
    PortH,
    [
        (PH0, 0),
        (PH1, 1),
        (PH2, 2),
        (PH3, 3),
        (PH4, 4),
        (PH5, 5),
        (PH6, 6),
        (PH7, 7),
        (PH8, 8),
        (PH9, 9),
        (PH10, 10),
        (PH11, 11),
        (PH12, 12),
        (PH13, 13),
        (PH14, 14),
        (PH15, 15),
    ]
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regs::{zeroed_block, PortRegisterBlock, RccRegisterBlock};
    use embedded_hal::digital::v2::{
        InputPin, OutputPin, StatefulOutputPin, ToggleableOutputPin,
    };

    #[test]
    fn pins_new_enables_port_clock() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let port_block: PortRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let _pins = PinsC::new(&mut rcc, Gpioc::test_instance(&port_block));
        assert_eq!(rcc_block.ahb1enr.read(), 1 << 2);
    }

    #[test]
    fn output_mode_encodes_two_bit_field() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let port_block: PortRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let pins = PinsA::new(&mut rcc, Gpioa::test_instance(&port_block));

        let _pa5 = pins.pa5.into_push_pull_output();
        assert_eq!(port_block.moder.read(), 0b01 << 10);
        assert_eq!(port_block.otyper.read(), 0);

        let _pa7 = pins.pa7.into_open_drain_output();
        assert_eq!(port_block.moder.read(), (0b01 << 10) | (0b01 << 14));
        assert_eq!(port_block.otyper.read(), 1 << 7);
    }

    #[test]
    fn mode_change_clears_before_setting() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let port_block: PortRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let pins = PinsA::new(&mut rcc, Gpioa::test_instance(&port_block));

        // Stale 0b11 in pin 3's window plus a neighbor that must survive
        port_block.moder.write((0b11 << 6) | (0b01 << 8));
        let _pa3 = pins.pa3.into_push_pull_output();
        assert_eq!(port_block.moder.read(), (0b01 << 6) | (0b01 << 8));
    }

    #[test]
    fn pull_fields_follow_input_config() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let port_block: PortRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let pins = PinsC::new(&mut rcc, Gpioc::test_instance(&port_block));

        let pc13 = pins.pc13.into_pull_up_input();
        assert_eq!(port_block.pupdr.read(), 0b01 << 26);
        let _pc13 = pc13.into_pull_down_input();
        assert_eq!(port_block.pupdr.read(), 0b10 << 26);
    }

    #[test]
    fn analog_mode_disconnects_pulls() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let port_block: PortRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let pins = PinsA::new(&mut rcc, Gpioa::test_instance(&port_block));

        let pa1 = pins.pa1.into_pull_up_input();
        assert_eq!(port_block.pupdr.read(), 0b01 << 2);
        let _pa1 = pa1.into_analog();
        assert_eq!(port_block.moder.read(), 0b11 << 2);
        assert_eq!(port_block.pupdr.read(), 0);
    }

    #[test]
    fn alternate_function_nibble_placement() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let port_block: PortRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let pins = PinsB::new(&mut rcc, Gpiob::test_instance(&port_block));

        // Pin 10 lives in the high bank at nibble (10 % 8) * 4 = 8
        let _pb10 = pins.pb10.into_alternate::<Af7>();
        assert_eq!(port_block.afr[1].read(), 0x7 << 8);
        assert_eq!(port_block.afr[0].read(), 0);
        assert_eq!(port_block.moder.read(), 0b10 << 20);

        // Pin 4 lives in the low bank at nibble 16
        let _pb4 = pins.pb4.into_alternate::<Af15>();
        assert_eq!(port_block.afr[0].read(), 0xF << 16);
    }

    #[test]
    fn alternate_registers_untouched_for_other_modes() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let port_block: PortRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let pins = PinsB::new(&mut rcc, Gpiob::test_instance(&port_block));

        port_block.afr[0].write(0xDEAD_BEEF);
        port_block.afr[1].write(0xCAFE_F00D);
        let _pb2 = pins.pb2.into_push_pull_output();
        let _pb12 = pins.pb12.into_pull_down_input();
        assert_eq!(port_block.afr[0].read(), 0xDEAD_BEEF);
        assert_eq!(port_block.afr[1].read(), 0xCAFE_F00D);
    }

    #[test]
    fn set_and_reset_go_through_bsrr() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let port_block: PortRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let pins = PinsA::new(&mut rcc, Gpioa::test_instance(&port_block));

        let mut pa3 = pins.pa3.into_push_pull_output();
        pa3.set_high().unwrap();
        assert_eq!(port_block.bsrr.read(), 1 << 3);
        pa3.set_low().unwrap();
        assert_eq!(port_block.bsrr.read(), 1 << (3 + 16));
        // ODR itself was never read-modify-written
        assert_eq!(port_block.odr.read(), 0);
    }

    #[test]
    fn toggle_xors_odr() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let port_block: PortRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let pins = PinsA::new(&mut rcc, Gpioa::test_instance(&port_block));

        port_block.odr.write(0b1010);
        let mut pa1 = pins.pa1.into_push_pull_output();
        assert!(pa1.is_set_high().unwrap());
        pa1.toggle().unwrap();
        assert_eq!(port_block.odr.read(), 0b1000);
        assert!(pa1.is_set_low().unwrap());
    }

    #[test]
    fn input_levels_come_from_idr() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let port_block: PortRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let pins = PinsC::new(&mut rcc, Gpioc::test_instance(&port_block));

        let pc13 = pins.pc13.into_pull_up_input();
        assert!(pc13.is_low().unwrap());
        port_block.idr.write(1 << 13);
        assert!(pc13.is_high().unwrap());
    }

    #[test]
    fn port_wide_read_and_write() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let port_block: PortRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let mut pins = PinsD::new(&mut rcc, Gpiod::test_instance(&port_block));

        port_block.idr.write(0xFFFF_1234);
        assert_eq!(pins.read(), 0x1234);

        // Reserved upper half must survive a port-wide write
        port_block.odr.write(0xABCD_0000);
        pins.write(0x00FF);
        assert_eq!(port_block.odr.read(), 0xABCD_00FF);
    }

    #[test]
    fn speed_builder_sets_ospeedr() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let port_block: PortRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let pins = PinsA::new(&mut rcc, Gpioa::test_instance(&port_block));

        let _pa8 = pins.pa8.into_push_pull_output().speed(Speed::High);
        assert_eq!(port_block.ospeedr.read(), 0b11 << 16);
    }
}
