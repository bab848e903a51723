#![cfg_attr(not(test), no_std)]

pub use crate::regs as pac;

pub mod clock;
pub mod exti;
pub mod gpio;
pub mod prelude;
pub mod pwm;
pub mod regs;
pub mod time;
pub mod typelevel;

mod private {
    /// Super trait used to mark traits with an exhaustive set of
    /// implementations
    pub trait Sealed {}
}

pub(crate) use private::Sealed;
