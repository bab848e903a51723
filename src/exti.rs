//! External interrupt routing
//!
//! Three peripheral blocks sit between a voltage edge on a pin and the CPU
//! taking an interrupt, and all three must be configured, in order:
//!
//! 1. The SYSCFG line multiplexer assigns EXTI line N to one port's pin N
//!    ([`route_line`]).
//! 2. The EXTI block unmasks line N and arms the requested trigger edges
//!    ([`set_edge_trigger`]).
//! 3. The NVIC enables the vector the line is wired to ([`enable_in_nvic`]).
//!
//! [`enable_interrupt_line`] runs the whole chain; the pin-level entry points
//! are [`Pin::interrupt_edge`](crate::gpio::Pin::interrupt_edge) and its
//! [`DynPin`](crate::gpio::DynPin) counterpart.
use crate::clock::{enable_peripheral_clock, PeripheralClock};
use crate::gpio::{DynPinId, InterruptEdge};
use crate::regs::{Exti, Interrupt, NvicIser, Rcc, Syscfg};

/// NVIC vector a given EXTI line is wired to
///
/// Lines 0-4 have dedicated vectors; lines 5-9 and 10-15 each share one, so
/// handlers for those must inspect the EXTI pending register to tell the
/// lines apart.
pub const fn irq_for_line(line: u8) -> Interrupt {
    match line {
        0 => Interrupt::Exti0,
        1 => Interrupt::Exti1,
        2 => Interrupt::Exti2,
        3 => Interrupt::Exti3,
        4 => Interrupt::Exti4,
        5..=9 => Interrupt::Exti9_5,
        _ => Interrupt::Exti15_10,
    }
}

/// Stage 1: assign an EXTI line to a port in the SYSCFG multiplexer
///
/// The SYSCFG bus clock is enabled first; without it the EXTICR write is
/// silently lost. Each EXTICR register holds four lines, one nibble per
/// line, and the nibble is cleared before the port code is OR-ed in.
pub fn route_line(rcc: &mut Rcc, syscfg: &mut Syscfg, id: DynPinId) {
    enable_peripheral_clock(rcc, PeripheralClock::Syscfg);
    let idx = (id.num() / 4) as usize;
    let shift = ((id.num() % 4) * 4) as u32;
    syscfg.exticr[idx].modify(|r| (r & !(0xF << shift)) | ((id.group() as u32) << shift));
}

/// Stage 2: unmask the line and arm the requested trigger edges
///
/// Both trigger registers are cleared before the new edges are set, so
/// switching a line between edge modes can never leave a stale edge armed.
/// This does mean a reconfiguration of a live line has a transient window
/// with no edge armed; callers that care must [`mask_line`] first.
pub fn set_edge_trigger(exti: &mut Exti, line: u8, edge: InterruptEdge) {
    let mask = 1 << line;
    exti.imr.modify(|r| r | mask);
    exti.ftsr.modify(|r| r & !mask);
    exti.rtsr.modify(|r| r & !mask);
    match edge {
        InterruptEdge::HighToLow => {
            exti.ftsr.modify(|r| r | mask);
        }
        InterruptEdge::LowToHigh => {
            exti.rtsr.modify(|r| r | mask);
        }
        InterruptEdge::BothEdges => {
            exti.ftsr.modify(|r| r | mask);
            exti.rtsr.modify(|r| r | mask);
        }
    }
}

/// Stage 3: enable the vector in the NVIC set-enable table
///
/// ISER is write-1-to-set and ignores zeros, so a plain write of the single
/// bit cannot disturb other already-enabled vectors sharing the word.
pub fn enable_in_nvic(nvic: &mut NvicIser, irq: Interrupt) {
    let irq = irq as u32;
    nvic.iser[(irq / 32) as usize].write(1 << (irq % 32));
}

/// Run the full three-stage chain for one pin
pub fn enable_interrupt_line(
    rcc: &mut Rcc,
    syscfg: &mut Syscfg,
    exti: &mut Exti,
    nvic: &mut NvicIser,
    id: DynPinId,
    edge: InterruptEdge,
) {
    route_line(rcc, syscfg, id);
    set_edge_trigger(exti, id.num(), edge);
    enable_in_nvic(nvic, irq_for_line(id.num()));
}

/// Mask an EXTI line so it no longer latches interrupts
///
/// The trigger and NVIC configuration are left in place; a later
/// [`set_edge_trigger`] re-arms the line. The NVIC enable is deliberately not
/// reverted here, its vector may be shared with other still-live lines.
pub fn mask_line(exti: &mut Exti, line: u8) {
    exti.imr.modify(|r| r & !(1 << line));
}
