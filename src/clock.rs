//! Peripheral clock gating and the one-time system clock cell
//!
//! Every driver in this crate requires the bus clock of its peripheral block
//! to be running before any register access takes effect. The pin bank and
//! PWM constructors enable their own clocks, so direct use of
//! [`enable_peripheral_clock`] is only needed when talking to the register
//! blocks manually.
use crate::regs::Rcc;
use crate::time::Hertz;
use cortex_m::interrupt::{self, Mutex};
use once_cell::unsync::OnceCell;

static SYS_CLOCK: Mutex<OnceCell<Hertz>> = Mutex::new(OnceCell::new());

/// Clock-gated peripheral blocks
///
/// The enumeration is exhaustive over the modeled blocks, so there is no
/// "unknown peripheral" case to handle at run-time.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PeripheralClock {
    PortA,
    PortB,
    PortC,
    PortD,
    PortE,
    PortF,
    PortG,
    PortH,
    Syscfg,
    Tim2,
}

impl PeripheralClock {
    /// Enable register and bit position for this block
    fn gate(self) -> (Gate, u8) {
        match self {
            PeripheralClock::PortA => (Gate::Ahb1, 0),
            PeripheralClock::PortB => (Gate::Ahb1, 1),
            PeripheralClock::PortC => (Gate::Ahb1, 2),
            PeripheralClock::PortD => (Gate::Ahb1, 3),
            PeripheralClock::PortE => (Gate::Ahb1, 4),
            PeripheralClock::PortF => (Gate::Ahb1, 5),
            PeripheralClock::PortG => (Gate::Ahb1, 6),
            PeripheralClock::PortH => (Gate::Ahb1, 7),
            PeripheralClock::Syscfg => (Gate::Apb2, 14),
            PeripheralClock::Tim2 => (Gate::Apb1, 0),
        }
    }
}

enum Gate {
    Ahb1,
    Apb1,
    Apb2,
}

/// The clock is supplied externally and can be set here exactly once so
/// other software components can retrieve it
pub fn set_sys_clock(freq: Hertz) {
    interrupt::free(|cs| {
        SYS_CLOCK.borrow(cs).set(freq).ok();
    })
}

/// Returns the configured system clock
pub fn get_sys_clock() -> Option<Hertz> {
    interrupt::free(|cs| SYS_CLOCK.borrow(cs).get().copied())
}

/// Set the clock enable bit of a single peripheral block
pub fn enable_peripheral_clock(rcc: &mut Rcc, clock: PeripheralClock) {
    let (gate, bit) = clock.gate();
    let reg = match gate {
        Gate::Ahb1 => &rcc.ahb1enr,
        Gate::Apb1 => &rcc.apb1enr,
        Gate::Apb2 => &rcc.apb2enr,
    };
    reg.modify(|r| r | (1 << bit));
}

/// Clear the clock enable bit of a single peripheral block
pub fn disable_peripheral_clock(rcc: &mut Rcc, clock: PeripheralClock) {
    let (gate, bit) = clock.gate();
    let reg = match gate {
        Gate::Ahb1 => &rcc.ahb1enr,
        Gate::Apb1 => &rcc.apb1enr,
        Gate::Apb2 => &rcc.apb2enr,
    };
    reg.modify(|r| r & !(1 << bit));
}

/// Pulse the AHB1 reset line of a GPIO port, returning all of its registers
/// to their power-on state
pub fn reset_port(rcc: &mut Rcc, port: crate::gpio::DynGroup) {
    let bit = port as u8;
    rcc.ahb1rstr.modify(|r| r | (1 << bit));
    rcc.ahb1rstr.modify(|r| r & !(1 << bit));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regs::{zeroed_block, RccRegisterBlock};

    #[test]
    fn port_clock_enable_sets_single_ahb1_bit() {
        let block: RccRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&block);
        enable_peripheral_clock(&mut rcc, PeripheralClock::PortC);
        assert_eq!(block.ahb1enr.read(), 1 << 2);
        assert_eq!(block.apb1enr.read(), 0);
        assert_eq!(block.apb2enr.read(), 0);

        enable_peripheral_clock(&mut rcc, PeripheralClock::PortH);
        assert_eq!(block.ahb1enr.read(), (1 << 2) | (1 << 7));

        disable_peripheral_clock(&mut rcc, PeripheralClock::PortC);
        assert_eq!(block.ahb1enr.read(), 1 << 7);
    }

    #[test]
    fn syscfg_and_tim2_use_apb_gates() {
        let block: RccRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&block);
        enable_peripheral_clock(&mut rcc, PeripheralClock::Syscfg);
        enable_peripheral_clock(&mut rcc, PeripheralClock::Tim2);
        assert_eq!(block.apb2enr.read(), 1 << 14);
        assert_eq!(block.apb1enr.read(), 1 << 0);
        assert_eq!(block.ahb1enr.read(), 0);
    }

    #[test]
    fn port_reset_leaves_reset_line_deasserted() {
        let block: RccRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&block);
        block.ahb1rstr.write(1 << 5);
        reset_port(&mut rcc, crate::gpio::DynGroup::B);
        // Only port B's bit was pulsed, port F's stale bit stays untouched
        assert_eq!(block.ahb1rstr.read(), 1 << 5);
    }
}
