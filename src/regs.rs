//! # Register map for the modeled STM32F446 peripheral blocks
//!
//! This module plays the role a svd2rust-generated PAC would normally play:
//! `#[repr(C)]` register blocks made of [`vcell::VolatileCell`] words, fixed
//! base addresses from the STM32F446 memory map, and singleton peripheral
//! proxies handed out through [`Peripherals::take`].
//!
//! Only the blocks required by the drivers in this crate are modeled: the
//! eight GPIO ports, the reset and clock controller, SYSCFG, EXTI, the NVIC
//! set-enable table and the TIM2 general purpose timer.
use vcell::VolatileCell;

//==================================================================================================
//  Register primitive
//==================================================================================================

/// A single 32-bit memory mapped register.
///
/// Reads and writes go through [`VolatileCell`], so the compiler never caches
/// or reorders accesses across calls.
#[repr(transparent)]
pub struct Reg(VolatileCell<u32>);

impl Reg {
    #[inline(always)]
    pub fn read(&self) -> u32 {
        self.0.get()
    }

    #[inline(always)]
    pub fn write(&self, bits: u32) {
        self.0.set(bits)
    }

    /// Read-modify-write in a single call site
    #[inline(always)]
    pub fn modify<F: FnOnce(u32) -> u32>(&self, f: F) {
        self.0.set(f(self.0.get()))
    }
}

//==================================================================================================
//  Register blocks
//==================================================================================================

/// GPIO port register block, one instance per port at `0x4002_0000 + 0x400 * code`
#[repr(C)]
pub struct PortRegisterBlock {
    /// Mode register, 2 bits per pin. 0x00
    pub moder: Reg,
    /// Output type register, 1 bit per pin. 0x04
    pub otyper: Reg,
    /// Output speed register, 2 bits per pin. 0x08
    pub ospeedr: Reg,
    /// Pull-up/pull-down register, 2 bits per pin. 0x0C
    pub pupdr: Reg,
    /// Input data register. 0x10
    pub idr: Reg,
    /// Output data register. 0x14
    pub odr: Reg,
    /// Bit set/reset register. Low half sets, high half resets, writes of
    /// zero have no effect. 0x18
    pub bsrr: Reg,
    /// Configuration lock register. 0x1C
    pub lckr: Reg,
    /// Alternate function registers, 4 bits per pin, `afr[0]` covers pins
    /// 0-7 and `afr[1]` pins 8-15. 0x20
    pub afr: [Reg; 2],
}

/// Reset and clock control block at `0x4002_3800`
///
/// Only the registers up to APB2ENR are modeled; the reserved words keep the
/// later offsets aligned with the reference manual.
#[repr(C)]
pub struct RccRegisterBlock {
    pub cr: Reg,
    pub pllcfgr: Reg,
    pub cfgr: Reg,
    pub cir: Reg,
    /// AHB1 peripheral reset register. 0x10
    pub ahb1rstr: Reg,
    pub ahb2rstr: Reg,
    pub ahb3rstr: Reg,
    _reserved0: u32,
    pub apb1rstr: Reg,
    pub apb2rstr: Reg,
    _reserved1: [u32; 2],
    /// AHB1 clock enable register, GPIO port clocks live here. 0x30
    pub ahb1enr: Reg,
    pub ahb2enr: Reg,
    pub ahb3enr: Reg,
    _reserved2: u32,
    /// APB1 clock enable register, TIM2 clock lives here. 0x40
    pub apb1enr: Reg,
    /// APB2 clock enable register, SYSCFG clock lives here. 0x44
    pub apb2enr: Reg,
}

/// SYSCFG block at `0x4001_3800`, the EXTI line-to-port multiplexer
#[repr(C)]
pub struct SyscfgRegisterBlock {
    pub memrmp: Reg,
    pub pmc: Reg,
    /// External interrupt configuration registers, one nibble per line,
    /// 4 lines per register. 0x08
    pub exticr: [Reg; 4],
}

/// EXTI block at `0x4001_3C00`
#[repr(C)]
pub struct ExtiRegisterBlock {
    /// Interrupt mask register, 1 = line unmasked. 0x00
    pub imr: Reg,
    pub emr: Reg,
    /// Rising trigger selection register. 0x08
    pub rtsr: Reg,
    /// Falling trigger selection register. 0x0C
    pub ftsr: Reg,
    pub swier: Reg,
    /// Pending register, write 1 to clear. 0x14
    pub pr: Reg,
}

/// Cortex-M4 NVIC interrupt set-enable registers at `0xE000_E100`
///
/// Each of the eight words covers 32 interrupts. The registers are
/// write-1-to-set, writing 0 to a bit has no effect.
#[repr(C)]
pub struct NvicIserRegisterBlock {
    pub iser: [Reg; 8],
}

/// General purpose timer block (TIM2-TIM5 layout), TIM2 at `0x4000_0000`
#[repr(C)]
pub struct TimRegisterBlock {
    /// Control register 1, bit 0 is the counter enable. 0x00
    pub cr1: Reg,
    pub cr2: Reg,
    pub smcr: Reg,
    pub dier: Reg,
    pub sr: Reg,
    pub egr: Reg,
    /// Capture/compare mode registers, `ccmr[0]` for channels 1/2 and
    /// `ccmr[1]` for channels 3/4. 0x18
    pub ccmr: [Reg; 2],
    /// Capture/compare enable register. 0x20
    pub ccer: Reg,
    pub cnt: Reg,
    /// Prescaler, the counter clock is divided by PSC + 1. 0x28
    pub psc: Reg,
    /// Auto-reload register, the PWM period. 0x2C
    pub arr: Reg,
    _reserved0: u32,
    /// Capture/compare registers, one per channel. 0x34
    pub ccr: [Reg; 4],
    _reserved1: u32,
    pub dcr: Reg,
    pub dmar: Reg,
}

#[cfg(test)]
pub(crate) fn zeroed_block<T>() -> T {
    // All modeled registers reset to zero, VolatileCell is transparent over
    // its payload
    unsafe { core::mem::zeroed() }
}

//==================================================================================================
//  Interrupt vectors
//==================================================================================================

/// NVIC vector numbers of the EXTI lines
///
/// Lines 0-4 have dedicated vectors, lines 5-9 and 10-15 each share one.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Interrupt {
    Exti0 = 6,
    Exti1 = 7,
    Exti2 = 8,
    Exti3 = 9,
    Exti4 = 10,
    Exti9_5 = 23,
    Exti15_10 = 40,
}

//==================================================================================================
//  Peripheral proxies
//==================================================================================================

macro_rules! peripheral {
    ($(#[$doc:meta])* $Name:ident, $Block:ty, $addr:literal) => {
        $(#[$doc])*
        pub struct $Name {
            regs: *const $Block,
        }

        // The proxy only ever dereferences to a block of VolatileCells at a
        // fixed device address
        unsafe impl Send for $Name {}

        impl $Name {
            /// Base address of this peripheral instance
            pub const PTR: *const $Block = $addr as *const _;

            /// Create an instance out of thin air
            ///
            /// # Safety
            ///
            /// Circumvents the singleton handed out by [`Peripherals::take`]
            #[inline]
            pub const unsafe fn steal() -> Self {
                Self { regs: Self::PTR }
            }

            #[inline(always)]
            pub(crate) fn block_ptr(&self) -> *const $Block {
                self.regs
            }

            #[cfg(test)]
            pub(crate) fn test_instance(block: &$Block) -> Self {
                Self { regs: block }
            }
        }

        impl core::ops::Deref for $Name {
            type Target = $Block;

            #[inline(always)]
            fn deref(&self) -> &Self::Target {
                unsafe { &*self.regs }
            }
        }
    };
}

peripheral!(
    /// GPIO port A
    Gpioa, PortRegisterBlock, 0x4002_0000
);
peripheral!(
    /// GPIO port B
    Gpiob, PortRegisterBlock, 0x4002_0400
);
peripheral!(
    /// GPIO port C
    Gpioc, PortRegisterBlock, 0x4002_0800
);
peripheral!(
    /// GPIO port D
    Gpiod, PortRegisterBlock, 0x4002_0C00
);
peripheral!(
    /// GPIO port E
    Gpioe, PortRegisterBlock, 0x4002_1000
);
peripheral!(
    /// GPIO port F
    Gpiof, PortRegisterBlock, 0x4002_1400
);
peripheral!(
    /// GPIO port G
    Gpiog, PortRegisterBlock, 0x4002_1800
);
peripheral!(
    /// GPIO port H
    Gpioh, PortRegisterBlock, 0x4002_1C00
);
peripheral!(
    /// Reset and clock controller
    Rcc, RccRegisterBlock, 0x4002_3800
);
peripheral!(
    /// System configuration controller (EXTI line multiplexer)
    Syscfg, SyscfgRegisterBlock, 0x4001_3800
);
peripheral!(
    /// External interrupt controller
    Exti, ExtiRegisterBlock, 0x4001_3C00
);
peripheral!(
    /// NVIC interrupt set-enable table
    NvicIser, NvicIserRegisterBlock, 0xE000_E100
);
peripheral!(
    /// General purpose timer TIM2
    Tim2, TimRegisterBlock, 0x4000_0000
);

//==================================================================================================
//  Peripherals
//==================================================================================================

/// All modeled peripheral singletons
#[allow(non_snake_case)]
pub struct Peripherals {
    pub GPIOA: Gpioa,
    pub GPIOB: Gpiob,
    pub GPIOC: Gpioc,
    pub GPIOD: Gpiod,
    pub GPIOE: Gpioe,
    pub GPIOF: Gpiof,
    pub GPIOG: Gpiog,
    pub GPIOH: Gpioh,
    pub RCC: Rcc,
    pub SYSCFG: Syscfg,
    pub EXTI: Exti,
    pub NVIC_ISER: NvicIser,
    pub TIM2: Tim2,
}

static mut PERIPHERALS_TAKEN: bool = false;

impl Peripherals {
    /// Returns all peripherals the first time, `None` on later calls
    pub fn take() -> Option<Self> {
        cortex_m::interrupt::free(|_| unsafe {
            if PERIPHERALS_TAKEN {
                None
            } else {
                PERIPHERALS_TAKEN = true;
                Some(Peripherals::steal())
            }
        })
    }

    /// Unchecked version of [`Peripherals::take`]
    ///
    /// # Safety
    ///
    /// Duplicates every proxy handed out before, which breaks the exclusive
    /// `&mut` access the drivers rely on
    pub unsafe fn steal() -> Self {
        Peripherals {
            GPIOA: Gpioa::steal(),
            GPIOB: Gpiob::steal(),
            GPIOC: Gpioc::steal(),
            GPIOD: Gpiod::steal(),
            GPIOE: Gpioe::steal(),
            GPIOF: Gpiof::steal(),
            GPIOG: Gpiog::steal(),
            GPIOH: Gpioh::steal(),
            RCC: Rcc::steal(),
            SYSCFG: Syscfg::steal(),
            EXTI: Exti::steal(),
            NVIC_ISER: NvicIser::steal(),
            TIM2: Tim2::steal(),
        }
    }
}
