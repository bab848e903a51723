//! API for Pulse-Width Modulation (PWM)
//!
//! The general purpose timer's output-compare channels drive PWM: the
//! counter runs from 0 to the auto-reload value and a channel's output is
//! high while the counter is below the channel's compare value ("PWM mode
//! 1"). Setup happens once through [`PwmPin::new`] or
//! [`PwmPin::with_frequency`]; the duty cycle is then moved with
//! [`PwmPin::set_compare`], which touches nothing but the compare register
//! and is cheap enough for a per-tick control loop.
//!
//! Connecting the timer output to a physical pin additionally requires the
//! pin to be put into the right alternate function, see the device's
//! alternate function table.
use crate::clock::{disable_peripheral_clock, enable_peripheral_clock, PeripheralClock};
use crate::regs::{Rcc, Tim2};
use crate::time::Hertz;

/// Output-compare mode code for PWM mode 1: the channel is active as long as
/// the counter is below the compare value
const OC_MODE_PWM1: u32 = 0b110;

/// Output-compare channels of the timer
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Channel {
    C1 = 0,
    C2 = 1,
    C3 = 2,
    C4 = 3,
}

impl Channel {
    /// Index into the CCMR pair; channels 1/2 share CCMR1, channels 3/4
    /// share CCMR2
    #[inline]
    fn ccmr_idx(self) -> usize {
        (self as usize) / 2
    }

    /// Bit offset of this channel's fields within its CCMR register
    #[inline]
    fn ccmr_shift(self) -> u32 {
        ((self as u32) % 2) * 8
    }

    /// Position of the channel output enable bit in CCER
    #[inline]
    fn ccer_bit(self) -> u32 {
        (self as u32) * 4
    }
}

/// Raw prescaler and period for a timer channel
///
/// `prescaler` is the hardware PSC value: the counter clock is the bus clock
/// divided by `prescaler + 1`, so 0 is a valid divide-by-one. A `period` of 0
/// would stall the counter at zero and is rejected at setup.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct TimerChannelConfig {
    pub prescaler: u32,
    pub period: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum PwmError {
    /// An auto-reload value of 0 never produces a PWM cycle
    ZeroPeriod,
    /// The requested PWM frequency was 0 or above the timer input clock
    InvalidFrequency,
}

/// A single PWM output-compare channel of the TIM2 timer
pub struct PwmPin {
    tim: Tim2,
    channel: Channel,
    current_duty: u32,
    period: u32,
}

impl PwmPin {
    /// Set up one output-compare channel for PWM and start the counter
    ///
    /// The configuration sequence matters: prescaler and period first, then
    /// the compare mode and preload, then the channel output enable, and the
    /// counter enable strictly last. Preload means a compare value written
    /// while the counter runs only takes effect at the next period boundary,
    /// which keeps the waveform glitch-free.
    pub fn new(
        tim: Tim2,
        rcc: &mut Rcc,
        channel: Channel,
        config: TimerChannelConfig,
    ) -> Result<Self, PwmError> {
        if config.period == 0 {
            return Err(PwmError::ZeroPeriod);
        }
        enable_peripheral_clock(rcc, PeripheralClock::Tim2);

        tim.psc.write(config.prescaler);
        tim.arr.write(config.period);

        let ccmr = &tim.ccmr[channel.ccmr_idx()];
        let mode_shift = channel.ccmr_shift() + 4;
        // Clear the three OCxM bits before setting PWM mode 1, a previous
        // compare mode must not bleed through
        ccmr.modify(|r| (r & !(0b111 << mode_shift)) | (OC_MODE_PWM1 << mode_shift));
        ccmr.modify(|r| r | (1 << (channel.ccmr_shift() + 3)));

        tim.ccer.modify(|r| r | (1 << channel.ccer_bit()));
        tim.cr1.modify(|r| r | 1);

        Ok(PwmPin {
            tim,
            channel,
            current_duty: 0,
            period: config.period,
        })
    }

    /// Set up a channel from a target PWM frequency instead of raw registers
    ///
    /// `sys_clk` is the timer's input clock, see
    /// [`get_sys_clock`](crate::clock::get_sys_clock). The prescaler is
    /// chosen so the period fits in 16 bits, which keeps the same math valid
    /// for the 16-bit members of the timer family.
    pub fn with_frequency(
        tim: Tim2,
        rcc: &mut Rcc,
        channel: Channel,
        sys_clk: impl Into<Hertz>,
        freq: impl Into<Hertz>,
    ) -> Result<Self, PwmError> {
        let sys_clk = sys_clk.into();
        let freq = freq.into();
        if freq.0 == 0 {
            return Err(PwmError::InvalidFrequency);
        }
        let ticks = sys_clk.0 / freq.0;
        if ticks < 2 {
            return Err(PwmError::InvalidFrequency);
        }
        let prescaler = ticks >> 16;
        let period = ticks / (prescaler + 1) - 1;
        Self::new(
            tim,
            rcc,
            channel,
            TimerChannelConfig { prescaler, period },
        )
    }

    /// Move the duty cycle
    ///
    /// Writes only the channel's compare register. This is the hot path of a
    /// control loop and performs no validation; values above the period
    /// simply saturate the output at fully high.
    #[inline]
    pub fn set_compare(&mut self, value: u32) {
        self.current_duty = value;
        self.tim.ccr[self.channel as usize].write(value);
    }

    /// The auto-reload value the channel was configured with
    #[inline]
    pub fn period(&self) -> u32 {
        self.period
    }

    /// Stop the counter, disconnect the channel and hand back the timer
    pub fn release(self, rcc: &mut Rcc) -> Tim2 {
        self.tim
            .ccer
            .modify(|r| r & !(1 << self.channel.ccer_bit()));
        self.tim.cr1.modify(|r| r & !1);
        disable_peripheral_clock(rcc, PeripheralClock::Tim2);
        self.tim
    }
}

impl embedded_hal::PwmPin for PwmPin {
    type Duty = u32;

    #[inline]
    fn disable(&mut self) {
        self.tim
            .ccer
            .modify(|r| r & !(1 << self.channel.ccer_bit()));
    }

    #[inline]
    fn enable(&mut self) {
        self.tim.ccer.modify(|r| r | (1 << self.channel.ccer_bit()));
    }

    #[inline]
    fn set_duty(&mut self, duty: Self::Duty) {
        self.set_compare(duty);
    }

    #[inline]
    fn get_duty(&self) -> Self::Duty {
        self.current_duty
    }

    #[inline]
    fn get_max_duty(&self) -> Self::Duty {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regs::{zeroed_block, RccRegisterBlock, TimRegisterBlock};
    use crate::time::U32Ext;
    use embedded_hal::PwmPin as _;

    #[test]
    fn channel_one_setup_matches_register_map() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let tim_block: TimRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let tim = Tim2::test_instance(&tim_block);

        let _pwm = PwmPin::new(
            tim,
            &mut rcc,
            Channel::C1,
            TimerChannelConfig {
                prescaler: 47,
                period: 1000,
            },
        )
        .unwrap();

        assert_eq!(rcc_block.apb1enr.read(), 1 << 0);
        assert_eq!(tim_block.psc.read(), 47);
        assert_eq!(tim_block.arr.read(), 1000);
        // PWM mode 1 in OC1M plus the preload bit
        assert_eq!(tim_block.ccmr[0].read(), (0b110 << 4) | (1 << 3));
        assert_eq!(tim_block.ccer.read(), 1 << 0);
        assert_eq!(tim_block.cr1.read(), 1);
    }

    #[test]
    fn channel_four_field_placement() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let tim_block: TimRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let tim = Tim2::test_instance(&tim_block);

        let mut pwm = PwmPin::new(
            tim,
            &mut rcc,
            Channel::C4,
            TimerChannelConfig {
                prescaler: 0,
                period: 255,
            },
        )
        .unwrap();

        assert_eq!(tim_block.ccmr[0].read(), 0);
        assert_eq!(tim_block.ccmr[1].read(), (0b110 << 12) | (1 << 11));
        assert_eq!(tim_block.ccer.read(), 1 << 12);

        pwm.set_compare(128);
        assert_eq!(tim_block.ccr[3].read(), 128);
        assert_eq!(tim_block.ccr[0].read(), 0);
    }

    #[test]
    fn stale_compare_mode_is_cleared() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let tim_block: TimRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let tim = Tim2::test_instance(&tim_block);

        tim_block.ccmr[0].write(0b111 << 4);
        let _pwm = PwmPin::new(
            tim,
            &mut rcc,
            Channel::C1,
            TimerChannelConfig {
                prescaler: 0,
                period: 10,
            },
        )
        .unwrap();
        assert_eq!(tim_block.ccmr[0].read(), (0b110 << 4) | (1 << 3));
    }

    #[test]
    fn set_compare_writes_only_the_compare_register() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let tim_block: TimRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let tim = Tim2::test_instance(&tim_block);

        let mut pwm = PwmPin::new(
            tim,
            &mut rcc,
            Channel::C1,
            TimerChannelConfig {
                prescaler: 47,
                period: 1000,
            },
        )
        .unwrap();

        let cr1 = tim_block.cr1.read();
        let ccmr0 = tim_block.ccmr[0].read();
        let ccer = tim_block.ccer.read();
        pwm.set_compare(250);
        assert_eq!(tim_block.ccr[0].read(), 250);
        assert_eq!(tim_block.cr1.read(), cr1);
        assert_eq!(tim_block.ccmr[0].read(), ccmr0);
        assert_eq!(tim_block.ccer.read(), ccer);
        assert_eq!(pwm.get_duty(), 250);
        assert_eq!(pwm.get_max_duty(), 1000);
    }

    #[test]
    fn zero_period_is_rejected_before_any_write() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let tim_block: TimRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let tim = Tim2::test_instance(&tim_block);

        let res = PwmPin::new(
            tim,
            &mut rcc,
            Channel::C1,
            TimerChannelConfig {
                prescaler: 47,
                period: 0,
            },
        );
        assert_eq!(res.err(), Some(PwmError::ZeroPeriod));
        assert_eq!(rcc_block.apb1enr.read(), 0);
        assert_eq!(tim_block.cr1.read(), 0);
    }

    #[test]
    fn frequency_setup_approximates_requested_period() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let tim_block: TimRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let tim = Tim2::test_instance(&tim_block);

        let pwm =
            PwmPin::with_frequency(tim, &mut rcc, Channel::C1, 48.mhz(), 1.khz()).unwrap();
        assert_eq!(tim_block.psc.read(), 0);
        assert_eq!(tim_block.arr.read(), 47_999);
        assert_eq!(pwm.period(), 47_999);
    }

    #[test]
    fn slow_frequency_uses_the_prescaler() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let tim_block: TimRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let tim = Tim2::test_instance(&tim_block);

        let _pwm =
            PwmPin::with_frequency(tim, &mut rcc, Channel::C1, 48.mhz(), 1.hz()).unwrap();
        let psc = tim_block.psc.read();
        let arr = tim_block.arr.read();
        assert!(arr <= u16::MAX as u32);
        let product = (psc as u64 + 1) * (arr as u64 + 1);
        let ticks = 48_000_000u64;
        assert!(ticks - product <= psc as u64 + 1);
    }

    #[test]
    fn release_stops_counter_and_gates_clock() {
        let rcc_block: RccRegisterBlock = zeroed_block();
        let tim_block: TimRegisterBlock = zeroed_block();
        let mut rcc = Rcc::test_instance(&rcc_block);
        let tim = Tim2::test_instance(&tim_block);

        let pwm = PwmPin::new(
            tim,
            &mut rcc,
            Channel::C2,
            TimerChannelConfig {
                prescaler: 0,
                period: 100,
            },
        )
        .unwrap();
        let _tim = pwm.release(&mut rcc);
        assert_eq!(tim_block.ccer.read(), 0);
        assert_eq!(tim_block.cr1.read(), 0);
        assert_eq!(rcc_block.apb1enr.read(), 0);
    }
}
