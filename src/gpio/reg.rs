use super::dynpins::{self, DynPinId, DynPinMode};
use super::pins::Speed;
use crate::regs::PortRegisterBlock;

//==================================================================================================
//  ModeFields
//==================================================================================================

/// Collect all fields needed to set the [`PinMode`](super::PinMode)
#[derive(Default)]
struct ModeFields {
    /// Two-bit MODER value: 00 input, 01 output, 10 alternate, 11 analog
    mode: u8,
    /// Two-bit PUPDR value: 00 none, 01 pull-up, 10 pull-down
    pull: u8,
    opendrn: bool,
    funsel: Option<u8>,
}

impl From<DynPinMode> for ModeFields {
    #[inline]
    fn from(mode: DynPinMode) -> Self {
        let mut fields = Self::default();
        use DynPinMode::*;
        match mode {
            Input(config) => {
                use dynpins::DynInput::*;
                fields.mode = 0b00;
                match config {
                    Floating => {
                        fields.pull = 0b00;
                    }
                    PullUp => {
                        fields.pull = 0b01;
                    }
                    PullDown => {
                        fields.pull = 0b10;
                    }
                }
            }
            Output(config) => {
                use dynpins::DynOutput::*;
                fields.mode = 0b01;
                match config {
                    PushPull => {
                        fields.opendrn = false;
                    }
                    OpenDrain => {
                        fields.opendrn = true;
                    }
                }
            }
            Alternate(config) => {
                fields.mode = 0b10;
                fields.funsel = Some(config as u8);
            }
            // Pulls must stay disabled in analog mode
            Analog => {
                fields.mode = 0b11;
            }
        }
        fields
    }
}

//==================================================================================================
// Register Interface
//==================================================================================================

/// Provide a safe register interface for pin objects
///
/// Each pin object owns a pointer to its port's [`PortRegisterBlock`] plus a
/// pin ID, and is only allowed to touch the bit windows derived from that ID.
/// Any modification of shared configuration registers requires `&mut self`,
/// and the pin singletons guarantee that no two objects derive the same bit
/// windows.
///
/// # Safety
///
/// Implementers must guarantee that [`id`](Self::id) and
/// [`port_reg`](Self::port_reg) belong to a singleton pin, i.e. that no other
/// live object controls the same pin of the same port.
pub(super) unsafe trait RegisterInterface {
    /// [`DynPinId`] identifying the set of bit windows controlled by this type
    fn id(&self) -> DynPinId;

    /// Register block of the pin's port
    fn port_reg(&self) -> &PortRegisterBlock;

    #[inline]
    fn mask_16(&self) -> u32 {
        1 << self.id().num()
    }

    /// Change the pin mode
    ///
    /// Every multi-bit field is cleared before the new value is OR-ed in, so
    /// a previous configuration can never bleed into the new one. MODER is
    /// written last: the pin must not be handed to a peripheral function
    /// before the alternate function code is in place.
    #[inline]
    fn change_mode(&mut self, mode: DynPinMode) {
        let ModeFields {
            mode,
            pull,
            opendrn,
            funsel,
        } = mode.into();
        let portreg = self.port_reg();
        let num = self.id().num();
        let shift = 2 * num as u32;

        portreg
            .pupdr
            .modify(|r| (r & !(0b11 << shift)) | ((pull as u32) << shift));
        portreg.otyper.modify(|r| {
            let cleared = r & !self.mask_16();
            if opendrn {
                cleared | self.mask_16()
            } else {
                cleared
            }
        });
        if let Some(funsel) = funsel {
            let idx = (num / 8) as usize;
            let nibble = ((num % 8) * 4) as u32;
            portreg.afr[idx].modify(|r| (r & !(0xF << nibble)) | ((funsel as u32) << nibble));
        }
        portreg
            .moder
            .modify(|r| (r & !(0b11 << shift)) | ((mode as u32) << shift));
    }

    /// Set the two OSPEEDR bits of this pin
    #[inline]
    fn set_speed(&mut self, speed: Speed) {
        let portreg = self.port_reg();
        let shift = 2 * self.id().num() as u32;
        portreg
            .ospeedr
            .modify(|r| (r & !(0b11 << shift)) | ((speed as u32) << shift));
    }

    /// Read the input level of the pin
    #[inline]
    fn read_pin(&self) -> bool {
        let portreg = self.port_reg();
        ((portreg.idr.read() >> self.id().num()) & 0x01) == 1
    }

    /// Read back the driven output level of the pin
    #[inline]
    fn read_out(&self) -> bool {
        let portreg = self.port_reg();
        ((portreg.odr.read() >> self.id().num()) & 0x01) == 1
    }

    /// Write the logic level of an output pin
    ///
    /// Goes through BSRR: the low half sets, the high half resets, and bits
    /// written as 0 are ignored by the hardware. A single write can therefore
    /// never disturb another bit of the port, even from interrupt context.
    #[inline]
    fn write_pin(&mut self, bit: bool) {
        let portreg = self.port_reg();
        if bit {
            portreg.bsrr.write(self.mask_16());
        } else {
            portreg.bsrr.write(self.mask_16() << 16);
        }
    }

    /// Toggle the logic level of an output pin
    ///
    /// This is a read-modify-write of ODR and races with any concurrent
    /// writer of the same port. Callers must serialize access themselves.
    #[inline]
    fn toggle(&mut self) {
        let portreg = self.port_reg();
        portreg.odr.modify(|r| r ^ self.mask_16());
    }
}
