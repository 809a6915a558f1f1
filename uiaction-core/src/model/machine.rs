//! Emulated machine variants and the support mask used to filter actions.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Set of machines an action is available on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MachineMask: u16 {
        const C64    = 1 << 0;
        const C64SC  = 1 << 1;
        const C64DTV = 1 << 2;
        const SCPU64 = 1 << 3;
        const C128   = 1 << 4;
        const VIC20  = 1 << 5;
        const PET    = 1 << 6;
        const CBM5X0 = 1 << 7;
        const CBM6X0 = 1 << 8;
        const PLUS4  = 1 << 9;
        const VSID   = 1 << 10;

        /// Every emulator binary.
        const ALL = (1 << 11) - 1;

        /// Everything except the SID player, which has no display or drives.
        const NO_VSID = Self::ALL.bits() & !Self::VSID.bits();

        /// Machines with a datasette port.
        const TAPE = Self::C64.bits()
            | Self::C64SC.bits()
            | Self::C128.bits()
            | Self::VIC20.bits()
            | Self::PET.bits()
            | Self::CBM6X0.bits()
            | Self::PLUS4.bits();

        /// Machines with a cartridge port.
        const CART = Self::C64.bits()
            | Self::C64SC.bits()
            | Self::SCPU64.bits()
            | Self::C128.bits()
            | Self::VIC20.bits()
            | Self::CBM5X0.bits()
            | Self::CBM6X0.bits()
            | Self::PLUS4.bits();
    }
}

/// The machine the frontend was started as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Machine {
    C64,
    #[default]
    C64sc,
    C64dtv,
    Scpu64,
    C128,
    Vic20,
    Pet,
    Cbm5x0,
    Cbm6x0,
    Plus4,
    Vsid,
}

impl Machine {
    /// The single mask bit for this machine.
    #[must_use]
    pub const fn mask(self) -> MachineMask {
        match self {
            Self::C64 => MachineMask::C64,
            Self::C64sc => MachineMask::C64SC,
            Self::C64dtv => MachineMask::C64DTV,
            Self::Scpu64 => MachineMask::SCPU64,
            Self::C128 => MachineMask::C128,
            Self::Vic20 => MachineMask::VIC20,
            Self::Pet => MachineMask::PET,
            Self::Cbm5x0 => MachineMask::CBM5X0,
            Self::Cbm6x0 => MachineMask::CBM6X0,
            Self::Plus4 => MachineMask::PLUS4,
            Self::Vsid => MachineMask::VSID,
        }
    }
}
