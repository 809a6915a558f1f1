//! src/model/action_id.rs
//! ============================================================================
//! # Action identifiers and the compiled-in descriptor table
//!
//! Every action a user can invoke has a stable id, a short machine name (the
//! string persisted in hotkey files), a human readable description and the
//! set of machines that support it. The table is constant for the lifetime of
//! the process; the registry only ever deals in ids.

use std::fmt;
use std::str::FromStr;

use compact_str::CompactString;
use enum_map::Enum;

use crate::error::ActionError;
use crate::model::machine::{Machine, MachineMask};

/// Read-only description of one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub id: ActionId,
    pub name: &'static str,
    pub description: &'static str,
    pub machine_mask: MachineMask,
}

macro_rules! define_actions {
    ($( $variant:ident => $name:literal, $desc:literal, $mask:expr; )*) => {
        /// Symbolic action id. `None` is the reserved "no action" value and can
        /// never be registered or triggered.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Enum)]
        #[repr(u16)]
        pub enum ActionId {
            $( $variant, )*
        }

        /// Descriptor table, indexed by `ActionId as usize`.
        pub static DESCRIPTORS: &[ActionDescriptor] = &[
            $(
                ActionDescriptor {
                    id: ActionId::$variant,
                    name: $name,
                    description: $desc,
                    machine_mask: $mask,
                },
            )*
        ];
    };
}

define_actions! {
    None               => "none",                  "No action",                               MachineMask::empty();
    Quit               => "quit",                  "Quit emulator",                           MachineMask::ALL;
    SettingsDialog     => "settings-dialog",       "Open settings",                           MachineMask::ALL;
    AboutDialog        => "about-dialog",          "Show the about dialog",                   MachineMask::ALL;
    MonitorOpen        => "monitor-open",          "Open the machine code monitor",           MachineMask::ALL;
    ResetSoft          => "reset-soft",            "Soft-reset the machine",                  MachineMask::ALL;
    ResetHard          => "reset-hard",            "Hard-reset the machine",                  MachineMask::ALL;
    PauseToggle        => "pause-toggle",          "Pause or unpause the emulation",          MachineMask::ALL;
    AdvanceFrame       => "advance-frame",         "Advance emulation one frame",             MachineMask::NO_VSID;
    WarpModeToggle     => "warp-mode-toggle",      "Toggle warp mode",                        MachineMask::ALL;
    SpeedSettings      => "speed-settings",        "Open the emulation speed settings",       MachineMask::ALL;
    FullscreenToggle   => "fullscreen-toggle",     "Toggle fullscreen",                       MachineMask::NO_VSID;
    RestoreDisplay     => "restore-display",       "Resize application window to fit contents", MachineMask::NO_VSID;
    SmartAttach        => "smart-attach",          "Attach a medium to the emulator",         MachineMask::NO_VSID;
    DriveAttach8       => "drive-attach-8:0",      "Attach disk image to unit 8",             MachineMask::NO_VSID;
    DriveAttach9       => "drive-attach-9:0",      "Attach disk image to unit 9",             MachineMask::NO_VSID;
    DriveAttach10      => "drive-attach-10:0",     "Attach disk image to unit 10",            MachineMask::NO_VSID;
    DriveAttach11      => "drive-attach-11:0",     "Attach disk image to unit 11",            MachineMask::NO_VSID;
    DriveDetachAll     => "drive-detach-all",      "Detach all disk images",                  MachineMask::NO_VSID;
    DriveReset8        => "drive-reset-8",         "Reset drive 8",                           MachineMask::NO_VSID;
    DriveReset9        => "drive-reset-9",         "Reset drive 9",                           MachineMask::NO_VSID;
    DriveReset10       => "drive-reset-10",        "Reset drive 10",                          MachineMask::NO_VSID;
    DriveReset11       => "drive-reset-11",        "Reset drive 11",                          MachineMask::NO_VSID;
    TapeAttach1        => "tape-attach-1",         "Attach tape image to datasette 1",        MachineMask::TAPE;
    TapeDetach1        => "tape-detach-1",         "Detach tape image from datasette 1",      MachineMask::TAPE;
    CartAttach         => "cart-attach",           "Attach cartridge image",                  MachineMask::CART;
    CartDetach         => "cart-detach",           "Detach cartridge image",                  MachineMask::CART;
    SnapshotLoad       => "snapshot-load",         "Load snapshot file",                      MachineMask::NO_VSID;
    SnapshotSave       => "snapshot-save",         "Save snapshot file",                      MachineMask::NO_VSID;
    SnapshotQuickload  => "snapshot-quickload",    "Quickload snapshot",                      MachineMask::NO_VSID;
    SnapshotQuicksave  => "snapshot-quicksave",    "Quicksave snapshot",                      MachineMask::NO_VSID;
    ScreenshotQuicksave => "screenshot-quicksave", "Quicksave screenshot",                    MachineMask::NO_VSID;
    HotkeysLoad        => "hotkeys-load",          "Load hotkeys from a file",                MachineMask::ALL;
    HotkeysSave        => "hotkeys-save",          "Save hotkeys to a file",                  MachineMask::ALL;
    HotkeysClear       => "hotkeys-clear",         "Clear all hotkeys",                       MachineMask::ALL;
    HotkeysDefault     => "hotkeys-default",       "Restore the default hotkeys",             MachineMask::ALL;
    PsidLoad           => "psid-load",             "Load PSID file",                          MachineMask::VSID;
}

impl ActionId {
    /// `ID_COUNT`: number of ids including `None`.
    pub const COUNT: usize = <Self as Enum>::LENGTH;

    /// Look up an id from its raw integer value.
    #[must_use]
    pub fn from_raw(raw: u16) -> Option<Self> {
        DESCRIPTORS.get(usize::from(raw)).map(|desc| desc.id)
    }

    /// Look up an id by its machine name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        DESCRIPTORS
            .iter()
            .find(|desc| desc.name == name)
            .map(|desc| desc.id)
    }

    #[must_use]
    pub const fn raw(self) -> u16 {
        self as u16
    }

    #[must_use]
    pub fn descriptor(self) -> &'static ActionDescriptor {
        &DESCRIPTORS[self as usize]
    }

    /// Stable machine name, as used in hotkey files.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        self.descriptor().description
    }

    #[must_use]
    pub fn machine_mask(self) -> MachineMask {
        self.descriptor().machine_mask
    }

    /// True for every real action, false for `None`.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self != Self::None
    }

    #[must_use]
    pub fn is_supported_by(self, machine: Machine) -> bool {
        self.machine_mask().contains(machine.mask())
    }

    /// Iterate over every real action id (skips `None`).
    pub fn iter() -> impl Iterator<Item = Self> {
        DESCRIPTORS.iter().skip(1).map(|desc| desc.id)
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActionId {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ActionError::UnknownActionName(CompactString::new(s)))
    }
}

impl TryFrom<u32> for ActionId {
    type Error = ActionError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        u16::try_from(raw)
            .ok()
            .and_then(Self::from_raw)
            .filter(|id| id.is_valid())
            .ok_or(ActionError::InvalidAction(raw))
    }
}

/// Descriptors of the actions available on `machine`, in id order.
pub fn descriptors_for_machine(machine: Machine) -> impl Iterator<Item = &'static ActionDescriptor> {
    DESCRIPTORS
        .iter()
        .skip(1)
        .filter(move |desc| desc.machine_mask.contains(machine.mask()))
}
