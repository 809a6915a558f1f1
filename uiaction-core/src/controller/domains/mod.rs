//! Registration slices contributed by independent frontend subsystems.
//!
//! Each submodule builds the mappings for one domain (speed, drives, hotkeys,
//! machine control). The handlers act on a shared [`EmulatorControl`] and open
//! dialogs through a [`DialogHost`]; the host closes a dialog by calling
//! [`DialogRequest::close`], which finishes the action.

pub mod drive;
pub mod hotkeys;
pub mod speed;
pub mod system;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use crate::controller::action_registry::{ActionRegistry, Invocation, RegistrationReport};
use crate::model::machine::Machine;
use crate::model::mapping::ActionMapping;

/// First drive unit number.
pub const FIRST_DRIVE_UNIT: u8 = 8;

/// Number of emulated drive units (8..=11).
pub const DRIVE_COUNT: usize = 4;

/// Where the current hotkey set came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HotkeySource {
    #[default]
    Default,
    Empty,
    File(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetKind {
    Soft,
    Hard,
}

/// Frontend-visible emulator state the action handlers operate on.
#[derive(Debug, Default)]
pub struct EmulatorControl {
    warp: AtomicBool,
    paused: AtomicBool,
    quit_requested: AtomicBool,
    frames_advanced: AtomicU64,
    soft_resets: AtomicU64,
    hard_resets: AtomicU64,
    drive_resets: [AtomicU64; DRIVE_COUNT],
    drives: Mutex<[Option<PathBuf>; DRIVE_COUNT]>,
    hotkeys: Mutex<HotkeySource>,
    hotkeys_saved_to: Mutex<Option<PathBuf>>,
}

impl EmulatorControl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the new warp state.
    pub fn toggle_warp(&self) -> bool {
        !self.warp.fetch_xor(true, Ordering::AcqRel)
    }

    #[must_use]
    pub fn warp(&self) -> bool {
        self.warp.load(Ordering::Acquire)
    }

    /// Returns the new pause state.
    pub fn toggle_pause(&self) -> bool {
        !self.paused.fetch_xor(true, Ordering::AcqRel)
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
    }

    #[must_use]
    pub fn paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub fn advance_frame(&self) {
        self.frames_advanced.fetch_add(1, Ordering::AcqRel);
    }

    #[must_use]
    pub fn frames_advanced(&self) -> u64 {
        self.frames_advanced.load(Ordering::Acquire)
    }

    pub fn reset(&self, kind: ResetKind) {
        let counter = match kind {
            ResetKind::Soft => &self.soft_resets,
            ResetKind::Hard => &self.hard_resets,
        };
        counter.fetch_add(1, Ordering::AcqRel);
    }

    #[must_use]
    pub fn resets(&self, kind: ResetKind) -> u64 {
        match kind {
            ResetKind::Soft => self.soft_resets.load(Ordering::Acquire),
            ResetKind::Hard => self.hard_resets.load(Ordering::Acquire),
        }
    }

    pub fn request_quit(&self) {
        self.quit_requested.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn quit_requested(&self) -> bool {
        self.quit_requested.load(Ordering::Acquire)
    }

    fn drive_index(unit: u8) -> Option<usize> {
        let index = usize::from(unit.checked_sub(FIRST_DRIVE_UNIT)?);
        (index < DRIVE_COUNT).then_some(index)
    }

    pub fn attach_disk(&self, unit: u8, image: PathBuf) {
        if let Some(index) = Self::drive_index(unit) {
            self.drives.lock()[index] = Some(image);
        }
    }

    pub fn detach_all(&self) {
        self.drives.lock().iter_mut().for_each(|slot| *slot = None);
    }

    #[must_use]
    pub fn attached(&self, unit: u8) -> Option<PathBuf> {
        Self::drive_index(unit).and_then(|index| self.drives.lock()[index].clone())
    }

    pub fn reset_drive(&self, unit: u8) {
        if let Some(index) = Self::drive_index(unit) {
            self.drive_resets[index].fetch_add(1, Ordering::AcqRel);
        }
    }

    #[must_use]
    pub fn drive_resets(&self, unit: u8) -> u64 {
        Self::drive_index(unit).map_or(0, |index| self.drive_resets[index].load(Ordering::Acquire))
    }

    pub fn set_hotkeys(&self, source: HotkeySource) {
        *self.hotkeys.lock() = source;
    }

    #[must_use]
    pub fn hotkeys(&self) -> HotkeySource {
        self.hotkeys.lock().clone()
    }

    pub fn note_hotkeys_saved(&self, path: PathBuf) {
        *self.hotkeys_saved_to.lock() = Some(path);
    }

    #[must_use]
    pub fn hotkeys_saved_to(&self) -> Option<PathBuf> {
        self.hotkeys_saved_to.lock().clone()
    }
}

/// Dialogs the action handlers can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Settings,
    About,
    Monitor,
    ConfirmQuit,
    SpeedSettings,
    AttachDisk { unit: u8 },
    SmartAttach,
    LoadHotkeys,
    SaveHotkeys,
}

impl fmt::Display for DialogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Settings => f.write_str("settings"),
            Self::About => f.write_str("about"),
            Self::Monitor => f.write_str("monitor"),
            Self::ConfirmQuit => f.write_str("confirm-quit"),
            Self::SpeedSettings => f.write_str("speed-settings"),
            Self::AttachDisk { unit } => write!(f, "attach-disk-{unit}"),
            Self::SmartAttach => f.write_str("smart-attach"),
            Self::LoadHotkeys => f.write_str("load-hotkeys"),
            Self::SaveHotkeys => f.write_str("save-hotkeys"),
        }
    }
}

/// How the user left a dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    Cancelled,
    Accepted(Option<PathBuf>),
}

type AcceptFn = Box<dyn FnOnce(Option<PathBuf>) + Send>;

/// An open dialog. Must be closed exactly once; closing finishes the action
/// that opened it.
pub struct DialogRequest {
    kind: DialogKind,
    invocation: Invocation,
    on_accept: Option<AcceptFn>,
}

impl DialogRequest {
    pub fn new(kind: DialogKind, invocation: &Invocation) -> Self {
        Self {
            kind,
            invocation: invocation.clone(),
            on_accept: None,
        }
    }

    #[must_use]
    pub fn on_accept<F>(mut self, accept: F) -> Self
    where
        F: FnOnce(Option<PathBuf>) + Send + 'static,
    {
        self.on_accept = Some(Box::new(accept));
        self
    }

    #[must_use]
    pub const fn kind(&self) -> DialogKind {
        self.kind
    }

    #[must_use]
    pub const fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    pub fn close(self, outcome: DialogOutcome) {
        debug!("Dialog '{}' closed: {:?}", self.kind, outcome);
        if let (DialogOutcome::Accepted(path), Some(accept)) = (outcome, self.on_accept) {
            accept(path);
        }
        self.invocation.finish();
    }
}

impl fmt::Debug for DialogRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogRequest")
            .field("kind", &self.kind)
            .field("action", &self.invocation.action())
            .finish_non_exhaustive()
    }
}

/// The toolkit side that shows dialogs.
pub trait DialogHost: Send + Sync {
    fn open(&self, request: DialogRequest);
}

/// What every slice's handlers capture.
#[derive(Clone)]
pub struct DomainContext {
    pub control: Arc<EmulatorControl>,
    pub dialogs: Arc<dyn DialogHost>,
}

impl DomainContext {
    pub fn new(control: Arc<EmulatorControl>, dialogs: Arc<dyn DialogHost>) -> Self {
        Self { control, dialogs }
    }
}

/// Register every slice, keeping only actions `machine` supports.
pub fn register_all(
    registry: &ActionRegistry,
    ctx: &DomainContext,
    machine: Machine,
) -> RegistrationReport {
    let slices: [Vec<ActionMapping>; 4] = [
        system::mappings(ctx),
        speed::mappings(ctx),
        drive::mappings(ctx),
        hotkeys::mappings(ctx),
    ];

    let mut total = RegistrationReport::default();
    for slice in slices {
        let supported = slice.into_iter().filter(|mapping| {
            let supported = mapping.action.is_supported_by(machine);
            if !supported {
                debug!("'{}' not available on {:?}", mapping.action, machine);
            }
            supported
        });

        let report = registry.register_actions(supported);
        total.added += report.added;
        total.rejected.extend(report.rejected);
    }

    total
}
