//! ActionRegistry: id → handler table with admission control
//!
//! A single authority for every UI action:
//! - Registration of per-subsystem mapping slices (first registration wins)
//! - Per-action busy flag for blocking actions (silent drop while busy)
//! - One process-wide dialog slot shared by every dialog action
//! - Routing to the UI dispatcher for `uithread`/`dialog` actions,
//!   synchronous execution on the caller's thread otherwise
//!
//! Table, flags, dialog slot and dispatcher sit behind one mutex so that the
//! check-and-set in `trigger` is atomic no matter which thread triggers.
//! Handlers always run with the lock released.

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use enum_map::EnumMap;
use parking_lot::Mutex;
use smallvec::SmallVec;
use tracing::{debug, error, info, warn};

use crate::config::RegistryConfig;
use crate::controller::ui_dispatch::UiDispatcher;
use crate::error::ActionError;
use crate::model::action_id::ActionId;
use crate::model::mapping::{ActionFlags, ActionHandler, ActionMapping};

/// What `trigger` did with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Handler ran synchronously on the calling thread.
    Ran,

    /// Handed to the UI dispatcher. Says nothing about whether the handler
    /// runs; a dispatcher that cannot deliver releases the action instead.
    Dispatched,

    /// Blocking action still running; request dropped.
    DroppedBusy,

    /// Another dialog is open; request dropped.
    DroppedDialog,

    /// Nothing registered for the id.
    Unknown,

    /// Action needs the UI thread but no dispatcher is set.
    NoDispatcher,
}

impl TriggerOutcome {
    /// The handler ran or was scheduled to run.
    #[must_use]
    pub const fn accepted(self) -> bool {
        matches!(self, Self::Ran | Self::Dispatched)
    }

    /// Dropped by admission control (busy or dialog already open).
    #[must_use]
    pub const fn dropped(self) -> bool {
        matches!(self, Self::DroppedBusy | Self::DroppedDialog)
    }
}

/// Result of one `register_actions` call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegistrationReport {
    pub added: usize,
    pub rejected: SmallVec<[ActionId; 4]>,
}

/// A running action that has not been finished within the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalledAction {
    pub action: ActionId,
    pub running_for: Duration,
}

/// Internal table entry.
struct MappingEntry {
    action: ActionId,
    handler: ActionHandler,
    flags: ActionFlags,
    is_busy: bool,
    running_since: Option<Instant>,
}

struct RegistryState {
    mappings: Vec<MappingEntry>,
    index: EnumMap<ActionId, Option<usize>>,
    dispatcher: Option<Arc<dyn UiDispatcher>>,
    dialog_owner: Option<ActionId>,
    // Bumped by shutdown so invocations from a previous table cannot
    // release entries of the next one.
    epoch: u64,
}

impl RegistryState {
    fn empty(capacity: usize, epoch: u64) -> Self {
        Self {
            mappings: Vec::with_capacity(capacity),
            index: EnumMap::default(),
            dispatcher: None,
            dialog_owner: None,
            epoch,
        }
    }

    fn entry(&self, action: ActionId) -> Option<&MappingEntry> {
        self.index[action].map(|slot| &self.mappings[slot])
    }

    fn push(&mut self, entry: MappingEntry) {
        if self.mappings.len() == self.mappings.capacity() {
            let grow_by = self.mappings.capacity().max(1);
            self.mappings.reserve_exact(grow_by);
            debug!(
                "Action table grown to capacity {}",
                self.mappings.capacity()
            );
        }

        self.index[entry.action] = Some(self.mappings.len());
        self.mappings.push(entry);
    }
}

pub(crate) struct RegistryInner {
    state: Mutex<RegistryState>,
    initial_capacity: usize,
}

/// Shared handle to the action table. Cloning is cheap; every clone sees the
/// same table.
#[derive(Clone)]
pub struct ActionRegistry {
    inner: Arc<RegistryInner>,
}

/// Handed to a handler each time its action runs.
///
/// The handler, or whatever continuation it schedules (a dialog's close
/// callback, a worker thread), calls [`Invocation::finish`] once the action
/// is complete. `finish` is a no-op for actions that neither block nor open
/// a dialog, so handlers may call it unconditionally.
#[derive(Clone)]
pub struct Invocation {
    action: ActionId,
    flags: ActionFlags,
    handler: ActionHandler,
    epoch: u64,
    registry: Weak<RegistryInner>,
}

impl Invocation {
    #[must_use]
    pub const fn action(&self) -> ActionId {
        self.action
    }

    #[must_use]
    pub const fn flags(&self) -> ActionFlags {
        self.flags
    }

    /// Run the handler on the current thread. Dispatchers call this from the
    /// UI thread.
    pub fn run(&self) {
        (self.handler)(self);
    }

    /// Release the busy flag and dialog slot taken by this invocation.
    pub fn finish(&self) {
        match self.registry.upgrade() {
            Some(inner) => ActionRegistry { inner }.release(self.action, Some(self.epoch)),
            None => debug!("Registry gone, finish of '{}' ignored", self.action),
        }
    }

    /// Registry this invocation came from, if it is still alive.
    #[must_use]
    pub fn registry(&self) -> Option<ActionRegistry> {
        self.registry.upgrade().map(|inner| ActionRegistry { inner })
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("action", &self.action)
            .field("flags", &self.flags)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl ActionRegistry {
    /// Create an initialized registry.
    #[must_use]
    pub fn new(config: &RegistryConfig) -> Self {
        let initial_capacity = config.initial_capacity.max(1);
        info!(
            "ActionRegistry initialized with capacity {}",
            initial_capacity
        );

        Self {
            inner: Arc::new(RegistryInner {
                state: Mutex::new(RegistryState::empty(initial_capacity, 0)),
                initial_capacity,
            }),
        }
    }

    /// Start over with an empty table. A populated table is shut down first.
    pub fn initialize(&self) {
        if !self.is_empty() {
            info!("Re-initializing populated ActionRegistry");
        }
        self.shutdown();
    }

    /// Install the function that runs `uithread`/`dialog` handlers on the UI
    /// thread.
    pub fn set_dispatch_function<D>(&self, dispatcher: D)
    where
        D: UiDispatcher + 'static,
    {
        self.set_dispatcher(Arc::new(dispatcher));
    }

    pub fn set_dispatcher(&self, dispatcher: Arc<dyn UiDispatcher>) {
        let mut state = self.inner.state.lock();
        if state.dispatcher.replace(dispatcher).is_some() {
            warn!("UI dispatcher replaced");
        } else {
            debug!("UI dispatcher installed");
        }
    }

    /// Add a slice of mappings. Entries for `None` or for ids that already
    /// have a mapping are skipped with an error log; the rest are added.
    pub fn register_actions<I>(&self, mappings: I) -> RegistrationReport
    where
        I: IntoIterator<Item = ActionMapping>,
    {
        let mut report = RegistrationReport::default();
        let mut state = self.inner.state.lock();

        for mapping in mappings {
            if !mapping.action.is_valid() {
                error!("Refusing to register the reserved 'none' action");
                report.rejected.push(mapping.action);
                continue;
            }

            if state.index[mapping.action].is_some() {
                error!("{}", ActionError::DuplicateRegistration(mapping.action));
                report.rejected.push(mapping.action);
                continue;
            }

            state.push(MappingEntry {
                action: mapping.action,
                handler: mapping.handler,
                flags: mapping.flags,
                is_busy: false,
                running_since: None,
            });
            report.added += 1;
        }

        debug!(
            "Registered {} actions ({} rejected), {} total",
            report.added,
            report.rejected.len(),
            state.mappings.len()
        );

        report
    }

    /// Request an action. Never blocks on the handler and never fails
    /// loudly: problems are logged and reported through the outcome.
    pub fn trigger(&self, action: ActionId) -> TriggerOutcome {
        let (invocation, dispatcher) = {
            let mut guard = self.inner.state.lock();
            let state = &mut *guard;

            let Some(slot) = state.index[action] else {
                error!("{}", ActionError::UnknownAction(action));
                return TriggerOutcome::Unknown;
            };

            let entry = &state.mappings[slot];
            let flags = entry.flags;

            if flags.blocks && entry.is_busy {
                debug!("Action '{}' busy, trigger dropped", action);
                return TriggerOutcome::DroppedBusy;
            }

            if flags.dialog {
                if let Some(owner) = state.dialog_owner {
                    debug!(
                        "Dialog '{}' active, trigger of '{}' dropped",
                        owner, action
                    );
                    return TriggerOutcome::DroppedDialog;
                }
            }

            let dispatcher = if flags.needs_ui_thread() {
                match &state.dispatcher {
                    Some(dispatcher) => Some(Arc::clone(dispatcher)),
                    None => {
                        error!("{}", ActionError::DispatcherMissing(action));
                        return TriggerOutcome::NoDispatcher;
                    }
                }
            } else {
                None
            };

            let entry = &mut state.mappings[slot];
            if flags.blocks {
                entry.is_busy = true;
            }
            if flags.needs_finish() {
                entry.running_since = Some(Instant::now());
            }
            if flags.dialog {
                state.dialog_owner = Some(action);
            }

            let invocation = Invocation {
                action,
                flags,
                handler: Arc::clone(&entry.handler),
                epoch: state.epoch,
                registry: Arc::downgrade(&self.inner),
            };

            (invocation, dispatcher)
        };

        match dispatcher {
            Some(dispatcher) => {
                debug!("Dispatching '{}' to the UI thread", action);
                dispatcher.dispatch(invocation);
                TriggerOutcome::Dispatched
            }
            None => {
                debug!("Running '{}'", action);
                invocation.run();
                TriggerOutcome::Ran
            }
        }
    }

    /// Trigger by machine name, as read from hotkey or joystick mappings.
    pub fn trigger_by_name(&self, name: &str) -> TriggerOutcome {
        match name.parse::<ActionId>() {
            Ok(action) => self.trigger(action),
            Err(err) => {
                error!("{}", err);
                TriggerOutcome::Unknown
            }
        }
    }

    /// Mark an action complete: clears its busy flag and, if it holds the
    /// dialog slot, releases it. Redundant calls are harmless.
    pub fn finish(&self, action: ActionId) {
        self.release(action, None);
    }

    fn release(&self, action: ActionId, epoch: Option<u64>) {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;

        if epoch.is_some_and(|epoch| epoch != state.epoch) {
            debug!("Stale finish of '{}' from a previous table ignored", action);
            return;
        }

        let Some(slot) = state.index[action] else {
            error!("Finish: {}", ActionError::UnknownAction(action));
            return;
        };

        let entry = &mut state.mappings[slot];
        let was_busy = std::mem::replace(&mut entry.is_busy, false);
        entry.running_since = None;

        let released_dialog = entry.flags.dialog && state.dialog_owner == Some(action);
        if released_dialog {
            state.dialog_owner = None;
        }

        if was_busy || released_dialog {
            debug!("Action '{}' finished", action);
        } else {
            debug!("Action '{}' was not running, finish ignored", action);
        }
    }

    /// Drop every mapping and the dispatcher.
    pub fn shutdown(&self) {
        let mut state = self.inner.state.lock();
        let count = state.mappings.len();
        let epoch = state.epoch + 1;
        *state = RegistryState::empty(self.inner.initial_capacity, epoch);
        info!("ActionRegistry shut down ({} mappings released)", count);
    }

    #[must_use]
    pub fn is_registered(&self, action: ActionId) -> bool {
        self.inner.state.lock().index[action].is_some()
    }

    #[must_use]
    pub fn is_busy(&self, action: ActionId) -> bool {
        self.inner
            .state
            .lock()
            .entry(action)
            .is_some_and(|entry| entry.is_busy)
    }

    #[must_use]
    pub fn is_dialog_active(&self) -> bool {
        self.inner.state.lock().dialog_owner.is_some()
    }

    /// The dialog action currently holding the dialog slot.
    #[must_use]
    pub fn dialog_owner(&self) -> Option<ActionId> {
        self.inner.state.lock().dialog_owner
    }

    #[must_use]
    pub fn flags(&self, action: ActionId) -> Option<ActionFlags> {
        self.inner.state.lock().entry(action).map(|entry| entry.flags)
    }

    #[must_use]
    pub fn has_dispatcher(&self) -> bool {
        self.inner.state.lock().dispatcher.is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.state.lock().mappings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.state.lock().mappings.capacity()
    }

    /// Registered ids in registration order.
    #[must_use]
    pub fn registered_actions(&self) -> Vec<ActionId> {
        self.inner
            .state
            .lock()
            .mappings
            .iter()
            .map(|entry| entry.action)
            .collect()
    }

    /// Running blocking/dialog actions older than `threshold`.
    #[must_use]
    pub fn stalled(&self, threshold: Duration) -> Vec<StalledAction> {
        let now = Instant::now();
        self.inner
            .state
            .lock()
            .mappings
            .iter()
            .filter_map(|entry| {
                let running_for = now.saturating_duration_since(entry.running_since?);
                (running_for >= threshold).then_some(StalledAction {
                    action: entry.action,
                    running_for,
                })
            })
            .collect()
    }

    /// Log every mapping at debug level.
    pub fn dump(&self) {
        let state = self.inner.state.lock();
        debug!(
            "{} actions registered, dialog owner: {:?}",
            state.mappings.len(),
            state.dialog_owner.map(ActionId::name)
        );
        for entry in &state.mappings {
            debug!(
                "  {:<24} [{}] busy={} {}",
                entry.action.name(),
                entry.flags,
                entry.is_busy,
                entry.action.description()
            );
        }
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new(&RegistryConfig::default())
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ActionRegistry")
            .field("mappings", &state.mappings.len())
            .field("dialog_owner", &state.dialog_owner)
            .field("has_dispatcher", &state.dispatcher.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    use parking_lot::Mutex as PlMutex;

    fn registry() -> ActionRegistry {
        ActionRegistry::new(&RegistryConfig::default())
    }

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    fn counting(action: ActionId, hits: &Arc<AtomicUsize>) -> ActionMapping {
        let hits = Arc::clone(hits);
        ActionMapping::new(action, move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    }

    /// Dispatcher that parks invocations until the test runs them.
    #[derive(Default, Clone)]
    struct Parked(Arc<PlMutex<Vec<Invocation>>>);

    impl Parked {
        fn take(&self) -> Vec<Invocation> {
            std::mem::take(&mut *self.0.lock())
        }

        fn len(&self) -> usize {
            self.0.lock().len()
        }
    }

    impl UiDispatcher for Parked {
        fn dispatch(&self, invocation: Invocation) {
            self.0.lock().push(invocation);
        }
    }

    #[test]
    fn test_blocking_action_runs_once_until_finished() {
        let registry = registry();
        let hits = counter();
        registry.register_actions([counting(ActionId::ResetSoft, &hits).blocks()]);

        assert_eq!(registry.trigger(ActionId::ResetSoft), TriggerOutcome::Ran);
        assert_eq!(
            registry.trigger(ActionId::ResetSoft),
            TriggerOutcome::DroppedBusy
        );
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(registry.is_busy(ActionId::ResetSoft));

        registry.finish(ActionId::ResetSoft);
        assert!(!registry.is_busy(ActionId::ResetSoft));
        assert_eq!(registry.trigger(ActionId::ResetSoft), TriggerOutcome::Ran);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_handler_can_finish_synchronously() {
        let registry = registry();
        let hits = counter();
        let seen = Arc::clone(&hits);
        registry.register_actions([ActionMapping::new(ActionId::ResetHard, move |inv| {
            seen.fetch_add(1, Ordering::SeqCst);
            inv.finish();
        })
        .blocks()]);

        for _ in 0..3 {
            assert_eq!(registry.trigger(ActionId::ResetHard), TriggerOutcome::Ran);
        }
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert!(!registry.is_busy(ActionId::ResetHard));
    }

    #[test]
    fn test_dialogs_are_mutually_exclusive() {
        let registry = registry();
        let parked = Parked::default();
        registry.set_dispatch_function(parked.clone());

        let a_hits = counter();
        let b_hits = counter();
        registry.register_actions([
            counting(ActionId::DriveAttach8, &a_hits).dialog(),
            counting(ActionId::HotkeysLoad, &b_hits).dialog(),
        ]);

        assert_eq!(
            registry.trigger(ActionId::DriveAttach8),
            TriggerOutcome::Dispatched
        );
        parked.take().iter().for_each(Invocation::run);
        assert_eq!(a_hits.load(Ordering::SeqCst), 1);
        assert_eq!(registry.dialog_owner(), Some(ActionId::DriveAttach8));

        assert_eq!(
            registry.trigger(ActionId::HotkeysLoad),
            TriggerOutcome::DroppedDialog
        );
        assert_eq!(parked.len(), 0);
        assert_eq!(b_hits.load(Ordering::SeqCst), 0);

        registry.finish(ActionId::DriveAttach8);
        assert!(!registry.is_dialog_active());
        assert_eq!(
            registry.trigger(ActionId::HotkeysLoad),
            TriggerOutcome::Dispatched
        );
        parked.take().iter().for_each(Invocation::run);
        assert_eq!(b_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_same_dialog_cannot_open_twice() {
        let registry = registry();
        let parked = Parked::default();
        registry.set_dispatch_function(parked.clone());
        registry.register_actions([ActionMapping::new(ActionId::SettingsDialog, |_| {}).dialog()]);

        assert!(registry.trigger(ActionId::SettingsDialog).accepted());
        assert_eq!(
            registry.trigger(ActionId::SettingsDialog),
            TriggerOutcome::DroppedDialog
        );
        assert_eq!(parked.len(), 1);
    }

    #[test]
    fn test_finish_of_other_dialog_keeps_slot() {
        let registry = registry();
        registry.set_dispatch_function(Parked::default());
        registry.register_actions([
            ActionMapping::new(ActionId::SnapshotLoad, |_| {}).dialog(),
            ActionMapping::new(ActionId::SnapshotSave, |_| {}).dialog(),
        ]);

        registry.trigger(ActionId::SnapshotLoad);
        registry.finish(ActionId::SnapshotSave);
        assert_eq!(registry.dialog_owner(), Some(ActionId::SnapshotLoad));
        assert_eq!(
            registry.trigger(ActionId::SnapshotSave),
            TriggerOutcome::DroppedDialog
        );
    }

    #[test]
    fn test_dialog_drop_does_not_mark_blocking_dialog_busy() {
        let registry = registry();
        registry.set_dispatch_function(Parked::default());
        registry.register_actions([
            ActionMapping::new(ActionId::CartAttach, |_| {}).dialog(),
            ActionMapping::new(ActionId::TapeAttach1, |_| {}).dialog().blocks(),
        ]);

        assert!(registry.trigger(ActionId::CartAttach).accepted());
        assert_eq!(
            registry.trigger(ActionId::TapeAttach1),
            TriggerOutcome::DroppedDialog
        );
        assert!(!registry.is_busy(ActionId::TapeAttach1));
        assert!(
            registry
                .stalled(Duration::ZERO)
                .iter()
                .all(|item| item.action != ActionId::TapeAttach1)
        );

        registry.finish(ActionId::CartAttach);
        assert!(registry.trigger(ActionId::TapeAttach1).accepted());
        assert!(registry.is_busy(ActionId::TapeAttach1));
        assert_eq!(registry.dialog_owner(), Some(ActionId::TapeAttach1));
    }

    #[test]
    fn test_thread_routing() {
        let registry = registry();
        let parked = Parked::default();
        registry.set_dispatch_function(parked.clone());

        let plain = counter();
        let ui = counter();
        registry.register_actions([
            counting(ActionId::WarpModeToggle, &plain),
            counting(ActionId::FullscreenToggle, &ui).uithread(),
        ]);

        assert_eq!(
            registry.trigger(ActionId::WarpModeToggle),
            TriggerOutcome::Ran
        );
        assert_eq!(plain.load(Ordering::SeqCst), 1);
        assert_eq!(parked.len(), 0);

        assert_eq!(
            registry.trigger(ActionId::FullscreenToggle),
            TriggerOutcome::Dispatched
        );
        assert_eq!(ui.load(Ordering::SeqCst), 0);

        let pending = parked.take();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].action(), ActionId::FullscreenToggle);
        pending[0].run();
        assert_eq!(ui.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_plain_action_runs_without_dispatcher_from_other_thread() {
        let registry = registry();
        let hits = counter();
        registry.register_actions([counting(ActionId::PauseToggle, &hits)]);

        let remote = registry.clone();
        let outcome = thread::spawn(move || remote.trigger(ActionId::PauseToggle))
            .join()
            .unwrap();

        assert_eq!(outcome, TriggerOutcome::Ran);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_dispatcher_leaves_state_untouched() {
        let registry = registry();
        let hits = counter();
        registry.register_actions([
            counting(ActionId::SmartAttach, &hits).dialog().blocks(),
            counting(ActionId::Quit, &hits).uithread(),
        ]);

        assert_eq!(
            registry.trigger(ActionId::SmartAttach),
            TriggerOutcome::NoDispatcher
        );
        assert_eq!(registry.trigger(ActionId::Quit), TriggerOutcome::NoDispatcher);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(!registry.is_busy(ActionId::SmartAttach));
        assert!(!registry.is_dialog_active());

        registry.set_dispatch_function(Parked::default());
        assert_eq!(
            registry.trigger(ActionId::SmartAttach),
            TriggerOutcome::Dispatched
        );
    }

    #[test]
    fn test_duplicate_registration_keeps_first_handler() {
        let registry = registry();
        let first = counter();
        let second = counter();

        let report = registry.register_actions([counting(ActionId::AdvanceFrame, &first)]);
        assert_eq!(report.added, 1);

        let report = registry.register_actions([
            counting(ActionId::AdvanceFrame, &second).blocks(),
            counting(ActionId::WarpModeToggle, &second),
        ]);
        assert_eq!(report.added, 1);
        assert_eq!(report.rejected.as_slice(), &[ActionId::AdvanceFrame]);

        registry.trigger(ActionId::AdvanceFrame);
        registry.trigger(ActionId::AdvanceFrame);
        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 0);
        assert_eq!(registry.flags(ActionId::AdvanceFrame), Some(ActionFlags::NONE));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_none_action_is_rejected() {
        let registry = registry();
        let report = registry.register_actions([ActionMapping::new(ActionId::None, |_| {})]);
        assert_eq!(report.added, 0);
        assert!(registry.is_empty());
        assert_eq!(registry.trigger(ActionId::None), TriggerOutcome::Unknown);
    }

    #[test]
    fn test_unknown_action_is_harmless() {
        let registry = registry();
        registry.set_dispatch_function(Parked::default());
        registry.register_actions([ActionMapping::new(ActionId::AboutDialog, |_| {}).dialog()]);
        registry.trigger(ActionId::AboutDialog);

        assert_eq!(registry.trigger(ActionId::CartAttach), TriggerOutcome::Unknown);
        registry.finish(ActionId::CartAttach);
        assert_eq!(registry.trigger_by_name("no-such-thing"), TriggerOutcome::Unknown);

        assert_eq!(registry.dialog_owner(), Some(ActionId::AboutDialog));
        assert_eq!(registry.registered_actions(), vec![ActionId::AboutDialog]);
    }

    #[test]
    fn test_finish_is_idempotent() {
        let registry = registry();
        let hits = counter();
        registry.register_actions([
            counting(ActionId::DriveReset8, &hits).blocks(),
            counting(ActionId::WarpModeToggle, &hits),
        ]);

        registry.finish(ActionId::DriveReset8);
        registry.finish(ActionId::WarpModeToggle);
        registry.trigger(ActionId::DriveReset8);
        registry.finish(ActionId::DriveReset8);
        registry.finish(ActionId::DriveReset8);

        assert!(!registry.is_busy(ActionId::DriveReset8));
        assert_eq!(registry.trigger(ActionId::DriveReset8), TriggerOutcome::Ran);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_trigger_by_name() {
        let registry = registry();
        let hits = counter();
        registry.register_actions([counting(ActionId::DriveDetachAll, &hits)]);

        assert_eq!(registry.trigger_by_name("drive-detach-all"), TriggerOutcome::Ran);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_table_grows_by_doubling() {
        let config = RegistryConfig {
            initial_capacity: 2,
            ..RegistryConfig::default()
        };
        let registry = ActionRegistry::new(&config);
        assert!(registry.capacity() >= 2);

        let actions: Vec<ActionId> = ActionId::iter().take(9).collect();
        for action in &actions {
            registry.register_actions([ActionMapping::new(*action, |_| {})]);
        }

        assert_eq!(registry.len(), 9);
        assert!(registry.capacity() >= 9);
        assert_eq!(registry.registered_actions(), actions);
        assert!(actions.iter().all(|action| registry.is_registered(*action)));
    }

    #[test]
    fn test_registration_order_does_not_matter() {
        let forward = registry();
        let backward = registry();
        let mut slice: Vec<ActionMapping> = ActionId::iter()
            .take(6)
            .map(|action| ActionMapping::new(action, |_| {}))
            .collect();

        forward.register_actions(slice.clone());
        slice.reverse();
        backward.register_actions(slice);

        for action in ActionId::iter().take(6) {
            assert!(forward.is_registered(action));
            assert!(backward.is_registered(action));
            assert_eq!(forward.trigger(action), backward.trigger(action));
        }
    }

    #[test]
    fn test_shutdown_and_reinitialize() {
        let registry = registry();
        let parked = Parked::default();
        registry.set_dispatch_function(parked.clone());
        registry.register_actions([ActionMapping::new(ActionId::HotkeysSave, |_| {}).dialog()]);
        registry.trigger(ActionId::HotkeysSave);
        let stale = parked.take();

        registry.initialize();
        assert!(registry.is_empty());
        assert!(!registry.has_dispatcher());
        assert!(!registry.is_dialog_active());

        registry.set_dispatch_function(parked.clone());
        registry.register_actions([ActionMapping::new(ActionId::HotkeysSave, |_| {}).dialog()]);
        registry.trigger(ActionId::HotkeysSave);

        // Finishing the invocation from the old table must not free the new one.
        stale[0].finish();
        assert_eq!(registry.dialog_owner(), Some(ActionId::HotkeysSave));

        parked.take()[0].finish();
        assert!(!registry.is_dialog_active());
    }

    #[test]
    fn test_invocation_outlives_registry() {
        let parked = Parked::default();
        {
            let registry = registry();
            registry.set_dispatch_function(parked.clone());
            registry.register_actions([ActionMapping::new(ActionId::Quit, |_| {}).uithread()]);
            registry.trigger(ActionId::Quit);
            registry.shutdown();
        }
        for invocation in parked.take() {
            assert!(invocation.registry().is_none());
            invocation.run();
            invocation.finish();
        }
    }

    #[test]
    fn test_concurrent_triggers_admit_one_blocking_run() {
        const THREADS: usize = 8;

        let registry = registry();
        let hits = counter();
        registry.register_actions([counting(ActionId::SnapshotQuicksave, &hits).blocks()]);

        let barrier = Arc::new(Barrier::new(THREADS));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let registry = registry.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    (0..50)
                        .filter(|_| registry.trigger(ActionId::SnapshotQuicksave).accepted())
                        .count()
                })
            })
            .collect();

        let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(accepted, 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_dialogs_admit_one() {
        const THREADS: usize = 6;

        let registry = registry();
        let parked = Parked::default();
        registry.set_dispatch_function(parked.clone());
        let dialogs: Vec<ActionId> = vec![
            ActionId::DriveAttach8,
            ActionId::DriveAttach9,
            ActionId::DriveAttach10,
            ActionId::DriveAttach11,
            ActionId::HotkeysLoad,
            ActionId::SettingsDialog,
        ];
        registry.register_actions(
            dialogs
                .iter()
                .map(|action| ActionMapping::new(*action, |_| {}).dialog()),
        );

        let barrier = Arc::new(Barrier::new(THREADS));
        let handles: Vec<_> = dialogs
            .iter()
            .copied()
            .map(|action| {
                let registry = registry.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    registry.trigger(action)
                })
            })
            .collect();

        let outcomes: Vec<TriggerOutcome> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        let dispatched = outcomes.iter().filter(|o| o.accepted()).count();
        assert_eq!(dispatched, 1);
        assert!(outcomes
            .iter()
            .filter(|o| !o.accepted())
            .all(|o| *o == TriggerOutcome::DroppedDialog));
        assert_eq!(parked.len(), 1);
    }

    #[test]
    fn test_stalled_reports_running_actions() {
        let registry = registry();
        registry.register_actions([
            ActionMapping::new(ActionId::DriveReset9, |_| {}).blocks(),
            ActionMapping::new(ActionId::WarpModeToggle, |_| {}),
        ]);

        registry.trigger(ActionId::DriveReset9);
        registry.trigger(ActionId::WarpModeToggle);

        let stalled = registry.stalled(Duration::ZERO);
        assert_eq!(stalled.len(), 1);
        assert_eq!(stalled[0].action, ActionId::DriveReset9);
        assert!(registry.stalled(Duration::from_secs(3600)).is_empty());

        registry.finish(ActionId::DriveReset9);
        assert!(registry.stalled(Duration::ZERO).is_empty());
    }

    #[test]
    fn test_outcome_helpers() {
        assert!(TriggerOutcome::Ran.accepted());
        assert!(TriggerOutcome::Dispatched.accepted());
        assert!(TriggerOutcome::DroppedBusy.dropped());
        assert!(!TriggerOutcome::Unknown.dropped());
        assert!(!TriggerOutcome::NoDispatcher.accepted());
    }
}
