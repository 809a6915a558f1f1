//! Runtime bindings of action ids to handlers.

use std::fmt;
use std::sync::Arc;

use crate::controller::action_registry::Invocation;
use crate::model::action_id::ActionId;

/// Handler shape shared by every action. It always receives the invocation,
/// which carries the action id and flags and can release the action.
pub type ActionHandler = Arc<dyn Fn(&Invocation) + Send + Sync>;

/// Execution-mode flags of a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionFlags {
    /// Only one invocation may be in flight; needs `finish`.
    pub blocks: bool,

    /// Opens a modal dialog; exclusive with every other dialog action.
    pub dialog: bool,

    /// Must run on the UI thread.
    pub uithread: bool,
}

impl ActionFlags {
    pub const NONE: Self = Self {
        blocks: false,
        dialog: false,
        uithread: false,
    };

    #[must_use]
    pub const fn blocking(mut self) -> Self {
        self.blocks = true;
        self
    }

    #[must_use]
    pub const fn dialog(mut self) -> Self {
        self.dialog = true;
        self
    }

    #[must_use]
    pub const fn uithread(mut self) -> Self {
        self.uithread = true;
        self
    }

    /// Handler is marshalled through the UI dispatcher.
    #[must_use]
    pub const fn needs_ui_thread(self) -> bool {
        self.uithread || self.dialog
    }

    /// Invocation holds state that only `finish` releases.
    #[must_use]
    pub const fn needs_finish(self) -> bool {
        self.blocks || self.dialog
    }
}

impl fmt::Display for ActionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = |set: bool, c: char| if set { c } else { '-' };
        write!(
            f,
            "{}{}{}",
            mark(self.blocks, 'b'),
            mark(self.dialog, 'd'),
            mark(self.uithread, 'u')
        )
    }
}

/// One entry handed to `ActionRegistry::register_actions`.
#[derive(Clone)]
pub struct ActionMapping {
    pub action: ActionId,
    pub handler: ActionHandler,
    pub flags: ActionFlags,
}

impl ActionMapping {
    /// Plain mapping: runs on the caller's thread, no admission control.
    pub fn new<F>(action: ActionId, handler: F) -> Self
    where
        F: Fn(&Invocation) + Send + Sync + 'static,
    {
        Self {
            action,
            handler: Arc::new(handler),
            flags: ActionFlags::NONE,
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: ActionFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn blocks(mut self) -> Self {
        self.flags = self.flags.blocking();
        self
    }

    #[must_use]
    pub fn dialog(mut self) -> Self {
        self.flags = self.flags.dialog();
        self
    }

    #[must_use]
    pub fn uithread(mut self) -> Self {
        self.flags = self.flags.uithread();
        self
    }
}

impl fmt::Debug for ActionMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionMapping")
            .field("action", &self.action)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}
