pub mod error;

pub mod config;

pub mod controller {
    pub mod action_registry;
    pub use action_registry::{
        ActionRegistry, Invocation, RegistrationReport, StalledAction, TriggerOutcome,
    };

    pub mod ui_dispatch;
    pub use ui_dispatch::{UiDispatcher, UiQueue, UiQueueSender};

    pub mod watchdog;
    pub use watchdog::StallWatchdog;

    pub mod domains;
}

pub mod model {
    pub mod action_id;
    pub use action_id::{ActionDescriptor, ActionId};

    pub mod machine;
    pub use machine::{Machine, MachineMask};

    pub mod mapping;
    pub use mapping::{ActionFlags, ActionHandler, ActionMapping};
}

pub mod logging;

pub use controller::{ActionRegistry, Invocation, TriggerOutcome};
pub use error::{ActionError, ActionResult};
pub use model::{ActionFlags, ActionId, ActionMapping};
