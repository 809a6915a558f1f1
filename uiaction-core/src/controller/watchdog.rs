//! Stall diagnostics for actions that never call `finish`.
//!
//! A blocking or dialog action that is never finished stays busy forever (and
//! a dialog one locks out every other dialog). Nothing is force-released here;
//! the watchdog only logs a warning, once per stuck episode.

use std::time::Duration;

use enum_map::EnumMap;
use tracing::{info, warn};

use crate::controller::action_registry::{ActionRegistry, StalledAction};
use crate::model::action_id::ActionId;

#[derive(Debug)]
pub struct StallWatchdog {
    registry: ActionRegistry,
    threshold: Duration,
    reported: EnumMap<ActionId, bool>,
}

impl StallWatchdog {
    /// A zero threshold disables the watchdog.
    #[must_use]
    pub fn new(registry: ActionRegistry, threshold: Duration) -> Self {
        Self {
            registry,
            threshold,
            reported: EnumMap::default(),
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !self.threshold.is_zero()
    }

    /// Log newly stalled actions and return them.
    pub fn check(&mut self) -> Vec<StalledAction> {
        if !self.is_enabled() {
            return Vec::new();
        }

        let stalled = self.registry.stalled(self.threshold);

        let mut still_stalled: EnumMap<ActionId, bool> = EnumMap::default();
        for item in &stalled {
            still_stalled[item.action] = true;
        }
        for (action, reported) in &mut self.reported {
            if *reported && !still_stalled[action] {
                info!("Action '{}' finished after stall warning", action);
                *reported = false;
            }
        }

        let fresh: Vec<StalledAction> = stalled
            .into_iter()
            .filter(|item| !self.reported[item.action])
            .collect();

        for item in &fresh {
            self.reported[item.action] = true;
            warn!(
                "Action '{}' has been running for {:.1}s without finish; \
                 it will ignore triggers until finished",
                item.action,
                item.running_for.as_secs_f64()
            );
            if self.registry.dialog_owner() == Some(item.action) {
                warn!("All dialog actions are blocked by '{}'", item.action);
            }
        }

        fresh
    }
}
