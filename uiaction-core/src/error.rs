//! src/error.rs
//! ============================================================================
//! # `ActionError`: Unified Error Type for the Action Subsystem
//!
//! Registry operations recover locally and only log; this type describes those
//! failures for logs and reports, and is the real `Err` of the fallible set-up
//! paths (configuration, logging, id parsing).

use std::{io, path::PathBuf};

use compact_str::CompactString;
use thiserror::Error;

use crate::model::action_id::ActionId;

/// Convenient alias carrying our unified error type
pub type ActionResult<T> = Result<T, ActionError>;

#[derive(Debug, Error)]
pub enum ActionError {
    /// No mapping is registered for the action.
    #[error("No handler registered for action '{}'", .0.name())]
    UnknownAction(ActionId),

    /// A name that is not in the descriptor table (hotkey files, joystick maps).
    #[error("Unknown action name: {0:?}")]
    UnknownActionName(CompactString),

    /// Raw id outside `(NONE, ID_COUNT)`.
    #[error("Invalid action id: {0}")]
    InvalidAction(u32),

    /// Second registration of an action; the first one stays bound.
    #[error("Action '{}' is already registered", .0.name())]
    DuplicateRegistration(ActionId),

    /// Action needs the UI thread but no dispatcher has been installed.
    #[error("No UI dispatcher set, cannot run action '{}'", .0.name())]
    DispatcherMissing(ActionId),

    /// Config file I/O error with path.
    #[error("Failed to access config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// TOML config serialization error.
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Config directory could not be determined on this platform.
    #[error("Could not determine config directory")]
    ConfigDirUnavailable,

    /// Tracing subscriber set-up failed.
    #[error("Logging setup failed: {0}")]
    Logging(String),

    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ActionError {
    /// Create a config I/O error
    pub fn config_io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::ConfigIo {
            path: path.into(),
            source,
        }
    }

    /// Create a logging set-up error
    pub fn logging<E: std::fmt::Display>(err: E) -> Self {
        Self::Logging(err.to_string())
    }

    /// The action this error is about, if any.
    #[must_use]
    pub const fn action(&self) -> Option<ActionId> {
        match self {
            Self::UnknownAction(id)
            | Self::DuplicateRegistration(id)
            | Self::DispatcherMissing(id) => Some(*id),
            _ => None,
        }
    }
}
