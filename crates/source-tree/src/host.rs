//! Collaborators provided by the embedding application.
//!
//! The engine never owns the map, the notification area or the persisted
//! state; it is handed a [`Host`] bundling the three for each operation.

use std::fmt;

use thiserror::Error;

use crate::renderable::Renderable;
use crate::state::LifecycleMap;

/// The live map surface holding materialized layers by name.
pub trait LiveSurface: Send {
    /// Whether a layer of that name is currently live.
    fn has(&self, name: &str) -> bool;

    /// Register a layer.
    fn add(&mut self, renderable: Renderable);

    /// Remove a layer by name. Unknown names are ignored.
    fn remove(&mut self, name: &str);

    /// Activate (show) a registered layer.
    fn activate(&mut self, renderable: &Renderable) -> Result<(), ActivationError>;
}

/// A live surface refused to activate a layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ActivationError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Sink for user-facing failure messages. Never consulted for control flow.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Persistence for the lifecycle map.
pub trait StateStore: Send {
    fn get(&self) -> LifecycleMap;
    fn set(&mut self, map: &LifecycleMap);
}

/// The host collaborators one engine operation works against.
pub struct Host<'a> {
    pub surface: &'a mut dyn LiveSurface,
    pub notifier: &'a dyn Notifier,
    pub store: &'a mut dyn StateStore,
}

impl<'a> Host<'a> {
    pub fn new(
        surface: &'a mut dyn LiveSurface,
        notifier: &'a dyn Notifier,
        store: &'a mut dyn StateStore,
    ) -> Self {
        Self {
            surface,
            notifier,
            store,
        }
    }

    pub(crate) fn notify(&self, severity: Severity, message: impl Into<String>) {
        self.notifier.notify(Notification::new(severity, message));
    }
}
