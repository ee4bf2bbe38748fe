//! Capability-driven source trees and their map lifecycle.
//!
//! A source (WMS, WFS, WMTS or a capability-less type such as a 3D tileset)
//! is loaded into a [`webdata_common::TreeNode`] tree. Its leaves are added
//! to and removed from a live map surface through the lifecycle functions,
//! which keep the surface, the persisted [`LifecycleMap`] and the nodes'
//! state in step. [`SourceManager`] ties loading, lifecycle and restore
//! together for an embedding application.

pub mod collection;
pub mod config;
pub mod error;
pub mod fetch;
pub mod host;
pub mod lifecycle;
pub mod loader;
pub mod manager;
pub mod renderable;
pub mod restore;
pub mod state;

pub use collection::{NodePath, SourceCollection};
pub use config::WebdataConfig;
pub use error::{FetchErrorKind, SourceFetchError, WebdataError, WebdataResult};
pub use fetch::{CapabilityFetcher, HttpFetcher};
pub use host::{ActivationError, Host, LiveSurface, Notification, Notifier, Severity, StateStore};
pub use lifecycle::AddAllReport;
pub use loader::FetchedSource;
pub use manager::SourceManager;
pub use renderable::{Renderable, RenderableOptions};
pub use restore::RestoreReport;
pub use state::{LifecycleEntry, LifecycleMap};
