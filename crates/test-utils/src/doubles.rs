//! In-memory stand-ins for the host collaborators and the network.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use source_tree::{
    ActivationError, CapabilityFetcher, FetchErrorKind, Host, LifecycleMap, LiveSurface,
    Notification, Notifier, Renderable, Severity, SourceFetchError, StateStore,
};

use crate::fixtures::{capabilities, urls};

/// One call made against a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Add(String),
    Remove(String),
    Activate(String),
}

/// Live surface that records every call.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    live: BTreeSet<String>,
    renderables: BTreeMap<String, Renderable>,
    refused: HashSet<String>,
    pub calls: Vec<SurfaceCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface that already shows layers of these names (added elsewhere).
    pub fn with_live(names: &[&str]) -> Self {
        Self {
            live: names.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Show a layer added by someone else, without recording a call.
    pub fn mark_live(&mut self, name: &str) {
        self.live.insert(name.to_string());
    }

    /// Make activation of `name` fail.
    pub fn refuse_activation(&mut self, name: &str) {
        self.refused.insert(name.to_string());
    }

    pub fn live_names(&self) -> Vec<String> {
        self.live.iter().cloned().collect()
    }

    /// The last renderable registered under `name`.
    pub fn renderable(&self, name: &str) -> Option<&Renderable> {
        self.renderables.get(name)
    }

    pub fn remove_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SurfaceCall::Remove(_)))
            .count()
    }

    pub fn add_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SurfaceCall::Add(_)))
            .count()
    }
}

impl LiveSurface for RecordingSurface {
    fn has(&self, name: &str) -> bool {
        self.live.contains(name)
    }

    fn add(&mut self, renderable: Renderable) {
        self.calls.push(SurfaceCall::Add(renderable.name.clone()));
        self.live.insert(renderable.name.clone());
        self.renderables.insert(renderable.name.clone(), renderable);
    }

    fn remove(&mut self, name: &str) {
        self.calls.push(SurfaceCall::Remove(name.to_string()));
        self.live.remove(name);
    }

    fn activate(&mut self, renderable: &Renderable) -> Result<(), ActivationError> {
        self.calls.push(SurfaceCall::Activate(renderable.name.clone()));
        if self.refused.contains(&renderable.name) {
            return Err(ActivationError(format!("{} cannot be shown", renderable.name)));
        }
        Ok(())
    }
}

/// Notifier that keeps everything it is told.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.notifications()
            .iter()
            .filter(|n| n.severity == severity)
            .count()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push(notification);
        }
    }
}

/// State store backed by a plain value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub map: LifecycleMap,
    pub writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_map(map: LifecycleMap) -> Self {
        Self { map, writes: 0 }
    }
}

impl StateStore for MemoryStore {
    fn get(&self) -> LifecycleMap {
        self.map.clone()
    }

    fn set(&mut self, map: &LifecycleMap) {
        self.map = map.clone();
        self.writes += 1;
    }
}

/// The three host collaborators, owned together.
#[derive(Debug, Default)]
pub struct TestHost {
    pub surface: RecordingSurface,
    pub notifier: CollectingNotifier,
    pub store: MemoryStore,
}

impl TestHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(&mut self) -> Host<'_> {
        Host::new(&mut self.surface, &self.notifier, &mut self.store)
    }
}

type Response = Result<String, FetchErrorKind>;

/// Fetcher answering from canned documents, keyed by URL without query.
///
/// `DescribeFeatureType` requests are answered separately from
/// `GetCapabilities`. Unknown URLs answer with HTTP 404.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    capabilities: HashMap<String, Response>,
    describe: HashMap<String, Response>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves every capability fixture under its [`urls`] entry.
    pub fn with_fixtures() -> Self {
        Self::new()
            .with_capabilities(urls::WMS, capabilities::WMS_130)
            .with_capabilities(urls::WMS_111, capabilities::WMS_111)
            .with_capabilities(urls::WFS, capabilities::WFS_200)
            .with_describe(urls::WFS, capabilities::WFS_DESCRIBE_FEATURE_TYPE)
            .with_capabilities(urls::WMTS, capabilities::WMTS_100)
    }

    pub fn with_capabilities(mut self, url: &str, body: &str) -> Self {
        self.capabilities.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub fn with_describe(mut self, url: &str, body: &str) -> Self {
        self.describe.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    /// Make capability requests to `url` fail.
    pub fn with_failure(mut self, url: &str, kind: FetchErrorKind) -> Self {
        self.capabilities.insert(url.to_string(), Err(kind));
        self
    }

    /// Every URL requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CapabilityFetcher for StaticFetcher {
    async fn fetch_text(&self, url: &str, _timeout: Duration) -> Result<String, SourceFetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }

        let (base, query) = url.split_once('?').unwrap_or((url, ""));
        let table = if query.contains("REQUEST=DescribeFeatureType") {
            &self.describe
        } else {
            &self.capabilities
        };
        match table.get(base) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(kind)) => Err(SourceFetchError::new(url, kind.clone())),
            None => Err(SourceFetchError::new(url, FetchErrorKind::Status(404))),
        }
    }
}
