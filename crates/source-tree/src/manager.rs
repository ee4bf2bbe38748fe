//! The engine facade the embedding application talks to.

use std::collections::BTreeSet;

use ogc_capabilities::canonical_url;
use tracing::{info, warn};
use webdata_common::{SourceType, TreeNode, UniqueNamer};

use crate::collection::{NodePath, SourceCollection};
use crate::config::WebdataConfig;
use crate::error::{WebdataError, WebdataResult};
use crate::fetch::CapabilityFetcher;
use crate::host::{Host, LiveSurface, Severity};
use crate::lifecycle::{self, AddAllReport};
use crate::loader::{fetch_source, simple_source, FetchedSource};
use crate::restore::{self, RestoreReport};
use crate::state::LifecycleMap;

/// Owns the loaded sources, the lifecycle map and the unique namer.
///
/// Every operation takes the [`Host`] it works against. Operations take
/// `&mut self`, so a source load (including its fetch) never interleaves
/// with another operation on the same manager.
pub struct SourceManager<F: CapabilityFetcher> {
    config: WebdataConfig,
    fetcher: F,
    sources: SourceCollection,
    state: LifecycleMap,
    /// Persisted entries whose source failed to load during a restore.
    unrestored: LifecycleMap,
    namer: UniqueNamer,
}

impl<F: CapabilityFetcher> SourceManager<F> {
    pub fn new(config: WebdataConfig, fetcher: F) -> Self {
        Self {
            config,
            fetcher,
            sources: SourceCollection::new(),
            state: LifecycleMap::new(),
            unrestored: LifecycleMap::new(),
            namer: UniqueNamer::new(),
        }
    }

    pub fn config(&self) -> &WebdataConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn sources(&self) -> &SourceCollection {
        &self.sources
    }

    /// Names currently live, per source URL.
    pub fn state(&self) -> &LifecycleMap {
        &self.state
    }

    pub fn find(&self, url: &str, name: &str) -> Option<NodePath> {
        self.sources.find(url, name)
    }

    pub fn node(&self, path: &NodePath) -> Option<&TreeNode> {
        self.sources.get(path)
    }

    pub fn parent(&self, path: &NodePath) -> Option<&TreeNode> {
        self.sources.parent(path)
    }

    /// Load a source from a user-entered URL and insert its root.
    ///
    /// Capability-less types are created without network I/O. A URL that
    /// is already loaded is rejected before anything is fetched. Fetch and
    /// parse failures leave the collection untouched.
    pub async fn load_source(
        &mut self,
        raw_url: &str,
        source_type: SourceType,
        host: &mut Host<'_>,
    ) -> WebdataResult<NodePath> {
        if !source_type.is_ogc() {
            return self.add_simple_source(raw_url, source_type, None, host);
        }

        let url = canonical_url(source_type, raw_url);
        if self.sources.contains_url(&url) {
            return Err(report(host, WebdataError::DuplicateName(url)));
        }

        match fetch_source(&self.fetcher, &self.config, source_type, raw_url).await {
            Ok(fetched) => Ok(self.insert_fetched(&fetched, host)),
            Err(e) => Err(report(host, e)),
        }
    }

    /// Create a source without a capability document.
    ///
    /// Name (and title, unless given) come from the unique namer.
    pub fn add_simple_source(
        &mut self,
        raw_url: &str,
        source_type: SourceType,
        title: Option<String>,
        host: &mut Host<'_>,
    ) -> WebdataResult<NodePath> {
        let url = canonical_url(source_type, raw_url);
        if self.sources.contains_url(&url) {
            return Err(report(host, WebdataError::DuplicateName(url)));
        }
        let name = self.unique_name(source_type.base_name(), &*host.surface);
        let root = {
            let surface = &*host.surface;
            simple_source(source_type, raw_url, &name, title, &|n: &str| surface.has(n))
        };
        match root {
            Ok(root) => Ok(self.insert_root(root, host)),
            Err(e) => {
                self.namer.release(&name);
                Err(report(host, e))
            }
        }
    }

    pub fn add_leaf(&mut self, path: &NodePath, host: &mut Host<'_>) -> WebdataResult<()> {
        let result = match self.sources.root_mut(&path.url) {
            Some(root) => lifecycle::add_leaf(root, &path.indices, &mut *host.surface, &mut self.state),
            None => Err(unknown_source(path)),
        };
        self.finish(result, host)
    }

    pub fn remove_leaf(&mut self, path: &NodePath, host: &mut Host<'_>) -> WebdataResult<()> {
        let result = match self.sources.root_mut(&path.url) {
            Some(root) => lifecycle::remove_leaf(root, &path.indices, &mut *host.surface, &mut self.state),
            None => Err(unknown_source(path)),
        };
        self.finish(result, host)
    }

    /// Add every leaf below `path` that is not yet live.
    ///
    /// Individual failures are reported and notified but do not stop the rest.
    pub fn add_all(&mut self, path: &NodePath, host: &mut Host<'_>) -> WebdataResult<AddAllReport> {
        let Some(root) = self.sources.root_mut(&path.url) else {
            return Err(report(host, unknown_source(path)));
        };
        let outcome = lifecycle::add_all(root, &path.indices, &mut *host.surface, &mut self.state);
        for (_, e) in &outcome.failed {
            notify(host, e);
        }
        if !outcome.added.is_empty() {
            self.persist(host);
        }
        Ok(outcome)
    }

    /// Remove every live leaf below `path`. Returns the removed names.
    pub fn remove_all(&mut self, path: &NodePath, host: &mut Host<'_>) -> WebdataResult<Vec<String>> {
        let result = match self.sources.root_mut(&path.url) {
            Some(root) => lifecycle::remove_all(root, &path.indices, &mut *host.surface, &mut self.state),
            None => Err(unknown_source(path)),
        };
        self.finish(result, host)
    }

    /// Take every live leaf of the source off the map, then drop its root.
    pub fn delete_source(&mut self, url: &str, host: &mut Host<'_>) -> WebdataResult<()> {
        let path = NodePath::root(url);
        let removed = self.remove_all(&path, host)?;
        if let Some(root) = self.sources.remove(url) {
            self.namer.release(&root.name);
            self.namer.release(&root.title);
        }
        info!(url = %url, removed = removed.len(), "Deleted source");
        Ok(())
    }

    /// Bring back the layers recorded in the host's persisted state.
    ///
    /// Sources are fetched concurrently. Entries that cannot be fetched are
    /// reported and notified, and stay in the persisted state until their
    /// source is loaded again; names a source no longer offers are skipped.
    pub async fn restore(&mut self, host: &mut Host<'_>) -> RestoreReport {
        let persisted = host.store.get();
        self.unrestored = LifecycleMap::new();
        let entries = restore::entries(&persisted, &self.sources);
        let fetched = restore::fetch_all(&self.fetcher, &self.config, &entries).await;

        let mut outcome = RestoreReport::default();
        for (entry, result) in entries.iter().zip(fetched) {
            let path = match result {
                Ok(Some(fetched)) => self.insert_fetched(&fetched, host),
                Ok(None) if entry.loaded => NodePath::root(entry.url.clone()),
                Ok(None) => match self.restore_simple_source(entry.source_type, &entry.url, &entry.names, host) {
                    Ok(path) => path,
                    Err(e) => {
                        outcome.failed.push((entry.url.clone(), e));
                        continue;
                    }
                },
                Err(e) => {
                    warn!(url = %entry.url, error = %e, "Could not restore source");
                    for name in &entry.names {
                        self.unrestored.insert(&entry.url, name, entry.source_type);
                    }
                    outcome.failed.push((entry.url.clone(), e));
                    continue;
                }
            };
            if let Some(root) = self.sources.root_mut(&path.url) {
                restore::restore_names(root, &entry.names, &mut *host.surface, &mut self.state, &mut outcome);
            }
        }

        for (_, e) in &outcome.failed {
            notify(host, e);
        }
        self.persist(host);
        info!(
            restored = outcome.restored.len(),
            skipped = outcome.skipped.len(),
            failed = outcome.failed.len(),
            "Restored persisted layers"
        );
        outcome
    }

    fn restore_simple_source(
        &mut self,
        source_type: SourceType,
        url: &str,
        names: &BTreeSet<String>,
        host: &mut Host<'_>,
    ) -> WebdataResult<NodePath> {
        let Some(name) = names.iter().next() else {
            return Err(WebdataError::NodeNotFound {
                url: url.to_string(),
                name: String::new(),
            });
        };
        let root = {
            let surface = &*host.surface;
            simple_source(source_type, url, name, None, &|n: &str| surface.has(n))?
        };
        self.namer.reserve(name);
        Ok(self.insert_root(root, host))
    }

    fn unique_name(&mut self, base: &str, surface: &dyn LiveSurface) -> String {
        let sources = &self.sources;
        self.namer
            .unique_name(base, |n| sources.contains_name(n) || surface.has(n))
    }

    fn insert_fetched(&mut self, fetched: &FetchedSource, host: &mut Host<'_>) -> NodePath {
        let fallback_title = if fetched.has_title() {
            None
        } else {
            Some(self.unique_name(fetched.source_type().base_name(), &*host.surface))
        };
        let root = {
            let surface = &*host.surface;
            fetched.build(&|n: &str| surface.has(n), fallback_title)
        };
        self.insert_root(root, host)
    }

    fn insert_root(&mut self, mut root: TreeNode, host: &mut Host<'_>) -> NodePath {
        let adopted = lifecycle::adopt_live_leaves(&mut root, &mut self.state);
        let retried = self.unrestored.remove_url(&root.url).is_some();
        info!(
            url = %root.url,
            source_type = %root.source_type(),
            leaves = webdata_common::tree::leaf_paths(&root, &[]).len(),
            adopted,
            "Loaded source"
        );
        let path = self.sources.push(root);
        if adopted > 0 || retried {
            self.persist(host);
        }
        path
    }

    /// Write the lifecycle map, plus entries a restore could not bring back.
    fn persist(&self, host: &mut Host<'_>) {
        if self.unrestored.is_empty() {
            host.store.set(&self.state);
            return;
        }
        let mut map = self.unrestored.clone();
        map.merge(&self.state);
        host.store.set(&map);
    }

    fn finish<T>(&self, result: WebdataResult<T>, host: &mut Host<'_>) -> WebdataResult<T> {
        match result {
            Ok(value) => {
                self.persist(host);
                Ok(value)
            }
            Err(e) => Err(report(host, e)),
        }
    }
}

fn unknown_source(path: &NodePath) -> WebdataError {
    WebdataError::NodeNotFound {
        url: path.url.clone(),
        name: path.url.clone(),
    }
}

fn notify(host: &Host<'_>, error: &WebdataError) {
    let severity = if error.is_load_failure() {
        Severity::Error
    } else {
        Severity::Warning
    };
    host.notify(severity, error.to_string());
}

/// Surface an error to the notifier and hand it back.
fn report(host: &Host<'_>, error: WebdataError) -> WebdataError {
    notify(host, &error);
    error
}
