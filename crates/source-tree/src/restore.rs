//! Re-creating a previous session's layers from a persisted lifecycle map.
//!
//! Sources are re-fetched concurrently; each fetched source is then built
//! and its persisted names re-added one source at a time, so no tree is
//! observable half-restored.

use std::collections::BTreeSet;

use futures::future::join_all;
use tracing::warn;
use webdata_common::tree::{find_path_by_name, node_at};
use webdata_common::{SourceType, TreeNode};

use crate::collection::SourceCollection;
use crate::config::WebdataConfig;
use crate::error::{WebdataError, WebdataResult};
use crate::fetch::CapabilityFetcher;
use crate::host::LiveSurface;
use crate::lifecycle;
use crate::loader::{fetch_source, FetchedSource};
use crate::state::LifecycleMap;

/// Outcome of a restore.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreReport {
    /// Names live again after the restore.
    pub restored: Vec<String>,
    /// Persisted names the freshly loaded source no longer offers.
    pub skipped: Vec<String>,
    /// Failures, keyed by source URL (fetch and parse) or layer name (add).
    pub failed: Vec<(String, WebdataError)>,
}

impl RestoreReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }
}

/// One persisted source to bring back.
#[derive(Debug, Clone)]
pub(crate) struct RestoreEntry {
    pub url: String,
    pub source_type: SourceType,
    pub names: BTreeSet<String>,
    /// A root for `url` is already loaded; nothing needs fetching.
    pub loaded: bool,
}

impl RestoreEntry {
    fn needs_fetch(&self) -> bool {
        self.source_type.is_ogc() && !self.loaded
    }
}

pub(crate) fn entries(persisted: &LifecycleMap, sources: &SourceCollection) -> Vec<RestoreEntry> {
    persisted
        .iter()
        .map(|(url, entry)| RestoreEntry {
            url: url.clone(),
            source_type: entry.source_type,
            names: entry.names.clone(),
            loaded: sources.contains_url(url),
        })
        .collect()
}

/// Fetch every entry that needs it, concurrently.
///
/// The result is index-aligned with `entries`; `Ok(None)` marks entries
/// that need no fetch.
pub(crate) async fn fetch_all(
    fetcher: &dyn CapabilityFetcher,
    config: &WebdataConfig,
    entries: &[RestoreEntry],
) -> Vec<WebdataResult<Option<FetchedSource>>> {
    let requests = entries.iter().map(|entry| async move {
        if !entry.needs_fetch() {
            return Ok(None);
        }
        fetch_source(fetcher, config, entry.source_type, &entry.url)
            .await
            .map(Some)
    });
    join_all(requests).await
}

/// Re-add the persisted `names` found below `root`.
pub(crate) fn restore_names(
    root: &mut TreeNode,
    names: &BTreeSet<String>,
    surface: &mut dyn LiveSurface,
    state: &mut LifecycleMap,
    report: &mut RestoreReport,
) {
    for name in names {
        let Some(path) = find_path_by_name(root, name) else {
            warn!(url = %root.url, name = %name, "Persisted layer no longer offered by source");
            report.skipped.push(name.clone());
            continue;
        };
        if node_at(root, &path).map_or(false, |n| n.is_added_to_map) {
            report.restored.push(name.clone());
            continue;
        }
        match lifecycle::add_leaf(root, &path, surface, state) {
            Ok(()) => report.restored.push(name.clone()),
            Err(e) => report.failed.push((name.clone(), e)),
        }
    }
}
