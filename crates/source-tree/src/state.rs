//! The persisted lifecycle map: source URL to the names currently on the map.
//!
//! Serialized as
//! `{"<url>": {"layerNames": ["a", "b"], "type": "wms"}, ...}`.
//! An entry exists only while at least one of its names is live; removing
//! the last name removes the entry.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use webdata_common::SourceType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleEntry {
    #[serde(rename = "layerNames")]
    pub names: BTreeSet<String>,
    #[serde(rename = "type")]
    pub source_type: SourceType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LifecycleMap {
    entries: BTreeMap<String, LifecycleEntry>,
}

impl LifecycleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` as live for `url`, creating the entry if needed.
    ///
    /// Returns `false` if the name was already recorded.
    pub fn insert(&mut self, url: &str, name: &str, source_type: SourceType) -> bool {
        self.entries
            .entry(url.to_string())
            .or_insert_with(|| LifecycleEntry {
                names: BTreeSet::new(),
                source_type,
            })
            .names
            .insert(name.to_string())
    }

    /// Forget `name` for `url`, dropping the entry once it is empty.
    ///
    /// Returns `false` if the name was not recorded.
    pub fn remove(&mut self, url: &str, name: &str) -> bool {
        let Some(entry) = self.entries.get_mut(url) else {
            return false;
        };
        let removed = entry.names.remove(name);
        if entry.names.is_empty() {
            self.entries.remove(url);
        }
        removed
    }

    pub fn get(&self, url: &str) -> Option<&LifecycleEntry> {
        self.entries.get(url)
    }

    pub fn contains(&self, url: &str, name: &str) -> bool {
        self.entries
            .get(url)
            .map_or(false, |e| e.names.contains(name))
    }

    /// URL of the source that recorded `name` live, if any.
    pub fn owner(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, e)| e.names.contains(name))
            .map(|(url, _)| url.as_str())
    }

    /// Record every name of `other` as well.
    pub fn merge(&mut self, other: &LifecycleMap) {
        for (url, entry) in other.iter() {
            for name in &entry.names {
                self.insert(url, name, entry.source_type);
            }
        }
    }

    /// Drop the entry for `url`, returning it.
    pub fn remove_url(&mut self, url: &str) -> Option<LifecycleEntry> {
        self.entries.remove(url)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LifecycleEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/wms";

    #[test]
    fn test_insert_creates_entry() {
        let mut map = LifecycleMap::new();
        assert!(map.insert(URL, "roads", SourceType::Wms));
        assert!(!map.insert(URL, "roads", SourceType::Wms));
        assert!(map.insert(URL, "rivers", SourceType::Wms));

        let entry = map.get(URL).unwrap();
        assert_eq!(entry.names.len(), 2);
        assert_eq!(entry.source_type, SourceType::Wms);
    }

    #[test]
    fn test_remove_last_name_drops_entry() {
        let mut map = LifecycleMap::new();
        map.insert(URL, "roads", SourceType::Wms);
        map.insert(URL, "rivers", SourceType::Wms);

        assert!(map.remove(URL, "roads"));
        assert!(map.get(URL).is_some());
        assert!(map.remove(URL, "rivers"));
        assert!(map.get(URL).is_none());
        assert!(map.is_empty());
        assert!(!map.remove(URL, "rivers"));
    }

    #[test]
    fn test_remove_unknown_name_keeps_entry() {
        let mut map = LifecycleMap::new();
        map.insert(URL, "roads", SourceType::Wms);
        assert!(!map.remove(URL, "lakes"));
        assert!(map.contains(URL, "roads"));
    }

    #[test]
    fn test_owner_and_merge() {
        let mut map = LifecycleMap::new();
        map.insert(URL, "roads", SourceType::Wms);
        assert_eq!(map.owner("roads"), Some(URL));
        assert_eq!(map.owner("rivers"), None);

        let mut other = LifecycleMap::new();
        other.insert("https://example.com/wfs", "stops", SourceType::Wfs);
        other.insert(URL, "rivers", SourceType::Wms);
        map.merge(&other);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(URL).unwrap().names.len(), 2);
        assert_eq!(map.owner("stops"), Some("https://example.com/wfs"));
        assert!(map.remove_url(URL).is_some());
        assert_eq!(map.owner("roads"), None);
    }

    #[test]
    fn test_json_shape() {
        let mut map = LifecycleMap::new();
        map.insert(URL, "roads", SourceType::Wms);
        let json: serde_json::Value = serde_json::from_str(&map.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ URL: { "layerNames": ["roads"], "type": "wms" } })
        );

        let back = LifecycleMap::from_json(&map.to_json().unwrap()).unwrap();
        assert_eq!(back, map);
    }
}
