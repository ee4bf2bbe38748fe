//! Source tree nodes and their protocol-specific details.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::actions::{self, Action};
use crate::Extent;

/// The kind of source a node was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Tileset,
    PointCloud,
    Terrain,
    Czml,
    GeoJson,
    Wfs,
    Wms,
    Wmts,
    Feature,
}

impl SourceType {
    pub const ALL: [SourceType; 9] = [
        SourceType::Tileset,
        SourceType::PointCloud,
        SourceType::Terrain,
        SourceType::Czml,
        SourceType::GeoJson,
        SourceType::Wfs,
        SourceType::Wms,
        SourceType::Wmts,
        SourceType::Feature,
    ];

    /// Whether the source is described by an OGC capability document.
    pub fn is_ogc(&self) -> bool {
        matches!(self, SourceType::Wfs | SourceType::Wms | SourceType::Wmts)
    }

    /// OGC `SERVICE` parameter value, for capability-backed sources.
    pub fn service(&self) -> Option<&'static str> {
        match self {
            SourceType::Wfs => Some("WFS"),
            SourceType::Wms => Some("WMS"),
            SourceType::Wmts => Some("WMTS"),
            _ => None,
        }
    }

    /// Base used when generating a unique name for a source of this type.
    pub fn base_name(&self) -> &'static str {
        match self {
            SourceType::Tileset => "Cesium3DTileset",
            SourceType::PointCloud => "PointCloudLayer",
            SourceType::Terrain => "TerrainLayer",
            SourceType::Czml => "CzmlLayer",
            SourceType::GeoJson => "GeoJSONLayer",
            SourceType::Wfs => "WFSLayer",
            SourceType::Wms => "WMSLayer",
            SourceType::Wmts => "WMTSLayer",
            SourceType::Feature => "FeatureLayer",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceType::Tileset => "tileset",
            SourceType::PointCloud => "pointcloud",
            SourceType::Terrain => "terrain",
            SourceType::Czml => "czml",
            SourceType::GeoJson => "geojson",
            SourceType::Wfs => "wfs",
            SourceType::Wms => "wms",
            SourceType::Wmts => "wmts",
            SourceType::Feature => "feature",
        };
        write!(f, "{}", s)
    }
}

/// Attribution shown alongside a rendered layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attributions {
    pub url: Option<String>,
    pub provider: Option<String>,
}

/// Service contact block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Contact {
    pub address: Option<String>,
    /// Postcode and city, joined by a single space when both are present.
    pub city: Option<String>,
    pub country: Option<String>,
    pub person: Option<String>,
    pub position: Option<String>,
    pub organization: Option<String>,
}

impl Contact {
    /// Join a postcode and a city the way addresses are displayed.
    pub fn join_city(postcode: Option<&str>, city: Option<&str>) -> Option<String> {
        match (postcode, city) {
            (Some(p), Some(c)) => Some(format!("{} {}", p, c)),
            (Some(p), None) => Some(p.to_string()),
            (None, Some(c)) => Some(c.to_string()),
            (None, None) => None,
        }
    }
}

/// Metadata shared by every WMS, WFS and WMTS node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OgcMetadata {
    /// Query parameters of the user-entered URL, re-applied to operational requests.
    pub optional_parameters: BTreeMap<String, String>,
    pub access_constraints: Option<String>,
    pub description: Option<String>,
    pub extent: Option<Extent>,
    pub fees: Option<String>,
    pub keyword_list: Vec<String>,
    pub online_resource: Option<String>,
    pub attributions: Attributions,
    pub contact: Option<Contact>,
}

/// Attribution declared on a WMS layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayerAttribution {
    pub title: Option<String>,
    pub online_resource: Option<String>,
}

/// A style declared on a WMS layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WmsStyle {
    pub name: String,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub legend_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WmsDetails {
    #[serde(flatten)]
    pub meta: OgcMetadata,
    pub queryable: bool,
    pub supports_transparency: bool,
    pub attribution: Option<LayerAttribution>,
    pub styles: Vec<WmsStyle>,
    /// GetMap formats, restricted to PNG and JPEG.
    pub formats: Vec<String>,
    pub feature_info_response_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WfsDetails {
    #[serde(flatten)]
    pub meta: OgcMetadata,
    /// Target namespace resolved through `DescribeFeatureType`, if any.
    pub namespace: Option<String>,
}

/// A style declared on a WMTS layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WmtsStyle {
    pub name: String,
    pub title: Option<String>,
    pub legend_url: Option<String>,
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WmtsDetails {
    #[serde(flatten)]
    pub meta: OgcMetadata,
    /// Tile template advertised through `ResourceURL`, or the capability URL.
    pub operational_url: String,
    pub formats: Vec<String>,
    pub styles: Vec<WmtsStyle>,
    pub default_tile_matrix_set_id: String,
    pub matrix_set_ids: Vec<String>,
}

/// Protocol-specific payload of a node, tagged by source type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    Tileset,
    PointCloud,
    Terrain,
    Czml,
    GeoJson,
    Feature,
    Wfs(WfsDetails),
    Wms(WmsDetails),
    Wmts(WmtsDetails),
}

impl NodeKind {
    /// Payload-free kind for a source type; OGC types get default details.
    pub fn plain(source_type: SourceType) -> Self {
        match source_type {
            SourceType::Tileset => NodeKind::Tileset,
            SourceType::PointCloud => NodeKind::PointCloud,
            SourceType::Terrain => NodeKind::Terrain,
            SourceType::Czml => NodeKind::Czml,
            SourceType::GeoJson => NodeKind::GeoJson,
            SourceType::Feature => NodeKind::Feature,
            SourceType::Wfs => NodeKind::Wfs(WfsDetails::default()),
            SourceType::Wms => NodeKind::Wms(WmsDetails::default()),
            SourceType::Wmts => NodeKind::Wmts(WmtsDetails::default()),
        }
    }

    pub fn source_type(&self) -> SourceType {
        match self {
            NodeKind::Tileset => SourceType::Tileset,
            NodeKind::PointCloud => SourceType::PointCloud,
            NodeKind::Terrain => SourceType::Terrain,
            NodeKind::Czml => SourceType::Czml,
            NodeKind::GeoJson => SourceType::GeoJson,
            NodeKind::Feature => SourceType::Feature,
            NodeKind::Wfs(_) => SourceType::Wfs,
            NodeKind::Wms(_) => SourceType::Wms,
            NodeKind::Wmts(_) => SourceType::Wmts,
        }
    }

    pub fn metadata(&self) -> Option<&OgcMetadata> {
        match self {
            NodeKind::Wfs(d) => Some(&d.meta),
            NodeKind::Wms(d) => Some(&d.meta),
            NodeKind::Wmts(d) => Some(&d.meta),
            _ => None,
        }
    }
}

/// One node of a source tree.
///
/// Roots are created by loading a source; their subtree comes from the same
/// parse. `actions` is derived from `is_added_to_map`, the children's state
/// and `is_root_element`, and is only ever written by [`actions::refresh`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub name: String,
    pub title: String,
    /// Canonical source URL (capability URL without query for OGC sources).
    pub url: String,
    pub children: Vec<TreeNode>,
    pub is_root_element: bool,
    pub is_added_to_map: bool,
    pub(crate) actions: Vec<Action>,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl TreeNode {
    /// Create a childless, non-root node. The title defaults to the name.
    pub fn new(
        name: impl Into<String>,
        title: Option<String>,
        url: impl Into<String>,
        kind: NodeKind,
    ) -> Self {
        let name = name.into();
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| name.clone());
        let mut node = Self {
            name,
            title,
            url: url.into(),
            children: Vec::new(),
            is_root_element: false,
            is_added_to_map: false,
            actions: Vec::new(),
            kind,
        };
        actions::refresh(&mut node);
        node
    }

    /// Attach children and re-derive actions for the whole subtree.
    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        actions::refresh_subtree(&mut self);
        self
    }

    /// Mark this node as the root of a loaded source.
    pub fn into_root(mut self) -> Self {
        self.is_root_element = true;
        actions::refresh(&mut self);
        self
    }

    pub fn source_type(&self) -> SourceType {
        self.kind.source_type()
    }

    /// The currently exposed operations.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn extent(&self) -> Option<&Extent> {
        self.kind.metadata().and_then(|m| m.extent.as_ref())
    }
}
