//! OGC capability document parsing.
//!
//! Supports:
//! - WMS 1.1.1 and 1.3.0 GetCapabilities, with nested layer collapsing
//! - WFS 1.0.0, 1.1.0 and 2.0.x GetCapabilities plus DescribeFeatureType
//! - WMTS 1.0.0 GetCapabilities (KVP and RESTful `ResourceURL` templates)
//!
//! Parsing is split from tree building: `*Capabilities::parse` turns the raw
//! document into typed capabilities, `build_tree` turns those into a
//! [`webdata_common::TreeNode`] with actions already derived.

use std::collections::BTreeMap;

pub mod error;
pub mod inherit;
pub mod ows;
pub mod params;
pub mod wfs;
pub mod wms;
pub mod wmts;
pub mod xml;

pub use error::{CapabilityParseError, Result};
pub use inherit::{collapse, is_child_different, CollapsedLayer, LayerFields, RawWmsLayer};
pub use ows::ServiceMetadata;
pub use params::{append_query_params, canonical_url, describe_feature_type_url, CapabilityRequest};
pub use wfs::{parse_target_namespace, WfsCapabilities, WfsFeatureType};
pub use wms::{WmsCapabilities, SUPPORTED_FEATURE_INFO_TYPES};
pub use wmts::{select_default_tile_matrix_set, TileMatrixSet, WmtsCapabilities, WmtsLayer};
pub use xml::XmlElement;

/// What a tree builder needs to know about the source being loaded.
pub struct SourceContext<'a> {
    /// Canonical source URL; becomes the root's name and every node's `url`.
    pub url: &'a str,
    /// Query parameters to re-apply on operational requests.
    pub optional_parameters: &'a BTreeMap<String, String>,
    /// Whether a layer of that name is already live. Leaves for which this
    /// holds are created with `is_added_to_map` set.
    pub is_live: &'a dyn Fn(&str) -> bool,
    /// Root title used when the document has none.
    pub fallback_title: Option<String>,
}
