//! What the live surface needs to materialize a leaf.

use ogc_capabilities::append_query_params;
use serde::Serialize;
use webdata_common::{Attributions, Extent, NodeKind, SourceType, TreeNode};

const WMTS_TILE_SIZE: (u32, u32) = (256, 256);

/// A layer description handed to [`crate::LiveSurface::add`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Renderable {
    pub name: String,
    pub title: String,
    pub source_type: SourceType,
    /// Operational URL with the source's optional parameters applied.
    pub url: String,
    pub extent: Option<Extent>,
    pub attributions: Attributions,
    pub options: RenderableOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderableOptions {
    /// Capability-less sources: the URL is all there is.
    Plain,
    #[serde(rename_all = "camelCase")]
    Wms {
        layers: String,
        format: Option<String>,
        style: String,
        legend_url: Option<String>,
        /// Set for queryable layers only.
        feature_info_response_type: Option<String>,
        transparent: bool,
    },
    #[serde(rename_all = "camelCase")]
    Wfs {
        feature_prefix: String,
        feature_type: String,
        feature_namespace: String,
    },
    #[serde(rename_all = "camelCase")]
    Wmts {
        layer: String,
        tile_matrix_set_id: String,
        matrix_set_ids: Vec<String>,
        format: Option<String>,
        style: Option<String>,
        tile_size: (u32, u32),
    },
}

impl Renderable {
    pub fn from_node(node: &TreeNode) -> Self {
        let (url, options) = match &node.kind {
            NodeKind::Wms(details) => {
                let format = details
                    .formats
                    .iter()
                    .find(|f| f.as_str() == "image/png")
                    .or_else(|| details.formats.first())
                    .cloned();
                let style = details.styles.first();
                let options = RenderableOptions::Wms {
                    layers: node.name.clone(),
                    format,
                    style: style.map(|s| s.name.clone()).unwrap_or_default(),
                    legend_url: style.and_then(|s| s.legend_url.clone()),
                    feature_info_response_type: details
                        .feature_info_response_type
                        .clone()
                        .filter(|_| details.queryable),
                    transparent: details.supports_transparency,
                };
                (
                    append_query_params(&node.url, &details.meta.optional_parameters),
                    options,
                )
            }
            NodeKind::Wfs(details) => {
                let (prefix, feature_type) = node
                    .name
                    .split_once(':')
                    .unwrap_or(("", node.name.as_str()));
                let options = RenderableOptions::Wfs {
                    feature_prefix: prefix.to_string(),
                    feature_type: feature_type.to_string(),
                    feature_namespace: details.namespace.clone().unwrap_or_default(),
                };
                (
                    append_query_params(&node.url, &details.meta.optional_parameters),
                    options,
                )
            }
            NodeKind::Wmts(details) => {
                let style = details
                    .styles
                    .iter()
                    .find(|s| s.is_default)
                    .or_else(|| details.styles.first())
                    .map(|s| s.name.clone());
                let options = RenderableOptions::Wmts {
                    layer: node.name.clone(),
                    tile_matrix_set_id: details.default_tile_matrix_set_id.clone(),
                    matrix_set_ids: details.matrix_set_ids.clone(),
                    format: details.formats.first().cloned(),
                    style,
                    tile_size: WMTS_TILE_SIZE,
                };
                (
                    append_query_params(&details.operational_url, &details.meta.optional_parameters),
                    options,
                )
            }
            _ => (node.url.clone(), RenderableOptions::Plain),
        };

        Self {
            name: node.name.clone(),
            title: node.title.clone(),
            source_type: node.source_type(),
            url,
            extent: node.extent().copied(),
            attributions: node
                .kind
                .metadata()
                .map(|m| m.attributions.clone())
                .unwrap_or_default(),
            options,
        }
    }
}
