//! WMTS 1.0.0 GetCapabilities documents.

use tracing::debug;
use webdata_common::extent::validate_or_world;
use webdata_common::{BoundingBox, NodeKind, OgcMetadata, TreeNode, WmtsDetails, WmtsStyle};

use crate::error::{CapabilityParseError, Result};
use crate::ows::{keywords, AddressField, ServiceMetadata};
use crate::xml::XmlElement;
use crate::SourceContext;

/// A `Contents/TileMatrixSet`, reduced to what default selection needs.
#[derive(Debug, Clone, PartialEq)]
pub struct TileMatrixSet {
    pub identifier: String,
    pub supported_crs: String,
    /// Number of `TileMatrix` levels.
    pub matrix_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WmtsLayer {
    pub identifier: String,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub keywords: Vec<String>,
    pub formats: Vec<String>,
    pub bbox: Option<BoundingBox>,
    pub styles: Vec<WmtsStyle>,
    pub matrix_set_ids: Vec<String>,
    /// `ResourceURL` template with `resourceType="tile"`.
    pub tile_template: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WmtsCapabilities {
    pub version: String,
    pub service: ServiceMetadata,
    pub layers: Vec<WmtsLayer>,
    pub tile_matrix_sets: Vec<TileMatrixSet>,
}

impl WmtsCapabilities {
    pub fn parse(xml: &str) -> Result<Self> {
        let root = XmlElement::parse(xml)?;
        if root.name != "Capabilities" {
            return Err(CapabilityParseError::UnexpectedRoot {
                expected: "Capabilities",
                found: root.name,
            });
        }

        let contents = root
            .child("Contents")
            .ok_or(CapabilityParseError::MissingSection("Contents"))?;

        let tile_matrix_sets: Vec<TileMatrixSet> = contents
            .children_named("TileMatrixSet")
            .filter_map(|set| {
                Some(TileMatrixSet {
                    identifier: set.child_text("Identifier")?,
                    supported_crs: set.child_text("SupportedCRS").unwrap_or_default(),
                    matrix_count: set.children_named("TileMatrix").count(),
                })
            })
            .collect();
        if tile_matrix_sets.is_empty() {
            return Err(CapabilityParseError::MissingSection("Contents/TileMatrixSet"));
        }

        let layers = contents
            .children_named("Layer")
            .filter_map(read_layer)
            .collect();

        Ok(Self {
            version: root.attr("version").unwrap_or("1.0.0").to_string(),
            service: ServiceMetadata::from_ows(&root, AddressField::DeliveryPoint),
            layers,
            tile_matrix_sets,
        })
    }

    /// The tile matrix set used by default for every layer of the source.
    pub fn default_tile_matrix_set(&self) -> Option<&TileMatrixSet> {
        select_default_tile_matrix_set(&self.tile_matrix_sets)
    }

    /// Build the source tree rooted at `ctx.url`, one leaf per layer.
    pub fn build_tree(&self, ctx: &SourceContext<'_>) -> TreeNode {
        let default_id = self
            .default_tile_matrix_set()
            .map(|set| set.identifier.clone())
            .unwrap_or_default();
        debug!(url = %ctx.url, tile_matrix_set = %default_id, "Selected default tile matrix set");

        let attributions = self.service.attributions();
        let children = self
            .layers
            .iter()
            .map(|layer| {
                let details = WmtsDetails {
                    meta: OgcMetadata {
                        optional_parameters: ctx.optional_parameters.clone(),
                        description: layer.abstract_text.clone(),
                        extent: Some(validate_or_world(layer.bbox)),
                        keyword_list: layer.keywords.clone(),
                        attributions: attributions.clone(),
                        ..OgcMetadata::default()
                    },
                    operational_url: layer
                        .tile_template
                        .clone()
                        .unwrap_or_else(|| ctx.url.to_string()),
                    formats: layer.formats.clone(),
                    styles: layer.styles.clone(),
                    default_tile_matrix_set_id: default_id.clone(),
                    matrix_set_ids: layer.matrix_set_ids.clone(),
                };
                let mut node = TreeNode::new(
                    layer.identifier.as_str(),
                    layer.title.clone(),
                    ctx.url,
                    NodeKind::Wmts(details),
                );
                node.is_added_to_map = (ctx.is_live)(&node.name);
                node
            })
            .collect();

        let details = WmtsDetails {
            meta: self.service.to_root_metadata(ctx.optional_parameters),
            operational_url: ctx.url.to_string(),
            default_tile_matrix_set_id: default_id,
            ..WmtsDetails::default()
        };
        let title = self.service.title.clone().or_else(|| ctx.fallback_title.clone());

        TreeNode::new(ctx.url, title, ctx.url, NodeKind::Wmts(details))
            .with_children(children)
            .into_root()
    }
}

/// Prefer a Web Mercator set (`SupportedCRS` containing "3857") with the most
/// matrix levels, the first declared one on ties; otherwise the first set.
pub fn select_default_tile_matrix_set(sets: &[TileMatrixSet]) -> Option<&TileMatrixSet> {
    let mut best: Option<&TileMatrixSet> = None;
    for set in sets.iter().filter(|s| s.supported_crs.contains("3857")) {
        if best.map_or(true, |b| set.matrix_count > b.matrix_count) {
            best = Some(set);
        }
    }
    best.or_else(|| sets.first())
}

fn read_layer(element: &XmlElement) -> Option<WmtsLayer> {
    let identifier = element.child_text("Identifier")?;

    let bbox = element.child("WGS84BoundingBox").and_then(|b| {
        let lower = b.child_text("LowerCorner")?;
        let upper = b.child_text("UpperCorner")?;
        BoundingBox::from_corners(&lower, &upper).ok()
    });

    let styles = element
        .children_named("Style")
        .filter_map(|s| {
            Some(WmtsStyle {
                name: s.child_text("Identifier")?,
                title: s.child_text("Title"),
                legend_url: s.child("LegendURL").and_then(|l| l.href()),
                is_default: s.bool_attr("isDefault").unwrap_or(false),
            })
        })
        .collect();

    let tile_template = element
        .children_named("ResourceURL")
        .find(|r| r.attr("resourceType") == Some("tile"))
        .and_then(|r| r.attr("template"))
        .map(str::to_string);

    Some(WmtsLayer {
        identifier,
        title: element.child_text("Title"),
        abstract_text: element.child_text("Abstract"),
        keywords: keywords(element),
        formats: element
            .children_named("Format")
            .filter_map(|f| f.text())
            .map(str::to_string)
            .collect(),
        bbox,
        styles,
        matrix_set_ids: element
            .children_named("TileMatrixSetLink")
            .filter_map(|l| l.child_text("TileMatrixSet"))
            .collect(),
        tile_template,
    })
}
