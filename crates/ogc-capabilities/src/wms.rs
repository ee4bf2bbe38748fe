//! WMS GetCapabilities documents (1.1.1 and 1.3.0).

use tracing::debug;
use webdata_common::extent::validate_or_world;
use webdata_common::{
    Attributions, AxisOrder, BoundingBox, CrsCode, LayerAttribution, NodeKind, OgcMetadata,
    TreeNode, WmsDetails, WmsStyle,
};

use crate::error::{CapabilityParseError, Result};
use crate::inherit::{collapse, LayerFields, RawWmsLayer};
use crate::ows::{keywords, ServiceMetadata};
use crate::xml::XmlElement;
use crate::SourceContext;

/// GetFeatureInfo formats the feature-info consumer understands, best first.
pub const SUPPORTED_FEATURE_INFO_TYPES: [&str; 6] = [
    "application/json",
    "application/geojson",
    "application/geo+json",
    "application/vnd.geo+json",
    "application/vnd.ogc.gml",
    "text/xml",
];

/// GetMap formats offered to renderers.
const MAP_FORMATS: [&str; 2] = ["image/png", "image/jpeg"];

#[derive(Debug, Clone, PartialEq)]
pub struct WmsCapabilities {
    pub version: String,
    pub service: ServiceMetadata,
    pub get_map_formats: Vec<String>,
    pub feature_info_formats: Vec<String>,
    /// The single top-level `Capability/Layer`.
    pub layer: RawWmsLayer,
}

impl WmsCapabilities {
    pub fn parse(xml: &str) -> Result<Self> {
        let root = XmlElement::parse(xml)?;
        if root.name != "WMS_Capabilities" && root.name != "WMT_MS_Capabilities" {
            return Err(CapabilityParseError::UnexpectedRoot {
                expected: "WMS_Capabilities",
                found: root.name,
            });
        }

        let version = root.attr("version").unwrap_or("1.3.0").to_string();
        let service = root
            .child("Service")
            .ok_or(CapabilityParseError::MissingSection("Service"))?;
        let capability = root
            .child("Capability")
            .ok_or(CapabilityParseError::MissingSection("Capability"))?;
        let top = capability
            .child("Layer")
            .ok_or(CapabilityParseError::MissingSection("Capability/Layer"))?;

        let formats = |request: &str| -> Vec<String> {
            capability
                .find(&["Request", request])
                .map(|r| {
                    r.children_named("Format")
                        .filter_map(|f| f.text())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default()
        };

        Ok(Self {
            service: ServiceMetadata::from_service(service),
            get_map_formats: formats("GetMap"),
            feature_info_formats: formats("GetFeatureInfo"),
            layer: read_layer(top, &version),
            version,
        })
    }

    /// PNG and JPEG GetMap formats, in document order.
    pub fn map_formats(&self) -> Vec<String> {
        self.get_map_formats
            .iter()
            .filter(|f| MAP_FORMATS.contains(&f.as_str()))
            .cloned()
            .collect()
    }

    /// The first supported feature-info type the server advertises.
    pub fn feature_info_response_type(&self) -> Option<String> {
        SUPPORTED_FEATURE_INFO_TYPES
            .iter()
            .find(|t| self.feature_info_formats.iter().any(|f| f == *t))
            .map(|t| t.to_string())
    }

    /// Build the source tree rooted at `ctx.url`.
    ///
    /// The root's children are the top-level layer's children, or the
    /// top-level layer itself when it has none. Collapsing starts below the
    /// top-level layer. Actions are derived for every node before returning.
    pub fn build_tree(&self, ctx: &SourceContext<'_>) -> TreeNode {
        let builder = TreeBuilder {
            ctx,
            formats: self.map_formats(),
            feature_info_response_type: self.feature_info_response_type(),
            attributions: self.service.attributions(),
        };

        let top = &self.layer;
        let children = if top.layers.is_empty() {
            vec![builder.node(top.fields.clone(), &[], format!("{}-0", ctx.url))]
        } else {
            top.layers
                .iter()
                .enumerate()
                .map(|(index, layer)| builder.layer(layer, &top.fields, ctx.url, index))
                .collect()
        };

        let details = WmsDetails {
            meta: self.service.to_root_metadata(ctx.optional_parameters),
            formats: builder.formats.clone(),
            feature_info_response_type: builder.feature_info_response_type.clone(),
            ..WmsDetails::default()
        };
        let title = self.service.title.clone().or_else(|| ctx.fallback_title.clone());

        TreeNode::new(ctx.url, title, ctx.url, NodeKind::Wms(details))
            .with_children(children)
            .into_root()
    }
}

struct TreeBuilder<'a, 'c> {
    ctx: &'a SourceContext<'c>,
    formats: Vec<String>,
    feature_info_response_type: Option<String>,
    attributions: Attributions,
}

impl TreeBuilder<'_, '_> {
    fn layer(
        &self,
        layer: &RawWmsLayer,
        inherited: &LayerFields,
        parent_name: &str,
        index: usize,
    ) -> TreeNode {
        let collapsed = collapse(layer);
        if collapsed.merged > 0 {
            debug!(
                layer = ?collapsed.fields.name,
                merged = collapsed.merged,
                "Collapsed nested WMS layers"
            );
        }

        let mut fields = collapsed.fields;
        fields.inherit_from(inherited);
        self.node(fields, collapsed.children, format!("{}-{}", parent_name, index))
    }

    fn node(&self, fields: LayerFields, children: &[RawWmsLayer], fallback_name: String) -> TreeNode {
        let name = fields
            .name
            .clone()
            .or_else(|| fields.title.clone())
            .unwrap_or(fallback_name);

        let children: Vec<TreeNode> = children
            .iter()
            .enumerate()
            .map(|(index, child)| self.layer(child, &fields, &name, index))
            .collect();

        let details = WmsDetails {
            meta: OgcMetadata {
                optional_parameters: self.ctx.optional_parameters.clone(),
                description: fields.abstract_text,
                extent: Some(validate_or_world(fields.bbox)),
                keyword_list: fields.keywords,
                attributions: self.attributions.clone(),
                ..OgcMetadata::default()
            },
            queryable: fields.queryable.unwrap_or(false),
            supports_transparency: !fields.opaque.unwrap_or(false),
            attribution: fields.attribution,
            styles: fields.styles,
            formats: self.formats.clone(),
            feature_info_response_type: self.feature_info_response_type.clone(),
        };

        let mut node = TreeNode::new(name, fields.title, self.ctx.url, NodeKind::Wms(details));
        node.children = children;
        if node.children.is_empty() {
            node.is_added_to_map = (self.ctx.is_live)(&node.name);
        }
        node
    }
}

fn read_layer(element: &XmlElement, version: &str) -> RawWmsLayer {
    let attribution = element.child("Attribution").map(|a| LayerAttribution {
        title: a.child_text("Title"),
        online_resource: a.child("OnlineResource").and_then(|o| o.href()),
    });

    let styles = element
        .children_named("Style")
        .filter_map(|s| {
            Some(WmsStyle {
                name: s.child_text("Name")?,
                title: s.child_text("Title"),
                abstract_text: s.child_text("Abstract"),
                legend_url: s
                    .find(&["LegendURL", "OnlineResource"])
                    .and_then(|o| o.href()),
            })
        })
        .collect();

    let fields = LayerFields {
        name: element.child_text("Name"),
        title: element.child_text("Title"),
        abstract_text: element.child_text("Abstract"),
        keywords: keywords(element),
        queryable: element.bool_attr("queryable"),
        opaque: element.bool_attr("opaque"),
        bbox: layer_bbox(element, version),
        attribution,
        styles,
    };

    let layers = element
        .children_named("Layer")
        .map(|l| read_layer(l, version))
        .collect();

    RawWmsLayer::new(fields, layers)
}

/// The geographic bounding box declared on a layer element, if any.
///
/// Tries `EX_GeographicBoundingBox` (1.3.0), `LatLonBoundingBox` (1.1.1) and
/// finally a `BoundingBox` in a geographic CRS.
fn layer_bbox(element: &XmlElement, version: &str) -> Option<BoundingBox> {
    if let Some(ex) = element.child("EX_GeographicBoundingBox") {
        let value = |name: &str| ex.child_text(name).and_then(|v| v.trim().parse::<f64>().ok());
        if let (Some(west), Some(south), Some(east), Some(north)) = (
            value("westBoundLongitude"),
            value("southBoundLatitude"),
            value("eastBoundLongitude"),
            value("northBoundLatitude"),
        ) {
            return Some(BoundingBox::new(west, south, east, north));
        }
    }

    if let Some(bbox) = element.child("LatLonBoundingBox").and_then(attribute_bbox) {
        return Some(bbox);
    }

    element.children_named("BoundingBox").find_map(|b| {
        let crs = b.attr("CRS").or_else(|| b.attr("SRS"))?;
        let crs = CrsCode::from_identifier(crs).ok().filter(|c| c.is_geographic())?;
        let bbox = attribute_bbox(b)?;
        let order = if version.starts_with("1.3") {
            crs.axis_order_wms_1_3()
        } else {
            crs.axis_order_wms_1_1()
        };
        Some(match order {
            AxisOrder::XY => bbox,
            AxisOrder::LatLon => BoundingBox::new(bbox.min_y, bbox.min_x, bbox.max_y, bbox.max_x),
        })
    })
}

pub(crate) fn attribute_bbox(element: &XmlElement) -> Option<BoundingBox> {
    Some(BoundingBox::new(
        element.f64_attr("minx")?,
        element.f64_attr("miny")?,
        element.f64_attr("maxx")?,
        element.f64_attr("maxy")?,
    ))
}
