//! WFS GetCapabilities (1.0.0, 1.1.0, 2.0.x) and DescribeFeatureType documents.

use webdata_common::extent::validate_or_world;
use webdata_common::{Attributions, BoundingBox, NodeKind, OgcMetadata, TreeNode, WfsDetails};

use crate::error::{CapabilityParseError, Result};
use crate::ows::{keywords, AddressField, ServiceMetadata};
use crate::wms::attribute_bbox;
use crate::xml::XmlElement;
use crate::SourceContext;

/// One `FeatureType` entry of the `FeatureTypeList`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WfsFeatureType {
    /// Qualified name, e.g. `topp:states`.
    pub name: String,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub keywords: Vec<String>,
    pub metadata_url: Option<String>,
    pub bbox: Option<BoundingBox>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WfsCapabilities {
    pub version: String,
    pub service: ServiceMetadata,
    pub feature_types: Vec<WfsFeatureType>,
}

impl WfsCapabilities {
    pub fn parse(xml: &str) -> Result<Self> {
        let root = XmlElement::parse(xml)?;
        if root.name != "WFS_Capabilities" {
            return Err(CapabilityParseError::UnexpectedRoot {
                expected: "WFS_Capabilities",
                found: root.name,
            });
        }

        let version = root.attr("version").unwrap_or("2.0.0").to_string();
        let service = if root.child("ServiceIdentification").is_some() {
            ServiceMetadata::from_ows(&root, AddressField::AdministrativeArea)
        } else {
            root.child("Service")
                .map(ServiceMetadata::from_service)
                .unwrap_or_default()
        };

        let list = root
            .child("FeatureTypeList")
            .ok_or(CapabilityParseError::MissingSection("FeatureTypeList"))?;
        let feature_types = list
            .children_named("FeatureType")
            .filter_map(read_feature_type)
            .collect();

        Ok(Self {
            version,
            service,
            feature_types,
        })
    }

    /// Build the source tree rooted at `ctx.url`.
    ///
    /// Every feature type becomes a leaf. `namespace` comes from
    /// [`parse_target_namespace`] and is shared by all leaves.
    pub fn build_tree(&self, namespace: Option<&str>, ctx: &SourceContext<'_>) -> TreeNode {
        let namespace = namespace.map(str::to_string);
        let attributions = Attributions {
            url: None,
            provider: self.service.provider_name.clone(),
        };

        let children = self
            .feature_types
            .iter()
            .map(|feature| {
                let details = WfsDetails {
                    meta: OgcMetadata {
                        optional_parameters: ctx.optional_parameters.clone(),
                        description: feature.abstract_text.clone(),
                        extent: Some(validate_or_world(feature.bbox)),
                        keyword_list: feature.keywords.clone(),
                        online_resource: feature.metadata_url.clone(),
                        attributions: attributions.clone(),
                        ..OgcMetadata::default()
                    },
                    namespace: namespace.clone(),
                };
                let mut node = TreeNode::new(
                    feature.name.as_str(),
                    feature.title.clone(),
                    ctx.url,
                    NodeKind::Wfs(details),
                );
                node.is_added_to_map = (ctx.is_live)(&node.name);
                node
            })
            .collect();

        let details = WfsDetails {
            meta: self.service.to_root_metadata(ctx.optional_parameters),
            namespace,
        };
        let title = self.service.title.clone().or_else(|| ctx.fallback_title.clone());

        TreeNode::new(ctx.url, title, ctx.url, NodeKind::Wfs(details))
            .with_children(children)
            .into_root()
    }
}

fn read_feature_type(element: &XmlElement) -> Option<WfsFeatureType> {
    let name = element.child_text("Name")?;

    let bbox = element
        .child("WGS84BoundingBox")
        .and_then(|b| {
            let lower = b.child_text("LowerCorner")?;
            let upper = b.child_text("UpperCorner")?;
            BoundingBox::from_corners(&lower, &upper).ok()
        })
        .or_else(|| element.child("LatLongBoundingBox").and_then(attribute_bbox));

    Some(WfsFeatureType {
        name,
        title: element.child_text("Title"),
        abstract_text: element.child_text("Abstract"),
        keywords: keywords(element),
        metadata_url: element.child("MetadataURL").and_then(|m| m.href()),
        bbox,
    })
}

/// The `targetNamespace` of a DescribeFeatureType schema.
pub fn parse_target_namespace(xml: &str) -> Result<Option<String>> {
    let root = XmlElement::parse(xml)?;
    Ok(root
        .attr("targetNamespace")
        .map(str::trim)
        .filter(|ns| !ns.is_empty())
        .map(str::to_string))
}
