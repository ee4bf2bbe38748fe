//! Tests for WMS capability parsing and tree building.

use std::collections::BTreeMap;

use ogc_capabilities::{CapabilityParseError, SourceContext, WmsCapabilities};
use test_utils::fixtures::{capabilities, urls};
use webdata_common::actions::{find_action, ActionKind};
use webdata_common::extent::WGS84_WORLD;
use webdata_common::{BoundingBox, Extent, NodeKind, TreeNode, WmsDetails};

fn build(xml: &str, url: &str, is_live: &dyn Fn(&str) -> bool) -> TreeNode {
    let optional = BTreeMap::from([("token".to_string(), "secret".to_string())]);
    let ctx = SourceContext {
        url,
        optional_parameters: &optional,
        is_live,
        fallback_title: Some("WMSLayer-0".to_string()),
    };
    WmsCapabilities::parse(xml).unwrap().build_tree(&ctx)
}

fn city() -> TreeNode {
    build(capabilities::WMS_130, urls::WMS, &|_: &str| false)
}

fn details(node: &TreeNode) -> &WmsDetails {
    match &node.kind {
        NodeKind::Wms(d) => d,
        other => panic!("expected a WMS node, got {:?}", other),
    }
}

fn names(nodes: &[TreeNode]) -> Vec<&str> {
    nodes.iter().map(|n| n.name.as_str()).collect()
}

// ============================================================================
// Document level
// ============================================================================

#[test]
fn test_parse_service_and_formats() {
    let caps = WmsCapabilities::parse(capabilities::WMS_130).unwrap();
    assert_eq!(caps.version, "1.3.0");
    assert_eq!(caps.service.title.as_deref(), Some("City Maps"));
    assert_eq!(caps.map_formats(), vec!["image/jpeg", "image/png"]);
    assert_eq!(caps.feature_info_response_type().as_deref(), Some("application/json"));
}

#[test]
fn test_root_metadata() {
    let root = city();
    assert_eq!(root.name, urls::WMS);
    assert_eq!(root.title, "City Maps");
    assert!(root.is_root_element);

    let meta = &details(&root).meta;
    assert_eq!(meta.description.as_deref(), Some("Base and thematic maps of the city"));
    assert_eq!(meta.keyword_list, vec!["city", "infrastructure"]);
    assert_eq!(meta.access_constraints.as_deref(), Some("CC-BY 4.0"));
    assert_eq!(meta.fees.as_deref(), Some("none"));
    assert_eq!(meta.online_resource.as_deref(), Some("https://maps.example.com/"));
    assert_eq!(meta.optional_parameters.get("token").map(String::as_str), Some("secret"));

    let contact = meta.contact.as_ref().unwrap();
    assert_eq!(contact.person.as_deref(), Some("Jane Doe"));
    assert_eq!(contact.organization.as_deref(), Some("City Survey Office"));
    assert_eq!(contact.city.as_deref(), Some("12345 Springfield"));
    assert_eq!(contact.address.as_deref(), Some("Main Street 1"));

    assert_eq!(meta.attributions.provider.as_deref(), Some("City Survey Office"));
    assert_eq!(meta.attributions.url.as_deref(), Some("https://maps.example.com/"));
}

#[test]
fn test_missing_capability_rejected() {
    let xml = r#"<WMS_Capabilities version="1.3.0"><Service><Title>x</Title></Service></WMS_Capabilities>"#;
    assert_eq!(
        WmsCapabilities::parse(xml).unwrap_err(),
        CapabilityParseError::MissingSection("Capability")
    );
}

#[test]
fn test_malformed_xml_rejected() {
    let err = WmsCapabilities::parse("<WMS_Capabilities><Service>").unwrap_err();
    assert!(matches!(err, CapabilityParseError::Xml { .. }));
}

// ============================================================================
// Tree shape and collapsing
// ============================================================================

#[test]
fn test_top_layer_children_become_root_children() {
    let root = city();
    assert_eq!(names(&root.children), vec!["roads", "water", "buildings"]);
    assert_eq!(names(&root.children[1].children), vec!["rivers", "lakes"]);
}

#[test]
fn test_same_named_child_collapsed() {
    let root = city();
    let roads = &root.children[0];

    assert!(roads.is_leaf());
    assert_eq!(roads.title, "Roads");
    let d = details(roads);
    assert!(d.queryable);
    assert_eq!(d.meta.description.as_deref(), Some("All public roads"));
    assert_eq!(d.meta.extent.unwrap().bbox, BoundingBox::new(9.0, 50.0, 10.0, 51.0));
    assert_eq!(d.styles.len(), 1);
    assert_eq!(
        d.styles[0].legend_url.as_deref(),
        Some("https://maps.example.com/legend/roads.png")
    );

    let mut count = 0;
    webdata_common::tree::apply_to_item_and_children(&root, &mut |n: &TreeNode| {
        if n.name == "roads" {
            count += 1;
        }
    });
    assert_eq!(count, 1);
}

#[test]
fn test_top_layer_not_collapsed_into_its_child() {
    let xml = r#"<WMS_Capabilities version="1.3.0">
        <Service><Title>Nested</Title></Service>
        <Capability>
            <Layer>
                <Name>base</Name>
                <Layer>
                    <Name>base</Name>
                    <Title>Base group</Title>
                    <Layer><Name>a</Name></Layer>
                    <Layer><Name>b</Name></Layer>
                </Layer>
            </Layer>
        </Capability>
    </WMS_Capabilities>"#;
    let root = build(xml, "https://nested.example.com/wms", &|_: &str| false);

    assert_eq!(names(&root.children), vec!["base"]);
    assert_eq!(root.children[0].title, "Base group");
    assert_eq!(names(&root.children[0].children), vec!["a", "b"]);
}

#[test]
fn test_unnamed_top_layer_without_children() {
    let xml = r#"<WMS_Capabilities version="1.3.0">
        <Service><Title>Single</Title></Service>
        <Capability><Layer><Title>Only layer</Title></Layer></Capability>
    </WMS_Capabilities>"#;
    let root = build(xml, "https://single.example.com/wms", &|_: &str| false);
    assert_eq!(root.children.len(), 1);
    assert_eq!(root.children[0].name, "Only layer");
    assert!(root.children[0].is_leaf());
}

// ============================================================================
// Inheritance and extents
// ============================================================================

#[test]
fn test_extent_inherited_from_ancestor() {
    let root = city();
    let rivers = &root.children[1].children[0];
    assert_eq!(
        details(rivers).meta.extent.unwrap().bbox,
        BoundingBox::new(5.0, 47.0, 15.0, 55.0)
    );
    assert!(!details(rivers).supports_transparency);
    assert!(!details(rivers).queryable);
}

#[test]
fn test_extent_clamped_to_world() {
    let root = city();
    let lakes = &root.children[1].children[1];
    assert_eq!(
        details(lakes).meta.extent.unwrap().bbox,
        BoundingBox::new(-180.0, -90.0, 20.0, 60.0)
    );
}

#[test]
fn test_every_extent_within_world() {
    let root = city();
    webdata_common::tree::apply_to_item_and_children(&root, &mut |n: &TreeNode| {
        if let Some(extent) = n.extent() {
            let b = extent.bbox;
            assert!(b.min_x >= WGS84_WORLD.min_x && b.max_x <= WGS84_WORLD.max_x);
            assert!(b.min_y >= WGS84_WORLD.min_y && b.max_y <= WGS84_WORLD.max_y);
            assert_eq!(extent.validate(), *extent);
        }
    });
}

#[test]
fn test_layer_attribution() {
    let root = city();
    let buildings = &root.children[2];
    let attribution = details(buildings).attribution.as_ref().unwrap();
    assert_eq!(attribution.title.as_deref(), Some("Survey Office"));
    assert_eq!(attribution.online_resource.as_deref(), Some("https://survey.example.com/"));
    assert!(!details(buildings).queryable);
}

#[test]
fn test_wms_111_bounding_boxes() {
    let root = build(capabilities::WMS_111, urls::WMS_111, &|_: &str| false);
    assert_eq!(root.title, "Cadastre");
    assert_eq!(names(&root.children), vec!["parcels", "boundaries"]);
    assert_eq!(
        root.children[0].extent().copied(),
        Some(Extent::wgs84(BoundingBox::new(1.0, 2.0, 3.0, 4.0)))
    );
    assert_eq!(
        root.children[1].extent().unwrap().bbox,
        BoundingBox::new(-10.0, 40.0, 20.0, 60.0)
    );
    assert_eq!(details(&root.children[0]).feature_info_response_type, None);
}

// ============================================================================
// Actions and live state
// ============================================================================

#[test]
fn test_actions_derived_on_build() {
    let root = city();
    assert!(find_action(&root, ActionKind::DeleteSource).is_some());
    assert!(!find_action(&root, ActionKind::AddAll).unwrap().disabled);
    assert!(find_action(&root, ActionKind::RemoveAll).unwrap().disabled);

    let water = &root.children[1];
    assert!(find_action(water, ActionKind::DeleteSource).is_none());
    assert_eq!(water.children[0].actions()[0].kind, ActionKind::AddToMap);
}

#[test]
fn test_live_leaves_start_added() {
    let root = build(capabilities::WMS_130, urls::WMS, &|name: &str| name == "lakes");
    let water = &root.children[1];
    assert!(water.children[1].is_added_to_map);
    assert!(!water.children[0].is_added_to_map);
    assert!(!find_action(water, ActionKind::RemoveAll).unwrap().disabled);
    assert!(!find_action(water, ActionKind::AddAll).unwrap().disabled);
}
