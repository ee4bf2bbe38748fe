//! Tests for loading sources through the source manager.

use std::time::Duration;

use source_tree::{
    FetchErrorKind, NodePath, RenderableOptions, Severity, SourceManager, WebdataConfig,
    WebdataError,
};
use test_utils::fixtures::{capabilities, urls};
use test_utils::{init_test_logging, RecordingSurface, StaticFetcher, TestHost};
use webdata_common::{NodeKind, SourceType};

fn manager(fetcher: StaticFetcher) -> SourceManager<StaticFetcher> {
    init_test_logging();
    SourceManager::new(WebdataConfig::default(), fetcher)
}

// ============================================================================
// Capability sources
// ============================================================================

#[tokio::test]
async fn test_load_wms_sends_optional_parameters() {
    let mut env = TestHost::new();
    let mut manager = manager(StaticFetcher::with_fixtures());

    let path = manager
        .load_source(&format!("{}?token=abc&SERVICE=WMS", urls::WMS), SourceType::Wms, &mut env.host())
        .await
        .unwrap();

    assert_eq!(path, NodePath::root(urls::WMS));
    assert_eq!(
        manager.fetcher().requests(),
        vec![format!("{}?token=abc&SERVICE=WMS&REQUEST=GetCapabilities", urls::WMS)]
    );
    let root = manager.node(&path).unwrap();
    assert_eq!(root.name, urls::WMS);
    assert_eq!(root.title, "City Maps");
    assert!(env.notifier.notifications().is_empty());
}

#[tokio::test]
async fn test_duplicate_url_rejected_before_fetch() {
    let mut env = TestHost::new();
    let mut manager = manager(StaticFetcher::with_fixtures());
    manager
        .load_source(urls::WMS, SourceType::Wms, &mut env.host())
        .await
        .unwrap();

    let err = manager
        .load_source(&format!("{}?token=other", urls::WMS), SourceType::Wms, &mut env.host())
        .await
        .unwrap_err();

    assert_eq!(err, WebdataError::DuplicateName(urls::WMS.to_string()));
    assert_eq!(manager.fetcher().requests().len(), 1);
    assert_eq!(manager.sources().len(), 1);
}

#[tokio::test]
async fn test_fetch_failure_leaves_collection_untouched() {
    let mut env = TestHost::new();
    let fetcher = StaticFetcher::new().with_failure(urls::WMS, FetchErrorKind::Timeout(Duration::from_secs(30)));
    let mut manager = manager(fetcher);

    let err = manager
        .load_source(urls::WMS, SourceType::Wms, &mut env.host())
        .await
        .unwrap_err();

    assert!(matches!(err, WebdataError::Fetch(ref e) if e.is_timeout()));
    assert!(manager.sources().is_empty());
    assert_eq!(env.notifier.count(Severity::Error), 1);
}

#[tokio::test]
async fn test_unparseable_document() {
    let mut env = TestHost::new();
    let mut manager = manager(StaticFetcher::new().with_capabilities(urls::WMS, "<html/>"));

    let err = manager
        .load_source(urls::WMS, SourceType::Wms, &mut env.host())
        .await
        .unwrap_err();

    assert!(matches!(err, WebdataError::Parse { ref url, .. } if url == urls::WMS));
    assert!(manager.sources().is_empty());
    assert_eq!(env.notifier.count(Severity::Error), 1);
}

#[tokio::test]
async fn test_wfs_namespace_resolved() {
    let mut env = TestHost::new();
    let mut manager = manager(StaticFetcher::with_fixtures());
    manager
        .load_source(urls::WFS, SourceType::Wfs, &mut env.host())
        .await
        .unwrap();

    let requests = manager.fetcher().requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].contains("REQUEST=DescribeFeatureType"));

    let rail = manager.find(urls::WFS, "transport:rail").unwrap();
    match &manager.node(&rail).unwrap().kind {
        NodeKind::Wfs(details) => {
            assert_eq!(details.namespace.as_deref(), Some("https://transport.example.com/ns"))
        }
        other => panic!("expected a WFS node, got {:?}", other),
    }
}

#[tokio::test]
async fn test_wfs_loads_without_namespace() {
    let mut env = TestHost::new();
    let fetcher = StaticFetcher::new().with_capabilities(urls::WFS, capabilities::WFS_200);
    let mut manager = manager(fetcher);
    manager
        .load_source(urls::WFS, SourceType::Wfs, &mut env.host())
        .await
        .unwrap();

    let roads = manager.find(urls::WFS, "transport:roads").unwrap();
    match &manager.node(&roads).unwrap().kind {
        NodeKind::Wfs(details) => assert_eq!(details.namespace, None),
        other => panic!("expected a WFS node, got {:?}", other),
    }
    assert!(env.notifier.notifications().is_empty());
}

#[tokio::test]
async fn test_wmts_leaf_renderable() {
    let mut env = TestHost::new();
    let mut manager = manager(StaticFetcher::with_fixtures());
    manager
        .load_source(urls::WMTS, SourceType::Wmts, &mut env.host())
        .await
        .unwrap();

    let basemap = manager.find(urls::WMTS, "basemap").unwrap();
    manager.add_leaf(&basemap, &mut env.host()).unwrap();

    let renderable = env.surface.renderable("basemap").unwrap();
    match &renderable.options {
        RenderableOptions::Wmts {
            tile_matrix_set_id,
            style,
            tile_size,
            ..
        } => {
            assert_eq!(tile_matrix_set_id, "mercator");
            assert_eq!(style.as_deref(), Some("colour"));
            assert_eq!(*tile_size, (256, 256));
        }
        other => panic!("unexpected options {:?}", other),
    }
}

#[tokio::test]
async fn test_untitled_document_gets_generated_title() {
    let xml = r#"<WMS_Capabilities version="1.3.0">
        <Service><Name>WMS</Name></Service>
        <Capability><Layer><Name>only</Name></Layer></Capability>
    </WMS_Capabilities>"#;
    let url = "https://untitled.example.com/wms";
    let mut env = TestHost::new();
    let mut manager = manager(StaticFetcher::new().with_capabilities(url, xml));

    let path = manager
        .load_source(url, SourceType::Wms, &mut env.host())
        .await
        .unwrap();

    let root = manager.node(&path).unwrap();
    assert_eq!(root.name, url);
    assert_eq!(root.title, "WMSLayer-0");
}

#[tokio::test]
async fn test_live_layers_adopted_on_load() {
    let mut env = TestHost {
        surface: RecordingSurface::with_live(&["lakes"]),
        ..TestHost::default()
    };
    let mut manager = manager(StaticFetcher::with_fixtures());
    manager
        .load_source(urls::WMS, SourceType::Wms, &mut env.host())
        .await
        .unwrap();

    let lakes = manager.find(urls::WMS, "lakes").unwrap();
    assert!(manager.node(&lakes).unwrap().is_added_to_map);
    assert!(manager.state().contains(urls::WMS, "lakes"));
    assert_eq!(&env.store.map, manager.state());
    assert_eq!(env.surface.add_count(), 0);
}

#[tokio::test]
async fn test_find_and_parent() {
    let mut env = TestHost::new();
    let mut manager = manager(StaticFetcher::with_fixtures());
    manager
        .load_source(urls::WMS, SourceType::Wms, &mut env.host())
        .await
        .unwrap();

    let rivers = manager.find(urls::WMS, "rivers").unwrap();
    assert_eq!(rivers.indices, vec![1, 0]);
    assert_eq!(manager.parent(&rivers).unwrap().name, "water");
    assert!(manager.parent(&NodePath::root(urls::WMS)).is_none());
    assert!(manager.find(urls::WMS, "missing").is_none());
    assert!(manager.find("https://other.example.com", "rivers").is_none());
}

// ============================================================================
// Capability-less sources
// ============================================================================

#[tokio::test]
async fn test_simple_sources_get_unique_names() {
    let mut env = TestHost::new();
    let mut manager = manager(StaticFetcher::new());

    let first = manager
        .load_source("https://terrain.example.com/a", SourceType::Terrain, &mut env.host())
        .await
        .unwrap();
    let second = manager
        .load_source("https://terrain.example.com/b", SourceType::Terrain, &mut env.host())
        .await
        .unwrap();

    assert_eq!(manager.node(&first).unwrap().name, "TerrainLayer-0");
    assert_eq!(manager.node(&second).unwrap().name, "TerrainLayer-1");
    assert!(manager.fetcher().requests().is_empty());
}

#[tokio::test]
async fn test_deleted_name_is_reused() {
    let mut env = TestHost::new();
    let mut manager = manager(StaticFetcher::new());
    let url = "https://terrain.example.com/a";
    manager
        .load_source(url, SourceType::Terrain, &mut env.host())
        .await
        .unwrap();
    manager.delete_source(url, &mut env.host()).unwrap();

    let path = manager
        .load_source("https://terrain.example.com/b", SourceType::Terrain, &mut env.host())
        .await
        .unwrap();
    assert_eq!(manager.node(&path).unwrap().name, "TerrainLayer-0");
}

#[tokio::test]
async fn test_names_skip_live_layers() {
    let mut env = TestHost {
        surface: RecordingSurface::with_live(&["GeoJSONLayer-0"]),
        ..TestHost::default()
    };
    let mut manager = manager(StaticFetcher::new());

    let mut names = Vec::new();
    for i in 0..5 {
        let url = format!("https://data.example.com/{}.geojson", i);
        let path = manager
            .load_source(&url, SourceType::GeoJson, &mut env.host())
            .await
            .unwrap();
        names.push(manager.node(&path).unwrap().name.clone());
    }

    assert!(!names.contains(&"GeoJSONLayer-0".to_string()));
    let mut unique = names.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 5);
}

#[tokio::test]
async fn test_simple_source_add_and_delete() {
    let mut env = TestHost::new();
    let mut manager = manager(StaticFetcher::new());
    let url = "https://tiles.example.com/tileset.json";
    let path = manager
        .add_simple_source(url, SourceType::Tileset, Some("Buildings 3D".into()), &mut env.host())
        .unwrap();

    let root = manager.node(&path).unwrap();
    assert_eq!(root.name, "Cesium3DTileset-0");
    assert_eq!(root.title, "Buildings 3D");
    assert!(root.is_leaf());

    manager.add_leaf(&path, &mut env.host()).unwrap();
    assert_eq!(
        env.surface.renderable("Cesium3DTileset-0").unwrap().options,
        RenderableOptions::Plain
    );
    assert!(manager.state().contains(url, "Cesium3DTileset-0"));

    manager.delete_source(url, &mut env.host()).unwrap();
    assert_eq!(env.surface.remove_count(), 1);
    assert!(manager.state().is_empty());
}
