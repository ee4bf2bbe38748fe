//! Common test fixtures for source-tree tests.
//!
//! Capability documents live under `fixtures/` and are compiled in, so tests
//! never depend on a network or on files outside the workspace.

/// Capability and detail documents.
pub mod capabilities {
    /// WMS 1.3.0: nested groups, a collapsible layer, clamped and inherited extents.
    pub const WMS_130: &str = include_str!("../fixtures/wms_130.xml");

    /// WMS 1.1.1 with an unnamed top layer and `LatLonBoundingBox`.
    pub const WMS_111: &str = include_str!("../fixtures/wms_111.xml");

    /// WFS 2.0.0 with three feature types, one without a bounding box.
    pub const WFS_200: &str = include_str!("../fixtures/wfs_200.xml");

    /// `DescribeFeatureType` schema for [`WFS_200`].
    pub const WFS_DESCRIBE_FEATURE_TYPE: &str = include_str!("../fixtures/wfs_describe_feature_type.xml");

    /// WMTS 1.0.0 with one EPSG:4326 and two EPSG:3857 matrix sets.
    pub const WMTS_100: &str = include_str!("../fixtures/wmts_100.xml");
}

/// Source URLs the fixtures are served under by [`crate::StaticFetcher::with_fixtures`].
pub mod urls {
    pub const WMS: &str = "https://maps.example.com/wms";
    pub const WMS_111: &str = "https://cadastre.example.com/wms";
    pub const WFS: &str = "https://transport.example.com/wfs";
    pub const WMTS: &str = "https://basemap.example.com/wmts";
}
