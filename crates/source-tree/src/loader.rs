//! Turning a user-entered URL into a source tree.
//!
//! Loading is split in two: [`fetch_source`] does all network I/O and
//! parsing, [`FetchedSource::build`] then creates the tree synchronously.
//! Nothing is inserted anywhere until a source has been fully fetched.

use ogc_capabilities::{
    canonical_url, describe_feature_type_url, parse_target_namespace, CapabilityRequest,
    SourceContext, WfsCapabilities, WmsCapabilities, WmtsCapabilities,
};
use tracing::{debug, instrument, warn};
use webdata_common::{NodeKind, SourceType, TreeNode};

use crate::config::WebdataConfig;
use crate::error::{WebdataError, WebdataResult};
use crate::fetch::CapabilityFetcher;

/// A parsed capability document, ready to be built into a tree.
#[derive(Debug, Clone)]
pub enum FetchedSource {
    Wms {
        request: CapabilityRequest,
        capabilities: WmsCapabilities,
    },
    Wfs {
        request: CapabilityRequest,
        capabilities: WfsCapabilities,
        /// `None` when `DescribeFeatureType` failed or declared none.
        namespace: Option<String>,
    },
    Wmts {
        request: CapabilityRequest,
        capabilities: WmtsCapabilities,
    },
}

impl FetchedSource {
    fn request(&self) -> &CapabilityRequest {
        match self {
            FetchedSource::Wms { request, .. }
            | FetchedSource::Wfs { request, .. }
            | FetchedSource::Wmts { request, .. } => request,
        }
    }

    /// Canonical URL; the root's name.
    pub fn url(&self) -> &str {
        &self.request().base_url
    }

    pub fn source_type(&self) -> SourceType {
        match self {
            FetchedSource::Wms { .. } => SourceType::Wms,
            FetchedSource::Wfs { .. } => SourceType::Wfs,
            FetchedSource::Wmts { .. } => SourceType::Wmts,
        }
    }

    /// Whether the document carries a service title of its own.
    pub fn has_title(&self) -> bool {
        let title = match self {
            FetchedSource::Wms { capabilities, .. } => &capabilities.service.title,
            FetchedSource::Wfs { capabilities, .. } => &capabilities.service.title,
            FetchedSource::Wmts { capabilities, .. } => &capabilities.service.title,
        };
        title.as_deref().map_or(false, |t| !t.trim().is_empty())
    }

    /// Build the root node. Leaves for which `is_live` holds start out added.
    pub fn build(&self, is_live: &dyn Fn(&str) -> bool, fallback_title: Option<String>) -> TreeNode {
        let request = self.request();
        let ctx = SourceContext {
            url: &request.base_url,
            optional_parameters: &request.optional_parameters,
            is_live,
            fallback_title,
        };
        match self {
            FetchedSource::Wms { capabilities, .. } => capabilities.build_tree(&ctx),
            FetchedSource::Wfs {
                capabilities,
                namespace,
                ..
            } => capabilities.build_tree(namespace.as_deref(), &ctx),
            FetchedSource::Wmts { capabilities, .. } => capabilities.build_tree(&ctx),
        }
    }
}

/// Fetch and parse the capability document for `raw_url`.
///
/// WFS sources additionally resolve their target namespace; a failure there
/// is logged and the source loads without one.
#[instrument(skip(fetcher, config))]
pub async fn fetch_source(
    fetcher: &dyn CapabilityFetcher,
    config: &WebdataConfig,
    source_type: SourceType,
    raw_url: &str,
) -> WebdataResult<FetchedSource> {
    let service = source_type
        .service()
        .ok_or(WebdataError::UnsupportedSource(source_type))?;
    let request = CapabilityRequest::new(raw_url, service);
    let url = request.base_url.clone();
    let parse_error = |source| WebdataError::Parse {
        url: url.clone(),
        source,
    };

    let body = fetcher
        .fetch_text(&request.url(), config.capabilities_timeout)
        .await?;
    debug!(url = %url, bytes = body.len(), "Parsing capabilities");

    let fetched = match source_type {
        SourceType::Wms => FetchedSource::Wms {
            capabilities: WmsCapabilities::parse(&body).map_err(parse_error)?,
            request,
        },
        SourceType::Wmts => FetchedSource::Wmts {
            capabilities: WmtsCapabilities::parse(&body).map_err(parse_error)?,
            request,
        },
        SourceType::Wfs => {
            let capabilities = WfsCapabilities::parse(&body).map_err(parse_error)?;
            let namespace = match resolve_namespace(fetcher, config, &request, &capabilities).await {
                Ok(namespace) => namespace,
                Err(e) => {
                    warn!(error = %e, "Continuing without WFS namespace");
                    None
                }
            };
            FetchedSource::Wfs {
                request,
                capabilities,
                namespace,
            }
        }
        other => return Err(WebdataError::UnsupportedSource(other)),
    };
    Ok(fetched)
}

async fn resolve_namespace(
    fetcher: &dyn CapabilityFetcher,
    config: &WebdataConfig,
    request: &CapabilityRequest,
    capabilities: &WfsCapabilities,
) -> WebdataResult<Option<String>> {
    let failure = |reason: String| WebdataError::NamespaceResolution {
        url: request.base_url.clone(),
        reason,
    };
    let url = describe_feature_type_url(
        &request.base_url,
        &capabilities.version,
        &request.optional_parameters,
    );
    let body = fetcher
        .fetch_text(&url, config.detail_timeout)
        .await
        .map_err(|e| failure(e.kind.to_string()))?;
    parse_target_namespace(&body).map_err(|e| failure(e.to_string()))
}

/// Root node for a source without a capability document.
///
/// The root is its own single leaf; `name` doubles as its title unless one
/// is given.
pub fn simple_source(
    source_type: SourceType,
    raw_url: &str,
    name: &str,
    title: Option<String>,
    is_live: &dyn Fn(&str) -> bool,
) -> WebdataResult<TreeNode> {
    if source_type.is_ogc() {
        return Err(WebdataError::UnsupportedSource(source_type));
    }
    let mut root = TreeNode::new(
        name,
        title,
        canonical_url(source_type, raw_url),
        NodeKind::plain(source_type),
    );
    root.is_added_to_map = is_live(name);
    Ok(root.into_root())
}
