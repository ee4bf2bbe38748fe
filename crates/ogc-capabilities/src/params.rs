//! Capability URL handling.
//!
//! Users paste URLs such as
//! `https://example.com/wms?SERVICE=WMS&REQUEST=GetCapabilities&token=abc`.
//! The part before `?` is the canonical source URL. Parameters other than the
//! OGC request parameters are kept as *optional parameters* and re-applied to
//! every operational request made for the source.

use std::collections::BTreeMap;

use webdata_common::SourceType;

/// Parameters that are always set by the request builder.
const RESERVED_PARAMETERS: [&str; 3] = ["SERVICE", "REQUEST", "VERSION"];

/// Normalize a user-entered URL into the canonical URL of a source.
///
/// WMS, WFS and WMTS drop their query (and fragment); terrain drops a trailing
/// `/layer.json` and everything after it. Other types are returned trimmed.
pub fn canonical_url(source_type: SourceType, raw: &str) -> String {
    let raw = raw.trim();
    match source_type {
        t if t.is_ogc() => strip_query(raw).to_string(),
        SourceType::Terrain => raw
            .split("/layer.json")
            .next()
            .unwrap_or(raw)
            .to_string(),
        _ => raw.to_string(),
    }
}

fn strip_query(url: &str) -> &str {
    url.split(|c: char| c == '?' || c == '#').next().unwrap_or(url)
}

/// Split a query string into key/value pairs, preserving order.
///
/// Values are kept as written (no percent-decoding) so they can be re-emitted
/// unchanged.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|p| !p.is_empty())
        .map(|p| match p.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (p.to_string(), String::new()),
        })
        .collect()
}

fn is_reserved(key: &str) -> bool {
    RESERVED_PARAMETERS
        .iter()
        .any(|r| r.eq_ignore_ascii_case(key))
}

/// A GetCapabilities request derived from a user-entered URL.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityRequest {
    /// Canonical source URL (no query).
    pub base_url: String,
    pub service: &'static str,
    /// `VERSION` given by the user, if any.
    pub version: Option<String>,
    /// Non-OGC query parameters of the user-entered URL.
    pub optional_parameters: BTreeMap<String, String>,
}

impl CapabilityRequest {
    pub fn new(raw: &str, service: &'static str) -> Self {
        let raw = raw.trim();
        let base_url = strip_query(raw).to_string();
        let query = raw
            .split_once('?')
            .map(|(_, q)| q.split('#').next().unwrap_or(q))
            .unwrap_or("");

        let mut version = None;
        let mut optional_parameters = BTreeMap::new();
        for (key, value) in parse_query(query) {
            if key.eq_ignore_ascii_case("VERSION") {
                version = Some(value).filter(|v| !v.is_empty());
            } else if !is_reserved(&key) {
                optional_parameters.insert(key, value);
            }
        }

        Self {
            base_url,
            service,
            version,
            optional_parameters,
        }
    }

    /// The query string sent to the server.
    ///
    /// Optional parameters first, then `SERVICE`, `REQUEST` and `VERSION`.
    pub fn query(&self) -> String {
        let mut parts: Vec<String> = self
            .optional_parameters
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        parts.push(format!("SERVICE={}", self.service));
        parts.push("REQUEST=GetCapabilities".to_string());
        if let Some(version) = &self.version {
            parts.push(format!("VERSION={}", version));
        }
        parts.join("&")
    }

    /// Full GetCapabilities URL.
    pub fn url(&self) -> String {
        format!("{}?{}", self.base_url, self.query())
    }
}

/// Append parameters to a URL that may already carry a query.
pub fn append_query_params(url: &str, params: &BTreeMap<String, String>) -> String {
    if params.is_empty() {
        return url.to_string();
    }

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let separator = match url.find('?') {
        None => "?",
        Some(_) if url.ends_with('?') || url.ends_with('&') => "",
        Some(_) => "&",
    };
    format!("{}{}{}", url, separator, query)
}

/// The `DescribeFeatureType` request used to resolve a WFS target namespace.
pub fn describe_feature_type_url(
    server_url: &str,
    version: &str,
    optional_parameters: &BTreeMap<String, String>,
) -> String {
    let url = format!(
        "{}?SERVICE=WFS&REQUEST=DescribeFeatureType&VERSION={}",
        server_url, version
    );
    append_query_params(&url, optional_parameters)
}
