//! WMS layer collapsing and property inheritance.
//!
//! Servers frequently wrap a layer in a parent group carrying the same
//! `Name`, e.g. a top-level group `roads` whose only child is the layer
//! `roads`. Such a chain is merged into a single node: fields are taken from
//! the innermost layer that sets them, falling back outwards, and the node
//! gets the innermost layer's children. Layers that are merged away do not
//! appear in the output at all.
//!
//! Independently of collapsing, WMS lets a layer inherit its bounding box,
//! attribution and `queryable`/`opaque` flags from the nearest ancestor that
//! declares them ([`LayerFields::inherit_from`]).

use webdata_common::{BoundingBox, LayerAttribution, WmsStyle};

/// The per-layer fields read from a WMS `Layer` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerFields {
    pub name: Option<String>,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub keywords: Vec<String>,
    pub queryable: Option<bool>,
    pub opaque: Option<bool>,
    pub bbox: Option<BoundingBox>,
    pub attribution: Option<LayerAttribution>,
    pub styles: Vec<WmsStyle>,
}

impl LayerFields {
    /// Merge a collapsed child over its parent: the child's values win, the
    /// parent fills the gaps. Styles are the union of both, parent first.
    pub fn merged_over(self, parent: &LayerFields) -> LayerFields {
        let mut styles = parent.styles.clone();
        for style in self.styles {
            if !styles.iter().any(|s| s.name == style.name) {
                styles.push(style);
            }
        }

        LayerFields {
            name: self.name.or_else(|| parent.name.clone()),
            title: self.title.or_else(|| parent.title.clone()),
            abstract_text: self.abstract_text.or_else(|| parent.abstract_text.clone()),
            keywords: if self.keywords.is_empty() {
                parent.keywords.clone()
            } else {
                self.keywords
            },
            queryable: self.queryable.or(parent.queryable),
            opaque: self.opaque.or(parent.opaque),
            bbox: self.bbox.or(parent.bbox),
            attribution: self.attribution.or_else(|| parent.attribution.clone()),
            styles,
        }
    }

    /// Fill the inheritable fields this layer leaves unset from an ancestor.
    pub fn inherit_from(&mut self, ancestor: &LayerFields) {
        if self.bbox.is_none() {
            self.bbox = ancestor.bbox;
        }
        if self.attribution.is_none() {
            self.attribution = ancestor.attribution.clone();
        }
        if self.queryable.is_none() {
            self.queryable = ancestor.queryable;
        }
        if self.opaque.is_none() {
            self.opaque = ancestor.opaque;
        }
    }
}

/// A WMS layer as declared in the document, with its nested layers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawWmsLayer {
    pub fields: LayerFields,
    pub layers: Vec<RawWmsLayer>,
}

impl RawWmsLayer {
    pub fn new(fields: LayerFields, layers: Vec<RawWmsLayer>) -> Self {
        Self { fields, layers }
    }
}

/// Whether a layer must be kept apart from its nested layers.
///
/// It is when it has several nested layers, or a single one with a different
/// name. A layer without nested layers is never different.
pub fn is_child_different(layer: &RawWmsLayer) -> bool {
    match layer.layers.as_slice() {
        [] => false,
        [only] => only.fields.name != layer.fields.name,
        _ => true,
    }
}

/// The result of collapsing a layer chain.
#[derive(Debug, Clone, PartialEq)]
pub struct CollapsedLayer<'a> {
    pub fields: LayerFields,
    /// Nested layers of the innermost merged layer.
    pub children: &'a [RawWmsLayer],
    /// How many nested layers were merged into this one.
    pub merged: usize,
}

/// Collapse `layer` with every single same-named descendant in a row.
pub fn collapse(layer: &RawWmsLayer) -> CollapsedLayer<'_> {
    let mut fields = layer.fields.clone();
    let mut current = layer;
    let mut merged = 0;

    while let [only] = current.layers.as_slice() {
        if is_child_different(current) {
            break;
        }
        fields = only.fields.clone().merged_over(&fields);
        current = only;
        merged += 1;
    }

    CollapsedLayer {
        fields,
        children: &current.layers,
        merged,
    }
}
