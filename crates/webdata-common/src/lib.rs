//! Common types shared by the webdata source-tree crates.

pub mod actions;
pub mod crs;
pub mod extent;
pub mod naming;
pub mod node;
pub mod tree;

pub use actions::{Action, ActionKind, NodeState};
pub use crs::{AxisOrder, CrsCode};
pub use extent::{BoundingBox, Extent};
pub use naming::UniqueNamer;
pub use node::{
    Attributions, Contact, LayerAttribution, NodeKind, OgcMetadata, SourceType, TreeNode,
    WfsDetails, WmsDetails, WmsStyle, WmtsDetails, WmtsStyle,
};
