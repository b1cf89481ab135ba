pub mod anchors;
pub mod split;
