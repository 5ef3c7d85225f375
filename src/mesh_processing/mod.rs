pub mod bounds;
pub mod split;
pub mod tangents;
pub mod weights;
