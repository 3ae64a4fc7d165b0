pub mod aggregation;
pub mod annotator;
pub mod constants;
pub mod model;
pub mod selector;
