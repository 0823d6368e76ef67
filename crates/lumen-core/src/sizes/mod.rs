//! Size catalog: the named derivatives every original gets.
//!
//! - **spec**: one named size (box, crop or fit, optional source size)
//! - **catalog**: validation and generation order over all sizes

pub mod catalog;
pub mod spec;

pub use catalog::SizeCatalog;
pub use spec::{CropAnchor, ResizeMode, SizeSpec};
