//! Core data model for comic conversion.
//!
//! This module contains:
//! - Target page dimensions
//! - Page identifiers derived from archive entry names
//! - Built pages (encoded image + wrapping document)

mod dimensions;
mod page;

pub use dimensions::Dimensions;
pub use page::{Page, PageId};
