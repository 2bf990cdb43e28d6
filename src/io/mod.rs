//! Filesystem helpers for the conversion pipeline.

mod scratch;

pub use scratch::{ScratchWorkspace, with_scratch_workspace};
