//! Object download module
//!
//! Downloads objects matching a glob pattern from a bucket (or a single object
//! from a pre-signed URL) into a local directory:
//! - `pattern`: glob-to-predicate translation for basenames
//! - `select`: listing filter (prefix, directory markers, depth)
//! - `reconcile`: existing-destination policy and file lock probing
//! - `transfer`: fetch, write, optional source delete
//! - `worker`: sequential pipeline and result aggregation

pub mod pattern;
pub mod reconcile;
pub mod select;
pub mod source;
pub mod transfer;
mod types;
mod worker;

pub use types::*;
pub use worker::{download, run_download};
