//! Task-style S3 integrations
//!
//! - [`download`]: download objects matching a glob pattern (or one object
//!   behind a pre-signed URL) with an existing-file policy, lock retries and
//!   optional source deletion
//! - [`bucket`]: create a bucket with a canned ACL and object lock setting

pub mod bucket;
pub mod download;
pub mod error;
pub mod providers;

pub use error::{Error, Result};
