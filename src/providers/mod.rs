//! Storage provider bindings
//!
//! - `aws`: S3 client operations (list, get, delete, create bucket)
//! - `http`: shared HTTP client for pre-signed URL downloads
//! - `region`: region identifier resolution

pub mod aws;
pub mod http;
pub mod region;
pub mod s3_client;
