//! Download request and result types

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::providers::aws::AwsConfig;

/// Default pause between lock checks on an existing destination file
pub const DEFAULT_LOCK_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Write buffer size for streaming downloads (2 MB)
pub const WRITE_BUFFER_SIZE: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AuthenticationMethod {
    #[default]
    #[serde(rename = "AWSCredentials", alias = "AwsCredentials")]
    AwsCredentials,
    #[serde(rename = "PreSignedURL", alias = "PreSignedUrl")]
    PreSignedUrl,
}

/// What to do when the destination file already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DestinationFileExistsAction {
    Overwrite,
    Info,
    #[default]
    Error,
}

/// How object bytes reach the destination file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WriteMode {
    /// Read the whole object into memory, then write it in one call
    #[default]
    Buffered,
    /// Write chunks as they arrive into a temporary sibling file, then rename
    Streaming,
}

#[derive(Debug, Clone)]
pub enum Connection {
    Credentials(AwsConfig),
    PreSignedUrl(String),
}

/// Raw request as supplied by a caller (JSON or TOML)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DownloadRequestInput {
    pub authentication_method: AuthenticationMethod,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub region: Option<String>,
    pub bucket_name: Option<String>,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    #[serde(rename = "PreSignedURL", alias = "PreSignedUrl")]
    pub pre_signed_url: Option<String>,
    pub s3_directory: String,
    pub search_pattern: String,
    pub destination_directory: Option<PathBuf>,
    pub destination_file_exists_action: DestinationFileExistsAction,
    pub download_from_current_directory_only: bool,
    pub delete_source_object: bool,
    pub file_locked_retries: u32,
    pub lock_retry_interval_ms: Option<u64>,
    pub throw_error_if_no_match: bool,
    pub write_mode: WriteMode,
}

/// Validated download request, immutable for one invocation
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub connection: Connection,
    pub s3_directory: String,
    pub search_pattern: String,
    pub destination_directory: PathBuf,
    pub destination_file_exists_action: DestinationFileExistsAction,
    pub delete_source_object: bool,
    pub download_from_current_directory_only: bool,
    pub file_locked_retries: u32,
    pub lock_retry_interval: Duration,
    pub throw_error_if_no_match: bool,
    pub write_mode: WriteMode,
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::Configuration(format!("{} is required", name))),
    }
}

impl TryFrom<DownloadRequestInput> for DownloadRequest {
    type Error = Error;

    fn try_from(input: DownloadRequestInput) -> Result<Self> {
        let destination_directory = input
            .destination_directory
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| Error::Configuration("DestinationDirectory is required".into()))?;

        let connection = match input.authentication_method {
            AuthenticationMethod::AwsCredentials => Connection::Credentials(AwsConfig {
                bucket: required(input.bucket_name, "BucketName")?,
                access_key_id: required(input.aws_access_key_id, "AwsAccessKeyId")?,
                secret_access_key: required(input.aws_secret_access_key, "AwsSecretAccessKey")?,
                region: input.region.unwrap_or_default(),
                endpoint_url: input.endpoint_url,
                force_path_style: input.force_path_style,
            }),
            AuthenticationMethod::PreSignedUrl => {
                Connection::PreSignedUrl(required(input.pre_signed_url, "PreSignedURL")?)
            }
        };

        Ok(DownloadRequest {
            connection,
            s3_directory: input.s3_directory,
            search_pattern: input.search_pattern,
            destination_directory,
            destination_file_exists_action: input.destination_file_exists_action,
            delete_source_object: input.delete_source_object,
            download_from_current_directory_only: input.download_from_current_directory_only,
            file_locked_retries: input.file_locked_retries,
            lock_retry_interval: input
                .lock_retry_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_LOCK_RETRY_INTERVAL),
            throw_error_if_no_match: input.throw_error_if_no_match,
            write_mode: input.write_mode,
        })
    }
}

impl DownloadRequest {
    pub fn is_credential_mode(&self) -> bool {
        matches!(self.connection, Connection::Credentials(_))
    }
}

/// An object selected for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectCandidate {
    pub key: String,
    pub size: Option<i64>,
}

impl ObjectCandidate {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size: None,
        }
    }

    /// Segment after the last `/`
    pub fn basename(&self) -> &str {
        key_basename(&self.key)
    }

    pub fn depth(&self) -> usize {
        key_depth(&self.key)
    }

    pub fn destination_in(&self, directory: &Path) -> PathBuf {
        directory.join(self.basename())
    }
}

pub(crate) fn key_basename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

pub(crate) fn key_depth(key: &str) -> usize {
    key.split('/').count()
}

/// Per-object download result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SingleResultObject {
    pub object_name: String,
    pub full_path: PathBuf,
    pub overwritten: bool,
    pub source_deleted: bool,
    pub info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DownloadResult {
    pub success: bool,
    pub results: Vec<SingleResultObject>,
}
