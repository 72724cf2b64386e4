//! Object sources the download pipeline reads from

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{self, BoxStream, StreamExt};
use log::debug;

use super::types::ObjectCandidate;
use crate::error::{Error, Result};
use crate::providers::aws::{self, AwsConfig};
use crate::providers::http::http_client;

/// Byte chunks of one object, in order
pub type ObjectBody = BoxStream<'static, Result<Bytes>>;

#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Every key under `prefix`, in listing order
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectCandidate>>;

    async fn open(&self, candidate: &ObjectCandidate) -> Result<ObjectBody>;

    async fn delete(&self, key: &str) -> Result<()>;
}

/// Credential-based S3 bucket access
pub struct S3ObjectSource {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ObjectSource {
    pub fn new(config: &AwsConfig) -> Result<Self> {
        let client = aws::create_aws_client(config)
            .map_err(|e| Error::Configuration(format!("Failed to create S3 client: {}", e)))?;
        Ok(Self {
            client,
            bucket: config.bucket.clone(),
        })
    }
}

#[async_trait]
impl ObjectSource for S3ObjectSource {
    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectCandidate>> {
        let objects = aws::list_all_objects(&self.client, &self.bucket, Some(prefix))
            .await
            .map_err(|e| Error::network("list objects", &self.bucket, e))?;
        debug!("s3_list: bucket={} objects={}", self.bucket, objects.len());

        Ok(objects
            .into_iter()
            .map(|obj| ObjectCandidate {
                key: obj.key,
                size: Some(obj.size),
            })
            .collect())
    }

    async fn open(&self, candidate: &ObjectCandidate) -> Result<ObjectBody> {
        let target = format!("{}/{}", self.bucket, candidate.key);
        let body = aws::get_object(&self.client, &self.bucket, &candidate.key)
            .await
            .map_err(|e| Error::network("get object", target.clone(), e))?;

        let chunks = stream::unfold((body, target), |(mut body, target)| async move {
            let chunk = body
                .next()
                .await?
                .map_err(|e| Error::network("read object", target.clone(), e));
            Some((chunk, (body, target)))
        });
        Ok(chunks.boxed())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        aws::delete_object(&self.client, &self.bucket, key)
            .await
            .map_err(|e| Error::network("delete object", format!("{}/{}", self.bucket, key), e))
    }
}

/// Single object behind a pre-signed URL, fetched through the shared client
pub struct PresignedUrlSource {
    url: String,
}

impl PresignedUrlSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    fn display_url(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }
}

#[async_trait]
impl ObjectSource for PresignedUrlSource {
    async fn list_objects(&self, _prefix: &str) -> Result<Vec<ObjectCandidate>> {
        Err(Error::Configuration(
            "a pre-signed URL addresses a single object and cannot be listed".into(),
        ))
    }

    async fn open(&self, _candidate: &ObjectCandidate) -> Result<ObjectBody> {
        let target = self.display_url().to_string();
        let client = http_client().map_err(|e| Error::network("build http client", &target, e))?;

        let response = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::network("fetch url", &target, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::network(
                "fetch url",
                target,
                format!("{} - {}", status, text),
            ));
        }

        let chunks = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| Error::network("read url", target.clone(), e)));
        Ok(chunks.boxed())
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Err(Error::Configuration(
            "deleting the source object requires credential access".into(),
        ))
    }
}
