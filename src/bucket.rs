//! Bucket creation task

use aws_sdk_s3::types::BucketCannedAcl;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::providers::aws::{self, AwsConfig};
use crate::providers::region::resolve_region;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BucketAcl {
    #[default]
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
}

impl From<BucketAcl> for BucketCannedAcl {
    fn from(acl: BucketAcl) -> Self {
        match acl {
            BucketAcl::Private => BucketCannedAcl::Private,
            BucketAcl::PublicRead => BucketCannedAcl::PublicRead,
            BucketAcl::PublicReadWrite => BucketCannedAcl::PublicReadWrite,
            BucketAcl::AuthenticatedRead => BucketCannedAcl::AuthenticatedRead,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CreateBucketRequest {
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub region: String,
    pub bucket_name: String,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    pub acl: BucketAcl,
    pub object_lock_enabled_for_bucket: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateBucketResult {
    pub success: bool,
    pub bucket_location: Option<String>,
    pub message: Option<String>,
}

impl CreateBucketRequest {
    fn validate(&self) -> Result<()> {
        if self.bucket_name.trim().is_empty() {
            return Err(Error::Configuration("BucketName is required".into()));
        }
        if self.aws_access_key_id.trim().is_empty() || self.aws_secret_access_key.trim().is_empty() {
            return Err(Error::Configuration(
                "AwsAccessKeyId and AwsSecretAccessKey are required".into(),
            ));
        }
        Ok(())
    }

    fn aws_config(&self) -> AwsConfig {
        AwsConfig {
            bucket: self.bucket_name.clone(),
            access_key_id: self.aws_access_key_id.clone(),
            secret_access_key: self.aws_secret_access_key.clone(),
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone(),
            force_path_style: self.force_path_style,
        }
    }
}

/// Create the bucket unless it already exists.
pub async fn create_bucket(request: &CreateBucketRequest) -> Result<CreateBucketResult> {
    request.validate()?;
    let client = aws::create_aws_client(&request.aws_config())
        .map_err(|e| Error::Configuration(format!("Failed to create S3 client: {}", e)))?;
    let bucket = request.bucket_name.as_str();

    let exists = aws::bucket_exists(&client, bucket)
        .await
        .map_err(|e| Error::network("head bucket", bucket, e))?;
    if exists {
        info!("bucket_exists: {}", bucket);
        return Ok(CreateBucketResult {
            success: true,
            bucket_location: None,
            message: Some("Bucket already exists.".into()),
        });
    }

    let region = resolve_region(&request.region);
    let location = aws::create_bucket(
        &client,
        bucket,
        region,
        request.acl.into(),
        request.object_lock_enabled_for_bucket,
    )
    .await
    .map_err(|e| Error::network("create bucket", bucket, e))?;

    info!(
        "bucket_created: {} region={} acl={:?} object_lock={}",
        bucket, region, request.acl, request.object_lock_enabled_for_bucket
    );
    Ok(CreateBucketResult {
        success: true,
        bucket_location: location,
        message: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acl_maps_to_canned_acl() {
        assert_eq!(BucketCannedAcl::from(BucketAcl::Private), BucketCannedAcl::Private);
        assert_eq!(
            BucketCannedAcl::from(BucketAcl::PublicReadWrite),
            BucketCannedAcl::PublicReadWrite
        );
    }

    #[test]
    fn request_deserializes_from_toml() {
        let request: CreateBucketRequest = toml::from_str(
            r#"
            AwsAccessKeyId = "AKIA"
            AwsSecretAccessKey = "secret"
            Region = "EuNorth1"
            BucketName = "archive"
            Acl = "PublicRead"
            ObjectLockEnabledForBucket = true
            "#,
        )
        .unwrap();
        assert_eq!(request.acl, BucketAcl::PublicRead);
        assert!(request.object_lock_enabled_for_bucket);
        assert!(request.validate().is_ok());
    }

    #[tokio::test]
    async fn missing_bucket_name_is_rejected_before_any_call() {
        let request = CreateBucketRequest {
            aws_access_key_id: "AKIA".into(),
            aws_secret_access_key: "secret".into(),
            ..Default::default()
        };
        let err = create_bucket(&request).await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
