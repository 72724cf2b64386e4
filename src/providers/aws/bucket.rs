use super::types::AwsResult;
use aws_sdk_s3::types::{BucketCannedAcl, BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client;

/// Returns `Ok(false)` only when the service reports the bucket as missing.
pub async fn bucket_exists(client: &Client, bucket: &str) -> AwsResult<bool> {
    match client.head_bucket().bucket(bucket).send().await {
        Ok(_) => Ok(true),
        Err(err) => {
            let service_error = err.into_service_error();
            if service_error.is_not_found() {
                Ok(false)
            } else {
                Err(service_error.into())
            }
        }
    }
}

/// Create a bucket, returning the location reported by the service.
///
/// `us-east-1` is the implicit location and must not be sent as a constraint.
pub async fn create_bucket(
    client: &Client,
    bucket: &str,
    region: &str,
    acl: BucketCannedAcl,
    object_lock_enabled: bool,
) -> AwsResult<Option<String>> {
    let mut request = client
        .create_bucket()
        .bucket(bucket)
        .acl(acl)
        .object_lock_enabled_for_bucket(object_lock_enabled);

    if region != "us-east-1" {
        let configuration = CreateBucketConfiguration::builder()
            .location_constraint(BucketLocationConstraint::from(region))
            .build();
        request = request.create_bucket_configuration(configuration);
    }

    let response = request.send().await?;
    Ok(response.location().map(|s| s.to_string()))
}
