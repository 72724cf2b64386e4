use super::types::AwsResult;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

pub async fn get_object(client: &Client, bucket: &str, key: &str) -> AwsResult<ByteStream> {
    let response = client.get_object().bucket(bucket).key(key).send().await?;
    Ok(response.body)
}

pub async fn delete_object(client: &Client, bucket: &str, key: &str) -> AwsResult<()> {
    client.delete_object().bucket(bucket).key(key).send().await?;
    Ok(())
}
