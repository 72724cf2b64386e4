use super::types::{AwsObject, AwsResult};
use aws_sdk_s3::Client;

/// List every object in the bucket, following continuation tokens.
///
/// Directory markers are kept: filtering them out is the caller's decision.
pub async fn list_all_objects(
    client: &Client,
    bucket: &str,
    prefix: Option<&str>,
) -> AwsResult<Vec<AwsObject>> {
    let mut all_objects: Vec<AwsObject> = Vec::new();
    let mut continuation_token: Option<String> = None;

    loop {
        let mut request = client.list_objects_v2().bucket(bucket).max_keys(1000);

        if let Some(p) = prefix.filter(|p| !p.is_empty()) {
            request = request.prefix(p);
        }
        if let Some(token) = &continuation_token {
            request = request.continuation_token(token);
        }

        let response = request.send().await?;
        let is_truncated = response.is_truncated().unwrap_or(false);
        let next_token = response.next_continuation_token().map(|s| s.to_string());

        all_objects.extend(response.contents().iter().filter_map(|obj| {
            let key = obj.key()?.to_string();
            Some(AwsObject {
                key,
                size: obj.size().unwrap_or(0),
                last_modified: obj
                    .last_modified()
                    .map(|dt| dt.to_string())
                    .unwrap_or_default(),
                etag: obj.e_tag().unwrap_or_default().to_string(),
            })
        }));

        if !is_truncated || next_token.is_none() {
            break;
        }

        continuation_token = next_token;
    }

    Ok(all_objects)
}
