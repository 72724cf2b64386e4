mod bucket;
mod list;
mod objects;
mod types;

pub use bucket::{bucket_exists, create_bucket};
pub use list::list_all_objects;
pub use objects::{delete_object, get_object};
pub use types::{create_aws_client, AwsConfig, AwsObject, AwsResult};
