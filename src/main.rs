use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use s3_tasks::bucket::{create_bucket, BucketAcl, CreateBucketRequest};
use s3_tasks::download::{
    download, DestinationFileExistsAction, DownloadRequest, DownloadRequestInput,
};
use s3_tasks::providers::http::{init_http_client, shutdown_http_client};

#[derive(Parser)]
#[command(name = "s3-tasks", version, about = "Download objects from and create S3 buckets")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download objects matching a pattern (or a pre-signed URL)
    Download {
        /// Request file (JSON, or TOML with a .toml extension)
        #[arg(short, long)]
        request: PathBuf,

        /// Override the destination directory
        #[arg(long)]
        destination: Option<PathBuf>,

        /// Override the search pattern
        #[arg(long)]
        pattern: Option<String>,

        /// Override the existing-file action
        #[arg(long, value_parser = parse_exists_action)]
        if_exists: Option<DestinationFileExistsAction>,

        /// Delete each source object after it is downloaded
        #[arg(long)]
        delete_source: bool,
    },
    /// Create a bucket
    CreateBucket {
        /// Request file (JSON, or TOML with a .toml extension)
        #[arg(short, long)]
        request: PathBuf,

        /// Override the canned ACL
        #[arg(long, value_parser = parse_acl)]
        acl: Option<BucketAcl>,
    },
}

fn parse_exists_action(value: &str) -> Result<DestinationFileExistsAction, String> {
    match value.to_ascii_lowercase().as_str() {
        "overwrite" => Ok(DestinationFileExistsAction::Overwrite),
        "info" => Ok(DestinationFileExistsAction::Info),
        "error" => Ok(DestinationFileExistsAction::Error),
        other => Err(format!("unknown action '{}' (overwrite, info, error)", other)),
    }
}

fn parse_acl(value: &str) -> Result<BucketAcl, String> {
    match value.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
        "private" => Ok(BucketAcl::Private),
        "publicread" => Ok(BucketAcl::PublicRead),
        "publicreadwrite" => Ok(BucketAcl::PublicReadWrite),
        "authenticatedread" => Ok(BucketAcl::AuthenticatedRead),
        other => Err(format!("unknown ACL '{}'", other)),
    }
}

fn read_request<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read request file {}", path.display()))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(&content).with_context(|| format!("invalid TOML in {}", path.display()))
    } else {
        serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli, cancel: CancellationToken) -> anyhow::Result<String> {
    match cli.command {
        Command::Download {
            request,
            destination,
            pattern,
            if_exists,
            delete_source,
        } => {
            let mut input: DownloadRequestInput = read_request(&request)?;
            if let Some(destination) = destination {
                input.destination_directory = Some(destination);
            }
            if let Some(pattern) = pattern {
                input.search_pattern = pattern;
            }
            if let Some(action) = if_exists {
                input.destination_file_exists_action = action;
            }
            input.delete_source_object |= delete_source;

            let request = DownloadRequest::try_from(input).context("invalid download request")?;
            let result = download(&request, &cancel).await.context("download failed")?;
            Ok(serde_json::to_string_pretty(&result)?)
        }
        Command::CreateBucket { request, acl } => {
            let mut request: CreateBucketRequest = read_request(&request)?;
            if let Some(acl) = acl {
                request.acl = acl;
            }
            let result = create_bucket(&request).await.context("create bucket failed")?;
            Ok(serde_json::to_string_pretty(&result)?)
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = init_http_client() {
        eprintln!("Error: failed to create HTTP client: {}", e);
        process::exit(1);
    }

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("interrupt received, cancelling");
            ctrl_c_cancel.cancel();
        }
    });

    let outcome = run(cli, cancel).await;
    shutdown_http_client();

    match outcome {
        Ok(output) => println!("{}", output),
        Err(error) => {
            log::error!("task failed: {:#}", error);
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
