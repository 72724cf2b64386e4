//! Download worker - sequential select / reconcile / transfer pipeline

use log::{info, warn};
use tokio_util::sync::CancellationToken;

use super::pattern::SearchPattern;
use super::reconcile::{ensure_unlocked, reconcile, WriteDecision};
use super::select::{object_name_from_url, select_candidates};
use super::source::{ObjectSource, PresignedUrlSource, S3ObjectSource};
use super::transfer::execute;
use super::types::{Connection, DownloadRequest, DownloadResult, ObjectCandidate, SingleResultObject};
use crate::error::{Error, Result};

/// Download every object the request selects.
///
/// Returns either the complete result or the first error; nothing is reported
/// for objects processed before a failure.
pub async fn download(request: &DownloadRequest, cancel: &CancellationToken) -> Result<DownloadResult> {
    match &request.connection {
        Connection::Credentials(config) => {
            let source = S3ObjectSource::new(config)?;
            run_download(&source, request, cancel).await
        }
        Connection::PreSignedUrl(url) => {
            let source = PresignedUrlSource::new(url.clone());
            run_download(&source, request, cancel).await
        }
    }
}

/// Run the pipeline against any object source.
pub async fn run_download<S: ObjectSource + ?Sized>(
    source: &S,
    request: &DownloadRequest,
    cancel: &CancellationToken,
) -> Result<DownloadResult> {
    let candidates = collect_candidates(source, request).await?;
    info!(
        "download_start: directory={} pattern={} candidates={}",
        request.s3_directory,
        request.search_pattern,
        candidates.len()
    );

    let mut results: Vec<SingleResultObject> = Vec::with_capacity(candidates.len());
    for candidate in &candidates {
        if cancel.is_cancelled() {
            warn!("download_cancelled: before {}", candidate.key);
            return Err(Error::Cancelled);
        }
        results.push(process_candidate(source, request, candidate, cancel).await?);
    }

    if results.is_empty() && request.throw_error_if_no_match {
        return Err(Error::NoMatch {
            pattern: request.search_pattern.clone(),
            directory: request.s3_directory.clone(),
        });
    }

    info!("download_finish: results={}", results.len());
    Ok(DownloadResult {
        success: true,
        results,
    })
}

async fn collect_candidates<S: ObjectSource + ?Sized>(
    source: &S,
    request: &DownloadRequest,
) -> Result<Vec<ObjectCandidate>> {
    match &request.connection {
        Connection::Credentials(_) => {
            let pattern = SearchPattern::new(&request.search_pattern)?;
            let listing = source.list_objects(&request.s3_directory).await?;
            Ok(select_candidates(
                listing,
                &request.s3_directory,
                &pattern,
                request.download_from_current_directory_only,
            ))
        }
        Connection::PreSignedUrl(url) => Ok(vec![ObjectCandidate::new(object_name_from_url(url)?)]),
    }
}

async fn process_candidate<S: ObjectSource + ?Sized>(
    source: &S,
    request: &DownloadRequest,
    candidate: &ObjectCandidate,
    cancel: &CancellationToken,
) -> Result<SingleResultObject> {
    let destination = candidate.destination_in(&request.destination_directory);
    let decision = reconcile(
        request.destination_file_exists_action,
        candidate.basename(),
        &destination,
    )
    .await?;

    match decision {
        WriteDecision::Fail(path) => {
            warn!("download_exists: {} -> {}", candidate.key, path.display());
            Err(Error::DestinationExists { path })
        }
        WriteDecision::SkipExisting { info } => {
            info!("download_skip: {}", info);
            Ok(SingleResultObject {
                object_name: candidate.basename().to_string(),
                full_path: destination,
                overwritten: false,
                source_deleted: false,
                info: Some(info),
            })
        }
        WriteDecision::Write { overwrite } => {
            if overwrite {
                ensure_unlocked(
                    &destination,
                    request.file_locked_retries,
                    request.lock_retry_interval,
                    cancel,
                )
                .await?;
            }
            execute(source, request, candidate, &destination, overwrite, cancel).await
        }
    }
}
